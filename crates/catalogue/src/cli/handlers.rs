//! Command handlers.

use super::commands::{Commands, OutputFormat};
use catalogue::{
    CatalogueConfig, ConsistencyFault, ItemEdit, MediaItemView, MediaSource, MediaStore,
    OperationReport, open_store,
};
use std::error::Error;
use tokio::io::AsyncReadExt;

type HandlerResult = Result<(), Box<dyn Error>>;

/// Open the store and run one command.
pub async fn handle_command(
    command: Commands,
    config: CatalogueConfig,
    format: OutputFormat,
) -> HandlerResult {
    let collection = config.media().collection().clone();
    let store = open_store(config)?;

    match command {
        Commands::List { scope, locale } => {
            let views = store
                .list(&scope.scope(&collection), locale.as_deref())
                .await?;
            print_items(&views, format)
        }

        Commands::Upload { scope, files } => {
            let sources: Vec<MediaSource> = files
                .iter()
                .map(|path| MediaSource::local(path, None))
                .collect();
            let report = store
                .upload_files(&scope.scope(&collection), &sources)
                .await?;
            print_report(&report, format)
        }

        Commands::AddUrls { scope, file, urls } => {
            let text = url_input(file, urls).await?;
            let report = store.upload_urls(&scope.scope(&collection), &text).await?;
            print_report(&report, format)
        }

        Commands::Edit {
            scope,
            item,
            locale,
            name,
            description,
        } => {
            let edit = ItemEdit {
                locale,
                name,
                description,
                is_cover: None,
            };
            let report = store.update(&scope.scope(&collection), item, edit).await?;
            print_report(&report, format)
        }

        Commands::SetCover { scope, item } => {
            let report = store.set_cover(&scope.scope(&collection), item).await?;
            print_report(&report, format)
        }

        Commands::Delete { scope, item } => {
            let report = store.remove(&scope.scope(&collection), item).await?;
            print_report(&report, format)
        }

        Commands::Reorder { scope, items } => {
            let report = store.reorder(&scope.scope(&collection), &items).await?;
            print_report(&report, format)
        }

        Commands::Move { scope, from, to } => {
            let report = store
                .move_item(&scope.scope(&collection), from, to)
                .await?;
            print_report(&report, format)
        }

        Commands::Check { scope } => {
            let faults = store.check_consistency(&scope.scope(&collection)).await?;
            print_faults(&faults, format)
        }

        Commands::Purge { scope } => {
            let report = store.delete_collection(&scope.scope(&collection)).await?;
            print_report(&report, format)
        }

        Commands::Locales => print_locales(&store, format),
    }
}

/// URLs from arguments, else a file, else stdin.
async fn url_input(
    file: Option<std::path::PathBuf>,
    urls: Vec<String>,
) -> Result<String, std::io::Error> {
    if !urls.is_empty() {
        return Ok(urls.join("\n"));
    }
    match file {
        Some(path) => tokio::fs::read_to_string(path).await,
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            Ok(text)
        }
    }
}

fn print_items(views: &[MediaItemView], format: OutputFormat) -> HandlerResult {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(views)?);
        }
        OutputFormat::Human => {
            if views.is_empty() {
                println!("No images");
                return Ok(());
            }
            for view in views {
                println!(
                    "{:>3} {} {}  {} ({}, {}, {} bytes)",
                    view.position,
                    if view.is_cover { "*" } else { " " },
                    view.uuid,
                    view.display_name,
                    view.file_name,
                    view.mime_type,
                    view.size
                );
                if !view.display_description.is_empty() {
                    println!("        {}", view.display_description);
                }
            }
            println!("Total: {} image(s), * = cover", views.len());
        }
    }
    Ok(())
}

fn print_report(report: &OperationReport, format: OutputFormat) -> HandlerResult {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Human => {
            for line in report.summary() {
                println!("{}", line);
            }
            for failure in &report.failures {
                println!("  {}: {}", failure.locator, failure.reason);
            }
            if !report.items.is_empty() {
                println!("{:-<80}", "");
                print_items(&report.items, format)?;
            }
        }
    }
    Ok(())
}

fn print_faults(faults: &[ConsistencyFault], format: OutputFormat) -> HandlerResult {
    match format {
        OutputFormat::Json => {
            let kinds: Vec<String> = faults.iter().map(|fault| fault.kind.to_string()).collect();
            println!("{}", serde_json::to_string_pretty(&kinds)?);
        }
        OutputFormat::Human => {
            if faults.is_empty() {
                println!("Collection is consistent");
            } else {
                println!("Repaired {} consistency fault(s):", faults.len());
                for fault in faults {
                    println!("  {}", fault.kind);
                }
            }
        }
    }
    Ok(())
}

fn print_locales(store: &MediaStore, format: OutputFormat) -> HandlerResult {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(store.locales())?);
        }
        OutputFormat::Human => {
            for (code, label) in store.locales() {
                let marker = if code == store.default_locale() {
                    " (default)"
                } else {
                    ""
                };
                println!("{:<6} {}{}", code, label, marker);
            }
        }
    }
    Ok(())
}
