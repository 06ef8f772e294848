//! DigiSheet - Main entry point.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use digisheet_domain::SheetKind;
use digisheet_engine::infrastructure::{
    clock::SystemClock,
    config::AppConfig,
    documents::DocumentFiles,
    ports::ClockPort,
    quality_library::{preview, QualityLibrary, PREVIEW_LENGTH},
    storage::FileSheetStore,
};
use digisheet_engine::use_cases::{SheetLibrary, TabManager};

const USAGE: &str = "Usage: digisheet <command>

Commands:
  show <file>...                 Print computed outputs of sheet files
  new <digimon|tamer> <title>    Write a fresh sheet file
  save <file>...                 Store sheet files in the saved sheet library
  list                           List saved sheets
  delete <key>                   Delete a saved sheet
  qualities [term]               Search the quality library";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root so `cargo run` works from any crate.
    load_dotenv_from_repo_root();

    let config = AppConfig::from_env();

    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let command = args.next();
    let rest: Vec<String> = args.collect();

    match command.as_deref() {
        Some("show") => show(&rest).await,
        Some("new") => new_sheet(&rest).await,
        Some("save") => save(&config, &rest).await,
        Some("list") => list(&config).await,
        Some("delete") => delete(&config, &rest).await,
        Some("qualities") => qualities(&config, rest.first().map(String::as_str)).await,
        Some(cmd) => anyhow::bail!("Unknown command: {cmd}\n\n{USAGE}"),
        None => anyhow::bail!(USAGE),
    }
}

async fn show(files: &[String]) -> anyhow::Result<()> {
    if files.is_empty() {
        anyhow::bail!("show needs at least one file\n\n{USAGE}");
    }

    let documents = DocumentFiles::new(".");
    let mut tabs = TabManager::new();
    for file in files {
        let import = documents
            .import(Path::new(file))
            .await
            .with_context(|| format!("reading {file}"))?;
        tabs.import(&import)
            .with_context(|| format!("opening sheets from {file}"))?;
    }

    let mut sheets = Vec::with_capacity(tabs.count());
    for summary in tabs.all() {
        let Some(tab) = tabs.get(summary.id) else {
            continue;
        };
        sheets.push(json!({
            "title": summary.title,
            "type": summary.kind,
            "outputs": tab.sheet().outputs(),
            "health": tab.sheet().health(),
        }));
    }
    println!("{}", serde_json::to_string_pretty(&sheets)?);
    Ok(())
}

async fn new_sheet(args: &[String]) -> anyhow::Result<()> {
    let [kind, title] = args else {
        anyhow::bail!("new needs a sheet type and a title\n\n{USAGE}");
    };
    let kind: SheetKind = kind.parse()?;

    let mut tabs = TabManager::new();
    let id = tabs.add_tab(title.as_str(), kind, None)?;
    let document = tabs.export_document(id, SystemClock::new().now())?;
    let path = DocumentFiles::new(".").export_document(&document).await?;

    println!("{}", path.display());
    Ok(())
}

async fn save(config: &AppConfig, files: &[String]) -> anyhow::Result<()> {
    if files.is_empty() {
        anyhow::bail!("save needs at least one file\n\n{USAGE}");
    }

    let library = sheet_library(config);
    let documents = DocumentFiles::new(".");
    let mut tabs = TabManager::new();
    for file in files {
        let import = documents
            .import(Path::new(file))
            .await
            .with_context(|| format!("reading {file}"))?;
        for id in tabs.import(&import)? {
            let title = tabs.get(id).map(|tab| tab.title().to_string()).unwrap_or_default();
            let saved = library.save(&mut tabs, id, &title).await?;
            println!("{}", saved.key);
        }
    }
    Ok(())
}

async fn list(config: &AppConfig) -> anyhow::Result<()> {
    let saves = sheet_library(config).list().await?;
    if saves.is_empty() {
        println!("No saved sheets found.");
        return Ok(());
    }
    for save in saves {
        let saved = save
            .saved_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "{}\t{}\t{}\t{}",
            save.key,
            save.title.as_deref().unwrap_or("(no title)"),
            save.kind.display_name(),
            saved
        );
    }
    Ok(())
}

async fn delete(config: &AppConfig, args: &[String]) -> anyhow::Result<()> {
    let [key] = args else {
        anyhow::bail!("delete needs a saved sheet key\n\n{USAGE}");
    };
    sheet_library(config).delete(key).await?;
    Ok(())
}

async fn qualities(config: &AppConfig, term: Option<&str>) -> anyhow::Result<()> {
    let mut library = QualityLibrary::new(&config.quality_dir);
    let catalog = library.load().await;

    for quality in catalog.search(term, None, None) {
        println!(
            "{} ({}, {} DP, {}): {}",
            quality.name,
            quality.kind.as_str(),
            quality.dp_cost,
            quality.stage.as_deref().unwrap_or("Any"),
            preview(&quality.description, PREVIEW_LENGTH)
        );
    }
    Ok(())
}

fn sheet_library(config: &AppConfig) -> SheetLibrary {
    SheetLibrary::new(
        Arc::new(FileSheetStore::new(&config.data_dir)),
        Arc::new(SystemClock::new()),
    )
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
