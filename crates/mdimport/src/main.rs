//! mdimport - split markdown notes into search items and optionally upload them.
//!
//! Usage:
//!   mdimport '<glob>'           Print the items found in every matching file
//!   mdimport '<glob>' --json    Print the search documents as JSON
//!   mdimport '<glob>' --push    Upload the documents to Meilisearch

use anyhow::Context;
use clap::Parser;
use mdimport::{process_files, to_documents, ItemGroup};
use meili::{MeiliClient, MeiliConfig, SearchBackend};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Process markdown files.
#[derive(Parser, Debug)]
#[command(name = "mdimport", version, about = "Process markdown files.")]
struct Cli {
    /// Glob pattern to match markdown files
    glob_pattern: String,

    /// Print the documents that would be indexed as JSON
    #[arg(long, conflicts_with = "push")]
    json: bool,

    /// Upload the documents to the index named by MS_INDEX_NAME
    #[arg(long)]
    push: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let groups = process_files(&cli.glob_pattern)?;
    info!(files = groups.len(), "processed markdown files");

    if cli.json {
        let documents = to_documents(&groups)?;
        println!("{}", serde_json::to_string_pretty(&documents)?);
    } else if cli.push {
        push(&groups).await?;
    } else {
        print_groups(&groups)?;
    }

    Ok(())
}

fn print_groups(groups: &[ItemGroup]) -> anyhow::Result<()> {
    for group in groups {
        println!("File: {}", group.stem());
        for item in &group.items {
            println!("{}", "-".repeat(40));
            println!("Title: {}", item.title);
            println!("Body: {}", item.body);
            println!("Metadata: {}", serde_json::to_string(&item.metadata)?);
        }
    }
    Ok(())
}

async fn push(groups: &[ItemGroup]) -> anyhow::Result<()> {
    let documents = to_documents(groups)?;
    if documents.is_empty() {
        info!("no items found, nothing to upload");
        return Ok(());
    }

    let config = MeiliConfig::from_env();
    let client = MeiliClient::new(config);
    let task = client
        .add_documents(&documents, Some("id"))
        .await
        .with_context(|| format!("uploading to index '{}'", client.index()))?;

    info!(
        index = client.index(),
        documents = documents.len(),
        task_uid = task.task_uid,
        status = %task.status,
        "documents enqueued"
    );
    Ok(())
}

fn init_tracing() {
    // Logs go to stderr so printed items and JSON stay clean.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
