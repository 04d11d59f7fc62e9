//! taskrun - launch the project's processes.
//!
//! Usage:
//!   taskrun run                 Start the application
//!   taskrun start-meilisearch   Start Meilisearch (needs MS_MASTER_KEY)

use clap::{Parser, Subcommand};
use taskrun::{run_task, Task};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "taskrun")]
#[command(version, about = "Launch the application or the search server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the application entrypoint
    Run,
    /// Start ./meilisearch with MS_MASTER_KEY and ./ms-config.toml
    StartMeilisearch,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let task = match cli.command {
        Commands::Run => Task::Run,
        Commands::StartMeilisearch => Task::StartMeilisearch,
    };

    let code = match run_task(task) {
        Ok(code) => code,
        Err(err) => {
            error!(task = %task, error = %err, "task failed");
            1
        }
    };
    std::process::exit(code);
}

fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
