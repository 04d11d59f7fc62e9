//! slackdb - inspect a Slack workspace export.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use slackdb::{Channel, SlackDb, DEFAULT_LIMIT};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "slackdb", version, about = "Inspect a Slack workspace export")]
struct Cli {
    /// Directory containing channels.json and users.json
    #[arg(value_name = "EXPORT_DIR")]
    export_path: PathBuf,

    /// Name fragment for the user search
    #[arg(long, default_value = "maria")]
    user_query: String,

    /// Name fragment for the channel search
    #[arg(long, default_value = "th")]
    channel_query: String,

    /// Maximum number of search results
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: usize,
}

fn print_channel(channel: &Channel) {
    println!("{:20} (ID: {})", channel.name, channel.id);
}

fn print_user(id: &str, name: &str) {
    println!("{name:20} (ID: {id})");
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let db = SlackDb::open(&cli.export_path)
        .with_context(|| format!("opening export {}", cli.export_path.display()))?;

    println!("\nChannels:");
    println!("---------");
    let channels = db.all_channels();
    for channel in &channels {
        println!("{} {}", channel.id, channel.name);
    }

    println!("\nUsers:");
    println!("------");
    let users = db.all_users();
    for user in &users {
        print_user(&user.id, &user.name);
    }

    if let Some(first) = users.first().and_then(|u| db.user_by_id(&u.id)) {
        println!("\nOne User:");
        println!("{}", serde_json::to_string_pretty(first)?);
    }

    if let Some(first) = channels.first().and_then(|c| db.channel_by_id(&c.id)) {
        println!("\nOne Group:");
        println!("{}", serde_json::to_string_pretty(first)?);
    }

    println!("\nFind Users:");
    for user in db.find_users_like(&cli.user_query, cli.limit) {
        print_user(&user.id, user.resolved_name());
    }

    println!("\nFind Groups:");
    for channel in db.find_channels_like(&cli.channel_query, cli.limit) {
        print_channel(channel);
    }

    Ok(())
}

fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
