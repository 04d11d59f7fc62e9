//! Meilisearch toolbox server.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    toolbox::run().await
}
