/*
 * Responsibility
 * - tokio runtime entry
 * - delegates to app::run() (no logic here)
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    gateway::app::run().await
}
