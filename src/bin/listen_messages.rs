//! Print every message inserted into one conversation until Ctrl-C.
//!
//! Usage: `listen_messages <conversation_id>`

use anyhow::Context;
use pair_chat::{connect_store, init_tracing, realtime::ChangeNotifier, state::Config};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let conversation_id: Uuid = std::env::args()
        .nth(1)
        .context("usage: listen_messages <conversation_id>")?
        .parse()
        .context("conversation_id must be a UUID")?;

    let config = Config::from_env()?;
    let notifier = ChangeNotifier::new(connect_store(&config).await?);

    let handle = notifier
        .listen(conversation_id, |message| {
            tracing::info!(
                "New message: {} from {} at {}: {}",
                message.id,
                message.sender_id,
                message.timestamp.to_rfc3339(),
                message.text
            );
        })
        .await?;

    tracing::info!("Listening for messages...");

    tokio::signal::ctrl_c().await?;
    handle.unsubscribe();

    Ok(())
}
