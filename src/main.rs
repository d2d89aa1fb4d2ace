//! Order log maintenance tool: load the log, list what it holds, optionally
//! rewrite it in place from the parsed records.

use anyhow::Result;
use orderlog::{OrderStore, DEFAULT_ORDERS_FILE};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = std::env::var("ORDERS_FILE").unwrap_or_else(|_| DEFAULT_ORDERS_FILE.to_string());
    let store = OrderStore::open(path.as_str())?;

    for order in store.all_orders() {
        println!("{order}");
        println!();
    }
    tracing::info!("{} orders in {}", store.len(), path);

    if std::env::args().any(|arg| arg == "--rebuild") {
        store.rebuild()?;
        tracing::info!("order log rebuilt from parsed records");
    }
    Ok(())
}
