pub mod routes;
pub mod types;
mod store;

use crate::store::{MemoryStore, Store};
use config::Config;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Debug, Deserialize, PartialEq)]
pub struct Args {
    log_level: String,
    port: u16,
    database_url: Option<String>,
}

/// Defaults, then `setup.toml` if present, then the environment.
fn load_args() -> Result<Args, handle_errors::Error> {
    Config::builder()
        .set_default("log_level", "info")
        .and_then(|builder| builder.set_default("port", 3030))
        .map_err(handle_errors::Error::ConfigurationError)?
        .add_source(config::File::with_name("setup").required(false))
        .add_source(config::Environment::default())
        .build()
        .and_then(|config| config.try_deserialize::<Args>())
        .map_err(handle_errors::Error::ConfigurationError)
}

#[tokio::main]
async fn main() -> Result<(), handle_errors::Error> {
    dotenv::dotenv().ok();
    let config = load_args()?;

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!(
            "handle_errors={},notes_api={},warp={}",
            config.log_level, config.log_level, config.log_level
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let store = match config.database_url {
        Some(ref db_url) => Store::postgres(db_url).await?,
        None => {
            info!("no database_url configured, serving sample notes from memory");
            Store::new(MemoryStore::seeded())
        }
    };

    let routes = routes::notes_api(store);

    info!("server running on port: {}", config.port);
    warp::serve(routes).run(([0, 0, 0, 0], config.port)).await;

    Ok(())
}
