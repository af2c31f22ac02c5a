use std::sync::Arc;

use rydes::auth::ClaimsHeaderAuthenticator;
use rydes::config::{Config, StoreBackend};
use rydes::db::{MemoryRideStore, PgRideStore, RideStore};
use rydes::engine::{Engine, RandomDispatcher, SeededSource, StaticRoster, ThreadRngSource};
use rydes::error::Error;
use rydes::server::{router, serve};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let store: Arc<dyn RideStore + Send + Sync> = match &config.store {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory ride store, rides are lost on restart");
            Arc::new(MemoryRideStore::new())
        }
        StoreBackend::Postgres {
            database_url,
            max_connections,
            table,
        } => Arc::new(PgRideStore::new(database_url, *max_connections, table).await?),
    };

    let roster = StaticRoster::new(config.roster.clone());
    tracing::info!("loaded roster of {} drivers", roster.len());

    let dispatcher = match config.selection_seed {
        Some(seed) => RandomDispatcher::new(roster, SeededSource::new(seed)),
        None => RandomDispatcher::new(roster, ThreadRngSource),
    };

    let engine = Engine::new(store, dispatcher).with_eta(&config.eta);
    let authenticator = ClaimsHeaderAuthenticator::new(&config.claims_header);

    serve(router(engine, authenticator), config.bind_address).await;

    Ok(())
}
