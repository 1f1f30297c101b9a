//! AID registry server binary.
//!
//! Configuration comes from `AIDREG_*` environment variables; see
//! [`ServerConfig`].

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use aidreg::{create_router, AppState, LocalSigner, RegistryService, ServerConfig, StaticResolver};
use aidreg_store::MemoryRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("invalid configuration")?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let resolver = match &config.identities {
        Some(path) => StaticResolver::from_file(path)?,
        None => StaticResolver::new(),
    }
    .with_basic_self_resolution(config.self_resolve);

    let signer = LocalSigner::from_keypair(config.server_keypair());

    let service = RegistryService::new(
        Arc::new(MemoryRegistry::new()),
        Arc::new(resolver),
        Arc::new(signer),
    )
    .with_config(config.service);

    info!(
        server_aid = %service.server_aid(),
        bind = %config.bind,
        self_resolve = config.self_resolve,
        seeded = config.server_seed.is_some(),
        "Starting AID registry"
    );

    let app = create_router(Arc::new(AppState::new(service)));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, "AID registry listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
