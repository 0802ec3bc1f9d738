// bin/tempdash.rs

#![warn(clippy::large_futures)]

use std::path::PathBuf;

use tempdash::*;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Hello.");
    info!("Starting up tempdash v{APP_VERSION}.");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = DashConfig::load(config_path.as_deref())?;
    info!("My config:\n{config:#?}");

    #[cfg(feature = "reset_settings")]
    let store = {
        let s = Store::default();
        s.snapshot().to_file(&config.store_file)?;
        s
    };

    #[cfg(not(feature = "reset_settings"))]
    let store = Store::open(&config.store_file);
    info!("Store contents:\n{:#?}", store.snapshot());

    let shared_state = Arc::new(DashState::new(config, store));

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(Box::pin(async {
            info!("Entering main loop...");
            tokio::select! {
                _ = Box::pin(poll_uptime(shared_state.clone())) => { info!("poll_uptime() ended."); }
                _ = Box::pin(run_flusher(shared_state.clone())) => { error!("run_flusher() ended."); }
                _ = Box::pin(watch_store(shared_state.clone())) => { error!("watch_store() ended."); }
                r = Box::pin(run_api_server(shared_state.clone())) => { error!("run_api_server() ended: {r:?}"); }
                _ = Box::pin(wait_ctrl_c(shared_state.clone())) => { info!("Shutting down."); }
            };
        }));

    shared_state.store.flush(&shared_state.config.store_file)?;
    info!("main() finished.");
    Ok(())
}

// EOF
