// tasks.rs

use crate::*;

const UPTIME_TICK: u64 = 2;

pub async fn poll_uptime(state: Arc<DashState>) -> anyhow::Result<()> {
    let mut uptime: u64 = 0;
    loop {
        sleep(Duration::from_secs(UPTIME_TICK)).await;

        uptime += UPTIME_TICK;
        *state.uptime.write().await = uptime;
    }
}

pub async fn run_flusher(state: Arc<DashState>) -> anyhow::Result<()> {
    let delay = state.config.flush_delay;
    loop {
        sleep(Duration::from_secs(delay)).await;

        if let Err(e) = state.store.flush(&state.config.store_file) {
            // keep serving, the next round retries
            error!("Store flush failed: {e:?}");
        }
    }
}

/// Log every published snapshot at debug level.
pub async fn watch_store(state: Arc<DashState>) -> anyhow::Result<()> {
    let mut rx = state.store.subscribe();
    while rx.changed().await.is_ok() {
        let snap = *rx.borrow_and_update();
        debug!("Store updated: {snap:?}");
    }
    bail!("store channel closed")
}

/// Completes on ctrl-c, which ends the task select in main.
pub async fn wait_ctrl_c(state: Arc<DashState>) -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    let uptime = *state.uptime.read().await;
    info!("Got ctrl-c after {}.", uptime_str(uptime));
    Ok(())
}


// EOF
