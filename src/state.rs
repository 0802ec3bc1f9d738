// state.rs

use crate::*;

pub struct DashState {
    pub config: DashConfig,
    pub store: Store,
    pub api_cnt: AtomicU32,
    pub uptime: RwLock<u64>,
}

impl DashState {
    pub fn new(config: DashConfig, store: Store) -> Self {
        DashState {
            config,
            store,
            api_cnt: AtomicU32::new(0),
            uptime: RwLock::new(0),
        }
    }
}

pub fn uptime_str(secs: u64) -> String {
    let days = secs / 86400;
    let hours = secs % 86400 / 3600;
    let mins = secs % 3600 / 60;
    let secs = secs % 60;
    if days > 0 {
        format!("{days}d {hours:02}:{mins:02}:{secs:02}")
    } else {
        format!("{hours:02}:{mins:02}:{secs:02}")
    }
}


// EOF
