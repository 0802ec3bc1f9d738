// lib.rs
#![warn(clippy::large_futures)]

pub use std::{
    net,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

pub use anyhow::bail;
pub use log::*;
pub use serde::{Deserialize, Serialize};
pub use tokio::{
    sync::RwLock,
    time::{sleep, Duration},
};

mod thermistor;
pub use thermistor::*;

mod color;
pub use color::*;

mod store;
pub use store::*;

mod view;
pub use view::*;

mod config;
pub use config::*;

mod state;
pub use state::*;

mod tasks;
pub use tasks::*;

mod apiserver;
pub use apiserver::*;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone, Debug, Serialize)]
pub struct Uptime {
    pub uptime: u64,
    pub uptime_s: String,
}

/// Reading pushed by the device. Either a finished temperature or the raw
/// ADC code, which is converted here.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TempUpdate {
    pub temperature: Option<f64>,
    pub adc: Option<AdcCode>,
}

impl TempUpdate {
    /// Celsius to store, None for anything that is not a real reading.
    pub fn celsius(&self) -> Option<f64> {
        let t = match (self.temperature, self.adc) {
            (Some(t), _) => t,
            (None, Some(adc)) => adc_to_celsius(adc),
            (None, None) => return None,
        };
        if t.is_finite() && is_valid_temp(t) {
            Some(t)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ThresholdForm {
    #[serde(default)]
    pub threshold: String,
}


// EOF
