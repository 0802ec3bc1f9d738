// view.rs

use chrono::{DateTime, Local, Utc};

use crate::*;

pub const NO_VALUE: &str = "--";

pub const STATUS_WAITING: &str = "Connected. Waiting for data...";
pub const STATUS_LIVE: &str = "Live";
pub const STATUS_NO_DATA: &str = "No numeric data";
pub const THRESHOLD_MISSING: &str = "No threshold value in DB";

/// One decimal, like the readout on the page.
pub fn fmt_temp(t: f64) -> String {
    format!("{t:.1}")
}

/// What the dashboard shows for the live reading.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TempView {
    pub temperature: Option<f64>,
    pub display: String,
    pub status: String,
    pub last_update: String,
}

impl TempView {
    pub fn new(sensor: &SensorData) -> Self {
        let last_update = match DateTime::<Utc>::from_timestamp_millis(sensor.timestamp) {
            Some(ts) if sensor.timestamp > 0 => {
                format!("Last update: {}", ts.with_timezone(&Local).format("%H:%M:%S"))
            }
            _ => "-".to_string(),
        };

        match sensor.temperature {
            Some(t) if t.is_finite() => TempView {
                temperature: Some(t),
                display: fmt_temp(t),
                status: STATUS_LIVE.into(),
                last_update,
            },
            _ => TempView {
                temperature: None,
                display: NO_VALUE.into(),
                status: if !sensor.received {
                    STATUS_WAITING.into()
                } else {
                    STATUS_NO_DATA.into()
                },
                last_update,
            },
        }
    }
}

/// Device config as the browser edits it: threshold back in Celsius.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    #[serde(flatten)]
    pub config: DeviceConfig,
    pub threshold_c: String,
    pub threshold_status: String,
    pub normal_css: String,
    pub alert_css: String,
}

impl ConfigView {
    pub fn new(config: &DeviceConfig) -> Self {
        let (threshold_c, threshold_status) = match config.threshold {
            Some(adc) => (fmt_temp(adc_to_celsius(adc)), String::new()),
            None => (String::new(), THRESHOLD_MISSING.to_string()),
        };
        ConfigView {
            config: *config,
            threshold_c,
            threshold_status,
            normal_css: config.normal().to_string(),
            alert_css: config.alert().to_string(),
        }
    }
}


// EOF
