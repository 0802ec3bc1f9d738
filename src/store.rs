// store.rs

use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::bail;
use chrono::Utc;
use crc::{Crc, CRC_32_ISCSI};
use log::*;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{AdcCode, Rgb};

pub const STORE_BUF_SIZE: usize = 256;

/// Latest value pushed by the device under `sensor/temperature`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    /// None when the device reported something that is not a number.
    pub temperature: Option<f64>,
    /// Milliseconds since epoch of the last numeric push, 0 if none yet.
    pub timestamp: i64,
    /// Set by the first push, numeric or not.
    pub received: bool,
}

/// Device settings kept under `config/`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    pub threshold: Option<AdcCode>,
    pub normal_r: u8,
    pub normal_g: u8,
    pub normal_b: u8,
    pub alert_r: u8,
    pub alert_g: u8,
    pub alert_b: u8,
}

impl DeviceConfig {
    pub fn normal(&self) -> Rgb {
        Rgb::new(self.normal_r, self.normal_g, self.normal_b)
    }

    pub fn alert(&self) -> Rgb {
        Rgb::new(self.alert_r, self.alert_g, self.alert_b)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sensor: SensorData,
    pub config: DeviceConfig,
}

impl Snapshot {
    pub fn from_bytes(b: &[u8]) -> Option<Self> {
        let crc = Crc::<u32>::new(&CRC_32_ISCSI);
        let digest = crc.digest();
        match postcard::from_bytes_crc32::<Snapshot>(b, digest) {
            Ok(s) => Some(s),
            Err(e) => {
                error!("Cannot parse store snapshot: {e:?}");
                None
            }
        }
    }

    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let mut buf = [0u8; STORE_BUF_SIZE];
        let crc = Crc::<u32>::new(&CRC_32_ISCSI);
        let digest = crc.digest();
        match postcard::to_slice_crc32(self, &mut buf, digest) {
            Ok(d) => Ok(d.to_vec()),
            Err(e) => bail!("Cannot encode snapshot to buffer {e:?}"),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        info!("Reading store from {path:?}...");
        let b = match fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                error!("Store read error {e:?}");
                return None;
            }
        };
        info!("Got {sz} bytes. Parsing snapshot...", sz = b.len());
        let s = Self::from_bytes(&b)?;
        info!("Successfully parsed store snapshot.");
        Some(s)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let data = self.to_bytes()?;
        info!("Encoded snapshot to {sz} bytes. Saving to {path:?}...", sz = data.len());

        // write aside, then rename over the old file
        let tmp = path.with_extension("tmp");
        if let Err(e) = fs::write(&tmp, &data) {
            bail!("Cannot write {tmp:?}: {e:?}");
        }
        if let Err(e) = fs::rename(&tmp, path) {
            bail!("Cannot rename {tmp:?} to {path:?}: {e:?}");
        }
        info!("Store saved.");
        Ok(())
    }
}

/// Realtime key-value store shared by the dashboard and the device.
///
/// Every write publishes a fresh [`Snapshot`] to all subscribers and marks
/// the store dirty until the next [`Store::flush`].
pub struct Store {
    tx: watch::Sender<Snapshot>,
    dirty: AtomicBool,
}

impl Store {
    pub fn new(initial: Snapshot) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Store {
            tx,
            dirty: AtomicBool::new(false),
        }
    }

    /// Load from `path`, falling back to an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        match Snapshot::from_file(path) {
            Some(s) => Self::new(s),
            None => {
                error!("Could not read store, starting empty");
                Self::new(Snapshot::default())
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    fn modify<F: FnOnce(&mut Snapshot)>(&self, f: F) {
        self.tx.send_modify(f);
        self.dirty.store(true, Ordering::Relaxed);
    }

    /// A non-numeric push clears the reading but keeps the last update time.
    pub fn set_temperature(&self, temperature: Option<f64>) {
        let now = Utc::now().timestamp_millis();
        self.modify(|s| {
            s.sensor.temperature = temperature;
            s.sensor.received = true;
            if temperature.is_some() {
                s.sensor.timestamp = now;
            }
        });
    }

    pub fn set_threshold(&self, adc: AdcCode) {
        info!("Threshold set to {adc}");
        self.modify(|s| s.config.threshold = Some(adc));
    }

    pub fn update_normal(&self, c: Rgb) {
        info!("Normal color set to {c}");
        self.modify(|s| {
            s.config.normal_r = c.r;
            s.config.normal_g = c.g;
            s.config.normal_b = c.b;
        });
    }

    pub fn update_alert(&self, c: Rgb) {
        info!("Alert color set to {c}");
        self.modify(|s| {
            s.config.alert_r = c.r;
            s.config.alert_g = c.g;
            s.config.alert_b = c.b;
        });
    }

    /// Persist to `path` if anything changed since the last flush.
    pub fn flush<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<bool> {
        if !self.dirty.swap(false, Ordering::Relaxed) {
            return Ok(false);
        }
        let snap = self.snapshot();
        if let Err(e) = snap.to_file(path) {
            self.dirty.store(true, Ordering::Relaxed);
            return Err(e);
        }
        Ok(true)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}


// EOF
