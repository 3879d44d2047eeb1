//! Provisioned configuration store.
//!
//! Reads a postcard-encoded [`SystemConfig`] blob written at provisioning
//! time. Only configuration lives here; indicator and trigger state always
//! start fresh after a reset.
//!
//! - **`target_os = "espidf"`**: NVS namespace `tricolor`, key `syscfg`.
//! - **`not(target_os = "espidf")`**: an in-memory blob for host tests.
//!
//! A missing, oversized, corrupted, or out-of-range blob falls back to
//! [`SystemConfig::default`].

use log::{info, warn};

use crate::config::SystemConfig;
use crate::error::Error;

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

const CONFIG_NAMESPACE: &str = "tricolor";
const CONFIG_KEY: &str = "syscfg";

/// Largest blob accepted from storage.
pub const MAX_BLOB_SIZE: usize = 256;

pub struct ConfigStore {
    #[cfg(target_os = "espidf")]
    nvs: EspNvs<NvsDefault>,
    #[cfg(not(target_os = "espidf"))]
    blob: Option<Vec<u8>>,
}

#[cfg(target_os = "espidf")]
impl ConfigStore {
    /// Open the configuration namespace read-only.
    pub fn open(partition: EspDefaultNvsPartition) -> Result<Self, Error> {
        let nvs = EspNvs::new(partition, CONFIG_NAMESPACE, false)
            .map_err(|_| Error::Init("NVS namespace open failed"))?;
        info!("ConfigStore: NVS namespace '{}' opened", CONFIG_NAMESPACE);
        Ok(Self { nvs })
    }

    fn read_blob<'a>(&self, buf: &'a mut [u8]) -> Result<Option<&'a [u8]>, Error> {
        self.nvs
            .get_raw(CONFIG_KEY, buf)
            .map_err(|_| Error::Config("stored configuration unreadable"))
    }
}

#[cfg(not(target_os = "espidf"))]
impl ConfigStore {
    /// Empty store: [`load`](Self::load) yields defaults.
    pub fn open() -> Result<Self, Error> {
        info!("ConfigStore: simulation backend");
        Ok(Self { blob: None })
    }

    /// Store holding `bytes` as the provisioned blob.
    pub fn with_blob(bytes: &[u8]) -> Self {
        Self {
            blob: Some(bytes.to_vec()),
        }
    }

    fn read_blob<'a>(&self, buf: &'a mut [u8]) -> Result<Option<&'a [u8]>, Error> {
        match &self.blob {
            None => Ok(None),
            Some(bytes) if bytes.len() > buf.len() => {
                Err(Error::Config("stored configuration too large"))
            }
            Some(bytes) => {
                let out = &mut buf[..bytes.len()];
                out.copy_from_slice(bytes);
                Ok(Some(out))
            }
        }
    }
}

impl ConfigStore {
    /// Decode and validate the stored blob. `Ok(None)` when nothing has
    /// been provisioned.
    pub fn load(&self) -> Result<Option<SystemConfig>, Error> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        match self.read_blob(&mut buf)? {
            Some(bytes) => SystemConfig::from_postcard(bytes).map(Some),
            None => Ok(None),
        }
    }

    /// [`load`](Self::load), falling back to defaults on any failure.
    pub fn load_or_default(&self) -> SystemConfig {
        match self.load() {
            Ok(Some(cfg)) => {
                info!("ConfigStore: provisioned config loaded");
                cfg
            }
            Ok(None) => {
                info!("ConfigStore: no stored config, using defaults");
                SystemConfig::default()
            }
            Err(e) => {
                warn!("ConfigStore: {}, using defaults", e);
                SystemConfig::default()
            }
        }
    }
}
