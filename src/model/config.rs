use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Wire protocol spoken by a device. Anything outside this set is rejected
/// when the configuration is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirProtocol {
    #[default]
    Http,
    Coap,
    PlainCoap,
}

/// Per-device configuration record. Immutable for the lifetime of a device
/// session; replacing it goes through [`SessionStore::add`](crate::SessionStore::add).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub protocol: AirProtocol,
    /// Device variant flag: changes the fan speed step encoding and enables
    /// the dedicated sleep speed code.
    #[serde(default)]
    pub sleep_speed: bool,
    /// Whether the device exposes the auxiliary light/button controls.
    #[serde(default)]
    pub light_control: bool,
}

impl DeviceConfig {
    // Builder methods

    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            protocol: AirProtocol::default(),
            sleep_speed: false,
            light_control: false,
        }
    }

    pub fn protocol(mut self, protocol: AirProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn sleep_speed(mut self, sleep_speed: bool) -> Self {
        self.sleep_speed = sleep_speed;
        self
    }

    pub fn light_control(mut self, light_control: bool) -> Self {
        self.light_control = light_control;
        self
    }
}

/// The validated configuration record set the session store is synchronized
/// against.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlatformSettings {
    /// Transport timeout handed to the client factory, milliseconds on the
    /// wire.
    #[serde(default = "default_timeout", deserialize_with = "timeout_millis")]
    pub timeout: Duration,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            devices: Vec::new(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_millis(5000)
}

fn timeout_millis<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    let millis = u64::deserialize(d)?;
    Ok(Duration::from_millis(millis))
}
