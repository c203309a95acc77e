use serde::Serialize;

/// Normalized device status consumed by the presentation layer. Derived once
/// per fetch from a [`RawStatus`](crate::RawStatus) record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub power: bool,
    /// true when any non-manual work mode is active (raw mode != 'M').
    pub auto_mode: bool,
    /// Purifier current state, 0 when off and 2 when purifying.
    pub purifier_state: u8,
    pub locked: bool,
    /// Fan speed 0-100. Reads 0 while a non-manual mode is active or the
    /// device is powered off.
    pub fan_speed: u32,
    /// Air quality index, ceil(iaql / 3).
    pub air_quality: u32,
    pub pm25: f64,
    /// Present only for devices with the auxiliary light/button controls.
    pub lights: Option<LightState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LightState {
    pub on: bool,
    pub brightness: u32,
    pub buttons_on: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Firmware {
    pub model: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterState {
    pub change_needed: bool,
    pub life_percent: f64,
}

/// Wear state of the three filter slots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Filters {
    pub pre_filter: FilterState,
    pub active_carbon: FilterState,
    pub hepa: FilterState,
}
