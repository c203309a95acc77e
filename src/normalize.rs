use crate::{FilterState, Filters, Firmware, LightState, RawFilters, RawFirmware, RawStatus, Status};

/// Filter cycle lengths per slot, used to derive the remaining life
/// percentage from the raw counters.
const PRE_FILTER_CYCLE: u32 = 360;
const ACTIVE_CARBON_CYCLE: u32 = 2400;
const HEPA_CYCLE: u32 = 4800;

/// Fan speed step encoding. Variant devices with a dedicated sleep speed use
/// 5 steps of 20 with the lowest step shifted onto the 's' code; all others
/// use 4 steps of 25.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedEncoding {
    pub divisor: u32,
    pub offset: u32,
}

impl SpeedEncoding {
    pub fn for_device(sleep_speed: bool) -> Self {
        if sleep_speed {
            Self {
                divisor: 20,
                offset: 1,
            }
        } else {
            Self {
                divisor: 25,
                offset: 0,
            }
        }
    }
}

/// Raw fan speed write derived from a 0-100 target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanSpeedWrite {
    /// Code to send as `om`.
    pub om: String,
    /// The speed the device will actually settle on, reported by the
    /// delayed confirmation.
    pub settled: u32,
}

/// Encodes a 0-100 speed target into the raw `om` code. Returns `None` for
/// a zero step, in which case no write is issued at all.
pub fn encode_fan_speed(target: u32, encoding: SpeedEncoding) -> Option<FanSpeedWrite> {
    let speed = target.div_ceil(encoding.divisor);
    if speed == 0 {
        return None;
    }
    let om = if encoding.offset == 1 && speed == 1 {
        "s".to_string()
    } else if speed < 4 + encoding.offset {
        (speed - encoding.offset).to_string()
    } else {
        "t".to_string()
    };
    Some(FanSpeedWrite {
        om,
        settled: speed * encoding.divisor,
    })
}

/// Read-direction fan speed. Only meaningful while the device is powered on
/// and in manual mode; otherwise reads as 0. Unknown codes fall through the
/// numeric branch best-effort.
pub fn fan_speed_from_code(om: &str, power: bool, auto_mode: bool, encoding: SpeedEncoding) -> u32 {
    if !power || auto_mode {
        return 0;
    }
    match om {
        "t" => 100,
        "s" => 20,
        code => {
            let level = code.parse::<u32>().unwrap_or(0);
            (level + encoding.offset) * encoding.divisor
        }
    }
}

pub fn air_quality_index(iaql: u32) -> u32 {
    iaql.div_ceil(3)
}

pub fn normalize_status(raw: &RawStatus, encoding: SpeedEncoding, light_control: bool) -> Status {
    let auto_mode = raw.mode != "M";
    Status {
        power: raw.pwr,
        auto_mode,
        purifier_state: if raw.pwr { 2 } else { 0 },
        locked: raw.cl,
        fan_speed: fan_speed_from_code(&raw.om, raw.pwr, auto_mode, encoding),
        air_quality: air_quality_index(raw.iaql),
        pm25: raw.pm25,
        lights: light_control.then(|| LightState {
            on: raw.aqil > 0,
            brightness: raw.aqil,
            buttons_on: raw.uil,
        }),
    }
}

pub fn normalize_firmware(raw: &RawFirmware) -> Firmware {
    Firmware {
        model: raw.name.replacen('_', "/", 1),
        version: raw.version.clone(),
    }
}

pub fn normalize_filters(raw: &RawFilters) -> Filters {
    Filters {
        pre_filter: filter_state(raw.fltsts0, PRE_FILTER_CYCLE),
        active_carbon: filter_state(raw.fltsts2, ACTIVE_CARBON_CYCLE),
        hepa: filter_state(raw.fltsts1, HEPA_CYCLE),
    }
}

fn filter_state(counter: u32, cycle: u32) -> FilterState {
    FilterState {
        change_needed: counter == 0,
        life_percent: counter as f64 / cycle as f64 * 100.0,
    }
}
