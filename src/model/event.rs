/// Characteristic confirmations pushed to the presentation layer. Sessions
/// emit these after writes (optimistic values) and from the settle timer
/// (debounced fan speed), tagged with the device address they belong to.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    PurifierStateChanged { address: String, state: u8 },
    TargetModeChanged { address: String, auto: bool },
    FanSpeedChanged { address: String, speed: u32 },
    LightsOnChanged { address: String, on: bool },
    LightsBrightnessChanged { address: String, brightness: u32 },
    ButtonsOnChanged { address: String, on: bool },
}

impl DeviceEvent {
    pub fn address(&self) -> &str {
        match self {
            DeviceEvent::PurifierStateChanged { address, .. }
            | DeviceEvent::TargetModeChanged { address, .. }
            | DeviceEvent::FanSpeedChanged { address, .. }
            | DeviceEvent::LightsOnChanged { address, .. }
            | DeviceEvent::LightsBrightnessChanged { address, .. }
            | DeviceEvent::ButtonsOnChanged { address, .. } => address,
        }
    }
}
