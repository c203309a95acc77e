#[cfg(test)]
mod tests {
    use hc_airctrl::*;
    use std::time::Duration;

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let yaml = r#"
devices:
  - name: Living room
    address: 192.168.1.20
"#;
        let settings: PlatformSettings = serde_yml::from_str(yaml).unwrap();
        assert_eq!(settings.timeout, Duration::from_millis(5000));
        assert_eq!(settings.devices.len(), 1);

        let device = &settings.devices[0];
        assert_eq!(device.name, "Living room");
        assert_eq!(device.address, "192.168.1.20");
        assert_eq!(device.protocol, AirProtocol::Http);
        assert!(!device.sleep_speed);
        assert!(!device.light_control);
    }

    #[test]
    fn test_settings_deserialize_full() {
        let yaml = r#"
timeout: 10000
devices:
  - name: Living room
    address: 192.168.1.20
    protocol: coap
    sleep_speed: true
    light_control: true
  - name: Bedroom
    address: 192.168.1.21
    protocol: plain_coap
"#;
        let settings: PlatformSettings = serde_yml::from_str(yaml).unwrap();
        assert_eq!(settings.timeout, Duration::from_millis(10_000));
        assert_eq!(settings.devices[0].protocol, AirProtocol::Coap);
        assert!(settings.devices[0].sleep_speed);
        assert!(settings.devices[0].light_control);
        assert_eq!(settings.devices[1].protocol, AirProtocol::PlainCoap);
        assert!(!settings.devices[1].sleep_speed);
    }

    #[test]
    fn test_unknown_protocol_is_rejected() {
        let yaml = r#"
devices:
  - name: Living room
    address: 192.168.1.20
    protocol: udp
"#;
        let result: Result<PlatformSettings, _> = serde_yml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_address_is_rejected() {
        let yaml = r#"
devices:
  - name: Living room
"#;
        let result: Result<PlatformSettings, _> = serde_yml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_settings_default() {
        let settings: PlatformSettings = serde_yml::from_str("{}").unwrap();
        assert_eq!(settings, PlatformSettings::default());
        assert!(settings.devices.is_empty());
    }

    #[test]
    fn test_device_config_builder() {
        let config = DeviceConfig::new("Living room", "192.168.1.20")
            .protocol(AirProtocol::Coap)
            .sleep_speed(true)
            .light_control(true);
        assert_eq!(config.protocol, AirProtocol::Coap);
        assert!(config.sleep_speed);
        assert!(config.light_control);
    }
}
