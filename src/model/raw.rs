use serde::{Deserialize, Serialize};

/// Status record as reported by the device. Field values arrive in whatever
/// representation the transport uses (numbers, booleans or numeric-looking
/// strings); the wire deserializers below coerce them once, on receipt.
/// Raw records are never mutated after that, normalization derives a
/// separate [`Status`](crate::Status) record from them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawStatus {
    #[serde(deserialize_with = "wire::flag")]
    pub pwr: bool,
    /// Work mode code, 'M' for manual speed control.
    pub mode: String,
    /// Fan speed code: 's', 't' or a decimal level.
    #[serde(deserialize_with = "wire::code")]
    pub om: String,
    #[serde(deserialize_with = "wire::flag")]
    pub cl: bool,
    #[serde(deserialize_with = "wire::uint")]
    pub iaql: u32,
    #[serde(deserialize_with = "wire::float")]
    pub pm25: f64,
    /// Display light level, 0-100.
    #[serde(deserialize_with = "wire::uint")]
    pub aqil: u32,
    /// Button backlight flag.
    #[serde(deserialize_with = "wire::flag")]
    pub uil: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawFirmware {
    pub name: String,
    pub version: String,
}

/// Remaining filter cycle counters, one per filter slot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawFilters {
    #[serde(deserialize_with = "wire::uint")]
    pub fltsts0: u32,
    #[serde(deserialize_with = "wire::uint")]
    pub fltsts1: u32,
    #[serde(deserialize_with = "wire::uint")]
    pub fltsts2: u32,
}

/// Partial raw update sent to the device. Unset fields are left out of the
/// payload so the device merges the patch into its current state.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ValuePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pwr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub om: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aqil: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uil: Option<String>,
}

impl ValuePatch {
    // Builder methods

    pub fn new() -> Self {
        Self::default()
    }

    pub fn power(mut self, on: bool) -> Self {
        self.pwr = Some(if on { "1" } else { "0" }.to_string());
        self
    }

    pub fn work_mode(mut self, code: impl Into<String>) -> Self {
        self.mode = Some(code.into());
        self
    }

    pub fn fan_code(mut self, code: impl Into<String>) -> Self {
        self.om = Some(code.into());
        self
    }

    pub fn lock(mut self, locked: bool) -> Self {
        self.cl = Some(locked);
        self
    }

    pub fn light_level(mut self, level: u32) -> Self {
        self.aqil = Some(level);
        self
    }

    pub fn buttons(mut self, on: bool) -> Self {
        self.uil = Some(if on { "1" } else { "0" }.to_string());
        self
    }
}

mod wire {
    use serde::de::{Deserializer, Error, Unexpected, Visitor};
    use std::fmt;

    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean, a 0/1 number or a '0'/'1' string")
        }

        fn visit_bool<E: Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_i64<E: Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<bool, E> {
            match v {
                "1" | "true" => Ok(true),
                "0" | "false" | "" => Ok(false),
                _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
            }
        }
    }

    pub(super) fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        d.deserialize_any(FlagVisitor)
    }

    struct UintVisitor;

    impl<'de> Visitor<'de> for UintVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an unsigned number or a numeric string")
        }

        fn visit_u64<E: Error>(self, v: u64) -> Result<u32, E> {
            u32::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_i64<E: Error>(self, v: i64) -> Result<u32, E> {
            u32::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: Error>(self, v: f64) -> Result<u32, E> {
            Ok(v.max(0.0) as u32)
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<u32, E> {
            v.trim()
                .parse()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    pub(super) fn uint<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        d.deserialize_any(UintVisitor)
    }

    struct FloatVisitor;

    impl<'de> Visitor<'de> for FloatVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or a numeric string")
        }

        fn visit_f64<E: Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_u64<E: Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_i64<E: Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<f64, E> {
            v.trim()
                .parse()
                .map_err(|_| E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    pub(super) fn float<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        d.deserialize_any(FloatVisitor)
    }

    struct CodeVisitor;

    impl<'de> Visitor<'de> for CodeVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a code string or a number")
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_u64<E: Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    pub(super) fn code<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        d.deserialize_any(CodeVisitor)
    }
}
