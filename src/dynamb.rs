//! Dynamb record model.
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::{Map, Value};

/// Field names that identify the reporting device or the reporting time.
/// Every other field of a dynamb is an observed property.
pub const RESERVED_FIELDS: [&str; 3] = ["deviceId", "deviceIdType", "timestamp"];

/// Device identifier type tag.
///
/// Dynamb feeds carry either a numeric type code or a named type. Both sides
/// of a comparison go through the canonical string form (the code's decimal
/// digits, or the name verbatim), which is also the form used in composite
/// device signatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceIdType {
    Code(u64),
    Name(String),
}

impl fmt::Display for DeviceIdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceIdType::Code(code) => write!(f, "{}", code),
            DeviceIdType::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for DeviceIdType {
    fn from(code: u64) -> Self {
        DeviceIdType::Code(code)
    }
}

impl From<&str> for DeviceIdType {
    fn from(name: &str) -> Self {
        DeviceIdType::Name(name.to_string())
    }
}

/// A dynamb is a point-in-time report of a device's dynamic ambient data.
///
/// `deviceId`, `deviceIdType` and `timestamp` identify the report; every
/// other named field is an observed property (batteryPercentage,
/// acceleration, ...), kept in a flattened name-to-value map so that
/// property names stay enumerable without a closed schema. Property values
/// are arbitrary JSON and are never inspected by filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dynamb {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id_type: Option<DeviceIdType>,
    /// Reporting time, in epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Dynamb {
    pub fn new(device_id: &str, device_id_type: impl Into<DeviceIdType>) -> Self {
        Dynamb {
            device_id: Some(device_id.to_string()),
            device_id_type: Some(device_id_type.into()),
            timestamp: None,
            properties: Map::new(),
        }
    }

    /// specify a reporting time
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// add an observed property
    pub fn with_property(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    /// Composite `deviceId/deviceIdType` signature key.
    ///
    /// [None] unless both identifying fields are present: an incomplete
    /// signature never equals any accepted one.
    pub fn signature(&self) -> Option<String> {
        match (&self.device_id, &self.device_id_type) {
            (Some(id), Some(id_type)) => Some(format!("{}/{}", id, id_type)),
            _ => None,
        }
    }

    /// Names of the observed properties, excluding the reserved fields
    /// even if a caller put one of those names into the map directly.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties
            .keys()
            .map(String::as_str)
            .filter(|name| !RESERVED_FIELDS.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DeviceIdType, Dynamb};

    #[test]
    fn deserialize_flattens_properties() {
        let d: Dynamb = serde_json::from_value(json!({
            "deviceId": "aa:bb:cc:dd:ee:ff",
            "deviceIdType": 2,
            "timestamp": 1672531200000u64,
            "batteryPercentage": 95,
            "acceleration": [0.0, 0.0, 1.0]
        }))
        .unwrap();

        assert_eq!(d.device_id.as_deref(), Some("aa:bb:cc:dd:ee:ff"));
        assert_eq!(d.device_id_type, Some(DeviceIdType::Code(2)));
        assert_eq!(d.timestamp, Some(1672531200000));
        assert_eq!(d.properties.len(), 2);
        assert!(d.properties.contains_key("batteryPercentage"));
    }

    #[test]
    fn serialize_uses_camel_case_names() {
        let d = Dynamb::new("aa:bb:cc", 2u64).with_timestamp(1000);
        let v = serde_json::to_value(&d).unwrap();

        assert_eq!(
            v,
            json!({"deviceId": "aa:bb:cc", "deviceIdType": 2, "timestamp": 1000})
        );
    }

    #[test]
    fn signature_uses_canonical_id_type() {
        let numeric = Dynamb::new("aa:bb:cc", 2u64);
        let named = Dynamb::new("aa:bb:cc", "EUI-48");

        assert_eq!(numeric.signature().unwrap(), "aa:bb:cc/2");
        assert_eq!(named.signature().unwrap(), "aa:bb:cc/EUI-48");
    }

    #[test]
    fn signature_requires_both_fields() {
        let mut d = Dynamb::new("aa:bb:cc", 2u64);
        d.device_id_type = None;

        assert_eq!(d.signature(), None);
        assert_eq!(Dynamb::default().signature(), None);
    }

    #[test]
    fn property_names_skip_reserved_fields() {
        let mut d = Dynamb::new("aa:bb:cc", 2u64)
            .with_property("temperature", 21.5)
            .with_property("batteryPercentage", 95);
        d.properties.insert("timestamp".to_string(), json!(0));

        let mut names: Vec<&str> = d.property_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["batteryPercentage", "temperature"]);
    }
}
