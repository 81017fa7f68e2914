// Gateway data model
//
// The `/ajax` payload is a loosely typed nested array. Groups are decoded
// first; a group's `objects` stay raw JSON until the group is known to hold
// devices. Device entries are then decoded into the `Raw*` structs, which fail
// loudly on a shape mismatch, and mapped into the flat `Device` model.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Alias of the pseudo-group that never holds window coverings.
pub const SYSTEM_GROUP: &str = "System";

/// Attribute carrying the user-facing device name.
pub const ATTR_USER_NAME: &str = "__user_name";
/// Attribute carrying the manufacturer name.
pub const ATTR_MANUFACTURER: &str = "manufacturer_name";
pub const ATTR_LEVEL: &str = "level";
pub const ATTR_ANGLE: &str = "angle";
pub const ATTR_STATUS: &str = "status";
pub const ATTR_PRESENT: &str = "present";
pub const ATTR_PRODUCT: &str = "product_name";
pub const ATTR_ALERT: &str = "alert_message";

// ── Raw vendor payload ───────────────────────────────────────────────

/// One group of the `/ajax` payload's first element.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGroup {
    pub alias: String,
    #[serde(default)]
    pub isconnected: bool,
    /// Decoded lazily: the `System` group carries entries of its own shape.
    #[serde(default)]
    pub objects: Option<serde_json::Value>,
}

/// A device entry inside a group.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObject {
    pub id: i64,
    pub gw: String,
    /// Spelled `statuss` on the wire.
    #[serde(rename = "statuss")]
    pub statuses: Vec<RawStatus>,
}

/// A hierarchical status path and its value.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStatus {
    pub statusname: String,
    pub status: String,
}

// ── Device ───────────────────────────────────────────────────────────

/// Identifies a device for action calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceTarget {
    pub id: i64,
    #[serde(rename = "gw")]
    pub gateway_id: String,
}

impl DeviceTarget {
    pub fn new(id: i64, gateway_id: impl Into<String>) -> Self {
        Self {
            id,
            gateway_id: gateway_id.into(),
        }
    }
}

/// Reported motion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionStatus {
    Up,
    Down,
}

impl fmt::Display for MotionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

/// A window covering attached to a gateway.
///
/// `name` and `manufacturer` are read from `attributes` on demand, so they
/// always agree with the attribute map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: i64,
    pub gateway_id: String,
    pub attributes: IndexMap<String, String>,
}

impl Device {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.attribute(ATTR_USER_NAME)
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.attribute(ATTR_MANUFACTURER)
    }

    pub fn product_name(&self) -> Option<&str> {
        self.attribute(ATTR_PRODUCT)
    }

    pub fn alert_message(&self) -> Option<&str> {
        self.attribute(ATTR_ALERT).filter(|m| !m.is_empty())
    }

    /// Current position, 0 (closed) to 100 (open).
    pub fn position(&self) -> Option<u8> {
        self.attribute(ATTR_LEVEL)
            .and_then(|v| v.trim().parse::<u8>().ok())
            .filter(|v| *v <= 100)
    }

    /// Current tilt angle in degrees, for tilt-capable devices.
    pub fn tilt_angle(&self) -> Option<i32> {
        self.attribute(ATTR_ANGLE)
            .and_then(|v| v.trim().parse().ok())
    }

    pub fn supports_tilt(&self) -> bool {
        self.attributes.contains_key(ATTR_ANGLE)
    }

    pub fn motion_status(&self) -> Option<MotionStatus> {
        match self.attribute(ATTR_STATUS)? {
            "up" => Some(MotionStatus::Up),
            "down" => Some(MotionStatus::Down),
            _ => None,
        }
    }

    /// `None` when the gateway does not report presence.
    pub fn is_present(&self) -> Option<bool> {
        match self.attribute(ATTR_PRESENT)? {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        }
    }

    pub fn target(&self) -> DeviceTarget {
        DeviceTarget::new(self.id, self.gateway_id.clone())
    }
}

impl From<RawObject> for Device {
    fn from(raw: RawObject) -> Self {
        Self {
            id: raw.id,
            gateway_id: raw.gw,
            attributes: flatten_statuses(raw.statuses),
        }
    }
}

impl Serialize for Device {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Device", 5)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("gw", &self.gateway_id)?;
        s.serialize_field("name", &self.name())?;
        s.serialize_field("manufacturer", &self.manufacturer())?;
        s.serialize_field("kv", &self.attributes)?;
        s.end()
    }
}

// ── Mapping ──────────────────────────────────────────────────────────

/// Attribute key of a status path: its last `/`-delimited segment.
///
/// Paths without a `/`, or ending in one, have no key.
pub fn attribute_key(statusname: &str) -> Option<&str> {
    let (_, last) = statusname.rsplit_once('/')?;
    (!last.is_empty()).then_some(last)
}

/// Flatten status pairs into an attribute map. Pairs without a key are
/// dropped; a repeated key keeps its first position and its last value.
pub fn flatten_statuses(statuses: Vec<RawStatus>) -> IndexMap<String, String> {
    let mut attributes = IndexMap::with_capacity(statuses.len());
    for s in statuses {
        if let Some(key) = attribute_key(&s.statusname) {
            attributes.insert(key.to_owned(), s.status);
        }
    }
    attributes
}

/// Map decoded groups to devices, in server order.
///
/// The `System` group is skipped without looking at its contents, as are
/// groups without an `objects` array. Every other group's objects must be
/// well-formed device entries.
pub fn devices_from_groups(groups: Vec<RawGroup>) -> Result<Vec<Device>, serde_json::Error> {
    let mut devices = Vec::new();
    for group in groups.into_iter().filter(|g| g.alias != SYSTEM_GROUP) {
        let Some(objects) = group.objects else {
            continue;
        };
        let objects: Vec<RawObject> = serde_json::from_value(objects)?;
        devices.extend(objects.into_iter().map(Device::from));
    }
    Ok(devices)
}
