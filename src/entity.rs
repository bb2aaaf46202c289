use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::protocol::{DOMAIN, MANUFACTURER};
use crate::types::{Equipment, Thermostat};

/// Device registry entry for a thermostat or a piece of equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: (String, String),
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub sw_version: Option<String>,
    pub via_device: Option<(String, String)>,
}

impl DeviceInfo {
    pub fn for_thermostat(thermostat: &Thermostat) -> Self {
        Self {
            identifiers: (DOMAIN.to_string(), thermostat.id.clone()),
            name: thermostat_device_name(thermostat),
            manufacturer: MANUFACTURER.to_string(),
            model: thermostat.model.clone(),
            sw_version: thermostat.firmware_version.clone(),
            via_device: None,
        }
    }

    /// Equipment is registered under its thermostat.
    pub fn for_equipment(thermostat: &Thermostat, equipment: &Equipment) -> Self {
        Self {
            identifiers: (DOMAIN.to_string(), equipment.id.clone()),
            name: format!("{} {}", thermostat.name, equipment.name),
            manufacturer: MANUFACTURER.to_string(),
            model: equipment.model.clone(),
            sw_version: equipment.firmware_version.clone(),
            via_device: Some((DOMAIN.to_string(), thermostat.id.clone())),
        }
    }
}

pub fn thermostat_device_name(thermostat: &Thermostat) -> String {
    format!("{} Thermostat", thermostat.name)
}

/// Format of entity unique ids. Entries created before the key-based format
/// keep the name-based ids so existing entities are not orphaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum UidSchema {
    Legacy,
    V1,
}

impl UidSchema {
    pub fn sensor_unique_id(&self, device_id: &str, key: &str, name: &str) -> String {
        match self {
            UidSchema::Legacy => format!("{device_id}-{name}"),
            UidSchema::V1 => format!("{device_id}-{key}"),
        }
    }
}

impl From<UidSchema> for u8 {
    fn from(s: UidSchema) -> u8 {
        match s {
            UidSchema::Legacy => 0,
            UidSchema::V1 => 1,
        }
    }
}

impl TryFrom<u8> for UidSchema {
    type Error = String;

    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        match v {
            0 => Ok(UidSchema::Legacy),
            1 => Ok(UidSchema::V1),
            other => Err(format!("unexpected entity uid schema version: {other}")),
        }
    }
}

/// Lowercases and joins alphanumeric runs with underscores.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Entity id as generated for entities named relative to their device.
/// `None` is the device's main entity.
pub fn entity_id(domain: &str, device_name: &str, entity_name: Option<&str>) -> String {
    match entity_name {
        Some(name) => format!("{domain}.{}_{}", slugify(device_name), slugify(name)),
        None => format!("{domain}.{}", slugify(device_name)),
    }
}

/// Fixed-interval retry schedule bounded by a total elapsed time.
pub(crate) struct ConstantBackoff {
    interval: Duration,
    max_time: Duration,
    started: Instant,
}

impl ConstantBackoff {
    pub fn new(interval: Duration, max_time: Duration) -> Self {
        Self {
            interval,
            max_time,
            started: Instant::now(),
        }
    }

    /// Delay before the next attempt, or `None` once another attempt would
    /// start past the max time.
    pub fn next_delay(&self) -> Option<Duration> {
        if self.started.elapsed() + self.interval > self.max_time {
            None
        } else {
            Some(self.interval)
        }
    }
}
