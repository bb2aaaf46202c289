use serde_json::{Map, Value};

use crate::types::*;

/// Fields that are covered by a typed event and never emitted generically.
const TYPED_FIELDS: &[&str] = &[
    "mode",
    "equipmentStatus",
    "tempIndoor",
    "humIndoor",
    "hspActive",
    "cspActive",
    "fanCirculate",
    "fanCirculateSpeed",
    "tempOutdoor",
    "online",
];

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Collects `(path, old, new)` for every leaf that differs. Paths are
/// dot-separated object keys. Removed leaves are reported with a null new value.
pub(crate) fn diff_json(
    previous: &Value,
    current: &Value,
    path_prefix: &str,
    changes: &mut Vec<(String, Value, Value)>,
) {
    match (previous, current) {
        (Value::Object(prev_map), Value::Object(curr_map)) => {
            let empty = Value::Object(Map::new());
            for (key, curr_val) in curr_map {
                let path = join_path(path_prefix, key);
                match prev_map.get(key) {
                    Some(prev_val) => diff_json(prev_val, curr_val, &path, changes),
                    None if curr_val.is_object() => {
                        diff_json(&empty, curr_val, &path, changes);
                    }
                    None => changes.push((path, Value::Null, curr_val.clone())),
                }
            }
            // every payload is complete, so a missing key was removed
            for (key, prev_val) in prev_map {
                if curr_map.contains_key(key) {
                    continue;
                }
                let path = join_path(path_prefix, key);
                if prev_val.is_object() {
                    diff_json(prev_val, &empty, &path, changes);
                } else {
                    changes.push((path, prev_val.clone(), Value::Null));
                }
            }
        }
        (prev, curr) if prev != curr => {
            changes.push((path_prefix.to_string(), prev.clone(), curr.clone()));
        }
        _ => {}
    }
}

/// Maps a changed path in a thermostat's device data to a typed event.
/// `data` is the full current payload so paired fields can be read together.
pub(crate) fn map_typed_event(
    device_id: &str,
    name: &str,
    path: &str,
    new_value: &Value,
    data: &Value,
) -> Option<Event> {
    let device_id = device_id.to_string();
    let name = name.to_string();
    match path {
        "mode" => {
            let mode = ThermostatMode::from_daikin(new_value.as_u64()?)?;
            Some(Event::ModeChanged { device_id, name, mode })
        }
        "equipmentStatus" => {
            let status = ThermostatStatus::from_daikin(new_value.as_u64()?)?;
            Some(Event::StatusChanged { device_id, name, status })
        }
        "tempIndoor" => {
            let temp = Temperature::from_celsius(new_value.as_f64()?);
            Some(Event::IndoorTemperatureChanged { device_id, name, temp })
        }
        "humIndoor" => {
            let humidity = new_value.as_f64()?;
            Some(Event::IndoorHumidityChanged { device_id, name, humidity })
        }
        "hspActive" | "cspActive" => {
            let heat = data
                .get("hspActive")
                .and_then(|v| v.as_f64())
                .map(Temperature::from_celsius);
            let cool = data
                .get("cspActive")
                .and_then(|v| v.as_f64())
                .map(Temperature::from_celsius);
            Some(Event::SetPointsChanged { device_id, name, heat, cool })
        }
        "fanCirculate" | "fanCirculateSpeed" => {
            let mode = data
                .get("fanCirculate")
                .and_then(|v| v.as_u64())
                .and_then(FanMode::from_daikin);
            let speed = data
                .get("fanCirculateSpeed")
                .and_then(|v| v.as_u64())
                .and_then(FanSpeed::from_daikin);
            Some(Event::FanChanged { device_id, name, mode, speed })
        }
        "tempOutdoor" => {
            let temp = Temperature::from_celsius(new_value.as_f64()?);
            Some(Event::OutdoorTemperatureChanged { device_id, temp })
        }
        "online" => {
            let online = new_value.as_bool()?;
            Some(Event::OnlineChanged { device_id, name, online })
        }
        _ => None,
    }
}

pub(crate) fn generic_event(device_id: &str, path: &str, value: &Value) -> Option<Event> {
    if TYPED_FIELDS.contains(&path) {
        return None;
    }

    match value {
        Value::Number(n) => Some(Event::DeviceNumeric {
            device_id: device_id.to_string(),
            path: path.to_string(),
            value: n.as_f64()?,
        }),
        Value::String(s) => Some(Event::DeviceString {
            device_id: device_id.to_string(),
            path: path.to_string(),
            value: s.clone(),
        }),
        Value::Bool(b) => Some(Event::DeviceBool {
            device_id: device_id.to_string(),
            path: path.to_string(),
            value: *b,
        }),
        _ => None,
    }
}

/// Diffs two payloads for one device and returns the resulting events.
pub(crate) fn device_events(
    device_id: &str,
    name: &str,
    previous: &Value,
    current: &Value,
) -> Vec<Event> {
    let mut changes = Vec::new();
    diff_json(previous, current, "", &mut changes);

    let mut events = Vec::new();
    let mut set_points_seen = false;
    let mut fan_seen = false;
    for (path, _old, new_val) in &changes {
        // paired fields collapse into a single event
        match path.as_str() {
            "hspActive" | "cspActive" if set_points_seen => continue,
            "hspActive" | "cspActive" => set_points_seen = true,
            "fanCirculate" | "fanCirculateSpeed" if fan_seen => continue,
            "fanCirculate" | "fanCirculateSpeed" => fan_seen = true,
            _ => {}
        }
        if let Some(evt) = map_typed_event(device_id, name, path, new_val, current) {
            events.push(evt);
        } else if new_val.is_null() {
            events.push(Event::DeviceFieldRemoved {
                device_id: device_id.to_string(),
                path: path.clone(),
            });
        } else if let Some(evt) = generic_event(device_id, path, new_val) {
            events.push(evt);
        }
    }
    events
}
