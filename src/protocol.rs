use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::types::{FanMode, FanSpeed, Temperature, ThermostatMode};
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.daikinskyport.com";

pub const PATH_LOGIN: &str = "/users/auth/login";
pub const PATH_REFRESH_TOKEN: &str = "/users/auth/token";
pub const PATH_LOCATIONS: &str = "/locations";
pub const PATH_DEVICES: &str = "/devices";
pub const PATH_DEVICE_DATA: &str = "/deviceData";

pub const DOMAIN: &str = "daikinone";
pub const MANUFACTURER: &str = "Daikin";

pub const MIN_TIME_BETWEEN_UPDATES: Duration = Duration::from_secs(30);
pub const SETTLE_INTERVAL: Duration = Duration::from_secs(1);
pub const SETTLE_MAX_TIME: Duration = Duration::from_secs(10);

pub fn device_data_path(device_id: &str) -> String {
    format!("{PATH_DEVICE_DATA}/{device_id}")
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LocationEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeviceEntry {
    pub id: String,
    #[serde(default)]
    pub location_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub online: Option<bool>,
}

pub fn login_body(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

pub fn refresh_body(email: &str, refresh_token: &str) -> Value {
    json!({ "email": email, "refreshToken": refresh_token })
}

pub fn set_mode_body(mode: ThermostatMode) -> Value {
    json!({ "mode": mode.as_daikin() })
}

/// Only the provided set points are sent. `schedOverride` holds the change
/// against a running schedule.
pub fn set_points_body(
    heat: Option<Temperature>,
    cool: Option<Temperature>,
    override_schedule: bool,
) -> Value {
    let mut body = Map::new();
    if let Some(h) = heat {
        body.insert("hspHome".to_string(), json!(h.celsius()));
    }
    if let Some(c) = cool {
        body.insert("cspHome".to_string(), json!(c.celsius()));
    }
    if override_schedule {
        body.insert("schedOverride".to_string(), json!(1));
    }
    Value::Object(body)
}

pub fn set_fan_mode_body(mode: FanMode) -> Value {
    json!({ "fanCirculate": mode.as_daikin() })
}

pub fn set_fan_speed_body(speed: FanSpeed) -> Value {
    json!({ "fanCirculateSpeed": speed.as_daikin() })
}

/// Returns (access, refresh) from a login response.
pub fn parse_login_response(body: &Value) -> Result<(String, String)> {
    let access = token_field(body, "accessToken")
        .ok_or_else(|| Error::Auth("no access token found in login response".to_string()))?;
    let refresh = token_field(body, "refreshToken")
        .ok_or_else(|| Error::Auth("no refresh token found in login response".to_string()))?;
    Ok((access, refresh))
}

pub fn parse_refresh_response(body: &Value) -> Result<String> {
    token_field(body, "accessToken")
        .ok_or_else(|| Error::Auth("no access token found in refresh response".to_string()))
}

fn token_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
