use serde_json::{json, Map, Value};

use crate::client::DaikinClient;
use crate::{Error, Result};

/// Raw device data for every thermostat on the account.
pub fn config_entry_diagnostics(client: &DaikinClient) -> Value {
    let raw: Map<String, Value> = client
        .all_raw_device_data()
        .iter()
        .map(|(id, data)| (id.clone(), data.clone()))
        .collect();
    json!({ "raw": raw })
}

/// Raw device data behind one device. Equipment reports its thermostat's data.
pub fn device_diagnostics(client: &DaikinClient, device_id: &str) -> Result<Value> {
    let thermostat_id = match client.thermostat(device_id) {
        Some(t) => t.id.as_str(),
        None => client
            .equipment(device_id)
            .map(|e| e.thermostat_id.as_str())
            .ok_or_else(|| Error::UnknownDevice(device_id.to_string()))?,
    };

    let data = client
        .raw_device_data(thermostat_id)
        .ok_or_else(|| Error::UnknownDevice(device_id.to_string()))?;
    Ok(json!({ "raw": data }))
}
