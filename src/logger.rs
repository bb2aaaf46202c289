use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::diff::diff_json;

pub enum MessageLogMode {
    Full,
    Diffed,
}

const REDACTED: &str = "<redacted>";
const SECRET_KEYS: &[&str] = &["password", "refreshToken", "accessToken"];

/// Replaces credential fields before a body reaches the log file.
fn redact(body: &Value) -> Value {
    match body {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    if SECRET_KEYS.contains(&k.as_str()) {
                        (k.clone(), json!(REDACTED))
                    } else {
                        (k.clone(), redact(v))
                    }
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous_state: HashMap<String, Value>,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            mode,
            file,
            previous_state: HashMap::new(),
        })
    }

    pub fn log_request(&mut self, method: &str, path: &str, status: u16, body: Option<&Value>) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "req",
            "method": method,
            "path": path,
            "status": status,
            "body": body.map(redact),
        });
        self.write_line(&entry);
    }

    pub fn log_command(&mut self, action: &str, device_id: &str, body: &Value) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "action": action,
            "device": device_id,
            "body": body,
        });
        self.write_line(&entry);
    }

    pub fn log_device_data(&mut self, device_id: &str, body: &Value) {
        match self.mode {
            MessageLogMode::Full => {
                let entry = json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "data",
                    "device": device_id,
                    "body": body,
                });
                self.write_line(&entry);
            }
            MessageLogMode::Diffed => {
                let entry = match self.previous_state.get(device_id) {
                    None => json!({
                        "ts": Utc::now().to_rfc3339(),
                        "dir": "data",
                        "device": device_id,
                        "full": true,
                        "body": body,
                    }),
                    Some(prev) => {
                        let mut changes = Vec::new();
                        diff_json(prev, body, "", &mut changes);

                        let change_entries: Vec<Value> = changes
                            .iter()
                            .map(|(path, old, new)| json!({ "path": path, "old": old, "new": new }))
                            .collect();

                        json!({
                            "ts": Utc::now().to_rfc3339(),
                            "dir": "data",
                            "device": device_id,
                            "changes": change_entries,
                        })
                    }
                };
                self.write_line(&entry);
                self.previous_state.insert(device_id.to_string(), body.clone());
            }
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}
