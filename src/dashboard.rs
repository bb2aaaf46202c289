use serde_json::{json, Map, Value};

use crate::client::DaikinClient;
use crate::entity::{entity_id, thermostat_device_name, UidSchema};
use crate::sensor::{thermostat_sensor_entities, SensorDeviceClass, SensorEntity};
use crate::types::Thermostat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub columns: u32,
    pub narrow_columns: u32,
    pub narrow_max_width_px: u32,
    pub hours_to_show: u32,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            columns: 4,
            narrow_columns: 2,
            narrow_max_width_px: 600,
            hours_to_show: 24,
        }
    }
}

fn history_graph(
    title: String,
    entities: Vec<String>,
    options: &DashboardOptions,
) -> Option<Value> {
    if entities.is_empty() {
        return None;
    }
    Some(json!({
        "type": "history-graph",
        "title": title,
        "hours_to_show": options.hours_to_show,
        "entities": entities,
    }))
}

fn select_ids(sensors: &[SensorEntity], pred: impl Fn(&SensorEntity) -> bool) -> Vec<String> {
    sensors
        .iter()
        .filter(|s| pred(*s))
        .map(|s| s.entity_id.clone())
        .collect()
}

fn zone_graphs(thermostat: &Thermostat, options: &DashboardOptions) -> Vec<Value> {
    let sensors = thermostat_sensor_entities(thermostat, UidSchema::V1);
    let name = &thermostat.name;

    [
        history_graph(
            format!("{name} Temperature"),
            select_ids(&sensors, |s| s.description.key == "indoor_temperature"),
            options,
        ),
        history_graph(
            format!("{name} Humidity"),
            select_ids(&sensors, |s| s.description.key == "indoor_humidity"),
            options,
        ),
        history_graph(
            format!("{name} Demand"),
            select_ids(&sensors, |s| s.equipment_id.is_some() && s.is_demand()),
            options,
        ),
        history_graph(
            format!("{name} Airflow"),
            select_ids(&sensors, |s| s.description.key == "airflow"),
            options,
        ),
        history_graph(
            format!("{name} Power"),
            select_ids(&sensors, |s| {
                s.description.device_class == Some(SensorDeviceClass::Power)
            }),
            options,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Builds the dashboard view for every thermostat in the client's cache.
pub fn build_dashboard(client: &DaikinClient, options: &DashboardOptions) -> Value {
    let mut thermostats: Vec<&Thermostat> = client.thermostats().values().collect();
    thermostats.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    let mut cards: Vec<Value> = thermostats
        .iter()
        .map(|t| {
            json!({
                "type": "thermostat",
                "entity": entity_id("climate", &thermostat_device_name(t), None),
            })
        })
        .collect();

    for thermostat in &thermostats {
        cards.extend(zone_graphs(thermostat, options));
    }

    if let Some(first) = thermostats.first() {
        let sensors = thermostat_sensor_entities(first, UidSchema::V1);
        let outdoor = select_ids(&sensors, |s| {
            matches!(s.description.key, "outdoor_temperature" | "outdoor_humidity")
        });
        cards.extend(history_graph("Outdoor".to_string(), outdoor, options));
    }

    let mut mediaquery = Map::new();
    mediaquery.insert(
        format!("(max-width: {}px)", options.narrow_max_width_px),
        json!({ "grid-template-columns": format!("repeat({}, 1fr)", options.narrow_columns) }),
    );

    json!({
        "type": "custom:grid-layout",
        "layout": {
            "grid-template-columns": format!("repeat({}, 1fr)", options.columns),
            "mediaquery": mediaquery,
        },
        "cards": cards,
    })
}
