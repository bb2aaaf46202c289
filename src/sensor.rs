use crate::client::DaikinClient;
use crate::entity::{entity_id, DeviceInfo, UidSchema};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorDeviceClass {
    Enum,
    Temperature,
    Humidity,
    Power,
    Pressure,
    Current,
    Aqi,
    Pm25,
    Ozone,
    VolatileOrganicCompounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateClass {
    Measurement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCategory {
    Diagnostic,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SensorValue {
    Temperature(Temperature),
    Number(f64),
    Text(String),
}

#[derive(Debug)]
pub struct SensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub device_class: Option<SensorDeviceClass>,
    pub unit: Option<&'static str>,
    pub state_class: Option<StateClass>,
    pub entity_category: Option<EntityCategory>,
}

const PERCENT: &str = "%";
const CELSIUS: &str = "°C";
const WATT: &str = "W";

const fn measurement(
    key: &'static str,
    name: &'static str,
    device_class: Option<SensorDeviceClass>,
    unit: Option<&'static str>,
) -> SensorDescription {
    SensorDescription {
        key,
        name,
        device_class,
        unit,
        state_class: Some(StateClass::Measurement),
        entity_category: None,
    }
}

const fn demand(key: &'static str, name: &'static str) -> SensorDescription {
    measurement(key, name, None, Some(PERCENT))
}

const fn temperature(key: &'static str, name: &'static str) -> SensorDescription {
    measurement(key, name, Some(SensorDeviceClass::Temperature), Some(CELSIUS))
}

const fn power(key: &'static str, name: &'static str) -> SensorDescription {
    measurement(key, name, Some(SensorDeviceClass::Power), Some(WATT))
}

type ThermostatReader = fn(&Thermostat) -> Option<SensorValue>;
type EquipmentReader = fn(&Equipment) -> Option<SensorValue>;

struct ThermostatSensor {
    description: SensorDescription,
    present: fn(&Thermostat) -> bool,
    read: ThermostatReader,
}

struct EquipmentSensor {
    description: SensorDescription,
    read: EquipmentReader,
}

fn num(v: Option<f64>) -> Option<SensorValue> {
    v.map(SensorValue::Number)
}

fn temp(v: Option<Temperature>) -> Option<SensorValue> {
    v.map(SensorValue::Temperature)
}

fn always(_: &Thermostat) -> bool {
    true
}

static THERMOSTAT_SENSORS: &[ThermostatSensor] = &[
    ThermostatSensor {
        description: SensorDescription {
            key: "online",
            name: "Online Status",
            device_class: Some(SensorDeviceClass::Enum),
            unit: None,
            state_class: None,
            entity_category: Some(EntityCategory::Diagnostic),
        },
        present: always,
        read: |t| {
            Some(SensorValue::Text(
                if t.online { "Online" } else { "Offline" }.to_string(),
            ))
        },
    },
    ThermostatSensor {
        description: temperature("indoor_temperature", "Indoor Temperature"),
        present: always,
        read: |t| Some(SensorValue::Temperature(t.indoor_temperature)),
    },
    ThermostatSensor {
        description: measurement(
            "indoor_humidity",
            "Indoor Humidity",
            Some(SensorDeviceClass::Humidity),
            Some(PERCENT),
        ),
        present: always,
        read: |t| Some(SensorValue::Number(t.indoor_humidity)),
    },
    ThermostatSensor {
        description: temperature("outdoor_temperature", "Outdoor Temperature"),
        present: always,
        read: |t| temp(t.outdoor_temperature),
    },
    ThermostatSensor {
        description: measurement(
            "outdoor_humidity",
            "Outdoor Humidity",
            Some(SensorDeviceClass::Humidity),
            Some(PERCENT),
        ),
        present: always,
        read: |t| num(t.outdoor_humidity),
    },
    ThermostatSensor {
        description: measurement(
            "outdoor_air_quality_index",
            "Outdoor Air Quality Index",
            Some(SensorDeviceClass::Aqi),
            None,
        ),
        present: |t| t.air_quality_outdoor.is_some(),
        read: |t| num(t.air_quality_outdoor?.aqi),
    },
    ThermostatSensor {
        description: measurement(
            "outdoor_particles",
            "Outdoor Particles",
            Some(SensorDeviceClass::Pm25),
            Some("µg/m³"),
        ),
        present: |t| t.air_quality_outdoor.is_some(),
        read: |t| num(t.air_quality_outdoor?.particles),
    },
    ThermostatSensor {
        description: measurement(
            "outdoor_ozone",
            "Outdoor Ozone",
            Some(SensorDeviceClass::Ozone),
            Some("µg/m³"),
        ),
        present: |t| t.air_quality_outdoor.is_some(),
        read: |t| num(t.air_quality_outdoor?.ozone),
    },
    ThermostatSensor {
        description: measurement(
            "indoor_air_quality_index",
            "Indoor Air Quality Index",
            Some(SensorDeviceClass::Aqi),
            None,
        ),
        present: |t| t.air_quality_indoor.is_some(),
        read: |t| num(t.air_quality_indoor?.aqi),
    },
    ThermostatSensor {
        description: measurement(
            "indoor_particles",
            "Indoor Particles",
            Some(SensorDeviceClass::Pm25),
            Some("µg/m³"),
        ),
        present: |t| t.air_quality_indoor.is_some(),
        read: |t| num(t.air_quality_indoor?.particles),
    },
    ThermostatSensor {
        description: measurement(
            "indoor_voc",
            "Indoor VOC",
            Some(SensorDeviceClass::VolatileOrganicCompounds),
            Some("ppb"),
        ),
        present: |t| t.air_quality_indoor.is_some(),
        read: |t| num(t.air_quality_indoor?.voc),
    },
];

fn air_handler(e: &Equipment) -> Option<&AirHandler> {
    match &e.kind {
        EquipmentKind::AirHandler(a) => Some(a),
        _ => None,
    }
}

fn furnace(e: &Equipment) -> Option<&Furnace> {
    match &e.kind {
        EquipmentKind::Furnace(f) => Some(f),
        _ => None,
    }
}

fn outdoor_unit(e: &Equipment) -> Option<&OutdoorUnit> {
    match &e.kind {
        EquipmentKind::OutdoorUnit(o) => Some(o),
        _ => None,
    }
}

fn eev_coil(e: &Equipment) -> Option<&EevCoil> {
    match &e.kind {
        EquipmentKind::EevCoil(c) => Some(c),
        _ => None,
    }
}

static AIR_HANDLER_SENSORS: &[EquipmentSensor] = &[
    EquipmentSensor {
        description: measurement("airflow", "Airflow", None, Some("CFM")),
        read: |e| num(air_handler(e)?.current_airflow),
    },
    EquipmentSensor {
        description: demand("fan_demand_requested", "Fan Demand Requested"),
        read: |e| num(air_handler(e)?.fan_demand_requested),
    },
    EquipmentSensor {
        description: demand("fan_demand_current", "Fan Demand Current"),
        read: |e| num(air_handler(e)?.fan_demand_current),
    },
    EquipmentSensor {
        description: demand("heat_demand_requested", "Heat Demand Requested"),
        read: |e| num(air_handler(e)?.heat_demand_requested),
    },
    EquipmentSensor {
        description: demand("heat_demand_current", "Heat Demand Current"),
        read: |e| num(air_handler(e)?.heat_demand_current),
    },
    EquipmentSensor {
        description: demand("humidification_demand_requested", "Humidification Demand Requested"),
        read: |e| num(air_handler(e)?.humidification_demand_requested),
    },
    EquipmentSensor {
        description: power("power_usage", "Power Usage"),
        read: |e| num(air_handler(e)?.power_usage),
    },
];

static FURNACE_SENSORS: &[EquipmentSensor] = &[
    EquipmentSensor {
        description: measurement("airflow", "Airflow", None, Some("CFM")),
        read: |e| num(furnace(e)?.current_airflow),
    },
    EquipmentSensor {
        description: demand("fan_demand_requested", "Fan Demand Requested"),
        read: |e| num(furnace(e)?.fan_demand_requested),
    },
    EquipmentSensor {
        description: demand("fan_demand_current", "Fan Demand Current"),
        read: |e| num(furnace(e)?.fan_demand_current),
    },
    EquipmentSensor {
        description: demand("heat_demand_requested", "Heat Demand Requested"),
        read: |e| num(furnace(e)?.heat_demand_requested),
    },
    EquipmentSensor {
        description: demand("heat_demand_current", "Heat Demand Current"),
        read: |e| num(furnace(e)?.heat_demand_current),
    },
    EquipmentSensor {
        description: demand("cool_demand_requested", "Cool Demand Requested"),
        read: |e| num(furnace(e)?.cool_demand_requested),
    },
    EquipmentSensor {
        description: demand("cool_demand_current", "Cool Demand Current"),
        read: |e| num(furnace(e)?.cool_demand_current),
    },
    EquipmentSensor {
        description: demand("humidification_demand_requested", "Humidification Demand Requested"),
        read: |e| num(furnace(e)?.humidification_demand_requested),
    },
    EquipmentSensor {
        description: demand(
            "dehumidification_demand_requested",
            "Dehumidification Demand Requested",
        ),
        read: |e| num(furnace(e)?.dehumidification_demand_requested),
    },
    EquipmentSensor {
        description: power("power_usage", "Power Usage"),
        read: |e| num(furnace(e)?.power_usage),
    },
];

static OUTDOOR_UNIT_SENSORS: &[EquipmentSensor] = &[
    EquipmentSensor {
        description: measurement(
            "compressor_speed_target",
            "Compressor Speed Target",
            None,
            Some("RPS"),
        ),
        read: |e| num(outdoor_unit(e)?.compressor_speed_target),
    },
    EquipmentSensor {
        description: measurement(
            "compressor_speed_current",
            "Compressor Speed Current",
            None,
            Some("RPS"),
        ),
        read: |e| num(outdoor_unit(e)?.compressor_speed_current),
    },
    EquipmentSensor {
        description: measurement("fan_speed_target", "Fan Speed Target", None, Some("RPM")),
        read: |e| num(outdoor_unit(e)?.fan_speed_target),
    },
    EquipmentSensor {
        description: measurement("fan_speed_current", "Fan Speed Current", None, Some("RPM")),
        read: |e| num(outdoor_unit(e)?.fan_speed_current),
    },
    EquipmentSensor {
        description: measurement(
            "suction_pressure",
            "Suction Pressure",
            Some(SensorDeviceClass::Pressure),
            Some("psi"),
        ),
        read: |e| num(outdoor_unit(e)?.suction_pressure),
    },
    EquipmentSensor {
        description: measurement("eev_opening", "EEV Opening", None, Some(PERCENT)),
        read: |e| num(outdoor_unit(e)?.eev_opening),
    },
    EquipmentSensor {
        description: demand("heat_demand", "Heat Demand"),
        read: |e| num(outdoor_unit(e)?.heat_demand),
    },
    EquipmentSensor {
        description: demand("cool_demand", "Cool Demand"),
        read: |e| num(outdoor_unit(e)?.cool_demand),
    },
    EquipmentSensor {
        description: demand("fan_demand", "Fan Demand"),
        read: |e| num(outdoor_unit(e)?.fan_demand),
    },
    EquipmentSensor {
        description: demand("dehumidification_demand", "Dehumidification Demand"),
        read: |e| num(outdoor_unit(e)?.dehumidification_demand),
    },
    EquipmentSensor {
        description: temperature("air_temperature", "Air Temperature"),
        read: |e| temp(outdoor_unit(e)?.air_temperature),
    },
    EquipmentSensor {
        description: temperature("coil_temperature", "Coil Temperature"),
        read: |e| temp(outdoor_unit(e)?.coil_temperature),
    },
    EquipmentSensor {
        description: temperature("discharge_temperature", "Discharge Temperature"),
        read: |e| temp(outdoor_unit(e)?.discharge_temperature),
    },
    EquipmentSensor {
        description: temperature("liquid_temperature", "Liquid Temperature"),
        read: |e| temp(outdoor_unit(e)?.liquid_temperature),
    },
    EquipmentSensor {
        description: temperature("defrost_sensor_temperature", "Defrost Sensor Temperature"),
        read: |e| temp(outdoor_unit(e)?.defrost_sensor_temperature),
    },
    EquipmentSensor {
        description: measurement(
            "compressor_current",
            "Compressor Current",
            Some(SensorDeviceClass::Current),
            Some("A"),
        ),
        read: |e| num(outdoor_unit(e)?.compressor_current),
    },
    EquipmentSensor {
        description: power("power_usage", "Power Usage"),
        read: |e| num(outdoor_unit(e)?.power_usage),
    },
];

static EEV_COIL_SENSORS: &[EquipmentSensor] = &[
    EquipmentSensor {
        description: measurement(
            "pressure",
            "Pressure",
            Some(SensorDeviceClass::Pressure),
            Some("psi"),
        ),
        read: |e| num(eev_coil(e)?.pressure),
    },
    EquipmentSensor {
        description: temperature("suction_temperature", "Suction Temperature"),
        read: |e| temp(eev_coil(e)?.suction_temperature),
    },
    // superheat and subcool are temperature differences in °F
    EquipmentSensor {
        description: measurement(
            "superheat_temperature",
            "Superheat Temperature",
            None,
            Some("°F"),
        ),
        read: |e| num(eev_coil(e)?.superheat_temperature),
    },
    EquipmentSensor {
        description: measurement("subcool_temperature", "Subcool Temperature", None, Some("°F")),
        read: |e| num(eev_coil(e)?.subcool_temperature),
    },
];

fn equipment_sensors(class: EquipmentClass) -> &'static [EquipmentSensor] {
    match class {
        EquipmentClass::AirHandler => AIR_HANDLER_SENSORS,
        EquipmentClass::Furnace => FURNACE_SENSORS,
        EquipmentClass::OutdoorUnit => OUTDOOR_UNIT_SENSORS,
        EquipmentClass::EevCoil => EEV_COIL_SENSORS,
    }
}

#[derive(Clone, Copy)]
enum Reader {
    Thermostat(ThermostatReader),
    Equipment(EquipmentReader),
}

/// A sensor bound to one device. Values are read from the client's cache.
pub struct SensorEntity {
    pub description: &'static SensorDescription,
    pub unique_id: String,
    pub entity_id: String,
    pub device: DeviceInfo,
    pub thermostat_id: String,
    pub equipment_id: Option<String>,
    reader: Reader,
}

impl SensorEntity {
    pub fn value(&self, client: &DaikinClient) -> Option<SensorValue> {
        match self.reader {
            Reader::Thermostat(read) => read(client.thermostat(&self.thermostat_id)?),
            Reader::Equipment(read) => {
                let equipment_id = self.equipment_id.as_deref()?;
                read(client.thermostat(&self.thermostat_id)?.equipment.get(equipment_id)?)
            }
        }
    }

    pub fn is_demand(&self) -> bool {
        self.description.key.contains("demand")
    }
}

impl std::fmt::Debug for SensorEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorEntity")
            .field("key", &self.description.key)
            .field("unique_id", &self.unique_id)
            .field("entity_id", &self.entity_id)
            .finish()
    }
}

/// Sensors for one thermostat followed by those of its equipment.
pub fn thermostat_sensor_entities(thermostat: &Thermostat, schema: UidSchema) -> Vec<SensorEntity> {
    let device = DeviceInfo::for_thermostat(thermostat);
    let mut entities: Vec<SensorEntity> = THERMOSTAT_SENSORS
        .iter()
        .filter(|s| (s.present)(thermostat))
        .map(|s| SensorEntity {
            description: &s.description,
            unique_id: schema.sensor_unique_id(
                &thermostat.id,
                s.description.key,
                s.description.name,
            ),
            entity_id: entity_id("sensor", &device.name, Some(s.description.name)),
            device: device.clone(),
            thermostat_id: thermostat.id.clone(),
            equipment_id: None,
            reader: Reader::Thermostat(s.read),
        })
        .collect();

    for equipment in thermostat.equipment.values() {
        let device = DeviceInfo::for_equipment(thermostat, equipment);
        entities.extend(equipment_sensors(equipment.kind.class()).iter().map(|s| SensorEntity {
            description: &s.description,
            unique_id: schema.sensor_unique_id(
                &equipment.id,
                s.description.key,
                s.description.name,
            ),
            entity_id: entity_id("sensor", &device.name, Some(s.description.name)),
            device: device.clone(),
            thermostat_id: thermostat.id.clone(),
            equipment_id: Some(equipment.id.clone()),
            reader: Reader::Equipment(s.read),
        }));
    }

    entities
}

pub fn sensor_entities(client: &DaikinClient, schema: UidSchema) -> Vec<SensorEntity> {
    client
        .thermostats()
        .values()
        .flat_map(|t| thermostat_sensor_entities(t, schema))
        .collect()
}
