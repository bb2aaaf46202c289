use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::protocol::DeviceEntry;
use crate::types::*;

/// Equipment unit type reported when a unit is not installed.
const UNIT_TYPE_ABSENT: u64 = 255;

const DEFAULT_SET_POINT_MIN_C: f64 = 10.0;
const DEFAULT_SET_POINT_MAX_C: f64 = 32.0;

fn num(data: &Value, key: &str) -> Option<f64> {
    data.get(key).and_then(|v| v.as_f64())
}

fn uint(data: &Value, key: &str) -> Option<u64> {
    data.get(key).and_then(|v| v.as_u64())
}

/// Accepts both JSON booleans and 0/1 integers.
fn flag(data: &Value, key: &str) -> bool {
    match data.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

fn text(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn celsius(data: &Value, key: &str) -> Option<Temperature> {
    num(data, key).map(Temperature::from_celsius)
}

/// Outdoor unit temperatures are reported in tenths of a degree Fahrenheit.
fn deci_fahrenheit(data: &Value, key: &str) -> Option<Temperature> {
    num(data, key).map(|v| Temperature::from_fahrenheit(v / 10.0))
}

/// Demand values are reported in half-percent steps.
fn demand(data: &Value, key: &str) -> Option<f64> {
    num(data, key).map(|v| v / 2.0)
}

fn tenths(data: &Value, key: &str) -> Option<f64> {
    num(data, key).map(|v| v / 10.0)
}

fn unit_installed(data: &Value, key: &str) -> bool {
    uint(data, key).is_some_and(|t| t != UNIT_TYPE_ABSENT)
}

pub(crate) fn parse_thermostat(entry: &DeviceEntry, data: &Value) -> Thermostat {
    let mut capabilities = BTreeSet::new();
    if flag(data, "ctSystemCapHeat") {
        capabilities.insert(Capability::Heat);
    }
    if flag(data, "ctSystemCapCool") {
        capabilities.insert(Capability::Cool);
    }
    if flag(data, "ctSystemCapEmergencyHeat") {
        capabilities.insert(Capability::EmergencyHeat);
    }

    let online = entry
        .online
        .or_else(|| data.get("online").and_then(|v| v.as_bool()))
        .unwrap_or(false);

    let set_point_heat = celsius(data, "hspActive")
        .or_else(|| celsius(data, "hspHome"))
        .unwrap_or(Temperature::from_celsius(DEFAULT_SET_POINT_MIN_C));
    let set_point_cool = celsius(data, "cspActive")
        .or_else(|| celsius(data, "cspHome"))
        .unwrap_or(Temperature::from_celsius(DEFAULT_SET_POINT_MAX_C));

    let air_quality_outdoor = flag(data, "aqOutdoorAvailable").then(|| AirQuality {
        aqi: num(data, "aqOutdoorValue"),
        particles: num(data, "aqOutdoorParticles"),
        ozone: num(data, "aqOutdoorOzone"),
        voc: None,
    });
    let air_quality_indoor = flag(data, "aqIndoorAvailable").then(|| AirQuality {
        aqi: num(data, "aqIndoorValue"),
        particles: num(data, "aqIndoorParticlesValue"),
        ozone: None,
        voc: num(data, "aqIndoorVOCValue"),
    });

    Thermostat {
        id: entry.id.clone(),
        location_id: entry.location_id.clone(),
        name: entry.name.clone(),
        model: entry.model.clone(),
        firmware_version: entry.firmware_version.clone(),
        online,
        capabilities,
        mode: uint(data, "mode")
            .and_then(ThermostatMode::from_daikin)
            .unwrap_or(ThermostatMode::Off),
        status: uint(data, "equipmentStatus")
            .and_then(ThermostatStatus::from_daikin)
            .unwrap_or_default(),
        fan_mode: uint(data, "fanCirculate")
            .and_then(FanMode::from_daikin)
            .unwrap_or(FanMode::Off),
        fan_speed: uint(data, "fanCirculateSpeed")
            .and_then(FanSpeed::from_daikin)
            .unwrap_or(FanSpeed::Low),
        schedule: Schedule {
            enabled: flag(data, "schedEnabled"),
        },
        indoor_temperature: celsius(data, "tempIndoor").unwrap_or(Temperature::from_celsius(0.0)),
        indoor_humidity: num(data, "humIndoor").unwrap_or(0.0),
        set_point_heat,
        set_point_heat_min: celsius(data, "EquipProtocolMinHeatSetpoint")
            .unwrap_or(Temperature::from_celsius(DEFAULT_SET_POINT_MIN_C)),
        set_point_heat_max: celsius(data, "EquipProtocolMaxHeatSetpoint")
            .unwrap_or(Temperature::from_celsius(DEFAULT_SET_POINT_MAX_C)),
        set_point_cool,
        set_point_cool_min: celsius(data, "EquipProtocolMinCoolSetpoint")
            .unwrap_or(Temperature::from_celsius(DEFAULT_SET_POINT_MIN_C)),
        set_point_cool_max: celsius(data, "EquipProtocolMaxCoolSetpoint")
            .unwrap_or(Temperature::from_celsius(DEFAULT_SET_POINT_MAX_C)),
        outdoor_temperature: celsius(data, "tempOutdoor"),
        outdoor_humidity: num(data, "humOutdoor"),
        air_quality_outdoor,
        air_quality_indoor,
        equipment: parse_equipment(&entry.id, data),
    }
}

fn parse_equipment(thermostat_id: &str, data: &Value) -> BTreeMap<String, Equipment> {
    let mut equipment = BTreeMap::new();

    let mut add = |prefix: &str, kind: EquipmentKind| {
        let class = kind.class();
        let id = format!("{thermostat_id}-{}", class.key());
        equipment.insert(
            id.clone(),
            Equipment {
                id,
                thermostat_id: thermostat_id.to_string(),
                name: class.name().to_string(),
                model: text(data, &format!("{prefix}ModelNoCharacter1_15")).unwrap_or_default(),
                serial: text(data, &format!("{prefix}SerialNoCharacter1_15")).unwrap_or_default(),
                firmware_version: text(data, &format!("{prefix}ControlSoftwareVersion")),
                kind,
            },
        );
    };

    if unit_installed(data, "ctAHUnitType") {
        add(
            "ctAH",
            EquipmentKind::AirHandler(AirHandler {
                mode: uint(data, "ctAHMode"),
                current_airflow: num(data, "ctAHCurrentIndoorAirflow"),
                fan_demand_requested: demand(data, "ctAHFanRequestedDemand"),
                fan_demand_current: demand(data, "ctAHFanCurrentDemandStatus"),
                heat_demand_requested: demand(data, "ctAHHeatRequestedDemand"),
                heat_demand_current: demand(data, "ctAHHeatCurrentDemandStatus"),
                humidification_demand_requested: demand(data, "ctAHHumidificationRequestedDemand"),
                power_usage: num(data, "ctIndoorPower"),
            }),
        );
    }

    if unit_installed(data, "ctIFCUnitType") {
        add(
            "ctIFC",
            EquipmentKind::Furnace(Furnace {
                mode: uint(data, "ctIFCOperatingHeatCoolMode"),
                current_airflow: num(data, "ctIFCIndoorBlowerAirflow"),
                fan_demand_requested: demand(data, "ctIFCFanRequestedDemandPercent"),
                fan_demand_current: demand(data, "ctIFCCurrentFanActualStatus"),
                heat_demand_requested: demand(data, "ctIFCHeatRequestedDemandPercent"),
                heat_demand_current: demand(data, "ctIFCCurrentHeatActualStatus"),
                cool_demand_requested: demand(data, "ctIFCCoolRequestedDemandPercent"),
                cool_demand_current: demand(data, "ctIFCCurrentCoolActualStatus"),
                humidification_demand_requested: demand(data, "ctIFCHumRequestedDemandPercent"),
                dehumidification_demand_requested: demand(data, "ctIFCDehumRequestedDemandPercent"),
                power_usage: num(data, "ctIndoorPower"),
            }),
        );
    }

    if unit_installed(data, "ctOutdoorUnitType") {
        add(
            "ctOutdoor",
            EquipmentKind::OutdoorUnit(OutdoorUnit {
                mode: uint(data, "ctOutdoorMode"),
                compressor_speed_target: num(data, "ctTargetCompressorspeed"),
                compressor_speed_current: num(data, "ctCurrentCompressorRPS"),
                fan_speed_target: num(data, "ctTargetODFanSpeed"),
                fan_speed_current: num(data, "ctOutdoorFanRPM"),
                suction_pressure: num(data, "ctOutdoorSuctionPressure"),
                eev_opening: num(data, "ctOutdoorEEVOpening"),
                heat_demand: demand(data, "ctOutdoorHeatRequestedDemand"),
                cool_demand: demand(data, "ctOutdoorCoolRequestedDemand"),
                fan_demand: demand(data, "ctOutdoorFanRequestedDemandPercentage"),
                dehumidification_demand: demand(data, "ctOutdoorDeHumidificationRequestedDemand"),
                air_temperature: deci_fahrenheit(data, "ctOutdoorAirTemperature"),
                coil_temperature: deci_fahrenheit(data, "ctOutdoorCoilTemperature"),
                discharge_temperature: deci_fahrenheit(data, "ctOutdoorDischargeTemperature"),
                liquid_temperature: deci_fahrenheit(data, "ctOutdoorLiquidTemperature"),
                defrost_sensor_temperature: deci_fahrenheit(
                    data,
                    "ctOutdoorDefrostSensorTemperature",
                ),
                compressor_current: tenths(data, "ctCompressorCurrent"),
                power_usage: num(data, "ctOutdoorPower").map(|v| v * 10.0),
            }),
        );
    }

    if unit_installed(data, "ctCoilUnitType") {
        add(
            "ctCoil",
            EquipmentKind::EevCoil(EevCoil {
                pressure: num(data, "ctEEVCoilPressureSensor"),
                suction_temperature: deci_fahrenheit(data, "ctEEVCoilSuctionTemperature"),
                superheat_temperature: tenths(data, "ctEEVCoilSuperHeatValue"),
                subcool_temperature: tenths(data, "ctEEVCoilSubCoolValue"),
            }),
        );
    }

    equipment
}
