use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// half-even, so 20.25 reads as 20.2
fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round_ties_even() / 10.0
}

/// Temperature stored as Celsius internally, rounded to a tenth of a degree.
/// Equality compares the rounded Celsius value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature(f64);

impl Temperature {
    pub fn from_celsius(c: f64) -> Self {
        Self(round_tenth(c))
    }

    pub fn from_fahrenheit(f: f64) -> Self {
        Self::from_celsius((f - 32.0) * (5.0 / 9.0))
    }

    pub fn from_kelvin(k: f64) -> Self {
        Self::from_celsius(k - 273.15)
    }

    pub fn celsius(&self) -> f64 {
        self.0
    }

    pub fn fahrenheit(&self) -> f64 {
        round_tenth(self.0 * (9.0 / 5.0) + 32.0)
    }

    pub fn kelvin(&self) -> f64 {
        round_tenth(self.0 + 273.15)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.0)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThermostatMode {
    Off,
    Heat,
    Cool,
    Auto,
    AuxHeat,
}

impl ThermostatMode {
    pub fn as_daikin(&self) -> u8 {
        match self {
            ThermostatMode::Off => 0,
            ThermostatMode::Heat => 1,
            ThermostatMode::Cool => 2,
            ThermostatMode::Auto => 3,
            ThermostatMode::AuxHeat => 4,
        }
    }

    pub fn from_daikin(v: u64) -> Option<Self> {
        match v {
            0 => Some(ThermostatMode::Off),
            1 => Some(ThermostatMode::Heat),
            2 => Some(ThermostatMode::Cool),
            3 => Some(ThermostatMode::Auto),
            4 => Some(ThermostatMode::AuxHeat),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThermostatStatus {
    Cooling,
    Drying,
    Heating,
    CirculatingAir,
    #[default]
    Idle,
}

impl ThermostatStatus {
    pub fn from_daikin(v: u64) -> Option<Self> {
        match v {
            1 => Some(ThermostatStatus::Cooling),
            2 => Some(ThermostatStatus::Drying),
            3 => Some(ThermostatStatus::Heating),
            4 => Some(ThermostatStatus::CirculatingAir),
            5 => Some(ThermostatStatus::Idle),
            _ => None,
        }
    }
}

/// Circulating fan mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanMode {
    Off,
    AlwaysOn,
    Scheduled,
}

impl FanMode {
    pub fn as_daikin(&self) -> u8 {
        match self {
            FanMode::Off => 0,
            FanMode::AlwaysOn => 1,
            FanMode::Scheduled => 2,
        }
    }

    pub fn from_daikin(v: u64) -> Option<Self> {
        match v {
            0 => Some(FanMode::Off),
            1 => Some(FanMode::AlwaysOn),
            2 => Some(FanMode::Scheduled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanSpeed {
    Low,
    Medium,
    High,
}

impl FanSpeed {
    pub const ALL: [FanSpeed; 3] = [FanSpeed::Low, FanSpeed::Medium, FanSpeed::High];

    pub fn as_daikin(&self) -> u8 {
        match self {
            FanSpeed::Low => 0,
            FanSpeed::Medium => 1,
            FanSpeed::High => 2,
        }
    }

    pub fn from_daikin(v: u64) -> Option<Self> {
        match v {
            0 => Some(FanSpeed::Low),
            1 => Some(FanSpeed::Medium),
            2 => Some(FanSpeed::High),
            _ => None,
        }
    }

    /// Capitalized display label ("Low", "Medium", "High").
    pub fn label(&self) -> &'static str {
        match self {
            FanSpeed::Low => "Low",
            FanSpeed::Medium => "Medium",
            FanSpeed::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Heat,
    Cool,
    EmergencyHeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Schedule {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AirQuality {
    pub aqi: Option<f64>,
    pub particles: Option<f64>,
    pub ozone: Option<f64>,
    pub voc: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thermostat {
    pub id: String,
    pub location_id: String,
    pub name: String,
    pub model: String,
    pub firmware_version: Option<String>,
    pub online: bool,
    pub capabilities: BTreeSet<Capability>,
    pub mode: ThermostatMode,
    pub status: ThermostatStatus,
    pub fan_mode: FanMode,
    pub fan_speed: FanSpeed,
    pub schedule: Schedule,
    pub indoor_temperature: Temperature,
    pub indoor_humidity: f64,
    pub set_point_heat: Temperature,
    pub set_point_heat_min: Temperature,
    pub set_point_heat_max: Temperature,
    pub set_point_cool: Temperature,
    pub set_point_cool_min: Temperature,
    pub set_point_cool_max: Temperature,
    pub outdoor_temperature: Option<Temperature>,
    pub outdoor_humidity: Option<f64>,
    pub air_quality_outdoor: Option<AirQuality>,
    pub air_quality_indoor: Option<AirQuality>,
    pub equipment: BTreeMap<String, Equipment>,
}

impl Thermostat {
    pub fn has_capability(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Equipment {
    pub id: String,
    pub thermostat_id: String,
    pub name: String,
    pub model: String,
    pub serial: String,
    pub firmware_version: Option<String>,
    pub kind: EquipmentKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipmentClass {
    AirHandler,
    Furnace,
    OutdoorUnit,
    EevCoil,
}

impl EquipmentClass {
    pub fn key(&self) -> &'static str {
        match self {
            EquipmentClass::AirHandler => "air_handler",
            EquipmentClass::Furnace => "furnace",
            EquipmentClass::OutdoorUnit => "outdoor_unit",
            EquipmentClass::EevCoil => "eev_coil",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EquipmentClass::AirHandler => "Air Handler",
            EquipmentClass::Furnace => "Furnace",
            EquipmentClass::OutdoorUnit => "Outdoor Unit",
            EquipmentClass::EevCoil => "EEV Coil",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EquipmentKind {
    AirHandler(AirHandler),
    Furnace(Furnace),
    OutdoorUnit(OutdoorUnit),
    EevCoil(EevCoil),
}

impl EquipmentKind {
    pub fn class(&self) -> EquipmentClass {
        match self {
            EquipmentKind::AirHandler(_) => EquipmentClass::AirHandler,
            EquipmentKind::Furnace(_) => EquipmentClass::Furnace,
            EquipmentKind::OutdoorUnit(_) => EquipmentClass::OutdoorUnit,
            EquipmentKind::EevCoil(_) => EquipmentClass::EevCoil,
        }
    }
}

/// Demand values are percentages (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AirHandler {
    pub mode: Option<u64>,
    pub current_airflow: Option<f64>,
    pub fan_demand_requested: Option<f64>,
    pub fan_demand_current: Option<f64>,
    pub heat_demand_requested: Option<f64>,
    pub heat_demand_current: Option<f64>,
    pub humidification_demand_requested: Option<f64>,
    pub power_usage: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Furnace {
    pub mode: Option<u64>,
    pub current_airflow: Option<f64>,
    pub fan_demand_requested: Option<f64>,
    pub fan_demand_current: Option<f64>,
    pub heat_demand_requested: Option<f64>,
    pub heat_demand_current: Option<f64>,
    pub cool_demand_requested: Option<f64>,
    pub cool_demand_current: Option<f64>,
    pub humidification_demand_requested: Option<f64>,
    pub dehumidification_demand_requested: Option<f64>,
    pub power_usage: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OutdoorUnit {
    pub mode: Option<u64>,
    pub compressor_speed_target: Option<f64>,
    pub compressor_speed_current: Option<f64>,
    pub fan_speed_target: Option<f64>,
    pub fan_speed_current: Option<f64>,
    pub suction_pressure: Option<f64>,
    pub eev_opening: Option<f64>,
    pub heat_demand: Option<f64>,
    pub cool_demand: Option<f64>,
    pub fan_demand: Option<f64>,
    pub dehumidification_demand: Option<f64>,
    pub air_temperature: Option<Temperature>,
    pub coil_temperature: Option<Temperature>,
    pub discharge_temperature: Option<Temperature>,
    pub liquid_temperature: Option<Temperature>,
    pub defrost_sensor_temperature: Option<Temperature>,
    pub compressor_current: Option<f64>,
    pub power_usage: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EevCoil {
    pub pressure: Option<f64>,
    pub suction_temperature: Option<Temperature>,
    pub superheat_temperature: Option<f64>,
    pub subcool_temperature: Option<f64>,
}

/// Events emitted by the diff engine when device data changes between updates.
#[derive(Debug, Clone)]
pub enum Event {
    ModeChanged { device_id: String, name: String, mode: ThermostatMode },
    StatusChanged { device_id: String, name: String, status: ThermostatStatus },
    IndoorTemperatureChanged { device_id: String, name: String, temp: Temperature },
    IndoorHumidityChanged { device_id: String, name: String, humidity: f64 },
    SetPointsChanged {
        device_id: String,
        name: String,
        heat: Option<Temperature>,
        cool: Option<Temperature>,
    },
    FanChanged {
        device_id: String,
        name: String,
        mode: Option<FanMode>,
        speed: Option<FanSpeed>,
    },
    OutdoorTemperatureChanged { device_id: String, temp: Temperature },
    OnlineChanged { device_id: String, name: String, online: bool },

    DeviceNumeric { device_id: String, path: String, value: f64 },
    DeviceString { device_id: String, path: String, value: String },
    DeviceBool { device_id: String, path: String, value: bool },
    DeviceFieldRemoved { device_id: String, path: String },
}
