mod client;
mod climate;
mod config;
mod dashboard;
mod device;
mod diagnostics;
mod diff;
mod entity;
mod error;
mod logger;
mod protocol;
mod select;
mod sensor;
mod types;

pub use client::{DaikinClient, DaikinClientBuilder};
pub use climate::{
    features, hvac_modes, resolve_set_temperature, ClimateControl, ClimateFanMode, ClimateState,
    HvacAction, HvacMode, PresetMode, SetPointChange, SetTemperature,
};
pub use config::{
    create_entry, ConfigEntry, EntryData, FlowError, CONFIG_MINOR_VERSION, CONFIG_VERSION,
    ENTRY_TITLE,
};
pub use dashboard::{build_dashboard, DashboardOptions};
pub use diagnostics::{config_entry_diagnostics, device_diagnostics};
pub use entity::{entity_id, slugify, thermostat_device_name, DeviceInfo, UidSchema};
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use protocol::{
    device_data_path, DEFAULT_BASE_URL, DOMAIN, MANUFACTURER, MIN_TIME_BETWEEN_UPDATES,
    PATH_DEVICES, PATH_DEVICE_DATA, PATH_LOCATIONS, PATH_LOGIN, PATH_REFRESH_TOKEN,
    SETTLE_INTERVAL, SETTLE_MAX_TIME,
};
pub use select::{fan_speed_selects, FanSpeedSelect};
pub use sensor::{
    sensor_entities, thermostat_sensor_entities, EntityCategory, SensorDescription,
    SensorDeviceClass, SensorEntity, SensorValue, StateClass,
};
pub use types::*;
