use tracing::debug;

use crate::client::DaikinClient;
use crate::entity::{entity_id, thermostat_device_name, DeviceInfo};
use crate::types::*;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvacMode {
    HeatCool,
    Heat,
    Cool,
    Off,
}

impl HvacMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::HeatCool => "heat_cool",
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvacAction {
    Heating,
    Cooling,
    Fan,
    Drying,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetMode {
    None,
    EmergencyHeat,
}

impl PresetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetMode::None => "none",
            PresetMode::EmergencyHeat => "emergency_heat",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(PresetMode::None),
            "emergency_heat" => Ok(PresetMode::EmergencyHeat),
            other => Err(Error::InvalidMode(format!("unsupported preset mode: {other}"))),
        }
    }
}

/// Fan modes offered by the climate entity. The speed variants imply an
/// always-on circulating fan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimateFanMode {
    Off,
    AlwaysOn,
    Schedule,
    Low,
    Medium,
    High,
}

impl ClimateFanMode {
    pub const ALL: [ClimateFanMode; 6] = [
        ClimateFanMode::Off,
        ClimateFanMode::AlwaysOn,
        ClimateFanMode::Schedule,
        ClimateFanMode::Low,
        ClimateFanMode::Medium,
        ClimateFanMode::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClimateFanMode::Off => "off",
            ClimateFanMode::AlwaysOn => "always_on",
            ClimateFanMode::Schedule => "schedule",
            ClimateFanMode::Low => "low",
            ClimateFanMode::Medium => "medium",
            ClimateFanMode::High => "high",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::InvalidMode(format!("unsupported fan mode: {s}")))
    }
}

pub mod features {
    pub const TARGET_TEMPERATURE: u32 = 1;
    pub const TARGET_TEMPERATURE_RANGE: u32 = 2;
    pub const FAN_MODE: u32 = 8;
    pub const PRESET_MODE: u32 = 16;
    pub const TURN_OFF: u32 = 128;
    pub const TURN_ON: u32 = 256;
}

/// Snapshot of the climate entity attributes for one thermostat.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateState {
    pub unique_id: String,
    pub entity_id: String,
    pub device: DeviceInfo,
    pub available: bool,
    pub supported_features: u32,
    pub current_temperature: f64,
    pub current_humidity: f64,
    pub hvac_modes: Vec<HvacMode>,
    pub hvac_mode: HvacMode,
    pub hvac_action: HvacAction,
    pub preset_modes: Vec<PresetMode>,
    pub preset_mode: PresetMode,
    pub target_temperature: Option<f64>,
    pub target_temperature_low: Option<f64>,
    pub target_temperature_high: Option<f64>,
    pub min_temp: f64,
    pub max_temp: f64,
    pub fan_modes: Vec<ClimateFanMode>,
    pub fan_mode: ClimateFanMode,
}

pub fn hvac_modes(thermostat: &Thermostat) -> Vec<HvacMode> {
    let heat = thermostat.has_capability(Capability::Heat);
    let cool = thermostat.has_capability(Capability::Cool);

    let mut modes = Vec::new();
    if heat && cool {
        modes.push(HvacMode::HeatCool);
    }
    if heat {
        modes.push(HvacMode::Heat);
    }
    if cool {
        modes.push(HvacMode::Cool);
    }
    modes.push(HvacMode::Off);
    modes
}

impl ClimateState {
    pub fn from_thermostat(t: &Thermostat) -> Self {
        let mut supported_features = features::TURN_ON
            | features::TURN_OFF
            | features::TARGET_TEMPERATURE
            | features::TARGET_TEMPERATURE_RANGE
            | features::FAN_MODE;
        let mut preset_modes = vec![PresetMode::None];
        if t.has_capability(Capability::EmergencyHeat) {
            supported_features |= features::PRESET_MODE;
            preset_modes.push(PresetMode::EmergencyHeat);
        }

        let (hvac_mode, preset_mode) = match t.mode {
            ThermostatMode::Auto => (HvacMode::HeatCool, PresetMode::None),
            ThermostatMode::Heat => (HvacMode::Heat, PresetMode::None),
            ThermostatMode::Cool => (HvacMode::Cool, PresetMode::None),
            ThermostatMode::AuxHeat => (HvacMode::Heat, PresetMode::EmergencyHeat),
            ThermostatMode::Off => (HvacMode::Off, PresetMode::None),
        };

        let hvac_action = match t.status {
            ThermostatStatus::Heating => HvacAction::Heating,
            ThermostatStatus::Cooling => HvacAction::Cooling,
            ThermostatStatus::CirculatingAir => HvacAction::Fan,
            ThermostatStatus::Drying => HvacAction::Drying,
            ThermostatStatus::Idle => HvacAction::Idle,
        };

        // a single target takes precedence over the range and they never coexist
        let (target_temperature, target_temperature_low, target_temperature_high) = match t.mode {
            ThermostatMode::Heat | ThermostatMode::AuxHeat => {
                (Some(t.set_point_heat.celsius()), None, None)
            }
            ThermostatMode::Cool => (Some(t.set_point_cool.celsius()), None, None),
            ThermostatMode::Auto => (
                None,
                Some(t.set_point_heat.celsius()),
                Some(t.set_point_cool.celsius()),
            ),
            ThermostatMode::Off => (None, None, None),
        };

        let fan_mode = match t.fan_mode {
            FanMode::Off => ClimateFanMode::Off,
            FanMode::AlwaysOn => ClimateFanMode::AlwaysOn,
            FanMode::Scheduled => ClimateFanMode::Schedule,
        };

        let device = DeviceInfo::for_thermostat(t);
        Self {
            unique_id: format!("{}-climate", t.id),
            entity_id: entity_id("climate", &thermostat_device_name(t), None),
            device,
            available: t.online,
            supported_features,
            current_temperature: t.indoor_temperature.celsius(),
            current_humidity: t.indoor_humidity,
            hvac_modes: hvac_modes(t),
            hvac_mode,
            hvac_action,
            preset_modes,
            preset_mode,
            target_temperature,
            target_temperature_low,
            target_temperature_high,
            min_temp: t.set_point_heat_min.celsius().max(t.set_point_cool_min.celsius()),
            max_temp: t.set_point_heat_max.celsius().min(t.set_point_cool_max.celsius()),
            fan_modes: ClimateFanMode::ALL.to_vec(),
            fan_mode,
        }
    }
}

/// Arguments of a set-temperature call, in Celsius.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetTemperature {
    pub temperature: Option<f64>,
    pub target_temp_low: Option<f64>,
    pub target_temp_high: Option<f64>,
}

/// Set point change resolved from a set-temperature call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetPointChange {
    pub heat: Option<Temperature>,
    pub cool: Option<Temperature>,
    pub override_schedule: bool,
}

/// Resolves which set points a set-temperature call changes. A single
/// temperature is only meaningful in a mode that has a single target.
pub fn resolve_set_temperature(t: &Thermostat, req: SetTemperature) -> Result<SetPointChange> {
    let override_schedule = t.schedule.enabled;

    if req.target_temp_low.is_some() || req.target_temp_high.is_some() {
        return Ok(SetPointChange {
            heat: req.target_temp_low.map(Temperature::from_celsius),
            cool: req.target_temp_high.map(Temperature::from_celsius),
            override_schedule,
        });
    }

    let Some(temperature) = req.temperature.map(Temperature::from_celsius) else {
        return Err(Error::InvalidRequest(
            "set temperature called with no temperature values".to_string(),
        ));
    };

    match t.mode {
        ThermostatMode::Heat | ThermostatMode::AuxHeat => Ok(SetPointChange {
            heat: Some(temperature),
            cool: None,
            override_schedule,
        }),
        ThermostatMode::Cool => Ok(SetPointChange {
            heat: None,
            cool: Some(temperature),
            override_schedule,
        }),
        other => Err(Error::InvalidMode(format!(
            "cannot set a single temperature in {other:?} mode"
        ))),
    }
}

impl DaikinClient {
    /// Climate controls for one thermostat.
    pub fn climate(&mut self, device_id: impl Into<String>) -> ClimateControl<'_> {
        ClimateControl {
            client: self,
            device_id: device_id.into(),
        }
    }
}

pub struct ClimateControl<'a> {
    client: &'a mut DaikinClient,
    device_id: String,
}

impl ClimateControl<'_> {
    fn thermostat(&self) -> Result<&Thermostat> {
        self.client
            .thermostat(&self.device_id)
            .ok_or_else(|| Error::UnknownDevice(self.device_id.clone()))
    }

    pub fn state(&self) -> Result<ClimateState> {
        self.thermostat().map(ClimateState::from_thermostat)
    }

    pub async fn set_hvac_mode(&mut self, mode: HvacMode) -> Result<()> {
        let target = match mode {
            HvacMode::HeatCool => ThermostatMode::Auto,
            HvacMode::Heat => ThermostatMode::Heat,
            HvacMode::Cool => ThermostatMode::Cool,
            HvacMode::Off => ThermostatMode::Off,
        };
        self.client.set_thermostat_mode(&self.device_id, target).await
    }

    /// Switches to the first operating mode the system supports. A thermostat
    /// that can neither heat nor cool cannot be turned on.
    pub async fn turn_on(&mut self) -> Result<()> {
        let mode = hvac_modes(self.thermostat()?)
            .into_iter()
            .find(|m| *m != HvacMode::Off)
            .ok_or_else(|| {
                Error::InvalidMode(format!("{} has no heating or cooling", self.device_id))
            })?;
        self.set_hvac_mode(mode).await
    }

    pub async fn turn_off(&mut self) -> Result<()> {
        self.set_hvac_mode(HvacMode::Off).await
    }

    pub async fn set_preset_mode(&mut self, preset: &str) -> Result<()> {
        match PresetMode::parse(preset)? {
            PresetMode::EmergencyHeat => {
                self.client
                    .set_thermostat_mode(&self.device_id, ThermostatMode::AuxHeat)
                    .await
            }
            PresetMode::None => {
                let current = self.thermostat()?.mode;
                // leaving emergency heat falls back to regular heat
                if current == ThermostatMode::AuxHeat {
                    self.client
                        .set_thermostat_mode(&self.device_id, ThermostatMode::Heat)
                        .await
                } else {
                    Ok(())
                }
            }
        }
    }

    pub async fn set_temperature(&mut self, req: SetTemperature) -> Result<()> {
        let change = resolve_set_temperature(self.thermostat()?, req)?;
        self.client
            .set_thermostat_home_set_points(
                &self.device_id,
                change.heat,
                change.cool,
                change.override_schedule,
            )
            .await
    }

    pub async fn set_fan_mode(&mut self, fan_mode: &str) -> Result<()> {
        let speed = match ClimateFanMode::parse(fan_mode)? {
            ClimateFanMode::Off => return self.set_circulate(FanMode::Off).await,
            ClimateFanMode::AlwaysOn => return self.set_circulate(FanMode::AlwaysOn).await,
            ClimateFanMode::Schedule => return self.set_circulate(FanMode::Scheduled).await,
            ClimateFanMode::Low => FanSpeed::Low,
            ClimateFanMode::Medium => FanSpeed::Medium,
            ClimateFanMode::High => FanSpeed::High,
        };

        debug!(
            device = %self.device_id,
            ?speed,
            "switching fan to always on before changing speed"
        );
        self.set_circulate(FanMode::AlwaysOn).await?;
        self.client
            .set_thermostat_fan_speed(&self.device_id, speed)
            .await
    }

    async fn set_circulate(&mut self, mode: FanMode) -> Result<()> {
        self.client.set_thermostat_fan_mode(&self.device_id, mode).await
    }
}
