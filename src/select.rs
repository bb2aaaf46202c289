use crate::client::DaikinClient;
use crate::entity::{entity_id, DeviceInfo};
use crate::types::{FanSpeed, Thermostat};
use crate::{Error, Result};

/// Circulating fan speed picker for one thermostat.
#[derive(Debug, Clone, PartialEq)]
pub struct FanSpeedSelect {
    pub unique_id: String,
    pub entity_id: String,
    pub device: DeviceInfo,
    pub thermostat_id: String,
}

impl FanSpeedSelect {
    pub const NAME: &'static str = "Fan Speed";

    /// Both unique id schemas key the select by `fan_speed`.
    pub fn for_thermostat(thermostat: &Thermostat) -> Self {
        let device = DeviceInfo::for_thermostat(thermostat);
        Self {
            unique_id: format!("{}-fan_speed", thermostat.id),
            entity_id: entity_id("select", &device.name, Some(Self::NAME)),
            device,
            thermostat_id: thermostat.id.clone(),
        }
    }

    pub fn options(&self) -> Vec<&'static str> {
        FanSpeed::ALL.iter().map(FanSpeed::label).collect()
    }

    pub fn current_option(&self, client: &DaikinClient) -> Option<&'static str> {
        client
            .thermostat(&self.thermostat_id)
            .map(|t| t.fan_speed.label())
    }

    /// Matches the option case-insensitively and sends the new speed.
    pub async fn select_option(&self, client: &mut DaikinClient, option: &str) -> Result<()> {
        let speed = parse_fan_speed(option)
            .ok_or_else(|| Error::InvalidMode(format!("unknown fan speed option: {option}")))?;
        client
            .set_thermostat_fan_speed(&self.thermostat_id, speed)
            .await
    }
}

fn parse_fan_speed(option: &str) -> Option<FanSpeed> {
    FanSpeed::ALL
        .into_iter()
        .find(|s| s.label().eq_ignore_ascii_case(option.trim()))
}

pub fn fan_speed_selects(client: &DaikinClient) -> Vec<FanSpeedSelect> {
    client
        .thermostats()
        .values()
        .map(FanSpeedSelect::for_thermostat)
        .collect()
}
