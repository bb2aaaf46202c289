use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

use futures::future::try_join_all;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, info, trace, warn};

use crate::device::parse_thermostat;
use crate::diff::device_events;
use crate::entity::ConstantBackoff;
use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{
    device_data_path, login_body, parse_login_response, parse_refresh_response, refresh_body,
    set_fan_mode_body, set_fan_speed_body, set_mode_body, set_points_body, DeviceEntry,
    LocationEntry, DEFAULT_BASE_URL, MIN_TIME_BETWEEN_UPDATES, PATH_DEVICES, PATH_LOCATIONS,
    PATH_LOGIN, PATH_REFRESH_TOKEN, SETTLE_INTERVAL, SETTLE_MAX_TIME,
};
use crate::types::*;
use crate::{Error, Result};

type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;
type SnapshotCallback = Box<dyn Fn(&Thermostat) + Send + Sync>;

#[derive(Clone)]
struct AuthTokens {
    access: String,
    refresh: String,
}

/// HTTP session with the Daikin cloud. Shared by concurrent device fetches,
/// so token and log state sit behind locks that are never held across an await.
struct Session {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    tokens: RwLock<Option<AuthTokens>>,
    logger: Option<Mutex<MessageLogger>>,
}

impl Session {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn tokens(&self) -> Option<AuthTokens> {
        self.tokens.read().ok().and_then(|t| t.clone())
    }

    fn store_tokens(&self, tokens: AuthTokens) {
        if let Ok(mut guard) = self.tokens.write() {
            *guard = Some(tokens);
        }
    }

    fn log_request(&self, method: &str, path: &str, status: u16, body: Option<&Value>) {
        if let Some(logger) = &self.logger
            && let Ok(mut logger) = logger.lock()
        {
            logger.log_request(method, path, status, body);
        }
    }

    fn log_command(&self, action: &str, device_id: &str, body: &Value) {
        if let Some(logger) = &self.logger
            && let Ok(mut logger) = logger.lock()
        {
            logger.log_command(action, device_id, body);
        }
    }

    fn log_device_data(&self, device_id: &str, body: &Value) {
        if let Some(logger) = &self.logger
            && let Ok(mut logger) = logger.lock()
        {
            logger.log_device_data(device_id, body);
        }
    }

    async fn login(&self) -> Result<()> {
        info!(email = %self.credentials.email, "logging in to Daikin API");
        let body = login_body(&self.credentials.email, &self.credentials.password);
        let resp = self.http.post(self.url(PATH_LOGIN)).json(&body).send().await?;
        let status = resp.status();
        self.log_request("POST", PATH_LOGIN, status.as_u16(), Some(&body));

        if status != StatusCode::OK {
            return Err(Error::Auth(format!("login request returned {status}")));
        }

        let payload: Value = resp.json().await?;
        let (access, refresh) = parse_login_response(&payload)?;
        self.store_tokens(AuthTokens { access, refresh });
        Ok(())
    }

    /// Refreshes the access token, falling back to a full login when there is
    /// no session or the refresh is rejected.
    async fn refresh_access_token(&self) -> Result<()> {
        let Some(tokens) = self.tokens() else {
            return self.login().await;
        };

        debug!("refreshing access token");
        let body = refresh_body(&self.credentials.email, &tokens.refresh);
        let resp = self
            .http
            .post(self.url(PATH_REFRESH_TOKEN))
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        self.log_request("POST", PATH_REFRESH_TOKEN, status.as_u16(), Some(&body));

        if status != StatusCode::OK {
            warn!(%status, "access token refresh rejected, logging in again");
            return self.login().await;
        }

        // an unreadable body counts as a failed refresh
        let access = match resp.json::<Value>().await {
            Ok(payload) => parse_refresh_response(&payload),
            Err(e) => Err(Error::from(e)),
        };
        match access {
            Ok(access) => {
                self.store_tokens(AuthTokens {
                    access,
                    refresh: tokens.refresh,
                });
                Ok(())
            }
            Err(e) => {
                warn!("{e}, logging in again");
                self.login().await
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        method_name: &'static str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut retried = false;
        loop {
            let tokens = match self.tokens() {
                Some(t) => t,
                None => {
                    self.login().await?;
                    self.tokens()
                        .ok_or_else(|| Error::Auth("no session after login".to_string()))?
                }
            };

            trace!(method = method_name, path, "sending request to Daikin API");
            let mut req = self
                .http
                .request(method.clone(), self.url(path))
                .bearer_auth(&tokens.access);
            if let Some(b) = body {
                req = req.json(b);
            }
            let resp = req.send().await?;
            let status = resp.status();
            self.log_request(method_name, path, status.as_u16(), body);

            if status == StatusCode::UNAUTHORIZED && !retried {
                retried = true;
                self.refresh_access_token().await?;
                continue;
            }

            if !status.is_success() {
                return Err(Error::Api {
                    method: method_name,
                    path: path.to_string(),
                    status: status.as_u16(),
                });
            }

            let text = resp.text().await?;
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&text)?);
        }
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.send(Method::GET, "GET", path, None).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.send(Method::PUT, "PUT", path, Some(body)).await
    }
}

pub struct DaikinClientBuilder {
    credentials: Credentials,
    base_url: String,
    event_callbacks: Vec<EventCallback>,
    snapshot_callbacks: Vec<SnapshotCallback>,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
    min_update_interval: Duration,
    settle_interval: Duration,
    settle_max_time: Duration,
}

impl DaikinClientBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            event_callbacks: Vec::new(),
            snapshot_callbacks: Vec::new(),
            log_mode: None,
            log_path: None,
            min_update_interval: MIN_TIME_BETWEEN_UPDATES,
            settle_interval: SETTLE_INTERVAL,
            settle_max_time: SETTLE_MAX_TIME,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Box::new(f));
        self
    }

    pub fn on_snapshot(mut self, f: impl Fn(&Thermostat) + Send + Sync + 'static) -> Self {
        self.snapshot_callbacks.push(Box::new(f));
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    /// Unforced updates within this interval of the last one are skipped.
    pub fn min_update_interval(mut self, interval: Duration) -> Self {
        self.min_update_interval = interval;
        self
    }

    /// Polling interval and time limit while waiting for a command to show
    /// up in the cloud state.
    pub fn settle(mut self, interval: Duration, max_time: Duration) -> Self {
        self.settle_interval = interval;
        self.settle_max_time = max_time;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn build(self) -> Result<DaikinClient> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder().default_headers(headers).build()?;

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(Mutex::new(MessageLogger::new(mode, &path)?)),
            _ => None,
        };

        Ok(DaikinClient {
            session: Session {
                http,
                base_url: self.base_url,
                credentials: self.credentials,
                tokens: RwLock::new(None),
                logger,
            },
            locations: BTreeMap::new(),
            entries: BTreeMap::new(),
            thermostats: BTreeMap::new(),
            raw: BTreeMap::new(),
            last_update: None,
            min_update_interval: self.min_update_interval,
            settle_interval: self.settle_interval,
            settle_max_time: self.settle_max_time,
            event_callbacks: self.event_callbacks,
            snapshot_callbacks: self.snapshot_callbacks,
        })
    }
}

/// Connection to the Daikin One+ cloud API plus the cached state of every
/// location and thermostat on the account.
pub struct DaikinClient {
    session: Session,
    locations: BTreeMap<String, Location>,
    entries: BTreeMap<String, DeviceEntry>,
    thermostats: BTreeMap<String, Thermostat>,
    raw: BTreeMap<String, Value>,
    last_update: Option<Instant>,
    min_update_interval: Duration,
    settle_interval: Duration,
    settle_max_time: Duration,
    event_callbacks: Vec<EventCallback>,
    snapshot_callbacks: Vec<SnapshotCallback>,
}

impl DaikinClient {
    pub fn builder(credentials: Credentials) -> DaikinClientBuilder {
        DaikinClientBuilder::new(credentials)
    }

    /// Logs in with the configured credentials and stores the auth tokens.
    pub async fn login(&self) -> Result<()> {
        self.session.login().await
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.tokens().is_some()
    }

    /// Fetches locations, devices and device data. Skipped when the last
    /// update was less than the minimum update interval ago, unless forced.
    pub async fn update(&mut self, force: bool) -> Result<()> {
        if !force
            && let Some(last) = self.last_update
            && last.elapsed() < self.min_update_interval
        {
            trace!("update throttled");
            return Ok(());
        }

        debug!("updating Daikin One data from cloud");
        self.refresh_locations().await?;
        self.refresh_devices().await?;
        self.last_update = Some(Instant::now());
        Ok(())
    }

    async fn refresh_locations(&mut self) -> Result<()> {
        let payload = self.session.get(PATH_LOCATIONS).await?;
        let entries: Vec<LocationEntry> = serde_json::from_value(payload)?;
        self.locations = entries
            .into_iter()
            .map(|l| {
                (
                    l.id.clone(),
                    Location {
                        id: l.id,
                        name: l.name,
                        address: l.address,
                    },
                )
            })
            .collect();
        info!(count = self.locations.len(), "cached locations");
        Ok(())
    }

    async fn refresh_devices(&mut self) -> Result<()> {
        let payload = self.session.get(PATH_DEVICES).await?;
        let entries: Vec<DeviceEntry> = serde_json::from_value(payload)?;

        let session = &self.session;
        let fetched = try_join_all(entries.into_iter().map(|entry| async move {
            let data = session.get(&device_data_path(&entry.id)).await?;
            Ok::<_, Error>((entry, data))
        }))
        .await?;

        let empty = Value::Object(Map::new());
        let mut events = Vec::new();
        let mut entries = BTreeMap::new();
        let mut thermostats = BTreeMap::new();
        let mut raw = BTreeMap::new();

        for (entry, data) in fetched {
            self.session.log_device_data(&entry.id, &data);

            let previous = self.raw.get(&entry.id).unwrap_or(&empty);
            events.extend(device_events(&entry.id, &entry.name, previous, &data));

            let thermostat = parse_thermostat(&entry, &data);
            thermostats.insert(entry.id.clone(), thermostat);
            raw.insert(entry.id.clone(), data);
            entries.insert(entry.id.clone(), entry);
        }

        self.entries = entries;
        self.thermostats = thermostats;
        self.raw = raw;
        info!(count = self.thermostats.len(), "cached devices");

        for event in &events {
            for cb in &self.event_callbacks {
                cb(event);
            }
        }
        for thermostat in self.thermostats.values() {
            for cb in &self.snapshot_callbacks {
                cb(thermostat);
            }
        }
        if !events.is_empty() {
            debug!(count = events.len(), "processed events from update");
        }
        Ok(())
    }

    pub fn locations(&self) -> &BTreeMap<String, Location> {
        &self.locations
    }

    pub fn location(&self, location_id: &str) -> Option<&Location> {
        self.locations.get(location_id)
    }

    pub fn thermostats(&self) -> &BTreeMap<String, Thermostat> {
        &self.thermostats
    }

    pub fn thermostat(&self, device_id: &str) -> Option<&Thermostat> {
        self.thermostats.get(device_id)
    }

    pub fn equipment(&self, equipment_id: &str) -> Option<&Equipment> {
        self.thermostats
            .values()
            .find_map(|t| t.equipment.get(equipment_id))
    }

    /// Raw device data as last fetched for a thermostat.
    pub fn raw_device_data(&self, device_id: &str) -> Option<&Value> {
        self.raw.get(device_id)
    }

    pub fn all_raw_device_data(&self) -> &BTreeMap<String, Value> {
        &self.raw
    }

    // -- Command methods --

    pub async fn set_thermostat_mode(
        &mut self,
        device_id: &str,
        mode: ThermostatMode,
    ) -> Result<()> {
        debug!(device = device_id, ?mode, "setting thermostat mode");
        self.command(
            device_id,
            "set_mode",
            set_mode_body(mode),
            |t| t.mode = mode,
            move |t| t.mode == mode,
        )
        .await
    }

    /// Sets the home heat and/or cool set points. Rejects a heat set point
    /// above the cool set point.
    pub async fn set_thermostat_home_set_points(
        &mut self,
        device_id: &str,
        heat: Option<Temperature>,
        cool: Option<Temperature>,
        override_schedule: bool,
    ) -> Result<()> {
        if heat.is_none() && cool.is_none() {
            return Err(Error::InvalidRequest("no set points given".to_string()));
        }
        if let (Some(h), Some(c)) = (heat, cool)
            && h.celsius() > c.celsius()
        {
            return Err(Error::InvalidSetPoints {
                heat_c: h.celsius(),
                cool_c: c.celsius(),
            });
        }

        debug!(
            device = device_id,
            ?heat,
            ?cool,
            override_schedule,
            "setting thermostat set points"
        );
        self.command(
            device_id,
            "set_set_points",
            set_points_body(heat, cool, override_schedule),
            |t| {
                if let Some(h) = heat {
                    t.set_point_heat = h;
                }
                if let Some(c) = cool {
                    t.set_point_cool = c;
                }
            },
            move |t| {
                heat.is_none_or(|h| t.set_point_heat == h)
                    && cool.is_none_or(|c| t.set_point_cool == c)
            },
        )
        .await
    }

    pub async fn set_thermostat_fan_mode(&mut self, device_id: &str, mode: FanMode) -> Result<()> {
        debug!(device = device_id, ?mode, "setting fan mode");
        self.command(
            device_id,
            "set_fan_mode",
            set_fan_mode_body(mode),
            |t| t.fan_mode = mode,
            move |t| t.fan_mode == mode,
        )
        .await
    }

    pub async fn set_thermostat_fan_speed(
        &mut self,
        device_id: &str,
        speed: FanSpeed,
    ) -> Result<()> {
        debug!(device = device_id, ?speed, "setting fan speed");
        self.command(
            device_id,
            "set_fan_speed",
            set_fan_speed_body(speed),
            |t| t.fan_speed = speed,
            move |t| t.fan_speed == speed,
        )
        .await
    }

    // -- Helpers --

    /// Sends a change, applies it to the cache optimistically, waits for the
    /// cloud to report it, then runs a forced full update either way.
    async fn command(
        &mut self,
        device_id: &str,
        action: &str,
        body: Value,
        optimistic_update: impl FnOnce(&mut Thermostat),
        check: impl Fn(&Thermostat) -> bool,
    ) -> Result<()> {
        if !self.thermostats.contains_key(device_id) {
            return Err(Error::UnknownDevice(device_id.to_string()));
        }

        self.session.log_command(action, device_id, &body);
        self.session.put(&device_data_path(device_id), &body).await?;

        if let Some(thermostat) = self.thermostats.get_mut(device_id) {
            optimistic_update(thermostat);
            for cb in &self.snapshot_callbacks {
                cb(thermostat);
            }
        }

        if self.wait_for_updated_value(device_id, &check).await? {
            debug!(device = device_id, action, "finished waiting for updated value");
        } else {
            debug!(device = device_id, action, "gave up waiting for updated value");
        }

        self.update(true).await
    }

    /// Polls one device until `check` passes or the settle time runs out.
    /// Fetched state is only inspected here, never committed to the cache.
    async fn wait_for_updated_value(
        &self,
        device_id: &str,
        check: &impl Fn(&Thermostat) -> bool,
    ) -> Result<bool> {
        let backoff = ConstantBackoff::new(self.settle_interval, self.settle_max_time);
        loop {
            let data = self.session.get(&device_data_path(device_id)).await?;
            if let Some(entry) = self.entries.get(device_id)
                && check(&parse_thermostat(entry, &data))
            {
                return Ok(true);
            }
            match backoff.next_delay() {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return Ok(false),
            }
        }
    }
}
