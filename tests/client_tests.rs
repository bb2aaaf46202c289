use std::sync::{Arc, Mutex};
use std::time::Duration;

use daikin_one::{
    build_dashboard, config_entry_diagnostics, create_entry, device_diagnostics, fan_speed_selects,
    sensor_entities, Credentials, DaikinClient, DaikinClientBuilder, DashboardOptions, Error,
    Event, FanMode, FanSpeed, HvacMode, MessageLogMode, SensorValue, SetTemperature, Temperature,
    ThermostatMode, UidSchema,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn device_data() -> Value {
    json!({
        "mode": 1,
        "equipmentStatus": 5,
        "fanCirculate": 0,
        "fanCirculateSpeed": 0,
        "schedEnabled": false,
        "tempIndoor": 21.0,
        "humIndoor": 40,
        "hspActive": 20.0,
        "cspActive": 25.0,
        "ctSystemCapHeat": true,
        "ctSystemCapCool": true,
        "tempOutdoor": 5.0,
        "humOutdoor": 70,
        "ctAHUnitType": 1,
        "ctAHModelNoCharacter1_15": "MBVC",
        "ctAHCurrentIndoorAirflow": 800,
        "ctAHFanCurrentDemandStatus": 100,
        "ctIndoorPower": 150,
        "ctOutdoorUnitType": 255
    })
}

fn with(mut data: Value, changes: Value) -> Value {
    if let (Some(obj), Some(changes)) = (data.as_object_mut(), changes.as_object()) {
        for (k, v) in changes {
            obj.insert(k.clone(), v.clone());
        }
    }
    data
}

fn builder(server: &MockServer) -> DaikinClientBuilder {
    DaikinClient::builder(Credentials::new("me@example.com", "secret"))
        .base_url(server.uri())
        .settle(Duration::from_millis(10), Duration::from_millis(50))
}

/// Login, locations and a single thermostat "Upstairs" (t1).
async fn mount_account(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/users/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "access-1", "refreshToken": "refresh-1"})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/locations"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "loc1", "name": "Home", "address": "1 Main St"}])),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "t1",
            "locationId": "loc1",
            "name": "Upstairs",
            "model": "ONEPLUS",
            "firmwareVersion": "3.2.19",
            "online": true
        }])))
        .mount(server)
        .await;
}

async fn mount_device_data(server: &MockServer, data: Value, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path("/deviceData/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

async fn mount_put(server: &MockServer, body: Value, times: u64) {
    Mock::given(method("PUT"))
        .and(path("/deviceData/t1"))
        .and(body_json(body))
        .respond_with(ResponseTemplate::new(200))
        .expect(times)
        .mount(server)
        .await;
}

async fn updated_client(server: &MockServer) -> DaikinClient {
    let mut client = builder(server).build().unwrap();
    client.update(false).await.expect("update should succeed");
    client
}

#[tokio::test]
async fn login_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/auth/login"))
        .and(body_json(json!({"email": "me@example.com", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "access-1", "refreshToken": "refresh-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = builder(&server).build().unwrap();
    assert!(!client.is_authenticated());
    client.login().await.expect("login should succeed");
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn login_rejected_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = builder(&server).build().unwrap();
    let err = client.login().await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "expected Auth, got {err:?}");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn login_without_tokens_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "a"})))
        .mount(&server)
        .await;

    let client = builder(&server).build().unwrap();
    assert!(matches!(client.login().await, Err(Error::Auth(_))));
}

#[tokio::test]
async fn update_caches_locations_thermostats_and_equipment() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), None).await;

    let client = updated_client(&server).await;

    assert_eq!(client.location("loc1").unwrap().address, "1 Main St");
    let t = client.thermostat("t1").unwrap();
    assert_eq!(t.name, "Upstairs");
    assert_eq!(t.mode, ThermostatMode::Heat);
    assert_eq!(t.set_point_heat, Temperature::from_celsius(20.0));
    assert!(t.online);

    let ah = client.equipment("t1-air_handler").unwrap();
    assert_eq!(ah.thermostat_id, "t1");
    assert_eq!(ah.model, "MBVC");
    assert!(client.equipment("t1-outdoor_unit").is_none());

    assert_eq!(client.raw_device_data("t1").unwrap()["humIndoor"], 40);
}

#[tokio::test]
async fn requests_carry_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deviceData/t1"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_data()))
        .expect(1)
        .mount(&server)
        .await;
    mount_account(&server).await;

    updated_client(&server).await;
}

#[tokio::test]
async fn unforced_updates_are_throttled() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    Mock::given(method("GET"))
        .and(path("/deviceData/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_data()))
        .expect(2)
        .mount(&server)
        .await;

    let mut client = updated_client(&server).await;
    client.update(false).await.unwrap();
    client.update(true).await.unwrap();
}

#[tokio::test]
async fn expired_token_is_refreshed_and_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locations"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/auth/token"))
        .and(body_json(json!({"email": "me@example.com", "refreshToken": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "access-2"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/devices"))
        .and(header("Authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    mount_account(&server).await;

    let client = updated_client(&server).await;
    assert!(client.thermostats().is_empty());
    assert_eq!(client.locations().len(), 1);
}

#[tokio::test]
async fn rejected_refresh_falls_back_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "access-1", "refreshToken": "refresh-1"})),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/locations"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/auth/token"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), None).await;

    let client = updated_client(&server).await;
    assert!(client.thermostat("t1").is_some());
}

#[tokio::test]
async fn unreadable_refresh_body_falls_back_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "access-1", "refreshToken": "refresh-1"})),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/locations"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), None).await;

    let client = updated_client(&server).await;
    assert!(client.thermostat("t1").is_some());
}

#[tokio::test]
async fn second_unauthorized_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locations"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "access-2"})))
        .mount(&server)
        .await;
    mount_account(&server).await;

    let mut client = builder(&server).build().unwrap();
    let err = client.update(false).await.unwrap_err();
    assert!(
        matches!(err, Error::Api { status: 401, .. }),
        "expected Api 401, got {err:?}"
    );
}

#[tokio::test]
async fn update_fires_events_and_snapshots() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), Some(1)).await;
    mount_device_data(&server, with(device_data(), json!({"tempIndoor": 22.5})), None).await;

    let events: Arc<Mutex<Vec<Event>>> = Arc::new(Mutex::new(vec![]));
    let events_clone = events.clone();
    let snapshots = Arc::new(Mutex::new(0usize));
    let snapshots_clone = snapshots.clone();

    let mut client = builder(&server)
        .on_event(move |event| events_clone.lock().unwrap().push(event.clone()))
        .on_snapshot(move |_| *snapshots_clone.lock().unwrap() += 1)
        .build()
        .unwrap();

    client.update(false).await.unwrap();
    events.lock().unwrap().clear();

    client.update(true).await.unwrap();
    let captured = events.lock().unwrap();
    assert_eq!(captured.len(), 1, "only the changed field should emit: {captured:?}");
    match &captured[0] {
        Event::IndoorTemperatureChanged { device_id, name, temp } => {
            assert_eq!(device_id, "t1");
            assert_eq!(name, "Upstairs");
            assert_eq!(temp.celsius(), 22.5);
        }
        other => panic!("expected IndoorTemperatureChanged, got {other:?}"),
    }
    assert_eq!(*snapshots.lock().unwrap(), 2);
}

#[tokio::test]
async fn set_mode_puts_and_settles() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), Some(1)).await;
    mount_device_data(&server, with(device_data(), json!({"mode": 2})), None).await;
    mount_put(&server, json!({"mode": 2}), 1).await;

    let modes: Arc<Mutex<Vec<ThermostatMode>>> = Arc::new(Mutex::new(vec![]));
    let modes_clone = modes.clone();
    let mut client = builder(&server)
        .on_snapshot(move |t| modes_clone.lock().unwrap().push(t.mode))
        .build()
        .unwrap();
    client.update(false).await.unwrap();

    client
        .set_thermostat_mode("t1", ThermostatMode::Cool)
        .await
        .expect("set mode should succeed");

    assert_eq!(client.thermostat("t1").unwrap().mode, ThermostatMode::Cool);
    // initial update, optimistic change, final update
    assert_eq!(
        *modes.lock().unwrap(),
        vec![ThermostatMode::Heat, ThermostatMode::Cool, ThermostatMode::Cool]
    );
}

#[tokio::test]
async fn command_gives_up_settling_and_refreshes() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), None).await;
    mount_put(&server, json!({"fanCirculate": 2}), 1).await;

    let mut client = updated_client(&server).await;
    client
        .set_thermostat_fan_mode("t1", FanMode::Scheduled)
        .await
        .expect("command should succeed even when the cloud lags");

    // the forced update restores what the cloud reports
    assert_eq!(client.thermostat("t1").unwrap().fan_mode, FanMode::Off);
}

#[tokio::test]
async fn set_points_reject_heat_above_cool() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), None).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = updated_client(&server).await;
    let err = client
        .set_thermostat_home_set_points(
            "t1",
            Some(Temperature::from_celsius(25.0)),
            Some(Temperature::from_celsius(20.0)),
            false,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSetPoints { .. }));

    let err = client
        .set_thermostat_home_set_points("t1", None, None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
async fn command_for_unknown_device_fails() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), None).await;

    let mut client = updated_client(&server).await;
    let err = client
        .set_thermostat_mode("nope", ThermostatMode::Off)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownDevice(id) if id == "nope"));
}

#[tokio::test]
async fn climate_set_temperature_overrides_schedule() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    let scheduled = with(device_data(), json!({"schedEnabled": true}));
    mount_device_data(&server, scheduled.clone(), Some(1)).await;
    mount_device_data(&server, with(scheduled, json!({"hspActive": 21.5})), None).await;
    mount_put(&server, json!({"hspHome": 21.5, "schedOverride": 1}), 1).await;

    let mut client = updated_client(&server).await;
    client
        .climate("t1")
        .set_temperature(SetTemperature {
            temperature: Some(21.5),
            ..Default::default()
        })
        .await
        .unwrap();

    let state = client.climate("t1").state().unwrap();
    assert_eq!(state.hvac_mode, HvacMode::Heat);
    assert_eq!(state.target_temperature, Some(21.5));
}

#[tokio::test]
async fn climate_hvac_modes_map_to_daikin_modes() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), None).await;
    mount_put(&server, json!({"mode": 3}), 1).await;
    mount_put(&server, json!({"mode": 1}), 1).await;
    mount_put(&server, json!({"mode": 2}), 1).await;
    mount_put(&server, json!({"mode": 0}), 1).await;

    let mut client = updated_client(&server).await;
    let mut climate = client.climate("t1");
    for mode in [HvacMode::HeatCool, HvacMode::Heat, HvacMode::Cool, HvacMode::Off] {
        climate.set_hvac_mode(mode).await.unwrap();
    }
}

#[tokio::test]
async fn climate_turn_on_uses_best_mode_and_turn_off_sets_off() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    let off = with(device_data(), json!({"mode": 0}));
    mount_device_data(&server, off.clone(), Some(1)).await;
    mount_device_data(&server, with(off.clone(), json!({"mode": 3})), Some(2)).await;
    mount_device_data(&server, off, None).await;
    mount_put(&server, json!({"mode": 3}), 1).await;
    mount_put(&server, json!({"mode": 0}), 1).await;

    let mut client = updated_client(&server).await;
    client.climate("t1").turn_on().await.unwrap();
    assert_eq!(client.climate("t1").state().unwrap().hvac_mode, HvacMode::HeatCool);

    client.climate("t1").turn_off().await.unwrap();
    assert_eq!(client.climate("t1").state().unwrap().hvac_mode, HvacMode::Off);
}

#[tokio::test]
async fn climate_turn_on_heat_only_system_heats() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    let data = with(device_data(), json!({"mode": 0, "ctSystemCapCool": false}));
    mount_device_data(&server, data, None).await;
    mount_put(&server, json!({"mode": 1}), 1).await;

    let mut client = updated_client(&server).await;
    client.climate("t1").turn_on().await.unwrap();
}

#[tokio::test]
async fn climate_turn_on_without_heat_or_cool_is_rejected() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    let data = with(
        device_data(),
        json!({"mode": 0, "ctSystemCapHeat": false, "ctSystemCapCool": false}),
    );
    mount_device_data(&server, data, None).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = updated_client(&server).await;
    assert_eq!(client.climate("t1").state().unwrap().hvac_modes, vec![HvacMode::Off]);
    let err = client.climate("t1").turn_on().await.unwrap_err();
    assert!(matches!(err, Error::InvalidMode(_)), "expected InvalidMode, got {err:?}");
}

#[tokio::test]
async fn climate_preset_modes_toggle_emergency_heat() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    let aux = with(device_data(), json!({"mode": 4}));
    mount_device_data(&server, aux, Some(1)).await;
    mount_device_data(&server, device_data(), None).await;
    mount_put(&server, json!({"mode": 1}), 1).await;
    mount_put(&server, json!({"mode": 4}), 1).await;

    let mut client = updated_client(&server).await;
    assert_eq!(client.thermostat("t1").unwrap().mode, ThermostatMode::AuxHeat);

    // leaving emergency heat returns to heat
    client.climate("t1").set_preset_mode("none").await.unwrap();
    assert_eq!(client.thermostat("t1").unwrap().mode, ThermostatMode::Heat);

    // already out of emergency heat, nothing is sent
    client.climate("t1").set_preset_mode("none").await.unwrap();

    client.climate("t1").set_preset_mode("emergency_heat").await.unwrap();

    let err = client.climate("t1").set_preset_mode("boost").await.unwrap_err();
    assert!(matches!(err, Error::InvalidMode(_)));
}

#[tokio::test]
async fn climate_fan_speed_turns_fan_on_first() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), Some(1)).await;
    mount_device_data(
        &server,
        with(device_data(), json!({"fanCirculate": 1, "fanCirculateSpeed": 1})),
        None,
    )
    .await;
    mount_put(&server, json!({"fanCirculate": 1}), 1).await;
    mount_put(&server, json!({"fanCirculateSpeed": 1}), 1).await;

    let mut client = updated_client(&server).await;
    client.climate("t1").set_fan_mode("medium").await.unwrap();

    let t = client.thermostat("t1").unwrap();
    assert_eq!(t.fan_mode, FanMode::AlwaysOn);
    assert_eq!(t.fan_speed, FanSpeed::Medium);

    let err = client.climate("t1").set_fan_mode("turbo").await.unwrap_err();
    assert!(matches!(err, Error::InvalidMode(_)));
}

#[tokio::test]
async fn fan_speed_select_sets_speed() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), Some(1)).await;
    mount_device_data(&server, with(device_data(), json!({"fanCirculateSpeed": 2})), None).await;
    mount_put(&server, json!({"fanCirculateSpeed": 2}), 1).await;

    let mut client = updated_client(&server).await;
    let selects = fan_speed_selects(&client);
    assert_eq!(selects.len(), 1);
    let select = &selects[0];
    assert_eq!(select.unique_id, "t1-fan_speed");
    assert_eq!(select.entity_id, "select.upstairs_thermostat_fan_speed");
    assert_eq!(select.options(), vec!["Low", "Medium", "High"]);
    assert_eq!(select.current_option(&client), Some("Low"));

    select.select_option(&mut client, "HIGH").await.unwrap();
    assert_eq!(select.current_option(&client), Some("High"));

    let err = select.select_option(&mut client, "turbo").await.unwrap_err();
    assert!(matches!(err, Error::InvalidMode(_)));
}

#[tokio::test]
async fn sensors_read_cached_values() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), None).await;

    let client = updated_client(&server).await;
    let sensors = sensor_entities(&client, UidSchema::V1);

    let airflow = sensors
        .iter()
        .find(|s| s.entity_id == "sensor.upstairs_air_handler_airflow")
        .expect("airflow sensor");
    assert_eq!(airflow.unique_id, "t1-air_handler-airflow");
    assert_eq!(airflow.value(&client), Some(SensorValue::Number(800.0)));

    let online = sensors.iter().find(|s| s.description.key == "online").unwrap();
    assert_eq!(online.value(&client), Some(SensorValue::Text("Online".to_string())));

    let outdoor = sensors
        .iter()
        .find(|s| s.description.key == "outdoor_temperature")
        .unwrap();
    assert_eq!(
        outdoor.value(&client),
        Some(SensorValue::Temperature(Temperature::from_celsius(5.0)))
    );
}

#[tokio::test]
async fn diagnostics_expose_raw_data() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), None).await;

    let client = updated_client(&server).await;

    let all = config_entry_diagnostics(&client);
    assert_eq!(all["raw"]["t1"], device_data());

    let equipment = device_diagnostics(&client, "t1-air_handler").unwrap();
    assert_eq!(equipment["raw"], device_data());

    assert!(matches!(
        device_diagnostics(&client, "missing"),
        Err(Error::UnknownDevice(_))
    ));
}

#[tokio::test]
async fn dashboard_layout_and_cards() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), None).await;

    let client = updated_client(&server).await;
    let view = build_dashboard(&client, &DashboardOptions::default());

    assert_eq!(view["type"], "custom:grid-layout");
    assert_eq!(view["layout"]["grid-template-columns"], "repeat(4, 1fr)");
    assert_eq!(
        view["layout"]["mediaquery"]["(max-width: 600px)"]["grid-template-columns"],
        "repeat(2, 1fr)"
    );

    let cards = view["cards"].as_array().unwrap();
    assert_eq!(cards[0], json!({"type": "thermostat", "entity": "climate.upstairs_thermostat"}));

    let titles: Vec<&str> = cards[1..]
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Upstairs Temperature",
            "Upstairs Humidity",
            "Upstairs Demand",
            "Upstairs Airflow",
            "Upstairs Power",
            "Outdoor",
        ]
    );

    let demand = cards[3]["entities"].as_array().unwrap();
    assert!(demand.contains(&json!("sensor.upstairs_air_handler_fan_demand_current")));
    assert_eq!(cards[1]["hours_to_show"], 24);
    assert_eq!(
        cards[6]["entities"],
        json!([
            "sensor.upstairs_thermostat_outdoor_temperature",
            "sensor.upstairs_thermostat_outdoor_humidity",
        ])
    );
}

#[tokio::test]
async fn config_flow_checks_credentials() {
    let server = MockServer::start().await;
    mount_account(&server).await;

    let entry = create_entry(builder(&server)).await.expect("flow should succeed");
    assert_eq!(entry.title.as_deref(), Some("Daikin One"));
    assert_eq!(entry.data.email, "me@example.com");
    assert_eq!(entry.uid_schema().unwrap(), UidSchema::V1);
}

#[tokio::test]
async fn config_flow_reports_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/auth/login"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = create_entry(builder(&server)).await.unwrap_err();
    assert_eq!(err.as_str(), "auth_failed");
}

#[tokio::test]
async fn message_log_records_traffic_without_secrets() {
    let server = MockServer::start().await;
    mount_account(&server).await;
    mount_device_data(&server, device_data(), None).await;

    let tmp = tempfile::NamedTempFile::new().unwrap();
    let mut client = builder(&server)
        .message_log(MessageLogMode::Full, tmp.path().to_str().unwrap())
        .build()
        .unwrap();
    client.update(false).await.unwrap();

    let log = std::fs::read_to_string(tmp.path()).unwrap();
    let lines: Vec<Value> = log.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert!(lines.iter().any(|l| l["dir"] == "req" && l["path"] == "/users/auth/login"));
    assert!(lines.iter().any(|l| l["dir"] == "data" && l["device"] == "t1"));
    assert!(!log.contains("secret"));
    assert!(!log.contains("refresh-1"));
}
