use daikin_one::{ConfigEntry, Credentials, DaikinClient, MessageLogMode};
use std::env;
use std::time::Duration;

/// Usage: monitor [config.json] [--log <path>]
/// Without a config file, credentials come from DAIKIN_EMAIL and DAIKIN_PASSWORD.
#[tokio::main]
async fn main() -> daikin_one::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let log_path = args
        .iter()
        .position(|a| a == "--log")
        .and_then(|i| args.get(i + 1));
    let config_path = args.get(1).filter(|a| !a.starts_with("--"));

    let credentials = match config_path {
        Some(path) => {
            let mut entry = ConfigEntry::load(path)?;
            if entry.migrate()? {
                entry.save(path)?;
            }
            entry.credentials()
        }
        None => Credentials::new(
            env::var("DAIKIN_EMAIL").unwrap_or_default(),
            env::var("DAIKIN_PASSWORD").unwrap_or_default(),
        ),
    };

    let mut builder = DaikinClient::builder(credentials)
        .on_event(|event| {
            println!("{event:?}");
        })
        .on_snapshot(|t| {
            println!(
                "[{}] {:.1}\u{00b0}C / {:.1}\u{00b0}F {:.0}% | mode: {:?} | status: {:?} \
                 | fan: {:?} {:?}{}",
                t.name,
                t.indoor_temperature.celsius(),
                t.indoor_temperature.fahrenheit(),
                t.indoor_humidity,
                t.mode,
                t.status,
                t.fan_mode,
                t.fan_speed,
                if t.online { "" } else { " | OFFLINE" },
            );
            if let Some(outdoor) = t.outdoor_temperature {
                println!(
                    "Outdoor: {:.1}\u{00b0}C / {:.1}\u{00b0}F",
                    outdoor.celsius(),
                    outdoor.fahrenheit(),
                );
            }
        });

    if let Some(path) = log_path {
        builder = builder.message_log(MessageLogMode::Diffed, path);
    }

    let mut client = builder.build()?;

    println!("Logging in...");
    client.login().await?;
    println!("Logged in. Polling for updates...");

    loop {
        if let Err(e) = client.update(false).await {
            eprintln!("Update error: {e}");
        }
        tokio::time::sleep(Duration::from_secs(30)).await;
    }
}
