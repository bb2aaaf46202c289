use daikin_one::{build_dashboard, Credentials, DaikinClient, DashboardOptions};
use std::env;

/// Prints the dashboard view as JSON (also valid YAML) for the account in
/// DAIKIN_EMAIL / DAIKIN_PASSWORD.
#[tokio::main]
async fn main() -> daikin_one::Result<()> {
    tracing_subscriber::fmt::init();

    let credentials = Credentials::new(
        env::var("DAIKIN_EMAIL").unwrap_or_default(),
        env::var("DAIKIN_PASSWORD").unwrap_or_default(),
    );

    let mut client = DaikinClient::builder(credentials).build()?;
    client.update(true).await?;

    let view = build_dashboard(&client, &DashboardOptions::default());
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
