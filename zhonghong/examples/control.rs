//! Unit control example

use std::time::Duration;
use tokio::time::sleep;
use zhonghong::{FanSpeed, Hub, HubConfig, Mode};

#[tokio::main]
async fn main() -> zhonghong::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let host = std::env::var("ZHONGHONG_HOST").unwrap_or_else(|_| "192.168.1.50".to_string());

    let hub = Hub::connect(HubConfig::new(host)).await;

    // Cool outdoor unit 1 / indoor unit 1 to 24°C
    println!("Cooling unit 1_1...");
    hub.turn_on(1, 1).await;
    hub.set_mode(1, 1, "cool".parse::<Mode>()?).await;
    hub.set_fan(1, 1, FanSpeed::Medium).await;
    hub.set_temperature(1, 1, 24).await;
    sleep(Duration::from_secs(3)).await;

    // Commands are not acknowledged; ask for fresh state instead
    hub.query_all().await;
    sleep(Duration::from_secs(2)).await;

    for status in hub.devices() {
        println!("{}", status);
    }

    println!("Turning unit 1_1 off...");
    hub.turn_off(1, 1).await;

    hub.stop().await;

    Ok(())
}
