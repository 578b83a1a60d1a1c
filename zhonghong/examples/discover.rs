//! Discover every unit behind a gateway and print status pushes

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use zhonghong::{DeviceStatus, Hub, HubConfig};

#[tokio::main]
async fn main() -> zhonghong::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    // Change to your gateway IP
    let host = std::env::var("ZHONGHONG_HOST").unwrap_or_else(|_| "192.168.1.50".to_string());
    let gateway = std::env::var("ZHONGHONG_GATEWAY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);

    println!("Connecting to {} (gateway {})...", host, gateway);

    let hub = Hub::connect(HubConfig::new(host).with_gateway_address(gateway)).await;

    let addresses = match hub.discover().await {
        Ok(addresses) => addresses,
        Err(e) => {
            hub.stop().await;
            return Err(e);
        }
    };
    println!("✓ Found {} unit(s)", addresses.len());

    for address in addresses {
        if let Some(status) = hub.device(&address) {
            println!("  {}", status);
        }
        hub.subscribe(address, |status: &DeviceStatus| println!("PUSH >> {}", status));
    }

    // Watch for updates
    tokio::time::sleep(Duration::from_secs(120)).await;

    hub.stop().await;
    println!("✓ Stopped");

    Ok(())
}
