use std::time::Duration;

/// Shared client for service-to-service calls.
pub fn service_client() -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(3))
        .build()?;
    Ok(client)
}
