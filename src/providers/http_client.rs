use reqwest::Client;
use std::time::Duration;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(120);

/// Pooled client for provider calls. A full narrative set can take a while.
pub fn build_provider_client() -> Client {
    build_http_client(Some(PROVIDER_TIMEOUT))
}

/// `timeout: None` leaves the whole-request deadline to the transport;
/// connecting is always bounded.
pub fn build_http_client(timeout: Option<Duration>) -> Client {
    let builder = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60));
    let builder = match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    };
    builder.build().unwrap_or_else(|error| {
        tracing::warn!(%error, "http client builder failed; using defaults");
        Client::new()
    })
}
