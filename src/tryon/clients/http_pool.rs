//! HTTP Client Pool for maintaining persistent connections per base URL.
//!
//! This module provides a singleton pool of reqwest::Client instances, one per base URL,
//! so repeated generate/upscale calls against the same service reuse connections
//! instead of paying for DNS lookups and TLS handshakes every time.
//!
//! The reqwest::Client is configured for long image requests:
//! - `pool_idle_timeout`: Keeps idle connections alive for 90 seconds
//! - `pool_max_idle_per_host`: Allows up to 10 idle connections per host
//! - `tcp_keepalive`: Sends keepalive packets every 60 seconds
//! - `timeout`: 300 seconds for the whole request; image generation is slow

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

lazy_static! {
    /// Global HTTP client pool, lazily initialized on first access.
    static ref HTTP_CLIENT_POOL: Mutex<HashMap<String, reqwest::Client>> =
        Mutex::new(HashMap::new());
}

/// Get or create a shared HTTP client for the given base URL.
///
/// # Arguments
/// * `base_url` - The base URL for which to get/create an HTTP client
///
/// # Returns
/// A cloned reqwest::Client sharing the pooled connections, or the builder error
/// if the TLS backend could not be initialized.
pub fn get_http_client(base_url: &str) -> Result<reqwest::Client, reqwest::Error> {
    let mut pool = HTTP_CLIENT_POOL
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(client) = pool.get(base_url) {
        return Ok(client.clone());
    }

    let client = reqwest::ClientBuilder::new()
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .pool_max_idle_per_host(10)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .timeout(Duration::from_secs(300))
        .build()?;

    pool.insert(base_url.to_string(), client.clone());
    Ok(client)
}
