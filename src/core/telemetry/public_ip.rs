//! One-shot background lookup of the externally visible address.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use parking_lot::Mutex;

use super::probe::PublicIpResolver;
use crate::error::{Result, VitalError};

pub const FETCHING: &str = "Fetching...";
pub const UNRESOLVED: &str = "—";
pub const DEFAULT_PUBLIC_IP_URL: &str = "https://api.ipify.org";

enum FetchState {
    Idle(Option<Box<dyn PublicIpResolver>>),
    InFlight(Arc<Mutex<Option<String>>>),
    Done,
}

/// Fire-and-forget fetch; `start` never blocks and `poll` collects the result
pub struct PublicIpFetch {
    state: FetchState,
}

impl PublicIpFetch {
    pub fn new(resolver: Option<Box<dyn PublicIpResolver>>) -> Self {
        Self {
            state: FetchState::Idle(resolver),
        }
    }

    pub fn is_started(&self) -> bool {
        !matches!(self.state, FetchState::Idle(_))
    }

    /// Launch the lookup once. Without a resolver the placeholder is
    /// returned right away.
    pub fn start(&mut self) -> Option<String> {
        let FetchState::Idle(resolver) = &mut self.state else {
            return None;
        };
        let Some(resolver) = resolver.take() else {
            self.state = FetchState::Done;
            return Some(UNRESOLVED.to_string());
        };

        let slot = Arc::new(Mutex::new(None));
        let writer = Arc::clone(&slot);
        let spawned = thread::Builder::new()
            .name("public-ip".into())
            .spawn(move || {
                let value = match resolver.resolve() {
                    Ok(ip) => ip,
                    Err(e) => {
                        warn!("Public IP lookup failed: {}", e);
                        UNRESOLVED.to_string()
                    }
                };
                *writer.lock() = Some(value);
            });

        match spawned {
            Ok(_) => {
                debug!("Public IP lookup started");
                self.state = FetchState::InFlight(slot);
                None
            }
            Err(e) => {
                warn!("Could not spawn public IP lookup: {}", e);
                self.state = FetchState::Done;
                Some(UNRESOLVED.to_string())
            }
        }
    }

    /// Take the result if the lookup has finished
    pub fn poll(&mut self) -> Option<String> {
        let FetchState::InFlight(slot) = &self.state else {
            return None;
        };
        let value = slot.lock().take()?;
        self.state = FetchState::Done;
        Some(value)
    }
}

/// Plain-text "what is my IP" endpoint over HTTPS
pub struct HttpPublicIp {
    url: String,
    timeout: Duration,
}

impl HttpPublicIp {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl Default for HttpPublicIp {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_IP_URL)
    }
}

impl PublicIpResolver for HttpPublicIp {
    fn resolve(&self) -> Result<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("vitalstat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let body = client.get(&self.url).send()?.error_for_status()?.text()?;
        let ip = body.trim();
        if ip.is_empty() {
            return Err(VitalError::transient("empty public IP response"));
        }
        Ok(ip.to_string())
    }
}
