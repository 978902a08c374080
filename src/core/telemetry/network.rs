//! Dynamic set of network interfaces with per-interface rates.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::time::Instant;

use log::debug;

use super::metrics::{InterfaceSummary, NetworkMetrics};
use super::probe::{AddressRecord, InterfaceCounters};

const LOOPBACK_NAMES: &[&str] = &["lo", "lo0"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkInterfaceState {
    pub bytes_in: u64,
    pub bytes_out: u64,
    /// Bytes per second since the previous update
    pub speed_in: f64,
    pub speed_out: f64,
    pub local_ip: Option<String>,
}

/// Interfaces seen with traffic on the latest update, keyed by name
#[derive(Debug, Clone, Default)]
pub struct NetworkInterfaceRegistry {
    interfaces: HashMap<String, NetworkInterfaceState>,
    order: Vec<String>,
    selected: usize,
    last_update: Option<Instant>,
    total_in: u64,
    total_out: u64,
}

impl NetworkInterfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one enumeration into the registry.
    ///
    /// Interfaces without traffic this round are dropped. Rates are only
    /// produced for interfaces already known at the previous update.
    pub fn update(
        &mut self,
        counters: &[InterfaceCounters],
        addresses: &[AddressRecord],
        now: Instant,
    ) {
        let elapsed = self
            .last_update
            .map(|prev| now.saturating_duration_since(prev).as_secs_f64());

        let mut active = HashSet::new();
        let mut total_in = 0u64;
        let mut total_out = 0u64;

        for counter in counters {
            if is_loopback(&counter.name) || (counter.bytes_in == 0 && counter.bytes_out == 0) {
                continue;
            }
            active.insert(counter.name.clone());
            total_in = total_in.saturating_add(counter.bytes_in);
            total_out = total_out.saturating_add(counter.bytes_out);

            match self.interfaces.get_mut(&counter.name) {
                Some(state) => {
                    match elapsed {
                        Some(dt) if dt > 0.0 => {
                            state.speed_in = counter.bytes_in.saturating_sub(state.bytes_in) as f64 / dt;
                            state.speed_out =
                                counter.bytes_out.saturating_sub(state.bytes_out) as f64 / dt;
                        }
                        _ => {}
                    }
                    state.bytes_in = counter.bytes_in;
                    state.bytes_out = counter.bytes_out;
                }
                None => {
                    debug!("network interface appeared: {}", counter.name);
                    self.interfaces.insert(
                        counter.name.clone(),
                        NetworkInterfaceState {
                            bytes_in: counter.bytes_in,
                            bytes_out: counter.bytes_out,
                            ..Default::default()
                        },
                    );
                }
            }
        }

        self.interfaces.retain(|name, _| {
            let keep = active.contains(name);
            if !keep {
                debug!("network interface dropped: {}", name);
            }
            keep
        });

        self.resolve_local_ips(addresses);

        let mut order: Vec<String> = self.interfaces.keys().cloned().collect();
        order.sort_by(|a, b| compare_interfaces(a, b));
        self.order = order;

        self.total_in = total_in;
        self.total_out = total_out;
        self.selected = self.clamp_index(self.selected);
        self.last_update = Some(now);
    }

    fn resolve_local_ips(&mut self, addresses: &[AddressRecord]) {
        for state in self.interfaces.values_mut() {
            state.local_ip = None;
        }
        for record in addresses {
            let IpAddr::V4(v4) = record.addr else {
                continue;
            };
            if v4.is_loopback() {
                continue;
            }
            if let Some(state) = self.interfaces.get_mut(&record.interface) {
                if state.local_ip.is_none() {
                    state.local_ip = Some(v4.to_string());
                }
            }
        }
    }

    fn clamp_index(&self, index: usize) -> usize {
        index.min(self.order.len().saturating_sub(1))
    }

    /// Interface names in selection order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&NetworkInterfaceState> {
        self.interfaces.get(name)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<(&str, &NetworkInterfaceState)> {
        let name = self.order.get(self.selected)?;
        self.interfaces.get(name).map(|state| (name.as_str(), state))
    }

    /// Stops at the last interface
    pub fn select_next(&mut self) -> bool {
        if self.selected + 1 < self.order.len() {
            self.selected += 1;
            true
        } else {
            false
        }
    }

    /// Stops at the first interface
    pub fn select_previous(&mut self) -> bool {
        if self.selected > 0 {
            self.selected -= 1;
            true
        } else {
            false
        }
    }

    pub fn totals(&self) -> (u64, u64) {
        (self.total_in, self.total_out)
    }

    /// Write the selected interface and aggregates into `metrics`
    pub fn write_metrics(&self, metrics: &mut NetworkMetrics) {
        metrics.interfaces = self
            .order
            .iter()
            .filter_map(|name| {
                self.interfaces.get(name).map(|state| InterfaceSummary {
                    name: name.clone(),
                    display_name: display_name(name),
                    speed_in: state.speed_in,
                    speed_out: state.speed_out,
                    local_ip: state.local_ip.clone(),
                })
            })
            .collect();
        metrics.total_in_bytes = self.total_in;
        metrics.total_out_bytes = self.total_out;

        match self.selected() {
            Some((name, state)) => {
                metrics.selected_interface = Some(name.to_string());
                metrics.speed_in = state.speed_in;
                metrics.speed_out = state.speed_out;
                metrics.local_ip = state.local_ip.clone();
            }
            None => {
                metrics.selected_interface = None;
                metrics.speed_in = 0.0;
                metrics.speed_out = 0.0;
                metrics.local_ip = None;
            }
        }
    }
}

fn is_loopback(name: &str) -> bool {
    LOOPBACK_NAMES.contains(&name)
}

fn selection_rank(name: &str) -> u8 {
    if name == "en0" {
        0
    } else if name.starts_with("en") {
        1
    } else {
        2
    }
}

/// "en0", then other "en*", then lexicographic
pub fn compare_interfaces(a: &str, b: &str) -> Ordering {
    selection_rank(a)
        .cmp(&selection_rank(b))
        .then_with(|| a.cmp(b))
}

/// Human label for an interface name
pub fn display_name(name: &str) -> String {
    if name == "en0" {
        return "Wi-Fi".to_string();
    }
    let labelled = |label: &str| format!("{} ({})", label, name);

    if name.starts_with("wl") {
        labelled("Wi-Fi")
    } else if name.starts_with("en") || name.starts_with("eth") {
        labelled("Ethernet")
    } else if name.starts_with("bridge") || name.starts_with("br") {
        "Bridge".to_string()
    } else if name.starts_with("utun") || name.starts_with("tun") || name.starts_with("wg") {
        labelled("VPN")
    } else if name.starts_with("awdl") {
        "AirDrop".to_string()
    } else if name.starts_with("llw") {
        "Low Latency WLAN".to_string()
    } else {
        name.to_string()
    }
}
