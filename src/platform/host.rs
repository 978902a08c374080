//! Host probe backed by sysinfo, with `/proc` parsers for the counters
//! sysinfo only exposes as derived percentages.

use std::fs;

use battery::units::{energy::watt_hour, power::watt, ratio::percent, time::second};
use log::trace;
use sysinfo::{
    CpuRefreshKind, Disks, MemoryRefreshKind, Networks, ProcessesToUpdate, RefreshKind, System,
};

use crate::core::telemetry::{
    AddressRecord, BatteryReading, CoreTicks, HostProbe, InterfaceCounters, MemoryReading,
    SystemReading, VolumeReading,
};
use crate::error::{Result, VitalError};

const ROOT_MOUNT: &str = "/";

pub struct SysinfoHost {
    system: System,
    networks: Networks,
    disks: Disks,
}

impl SysinfoHost {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_frequency())
            .with_memory(MemoryRefreshKind::everything());

        Self {
            system: System::new_with_specifics(refresh_kind),
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-core counters from `/proc/stat`; the aggregate `cpu` line is skipped.
///
/// irq, softirq and steal count as system time; iowait counts as idle.
pub fn parse_proc_stat(content: &str) -> Vec<CoreTicks> {
    content
        .lines()
        .filter(|line| {
            line.strip_prefix("cpu")
                .and_then(|rest| rest.chars().next())
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false)
        })
        .filter_map(|line| {
            let fields: Vec<u64> = line
                .split_whitespace()
                .skip(1)
                .map(|v| v.parse::<u64>().unwrap_or(0))
                .collect();
            if fields.len() < 4 {
                return None;
            }
            let at = |i: usize| fields.get(i).copied().unwrap_or(0);
            Some(CoreTicks {
                user: at(0),
                nice: at(1),
                system: at(2) + at(5) + at(6) + at(7),
                idle: at(3) + at(4),
            })
        })
        .collect()
}

/// Value in kB for `key` from `/proc/meminfo`
fn meminfo_kb(content: &str, key: &str) -> Option<u64> {
    content.lines().find_map(|line| {
        let (name, rest) = line.split_once(':')?;
        if name.trim() != key {
            return None;
        }
        rest.split_whitespace().next()?.parse().ok()
    })
}

/// Map `/proc/meminfo` onto active / wired / compressed page classes
pub fn parse_meminfo(content: &str, page_size: u64) -> Result<MemoryReading> {
    let total_kb = meminfo_kb(content, "MemTotal")
        .ok_or_else(|| VitalError::transient("MemTotal missing from /proc/meminfo"))?;
    let kb = |key: &str| meminfo_kb(content, key).unwrap_or(0);
    let pages = |kib: u64| kib * 1024 / page_size.max(1);

    let wired_kb = kb("Unevictable") + kb("SUnreclaim") + kb("KernelStack") + kb("PageTables");
    let swap_total_kb = kb("SwapTotal");

    Ok(MemoryReading {
        total_bytes: total_kb * 1024,
        page_size,
        active_pages: pages(kb("Active")),
        wired_pages: pages(wired_kb),
        compressed_pages: pages(kb("Zswap")),
        swap_total_bytes: swap_total_kb * 1024,
        swap_used_bytes: swap_total_kb.saturating_sub(kb("SwapFree")) * 1024,
    })
}

fn page_size() -> u64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf has no preconditions.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            return size as u64;
        }
    }
    4096
}

fn count_pids(proc_root: &str) -> Option<usize> {
    let entries = fs::read_dir(proc_root).ok()?;
    Some(
        entries
            .flatten()
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|n| n.bytes().all(|b| b.is_ascii_digit()))
                    .unwrap_or(false)
            })
            .count(),
    )
}

impl HostProbe for SysinfoHost {
    fn cpu_ticks(&mut self) -> Result<Vec<CoreTicks>> {
        if cfg!(target_os = "linux") {
            let content = fs::read_to_string("/proc/stat")?;
            let ticks = parse_proc_stat(&content);
            if ticks.is_empty() {
                return Err(VitalError::transient("no per-core lines in /proc/stat"));
            }
            Ok(ticks)
        } else {
            Err(VitalError::unavailable("per-core tick counters"))
        }
    }

    fn cpu_model(&mut self) -> Option<String> {
        self.system.refresh_cpu_specifics(CpuRefreshKind::nothing());
        self.system
            .cpus()
            .first()
            .map(|c| c.brand().trim().to_string())
            .filter(|b| !b.is_empty())
    }

    fn cpu_frequency_mhz(&mut self) -> Result<u64> {
        self.system.refresh_cpu_frequency();
        self.system
            .cpus()
            .iter()
            .map(|c| c.frequency())
            .max()
            .ok_or_else(|| VitalError::unavailable("cpu frequency"))
    }

    fn memory(&mut self) -> Result<MemoryReading> {
        if cfg!(target_os = "linux") {
            let content = fs::read_to_string("/proc/meminfo")?;
            return parse_meminfo(&content, page_size());
        }

        self.system.refresh_memory();
        let page_size = page_size();
        Ok(MemoryReading {
            total_bytes: self.system.total_memory(),
            page_size,
            active_pages: self.system.used_memory() / page_size,
            wired_pages: 0,
            compressed_pages: 0,
            swap_total_bytes: self.system.total_swap(),
            swap_used_bytes: self.system.used_swap(),
        })
    }

    fn network_interfaces(&mut self) -> Result<Vec<InterfaceCounters>> {
        self.networks.refresh(true);
        Ok(self
            .networks
            .iter()
            .map(|(name, data)| {
                InterfaceCounters::new(name.clone(), data.total_received(), data.total_transmitted())
            })
            .collect())
    }

    fn interface_addresses(&mut self) -> Result<Vec<AddressRecord>> {
        Ok(self
            .networks
            .iter()
            .flat_map(|(name, data)| {
                data.ip_networks().iter().map(move |net| AddressRecord {
                    interface: name.clone(),
                    addr: net.addr,
                })
            })
            .collect())
    }

    fn root_volume(&mut self) -> Result<VolumeReading> {
        self.disks.refresh(true);
        let disk = self
            .disks
            .iter()
            .find(|d| d.mount_point().to_str() == Some(ROOT_MOUNT))
            .ok_or_else(|| VitalError::unavailable("no volume mounted at /"))?;

        Ok(VolumeReading {
            name: disk.name().to_string_lossy().to_string(),
            total_bytes: disk.total_space(),
            available_bytes: disk.available_space(),
        })
    }

    fn internal_battery(&mut self) -> Result<Option<BatteryReading>> {
        let manager = battery::Manager::new()
            .map_err(|e| VitalError::unavailable(format!("battery manager: {}", e)))?;
        let batteries = manager
            .batteries()
            .map_err(|e| VitalError::transient(format!("battery scan: {}", e)))?;

        for candidate in batteries {
            let battery = match candidate {
                Ok(battery) => battery,
                Err(e) => {
                    trace!("skipping unreadable battery: {}", e);
                    continue;
                }
            };

            let full = battery.energy_full().get::<watt_hour>();
            let level_percent = if full > 0.0 {
                battery.energy().get::<watt_hour>() / full * 100.0
            } else {
                battery.state_of_charge().get::<percent>()
            };
            let charging = matches!(
                battery.state(),
                battery::State::Charging | battery::State::Full
            );
            let rate = battery.energy_rate().get::<watt>();

            return Ok(Some(BatteryReading {
                level_percent,
                charging,
                time_to_empty_minutes: battery
                    .time_to_empty()
                    .map(|t| (t.get::<second>() / 60.0) as u32),
                energy_rate_watts: (rate > 0.0).then_some(rate),
            }));
        }

        Ok(None)
    }

    fn system(&mut self) -> Result<SystemReading> {
        let load = System::load_average();
        let process_count = match count_pids("/proc") {
            Some(count) if cfg!(target_os = "linux") => count,
            _ => {
                self.system.refresh_processes(ProcessesToUpdate::All, true);
                self.system.processes().len()
            }
        };

        Ok(SystemReading {
            boot_time: System::boot_time(),
            load_average: [load.one, load.five, load.fifteen],
            process_count,
            kernel_release: System::kernel_version().unwrap_or_default(),
            host_name: System::host_name(),
        })
    }
}
