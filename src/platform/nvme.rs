//! SSD wear from the NVMe SMART / Health Information log page.

use std::path::PathBuf;

use crate::core::telemetry::SsdHealthProbe;
use crate::error::{Result, VitalError};

const SMART_LOG_LEN: usize = 512;
const LOG_PAGE_SMART: u32 = 0x02;
const OPCODE_GET_LOG_PAGE: u8 = 0x02;
const NSID_ALL: u32 = 0xFFFF_FFFF;

/// Fields of interest from the SMART log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmartLog {
    pub critical_warning: u8,
    pub percentage_used: u8,
}

impl SmartLog {
    pub fn parse(page: &[u8]) -> Result<Self> {
        if page.len() < 6 {
            return Err(VitalError::transient("short SMART log"));
        }
        Ok(Self {
            critical_warning: page[0],
            percentage_used: page[5],
        })
    }

    /// percentage_used may exceed 100 on worn drives
    pub fn life_remaining(&self) -> u8 {
        100u8.saturating_sub(self.percentage_used)
    }
}

/// Reads controller devices for wear and namespace devices for the
/// overall verdict, which are often readable by different groups.
pub struct NvmeHealthProbe {
    controllers: Vec<PathBuf>,
    namespaces: Vec<PathBuf>,
}

impl NvmeHealthProbe {
    pub fn new() -> Self {
        Self {
            controllers: vec![PathBuf::from("/dev/nvme0"), PathBuf::from("/dev/nvme1")],
            namespaces: vec![PathBuf::from("/dev/nvme0n1"), PathBuf::from("/dev/nvme1n1")],
        }
    }

    fn first_log(paths: &[PathBuf]) -> Result<SmartLog> {
        let mut last = VitalError::unavailable("no NVMe device");
        for path in paths {
            match read_smart_log(path) {
                Ok(log) => return Ok(log),
                Err(e) => last = e,
            }
        }
        Err(last)
    }
}

impl Default for NvmeHealthProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SsdHealthProbe for NvmeHealthProbe {
    fn life_remaining(&mut self) -> Result<u8> {
        Self::first_log(&self.controllers).map(|log| log.life_remaining())
    }

    fn smart_status_ok(&mut self) -> Result<bool> {
        Self::first_log(&self.namespaces).map(|log| log.critical_warning == 0)
    }
}

#[cfg(target_os = "linux")]
#[repr(C)]
#[derive(Default)]
struct NvmeAdminCmd {
    opcode: u8,
    flags: u8,
    rsvd1: u16,
    nsid: u32,
    cdw2: u32,
    cdw3: u32,
    metadata: u64,
    addr: u64,
    metadata_len: u32,
    data_len: u32,
    cdw10: u32,
    cdw11: u32,
    cdw12: u32,
    cdw13: u32,
    cdw14: u32,
    cdw15: u32,
    timeout_ms: u32,
    result: u32,
}

/// _IOWR('N', 0x41, struct nvme_admin_cmd)
#[cfg(target_os = "linux")]
const NVME_IOCTL_ADMIN_CMD: u64 = 0xC048_4E41;

#[cfg(target_os = "linux")]
fn read_smart_log(path: &std::path::Path) -> Result<SmartLog> {
    use std::fs::File;
    use std::os::unix::io::AsRawFd;

    let device = File::open(path)?;
    let mut page = [0u8; SMART_LOG_LEN];
    let dwords = (SMART_LOG_LEN / 4 - 1) as u32;

    let mut cmd = NvmeAdminCmd {
        opcode: OPCODE_GET_LOG_PAGE,
        nsid: NSID_ALL,
        addr: page.as_mut_ptr() as u64,
        data_len: SMART_LOG_LEN as u32,
        cdw10: (dwords << 16) | LOG_PAGE_SMART,
        ..Default::default()
    };

    // SAFETY: cmd is a correctly sized nvme_admin_cmd and addr points at a
    // live buffer of data_len bytes for the duration of the call.
    let rc = unsafe { libc::ioctl(device.as_raw_fd(), NVME_IOCTL_ADMIN_CMD as _, &mut cmd) };
    if rc < 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    if rc > 0 {
        return Err(VitalError::transient(format!(
            "{}: NVMe status {:#x}",
            path.display(),
            rc
        )));
    }

    SmartLog::parse(&page)
}

#[cfg(not(target_os = "linux"))]
fn read_smart_log(path: &std::path::Path) -> Result<SmartLog> {
    Err(VitalError::unavailable(format!(
        "{}: NVMe passthrough not supported on this platform",
        path.display()
    )))
}
