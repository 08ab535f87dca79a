/// Source of the current process's resident set size.
pub trait MemoryProbe: Send + Sync {
    fn resident_bytes(&self) -> Option<u64>;
}

/// Reads `/proc/self/statm` (Linux only).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcStatmProbe;

impl MemoryProbe for ProcStatmProbe {
    fn resident_bytes(&self) -> Option<u64> {
        read_rss_bytes()
    }
}

fn read_rss_bytes() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
        let resident_pages = parse_statm_resident(&statm)?;
        // Safety: sysconf is safe to call; we only read the page size.
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if page_size <= 0 {
            return None;
        }
        let page_size = u64::try_from(page_size).ok()?;
        Some(resident_pages.saturating_mul(page_size))
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Second field of statm: resident pages.
pub(super) fn parse_statm_resident(statm: &str) -> Option<u64> {
    let mut parts = statm.split_whitespace();
    let _size = parts.next()?;
    parts.next()?.parse::<u64>().ok()
}
