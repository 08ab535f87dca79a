use std::time::Duration;

/// User plus system CPU time consumed by this process so far, or `None` when
/// the platform does not expose it.
#[must_use]
pub fn process_cpu_time() -> Option<Duration> {
    #[cfg(unix)]
    {
        let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
        // Safety: RUSAGE_SELF is a valid target and `usage` points to writable
        // memory large enough for a `rusage`.
        let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
        if rc != 0 {
            return None;
        }
        // Safety: getrusage returned 0, so the struct was filled in; it was
        // also zero-initialised beforehand.
        let usage = unsafe { usage.assume_init() };
        let user = timeval_to_duration(usage.ru_utime)?;
        let system = timeval_to_duration(usage.ru_stime)?;
        Some(user.saturating_add(system))
    }
    #[cfg(not(unix))]
    {
        None
    }
}

#[cfg(unix)]
fn timeval_to_duration(value: libc::timeval) -> Option<Duration> {
    let secs = u64::try_from(value.tv_sec).ok()?;
    let micros = u64::try_from(value.tv_usec).ok()?;
    Some(Duration::from_secs(secs).saturating_add(Duration::from_micros(micros)))
}
