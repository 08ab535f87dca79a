//! Best-effort process memory sampling.
mod rss;
mod sample;


pub use rss::{MemoryProbe, ProcStatmProbe};
pub use sample::MemorySample;

/// Takes point-in-time resident memory readings. Never fails: when the probe
/// cannot read memory the sample is [`MemorySample::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct ResourceSampler<P = ProcStatmProbe> {
    probe: P,
}

impl ResourceSampler<ProcStatmProbe> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            probe: ProcStatmProbe,
        }
    }
}

impl<P> ResourceSampler<P>
where
    P: MemoryProbe,
{
    #[must_use]
    pub const fn with_probe(probe: P) -> Self {
        Self { probe }
    }

    #[must_use]
    pub fn sample_now(&self) -> MemorySample {
        self.probe.resident_bytes().map_or_else(
            || {
                tracing::debug!("Resident memory is unavailable on this platform.");
                MemorySample::Unavailable
            },
            |bytes| MemorySample::Resident { bytes },
        )
    }
}
