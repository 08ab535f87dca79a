const BYTES_PER_MB: u128 = 1024 * 1024;

/// A resident memory reading, or a marker that none could be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemorySample {
    Resident { bytes: u64 },
    Unavailable,
}

impl MemorySample {
    #[must_use]
    pub const fn bytes(self) -> Option<u64> {
        match self {
            MemorySample::Resident { bytes } => Some(bytes),
            MemorySample::Unavailable => None,
        }
    }

    /// Megabytes scaled by 100.
    #[must_use]
    pub fn mb_x100(self) -> Option<u64> {
        let bytes = self.bytes()?;
        let scaled = u128::from(bytes)
            .saturating_mul(100)
            .checked_div(BYTES_PER_MB)
            .unwrap_or(0);
        Some(u64::try_from(scaled).unwrap_or(u64::MAX))
    }

    /// The larger of two readings. An unavailable reading never wins over an
    /// available one.
    #[must_use]
    pub fn peak(self, other: Self) -> Self {
        match (self.bytes(), other.bytes()) {
            (Some(left), Some(right)) => MemorySample::Resident {
                bytes: left.max(right),
            },
            (Some(bytes), None) | (None, Some(bytes)) => MemorySample::Resident { bytes },
            (None, None) => MemorySample::Unavailable,
        }
    }
}
