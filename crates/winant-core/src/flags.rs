//! Per-request load flags.

use std::ops::{BitOr, BitOrAssign};

/// Bit flags that change how a response is loaded.
///
/// # Example
///
/// ```
/// use winant_core::LoadFlags;
///
/// let flags = LoadFlags::DO_NOT_SAVE_RESPONSE_BODY;
/// assert!(flags.contains(LoadFlags::DO_NOT_SAVE_RESPONSE_BODY));
/// assert!(!LoadFlags::default().contains(LoadFlags::DO_NOT_SAVE_RESPONSE_BODY));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LoadFlags(u32);

impl LoadFlags {
    /// No special behavior.
    pub const NORMAL: Self = Self(0);

    /// Do not keep the response body in memory; it is only delivered to the
    /// read handler, if any.
    pub const DO_NOT_SAVE_RESPONSE_BODY: Self = Self(1 << 0);

    /// Build flags from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if the response body should be accumulated.
    #[must_use]
    pub const fn saves_response_body(self) -> bool {
        !self.contains(Self::DO_NOT_SAVE_RESPONSE_BODY)
    }
}

impl BitOr for LoadFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LoadFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
