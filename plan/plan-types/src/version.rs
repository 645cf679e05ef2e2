//! Plan version counter.

use serde::{Deserialize, Serialize};

/// Monotonically increasing plan version.
///
/// Every committed mutation increments the version by exactly one. The
/// version is the sole correctness mechanism for optimistic concurrency:
/// an edit intent issued against version `n` is only applied while the plan
/// is still at version `n`.
///
/// # Example
///
/// ```
/// use plan_types::PlanVersion;
///
/// let v = PlanVersion::ZERO;
/// assert_eq!(v.next().get(), 1);
/// assert!(v < v.next());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlanVersion(u64);

impl PlanVersion {
    /// The version of a freshly created plan.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw version number.
    #[must_use]
    pub const fn from_raw(version: u64) -> Self {
        Self(version)
    }

    /// The raw version number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The successor version.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for PlanVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_monotonic() {
        let mut v = PlanVersion::ZERO;
        for expected in 1..=5 {
            v = v.next();
            assert_eq!(v.get(), expected);
        }
    }

    #[test]
    fn version_display() {
        assert_eq!(PlanVersion::from_raw(42).to_string(), "v42");
    }
}
