//! Game version header.

use std::fmt;

/// Version tuple written at the head of script.dat and mod-settings.dat.
///
/// The `branch` byte follows the four numeric fields on the wire. Versions
/// that differ only in `branch` are unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MapVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    pub build: u16,
    pub branch: u8,
}

impl MapVersion {
    /// Creates a version with a zero branch byte.
    pub fn new(major: u16, minor: u16, patch: u16, build: u16) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
            branch: 0,
        }
    }

    /// Returns the numeric tuple used for ordering.
    pub fn tuple(&self) -> (u16, u16, u16, u16) {
        (self.major, self.minor, self.patch, self.build)
    }

    /// Returns true if `self` is at least `major.minor.patch`.
    pub fn at_least(&self, major: u16, minor: u16, patch: u16) -> bool {
        (self.major, self.minor, self.patch) >= (major, minor, patch)
    }
}

impl PartialOrd for MapVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match self.tuple().cmp(&other.tuple()) {
            std::cmp::Ordering::Equal if self.branch != other.branch => None,
            ordering => Some(ordering),
        }
    }
}

impl fmt::Display for MapVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.patch, self.build)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_dotted() {
        assert_eq!(MapVersion::new(1, 1, 110, 0).to_string(), "1.1.110.0");
    }

    #[test]
    fn test_ordering() {
        let old = MapVersion::new(1, 1, 110, 0);
        let new = MapVersion::new(2, 0, 7, 1);
        assert!(old < new);
        assert!(new.at_least(2, 0, 0));
        assert!(!old.at_least(2, 0, 0));
    }
}
