//! Stored records and optimistic concurrency expectations.

/// A record together with the identity and revision the store assigned it.
///
/// Domain records (items, entries, exits) carry no identity of their own:
/// the document store assigns ids on insert and bumps `version` on every
/// write.
#[derive(Debug, Clone, PartialEq)]
pub struct Persisted<I, T> {
    pub id: I,
    pub version: u64,
    pub record: T,
}

impl<I, T> Persisted<I, T> {
    pub fn new(id: I, version: u64, record: T) -> Self {
        Self { id, version, record }
    }
}

impl<I, T> core::ops::Deref for Persisted<I, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

impl<I, T> AsRef<T> for Persisted<I, T> {
    fn as_ref(&self) -> &T {
        &self.record
    }
}

/// Optimistic concurrency expectation for a conditional write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (descriptive edits, migrations).
    Any,
    /// Require the document to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_exposes_id_version_and_record() {
        let p = Persisted::new("item-1".to_string(), 7, 12.5_f64);
        assert_eq!(p.id, "item-1");
        assert_eq!(p.version, 7);
        assert_eq!(*p.as_ref(), 12.5);
    }

    #[test]
    fn any_matches_every_version() {
        assert!(ExpectedVersion::Any.matches(0));
        assert!(ExpectedVersion::Any.matches(42));
    }

    #[test]
    fn exact_rejects_stale_versions() {
        assert!(ExpectedVersion::Exact(3).matches(3));
        assert!(!ExpectedVersion::Exact(3).matches(4));
    }
}
