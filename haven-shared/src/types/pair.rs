use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An unordered pair of profiles stored in sorted order so that (a, b) and
/// (b, a) resolve to the same row key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalPair {
    pub low: Uuid,
    pub high: Uuid,
}

impl CanonicalPair {
    pub fn new(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.low == id || self.high == id
    }

    /// The member that is not `id`. Returns `None` when `id` is not in the pair.
    pub fn other(&self, id: Uuid) -> Option<Uuid> {
        if self.low == id {
            Some(self.high)
        } else if self.high == id {
            Some(self.low)
        } else {
            None
        }
    }

    pub fn is_low(&self, id: Uuid) -> bool {
        self.low == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_does_not_matter() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(CanonicalPair::new(a, b), CanonicalPair::new(b, a));
        assert!(CanonicalPair::new(a, b).low <= CanonicalPair::new(a, b).high);
    }

    #[test]
    fn other_returns_counterpart() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let pair = CanonicalPair::new(a, b);
        assert_eq!(pair.other(a), Some(b));
        assert_eq!(pair.other(b), Some(a));
        assert_eq!(pair.other(Uuid::new_v4()), None);
    }
}
