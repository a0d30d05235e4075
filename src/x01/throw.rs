//! Visits and the records they leave behind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use delegate::delegate;
use serde::{Deserialize, Serialize};

/// The highest score a single visit can make.
pub const MAX_VISIT: u16 = 180;

/// Darts in a full visit.
pub const DARTS_PER_VISIT: u8 = 3;

/// One scoring event in a player's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrowRecord {
    /// Points scored, 0-180.
    pub score: u16,
    /// Darts used, 1-3. Only a checkout uses fewer than three.
    pub darts_used: u8,
    /// Darts thrown at a finishing double, 0-3.
    pub doubles_attempted: u8,
    /// This visit finished the leg.
    pub is_checkout: bool,
    /// The match-wide leg index this visit was thrown in.
    pub leg: u32,
    /// The match-wide set index this visit was thrown in.
    pub set: u32,
}

impl ThrowRecord {
    /// A visit that used all three darts and did not finish.
    pub fn visit(score: u16, doubles_attempted: u8, leg: u32, set: u32) -> Self {
        Self {
            score,
            darts_used: DARTS_PER_VISIT,
            doubles_attempted,
            is_checkout: false,
            leg,
            set,
        }
    }

    /// A visit that finished the leg.
    pub fn checkout(score: u16, darts_used: u8, doubles_attempted: u8, leg: u32, set: u32) -> Self {
        Self {
            score,
            darts_used,
            doubles_attempted,
            is_checkout: true,
            leg,
            set,
        }
    }
}

/// Identifies one particular history container. Every append or removal produces a new revision,
/// so equal revisions imply identical contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Revision(u64);

impl Revision {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A player's ordered throw history.
///
/// The history is persistent: [`pushed`](ThrowHistory::pushed) and
/// [`popped`](ThrowHistory::popped) return a new history and leave the original intact, which
/// keeps whole-state transitions cheap to clone.
#[derive(Debug, Clone, Serialize)]
pub struct ThrowHistory {
    #[serde(skip)]
    revision: Revision,
    records: Arc<Vec<ThrowRecord>>,
}

impl Default for ThrowHistory {
    fn default() -> Self {
        Self::from(vec![])
    }
}

impl From<Vec<ThrowRecord>> for ThrowHistory {
    fn from(records: Vec<ThrowRecord>) -> Self {
        Self {
            revision: Revision::next(),
            records: Arc::new(records),
        }
    }
}

impl ThrowHistory {
    delegate! {
        to self.records {
            pub fn len(&self) -> usize;
            pub fn is_empty(&self) -> bool;
            pub fn last(&self) -> Option<&ThrowRecord>;
        }
    }

    /// The revision stamp of this container.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[ThrowRecord] {
        &self.records
    }

    /// Returns a new history with `record` appended.
    pub fn pushed(&self, record: ThrowRecord) -> Self {
        let mut records = Vec::with_capacity(self.records.len() + 1);
        records.extend_from_slice(&self.records);
        records.push(record);
        Self::from(records)
    }

    /// Returns a new history without the last record, along with that record.
    pub fn popped(&self) -> Option<(Self, ThrowRecord)> {
        let (last, rest) = self.records.split_last()?;
        Some((Self::from(rest.to_vec()), *last))
    }

    /// The records thrown in `leg`, which must be the current leg. Earlier legs read as empty once
    /// a later record exists.
    pub fn leg(&self, leg: u32) -> &[ThrowRecord] {
        self.suffix(|r| r.leg == leg)
    }

    /// The records thrown in `set`, which must be the current set.
    pub fn set(&self, set: u32) -> &[ThrowRecord] {
        self.suffix(|r| r.set == set)
    }

    /// The trailing run of records matching `pred`.
    fn suffix<F: Fn(&ThrowRecord) -> bool>(&self, pred: F) -> &[ThrowRecord] {
        let start = self
            .records
            .iter()
            .rposition(|r| !pred(r))
            .map_or(0, |idx| idx + 1);
        &self.records[start..]
    }
}

/// Whether darts were thrown at a finishing double during a visit that did not finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoubleAttempt {
    #[default]
    Declined,
    /// The number of darts thrown at a double, 1-3.
    Attempted(u8),
}

impl DoubleAttempt {
    pub fn count(self) -> u8 {
        match self {
            DoubleAttempt::Declined => 0,
            DoubleAttempt::Attempted(n) => n,
        }
    }
}

/// A visit as reported by the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub score: u16,
    pub double_attempt: DoubleAttempt,
}

impl Visit {
    /// Creates a [`Visit`] with no darts at a double.
    pub fn new(score: u16) -> Self {
        Self {
            score,
            double_attempt: DoubleAttempt::Declined,
        }
    }

    /// Sets the double attempt.
    pub fn with_double_attempt(mut self, double_attempt: DoubleAttempt) -> Self {
        self.double_attempt = double_attempt;
        self
    }
}

/// The marker's answer to a pending checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutResponse {
    /// The finish stands.
    Confirmed {
        darts_used: u8,
        doubles_attempted: u8,
    },
    /// The last dart missed the double; the visit is a bust.
    Bust,
}

#[cfg(test)]
mod test {
    use super::*;

    fn history(legs: &[(u16, u32, u32)]) -> ThrowHistory {
        legs.iter()
            .map(|&(score, leg, set)| ThrowRecord::visit(score, 0, leg, set))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_push_pop_revisions() {
        let empty = ThrowHistory::default();
        let one = empty.pushed(ThrowRecord::visit(60, 0, 0, 0));
        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        assert_ne!(empty.revision(), one.revision());
        assert_eq!(one.clone().revision(), one.revision());

        let (back, record) = one.popped().unwrap();
        assert_eq!(record.score, 60);
        assert!(back.is_empty());
        assert_ne!(back.revision(), empty.revision());
        assert!(empty.popped().is_none());
    }

    #[test]
    fn test_slices() {
        let h = history(&[(60, 0, 0), (45, 0, 0), (100, 1, 0), (26, 2, 1), (81, 2, 1)]);
        assert_eq!(h.leg(2).len(), 2);
        assert_eq!(h.leg(1).len(), 0);
        assert_eq!(h.leg(3).len(), 0);
        assert_eq!(h.set(1).len(), 2);
        assert_eq!(h.set(0).len(), 0);
        assert_eq!(ThrowHistory::default().leg(0).len(), 0);

        let h = history(&[(60, 0, 0), (45, 0, 0)]);
        assert_eq!(h.leg(0).len(), 2);
        assert_eq!(h.set(0).len(), 2);
    }
}
