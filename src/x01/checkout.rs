//! The checkout table.
//!
//! Maps a remaining score to the conventional route that finishes it in three darts or fewer,
//! ending on a double (or the bull). The table is dense over 0-170: scores that cannot be
//! finished (0, 1, and 159, 162, 163, 165, 166, 168, 169) carry an infeasible entry with an empty
//! route. Anything above 170 is not listed at all.

use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::str::FromStr;
use std::sync::OnceLock;

use itertools::Itertools;
use serde::Serialize;

use super::{Dart, OutMode, DARTS_PER_VISIT};

/// The highest score that can be finished in a single visit.
pub const MAX_CHECKOUT: u16 = 170;

/// Preferred finishing routes, keyed by remaining score.
static ROUTES: &[(u16, &str)] = &[
    (170, "T20 T20 Bull"),
    (167, "T20 T19 Bull"),
    (164, "T20 T18 Bull"),
    (161, "T20 T17 Bull"),
    (160, "T20 T20 D20"),
    (158, "T20 T20 D19"),
    (157, "T20 T19 D20"),
    (156, "T20 T20 D18"),
    (155, "T20 T19 D19"),
    (154, "T20 T18 D20"),
    (153, "T20 T19 D18"),
    (152, "T20 T20 D16"),
    (151, "T20 T17 D20"),
    (150, "T20 T18 D18"),
    (149, "T20 T19 D16"),
    (148, "T20 T16 D20"),
    (147, "T20 T17 D18"),
    (146, "T20 T18 D16"),
    (145, "T20 T15 D20"),
    (144, "T20 T20 D12"),
    (143, "T20 T17 D16"),
    (142, "T20 T14 D20"),
    (141, "T20 T19 D12"),
    (140, "T20 T20 D10"),
    (139, "T20 T13 D20"),
    (138, "T20 T18 D12"),
    (137, "T20 T19 D10"),
    (136, "T20 T20 D8"),
    (135, "T20 T17 D12"),
    (134, "T20 T14 D16"),
    (133, "T20 T19 D8"),
    (132, "T20 T16 D12"),
    (131, "T20 T13 D16"),
    (130, "T20 T20 D5"),
    (129, "T19 T16 D12"),
    (128, "T18 T14 D16"),
    (127, "T20 T17 D8"),
    (126, "T19 T19 D6"),
    (125, "T20 T19 D4"),
    (124, "T20 T16 D8"),
    (123, "T19 T16 D9"),
    (122, "T18 T20 D4"),
    (121, "T20 T11 D14"),
    (120, "T20 20 D20"),
    (119, "T19 T12 D13"),
    (118, "T20 18 D20"),
    (117, "T20 17 D20"),
    (116, "T20 16 D20"),
    (115, "T20 15 D20"),
    (114, "T20 14 D20"),
    (113, "T20 13 D20"),
    (112, "T20 12 D20"),
    (111, "T20 11 D20"),
    (110, "T20 10 D20"),
    (109, "T20 9 D20"),
    (108, "T20 8 D20"),
    (107, "T19 10 D20"),
    (106, "T20 6 D20"),
    (105, "T20 5 D20"),
    (104, "T18 10 D20"),
    (103, "T19 6 D20"),
    (102, "T20 10 D16"),
    (101, "T17 10 D20"),
    (100, "T20 D20"),
    (99, "T19 10 D16"),
    (98, "T20 D19"),
    (97, "T19 D20"),
    (96, "T20 D18"),
    (95, "T19 D19"),
    (94, "T18 D20"),
    (93, "T19 D18"),
    (92, "T20 D16"),
    (91, "T17 D20"),
    (90, "T18 D18"),
    (89, "T19 D16"),
    (88, "T16 D20"),
    (87, "T17 D18"),
    (86, "T18 D16"),
    (85, "T15 D20"),
    (84, "T20 D12"),
    (83, "T17 D16"),
    (82, "Bull D16"),
    (81, "T19 D12"),
    (80, "T20 D10"),
    (79, "T13 D20"),
    (78, "T18 D12"),
    (77, "T19 D10"),
    (76, "T20 D8"),
    (75, "T17 D12"),
    (74, "T14 D16"),
    (73, "T19 D8"),
    (72, "T16 D12"),
    (71, "T13 D16"),
    (70, "T18 D8"),
    (69, "T19 D6"),
    (68, "T20 D4"),
    (67, "T17 D8"),
    (66, "T10 D18"),
    (65, "T19 D4"),
    (64, "T16 D8"),
    (63, "T13 D12"),
    (62, "T10 D16"),
    (61, "T15 D8"),
    (60, "20 D20"),
    (59, "19 D20"),
    (58, "18 D20"),
    (57, "17 D20"),
    (56, "16 D20"),
    (55, "15 D20"),
    (54, "14 D20"),
    (53, "13 D20"),
    (52, "12 D20"),
    (51, "11 D20"),
    (50, "Bull"),
    (49, "9 D20"),
    (48, "16 D16"),
    (47, "15 D16"),
    (46, "6 D20"),
    (45, "13 D16"),
    (44, "4 D20"),
    (43, "3 D20"),
    (42, "10 D16"),
    (41, "9 D16"),
    (40, "D20"),
    (39, "7 D16"),
    (38, "D19"),
    (37, "5 D16"),
    (36, "D18"),
    (35, "3 D16"),
    (34, "D17"),
    (33, "1 D16"),
    (32, "D16"),
    (31, "15 D8"),
    (30, "D15"),
    (29, "13 D8"),
    (28, "D14"),
    (27, "11 D8"),
    (26, "D13"),
    (25, "9 D8"),
    (24, "D12"),
    (23, "7 D8"),
    (22, "D11"),
    (21, "5 D8"),
    (20, "D10"),
    (19, "3 D8"),
    (18, "D9"),
    (17, "1 D8"),
    (16, "D8"),
    (15, "7 D4"),
    (14, "D7"),
    (13, "5 D4"),
    (12, "D6"),
    (11, "3 D4"),
    (10, "D5"),
    (9, "1 D4"),
    (8, "D4"),
    (7, "3 D2"),
    (6, "D3"),
    (5, "1 D2"),
    (4, "D2"),
    (3, "1 D1"),
    (2, "D1"),
];

/// A row of the checkout table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutEntry {
    /// The remaining score this entry finishes.
    pub score: u16,
    /// The darts to aim at, in order.
    pub route: Vec<Dart>,
    /// The number of darts the route needs.
    pub darts_required: u8,
    /// Whether the score can be finished at all.
    pub feasible: bool,
}

impl CheckoutEntry {
    fn infeasible(score: u16) -> Self {
        Self {
            score,
            route: vec![],
            darts_required: 0,
            feasible: false,
        }
    }

    fn parse(score: u16, route: &str) -> Self {
        let route: Vec<Dart> = route
            .split_whitespace()
            .map(|label| Dart::from_str(label).expect("checkout table is well-formed"))
            .collect();
        let darts_required = u8::try_from(route.len()).expect("at most three darts");
        Self {
            score,
            route,
            darts_required,
            feasible: true,
        }
    }

    /// The route as a space-separated string of dart labels, e.g. `"T20 T20 Bull"`.
    pub fn route_label(&self) -> String {
        self.route.iter().join(" ")
    }
}

/// Dense lookup from remaining score to [`CheckoutEntry`].
#[derive(Debug)]
pub struct CheckoutTable {
    entries: Vec<CheckoutEntry>,
}

impl CheckoutTable {
    fn build() -> Self {
        let mut entries: Vec<_> = (0..=MAX_CHECKOUT).map(CheckoutEntry::infeasible).collect();
        for &(score, route) in ROUTES {
            entries[usize::from(score)] = CheckoutEntry::parse(score, route);
        }
        Self { entries }
    }

    /// The process-wide table, built on first use.
    pub fn get() -> &'static CheckoutTable {
        static TABLE: OnceLock<CheckoutTable> = OnceLock::new();
        TABLE.get_or_init(Self::build)
    }

    /// Returns the raw entry for `score`, feasible or not. Scores above 170 have no entry.
    pub fn entry(&self, score: u16) -> Option<&CheckoutEntry> {
        self.entries.get(usize::from(score))
    }

    /// Returns the entry for `score` only if it can be finished.
    pub fn finish(&self, score: u16) -> Option<&CheckoutEntry> {
        self.entry(score).filter(|e| e.feasible)
    }

    /// Iterates over every finishable entry, from lowest to highest score.
    pub fn finishes(&self) -> impl Iterator<Item = &CheckoutEntry> {
        self.entries.iter().filter(|e| e.feasible)
    }
}

/// The fewest darts that can score exactly `score` in one visit, with the last dart on a double
/// (or the bull) under double-out. `None` if no visit can.
///
/// This is a lower bound on the darts a finish took, independent of the suggested route.
pub fn fewest_darts(score: u16, out_mode: OutMode) -> Option<u8> {
    let values: BTreeSet<u16> = Dart::all().map(Dart::value).collect();
    let finishing: BTreeSet<u16> = Dart::all()
        .filter(|d| out_mode == OutMode::Straight || d.is_double())
        .map(Dart::value)
        .collect();
    // Totals the darts before the last one can make.
    let mut leading = BTreeSet::from([0]);
    for darts in 1..=DARTS_PER_VISIT {
        let reachable = finishing
            .iter()
            .any(|&last| score.checked_sub(last).is_some_and(|rest| leading.contains(&rest)));
        if reachable {
            return Some(darts);
        }
        leading = leading
            .iter()
            .flat_map(|&sum| values.iter().map(move |&v| sum + v))
            .filter(|&sum| sum < score)
            .collect();
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_routes_add_up() {
        for entry in CheckoutTable::get().finishes() {
            let total: u16 = entry.route.iter().map(|d| d.value()).sum();
            assert_eq!(total, entry.score, "{}: {}", entry.score, entry.route_label());
            assert_eq!(usize::from(entry.darts_required), entry.route.len());
            assert!((1..=3).contains(&entry.darts_required));
            assert!(entry.route.last().unwrap().is_double(), "{}", entry.score);
        }
    }

    #[test]
    fn test_gaps() {
        let table = CheckoutTable::get();
        let missing: Vec<u16> = (0..=MAX_CHECKOUT)
            .filter(|&s| table.finish(s).is_none())
            .collect();
        assert_eq!(missing, vec![0, 1, 159, 162, 163, 165, 166, 168, 169]);
        assert!(table.entry(171).is_none());
        assert!(!table.entry(169).unwrap().feasible);
    }

    #[test]
    fn test_fewest_darts() {
        for (score, darts) in [(40, 1), (50, 1), (41, 2), (110, 2), (101, 2), (107, 2), (170, 3)] {
            assert_eq!(fewest_darts(score, OutMode::Double), Some(darts), "{score}");
        }
        for score in [0, 1, 159, 169, 171] {
            assert_eq!(fewest_darts(score, OutMode::Double), None, "{score}");
        }
        for (score, darts) in [(1, 1), (60, 1), (61, 2), (177, 3), (180, 3)] {
            assert_eq!(fewest_darts(score, OutMode::Straight), Some(darts), "{score}");
        }
        for score in [179, 178, 176, 175, 173, 172, 169, 166, 163] {
            assert_eq!(fewest_darts(score, OutMode::Straight), None, "{score}");
        }
    }

    #[test]
    fn test_fewest_darts_never_exceeds_route() {
        for entry in CheckoutTable::get().finishes() {
            let fewest = fewest_darts(entry.score, OutMode::Double).unwrap();
            assert!(fewest <= entry.darts_required, "{}", entry.score);
        }
    }

    #[test]
    fn test_well_known_routes() {
        let table = CheckoutTable::get();
        for (score, route, darts) in [
            (170, "T20 T20 Bull", 3),
            (100, "T20 D20", 2),
            (50, "Bull", 1),
            (41, "9 D16", 2),
            (32, "D16", 1),
            (3, "1 D1", 2),
        ] {
            let entry = table.finish(score).unwrap();
            assert_eq!(entry.route_label(), route);
            assert_eq!(entry.darts_required, darts);
        }
    }
}
