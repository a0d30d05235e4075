//! Checkout validation.
//!
//! These functions never fail: a score with no finishing route is an ordinary answer, reported
//! through the flags on [`CheckoutInfo`].

use serde::Serialize;

use super::checkout::{CheckoutTable, MAX_CHECKOUT};

/// Returned by [`checkout_route`] when the score has no direct checkout.
pub const NO_CHECKOUT: &str = "No checkout";

/// Scores at or below this are finishable on a double with at most two darts.
const DOUBLE_RANGE: u16 = 40;

/// The validator's answer for a score.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CheckoutInfo {
    /// A finishing route exists.
    pub is_possible: bool,
    /// The fewest darts that could finish the score, or zero if none could.
    pub minimum_darts: u8,
    /// Darts at a finishing double could be part of the visit.
    pub possible_double_attempt: bool,
    /// The suggested route, e.g. `"T20 D20"`.
    pub checkout_route: Option<String>,
}

impl CheckoutInfo {
    fn not_possible() -> Self {
        Self::default()
    }

    fn possible(minimum_darts: u8, route: Option<String>) -> Self {
        Self {
            is_possible: true,
            minimum_darts,
            possible_double_attempt: true,
            checkout_route: route,
        }
    }

    fn from_table(score: u16) -> Self {
        match CheckoutTable::get().finish(score) {
            Some(entry) => Self::possible(entry.darts_required, Some(entry.route_label())),
            None => Self::not_possible(),
        }
    }
}

/// Decides whether the score left after `thrown` is on a finish.
///
/// Below 41 the minimum dart count is a rule of thumb (one dart for an even score, two for an odd
/// one); it is the fewest darts that could have been needed, not a record of what was thrown.
pub fn check_possible_double_attempt(start_score: u16, thrown_score: u16) -> CheckoutInfo {
    let remaining = match start_score.checked_sub(thrown_score) {
        Some(remaining) if (2..=MAX_CHECKOUT).contains(&remaining) => remaining,
        _ => return CheckoutInfo::not_possible(),
    };
    if remaining <= DOUBLE_RANGE {
        let minimum_darts = if remaining % 2 == 0 { 1 } else { 2 };
        let route = CheckoutTable::get()
            .finish(remaining)
            .map(|e| e.route_label());
        CheckoutInfo::possible(minimum_darts, route)
    } else {
        CheckoutInfo::from_table(remaining)
    }
}

/// Validates a visit that took `start_score` to exactly zero.
///
/// The route is looked up by the pre-visit score. A visit that does not reach zero is never a
/// valid checkout.
pub fn validate_checkout(start_score: u16, thrown_score: u16) -> CheckoutInfo {
    if start_score != thrown_score {
        return CheckoutInfo::not_possible();
    }
    CheckoutInfo::from_table(start_score)
}

/// Returns the suggested route for `score`, or [`NO_CHECKOUT`].
pub fn checkout_route(score: u16) -> String {
    CheckoutTable::get()
        .finish(score)
        .map(|e| e.route_label())
        .unwrap_or_else(|| NO_CHECKOUT.to_string())
}
