//! Player statistics.
//!
//! Everything here is derived from a player's throw history and is never stored as a source of
//! truth. [`derive_stats`] computes from scratch; [`StatsBook`] memoizes the result per history
//! revision through an injected [`ResultCache`].

use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use serde::Serialize;
use tracing::trace;

use super::{PlayerId, Revision, ThrowHistory, ThrowRecord};
use crate::cache::{Clock, MonotonicClock, ResultCache};

#[cfg(test)]
mod test;

/// How often each visit score occurs in a history.
pub type ScoreCounts = HashMap<u16, usize>;

/// The statistics input for one player.
#[derive(Debug, Clone, Copy)]
pub struct GameData<'a> {
    pub player: PlayerId,
    pub history: &'a ThrowHistory,
    /// Darts used for each leg won.
    pub legs_won: &'a [u32],
    pub sets_won: u32,
    /// The match-wide index of the leg in progress. Leg averages slice the history by the leg
    /// each record was thrown in rather than from this player's last checkout, so a leg an
    /// opponent won does not run on into the next one.
    pub leg: u32,
    /// The match-wide index of the set in progress, sliced the same way as `leg`.
    pub set: u32,
}

/// Visit scores, banded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoringBuckets {
    pub one_eighty: usize,
    pub ton_forty_plus: usize,
    pub ton_plus: usize,
    pub sixty_plus: usize,
    pub forty_plus: usize,
    pub twenty_plus: usize,
    pub under_twenty: usize,
}

impl ScoringBuckets {
    fn add(&mut self, score: u16, count: usize) {
        let bucket = match score {
            180 => &mut self.one_eighty,
            140..=179 => &mut self.ton_forty_plus,
            100..=139 => &mut self.ton_plus,
            60..=99 => &mut self.sixty_plus,
            40..=59 => &mut self.forty_plus,
            20..=39 => &mut self.twenty_plus,
            1..=19 => &mut self.under_twenty,
            _ => return,
        };
        *bucket += count;
    }
}

/// Legs won, banded by the darts they took.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LegBuckets {
    /// Exactly nine darts. Shorter legs, only possible from low starting scores, fall in no band.
    pub nine_darters: usize,
    pub ten_to_twelve: usize,
    pub thirteen_to_fifteen: usize,
    pub sixteen_to_twenty: usize,
    pub twenty_one_to_twenty_five: usize,
    pub twenty_six_to_thirty: usize,
    pub over_thirty: usize,
}

impl LegBuckets {
    fn add(&mut self, darts: u32) {
        let bucket = match darts {
            0..=8 => return,
            9 => &mut self.nine_darters,
            10..=12 => &mut self.ten_to_twelve,
            13..=15 => &mut self.thirteen_to_fifteen,
            16..=20 => &mut self.sixteen_to_twenty,
            21..=25 => &mut self.twenty_one_to_twenty_five,
            26..=30 => &mut self.twenty_six_to_thirty,
            _ => &mut self.over_thirty,
        };
        *bucket += 1;
    }
}

/// A player's derived statistics. An empty history yields all zeroes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedStats {
    pub overall_average: f64,
    pub leg_average: f64,
    pub set_average: f64,
    pub first_nine_average: f64,
    pub checkout_percentage: f64,
    pub checkouts_hit: u32,
    pub checkout_attempts: u32,
    pub highest_finish: u16,
    pub darts_thrown: u32,
    pub legs_won: usize,
    pub sets_won: u32,
    pub scoring: ScoringBuckets,
    pub leg_speed: LegBuckets,
}

/// Points per three darts over `records`, or zero if no darts were thrown.
pub fn average(records: &[ThrowRecord]) -> f64 {
    let darts = darts_thrown(records);
    if darts == 0 {
        return 0.0;
    }
    let points: u32 = records.iter().map(|r| u32::from(r.score)).sum();
    f64::from(points * 3) / f64::from(darts)
}

/// The average over the first three visits.
pub fn first_nine_average(records: &[ThrowRecord]) -> f64 {
    average(&records[..records.len().min(3)])
}

pub fn darts_thrown(records: &[ThrowRecord]) -> u32 {
    records.iter().map(|r| u32::from(r.darts_used)).sum()
}

/// Successful checkouts and darts at a double, as `(hits, attempts)`.
///
/// A checkout counts at least one attempt even if none was reported.
pub fn checkout_counts(records: &[ThrowRecord]) -> (u32, u32) {
    records.iter().fold((0, 0), |(hits, attempts), r| {
        let doubles = u32::from(r.doubles_attempted);
        if r.is_checkout {
            (hits + u32::from(r.score > 0), attempts + doubles.max(1))
        } else {
            (hits, attempts + doubles)
        }
    })
}

/// Successful checkouts as a percentage of darts at a double, or zero with no attempts.
pub fn checkout_percentage(records: &[ThrowRecord]) -> f64 {
    match checkout_counts(records) {
        (_, 0) => 0.0,
        (hits, attempts) => f64::from(hits) / f64::from(attempts) * 100.0,
    }
}

/// The highest successful checkout, or zero.
pub fn highest_finish(records: &[ThrowRecord]) -> u16 {
    records
        .iter()
        .filter(|r| r.is_checkout && r.score > 0)
        .map(|r| r.score)
        .max()
        .unwrap_or_default()
}

pub fn score_counts(records: &[ThrowRecord]) -> ScoreCounts {
    records.iter().map(|r| r.score).counts()
}

pub fn scoring_buckets(counts: &ScoreCounts) -> ScoringBuckets {
    let mut buckets = ScoringBuckets::default();
    for (&score, &count) in counts {
        buckets.add(score, count);
    }
    buckets
}

pub fn leg_buckets(legs_won: &[u32]) -> LegBuckets {
    let mut buckets = LegBuckets::default();
    for &darts in legs_won {
        buckets.add(darts);
    }
    buckets
}

/// Computes a player's statistics from scratch.
pub fn derive_stats(data: &GameData) -> DerivedStats {
    derive_with_counts(data, &score_counts(data.history.records()))
}

fn derive_with_counts(data: &GameData, counts: &ScoreCounts) -> DerivedStats {
    let records = data.history.records();
    let (checkouts_hit, checkout_attempts) = checkout_counts(records);
    DerivedStats {
        overall_average: average(records),
        leg_average: average(data.history.leg(data.leg)),
        set_average: average(data.history.set(data.set)),
        first_nine_average: first_nine_average(records),
        checkout_percentage: checkout_percentage(records),
        checkouts_hit,
        checkout_attempts,
        highest_finish: highest_finish(records),
        darts_thrown: darts_thrown(records),
        legs_won: data.legs_won.len(),
        sets_won: data.sets_won,
        scoring: scoring_buckets(counts),
        leg_speed: leg_buckets(data.legs_won),
    }
}

/// The kinds of result a [`StatsBook`] caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKind {
    Derived,
    ScoreCounts,
}

/// Identifies a cached result: whose, what, and computed from which history and match position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatsKey {
    pub player: PlayerId,
    pub kind: StatKind,
    pub revision: Revision,
    pub leg: u32,
    pub set: u32,
}

impl StatsKey {
    fn new(data: &GameData, kind: StatKind) -> Self {
        Self {
            player: data.player,
            kind,
            revision: data.history.revision(),
            leg: data.leg,
            set: data.set,
        }
    }
}

/// A cached result.
#[derive(Debug, Clone)]
pub enum CachedStats {
    Derived(DerivedStats),
    ScoreCounts(Arc<ScoreCounts>),
}

/// Memoized statistics.
///
/// Results are keyed by [`StatsKey`], so a read against an unchanged history is a cache hit, and
/// appending or undoing a throw (which yields a new history revision) forces a recompute.
#[derive(Debug)]
pub struct StatsBook<C = MonotonicClock> {
    cache: ResultCache<StatsKey, CachedStats, C>,
    hits: u64,
    misses: u64,
}

impl<C: Clock> StatsBook<C> {
    /// Creates a [`StatsBook`] over `cache`.
    pub fn new(cache: ResultCache<StatsKey, CachedStats, C>) -> Self {
        Self {
            cache,
            hits: 0,
            misses: 0,
        }
    }

    /// Cache hits served so far.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Recomputations performed so far.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Returns the player's statistics, recomputing only if the inputs changed.
    pub fn derived(&mut self, data: &GameData) -> DerivedStats {
        let key = StatsKey::new(data, StatKind::Derived);
        if let Some(CachedStats::Derived(stats)) = self.cache.get(&key) {
            self.hits += 1;
            trace!(player = %data.player, "stats cache hit");
            return stats.clone();
        }
        self.misses += 1;
        trace!(player = %data.player, "stats cache miss");
        let counts = self.score_counts(data);
        let stats = derive_with_counts(data, &counts);
        self.cache.set(key, CachedStats::Derived(stats.clone()));
        stats
    }

    /// Returns how often each visit score occurs in the player's history.
    pub fn score_counts(&mut self, data: &GameData) -> Arc<ScoreCounts> {
        let key = StatsKey::new(data, StatKind::ScoreCounts);
        if let Some(CachedStats::ScoreCounts(counts)) = self.cache.get(&key) {
            self.hits += 1;
            return Arc::clone(counts);
        }
        self.misses += 1;
        let counts = Arc::new(score_counts(data.history.records()));
        self.cache
            .set(key, CachedStats::ScoreCounts(Arc::clone(&counts)));
        counts
    }
}
