use std::time::Duration;

use maplit::hashmap;

use crate::cache::test::ManualClock;
use crate::cache::CacheConfig;

use super::*;

fn visit(score: u16) -> ThrowRecord {
    ThrowRecord::visit(score, 0, 0, 0)
}

fn data<'a>(history: &'a ThrowHistory, legs_won: &'a [u32]) -> GameData<'a> {
    GameData {
        player: PlayerId(1),
        history,
        legs_won,
        sets_won: 0,
        leg: 0,
        set: 0,
    }
}

fn assert_close(actual: f64, expect: f64) {
    assert!((actual - expect).abs() < 0.01, "{actual} != {expect}");
}

#[test]
fn test_average() {
    let records = [visit(60), visit(45), visit(100)];
    assert_close(average(&records), 68.33);
    assert_eq!(average(&[]), 0.0);

    // Finishing visits are normalized to three darts.
    let records = [visit(60), ThrowRecord::checkout(40, 1, 1, 0, 0)];
    assert_close(average(&records), 75.0);
}

#[test]
fn test_first_nine() {
    let records = [visit(100), visit(100), visit(100), visit(0), visit(0)];
    assert_close(first_nine_average(&records), 100.0);
    assert_close(first_nine_average(&records[..1]), 100.0);
    assert_eq!(first_nine_average(&[]), 0.0);
}

#[test]
fn test_checkout_percentage() {
    let records = [
        ThrowRecord::checkout(40, 2, 2, 0, 0),
        ThrowRecord::visit(20, 1, 1, 0),
    ];
    assert_eq!(checkout_counts(&records), (1, 3));
    assert_close(checkout_percentage(&records), 33.33);

    // A checkout with no reported attempts still counts one.
    let records = [ThrowRecord::checkout(32, 1, 0, 0, 0)];
    assert_eq!(checkout_counts(&records), (1, 1));
    assert_eq!(checkout_percentage(&[visit(60)]), 0.0);
}

#[test]
fn test_highest_finish() {
    let records = [
        ThrowRecord::checkout(81, 3, 1, 0, 0),
        visit(140),
        ThrowRecord::checkout(121, 3, 2, 1, 0),
        ThrowRecord::checkout(40, 1, 1, 2, 0),
    ];
    assert_eq!(highest_finish(&records), 121);
    assert_eq!(highest_finish(&[visit(180)]), 0);
}

#[test]
fn test_scoring_buckets() {
    let records: Vec<_> = [180, 180, 140, 179, 100, 60, 99, 45, 26, 19, 1, 0]
        .iter()
        .map(|&s| visit(s))
        .collect();
    let counts = score_counts(&records);
    assert_eq!(counts[&180], 2);
    assert_eq!(
        scoring_buckets(&counts),
        ScoringBuckets {
            one_eighty: 2,
            ton_forty_plus: 2,
            ton_plus: 1,
            sixty_plus: 2,
            forty_plus: 1,
            twenty_plus: 1,
            under_twenty: 2,
        }
    );
    let counts = hashmap! { 0 => 4 };
    assert_eq!(scoring_buckets(&counts), ScoringBuckets::default());
}

#[test]
fn test_leg_buckets() {
    let buckets = leg_buckets(&[9, 12, 13, 15, 18, 21, 30, 31, 45]);
    assert_eq!(
        buckets,
        LegBuckets {
            nine_darters: 1,
            ten_to_twelve: 1,
            thirteen_to_fifteen: 2,
            sixteen_to_twenty: 1,
            twenty_one_to_twenty_five: 1,
            twenty_six_to_thirty: 1,
            over_thirty: 2,
        }
    );

    // A leg from a low starting score can take fewer than nine darts.
    assert_eq!(leg_buckets(&[1, 6, 8]), LegBuckets::default());
    assert_eq!(leg_buckets(&[1, 9]).nine_darters, 1);
}

#[test]
fn test_empty_history() {
    let history = ThrowHistory::default();
    assert_eq!(derive_stats(&data(&history, &[])), DerivedStats::default());
}

#[test]
fn test_leg_and_set_slices() {
    let history = ThrowHistory::from(vec![
        ThrowRecord::visit(100, 0, 0, 0),
        ThrowRecord::checkout(100, 3, 1, 0, 0),
        ThrowRecord::visit(60, 0, 1, 1),
        ThrowRecord::visit(30, 0, 2, 1),
    ]);
    let legs = [9];
    let mut game = data(&history, &legs);
    game.leg = 2;
    game.set = 1;
    game.sets_won = 1;
    let stats = derive_stats(&game);
    assert_close(stats.leg_average, 30.0);
    assert_close(stats.set_average, 45.0);
    assert_close(stats.overall_average, 72.5);
    assert_eq!(stats.legs_won, 1);
    assert_eq!(stats.sets_won, 1);
    assert_eq!(stats.darts_thrown, 12);
    assert_eq!(stats.leg_speed.nine_darters, 1);

    // A leg that has just started has no visits yet.
    game.leg = 3;
    assert_eq!(derive_stats(&game).leg_average, 0.0);
}

#[test]
fn test_stats_book_memoizes() {
    let clock = ManualClock::default();
    let config = CacheConfig {
        capacity: 16,
        ttl: Duration::from_secs(60),
    };
    let mut book = StatsBook::new(ResultCache::with_clock(config, clock.clone()));

    let history = ThrowHistory::from(vec![visit(60), visit(45), visit(100)]);
    let first = book.derived(&data(&history, &[]));
    assert_eq!(book.misses(), 2);
    let second = book.derived(&data(&history, &[]));
    assert_eq!(first, second);
    assert_eq!(book.hits(), 1);
    assert_eq!(book.misses(), 2);

    // A new container is a new revision, even with equal contents.
    let appended = history.pushed(visit(26));
    let third = book.derived(&data(&appended, &[]));
    assert_eq!(book.misses(), 4);
    assert_eq!(third.scoring.twenty_plus, 1);

    // Moving to a new leg changes the leg slice without touching the history.
    let mut next_leg = data(&appended, &[]);
    next_leg.leg = 1;
    assert_eq!(book.derived(&next_leg).leg_average, 0.0);
    assert_eq!(book.misses(), 6);

    clock.advance(Duration::from_secs(61));
    book.derived(&data(&history, &[]));
    assert_eq!(book.misses(), 8);
}
