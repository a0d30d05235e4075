//! X01 darts scoring.

mod checkout;
mod console;
mod dart;
mod error;
mod format;
mod player;
mod scorer;
mod state;
mod stats;
mod throw;
mod validator;
use self::console::{Command, Console};
use self::dart::Dart;
use self::error::{ConfigError, MatchError};
pub use self::format::{MatchFormat, OutMode, Target};
use self::player::{Player, PlayerId};
use self::scorer::Scorer;
use self::state::{MatchState, Phase, Verdict};
use self::stats::{DerivedStats, GameData, StatsBook};
use self::throw::{
    CheckoutResponse, DoubleAttempt, Revision, ThrowHistory, ThrowRecord, Visit, DARTS_PER_VISIT,
    MAX_VISIT,
};
use self::validator::check_possible_double_attempt;

use anyhow::Context;
use serde::Serialize;

use crate::cache::{CacheConfig, ResultCache};

/// An event that occurs during the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Event {
    /// A visit was scored.
    Scored {
        player: PlayerId,
        score: u16,
        remaining: u16,
        /// The finish the player was on before the visit, if any.
        finish: Option<String>,
    },
    /// A visit was discarded.
    Bust { player: PlayerId, score: u16 },
    /// A visit reached zero and awaits confirmation.
    CheckoutPending {
        player: PlayerId,
        remaining: u16,
        route: Option<String>,
    },
    /// A leg was won in `darts` darts.
    LegWon { player: PlayerId, darts: u32 },
    /// A set was won.
    SetWon { player: PlayerId },
    /// The match is over.
    MatchWon { player: PlayerId },
    /// A visit was taken back. `record` is absent for a bust or a cancelled checkout.
    Undone {
        player: PlayerId,
        record: Option<ThrowRecord>,
    },
}

/// A player's closing statistics, as written to stderr.
#[derive(Debug, Serialize)]
struct PlayerReport<'a> {
    player: &'a Player,
    stats: DerivedStats,
}

/// The end-of-match summary.
#[derive(Debug, Serialize)]
struct MatchReport<'a> {
    format: &'a MatchFormat,
    winner: Option<PlayerId>,
    players: Vec<PlayerReport<'a>>,
}

/// Scores a match at the console.
pub fn cli_main(
    format: MatchFormat,
    names: Vec<String>,
    cache: CacheConfig,
    color: bool,
) -> anyhow::Result<()> {
    let console = Console::new(color);
    let mut scorer = Scorer::new(MatchState::with_names(format, names)?);
    let mut book = StatsBook::new(ResultCache::new(cache));

    console.intro(scorer.state());
    loop {
        while let Some(event) = scorer.pop_event() {
            console.notify(scorer.state(), &event);
        }
        match scorer.phase() {
            Phase::MatchComplete(_) => break,
            Phase::CheckoutPending(_) => {
                let Some(pending) = scorer.pending().cloned() else {
                    break;
                };
                let response = console.confirm_checkout(&pending)?;
                if let Err(err) = scorer.resolve_checkout(response) {
                    console.error(&err);
                }
            }
            Phase::AwaitingThrow(player) => {
                console.show_turn(scorer.state());
                match console.command()? {
                    Command::Score(score) => {
                        let visit = console.visit(scorer.state(), score)?;
                        if let Err(err) = scorer.apply_visit(player, visit) {
                            console.error(&err);
                        }
                    }
                    Command::Undo => {
                        if let Err(err) = scorer.undo() {
                            console.error(&err);
                        }
                    }
                    Command::Stats => console.show_stats(scorer.state(), &mut book),
                    Command::Quit => break,
                }
            }
        }
    }

    console.show_stats(scorer.state(), &mut book);
    let state = scorer.state();
    let report = MatchReport {
        format: state.format(),
        winner: state.winner(),
        players: state
            .cards()
            .iter()
            .filter_map(|card| {
                let data = state.game_data(card.player().id)?;
                Some(PlayerReport {
                    player: card.player(),
                    stats: book.derived(&data),
                })
            })
            .collect(),
    };
    serde_json::to_writer(std::io::stderr(), &report).context("writing match report")?;
    Ok(())
}
