//! Match state management.
//!
//! ## Gameplay
//!
//! Every player starts each leg on their starting score. Players take visits (up to three darts)
//! in a fixed rotation, and each visit's score is subtracted from the thrower's running score. A
//! visit that would take the score below zero is a bust: it scores nothing and the turn passes.
//! Under double-out rules a visit that leaves exactly one, or that reaches zero from a score with
//! no double finish, is also a bust.
//!
//! A visit that reaches exactly zero is a potential checkout. It is held as pending until the
//! marker confirms how many darts it took and how many were thrown at the double, or declares
//! that the finishing dart missed (a bust). A confirmed checkout wins the leg, and every player
//! starts the next leg from their starting score. Winning enough legs wins a set, and winning
//! enough sets wins the match.
//!
//! ## State management
//!
//! [`MatchState`] is immutable from the outside. Each transition borrows the current state and
//! returns a complete successor in a [`Transition`], or a [`MatchError`] explaining why the
//! request was rejected. A rejected request never alters anything.

use std::convert::TryFrom;

use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info};

use super::checkout::{fewest_darts, MAX_CHECKOUT};
use super::validator::{check_possible_double_attempt, validate_checkout};
use super::{
    format::validate_starting_score, CheckoutResponse, ConfigError, Event, GameData, MatchError,
    MatchFormat, OutMode, Player, PlayerId, ThrowHistory, ThrowRecord, Visit, DARTS_PER_VISIT,
    MAX_VISIT,
};


/// The classification of a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// The visit scored and the turn passed.
    Continue,
    /// The visit was discarded and the turn passed.
    Bust,
    /// The visit reached zero and awaits [`MatchState::resolve_checkout`].
    CheckoutPending {
        /// The route the visit most likely took.
        route: Option<String>,
        /// The score that was checked out.
        remaining: u16,
    },
}

/// Where the match stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingThrow(PlayerId),
    CheckoutPending(PlayerId),
    MatchComplete(PlayerId),
}

/// A suggested finish for the player on turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutGuide {
    pub player: PlayerId,
    pub remaining: u16,
    pub route: Option<String>,
    pub minimum_darts: u8,
}

/// A visit that reached zero and has not been confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingCheckout {
    pub player: PlayerId,
    pub score: u16,
    pub route: Option<String>,
    /// The fewest darts the finish could have taken.
    pub minimum_darts: u8,
}

/// A resolved visit, in the order visits were taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct Turn {
    seat: usize,
    scored: bool,
}

/// One player's standing in the match.
#[derive(Debug, Clone, Serialize)]
pub struct Scorecard {
    player: Player,
    score: u16,
    history: ThrowHistory,
    legs_won: Vec<u32>,
    legs_in_set: u32,
    sets_won: u32,
}

impl Scorecard {
    fn new(player: Player) -> Self {
        Self {
            score: player.starting_score,
            player,
            history: ThrowHistory::default(),
            legs_won: vec![],
            legs_in_set: 0,
            sets_won: 0,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The running score in the current leg.
    pub fn score(&self) -> u16 {
        self.score
    }

    /// Every visit this player has scored in the match.
    pub fn history(&self) -> &ThrowHistory {
        &self.history
    }

    /// Darts used for each leg won, in the order the legs were won.
    pub fn legs_won(&self) -> &[u32] {
        &self.legs_won
    }

    /// Legs won in the current set.
    pub fn legs_in_set(&self) -> u32 {
        self.legs_in_set
    }

    pub fn sets_won(&self) -> u32 {
        self.sets_won
    }

    /// Recomputes the running score from the records of `leg`.
    fn rescore(&mut self, leg: u32) {
        let scored: u16 = self.history.leg(leg).iter().map(|r| r.score).sum();
        self.score = self.player.starting_score.saturating_sub(scored);
    }
}

/// The result of a successful transition.
#[derive(Debug, Clone)]
pub struct Transition {
    /// The successor state.
    pub state: MatchState,
    /// What happened, in order.
    pub events: Vec<Event>,
}

/// The state of a match.
#[derive(Debug, Clone, Serialize)]
pub struct MatchState {
    format: MatchFormat,
    cards: Vec<Scorecard>,
    current: usize,
    leg: u32,
    set: u32,
    turns: Vec<Turn>,
    pending: Option<PendingCheckout>,
    winner: Option<PlayerId>,
    guide: Option<CheckoutGuide>,
}

impl MatchState {
    /// Creates a new match. The first player listed throws first.
    pub fn new(format: MatchFormat, players: Vec<Player>) -> Result<Self, ConfigError> {
        if players.is_empty() {
            return Err(ConfigError::NoPlayers);
        }
        if let Some(dup) = players.iter().map(|p| p.id).duplicates().next() {
            return Err(ConfigError::DuplicatePlayer(dup));
        }
        for player in &players {
            validate_starting_score(player.starting_score)?;
        }
        let mut state = Self {
            format,
            cards: players.into_iter().map(Scorecard::new).collect(),
            current: 0,
            leg: 0,
            set: 0,
            turns: vec![],
            pending: None,
            winner: None,
            guide: None,
        };
        state.refresh_guide();
        Ok(state)
    }

    /// Creates a new match for the named players, numbered from 1, each starting on the format's
    /// starting score.
    pub fn with_names<I, S>(format: MatchFormat, names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let players = names
            .into_iter()
            .zip(1..)
            .map(|(name, id)| Player::new(id, name, format.starting_score()))
            .collect();
        Self::new(format, players)
    }

    pub fn format(&self) -> &MatchFormat {
        &self.format
    }

    /// Scorecards, in throwing order.
    pub fn cards(&self) -> &[Scorecard] {
        &self.cards
    }

    /// The scorecard for `player`.
    pub fn card(&self, player: PlayerId) -> Option<&Scorecard> {
        self.cards.iter().find(|c| c.player.id == player)
    }

    /// The index of the player on turn.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The player on turn.
    pub fn current_player(&self) -> &Player {
        &self.cards[self.current].player
    }

    /// The match-wide index of the leg in progress.
    pub fn leg(&self) -> u32 {
        self.leg
    }

    /// The match-wide index of the set in progress.
    pub fn set(&self) -> u32 {
        self.set
    }

    /// The number of visits resolved so far, busts included.
    pub fn visits(&self) -> usize {
        self.turns.len()
    }

    pub fn pending(&self) -> Option<&PendingCheckout> {
        self.pending.as_ref()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    /// A suggested finish for the player on turn, if one is on.
    pub fn checkout_guide(&self) -> Option<&CheckoutGuide> {
        self.guide.as_ref()
    }

    pub fn phase(&self) -> Phase {
        let current = self.current_player().id;
        match (self.winner, &self.pending) {
            (Some(winner), _) => Phase::MatchComplete(winner),
            (None, Some(pending)) => Phase::CheckoutPending(pending.player),
            (None, None) => Phase::AwaitingThrow(current),
        }
    }

    /// The statistics input for `player`.
    pub fn game_data(&self, player: PlayerId) -> Option<GameData<'_>> {
        let card = self.card(player)?;
        Some(GameData {
            player,
            history: &card.history,
            legs_won: &card.legs_won,
            sets_won: card.sets_won,
            leg: self.leg,
            set: self.set,
        })
    }

    /// Applies a visit of `score` with no darts at a double.
    pub fn apply_throw(
        &self,
        player: PlayerId,
        score: u16,
    ) -> Result<(Transition, Verdict), MatchError> {
        self.apply_visit(player, Visit::new(score))
    }

    /// Classifies and applies a visit by `player`.
    pub fn apply_visit(
        &self,
        player: PlayerId,
        visit: Visit,
    ) -> Result<(Transition, Verdict), MatchError> {
        self.check_can_throw(player)?;
        let Visit {
            score,
            double_attempt,
        } = visit;
        if score > MAX_VISIT {
            return Err(MatchError::InvalidScore(score));
        }
        let doubles = double_attempt.count();
        if doubles > DARTS_PER_VISIT {
            return Err(MatchError::InvalidDoubles {
                doubles,
                darts: DARTS_PER_VISIT,
            });
        }

        let start = self.cards[self.current].score;
        let out_mode = self.format.out_mode();
        match start.checked_sub(score) {
            None => Ok(self.bust(score)),
            Some(1) if out_mode == OutMode::Double => Ok(self.bust(score)),
            Some(0) => {
                let info = validate_checkout(start, score);
                match (out_mode, fewest_darts(score, out_mode)) {
                    (OutMode::Double, Some(minimum_darts)) if info.is_possible => {
                        Ok(self.hold_checkout(score, info.checkout_route, minimum_darts))
                    }
                    (OutMode::Double, _) => Ok(self.bust(score)),
                    (OutMode::Straight, Some(minimum_darts)) => {
                        Ok(self.hold_checkout(score, info.checkout_route, minimum_darts))
                    }
                    // No three darts make this total.
                    (OutMode::Straight, None) => Err(MatchError::InvalidScore(score)),
                }
            }
            Some(_) => {
                if doubles > 0 && !check_possible_double_attempt(start, 0).is_possible {
                    return Err(MatchError::ImplausibleDoubleAttempt(start));
                }
                Ok(self.score_visit(start, score, doubles))
            }
        }
    }

    /// Confirms or rejects the pending checkout.
    pub fn resolve_checkout(&self, response: CheckoutResponse) -> Result<Transition, MatchError> {
        if self.winner.is_some() {
            return Err(MatchError::MatchOver);
        }
        let pending = self.pending.as_ref().ok_or(MatchError::NoCheckoutPending)?;
        match response {
            CheckoutResponse::Bust => {
                let mut next = self.clone();
                next.pending = None;
                let events = vec![Event::Bust {
                    player: pending.player,
                    score: pending.score,
                }];
                next.end_turn(false);
                debug!(player = %pending.player, score = pending.score, "checkout rejected");
                Ok(Transition {
                    state: next,
                    events,
                })
            }
            CheckoutResponse::Confirmed {
                darts_used,
                doubles_attempted,
            } => {
                if !(pending.minimum_darts.max(1)..=DARTS_PER_VISIT).contains(&darts_used) {
                    return Err(MatchError::InvalidDarts {
                        score: pending.score,
                        darts: darts_used,
                    });
                }
                let min_doubles = match self.format.out_mode() {
                    OutMode::Double => 1,
                    OutMode::Straight => 0,
                };
                if !(min_doubles..=darts_used).contains(&doubles_attempted) {
                    return Err(MatchError::InvalidDoubles {
                        doubles: doubles_attempted,
                        darts: darts_used,
                    });
                }
                Ok(self.win_leg(darts_used, doubles_attempted))
            }
        }
    }

    /// Steps back one visit.
    ///
    /// A pending checkout is cancelled first, leaving the same player on turn. Otherwise the turn
    /// returns to whoever threw last; a scored visit is removed from their history and their score
    /// restored. Undoing a checkout reinstates the leg it finished, along with any set or match it
    /// decided.
    pub fn undo_last_throw(&self) -> Result<Transition, MatchError> {
        let mut next = self.clone();
        if let Some(pending) = next.pending.take() {
            debug!(player = %pending.player, "pending checkout cancelled");
            next.refresh_guide();
            return Ok(Transition {
                state: next,
                events: vec![Event::Undone {
                    player: pending.player,
                    record: None,
                }],
            });
        }

        let turn = next.turns.pop().ok_or(MatchError::NothingToUndo)?;
        debug_assert_eq!(
            turn.seat,
            (self.current + self.cards.len() - 1) % self.cards.len()
        );
        next.current = turn.seat;
        let player = next.cards[turn.seat].player.id;
        let record = if turn.scored {
            let card = &mut next.cards[turn.seat];
            let (history, record) = card.history.popped().expect("scored turn has a record");
            card.history = history;
            if record.is_checkout {
                next.reopen_leg(turn.seat, record);
            } else {
                card.score += record.score;
            }
            Some(record)
        } else {
            None
        };
        next.refresh_guide();
        debug!(%player, ?record, "visit undone");
        Ok(Transition {
            state: next,
            events: vec![Event::Undone { player, record }],
        })
    }

    /// Rejects throws that the current phase does not allow.
    fn check_can_throw(&self, player: PlayerId) -> Result<(), MatchError> {
        if self.winner.is_some() {
            return Err(MatchError::MatchOver);
        }
        if let Some(pending) = &self.pending {
            return Err(MatchError::CheckoutPending(pending.player));
        }
        let expected = self.current_player().id;
        if player == expected {
            Ok(())
        } else if self.card(player).is_none() {
            Err(MatchError::UnknownPlayer(player))
        } else {
            Err(MatchError::NotPlayersTurn { expected })
        }
    }

    fn bust(&self, score: u16) -> (Transition, Verdict) {
        let mut next = self.clone();
        let player = self.current_player().id;
        next.end_turn(false);
        debug!(%player, score, "bust");
        let events = vec![Event::Bust { player, score }];
        (
            Transition {
                state: next,
                events,
            },
            Verdict::Bust,
        )
    }

    fn hold_checkout(
        &self,
        score: u16,
        route: Option<String>,
        minimum_darts: u8,
    ) -> (Transition, Verdict) {
        let mut next = self.clone();
        let player = self.current_player().id;
        next.pending = Some(PendingCheckout {
            player,
            score,
            route: route.clone(),
            minimum_darts,
        });
        debug!(%player, score, ?route, "checkout pending");
        let events = vec![Event::CheckoutPending {
            player,
            remaining: score,
            route: route.clone(),
        }];
        (
            Transition {
                state: next,
                events,
            },
            Verdict::CheckoutPending {
                route,
                remaining: score,
            },
        )
    }

    fn score_visit(&self, start: u16, score: u16, doubles: u8) -> (Transition, Verdict) {
        let mut next = self.clone();
        let card = &mut next.cards[self.current];
        let player = card.player.id;
        let remaining = start - score;
        card.history = card
            .history
            .pushed(ThrowRecord::visit(score, doubles, self.leg, self.set));
        card.score = remaining;
        let finish = if start <= MAX_CHECKOUT {
            check_possible_double_attempt(start, score).checkout_route
        } else {
            None
        };
        next.end_turn(true);
        debug!(%player, score, remaining, "visit scored");
        let events = vec![Event::Scored {
            player,
            score,
            remaining,
            finish,
        }];
        (
            Transition {
                state: next,
                events,
            },
            Verdict::Continue,
        )
    }

    /// Finalizes the pending checkout and moves on to the next leg.
    fn win_leg(&self, darts_used: u8, doubles_attempted: u8) -> Transition {
        let mut next = self.clone();
        let pending = next.pending.take().expect("checkout is pending");
        let seat = self.current;
        let mut events = vec![];

        let card = &mut next.cards[seat];
        card.history = card.history.pushed(ThrowRecord::checkout(
            pending.score,
            darts_used,
            doubles_attempted,
            self.leg,
            self.set,
        ));
        let leg_darts: u32 = card
            .history
            .leg(self.leg)
            .iter()
            .map(|r| u32::from(r.darts_used))
            .sum();
        card.legs_won.push(leg_darts);
        card.legs_in_set += 1;
        info!(player = %pending.player, darts = leg_darts, "leg won");
        events.push(Event::LegWon {
            player: pending.player,
            darts: leg_darts,
        });

        if self.format.legs().is_met(card.legs_in_set) {
            card.sets_won += 1;
            let sets_won = card.sets_won;
            for card in &mut next.cards {
                card.legs_in_set = 0;
            }
            next.set += 1;
            info!(player = %pending.player, sets_won, "set won");
            events.push(Event::SetWon {
                player: pending.player,
            });
            if self.format.sets().is_met(sets_won) {
                next.winner = Some(pending.player);
                info!(player = %pending.player, "match won");
                events.push(Event::MatchWon {
                    player: pending.player,
                });
            }
        }

        next.leg += 1;
        for card in &mut next.cards {
            card.score = card.player.starting_score;
        }
        next.end_turn(true);
        Transition {
            state: next,
            events,
        }
    }

    /// Rolls back the checkout `record` thrown from `seat`, which has already been popped from
    /// that player's history.
    fn reopen_leg(&mut self, seat: usize, record: ThrowRecord) {
        self.winner = None;
        let card = &mut self.cards[seat];
        card.legs_won.pop();
        if self.set != record.set {
            card.sets_won -= 1;
        }
        self.leg = record.leg;
        self.set = record.set;
        for card in &mut self.cards {
            card.rescore(record.leg);
            let legs = card
                .history
                .set(record.set)
                .iter()
                .filter(|r| r.is_checkout)
                .count();
            card.legs_in_set = u32::try_from(legs).expect("leg count fits in u32");
        }
    }

    /// Records the resolved visit and passes the turn.
    fn end_turn(&mut self, scored: bool) {
        self.turns.push(Turn {
            seat: self.current,
            scored,
        });
        self.current = (self.current + 1) % self.cards.len();
        self.refresh_guide();
    }

    fn refresh_guide(&mut self) {
        let card = &self.cards[self.current];
        let info = check_possible_double_attempt(card.score, 0);
        self.guide = if self.winner.is_none() && info.is_possible {
            Some(CheckoutGuide {
                player: card.player.id,
                remaining: card.score,
                route: info.checkout_route,
                minimum_darts: info.minimum_darts,
            })
        } else {
            None
        };
    }
}
