//! The single writer for a match.

use std::collections::VecDeque;

use delegate::delegate;
use tracing::debug;

use super::state::{PendingCheckout, Scorecard};
use super::{CheckoutResponse, Event, MatchError, MatchState, Phase, PlayerId, Verdict, Visit};

/// Owns the current [`MatchState`] and replaces it with each successful transition.
///
/// Events from every transition are queued in order until drained with [`Scorer::pop_event`].
#[derive(Debug)]
pub struct Scorer {
    state: MatchState,
    events: VecDeque<Event>,
}

impl Scorer {
    pub fn new(state: MatchState) -> Self {
        Self {
            state,
            events: VecDeque::new(),
        }
    }

    /// The current state.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    delegate! {
        to self.state {
            pub fn card(&self, player: PlayerId) -> Option<&Scorecard>;
            pub fn current_index(&self) -> usize;
            pub fn pending(&self) -> Option<&PendingCheckout>;
            pub fn winner(&self) -> Option<PlayerId>;
            pub fn phase(&self) -> Phase;
        }
    }

    /// Pops the oldest unread event.
    pub fn pop_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn apply_throw(&mut self, player: PlayerId, score: u16) -> Result<Verdict, MatchError> {
        self.apply_visit(player, Visit::new(score))
    }

    pub fn apply_visit(&mut self, player: PlayerId, visit: Visit) -> Result<Verdict, MatchError> {
        let (transition, verdict) = self.state.apply_visit(player, visit).map_err(rejected)?;
        self.state = transition.state;
        self.events.extend(transition.events);
        Ok(verdict)
    }

    pub fn resolve_checkout(&mut self, response: CheckoutResponse) -> Result<(), MatchError> {
        let transition = self.state.resolve_checkout(response).map_err(rejected)?;
        self.state = transition.state;
        self.events.extend(transition.events);
        Ok(())
    }

    pub fn undo(&mut self) -> Result<(), MatchError> {
        let transition = self.state.undo_last_throw().map_err(rejected)?;
        self.state = transition.state;
        self.events.extend(transition.events);
        Ok(())
    }
}

fn rejected(err: MatchError) -> MatchError {
    debug!(%err, "transition rejected");
    err
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use crate::x01::{MatchFormat, Target};

    use super::*;

    fn scorer() -> Scorer {
        let format = MatchFormat::new(40, Target::FirstTo(1), Target::FirstTo(1)).unwrap();
        Scorer::new(MatchState::with_names(format, ["a", "b"]).unwrap())
    }

    #[test]
    fn test_events_queue_in_order() {
        let mut scorer = scorer();
        assert_eq!(scorer.apply_throw(PlayerId(1), 20), Ok(Verdict::Continue));
        assert_eq!(scorer.apply_throw(PlayerId(2), 41), Ok(Verdict::Bust));
        assert_matches!(scorer.pop_event(), Some(Event::Scored { score: 20, .. }));
        assert_matches!(scorer.pop_event(), Some(Event::Bust { score: 41, .. }));
        assert_eq!(scorer.pop_event(), None);
    }

    #[test]
    fn test_rejection_keeps_state() {
        let mut scorer = scorer();
        assert_eq!(
            scorer.apply_throw(PlayerId(2), 20),
            Err(MatchError::NotPlayersTurn {
                expected: PlayerId(1)
            })
        );
        assert_eq!(scorer.current_index(), 0);
        assert_eq!(scorer.pop_event(), None);
        assert_eq!(scorer.undo(), Err(MatchError::NothingToUndo));
    }

    #[test]
    fn test_checkout_and_undo() {
        let mut scorer = scorer();
        assert_matches!(
            scorer.apply_throw(PlayerId(1), 40),
            Ok(Verdict::CheckoutPending { remaining: 40, .. })
        );
        assert_eq!(scorer.phase(), Phase::CheckoutPending(PlayerId(1)));
        scorer
            .resolve_checkout(CheckoutResponse::Confirmed {
                darts_used: 1,
                doubles_attempted: 1,
            })
            .unwrap();
        assert_eq!(scorer.winner(), Some(PlayerId(1)));
        let events: Vec<_> = std::iter::from_fn(|| scorer.pop_event()).collect();
        assert_matches!(
            events.as_slice(),
            [
                Event::CheckoutPending { .. },
                Event::LegWon { darts: 1, .. },
                Event::SetWon { .. },
                Event::MatchWon { .. },
            ]
        );

        scorer.undo().unwrap();
        assert_eq!(scorer.winner(), None);
        assert_eq!(scorer.phase(), Phase::AwaitingThrow(PlayerId(1)));
        assert_eq!(scorer.card(PlayerId(1)).unwrap().score(), 40);
    }
}
