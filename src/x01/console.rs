//! Simple console scorer.

use std::{borrow::Cow, fmt::Display, io, io::Write, str::FromStr};

use ansi_term::{ANSIString, ANSIStrings, Colour, Style};

use super::state::PendingCheckout;
use super::validator::checkout_route;
use super::{
    check_possible_double_attempt, CheckoutResponse, DoubleAttempt, Event, MatchError, MatchState,
    OutMode, PlayerId, StatsBook, Visit, DARTS_PER_VISIT,
};
use crate::cache::Clock;

/// What the marker asked for at the score prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Score(u16),
    Undo,
    Stats,
    Quit,
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "u" | "undo" => Ok(Command::Undo),
            "s" | "stats" => Ok(Command::Stats),
            "q" | "quit" => Ok(Command::Quit),
            s => s.parse().map(Command::Score).map_err(|_| ()),
        }
    }
}

/// The answer to "how many darts did the checkout take".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DartsAnswer {
    Darts(u8),
    Bust,
}

impl FromStr for DartsAnswer {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "bust" => Ok(DartsAnswer::Bust),
            s => match s.parse() {
                Ok(n) if (1..=DARTS_PER_VISIT).contains(&n) => Ok(DartsAnswer::Darts(n)),
                _ => Err(()),
            },
        }
    }
}

/// A dart count between zero and three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DartCount(u8);

impl FromStr for DartCount {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse() {
            Ok(n) if n <= DARTS_PER_VISIT => Ok(DartCount(n)),
            _ => Err(()),
        }
    }
}

fn prompt<T: FromStr, S: Display>(prompt: S) -> io::Result<T> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        let mut buffer = String::new();
        print!("{prompt}");
        stdout.flush()?;
        if stdin.read_line(&mut buffer)? == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        let trimmed = buffer.trim();
        if !trimmed.is_empty() {
            if let Ok(obj) = T::from_str(trimmed) {
                return Ok(obj);
            }
            println!("Invalid input, try again");
        }
    }
}

pub struct Console {
    color: bool,
}

impl Console {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn format(&self, s: &ANSIStrings) -> String {
        if self.color {
            s.to_string()
        } else {
            ansi_term::unstyle(s)
        }
    }

    fn paint<'a>(&self, style: Style, text: impl Into<Cow<'a, str>>) -> String {
        self.format(&ANSIStrings(&[style.paint(text)]))
    }

    fn name(state: &MatchState, player: PlayerId) -> String {
        state
            .card(player)
            .map_or_else(|| player.to_string(), |c| c.player().name.clone())
    }

    /// Prints the match format and the players.
    pub fn intro(&self, state: &MatchState) {
        let format = state.format();
        println!(
            "{} {}-out, legs {}, sets {}",
            format.starting_score(),
            match format.out_mode() {
                OutMode::Double => "double",
                OutMode::Straight => "straight",
            },
            format.legs(),
            format.sets(),
        );
        let mut parts: Vec<ANSIString> = vec!["Players: ".into()];
        for (i, card) in state.cards().iter().enumerate() {
            if i != 0 {
                parts.push(", ".into());
            }
            parts.push(Style::new().bold().paint(card.player().name.clone()));
        }
        println!("{}", self.format(&ANSIStrings(&parts)));
        println!("Enter a score, u to undo, s for stats, q to quit");
    }

    /// Prints the scoreboard line for the player on turn, with a suggested finish if one is on.
    pub fn show_turn(&self, state: &MatchState) {
        let card = &state.cards()[state.current_index()];
        let mut line = format!(
            "{} {}",
            self.paint(Style::new().bold(), card.player().name.as_str()),
            card.score()
        );
        if let Some(guide) = state.checkout_guide() {
            if let Some(route) = &guide.route {
                line.push_str(&format!(
                    " [{}]",
                    self.paint(Colour::Cyan.normal(), route.as_str())
                ));
            }
        }
        println!("{line}");
    }

    pub fn command(&self) -> io::Result<Command> {
        prompt("Score? ")
    }

    /// Completes a visit of `score`, asking about darts at a double if the thrower was on a
    /// finish and did not reach zero.
    pub fn visit(&self, state: &MatchState, score: u16) -> io::Result<Visit> {
        let start = state.cards()[state.current_index()].score();
        let visit = Visit::new(score);
        if score >= start || !check_possible_double_attempt(start, 0).is_possible {
            return Ok(visit);
        }
        let DartCount(n) = prompt("Darts at a double? ")?;
        let attempt = match n {
            0 => DoubleAttempt::Declined,
            n => DoubleAttempt::Attempted(n),
        };
        Ok(visit.with_double_attempt(attempt))
    }

    /// Asks the marker to confirm a visit that reached zero.
    pub fn confirm_checkout(&self, pending: &PendingCheckout) -> io::Result<CheckoutResponse> {
        let route = pending
            .route
            .clone()
            .unwrap_or_else(|| checkout_route(pending.score));
        println!(
            "Checkout {} ({route}), at least {} darts",
            pending.score,
            pending.minimum_darts.max(1)
        );
        let darts_used = match prompt("Darts used, or b for bust? ")? {
            DartsAnswer::Bust => return Ok(CheckoutResponse::Bust),
            DartsAnswer::Darts(n) => n,
        };
        let DartCount(doubles_attempted) = prompt("Darts at a double? ")?;
        Ok(CheckoutResponse::Confirmed {
            darts_used,
            doubles_attempted,
        })
    }

    pub fn notify(&self, state: &MatchState, event: &Event) {
        match event {
            Event::Scored {
                player,
                score,
                remaining,
                ..
            } => {
                println!("{}: {score}, {remaining} left", Self::name(state, *player));
            }
            Event::Bust { player, score } => {
                println!(
                    "{}: {} ({score})",
                    Self::name(state, *player),
                    self.paint(Colour::Red.bold(), "Bust")
                );
            }
            Event::CheckoutPending { .. } => (),
            Event::LegWon { player, darts } => {
                let text = format!("{} wins the leg in {darts} darts", Self::name(state, *player));
                println!("{}", self.paint(Colour::Green.normal(), text));
            }
            Event::SetWon { player } => {
                let text = format!("{} wins the set", Self::name(state, *player));
                println!("{}", self.paint(Colour::Green.bold(), text));
            }
            Event::MatchWon { player } => {
                let text = format!("{} wins the match!", Self::name(state, *player));
                println!("{}", self.paint(Colour::Yellow.bold(), text));
            }
            Event::Undone { player, record } => {
                let what = match record {
                    Some(record) => format!("{} undone", record.score),
                    None => String::from("visit undone"),
                };
                println!(
                    "{}: {}",
                    Self::name(state, *player),
                    self.paint(Colour::Yellow.normal(), what)
                );
            }
        }
    }

    pub fn error(&self, err: &MatchError) {
        println!("{}: {err}", self.paint(Colour::Red.normal(), "Error"));
    }

    /// Prints every player's statistics.
    pub fn show_stats<C: Clock>(&self, state: &MatchState, book: &mut StatsBook<C>) {
        for card in state.cards() {
            let Some(data) = state.game_data(card.player().id) else {
                continue;
            };
            let stats = book.derived(&data);
            println!(
                "{} legs {} sets {}",
                self.paint(Style::new().bold(), card.player().name.as_str()),
                stats.legs_won,
                stats.sets_won,
            );
            println!(
                "  avg {:.2}  leg {:.2}  set {:.2}  first 9 {:.2}",
                stats.overall_average,
                stats.leg_average,
                stats.set_average,
                stats.first_nine_average,
            );
            println!(
                "  checkout {:.2}% ({}/{})  high finish {}  darts {}",
                stats.checkout_percentage,
                stats.checkouts_hit,
                stats.checkout_attempts,
                stats.highest_finish,
                stats.darts_thrown,
            );
            let s = stats.scoring;
            println!(
                "  180: {}  140+: {}  100+: {}  60+: {}  40+: {}  20+: {}  <20: {}",
                s.one_eighty,
                s.ton_forty_plus,
                s.ton_plus,
                s.sixty_plus,
                s.forty_plus,
                s.twenty_plus,
                s.under_twenty,
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!("60".parse(), Ok(Command::Score(60)));
        assert_eq!("U".parse(), Ok(Command::Undo));
        assert_eq!("stats".parse(), Ok(Command::Stats));
        assert_eq!("q".parse(), Ok(Command::Quit));
        assert_eq!("-5".parse::<Command>(), Err(()));
        assert_eq!("x".parse::<Command>(), Err(()));
    }

    #[test]
    fn test_parse_checkout_answers() {
        assert_eq!("b".parse(), Ok(DartsAnswer::Bust));
        assert_eq!("2".parse(), Ok(DartsAnswer::Darts(2)));
        assert_eq!("0".parse::<DartsAnswer>(), Err(()));
        assert_eq!("4".parse::<DartsAnswer>(), Err(()));
        assert_eq!("0".parse(), Ok(DartCount(0)));
        assert_eq!("4".parse::<DartCount>(), Err(()));
    }
}
