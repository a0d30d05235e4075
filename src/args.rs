//! Command line arguments

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::cache::{CacheConfig, DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::x01::{MatchFormat, OutMode, Target};

#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// The score every player starts each leg on.
    #[arg(long, default_value_t = 501)]
    pub start: u16,

    /// Legs needed to win a set.
    #[arg(long, default_value_t = 1)]
    pub legs: u32,

    /// Sets needed to win the match.
    #[arg(long, default_value_t = 1)]
    pub sets: u32,

    /// Read --legs and --sets as best-of counts instead of first-to.
    #[arg(long)]
    pub best_of: bool,

    #[arg(short, long, value_enum, default_value_t = Out::Double)]
    pub out: Out,

    /// Seconds a computed statistic stays cached.
    #[arg(long, default_value_t = DEFAULT_TTL.as_secs())]
    pub cache_ttl: u64,

    /// Maximum number of cached statistics.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub cache_capacity: usize,

    /// Disable colour.
    #[arg(long)]
    pub plain: bool,

    /// Player names, in throwing order.
    #[arg(required = true)]
    pub players: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum Out {
    #[default]
    Double,
    Straight,
}

impl From<Out> for OutMode {
    fn from(out: Out) -> Self {
        match out {
            Out::Double => OutMode::Double,
            Out::Straight => OutMode::Straight,
        }
    }
}

impl Args {
    fn target(&self, n: u32) -> Target {
        if self.best_of {
            Target::BestOf(n)
        } else {
            Target::FirstTo(n)
        }
    }

    /// The match format the arguments describe.
    pub fn format(&self) -> anyhow::Result<MatchFormat> {
        let format = MatchFormat::new(self.start, self.target(self.legs), self.target(self.sets))?;
        Ok(format.with_out_mode(self.out.into()))
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            capacity: self.cache_capacity,
            ttl: Duration::from_secs(self.cache_ttl),
        }
    }
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_parse() {
        let args = Args::parse_from([
            "oche", "--legs", "3", "--best-of", "--out", "straight", "a", "b",
        ]);
        assert_eq!(args.players, vec!["a", "b"]);
        let format = args.format().unwrap();
        assert_eq!(format.starting_score(), 501);
        assert_eq!(format.legs(), Target::BestOf(3));
        assert_eq!(format.sets(), Target::BestOf(1));
        assert_eq!(format.out_mode(), OutMode::Straight);
        assert_eq!(args.cache_config(), CacheConfig::default());
    }

    #[test]
    fn test_rejects_bad_format() {
        let args = Args::parse_from(["oche", "--start", "1", "a"]);
        assert_matches!(args.format(), Err(_));
        assert!(Args::try_parse_from(["oche"]).is_err());
    }
}
