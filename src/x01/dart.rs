//! Dartboard targets.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// A single dart, as it would be called by a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dart {
    /// A single segment, 1-20.
    Single(u8),
    /// The double ring, 1-20.
    Double(u8),
    /// The treble ring, 1-20.
    Treble(u8),
    /// The outer bull (25).
    OuterBull,
    /// The inner bull (50), which counts as a double for finishing.
    Bull,
}

impl Dart {
    /// The number of points this dart scores.
    pub fn value(self) -> u16 {
        match self {
            Dart::Single(n) => u16::from(n),
            Dart::Double(n) => 2 * u16::from(n),
            Dart::Treble(n) => 3 * u16::from(n),
            Dart::OuterBull => 25,
            Dart::Bull => 50,
        }
    }

    /// Every scoring dart on the board.
    pub fn all() -> impl Iterator<Item = Dart> {
        (1..=20)
            .flat_map(|n| [Dart::Single(n), Dart::Double(n), Dart::Treble(n)])
            .chain([Dart::OuterBull, Dart::Bull])
    }

    /// Whether the dart may legally finish a leg under double-out rules.
    pub fn is_double(self) -> bool {
        matches!(self, Dart::Double(_) | Dart::Bull)
    }
}

impl Display for Dart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dart::Single(n) => write!(f, "{n}"),
            Dart::Double(n) => write!(f, "D{n}"),
            Dart::Treble(n) => write!(f, "T{n}"),
            Dart::OuterBull => f.write_str("25"),
            Dart::Bull => f.write_str("Bull"),
        }
    }
}

impl FromStr for Dart {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("bull") || s.eq_ignore_ascii_case("db") {
            return Ok(Dart::Bull);
        }
        if s == "25" || s.eq_ignore_ascii_case("sb") {
            return Ok(Dart::OuterBull);
        }
        let (ctor, digits): (fn(u8) -> Dart, &str) = match s.chars().next().ok_or(())? {
            'D' | 'd' => (Dart::Double, &s[1..]),
            'T' | 't' => (Dart::Treble, &s[1..]),
            'S' | 's' => (Dart::Single, &s[1..]),
            _ => (Dart::Single, s),
        };
        let segment: u8 = digits.parse().map_err(|_| ())?;
        if (1..=20).contains(&segment) {
            Ok(ctor(segment))
        } else {
            Err(())
        }
    }
}

impl Serialize for Dart {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Dart::from_str(&s).map_err(|_| serde::de::Error::custom(format!("invalid dart {s:?}")))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        for (input, expect, display) in [
            ("T20", Dart::Treble(20), "T20"),
            ("d16", Dart::Double(16), "D16"),
            ("19", Dart::Single(19), "19"),
            ("S5", Dart::Single(5), "5"),
            ("25", Dart::OuterBull, "25"),
            ("Bull", Dart::Bull, "Bull"),
        ] {
            let dart = Dart::from_str(input).unwrap();
            assert_eq!(dart, expect);
            assert_eq!(dart.to_string(), display);
        }
        for bad in ["", "T21", "D0", "X3", "T"] {
            assert!(Dart::from_str(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_value() {
        assert_eq!(Dart::Treble(20).value(), 60);
        assert_eq!(Dart::Double(16).value(), 32);
        assert_eq!(Dart::Single(7).value(), 7);
        assert_eq!(Dart::OuterBull.value(), 25);
        assert_eq!(Dart::Bull.value(), 50);
        assert!(Dart::Bull.is_double());
        assert!(!Dart::OuterBull.is_double());
        assert_eq!(Dart::all().count(), 62);
        assert_eq!(Dart::all().filter(|d| d.is_double()).count(), 21);
    }
}
