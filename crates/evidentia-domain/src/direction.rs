//! Direction of evidence a study contributes to a claim

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a study supports, contradicts, or conditionally supports a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Direction {
    /// Supporting evidence (`+`)
    Supports,

    /// Contradicting evidence (`−`)
    Contradicts,

    /// Conditional or mixed evidence (`±`)
    Mixed,
}

impl Direction {
    /// Canonical symbol used in reports and persisted records
    pub fn symbol(&self) -> &'static str {
        match self {
            Direction::Supports => "+",
            Direction::Contradicts => "−",
            Direction::Mixed => "±",
        }
    }

    /// Parse a direction symbol
    ///
    /// The ASCII hyphen is accepted as an alias of `−` since most keyboards
    /// and markdown tables produce it.
    ///
    /// # Examples
    ///
    /// ```
    /// use evidentia_domain::Direction;
    ///
    /// assert_eq!(Direction::parse("-"), Some(Direction::Contradicts));
    /// assert_eq!(Direction::parse("±"), Some(Direction::Mixed));
    /// assert_eq!(Direction::parse("?"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "+" => Some(Direction::Supports),
            "−" | "-" => Some(Direction::Contradicts),
            "±" | "+/-" => Some(Direction::Mixed),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid direction: {} (expected +, −, or ±)", s))
    }
}

impl TryFrom<String> for Direction {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        direction.symbol().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_roundtrip() {
        for direction in [Direction::Supports, Direction::Contradicts, Direction::Mixed] {
            assert_eq!(Direction::parse(direction.symbol()), Some(direction));
        }
    }

    #[test]
    fn test_ascii_hyphen_alias() {
        assert_eq!(Direction::parse(" - "), Some(Direction::Contradicts));
        assert_eq!(Direction::Contradicts.to_string(), "−");
    }

    #[test]
    fn test_serializes_as_symbol() {
        let json = serde_json::to_string(&Direction::Mixed).unwrap();
        assert_eq!(json, "\"±\"");
        let parsed: Direction = serde_json::from_str("\"-\"").unwrap();
        assert_eq!(parsed, Direction::Contradicts);
        assert!(serde_json::from_str::<Direction>("\"x\"").is_err());
    }
}
