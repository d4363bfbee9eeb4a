//! Actions attached to steps and their activation qualifiers.
//!
//! An [`ActionBlock`] names the output variable it drives, the [`Qualifier`]
//! that decides when it is active, an optional guard condition and, for the
//! time-based qualifiers, a duration in seconds.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One of the nine action qualifiers.
///
/// | Qualifier | Behavior                                                   |
/// |-----------|------------------------------------------------------------|
/// | `N`       | active while the step is active and the condition holds    |
/// | `S`       | sets the variable, which stays set                         |
/// | `R`       | resets the variable                                        |
/// | `L`       | active for at most `duration` after step activation        |
/// | `D`       | active once `duration` has elapsed since step activation   |
/// | `P`       | active for one pulse window after step activation          |
/// | `SD`/`DS` | sets the variable once `duration` has elapsed              |
/// | `SL`      | sets the variable while less than `duration` has elapsed   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Qualifier {
    #[default]
    N,
    S,
    R,
    L,
    D,
    P,
    SD,
    DS,
    SL,
}

impl Qualifier {
    /// Returns `true` for the qualifiers that need a duration.
    pub fn is_time_based(self) -> bool {
        matches!(
            self,
            Qualifier::L | Qualifier::D | Qualifier::SD | Qualifier::DS | Qualifier::SL
        )
    }

    /// Returns `true` for the qualifiers that latch their variable.
    pub fn is_stored(self) -> bool {
        matches!(
            self,
            Qualifier::S | Qualifier::SD | Qualifier::DS | Qualifier::SL
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Qualifier::N => "N",
            Qualifier::S => "S",
            Qualifier::R => "R",
            Qualifier::L => "L",
            Qualifier::D => "D",
            Qualifier::P => "P",
            Qualifier::SD => "SD",
            Qualifier::DS => "DS",
            Qualifier::SL => "SL",
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a qualifier name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownQualifier(pub String);

impl fmt::Display for UnknownQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action qualifier `{}`", self.0)
    }
}

impl std::error::Error for UnknownQualifier {}

impl FromStr for Qualifier {
    type Err = UnknownQualifier;

    /// Parses a qualifier code or one of the descriptive aliases
    /// (`Normal`, `Continuous`, `Stored`, `Set`, `Reset`, `Temporal`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let qualifier = match s.trim().to_ascii_uppercase().as_str() {
            "N" | "NORMAL" | "CONTINUOUS" => Qualifier::N,
            "S" | "SET" | "STORED" => Qualifier::S,
            "R" | "RESET" => Qualifier::R,
            "L" | "LIMITED" => Qualifier::L,
            "D" | "DELAYED" | "TEMPORAL" => Qualifier::D,
            "P" | "PULSE" => Qualifier::P,
            "SD" => Qualifier::SD,
            "DS" => Qualifier::DS,
            "SL" => Qualifier::SL,
            _ => return Err(UnknownQualifier(s.to_string())),
        };
        Ok(qualifier)
    }
}

/// An action attached to a step, or a global action evaluated every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBlock {
    name: String,
    #[serde(default)]
    qualifier: Qualifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
}

impl ActionBlock {
    /// Creates an action driving `name` with the given qualifier.
    ///
    /// # Examples
    ///
    /// ```
    /// # use grafcet_core::action::{ActionBlock, Qualifier};
    /// let action = ActionBlock::new("PUMP", Qualifier::L)
    ///     .with_duration(10.0)
    ///     .with_condition("NOT E_STOP");
    ///
    /// assert_eq!(action.name(), "PUMP");
    /// assert_eq!(action.duration(), Some(10.0));
    /// ```
    pub fn new(name: impl Into<String>, qualifier: Qualifier) -> Self {
        Self {
            name: name.into(),
            qualifier,
            condition: None,
            duration: None,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    /// Guard condition; `None` (or blank text) means always met.
    pub fn condition(&self) -> Option<&str> {
        self.condition
            .as_deref()
            .filter(|condition| !condition.trim().is_empty())
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualifier_codes_round_trip_display() {
        for code in ["N", "S", "R", "L", "D", "P", "SD", "DS", "SL"] {
            let qualifier: Qualifier = code.parse().unwrap();
            assert_eq!(qualifier.to_string(), code);
        }
    }

    #[test]
    fn test_qualifier_aliases() {
        assert_eq!("Temporal".parse::<Qualifier>(), Ok(Qualifier::D));
        assert_eq!("normal".parse::<Qualifier>(), Ok(Qualifier::N));
        assert_eq!("Stored".parse::<Qualifier>(), Ok(Qualifier::S));
        assert_eq!("reset".parse::<Qualifier>(), Ok(Qualifier::R));
        assert_eq!(
            "Q".parse::<Qualifier>(),
            Err(UnknownQualifier("Q".to_string()))
        );
    }

    #[test]
    fn test_qualifier_classes() {
        assert!(Qualifier::SL.is_time_based());
        assert!(Qualifier::SL.is_stored());
        assert!(!Qualifier::P.is_time_based());
        assert!(!Qualifier::R.is_stored());
        assert!(Qualifier::S.is_stored());
    }

    #[test]
    fn test_blank_condition_is_none() {
        let action = ActionBlock::new("LAMP", Qualifier::N).with_condition("   ");
        assert_eq!(action.condition(), None);
    }
}
