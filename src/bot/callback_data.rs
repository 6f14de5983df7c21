//! Inline-button payloads, decoded once at the update boundary.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::utils::validation::{validate_hours, validate_split};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Challenge length picked from the hours keyboard.
    Hours(u32),
    /// One of the preset study/rest splits.
    Split { hours: u32, study: u32, rest: u32 },
    /// User wants to type the split manually.
    CustomSplit { hours: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackDataError {
    #[error("unknown callback action `{0}`")]
    UnknownAction(String),
    #[error("callback `{0}` has the wrong number of fields")]
    WrongArity(String),
    #[error("callback field `{0}` is not a number")]
    NotANumber(String),
    #[error("callback value out of range: {0}")]
    OutOfRange(String),
}

fn number(field: &str) -> Result<u32, CallbackDataError> {
    field
        .parse()
        .map_err(|_| CallbackDataError::NotANumber(field.to_string()))
}

impl FromStr for CallbackAction {
    type Err = CallbackDataError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = data.split(':').collect();
        
        let action = match parts.as_slice() {
            ["hours", hours] => CallbackAction::Hours(number(hours)?),
            ["split", hours, study, rest] => CallbackAction::Split {
                hours: number(hours)?,
                study: number(study)?,
                rest: number(rest)?,
            },
            ["split_custom", hours] => CallbackAction::CustomSplit { hours: number(hours)? },
            ["hours" | "split" | "split_custom", ..] => {
                return Err(CallbackDataError::WrongArity(data.to_string()))
            }
            _ => return Err(CallbackDataError::UnknownAction(data.to_string())),
        };
        
        action.validate()?;
        Ok(action)
    }
}

impl CallbackAction {
    pub fn hours(&self) -> u32 {
        match *self {
            CallbackAction::Hours(hours)
            | CallbackAction::Split { hours, .. }
            | CallbackAction::CustomSplit { hours } => hours,
        }
    }

    fn validate(&self) -> Result<(), CallbackDataError> {
        validate_hours(self.hours()).map_err(|e| CallbackDataError::OutOfRange(e.to_string()))?;
        if let CallbackAction::Split { study, rest, .. } = *self {
            validate_split(study, rest).map_err(|e| CallbackDataError::OutOfRange(e.to_string()))?;
        }
        Ok(())
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackAction::Hours(hours) => write!(f, "hours:{hours}"),
            CallbackAction::Split { hours, study, rest } => write!(f, "split:{hours}:{study}:{rest}"),
            CallbackAction::CustomSplit { hours } => write!(f, "split_custom:{hours}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_actions() {
        assert_eq!("hours:3".parse(), Ok(CallbackAction::Hours(3)));
        assert_eq!(
            "split:2:50:10".parse(),
            Ok(CallbackAction::Split { hours: 2, study: 50, rest: 10 })
        );
        assert_eq!("split_custom:4".parse(), Ok(CallbackAction::CustomSplit { hours: 4 }));
    }

    #[test]
    fn test_encoding_is_what_decoding_reads() {
        let action = CallbackAction::Split { hours: 5, study: 45, rest: 15 };
        assert_eq!(action.to_string(), "split:5:45:15");
        assert_eq!(action.to_string().parse(), Ok(action));
    }

    #[test]
    fn test_rejects_malformed_payloads() {
        assert!(matches!("rsvp:1".parse::<CallbackAction>(), Err(CallbackDataError::UnknownAction(_))));
        assert!(matches!("split:2:50".parse::<CallbackAction>(), Err(CallbackDataError::WrongArity(_))));
        assert!(matches!("hours:two".parse::<CallbackAction>(), Err(CallbackDataError::NotANumber(_))));
        assert!(matches!("hours:0".parse::<CallbackAction>(), Err(CallbackDataError::OutOfRange(_))));
        assert!(matches!("split:1:0:10".parse::<CallbackAction>(), Err(CallbackDataError::OutOfRange(_))));
    }
}
