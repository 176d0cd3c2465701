//! Token → typed value conversion, one rule per [`OptionKind`].

use super::duration::parse_duration;
use super::timestamp::parse_timestamp;
use super::{OptionKind, OptionValue};

/// Convert a single raw token. Errors carry the reason only; callers attach
/// the flag name.
pub fn coerce(kind: OptionKind, raw: &str) -> Result<OptionValue, String> {
    match kind {
        OptionKind::Int => raw
            .parse::<i64>()
            .map(OptionValue::Int)
            .map_err(|e| e.to_string()),
        OptionKind::Uint => {
            if raw.starts_with('+') {
                return Err("invalid digit found in string".to_string());
            }
            raw.parse::<u64>()
                .map(OptionValue::Uint)
                .map_err(|e| e.to_string())
        }
        OptionKind::Float => raw
            .parse::<f64>()
            .map(OptionValue::Float)
            .map_err(|e| e.to_string()),
        OptionKind::Str => Ok(OptionValue::Str(raw.to_string())),
        OptionKind::Bool => match raw {
            "true" => Ok(OptionValue::Bool(true)),
            "false" => Ok(OptionValue::Bool(false)),
            _ => Err("expected true or false".to_string()),
        },
        OptionKind::Duration => parse_duration(raw).map(OptionValue::Duration),
        OptionKind::Timestamp => parse_timestamp(raw).map(OptionValue::Timestamp),
    }
}

/// Value of an inline boolean (`-flag=value`): only a literal `false`
/// switches the flag off.
pub fn inline_bool(raw: &str) -> bool {
    raw != "false"
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_numbers() {
        assert_eq!(coerce(OptionKind::Int, "-42"), Ok(OptionValue::Int(-42)));
        assert_eq!(coerce(OptionKind::Uint, "42"), Ok(OptionValue::Uint(42)));
        assert_eq!(coerce(OptionKind::Float, "2.5"), Ok(OptionValue::Float(2.5)));
        assert!(coerce(OptionKind::Int, "4x").is_err());
        assert!(coerce(OptionKind::Int, "").is_err());
        assert!(coerce(OptionKind::Uint, "-1").is_err());
        assert!(coerce(OptionKind::Uint, "+1").is_err());
        assert!(coerce(OptionKind::Float, "one").is_err());
    }

    #[test]
    fn test_string_is_literal() {
        assert_eq!(
            coerce(OptionKind::Str, "-not-a-flag"),
            Ok(OptionValue::Str("-not-a-flag".to_string()))
        );
    }

    #[test]
    fn test_bool_requires_literal() {
        assert_eq!(coerce(OptionKind::Bool, "true"), Ok(OptionValue::Bool(true)));
        assert_eq!(coerce(OptionKind::Bool, "false"), Ok(OptionValue::Bool(false)));
        assert!(coerce(OptionKind::Bool, "yes").is_err());
        assert!(inline_bool("yes"));
        assert!(!inline_bool("false"));
    }

    #[test]
    fn test_time_kinds() {
        assert_eq!(
            coerce(OptionKind::Duration, "3s"),
            Ok(OptionValue::Duration(TimeDelta::seconds(3)))
        );
        assert!(coerce(OptionKind::Timestamp, "1704038400").is_ok());
        assert!(coerce(OptionKind::Timestamp, "soon").is_err());
    }
}
