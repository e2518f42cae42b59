//! The provider's field-naming convention, parsed into a value type.
//!
//! Every protocol field is named `<direction>-<kind>-<min>-<max>_<name>`,
//! e.g. `s-f-1-36_merchant-agreement-code`: a fixed-length string field of
//! 1 to 36 characters. The prefix encodes machine-checkable constraints, so
//! it is modeled as a parsed [`FieldCode`] rather than re-split strings.

use std::fmt;
use std::str::FromStr;

use crate::error::VerifoneError;

/// How a field's length bounds are enforced by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `f` — fixed: the value must fit the bounds exactly as declared.
    Fixed,
    /// `t` — truncatable: the provider truncates overlong values.
    Truncatable,
    /// Unrecognized kind token, kept verbatim for forward compatibility.
    Other(String),
}

impl FieldKind {
    fn as_str(&self) -> &str {
        match self {
            FieldKind::Fixed => "f",
            FieldKind::Truncatable => "t",
            FieldKind::Other(s) => s,
        }
    }
}

/// A parsed protocol field code.
///
/// Parsing is lossless: `code.to_string()` reproduces the original string,
/// including unrecognized direction or kind tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldCode {
    /// Data-type/direction token: `s`, `i`, `l`, `t`, `locale`, ...
    pub direction: String,
    pub kind: FieldKind,
    /// Minimum value length, in characters.
    pub min_len: usize,
    /// Maximum value length, in characters.
    pub max_len: usize,
    /// Semantic field name, e.g. `merchant-agreement-code`.
    pub name: String,
}

/// Advisory length violation reported by [`FieldCode::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthIssue {
    TooShort { len: usize, min: usize },
    TooLong { len: usize, max: usize },
}

impl FieldCode {
    /// Check a value against the declared length bounds.
    ///
    /// Returns `None` when the value fits. Violations are advisory, not
    /// errors: the provider is authoritative about what it accepts, and
    /// this check only exists to catch obvious local mistakes early.
    pub fn validate(&self, value: &str) -> Option<LengthIssue> {
        let len = value.chars().count();
        if len < self.min_len {
            return Some(LengthIssue::TooShort {
                len,
                min: self.min_len,
            });
        }
        if len > self.max_len {
            return Some(LengthIssue::TooLong {
                len,
                max: self.max_len,
            });
        }
        None
    }
}

impl FromStr for FieldCode {
    type Err = VerifoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| VerifoneError::MalformedFieldCode(format!("{s:?}: {reason}"));

        let (prefix, name) = s
            .split_once('_')
            .ok_or_else(|| malformed("missing '_' separator"))?;
        if name.is_empty() {
            return Err(malformed("empty field name"));
        }

        let parts: Vec<&str> = prefix.split('-').collect();
        let [direction, kind, min, max] = parts.as_slice() else {
            return Err(malformed("prefix is not <dir>-<kind>-<min>-<max>"));
        };
        if direction.is_empty() || kind.is_empty() {
            return Err(malformed("empty direction or kind token"));
        }

        let min_len: usize = min
            .parse()
            .map_err(|_| malformed("non-numeric minimum length"))?;
        let max_len: usize = max
            .parse()
            .map_err(|_| malformed("non-numeric maximum length"))?;

        let kind = match *kind {
            "f" => FieldKind::Fixed,
            "t" => FieldKind::Truncatable,
            other => FieldKind::Other(other.to_string()),
        };

        Ok(FieldCode {
            direction: direction.to_string(),
            kind,
            min_len,
            max_len,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for FieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}_{}",
            self.direction,
            self.kind.as_str(),
            self.min_len,
            self.max_len,
            self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_code() {
        let code: FieldCode = "s-f-1-36_merchant-agreement-code".parse().unwrap();
        assert_eq!(code.direction, "s");
        assert_eq!(code.kind, FieldKind::Fixed);
        assert_eq!(code.min_len, 1);
        assert_eq!(code.max_len, 36);
        assert_eq!(code.name, "merchant-agreement-code");
    }

    #[test]
    fn test_parse_multichar_direction() {
        let code: FieldCode = "locale-f-2-5_payment-locale".parse().unwrap();
        assert_eq!(code.direction, "locale");
        assert_eq!(code.name, "payment-locale");
    }

    #[test]
    fn test_parse_truncatable_with_underscores_in_name() {
        let code: FieldCode = "s-t-1-40_shop-order__phase".parse().unwrap();
        assert_eq!(code.kind, FieldKind::Truncatable);
        assert_eq!(code.name, "shop-order__phase");
    }

    #[test]
    fn test_parse_unknown_kind_kept() {
        let code: FieldCode = "s-x-1-10_whatever".parse().unwrap();
        assert_eq!(code.kind, FieldKind::Other("x".to_string()));
    }

    #[test]
    fn test_display_round_trip() {
        for s in [
            "s-f-1-36_merchant-agreement-code",
            "i-f-1-1_availability",
            "locale-f-2-5_payment-locale",
            "l-t-1-20_bi-gross-amount-0",
            "s-x-1-10_whatever",
        ] {
            let code: FieldCode = s.parse().unwrap();
            assert_eq!(code.to_string(), s);
            let reparsed: FieldCode = code.to_string().parse().unwrap();
            assert_eq!(reparsed, code);
        }
    }

    #[test]
    fn test_parse_rejects_missing_underscore() {
        let err = "s-f-1-36".parse::<FieldCode>().unwrap_err();
        assert!(matches!(err, VerifoneError::MalformedFieldCode(_)));
    }

    #[test]
    fn test_parse_rejects_non_numeric_bounds() {
        assert!("s-f-a-36_name".parse::<FieldCode>().is_err());
        assert!("s-f-1-b_name".parse::<FieldCode>().is_err());
    }

    #[test]
    fn test_parse_rejects_short_prefix() {
        assert!("s-f-1_name".parse::<FieldCode>().is_err());
        assert!("s-f-1-2-3_name".parse::<FieldCode>().is_err());
        assert!("_name".parse::<FieldCode>().is_err());
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        assert!("s-f-1-36_".parse::<FieldCode>().is_err());
    }

    #[test]
    fn test_validate_length_bounds() {
        let code: FieldCode = "s-f-2-4_x".parse().unwrap();
        assert_eq!(
            code.validate(""),
            Some(LengthIssue::TooShort { len: 0, min: 2 })
        );
        assert_eq!(
            code.validate("a"),
            Some(LengthIssue::TooShort { len: 1, min: 2 })
        );
        assert_eq!(code.validate("ab"), None);
        assert_eq!(code.validate("abcd"), None);
        assert_eq!(
            code.validate("abcde"),
            Some(LengthIssue::TooLong { len: 5, max: 4 })
        );
    }

    #[test]
    fn test_validate_counts_chars_not_bytes() {
        let code: FieldCode = "s-f-1-3_x".parse().unwrap();
        // Three multibyte characters fit a 3-char bound.
        assert_eq!(code.validate("äöå"), None);
    }
}
