//! SQL type registry used to check cell text against a column's declared type.
//!
//! The registry is a lookup table from the exact type string found in the
//! definition sheet (`int(11)`, `varchar(255)`, ...) to a [`TypeRule`]. Type
//! strings with no entry are not errors: values in such columns are accepted
//! without a type check.
//!
//! ## Built-in entries
//!
//! | type                                                  | accepts                                              |
//! |-------------------------------------------------------|------------------------------------------------------|
//! | `bigint`, `bigint(20)`, `int`, `int(11)`, `smallint(6)` | optional `-`, then `0` or digits without a leading zero |
//! | `bit`, `bit(1)`                                       | `0` or `1`                                           |
//! | `datetime`                                            | `YYYY-MM-DD H:MM:SS` or `YYYY-MM-DD HH:MM:SS`        |
//! | `decimal`                                             | optional `-`, digits, optional `.` and digits        |
//! | `varchar`                                             | any single-line text                                 |
//! | `varchar(N)`, N in 10, 20, 40, 60, 80, 255, 512       | single-line text of at most N characters             |
//! | `varchar(4096)`                                       | anything (only a prefix has to fit, see below)       |
//!
//! Integer types check the shape of the literal, not its magnitude, so
//! `12345678901234567890` is accepted as a `bigint` even though it overflows
//! a signed 64-bit column. Range checks are left to the database.
//!
//! Single-line means no `\n`, `\r`, U+2028 or U+2029 anywhere in the value.
//! Lengths are counted in Unicode scalar values, so a character outside the
//! Basic Multilingual Plane, such as an emoji, counts once rather than as two
//! UTF-16 units.
//!
//! `varchar(4096)` is bound on a prefix rather than the whole value, unlike
//! every other `varchar(N)`. The effect is that any value passes, including
//! longer ones. This looseness is kept as-is.

use std::{collections::HashMap, sync::OnceLock};

use regex::Regex;
use thiserror::Error;

const INTEGER_PATTERN: &str = r"^-?(0|[1-9][0-9]*)$";
const BIT_PATTERN: &str = r"^[01]$";
const DATETIME_PATTERN: &str = r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{1,2}:[0-9]{2}:[0-9]{2}$";
const DECIMAL_PATTERN: &str = r"^-?[0-9]+(\.[0-9]+)?$";

/// Characters a length-bounded `varchar` value may not contain.
const LINE_BREAKS: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

/// Where a length limit applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthBound {
    /// The whole value must be single-line and within the limit.
    Whole,
    /// Only a leading run within the limit has to exist.
    Prefix,
}

/// Check applied to a non-empty value of a registered type.
#[derive(Debug, Clone)]
pub enum TypeRule {
    Pattern(Regex),
    Length {
        max_chars: Option<usize>,
        bound: LengthBound,
    },
}

impl TypeRule {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            TypeRule::Pattern(regex) => regex.is_match(value),
            TypeRule::Length { bound: LengthBound::Prefix, .. } => true,
            TypeRule::Length {
                max_chars,
                bound: LengthBound::Whole,
            } => {
                if value.contains(LINE_BREAKS) {
                    return false;
                }
                match max_chars {
                    Some(limit) => value.chars().count() <= *limit,
                    None => true,
                }
            }
        }
    }
}

enum BuiltinRule {
    Pattern(&'static str),
    Length(Option<usize>, LengthBound),
}

const BUILTIN_TYPES: &[(&str, BuiltinRule)] = &[
    ("bigint", BuiltinRule::Pattern(INTEGER_PATTERN)),
    ("bigint(20)", BuiltinRule::Pattern(INTEGER_PATTERN)),
    ("bit", BuiltinRule::Pattern(BIT_PATTERN)),
    ("bit(1)", BuiltinRule::Pattern(BIT_PATTERN)),
    ("datetime", BuiltinRule::Pattern(DATETIME_PATTERN)),
    ("decimal", BuiltinRule::Pattern(DECIMAL_PATTERN)),
    ("int", BuiltinRule::Pattern(INTEGER_PATTERN)),
    ("int(11)", BuiltinRule::Pattern(INTEGER_PATTERN)),
    ("smallint(6)", BuiltinRule::Pattern(INTEGER_PATTERN)),
    ("varchar", BuiltinRule::Length(None, LengthBound::Whole)),
    ("varchar(10)", BuiltinRule::Length(Some(10), LengthBound::Whole)),
    ("varchar(20)", BuiltinRule::Length(Some(20), LengthBound::Whole)),
    ("varchar(40)", BuiltinRule::Length(Some(40), LengthBound::Whole)),
    ("varchar(60)", BuiltinRule::Length(Some(60), LengthBound::Whole)),
    ("varchar(80)", BuiltinRule::Length(Some(80), LengthBound::Whole)),
    ("varchar(255)", BuiltinRule::Length(Some(255), LengthBound::Whole)),
    ("varchar(512)", BuiltinRule::Length(Some(512), LengthBound::Whole)),
    ("varchar(4096)", BuiltinRule::Length(Some(4096), LengthBound::Prefix)),
];

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid pattern for type '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Outcome of checking one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCheck {
    Matched,
    Mismatched,
    /// The type has no registry entry; the value was not checked.
    Unregistered,
}

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    rules: HashMap<String, TypeRule>,
}

static BUILTIN_REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

impl TypeRegistry {
    /// Registry with no entries; every type is unregistered.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::empty();
        for (name, rule) in BUILTIN_TYPES {
            match rule {
                BuiltinRule::Pattern(pattern) => registry.register(*name, pattern)?,
                BuiltinRule::Length(max_chars, bound) => registry.insert(
                    *name,
                    TypeRule::Length {
                        max_chars: *max_chars,
                        bound: *bound,
                    },
                ),
            }
        }
        Ok(registry)
    }

    /// Shared registry holding only the built-in entries.
    pub fn builtin() -> &'static TypeRegistry {
        BUILTIN_REGISTRY.get_or_init(|| {
            TypeRegistry::with_builtins().expect("built-in type patterns are valid")
        })
    }

    /// Adds or replaces the entry for `name` with a regular expression.
    pub fn register(&mut self, name: impl Into<String>, pattern: &str) -> Result<(), RegistryError> {
        let name = name.into();
        let regex = Regex::new(pattern).map_err(|source| RegistryError::InvalidPattern {
            name: name.clone(),
            source,
        })?;
        self.insert(name, TypeRule::Pattern(regex));
        Ok(())
    }

    pub fn insert(&mut self, name: impl Into<String>, rule: TypeRule) {
        self.rules.insert(name.into(), rule);
    }

    pub fn rule(&self, sql_type: &str) -> Option<&TypeRule> {
        self.rules.get(sql_type)
    }

    pub fn contains(&self, sql_type: &str) -> bool {
        self.rules.contains_key(sql_type)
    }

    pub fn check(&self, sql_type: &str, value: &str) -> TypeCheck {
        match self.rule(sql_type) {
            None => TypeCheck::Unregistered,
            Some(rule) if rule.matches(value) => TypeCheck::Matched,
            Some(_) => TypeCheck::Mismatched,
        }
    }

    /// Registered type names in sorted order.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names = self.rules.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(sql_type: &str, value: &str) -> TypeCheck {
        TypeRegistry::builtin().check(sql_type, value)
    }

    #[test]
    fn builtin_registry_has_exactly_the_documented_entries() {
        let names = TypeRegistry::builtin().type_names();
        assert_eq!(names.len(), 18);
        assert!(names.contains(&"smallint(6)"));
        assert!(names.contains(&"varchar(4096)"));
        assert!(!names.contains(&"varchar(100)"));
    }

    #[test]
    fn integer_family_rejects_leading_zeros_and_fractions() {
        for ty in ["bigint", "bigint(20)", "int", "int(11)", "smallint(6)"] {
            assert_eq!(check(ty, "0"), TypeCheck::Matched, "{ty}");
            assert_eq!(check(ty, "-42"), TypeCheck::Matched, "{ty}");
            assert_eq!(check(ty, "042"), TypeCheck::Mismatched, "{ty}");
            assert_eq!(check(ty, "1.0"), TypeCheck::Mismatched, "{ty}");
            assert_eq!(check(ty, "+1"), TypeCheck::Mismatched, "{ty}");
            assert_eq!(check(ty, "-"), TypeCheck::Mismatched, "{ty}");
        }
    }

    #[test]
    fn integer_pattern_does_not_check_magnitude() {
        assert_eq!(check("smallint(6)", "99999999"), TypeCheck::Matched);
        assert_eq!(check("bigint", "12345678901234567890"), TypeCheck::Matched);
    }

    #[test]
    fn integer_pattern_only_accepts_ascii_digits() {
        assert_eq!(check("int", "١٢"), TypeCheck::Mismatched);
    }

    #[test]
    fn bit_accepts_single_binary_digit() {
        assert_eq!(check("bit", "1"), TypeCheck::Matched);
        assert_eq!(check("bit(1)", "0"), TypeCheck::Matched);
        assert_eq!(check("bit", "10"), TypeCheck::Mismatched);
        assert_eq!(check("bit", "true"), TypeCheck::Mismatched);
    }

    #[test]
    fn datetime_allows_one_or_two_digit_hours() {
        assert_eq!(check("datetime", "2021-01-01 00:00:00"), TypeCheck::Matched);
        assert_eq!(check("datetime", "2021-01-01 7:05:09"), TypeCheck::Matched);
        assert_eq!(check("datetime", "2021-01-01"), TypeCheck::Mismatched);
        assert_eq!(check("datetime", "2021-01-01T00:00:00"), TypeCheck::Mismatched);
        assert_eq!(check("datetime", "2021-01-01 00:0:00"), TypeCheck::Mismatched);
    }

    #[test]
    fn decimal_requires_digits_on_both_sides_of_point() {
        assert_eq!(check("decimal", "12.50"), TypeCheck::Matched);
        assert_eq!(check("decimal", "-7"), TypeCheck::Matched);
        assert_eq!(check("decimal", ".5"), TypeCheck::Mismatched);
        assert_eq!(check("decimal", "5."), TypeCheck::Mismatched);
    }

    #[test]
    fn varchar_limits_count_characters_and_reject_line_breaks() {
        assert_eq!(check("varchar(10)", "abcdefghij"), TypeCheck::Matched);
        assert_eq!(check("varchar(10)", "abcdefghijk"), TypeCheck::Mismatched);
        assert_eq!(check("varchar(10)", "éééééééééé"), TypeCheck::Matched);
        assert_eq!(check("varchar(255)", "two\nlines"), TypeCheck::Mismatched);
        assert_eq!(check("varchar", &"x".repeat(100_000)), TypeCheck::Matched);
        assert_eq!(check("varchar", "two\nlines"), TypeCheck::Mismatched);
    }

    #[test]
    fn varchar_rejects_unicode_line_separators() {
        assert_eq!(check("varchar(20)", "a\u{2028}b"), TypeCheck::Mismatched);
        assert_eq!(check("varchar", "a\u{2029}b"), TypeCheck::Mismatched);
        assert_eq!(check("varchar(20)", "a\u{85}b"), TypeCheck::Matched);
        assert_eq!(check("varchar(10)", &"😀".repeat(10)), TypeCheck::Matched);
        assert_eq!(check("varchar(4096)", "a\u{2028}b"), TypeCheck::Matched);
    }

    #[test]
    fn varchar_4096_only_bounds_a_prefix() {
        assert_eq!(check("varchar(4096)", &"x".repeat(5000)), TypeCheck::Matched);
        assert_eq!(check("varchar(4096)", "two\nlines"), TypeCheck::Matched);
        assert_eq!(check("varchar(512)", &"x".repeat(513)), TypeCheck::Mismatched);
    }

    #[test]
    fn unknown_types_are_unregistered() {
        assert_eq!(check("enum('a','b')", "zzz"), TypeCheck::Unregistered);
        assert_eq!(check("INT", "abc"), TypeCheck::Unregistered);
    }

    #[test]
    fn custom_patterns_extend_and_invalid_ones_fail() {
        let mut registry = TypeRegistry::with_builtins().unwrap();
        registry.register("char(2)", r"^.{2}$").unwrap();
        assert_eq!(registry.check("char(2)", "ab"), TypeCheck::Matched);
        assert_eq!(registry.check("char(2)", "abc"), TypeCheck::Mismatched);
        let err = registry.register("broken", "(").unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
