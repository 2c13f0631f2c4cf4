//! Validated market and subgroup field values.
//!
//! Each newtype can only be built through its validating constructor, so a
//! value that reaches the reconciler or the store is known to be well formed.
//! Validation failures are reported per field through [`FieldErrors`], which
//! collects every problem in a request instead of stopping at the first.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum length, in characters, of market and subgroup names.
pub const NAME_MAX: usize = 150;
/// Exact length of a market code.
pub const MARKET_CODE_LEN: usize = 2;

/// Validation failures for individual market fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketValidationError {
    EmptyName,
    NameTooLong { max: usize },
    EmptyCode,
    CodeWrongLength { expected: usize },
    CodeNotAlphabetic,
    EmptyLongCode,
    LongCodeMalformed,
    EmptySubGroupName,
    SubGroupNameTooLong { max: usize },
    EmptySubGroupCode,
    SubGroupCodeMalformed,
}

impl fmt::Display for MarketValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "market name must not be empty"),
            Self::NameTooLong { max } => {
                write!(f, "market name must be at most {max} characters")
            }
            Self::EmptyCode => write!(f, "market code must not be empty"),
            Self::CodeWrongLength { expected } => {
                write!(f, "market code must be exactly {expected} characters")
            }
            Self::CodeNotAlphabetic => {
                write!(f, "market code must contain alphabetic characters only")
            }
            Self::EmptyLongCode => write!(f, "long market code must not be empty"),
            Self::LongCodeMalformed => write!(
                f,
                "long market code must match the pattern X-XX.XX.XX using letters only"
            ),
            Self::EmptySubGroupName => write!(f, "subgroup name must not be empty"),
            Self::SubGroupNameTooLong { max } => {
                write!(f, "subgroup name must be at most {max} characters")
            }
            Self::EmptySubGroupCode => write!(f, "subgroup code must not be empty"),
            Self::SubGroupCodeMalformed => write!(
                f,
                "subgroup code must be a single letter or digit"
            ),
        }
    }
}

impl std::error::Error for MarketValidationError {}

static LONG_CODE_RE: OnceLock<Regex> = OnceLock::new();
static SUB_GROUP_CODE_RE: OnceLock<Regex> = OnceLock::new();

fn long_code_regex() -> &'static Regex {
    LONG_CODE_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z]-[A-Za-z]{2}\.[A-Za-z]{2}\.[A-Za-z]{2}$")
            .unwrap_or_else(|error| panic!("long market code regex failed to compile: {error}"))
    })
}

fn sub_group_code_regex() -> &'static Regex {
    SUB_GROUP_CODE_RE.get_or_init(|| {
        Regex::new("^[A-Za-z0-9]$")
            .unwrap_or_else(|error| panic!("subgroup code regex failed to compile: {error}"))
    })
}

fn checked_name(
    raw: String,
    empty: MarketValidationError,
    too_long: MarketValidationError,
) -> Result<String, MarketValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > NAME_MAX {
        return Err(too_long);
    }
    if trimmed.len() == raw.len() {
        Ok(raw)
    } else {
        Ok(trimmed.to_owned())
    }
}

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the value from owned or borrowed input.
            pub fn new(raw: impl Into<String>) -> Result<Self, MarketValidationError> {
                Self::from_owned(raw.into())
            }

            /// Case-folded form used for uniqueness comparisons.
            pub fn folded(&self) -> String {
                self.0.to_lowercase()
            }

            /// Whether two values collide under case-insensitive comparison.
            pub fn eq_ignore_case(&self, other: &Self) -> bool {
                self.folded() == other.folded()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = MarketValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::from_owned(value)
            }
        }
    };
}

string_newtype!(
    /// Market display name; surrounding whitespace is dropped.
    MarketName
);
string_newtype!(
    /// Two-letter market code, stored upper-case.
    ///
    /// # Examples
    /// ```
    /// use market_backend::domain::MarketCode;
    ///
    /// assert_eq!(MarketCode::new("gb").unwrap().as_ref(), "GB");
    /// assert!(MarketCode::new("G1").is_err());
    /// ```
    MarketCode
);
string_newtype!(
    /// Long market code of the form `X-XX.XX.XX`, stored upper-case.
    LongMarketCode
);
string_newtype!(
    /// Subgroup display name; surrounding whitespace is dropped.
    SubGroupName
);
string_newtype!(
    /// Single alphanumeric subgroup code, stored exactly as given.
    SubGroupCode
);

impl MarketName {
    fn from_owned(raw: String) -> Result<Self, MarketValidationError> {
        checked_name(
            raw,
            MarketValidationError::EmptyName,
            MarketValidationError::NameTooLong { max: NAME_MAX },
        )
        .map(Self)
    }
}

impl MarketCode {
    fn from_owned(raw: String) -> Result<Self, MarketValidationError> {
        if raw.is_empty() {
            return Err(MarketValidationError::EmptyCode);
        }
        if raw.chars().count() != MARKET_CODE_LEN {
            return Err(MarketValidationError::CodeWrongLength {
                expected: MARKET_CODE_LEN,
            });
        }
        if !raw.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MarketValidationError::CodeNotAlphabetic);
        }
        Ok(Self(raw.to_ascii_uppercase()))
    }
}

impl LongMarketCode {
    fn from_owned(raw: String) -> Result<Self, MarketValidationError> {
        if raw.trim().is_empty() {
            return Err(MarketValidationError::EmptyLongCode);
        }
        if !long_code_regex().is_match(&raw) {
            return Err(MarketValidationError::LongCodeMalformed);
        }
        Ok(Self(raw.to_ascii_uppercase()))
    }
}

impl SubGroupName {
    fn from_owned(raw: String) -> Result<Self, MarketValidationError> {
        checked_name(
            raw,
            MarketValidationError::EmptySubGroupName,
            MarketValidationError::SubGroupNameTooLong { max: NAME_MAX },
        )
        .map(Self)
    }
}

impl SubGroupCode {
    fn from_owned(raw: String) -> Result<Self, MarketValidationError> {
        if raw.is_empty() {
            return Err(MarketValidationError::EmptySubGroupCode);
        }
        if !sub_group_code_regex().is_match(&raw) {
            return Err(MarketValidationError::SubGroupCodeMalformed);
        }
        Ok(Self(raw))
    }
}

/// One rejected field of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Request path of the field, e.g. `subGroups[2].subGroupCode`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Accumulates field errors across a whole request.
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    /// Record the failure of `result` under `field`, yielding the value on
    /// success.
    pub fn check<T, E: fmt::Display>(
        &mut self,
        field: impl Into<String>,
        result: Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(field, error.to_string());
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Move every error recorded in `other` to the end of this list.
    pub fn append(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    /// `Ok(())` when nothing was recorded, otherwise every recorded error.
    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}

/// Request path of a field inside the `subGroups` collection.
pub fn sub_group_field(index: usize, field: &str) -> String {
    format!("subGroups[{index}].{field}")
}

/// Market scalars that passed validation; `None` means omitted or rejected.
#[derive(Debug, Default)]
pub struct CheckedScalars {
    pub name: Option<MarketName>,
    pub code: Option<MarketCode>,
    pub long_market_code: Option<LongMarketCode>,
}

/// Validate whichever market scalars are present, recording each failure.
pub fn check_scalars(
    name: Option<String>,
    code: Option<String>,
    long_market_code: Option<String>,
    errors: &mut FieldErrors,
) -> CheckedScalars {
    CheckedScalars {
        name: name.and_then(|raw| errors.check("name", MarketName::new(raw))),
        code: code.and_then(|raw| errors.check("code", MarketCode::new(raw))),
        long_market_code: long_market_code
            .and_then(|raw| errors.check("longMarketCode", LongMarketCode::new(raw))),
    }
}
