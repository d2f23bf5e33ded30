//! Error types shared by the formatter and the timer.

use thiserror::Error;

/// Errors raised by the conversion helpers in [`crate::format`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    /// A negative millisecond count was passed to
    /// [`to_time_components`](crate::format::to_time_components).
    ///
    /// The countdown timer relies on this variant to detect that its
    /// deadline has passed.
    #[error("negative time supplied: {delta_ms}ms")]
    InvalidInput {
        /// The rejected count.
        delta_ms: i64,
    },

    /// A non-textual value was passed to
    /// [`parse_time_value`](crate::format::parse_time_value).
    #[error("time input must be a string, use to_time_components for millisecond counts")]
    TypeMismatch,

    /// The time string did not have exactly six characters.
    #[error("time string must have 6 characters, got {len}")]
    InvalidLength {
        /// Number of characters received.
        len: usize,
    },

    /// One of the two-character fields was not a number.
    #[error("{field} field is not a number: {value:?}")]
    InvalidField {
        /// `hours`, `minutes` or `seconds`.
        field: &'static str,
        /// The text that failed to parse.
        value: String,
    },
}

/// Errors raised by timer digit entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimerError {
    /// Digits and commits are only accepted in input mode.
    #[error("timer is not accepting digit input")]
    NotInInputMode,

    /// The value is not a decimal digit.
    #[error("not a decimal digit: {0}")]
    InvalidDigit(u8),

    /// The entered digits could not be parsed.
    #[error(transparent)]
    Format(#[from] FormatError),
}
