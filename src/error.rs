//! Error types for the Institute Rules Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while applying institute rules.

use chrono::NaiveDate;
use thiserror::Error;

/// The reason a free-text duration could not be turned into a month count.
///
/// Callers use this to tell "leave the amount for manual entry" apart from
/// a duration that parsed but is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    /// The text contained no recognisable duration.
    #[error("unrecognised duration '{input}'")]
    Unrecognised {
        /// The text that was supplied.
        input: String,
    },

    /// The text parsed, but to a duration of zero.
    #[error("duration '{input}' has zero length")]
    Zero {
        /// The text that was supplied.
        input: String,
    },

    /// The number in the text does not fit the supported range.
    #[error("duration '{input}' is out of range")]
    OutOfRange {
        /// The text that was supplied.
        input: String,
    },
}

/// The main error type for the Institute Rules Engine.
///
/// # Example
///
/// ```
/// use institute_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/pricing.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/pricing.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The internship domain has no entry in the pricing table.
    #[error("Internship domain not found: {domain}")]
    DomainNotFound {
        /// The domain that was requested.
        domain: String,
    },

    /// A duration string could not be interpreted.
    #[error("Invalid duration: {0}")]
    InvalidDuration(#[from] DurationParseError),

    /// An attendance action is not allowed from the record's current state.
    #[error("Cannot {action} attendance for '{user_id}' on {date}: {message}")]
    InvalidAttendanceTransition {
        /// The user the record belongs to.
        user_id: String,
        /// The attendance day.
        date: NaiveDate,
        /// The attempted action (e.g. "check out").
        action: String,
        /// Why the action was refused.
        message: String,
    },

    /// The monthly cap on attendance corrections has been used up.
    #[error("Correction limit reached for '{user_id}': {used} of {limit} used this month")]
    CorrectionLimitReached {
        /// The user requesting the correction.
        user_id: String,
        /// Corrections already used this month.
        used: u32,
        /// The monthly limit.
        limit: u32,
    },

    /// A leave request was invalid or in the wrong state.
    #[error("Invalid leave request '{request_id}': {message}")]
    InvalidLeaveRequest {
        /// The ID of the leave request.
        request_id: String,
        /// A description of what made the request invalid.
        message: String,
    },

    /// A payroll period (year/month) was invalid.
    #[error("Invalid payroll period {year}-{month:02}")]
    InvalidPeriod {
        /// The requested year.
        year: i32,
        /// The requested month (1-12).
        month: u32,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/pricing.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/pricing.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/tax.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/tax.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_domain_not_found_displays_domain() {
        let error = EngineError::DomainNotFound {
            domain: "QUANTUM".to_string(),
        };
        assert_eq!(error.to_string(), "Internship domain not found: QUANTUM");
    }

    #[test]
    fn test_invalid_duration_wraps_parse_error() {
        let error: EngineError = DurationParseError::Zero {
            input: "0 months".to_string(),
        }
        .into();
        assert_eq!(
            error.to_string(),
            "Invalid duration: duration '0 months' has zero length"
        );
    }

    #[test]
    fn test_invalid_transition_displays_action_and_date() {
        let error = EngineError::InvalidAttendanceTransition {
            user_id: "stu_001".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            action: "check out".to_string(),
            message: "no check-in record found".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Cannot check out attendance for 'stu_001' on 2026-03-02: no check-in record found"
        );
    }

    #[test]
    fn test_correction_limit_displays_usage() {
        let error = EngineError::CorrectionLimitReached {
            user_id: "stu_001".to_string(),
            used: 4,
            limit: 4,
        };
        assert_eq!(
            error.to_string(),
            "Correction limit reached for 'stu_001': 4 of 4 used this month"
        );
    }

    #[test]
    fn test_invalid_period_pads_month() {
        let error = EngineError::InvalidPeriod {
            year: 2026,
            month: 13,
        };
        assert_eq!(error.to_string(), "Invalid payroll period 2026-13");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
        assert_error::<DurationParseError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn parse() -> Result<u32, DurationParseError> {
            Err(DurationParseError::Unrecognised {
                input: "soon".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<u32> {
            Ok(parse()?)
        }

        assert!(matches!(
            propagates_error(),
            Err(EngineError::InvalidDuration(DurationParseError::Unrecognised { .. }))
        ));
    }
}
