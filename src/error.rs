use std::path::PathBuf;
use thiserror::Error;

use crate::coerce::CoerceError;
use crate::constraint::ConstraintError;

/// Every failure surfaced by this crate.
///
/// Errors carry their attribution: either a parameter name (`Parameter
/// '<name>': ...`) or a raw context label (a config-file line number, an
/// environment-variable name, the command line). Merge phases catch
/// [`IgnoredParameter`](ParamError::IgnoredParameter) to skip inert
/// parameters silently; everything else is fatal to the current call.
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("Parameter '{0}': Unknown parameter.")]
    UnknownParameter(String),

    #[error("Parameter '{0}': Parameter is marked ignored.")]
    IgnoredParameter(String),

    #[error("Parameter '{name}': {source}")]
    TypeConversion { name: String, source: CoerceError },

    #[error("Parameter '{name}': {source}")]
    ConstraintViolation {
        name: String,
        source: ConstraintError,
    },

    #[error("Parameter '{name}': {reason}")]
    DuplicateParameter { name: String, reason: String },

    #[error("Parameter '{name}': {reason}")]
    MalformedSpec { name: String, reason: String },

    #[error("Malformed line.")]
    MalformedLine,

    #[error("Line {line}: {source}")]
    ConfigLine {
        line: usize,
        source: Box<ParamError>,
    },

    #[error("Environment variable {var}: {source}")]
    EnvVar {
        var: String,
        source: Box<ParamError>,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parameter '{0}': Requires a value, nothing has been set.")]
    MissingValue(String),

    #[error("Command line option: {0}")]
    CommandLineSyntax(String),
}

impl ParamError {
    /// True for the ignored-parameter signal, which callers (and the merge
    /// phases) may suppress selectively.
    pub fn is_ignored(&self) -> bool {
        matches!(self, ParamError::IgnoredParameter(_))
    }

    /// Wrap an error with a 1-based config-file line number.
    pub(crate) fn at_line(self, line: usize) -> ParamError {
        ParamError::ConfigLine {
            line,
            source: Box::new(self),
        }
    }

    /// Wrap an error with the full environment-variable name.
    pub(crate) fn in_env_var(self, var: impl Into<String>) -> ParamError {
        ParamError::EnvVar {
            var: var.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ParamType;

    #[test]
    fn unknown_parameter_formats() {
        let err = ParamError::UnknownParameter("bar".into());
        assert_eq!(err.to_string(), "Parameter 'bar': Unknown parameter.");
    }

    #[test]
    fn type_conversion_formats() {
        let err = ParamError::TypeConversion {
            name: "baz".into(),
            source: CoerceError {
                value: "foo".into(),
                target: ParamType::Int,
            },
        };
        assert_eq!(
            err.to_string(),
            "Parameter 'baz': Cannot convert 'foo' to type 'integer'."
        );
    }

    #[test]
    fn line_wrap_prefixes_context() {
        let err = ParamError::UnknownParameter("FOO".into()).at_line(4);
        assert_eq!(
            err.to_string(),
            "Line 4: Parameter 'FOO': Unknown parameter."
        );
    }

    #[test]
    fn env_wrap_prefixes_variable_name() {
        let inner = ParamError::ConstraintViolation {
            name: "foo".into(),
            source: ConstraintError::NotAllowed("ggg".into()),
        };
        let err = inner.in_env_var("FOOBAR_MY_PARAM");
        assert_eq!(
            err.to_string(),
            "Environment variable FOOBAR_MY_PARAM: Parameter 'foo': 'ggg' is not one of the allowed values."
        );
    }

    #[test]
    fn ignored_is_distinguishable() {
        assert!(ParamError::IgnoredParameter("x".into()).is_ignored());
        assert!(!ParamError::UnknownParameter("x".into()).is_ignored());
    }

    #[test]
    fn missing_value_formats() {
        let err = ParamError::MissingValue("ggg".into());
        assert_eq!(
            err.to_string(),
            "Parameter 'ggg': Requires a value, nothing has been set."
        );
    }
}
