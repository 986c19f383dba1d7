use std::fmt::Display;

use crate::location::Location;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    // Parser errors
    #[error("Unexpected {found}, expected {expected}")]
    Syntax { found: String, expected: String },
    #[error("Reached end of input, expected {expected}")]
    UnexpectedEnd { expected: String },

    // Evaluation errors
    #[error("Unbound name '{0}'")]
    UnboundName(String),
    #[error("Type mismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("Value {0} is not a function")]
    NotAFunction(String),
    #[error("Non-exhaustive match for value {0}")]
    NonExhaustiveMatch(String),
    #[error("Unknown operator '{0}'")]
    UnknownOperator(String),
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
    #[error("Failed to write program output: {0}")]
    Output(#[from] std::io::Error),
}

impl ErrorKind {
    // Short name of the error kind, used as the report title by the CLI
    pub fn name(&self) -> &'static str {
        use ErrorKind::*;

        match self {
            Syntax { .. } | UnexpectedEnd { .. } => "SyntaxError",
            UnboundName(_) => "UnboundName",
            TypeMismatch { .. } | NotAFunction(_) => "TypeMismatch",
            NonExhaustiveMatch(_) => "NonExhaustiveMatch",
            UnknownOperator(_) => "UnknownOperator",
            Arithmetic(_) => "ArithmeticError",
            Output(_) => "OutputError",
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, ErrorKind::Syntax { .. } | ErrorKind::UnexpectedEnd { .. })
    }
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    // Only parse errors point into the source, runtime errors have no location
    pub location: Option<Location>,
}

impl Error {
    pub fn new(kind: ErrorKind, location: Location) -> Error {
        Error {
            kind,
            location: Some(location),
        }
    }

    pub fn runtime(kind: ErrorKind) -> Error {
        Error {
            kind,
            location: None,
        }
    }

    pub fn type_mismatch(expected: impl Into<String>, found: impl Display) -> Error {
        Error::runtime(ErrorKind::TypeMismatch {
            expected: expected.into(),
            found: found.to_string(),
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} on line {}: {}", self.kind.name(), location.line, self.kind),
            None => write!(f, "{}: {}", self.kind.name(), self.kind),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error::runtime(kind)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::runtime(ErrorKind::Output(err))
    }
}
