//! Error types for the interpreter.
//!
//! Two families live here:
//! - recoverable input errors ([`TokenizeError`], [`OptionError`]) whose
//!   `Display` text is sent back to the user as the reply;
//! - configuration errors ([`SchemaError`], [`RegisterError`]) raised while
//!   commands are being registered, before anything is served.

use thiserror::Error;

/// Which quote was left open at end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    Single,
    Double,
}

impl QuoteKind {
    pub fn mark(self) -> char {
        match self {
            QuoteKind::Single => '\'',
            QuoteKind::Double => '"',
        }
    }
}

impl std::fmt::Display for QuoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QuoteKind::Single => "single",
            QuoteKind::Double => "double",
        };
        write!(f, "{name} quotation mark({})", self.mark())
    }
}

/// Malformed command line.
///
/// Positions are byte offsets into the line handed to the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("parse token: pos {pos}: not closed {quote}: {tail}")]
    UnclosedQuote {
        quote: QuoteKind,
        pos: usize,
        tail: String,
    },

    #[error("parse token: pos {pos}: unexpected end of line(\\)")]
    DanglingEscape { pos: usize },
}

/// Failure while binding tokens to a command's options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// A non-boolean flag was the last token.
    #[error("{flag}: miss param")]
    MissingValue { flag: String },

    #[error("{flag}: invalid {kind} value {value:?}: {reason}")]
    InvalidValue {
        flag: String,
        kind: &'static str,
        value: String,
        reason: String,
    },
}

/// Defect in an option schema declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("option flag name is empty")]
    EmptyFlag,

    #[error("option {0} declared more than once")]
    DuplicateFlag(String),

    #[error("unsupported option {flag} type: {kind}")]
    UnsupportedKind { flag: String, kind: String },

    #[error("option {flag} parse default value {value:?}: {reason}")]
    InvalidDefault {
        flag: String,
        value: String,
        reason: String,
    },
}

/// Registration rejected. Hosts treat this as fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("cmder: register cmd: name must not be empty")]
    EmptyName,

    #[error("cmder: duplicated register cmd: {0}")]
    Duplicate(String),

    #[error("cmder: register cmd {command}: {source}")]
    Schema {
        command: String,
        #[source]
        source: SchemaError,
    },
}
