use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Integer codes for each error kind, as handed to callers that want the
/// classic `int`-returning iteration style.
pub const ERROR_NOARG: i32 = -10;
pub const ERROR_BADOPT: i32 = -11;
pub const ERROR_OPTSTOODEEP: i32 = -13;
pub const ERROR_BADQUOTE: i32 = -15;
pub const ERROR_ERRNO: i32 = -16;
pub const ERROR_BADNUMBER: i32 = -17;
pub const ERROR_OVERFLOW: i32 = -18;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unrecognized option token (the token as written).
    #[error("unknown option")]
    BadOption(String),

    /// Value-taking option with nothing left to consume.
    #[error("missing argument")]
    MissingArgument(String),

    #[error("invalid numeric value")]
    BadNumber(String),

    #[error("number too large or too small")]
    Overflow(String),

    #[error("aliases nested too deeply")]
    OptionsTooDeep,

    #[error("error in parameter quoting")]
    BadQuote,

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("type mismatch: expected {0}")]
    TypeMismatch(&'static str),

    #[error("option not found: {0}")]
    NotFound(String),

    #[error("exec failed: {0}")]
    Exec(String),
}

impl Error {
    /// Negative code for this error. Errors that never come out of the
    /// scanner share a generic code.
    pub fn code(&self) -> i32 {
        match self {
            Error::MissingArgument(_) => ERROR_NOARG,
            Error::BadOption(_) => ERROR_BADOPT,
            Error::OptionsTooDeep => ERROR_OPTSTOODEEP,
            Error::BadQuote => ERROR_BADQUOTE,
            Error::Io(_) => ERROR_ERRNO,
            Error::BadNumber(_) => ERROR_BADNUMBER,
            Error::Overflow(_) => ERROR_OVERFLOW,
            Error::TypeMismatch(_) | Error::NotFound(_) | Error::Exec(_) => -1000,
        }
    }
}

/// Message for an error code.
///
/// `ERROR_ERRNO` passes through to the platform message of the last OS
/// error, everything unknown maps to "unknown error".
pub fn strerror(code: i32) -> String {
    match code {
        ERROR_NOARG => "missing argument".to_string(),
        ERROR_BADOPT => "unknown option".to_string(),
        ERROR_OPTSTOODEEP => "aliases nested too deeply".to_string(),
        ERROR_BADQUOTE => "error in parameter quoting".to_string(),
        ERROR_BADNUMBER => "invalid numeric value".to_string(),
        ERROR_OVERFLOW => "number too large or too small".to_string(),
        ERROR_ERRNO => io::Error::last_os_error().to_string(),
        _ => "unknown error".to_string(),
    }
}
