//! Wrapper around Reqwest's error type to facilitate exclusive matching

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    ConnectFailed,
    DecodingFailed,
    RedirectPolicyViolated,
    TimedOut,
    UnknownReqwestError,
}

impl ErrorKind {
    // Timeouts are checked first: a connect timeout reports both
    // `is_connect` and `is_timeout`.
    fn classify(err: &reqwest::Error) -> ErrorKind {
        if err.is_timeout() {
            ErrorKind::TimedOut
        } else if err.is_decode() || err.is_body() {
            ErrorKind::DecodingFailed
        } else if err.is_redirect() {
            ErrorKind::RedirectPolicyViolated
        } else if err.is_connect() {
            ErrorKind::ConnectFailed
        } else {
            ErrorKind::UnknownReqwestError
        }
    }
}

#[derive(Debug)]
pub(crate) struct Error {
    kind: ErrorKind,
    source: reqwest::Error,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error {
            kind: ErrorKind::classify(&err),
            source: err,
        }
    }
}

impl Error {
    pub(crate) fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::ConnectFailed => write!(f, "connection failed"),
            ErrorKind::DecodingFailed => write!(f, "decoding the response failed"),
            ErrorKind::RedirectPolicyViolated => write!(f, "redirect policy violated"),
            ErrorKind::TimedOut => write!(f, "timed out"),
            ErrorKind::UnknownReqwestError => write!(f, "the request failed"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}
