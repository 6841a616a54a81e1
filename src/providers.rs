//! Traits and type definitions for chat model completions.
//!
//! The interface for all completions is provided by the [`CompletionGateway`]
//! trait. A gateway exchanges the full history of a conversation, together with
//! an out-of-band system instruction, for exactly one new assistant turn. It holds
//! no session state of its own: the caller threads the conversation through on
//! every call.
//!
//! ## Error Handling
//!
//! Each API has its own bespoke error system. Provider errors are encapsulated in
//! [`Error`], and the [`ErrorKind`] enum records the general category of the
//! failure. Callers should not branch on the kind; it exists so that logs and
//! messages can be specific. The only contract is success or failure with a
//! human-readable description.

mod apireq;

pub(crate) mod anthropic;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use crate::chat::Turn;
use crate::persona::SystemInstruction;

/// This is a list specifying general categories of errors that
/// can be returned by a [`CompletionGateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    /// Failed to connect to the underlying API service.
    /// This could be due to network issues like DNS
    /// resolution, connectivity issues, or routing problems.
    Connection,
    /// A request timed out.
    TimedOut,
    /// The API key was rejected or lacks the needed permissions.
    Authentication,
    /// A rate limit was reached or a quota was exceeded.
    ExcessUsage,
    /// The servers are overloaded.
    ApiOverloaded,
    /// The requested resource was not found. This likely means that
    /// the configured model does not exist.
    NotFound,
    /// The request was malformed or is otherwise improper. This
    /// often corresponds to errors with HTTP status codes in
    /// the 400s.
    BadRequest,
    /// The server encountered an error. This often corresponds to
    /// errors with HTTP status codes in the 500s.
    InternalError,
    /// An API response was unable to be deserialized, malformed,
    /// or otherwise violated the assumptions of the client.
    UnexpectedResponse,
    /// The number of tokens in the request exceeds the maximum limit
    /// imposed on the model.
    ContextExceeded,
    /// An error that does not fit into any of the other categories.
    UnspecifiedError,
}

#[derive(Debug)]
pub(crate) struct Error {
    kind: ErrorKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub(crate) fn from_kind(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }

    pub(crate) fn from_source(kind: ErrorKind, source: Box<dyn StdError + Send + Sync>) -> Error {
        Error {
            kind,
            source: Some(source),
        }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn message(&self) -> &'static str {
        match self.kind {
            ErrorKind::Connection => "failed to connect to the API service",
            ErrorKind::TimedOut => "request timed out",
            ErrorKind::Authentication => "authentication failed or not provided",
            ErrorKind::ExcessUsage => "rate limit exceeded or quota crossed",
            ErrorKind::ApiOverloaded => "API server(s) are currently overloaded",
            ErrorKind::NotFound => "the requested resource was not found",
            ErrorKind::BadRequest => "the request was bad or malformed",
            ErrorKind::InternalError => "the server encountered an internal error",
            ErrorKind::UnexpectedResponse => "API response was unexpected or malformed",
            ErrorKind::UnspecifiedError => "an unspecified error occurred",
            ErrorKind::ContextExceeded => "the model context was exceeded",
        }
    }

    /// The generic message followed by every description in the source chain
    pub(crate) fn describe(&self) -> String {
        let mut description = self.message().to_string();

        let mut source = self.source();

        while let Some(err) = source {
            description.push_str(": ");
            description.push_str(&err.to_string());
            source = err.source();
        }

        description
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| &**e as _)
    }
}

pub(crate) const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub(crate) const DEFAULT_MAX_TOKENS: u32 = 1500;
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Fixes the parameters of a completion request. The session treats this
/// as opaque and hands it to the gateway unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ModelConfig {
    /// The provider's identifier for the model
    pub model: String,
    /// The token budget for the generated turn
    pub max_tokens: u32,
    /// Requests that take longer than this fail with [`ErrorKind::TimedOut`]
    pub timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// A trait implemented by all completion backends.
#[async_trait]
pub(crate) trait CompletionGateway {
    /// Takes the turns of a conversation and produces the next turn, authored
    /// by the model.
    ///
    /// `history`: The conversation so far, oldest first. Must not be empty.
    /// `system`: Sent alongside the history, never as a turn within it.
    /// `config`: The model and its limits.
    ///
    /// Exactly one request is made per call; there are no retries.
    async fn complete(
        &self,
        history: &[Turn],
        system: &SystemInstruction,
        config: &ModelConfig,
    ) -> Result<Turn, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(thiserror::Error, Debug)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(thiserror::Error, Debug)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn test_describe_walks_source_chain() {
        let err = Error::from_source(ErrorKind::Authentication, Box::new(Outer(Inner)));

        assert_eq!(err.to_string(), "authentication failed or not provided");
        assert_eq!(
            err.describe(),
            "authentication failed or not provided: outer: inner"
        );
    }

    #[test]
    fn test_describe_without_source() {
        let err = Error::from_kind(ErrorKind::UnexpectedResponse);

        assert_eq!(err.kind(), ErrorKind::UnexpectedResponse);
        assert_eq!(err.describe(), "API response was unexpected or malformed");
    }
}
