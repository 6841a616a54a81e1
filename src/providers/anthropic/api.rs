use reqwest::{Client, IntoUrl};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::providers::apireq::{self, Url};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(thiserror::Error, Debug)]
pub(super) enum Error {
    /// The API Base is not a URL that can be used in a network request
    #[error("invalid api base")]
    InvalidApiBase(#[source] reqwest::Error),

    /// Endpoint URL is invalid
    #[error("invalid endpoint")]
    InvalidEndpoint(
        #[from]
        #[source]
        url::ParseError,
    ),

    /// Some issue with the request
    #[error("{}", .0)]
    RequestFailed(
        #[from]
        #[source]
        apireq::ReqwestError,
    ),

    /// A 2xx response whose body is not a message
    #[error("failed to parse the response body \"{}\"", abbreviate(.body))]
    MalformedResponse {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The message contained no content blocks at all
    #[error("the response contained no content")]
    EmptyContent,

    /// The first content block was something other than text
    #[error("the response did not start with a text block")]
    NonTextContent,

    /// There was an issue with the format or content of the request.
    #[error("{}", .0.message)]
    InvalidRequest(ApiErrorPayload),

    /// There's an issue with the API key.
    #[error("{}", .0.message)]
    Authentication(ApiErrorPayload),

    /// The API key does not have permission to use the specified resource.
    #[error("{}", .0.message)]
    PermissionDenied(ApiErrorPayload),

    /// The requested resource was not found.
    #[error("{}", .0.message)]
    NotFound(ApiErrorPayload),

    /// The request exceeds the maximum allowed number of bytes.
    #[error("{}", .0.message)]
    RequestTooLarge(ApiErrorPayload),

    /// The account has hit a rate limit.
    #[error("{}", .0.message)]
    RateLimit(ApiErrorPayload),

    /// An unexpected error has occurred internal to Anthropic's systems.
    #[error("{}", .0.message)]
    InternalError(ApiErrorPayload),

    /// Anthropic's API is temporarily overloaded.
    #[error("{}", .0.message)]
    ApiOverloaded(ApiErrorPayload),

    /// Some unknown error was returned by the API
    #[error("{}", .0.message)]
    UnknownStatus(ApiErrorPayload),
}

const MAX_QUOTED_BODY: usize = 200;

/// Shortens a response body quoted in an error message
fn abbreviate(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(MAX_QUOTED_BODY).collect();

    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

impl Error {
    fn from_status(status: u16, payload: ApiErrorPayload) -> Error {
        match status {
            400 => Error::InvalidRequest(payload),
            401 => Error::Authentication(payload),
            403 => Error::PermissionDenied(payload),
            404 => Error::NotFound(payload),
            413 => Error::RequestTooLarge(payload),
            429 => Error::RateLimit(payload),
            500 => Error::InternalError(payload),
            529 => Error::ApiOverloaded(payload),
            _ => Error::UnknownStatus(payload),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(super) enum Role {
    User,
    Assistant,
}

#[derive(Serialize, Debug)]
pub(super) struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/* Structures to serialize /v1/messages */

#[derive(Serialize, Debug)]
struct MessagesRequest<'r> {
    model: &'r str,
    max_tokens: u32,
    system: &'r str,
    messages: &'r [ChatMessage],
}

/* Structures to deserialize /v1/messages */

#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum ContentBlock {
    Text {
        text: String,
    },
    /// Tool use, thinking and any block types added later
    #[serde(other)]
    Unsupported,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(super) enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug)]
pub(super) struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Deserialize, Debug)]
pub(super) struct MessagesResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<StopReason>,
    pub usage: Option<Usage>,
}

/* API Errors */

#[derive(Deserialize, Debug)]
pub(super) struct ApiErrorPayload {
    message: String,
    #[serde(rename = "type")]
    typ: String,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    error: ApiErrorPayload,
}

impl ApiErrorPayload {
    // Gateways and proxies in front of the API do not always answer with the
    // documented error envelope; keep whatever they sent.
    fn from_body(status: reqwest::StatusCode, body: &str) -> ApiErrorPayload {
        match serde_json::from_str::<ApiErrorResponse>(body) {
            Ok(response) => response.error,
            Err(_) => ApiErrorPayload {
                message: if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body.trim().to_string()
                },
                typ: "unknown".to_string(),
            },
        }
    }
}

pub(super) struct AnthropicApi {
    client: Client,
    api_base: Url,
    api_key: String,
}

impl AnthropicApi {
    pub(super) fn new<U: IntoUrl>(
        client: Client,
        api_key: &str,
        api_base: U,
    ) -> Result<AnthropicApi, Error> {
        let mut api_base = api_base.into_url().map_err(Error::InvalidApiBase)?;

        // Endpoints are joined relative to the base, so a path prefix on the
        // base must end in a slash to survive the join.
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }

        Ok(AnthropicApi {
            client,
            api_base,
            api_key: api_key.to_string(),
        })
    }

    pub(super) async fn create_message(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        messages: &[ChatMessage],
        timeout: Duration,
    ) -> Result<MessagesResponse, Error> {
        let url = self.api_base.join("v1/messages")?;

        let res = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(timeout)
            .json(&MessagesRequest {
                model,
                max_tokens,
                system,
                messages,
            })
            .send()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))?;

        let status = res.status();

        let body = res
            .text()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))?;

        if status.is_success() {
            serde_json::from_str(&body)
                .map_err(|source| Error::MalformedResponse { body, source })
        } else {
            let payload = ApiErrorPayload::from_body(status, &body);

            tracing::debug!(status = status.as_u16(), error_type = %payload.typ, "anthropic api error");

            Err(Error::from_status(status.as_u16(), payload))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let messages = [
            ChatMessage {
                role: Role::User,
                content: "What is FedRAMP?".to_string(),
            },
            ChatMessage {
                role: Role::Assistant,
                content: "FedRAMP is...".to_string(),
            },
        ];

        let request = MessagesRequest {
            model: "claude-sonnet-4-20250514",
            max_tokens: 1500,
            system: "be helpful",
            messages: &messages,
        };

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 1500,
                "system": "be helpful",
                "messages": [
                    {"role": "user", "content": "What is FedRAMP?"},
                    {"role": "assistant", "content": "FedRAMP is..."},
                ],
            })
        );
    }

    #[test]
    fn test_response_with_unknown_blocks() {
        let body = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "tool_use", "id": "toolu_01", "name": "lookup", "input": {}},
                {"type": "text", "text": "AC-2 covers account management."}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 12, "output_tokens": 34}
        }"#;

        let response: MessagesResponse = serde_json::from_str(body).unwrap();

        assert_eq!(
            response.content,
            vec![
                ContentBlock::Unsupported,
                ContentBlock::Text {
                    text: "AC-2 covers account management.".to_string()
                },
            ]
        );
        assert_eq!(response.stop_reason, Some(StopReason::Other));
        assert_eq!(response.usage.unwrap().output_tokens, 34);
    }

    #[test]
    fn test_error_payload_fallback() {
        let documented = ApiErrorPayload::from_body(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#,
        );

        assert_eq!(documented.typ, "rate_limit_error");
        assert_eq!(documented.message, "slow down");

        let bare = ApiErrorPayload::from_body(reqwest::StatusCode::BAD_GATEWAY, "upstream died\n");

        assert_eq!(bare.typ, "unknown");
        assert_eq!(bare.message, "upstream died");

        let empty = ApiErrorPayload::from_body(reqwest::StatusCode::BAD_GATEWAY, "");

        assert_eq!(empty.message, "502 Bad Gateway");
    }

    #[test]
    fn test_status_mapping() {
        let payload = || ApiErrorPayload {
            message: "m".to_string(),
            typ: "t".to_string(),
        };

        assert!(matches!(Error::from_status(401, payload()), Error::Authentication(_)));
        assert!(matches!(Error::from_status(413, payload()), Error::RequestTooLarge(_)));
        assert!(matches!(Error::from_status(529, payload()), Error::ApiOverloaded(_)));
        assert!(matches!(Error::from_status(502, payload()), Error::UnknownStatus(_)));
    }

    #[test]
    fn test_api_base_keeps_path_prefix() {
        let endpoint = |base: &str| {
            let api = AnthropicApi::new(Client::new(), "key", base).unwrap();

            api.api_base.join("v1/messages").unwrap().to_string()
        };

        assert_eq!(
            endpoint("https://api.anthropic.com"),
            "https://api.anthropic.com/v1/messages"
        );
        assert_eq!(
            endpoint("https://gw.example.gov/anthropic/"),
            "https://gw.example.gov/anthropic/v1/messages"
        );
        assert_eq!(
            endpoint("https://gw.example.gov/anthropic"),
            "https://gw.example.gov/anthropic/v1/messages"
        );
    }

    #[test]
    fn test_malformed_body_is_abbreviated() {
        let body = "x".repeat(5000);
        let source = serde_json::from_str::<MessagesResponse>(&body).unwrap_err();

        let message = Error::MalformedResponse { body, source }.to_string();

        assert_eq!(
            message,
            format!("failed to parse the response body \"{}...\"", "x".repeat(200))
        );

        assert_eq!(abbreviate("<html>short</html>"), "<html>short</html>");
        assert_eq!(abbreviate(&"é".repeat(200)), "é".repeat(200));
    }
}
