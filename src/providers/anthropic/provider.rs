use async_trait::async_trait;
use reqwest::{Client, IntoUrl};

use crate::chat::{Role, Turn};
use crate::persona::SystemInstruction;
use crate::providers::anthropic::api;
use crate::providers::apireq::shared_client;
use crate::providers::{CompletionGateway, Error, ErrorKind, ModelConfig};

impl From<api::Error> for Error {
    fn from(value: api::Error) -> Self {
        let kind = match &value {
            api::Error::Authentication(_) | api::Error::PermissionDenied(_) => {
                Some(ErrorKind::Authentication)
            }
            api::Error::InvalidRequest(_)
            | api::Error::InvalidApiBase(_)
            | api::Error::InvalidEndpoint(_) => Some(ErrorKind::BadRequest),
            api::Error::RequestTooLarge(_) => Some(ErrorKind::ContextExceeded),
            api::Error::InternalError(_) => Some(ErrorKind::InternalError),
            api::Error::NotFound(_) => Some(ErrorKind::NotFound),
            api::Error::RateLimit(_) => Some(ErrorKind::ExcessUsage),
            api::Error::UnknownStatus(_) => Some(ErrorKind::UnspecifiedError),
            api::Error::ApiOverloaded(_) => Some(ErrorKind::ApiOverloaded),
            api::Error::MalformedResponse { .. }
            | api::Error::EmptyContent
            | api::Error::NonTextContent => Some(ErrorKind::UnexpectedResponse),

            api::Error::RequestFailed(_) => None,
        };

        match (kind, value) {
            (Some(kind), value) => Error::from_source(kind, Box::new(value)),
            (None, api::Error::RequestFailed(err)) => err.into(),
            (None, value) => Error::from_source(ErrorKind::UnspecifiedError, Box::new(value)),
        }
    }
}

impl From<Role> for api::Role {
    fn from(value: Role) -> Self {
        match value {
            Role::User => api::Role::User,
            Role::Assistant => api::Role::Assistant,
        }
    }
}

pub(crate) struct AnthropicProvider {
    api: api::AnthropicApi,
}

impl AnthropicProvider {
    /// Creates a provider backed by the process-wide HTTP client
    pub(crate) fn new<U: IntoUrl>(api_key: &str, api_base: U) -> Result<AnthropicProvider, Error> {
        Self::with_client(shared_client().clone(), api_key, api_base)
    }

    pub(crate) fn with_client<U: IntoUrl>(
        client: Client,
        api_key: &str,
        api_base: U,
    ) -> Result<AnthropicProvider, Error> {
        Ok(AnthropicProvider {
            api: api::AnthropicApi::new(client, api_key, api_base)?,
        })
    }
}

#[async_trait]
impl CompletionGateway for AnthropicProvider {
    async fn complete(
        &self,
        history: &[Turn],
        system: &SystemInstruction,
        config: &ModelConfig,
    ) -> Result<Turn, Error> {
        debug_assert!(!history.is_empty(), "completion requested for an empty history");

        if history.is_empty() {
            return Err(Error::from_kind(ErrorKind::BadRequest));
        }

        let messages: Vec<api::ChatMessage> = history
            .iter()
            .map(|turn| api::ChatMessage {
                role: turn.role().into(),
                content: turn.content().to_string(),
            })
            .collect();

        tracing::debug!(
            model = %config.model,
            turns = messages.len(),
            max_tokens = config.max_tokens,
            "requesting completion"
        );

        let response = self
            .api
            .create_message(
                &config.model,
                config.max_tokens,
                system.as_str(),
                &messages,
                config.timeout,
            )
            .await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                id = %response.id,
                model = %response.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "completion received"
            );
        }

        if matches!(response.stop_reason, Some(api::StopReason::MaxTokens)) {
            tracing::info!(
                max_tokens = config.max_tokens,
                "completion stopped at the token budget"
            );
        }

        match response.content.into_iter().next() {
            Some(api::ContentBlock::Text { text }) => Ok(Turn::assistant(text)),
            Some(api::ContentBlock::Unsupported) => Err(api::Error::NonTextContent.into()),
            None => Err(api::Error::EmptyContent.into()),
        }
    }
}
