//! An umbrella module for the Anthropic provider

mod api;
mod provider;

pub(crate) use self::provider::AnthropicProvider;

pub(crate) const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
