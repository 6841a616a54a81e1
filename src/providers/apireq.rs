//! A utility module with helpers for making API requests.

mod client;
mod error;
mod provider;

pub(crate) use client::shared_client;
pub(crate) use error::Error as ReqwestError;
pub(crate) use reqwest::Url;
