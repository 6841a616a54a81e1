//! The process-wide HTTP client

use lazy_static::lazy_static;
use reqwest::Client;

lazy_static! {
    // Built on first use and reused for the lifetime of the process, so that
    // every request shares one connection pool. Timeouts are applied per
    // request, which keeps the builder infallible.
    static ref CLIENT: Client = Client::new();
}

pub(crate) fn shared_client() -> &'static Client {
    &CLIENT
}
