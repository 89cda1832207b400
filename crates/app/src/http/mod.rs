//! HTTP transport for a remote bucket service.
//!
//! Every call is a `POST` under `/api/v0/bucket/`. Requests and replies are
//!  JSON except for file content, which travels as a raw byte stream in
//!  both directions.

mod error;
mod remote;
pub mod requests;

pub use error::ApiError;
pub use remote::HttpRemote;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder;
}

/// Join an api route onto the service base url, keeping any path prefix
///  the base url carries
pub(crate) fn endpoint(base_url: &Url, route: &str) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(["api", "v0", "bucket"])
            .extend(route.split('/'));
    }
    url
}
