//! Request and reply bodies for the bucket service api

use common::bucket::{AccessRoles, BucketRoot, CreateOptions, CreateReply, Links, ThreadId};
use common::remote::{ListPathReply, PushPathReply};
use reqwest::{header::CONTENT_TYPE, Body, Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{endpoint, ApiRequest};

/// Empty acknowledgement for calls that return nothing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    pub thread: Option<ThreadId>,
    pub name: String,
    #[serde(flatten)]
    pub opts: CreateOptions,
    /// Reuse a bucket of the same name in the thread if there is one
    pub open: bool,
}

impl ApiRequest for CreateRequest {
    type Response = CreateReply;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(endpoint(base_url, "create")).json(&self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRequest {
    pub thread: Option<ThreadId>,
    /// Only buckets owned by the caller, across threads
    #[serde(default)]
    pub owned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub roots: Vec<BucketRoot>,
}

impl ApiRequest for ListRequest {
    type Response = ListResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(endpoint(base_url, "list")).json(&self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LsRequest {
    pub key: String,
    pub path: String,
    pub depth: u32,
}

impl ApiRequest for LsRequest {
    type Response = ListPathReply;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(endpoint(base_url, "ls")).json(&self)
    }
}

/// File content upload. The target travels in the query string, the
///  body is the raw chunk stream.
#[derive(Debug)]
pub struct PushRequest {
    pub key: String,
    pub path: String,
    /// Root path the write must fast-forward from
    pub root: Option<String>,
    pub body: Body,
}

impl ApiRequest for PushRequest {
    type Response = PushPathReply;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let mut query = vec![("key", self.key), ("path", self.path)];
        if let Some(root) = self.root {
            query.push(("root", root));
        }
        client
            .post(endpoint(base_url, "push"))
            .query(&query)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(self.body)
    }
}

/// Content download. The reply body is the raw file, so this is sent
///  directly rather than through `call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub key: String,
    pub path: String,
}

impl PullRequest {
    pub fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(endpoint(base_url, "pull")).json(&self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovePathRequest {
    pub key: String,
    pub path: String,
    pub root: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovePathResponse {
    pub root: BucketRoot,
}

impl ApiRequest for RemovePathRequest {
    type Response = RemovePathResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(endpoint(base_url, "rm")).json(&self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub key: String,
}

impl ApiRequest for DeleteRequest {
    type Response = Ack;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(endpoint(base_url, "delete")).json(&self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRolesRequest {
    pub key: String,
    pub path: String,
    pub roles: AccessRoles,
}

impl ApiRequest for PushRolesRequest {
    type Response = Ack;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(endpoint(base_url, "roles/push")).json(&self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRolesRequest {
    pub key: String,
    pub path: String,
}

impl ApiRequest for PullRolesRequest {
    type Response = AccessRoles;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(endpoint(base_url, "roles/pull")).json(&self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksRequest {
    pub key: String,
}

impl ApiRequest for LinksRequest {
    type Response = Links;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        client.post(endpoint(base_url, "links")).json(&self)
    }
}
