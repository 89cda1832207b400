use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use common::bucket::{
    AccessRoles, BucketPath, BucketRoot, CreateOptions, CreateReply, Links, ThreadId,
};
use common::error::BucketError;
use common::remote::{ChunkStream, ListPathReply, PushPathReply, Remote};
use futures::{Stream, StreamExt, TryStreamExt};
use parking_lot::Mutex;
use reqwest::{header::HeaderMap, header::HeaderValue, Body, Client, Url};

use super::error::ApiError;
use super::requests::{
    CreateRequest, DeleteRequest, LinksRequest, ListRequest, LsRequest, PullRequest,
    PullRolesRequest, PushRequest, PushRolesRequest, RemovePathRequest,
};
use super::ApiRequest;

/// [`Remote`] backed by the bucket service's HTTP api
#[derive(Debug, Clone)]
pub struct HttpRemote {
    pub remote: Url,
    client: Client,
}

impl HttpRemote {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client);
        let response = request_builder.send().await?;

        if response.status().is_success() {
            Ok(response.json::<T::Response>().await?)
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }
}

/// Adapts an outgoing chunk stream into a request body.
///
/// reqwest only sees an opaque io error when the stream fails, so the
///  original error is parked in `failure` for the caller to recover.
struct Upload {
    chunks: Mutex<ChunkStream>,
    failure: Arc<Mutex<Option<BucketError>>>,
}

impl Stream for Upload {
    type Item = Result<Bytes, std::io::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.chunks.get_mut().poll_next_unpin(cx) {
            Poll::Ready(Some(Err(err))) => {
                let message = err.to_string();
                *this.failure.lock() = Some(err);
                Poll::Ready(Some(Err(std::io::Error::other(message))))
            }
            other => other.map(|item| item.map(|chunk| chunk.map_err(std::io::Error::other))),
        }
    }
}

fn root_path(root: Option<BucketRoot>) -> Option<String> {
    root.map(|root| root.path)
}

#[async_trait]
impl Remote for HttpRemote {
    async fn open_or_create(
        &self,
        thread: Option<ThreadId>,
        name: &str,
        opts: &CreateOptions,
    ) -> Result<CreateReply, BucketError> {
        let request = CreateRequest {
            thread,
            name: name.to_string(),
            opts: opts.clone(),
            open: true,
        };
        Ok(self.call(request).await?)
    }

    async fn create(
        &self,
        thread: Option<ThreadId>,
        name: &str,
        opts: &CreateOptions,
    ) -> Result<CreateReply, BucketError> {
        let request = CreateRequest {
            thread,
            name: name.to_string(),
            opts: opts.clone(),
            open: false,
        };
        Ok(self.call(request).await?)
    }

    async fn list_buckets(
        &self,
        thread: Option<ThreadId>,
    ) -> Result<Vec<BucketRoot>, BucketError> {
        let request = ListRequest {
            thread,
            owned: false,
        };
        Ok(self.call(request).await?.roots)
    }

    async fn list_owned(&self) -> Result<Vec<BucketRoot>, BucketError> {
        let request = ListRequest {
            thread: None,
            owned: true,
        };
        Ok(self.call(request).await?.roots)
    }

    async fn list_path(
        &self,
        key: &str,
        path: &BucketPath,
        depth: u32,
    ) -> Result<ListPathReply, BucketError> {
        let request = LsRequest {
            key: key.to_string(),
            path: path.to_string(),
            depth,
        };
        Ok(self.call(request).await?)
    }

    async fn push_path(
        &self,
        key: &str,
        path: &BucketPath,
        root: Option<BucketRoot>,
        chunks: ChunkStream,
    ) -> Result<PushPathReply, BucketError> {
        let failure = Arc::new(Mutex::new(None));
        let upload = Upload {
            chunks: Mutex::new(chunks),
            failure: failure.clone(),
        };
        let request = PushRequest {
            key: key.to_string(),
            path: path.to_string(),
            root: root_path(root),
            body: Body::wrap_stream(upload),
        };

        let result = self.call(request).await;
        // a failed body stream takes precedence over however the
        //  transport reported it
        if let Some(err) = failure.lock().take() {
            return Err(err);
        }
        Ok(result?)
    }

    async fn pull_path(&self, key: &str, path: &BucketPath) -> Result<ChunkStream, BucketError> {
        let request = PullRequest {
            key: key.to_string(),
            path: path.to_string(),
        };
        let response = request
            .build_request(&self.remote, &self.client)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(ApiError::from)?;
            return Err(ApiError::HttpStatus(status, body).into());
        }

        Ok(response
            .bytes_stream()
            .map_err(|e| BucketError::from(ApiError::from(e)))
            .boxed())
    }

    async fn remove_path(
        &self,
        key: &str,
        path: &BucketPath,
        root: Option<BucketRoot>,
    ) -> Result<BucketRoot, BucketError> {
        let request = RemovePathRequest {
            key: key.to_string(),
            path: path.to_string(),
            root: root_path(root),
        };
        Ok(self.call(request).await?.root)
    }

    async fn remove(&self, key: &str) -> Result<(), BucketError> {
        let request = DeleteRequest {
            key: key.to_string(),
        };
        self.call(request).await?;
        Ok(())
    }

    async fn push_access_roles(
        &self,
        key: &str,
        path: &BucketPath,
        roles: &AccessRoles,
    ) -> Result<(), BucketError> {
        let request = PushRolesRequest {
            key: key.to_string(),
            path: path.to_string(),
            roles: roles.clone(),
        };
        self.call(request).await?;
        Ok(())
    }

    async fn pull_access_roles(
        &self,
        key: &str,
        path: &BucketPath,
    ) -> Result<AccessRoles, BucketError> {
        let request = PullRolesRequest {
            key: key.to_string(),
            path: path.to_string(),
        };
        Ok(self.call(request).await?)
    }

    async fn links(&self, key: &str) -> Result<Links, BucketError> {
        let request = LinksRequest {
            key: key.to_string(),
        };
        Ok(self.call(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn remote_for(server: &MockServer) -> HttpRemote {
        HttpRemote::new(&Url::parse(&server.base_url()).unwrap()).unwrap()
    }

    fn chunks(parts: &[&'static [u8]]) -> ChunkStream {
        futures::stream::iter(
            parts
                .iter()
                .map(|part| Ok(Bytes::from_static(part)))
                .collect::<Vec<_>>(),
        )
        .boxed()
    }

    fn root_json(path: &str) -> serde_json::Value {
        json!({
            "key": "k1",
            "name": "site",
            "path": path,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z",
        })
    }

    #[tokio::test]
    async fn test_push_streams_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v0/bucket/push")
                    .query_param("key", "k1")
                    .query_param("path", "docs/index.html")
                    .header("content-type", "application/octet-stream")
                    .body("hello world");
                then.status(200).json_body(json!({
                    "root": root_json("/bucket/v2"),
                    "path": "docs/index.html",
                    "size": 11,
                }));
            })
            .await;

        let remote = remote_for(&server);
        let reply = remote
            .push_path(
                "k1",
                &BucketPath::parse("docs/index.html").unwrap(),
                None,
                chunks(&[b"hello ", b"world"]),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply.size, 11);
        assert_eq!(reply.path, "docs/index.html");
        assert_eq!(reply.root.path, "/bucket/v2");
    }

    #[tokio::test]
    async fn test_push_maps_rejections() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v0/bucket/push")
                    .query_param("path", "stale.txt");
                then.status(409).body("update is non-fast-forward");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v0/bucket/push")
                    .query_param("path", "locked.txt");
                then.status(403).body("locked.txt");
            })
            .await;

        let remote = remote_for(&server);
        let err = remote
            .push_path(
                "k1",
                &BucketPath::parse("stale.txt").unwrap(),
                None,
                chunks(&[b"x"]),
            )
            .await
            .unwrap_err();
        assert!(err.is_non_fast_forward());

        let err = remote
            .push_path(
                "k1",
                &BucketPath::parse("locked.txt").unwrap(),
                None,
                chunks(&[b"x"]),
            )
            .await
            .unwrap_err();
        assert!(err.is_permission_denied());
    }

    #[tokio::test]
    async fn test_push_reports_source_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v0/bucket/push");
                then.status(200).json_body(json!({
                    "root": root_json("/bucket/v2"),
                    "path": "broken.txt",
                    "size": 0,
                }));
            })
            .await;

        let failing: ChunkStream = futures::stream::iter(vec![Err(BucketError::Source(
            std::io::Error::other("disk on fire"),
        ))])
        .boxed();
        let err = remote_for(&server)
            .push_path("k1", &BucketPath::parse("broken.txt").unwrap(), None, failing)
            .await
            .unwrap_err();
        assert!(matches!(err, BucketError::Source(ref e) if e.to_string() == "disk on fire"));
    }

    #[tokio::test]
    async fn test_pull_streams_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v0/bucket/pull")
                    .json_body(json!({ "key": "k1", "path": "notes.txt" }));
                then.status(200).body("some notes");
            })
            .await;

        let stream = remote_for(&server)
            .pull_path("k1", &BucketPath::parse("notes.txt").unwrap())
            .await
            .unwrap();
        let content: Vec<Bytes> = stream.try_collect().await.unwrap();

        mock.assert_async().await;
        assert_eq!(content.concat(), b"some notes");
    }

    #[tokio::test]
    async fn test_pull_missing_path() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v0/bucket/pull");
                then.status(404).body("no link named \"gone.txt\" under bucket root");
            })
            .await;

        let err = match remote_for(&server)
            .pull_path("k1", &BucketPath::parse("gone.txt").unwrap())
            .await
        {
            Ok(_) => panic!("pull of a missing path succeeded"),
            Err(err) => err,
        };
        assert!(
            matches!(err, BucketError::NotFound(ref message) if message.contains("gone.txt"))
        );
    }

    #[tokio::test]
    async fn test_upload_parks_source_errors() {
        let chunks: ChunkStream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"abc")),
            Err(BucketError::Aborted),
        ])
        .boxed();
        let failure = Arc::new(Mutex::new(None));
        let mut upload = Upload {
            chunks: Mutex::new(chunks),
            failure: failure.clone(),
        };

        assert_eq!(upload.next().await.unwrap().unwrap(), "abc");
        assert!(upload.next().await.unwrap().is_err());
        assert!(upload.next().await.is_none());
        assert!(failure.lock().take().unwrap().is_aborted());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // port 9 (discard) is not expected to serve http
        let remote = HttpRemote::new(&Url::parse("http://127.0.0.1:9").unwrap()).unwrap();
        let err = remote.list_owned().await.unwrap_err();
        assert!(matches!(err, BucketError::Transport(_)));
    }
}
