//! Integration tests for bucket lifecycle: open, create, list, links

mod common;

use ::common::prelude::*;

#[tokio::test]
async fn test_open_by_name_without_thread() {
    let mut client = Buckets::new(MemoryRemote::new("alice"));
    assert!(client.thread().is_none());

    let opts = CreateOptions {
        thread_name: Some("buckets".to_string()),
        encrypted: false,
    };
    let reply = client.get_or_create("createbuck", opts.clone()).await.unwrap();
    assert_eq!(client.thread(), Some(reply.thread_id));
    assert!(!reply.root.key.is_empty());
    assert!(reply.root.path.starts_with("/bucket/"));
    assert_eq!(reply.root.created_at, reply.root.updated_at);

    // opening again finds the same bucket
    let again = client.get_or_create("createbuck", opts).await.unwrap();
    assert_eq!(again.root, reply.root);
    assert_eq!(client.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_and_list() {
    let mut client = Buckets::new(MemoryRemote::new("alice"));
    client
        .get_or_create("createbuck", CreateOptions::default())
        .await
        .unwrap();
    assert_eq!(client.list().await.unwrap().len(), 1);

    let buck = client
        .create("mybuck", CreateOptions::default())
        .await
        .unwrap();
    let roots = client.list().await.unwrap();
    assert_eq!(roots.len(), 2);
    let listed = roots.iter().find(|r| r.key == buck.root.key).unwrap();
    assert_eq!(listed, &buck.root);

    // create never reuses a name
    let other = client
        .create("mybuck", CreateOptions::default())
        .await
        .unwrap();
    assert_ne!(other.root.key, buck.root.key);
    assert_eq!(client.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_threads_scope_listings() {
    let remote = MemoryRemote::new("alice");
    let mut first = Buckets::new(remote.clone());
    first
        .get_or_create("one", CreateOptions::default())
        .await
        .unwrap();

    let mut second = Buckets::new(remote.clone()).with_thread(ThreadId::generate());
    second
        .get_or_create("two", CreateOptions::default())
        .await
        .unwrap();

    assert_eq!(first.list().await.unwrap().len(), 1);
    assert_eq!(second.list().await.unwrap().len(), 1);
    assert_eq!(first.existing().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_links() {
    let (client, _, root) = common::setup_bucket("mybuck").await;
    let links = client.links(&root.key).await.unwrap();
    assert!(!links.url.is_empty());
    assert!(!links.ipns.is_empty());
    assert!(links.url.contains(&root.key));
    assert!(links.www.is_some());

    let mut client = client;
    let encrypted = client
        .create(
            "secret",
            CreateOptions {
                thread_name: None,
                encrypted: true,
            },
        )
        .await
        .unwrap();
    assert!(encrypted.links.www.is_none());
}
