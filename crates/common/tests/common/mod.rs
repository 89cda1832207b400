//! Shared test utilities for bucket integration tests
#![allow(dead_code)]

use std::io::Write;

use ::common::prelude::*;
use tempfile::NamedTempFile;

/// Set up a fresh in-memory remote acting as `alice`, and open a bucket
///  called `name` on it
pub async fn setup_bucket(name: &str) -> (Buckets, MemoryRemote, BucketRoot) {
    let remote = MemoryRemote::new("alice");
    let mut client = Buckets::new(remote.clone());
    let reply = client
        .get_or_create(name, CreateOptions::default())
        .await
        .unwrap();
    (client, remote, reply.root)
}

/// Deterministic content of `len` bytes
pub fn squares(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * i) as u8).collect()
}

/// Write `len` bytes of test content to a temporary file
pub fn fixture(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&squares(len)).unwrap();
    file.flush().unwrap();
    file
}

/// Number of direct children of the item at `path`
pub async fn child_count(client: &Buckets, key: &str, path: &str) -> usize {
    let listing = client.list_path(key, path, None).await.unwrap();
    listing.item.items.len()
}
