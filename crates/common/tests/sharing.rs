//! Integration tests for path-scoped access roles between two principals

mod common;

use ::common::prelude::*;

const SHARED_PATH: &str = "path/to";
const SHARED_FILE: &str = "path/to/file2.jpg";
const PRIVATE_FILE: &str = "dir1/file1.jpg";

/// Alice owns a bucket with one private and one shared file. Bob talks
///  to the same remote, scoped to alice's thread.
async fn setup() -> (Buckets, Buckets, String) {
    let alice_remote = MemoryRemote::new("alice");
    let bob_remote = alice_remote.as_principal("bob");

    let mut alice = Buckets::new(alice_remote);
    let reply = alice
        .get_or_create("createbuck", CreateOptions::default())
        .await
        .unwrap();
    let bob = Buckets::new(bob_remote).with_thread(reply.thread_id);
    let key = reply.root.key;

    alice
        .push_path(&key, PRIVATE_FILE, common::squares(100), PushOptions::default())
        .await
        .unwrap();
    alice
        .push_path(&key, SHARED_FILE, common::squares(200), PushOptions::default())
        .await
        .unwrap();

    (alice, bob, key)
}

async fn grant_bob(alice: &Buckets, key: &str, role: AccessRole) {
    let roles = AccessRoles::new().with("bob", role);
    alice
        .push_path_access_roles(key, SHARED_PATH, &roles)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_grant_write_access() {
    let (alice, _, key) = setup().await;
    grant_bob(&alice, &key, AccessRole::Writer).await;

    let shared = alice
        .pull_path_access_roles(&key, SHARED_PATH)
        .await
        .unwrap();
    assert_eq!(shared.get("bob"), Some(AccessRole::Writer));
    assert_eq!(shared.get("alice"), Some(AccessRole::Admin));

    // grants apply below the path they were pushed to
    let inherited = alice
        .pull_path_access_roles(&key, SHARED_FILE)
        .await
        .unwrap();
    assert_eq!(inherited.get("bob"), Some(AccessRole::Writer));
    assert_eq!(inherited.len(), 2);
}

#[tokio::test]
async fn test_bob_cannot_add_files_to_shared_path() {
    let (alice, bob, key) = setup().await;
    grant_bob(&alice, &key, AccessRole::Writer).await;

    let listing = bob.list_path(&key, "", None).await.unwrap();
    let err = bob
        .push_path(
            &key,
            "path/to/bobby.jpg",
            common::squares(CHUNK_SIZE * 3),
            PushOptions::default().with_root(listing.root),
        )
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());
    assert!(err.to_string().contains("permission denied"));
}

#[tokio::test]
async fn test_bob_cannot_remove_shared_file() {
    let (alice, bob, key) = setup().await;
    grant_bob(&alice, &key, AccessRole::Writer).await;

    let err = bob
        .remove_path(&key, SHARED_FILE, RemoveOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("permission denied"));
}

#[tokio::test]
async fn test_bob_overwrites_shared_file() {
    let (alice, bob, key) = setup().await;
    grant_bob(&alice, &key, AccessRole::Writer).await;

    // non-admins only see the entry naming them
    let perms = bob.pull_path_access_roles(&key, SHARED_PATH).await.unwrap();
    assert_eq!(perms.get("bob"), Some(AccessRole::Writer));

    let reply = bob
        .push_path(&key, SHARED_FILE, common::squares(50), PushOptions::default())
        .await
        .unwrap();
    assert_eq!(reply.size, 50);

    let data = alice
        .pull_path(&key, SHARED_FILE, PullOptions::default())
        .unwrap()
        .read_to_end()
        .await
        .unwrap();
    assert_eq!(data, common::squares(50));
}

#[tokio::test]
async fn test_reader_cannot_overwrite() {
    let (alice, bob, key) = setup().await;
    grant_bob(&alice, &key, AccessRole::Reader).await;

    // reading is fine
    let data = bob
        .pull_path(&key, SHARED_FILE, PullOptions::default())
        .unwrap()
        .read_to_end()
        .await
        .unwrap();
    assert_eq!(data.len(), 200);

    let err = bob
        .push_path(&key, SHARED_FILE, common::squares(50), PushOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());
}

#[tokio::test]
async fn test_private_paths_stay_private() {
    let (alice, bob, key) = setup().await;
    grant_bob(&alice, &key, AccessRole::Writer).await;

    let err = bob
        .pull_path(&key, PRIVATE_FILE, PullOptions::default())
        .unwrap()
        .read_to_end()
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());

    let err = bob
        .push_path_access_roles(&key, SHARED_PATH, &AccessRoles::new().with("eve", AccessRole::Admin))
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());

    let err = bob.remove(&key).await.unwrap_err();
    assert!(err.is_permission_denied());
}

#[tokio::test]
async fn test_revoking_access() {
    let (alice, bob, key) = setup().await;
    grant_bob(&alice, &key, AccessRole::Writer).await;
    grant_bob(&alice, &key, AccessRole::None).await;

    let err = bob
        .push_path(&key, SHARED_FILE, common::squares(50), PushOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());
    assert!(bob.list_path(&key, "", None).await.unwrap_err().is_permission_denied());
}

#[tokio::test]
async fn test_list_existing() {
    let (alice, bob, _) = setup().await;
    assert_eq!(alice.existing().await.unwrap().len(), 1);
    assert_eq!(bob.existing().await.unwrap().len(), 0);
}
