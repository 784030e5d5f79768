use storage::{normalize_database_url, PersistentStore, Storage, StorageKeys, WriteBatch};

#[tokio::test]
async fn values_survive_reopening_the_database_file() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let database_url =
        normalize_database_url(&temp_root.path().join("desk.db").to_string_lossy());
    let keys = StorageKeys::default();

    {
        let store = PersistentStore::new(Storage::new(&database_url).await.expect("db"));
        let batch = WriteBatch::new()
            .put(&keys.items, &vec!["itm-a", "itm-b"])
            .put(&keys.role, "admin");
        assert!(store.save_many(batch).await.is_saved());
    }

    let reopened = PersistentStore::new(Storage::new(&database_url).await.expect("reopen"));
    let items: Vec<String> = reopened.load(&keys.items, Vec::new()).await;
    let role: String = reopened.load(&keys.role, "user".to_string()).await;
    assert_eq!(items, vec!["itm-a", "itm-b"]);
    assert_eq!(role, "admin");

    let queue: Vec<String> = reopened.load(&keys.queue, vec!["seed".to_string()]).await;
    assert_eq!(queue, vec!["seed"]);
}
