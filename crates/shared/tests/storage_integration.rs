//! 键值存储集成测试
//!
//! 同一组行为约定分别在文件存储与内存存储上验证。

use exchange_shared::storage::{JsonFileStore, KeyValueStore, MemoryStore};
use serde_json::json;

async fn assert_store_contract(store: &dyn KeyValueStore) {
    assert!(store.get("boxInventory").await.unwrap().is_none());

    let inventory = json!({
        "premium": { "total": 10, "remaining": 5, "cost": 20000, "name": "至尊宝箱" },
        "regular": { "total": 30, "remaining": 18, "cost": 6000, "name": "战功宝箱" }
    });
    store.put("boxInventory", &inventory).await.unwrap();
    assert_eq!(store.get("boxInventory").await.unwrap(), Some(inventory));

    store.put("boxBackup_1700000000002", &json!({})).await.unwrap();
    store.put("boxBackup_1700000000001", &json!({})).await.unwrap();
    assert_eq!(
        store.keys_with_prefix("boxBackup_").await.unwrap(),
        vec!["boxBackup_1700000000001", "boxBackup_1700000000002"]
    );

    assert!(store.remove("boxInventory").await.unwrap());
    assert!(store.get("boxInventory").await.unwrap().is_none());

    let err = store.put("a/b", &json!(null)).await.unwrap_err();
    assert_eq!(err.code(), "STORE_INVALID_KEY");
}

#[tokio::test]
async fn test_file_store_contract() {
    let dir = tempfile::tempdir().unwrap();
    assert_store_contract(&JsonFileStore::new(dir.path())).await;
}

#[tokio::test]
async fn test_memory_store_contract() {
    assert_store_contract(&MemoryStore::new()).await;
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    JsonFileStore::new(dir.path())
        .put("githubBackupCount", &json!(3))
        .await
        .unwrap();

    let reopened = JsonFileStore::new(dir.path());
    assert_eq!(
        reopened.get("githubBackupCount").await.unwrap(),
        Some(json!(3))
    );
}
