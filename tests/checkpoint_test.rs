use duo_log_sync::domain::{LogType, Offset};
use duo_log_sync::reliability::{CheckpointError, CheckpointStore, FileCheckpointStore};
use tempfile::TempDir;

#[tokio::test]
async fn test_checkpoint_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCheckpointStore::new(temp_dir.path()).await.unwrap();

    store
        .write(LogType::Authentication, None, Offset::from_millis(1_690_000_000_000))
        .await
        .unwrap();

    assert_eq!(
        store.read(LogType::Authentication, None).await.unwrap(),
        Some(Offset::from_millis(1_690_000_000_000))
    );
}

#[tokio::test]
async fn test_latest_write_wins_and_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCheckpointStore::new(temp_dir.path()).await.unwrap();

    for millis in [10, 20, 15] {
        store
            .write(LogType::Telephony, None, Offset::from_millis(millis))
            .await
            .unwrap();
    }

    assert_eq!(
        store.read(LogType::Telephony, None).await.unwrap(),
        Some(Offset::from_millis(15))
    );

    let entries: Vec<String> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["telephony_checkpoint_data.txt".to_string()]);
}

#[tokio::test]
async fn test_accounts_are_checkpointed_independently() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCheckpointStore::new(temp_dir.path()).await.unwrap();

    store
        .write(LogType::Activity, Some("DA1"), Offset::from_millis(1))
        .await
        .unwrap();
    store
        .write(LogType::Activity, Some("DA2"), Offset::from_millis(2))
        .await
        .unwrap();

    assert_eq!(
        store.read(LogType::Activity, Some("DA1")).await.unwrap(),
        Some(Offset::from_millis(1))
    );
    assert_eq!(
        store.read(LogType::Activity, Some("DA2")).await.unwrap(),
        Some(Offset::from_millis(2))
    );
    assert_eq!(store.read(LogType::Activity, None).await.unwrap(), None);
}

#[tokio::test]
async fn test_store_creates_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("a").join("b");

    let store = FileCheckpointStore::new(&nested).await.unwrap();
    store
        .write(LogType::Administrator, None, Offset::from_millis(3))
        .await
        .unwrap();

    assert!(nested.join("adminaction_checkpoint_data.txt").exists());
}

#[tokio::test]
async fn test_corrupt_checkpoint_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileCheckpointStore::new(temp_dir.path()).await.unwrap();
    std::fs::write(store.checkpoint_path(LogType::Activity, None), b"not json").unwrap();

    let err = store.read(LogType::Activity, None).await.unwrap_err();
    assert!(matches!(err, CheckpointError::Corrupt { .. }));
}

#[tokio::test]
async fn test_checkpoint_survives_store_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = FileCheckpointStore::new(temp_dir.path()).await.unwrap();
        store
            .write(LogType::Authentication, Some("DA9"), Offset::from_millis(99))
            .await
            .unwrap();
    }

    let reopened = FileCheckpointStore::new(temp_dir.path()).await.unwrap();
    assert_eq!(
        reopened
            .read(LogType::Authentication, Some("DA9"))
            .await
            .unwrap(),
        Some(Offset::from_millis(99))
    );
}
