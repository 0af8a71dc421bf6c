use opentodo_core::{
    codec::decode_profile,
    storage::{SlotStore, BACKGROUND_SLOT, PROFILE_SLOT},
};
use opentodo_profile::{NewTask, ProfileStore, StoreError};
use opentodo_storage::file_slot_store::FileSlotStore;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRfake-image-body";

#[tokio::test]
async fn fresh_init_with_empty_storage_has_no_projects() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ProfileStore::new(FileSlotStore::new(dir.path()));
    store.init().await;

    let profile = store.profile().await;
    assert!(profile.projects.is_empty());
    assert_eq!(profile.user_info.name, "User");
}

#[tokio::test]
async fn init_loads_document_slot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let slots = FileSlotStore::new(dir.path());
    slots
        .put(
            PROFILE_SLOT,
            br#"{"userInfo":{"name":"X"},"projects":[],"createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#,
        )
        .await
        .expect("seed");

    let store = ProfileStore::new(slots);
    store.init().await;
    assert_eq!(store.profile().await.user_info.name, "X");
}

#[tokio::test]
async fn malformed_import_is_rejected_and_live_profile_unchanged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ProfileStore::new(FileSlotStore::new(dir.path()));
    store.init().await;
    store.add_project("Keep me", None).await.expect("project");
    let before = store.profile().await;

    let err = store
        .import_snapshot(b"{not json")
        .await
        .expect_err("should fail");
    assert_eq!(err.category(), "malformed json");
    assert!(matches!(err, StoreError::Codec(_)));
    assert_eq!(store.profile().await, before);
}

#[tokio::test]
async fn task_progress_is_clamped_when_added() {
    let dir = tempfile::tempdir().expect("tempdir");
    let slots = FileSlotStore::new(dir.path());
    let store = ProfileStore::new(slots.clone());
    store.init().await;

    let project = store.add_project("P", None).await.expect("project");
    let list = store
        .add_task_list(&project, "L", None)
        .await
        .expect("list");
    store
        .add_task(
            &list,
            None,
            NewTask {
                progress: 150.0,
                ..NewTask::titled("T")
            },
        )
        .await
        .expect("task");

    let bytes = slots
        .get(PROFILE_SLOT)
        .await
        .expect("read")
        .expect("persisted");
    let stored = decode_profile(&bytes).expect("decode");
    assert_eq!(stored.projects[0].task_lists[0].ungrouped_tasks[0].progress, 100.0);

    let raw: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(
        raw["projects"][0]["taskLists"][0]["ungroupedTasks"][0]["progress"],
        100.0
    );
}

#[tokio::test]
async fn background_survives_a_new_session_independently_of_the_document() {
    let dir = tempfile::tempdir().expect("tempdir");

    let first = ProfileStore::new(FileSlotStore::new(dir.path()));
    first.init().await;
    first.add_project("Home", None).await.expect("project");
    first.set_background(PNG).await.expect("background");
    let document = first.profile().await;
    let uri = first.background().await.expect("background set");
    drop(first);

    let second = ProfileStore::new(FileSlotStore::new(dir.path()));
    second.init().await;
    assert_eq!(second.background().await.as_deref(), Some(uri.as_str()));
    assert_eq!(
        second.background_bytes().await.expect("decode"),
        Some(PNG.to_vec())
    );
    assert_eq!(second.profile().await, document);
}

#[tokio::test]
async fn export_then_import_round_trips_across_stores() {
    let source_dir = tempfile::tempdir().expect("tempdir");
    let source = ProfileStore::new(FileSlotStore::new(source_dir.path()));
    source.init().await;
    let project = source
        .add_project("Work", Some("day job".into()))
        .await
        .expect("project");
    let list = source
        .add_task_list(&project, "Sprint", None)
        .await
        .expect("list");
    let group = source
        .add_task_group(&list, "Review", None)
        .await
        .expect("group");
    let task = source
        .add_task(&list, Some(&group), NewTask::titled("read PR"))
        .await
        .expect("task");
    source
        .set_task_completed(&task, true)
        .await
        .expect("complete");
    let snapshot = source.export_snapshot().await.expect("export");

    let target_dir = tempfile::tempdir().expect("tempdir");
    let target = ProfileStore::new(FileSlotStore::new(target_dir.path()));
    target.init().await;
    let candidate = target
        .import_snapshot(&snapshot.bytes)
        .await
        .expect("import");
    target.apply_imported(candidate).await.expect("apply");

    assert_eq!(target.profile().await, source.profile().await);
}

#[tokio::test]
async fn reset_clears_both_slots_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let slots = FileSlotStore::new(dir.path());
    let store = ProfileStore::new(slots.clone());
    store.init().await;
    store.add_project("Doomed", None).await.expect("project");
    store.set_background(PNG).await.expect("background");

    store.reset().await.expect("reset");

    assert!(slots.get(PROFILE_SLOT).await.expect("read").is_none());
    assert!(slots.get(BACKGROUND_SLOT).await.expect("read").is_none());
    assert!(store.profile().await.projects.is_empty());
}
