//! End-to-end behaviour of a vault over in-memory stores.

mod helpers;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use helpers::TestVault;

use vault_core::types::sorting::{SortDirection, SortKey};
use vault_service::query::Entry;
use vaultflow::{
    AccountContext, BrowseSession, DashboardState, ErrorKind, ItemRef, ListingMode, NewVersion,
    ProgressSink, UploadRequest, Vault, VaultConfig,
};

#[tokio::test]
async fn test_nested_folder_breadcrumbs() {
    let tv = TestVault::new();
    let reports = tv.folder("Reports", None).await;
    let year = tv.folder("2024", Some(reports.id)).await;

    let crumbs = tv.vault.tree().get_breadcrumbs(year.id).await.unwrap();
    let names: Vec<_> = crumbs.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Reports", "2024"]);
    assert!(crumbs[0].parent_id.is_none());
}

#[tokio::test]
async fn test_new_version_archives_previous_content() {
    let tv = TestVault::new();
    let file = tv.upload("A.txt", 10).await;

    let outcome = tv
        .vault
        .versions()
        .commit_new_version(file.id, NewVersion::new("A-v2.txt", vec![1u8; 20]), &ProgressSink::noop())
        .await
        .unwrap();
    assert_eq!(outcome.file.size_bytes, 20);
    assert_eq!(outcome.file.name, "A.txt");

    let history = tv.vault.versions().list_versions(file.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].size_bytes, 10);
    assert_eq!(history[0].blob_key, file.blob_key);

    let current = tv.vault.files().get_file(file.id).await.unwrap();
    assert_eq!(current.size_bytes, 20);
    assert_ne!(current.blob_key, file.blob_key);
}

#[tokio::test]
async fn test_restore_appends_pre_restore_state() {
    let tv = TestVault::new();
    let file = tv.upload("A.txt", 10).await;
    tv.vault
        .versions()
        .commit_new_version(file.id, NewVersion::new("A.txt", vec![1u8; 20]), &ProgressSink::noop())
        .await
        .unwrap();

    let original = tv.vault.versions().list_versions(file.id).await.unwrap()[0].clone();
    let outcome = tv
        .vault
        .versions()
        .restore_version(file.id, original.id)
        .await
        .unwrap();
    assert_eq!(outcome.file.size_bytes, 10);
    assert_eq!(outcome.file.blob_key, original.blob_key);

    let history = tv.vault.versions().list_versions(file.id).await.unwrap();
    let sizes: Vec<_> = history.iter().map(|v| v.size_bytes).collect();
    assert_eq!(sizes, [20, 10]);
    assert_eq!(history[1].id, original.id);
    assert_eq!(history[1].blob_key, original.blob_key);
}

#[tokio::test]
async fn test_version_history_grows_once_per_commit() {
    let tv = TestVault::new();
    let file = tv.upload("log.txt", 1).await;

    for size in 2..=4 {
        tv.vault
            .versions()
            .commit_new_version(
                file.id,
                NewVersion::new("log.txt", vec![0u8; size]),
                &ProgressSink::noop(),
            )
            .await
            .unwrap();
    }

    let sizes: Vec<_> = tv
        .vault
        .versions()
        .list_versions(file.id)
        .await
        .unwrap()
        .iter()
        .map(|v| v.size_bytes)
        .collect();
    assert_eq!(sizes, [3, 2, 1]);
}

#[tokio::test]
async fn test_delete_with_missing_blob_keeps_record() {
    let tv = TestVault::new();
    let file = tv.upload("gone.pdf", 4).await;
    assert!(tv.blobs.remove_out_of_band(&file.blob_key).await);

    let err = tv.vault.files().delete_file(file.id).await.unwrap_err();
    assert!(err.is(ErrorKind::BlobMissing));
    assert!(tv.vault.files().get_file(file.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_with_failing_blob_store_keeps_record() {
    let tv = TestVault::new();
    let file = tv.upload("keep.pdf", 4).await;
    tv.blobs.set_fail_deletes(true).await;

    let err = tv.vault.files().delete_file(file.id).await.unwrap_err();
    assert!(err.is(ErrorKind::BlobStoreFailure));
    assert!(tv.vault.files().get_file(file.id).await.is_ok());

    tv.blobs.set_fail_deletes(false).await;
    tv.vault.files().delete_file(file.id).await.unwrap();
    let err = tv.vault.files().get_file(file.id).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
    assert!(tv.blobs.is_empty().await);
}

#[tokio::test]
async fn test_search_ignores_folder_scope() {
    let tv = TestVault::new();
    let year = tv.folder("2024", None).await;
    let legal = tv.folder("Legal", None).await;
    tv.upload_into("Budget.xlsx", 8, legal.id).await;
    tv.upload_into("notes.txt", 8, year.id).await;

    let mut session = BrowseSession::new();
    session.open_folder(year.id);
    let scoped = tv.vault.listing(&session).await.unwrap();
    assert!(scoped.files.iter().all(|f| f.name != "Budget.xlsx"));

    session.set_query("budget");
    let found = tv.vault.listing(&session).await.unwrap();
    assert!(found.is_search());
    assert!(found.breadcrumbs.is_none());
    let names: Vec<_> = found.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Budget.xlsx"]);

    session.clear_query();
    let restored = tv.vault.listing(&session).await.unwrap();
    assert_eq!(
        restored.mode,
        ListingMode::Scoped {
            folder_id: Some(year.id)
        }
    );
    assert_eq!(restored.files.len(), 1);
}

#[tokio::test]
async fn test_quota_rejects_before_blob_write() {
    let tv = TestVault::new();
    for i in 0..5 {
        tv.upload(&format!("f{i}.txt"), 1).await;
    }
    let writes_before = tv.blob_writes();

    let err = tv
        .vault
        .uploads()
        .upload(UploadRequest::new("sixth.txt", vec![0u8; 1]), &ProgressSink::noop())
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::QuotaExceeded));
    assert_eq!(tv.blob_writes(), writes_before);
    assert_eq!(tv.vault.files().list_files().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_unlimited_quota_from_config() {
    let mut config = VaultConfig::default();
    config.quota.max_files = None;
    let tv = TestVault::with_config(config);

    for i in 0..7 {
        tv.upload(&format!("f{i}.txt"), 1).await;
    }
    assert_eq!(tv.vault.uploads().quota_status().await.unwrap().used, 7);
}

#[tokio::test]
async fn test_listing_puts_folders_first_for_every_sort() {
    let tv = TestVault::new();
    tv.folder("zeta", None).await;
    tv.folder("Alpha", None).await;
    tv.upload("b.txt", 30).await;
    tv.upload("A.txt", 10).await;

    let mut session = BrowseSession::new();
    for key in [SortKey::Name, SortKey::Size, SortKey::CreatedAt] {
        for _ in 0..2 {
            session.toggle_sort(key);
            let listing = tv.vault.listing(&session).await.unwrap();
            let entries = listing.entries();
            assert_eq!(entries.len(), 4);
            assert!(matches!(entries[0], Entry::Folder(_)));
            assert!(matches!(entries[1], Entry::Folder(_)));
        }
    }

    session.toggle_sort(SortKey::Size);
    assert_eq!(session.sort().direction, SortDirection::Desc);
    let listing = tv.vault.listing(&session).await.unwrap();
    let files: Vec<_> = listing.files.iter().map(|f| f.size_bytes).collect();
    assert_eq!(files, [30, 10]);
}

#[tokio::test]
async fn test_upload_reports_progress_to_completion() {
    let tv = TestVault::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let seen = Arc::clone(&seen);
        ProgressSink::new(move |p| seen.lock().unwrap().push(p))
    };

    tv.vault
        .uploads()
        .upload(UploadRequest::new("big.bin", vec![0u8; 200 * 1024]), &sink)
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last().copied(), Some(1.0));
}

#[tokio::test]
async fn test_failed_stream_leaves_nothing() {
    let tv = TestVault::new();
    tv.blobs.set_fail_writes(true).await;

    let err = tv
        .vault
        .uploads()
        .upload(UploadRequest::new("x.txt", vec![1u8; 3]), &ProgressSink::noop())
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::UploadFailure));
    assert!(tv.vault.files().list_files().await.unwrap().is_empty());
    assert!(tv.blobs.is_empty().await);
}

#[tokio::test]
async fn test_reconcile_removes_orphan_after_metadata_failure() {
    let tv = TestVault::new();
    tv.catalog.set_fail_writes(true).await;

    let err = tv
        .vault
        .uploads()
        .upload(UploadRequest::new("orphan.txt", vec![1u8; 3]), &ProgressSink::noop())
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::MetadataWriteFailure));
    assert_eq!(tv.blobs.len().await, 1);
    assert_eq!(tv.vault.intents().pending().await.len(), 1);

    tv.catalog.set_fail_writes(false).await;
    let report = tv.vault.reconcile().await;
    assert_eq!(report.orphans_deleted(), 1);
    assert!(tv.blobs.is_empty().await);
    assert!(tv.vault.intents().pending().await.is_empty());
    assert_eq!(tv.blobs.calls().deletes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rename_is_last_write_wins() {
    let tv = TestVault::new();
    let file = tv.upload("draft.txt", 1).await;

    tv.vault.files().rename_file(file.id, "first.txt").await.unwrap();
    let renamed = tv.vault.files().rename_file(file.id, "  second.txt ").await.unwrap();
    assert_eq!(renamed.name, "second.txt");
    assert_eq!(renamed.blob_key, file.blob_key);
}

#[tokio::test]
async fn test_folder_delete_does_not_cascade() {
    let tv = TestVault::new();
    let parent = tv.folder("Parent", None).await;
    let child = tv.folder("Child", Some(parent.id)).await;
    let file = tv.upload_into("inside.txt", 1, parent.id).await;

    tv.vault.folders().delete_folder(parent.id).await.unwrap();

    assert!(tv.vault.folders().get_folder(child.id).await.is_ok());
    assert!(tv.vault.files().get_file(file.id).await.is_ok());
    let crumbs = tv.vault.tree().get_breadcrumbs(child.id).await.unwrap();
    assert_eq!(crumbs.len(), 1);
}

#[tokio::test]
async fn test_dashboard_drives_a_delete() {
    let tv = TestVault::new();
    let file = tv.upload("bye.txt", 1).await;
    let mut dashboard = DashboardState::default();

    dashboard
        .request_delete(ItemRef::File(file.id), file.name.clone())
        .unwrap();
    let target = dashboard.confirm_delete().unwrap();
    assert!(dashboard.dismiss().is_err());

    let ItemRef::File(file_id) = target else {
        panic!("expected a file target");
    };
    tv.vault.files().delete_file(file_id).await.unwrap();
    dashboard.complete().unwrap();
    assert!(dashboard.is_idle());
}

#[tokio::test]
async fn test_unverified_account_cannot_open() {
    let err = Vault::open(&AccountContext::unverified("acct-x"), VaultConfig::default())
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::VerificationRequired));

    let vault = Vault::open(&AccountContext::verified("acct-x"), VaultConfig::default())
        .await
        .unwrap();
    assert_eq!(vault.account().as_str(), "acct-x");
}
