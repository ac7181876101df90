//! Full contract sessions against the in-process fake service.

mod common;

use clauseguard_application::{ExpertFeedback, SessionStore};
use clauseguard_core::analysis::UploadFile;
use clauseguard_core::reconcile::ComplianceStats;
use clauseguard_core::state::{PersistenceAdapter, SESSION_ID_KEY, UserRole};
use clauseguard_infrastructure::{ClauseguardPaths, ConfigService, FileStateStore, MemoryStateStore};
use common::FakeAnalysisService;
use std::sync::Arc;
use tempfile::TempDir;

fn lease() -> UploadFile {
    UploadFile::new(
        "lease.docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        b"PK\x03\x04 lease".to_vec(),
    )
}

fn stats(total: usize, compliant: usize, percentage: f64) -> ComplianceStats {
    ComplianceStats {
        total_terms: total,
        compliant_count: compliant,
        non_compliant_count: total - compliant,
        overall_compliance_percentage: percentage,
    }
}

#[tokio::test]
async fn test_review_then_expert_override_drive_stats() {
    let service = Arc::new(FakeAnalysisService::new());
    let store = SessionStore::new(service.clone(), Arc::new(MemoryStateStore::new()));

    store.upload_and_analyze(lease()).await.unwrap();
    assert_eq!(store.stats(), stats(3, 2, 66.67));

    let reviewed = store
        .review_modification("t1", "A one-time late fee applies.")
        .await
        .unwrap();
    assert_eq!(reviewed.is_reviewed_compliant, Some(true));
    assert!(!reviewed.is_user_confirmed);
    assert_eq!(store.stats(), stats(3, 3, 100.0));

    store.set_user_role(UserRole::Expert).await.unwrap();
    let overridden = store
        .submit_expert_feedback(
            "t1",
            ExpertFeedback {
                is_compliant: false,
                notes: Some("Any late fee is impermissible".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(overridden.expert_override_is_compliant, Some(false));
    assert_eq!(store.stats(), stats(3, 2, 66.67));

    store
        .confirm_modification("t1", "A one-time late fee applies.")
        .await
        .unwrap();
    assert_eq!(store.stats(), stats(3, 2, 66.67));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.stats, store.stats());
    assert_eq!(snapshot.user_role, UserRole::Expert);
}

#[tokio::test]
async fn test_generation_needs_a_session() {
    let service = Arc::new(FakeAnalysisService::new());
    let store = SessionStore::new(service.clone(), Arc::new(MemoryStateStore::new()));

    let err = store.generate_modified_contract().await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(service.calls(), 0);
    assert!(store.last_error().is_none());
}

#[tokio::test]
async fn test_generated_documents_follow_original_name() {
    let service = Arc::new(FakeAnalysisService::new());
    let store = SessionStore::new(service, Arc::new(MemoryStateStore::new()));
    store.upload_and_analyze(lease()).await.unwrap();

    store
        .confirm_modification("t1", "A one-time late fee applies.")
        .await
        .unwrap();
    let modified = store.generate_modified_contract().await.unwrap();
    let marked = store.generate_marked_contract().await.unwrap();

    let names: Vec<_> = [&modified.docx, &modified.txt, &marked.docx]
        .into_iter()
        .flatten()
        .map(|file| file.display_filename.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["modified_lease.docx", "modified_lease.txt", "marked_lease.docx"]
    );
}

#[tokio::test]
async fn test_session_survives_restart_with_durable_state() {
    let temp_dir = TempDir::new().unwrap();
    let state_path = temp_dir.path().join("state.toml");
    let service = Arc::new(FakeAnalysisService::new());

    let first = SessionStore::new(
        service.clone(),
        Arc::new(FileStateStore::with_path(state_path.clone())),
    );
    let session = first.upload_and_analyze(lease()).await.unwrap();
    first
        .confirm_modification("t1", "A one-time late fee applies.")
        .await
        .unwrap();
    first.dispose();

    let second = SessionStore::new(
        service.clone(),
        Arc::new(FileStateStore::with_path(state_path)),
    );
    let restored = second.init().await.unwrap().unwrap();

    assert_eq!(restored.session_id, session.session_id);
    let term = second.term("t1").unwrap();
    assert!(term.is_user_confirmed);
    assert_eq!(
        term.user_modified_text.as_deref(),
        Some("A one-time late fee applies.")
    );
    assert_eq!(second.stats(), stats(3, 2, 66.67));
}

#[tokio::test]
async fn test_expired_session_is_forgotten_on_init() {
    let temp_dir = TempDir::new().unwrap();
    let persistence = Arc::new(FileStateStore::with_path(temp_dir.path().join("state.toml")));
    let service = Arc::new(FakeAnalysisService::new());

    let first = SessionStore::new(service.clone(), persistence.clone());
    let session = first.upload_and_analyze(lease()).await.unwrap();
    first.dispose();
    service.expire(&session.session_id);

    let second = SessionStore::new(service, persistence.clone());
    let err = second.init().await.unwrap_err();

    assert!(err.is_not_found());
    assert!(second.session().is_none());
    assert!(second.last_error().is_some());
    assert_eq!(persistence.get(SESSION_ID_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_default_config_keeps_only_role_across_restart() {
    let temp_dir = TempDir::new().unwrap();
    let paths = ClauseguardPaths::new(Some(temp_dir.path().to_path_buf()));
    let service = Arc::new(FakeAnalysisService::new());

    let first = SessionStore::new(
        service.clone(),
        ConfigService::new(paths.clone()).persistence().unwrap(),
    );
    first.upload_and_analyze(lease()).await.unwrap();
    first.set_user_role(UserRole::Expert).await.unwrap();
    first.dispose();

    let second = SessionStore::new(service, ConfigService::new(paths).persistence().unwrap());

    assert!(second.init().await.unwrap().is_none());
    assert_eq!(second.user_role(), UserRole::Expert);
}
