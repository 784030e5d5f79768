use registry::{ClaimRequest, Decision, Registry, RegistryOptions, ReportDraft};
use shared::domain::{ClaimStatus, ItemId, ItemStatus, ReportId, Role};
use storage::{normalize_database_url, Storage};

#[tokio::test]
async fn report_approve_claim_accept_survives_restart() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let database_url =
        normalize_database_url(&temp_root.path().join("data").join("desk.db").to_string_lossy());

    let (item_id, claim_id) = {
        let storage = Storage::new(&database_url).await.expect("db");
        let mut registry = Registry::open(storage, RegistryOptions::default()).await;
        registry.set_role(Role::Admin).await;

        let report_id = registry
            .submit_report(ReportDraft {
                title: "Laptop Asus".into(),
                description: "stiker kampus di tutup".into(),
                location: "Laboratorium Komputer".into(),
                date: "2025-09-21".into(),
                contact: "0813-2222".into(),
                image: None,
            })
            .await
            .expect("queued");

        let item_id = registry
            .approve(&report_id)
            .await
            .into_value()
            .expect("approved");
        let claim_id = registry
            .submit_claim(ClaimRequest {
                item_id: item_id.clone(),
                name: "Rudi".into(),
                contact: "rudi@kampus.ac.id".into(),
                note: Some("password BIOS saya tahu".into()),
            })
            .await
            .expect("claimed");
        assert!(registry.accept_claim(&claim_id).await.is_applied());
        (item_id, claim_id)
    };

    let storage = Storage::new(&database_url).await.expect("reopen");
    let registry = Registry::open(storage, RegistryOptions::default()).await;
    let snapshot = registry.snapshot();

    assert_eq!(registry.role(), Role::Admin);
    let item = snapshot.item(&item_id).expect("item persisted");
    assert_eq!(item.status, ItemStatus::Claimed);
    assert_eq!(item.contact.as_deref(), Some("0813-2222"));
    assert_eq!(snapshot.claims[0].id, claim_id);
    assert_eq!(snapshot.claims[0].status, ClaimStatus::Accepted);
    assert_eq!(snapshot.queue.len(), 3);
    assert!(registry.public_gallery("laptop").is_empty());
}

#[tokio::test]
async fn approving_seed_report_publishes_item() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut registry = Registry::open(storage, RegistryOptions::default()).await;

    let item_id = registry
        .approve(&ReportId::from("rep-1"))
        .await
        .into_value()
        .expect("approved");

    let gallery = registry.public_gallery("");
    let published = gallery.iter().find(|i| i.id == item_id).expect("in gallery");
    assert_eq!(published.title, "Jaket Hitam");
    assert_eq!(published.status, ItemStatus::Available);
    assert!(registry
        .queue_matching("")
        .iter()
        .all(|r| r.id != ReportId::from("rep-1")));
}

#[tokio::test]
async fn export_import_round_trip_through_files() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let export_path = temp_root.path().join("export.json");

    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let mut registry = Registry::open(storage, RegistryOptions::default()).await;
    registry.approve(&ReportId::from("rep-3")).await;
    let before = registry.snapshot();
    tokio::fs::write(&export_path, registry.export().expect("export"))
        .await
        .expect("write export");

    let confirmed = registry
        .reset_intent()
        .resolve(Decision::Confirmed)
        .expect("confirmed");
    registry.reset(confirmed).await;
    assert_ne!(registry.snapshot(), before);

    let raw = tokio::fs::read_to_string(&export_path).await.expect("read");
    let intent = registry.import_intent(&raw).expect("valid");
    registry
        .import(intent.resolve(Decision::Confirmed).expect("confirmed"))
        .await;
    assert_eq!(registry.snapshot(), before);
    assert!(registry
        .snapshot()
        .item(&ItemId::from("itm-ktm"))
        .is_some());
}
