mod common;

use std::time::Duration;

use almox_app::CodeCheck;
use almox_inventory::NewItem;

use common::harness;

async fn seeded() -> (common::Harness, almox_app::Session, almox_core::ItemId) {
    let (h, _) = harness();
    let admin = h.admin().await;
    let item = admin
        .create_item(NewItem {
            nome: "Toner HP 85A".to_string(),
            codigo: Some("TON-85A".to_string()),
            ..NewItem::default()
        })
        .await
        .unwrap();
    (h, admin, item.id)
}

#[tokio::test(start_paused = true)]
async fn reports_a_taken_barcode_after_the_settle_delay() {
    let (_h, admin, id) = seeded().await;
    let checker = admin.duplicate_code_check();

    let started = tokio::time::Instant::now();
    let outcome = checker.check(" TON-85A ", None).outcome().await.unwrap().unwrap();

    assert_eq!(
        outcome,
        CodeCheck::Taken {
            item_id: id,
            nome: "Toner HP 85A".to_string(),
        }
    );
    assert!(started.elapsed() >= Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn a_newer_check_supersedes_the_pending_one() {
    let (_h, admin, _) = seeded().await;
    let checker = admin.duplicate_code_check();

    let first = checker.check("TON", None);
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = checker.check("TON-85", None);

    assert!(first.outcome().await.is_none());
    assert_eq!(second.outcome().await.unwrap().unwrap(), CodeCheck::Available);
}

#[tokio::test(start_paused = true)]
async fn own_barcode_is_available_while_editing() {
    let (_h, admin, id) = seeded().await;
    let checker = admin.duplicate_code_check();

    let outcome = checker.check("TON-85A", Some(id)).outcome().await.unwrap().unwrap();
    assert_eq!(outcome, CodeCheck::Available);
}

#[tokio::test(start_paused = true)]
async fn blank_input_and_cancel() {
    let (_h, admin, _) = seeded().await;
    let checker = admin.duplicate_code_check();

    assert_eq!(
        checker.check("   ", None).outcome().await.unwrap().unwrap(),
        CodeCheck::Blank
    );

    let pending = checker.check("TON-85A", None);
    checker.cancel();
    assert!(pending.outcome().await.is_none());
}
