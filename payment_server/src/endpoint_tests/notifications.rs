use actix_web::{http::StatusCode, web, web::ServiceConfig};
use payment_engine::db_types::TransactionStatus;

use super::{
    helpers::{bango_payment, flow_api, post_form, test_signer},
    mocks::{MockClient, MockStore},
};
use crate::{data_objects::BangoNotification, routes::BangoNotificationRoute};

fn notification(code: &str) -> BangoNotification {
    let uuid = "some-transaction-uid";
    BangoNotification {
        moz_transaction: uuid.to_string(),
        moz_signature: test_signer().sign(uuid),
        billing_config_id: Some("1234".to_string()),
        bango_trans_id: Some("56789".to_string()),
        bango_response_code: code.to_string(),
        bango_response_message: Some("Success".to_string()),
    }
}

fn register(cfg: &mut ServiceConfig, store: MockStore) {
    let api = flow_api(store, MockClient::new());
    cfg.service(BangoNotificationRoute::<MockStore, MockClient>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn ok_notification_settles_the_transaction() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid_for_provider()
            .returning(|_, _| Ok(Some(bango_payment(TransactionStatus::Pending))));
        store.expect_update_status_checked().returning(|_, _, new, uid_support| {
            assert_eq!(new, TransactionStatus::Completed);
            assert_eq!(uid_support.as_deref(), Some("56789"));
            let mut tx = bango_payment(TransactionStatus::Completed);
            tx.uid_support = Some("56789".to_string());
            Ok(Some(tx))
        });
        register(cfg, store);
    }
    let (status, body) = post_form("/notification", &notification("OK"), configure).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body, r#"{"status":"OK","resource_pk":42}"#);
}

#[actix_web::test]
async fn redelivered_notification_is_acknowledged_without_a_write() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid_for_provider()
            .returning(|_, _| Ok(Some(bango_payment(TransactionStatus::Completed))));
        // No update_status_checked expectation: a duplicate delivery must not touch the row.
        register(cfg, store);
    }
    let (status, body) = post_form("/notification", &notification("OK"), configure).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
}

#[actix_web::test]
async fn bad_signature_is_rejected_before_the_store_is_touched() {
    fn configure(cfg: &mut ServiceConfig) {
        // No expectations at all: a forged signature must short-circuit before any lookup.
        register(cfg, MockStore::new());
    }
    let mut form = notification("OK");
    form.moz_signature.push_str("garbage");
    let (status, body) = post_form("/notification", &form, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("INVALID_SIGNATURE"), "{body}");
}

#[actix_web::test]
async fn unknown_transaction_is_a_validation_failure() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store.expect_fetch_transaction_by_uuid_for_provider().returning(|_, _| Ok(None));
        register(cfg, store);
    }
    let (status, body) = post_form("/notification", &notification("OK"), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("INVALID_REQUEST"), "{body}");
}

#[actix_web::test]
async fn settling_a_failed_transaction_is_a_conflict() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid_for_provider()
            .returning(|_, _| Ok(Some(bango_payment(TransactionStatus::Failed))));
        register(cfg, store);
    }
    let (status, body) = post_form("/notification", &notification("OK"), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("CONFLICT"), "{body}");
}

#[actix_web::test]
async fn expired_pending_transaction_is_rejected() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store.expect_fetch_transaction_by_uuid_for_provider().returning(|_, _| {
            let mut tx = bango_payment(TransactionStatus::Pending);
            tx.created = chrono::Utc::now() - chrono::Duration::seconds(62);
            Ok(Some(tx))
        });
        register(cfg, store);
    }
    let (status, body) = post_form("/notification", &notification("OK"), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("TRANSACTION_EXPIRED"), "{body}");
}

#[actix_web::test]
async fn unrecognized_code_fails_the_row_and_escalates() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid_for_provider()
            .returning(|_, _| Ok(Some(bango_payment(TransactionStatus::Pending))));
        store.expect_update_status_checked().returning(|_, _, new, _| {
            assert_eq!(new, TransactionStatus::Failed);
            Ok(Some(bango_payment(TransactionStatus::Failed)))
        });
        register(cfg, store);
    }
    let (status, body) = post_form("/notification", &notification("NOT OK"), configure).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("PROVIDER_ERROR"), "{body}");
}
