use actix_web::{http::StatusCode, web, web::ServiceConfig};
use payment_engine::{
    db_types::{Provider, TransactionStatus},
    providers::RawProviderResponse,
};

use super::{
    helpers::{bango_payment, bango_refund, flow_api, get_request, post_json},
    mocks::{MockClient, MockStore},
};
use crate::{
    data_objects::RefundRequest,
    routes::{PaymentStatusRoute, RefundRoute, RefundStatusRoute},
};

fn refund_request() -> RefundRequest {
    RefundRequest { uuid: "some-transaction-uid".to_string(), provider: Provider::Bango }
}

fn register(cfg: &mut ServiceConfig, store: MockStore, client: MockClient) {
    let api = flow_api(store, client);
    cfg.service(RefundRoute::<MockStore, MockClient>::new())
        .service(RefundStatusRoute::<MockStore, MockClient>::new())
        .service(PaymentStatusRoute::<MockStore, MockClient>::new())
        .app_data(web::Data::new(api));
}

#[actix_web::test]
async fn refund_of_a_completed_payment_is_recorded() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid()
            .returning(|_| Ok(Some(bango_payment(TransactionStatus::Completed))));
        store.expect_fetch_refund_of().returning(|_| Ok(None));
        store.expect_insert_transaction().returning(|tx| {
            assert_eq!(tx.related, Some(42));
            assert_eq!(tx.status, TransactionStatus::Completed);
            Ok(bango_refund(TransactionStatus::Completed))
        });
        let mut client = MockClient::new();
        client
            .expect_refund()
            .returning(|_, _, _, _| Ok(RawProviderResponse::new("OK").with_txid("external-refund-uid")));
        register(cfg, store, client);
    }
    let (status, body) = post_json("/refund", &refund_request(), configure).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body, r#"{"status":"OK","resource_pk":43}"#);
}

#[actix_web::test]
async fn an_existing_refund_rejects_without_a_provider_call() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid()
            .returning(|_| Ok(Some(bango_payment(TransactionStatus::Completed))));
        store.expect_fetch_refund_of().returning(|_| Ok(Some(bango_refund(TransactionStatus::Completed))));
        // No client expectations: the provider must not be called for an illegal refund.
        register(cfg, store, MockClient::new());
    }
    let (status, body) = post_json("/refund", &refund_request(), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("ALREADY_REFUNDED"), "{body}");
}

#[actix_web::test]
async fn provider_side_already_refunded_creates_no_record() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid()
            .returning(|_| Ok(Some(bango_payment(TransactionStatus::Completed))));
        store.expect_fetch_refund_of().returning(|_| Ok(None));
        // No insert_transaction expectation: the ledger must not gain a row.
        let mut client = MockClient::new();
        client.expect_refund().returning(|_, _, _, _| Ok(RawProviderResponse::new("ALREADY_REFUNDED")));
        register(cfg, store, client);
    }
    let (status, body) = post_json("/refund", &refund_request(), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("ALREADY_REFUNDED"), "{body}");
}

#[actix_web::test]
async fn a_pending_payment_cannot_be_refunded() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid()
            .returning(|_| Ok(Some(bango_payment(TransactionStatus::Pending))));
        register(cfg, store, MockClient::new());
    }
    let (status, body) = post_json("/refund", &refund_request(), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("CANT_REFUND"), "{body}");
}

#[actix_web::test]
async fn a_wrong_provider_cannot_refund() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid()
            .returning(|_| Ok(Some(bango_payment(TransactionStatus::Completed))));
        register(cfg, store, MockClient::new());
    }
    let request = RefundRequest { uuid: "some-transaction-uid".to_string(), provider: Provider::Braintree };
    let (status, body) = post_json("/refund", &request, configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("CANT_REFUND"), "{body}");
}

#[actix_web::test]
async fn refund_status_poll_settles_a_pending_refund() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid()
            .returning(|_| Ok(Some(bango_refund(TransactionStatus::Pending))));
        store.expect_update_status_checked().returning(|_, _, new, _| {
            assert_eq!(new, TransactionStatus::Completed);
            Ok(Some(bango_refund(TransactionStatus::Completed)))
        });
        let mut client = MockClient::new();
        client.expect_refund_status().returning(|_, _| Ok(RawProviderResponse::new("OK")));
        register(cfg, store, client);
    }
    let (status, body) = get_request("/refund/status/some-refund-uid", configure).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, r#"{"status":"OK","local_status":"Completed"}"#);
}

#[actix_web::test]
async fn refund_status_poll_reports_a_failed_refund() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid()
            .returning(|_| Ok(Some(bango_refund(TransactionStatus::Completed))));
        store.expect_update_status_checked().returning(|_, _, new, _| {
            assert_eq!(new, TransactionStatus::Failed);
            Ok(Some(bango_refund(TransactionStatus::Failed)))
        });
        let mut client = MockClient::new();
        client.expect_refund_status().returning(|_, _| Ok(RawProviderResponse::new("CANT_REFUND")));
        register(cfg, store, client);
    }
    let (status, body) = get_request("/refund/status/some-refund-uid", configure).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, r#"{"status":"CANT_REFUND","local_status":"Failed"}"#);
}

#[actix_web::test]
async fn refund_status_poll_rejects_a_payment_uuid() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid()
            .returning(|_| Ok(Some(bango_payment(TransactionStatus::Completed))));
        register(cfg, store, MockClient::new());
    }
    let (status, body) = get_request("/refund/status/some-transaction-uid", configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("NOT_REFUND"), "{body}");
}

#[actix_web::test]
async fn payment_status_poll_marks_the_payment_checked() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store
            .expect_fetch_transaction_by_uuid()
            .returning(|_| Ok(Some(bango_payment(TransactionStatus::Completed))));
        store.expect_update_status_checked().returning(|_, _, new, _| {
            assert_eq!(new, TransactionStatus::Checked);
            Ok(Some(bango_payment(TransactionStatus::Checked)))
        });
        let mut client = MockClient::new();
        client.expect_payment_status().returning(|_, _| Ok(RawProviderResponse::new("OK")));
        register(cfg, store, client);
    }
    let (status, body) = get_request("/status/some-transaction-uid", configure).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, r#"{"status":"OK","local_status":"Checked"}"#);
}
