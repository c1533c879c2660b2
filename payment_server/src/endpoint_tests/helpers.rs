use actix_web::{
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use chrono::{TimeZone, Utc};
use payment_engine::{
    db_types::{Provider, Transaction, TransactionStatus, TransactionType, TxReference},
    helpers::NotificationSigner,
    FlowConfig, TransactionFlowApi,
};
use ppg_common::{Amount, Secret};
use serde::Serialize;

use super::mocks::{MockClient, MockStore};

// Every endpoint test signs with this secret. DO NOT use it anywhere else.
pub const TEST_SIGNING_SECRET: &str = "endpoint-test-secret";

pub fn test_signer() -> NotificationSigner {
    NotificationSigner::new(Secret::new(TEST_SIGNING_SECRET.to_string()))
}

pub fn flow_api(store: MockStore, client: MockClient) -> TransactionFlowApi<MockStore, MockClient> {
    TransactionFlowApi::new(store, client, Secret::new(TEST_SIGNING_SECRET.to_string()), FlowConfig::default())
}

/// A fixture transaction matching the shape a settled Bango payment has in the ledger.
pub fn bango_payment(status: TransactionStatus) -> Transaction {
    Transaction {
        id: 42,
        uuid: TxReference("some-transaction-uid".into()),
        provider: Provider::Bango,
        kind: TransactionType::Payment,
        status,
        amount: Amount::from(999),
        currency: "USD".into(),
        related: None,
        uid_pay: Some("external-trans-uid".into()),
        uid_support: None,
        created: Utc::now(),
        modified: Utc::now(),
    }
}

pub fn bango_refund(status: TransactionStatus) -> Transaction {
    Transaction {
        id: 43,
        uuid: TxReference("some-refund-uid".into()),
        provider: Provider::Bango,
        kind: TransactionType::Refund,
        status,
        amount: Amount::from(999),
        currency: "USD".into(),
        related: Some(42),
        uid_pay: Some("external-refund-uid".into()),
        uid_support: None,
        created: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        modified: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

pub async fn post_form<F: Serialize>(
    path: &str,
    form: &F,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let req = TestRequest::post().uri(path).set_form(form);
    send(req, configure).await
}

pub async fn post_json<J: Serialize>(
    path: &str,
    json: &J,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let req = TestRequest::post().uri(path).set_json(json);
    send(req, configure).await
}

pub async fn get_request(path: &str, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    send(TestRequest::get().uri(path), configure).await
}

async fn send(req: TestRequest, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let _ = env_logger::try_init();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    (status, body)
}
