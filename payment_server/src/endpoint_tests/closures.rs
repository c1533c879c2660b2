use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use payment_engine::{
    db_types::{PayMethod, Provider, Subscription},
    providers::RawProviderResponse,
    ClosureApi,
};

use super::mocks::{MockClient, MockStore};
use crate::{
    data_objects::ClosureRequest,
    endpoint_tests::helpers::post_json,
    routes::CloseCustomerRoute,
};

fn paymethod() -> PayMethod {
    PayMethod {
        id: 7,
        customer_id: "cust-1".to_string(),
        provider: Provider::Reference,
        provider_id: "pm-token".to_string(),
        active: true,
        created: Utc::now(),
        modified: Utc::now(),
    }
}

fn subscription() -> Subscription {
    Subscription {
        id: 11,
        paymethod_id: 7,
        provider_id: "sub-token".to_string(),
        active: true,
        created: Utc::now(),
        modified: Utc::now(),
    }
}

fn register(cfg: &mut ServiceConfig, store: MockStore, client: MockClient) {
    let api = ClosureApi::new(store, client);
    cfg.service(CloseCustomerRoute::<MockStore, MockClient>::new()).app_data(web::Data::new(api));
}

#[actix_web::test]
async fn closure_sweeps_methods_and_subscriptions() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store.expect_fetch_active_paymethods().returning(|_| Ok(vec![paymethod()]));
        store.expect_fetch_active_subscriptions().returning(|_| Ok(vec![subscription()]));
        store.expect_deactivate_subscription().returning(|_| Ok(()));
        store.expect_deactivate_paymethod().returning(|_| Ok(()));
        let mut client = MockClient::new();
        client.expect_cancel_subscription().returning(|_, _| Ok(RawProviderResponse::new("OK")));
        client.expect_delete_payment_method().returning(|_, _| Ok(RawProviderResponse::new("OK")));
        register(cfg, store, client);
    }
    let request = ClosureRequest { customer_id: "cust-1".to_string() };
    let (status, body) = post_json("/closure", &request, configure).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.contains(r#""cancelled_subscriptions":[11]"#), "{body}");
    assert!(body.contains(r#""deleted_paymethods":[7]"#), "{body}");
    assert!(body.contains(r#""failures":[]"#), "{body}");
}

#[actix_web::test]
async fn closure_reports_partial_failures() {
    fn configure(cfg: &mut ServiceConfig) {
        let mut store = MockStore::new();
        store.expect_fetch_active_paymethods().returning(|_| Ok(vec![paymethod()]));
        store.expect_fetch_active_subscriptions().returning(|_| Ok(vec![subscription()]));
        // The subscription fails to cancel, so nothing is deactivated and the method is not deleted.
        let mut client = MockClient::new();
        client
            .expect_cancel_subscription()
            .returning(|_, _| Ok(RawProviderResponse::new("RETRYABLE_FAILURE")));
        register(cfg, store, client);
    }
    let request = ClosureRequest { customer_id: "cust-1".to_string() };
    let (status, body) = post_json("/closure", &request, configure).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.contains(r#""deleted_paymethods":[]"#), "{body}");
    assert!(body.contains(r#""target":"Subscription""#), "{body}");
    assert!(body.contains(r#""target":"PayMethod""#), "{body}");
}
