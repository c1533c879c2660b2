use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::info;
use payment_engine::{
    providers::ReferenceClient, ClosureApi, FlowConfig, SqliteDatabase, TransactionFlowApi,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health, BangoNotificationRoute, CloseCustomerRoute, CreateTransactionRoute, GetTransactionRoute,
        PaymentStatusRoute, RefundRoute, RefundStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    info!("🚀️ Starting server on {}:{}", config.host, config.port);
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        // The reference client stands in for the real provider SDK wrappers, which are wired in by the
        // deployment that owns the credentials.
        let client = ReferenceClient::new();
        let flow_config = FlowConfig { transaction_expiry: config.transaction_expiry };
        let flow_api =
            TransactionFlowApi::new(db.clone(), client.clone(), config.signing_secret.clone(), flow_config);
        let closure_api = ClosureApi::new(db.clone(), client);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ppg::access_log"))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(closure_api))
            .service(health)
            .service(CreateTransactionRoute::<SqliteDatabase, ReferenceClient>::new())
            .service(GetTransactionRoute::<SqliteDatabase, ReferenceClient>::new())
            .service(BangoNotificationRoute::<SqliteDatabase, ReferenceClient>::new())
            .service(RefundRoute::<SqliteDatabase, ReferenceClient>::new())
            .service(RefundStatusRoute::<SqliteDatabase, ReferenceClient>::new())
            .service(PaymentStatusRoute::<SqliteDatabase, ReferenceClient>::new())
            .service(CloseCustomerRoute::<SqliteDatabase, ReferenceClient>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
