//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the store backend and the provider client, so the endpoint tests can wire in mocks.
//! Since actix cannot handle generics in handlers directly, registration goes through the `route!` macro, which
//! generates a unit struct implementing `HttpServiceFactory` for each handler.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use payment_engine::{
    db_types::{NewTransaction, TxReference},
    providers::ProviderClient,
    ClosureApi, PaymentFlowError, TransactionFlowApi, TransactionStore,
};

use crate::{
    data_objects::{
        BangoNotification, ClosureRequest, NewTransactionRequest, RefundRequest, ResourceResponse, StatusResponse,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//---------------------------------------------- Transactions --------------------------------------------------
route!(create_transaction => Post "/transaction" impl TransactionStore, ProviderClient);
/// Records a new pending payment in the ledger. The caller supplies the correlation uuid it will later use to
/// match the provider's asynchronous notification.
pub async fn create_transaction<B, C>(
    body: web::Json<NewTransactionRequest>,
    api: web::Data<TransactionFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore + 'static,
    C: ProviderClient + 'static,
{
    let req = body.into_inner();
    trace!("💻️ New {} transaction request for [{}]", req.provider, req.uuid);
    let mut tx = NewTransaction::payment(TxReference(req.uuid), req.provider, req.amount, &req.currency);
    if let Some(uid_pay) = req.uid_pay.as_deref() {
        tx = tx.with_uid_pay(uid_pay);
    }
    let tx = api.initiate_payment(tx).await?;
    Ok(HttpResponse::Created().json(ResourceResponse::ok(tx.id)))
}

route!(get_transaction => Get "/transaction/{uuid}" impl TransactionStore, ProviderClient);
pub async fn get_transaction<B, C>(
    path: web::Path<String>,
    api: web::Data<TransactionFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore + 'static,
    C: ProviderClient + 'static,
{
    let uuid = TxReference(path.into_inner());
    let tx = api.fetch_transaction(&uuid).await?;
    Ok(HttpResponse::Ok().json(tx))
}

//---------------------------------------------- Notifications -------------------------------------------------
route!(bango_notification => Post "/notification" impl TransactionStore, ProviderClient);
/// The asynchronous settlement callback from Bango. Form-encoded, as Bango sends it.
///
/// The engine verifies `moz_signature` before anything else. An unknown `moz_transaction` answers 400 rather than
/// 404: the notification endpoint's contract treats a failed lookup as one more way the form is invalid.
pub async fn bango_notification<B, C>(
    form: web::Form<BangoNotification>,
    api: web::Data<TransactionFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore + 'static,
    C: ProviderClient + 'static,
{
    let notification = form.into_inner();
    trace!(
        "💻️ Bango notification for [{}]: {}",
        notification.moz_transaction,
        notification.bango_response_code
    );
    let tx = api.process_notification(notification.into()).await.map_err(|e| match e {
        PaymentFlowError::NotFound(uuid) => {
            PaymentFlowError::Validation(format!("unknown transaction {uuid}")).into()
        },
        other => ServerError::from(other),
    })?;
    Ok(HttpResponse::Created().json(ResourceResponse::ok(tx.id)))
}

//----------------------------------------------    Refunds   --------------------------------------------------
route!(refund => Post "/refund" impl TransactionStore, ProviderClient);
/// Issues a refund against a completed payment. Legality violations are rejected before the provider is called.
pub async fn refund<B, C>(
    body: web::Json<RefundRequest>,
    api: web::Data<TransactionFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore + 'static,
    C: ProviderClient + 'static,
{
    let req = body.into_inner();
    debug!("💻️ Refund requested against [{}] on {}", req.uuid, req.provider);
    let refund = api.refund(&TxReference(req.uuid), req.provider).await?;
    Ok(HttpResponse::Created().json(ResourceResponse::ok(refund.id)))
}

route!(refund_status => Get "/refund/status/{uuid}" impl TransactionStore, ProviderClient);
/// Live-polls the provider for a refund's state. The ledger is updated as a side effect; the reply carries the
/// provider's raw code along with the resulting local status.
pub async fn refund_status<B, C>(
    path: web::Path<String>,
    api: web::Data<TransactionFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore + 'static,
    C: ProviderClient + 'static,
{
    let uuid = TxReference(path.into_inner());
    let (outcome, tx) = api.check_refund_status(&uuid).await?;
    Ok(HttpResponse::Ok().json(StatusResponse::new(&outcome.code, &tx)))
}

route!(payment_status => Get "/status/{uuid}" impl TransactionStore, ProviderClient);
/// Live-polls the provider for a payment's state, marking a completed payment as checked on a verified OK.
pub async fn payment_status<B, C>(
    path: web::Path<String>,
    api: web::Data<TransactionFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore + 'static,
    C: ProviderClient + 'static,
{
    let uuid = TxReference(path.into_inner());
    let (outcome, tx) = api.check_payment_status(&uuid).await?;
    Ok(HttpResponse::Ok().json(StatusResponse::new(&outcome.code, &tx)))
}

//----------------------------------------------    Closure   --------------------------------------------------
route!(close_customer => Post "/closure" impl TransactionStore, ProviderClient);
/// Runs the account closure cascade for a customer. Partial provider failures are reported in the body, not
/// hidden in the logs; the account-closure collaborator decides what to do with them.
pub async fn close_customer<B, C>(
    body: web::Json<ClosureRequest>,
    api: web::Data<ClosureApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: TransactionStore + 'static,
    C: ProviderClient + 'static,
{
    let req = body.into_inner();
    info!("💻️ Closure requested for customer {}", req.customer_id);
    let report = api.close_customer(&req.customer_id).await?;
    Ok(HttpResponse::Ok().json(report))
}
