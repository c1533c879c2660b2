mod closures;
mod helpers;
mod mocks;
mod notifications;
mod refunds;
