mod app;
mod app_state;
mod auth;
mod routes;
mod trace;

pub use app::{create_router, Me3Server, Me3ServerBuildError};
