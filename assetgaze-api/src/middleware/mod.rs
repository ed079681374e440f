/// Middleware modules for the API server
///
/// Authentication runs as an `axum::middleware::from_fn_with_state` layer
/// defined in [`crate::app`]; this module holds the tower layers.

pub mod security;
