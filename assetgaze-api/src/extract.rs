/// Request extractors
///
/// [`ApiJson`] behaves like `axum::Json` but rejects through [`ApiError`], so
/// a malformed body gets the same `{ "error", "message" }` shape as every
/// other failure instead of axum's plain-text rejection.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON body extractor with API-shaped rejections
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
