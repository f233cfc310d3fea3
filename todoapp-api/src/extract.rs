/// Request extractors with API-shaped rejections

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` whose rejection is an [`ApiError`]
///
/// A malformed or non-JSON body yields 400 with the usual
/// `{ "message": ... }` body instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
