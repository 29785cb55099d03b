use axum::extract::FromRequest;

use super::errors::AppError;

/// `axum::Json` whose rejections are reported as [`AppError`], so a malformed
/// body gets the same `{"detail": ..}` shape as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
