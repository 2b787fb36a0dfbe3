//! Extractors whose rejections use the JSON error format.
//!
//! A malformed path id or request body is an invalid-argument error and is
//! reported as `{ "error", "code": "BAD_REQUEST" }` like every other failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// `Path` with [`AppError`] rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `Json` with [`AppError`] rejections.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `Query` with [`AppError`] rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
