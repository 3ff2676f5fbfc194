//! Handlers for `/media/{*path}`.
//!
//! Uploads go straight to the [`LocalObjectStore`]. Downloads must present the
//! `expires` and `signature` query parameters of a URL issued by
//! [`ObjectStorage::signed_url`].

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use barangay_core::{geo::ReverseGeocoder, media::ObjectStorage, store::ResidentStore};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiPath, ApiQuery},
};

#[derive(Debug, Deserialize)]
pub struct SignedParams {
  pub expires:   i64,
  pub signature: String,
}

/// `PUT /media/{*path}`: body is the raw object; returns 201 + `{"path": ...}`.
pub async fn upload<S, G>(
  State(state): State<ApiState<S, G>>,
  ApiPath(path): ApiPath<String>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidentStore,
  G: ReverseGeocoder,
{
  if body.is_empty() {
    return Err(ApiError::BadRequest("empty upload".into()));
  }
  state.media.put(&path, &body).await?;
  Ok((StatusCode::CREATED, Json(json!({ "path": path }))))
}

/// `GET /media/{*path}?expires=<unix>&signature=<hex>`
pub async fn download<S, G>(
  State(state): State<ApiState<S, G>>,
  ApiPath(path): ApiPath<String>,
  ApiQuery(params): ApiQuery<SignedParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidentStore,
  G: ReverseGeocoder,
{
  let data = state
    .media
    .read_signed(&path, params.expires, &params.signature, Utc::now())
    .await?;
  Ok(([(header::CONTENT_TYPE, content_type(&path))], data))
}

fn content_type(path: &str) -> &'static str {
  let ext = path
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase())
    .unwrap_or_default();
  match ext.as_str() {
    "png" => "image/png",
    "jpg" | "jpeg" => "image/jpeg",
    "webp" => "image/webp",
    "pdf" => "application/pdf",
    _ => "application/octet-stream",
  }
}
