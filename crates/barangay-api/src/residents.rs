//! Handlers for `/residents` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/residents` | `?search`, `status`, `renting`, `sort`, `page`, `page_size` |
//! | `POST`   | `/residents` | Body: [`NewResident`]; returns 201 + stored resident |
//! | `GET`    | `/residents/summary` | Per-status counts |
//! | `POST`   | `/residents/reload` | Re-fetch the collection from the store |
//! | `GET`    | `/residents/{id}` | [`ResidentDetail`] with signed media URLs |
//! | `DELETE` | `/residents/{id}` | Administrative delete; 204 |
//! | `POST`   | `/residents/{id}/approve` | No body |
//! | `POST`   | `/residents/{id}/reject` | Body: `{"reason":"..."}` |
//! | `POST`   | `/residents/{id}/request-update` | Body: `{"reason":"...","channel":"profiling"}` |

use std::num::NonZeroUsize;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use barangay_core::{
  geo::{ReverseGeocoder, describe_location},
  media::{ObjectStorage, resolve_media},
  query::{ResidentPage, SortKey, StatusSummary, ViewCriteria},
  resident::{NewResident, Resident},
  status::StatusDisplay,
  store::ResidentStore,
  sync::ReloadOutcome,
  transition::{Action, MutationIntent, TransitionCommand, UpdateChannel},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Case-insensitive substring over name, address and zone.
  pub search:    Option<String>,
  /// `all` or a status code such as `3`.
  pub status:    Option<String>,
  /// `all`, `yes` or `no`.
  pub renting:   Option<String>,
  /// e.g. `name-asc`, `date-desc`. Defaults to Pending-first.
  pub sort:      Option<String>,
  /// 1-based.
  pub page:      Option<usize>,
  pub page_size: Option<usize>,
}

impl ListParams {
  fn into_criteria(self) -> Result<ViewCriteria, ApiError> {
    let mut criteria = ViewCriteria::default();
    if let Some(search) = self.search {
      criteria.search = search;
    }
    if let Some(status) = self.status {
      criteria.status = status.parse()?;
    }
    if let Some(renting) = self.renting {
      criteria.renting = renting.parse()?;
    }
    if let Some(sort) = self.sort {
      criteria.sort = sort
        .parse::<SortKey>()
        .map_err(|_| ApiError::BadRequest(format!("unknown sort key {sort:?}")))?;
    }
    if let Some(page) = self.page {
      criteria.page = page;
    }
    if let Some(size) = self.page_size {
      criteria.page_size = NonZeroUsize::new(size)
        .ok_or_else(|| ApiError::BadRequest("page_size must be at least 1".into()))?;
    }
    Ok(criteria)
  }
}

/// `GET /residents[?search=...][&status=...][&renting=...][&sort=...][&page=...][&page_size=...]`
pub async fn list<S, G>(
  State(state): State<ApiState<S, G>>,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<ResidentPage>, ApiError>
where
  S: ResidentStore,
  G: ReverseGeocoder,
{
  let criteria = params.into_criteria()?;
  Ok(Json(state.adapter.view(&criteria).await))
}

/// `GET /residents/summary`
pub async fn summary<S, G>(State(state): State<ApiState<S, G>>) -> Json<StatusSummary>
where
  S: ResidentStore,
  G: ReverseGeocoder,
{
  Json(state.adapter.summary().await)
}

// ─── Reload ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
  /// `false` if a newer reload overtook this one.
  pub applied:    bool,
  pub count:      Option<usize>,
  pub generation: u64,
}

/// `POST /residents/reload`
pub async fn reload<S, G>(
  State(state): State<ApiState<S, G>>,
) -> Result<Json<ReloadResponse>, ApiError>
where
  S: ResidentStore,
  G: ReverseGeocoder,
{
  let outcome = state.adapter.reload().await?;
  let generation = state.adapter.snapshot().await.generation;
  let (applied, count) = match outcome {
    ReloadOutcome::Applied { count } => (true, Some(count)),
    ReloadOutcome::Superseded => (false, None),
  };
  Ok(Json(ReloadResponse {
    applied,
    count,
    generation,
  }))
}

// ─── Detail ──────────────────────────────────────────────────────────────────

/// A resident as shown on the admin detail page.
#[derive(Debug, Serialize)]
pub struct ResidentDetail {
  #[serde(flatten)]
  pub resident:        Resident,
  pub status_code:     i64,
  pub status_display:  StatusDisplay,
  pub allowed_actions: &'static [Action],
  /// The reason to show alongside the status badge, if any.
  pub active_reason:   Option<String>,
  pub household_size:  usize,
  pub children:        usize,
  /// Reverse-geocoded from `location`; absent when there is no location.
  pub location_text:   Option<String>,
}

/// `GET /residents/{id}`
pub async fn detail<S, G>(
  State(state): State<ApiState<S, G>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ResidentDetail>, ApiError>
where
  S: ResidentStore,
  G: ReverseGeocoder,
{
  let mut resident = state
    .adapter
    .resident(id)
    .await
    .ok_or_else(|| ApiError::NotFound(format!("resident {id} not found")))?;

  resolve_media(state.media.as_ref(), &mut resident, state.media_ttl).await;

  let location_text = match resident.location {
    Some(location) => Some(describe_location(state.geocoder.as_ref(), location).await),
    None => None,
  };

  Ok(Json(ResidentDetail {
    status_code: resident.status.code(),
    status_display: resident.status.display(),
    allowed_actions: resident.status.allowed_actions(),
    active_reason: resident.active_reason().map(str::to_string),
    household_size: resident.household.len(),
    children: resident.household.children(),
    location_text,
    resident,
  }))
}

// ─── Submit ──────────────────────────────────────────────────────────────────

/// `POST /residents`: returns 201 + the stored [`Resident`] (always Pending).
pub async fn submit<S, G>(
  State(state): State<ApiState<S, G>>,
  ApiJson(body): ApiJson<NewResident>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidentStore,
  G: ReverseGeocoder,
{
  let resident = state.adapter.submit(body).await?;
  Ok((StatusCode::CREATED, Json(resident)))
}

// ─── Transitions ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReasonBody {
  pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestUpdateBody {
  pub reason:  String,
  #[serde(default)]
  pub channel: UpdateChannel,
}

/// `POST /residents/{id}/approve`
pub async fn approve<S, G>(
  State(state): State<ApiState<S, G>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MutationIntent>, ApiError>
where
  S: ResidentStore,
  G: ReverseGeocoder,
{
  let intent = state
    .adapter
    .transition(id, &TransitionCommand::Approve)
    .await?;
  Ok(Json(intent))
}

/// `POST /residents/{id}/reject`: body: `{"reason":"..."}` (required).
pub async fn reject<S, G>(
  State(state): State<ApiState<S, G>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<ReasonBody>,
) -> Result<Json<MutationIntent>, ApiError>
where
  S: ResidentStore,
  G: ReverseGeocoder,
{
  let command = TransitionCommand::Reject {
    reason: body.reason,
  };
  Ok(Json(state.adapter.transition(id, &command).await?))
}

/// `POST /residents/{id}/request-update`: body: `{"reason":"...","channel":"correction"}`.
pub async fn request_update<S, G>(
  State(state): State<ApiState<S, G>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<RequestUpdateBody>,
) -> Result<Json<MutationIntent>, ApiError>
where
  S: ResidentStore,
  G: ReverseGeocoder,
{
  let command = TransitionCommand::RequestUpdate {
    reason:  body.reason,
    channel: body.channel,
  };
  Ok(Json(state.adapter.transition(id, &command).await?))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /residents/{id}`: removes the record whatever its status, then
/// removes its uploads. Upload removal is best effort.
pub async fn delete_one<S, G>(
  State(state): State<ApiState<S, G>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ResidentStore,
  G: ReverseGeocoder,
{
  let mut resident = state.adapter.resident(id).await;
  state.adapter.delete(id).await?;

  if let Some(resident) = resident.as_mut() {
    for (slot, media) in resident.media_refs_mut() {
      if let Err(e) = state.media.delete(&media.path).await {
        tracing::warn!(resident_id = %id, slot, path = %media.path, error = %e, "failed to remove upload");
      }
    }
  }
  Ok(StatusCode::NO_CONTENT)
}
