//! The transition engine: legal status changes and the deltas they produce.
//!
//! ```text
//! Pending          --approve-->               Approved
//! Pending          --reject(reason)-->        Rejected
//! Approved         --request_update(reason)--> UpdateProfiling | UpdateRequested
//! UpdateApproved   --request_update(reason)--> UpdateProfiling | UpdateRequested
//! UpdateProfiling  --approve-->               UpdateApproved
//! UpdateRequested  --approve-->               UpdateApproved
//! ```
//!
//! Every function here is a pure decision: it returns the [`MutationIntent`]
//! to persist or an error, and never performs I/O. Rejected is a one-way
//! outcome; nothing leaves it.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::{Error, Result, resident::Resident, status::ResidentStatus};

// ─── Commands ────────────────────────────────────────────────────────────────

/// A resident-affecting admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Action {
  #[strum(serialize = "approve")]
  Approve,
  #[strum(serialize = "reject")]
  Reject,
  #[strum(serialize = "request an update on")]
  RequestUpdate,
}

/// Which "needs correction" state an update request lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateChannel {
  /// The resident re-runs the profiling form.
  #[default]
  Profiling,
  /// The resident corrects specific fields.
  Correction,
}

impl UpdateChannel {
  fn target(self) -> ResidentStatus {
    match self {
      Self::Profiling => ResidentStatus::UpdateProfiling,
      Self::Correction => ResidentStatus::UpdateRequested,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TransitionCommand {
  Approve,
  Reject {
    reason: String,
  },
  RequestUpdate {
    reason:  String,
    #[serde(default)]
    channel: UpdateChannel,
  },
}

impl TransitionCommand {
  pub fn action(&self) -> Action {
    match self {
      Self::Approve => Action::Approve,
      Self::Reject { .. } => Action::Reject,
      Self::RequestUpdate { .. } => Action::RequestUpdate,
    }
  }
}

// ─── Intent ──────────────────────────────────────────────────────────────────

/// The exact field delta a transition persists. Nothing else on the record
/// is touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationIntent {
  pub resident_id:      Uuid,
  pub action:           Action,
  pub status:           ResidentStatus,
  /// `None` clears the stored reason.
  pub rejection_reason: Option<String>,
  pub updated_at:       DateTime<Utc>,
}

impl MutationIntent {
  /// Apply the delta to an in-memory record.
  pub fn apply_to(&self, resident: &mut Resident) {
    resident.status = self.status;
    resident.rejection_reason = self.rejection_reason.clone();
    resident.updated_at = self.updated_at;
  }
}

// ─── Decisions ───────────────────────────────────────────────────────────────

pub fn approve(resident: &Resident, now: DateTime<Utc>) -> Result<MutationIntent> {
  let status = match resident.status {
    ResidentStatus::Pending => ResidentStatus::Approved,
    ResidentStatus::UpdateProfiling | ResidentStatus::UpdateRequested => {
      ResidentStatus::UpdateApproved
    }
    from => return Err(illegal(from, Action::Approve)),
  };
  Ok(intent(resident, Action::Approve, status, None, now))
}

pub fn reject(
  resident: &Resident,
  reason: &str,
  now: DateTime<Utc>,
) -> Result<MutationIntent> {
  if resident.status != ResidentStatus::Pending {
    return Err(illegal(resident.status, Action::Reject));
  }
  let reason = required_reason(reason)?;
  Ok(intent(
    resident,
    Action::Reject,
    ResidentStatus::Rejected,
    Some(reason),
    now,
  ))
}

pub fn request_update(
  resident: &Resident,
  reason: &str,
  channel: UpdateChannel,
  now: DateTime<Utc>,
) -> Result<MutationIntent> {
  match resident.status {
    ResidentStatus::Approved | ResidentStatus::UpdateApproved => {}
    from => return Err(illegal(from, Action::RequestUpdate)),
  }
  let reason = required_reason(reason)?;
  Ok(intent(
    resident,
    Action::RequestUpdate,
    channel.target(),
    Some(reason),
    now,
  ))
}

/// Dispatch a [`TransitionCommand`] to the matching decision.
pub fn decide(
  resident: &Resident,
  command: &TransitionCommand,
  now: DateTime<Utc>,
) -> Result<MutationIntent> {
  match command {
    TransitionCommand::Approve => approve(resident, now),
    TransitionCommand::Reject { reason } => reject(resident, reason, now),
    TransitionCommand::RequestUpdate { reason, channel } => {
      request_update(resident, reason, *channel, now)
    }
  }
}

fn illegal(from: ResidentStatus, action: Action) -> Error {
  Error::IllegalTransition { from, action }
}

fn required_reason(reason: &str) -> Result<String> {
  let trimmed = reason.trim();
  if trimmed.is_empty() {
    return Err(Error::blank("rejection_reason"));
  }
  Ok(trimmed.to_string())
}

fn intent(
  resident: &Resident,
  action: Action,
  status: ResidentStatus,
  rejection_reason: Option<String>,
  now: DateTime<Utc>,
) -> MutationIntent {
  MutationIntent {
    resident_id: resident.resident_id,
    action,
    status,
    rejection_reason,
    updated_at: next_timestamp(resident.updated_at, now),
  }
}

/// `now`, or one microsecond past `prior` if the clock has not moved on.
fn next_timestamp(prior: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
  if now > prior {
    now
  } else {
    prior + TimeDelta::microseconds(1)
  }
}
