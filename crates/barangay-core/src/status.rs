//! The six resident lifecycle states and their display metadata.
//!
//! Stores persist a status as its integer code. [`ResidentStatus::from_code`]
//! is the strict decoder used at the storage boundary; [`display_for_code`] is
//! the lenient lookup for presentation, which falls back to "Unknown".

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::{Error, Result, transition::Action};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a resident record sits in the vetting workflow.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResidentStatus {
  Approved,
  Rejected,
  /// Initial state of every submission.
  Pending,
  /// An admin asked for corrections to an approved record.
  UpdateRequested,
  /// A corrected submission was reviewed and accepted.
  UpdateApproved,
  /// An approved record was sent back for re-profiling.
  UpdateProfiling,
}

impl ResidentStatus {
  /// The integer code stored by the record store.
  pub fn code(self) -> i64 {
    match self {
      Self::Approved => 1,
      Self::Rejected => 2,
      Self::Pending => 3,
      Self::UpdateRequested => 4,
      Self::UpdateApproved => 5,
      Self::UpdateProfiling => 6,
    }
  }

  /// Decode a stored code. Codes outside 1–6 are an error, never a fallback.
  pub fn from_code(code: i64) -> Result<Self> {
    match code {
      1 => Ok(Self::Approved),
      2 => Ok(Self::Rejected),
      3 => Ok(Self::Pending),
      4 => Ok(Self::UpdateRequested),
      5 => Ok(Self::UpdateApproved),
      6 => Ok(Self::UpdateProfiling),
      other => Err(Error::UnknownStatusCode(other)),
    }
  }

  /// Whether a rejection reason is meaningful for this status.
  pub fn carries_reason(self) -> bool {
    matches!(
      self,
      Self::Rejected | Self::UpdateRequested | Self::UpdateProfiling
    )
  }

  /// Transitions the admin console may offer from this status.
  pub fn allowed_actions(self) -> &'static [Action] {
    match self {
      Self::Pending => &[Action::Approve, Action::Reject],
      Self::Approved | Self::UpdateApproved => &[Action::RequestUpdate],
      Self::UpdateRequested | Self::UpdateProfiling => &[Action::Approve],
      Self::Rejected => &[],
    }
  }

  pub fn display(self) -> StatusDisplay {
    let (label, tone) = match self {
      Self::Approved => ("Approved", Tone::Success),
      Self::Rejected => ("Rejected", Tone::Danger),
      Self::Pending => ("Pending", Tone::Warning),
      Self::UpdateRequested => ("Update Requested", Tone::Info),
      Self::UpdateApproved => ("Update Approved", Tone::Success),
      Self::UpdateProfiling => ("Update Profiling", Tone::Info),
    };
    StatusDisplay { label, tone }
  }
}

// ─── Display metadata ────────────────────────────────────────────────────────

/// Rendering hint for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
  Success,
  Danger,
  Warning,
  Info,
  Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusDisplay {
  pub label: &'static str,
  pub tone:  Tone,
}

impl StatusDisplay {
  pub const UNKNOWN: Self = Self {
    label: "Unknown",
    tone:  Tone::Neutral,
  };
}

/// Presentation lookup by raw code. Total: unknown codes map to
/// [`StatusDisplay::UNKNOWN`].
pub fn display_for_code(code: i64) -> StatusDisplay {
  ResidentStatus::from_code(code)
    .map(ResidentStatus::display)
    .unwrap_or(StatusDisplay::UNKNOWN)
}

/// One row of the status registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryEntry {
  pub status:  ResidentStatus,
  pub code:    i64,
  pub label:   &'static str,
  pub tone:    Tone,
  pub actions: &'static [Action],
}

/// Every status in code order.
pub fn registry() -> Vec<RegistryEntry> {
  let mut entries: Vec<RegistryEntry> = ResidentStatus::iter()
    .map(|status| {
      let display = status.display();
      RegistryEntry {
        status,
        code: status.code(),
        label: display.label,
        tone: display.tone,
        actions: status.allowed_actions(),
      }
    })
    .collect();
  entries.sort_by_key(|e| e.code);
  entries
}
