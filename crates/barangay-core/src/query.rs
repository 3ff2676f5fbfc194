//! The query engine: search, filter, sort and paginate the resident list.
//!
//! [`view`] is a pure function of its inputs. All sorts are stable, so records
//! that compare equal keep their incoming order and page boundaries do not
//! shuffle between reloads of unchanged data.

use std::{cmp::Ordering, num::NonZeroUsize, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoEnumIterator};

use crate::{
  Error, Result,
  resident::Resident,
  status::{ResidentStatus, StatusDisplay},
};

pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
  Some(n) => n,
  None => unreachable!(),
};

// ─── Criteria ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
  #[default]
  All,
  Only(ResidentStatus),
}

impl FromStr for StatusFilter {
  type Err = Error;

  /// `"all"` (or empty) or an integer status code such as `"3"`.
  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("all") {
      return Ok(Self::All);
    }
    let code: i64 = s.parse().map_err(|_| Error::Validation {
      field:   "status",
      message: format!("expected \"all\" or a status code, got {s:?}"),
    })?;
    Ok(Self::Only(ResidentStatus::from_code(code)?))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RentingFilter {
  #[default]
  All,
  Renting,
  NotRenting,
}

impl FromStr for RentingFilter {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "" | "all" => Ok(Self::All),
      "yes" | "true" => Ok(Self::Renting),
      "no" | "false" => Ok(Self::NotRenting),
      other => Err(Error::Validation {
        field:   "renting",
        message: format!("expected all, yes or no, got {other:?}"),
      }),
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortKey {
  /// Pending first, then by last name and first name.
  #[default]
  Default,
  NameAsc,
  NameDesc,
  StatusAsc,
  StatusDesc,
  DateAsc,
  DateDesc,
}

/// Everything the admin list needs to derive the visible page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCriteria {
  /// Case-insensitive substring over names, address and zone.
  pub search:    String,
  pub status:    StatusFilter,
  pub renting:   RentingFilter,
  pub sort:      SortKey,
  /// 1-based.
  pub page:      usize,
  pub page_size: NonZeroUsize,
}

impl Default for ViewCriteria {
  fn default() -> Self {
    Self {
      search:    String::new(),
      status:    StatusFilter::All,
      renting:   RentingFilter::All,
      sort:      SortKey::Default,
      page:      1,
      page_size: DEFAULT_PAGE_SIZE,
    }
  }
}

// ─── Result ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ResidentPage {
  pub items:       Vec<Resident>,
  /// Size of the filtered set, before pagination.
  pub total_count: usize,
  pub page_count:  usize,
  pub page:        usize,
  pub page_size:   usize,
}

/// Derive the visible page from the full collection.
pub fn view(residents: &[Resident], criteria: &ViewCriteria) -> ResidentPage {
  let needle = criteria.search.trim().to_lowercase();

  let mut matching: Vec<&Resident> = residents
    .iter()
    .filter(|r| matches_search(r, &needle))
    .filter(|r| matches_status(r, criteria.status))
    .filter(|r| matches_renting(r, criteria.renting))
    .collect();

  sort(&mut matching, criteria.sort);

  let size = criteria.page_size.get();
  let total_count = matching.len();
  let page_count = total_count.div_ceil(size);

  let items = if criteria.page == 0 {
    Vec::new()
  } else {
    let start = (criteria.page - 1).saturating_mul(size);
    matching
      .into_iter()
      .skip(start)
      .take(size)
      .cloned()
      .collect()
  };

  ResidentPage {
    items,
    total_count,
    page_count,
    page: criteria.page,
    page_size: size,
  }
}

// ─── Filtering ───────────────────────────────────────────────────────────────

fn matches_search(resident: &Resident, needle: &str) -> bool {
  if needle.is_empty() {
    return true;
  }
  let names = [
    resident.first_name.as_str(),
    resident.middle_name.as_deref().unwrap_or(""),
    resident.last_name.as_str(),
  ];
  names
    .into_iter()
    .chain(resident.address.components())
    .any(|field| field.to_lowercase().contains(needle))
}

fn matches_status(resident: &Resident, filter: StatusFilter) -> bool {
  match filter {
    StatusFilter::All => true,
    StatusFilter::Only(status) => resident.status == status,
  }
}

fn matches_renting(resident: &Resident, filter: RentingFilter) -> bool {
  match filter {
    RentingFilter::All => true,
    RentingFilter::Renting => resident.census.is_renting == Some(true),
    RentingFilter::NotRenting => resident.census.is_renting == Some(false),
  }
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

fn sort(residents: &mut [&Resident], key: SortKey) {
  // `sort_by` is stable; every comparator below leaves ties as `Equal`.
  match key {
    SortKey::Default => residents.sort_by(|a, b| {
      pending_first(a, b).then_with(|| by_name(a, b))
    }),
    SortKey::NameAsc => residents.sort_by(|a, b| by_name(a, b)),
    SortKey::NameDesc => residents.sort_by(|a, b| by_name(b, a)),
    SortKey::StatusAsc => {
      residents.sort_by_key(|r| r.status.code());
    }
    SortKey::StatusDesc => {
      residents.sort_by(|a, b| b.status.code().cmp(&a.status.code()));
    }
    SortKey::DateAsc => residents.sort_by_key(|r| r.created_at),
    SortKey::DateDesc => residents.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
  }
}

fn pending_first(a: &Resident, b: &Resident) -> Ordering {
  let rank = |r: &Resident| r.status != ResidentStatus::Pending;
  rank(a).cmp(&rank(b))
}

fn by_name(a: &Resident, b: &Resident) -> Ordering {
  cmp_caseless(&a.last_name, &b.last_name)
    .then_with(|| cmp_caseless(&a.first_name, &b.first_name))
}

fn cmp_caseless(a: &str, b: &str) -> Ordering {
  a.chars()
    .flat_map(char::to_lowercase)
    .cmp(b.chars().flat_map(char::to_lowercase))
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
  pub status:  ResidentStatus,
  pub code:    i64,
  pub display: StatusDisplay,
  pub count:   usize,
}

/// Per-status counts for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
  pub total:  usize,
  pub counts: Vec<StatusCount>,
}

pub fn summarize(residents: &[Resident]) -> StatusSummary {
  let mut counts: Vec<StatusCount> = ResidentStatus::iter()
    .map(|status| StatusCount {
      status,
      code: status.code(),
      display: status.display(),
      count: residents.iter().filter(|r| r.status == status).count(),
    })
    .collect();
  counts.sort_by_key(|c| c.code);
  StatusSummary {
    total: residents.len(),
    counts,
  }
}
