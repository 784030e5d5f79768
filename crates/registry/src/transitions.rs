//! Pure state transitions over a [`Snapshot`].
//!
//! Each function reads the current snapshot and returns the next one together
//! with the set of collections it touched. `None` means the request was a
//! no-op and nothing should be persisted or published. Identifiers and
//! timestamps are passed in so the functions stay deterministic.

use chrono::{DateTime, Utc};
use shared::{
    domain::{Claim, ClaimId, ClaimStatus, ItemId, ItemStatus, ReportEntry, ReportId},
    error::{AppError, ErrorCode},
    snapshot::Snapshot,
};

/// Which collections differ from the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Touched {
    pub items: bool,
    pub queue: bool,
    pub claims: bool,
}

impl Touched {
    pub const ALL: Touched = Touched {
        items: true,
        queue: true,
        claims: true,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Snapshot,
    pub touched: Touched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub item_id: ItemId,
    pub name: String,
    pub contact: String,
    pub note: Option<String>,
}

pub fn submit_report(state: &Snapshot, entry: ReportEntry) -> Transition {
    let mut next = state.clone();
    next.queue.insert(0, entry);
    Transition {
        next,
        touched: Touched {
            queue: true,
            ..Touched::default()
        },
    }
}

/// Moves a queued report into the gallery as a new available item.
pub fn approve(state: &Snapshot, report_id: &ReportId, item_id: ItemId) -> Option<Transition> {
    let position = state.queue.iter().position(|r| &r.id == report_id)?;
    let mut next = state.clone();
    let entry = next.queue.remove(position);
    next.items.insert(0, entry.into_item(item_id));
    Some(Transition {
        next,
        touched: Touched {
            items: true,
            queue: true,
            claims: false,
        },
    })
}

pub fn reject(state: &Snapshot, report_id: &ReportId) -> Option<Transition> {
    let position = state.queue.iter().position(|r| &r.id == report_id)?;
    let mut next = state.clone();
    next.queue.remove(position);
    Some(Transition {
        next,
        touched: Touched {
            queue: true,
            ..Touched::default()
        },
    })
}

pub fn submit_claim(
    state: &Snapshot,
    request: ClaimRequest,
    claim_id: ClaimId,
    now: DateTime<Utc>,
) -> Result<Transition, AppError> {
    let name = request.name.trim();
    let contact = request.contact.trim();
    if name.is_empty() || contact.is_empty() {
        return Err(AppError::validation("name and contact are required to claim"));
    }

    let item = state.item(&request.item_id).ok_or_else(|| {
        AppError::new(
            ErrorCode::NotFound,
            format!("item {} not found", request.item_id),
        )
    })?;
    if !item.is_available() {
        return Err(AppError::new(
            ErrorCode::InvalidState,
            format!("item {} has already been claimed", item.id),
        ));
    }

    let duplicate = state
        .claims
        .iter()
        .any(|c| c.is_pending() && c.item_id == request.item_id && c.contact == contact);
    if duplicate {
        return Err(AppError::new(
            ErrorCode::Duplicate,
            format!("a pending claim for item {} from {contact} already exists", item.id),
        ));
    }

    let note = request
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let claim = Claim {
        id: claim_id,
        item_id: request.item_id,
        name: name.to_string(),
        contact: contact.to_string(),
        note,
        date: now,
        status: ClaimStatus::Pending,
    };

    let mut next = state.clone();
    next.claims.insert(0, claim);
    Ok(Transition {
        next,
        touched: Touched {
            claims: true,
            ..Touched::default()
        },
    })
}

/// Accepts a pending claim and marks its item claimed in the same step.
///
/// An item already claimed through another claim is left alone; the
/// remaining pending claims on it stay pending for the admin to reject.
pub fn accept_claim(state: &Snapshot, claim_id: &ClaimId) -> Option<Transition> {
    let claim_pos = pending_claim_position(state, claim_id)?;
    let item_id = &state.claims[claim_pos].item_id;
    let item_pos = state
        .items
        .iter()
        .position(|i| &i.id == item_id && i.is_available())?;

    let mut next = state.clone();
    next.claims[claim_pos].status = ClaimStatus::Accepted;
    next.items[item_pos].status = ItemStatus::Claimed;
    Some(Transition {
        next,
        touched: Touched {
            items: true,
            claims: true,
            queue: false,
        },
    })
}

pub fn reject_claim(state: &Snapshot, claim_id: &ClaimId) -> Option<Transition> {
    let claim_pos = pending_claim_position(state, claim_id)?;
    let mut next = state.clone();
    next.claims[claim_pos].status = ClaimStatus::Rejected;
    Some(Transition {
        next,
        touched: Touched {
            claims: true,
            ..Touched::default()
        },
    })
}

/// Wholesale replacement, used by import.
pub fn replace_all(imported: Snapshot) -> Transition {
    Transition {
        next: imported,
        touched: Touched::ALL,
    }
}

fn pending_claim_position(state: &Snapshot, claim_id: &ClaimId) -> Option<usize> {
    state
        .claims
        .iter()
        .position(|c| &c.id == claim_id && c.is_pending())
}

#[cfg(test)]
#[path = "tests/transitions_tests.rs"]
mod tests;
