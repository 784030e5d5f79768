use std::collections::BTreeMap;

use shared::{
    domain::{Claim, Item, ItemStatus, ReportEntry},
    snapshot::Snapshot,
};

/// Case-insensitive substring match on title, location or date.
fn matches_query(fields: [&str; 3], query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&query))
}

/// Available items matching `query`, newest find first.
pub fn public_gallery<'a>(snapshot: &'a Snapshot, query: &str) -> Vec<&'a Item> {
    let mut visible: Vec<&Item> = snapshot
        .items
        .iter()
        .filter(|item| item.is_available())
        .filter(|item| {
            matches_query(
                [item.title.as_str(), item.location.as_str(), item.date.as_str()],
                query,
            )
        })
        .collect();
    visible.sort_by(|a, b| b.date.cmp(&a.date));
    visible
}

pub fn queue_matching<'a>(snapshot: &'a Snapshot, query: &str) -> Vec<&'a ReportEntry> {
    snapshot
        .queue
        .iter()
        .filter(|entry| {
            matches_query(
                [entry.title.as_str(), entry.location.as_str(), entry.date.as_str()],
                query,
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingClaim<'a> {
    pub claim: &'a Claim,
    pub item: Option<&'a Item>,
}

pub fn pending_claims(snapshot: &Snapshot) -> Vec<PendingClaim<'_>> {
    snapshot
        .claims
        .iter()
        .filter(|claim| claim.is_pending())
        .map(|claim| PendingClaim {
            claim,
            item: snapshot.item(&claim.item_id),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub available: usize,
    pub claimed: usize,
    /// Items found per date, oldest date first.
    pub per_date: Vec<(String, usize)>,
}

pub fn dashboard_stats(snapshot: &Snapshot) -> DashboardStats {
    let mut per_date: BTreeMap<&str, usize> = BTreeMap::new();
    let mut stats = DashboardStats::default();
    for item in &snapshot.items {
        match item.status {
            ItemStatus::Available => stats.available += 1,
            ItemStatus::Claimed => stats.claimed += 1,
        }
        *per_date.entry(item.date.as_str()).or_default() += 1;
    }
    stats.per_date = per_date
        .into_iter()
        .map(|(date, count)| (date.to_string(), count))
        .collect();
    stats
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
