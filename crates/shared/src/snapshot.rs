use serde::{Deserialize, Serialize};

use crate::domain::{Claim, Item, ItemId, ItemStatus, ReportEntry, ReportId};

/// The full application state: the three collections, newest first.
///
/// This is also the export/import document, so the field names are part of
/// the on-disk format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub items: Vec<Item>,
    pub queue: Vec<ReportEntry>,
    #[serde(default)]
    pub claims: Vec<Claim>,
}

impl Snapshot {
    /// Demo data a fresh installation starts with.
    pub fn seed() -> Self {
        Self {
            items: seed_items(),
            queue: seed_queue(),
            claims: Vec::new(),
        }
    }

    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn report(&self, id: &ReportId) -> Option<&ReportEntry> {
        self.queue.iter().find(|entry| &entry.id == id)
    }
}

pub fn seed_items() -> Vec<Item> {
    [
        ("itm-ktm", "KTM", "Perpustakaan Pusat", "2025-09-14"),
        ("itm-kunci", "Kunci", "Kantin FTI", "2025-09-16"),
        ("itm-tumbler", "Tumbler", "Ruang Kelas A-203", "2025-09-18"),
    ]
    .into_iter()
    .map(|(id, title, location, date)| Item {
        id: ItemId::from(id),
        title: title.into(),
        location: location.into(),
        date: date.into(),
        image: None,
        status: ItemStatus::Available,
        description: None,
        contact: None,
    })
    .collect()
}

pub fn seed_queue() -> Vec<ReportEntry> {
    [
        ("rep-1", "Jaket Hitam", "Depan Ruang Rapat Fakultas", "2025-09-19"),
        ("rep-2", "Payung Bening", "Halte Kampus Timur", "2025-09-19"),
        ("rep-3", "Kalkulator Casio", "Laboratorium Komputer", "2025-09-20"),
    ]
    .into_iter()
    .map(|(id, title, location, date)| ReportEntry {
        id: ReportId::from(id),
        title: title.into(),
        location: location.into(),
        date: date.into(),
        image: None,
        description: None,
        contact: None,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_published_status_reads_as_available() {
        let raw = r#"{"items":[{"id":"itm-1","title":"KTM","location":"Perpus","date":"2025-09-14","image":null,"status":"published"}],"queue":[]}"#;
        let snapshot: Snapshot = serde_json::from_str(raw).expect("parse");
        assert_eq!(snapshot.items[0].status, ItemStatus::Available);
        assert!(snapshot.claims.is_empty());
    }

    #[test]
    fn claims_use_camel_case_item_reference() {
        let raw = r#"{"id":"clm-1","itemId":"itm-1","name":"Ana","contact":"ana@kampus.ac.id","date":"2025-09-20T08:00:00Z","status":"pending"}"#;
        let claim: crate::domain::Claim = serde_json::from_str(raw).expect("parse");
        assert_eq!(claim.item_id, ItemId::from("itm-1"));

        let encoded = serde_json::to_value(&claim).expect("encode");
        assert_eq!(encoded["itemId"], "itm-1");
        assert!(encoded.get("note").is_none());
    }

    #[test]
    fn seed_ids_are_unique() {
        let seed = Snapshot::seed();
        let mut ids: Vec<_> = seed.items.iter().map(|i| i.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), seed.items.len());
        assert!(seed.report(&ReportId::from("rep-1")).is_some());
    }
}
