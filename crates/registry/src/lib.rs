use std::sync::Arc;

use chrono::{Local, Utc};
use shared::{
    domain::{ClaimId, Item, ItemId, ReportEntry, ReportId, Role},
    error::AppError,
    snapshot::{seed_items, seed_queue, Snapshot},
};
use storage::{KeyValueStore, Persisted, PersistentStore, StorageKeys, WriteBatch};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub mod confirm;
pub mod intake;
pub mod transfer;
pub mod transitions;
pub mod views;

pub use confirm::{Confirmed, Decision, ImportPlan, Intent, ResetPlan};
pub use intake::{ImageUpload, IntakeLimits, ReportDraft};
pub use transitions::{ClaimRequest, Touched, Transition};
pub use views::{DashboardStats, PendingClaim};

/// Result of a state-changing request that may legitimately do nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    Applied { value: T, persisted: Persisted },
    Unchanged,
}

impl<T> Change<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Change::Applied { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Change::Applied { value, .. } => Some(value),
            Change::Unchanged => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Change::Applied { value, .. } => Some(value),
            Change::Unchanged => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    pub keys: StorageKeys,
    pub limits: IntakeLimits,
}

/// Owner of the lost-and-found state.
///
/// Every mutation computes the next snapshot, persists the touched
/// collections in one batch, and only then publishes the snapshot to
/// readers. A failed write is logged and the new state is kept in memory.
pub struct Registry<S: KeyValueStore> {
    store: PersistentStore<S>,
    keys: StorageKeys,
    limits: IntakeLimits,
    role: Role,
    state: watch::Sender<Arc<Snapshot>>,
}

impl<S: KeyValueStore> Registry<S> {
    /// Loads each collection from the store, falling back to seed data.
    pub async fn open(store: S, options: RegistryOptions) -> Self {
        let store = PersistentStore::new(store);
        let keys = options.keys;
        let snapshot = Snapshot {
            items: store.load(&keys.items, seed_items()).await,
            queue: store.load(&keys.queue, seed_queue()).await,
            claims: store.load(&keys.claims, Vec::new()).await,
        };
        let role = store.load(&keys.role, Role::default()).await;
        info!(
            items = snapshot.items.len(),
            queue = snapshot.queue.len(),
            claims = snapshot.claims.len(),
            "registry opened"
        );
        let (state, _) = watch::channel(Arc::new(snapshot));
        Self {
            store,
            keys,
            limits: options.limits,
            role,
            state,
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.state.borrow().clone()
    }

    /// Readers see only complete post-transition snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.state.subscribe()
    }

    pub fn store(&self) -> &S {
        self.store.inner()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub async fn set_role(&mut self, role: Role) -> Persisted {
        self.role = role;
        self.store.save(&self.keys.role, &role).await
    }

    pub async fn submit_report(&mut self, draft: ReportDraft) -> Result<ReportId, AppError> {
        let entry = intake::prepare_report(
            draft,
            &self.limits,
            ReportId::generate(),
            Local::now().date_naive(),
        )?;
        let id = entry.id.clone();
        let transition = transitions::submit_report(&self.snapshot(), entry);
        self.commit(transition).await;
        info!(report_id = %id, "report queued for verification");
        Ok(id)
    }

    pub async fn approve(&mut self, report_id: &ReportId) -> Change<ItemId> {
        let item_id = ItemId::generate();
        let Some(transition) = transitions::approve(&self.snapshot(), report_id, item_id.clone())
        else {
            debug!(report_id = %report_id, "approve ignored: report not queued");
            return Change::Unchanged;
        };
        let persisted = self.commit(transition).await;
        info!(report_id = %report_id, item_id = %item_id, "report approved");
        Change::Applied {
            value: item_id,
            persisted,
        }
    }

    pub async fn reject(&mut self, report_id: &ReportId) -> Change<()> {
        let Some(transition) = transitions::reject(&self.snapshot(), report_id) else {
            debug!(report_id = %report_id, "reject ignored: report not queued");
            return Change::Unchanged;
        };
        let persisted = self.commit(transition).await;
        info!(report_id = %report_id, "report rejected");
        Change::Applied {
            value: (),
            persisted,
        }
    }

    pub async fn submit_claim(&mut self, request: ClaimRequest) -> Result<ClaimId, AppError> {
        let claim_id = ClaimId::generate();
        let item_id = request.item_id.clone();
        let transition =
            transitions::submit_claim(&self.snapshot(), request, claim_id.clone(), Utc::now())?;
        self.commit(transition).await;
        info!(claim_id = %claim_id, item_id = %item_id, "claim submitted");
        Ok(claim_id)
    }

    pub async fn accept_claim(&mut self, claim_id: &ClaimId) -> Change<()> {
        let Some(transition) = transitions::accept_claim(&self.snapshot(), claim_id) else {
            debug!(claim_id = %claim_id, "accept ignored: claim not pending or item missing");
            return Change::Unchanged;
        };
        let persisted = self.commit(transition).await;
        info!(claim_id = %claim_id, "claim accepted");
        Change::Applied {
            value: (),
            persisted,
        }
    }

    pub async fn reject_claim(&mut self, claim_id: &ClaimId) -> Change<()> {
        let Some(transition) = transitions::reject_claim(&self.snapshot(), claim_id) else {
            debug!(claim_id = %claim_id, "reject ignored: claim not pending");
            return Change::Unchanged;
        };
        let persisted = self.commit(transition).await;
        info!(claim_id = %claim_id, "claim rejected");
        Change::Applied {
            value: (),
            persisted,
        }
    }

    pub fn export(&self) -> Result<String, AppError> {
        transfer::export_document(&self.snapshot())
    }

    /// Validates `raw` and asks for confirmation before anything is replaced.
    pub fn import_intent(&self, raw: &str) -> Result<Intent<ImportPlan>, AppError> {
        let snapshot = transfer::parse_import(raw)?;
        let prompt = format!(
            "Import will replace all data with {} items, {} queued reports and {} claims. Continue?",
            snapshot.items.len(),
            snapshot.queue.len(),
            snapshot.claims.len()
        );
        Ok(Intent::new(ImportPlan { snapshot }, prompt))
    }

    pub async fn import(&mut self, confirmed: Confirmed<ImportPlan>) -> Persisted {
        let plan = confirmed.into_inner();
        let persisted = self.commit(transitions::replace_all(plan.snapshot)).await;
        info!("state replaced from import");
        persisted
    }

    pub fn reset_intent(&self) -> Intent<ResetPlan> {
        Intent::new(
            ResetPlan,
            "Reset will discard all items, reports and claims and restore the demo data. Continue?",
        )
    }

    /// Restores seed data and removes the persisted collections.
    pub async fn reset(&mut self, confirmed: Confirmed<ResetPlan>) -> Persisted {
        let ResetPlan = confirmed.into_inner();
        let persisted = self.store.clear(&self.keys.collections()).await;
        self.state.send_replace(Arc::new(Snapshot::seed()));
        info!("state reset to seed data");
        persisted
    }

    pub fn public_gallery(&self, query: &str) -> Vec<Item> {
        views::public_gallery(&self.snapshot(), query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn queue_matching(&self, query: &str) -> Vec<ReportEntry> {
        views::queue_matching(&self.snapshot(), query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        views::dashboard_stats(&self.snapshot())
    }

    async fn commit(&mut self, transition: Transition) -> Persisted {
        let Transition { next, touched } = transition;
        let mut batch = WriteBatch::new();
        if touched.items {
            batch = batch.put(&self.keys.items, &next.items);
        }
        if touched.queue {
            batch = batch.put(&self.keys.queue, &next.queue);
        }
        if touched.claims {
            batch = batch.put(&self.keys.claims, &next.claims);
        }
        let persisted = self.store.save_many(batch).await;
        if !persisted.is_saved() {
            warn!("changes kept in memory only for this session");
        }
        self.state.send_replace(Arc::new(next));
        persisted
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
