//! Lifecycle hooks for one unit of work.
//!
//! The host persistence layer drives a [`UnitOfWork`] through its commit:
//!
//! 1. [`post_load`](UnitOfWork::post_load) for every entity read from storage.
//! 2. [`on_flush`](UnitOfWork::on_flush) with the entities scheduled for
//!    insert or update. Entities listed in the returned report must have
//!    their change-set recomputed.
//! 3. [`revalidate`](UnitOfWork::revalidate) with the identity map, once the
//!    change-sets are final. Only entities encrypted in step 2 are visited.
//! 4. [`post_flush`](UnitOfWork::post_flush) with the identity map, after the
//!    write, so in-memory entities hold plaintext again.

use std::sync::Arc;

use fieldseal_model::{EntityKey, SecureEntity};
use tracing::{debug, warn};

use crate::error::SecureResult;
use crate::ledger::TouchLedger;
use crate::orchestrator::TransformOrchestrator;

/// Outcome of an encrypting pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Entities whose persisted values changed during the pass.
    pub recompute: Vec<EntityKey>,
    /// Total number of fields sealed.
    pub fields_encrypted: usize,
    /// Entities the pass looked at.
    pub entities_visited: usize,
}

impl FlushReport {
    /// True if no entity changed.
    pub fn is_clean(&self) -> bool {
        self.recompute.is_empty()
    }

    fn record<E: SecureEntity + ?Sized>(&mut self, entity: &E, changed: usize) {
        self.entities_visited += 1;
        if changed > 0 {
            self.fields_encrypted += changed;
            self.recompute.push(entity.entity_key());
        }
    }
}

/// Field-encryption state of one unit of work.
///
/// Not meant to be shared: each unit of work begins its own from
/// [`TransformOrchestrator::begin`].
#[derive(Debug)]
pub struct UnitOfWork {
    orchestrator: Arc<TransformOrchestrator>,
    ledger: TouchLedger,
}

impl UnitOfWork {
    pub fn new(orchestrator: Arc<TransformOrchestrator>) -> Self {
        Self {
            orchestrator,
            ledger: TouchLedger::new(),
        }
    }

    pub fn ledger(&self) -> &TouchLedger {
        &self.ledger
    }

    pub fn orchestrator(&self) -> &Arc<TransformOrchestrator> {
        &self.orchestrator
    }

    /// Decrypts a freshly loaded entity.
    pub fn post_load<E: SecureEntity + ?Sized>(&self, entity: &mut E) -> SecureResult<usize> {
        self.orchestrator.decrypt_fields(entity)
    }

    /// First encrypting pass over the entities scheduled for insert/update.
    pub fn on_flush<'a, E, I>(&mut self, scheduled: I) -> SecureResult<FlushReport>
    where
        E: SecureEntity + ?Sized + 'a,
        I: IntoIterator<Item = &'a mut E>,
    {
        let mut report = FlushReport::default();

        for entity in scheduled {
            let changed = self.orchestrator.encrypt_fields(entity)?;
            if changed > 0 {
                self.ledger.mark_touched(entity.entity_type(), entity.entity_id());
            }
            report.record(entity, changed);
        }

        debug!(
            visited = report.entities_visited,
            changed = report.recompute.len(),
            fields = report.fields_encrypted,
            "flush pass complete"
        );
        Ok(report)
    }

    /// Second encrypting pass, restricted to entities touched by
    /// [`on_flush`](Self::on_flush).
    ///
    /// Catches values reassigned after the first pass. The ledger is
    /// cleared afterwards whether or not the pass succeeds.
    pub fn revalidate<'a, E, I>(&mut self, identity_map: I) -> SecureResult<FlushReport>
    where
        E: SecureEntity + ?Sized + 'a,
        I: IntoIterator<Item = &'a mut E>,
    {
        let result = self.revalidate_touched(identity_map);
        self.ledger.clear();

        if let Ok(report) = &result {
            debug!(
                visited = report.entities_visited,
                changed = report.recompute.len(),
                "revalidation pass complete"
            );
        }
        result
    }

    fn revalidate_touched<'a, E, I>(&self, identity_map: I) -> SecureResult<FlushReport>
    where
        E: SecureEntity + ?Sized + 'a,
        I: IntoIterator<Item = &'a mut E>,
    {
        let mut report = FlushReport::default();

        for entity in identity_map {
            if !self.ledger.was_touched(entity.entity_type(), entity.entity_id()) {
                continue;
            }
            let changed = self.orchestrator.encrypt_fields(entity)?;
            report.record(entity, changed);
        }

        Ok(report)
    }

    /// Restores plaintext in every managed entity once the write is done.
    ///
    /// Returns the number of fields decrypted.
    pub fn post_flush<'a, E, I>(&mut self, identity_map: I) -> SecureResult<usize>
    where
        E: SecureEntity + ?Sized + 'a,
        I: IntoIterator<Item = &'a mut E>,
    {
        if !self.ledger.is_empty() {
            warn!(
                touched = self.ledger.len(),
                "revalidation pass was skipped; clearing touch ledger"
            );
            self.ledger.clear();
        }

        let mut decrypted = 0;
        for entity in identity_map {
            decrypted += self.orchestrator.decrypt_fields(entity)?;
        }

        debug!(fields = decrypted, "post-flush decryption complete");
        Ok(decrypted)
    }
}
