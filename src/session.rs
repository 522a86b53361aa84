//! One user's pass over their broker list.
//!
//! A [`Session`] owns the loaded records and the service selection, and is the
//! only place a broker moves from `Pending` to `Completed`.

use std::collections::HashSet;
use std::path::Path;

use crate::coverage::{self, Labeled, Partition};
use crate::error::{AppError, Result};
use crate::services::ServiceSelection;
use crate::store::BrokerStore;
use crate::store::models::{BrokerRecord, Status};

/// Position of a record in the session's broker list.
pub type BrokerId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Completed,
    AlreadyCompleted,
}

pub struct View<'a> {
    pub pending: Vec<Labeled<'a>>,
    pub handled: Vec<Labeled<'a>>,
}

pub struct Session {
    user_name: String,
    services: ServiceSelection,
    store: BrokerStore,
    records: Vec<BrokerRecord>,
    partition: Partition,
    presented: HashSet<BrokerId>,
}

impl Session {
    /// Load the broker list and attribute coverage for `services`.
    pub fn start(
        user_name: impl Into<String>,
        services: ServiceSelection,
        mut store: BrokerStore,
    ) -> Result<Self> {
        let mut records = store.load()?;
        if !store.extra_columns().is_empty() {
            tracing::debug!("Keeping extra columns: {}", store.extra_columns().join(", "));
        }
        let attributed = coverage::auto_attribute(&mut records, &services);
        if attributed > 0 {
            tracing::info!("{attributed} broker(s) covered by your services");
        }
        let partition = coverage::partition(&records);
        Ok(Self {
            user_name: user_name.into(),
            services,
            store,
            records,
            partition,
            presented: HashSet::new(),
        })
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn services(&self) -> &ServiceSelection {
        &self.services
    }

    pub fn store(&self) -> &BrokerStore {
        &self.store
    }

    pub fn records(&self) -> &[BrokerRecord] {
        &self.records
    }

    pub fn record(&self, id: BrokerId) -> Result<&BrokerRecord> {
        self.records.get(id).ok_or(AppError::UnknownBroker(id))
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Brokers still needing a manual opt-out, sorted by name.
    pub fn pending(&self) -> Vec<Labeled<'_>> {
        coverage::labeled(&self.records, &self.partition.pending)
    }

    /// Covered and manually completed brokers, sorted by name.
    pub fn handled(&self) -> Vec<Labeled<'_>> {
        coverage::labeled(&self.records, &self.partition.handled(&self.records))
    }

    pub fn view(&self) -> View<'_> {
        View {
            pending: self.pending(),
            handled: self.handled(),
        }
    }

    /// Hand out a pending broker's opt-out link. Completion can only be
    /// confirmed for brokers presented this way.
    pub fn present(&mut self, id: BrokerId) -> Result<&BrokerRecord> {
        if !self.partition.is_pending(id) {
            return Err(match self.records.get(id) {
                Some(r) => AppError::InvalidInput(format!("'{}' is not pending", r.name)),
                None => AppError::UnknownBroker(id),
            });
        }
        self.presented.insert(id);
        tracing::debug!("Presented opt-out link for {}", self.records[id].name);
        Ok(&self.records[id])
    }

    /// Mark a presented broker as completed and save right away.
    ///
    /// If the save fails the broker stays completed in memory; the error is
    /// returned so the caller can retry [`Session::save`] or
    /// [`Session::export`].
    pub fn confirm_completion(&mut self, id: BrokerId) -> Result<Transition> {
        let record = self.records.get(id).ok_or(AppError::UnknownBroker(id))?;
        if record.status == Status::Completed {
            return Ok(Transition::AlreadyCompleted);
        }
        if !self.presented.contains(&id) {
            return Err(AppError::NotPresented(record.name.clone()));
        }

        self.records[id].status = Status::Completed;
        self.refresh();
        tracing::info!("Marked {} as manually completed", self.records[id].name);

        self.save()?;
        Ok(Transition::Completed)
    }

    /// Append a new pending broker and save.
    pub fn add_broker(&mut self, name: &str, opt_out_link: &str) -> Result<BrokerId> {
        let name = name.trim();
        let link = opt_out_link.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("broker name cannot be empty".into()));
        }
        if !link.starts_with("http") {
            return Err(AppError::InvalidInput(
                "opt-out link must start with http:// or https://".into(),
            ));
        }

        let id = self.records.len();
        self.records.push(BrokerRecord::new(name, link));
        coverage::auto_attribute(&mut self.records[id..], &self.services);
        self.refresh();
        tracing::info!("Added broker {name}");

        self.save()?;
        Ok(id)
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.records)
    }

    pub fn export(&self, dest: &Path) -> Result<()> {
        self.store.export(&self.records, dest)
    }

    fn refresh(&mut self) {
        self.partition = coverage::partition(&self.records);
    }
}
