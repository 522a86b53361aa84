//! Decides which brokers still need a manual opt-out.
//!
//! Everything here is pure: callers pass the records and the service
//! selection explicitly and get indices back into the record slice.

use std::fmt;

use serde::Serialize;

use crate::services::ServiceSelection;
use crate::store::models::{BrokerRecord, CoveredBy, Status};

/// Optional broker column listing services known to cover that broker,
/// delimited like `covered_by`.
pub const COVERAGE_HINT: &str = "coverage_hint";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Coverage {
    ServiceCovered,
    ManuallyCompleted,
    Pending,
}

impl Coverage {
    /// `covered_by` wins over `status`: a covered broker is reported as
    /// covered whatever its status says.
    pub fn of(record: &BrokerRecord) -> Self {
        if !record.covered_by.is_empty() {
            Coverage::ServiceCovered
        } else if record.status == Status::Completed {
            Coverage::ManuallyCompleted
        } else {
            Coverage::Pending
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Coverage::ServiceCovered => "service-covered",
            Coverage::ManuallyCompleted => "manually-completed",
            Coverage::Pending => "pending",
        }
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The first selected service that covers `record`.
///
/// A service matches when its name appears, case-insensitively, inside the
/// opt-out link, or when it is listed in the broker's `coverage_hint` column.
/// Services are tried in selection order, paid before free.
pub fn matching_service<'a>(
    record: &BrokerRecord,
    services: &'a ServiceSelection,
) -> Option<&'a str> {
    let link = record.opt_out_link.to_lowercase();
    let hints = record
        .extra(COVERAGE_HINT)
        .map(CoveredBy::parse)
        .unwrap_or_default();

    services
        .iter()
        .filter(|s| !s.is_empty())
        .find(|service| link.contains(&service.to_lowercase()) || hints.contains(service))
}

/// Fill in `covered_by` for uncovered records a selected service handles.
/// Existing values are never overwritten. Returns how many records changed.
pub fn auto_attribute(records: &mut [BrokerRecord], services: &ServiceSelection) -> usize {
    let mut changed = 0;
    for record in records.iter_mut().filter(|r| r.covered_by.is_empty()) {
        if let Some(service) = matching_service(record, services) {
            tracing::debug!("Attributing {} to {}", record.name, service);
            record.covered_by = CoveredBy::single(service);
            changed += 1;
        }
    }
    changed
}

/// Indices into a record slice, split by [`Coverage`] and sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub service_covered: Vec<usize>,
    pub manually_completed: Vec<usize>,
    pub pending: Vec<usize>,
}

impl Partition {
    /// Covered and manually completed brokers together, for display under a
    /// single "already handled" heading.
    pub fn handled(&self, records: &[BrokerRecord]) -> Vec<usize> {
        let mut ids: Vec<usize> = self
            .service_covered
            .iter()
            .chain(&self.manually_completed)
            .copied()
            .collect();
        ids.sort_unstable();
        sort_by_name(&mut ids, records);
        ids
    }

    pub fn len(&self) -> usize {
        self.service_covered.len() + self.manually_completed.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_pending(&self, id: usize) -> bool {
        self.pending.contains(&id)
    }
}

pub fn partition(records: &[BrokerRecord]) -> Partition {
    let mut out = Partition::default();
    for (id, record) in records.iter().enumerate() {
        match Coverage::of(record) {
            Coverage::ServiceCovered => out.service_covered.push(id),
            Coverage::ManuallyCompleted => out.manually_completed.push(id),
            Coverage::Pending => out.pending.push(id),
        }
    }
    sort_by_name(&mut out.service_covered, records);
    sort_by_name(&mut out.manually_completed, records);
    sort_by_name(&mut out.pending, records);
    out
}

// Stable: equal names keep their load order.
fn sort_by_name(ids: &mut [usize], records: &[BrokerRecord]) {
    ids.sort_by_cached_key(|&id| records[id].name.to_lowercase());
}

/// A record paired with its position and presentation label.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Labeled<'a> {
    pub id: usize,
    #[serde(flatten)]
    pub record: &'a BrokerRecord,
    pub coverage: Coverage,
}

pub fn labeled<'a>(records: &'a [BrokerRecord], ids: &[usize]) -> Vec<Labeled<'a>> {
    ids.iter()
        .map(|&id| Labeled {
            id,
            record: &records[id],
            coverage: Coverage::of(&records[id]),
        })
        .collect()
}
