use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Paid,
    Free,
}

/// The removal services a user subscribes to or has opted into.
///
/// Both lists behave as ordered sets (case-insensitive). Order matters: it is
/// the order in which coverage is attributed, paid services first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSelection {
    #[serde(default)]
    pub paid_services: Vec<String>,
    #[serde(default)]
    pub free_services: Vec<String>,
}

impl ServiceSelection {
    pub fn new<P, F>(paid: P, free: F) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        let mut selection = Self::default();
        for s in paid {
            selection.insert(ServiceKind::Paid, s.into());
        }
        for s in free {
            selection.insert(ServiceKind::Free, s.into());
        }
        selection
    }

    /// Every service, paid first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paid_services
            .iter()
            .chain(self.free_services.iter())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.paid_services.is_empty() && self.free_services.is_empty()
    }

    pub fn contains(&self, service: &str) -> bool {
        self.iter().any(|s| s.eq_ignore_ascii_case(service))
    }

    /// Add a service. Returns `false` if it was already selected.
    pub fn insert(&mut self, kind: ServiceKind, service: String) -> bool {
        let service = service.trim().to_string();
        if service.is_empty() || self.contains(&service) {
            return false;
        }
        match kind {
            ServiceKind::Paid => self.paid_services.push(service),
            ServiceKind::Free => self.free_services.push(service),
        }
        true
    }

    /// Remove a service from either list. Returns `false` if it was not selected.
    pub fn remove(&mut self, service: &str) -> bool {
        let before = self.paid_services.len() + self.free_services.len();
        self.paid_services.retain(|s| !s.eq_ignore_ascii_case(service));
        self.free_services.retain(|s| !s.eq_ignore_ascii_case(service));
        before != self.paid_services.len() + self.free_services.len()
    }

    /// Read the persisted selection. `Ok(None)` means setup has not run yet.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        let parsed: Self = serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
        // Re-insert to drop duplicates from hand-edited files.
        Ok(Some(Self::new(parsed.paid_services, parsed.free_services)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::from_write(parent, e))?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| AppError::from_write(&tmp, e))?;
        std::fs::rename(&tmp, path).map_err(|e| AppError::from_write(path, e))?;
        tracing::debug!("Saved service selection to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_selection_is_an_ordered_set() {
        let mut sel = ServiceSelection::new(["Optery", "Incogni"], ["SimpleOptOut"]);
        assert!(!sel.insert(ServiceKind::Free, "incogni".into()));
        assert!(!sel.insert(ServiceKind::Paid, "  ".into()));
        assert!(sel.insert(ServiceKind::Paid, "Kanary".into()));
        assert_eq!(
            sel.iter().collect::<Vec<_>>(),
            ["Optery", "Incogni", "Kanary", "SimpleOptOut"]
        );

        assert!(sel.remove("SIMPLEOPTOUT"));
        assert!(!sel.remove("SimpleOptOut"));
        assert!(sel.free_services.is_empty());
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(
            ServiceSelection::load(&dir.path().join("services.json"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("services.json");
        let sel = ServiceSelection::new(["DeleteMe"], ["JustDeleteMe", "StopDataBrokers"]);
        sel.save(&path).unwrap();
        assert_eq!(ServiceSelection::load(&path).unwrap(), Some(sel));
    }

    #[test]
    fn test_load_rejects_malformed_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("services.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = ServiceSelection::load(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
