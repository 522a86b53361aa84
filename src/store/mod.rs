pub mod models;
pub mod table;

use std::path::{Path, PathBuf};

use crate::error::Result;
use models::BrokerRecord;

/// Broker list backed by a CSV file.
///
/// Columns this tool does not understand are remembered on `load` and written
/// back on `save`, so hand-added columns survive a round trip.
pub struct BrokerStore {
    path: PathBuf,
    extra_columns: Vec<String>,
}

impl BrokerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            extra_columns: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// Load every broker. A missing file is created with only a header row.
    pub fn load(&mut self) -> Result<Vec<BrokerRecord>> {
        if !self.path.exists() {
            tracing::debug!("{} not found; creating new one", self.path.display());
            table::write_table(&self.path, &table::header_for(&[], &[]), &[])?;
            self.extra_columns.clear();
            return Ok(Vec::new());
        }

        let table = table::read_table(&self.path)?;
        tracing::debug!(
            "Loaded {} broker(s) from {}",
            table.records.len(),
            self.path.display()
        );
        self.extra_columns = table.extra_columns;
        Ok(table.records)
    }

    /// Replace the backing file with `records`.
    pub fn save(&self, records: &[BrokerRecord]) -> Result<()> {
        self.write_to(&self.path, records)?;
        tracing::debug!("Saved {} broker(s) to {}", records.len(), self.path.display());
        Ok(())
    }

    /// Write `records` to another location in the same format.
    pub fn export(&self, records: &[BrokerRecord], dest: &Path) -> Result<()> {
        self.write_to(dest, records)?;
        tracing::info!("Exported {} broker(s) to {}", records.len(), dest.display());
        Ok(())
    }

    fn write_to(&self, path: &Path, records: &[BrokerRecord]) -> Result<()> {
        let header = table::header_for(&self.extra_columns, records);
        table::write_table(path, &header, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use models::{CoveredBy, Status};
    use tempfile::TempDir;

    fn store_with(dir: &TempDir, contents: &str) -> BrokerStore {
        let path = dir.path().join("brokers.csv");
        std::fs::write(&path, contents).unwrap();
        BrokerStore::new(path)
    }

    #[test]
    fn test_missing_file_creates_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("brokers.csv");
        let mut store = BrokerStore::new(&path);

        let records = store.load().unwrap();
        assert!(records.is_empty());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "name,opt_out_link,covered_by,status");
    }

    #[test]
    fn test_load_normalizes_fields() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with(
            &dir,
            "name,opt_out_link,covered_by,status\n\
             \x20Acme Data ,http://acme.com/optout,,completed\n\
             Spokeo,https://spokeo.com/optout,Incogni,\n\
             Short,https://short.example\n\
             Odd,https://odd.example,,archived\n",
        );

        let records = store.load().unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].name, "Acme Data");
        assert_eq!(records[0].status, Status::Completed);
        assert_eq!(records[1].covered_by, CoveredBy::single("Incogni"));
        assert_eq!(records[1].status, Status::Pending);
        assert!(records[2].covered_by.is_empty());
        assert_eq!(records[2].status, Status::Pending);
        assert_eq!(records[3].status, Status::Pending);
    }

    #[test]
    fn test_round_trip_preserves_records() {
        let dir = TempDir::new().unwrap();
        let original = "name,opt_out_link,covered_by,status\n\
                        Acme Data,http://acme.com/optout,,Pending\n\
                        \"Smith, Jones & Co\",https://sj.example/out,Optery;Kanary,Completed\n";
        let mut store = store_with(&dir, original);

        let records = store.load().unwrap();
        store.save(&records).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(records, reloaded);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), original);
    }

    #[test]
    fn test_extra_columns_survive_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with(
            &dir,
            "name,notes,opt_out_link,covered_by,status,email\n\
             Acme,call first,http://acme.com/optout,,Pending,privacy@acme.com\n",
        );

        let mut records = store.load().unwrap();
        assert_eq!(store.extra_columns(), ["notes", "email"]);
        records[0].status = Status::Completed;
        store.save(&records).unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            contents,
            "name,opt_out_link,covered_by,status,notes,email\n\
             Acme,http://acme.com/optout,,Completed,call first,privacy@acme.com\n"
        );
    }

    #[test]
    fn test_blank_and_repeated_headers_survive_round_trip() {
        let dir = TempDir::new().unwrap();
        let original = "name,opt_out_link,covered_by,status,,note,note\n\
                        A,https://a,,Pending,keep me,one,two\n";
        let mut store = store_with(&dir, original);

        let records = store.load().unwrap();
        assert_eq!(store.extra_columns(), ["", "note", "note"]);
        assert_eq!(records[0].extra("note"), Some("one"));
        store.save(&records).unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), original);
    }

    #[test]
    fn test_legacy_completed_column() {
        let dir = TempDir::new().unwrap();
        let mut store = store_with(
            &dir,
            "name,opt_out_link,covered_by,completed\n\
             Old,https://old.example,,True\n\
             New,https://new.example,,False\n",
        );

        let records = store.load().unwrap();
        assert_eq!(records[0].status, Status::Completed);
        assert_eq!(records[1].status, Status::Pending);
        assert_eq!(records[0].extra("completed"), Some("True"));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let mut store = BrokerStore::new(dir.path().join("brokers.csv"));
        store.load().unwrap();
        store
            .save(&[BrokerRecord::new("Acme", "https://acme.example")])
            .unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, ["brokers.csv"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_location_reports_permission_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        let path = locked.join("brokers.csv");
        std::fs::write(&path, "name,opt_out_link,covered_by,status\n").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o500)).unwrap();

        // Root ignores directory permissions; nothing to check there.
        if std::fs::File::create(locked.join("write_check")).is_ok() {
            return;
        }

        let mut store = BrokerStore::new(&path);
        let records = vec![BrokerRecord::new("Acme", "https://acme.example")];
        store.load().unwrap();
        let err = store.save(&records).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied { .. }));
        assert!(err.to_string().contains("export"));

        let fallback = dir.path().join("export.csv");
        store.export(&records, &fallback).unwrap();
        assert!(std::fs::read_to_string(fallback).unwrap().contains("Acme"));

        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o700)).unwrap();
    }
}
