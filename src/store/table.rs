use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

use super::models::{BrokerRecord, CoveredBy, Status};

pub const NAME: &str = "name";
pub const OPT_OUT_LINK: &str = "opt_out_link";
pub const COVERED_BY: &str = "covered_by";
pub const STATUS: &str = "status";

pub const CANONICAL_COLUMNS: [&str; 4] = [NAME, OPT_OUT_LINK, COVERED_BY, STATUS];

/// Boolean column written by older versions before `status` existed.
const LEGACY_COMPLETED: &str = "completed";

/// Parsed broker file: records plus the unknown columns in header order.
///
/// Unknown columns are kept by position, so blank and repeated headers are
/// preserved.
pub struct Table {
    pub records: Vec<BrokerRecord>,
    pub extra_columns: Vec<String>,
}

pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let position = |column: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(column));

    let name_idx = position(NAME);
    let link_idx = position(OPT_OUT_LINK);
    let covered_idx = position(COVERED_BY);
    let status_idx = position(STATUS);
    let legacy_idx = if status_idx.is_none() {
        position(LEGACY_COMPLETED)
    } else {
        None
    };

    let canonical = [name_idx, link_idx, covered_idx, status_idx];
    let extra_idx: Vec<usize> = (0..headers.len())
        .filter(|i| !canonical.contains(&Some(*i)))
        .collect();
    let extra_columns: Vec<String> = extra_idx.iter().map(|&i| headers[i].clone()).collect();

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let field = |idx: Option<usize>| cell(&row, idx);

        let status = match (status_idx, legacy_idx) {
            (Some(_), _) => {
                let raw = field(status_idx);
                Status::parse(raw).unwrap_or_else(|| {
                    tracing::warn!(
                        "Row {}: unknown status '{}', treating as Pending",
                        line + 2,
                        raw
                    );
                    Status::Pending
                })
            }
            (None, Some(_)) if field(legacy_idx).eq_ignore_ascii_case("true") => {
                Status::Completed
            }
            _ => Status::Pending,
        };

        let extra = extra_idx
            .iter()
            .map(|&i| (headers[i].clone(), cell(&row, Some(i)).to_string()))
            .collect();

        records.push(BrokerRecord {
            name: field(name_idx).to_string(),
            opt_out_link: field(link_idx).to_string(),
            covered_by: CoveredBy::parse(field(covered_idx)),
            status,
            extra,
        });
    }

    Ok(Table {
        records,
        extra_columns,
    })
}

fn cell(row: &csv::StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).unwrap_or("")
}

/// Header for a save: canonical columns, then known extras in their original
/// order, then any extras only present on records.
pub fn header_for(extra_columns: &[String], records: &[BrokerRecord]) -> Vec<String> {
    let mut header: Vec<String> = CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(extra_columns.iter().cloned());
    for record in records {
        let (_, unplaced) = place_extras(&header[CANONICAL_COLUMNS.len()..], &record.extra);
        header.extend(unplaced.into_iter().map(str::to_string));
    }
    header
}

/// Line up a record's extra cells with the extra header slots. The n-th cell
/// named `x` fills the n-th `x` slot; cells with no free slot are returned
/// separately.
fn place_extras<'a>(
    slots: &[String],
    cells: &'a [(String, String)],
) -> (Vec<&'a str>, Vec<&'a str>) {
    let mut values = vec![""; slots.len()];
    let mut taken = vec![false; slots.len()];
    let mut unplaced = Vec::new();
    for (header, value) in cells {
        match (0..slots.len()).find(|&i| !taken[i] && slots[i] == *header) {
            Some(i) => {
                taken[i] = true;
                values[i] = value.as_str();
            }
            None => unplaced.push(header.as_str()),
        }
    }
    (values, unplaced)
}

/// Write the table to a sibling temp file, then rename it over `path`.
///
/// `header` must start with [`CANONICAL_COLUMNS`], as [`header_for`] builds it.
/// A crash or failure mid-write leaves the previous file intact.
pub fn write_table(path: &Path, header: &[String], records: &[BrokerRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AppError::from_write(parent, e))?;
    }

    let tmp = temp_path(path);
    let written = write_rows(&tmp, header, records);
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        AppError::from_write(path, e)
    })?;
    Ok(())
}

fn write_rows(tmp: &Path, header: &[String], records: &[BrokerRecord]) -> Result<()> {
    let file = File::create(tmp).map_err(|e| AppError::from_write(tmp, e))?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(header)?;

    let slots = header.get(CANONICAL_COLUMNS.len()..).unwrap_or_default();
    for record in records {
        let covered_by = record.covered_by.to_string();
        let (extras, _) = place_extras(slots, &record.extra);
        let mut row = vec![
            record.name.as_str(),
            record.opt_out_link.as_str(),
            covered_by.as_str(),
            record.status.as_str(),
        ];
        row.extend(extras);
        writer.write_record(&row)?;
    }

    let mut file = writer.into_inner().map_err(|e| {
        AppError::from_write(tmp, std::io::Error::new(e.error().kind(), e.to_string()))
    })?;
    file.flush().map_err(|e| AppError::from_write(tmp, e))?;
    file.sync_all().map_err(|e| AppError::from_write(tmp, e))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "brokers.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_is_sibling() {
        assert_eq!(
            temp_path(Path::new("/data/brokers_jane.csv")),
            PathBuf::from("/data/brokers_jane.csv.tmp")
        );
    }

    #[test]
    fn test_header_appends_record_only_extras() {
        let mut record = BrokerRecord::new("A", "https://a.example");
        record.set_extra("notes", "x");
        record.set_extra("email", "privacy@a.example");
        let header = header_for(&["notes".to_string()], &[record]);
        assert_eq!(
            header,
            ["name", "opt_out_link", "covered_by", "status", "notes", "email"]
        );
    }

    #[test]
    fn test_repeated_extra_headers_keep_their_own_cells() {
        let mut record = BrokerRecord::new("A", "https://a.example");
        record.extra = vec![
            ("note".to_string(), "one".to_string()),
            ("note".to_string(), "two".to_string()),
            ("note".to_string(), "three".to_string()),
        ];
        let slots = ["note".to_string(), String::new(), "note".to_string()];
        let (values, unplaced) = place_extras(&slots, &record.extra);
        assert_eq!(values, ["one", "", "two"]);
        assert_eq!(unplaced, ["note"]);
    }
}
