//! Privacy-request email drafts for brokers that take requests by email.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::session::Session;
use crate::store::models::BrokerRecord;
use crate::vault::profile::UserProfile;

/// Optional broker column holding the privacy contact address.
pub const EMAIL_COLUMN: &str = "email";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Letter {
    pub broker: String,
    pub to: String,
    pub file_name: String,
    pub body: String,
}

/// Draft a letter for `record`, or `None` if it has no contact address.
pub fn draft(record: &BrokerRecord, profile: &UserProfile) -> Option<Letter> {
    let to = record.extra(EMAIL_COLUMN)?.to_string();
    let name = &profile.full_name;

    let mut body = format!("To: {to}\nSubject: Data Privacy Request - {name}\n\n");
    body.push_str(&format!("Dear {} Privacy Team,\n\n", record.name));
    body.push_str(
        "I am exercising my privacy rights and request the removal of my personal \
         data from your systems.\n\nIdentifiers:\n",
    );
    body.push_str(&format!("- Full name: {name}\n"));
    for (label, values) in [
        ("Email(s)", &profile.emails),
        ("Username(s)", &profile.usernames),
        ("Phone(s)", &profile.phone_numbers),
        ("Address(es)", &profile.addresses),
    ] {
        if !values.is_empty() {
            body.push_str(&format!("- {label}: {}\n", values.join(", ")));
        }
    }
    body.push_str(&format!(
        "\nPlease confirm once completed.\n\nSincerely,\n{name}\n"
    ));

    Some(Letter {
        broker: record.name.clone(),
        to,
        file_name: file_name(&record.name),
        body,
    })
}

/// Letters for every pending broker with a contact address.
pub fn draft_pending(session: &Session, profile: &UserProfile) -> Vec<Letter> {
    session
        .pending()
        .iter()
        .filter_map(|l| draft(l.record, profile))
        .collect()
}

/// Write each letter to its own file in `dir`. Brokers whose names sanitise to
/// the same file name get a numeric suffix (`acme_data_2.txt`).
pub fn write_letters(dir: &Path, letters: &[Letter]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| AppError::from_write(dir, e))?;
    let mut used = HashSet::new();
    let mut written = Vec::with_capacity(letters.len());
    for letter in letters {
        let path = dir.join(unique_name(&letter.file_name, &mut used));
        std::fs::write(&path, &letter.body).map_err(|e| AppError::from_write(&path, e))?;
        written.push(path);
    }
    tracing::debug!("Wrote {} letter(s) to {}", written.len(), dir.display());
    Ok(written)
}

fn unique_name(file_name: &str, used: &mut HashSet<String>) -> String {
    let stem = file_name.strip_suffix(".txt").unwrap_or(file_name);
    let mut candidate = file_name.to_string();
    let mut n = 1;
    while !used.insert(candidate.clone()) {
        n += 1;
        candidate = format!("{stem}_{n}.txt");
    }
    candidate
}

fn file_name(broker: &str) -> String {
    let stem: String = broker
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.txt", if stem.is_empty() { "broker" } else { stem.as_str() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceSelection;
    use crate::store::BrokerStore;
    use tempfile::TempDir;

    fn profile() -> UserProfile {
        UserProfile {
            full_name: "Jane Doe".into(),
            emails: vec!["jane@example.com".into(), "jd@example.org".into()],
            usernames: vec![],
            phone_numbers: vec!["555-0100".into()],
            addresses: vec![],
        }
    }

    #[test]
    fn test_draft_needs_contact_address() {
        let mut record = BrokerRecord::new("Acme Data", "https://acme.example/out");
        assert!(draft(&record, &profile()).is_none());

        record.set_extra(EMAIL_COLUMN, "privacy@acme.example");
        let letter = draft(&record, &profile()).unwrap();
        assert_eq!(letter.to, "privacy@acme.example");
        assert_eq!(letter.file_name, "acme_data.txt");
        assert!(letter.body.contains("Dear Acme Data Privacy Team"));
        assert!(letter.body.contains("- Email(s): jane@example.com, jd@example.org"));
        assert!(letter.body.contains("- Phone(s): 555-0100"));
        assert!(!letter.body.contains("Address(es)"));
    }

    #[test]
    fn test_only_pending_brokers_get_letters() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("brokers.csv");
        std::fs::write(
            &path,
            "name,opt_out_link,covered_by,status,email\n\
             Acme,https://acme.example,,Pending,privacy@acme.example\n\
             Done,https://done.example,,Completed,privacy@done.example\n\
             Covered,https://covered.example,Incogni,Pending,privacy@covered.example\n\
             Formless,https://formless.example,,Pending,\n",
        )
        .unwrap();
        let session =
            Session::start("Jane", ServiceSelection::default(), BrokerStore::new(path)).unwrap();

        let letters = draft_pending(&session, &profile());
        assert_eq!(letters.len(), 1);
        assert_eq!(letters[0].broker, "Acme");

        let out = dir.path().join("emails");
        let written = write_letters(&out, &letters).unwrap();
        assert_eq!(written, [out.join("acme.txt")]);
        assert!(std::fs::read_to_string(&written[0]).unwrap().contains("Jane Doe"));
    }

    #[test]
    fn test_colliding_file_names_get_suffixes() {
        let dir = TempDir::new().unwrap();
        let letters: Vec<Letter> = ["Acme Data", "acme-data", "ACME DATA"]
            .into_iter()
            .map(|name| {
                let mut record = BrokerRecord::new(name, "https://acme.example/out");
                record.set_extra(EMAIL_COLUMN, "privacy@acme.example");
                draft(&record, &profile()).unwrap()
            })
            .collect();
        assert!(letters.iter().all(|l| l.file_name == "acme_data.txt"));

        let written = write_letters(dir.path(), &letters).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["acme_data.txt", "acme_data_2.txt", "acme_data_3.txt"]);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
        assert!(std::fs::read_to_string(&written[1]).unwrap().contains("Dear acme-data"));
    }
}
