use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;

pub const REMOTE_QUOTES_URL: &str =
    "https://raw.githubusercontent.com/bombfork/data-scrubber/v1/quotes/official_quotes.txt";

/// Address used to check for connectivity before fetching remote quotes.
pub const CONNECTIVITY_PROBE_ADDR: &str = "8.8.8.8:53";
pub const CONNECTIVITY_PROBE_TIMEOUT: Duration = Duration::from_secs(2);
pub const REMOTE_FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Upper bound on quotes taken from local files.
pub const MAX_LOCAL_QUOTES: usize = 100;
pub const QUOTE_SEPARATOR: char = '%';

pub const BUILTIN_QUOTES_FILE: &str = "motivational_quotes.txt";
pub const CUSTOM_QUOTES_FILE: &str = "custom_quotes.txt";
pub const SERVICES_FILE: &str = "services.json";

/// Paid removal services the setup wizard offers.
pub const PAID_SERVICES: &[&str] = &["Incogni", "DeleteMe", "Kanary", "Optery", "OneRep"];

/// Free helper sites and their landing pages.
pub const FREE_SERVICES: &[(&str, &str)] = &[
    ("SimpleOptOut", "https://simpleoptout.com"),
    ("JustDeleteMe", "https://justdelete.me"),
    ("StopDataBrokers", "https://stopdatabrokers.com"),
];

pub fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from("", "bombfork", "data-scrubber")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

pub fn data_dir() -> anyhow::Result<PathBuf> {
    let dirs = project_dirs()?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;
    Ok(data_dir.to_path_buf())
}

/// Broker file for a given user. Non-alphanumeric characters are stripped
/// from the name so it is always a safe file name.
pub fn brokers_path(data_dir: &Path, user_name: &str) -> PathBuf {
    let safe: String = user_name.chars().filter(|c| c.is_alphanumeric()).collect();
    if safe.is_empty() {
        data_dir.join("brokers.csv")
    } else {
        data_dir.join(format!("brokers_{safe}.csv"))
    }
}

pub fn free_service_url(name: &str) -> Option<&'static str> {
    FREE_SERVICES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, url)| *url)
}
