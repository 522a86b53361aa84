pub mod remote;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;

use crate::config::{MAX_LOCAL_QUOTES, QUOTE_SEPARATOR};
use crate::error::{AppError, Result};
use remote::QuoteFetcher;

const BUNDLED_QUOTES: &str = include_str!("../../assets/motivational_quotes.txt");

/// Local quote files, read in this order.
#[derive(Debug, Clone)]
pub struct QuoteSources {
    pub builtin: PathBuf,
    pub custom: Option<PathBuf>,
}

/// What happened to the remote source during [`QuoteCache::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// No fetcher was configured.
    Disabled,
    /// Number of entries the remote source contributed before deduplication.
    Fetched(usize),
    /// The fetch failed; the cache holds local quotes only.
    Degraded(String),
}

#[derive(Debug, Clone)]
pub struct QuoteCache {
    quotes: Vec<String>,
    remote: RemoteOutcome,
}

impl QuoteCache {
    /// Combine local files and, if given, the remote source.
    ///
    /// Never fails: unreadable files contribute nothing and remote errors are
    /// recorded as [`RemoteOutcome::Degraded`].
    pub async fn build(sources: &QuoteSources, fetcher: Option<&dyn QuoteFetcher>) -> Self {
        let mut quotes = local_quotes(sources);

        let remote = match fetcher {
            None => RemoteOutcome::Disabled,
            Some(fetcher) => match fetcher.fetch().await {
                Ok(text) => {
                    let fetched: Vec<String> = split_quotes(&text).collect();
                    tracing::debug!("Fetched {} quote(s) from {}", fetched.len(), fetcher.name());
                    let count = fetched.len();
                    quotes.extend(fetched);
                    RemoteOutcome::Fetched(count)
                }
                Err(e) => {
                    tracing::debug!("Online quote fetch failed: {e:#}");
                    RemoteOutcome::Degraded(format!("{e:#}"))
                }
            },
        };

        let quotes = dedupe(quotes);
        tracing::debug!("Total quotes loaded: {}", quotes.len());
        Self { quotes, remote }
    }

    pub fn from_quotes(quotes: impl IntoIterator<Item = String>) -> Self {
        Self {
            quotes: dedupe(quotes.into_iter().collect()),
            remote: RemoteOutcome::Disabled,
        }
    }

    /// A uniformly random quote. Draws are independent.
    pub fn pick(&self) -> Result<&str> {
        self.quotes
            .choose(&mut rand::rng())
            .map(String::as_str)
            .ok_or(AppError::EmptyCache)
    }

    pub fn quotes(&self) -> &[String] {
        &self.quotes
    }

    pub fn remote(&self) -> &RemoteOutcome {
        &self.remote
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Built-in then custom quotes, capped at [`MAX_LOCAL_QUOTES`] (earliest kept).
pub fn local_quotes(sources: &QuoteSources) -> Vec<String> {
    let mut quotes: Vec<String> = read_quote_file(&sources.builtin);
    if let Some(custom) = &sources.custom {
        quotes.extend(read_quote_file(custom));
    }
    quotes.truncate(MAX_LOCAL_QUOTES);
    quotes
}

pub fn split_quotes(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(QUOTE_SEPARATOR)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(String::from)
}

/// Write the bundled quotes to `path` unless something is already there.
pub fn seed_builtin(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AppError::from_write(parent, e))?;
    }
    std::fs::write(path, BUNDLED_QUOTES).map_err(|e| AppError::from_write(path, e))?;
    tracing::debug!("Seeded quotes at {}", path.display());
    Ok(())
}

fn read_quote_file(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => split_quotes(&text).collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to read quotes from {}: {e}", path.display());
            Vec::new()
        }
    }
}

fn dedupe(quotes: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(quotes.len());
    quotes.into_iter().filter(|q| seen.insert(q.clone())).collect()
}
