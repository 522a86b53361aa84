use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Pending,
    Completed,
}

impl Status {
    /// Case-insensitive parse. Returns `None` for text that is neither status.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("pending") {
            Some(Status::Pending)
        } else if s.eq_ignore_ascii_case("completed") {
            Some(Status::Completed)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Completed => "Completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of service identifiers covering a broker.
///
/// Stored as a `;`-separated list. Both `;` and `,` are accepted on read since
/// hand-edited files use either.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct CoveredBy(Vec<String>);

impl CoveredBy {
    pub fn parse(s: &str) -> Self {
        let mut services: Vec<String> = Vec::new();
        for part in s.split([';', ',']) {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if !services.iter().any(|s| s.eq_ignore_ascii_case(part)) {
                services.push(part.to_string());
            }
        }
        Self(services)
    }

    pub fn single(service: impl Into<String>) -> Self {
        Self(vec![service.into()])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn services(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, service: &str) -> bool {
        self.0.iter().any(|s| s.eq_ignore_ascii_case(service))
    }
}

impl fmt::Display for CoveredBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(";"))
    }
}

impl From<CoveredBy> for String {
    fn from(c: CoveredBy) -> Self {
        c.to_string()
    }
}

impl From<String> for CoveredBy {
    fn from(s: String) -> Self {
        CoveredBy::parse(&s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerRecord {
    pub name: String,
    pub opt_out_link: String,
    pub covered_by: CoveredBy,
    pub status: Status,
    /// Cells of columns this tool does not know about, as `(header, value)`
    /// in file order. Headers may be blank or repeated.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub extra: Vec<(String, String)>,
}

impl BrokerRecord {
    pub fn new(name: impl Into<String>, opt_out_link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            opt_out_link: opt_out_link.into(),
            ..Default::default()
        }
    }

    /// First non-empty value under `column`.
    pub fn extra(&self, column: &str) -> Option<&str> {
        self.extra
            .iter()
            .filter(|(header, _)| header == column)
            .map(|(_, value)| value.as_str())
            .find(|v| !v.is_empty())
    }

    /// Overwrite the first `column` cell, or append one if the record has none.
    pub fn set_extra(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.extra.iter_mut().find(|(header, _)| *header == column) {
            Some((_, slot)) => *slot = value,
            None => self.extra.push((column, value)),
        }
    }
}
