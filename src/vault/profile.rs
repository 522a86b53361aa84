use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Personal identifiers used when filling in opt-out requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub full_name: String,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub usernames: Vec<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub addresses: Vec<String>,
}

impl UserProfile {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(AppError::InvalidInput("full name cannot be empty".into()));
        }
        Ok(())
    }
}

/// Split a comma-separated answer into trimmed, non-empty entries.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Show the first and last character only, e.g. `j******e`.
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    match chars.len() {
        0 => String::new(),
        1 | 2 => "*".repeat(chars.len()),
        n => {
            let mut out = String::with_capacity(n);
            out.push(chars[0]);
            out.extend(std::iter::repeat_n('*', n - 2));
            out.push(chars[n - 1]);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" a@x.com, ,b@y.org ,"),
            vec!["a@x.com".to_string(), "b@y.org".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("jane@example.com"), "j**************m");
        assert_eq!(mask("ab"), "**");
        assert_eq!(mask(""), "");
    }

    #[test]
    fn test_validate_requires_full_name() {
        assert!(UserProfile::new("Jane Doe").validate().is_ok());
        assert!(matches!(
            UserProfile::new("  ").validate(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let p: UserProfile = serde_json::from_str(r#"{"full_name":"Jane Doe"}"#).unwrap();
        assert_eq!(p, UserProfile::new("Jane Doe"));
    }
}
