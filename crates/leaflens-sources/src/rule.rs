//! Authority rule types and configuration schema.
//!
//! An `AuthorityConfig` is deserialized from TOML and holds an ordered list
//! of `AuthorityRule`s. Rules are evaluated in declaration order and the
//! first matching rule wins. A source no rule matches gets `default_tier`.

use serde::{Deserialize, Serialize};

use leaflens_contracts::outcome::SourceAuthority;

/// A single authority rule loaded from TOML.
///
/// `host` is a dotted pattern where `*` stands for one or more labels:
///
/// ```toml
/// host = "*.edu"          # extension.umn.edu, umn.edu
/// host = "*.ac.*"         # ox.ac.uk, u-tokyo.ac.jp
/// host = "rhs.org.uk"     # exactly that host
/// host = "*"              # anything
/// ```
///
/// A leading `*.` also matches the bare domain, so `*.fao.org` covers both
/// `fao.org` and `www.fao.org`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityRule {
    /// Stable identifier used in logs.
    pub id: String,

    #[serde(default)]
    pub description: String,

    /// Host pattern, case-insensitive.
    pub host: String,

    pub tier: SourceAuthority,
}

impl AuthorityRule {
    /// Return true if this rule's pattern matches `host`.
    pub fn matches(&self, host: &str) -> bool {
        let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
        if host.is_empty() {
            return false;
        }
        let pattern = self.host.trim().to_ascii_lowercase();
        if pattern == "*" {
            return true;
        }
        if let Some(bare) = pattern.strip_prefix("*.") {
            if !bare.contains('*') && host == bare {
                return true;
            }
        }

        let pattern: Vec<&str> = pattern.split('.').collect();
        let labels: Vec<&str> = host.split('.').collect();
        glob_labels(&pattern, &labels)
    }
}

/// `*` matches one or more labels; any other segment matches exactly one.
fn glob_labels(pattern: &[&str], labels: &[&str]) -> bool {
    match pattern.split_first() {
        None => labels.is_empty(),
        Some((&"*", rest)) => (1..=labels.len()).any(|k| glob_labels(rest, &labels[k..])),
        Some((segment, rest)) => labels
            .split_first()
            .is_some_and(|(label, tail)| segment == label && glob_labels(rest, tail)),
    }
}

/// The top-level structure deserialized from a TOML sources file.
///
/// ```toml
/// default_tier = "tertiary"
///
/// [[rules]]
/// id = "edu"
/// description = "Universities and their extension services"
/// host = "*.edu"
/// tier = "primary"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityConfig {
    /// Tier for sources no rule matches.
    #[serde(default)]
    pub default_tier: SourceAuthority,

    /// Ordered list of rules. First match wins.
    #[serde(default)]
    pub rules: Vec<AuthorityRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(host: &str) -> AuthorityRule {
        AuthorityRule {
            id: "r".to_string(),
            description: String::new(),
            host: host.to_string(),
            tier: SourceAuthority::Primary,
        }
    }

    #[test]
    fn leading_wildcard_matches_subdomains_and_bare_domain() {
        let r = rule("*.edu");
        assert!(r.matches("extension.umn.edu"));
        assert!(r.matches("umn.edu"));
        assert!(r.matches("ipm.ucanr.edu"));
        assert!(!r.matches("edu.example.com"));
        assert!(!r.matches("example.education"));
    }

    #[test]
    fn inner_wildcard_spans_labels() {
        let r = rule("*.ac.*");
        assert!(r.matches("ox.ac.uk"));
        assert!(r.matches("www.plant.u-tokyo.ac.jp"));
        assert!(!r.matches("ac.uk"));
        assert!(!r.matches("example.com"));
    }

    #[test]
    fn exact_pattern_is_case_insensitive() {
        let r = rule("RHS.org.uk");
        assert!(r.matches("rhs.org.uk"));
        assert!(r.matches("RHS.ORG.UK."));
        assert!(!r.matches("www.rhs.org.uk"));
    }

    #[test]
    fn star_matches_everything_but_empty() {
        let r = rule("*");
        assert!(r.matches("anything.example"));
        assert!(!r.matches(""));
    }
}
