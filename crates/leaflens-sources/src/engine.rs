//! TOML-driven authority ranker.
//!
//! `TomlAuthorityRanker` loads an `AuthorityConfig` from a TOML string or
//! file and implements the `AuthorityRanker` trait from leaflens-core.
//!
//! Ranking algorithm:
//!
//! 1. Take the citation's URI host. Grounding URIs are often redirect links
//!    whose title carries the real domain, so the title is a second candidate
//!    when it looks like a host name.
//! 2. Iterate rules in declaration order; the first rule matching any
//!    candidate decides the tier.
//! 3. If no rule matched, return `default_tier` (tertiary unless configured).

use std::path::Path;

use tracing::debug;

use leaflens_contracts::{
    error::{LeafLensError, LeafLensResult},
    generation::RawCitation,
    outcome::SourceAuthority,
};
use leaflens_core::{citations::uri_host, traits::AuthorityRanker};

use crate::rule::AuthorityConfig;

const BUILTIN_RULES: &str = include_str!("../sources/default.toml");

/// An `AuthorityRanker` that reads host rules from a TOML document.
///
/// ```rust,ignore
/// use leaflens_sources::engine::TomlAuthorityRanker;
///
/// let ranker = TomlAuthorityRanker::from_file(Path::new("sources/regional.toml"))?;
/// ```
#[derive(Debug)]
pub struct TomlAuthorityRanker {
    config: AuthorityConfig,
}

impl TomlAuthorityRanker {
    /// Parse `s` as TOML and build a ranker.
    ///
    /// Returns `LeafLensError::ConfigError` if the TOML is malformed, does
    /// not match `AuthorityConfig`, or contains a rule with an empty pattern.
    pub fn from_toml_str(s: &str) -> LeafLensResult<Self> {
        let config: AuthorityConfig = toml::from_str(s).map_err(|e| LeafLensError::ConfigError {
            reason: format!("failed to parse sources TOML: {}", e),
        })?;
        if let Some(rule) = config.rules.iter().find(|r| r.host.trim().is_empty()) {
            return Err(LeafLensError::ConfigError {
                reason: format!("sources rule '{}' has an empty host pattern", rule.id),
            });
        }
        Ok(Self { config })
    }

    /// Read the file at `path` and parse it as a sources configuration.
    pub fn from_file(path: &Path) -> LeafLensResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| LeafLensError::ConfigError {
            reason: format!("failed to read sources file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The built-in rule set: extension, government and research domains
    /// primary, a short list of horticultural societies secondary.
    pub fn builtin() -> LeafLensResult<Self> {
        Self::from_toml_str(BUILTIN_RULES)
    }

    pub fn rule_count(&self) -> usize {
        self.config.rules.len()
    }
}

fn candidates(citation: &RawCitation) -> Vec<&str> {
    let mut hosts = vec![uri_host(citation.uri.trim())];
    let title = citation.title.trim();
    let looks_like_host = title.contains('.') && !title.contains(char::is_whitespace);
    if looks_like_host {
        hosts.push(uri_host(title));
    }
    hosts
}

impl AuthorityRanker for TomlAuthorityRanker {
    fn authority(&self, citation: &RawCitation) -> SourceAuthority {
        let hosts = candidates(citation);
        for rule in &self.config.rules {
            if let Some(host) = hosts.iter().find(|h| rule.matches(h)) {
                debug!(rule_id = %rule.id, host = %host, tier = ?rule.tier, "source rule matched");
                return rule.tier;
            }
        }
        debug!(uri = %citation.uri, tier = ?self.config.default_tier, "no source rule matched");
        self.config.default_tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, uri: &str) -> RawCitation {
        RawCitation::new(title, uri)
    }

    // ── Built-in rules ───────────────────────────────────────────────────────

    #[test]
    fn builtin_rules_parse() {
        let ranker = TomlAuthorityRanker::builtin().unwrap();
        assert!(ranker.rule_count() > 5);
    }

    #[test]
    fn builtin_tiers() {
        let ranker = TomlAuthorityRanker::builtin().unwrap();
        let tier = |uri: &str| ranker.authority(&raw("", uri));

        assert_eq!(tier("https://extension.umn.edu/plant-diseases/early-blight"), SourceAuthority::Primary);
        assert_eq!(tier("https://www.ars.usda.gov/news"), SourceAuthority::Primary);
        assert_eq!(tier("https://planthealthportal.defra.gov.uk/pests"), SourceAuthority::Primary);
        assert_eq!(tier("https://www.plantsci.cam.ac.uk/x"), SourceAuthority::Primary);
        assert_eq!(tier("https://www.fao.org/plant-production"), SourceAuthority::Primary);
        assert_eq!(tier("https://www.rhs.org.uk/disease/tomato-blight"), SourceAuthority::Secondary);
        assert_eq!(tier("https://www.apsnet.org/edcenter"), SourceAuthority::Secondary);
        assert_eq!(tier("https://www.gardening-blog.example.com/spots"), SourceAuthority::Tertiary);
    }

    #[test]
    fn redirect_uri_falls_back_to_title_domain() {
        let ranker = TomlAuthorityRanker::builtin().unwrap();
        let citation = raw(
            "ucanr.edu",
            "https://vertexaisearch.cloud.google.com/grounding-api-redirect/AbC123",
        );
        assert_eq!(ranker.authority(&citation), SourceAuthority::Primary);

        let prose_title = raw(
            "Early blight of tomato. Some guide",
            "https://vertexaisearch.cloud.google.com/grounding-api-redirect/XyZ",
        );
        assert_eq!(ranker.authority(&prose_title), SourceAuthority::Tertiary);
    }

    // ── Custom configuration ─────────────────────────────────────────────────

    #[test]
    fn first_match_wins() {
        let toml = r#"
            [[rules]]
            id = "demote-one-campus"
            host = "blog.example.edu"
            tier = "tertiary"

            [[rules]]
            id = "edu"
            host = "*.edu"
            tier = "primary"
        "#;

        let ranker = TomlAuthorityRanker::from_toml_str(toml).unwrap();
        assert_eq!(
            ranker.authority(&raw("", "https://blog.example.edu/post")),
            SourceAuthority::Tertiary
        );
        assert_eq!(
            ranker.authority(&raw("", "https://extension.example.edu/")),
            SourceAuthority::Primary
        );
    }

    #[test]
    fn default_tier_is_configurable() {
        let toml = r#"
            default_tier = "secondary"
        "#;
        let ranker = TomlAuthorityRanker::from_toml_str(toml).unwrap();
        assert_eq!(ranker.rule_count(), 0);
        assert_eq!(
            ranker.authority(&raw("", "https://anything.example.com")),
            SourceAuthority::Secondary
        );
    }

    #[test]
    fn empty_host_pattern_is_rejected() {
        let toml = r#"
            [[rules]]
            id = "broken"
            host = "  "
            tier = "primary"
        "#;

        match TomlAuthorityRanker::from_toml_str(toml) {
            Err(LeafLensError::ConfigError { reason }) => assert!(reason.contains("broken")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn unknown_tier_is_config_error() {
        let toml = r#"
            [[rules]]
            id = "x"
            host = "*.edu"
            tier = "quaternary"
        "#;
        assert!(matches!(
            TomlAuthorityRanker::from_toml_str(toml),
            Err(LeafLensError::ConfigError { .. })
        ));
    }

    #[test]
    fn toml_parse_error() {
        match TomlAuthorityRanker::from_toml_str("this is not valid toml ][[[") {
            Err(LeafLensError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse sources TOML"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_config_error() {
        let result = TomlAuthorityRanker::from_file(Path::new("/nonexistent/sources.toml"));
        assert!(matches!(result, Err(LeafLensError::ConfigError { .. })));
    }
}
