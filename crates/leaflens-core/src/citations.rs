//! Grounding citation cleanup.
//!
//! Raw citations from the backend are deduplicated by URI (first occurrence
//! wins), tagged with an authority tier, optionally reordered by tier, and
//! truncated to the configured cap.

use std::collections::HashSet;

use leaflens_contracts::{generation::RawCitation, outcome::Citation};

use crate::{config::CitationOrder, traits::AuthorityRanker};

/// Turn raw grounding citations into the outcome's citation list.
///
/// Citations with a blank URI are dropped. A blank title falls back to the
/// URI host so every entry stays displayable.
pub fn rank_citations(
    raw: &[RawCitation],
    ranker: &dyn AuthorityRanker,
    cap: usize,
    order: CitationOrder,
) -> Vec<Citation> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut citations: Vec<Citation> = raw
        .iter()
        .filter(|c| !c.uri.trim().is_empty())
        .filter(|c| seen.insert(c.uri.trim()))
        .map(|c| Citation {
            title: display_title(c),
            uri: c.uri.trim().to_string(),
            authority: ranker.authority(c),
        })
        .collect();

    if order == CitationOrder::Authority {
        // sort_by_key is stable: equal tiers keep discovery order.
        citations.sort_by_key(|c| c.authority);
    }

    citations.truncate(cap);
    citations
}

/// Host part of a URI, without scheme, port, path or a leading `www.`.
pub fn uri_host(uri: &str) -> &str {
    let rest = uri.split_once("://").map(|(_, r)| r).unwrap_or(uri);
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(rest);
    let host = host.rsplit_once('@').map(|(_, h)| h).unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);
    host.strip_prefix("www.").unwrap_or(host)
}

fn display_title(citation: &RawCitation) -> String {
    let title = citation.title.trim();
    if title.is_empty() {
        uri_host(citation.uri.trim()).to_string()
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use leaflens_contracts::outcome::SourceAuthority;

    use super::*;

    /// Ranks by host suffix: `.edu` primary, `.org` secondary, rest tertiary.
    struct SuffixRanker;

    impl AuthorityRanker for SuffixRanker {
        fn authority(&self, citation: &RawCitation) -> SourceAuthority {
            let host = uri_host(&citation.uri);
            if host.ends_with(".edu") {
                SourceAuthority::Primary
            } else if host.ends_with(".org") {
                SourceAuthority::Secondary
            } else {
                SourceAuthority::Tertiary
            }
        }
    }

    fn raw(title: &str, uri: &str) -> RawCitation {
        RawCitation::new(title, uri)
    }

    #[test]
    fn duplicates_are_dropped_first_seen_wins() {
        let input = vec![
            raw("A first", "https://a.example.com/x"),
            raw("B", "https://b.example.com/y"),
            raw("A again", "https://a.example.com/x"),
        ];
        let out = rank_citations(&input, &SuffixRanker, 5, CitationOrder::Discovery);
        let uris: Vec<&str> = out.iter().map(|c| c.uri.as_str()).collect();
        assert_eq!(uris, vec!["https://a.example.com/x", "https://b.example.com/y"]);
        assert_eq!(out[0].title, "A first");
    }

    #[test]
    fn output_never_exceeds_cap() {
        let input: Vec<RawCitation> = (0..10)
            .map(|i| raw(&format!("src {i}"), &format!("https://s{i}.example.com")))
            .collect();
        for cap in 3..=5 {
            let out = rank_citations(&input, &SuffixRanker, cap, CitationOrder::Discovery);
            assert_eq!(out.len(), cap);
            assert_eq!(out[0].title, "src 0");
        }
    }

    #[test]
    fn dedup_happens_before_truncation() {
        let input = vec![
            raw("A", "https://a.com"),
            raw("A", "https://a.com"),
            raw("A", "https://a.com"),
            raw("B", "https://b.com"),
            raw("C", "https://c.com"),
            raw("D", "https://d.com"),
        ];
        let out = rank_citations(&input, &SuffixRanker, 3, CitationOrder::Discovery);
        let titles: Vec<&str> = out.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn authority_order_is_stable_within_tier() {
        let input = vec![
            raw("blog one", "https://blog.example.com/1"),
            raw("society", "https://rhs.org/pests"),
            raw("extension one", "https://extension.umn.edu/a"),
            raw("blog two", "https://blog2.example.com/2"),
            raw("extension two", "https://ipm.ucanr.edu/b"),
        ];
        let out = rank_citations(&input, &SuffixRanker, 5, CitationOrder::Authority);
        let titles: Vec<&str> = out.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["extension one", "extension two", "society", "blog one", "blog two"]
        );
    }

    #[test]
    fn discovery_order_keeps_tiers_interleaved() {
        let input = vec![
            raw("blog", "https://blog.example.com"),
            raw("extension", "https://extension.umn.edu"),
        ];
        let out = rank_citations(&input, &SuffixRanker, 5, CitationOrder::Discovery);
        assert_eq!(out[0].authority, SourceAuthority::Tertiary);
        assert_eq!(out[1].authority, SourceAuthority::Primary);
    }

    #[test]
    fn blank_uris_dropped_and_blank_titles_filled() {
        let input = vec![raw("nothing", "  "), raw("", "https://www.extension.psu.edu/tomato")];
        let out = rank_citations(&input, &SuffixRanker, 5, CitationOrder::Discovery);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "extension.psu.edu");
    }

    #[test]
    fn uri_host_strips_scheme_port_and_path() {
        assert_eq!(uri_host("https://www.rhs.org.uk/disease/blight?x=1"), "rhs.org.uk");
        assert_eq!(uri_host("http://user@ipm.ucanr.edu:8080/a"), "ipm.ucanr.edu");
        assert_eq!(uri_host("extension.umn.edu/path"), "extension.umn.edu");
    }
}
