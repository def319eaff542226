//! Name resolution - free-text location names to catalog point IDs
//!
//! Matching runs as a cascade from strictest to loosest, first success wins:
//! exact name, alias, weighted keywords, all keywords contained, substring,
//! reverse substring, and finally the address. A loose match is preferred
//! over no match at all, the same tolerance a map search box shows.

use crate::catalog::{AliasTable, Point, PointCatalog};
use crate::core::types::PointId;
use serde::Serialize;
use std::sync::Arc;

/// Cascade stage that produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    /// Case-insensitive equality with the point name
    Exact,
    /// Alias table hit whose canonical fragment appears in the name
    Alias,
    /// Highest keyword overlap score across the catalog
    WeightedKeyword,
    /// Every query keyword appears inside the name
    AllKeywords,
    /// The whole query appears inside the name
    Substring,
    /// At least one query keyword appears inside the name
    ReverseSubstring,
    /// The whole query appears inside the address
    Address,
}

impl MatchStage {
    /// Evaluation order
    pub const CASCADE: [MatchStage; 7] = [
        Self::Exact,
        Self::Alias,
        Self::WeightedKeyword,
        Self::AllKeywords,
        Self::Substring,
        Self::ReverseSubstring,
        Self::Address,
    ];
}

/// A successful resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub point_id: PointId,
    /// Display name of the resolved point
    pub name: String,
    pub stage: MatchStage,
    /// Keyword score, only set for `MatchStage::WeightedKeyword`
    pub score: Option<u32>,
}

/// Lowercased name/address of one catalog point, computed once
struct IndexedPoint {
    name: String,
    keywords: Vec<String>,
    address: Option<String>,
}

/// Normalized query text
struct Query {
    text: String,
    keywords: Vec<String>,
}

/// Resolves location names against a catalog snapshot
pub struct NameResolver {
    catalog: Arc<PointCatalog>,
    aliases: Arc<AliasTable>,
    index: Vec<IndexedPoint>,
}

impl NameResolver {
    pub fn new(catalog: Arc<PointCatalog>, aliases: Arc<AliasTable>) -> Self {
        let index = catalog
            .iter()
            .map(|p| {
                let name = p.name.trim().to_lowercase();
                let keywords = tokenize(&name);
                IndexedPoint {
                    name,
                    keywords,
                    address: p.address.as_ref().map(|a| a.trim().to_lowercase()),
                }
            })
            .collect();

        Self { catalog, aliases, index }
    }

    /// Resolver without an alias table
    pub fn without_aliases(catalog: Arc<PointCatalog>) -> Self {
        Self::new(catalog, Arc::new(AliasTable::new()))
    }

    pub fn catalog(&self) -> &PointCatalog {
        &self.catalog
    }

    /// Resolve a free-text location to a catalog point
    ///
    /// Blank input never resolves.
    pub fn resolve(&self, text: &str) -> Option<Resolution> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }
        let query = Query { keywords: tokenize(&text), text };

        for stage in MatchStage::CASCADE {
            if let Some((index, score)) = self.attempt(stage, &query) {
                let point = &self.catalog.list_points()[index];
                tracing::debug!(
                    "Resolved {:?} to {} ({}) via {:?}",
                    query.text,
                    point.id,
                    point.name,
                    stage
                );
                return Some(Resolution {
                    point_id: point.id.clone(),
                    name: point.name.clone(),
                    stage,
                    score,
                });
            }
        }

        tracing::debug!("No point matches {:?}", query.text);
        None
    }

    /// Resolve straight to the catalog point
    pub fn resolve_point(&self, text: &str) -> Option<&Point> {
        let resolution = self.resolve(text)?;
        self.catalog.get(&resolution.point_id)
    }

    /// Run one cascade stage, returning the catalog index of the match
    fn attempt(&self, stage: MatchStage, query: &Query) -> Option<(usize, Option<u32>)> {
        let found = match stage {
            MatchStage::Exact => self.position(|p| p.name == query.text),
            MatchStage::Alias => {
                let canonical = self.aliases.lookup(&query.text)?;
                self.position(|p| p.name.contains(canonical))
            }
            MatchStage::WeightedKeyword => {
                return self.best_keyword_match(&query.keywords).map(|(i, s)| (i, Some(s)));
            }
            MatchStage::AllKeywords => {
                self.position(|p| query.keywords.iter().all(|k| p.name.contains(k.as_str())))
            }
            MatchStage::Substring => self.position(|p| p.name.contains(&query.text)),
            MatchStage::ReverseSubstring => {
                self.position(|p| query.keywords.iter().any(|k| p.name.contains(k.as_str())))
            }
            MatchStage::Address => self.position(|p| {
                p.address.as_ref().is_some_and(|a| a.contains(&query.text))
            }),
        };
        found.map(|i| (i, None))
    }

    fn position<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&IndexedPoint) -> bool,
    {
        self.index.iter().position(predicate)
    }

    /// Highest positive keyword score; ties keep the earlier catalog entry
    fn best_keyword_match(&self, keywords: &[String]) -> Option<(usize, u32)> {
        let mut best: Option<(usize, u32)> = None;
        for (i, point) in self.index.iter().enumerate() {
            let score = keyword_score(keywords, &point.keywords);
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((i, score));
            }
        }
        best
    }
}

/// Score a query against a point's name keywords
///
/// Each query keyword earns 2 when it equals a name keyword, otherwise 1
/// when it is contained in some name keyword.
pub fn keyword_score(query: &[String], name: &[String]) -> u32 {
    query
        .iter()
        .map(|q| {
            if name.iter().any(|n| n == q) {
                2
            } else if name.iter().any(|n| n.contains(q.as_str())) {
                1
            } else {
                0
            }
        })
        .sum()
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::LngLat;

    fn catalog(points: &[(&str, &str)]) -> Arc<PointCatalog> {
        Arc::new(PointCatalog::new(
            points
                .iter()
                .map(|(id, name)| Point::new(*id, *name, LngLat::new(118.6, 32.0)))
                .collect(),
        ))
    }

    fn words(s: &str) -> Vec<String> {
        tokenize(s)
    }

    #[test]
    fn test_exact_match_ignores_case() {
        let resolver = NameResolver::without_aliases(catalog(&[("1", "Main Library"), ("2", "East Gym")]));
        let r = resolver.resolve("east GYM").unwrap();
        assert_eq!(r.point_id, PointId::new("2"));
        assert_eq!(r.stage, MatchStage::Exact);
    }

    #[test]
    fn test_padded_name_resolves_exactly() {
        let resolver = NameResolver::without_aliases(catalog(&[("1", "Gym Annex"), ("2", " Gym ")]));
        let r = resolver.resolve(" Gym ").unwrap();
        assert_eq!(r.point_id, PointId::new("2"));
        assert_eq!(r.stage, MatchStage::Exact);
        // Display name is left as stored
        assert_eq!(r.name, " Gym ");
    }

    #[test]
    fn test_exact_beats_keyword() {
        // "gym" scores against both, but the exact name wins first
        let resolver = NameResolver::without_aliases(catalog(&[("1", "Gym Annex"), ("2", "Gym")]));
        let r = resolver.resolve("gym").unwrap();
        assert_eq!(r.point_id, PointId::new("2"));
        assert_eq!(r.stage, MatchStage::Exact);
    }

    #[test]
    fn test_alias_match() {
        let aliases = AliasTable::from_pairs([("the stacks", "library")]);
        let resolver = NameResolver::new(
            catalog(&[("1", "East Gym"), ("2", "Main Library")]),
            Arc::new(aliases),
        );
        let r = resolver.resolve("The Stacks").unwrap();
        assert_eq!(r.point_id, PointId::new("2"));
        assert_eq!(r.stage, MatchStage::Alias);
    }

    #[test]
    fn test_alias_without_matching_point_falls_through() {
        let aliases = AliasTable::from_pairs([("gym", "stadium")]);
        let resolver = NameResolver::new(catalog(&[("1", "East Gym")]), Arc::new(aliases));
        let r = resolver.resolve("gym").unwrap();
        assert_eq!(r.stage, MatchStage::WeightedKeyword);
    }

    #[test]
    fn test_keyword_score_weights() {
        assert_eq!(keyword_score(&words("library"), &words("main library")), 2);
        assert_eq!(keyword_score(&words("lib"), &words("main library")), 1);
        assert_eq!(keyword_score(&words("main lib"), &words("main library")), 3);
        assert_eq!(keyword_score(&words("pool"), &words("main library")), 0);
    }

    #[test]
    fn test_weighted_keyword_picks_highest() {
        let resolver = NameResolver::without_aliases(catalog(&[
            ("1", "Science Hall"),
            ("2", "Science Library"),
            ("3", "Main Library"),
        ]));
        let r = resolver.resolve("science library").unwrap();
        assert_eq!(r.point_id, PointId::new("2"));
        assert_eq!(r.stage, MatchStage::WeightedKeyword);
        assert_eq!(r.score, Some(4));
    }

    #[test]
    fn test_weighted_keyword_tie_keeps_first_seen() {
        // Both names score 2 for "library"; catalog order decides.
        let resolver = NameResolver::without_aliases(catalog(&[
            ("1", "North Library"),
            ("2", "South Library"),
        ]));
        assert_eq!(resolver.resolve("library").unwrap().point_id, PointId::new("1"));

        let reversed = NameResolver::without_aliases(catalog(&[
            ("2", "South Library"),
            ("1", "North Library"),
        ]));
        assert_eq!(reversed.resolve("library").unwrap().point_id, PointId::new("2"));
    }

    #[test]
    fn test_unsegmented_script_resolves_by_substring() {
        // No whitespace: query and name are one keyword each, so only the
        // containment half of the keyword score can fire.
        let resolver = NameResolver::without_aliases(catalog(&[("1", "图书馆"), ("2", "体育馆")]));
        let r = resolver.resolve("图书").unwrap();
        assert_eq!(r.point_id, PointId::new("1"));
        assert_eq!(r.stage, MatchStage::WeightedKeyword);
        assert_eq!(r.score, Some(1));
    }

    fn query(text: &str) -> Query {
        Query { text: text.to_string(), keywords: tokenize(text) }
    }

    #[test]
    fn test_loose_stages_in_isolation() {
        // With whitespace tokens these stages are shadowed by the keyword
        // score, so exercise them one at a time.
        let resolver = NameResolver::without_aliases(catalog(&[
            ("1", "Eastgate Canteen"),
            ("2", "Westgate Canteen"),
        ]));

        let all = resolver.attempt(MatchStage::AllKeywords, &query("west canteen"));
        assert_eq!(all, Some((1, None)));

        let sub = resolver.attempt(MatchStage::Substring, &query("gate can"));
        assert_eq!(sub, Some((0, None)));

        let reverse = resolver.attempt(MatchStage::ReverseSubstring, &query("pool westg"));
        assert_eq!(reverse, Some((1, None)));

        assert_eq!(resolver.attempt(MatchStage::Substring, &query("pool")), None);
    }

    #[test]
    fn test_address_match() {
        let points = vec![
            Point::new("1", "Main Library", LngLat::new(0.0, 0.0)).with_address("12 Weigang Road"),
            Point::new("2", "East Gym", LngLat::new(0.0, 0.0)).with_address("3 Tongwei Road"),
        ];
        let resolver = NameResolver::without_aliases(Arc::new(PointCatalog::new(points)));
        let r = resolver.resolve("3 tongwei").unwrap();
        assert_eq!(r.point_id, PointId::new("2"));
        assert_eq!(r.stage, MatchStage::Address);
    }

    #[test]
    fn test_not_found() {
        let resolver = NameResolver::without_aliases(catalog(&[("1", "Main Library"), ("2", "East Gym")]));
        assert!(resolver.resolve("zoo").is_none());
    }

    #[test]
    fn test_blank_input_not_found() {
        let resolver = NameResolver::without_aliases(catalog(&[("1", "Main Library")]));
        assert!(resolver.resolve("").is_none());
        assert!(resolver.resolve("   ").is_none());
    }

    #[test]
    fn test_empty_catalog_not_found() {
        let resolver = NameResolver::without_aliases(Arc::new(PointCatalog::empty()));
        assert!(resolver.resolve("library").is_none());
    }

    #[test]
    fn test_resolve_point() {
        let resolver = NameResolver::without_aliases(catalog(&[("1", "Main Library")]));
        assert_eq!(resolver.resolve_point("library").unwrap().name, "Main Library");
    }
}
