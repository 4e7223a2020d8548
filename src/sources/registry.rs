//! Registry for fanning queries across research sources.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{Paper, SearchQuery};
use crate::sources::Source;

/// A per-source diagnostic from a multi-source search.
///
/// Individual source failures are reported, not raised, so one misbehaving
/// backend cannot abort its siblings.
#[derive(Debug, Clone)]
pub struct SourceFailure {
    pub source: String,
    pub error: ApiError,
}

/// Merged outcome of a multi-source search.
#[derive(Debug, Clone, Default)]
pub struct MultiSearchResult {
    /// Successful papers, concatenated in source order.
    pub papers: Vec<Paper>,
    /// Sources that failed, with the taxonomy error each raised.
    pub failures: Vec<SourceFailure>,
}

/// Maps a case-insensitive source name to one adapter instance.
///
/// Adapters are stateless aside from held credentials and client handles,
/// so a single instance serves every call for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: HashMap<String, Arc<dyn Source>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: Arc<dyn Source>) {
        self.sources.insert(source.id().to_ascii_lowercase(), source);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Source>> {
        self.sources.get(&id.to_ascii_lowercase())
    }

    /// Get a source by name, or a non-retryable response error naming it.
    pub fn get_required(&self, id: &str) -> Result<&Arc<dyn Source>, ApiError> {
        self.get(id).ok_or_else(|| {
            ApiError::response(
                "registry",
                "unknown_source",
                format!("unknown source \"{}\"", id),
                false,
            )
        })
    }

    pub fn has(&self, id: &str) -> bool {
        self.sources.contains_key(&id.to_ascii_lowercase())
    }

    /// Registered source ids, sorted for stable output.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sources.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Fan a query out across the named sources.
    ///
    /// Sources are queried independently and sequentially; each failure
    /// (including an unknown source name) becomes a [`SourceFailure`]
    /// diagnostic instead of aborting the rest. The call as a whole fails
    /// only when no source yields any paper.
    pub async fn search(
        &self,
        sources: &[String],
        query: &SearchQuery,
    ) -> Result<MultiSearchResult, ApiError> {
        let mut result = MultiSearchResult::default();

        for name in sources {
            let source = match self.get_required(name) {
                Ok(source) => source,
                Err(error) => {
                    tracing::warn!(source = %name, %error, "skipping unknown source");
                    result.failures.push(SourceFailure {
                        source: name.clone(),
                        error,
                    });
                    continue;
                }
            };

            match source.search(query).await {
                Ok(papers) => {
                    tracing::debug!(source = source.id(), count = papers.len(), "source answered");
                    result.papers.extend(papers);
                }
                Err(error) => {
                    tracing::warn!(source = source.id(), %error, "source failed");
                    result.failures.push(SourceFailure {
                        source: source.id().to_string(),
                        error,
                    });
                }
            }
        }

        if result.papers.is_empty() {
            return Err(ApiError::response(
                "registry",
                "no_results",
                "no results found across all sources",
                true,
            ));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaperBuilder;
    use crate::sources::mock::MockSource;

    fn paper(id: &str, title: &str) -> Paper {
        PaperBuilder::new(id, title, "Mock").build()
    }

    fn registry_with(sources: Vec<MockSource>) -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        for source in sources {
            registry.register(Arc::new(source));
        }
        registry
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = registry_with(vec![MockSource::with_papers(
            "arxiv",
            vec![paper("1", "One")],
        )]);
        assert!(registry.get("ArXiv").is_some());
        assert!(registry.has("ARXIV"));
        assert!(registry.get("ieee").is_none());

        let err = registry.get_required("ieee").unwrap_err();
        assert_eq!(err.code(), "registry:unknown_source");
    }

    #[tokio::test]
    async fn partial_failure_returns_surviving_results() {
        let registry = registry_with(vec![
            MockSource::with_papers("arxiv", vec![paper("1", "Quantum One")]),
            MockSource::failing(
                "ieee",
                ApiError::quota("ieee", "rate_limited", "quota exceeded"),
            ),
        ]);

        let result = registry
            .search(
                &["arxiv".to_string(), "ieee".to_string()],
                &SearchQuery::new("quantum"),
            )
            .await
            .unwrap();

        assert_eq!(result.papers.len(), 1);
        assert_eq!(result.papers[0].title, "Quantum One");
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].source, "ieee");
        assert_eq!(result.failures[0].error.code(), "ieee:rate_limited");
    }

    #[tokio::test]
    async fn all_sources_failing_raises_no_results() {
        let registry = registry_with(vec![
            MockSource::failing("arxiv", ApiError::response("arxiv", "no_results", "none", true)),
            MockSource::failing("ieee", ApiError::auth("ieee", "invalid_api_key", "bad key")),
        ]);

        let err = registry
            .search(
                &["arxiv".to_string(), "ieee".to_string()],
                &SearchQuery::new("quantum"),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "registry:no_results");
        assert!(err.retryable());
    }

    #[tokio::test]
    async fn unknown_source_is_reported_not_raised() {
        let registry = registry_with(vec![MockSource::with_papers(
            "arxiv",
            vec![paper("1", "One")],
        )]);

        let result = registry
            .search(
                &["arxiv".to_string(), "scholar".to_string()],
                &SearchQuery::new("quantum"),
            )
            .await
            .unwrap();

        assert_eq!(result.papers.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].error.code(), "registry:unknown_source");
    }

    #[tokio::test]
    async fn results_concatenate_in_source_order() {
        let registry = registry_with(vec![
            MockSource::with_papers("arxiv", vec![paper("1", "A")]),
            MockSource::with_papers("ieee", vec![paper("2", "B"), paper("3", "C")]),
        ]);

        let result = registry
            .search(
                &["ieee".to_string(), "arxiv".to_string()],
                &SearchQuery::new("anything"),
            )
            .await
            .unwrap();

        let titles: Vec<&str> = result.papers.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C", "A"]);
        assert!(result.failures.is_empty());
    }
}
