//! CQL page search.

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::error::ExportError;
use crate::model::parse_id;
use crate::registry::Registry;

const SEARCH_PAGE_SIZE: usize = 25;

/// Search criteria, combined with `AND`.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Free CQL query.
    pub query: Option<String>,
    pub space: Option<String>,
    pub title: Option<String>,
    pub label: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
}

impl SearchOptions {
    /// Build the CQL query.
    ///
    /// Without a free query the result is restricted to pages.
    pub fn build_cql(&self) -> String {
        let criteria = [
            ("space =", &self.space),
            ("title ~", &self.title),
            ("label =", &self.label),
            ("content ~", &self.content),
            ("author =", &self.author),
        ];

        let mut parts: Vec<String> = criteria
            .iter()
            .filter_map(|(op, value)| {
                let value = value.as_deref().filter(|v| !v.is_empty())?;
                Some(format!("{op} '{value}'"))
            })
            .collect();

        let query = self.query.as_deref().filter(|q| !q.is_empty());
        if let Some(query) = query {
            parts.push(query.to_owned());
        }

        let Some((first, rest)) = parts.split_first() else {
            return "type = page".to_owned();
        };

        let mut cql = if rest.is_empty() {
            first.clone()
        } else {
            format!("({first}) AND {}", rest.join(" AND "))
        };

        if query.is_none() && !cql.to_lowercase().contains("type = page") {
            cql = format!("({cql}) AND type = page");
        }
        cql
    }
}

/// Restrict a query to pages.
pub fn normalize_query(cql: &str) -> String {
    let lower = cql.to_lowercase();

    if !lower.contains("type") {
        if cql.trim().is_empty() {
            return "type = page".to_owned();
        }
        return format!("({cql}) AND type = page");
    }

    if !lower.contains("type = page") && !lower.contains("type=page") {
        warn!("Query selects content other than pages; restricting to pages");
        return format!("({cql}) AND type = page");
    }

    cql.to_owned()
}

/// Page IDs matched by a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    /// Query as executed.
    pub query: String,
    /// Matched page IDs, deduplicated and sorted.
    pub page_ids: Vec<u64>,
    /// Total hits reported by the server.
    pub total_size: usize,
}

/// Run a CQL search and collect up to `limit` page IDs.
///
/// Hits that are not pages are ignored. A rejected query is reported as
/// [`ExportError::InvalidQuery`].
pub fn search(registry: &Registry, cql: &str, limit: usize) -> Result<SearchResults, ExportError> {
    let query = normalize_query(cql);
    info!("Executing CQL query: {}", query);

    let mut ids = BTreeSet::new();
    let mut total_size = 0;
    let mut start = 0;

    while start < limit {
        let batch_limit = SEARCH_PAGE_SIZE.min(limit - start);
        let response = match registry.source().search(&query, start, batch_limit) {
            Ok(response) => response,
            Err(e) if e.status() == Some(400) => {
                return Err(ExportError::InvalidQuery(query));
            }
            Err(e) => return Err(e.into()),
        };

        let mut found = 0;
        for content in response.results.iter().filter_map(|r| r.content.as_ref()) {
            if content.content_type != "page" {
                continue;
            }
            match parse_id(&content.id) {
                Ok(id) => {
                    ids.insert(id);
                    found += 1;
                }
                Err(e) => warn!("Skipping search hit: {}", e),
            }
        }

        total_size = response.total_size.unwrap_or(total_size);
        info!("Retrieved {} pages from {} results", found, response.size);

        if response.size == 0 || found == 0 {
            break;
        }
        start += response.size;
    }

    Ok(SearchResults {
        query,
        page_ids: ids.into_iter().collect(),
        total_size,
    })
}
