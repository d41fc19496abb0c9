// Copyright 2025 Cowboy AI, LLC.

//! Persistence adapters executing specifications against stored records

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::EvaluatorConfig;
use crate::errors::CriteriaResult;
use crate::evaluator::{InMemoryQuery, SpecificationEvaluator};
use crate::specification::{Pagination, Specification};

/// Query result with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult<T> {
    /// The returned page of matches
    pub items: Vec<T>,
    /// Number of matches before paging
    pub total_count: usize,
    /// Whether matches exist past this page
    pub has_more: bool,
    /// Page metadata when the result was paged
    pub pagination: Option<Pagination>,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
    /// When the query ran
    pub executed_at: DateTime<Utc>,
}

impl<T> QueryResult<T> {
    /// Map the items to a different type
    pub fn map<U, F>(self, f: F) -> QueryResult<U>
    where
        F: FnMut(T) -> U,
    {
        QueryResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            has_more: self.has_more,
            pagination: self.pagination,
            execution_time_ms: self.execution_time_ms,
            executed_at: self.executed_at,
        }
    }
}

/// Repository that answers specifications
#[async_trait]
pub trait SpecificationRepository<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Matches of `spec`, shaped by its includes, ordering and paging
    async fn find(&self, spec: &Specification<T>) -> CriteriaResult<QueryResult<T>>;

    /// Number of records satisfying the criteria of `spec`
    async fn count(&self, spec: &Specification<T>) -> CriteriaResult<usize>;

    /// Whether any record satisfies the criteria of `spec`
    async fn exists(&self, spec: &Specification<T>) -> CriteriaResult<bool> {
        Ok(self.count(spec).await? > 0)
    }
}

/// In-memory repository keyed by record id, in insertion order
#[derive(Clone)]
pub struct InMemoryRepository<T> {
    records: Arc<RwLock<IndexMap<String, T>>>,
    evaluator: SpecificationEvaluator,
}

impl<T: Clone + Send + Sync + 'static> InMemoryRepository<T> {
    /// Create an empty repository with the default configuration
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
            evaluator: SpecificationEvaluator::default(),
        }
    }

    /// Create an empty repository with a validated configuration
    pub fn with_config(config: EvaluatorConfig) -> CriteriaResult<Self> {
        config.validate()?;
        Ok(Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
            evaluator: SpecificationEvaluator::new(config),
        })
    }

    /// Insert or replace a record, returning the previous one
    pub async fn insert(&self, id: impl Into<String>, record: T) -> Option<T> {
        self.records.write().await.insert(id.into(), record)
    }

    /// Remove a record
    pub async fn remove(&self, id: &str) -> Option<T> {
        self.records.write().await.shift_remove(id)
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// True when nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn snapshot(&self) -> Vec<T> {
        self.records.read().await.values().cloned().collect()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> SpecificationRepository<T> for InMemoryRepository<T> {
    async fn find(&self, spec: &Specification<T>) -> CriteriaResult<QueryResult<T>> {
        let started = Instant::now();
        let records = self.snapshot().await;

        let matched = self.evaluator.apply_matching(spec, InMemoryQuery::new(records));
        let total_count = matched.len();
        let items = self.evaluator.apply_window(spec, matched).into_items();

        let paging = spec.paging();
        let skip = paging.skip.unwrap_or(0);
        let take = self.evaluator.config().effective_take(paging.take);
        let pagination = take.map(|take| Pagination::for_window(skip, take, total_count));
        let has_more = skip.saturating_add(items.len()) < total_count;

        debug!(
            total_count,
            returned = items.len(),
            skip,
            "specification query completed"
        );

        Ok(QueryResult {
            items,
            total_count,
            has_more,
            pagination,
            execution_time_ms: started.elapsed().as_millis() as u64,
            executed_at: Utc::now(),
        })
    }

    async fn count(&self, spec: &Specification<T>) -> CriteriaResult<usize> {
        let records = self.snapshot().await;
        Ok(self
            .evaluator
            .apply_criteria(spec, InMemoryQuery::new(records))
            .len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::SortDirection;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Account {
        id: u32,
        balance: i64,
        frozen: bool,
    }

    async fn seeded(config: EvaluatorConfig) -> InMemoryRepository<Account> {
        let repo = InMemoryRepository::with_config(config).unwrap();
        for (id, balance, frozen) in [(1, 100, false), (2, -20, false), (3, 5000, true), (4, 75, false)] {
            repo.insert(format!("acct-{id}"), Account { id, balance, frozen }).await;
        }
        repo
    }

    #[tokio::test]
    async fn test_find_reports_totals_before_paging() {
        let repo = seeded(EvaluatorConfig::default()).await;
        let mut spec = Specification::<Account>::new();
        spec.filter(|a| !a.frozen);
        spec.order_by(|a| a.balance, SortDirection::Descending).take(2);

        let result = repo.find(&spec).await.unwrap();
        let ids: Vec<u32> = result.items.iter().map(|a| a.id).collect();

        assert_eq!(ids, vec![1, 4]);
        assert_eq!(result.total_count, 3);
        assert!(result.has_more);
        assert_eq!(result.pagination.unwrap().total_pages, 2);
    }

    #[tokio::test]
    async fn test_last_page_has_no_more() {
        let repo = seeded(EvaluatorConfig::default()).await;
        let mut spec = Specification::<Account>::new();
        spec.page(2, 3).unwrap();

        let result = repo.find(&spec).await.unwrap();
        assert_eq!(result.items.len(), 1);
        assert!(!result.has_more);
        assert!(!result.pagination.unwrap().has_next());
    }

    #[tokio::test]
    async fn test_count_and_exists() {
        let repo = seeded(EvaluatorConfig::default()).await;
        let mut overdrawn = Specification::<Account>::new();
        overdrawn.filter(|a| a.balance < 0);
        let mut huge = Specification::<Account>::new();
        huge.filter(|a| a.balance > 1_000_000);

        assert_eq!(repo.count(&overdrawn).await.unwrap(), 1);
        assert!(repo.exists(&overdrawn).await.unwrap());
        assert!(!repo.exists(&huge).await.unwrap());
        assert_eq!(repo.count(&Specification::new()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_skip_past_everything_is_an_empty_page() {
        let repo = seeded(EvaluatorConfig::default()).await;
        let mut spec = Specification::<Account>::new();
        spec.skip(usize::MAX).take(1);

        let result = repo.find(&spec).await.unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 4);
        assert!(!result.has_more);

        let pagination = result.pagination.unwrap();
        assert_eq!(pagination.total_pages, 4);
        assert!(!pagination.has_next());
    }

    #[tokio::test]
    async fn test_default_page_size_applies() {
        let config = EvaluatorConfig {
            default_page_size: Some(3),
            ..EvaluatorConfig::default()
        };
        let repo = seeded(config).await;

        let result = repo.find(&Specification::new()).await.unwrap();
        assert_eq!(result.items.len(), 3);
        assert_eq!(result.total_count, 4);
        assert!(result.has_more);
    }

    #[tokio::test]
    async fn test_insert_replace_remove() {
        let repo = InMemoryRepository::<Account>::new();
        assert!(repo.is_empty().await);

        let first = Account { id: 1, balance: 1, frozen: false };
        assert!(repo.insert("a", first.clone()).await.is_none());
        let replaced = repo.insert("a", Account { id: 1, balance: 2, frozen: false }).await;
        assert_eq!(replaced, Some(first));
        assert_eq!(repo.len().await, 1);

        assert!(repo.remove("a").await.is_some());
        assert!(repo.is_empty().await);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EvaluatorConfig {
            max_page_size: 0,
            ..EvaluatorConfig::default()
        };
        assert!(InMemoryRepository::<Account>::with_config(config).is_err());
    }

    #[test]
    fn test_query_result_map() {
        let result = QueryResult {
            items: vec![1, 2, 3],
            total_count: 3,
            has_more: false,
            pagination: None,
            execution_time_ms: 0,
            executed_at: Utc::now(),
        };

        let mapped = result.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert_eq!(mapped.total_count, 3);
    }
}
