// Copyright 2025 Cowboy AI, LLC.

//! Applying specifications to a data source
//!
//! The engine never executes queries itself. A data source implements
//! [`QuerySource`]; [`SpecificationEvaluator`] hands it the compiled criteria
//! and the shaping directives in a fixed order:
//!
//! ```mermaid
//! graph LR
//!     A[include] --> B[filter]
//!     B --> C[order_by / then_by]
//!     C --> D[skip]
//!     D --> E[take]
//! ```

use std::cmp::Ordering;
use std::fmt;

use tracing::{debug, trace};

use crate::config::EvaluatorConfig;
use crate::criteria::CompiledPredicate;
use crate::specification::{Include, OrderBy, Specification};

/// Sequence abstraction a specification is evaluated against
pub trait QuerySource<T>: Sized {
    /// Eager-load related data for every item
    fn include(self, include: &Include) -> Self;

    /// Keep items matching the predicate
    fn filter(self, predicate: &CompiledPredicate<T>) -> Self;

    /// Order by a primary key, discarding any earlier ordering
    fn order_by(self, order: &OrderBy<T>) -> Self;

    /// Refine the current ordering with a secondary key
    fn then_by(self, order: &OrderBy<T>) -> Self;

    /// Drop the first `count` items
    fn skip(self, count: usize) -> Self;

    /// Keep at most `count` items
    fn take(self, count: usize) -> Self;
}

/// In-memory query source over a vector
///
/// Include directives have nothing to load in memory; they are recorded and
/// exposed through [`InMemoryQuery::included`].
pub struct InMemoryQuery<T> {
    items: Vec<T>,
    orderings: Vec<OrderBy<T>>,
    included: Vec<Include>,
}

impl<T> InMemoryQuery<T> {
    /// Wrap a vector of items
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            orderings: Vec::new(),
            included: Vec::new(),
        }
    }

    /// Current items
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of current items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no items remain
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Include directives applied so far
    pub fn included(&self) -> &[Include] {
        &self.included
    }

    /// Consume into the current items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    fn sort(&mut self) {
        let orderings = &self.orderings;
        self.items.sort_by(|a, b| {
            orderings
                .iter()
                .fold(Ordering::Equal, |acc, order| acc.then_with(|| order.compare(a, b)))
        });
    }
}

impl<T> FromIterator<T> for InMemoryQuery<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> QuerySource<T> for InMemoryQuery<T> {
    fn include(mut self, include: &Include) -> Self {
        self.included.push(include.clone());
        self
    }

    fn filter(mut self, predicate: &CompiledPredicate<T>) -> Self {
        self.items.retain(|item| predicate.matches(item));
        self
    }

    fn order_by(mut self, order: &OrderBy<T>) -> Self {
        self.orderings = vec![order.clone()];
        self.sort();
        self
    }

    fn then_by(mut self, order: &OrderBy<T>) -> Self {
        self.orderings.push(order.clone());
        self.sort();
        self
    }

    fn skip(mut self, count: usize) -> Self {
        let count = count.min(self.items.len());
        self.items.drain(..count);
        self
    }

    fn take(mut self, count: usize) -> Self {
        self.items.truncate(count);
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for InMemoryQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryQuery")
            .field("items", &self.items)
            .field("orderings", &self.orderings)
            .field("included", &self.included)
            .finish()
    }
}

/// Applies specifications to query sources
#[derive(Debug, Clone, Default)]
pub struct SpecificationEvaluator {
    config: EvaluatorConfig,
}

impl SpecificationEvaluator {
    /// Create an evaluator with the given configuration
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// The evaluator's configuration
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Apply criteria only, ignoring includes, ordering and paging
    pub fn apply_criteria<T, S>(&self, spec: &Specification<T>, source: S) -> S
    where
        T: 'static,
        S: QuerySource<T>,
    {
        match spec.compile() {
            Some(predicate) => source.filter(&predicate),
            None => source,
        }
    }

    /// Apply includes, criteria, ordering and paging, in that order
    ///
    /// A missing take falls back to the configured default page size; any
    /// take is clamped to the configured maximum.
    pub fn apply<T, S>(&self, spec: &Specification<T>, source: S) -> S
    where
        T: 'static,
        S: QuerySource<T>,
    {
        let paging = spec.paging();
        let take = self.config.effective_take(paging.take);
        if self.config.log_evaluations {
            debug!(
                leaves = spec.root().map_or(0, |root| root.leaf_count()),
                includes = spec.includes().len(),
                skip = ?paging.skip,
                take = ?take,
                "evaluating specification"
            );
        } else {
            trace!(skip = ?paging.skip, take = ?take, "evaluating specification");
        }

        let source = self.apply_matching(spec, source);
        self.apply_window(spec, source)
    }

    /// Apply includes, then criteria, leaving every match before the window
    pub fn apply_matching<T, S>(&self, spec: &Specification<T>, source: S) -> S
    where
        T: 'static,
        S: QuerySource<T>,
    {
        let source = self.apply_includes(spec, source);
        self.apply_criteria(spec, source)
    }

    /// Hand every include directive to the source
    pub fn apply_includes<T, S>(&self, spec: &Specification<T>, source: S) -> S
    where
        T: 'static,
        S: QuerySource<T>,
    {
        spec.includes()
            .fold(source, |source, include| source.include(include))
    }

    /// Apply ordering, then skip, then take
    pub fn apply_window<T, S>(&self, spec: &Specification<T>, mut source: S) -> S
    where
        T: 'static,
        S: QuerySource<T>,
    {
        if let Some(primary) = spec.primary_order() {
            source = source.order_by(primary);
            if let Some(secondary) = spec.secondary_order() {
                source = source.then_by(secondary);
            }
        }
        let paging = spec.paging();
        if let Some(skip) = paging.skip {
            source = source.skip(skip);
        }
        if let Some(take) = self.config.effective_take(paging.take) {
            source = source.take(take);
        }
        source
    }
}
