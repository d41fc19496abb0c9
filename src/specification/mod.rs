// Copyright 2025 Cowboy AI, LLC.

//! Specifications
//!
//! A [`Specification`] is a query description: a criteria tree plus the
//! secondary concerns a data source applies after filtering (includes,
//! ordering, paging). It owns the single mutable root of its tree; chains
//! mutate it only through [`Specification::merge_into_tree`] and
//! [`Specification::replace_in_tree`].

pub mod combinators;
mod include;
mod ordering;
mod paging;

pub use combinators::{and, not, or};
pub use include::Include;
pub use ordering::{CompareFn, OrderBy, SortDirection};
pub use paging::{Pagination, Paging};

use indexmap::IndexSet;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::criteria::{
    CompiledPredicate, CriteriaChain, CriteriaNode, CriteriaTree, Expression, GroupOutput,
    Parameter, ParameterUnifier,
};
use crate::errors::{CriteriaError, CriteriaResult};

/// Criteria tree plus query shaping for entities of type `T`
///
/// A specification without criteria matches everything.
///
/// # Examples
///
/// ```rust
/// use cim_specification::specification::{SortDirection, Specification};
///
/// struct Product { active: bool, price: u32 }
///
/// let mut spec = Specification::<Product>::new();
/// spec.filter(|p| p.active).and(|p| p.price < 100);
/// spec.order_by(|p| p.price, SortDirection::Descending)
///     .take(20);
///
/// assert!(spec.is_satisfied_by(&Product { active: true, price: 10 }));
/// assert!(!spec.is_satisfied_by(&Product { active: false, price: 10 }));
/// ```
pub struct Specification<T> {
    parameter: Parameter,
    root: Option<CriteriaTree<T>>,
    includes: IndexSet<Include>,
    primary_order: Option<OrderBy<T>>,
    secondary_order: Option<OrderBy<T>>,
    paging: Paging,
}

impl<T: 'static> Specification<T> {
    /// Create an empty specification with a fresh parameter
    pub fn new() -> Self {
        Self::with_parameter(Parameter::new())
    }

    /// Create an empty specification bound to `parameter`
    pub fn with_parameter(parameter: Parameter) -> Self {
        Self {
            parameter,
            root: None,
            includes: IndexSet::new(),
            primary_order: None,
            secondary_order: None,
            paging: Paging::default(),
        }
    }

    /// The parameter every leaf of this specification is bound to
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// The criteria root; `None` matches everything
    pub fn root(&self) -> Option<&CriteriaTree<T>> {
        self.root.as_ref()
    }

    /// True when a criteria tree is present
    pub fn has_criteria(&self) -> bool {
        self.root.is_some()
    }

    /// Start an attached chain with a predicate ANDed onto any existing root
    pub fn filter<F>(&mut self, predicate: F) -> CriteriaChain<'_, T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        CriteriaChain::start_attached(self, predicate, false)
    }

    /// Start an attached chain with a predicate ORed onto any existing root
    pub fn or_filter<F>(&mut self, predicate: F) -> CriteriaChain<'_, T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        CriteriaChain::start_attached(self, predicate, true)
    }

    /// Continue composing on the current root
    pub fn chain(&mut self) -> CriteriaChain<'_, T> {
        CriteriaChain::attach_on_existing(self)
    }

    /// Build criteria on a detached chain and AND them onto the root
    ///
    /// Fails with [`CriteriaError::EmptyGroup`] when the callback adds nothing;
    /// the specification is left untouched on any error.
    pub fn filter_with<C, R>(&mut self, chain: C) -> CriteriaResult<&mut Self>
    where
        C: FnOnce(CriteriaChain<'static, T>) -> R,
        R: GroupOutput<CriteriaChain<'static, T>>,
    {
        let built = chain(CriteriaChain::detached(self.parameter.clone())).into_group()?;
        let tree = built.finish().ok_or(CriteriaError::EmptyGroup)?;
        self.merge_into_tree(tree, false);
        Ok(self)
    }

    /// Merge a node into the tree
    ///
    /// With no root the node becomes the root; otherwise the root becomes
    /// `Or(root, node)` when `combine_as_or`, else `And(root, node)`.
    pub fn merge_into_tree(&mut self, node: CriteriaTree<T>, combine_as_or: bool) {
        let node = ParameterUnifier::new(self.parameter.clone()).unify_tree(&node);
        trace!(combine_as_or, leaves = node.leaf_count(), "merging node into specification");
        self.root = Some(match self.root.take() {
            None => node,
            Some(root) => CriteriaNode::combine(root, node, combine_as_or),
        });
    }

    /// Swap the root from `old_root` to `new_root`
    ///
    /// Fails with [`CriteriaError::StaleRoot`] unless `old_root` is the
    /// current root.
    pub fn replace_in_tree(
        &mut self,
        old_root: &CriteriaTree<T>,
        new_root: CriteriaTree<T>,
    ) -> CriteriaResult<()> {
        let new_root = ParameterUnifier::new(self.parameter.clone()).unify_tree(&new_root);
        self.replace_bound_root(old_root, new_root)
    }

    /// [`Self::replace_in_tree`] for a root already bound to this
    /// specification's parameter
    pub(crate) fn replace_bound_root(
        &mut self,
        old_root: &CriteriaTree<T>,
        new_root: CriteriaTree<T>,
    ) -> CriteriaResult<()> {
        match &self.root {
            Some(current) if Arc::ptr_eq(current, old_root) => {
                self.root = Some(new_root);
                Ok(())
            }
            _ => Err(CriteriaError::StaleRoot),
        }
    }

    pub(crate) fn reset_root(&mut self, root: CriteriaTree<T>) {
        self.root = Some(ParameterUnifier::new(self.parameter.clone()).unify_tree(&root));
    }

    /// Eager-include a property path
    pub fn include(&mut self, path: &str) -> CriteriaResult<&mut Self> {
        self.includes.insert(Include::path(path)?);
        Ok(self)
    }

    /// Eager-include a named accessor returning `R`
    pub fn include_accessor<R: ?Sized>(&mut self, name: &str) -> CriteriaResult<&mut Self> {
        self.includes.insert(Include::accessor::<R>(name)?);
        Ok(self)
    }

    /// Include directives in the order they were first added
    pub fn includes(&self) -> impl ExactSizeIterator<Item = &Include> {
        self.includes.iter()
    }

    /// Set the primary sort key
    pub fn order_by<K, F>(&mut self, key: F, direction: SortDirection) -> &mut Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        K: Ord,
    {
        self.order_by_with(OrderBy::by_key(key, direction))
    }

    /// Set the primary sort descriptor, clearing any secondary one
    pub fn order_by_with(&mut self, order: OrderBy<T>) -> &mut Self {
        self.primary_order = Some(order);
        self.secondary_order = None;
        self
    }

    /// Set the secondary sort key; requires a primary one
    pub fn then_by<K, F>(&mut self, key: F, direction: SortDirection) -> CriteriaResult<&mut Self>
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        K: Ord,
    {
        self.then_by_with(OrderBy::by_key(key, direction))
    }

    /// Set the secondary sort descriptor; requires a primary one
    pub fn then_by_with(&mut self, order: OrderBy<T>) -> CriteriaResult<&mut Self> {
        if self.primary_order.is_none() {
            return Err(CriteriaError::InvalidOrdering {
                reason: "then_by requires a primary order_by".to_string(),
            });
        }
        self.secondary_order = Some(order);
        Ok(self)
    }

    /// Primary sort descriptor
    pub fn primary_order(&self) -> Option<&OrderBy<T>> {
        self.primary_order.as_ref()
    }

    /// Secondary sort descriptor
    pub fn secondary_order(&self) -> Option<&OrderBy<T>> {
        self.secondary_order.as_ref()
    }

    /// Skip the first `count` matches
    pub fn skip(&mut self, count: usize) -> &mut Self {
        self.paging.skip = Some(count);
        self
    }

    /// Return at most `count` matches
    pub fn take(&mut self, count: usize) -> &mut Self {
        self.paging.take = Some(count);
        self
    }

    /// Return the 1-based page `page` of `size` matches
    pub fn page(&mut self, page: usize, size: usize) -> CriteriaResult<&mut Self> {
        self.paging = Paging::page(page, size)?;
        Ok(self)
    }

    /// Paging window
    pub fn paging(&self) -> Paging {
        self.paging
    }

    /// The tree materialized against this specification's parameter
    pub fn expression(&self) -> Option<Expression<T>> {
        self.root.as_ref().map(|root| root.materialize(&self.parameter))
    }

    /// The tree compiled into one predicate; `None` matches everything
    pub fn compile(&self) -> Option<CompiledPredicate<T>> {
        self.expression().map(|expression| expression.compile())
    }

    /// Evaluate the criteria against one entity
    pub fn is_satisfied_by(&self, item: &T) -> bool {
        self.root.as_ref().map_or(true, |root| root.evaluate(item))
    }

    /// AND with another specification
    pub fn and_spec(&self, other: &Self) -> CriteriaResult<Self> {
        combinators::and(self, other)
    }

    /// OR with another specification
    pub fn or_spec(&self, other: &Self) -> CriteriaResult<Self> {
        combinators::or(self, other)
    }

    /// Negate this specification
    pub fn negate(&self) -> CriteriaResult<Self> {
        combinators::not(self)
    }

    /// Same parameter and shaping, different root
    pub(crate) fn derive(&self, root: CriteriaTree<T>) -> Self {
        let mut derived = self.clone();
        derived.root = Some(root);
        derived
    }

    /// Take over includes, ordering and paging `other` defines and `self` does not
    pub(crate) fn inherit_shaping(&mut self, other: &Self) {
        for include in &other.includes {
            self.includes.insert(include.clone());
        }
        if self.primary_order.is_none() {
            self.primary_order = other.primary_order.clone();
            self.secondary_order = other.secondary_order.clone();
        }
        if self.paging.is_unbounded() {
            self.paging = other.paging;
        }
    }
}

impl<T: 'static> Default for Specification<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Self {
            parameter: self.parameter.clone(),
            root: self.root.clone(),
            includes: self.includes.clone(),
            primary_order: self.primary_order.clone(),
            secondary_order: self.secondary_order.clone(),
            paging: self.paging,
        }
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("parameter", &self.parameter)
            .field("root", &self.root)
            .field("includes", &self.includes)
            .field("primary_order", &self.primary_order)
            .field("secondary_order", &self.secondary_order)
            .field("paging", &self.paging)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::PredicateNode;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Product {
        id: u32,
        active: bool,
        price: u32,
        category: &'static str,
    }

    fn catalogue() -> Vec<Product> {
        vec![
            Product { id: 1, active: true, price: 10, category: "B" },
            Product { id: 2, active: false, price: 10, category: "B" },
            Product { id: 3, active: true, price: 999, category: "B" },
        ]
    }

    fn ids(spec: &Specification<Product>) -> Vec<u32> {
        catalogue()
            .into_iter()
            .filter(|p| spec.is_satisfied_by(p))
            .map(|p| p.id)
            .collect()
    }

    #[test]
    fn test_empty_specification_matches_everything() {
        let spec = Specification::<Product>::new();
        assert!(!spec.has_criteria());
        assert!(spec.compile().is_none());
        assert_eq!(ids(&spec), vec![1, 2, 3]);
    }

    #[test]
    fn test_filter_and_chain() {
        let mut spec = Specification::<Product>::new();
        spec.filter(|p| p.active).and(|p| p.price < 100);

        assert_eq!(ids(&spec), vec![1]);
    }

    #[test]
    fn test_or_group_scenario() {
        let mut spec = Specification::<Product>::new();
        spec.filter(|p| p.active)
            .or_group(|g| g.or(|p| p.category == "A").or(|p| p.price > 500))
            .unwrap();

        assert_eq!(ids(&spec), vec![1, 3]);
    }

    #[test]
    fn test_successive_filters_accumulate() {
        let mut spec = Specification::<Product>::new();
        spec.filter(|p| p.active);
        spec.filter(|p| p.price > 500);
        assert_eq!(ids(&spec), vec![3]);

        spec.or_filter(|p| p.id == 2);
        assert_eq!(ids(&spec), vec![2, 3]);
    }

    #[test]
    fn test_filter_with_callback() {
        let mut spec = Specification::<Product>::new();
        spec.filter_with(|c| c.or(|p| p.id == 1).or(|p| p.id == 2))
            .unwrap()
            .take(5);
        assert_eq!(ids(&spec), vec![1, 2]);
        assert_eq!(spec.paging().take, Some(5));

        let err = spec.filter_with(|c| c).unwrap_err();
        assert_eq!(err, CriteriaError::EmptyGroup);
        assert_eq!(ids(&spec), vec![1, 2]);
    }

    #[test]
    fn test_chain_on_existing() {
        let mut spec = Specification::<Product>::new();
        spec.filter(|p| p.price == 10);
        spec.chain().not(|p| p.active);

        assert_eq!(ids(&spec), vec![2]);
    }

    #[test]
    fn test_merge_into_tree_rebinds_foreign_nodes() {
        let mut spec = Specification::<Product>::new();
        let foreign = CriteriaNode::leaf(PredicateNode::new(Parameter::new(), |p: &Product| p.active));

        spec.merge_into_tree(foreign, false);
        assert!(spec.root().unwrap().is_bound_to(spec.parameter()));

        let other = CriteriaNode::leaf(PredicateNode::new(Parameter::new(), |p: &Product| p.id == 2));
        spec.merge_into_tree(other, true);
        assert_eq!(ids(&spec), vec![1, 2, 3]);
        assert!(matches!(spec.root().unwrap().as_ref(), CriteriaNode::Or(_, _)));
    }

    #[test]
    fn test_replace_in_tree_requires_current_root() {
        let mut spec = Specification::<Product>::new();
        spec.filter(|p| p.active);
        let current = Arc::clone(spec.root().unwrap());
        let unrelated = CriteriaNode::leaf(PredicateNode::new(spec.parameter().clone(), |_: &Product| true));

        let replacement = CriteriaNode::not(Arc::clone(&current));
        assert_eq!(
            spec.replace_in_tree(&unrelated, Arc::clone(&replacement)),
            Err(CriteriaError::StaleRoot)
        );
        assert!(Arc::ptr_eq(spec.root().unwrap(), &current));

        spec.replace_in_tree(&current, Arc::clone(&replacement)).unwrap();
        assert!(Arc::ptr_eq(spec.root().unwrap(), &replacement));
        assert_eq!(ids(&spec), vec![2]);
    }

    #[test]
    fn test_replace_on_empty_specification_is_stale() {
        let mut spec = Specification::<Product>::new();
        let node = CriteriaNode::leaf(PredicateNode::new(spec.parameter().clone(), |_: &Product| true));

        assert_eq!(spec.replace_in_tree(&node, Arc::clone(&node)), Err(CriteriaError::StaleRoot));
    }

    #[test]
    fn test_includes_are_ordered_and_deduplicated() {
        let mut spec = Specification::<Product>::new();
        spec.include("supplier").unwrap();
        spec.include("orders.lines").unwrap();
        spec.include(" supplier ").unwrap();

        let keys: Vec<&str> = spec.includes().map(Include::key).collect();
        assert_eq!(keys, vec!["supplier", "orders.lines"]);
        assert!(spec.include("").is_err());
    }

    #[test]
    fn test_ordering_requires_primary() {
        let mut spec = Specification::<Product>::new();
        let err = spec.then_by(|p| p.id, SortDirection::Ascending).unwrap_err();
        assert!(matches!(err, CriteriaError::InvalidOrdering { .. }));

        spec.order_by(|p| p.price, SortDirection::Descending)
            .then_by(|p| p.id, SortDirection::Ascending)
            .unwrap();
        assert_eq!(spec.primary_order().unwrap().direction(), SortDirection::Descending);
        assert!(spec.secondary_order().is_some());
    }

    #[test]
    fn test_new_primary_order_drops_tie_breaker() {
        let mut spec = Specification::<Product>::new();
        spec.order_by(|p| p.category, SortDirection::Ascending)
            .then_by(|p| p.id, SortDirection::Descending)
            .unwrap();

        spec.order_by(|p| p.price, SortDirection::Ascending);
        assert!(spec.secondary_order().is_none());
        assert_eq!(spec.primary_order().unwrap().direction(), SortDirection::Ascending);
    }

    #[test]
    fn test_page_sets_window() {
        let mut spec = Specification::<Product>::new();
        spec.page(3, 20).unwrap();
        assert_eq!(spec.paging(), Paging { skip: Some(40), take: Some(20) });

        assert!(spec.page(0, 20).is_err());
        assert_eq!(spec.paging().skip, Some(40));
    }

    #[test]
    fn test_expression_is_bound_to_specification_parameter() {
        let mut spec = Specification::<Product>::new();
        spec.filter(|p| p.active).or_group(|g| g.and(|p| p.price > 500)).unwrap();

        let expression = spec.expression().unwrap();
        assert_eq!(expression.parameters(), vec![spec.parameter().clone()]);
        assert_eq!(expression, spec.expression().unwrap());
    }
}
