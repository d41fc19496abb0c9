// Copyright 2025 Cowboy AI, LLC.

//! Detached criteria builder

use std::fmt;

use tracing::debug;

use super::expression::{CompiledPredicate, Expression};
use super::node::{CriteriaNode, CriteriaTree, PredicateNode};
use super::parameter::Parameter;
use super::unifier::ParameterUnifier;
use super::GroupOutput;
use crate::errors::{CriteriaError, CriteriaResult};

/// Stateless fluent builder for a standalone criteria tree
///
/// The first predicate added becomes the root whichever method added it, so
/// `or(p).and(q)` and `and(p).and(q)` both build `p AND q`.
///
/// # Examples
///
/// ```rust
/// use cim_specification::criteria::CriteriaBuilder;
///
/// let predicate = CriteriaBuilder::<u32>::new()
///     .and(|n| *n > 10)
///     .or_group(|g| g.or(|n| *n == 1).or(|n| *n == 2))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert!(predicate.matches(&11));
/// assert!(predicate.matches(&2));
/// assert!(!predicate.matches(&5));
/// ```
pub struct CriteriaBuilder<T> {
    parameter: Parameter,
    root: Option<CriteriaTree<T>>,
}

impl<T: 'static> CriteriaBuilder<T> {
    /// Create an empty builder with a fresh parameter
    pub fn new() -> Self {
        Self::with_parameter(Parameter::new())
    }

    /// Create an empty builder whose leaves bind to `parameter`
    pub fn with_parameter(parameter: Parameter) -> Self {
        Self {
            parameter,
            root: None,
        }
    }

    /// The parameter new leaves are bound to
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// Current root, if any predicate was added
    pub fn root(&self) -> Option<&CriteriaTree<T>> {
        self.root.as_ref()
    }

    /// True until the first predicate is added
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// AND a predicate into the tree
    pub fn and<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let leaf = self.leaf(predicate, None);
        self.push(leaf, false)
    }

    /// AND a labelled predicate into the tree
    pub fn and_labeled<F>(self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let leaf = self.leaf(predicate, Some(label.into()));
        self.push(leaf, false)
    }

    /// OR a predicate into the tree
    pub fn or<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let leaf = self.leaf(predicate, None);
        self.push(leaf, true)
    }

    /// OR a labelled predicate into the tree
    pub fn or_labeled<F>(self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let leaf = self.leaf(predicate, Some(label.into()));
        self.push(leaf, true)
    }

    /// AND the negation of a predicate into the tree
    pub fn not<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let negated = CriteriaNode::not(self.leaf(predicate, None));
        self.push(negated, false)
    }

    /// AND the negation of a labelled predicate into the tree
    pub fn not_labeled<F>(self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let negated = CriteriaNode::not(self.leaf(predicate, Some(label.into())));
        self.push(negated, false)
    }

    /// AND an existing tree into this one, rebinding it first
    pub fn and_tree(self, tree: &CriteriaTree<T>) -> Self {
        let unified = ParameterUnifier::new(self.parameter.clone()).unify_tree(tree);
        self.push(unified, false)
    }

    /// OR an existing tree into this one, rebinding it first
    pub fn or_tree(self, tree: &CriteriaTree<T>) -> Self {
        let unified = ParameterUnifier::new(self.parameter.clone()).unify_tree(tree);
        self.push(unified, true)
    }

    /// Build a sub-tree on a fresh builder and AND it in
    ///
    /// Fails with [`CriteriaError::EmptyGroup`] when the callback adds nothing.
    pub fn group<G, R>(self, group: G) -> CriteriaResult<Self>
    where
        G: FnOnce(CriteriaBuilder<T>) -> R,
        R: GroupOutput<CriteriaBuilder<T>>,
    {
        self.fold_group(group, false)
    }

    /// Build a sub-tree on a fresh builder and OR it in
    ///
    /// Fails with [`CriteriaError::EmptyGroup`] when the callback adds nothing.
    pub fn or_group<G, R>(self, group: G) -> CriteriaResult<Self>
    where
        G: FnOnce(CriteriaBuilder<T>) -> R,
        R: GroupOutput<CriteriaBuilder<T>>,
    {
        self.fold_group(group, true)
    }

    fn fold_group<G, R>(self, group: G, as_or: bool) -> CriteriaResult<Self>
    where
        G: FnOnce(CriteriaBuilder<T>) -> R,
        R: GroupOutput<CriteriaBuilder<T>>,
    {
        let sub = group(CriteriaBuilder::new()).into_group()?;
        let sub_root = sub.root.ok_or(CriteriaError::EmptyGroup)?;
        debug!(as_or, leaves = sub_root.leaf_count(), "folding criteria group");

        let unified = ParameterUnifier::new(self.parameter.clone()).unify_tree(&sub_root);
        Ok(self.push(unified, as_or))
    }

    /// Materialize the tree against a fresh parameter
    pub fn build_expression(&self) -> Option<Expression<T>> {
        let shared = Parameter::new();
        self.root.as_ref().map(|root| root.materialize(&shared))
    }

    /// Compile the tree into one predicate; `None` if nothing was added
    pub fn build(&self) -> Option<CompiledPredicate<T>> {
        self.build_expression().map(|expression| expression.compile())
    }

    /// Consume the builder, yielding its tree
    pub fn into_tree(self) -> Option<CriteriaTree<T>> {
        self.root
    }

    fn leaf<F>(&self, predicate: F, label: Option<String>) -> CriteriaTree<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let node = PredicateNode::new(self.parameter.clone(), predicate);
        CriteriaNode::leaf(match label {
            Some(label) => node.with_label(label),
            None => node,
        })
    }

    fn push(mut self, node: CriteriaTree<T>, as_or: bool) -> Self {
        self.root = Some(match self.root.take() {
            None => node,
            Some(root) => CriteriaNode::combine(root, node, as_or),
        });
        self
    }
}

impl<T: 'static> Default for CriteriaBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CriteriaBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CriteriaBuilder")
            .field("parameter", &self.parameter)
            .field("root", &self.root)
            .finish()
    }
}
