// Copyright 2025 Cowboy AI, LLC.

//! Criteria chains
//!
//! A chain offers the builder's fluent surface but can be attached to a live
//! [`Specification`]. An attached chain pushes every call into the
//! specification's tree as it happens: the first node is merged, every later
//! call replaces the previous root with the combined one.
//!
//! ```mermaid
//! stateDiagram-v2
//!     [*] --> Empty
//!     Empty --> HasRoot: and / or / not / group
//!     HasRoot --> HasRoot: and / or / not / group
//! ```
//!
//! The back-reference is a `&mut` borrow, so at most one chain can be attached
//! to a specification at any time.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::node::{CriteriaNode, CriteriaTree, PredicateNode};
use super::parameter::Parameter;
use super::unifier::ParameterUnifier;
use super::GroupOutput;
use crate::errors::{CriteriaError, CriteriaResult};
use crate::specification::Specification;

/// Fluent criteria session, either detached or attached to a specification
pub struct CriteriaChain<'s, T> {
    parameter: Parameter,
    root: Option<CriteriaTree<T>>,
    specification: Option<&'s mut Specification<T>>,
}

impl<'s, T: 'static> CriteriaChain<'s, T> {
    /// Standalone chain whose leaves bind to `parameter`
    pub fn detached(parameter: Parameter) -> Self {
        Self {
            parameter,
            root: None,
            specification: None,
        }
    }

    /// Attach to `specification`, starting with `predicate`
    ///
    /// The first node is merged into the specification's tree (ANDed, or
    /// ORed when `combine_as_or`, onto any root it already has). The chain
    /// then continues from the specification's resulting root.
    pub fn start_attached<F>(
        specification: &'s mut Specification<T>,
        predicate: F,
        combine_as_or: bool,
    ) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let leaf = CriteriaNode::leaf(PredicateNode::new(
            specification.parameter().clone(),
            predicate,
        ));
        Self::start_attached_tree(specification, leaf, combine_as_or)
    }

    /// Attach to `specification`, starting with an existing tree
    pub fn start_attached_tree(
        specification: &'s mut Specification<T>,
        tree: CriteriaTree<T>,
        combine_as_or: bool,
    ) -> Self {
        let parameter = specification.parameter().clone();
        specification.merge_into_tree(tree, combine_as_or);
        let root = specification.root().cloned();
        Self {
            parameter,
            root,
            specification: Some(specification),
        }
    }

    /// Attach to `specification`, adopting its current root
    pub fn attach_on_existing(specification: &'s mut Specification<T>) -> Self {
        Self {
            parameter: specification.parameter().clone(),
            root: specification.root().cloned(),
            specification: Some(specification),
        }
    }

    /// The parameter new leaves are bound to
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// The chain's local root
    pub fn root(&self) -> Option<&CriteriaTree<T>> {
        self.root.as_ref()
    }

    /// True when the chain writes through to a specification
    pub fn is_attached(&self) -> bool {
        self.specification.is_some()
    }

    /// AND a predicate
    pub fn and<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let leaf = self.leaf(predicate, None);
        self.extend(leaf, false)
    }

    /// AND a labelled predicate
    pub fn and_labeled<F>(self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let leaf = self.leaf(predicate, Some(label.into()));
        self.extend(leaf, false)
    }

    /// OR a predicate
    pub fn or<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let leaf = self.leaf(predicate, None);
        self.extend(leaf, true)
    }

    /// OR a labelled predicate
    pub fn or_labeled<F>(self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let leaf = self.leaf(predicate, Some(label.into()));
        self.extend(leaf, true)
    }

    /// AND the negation of a predicate
    pub fn not<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let negated = CriteriaNode::not(self.leaf(predicate, None));
        self.extend(negated, false)
    }

    /// AND the negation of a labelled predicate
    pub fn not_labeled<F>(self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let negated = CriteriaNode::not(self.leaf(predicate, Some(label.into())));
        self.extend(negated, false)
    }

    /// Build a sub-tree on a detached chain and AND it in
    ///
    /// Fails with [`CriteriaError::EmptyGroup`] when the callback adds nothing.
    pub fn group<G, R>(self, group: G) -> CriteriaResult<Self>
    where
        G: FnOnce(CriteriaChain<'s, T>) -> R,
        R: GroupOutput<CriteriaChain<'s, T>>,
    {
        self.fold_group(group, false)
    }

    /// Build a sub-tree on a detached chain and OR it in
    ///
    /// Fails with [`CriteriaError::EmptyGroup`] when the callback adds nothing.
    pub fn or_group<G, R>(self, group: G) -> CriteriaResult<Self>
    where
        G: FnOnce(CriteriaChain<'s, T>) -> R,
        R: GroupOutput<CriteriaChain<'s, T>>,
    {
        self.fold_group(group, true)
    }

    /// End the session, yielding the local tree
    pub fn finish(self) -> Option<CriteriaTree<T>> {
        self.root
    }

    fn fold_group<G, R>(self, group: G, as_or: bool) -> CriteriaResult<Self>
    where
        G: FnOnce(CriteriaChain<'s, T>) -> R,
        R: GroupOutput<CriteriaChain<'s, T>>,
    {
        let sub = group(CriteriaChain::detached(Parameter::new())).into_group()?;
        let sub_root = sub.finish().ok_or(CriteriaError::EmptyGroup)?;
        debug!(
            as_or,
            attached = self.is_attached(),
            leaves = sub_root.leaf_count(),
            "folding chain group"
        );

        let unified = ParameterUnifier::new(self.parameter.clone()).unify_tree(&sub_root);
        Ok(self.extend(unified, as_or))
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

    fn extend(mut self, node: CriteriaTree<T>, as_or: bool) -> Self {
        match self.root.take() {
            None => {
                self.root = match self.specification.as_deref_mut() {
                    Some(specification) => {
                        specification.merge_into_tree(node, as_or);
                        specification.root().cloned()
                    }
                    None => Some(node),
                };
            }
            Some(previous) => {
                let next = CriteriaNode::combine(Arc::clone(&previous), node, as_or);
                if let Some(specification) = self.specification.as_deref_mut() {
                    Self::sync_replace(specification, &previous, Arc::clone(&next));
                }
                self.root = Some(next);
            }
        }
        self
    }

    fn sync_replace(
        specification: &mut Specification<T>,
        previous: &CriteriaTree<T>,
        next: CriteriaTree<T>,
    ) {
        trace!("replacing specification root");
        if let Err(err) = specification.replace_bound_root(previous, Arc::clone(&next)) {
            warn!(%err, "specification root diverged from attached chain; resynchronising");
            specification.reset_root(next);
        }
    }
}

impl<T> fmt::Debug for CriteriaChain<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CriteriaChain")
            .field("parameter", &self.parameter)
            .field("root", &self.root)
            .field("attached", &self.specification.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Product {
        active: bool,
        price: u32,
    }

    fn products() -> Vec<Product> {
        vec![
            Product { active: true, price: 10 },
            Product { active: false, price: 10 },
            Product { active: true, price: 999 },
        ]
    }

    fn matching(spec: &Specification<Product>) -> Vec<usize> {
        products()
            .iter()
            .enumerate()
            .filter(|(_, p)| spec.is_satisfied_by(p))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_detached_chain_does_not_touch_anything() {
        let chain = CriteriaChain::<Product>::detached(Parameter::new())
            .or(|p| p.active)
            .and(|p| p.price < 100);

        assert!(!chain.is_attached());
        let root = chain.finish().unwrap();
        assert!(matches!(root.as_ref(), CriteriaNode::And(_, _)));
    }

    #[test]
    fn test_start_attached_sets_both_roots() {
        let mut spec = Specification::<Product>::new();
        let chain = CriteriaChain::start_attached(&mut spec, |p: &Product| p.active, false);
        let chain_root = chain.finish().unwrap();

        assert!(Arc::ptr_eq(spec.root().unwrap(), &chain_root));
        assert_eq!(matching(&spec), vec![0, 2]);
    }

    #[test]
    fn test_every_call_replaces_the_specification_root() {
        let mut spec = Specification::<Product>::new();
        let chain = CriteriaChain::start_attached(&mut spec, |p: &Product| p.active, false)
            .and(|p| p.price < 100)
            .or(|p| p.price > 500);
        let chain_root = chain.finish().unwrap();

        let root = spec.root().unwrap();
        assert!(Arc::ptr_eq(root, &chain_root));
        assert_eq!(root.leaf_count(), 3);
        assert!(matches!(root.as_ref(), CriteriaNode::Or(_, _)));
        assert_eq!(matching(&spec), vec![0, 2]);
    }

    #[test]
    fn test_start_attached_on_existing_root_merges() {
        let mut spec = Specification::<Product>::new();
        spec.filter(|p| p.active);

        let chain = CriteriaChain::start_attached(&mut spec, |p: &Product| p.price > 500, true)
            .and(|p| p.price > 100);
        drop(chain);

        // ((active OR price > 500) AND price > 100)
        assert_eq!(spec.root().unwrap().leaf_count(), 3);
        assert_eq!(matching(&spec), vec![2]);
    }

    #[test]
    fn test_attach_on_existing_adopts_root() {
        let mut spec = Specification::<Product>::new();
        spec.filter(|p| p.active);
        let before = Arc::clone(spec.root().unwrap());

        let chain = CriteriaChain::attach_on_existing(&mut spec);
        assert!(Arc::ptr_eq(chain.root().unwrap(), &before));
        chain.and(|p| p.price < 100);

        assert_eq!(matching(&spec), vec![0]);
    }

    #[test]
    fn test_attach_on_empty_specification() {
        let mut spec = Specification::<Product>::new();
        CriteriaChain::attach_on_existing(&mut spec)
            .or(|p| !p.active)
            .or(|p| p.price > 500);

        assert_eq!(matching(&spec), vec![1, 2]);
    }

    #[test]
    fn test_group_folds_into_specification() {
        let mut spec = Specification::<Product>::new();
        CriteriaChain::start_attached(&mut spec, |p: &Product| p.active, false)
            .or_group(|g| g.or(|p| p.price == 0).or(|p| p.price > 500))
            .unwrap();

        assert!(spec.root().unwrap().is_bound_to(spec.parameter()));
        assert_eq!(matching(&spec), vec![0, 2]);
    }

    #[test]
    fn test_empty_group_is_rejected_and_spec_kept() {
        let mut spec = Specification::<Product>::new();
        let result = CriteriaChain::start_attached(&mut spec, |p: &Product| p.active, false)
            .group(|g| g)
            .map(|_| ());

        assert_eq!(result, Err(CriteriaError::EmptyGroup));
        assert_eq!(matching(&spec), vec![0, 2]);
    }

    #[test]
    fn test_nested_group_errors_propagate() {
        let mut spec = Specification::<Product>::new();
        let result = CriteriaChain::attach_on_existing(&mut spec)
            .group(|g| g.and(|p| p.active).or_group(|inner| inner))
            .map(|_| ());

        assert_eq!(result, Err(CriteriaError::EmptyGroup));
        assert!(!spec.has_criteria());
    }

    #[test]
    fn test_not_in_chain() {
        let mut spec = Specification::<Product>::new();
        CriteriaChain::attach_on_existing(&mut spec).not(|p| p.active);
        assert_eq!(matching(&spec), vec![1]);

        let mut spec = Specification::<Product>::new();
        spec.filter(|p| p.price == 10).not(|p| p.active);
        assert_eq!(matching(&spec), vec![1]);
    }

    #[test]
    fn test_long_attached_chain_shares_root_with_specification() {
        let mut spec = Specification::<Product>::new();
        let chain = (0..1000u32).fold(
            CriteriaChain::start_attached(&mut spec, |p: &Product| p.active, false),
            |chain, n| chain.or(move |p| p.price == n + 1000),
        );
        let chain_root = chain.finish().unwrap();

        let root = spec.root().unwrap();
        assert!(Arc::ptr_eq(root, &chain_root));
        assert_eq!(root.leaf_count(), 1001);
        assert!(root.is_bound_to(spec.parameter()));
        assert_eq!(matching(&spec), vec![0, 2]);
    }

    #[test]
    fn test_diverged_root_is_resynchronised() {
        let mut spec = Specification::<Product>::new();
        spec.filter(|p| p.active);
        let stale = CriteriaNode::leaf(PredicateNode::new(spec.parameter().clone(), |_: &Product| true));

        let next = CriteriaNode::and(Arc::clone(&stale), Arc::clone(spec.root().unwrap()));
        CriteriaChain::sync_replace(&mut spec, &stale, Arc::clone(&next));

        assert!(Arc::ptr_eq(spec.root().unwrap(), &next));
    }
}
