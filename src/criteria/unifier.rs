// Copyright 2025 Cowboy AI, LLC.

//! Parameter unification
//!
//! Trees built independently (inside a group callback, or in another
//! specification) are bound to their own parameters. Before such a tree is
//! attached to a parent, the unifier rewrites every leaf onto the parent's
//! parameter. Leaf bodies are closures over `&T`, so the rewrite only re-tags
//! leaves; bodies are shared, never re-created.

use std::sync::Arc;

use tracing::trace;

use super::expression::Expression;
use super::node::{CriteriaNode, CriteriaTree};
use super::parameter::Parameter;

/// Rewrites criteria onto one target parameter
#[derive(Debug, Clone)]
pub struct ParameterUnifier {
    target: Parameter,
}

impl ParameterUnifier {
    /// Create a unifier targeting `target`
    pub fn new(target: Parameter) -> Self {
        Self { target }
    }

    /// The parameter every leaf is rewritten to
    pub fn target(&self) -> &Parameter {
        &self.target
    }

    /// Rebind a tree onto the target parameter
    ///
    /// A tree already bound to the target is returned as the same `Arc`, so
    /// identity comparisons on roots keep working after unification.
    pub fn unify_tree<T>(&self, tree: &CriteriaTree<T>) -> CriteriaTree<T> {
        if tree.is_bound_to(&self.target) {
            return Arc::clone(tree);
        }
        trace!(
            target_parameter = %self.target.id(),
            leaves = tree.leaf_count(),
            "rebinding criteria tree"
        );
        self.rebind(tree)
    }

    fn rebind<T>(&self, tree: &CriteriaTree<T>) -> CriteriaTree<T> {
        if tree.is_bound_to(&self.target) {
            return Arc::clone(tree);
        }
        match tree.as_ref() {
            CriteriaNode::Predicate(leaf) => CriteriaNode::leaf(leaf.rebind(&self.target)),
            CriteriaNode::And(left, right) => CriteriaNode::and(self.rebind(left), self.rebind(right)),
            CriteriaNode::Or(left, right) => CriteriaNode::or(self.rebind(left), self.rebind(right)),
            CriteriaNode::Not(child) => CriteriaNode::not(self.rebind(child)),
        }
    }

    /// Rebind a materialized expression onto the target parameter
    pub fn unify_expression<T>(&self, expression: &Expression<T>) -> Expression<T> {
        expression.rebind(&self.target)
    }
}
