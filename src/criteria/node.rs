// Copyright 2025 Cowboy AI, LLC.

//! Criteria tree nodes
//!
//! A criteria tree is a sum of leaf predicates and the three boolean
//! combinators. Nodes are immutable and shared through [`CriteriaTree`], so a
//! specification and the chain building it can hold the same root and compare
//! it by identity.

use std::fmt;
use std::sync::Arc;

use super::expression::Expression;
use super::parameter::Parameter;

/// A single-argument boolean function over the entity type
pub type PredicateFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Shared handle to a criteria node
pub type CriteriaTree<T> = Arc<CriteriaNode<T>>;

/// Leaf wrapping one typed predicate and the parameter it is bound to
pub struct PredicateNode<T> {
    parameter: Parameter,
    body: PredicateFn<T>,
    label: Option<String>,
}

impl<T> PredicateNode<T> {
    /// Wrap a predicate bound to `parameter`
    pub fn new<F>(parameter: Parameter, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            parameter,
            body: Arc::new(predicate),
            label: None,
        }
    }

    /// Wrap an already shared predicate body
    pub fn from_fn(parameter: Parameter, body: PredicateFn<T>) -> Self {
        Self {
            parameter,
            body,
            label: None,
        }
    }

    /// Attach a human-readable label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The parameter this leaf is bound to
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// The label, if any
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The shared predicate body
    pub fn body(&self) -> &PredicateFn<T> {
        &self.body
    }

    /// Evaluate the leaf against one entity
    pub fn evaluate(&self, item: &T) -> bool {
        (self.body)(item)
    }

    /// Copy of this leaf bound to another parameter; the body is shared
    pub fn rebind(&self, parameter: &Parameter) -> Self {
        Self {
            parameter: parameter.clone(),
            body: Arc::clone(&self.body),
            label: self.label.clone(),
        }
    }

    /// The leaf body with its own parameter replaced by `shared`
    pub fn materialize(&self, shared: &Parameter) -> Expression<T> {
        Expression::Leaf {
            parameter: shared.clone(),
            body: Arc::clone(&self.body),
            label: self.label.clone(),
        }
    }
}

impl<T> Clone for PredicateNode<T> {
    fn clone(&self) -> Self {
        Self {
            parameter: self.parameter.clone(),
            body: Arc::clone(&self.body),
            label: self.label.clone(),
        }
    }
}

impl<T> fmt::Debug for PredicateNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateNode")
            .field("parameter", &self.parameter)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A node of a criteria tree
///
/// ```mermaid
/// graph TD
///     A[And] --> B[Predicate active]
///     A --> C[Not]
///     C --> D[Predicate discontinued]
/// ```
///
/// Operand order is preserved: `And(a, b)` and `And(b, a)` are logically
/// equal but are different trees.
pub enum CriteriaNode<T> {
    /// Leaf predicate
    Predicate(PredicateNode<T>),
    /// Both children must hold
    And(CriteriaTree<T>, CriteriaTree<T>),
    /// Either child must hold
    Or(CriteriaTree<T>, CriteriaTree<T>),
    /// The child must not hold
    Not(CriteriaTree<T>),
}

impl<T> CriteriaNode<T> {
    /// Shared leaf node
    pub fn leaf(predicate: PredicateNode<T>) -> CriteriaTree<T> {
        Arc::new(CriteriaNode::Predicate(predicate))
    }

    /// Shared `And(left, right)`
    pub fn and(left: CriteriaTree<T>, right: CriteriaTree<T>) -> CriteriaTree<T> {
        Arc::new(CriteriaNode::And(left, right))
    }

    /// Shared `Or(left, right)`
    pub fn or(left: CriteriaTree<T>, right: CriteriaTree<T>) -> CriteriaTree<T> {
        Arc::new(CriteriaNode::Or(left, right))
    }

    /// Shared `Not(child)`
    pub fn not(child: CriteriaTree<T>) -> CriteriaTree<T> {
        Arc::new(CriteriaNode::Not(child))
    }

    /// Shared `Or(left, right)` when `as_or`, otherwise `And(left, right)`
    pub fn combine(left: CriteriaTree<T>, right: CriteriaTree<T>, as_or: bool) -> CriteriaTree<T> {
        if as_or {
            Self::or(left, right)
        } else {
            Self::and(left, right)
        }
    }

    /// Compile the tree against one shared parameter
    ///
    /// Calling this twice with the same parameter yields equal expressions.
    pub fn materialize(&self, shared: &Parameter) -> Expression<T> {
        match self {
            CriteriaNode::Predicate(leaf) => leaf.materialize(shared),
            CriteriaNode::And(left, right) => Expression::And(
                Box::new(left.materialize(shared)),
                Box::new(right.materialize(shared)),
            ),
            CriteriaNode::Or(left, right) => Expression::Or(
                Box::new(left.materialize(shared)),
                Box::new(right.materialize(shared)),
            ),
            CriteriaNode::Not(child) => Expression::Not(Box::new(child.materialize(shared))),
        }
    }

    /// Interpret the tree directly against one entity
    pub fn evaluate(&self, item: &T) -> bool {
        match self {
            CriteriaNode::Predicate(leaf) => leaf.evaluate(item),
            CriteriaNode::And(left, right) => left.evaluate(item) && right.evaluate(item),
            CriteriaNode::Or(left, right) => left.evaluate(item) || right.evaluate(item),
            CriteriaNode::Not(child) => !child.evaluate(item),
        }
    }

    /// True when every leaf is bound to `parameter`
    pub fn is_bound_to(&self, parameter: &Parameter) -> bool {
        match self {
            CriteriaNode::Predicate(leaf) => leaf.parameter() == parameter,
            CriteriaNode::And(left, right) | CriteriaNode::Or(left, right) => {
                left.is_bound_to(parameter) && right.is_bound_to(parameter)
            }
            CriteriaNode::Not(child) => child.is_bound_to(parameter),
        }
    }

    /// Distinct parameters referenced by the leaves, in first-seen order
    pub fn parameters(&self) -> Vec<Parameter> {
        let mut seen = Vec::new();
        self.collect_parameters(&mut seen);
        seen
    }

    fn collect_parameters(&self, seen: &mut Vec<Parameter>) {
        match self {
            CriteriaNode::Predicate(leaf) => {
                if !seen.contains(leaf.parameter()) {
                    seen.push(leaf.parameter().clone());
                }
            }
            CriteriaNode::And(left, right) | CriteriaNode::Or(left, right) => {
                left.collect_parameters(seen);
                right.collect_parameters(seen);
            }
            CriteriaNode::Not(child) => child.collect_parameters(seen),
        }
    }

    /// Number of leaf predicates
    pub fn leaf_count(&self) -> usize {
        match self {
            CriteriaNode::Predicate(_) => 1,
            CriteriaNode::And(left, right) | CriteriaNode::Or(left, right) => {
                left.leaf_count() + right.leaf_count()
            }
            CriteriaNode::Not(child) => child.leaf_count(),
        }
    }

    /// Height of the tree; a single leaf has depth 1
    pub fn depth(&self) -> usize {
        match self {
            CriteriaNode::Predicate(_) => 1,
            CriteriaNode::And(left, right) | CriteriaNode::Or(left, right) => {
                1 + left.depth().max(right.depth())
            }
            CriteriaNode::Not(child) => 1 + child.depth(),
        }
    }
}

impl<T> fmt::Debug for CriteriaNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriteriaNode::Predicate(leaf) => f.debug_tuple("Predicate").field(leaf).finish(),
            CriteriaNode::And(left, right) => f.debug_tuple("And").field(left).field(right).finish(),
            CriteriaNode::Or(left, right) => f.debug_tuple("Or").field(left).field(right).finish(),
            CriteriaNode::Not(child) => f.debug_tuple("Not").field(child).finish(),
        }
    }
}

impl<T> fmt::Display for CriteriaNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriteriaNode::Predicate(leaf) => write!(f, "{}", leaf.label().unwrap_or("<predicate>")),
            CriteriaNode::And(left, right) => write!(f, "({left} AND {right})"),
            CriteriaNode::Or(left, right) => write!(f, "({left} OR {right})"),
            CriteriaNode::Not(child) => write!(f, "(NOT {child})"),
        }
    }
}
