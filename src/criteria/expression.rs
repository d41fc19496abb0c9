// Copyright 2025 Cowboy AI, LLC.

//! Materialized criteria
//!
//! [`Expression`] is the intermediate form a criteria tree takes once every
//! leaf has been bound to one shared [`Parameter`]. It can be interpreted
//! directly or compiled into a [`CompiledPredicate`], a single closure that is
//! `Send + Sync` and can be shared freely.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::node::PredicateFn;
use super::parameter::Parameter;

/// A criteria tree bound to a single parameter
pub enum Expression<T> {
    /// Leaf body bound to the shared parameter
    Leaf {
        /// The shared parameter
        parameter: Parameter,
        /// The predicate body
        body: PredicateFn<T>,
        /// Label carried over from the leaf node
        label: Option<String>,
    },
    /// Conjunction
    And(Box<Expression<T>>, Box<Expression<T>>),
    /// Disjunction
    Or(Box<Expression<T>>, Box<Expression<T>>),
    /// Negation
    Not(Box<Expression<T>>),
}

impl<T> Expression<T> {
    /// Interpret the expression against one entity
    pub fn evaluate(&self, item: &T) -> bool {
        match self {
            Expression::Leaf { body, .. } => body(item),
            Expression::And(left, right) => left.evaluate(item) && right.evaluate(item),
            Expression::Or(left, right) => left.evaluate(item) || right.evaluate(item),
            Expression::Not(inner) => !inner.evaluate(item),
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
            Expression::Leaf { parameter, .. } => {
                if !seen.contains(parameter) {
                    seen.push(parameter.clone());
                }
            }
            Expression::And(left, right) | Expression::Or(left, right) => {
                left.collect_parameters(seen);
                right.collect_parameters(seen);
            }
            Expression::Not(inner) => inner.collect_parameters(seen),
        }
    }

    /// The single parameter of a well-formed expression
    ///
    /// Returns `None` when leaves disagree, which only happens for
    /// expressions assembled by hand.
    pub fn parameter(&self) -> Option<Parameter> {
        let mut parameters = self.parameters();
        if parameters.len() == 1 {
            parameters.pop()
        } else {
            None
        }
    }

    /// Same expression with a different parameter stamped on every leaf
    pub fn rebind(&self, parameter: &Parameter) -> Self {
        match self {
            Expression::Leaf { body, label, .. } => Expression::Leaf {
                parameter: parameter.clone(),
                body: Arc::clone(body),
                label: label.clone(),
            },
            Expression::And(left, right) => {
                Expression::And(Box::new(left.rebind(parameter)), Box::new(right.rebind(parameter)))
            }
            Expression::Or(left, right) => {
                Expression::Or(Box::new(left.rebind(parameter)), Box::new(right.rebind(parameter)))
            }
            Expression::Not(inner) => Expression::Not(Box::new(inner.rebind(parameter))),
        }
    }
}

impl<T: 'static> Expression<T> {
    /// Fold the expression into one closure
    ///
    /// The compiled predicate carries the first leaf's parameter. A
    /// hand-assembled expression whose leaves disagree is logged and rebound
    /// onto that parameter.
    pub fn compile(&self) -> CompiledPredicate<T> {
        let parameter = self.first_parameter().clone();
        let distinct = self.parameters().len();
        if distinct > 1 {
            warn!(
                distinct,
                parameter = %parameter,
                "compiling expression with mixed parameters; rebinding onto the first leaf's"
            );
            return self.rebind(&parameter).compile();
        }
        CompiledPredicate {
            parameter,
            predicate: self.compile_fn(),
        }
    }

    fn first_parameter(&self) -> &Parameter {
        match self {
            Expression::Leaf { parameter, .. } => parameter,
            Expression::And(left, _) | Expression::Or(left, _) => left.first_parameter(),
            Expression::Not(inner) => inner.first_parameter(),
        }
    }

    fn compile_fn(&self) -> PredicateFn<T> {
        match self {
            Expression::Leaf { body, .. } => Arc::clone(body),
            Expression::And(left, right) => {
                let (left, right) = (left.compile_fn(), right.compile_fn());
                Arc::new(move |item: &T| left(item) && right(item))
            }
            Expression::Or(left, right) => {
                let (left, right) = (left.compile_fn(), right.compile_fn());
                Arc::new(move |item: &T| left(item) || right(item))
            }
            Expression::Not(inner) => {
                let inner = inner.compile_fn();
                Arc::new(move |item: &T| !inner(item))
            }
        }
    }
}

impl<T> Clone for Expression<T> {
    fn clone(&self) -> Self {
        match self {
            Expression::Leaf {
                parameter,
                body,
                label,
            } => Expression::Leaf {
                parameter: parameter.clone(),
                body: Arc::clone(body),
                label: label.clone(),
            },
            Expression::And(left, right) => Expression::And(left.clone(), right.clone()),
            Expression::Or(left, right) => Expression::Or(left.clone(), right.clone()),
            Expression::Not(inner) => Expression::Not(inner.clone()),
        }
    }
}

/// Structural equality: same shape, same parameters, same leaf bodies by identity
impl<T> PartialEq for Expression<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Expression::Leaf {
                    parameter: p1,
                    body: b1,
                    label: l1,
                },
                Expression::Leaf {
                    parameter: p2,
                    body: b2,
                    label: l2,
                },
            ) => p1 == p2 && Arc::ptr_eq(b1, b2) && l1 == l2,
            (Expression::And(a1, b1), Expression::And(a2, b2))
            | (Expression::Or(a1, b1), Expression::Or(a2, b2)) => a1 == a2 && b1 == b2,
            (Expression::Not(a), Expression::Not(b)) => a == b,
            _ => false,
        }
    }
}

impl<T> fmt::Debug for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Leaf {
                parameter, label, ..
            } => f
                .debug_struct("Leaf")
                .field("parameter", parameter)
                .field("label", label)
                .finish_non_exhaustive(),
            Expression::And(left, right) => f.debug_tuple("And").field(left).field(right).finish(),
            Expression::Or(left, right) => f.debug_tuple("Or").field(left).field(right).finish(),
            Expression::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
        }
    }
}

impl<T> fmt::Display for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Leaf {
                parameter, label, ..
            } => match label {
                Some(label) => write!(f, "{parameter} => {label}"),
                None => write!(f, "{parameter} => <predicate>"),
            },
            Expression::And(left, right) => write!(f, "({left} AND {right})"),
            Expression::Or(left, right) => write!(f, "({left} OR {right})"),
            Expression::Not(inner) => write!(f, "(NOT {inner})"),
        }
    }
}

/// A materialized criteria tree folded into one closure
///
/// Immutable once built; clones share the closure.
///
/// # Examples
///
/// ```rust
/// use cim_specification::criteria::CriteriaBuilder;
///
/// let predicate = CriteriaBuilder::<i32>::new()
///     .and(|n| *n > 0)
///     .or(|n| *n == -1)
///     .build()
///     .expect("criteria were added");
///
/// let kept: Vec<i32> = vec![-2, -1, 0, 3]
///     .into_iter()
///     .filter(|n| predicate.matches(n))
///     .collect();
/// assert_eq!(kept, vec![-1, 3]);
/// ```
pub struct CompiledPredicate<T> {
    parameter: Parameter,
    predicate: PredicateFn<T>,
}

impl<T> CompiledPredicate<T> {
    /// Evaluate against one entity
    pub fn matches(&self, item: &T) -> bool {
        (self.predicate)(item)
    }

    /// The parameter the predicate was materialized against
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    /// The underlying closure
    pub fn as_fn(&self) -> &PredicateFn<T> {
        &self.predicate
    }

    /// Consume into the underlying closure
    pub fn into_fn(self) -> PredicateFn<T> {
        self.predicate
    }
}

impl<T> Clone for CompiledPredicate<T> {
    fn clone(&self) -> Self {
        Self {
            parameter: self.parameter.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for CompiledPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPredicate")
            .field("parameter", &self.parameter)
            .finish_non_exhaustive()
    }
}
