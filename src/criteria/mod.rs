// Copyright 2025 Cowboy AI, LLC.

//! Criteria trees
//!
//! Boolean filter predicates composed into AND / OR / NOT trees, unified onto
//! one bound parameter and compiled into a single callable predicate.
//!
//! - [`CriteriaNode`] / [`PredicateNode`]: the tree itself
//! - [`ParameterUnifier`]: rebinding independently built sub-trees
//! - [`Expression`] / [`CompiledPredicate`]: materialized forms
//! - [`CriteriaBuilder`]: detached fluent builder
//! - [`CriteriaChain`]: fluent session that can write through to a
//!   [`Specification`](crate::specification::Specification)

mod builder;
mod chain;
mod expression;
mod node;
mod parameter;
mod unifier;

pub use builder::CriteriaBuilder;
pub use chain::CriteriaChain;
pub use expression::{CompiledPredicate, Expression};
pub use node::{CriteriaNode, CriteriaTree, PredicateFn, PredicateNode};
pub use parameter::Parameter;
pub use unifier::ParameterUnifier;

use crate::errors::CriteriaResult;

/// What a group callback may return
///
/// Callbacks return the sub-builder (or sub-chain) directly, or a
/// `CriteriaResult` of it when they nest groups of their own.
pub trait GroupOutput<B> {
    /// Normalize into a result
    fn into_group(self) -> CriteriaResult<B>;
}

impl<B> GroupOutput<B> for CriteriaResult<B> {
    fn into_group(self) -> CriteriaResult<B> {
        self
    }
}

impl<T> GroupOutput<CriteriaBuilder<T>> for CriteriaBuilder<T> {
    fn into_group(self) -> CriteriaResult<CriteriaBuilder<T>> {
        Ok(self)
    }
}

impl<'s, T> GroupOutput<CriteriaChain<'s, T>> for CriteriaChain<'s, T> {
    fn into_group(self) -> CriteriaResult<CriteriaChain<'s, T>> {
        Ok(self)
    }
}
