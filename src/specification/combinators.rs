// Copyright 2025 Cowboy AI, LLC.

//! Combining independent specifications
//!
//! Both operands must carry criteria. Combining an unconstrained
//! specification is rejected: absorbing it and propagating it give different
//! results, so neither is chosen silently.

use tracing::debug;

use super::Specification;
use crate::criteria::{CriteriaNode, CriteriaTree, ParameterUnifier};
use crate::errors::{CriteriaError, CriteriaResult};

/// `left AND right`
///
/// The result is bound to `left`'s parameter and carries `left`'s includes,
/// ordering and paging, completed by whatever `right` defines that `left`
/// does not.
pub fn and<T: 'static>(
    left: &Specification<T>,
    right: &Specification<T>,
) -> CriteriaResult<Specification<T>> {
    combine(left, right, false)
}

/// `left OR right`
///
/// Secondary concerns are merged as for [`and`].
pub fn or<T: 'static>(
    left: &Specification<T>,
    right: &Specification<T>,
) -> CriteriaResult<Specification<T>> {
    combine(left, right, true)
}

/// `NOT spec`, keeping its includes, ordering and paging
pub fn not<T: 'static>(spec: &Specification<T>) -> CriteriaResult<Specification<T>> {
    let root = criteria_of(spec, "operand")?;
    debug!(leaves = root.leaf_count(), "negating specification");
    Ok(spec.derive(CriteriaNode::not(root.clone())))
}

fn combine<T: 'static>(
    left: &Specification<T>,
    right: &Specification<T>,
    as_or: bool,
) -> CriteriaResult<Specification<T>> {
    let left_root = criteria_of(left, "left")?;
    let right_root = criteria_of(right, "right")?;

    let rebound = ParameterUnifier::new(left.parameter().clone()).unify_tree(right_root);
    debug!(
        as_or,
        left_leaves = left_root.leaf_count(),
        right_leaves = rebound.leaf_count(),
        "combining specifications"
    );

    let mut combined = left.derive(CriteriaNode::combine(left_root.clone(), rebound, as_or));
    combined.inherit_shaping(right);
    Ok(combined)
}

fn criteria_of<'a, T: 'static>(
    spec: &'a Specification<T>,
    operand: &str,
) -> CriteriaResult<&'a CriteriaTree<T>> {
    spec.root().ok_or_else(|| CriteriaError::missing_criteria(operand))
}
