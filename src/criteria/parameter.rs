// Copyright 2025 Cowboy AI, LLC.

//! Bound variables for criteria trees

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// The variable a predicate is bound to
///
/// Every leaf of a criteria tree carries the parameter it was written
/// against. Materialization stamps one shared parameter onto every leaf, so a
/// materialized tree refers to exactly one variable. Equality and hashing use
/// the id only; the name is for display.
///
/// # Examples
///
/// ```rust
/// use cim_specification::criteria::Parameter;
///
/// let x = Parameter::new();
/// let y = Parameter::named("product");
///
/// assert_ne!(x, y);
/// assert_eq!(x, x.clone());
/// assert_eq!(y.name(), "product");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    id: Uuid,
    name: String,
}

impl Parameter {
    /// Default display name for generated parameters
    pub const DEFAULT_NAME: &'static str = "x";

    /// Create a fresh parameter with the default name
    pub fn new() -> Self {
        Self::named(Self::DEFAULT_NAME)
    }

    /// Create a fresh parameter with a display name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// Unique id of this parameter
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display name of this parameter
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for Parameter {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Parameter {}

impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
