// Copyright 2025 Cowboy AI, LLC.

//! Sort descriptors

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SortDirection {
    /// Sort in ascending order
    #[default]
    Ascending,
    /// Sort in descending order
    Descending,
}

impl SortDirection {
    /// Apply this direction to an ascending comparison
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Ascending comparison of two entities
pub type CompareFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// One sort key with a direction
pub struct OrderBy<T> {
    label: Option<String>,
    direction: SortDirection,
    compare: CompareFn<T>,
}

impl<T: 'static> OrderBy<T> {
    /// Sort by a key selector
    pub fn by_key<K, F>(key: F, direction: SortDirection) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        K: Ord,
    {
        Self {
            label: None,
            direction,
            compare: Arc::new(move |a: &T, b: &T| key(a).cmp(&key(b))),
        }
    }

    /// Ascending order by a key selector
    pub fn ascending<K, F>(key: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        K: Ord,
    {
        Self::by_key(key, SortDirection::Ascending)
    }

    /// Descending order by a key selector
    pub fn descending<K, F>(key: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        K: Ord,
    {
        Self::by_key(key, SortDirection::Descending)
    }
}

impl<T> OrderBy<T> {
    /// Attach a label naming the sort key
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, if any
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The sort direction
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Same key in the opposite direction
    pub fn reversed(&self) -> Self {
        Self {
            label: self.label.clone(),
            direction: match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            },
            compare: Arc::clone(&self.compare),
        }
    }

    /// Compare two entities honouring the direction
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.direction.apply((self.compare)(a, b))
    }
}

impl<T> Clone for OrderBy<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            direction: self.direction,
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<T> fmt::Debug for OrderBy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderBy")
            .field("label", &self.label)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}
