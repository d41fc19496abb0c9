// Copyright 2025 Cowboy AI, LLC.

//! Eager-inclusion directives

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{CriteriaError, CriteriaResult};

/// Related data the data source should load alongside each match
///
/// Directives are keyed by property path (`"orders.lines"`) or by a named
/// typed accessor. The crate never loads anything itself; the directive is
/// handed to the query source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Include {
    /// Dot-separated property path
    Path {
        /// Normalized path, segments joined by `.`
        path: String,
    },
    /// Named accessor returning a related type
    Accessor {
        /// Accessor name
        name: String,
        /// Rust type name of the related data
        target: String,
    },
}

impl Include {
    /// Parse a property path
    ///
    /// Whitespace around segments is trimmed. Empty paths and empty segments
    /// are rejected.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cim_specification::specification::Include;
    ///
    /// let include = Include::path(" orders . lines ").unwrap();
    /// assert_eq!(include.key(), "orders.lines");
    /// assert_eq!(include.segments(), vec!["orders", "lines"]);
    ///
    /// assert!(Include::path("orders..lines").is_err());
    /// ```
    pub fn path(path: &str) -> CriteriaResult<Self> {
        if path.trim().is_empty() {
            return Err(CriteriaError::MissingArgument("include path".to_string()));
        }
        let segments: Vec<&str> = path.split('.').map(str::trim).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(CriteriaError::MissingArgument(format!(
                "include path segment in '{path}'"
            )));
        }
        Ok(Include::Path {
            path: segments.join("."),
        })
    }

    /// Name a typed accessor returning `R`
    pub fn accessor<R: ?Sized>(name: &str) -> CriteriaResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CriteriaError::MissingArgument("include accessor name".to_string()));
        }
        Ok(Include::Accessor {
            name: name.to_string(),
            target: std::any::type_name::<R>().to_string(),
        })
    }

    /// The path or accessor name
    pub fn key(&self) -> &str {
        match self {
            Include::Path { path } => path,
            Include::Accessor { name, .. } => name,
        }
    }

    /// Path segments; an accessor is a single segment
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Include::Path { path } => path.split('.').collect(),
            Include::Accessor { name, .. } => vec![name.as_str()],
        }
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Include::Path { path } => write!(f, "{path}"),
            Include::Accessor { name, target } => write!(f, "{name}: {target}"),
        }
    }
}
