// Copyright 2025 Cowboy AI, LLC.

//! # CIM Specification
//!
//! The specification pattern for the Composable Information Machine: boolean
//! filter criteria composed into trees, compiled into one predicate, and
//! bundled with the query shaping a data source applies afterwards.
//!
//! - **Criteria trees**: AND / OR / NOT over typed leaf predicates
//! - **Builders and chains**: fluent composition, standalone or written
//!   through to a live specification
//! - **Specifications**: criteria plus includes, ordering and paging
//! - **Combinators**: AND / OR / NOT across independent specifications
//! - **Evaluation**: applying a specification to a query source or repository
//!
//! ## Design Principles
//!
//! 1. **One bound variable**: every materialized tree refers to a single
//!    shared parameter
//! 2. **No silent defaults**: empty groups and unconstrained operands are
//!    errors, never "always true"
//! 3. **Single writer**: a specification is mutated by at most one chain at a
//!    time, enforced by the borrow checker
//! 4. **Frozen output**: compiled predicates are immutable and `Send + Sync`
//!
//! ## Example
//!
//! ```rust
//! use cim_specification::{and, Specification};
//!
//! #[derive(Debug)]
//! struct Product { id: u32, active: bool, price: u32 }
//!
//! let mut active = Specification::<Product>::new();
//! active.filter(|p| p.active);
//!
//! let mut cheap = Specification::<Product>::new();
//! cheap.filter(|p| p.price < 100);
//!
//! let spec = and(&active, &cheap).unwrap();
//! let predicate = spec.compile().unwrap();
//!
//! let products = vec![
//!     Product { id: 1, active: true, price: 10 },
//!     Product { id: 2, active: false, price: 10 },
//!     Product { id: 3, active: true, price: 999 },
//! ];
//! let ids: Vec<u32> = products.iter().filter(|p| predicate.matches(p)).map(|p| p.id).collect();
//! assert_eq!(ids, vec![1]);
//! ```

#![warn(missing_docs)]

mod config;
mod errors;
pub mod criteria;
pub mod evaluator;
pub mod repository;
pub mod specification;

pub use config::EvaluatorConfig;
pub use errors::{CriteriaError, CriteriaResult};

pub use criteria::{
    CompiledPredicate, CriteriaBuilder, CriteriaChain, CriteriaNode, CriteriaTree, Expression,
    GroupOutput, Parameter, ParameterUnifier, PredicateFn, PredicateNode,
};
pub use evaluator::{InMemoryQuery, QuerySource, SpecificationEvaluator};
pub use repository::{InMemoryRepository, QueryResult, SpecificationRepository};
pub use specification::{
    and, not, or, Include, OrderBy, Pagination, Paging, SortDirection, Specification,
};
