//! A crate for factor tables over discrete domains.
//!
//! A factor table assigns an energy (or equivalently a weight,
//! `w = exp(-e)`) to every joint assignment of a list of finite domains.
//! Tables may be directed (a conditional distribution of some output
//! dimensions given the rest) and may be stored sparse, dense, both, or in
//! a compact deterministic form. The `det` and `functions` modules provide
//! deterministic functions that can update their outputs incrementally.

#![allow(clippy::many_single_char_names)]

#[macro_use] extern crate log;
#[macro_use] extern crate serde_derive;
extern crate serde;
extern crate bincode;

/// Errors and the crate-wide `Result` type.
pub mod error;
pub use error::{TableError, Result};

/// Finite domains and their elements.
pub mod domain;
pub use domain::{Domain, Elem};

/// Sets of dimensions (used to name the outputs of a directed table).
pub mod dims;
pub use dims::DimSet;

/// Conversion between index tuples, joint indices, and elements.
pub mod indexer;
pub use indexer::DomainIndexer;

/// Bijections between the joint assignments of two indexers.
pub mod reindex;
pub use reindex::{Reindexer, Permuter};

/// The seventeen storage representations.
pub mod repr;
pub use repr::{Representation, ValueKind, Layout};

/// Physical storage behind a factor table.
mod store;
pub use store::{energy_to_weight, weight_to_energy};

/// The factor table itself.
pub mod table;
pub use table::{FactorTable, Slice};

/// Walking the entries of a table.
pub mod cur;
pub use cur::{Cursor, Entries, FactorTableEntry};

/// Input/output helpers.
pub mod io;

/// Deterministic functions and incremental update.
pub mod det;
pub use det::{Arg, Matrix, Change, UpdateOutcome, DeterministicFunction};

/// Concrete deterministic functions.
pub mod functions;
pub use functions::{MatrixProduct, Operand, Sum};

/// relative tolerance for normalization and determinism checks
pub const TOLERANCE: f64 = 1e-12;

/// joint indexing is only supported for tables at most this large
pub const MAX_JOINT_SIZE: usize = i32::MAX as usize;

/// approximate equality of energies or weights
pub(crate) fn close(a:f64, b:f64)->bool {
  a == b || (a.is_finite() && b.is_finite() && (a - b).abs() <= TOLERANCE * a.abs().max(b.abs()).max(1.0)) }

#[test] fn test_close() {
  assert!(close(1.0, 1.0 + 1e-14));
  assert!(!close(1.0, 1.0 + 1e-9));
  assert!(close(f64::INFINITY, f64::INFINITY));
  assert!(!close(0.0, f64::INFINITY)); }
