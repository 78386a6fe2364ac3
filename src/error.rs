//! Errors reported by factor tables and deterministic functions.
use thiserror::Error;

/// Every failure is reported before any state is touched, so a table that
/// returned an error is exactly as it was before the call.
#[derive(Debug, Error)]
pub enum TableError {
  /// Bad sizes, out-of-range indices, duplicates, non-finite inputs.
  #[error("{0}")]
  InvalidArgument(String),

  #[error("{op} requires joint indexing, but the joint size of this table is too large")]
  IndexingUnsupported { op: &'static str },

  #[error("{0} representation not supported")]
  UnsupportedRepresentation(String),

  #[error("{0} not supported for directed factor table")]
  UnsupportedForDirected(&'static str),

  #[error("{0} not supported for undirected factor table")]
  UnsupportedForUndirected(&'static str),

  #[error("Cannot normalize undirected factor table with zero total weight")]
  ZeroTotalWeight,

  #[error("Cannot normalize directed factor table with zero total weight for some input")]
  ZeroTotalWeightForSomeInput,

  #[error("weights must be normalized correctly for directed tables")]
  NotNormalized,

  #[error("{0} requires a deterministic directed table")]
  NotDeterministic(&'static str),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("codec error: {0}")]
  Codec(#[from] bincode::Error),

  #[error("json error: {0}")]
  Json(String) }

pub type Result<T> = std::result::Result<T, TableError>;

/// shorthand for building an `InvalidArgument` error
pub(crate) fn invalid<T>(msg: impl Into<String>)->Result<T> {
  Err(TableError::InvalidArgument(msg.into())) }

impl From<json::Error> for TableError {
  fn from(e: json::Error)->Self { TableError::Json(e.to_string()) }}

#[test] fn test_error_messages() {
  let e = TableError::InvalidArgument("Bad dense length: expected 6, got 5".into());
  assert_eq!(e.to_string(), "Bad dense length: expected 6, got 5");
  let e = TableError::UnsupportedForDirected("normalize");
  assert_eq!(e.to_string(), "normalize not supported for directed factor table");
  let e = TableError::IndexingUnsupported { op: "weight_for_joint" };
  assert!(e.to_string().starts_with("weight_for_joint requires joint indexing"));
  assert!(invalid::<()>("oops").is_err()); }
