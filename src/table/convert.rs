//! Conversion of a table through a reindexer.
use super::*;
use crate::reindex::Reindexer;

impl FactorTable {

  /// a new table over `r.to_indexer()` holding this table's values at the
  /// mapped indices. value kinds are kept; a deterministic form becomes
  /// sparse weights. undirected normalized tables stay normalized.
  pub fn convert<R:Reindexer+?Sized>(&self, r:&R)->Result<FactorTable> {
    if r.from_indexer() != &self.indexer {
      return invalid("reindexer does not start from this table's indexer") }
    let to = r.to_indexer();
    let store = store::reindex(&self.store, &self.indexer, to, |a, b| r.map_indices(a, b));
    let res = FactorTable { indexer: to.clone(), store, flags: Cell::new(0) };
    if !self.is_directed() && !to.is_directed() && self.is_normalized() {
      res.flags.set(NORMALIZED | NORMALIZED_COMPUTED) }
    Ok(res) }}
