//! Direction, normalization and deterministic form.
use fxhash::FxHashMap;
use super::*;
use crate::det::{Arg, DeterministicFunction};

/// Total weight of each input row.
enum Rows {
  /// indexed by input index: every row of a table with joint indexing
  All(Vec<f64>),
  /// keyed by input tuple: only rows with a nonzero entry, plus the
  /// number of input rows when that is representable
  Present(FxHashMap<Vec<usize>, f64>, Option<usize>) }

impl Rows {
  fn totals(&self)->Box<dyn Iterator<Item=f64> + '_> {
    match self {
      Rows::All(v) => Box::new(v.iter().copied()),
      Rows::Present(m, _) => Box::new(m.values().copied()) }}

  /// false when a countable input row is missing (its total is zero)
  fn complete(&self)->bool {
    match self { Rows::All(_) | Rows::Present(_, None) => true, Rows::Present(m, Some(ic)) => m.len() == *ic }}

  fn normalized(&self)->bool { self.complete() && self.totals().all(|t| (t - 1.0).abs() <= TOLERANCE) }

  fn has_zero(&self)->bool { self.totals().any(|t| t == 0.0) }

  /// the scale factor for the row containing `idx`
  fn factor(&self, ix:&DomainIndexer, idx:&[usize])->f64 {
    match self {
      Rows::All(v) => 1.0 / v[ix.input_of(idx)],
      Rows::Present(m, _) => {
        let key: Vec<usize> = ix.input_dims().iter().map(|&d| idx[d]).collect();
        m.get(&key).map_or(1.0, |t| 1.0 / t) }}}}

/// multiply every nonzero weight by `factor(indices)`, in every layout
fn rescale<F:Fn(&[usize])->f64>(store:&mut Store, ix:&DomainIndexer, factor:F) {
  let mut idx = vec![0; ix.dimensions()];
  if let Some(d) = &mut store.dense {
    for ji in 0..d.len() {
      if !d.is_zero(ji) { ix.split_joint(ji, &mut idx); d.scale(ji, factor(&idx)) }}}
  if let Some(s) = &mut store.sparse {
    for si in 0..s.len() {
      if !s.values.is_zero(si) { s.write_indices(ix, si, &mut idx); s.values.scale(si, factor(&idx)) }}}}

impl FactorTable {

  pub(super) fn mark(&self, bits:u8) { self.flags.set(self.flags.get() | bits) }

  pub fn is_directed(&self)->bool { self.indexer.is_directed() }

  /// undirected: true only after a successful `normalize()` with no
  /// later change. directed: every input row sums to one.
  pub fn is_normalized(&self)->bool {
    if !self.is_directed() { return self.flags.get() & NORMALIZED != 0 }
    if self.flags.get() & NORMALIZED_COMPUTED == 0 {
      let ok = self.store.det.is_some() || self.row_totals(&self.indexer).normalized();
      self.mark(NORMALIZED_COMPUTED | if ok { NORMALIZED } else { 0 }) }
    self.flags.get() & NORMALIZED != 0 }

  pub fn is_conditional(&self)->bool { self.is_directed() && self.is_normalized() }

  /// directed, and each input has exactly one nonzero entry, of weight one.
  pub fn is_deterministic_directed(&self)->bool {
    if self.store.det.is_some() { return true }
    if self.flags.get() & DETERMINISTIC_COMPUTED == 0 {
      let ok = self.deterministic_outputs().is_some();
      self.mark(DETERMINISTIC_COMPUTED | if ok { DETERMINISTIC } else { 0 }) }
    self.flags.get() & DETERMINISTIC != 0 }

  /// output cardinality and the output index of each input, when the
  /// table is deterministic directed (and supports joint indexing).
  pub(crate) fn deterministic_outputs(&self)->Option<(usize, Vec<usize>)> {
    let ix = &self.indexer;
    ix.joint_size().ok()?;
    let (ic, oc) = (ix.input_cardinality().ok()?, ix.output_cardinality().ok()?);
    if let Some(d) = &self.store.det { return Some((oc, d.outputs.clone())) }
    let mut outputs = vec![usize::MAX; ic];
    let mut cur = self.cursor();
    while cur.advance() {
      let ji = cur.joint_index()?;
      let (ii, oi) = (ji / oc, ji % oc);
      if outputs[ii] != usize::MAX || (cur.weight() - 1.0).abs() > TOLERANCE { return None }
      outputs[ii] = oi }
    if outputs.contains(&usize::MAX) { None } else { Some((oc, outputs)) }}

  /// row totals, partitioned by the inputs of `ix` (which may differ in
  /// direction from this table's own indexer)
  fn row_totals(&self, ix:&DomainIndexer)->Rows {
    let mut cur = self.cursor();
    if let (true, Ok(ic)) = (ix.supports_joint_indexing(), ix.input_cardinality()) {
      let mut sums = vec![0.0; ic];
      while cur.advance() { sums[ix.input_of(cur.indices())] += cur.weight() }
      return Rows::All(sums) }
    let mut sums: FxHashMap<Vec<usize>, f64> = FxHashMap::default();
    while cur.advance() {
      let key = ix.input_dims().iter().map(|&d| cur.indices()[d]).collect();
      *sums.entry(key).or_insert(0.0) += cur.weight() }
    Rows::Present(sums, ix.input_cardinality().ok()) }

  /// scale an undirected table so that its weights sum to one.
  pub fn normalize(&mut self)->Result<()> {
    if self.is_directed() { return Err(TableError::UnsupportedForDirected("normalize")) }
    let mut total = 0.0;
    let mut cur = self.cursor();
    while cur.advance() { total += cur.weight() }
    if total == 0.0 { return Err(TableError::ZeroTotalWeight) }
    rescale(&mut self.store, &self.indexer, |_| 1.0 / total);
    self.changed();
    self.mark(NORMALIZED | NORMALIZED_COMPUTED);
    Ok(()) }

  /// scale each input row of a directed table so that it sums to one.
  /// without joint indexing only the rows present in sparse storage are
  /// scaled, and the table counts as normalized only once every input row
  /// is present.
  pub fn normalize_conditional(&mut self)->Result<()> {
    if !self.is_directed() { return Err(TableError::UnsupportedForUndirected("normalize_conditional")) }
    let mut complete = true;
    if self.store.det.is_none() {
      let rows = self.row_totals(&self.indexer);
      if rows.has_zero() { return Err(TableError::ZeroTotalWeightForSomeInput) }
      rescale(&mut self.store, &self.indexer, |idx| rows.factor(&self.indexer, idx));
      self.changed();
      complete = rows.complete() }
    self.mark(NORMALIZED_COMPUTED | if complete { NORMALIZED } else { 0 });
    Ok(()) }

  /// make the members of `outputs` the output dimensions (None for
  /// undirected). every index tuple keeps its value.
  pub fn set_directed(&mut self, outputs:Option<&DimSet>)->Result<()> {
    let to = self.indexer.with_outputs(outputs)?;
    if to == self.indexer { return Ok(()) }
    debug!("factor table outputs {:?} -> {:?}", self.indexer.output_set(), to.output_set());
    let store = store::reindex(&self.store, &self.indexer, &to, |a, b| b.copy_from_slice(a));
    self.indexer = to;
    self.store = store;
    self.changed();
    Ok(()) }

  /// like set_directed, but fails (leaving the table unchanged) unless the
  /// weights are already conditionally normalized for the new outputs.
  pub fn set_conditional(&mut self, outputs:Option<&DimSet>)->Result<()> {
    let Some(outputs) = outputs else { return invalid("set_conditional requires non-null argument") };
    let to = self.indexer.with_outputs(Some(outputs))?;
    if !self.row_totals(&to).normalized() { return Err(TableError::NotNormalized) }
    self.set_directed(Some(outputs))?;
    self.mark(NORMALIZED | NORMALIZED_COMPUTED);
    Ok(()) }

  /// set the direction, then normalize each input row if needed.
  /// fails without change if some input row has zero total weight.
  pub fn make_conditional(&mut self, outputs:Option<&DimSet>)->Result<()> {
    let Some(outputs) = outputs else { return invalid("make_conditional requires non-null argument") };
    let to = self.indexer.with_outputs(Some(outputs))?;
    let rows = self.row_totals(&to);
    if rows.has_zero() { return Err(TableError::ZeroTotalWeightForSomeInput) }
    self.set_directed(Some(outputs))?;
    if rows.normalized() { self.mark(NORMALIZED | NORMALIZED_COMPUTED); Ok(()) }
    else { self.normalize_conditional() }}

  /// fill in the output elements of `elems` from its input elements.
  pub fn eval_deterministic(&self, elems:&mut [Elem])->Result<()> {
    if !self.is_deterministic_directed() { return Err(TableError::NotDeterministic("eval_deterministic")) }
    let ix = &self.indexer;
    if elems.len() != ix.dimensions() {
      return invalid(format!("expected {} elements, got {}", ix.dimensions(), elems.len())) }
    let mut idx = vec![0; ix.dimensions()];
    for &d in ix.input_dims() {
      idx[d] = match ix.domain(d).index_of(&elems[d]) {
        Some(i) => i,
        None => return invalid(format!("element {} is not in domain {} of dimension {}", elems[d], ix.domain(d), d)) }}
    let ii = ix.input_of(&idx);
    let oc = ix.output_cardinality()?;
    let oi = match &self.store.det {
      Some(det) => det.outputs[ii],
      None => (0..oc).find(|&oi| self.store.weight(self.store.locate_joint(ii * oc + oi)) != 0.0)
        .ok_or(TableError::NotDeterministic("eval_deterministic"))? };
    ix.put_output_index(oi, &mut idx);
    for &d in ix.output_dims() {
      if let Some(e) = ix.domain(d).element(idx[d]) { elems[d] = e }}
    Ok(()) }

  /// make the table deterministic: input index `i` maps to output index `outputs[i]`.
  pub fn set_deterministic_output_indices(&mut self, outputs:&[usize])->Result<()> {
    let op = "set_deterministic_output_indices";
    if !self.is_directed() { return Err(TableError::UnsupportedForUndirected(op)) }
    self.indexer.joint_size_for(op)?;
    let (ic, oc) = (self.indexer.input_cardinality()?, self.indexer.output_cardinality()?);
    if outputs.len() != ic { return invalid(format!("expected {} output indices, got {}", ic, outputs.len())) }
    if let Some(o) = outputs.iter().find(|&&o| o >= oc) {
      return invalid(format!("output index {} is out of range", o)) }
    self.store = Store::deterministic(&self.indexer, oc, outputs.to_vec(), false);
    self.changed();
    self.mark(NORMALIZED | NORMALIZED_COMPUTED | DETERMINISTIC | DETERMINISTIC_COMPUTED);
    Ok(()) }

  /// tabulate a deterministic function over this table's integer domains.
  /// the function's outputs must be the leading dimensions, and exactly
  /// the table's output set.
  pub fn set_deterministic_from<F:DeterministicFunction+?Sized>(&mut self, f:&F)->Result<()> {
    let ix = &self.indexer;
    let n_out = f.output_count();
    if !ix.is_directed() || ix.output_dims().len() != n_out || ix.output_dims().iter().enumerate().any(|(i, &d)| i != d) {
      return invalid("function outputs must be the leading dimensions and the table's output set") }
    let ic = ix.input_cardinality()?;
    let mut idx = vec![0; ix.dimensions()];
    let mut args = vec![Arg::Cell(0.0); ix.dimensions()];
    let mut outputs = Vec::with_capacity(ic);
    for ii in 0..ic {
      ix.input_index_to_indices(ii, &mut idx)?;
      for &d in ix.input_dims() {
        let x = ix.domain(d).element(idx[d]).and_then(|e| e.as_f64());
        match x {
          Some(x) => args[d] = Arg::Cell(x),
          None => return invalid(format!("domain {} of dimension {} is not numeric", ix.domain(d), d)) }}
      for a in &mut args[..n_out] { *a = Arg::Cell(0.0) }
      f.eval_deterministic(&mut args)?;
      for d in 0..n_out {
        let v = args[d].cell().unwrap_or(f64::NAN);
        idx[d] = match ix.domain(d).index_of_value(v) {
          Some(i) => i,
          None => return invalid(format!("output value {} is not in domain {}", v, ix.domain(d))) }}
      outputs.push(ix.output_of(&idx)) }
    self.set_deterministic_output_indices(&outputs) }

} // impl FactorTable
