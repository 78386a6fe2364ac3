//! Factor tables: energy/weight distributions over tuples of discrete domains.
//!
//! A table keeps its values in one or more physical layouts (see
//! [`Representation`]) and converts between them on request. Reads never
//! change the layout, except that slot-based access on a dense-only table
//! first adds a sparse layout of the same value kind. Writes go through to
//! every layout present.
use std::cell::Cell;
use rand::Rng;
use crate::{TOLERANCE, close, dims::DimSet, domain::{Domain, Elem}};
use crate::indexer::DomainIndexer;
use crate::repr::{Representation, ValueKind, Layout};
use crate::store::{self, Store, Sparse, Values, Val, Loc};
use crate::error::{Result, TableError, invalid};

mod direct;
mod convert;
mod table_io;

// cached flags (cleared whenever a value changes)
const NORMALIZED:u8 = 1;
const NORMALIZED_COMPUTED:u8 = 2;
const DETERMINISTIC:u8 = 4;
const DETERMINISTIC_COMPUTED:u8 = 8;

/// dense layouts larger than this get a warning in the log
const LARGE_DENSE:usize = 1 << 24;

/// An energy/weight distribution over the joint assignments of its domains.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FactorTable {
  pub(crate) indexer: DomainIndexer,
  pub(crate) store: Store,
  pub(crate) flags: Cell<u8> }

/// Result of a slice query. `reused` is true when the caller's buffer
/// was large enough to hold the slice.
#[derive(Clone, Debug, PartialEq)]
pub struct Slice { pub values: Vec<f64>, pub reused: bool }

fn check_weight(w:f64)->Result<()> {
  if w.is_nan() || w < 0.0 || w.is_infinite() { invalid(format!("weight {} must be finite and non-negative", w)) }
  else { Ok(()) }}

fn check_energy(e:f64)->Result<()> {
  if e.is_nan() || e == f64::NEG_INFINITY { invalid(format!("energy {} is not a valid energy", e)) }
  else { Ok(()) }}

fn check_val(x:Val)->Result<()> {
  match x { Val::Energy(e) => check_energy(e), Val::Weight(w) => check_weight(w) }}

impl FactorTable {

  /// an all-zero table (in SPARSE_ENERGY form) over the given indexer.
  pub fn new(indexer: DomainIndexer)->Self {
    let store = Store::new(&indexer);
    FactorTable { indexer, store, flags: Cell::new(0) }}

  /// an all-zero undirected table over the given domains.
  pub fn from_domains(domains: Vec<Domain>)->Self { Self::new(DomainIndexer::new(domains)) }

  /// an all-zero directed table over the given domains.
  pub fn directed(domains: Vec<Domain>, outputs: &DimSet)->Result<Self> {
    Ok(Self::new(DomainIndexer::directed(domains, outputs)?)) }

  pub fn indexer(&self)->&DomainIndexer { &self.indexer }
  pub fn dimensions(&self)->usize { self.indexer.dimensions() }
  pub fn domain_sizes(&self)->&[usize] { self.indexer.domain_sizes() }
  pub fn supports_joint_indexing(&self)->bool { self.indexer.supports_joint_indexing() }
  pub fn joint_size(&self)->Result<usize> { self.indexer.joint_size() }

  /// forget cached flags after a value changes
  fn changed(&mut self) { *self.flags.get_mut() = 0 }

  // -- representation ------------------------------------------------------

  pub fn representation(&self)->Representation { self.store.representation() }

  /// convert storage to the given representation. values are unchanged.
  pub fn set_representation(&mut self, r:Representation)->Result<()> {
    let cur = self.representation();
    if r == cur { return Ok(()) }
    if r.is_deterministic() {
      let (oc, outputs) = match self.deterministic_outputs() {
        Some(x) => x,
        None => return Err(TableError::UnsupportedRepresentation("set_representation: deterministic".into())) };
      debug!("factor table {} -> {}", cur, r);
      self.store = Store::deterministic(&self.indexer, oc, outputs, r.has_sparse_indices());
      return Ok(()) }
    let (kind, layout) = match (r.value_kind(), r.layout()) {
      (Some(k), Some(l)) => (k, l),
      _ => return Err(TableError::UnsupportedRepresentation(format!("set_representation: {}", r))) };
    if layout.has_dense() {
      match self.indexer.joint_size() {
        Err(_) => return Err(TableError::UnsupportedRepresentation("set_representation: dense".into())),
        Ok(n) if n > LARGE_DENSE && !cur.has_dense() => warn!("building a dense layout with {} entries", n),
        Ok(_) => {} }}
    debug!("factor table {} -> {}", cur, r);
    self.store = store::relayout(&self.store, &self.indexer, kind, layout, r.has_sparse_indices());
    Ok(()) }

  /// slot-based access needs a sparse layout: add one if only dense is present.
  fn ensure_sparse(&mut self)->Result<()> {
    let rep = self.representation();
    if rep.has_sparse() { Ok(()) }
    else { self.set_representation(rep.with_layout(Layout::Both)) }}

  /// replace a deterministic form with sparse weights before a write
  fn demote_deterministic(&mut self) {
    if let Some(det) = &self.store.det {
      let cached = det.tuples.is_some();
      debug!("factor table DETERMINISTIC -> SPARSE_WEIGHT for write");
      self.store = store::relayout(&self.store, &self.indexer, ValueKind::Weight, Layout::Sparse, cached) }}

  pub fn has_sparse_representation(&self)->bool { self.representation().has_sparse() }
  pub fn has_dense_representation(&self)->bool { self.representation().has_dense() }
  pub fn has_deterministic_representation(&self)->bool { self.representation().is_deterministic() }
  pub fn has_sparse_energies(&self)->bool { self.representation().has_sparse_energy() }
  pub fn has_sparse_weights(&self)->bool { self.representation().has_sparse_weight() }
  pub fn has_dense_energies(&self)->bool { self.representation().has_dense_energy() }
  pub fn has_dense_weights(&self)->bool { self.representation().has_dense_weight() }
  pub fn has_sparse_indices(&self)->bool { self.representation().has_sparse_indices() }

  /// stored sparse energies, if the representation keeps them.
  pub fn sparse_energies(&self)->Option<&[f64]> {
    match self.store.sparse.as_ref().map(|s| &s.values) {
      Some(Values::Energy(v)) | Some(Values::Both { energies: v, .. }) => Some(v),
      _ => None }}

  /// stored sparse weights, if the representation keeps them.
  pub fn sparse_weights(&self)->Option<&[f64]> {
    match self.store.sparse.as_ref().map(|s| &s.values) {
      Some(Values::Weight(v)) | Some(Values::Both { weights: v, .. }) => Some(v),
      _ => None }}

  // -- sizes -----------------------------------------------------------------

  /// number of sparse slots. for a dense-only table this is the number of
  /// nonzero entries, i.e. the size a sparse layout would have.
  pub fn sparse_size(&self)->usize {
    if self.has_sparse_representation() { self.store.slots() }
    else { self.count_non_zero_weights() }}

  pub fn count_non_zero_weights(&self)->usize {
    match (&self.store.sparse, &self.store.dense, &self.store.det) {
      (Some(s), _, _) => (0..s.len()).filter(|&i| !s.values.is_zero(i)).count(),
      (None, Some(d), _) => (0..d.len()).filter(|&i| !d.is_zero(i)).count(),
      (None, None, Some(det)) => det.outputs.len(),
      (None, None, None) => 0 }}

  /// fraction of joint assignments with nonzero weight.
  /// 0 when the table has no joint indexing.
  pub fn density(&self)->f64 {
    match self.indexer.joint_size() {
      Ok(n) => self.count_non_zero_weights() as f64 / n as f64,
      Err(_) => 0.0 }}

  pub fn has_maximum_density(&self)->bool {
    self.indexer.joint_size().is_ok_and(|n| self.count_non_zero_weights() == n) }

  /// drop sparse slots holding zero weight. returns how many were removed.
  pub fn compact(&mut self)->usize {
    let Some(s) = &mut self.store.sparse else { return 0 };
    let keep: Vec<bool> = (0..s.len()).map(|i| !s.values.is_zero(i)).collect();
    let removed = keep.iter().filter(|&&k| !k).count();
    if removed > 0 { s.retain(&keep) }
    removed }

  // -- getters -----------------------------------------------------------------

  pub fn energy_for_joint(&self, ji:usize)->Result<f64> {
    self.indexer.check_joint(ji, "energy_for_joint")?;
    Ok(self.store.energy(self.store.locate_joint(ji))) }

  pub fn weight_for_joint(&self, ji:usize)->Result<f64> {
    self.indexer.check_joint(ji, "weight_for_joint")?;
    Ok(self.store.weight(self.store.locate_joint(ji))) }

  pub fn energy_for_indices(&self, idx:&[usize])->Result<f64> {
    self.indexer.check_indices(idx)?;
    Ok(self.store.energy(self.store.locate(&self.indexer, idx))) }

  pub fn weight_for_indices(&self, idx:&[usize])->Result<f64> {
    self.indexer.check_indices(idx)?;
    Ok(self.store.weight(self.store.locate(&self.indexer, idx))) }

  pub fn energy_for_elements(&self, elems:&[Elem])->Result<f64> {
    let idx = self.indexer.indices_from_elements(elems)?;
    Ok(self.store.energy(self.store.locate(&self.indexer, &idx))) }

  pub fn weight_for_elements(&self, elems:&[Elem])->Result<f64> {
    let idx = self.indexer.indices_from_elements(elems)?;
    Ok(self.store.weight(self.store.locate(&self.indexer, &idx))) }

  /// a dense-only table is checked against the slots its sparse layout would have.
  fn check_slot(&self, si:usize)->Result<()> {
    if si < self.sparse_size() { Ok(()) }
    else { invalid(format!("Sparse index {} is out of range", si)) }}

  /// energy of a sparse slot. adds a sparse layout to dense-only tables.
  pub fn energy_for_sparse(&mut self, si:usize)->Result<f64> {
    self.check_slot(si)?;
    self.ensure_sparse()?;
    Ok(self.store.energy(Loc::Slot(si))) }

  /// weight of a sparse slot. adds a sparse layout to dense-only tables.
  pub fn weight_for_sparse(&mut self, si:usize)->Result<f64> {
    self.check_slot(si)?;
    self.ensure_sparse()?;
    Ok(self.store.weight(Loc::Slot(si))) }

  // -- setters -----------------------------------------------------------------

  pub fn set_energy_for_joint(&mut self, ji:usize, e:f64)->Result<()> {
    self.set_for_joint(ji, Val::Energy(e), "set_energy_for_joint") }

  pub fn set_weight_for_joint(&mut self, ji:usize, w:f64)->Result<()> {
    self.set_for_joint(ji, Val::Weight(w), "set_weight_for_joint") }

  pub fn set_energy_for_indices(&mut self, idx:&[usize], e:f64)->Result<()> {
    self.set_for_indices(idx, Val::Energy(e)) }

  pub fn set_weight_for_indices(&mut self, idx:&[usize], w:f64)->Result<()> {
    self.set_for_indices(idx, Val::Weight(w)) }

  pub fn set_energy_for_elements(&mut self, elems:&[Elem], e:f64)->Result<()> {
    let idx = self.indexer.indices_from_elements(elems)?;
    self.set_for_indices(&idx, Val::Energy(e)) }

  pub fn set_weight_for_elements(&mut self, elems:&[Elem], w:f64)->Result<()> {
    let idx = self.indexer.indices_from_elements(elems)?;
    self.set_for_indices(&idx, Val::Weight(w)) }

  pub fn set_energy_for_sparse(&mut self, si:usize, e:f64)->Result<()> {
    self.set_for_slot(si, Val::Energy(e)) }

  pub fn set_weight_for_sparse(&mut self, si:usize, w:f64)->Result<()> {
    self.set_for_slot(si, Val::Weight(w)) }

  fn set_for_joint(&mut self, ji:usize, x:Val, op:&'static str)->Result<()> {
    self.indexer.check_joint(ji, op)?;
    check_val(x)?;
    let idx = self.indexer.indices_from_joint(ji)?;
    self.put(&idx, x);
    Ok(()) }

  fn set_for_indices(&mut self, idx:&[usize], x:Val)->Result<()> {
    self.indexer.check_indices(idx)?;
    check_val(x)?;
    self.put(idx, x);
    Ok(()) }

  fn set_for_slot(&mut self, si:usize, x:Val)->Result<()> {
    check_val(x)?;
    self.check_slot(si)?;
    self.ensure_sparse()?;
    self.demote_deterministic();
    let Store { sparse, dense, .. } = &mut self.store;
    if let Some(s) = sparse {
      s.values.set(si, x);
      if let (Some(d), Some(ji)) = (dense, s.joint(si)) { d.set(ji, x) }}
    self.changed();
    Ok(()) }

  /// write a validated value at validated indices, through every layout
  fn put(&mut self, idx:&[usize], x:Val) {
    self.demote_deterministic();
    let ix = &self.indexer;
    if let Some(d) = &mut self.store.dense { d.set(ix.joint_of(idx), x) }
    if let Some(s) = &mut self.store.sparse {
      match s.find(ix, idx) {
        Ok(si) => s.values.set(si, x),
        Err(at) => if !x.is_zero() { s.insert(ix, at, idx, x) }}}
    self.changed() }

  // -- slot lookups ------------------------------------------------------------

  pub fn sparse_index_from_joint(&mut self, ji:usize)->Result<Option<usize>> {
    self.indexer.check_joint(ji, "sparse_index_from_joint")?;
    self.ensure_sparse()?;
    Ok(self.store.find_joint(ji)) }

  pub fn sparse_index_from_indices(&mut self, idx:&[usize])->Result<Option<usize>> {
    self.indexer.check_indices(idx)?;
    self.ensure_sparse()?;
    Ok(match self.store.locate(&self.indexer, idx) {
      Loc::Slot(si) => Some(si),
      _ => None })}

  pub fn sparse_index_from_elements(&mut self, elems:&[Elem])->Result<Option<usize>> {
    let idx = self.indexer.indices_from_elements(elems)?;
    self.sparse_index_from_indices(&idx) }

  pub fn sparse_index_to_joint(&mut self, si:usize)->Result<usize> {
    self.indexer.joint_size_for("sparse_index_to_joint")?;
    self.check_slot(si)?;
    self.ensure_sparse()?;
    self.store.slot_joint(si).ok_or(TableError::IndexingUnsupported { op: "sparse_index_to_joint" }) }

  pub fn sparse_index_to_indices(&mut self, si:usize, out:&mut [usize])->Result<()> {
    if out.len() != self.dimensions() {
      return invalid(format!("index buffer has length {}, expected {}", out.len(), self.dimensions())) }
    self.check_slot(si)?;
    self.ensure_sparse()?;
    self.store.slot_indices(&self.indexer, si, out);
    Ok(()) }

  pub fn sparse_index_to_elements(&mut self, si:usize)->Result<Vec<Elem>> {
    let mut idx = vec![0; self.dimensions()];
    self.sparse_index_to_indices(si, &mut idx)?;
    self.indexer.elements_from_indices(&idx) }

  // -- bulk setters ------------------------------------------------------------

  /// replace every value. the table becomes DENSE_WEIGHT.
  pub fn set_weights_dense(&mut self, weights:&[f64])->Result<()> {
    self.set_dense(weights, ValueKind::Weight, "set_weights_dense") }

  /// replace every value. the table becomes DENSE_ENERGY.
  pub fn set_energies_dense(&mut self, energies:&[f64])->Result<()> {
    self.set_dense(energies, ValueKind::Energy, "set_energies_dense") }

  fn set_dense(&mut self, xs:&[f64], kind:ValueKind, op:&'static str)->Result<()> {
    let n = self.indexer.joint_size_for(op)?;
    if xs.len() != n { return invalid(format!("Bad dense length: expected {}, got {}", n, xs.len())) }
    for &x in xs { check_val(as_val(kind, x))? }
    self.store = Store::dense(match kind {
      ValueKind::Energy => Values::Energy(xs.to_vec()),
      _ => Values::Weight(xs.to_vec()) });
    self.changed();
    Ok(()) }

  /// replace every value with the given sparse entries (all others become
  /// zero). the table becomes SPARSE_WEIGHT.
  pub fn set_weights_sparse<I:AsRef<[usize]>>(&mut self, indices:&[I], weights:&[f64])->Result<()> {
    self.set_sparse(indices, weights, ValueKind::Weight) }

  /// like set_weights_sparse, but with energies. the table becomes SPARSE_ENERGY.
  pub fn set_energies_sparse<I:AsRef<[usize]>>(&mut self, indices:&[I], energies:&[f64])->Result<()> {
    self.set_sparse(indices, energies, ValueKind::Energy) }

  pub fn set_weights_sparse_joint(&mut self, joints:&[usize], weights:&[f64])->Result<()> {
    self.set_sparse_joint(joints, weights, ValueKind::Weight, "set_weights_sparse_joint") }

  pub fn set_energies_sparse_joint(&mut self, joints:&[usize], energies:&[f64])->Result<()> {
    self.set_sparse_joint(joints, energies, ValueKind::Energy, "set_energies_sparse_joint") }

  fn set_sparse<I:AsRef<[usize]>>(&mut self, indices:&[I], xs:&[f64], kind:ValueKind)->Result<()> {
    if indices.len() != xs.len() { return invalid("Arrays have different sizes") }
    for idx in indices { self.indexer.check_indices(idx.as_ref())? }
    for &x in xs { check_val(as_val(kind, x))? }
    let ix = &self.indexer;
    let mut order: Vec<usize> = (0..indices.len()).collect();
    order.sort_by(|&a, &b| ix.cmp_indices(indices[a].as_ref(), indices[b].as_ref()));
    for w in order.windows(2) {
      if ix.cmp_indices(indices[w[0]].as_ref(), indices[w[1]].as_ref()).is_eq() {
        return invalid(format!("Multiple entries with same set of indices {:?}", indices[w[0]].as_ref())) }}
    let tuples: Vec<Vec<usize>> = order.iter().map(|&i| indices[i].as_ref().to_vec()).collect();
    let values = sorted_values(kind, xs, &order);
    self.store = Store::sparse(Sparse::from_parts(ix, vec![], tuples, values, false));
    self.changed();
    Ok(()) }

  fn set_sparse_joint(&mut self, joints:&[usize], xs:&[f64], kind:ValueKind, op:&'static str)->Result<()> {
    self.indexer.joint_size_for(op)?;
    if joints.len() != xs.len() { return invalid("Arrays have different sizes") }
    for &ji in joints { self.indexer.check_joint(ji, op)? }
    for &x in xs { check_val(as_val(kind, x))? }
    let mut order: Vec<usize> = (0..joints.len()).collect();
    order.sort_by_key(|&i| joints[i]);
    for w in order.windows(2) {
      if joints[w[0]] == joints[w[1]] {
        let idx = self.indexer.indices_from_joint(joints[w[0]])?;
        return invalid(format!("Multiple entries with same set of indices {:?}", idx)) }}
    let sorted: Vec<usize> = order.iter().map(|&i| joints[i]).collect();
    let values = sorted_values(kind, xs, &order);
    self.store = Store::sparse(Sparse::from_parts(&self.indexer, sorted, vec![], values, false));
    self.changed();
    Ok(()) }

  // -- bulk operations -----------------------------------------------------------

  /// replace every weight with a uniform draw from (0,1]. the representation
  /// is kept, except that a deterministic table becomes DENSE_WEIGHT.
  pub fn randomize_weights<R:Rng+?Sized>(&mut self, rng:&mut R)->Result<()> {
    let n = self.indexer.joint_size_for("randomize_weights")?;
    if n > LARGE_DENSE { warn!("randomizing {} weights", n) }
    let rep = self.representation();
    let weights: Vec<f64> = (0..n).map(|_| 1.0 - rng.gen::<f64>()).collect();
    let dense = Store::dense(Values::Weight(weights));
    let (kind, layout) = match (rep.value_kind(), rep.layout()) {
      (Some(k), Some(l)) => (k, l),
      _ => (ValueKind::Weight, Layout::Dense) };
    self.store = store::relayout(&dense, &self.indexer, kind, layout, rep.has_sparse_indices());
    self.changed();
    Ok(()) }

  /// energies along dimension `dim`, with the other dimensions fixed by
  /// `fixed` (whose entry at `dim` is ignored). `buf` is reused when its
  /// capacity suffices.
  pub fn energy_slice(&self, dim:usize, fixed:&[usize], buf:Vec<f64>)->Result<Slice> {
    self.slice(dim, fixed, buf, true) }

  /// weights along dimension `dim`. see energy_slice.
  pub fn weight_slice(&self, dim:usize, fixed:&[usize], buf:Vec<f64>)->Result<Slice> {
    self.slice(dim, fixed, buf, false) }

  fn slice(&self, dim:usize, fixed:&[usize], mut buf:Vec<f64>, energy:bool)->Result<Slice> {
    if dim >= self.dimensions() { return invalid(format!("dimension {} is out of range", dim)) }
    let mut idx = fixed.to_vec();
    if idx.len() == self.dimensions() { idx[dim] = 0 }
    self.indexer.check_indices(&idx)?;
    let size = self.indexer.domain_size(dim);
    let reused = buf.capacity() >= size;
    buf.clear();
    for i in 0..size {
      idx[dim] = i;
      let loc = self.store.locate(&self.indexer, &idx);
      buf.push(if energy { self.store.energy(loc) } else { self.store.weight(loc) }) }
    Ok(Slice { values: buf, reused }) }

  /// overwrite this table with a copy of `other`.
  pub fn copy_from(&mut self, other:&FactorTable) { self.clone_from(other) }

} // impl FactorTable

fn as_val(kind:ValueKind, x:f64)->Val {
  if kind == ValueKind::Energy { Val::Energy(x) } else { Val::Weight(x) }}

fn sorted_values(kind:ValueKind, xs:&[f64], order:&[usize])->Values {
  let v: Vec<f64> = order.iter().map(|&i| xs[i]).collect();
  if kind == ValueKind::Energy { Values::Energy(v) } else { Values::Weight(v) }}

/// Tables are equal when they have the same domains and direction, the same
/// normalized and deterministic status, the same sparse size, and the same
/// energies and weights (within tolerance) everywhere.
impl PartialEq for FactorTable {
  fn eq(&self, other:&Self)->bool {
    let (a, b) = (&self.indexer, &other.indexer);
    if a.domains() != b.domains() || a.output_set() != b.output_set() { return false }
    if self.is_normalized() != other.is_normalized() { return false }
    if self.is_deterministic_directed() != other.is_deterministic_directed() { return false }
    if self.sparse_size() != other.sparse_size() { return false }
    let same = |x:Loc, y:Loc| {
      close(self.store.energy(x), other.store.energy(y)) && close(self.store.weight(x), other.store.weight(y)) };
    if self.has_sparse_representation() && other.has_sparse_representation() {
      for si in 0..self.store.slots() {
        if !same(Loc::Slot(si), Loc::Slot(si)) { return false }
        if self.store.slot_joint(si) != other.store.slot_joint(si) { return false }}}
    match a.joint_size() {
      Ok(n) => (0..n).all(|ji| same(self.store.locate_joint(ji), other.store.locate_joint(ji))),
      Err(_) => {
        let mut idx = vec![0; a.dimensions()];
        let mut check = |x:&FactorTable, y:&FactorTable| (0..x.store.slots()).all(|si| {
          x.store.slot_indices(&x.indexer, si, &mut idx);
          let (lx, ly) = (Loc::Slot(si), y.store.locate(&y.indexer, &idx));
          close(x.store.energy(lx), y.store.energy(ly)) && close(x.store.weight(lx), y.store.weight(ly)) });
        check(self, other) && check(other, self) }}}}

include!("test-table.rs");
