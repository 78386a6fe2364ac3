//! Physical storage for factor tables.
//!
//! A `Store` holds any combination of a sparse layout, a dense layout and a
//! deterministic form. All conversions here are pure: they build a new
//! store from an old one, and the table swaps it in only once it is built.
use crate::{indexer::DomainIndexer, repr::{Representation, ValueKind, Layout}};

/// weight = exp(-energy). zero weight is infinite energy.
#[inline] pub fn energy_to_weight(e:f64)->f64 { (-e).exp() }

/// energy = -ln(weight).
#[inline] pub fn weight_to_energy(w:f64)->f64 { -w.ln() }

/// One value in either form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Val { Energy(f64), Weight(f64) }

impl Val {
  pub fn energy(self)->f64 { match self { Val::Energy(e) => e, Val::Weight(w) => weight_to_energy(w) }}
  pub fn weight(self)->f64 { match self { Val::Energy(e) => energy_to_weight(e), Val::Weight(w) => w }}
  pub fn is_zero(self)->bool {
    match self { Val::Energy(e) => e == f64::INFINITY, Val::Weight(w) => w == 0.0 }}}

/// A column of values, stored as energies, weights, or both.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) enum Values {
  Energy(Vec<f64>),
  Weight(Vec<f64>),
  Both { energies: Vec<f64>, weights: Vec<f64> } }

impl Values {

  /// `n` zero-weight entries
  pub fn zeros(kind:ValueKind, n:usize)->Self {
    match kind {
      ValueKind::Energy => Values::Energy(vec![f64::INFINITY; n]),
      ValueKind::Weight => Values::Weight(vec![0.0; n]),
      ValueKind::Both => Values::Both { energies: vec![f64::INFINITY; n], weights: vec![0.0; n] }}}

  pub fn from_weights(kind:ValueKind, weights:Vec<f64>)->Self {
    match kind {
      ValueKind::Weight => Values::Weight(weights),
      ValueKind::Energy => Values::Energy(weights.iter().map(|&w| weight_to_energy(w)).collect()),
      ValueKind::Both => {
        let energies = weights.iter().map(|&w| weight_to_energy(w)).collect();
        Values::Both { energies, weights }}}}

  pub fn from_energies(kind:ValueKind, energies:Vec<f64>)->Self {
    match kind {
      ValueKind::Energy => Values::Energy(energies),
      ValueKind::Weight => Values::Weight(energies.iter().map(|&e| energy_to_weight(e)).collect()),
      ValueKind::Both => {
        let weights = energies.iter().map(|&e| energy_to_weight(e)).collect();
        Values::Both { energies, weights }}}}

  pub fn kind(&self)->ValueKind {
    match self {
      Values::Energy(_) => ValueKind::Energy,
      Values::Weight(_) => ValueKind::Weight,
      Values::Both { .. } => ValueKind::Both }}

  pub fn len(&self)->usize {
    match self { Values::Energy(v) | Values::Weight(v) => v.len(), Values::Both { energies, .. } => energies.len() }}

  /// the value at `i`, in whichever form is stored (energy preferred)
  #[inline] pub fn get(&self, i:usize)->Val {
    match self {
      Values::Energy(v) | Values::Both { energies: v, .. } => Val::Energy(v[i]),
      Values::Weight(v) => Val::Weight(v[i]) }}

  #[inline] pub fn energy(&self, i:usize)->f64 { self.get(i).energy() }

  #[inline] pub fn weight(&self, i:usize)->f64 {
    match self {
      Values::Weight(v) | Values::Both { weights: v, .. } => v[i],
      Values::Energy(v) => energy_to_weight(v[i]) }}

  #[inline] pub fn is_zero(&self, i:usize)->bool { self.get(i).is_zero() }

  pub fn set(&mut self, i:usize, x:Val) {
    match self {
      Values::Energy(v) => v[i] = x.energy(),
      Values::Weight(v) => v[i] = x.weight(),
      Values::Both { energies, weights } => { energies[i] = x.energy(); weights[i] = x.weight() }}}

  pub fn insert(&mut self, i:usize, x:Val) {
    match self {
      Values::Energy(v) => v.insert(i, x.energy()),
      Values::Weight(v) => v.insert(i, x.weight()),
      Values::Both { energies, weights } => { energies.insert(i, x.energy()); weights.insert(i, x.weight()) }}}

  /// keep only the entries whose flag is set
  pub fn retain(&mut self, keep:&[bool]) {
    fn go(v:&mut Vec<f64>, keep:&[bool]) { let mut i = 0; v.retain(|_| { i += 1; keep[i-1] }) }
    match self {
      Values::Energy(v) | Values::Weight(v) => go(v, keep),
      Values::Both { energies, weights } => { go(energies, keep); go(weights, keep) }}}

  /// a new column with `res[i] = self[order[i]]`
  pub fn select(&self, order:&[usize])->Self {
    let pick = |v:&Vec<f64>| order.iter().map(|&i| v[i]).collect::<Vec<f64>>();
    match self {
      Values::Energy(v) => Values::Energy(pick(v)),
      Values::Weight(v) => Values::Weight(pick(v)),
      Values::Both { energies, weights } => Values::Both { energies: pick(energies), weights: pick(weights) }}}

  /// the same numbers stored as `kind`
  pub fn with_kind(&self, kind:ValueKind)->Self {
    if kind == self.kind() { return self.clone() }
    match (self, kind) {
      (Values::Both { energies, .. }, ValueKind::Energy) => Values::Energy(energies.clone()),
      (Values::Both { weights, .. }, ValueKind::Weight) => Values::Weight(weights.clone()),
      (Values::Energy(v), _) => Values::from_energies(kind, v.clone()),
      (Values::Weight(v), _) => Values::from_weights(kind, v.clone()),
      (Values::Both { .. }, ValueKind::Both) => self.clone() }}

  /// multiply the weight at `i` by `s` (energy shifts by -ln s)
  pub fn scale(&mut self, i:usize, s:f64) {
    match self {
      Values::Energy(v) => v[i] -= s.ln(),
      Values::Weight(v) => v[i] *= s,
      Values::Both { energies, weights } => { energies[i] -= s.ln(); weights[i] *= s }}}

} // impl Values

/// How sparse slots are keyed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) enum Keys {
  /// ascending joint indices, optionally with cached index tuples
  Joint { joints: Vec<usize>, tuples: Option<Vec<Vec<usize>>> },
  /// index tuples in joint order (used when joint indexing is unsupported)
  Tuples(Vec<Vec<usize>>) }

/// Sparse layout: the nonzero entries, in canonical order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Sparse {
  pub keys: Keys,
  /// whether index tuples are declared cached
  pub cached: bool,
  pub values: Values }

impl Sparse {

  pub fn empty(ix:&DomainIndexer, kind:ValueKind, cached:bool)->Self {
    Sparse::from_parts(ix, vec![], vec![], Values::zeros(kind, 0), cached) }

  /// build from slots already in canonical order
  pub fn from_parts(ix:&DomainIndexer, joints:Vec<usize>, tuples:Vec<Vec<usize>>, values:Values, cached:bool)->Self {
    let keys = if ix.supports_joint_indexing() {
      let joints = if joints.is_empty() && !tuples.is_empty() { tuples.iter().map(|t| ix.joint_of(t)).collect() } else { joints };
      let tuples = if !cached { None }
        else if tuples.len() == joints.len() { Some(tuples) }
        else { Some(joints.iter().map(|&j| split(ix, j)).collect()) };
      Keys::Joint { joints, tuples }}
    else { Keys::Tuples(tuples) };
    Sparse { keys, cached, values }}

  pub fn len(&self)->usize { self.values.len() }

  /// joint index of a slot (None when joint indexing is unsupported)
  #[inline] pub fn joint(&self, si:usize)->Option<usize> {
    match &self.keys { Keys::Joint { joints, .. } => Some(joints[si]), Keys::Tuples(_) => None }}

  pub fn write_indices(&self, ix:&DomainIndexer, si:usize, out:&mut [usize]) {
    match &self.keys {
      Keys::Joint { tuples: Some(t), .. } | Keys::Tuples(t) => out.copy_from_slice(&t[si]),
      Keys::Joint { joints, tuples: None } => ix.split_joint(joints[si], out) }}

  pub fn find_joint(&self, ji:usize)->Result<usize, usize> {
    match &self.keys {
      Keys::Joint { joints, .. } => joints.binary_search(&ji),
      Keys::Tuples(_) => Err(self.len()) }}

  pub fn find(&self, ix:&DomainIndexer, idx:&[usize])->Result<usize, usize> {
    match &self.keys {
      Keys::Joint { joints, .. } => joints.binary_search(&ix.joint_of(idx)),
      Keys::Tuples(t) => t.binary_search_by(|p| ix.cmp_indices(p, idx)) }}

  /// insert a slot at position `at` (as returned by a failed find)
  pub fn insert(&mut self, ix:&DomainIndexer, at:usize, idx:&[usize], x:Val) {
    match &mut self.keys {
      Keys::Joint { joints, tuples } => {
        joints.insert(at, ix.joint_of(idx));
        if let Some(t) = tuples { t.insert(at, idx.to_vec()) }}
      Keys::Tuples(t) => t.insert(at, idx.to_vec()) }
    self.values.insert(at, x) }

  pub fn retain(&mut self, keep:&[bool]) {
    fn go<T>(v:&mut Vec<T>, keep:&[bool]) { let mut i = 0; v.retain(|_| { i += 1; keep[i-1] }) }
    match &mut self.keys {
      Keys::Joint { joints, tuples } => { go(joints, keep); if let Some(t) = tuples { go(t, keep) }}
      Keys::Tuples(t) => go(t, keep) }
    self.values.retain(keep) }

} // impl Sparse

fn split(ix:&DomainIndexer, ji:usize)->Vec<usize> {
  let mut res = vec![0; ix.dimensions()];
  ix.split_joint(ji, &mut res);
  res }

/// Deterministic form: one output index per input index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Det {
  pub outputs: Vec<usize>,
  /// joint index of each slot: input * output_cardinality + output
  pub joints: Vec<usize>,
  pub tuples: Option<Vec<Vec<usize>>> }

/// Location of a value within a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Loc { Dense(usize), Slot(usize), Absent }

/// Every layout a table currently holds. At least one is present, and
/// `det` never coexists with the others.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Store {
  pub sparse: Option<Sparse>,
  pub dense: Option<Values>,
  pub det: Option<Det> }

impl Store {

  /// an all-zero table in SPARSE_ENERGY form
  pub fn new(ix:&DomainIndexer)->Self {
    Store { sparse: Some(Sparse::empty(ix, ValueKind::Energy, false)), dense: None, det: None }}

  pub fn dense(values:Values)->Self { Store { sparse: None, dense: Some(values), det: None }}

  pub fn sparse(sparse:Sparse)->Self { Store { sparse: Some(sparse), dense: None, det: None }}

  /// requires a directed indexer with joint indexing and valid outputs
  pub fn deterministic(ix:&DomainIndexer, oc:usize, outputs:Vec<usize>, cached:bool)->Self {
    let joints: Vec<usize> = outputs.iter().enumerate().map(|(i, &o)| i * oc + o).collect();
    let tuples = if cached { Some(joints.iter().map(|&j| split(ix, j)).collect()) } else { None };
    Store { sparse: None, dense: None, det: Some(Det { outputs, joints, tuples }) }}

  pub fn representation(&self)->Representation {
    if let Some(d) = &self.det { return Representation::deterministic(d.tuples.is_some()) }
    let (kind, cached) = match (&self.sparse, &self.dense) {
      (Some(s), _) => (s.values.kind(), s.cached),
      (None, Some(d)) => (d.kind(), false),
      (None, None) => (ValueKind::Energy, false) };
    let layout = match (self.sparse.is_some(), self.dense.is_some()) {
      (true, true) => Layout::Both,
      (false, true) => Layout::Dense,
      _ => Layout::Sparse };
    Representation::new(kind, layout, cached).unwrap_or(Representation::SPARSE_ENERGY) }

  /// number of sparse slots (0 when dense-only)
  pub fn slots(&self)->usize {
    if let Some(s) = &self.sparse { s.len() }
    else if let Some(d) = &self.det { d.outputs.len() }
    else { 0 }}

  #[inline] pub fn slot_value(&self, si:usize)->Val {
    match (&self.sparse, &self.det) {
      (Some(s), _) => s.values.get(si),
      _ => Val::Weight(1.0) }}

  #[inline] pub fn slot_weight(&self, si:usize)->f64 {
    match &self.sparse { Some(s) => s.values.weight(si), None => 1.0 }}

  #[inline] pub fn slot_joint(&self, si:usize)->Option<usize> {
    match (&self.sparse, &self.det) {
      (Some(s), _) => s.joint(si),
      (None, Some(d)) => Some(d.joints[si]),
      (None, None) => None }}

  pub fn slot_indices(&self, ix:&DomainIndexer, si:usize, out:&mut [usize]) {
    match (&self.sparse, &self.det) {
      (Some(s), _) => s.write_indices(ix, si, out),
      (None, Some(d)) => match &d.tuples {
        Some(t) => out.copy_from_slice(&t[si]),
        None => ix.split_joint(d.joints[si], out) },
      (None, None) => {} }}

  /// slot holding the given joint index, if any
  pub fn find_joint(&self, ji:usize)->Option<usize> {
    match (&self.sparse, &self.det) {
      (Some(s), _) => s.find_joint(ji).ok(),
      (None, Some(d)) => d.joints.binary_search(&ji).ok(),
      (None, None) => None }}

  /// where the value for a joint index lives, in the cheapest layout present
  pub fn locate_joint(&self, ji:usize)->Loc {
    if self.dense.is_some() { return Loc::Dense(ji) }
    match self.find_joint(ji) { Some(si) => Loc::Slot(si), None => Loc::Absent }}

  /// where the value for validated indices lives
  pub fn locate(&self, ix:&DomainIndexer, idx:&[usize])->Loc {
    if ix.supports_joint_indexing() { return self.locate_joint(ix.joint_of(idx)) }
    match self.sparse.as_ref().map(|s| s.find(ix, idx)) {
      Some(Ok(si)) => Loc::Slot(si),
      _ => Loc::Absent }}

  pub fn energy(&self, loc:Loc)->f64 {
    match (loc, &self.dense) {
      (Loc::Dense(ji), Some(d)) => d.energy(ji),
      (Loc::Slot(si), _) => self.slot_value(si).energy(),
      _ => f64::INFINITY }}

  pub fn is_zero(&self, loc:Loc)->bool {
    match (loc, &self.dense) {
      (Loc::Dense(ji), Some(d)) => d.is_zero(ji),
      (Loc::Slot(si), _) => self.slot_value(si).is_zero(),
      _ => true }}

  pub fn weight(&self, loc:Loc)->f64 {
    match (loc, &self.dense) {
      (Loc::Dense(ji), Some(d)) => d.weight(ji),
      (Loc::Slot(si), _) => self.slot_weight(si),
      _ => 0.0 }}

} // impl Store

/// a new store holding the same values as `store`, laid out as
/// `kind` x `layout`. dense layouts require joint indexing, and the
/// result is never deterministic.
pub(crate) fn relayout(store:&Store, ix:&DomainIndexer, kind:ValueKind, layout:Layout, cached:bool)->Store {
  let dense = if layout.has_dense() { Some(dense_values(store, ix, kind)) } else { None };
  let sparse = if layout.has_sparse() { Some(sparse_values(store, ix, kind, cached)) } else { None };
  Store { sparse, dense, det: None }}

fn dense_values(store:&Store, ix:&DomainIndexer, kind:ValueKind)->Values {
  if let Some(d) = &store.dense { return d.with_kind(kind) }
  let n = ix.joint_size_for("dense layout").unwrap_or(0);
  let mut res = Values::zeros(kind, n);
  for si in 0..store.slots() {
    if let Some(ji) = store.slot_joint(si) { res.set(ji, store.slot_value(si)) }}
  res }

fn sparse_values(store:&Store, ix:&DomainIndexer, kind:ValueKind, cached:bool)->Sparse {
  if let Some(s) = &store.sparse {
    let keys = match &s.keys {
      Keys::Joint { joints, tuples } => {
        let tuples = if !cached { None }
          else { Some(tuples.clone().unwrap_or_else(|| joints.iter().map(|&j| split(ix, j)).collect())) };
        Keys::Joint { joints: joints.clone(), tuples }}
      Keys::Tuples(t) => Keys::Tuples(t.clone()) };
    return Sparse { keys, cached, values: s.values.with_kind(kind) }}
  if let Some(d) = &store.det {
    let values = Values::from_weights(kind, vec![1.0; d.joints.len()]);
    return Sparse::from_parts(ix, d.joints.clone(), vec![], values, cached) }
  match &store.dense {
    Some(d) => {
      let joints: Vec<usize> = (0..d.len()).filter(|&j| !d.is_zero(j)).collect();
      let values = d.select(&joints).with_kind(kind);
      Sparse::from_parts(ix, joints, vec![], values, cached) }
    None => Sparse::empty(ix, kind, cached) }}

/// a new store over `to`, where the entry at indices `a` of `from` lands
/// at `map(a)`. `map` must be a bijection between the joint assignments.
/// value kinds are kept; deterministic forms become sparse weights.
pub(crate) fn reindex<F>(store:&Store, from:&DomainIndexer, to:&DomainIndexer, map:F)->Store
where F: Fn(&[usize], &mut [usize]) {
  let rep = store.representation();
  let kind = rep.value_kind().unwrap_or(ValueKind::Weight);
  let cached = rep.has_sparse_indices();
  let (mut a, mut b) = (vec![0; from.dimensions()], vec![0; to.dimensions()]);
  let dense = match &store.dense {
    Some(d) if to.supports_joint_indexing() => {
      let mut res = Values::zeros(kind, d.len());
      for j in 0..d.len() {
        from.split_joint(j, &mut a);
        map(&a, &mut b);
        res.set(to.joint_of(&b), d.get(j)) }
      Some(res) }
    _ => None };
  let sparse = if store.sparse.is_some() || store.det.is_some() || dense.is_none() {
    let s = sparse_values(store, from, kind, cached);
    let mut tuples: Vec<Vec<usize>> = Vec::with_capacity(s.len());
    for si in 0..s.len() {
      s.write_indices(from, si, &mut a);
      map(&a, &mut b);
      tuples.push(b.clone()) }
    let mut order: Vec<usize> = (0..tuples.len()).collect();
    order.sort_by(|&i, &j| to.cmp_indices(&tuples[i], &tuples[j]));
    let sorted: Vec<Vec<usize>> = order.iter().map(|&i| tuples[i].clone()).collect();
    let joints = if to.supports_joint_indexing() { sorted.iter().map(|t| to.joint_of(t)).collect() } else { vec![] };
    let keep = if to.supports_joint_indexing() && !cached { vec![] } else { sorted };
    Some(Sparse::from_parts(to, joints, keep, s.values.select(&order), cached)) }
    else { None };
  Store { sparse, dense, det: None }}
