//! Domain indexers: conversions between joint indices, index tuples and elements.
use std::cmp::Ordering;
use rand::Rng;
use crate::{MAX_JOINT_SIZE, dims::DimSet, domain::{Domain, Elem}};
use crate::error::{Result, TableError, invalid};

/// An ordered tuple of domains, optionally split into input and output
/// dimensions.
///
/// The joint index of an undirected indexer varies dimension 0 fastest.
/// A directed indexer varies its output dimensions fastest (in ascending
/// order) and then its input dimensions, so that
/// `joint = input_index * output_cardinality + output_index`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IndexerParts", into = "IndexerParts")]
pub struct DomainIndexer {
  domains: Vec<Domain>,
  sizes: Vec<usize>,
  outputs: Option<DimSet>,
  /// dimensions from least to most significant: outputs first, then inputs.
  order: Vec<usize>,
  /// how many leading entries of `order` are outputs (0 when undirected)
  n_outputs: usize,
  /// joint stride of each dimension, when the joint size is representable
  strides: Option<Vec<usize>>,
  joint_size: Option<usize>,
  input_size: Option<usize>,
  output_size: Option<usize> }

/// the serialized form: everything else is derived.
#[derive(Clone, Serialize, Deserialize)]
struct IndexerParts { domains: Vec<Domain>, outputs: Option<Vec<usize>> }

/// product of the sizes, if it does not exceed MAX_JOINT_SIZE
fn bounded_product(mut sizes: impl Iterator<Item=usize>)->Option<usize> {
  sizes.try_fold(1usize, |acc, s| acc.checked_mul(s).filter(|&p| p <= MAX_JOINT_SIZE)) }

impl DomainIndexer {

  /// an undirected indexer over the given domains.
  pub fn new(domains: Vec<Domain>)->Self {
    Self::build(domains, None).expect("undirected indexers are always valid") }

  /// a directed indexer whose output dimensions are the members of `outputs`.
  pub fn directed(domains: Vec<Domain>, outputs: &DimSet)->Result<Self> {
    Self::build(domains, Some(outputs.clone())) }

  /// the same domains with a different output set (None for undirected).
  pub fn with_outputs(&self, outputs: Option<&DimSet>)->Result<Self> {
    Self::build(self.domains.clone(), outputs.cloned()) }

  fn build(domains: Vec<Domain>, outputs: Option<DimSet>)->Result<Self> {
    let n = domains.len();
    let outputs = match outputs {
      None => None,
      Some(set) => {
        let set = match set.resized(n) {
          Some(s) => s,
          None => return invalid(format!("output set {} does not fit {} dimensions", set, n)) };
        if set.is_empty() { return invalid("directed table needs at least one output dimension") }
        if set.is_full() { return invalid("directed table needs at least one input dimension") }
        Some(set) }};
    let sizes: Vec<usize> = domains.iter().map(|d| d.size()).collect();
    let (order, n_outputs) = match &outputs {
      None => ((0..n).collect(), 0),
      Some(set) => {
        let mut order = set.hi_bits();
        let n_outputs = order.len();
        order.extend(set.complement().hi_bits());
        (order, n_outputs) }};
    let joint_size = bounded_product(sizes.iter().copied());
    let strides = joint_size.map(|_| {
      let mut strides = vec![0; n]; let mut stride = 1;
      for &d in &order { strides[d] = stride; stride *= sizes[d] }
      strides });
    let (input_size, output_size) = if outputs.is_some() {
      (bounded_product(order[n_outputs..].iter().map(|&d| sizes[d])),
       bounded_product(order[..n_outputs].iter().map(|&d| sizes[d]))) }
      else { (None, None) };
    Ok(DomainIndexer { domains, sizes, outputs, order, n_outputs, strides, joint_size, input_size, output_size }) }

  /// number of dimensions
  pub fn dimensions(&self)->usize { self.domains.len() }
  pub fn domains(&self)->&[Domain] { &self.domains }
  pub fn domain(&self, d:usize)->&Domain { &self.domains[d] }
  pub fn domain_size(&self, d:usize)->usize { self.sizes[d] }
  pub fn domain_sizes(&self)->&[usize] { &self.sizes }

  // -- joint indexing --------------------------------------------------

  /// true when the joint size fits within MAX_JOINT_SIZE
  pub fn supports_joint_indexing(&self)->bool { self.joint_size.is_some() }

  pub fn joint_size(&self)->Result<usize> { self.joint_size_for("joint_size") }

  pub(crate) fn joint_size_for(&self, op:&'static str)->Result<usize> {
    self.joint_size.ok_or(TableError::IndexingUnsupported { op }) }

  /// validate a joint index for the named operation
  pub(crate) fn check_joint(&self, ji:usize, op:&'static str)->Result<()> {
    if ji < self.joint_size_for(op)? { Ok(()) }
    else { invalid(format!("Joint index {} is out of range", ji)) }}

  pub fn check_indices(&self, ix:&[usize])->Result<()> {
    if ix.len() != self.sizes.len() || ix.iter().zip(&self.sizes).any(|(&i, &s)| i >= s) {
      invalid(format!("Indices {:?} out of range for domain sizes {:?}", ix, self.sizes)) }
    else { Ok(()) }}

  pub fn joint_index(&self, ix:&[usize])->Result<usize> {
    self.joint_size_for("joint_index")?;
    self.check_indices(ix)?;
    Ok(self.joint_of(ix)) }

  /// joint index of already validated indices. requires joint indexing.
  pub(crate) fn joint_of(&self, ix:&[usize])->usize {
    match &self.strides {
      Some(strides) => ix.iter().zip(strides).map(|(i, s)| i * s).sum(),
      None => panic!("joint_of called without joint indexing") }}

  /// write the index tuple of a joint index into `out`.
  pub fn joint_to_indices(&self, ji:usize, out:&mut [usize])->Result<()> {
    self.check_joint(ji, "joint_to_indices")?;
    if out.len() != self.dimensions() {
      return invalid(format!("index buffer has length {}, expected {}", out.len(), self.dimensions())) }
    self.split_joint(ji, out);
    Ok(()) }

  /// unchecked form of joint_to_indices
  pub(crate) fn split_joint(&self, mut ji:usize, out:&mut [usize]) {
    for &d in &self.order { out[d] = ji % self.sizes[d]; ji /= self.sizes[d] }}

  pub fn indices_from_joint(&self, ji:usize)->Result<Vec<usize>> {
    let mut res = vec![0; self.dimensions()];
    self.joint_to_indices(ji, &mut res)?;
    Ok(res) }

  /// compare index tuples in joint-index order, most significant dimension first.
  pub fn cmp_indices(&self, a:&[usize], b:&[usize])->Ordering {
    for &d in self.order.iter().rev() {
      match a[d].cmp(&b[d]) { Ordering::Equal => continue, o => return o }}
    Ordering::Equal }

  /// step the tuple to its successor in joint order, like an odometer.
  /// returns false (with every index reset to 0) after the last tuple.
  pub fn increment_indices(&self, ix:&mut [usize])->bool {
    for &d in &self.order {
      ix[d] += 1;
      if ix[d] < self.sizes[d] { return true }
      ix[d] = 0 }
    false }

  // -- elements ----------------------------------------------------------

  pub fn elements_from_indices(&self, ix:&[usize])->Result<Vec<Elem>> {
    self.check_indices(ix)?;
    Ok(ix.iter().zip(&self.domains).map(|(&i, d)| d.element(i).expect("index checked")).collect()) }

  pub fn indices_from_elements(&self, elems:&[Elem])->Result<Vec<usize>> {
    if elems.len() != self.dimensions() {
      return invalid(format!("expected {} elements, got {}", self.dimensions(), elems.len())) }
    elems.iter().zip(&self.domains).enumerate().map(|(i, (e, d))| {
      d.index_of(e).ok_or_else(|| TableError::InvalidArgument(
        format!("element {} is not in domain {} of dimension {}", e, d, i))) }).collect() }

  pub fn joint_to_elements(&self, ji:usize)->Result<Vec<Elem>> {
    self.elements_from_indices(&self.indices_from_joint(ji)?) }

  pub fn joint_from_elements(&self, elems:&[Elem])->Result<usize> {
    self.joint_index(&self.indices_from_elements(elems)?) }

  // -- random --------------------------------------------------------------

  /// fill `out` with uniformly chosen indices.
  pub fn random_indices<R:Rng+?Sized>(&self, rng:&mut R, out:&mut [usize]) {
    assert_eq!(out.len(), self.dimensions(), "index buffer has the wrong length");
    for (o, &s) in out.iter_mut().zip(&self.sizes) { *o = rng.gen_range(0..s) }}

  pub fn random_joint_index<R:Rng+?Sized>(&self, rng:&mut R)->Result<usize> {
    Ok(rng.gen_range(0..self.joint_size_for("random_joint_index")?)) }

  // -- direction -------------------------------------------------------------

  pub fn is_directed(&self)->bool { self.outputs.is_some() }

  pub fn output_set(&self)->Option<&DimSet> { self.outputs.as_ref() }

  pub fn input_set(&self)->Option<DimSet> { self.outputs.as_ref().map(|s| s.complement()) }

  /// output dimensions in ascending order (empty when undirected).
  pub fn output_dims(&self)->&[usize] { &self.order[..self.n_outputs] }

  /// input dimensions in ascending order. every dimension of an
  /// undirected indexer counts as an input.
  pub fn input_dims(&self)->&[usize] { &self.order[self.n_outputs..] }

  pub fn is_output(&self, d:usize)->bool { self.outputs.as_ref().is_some_and(|s| s.get(d)) }

  pub fn input_cardinality(&self)->Result<usize> {
    if !self.is_directed() { return Err(TableError::UnsupportedForUndirected("input_cardinality")) }
    self.input_size.ok_or(TableError::IndexingUnsupported { op: "input_cardinality" }) }

  pub fn output_cardinality(&self)->Result<usize> {
    if !self.is_directed() { return Err(TableError::UnsupportedForUndirected("output_cardinality")) }
    self.output_size.ok_or(TableError::IndexingUnsupported { op: "output_cardinality" }) }

  pub fn joint_from_input_output(&self, ii:usize, oi:usize)->Result<usize> {
    self.joint_size_for("joint_from_input_output")?;
    let (ic, oc) = (self.input_cardinality()?, self.output_cardinality()?);
    if ii >= ic { return invalid(format!("input index {} is out of range", ii)) }
    if oi >= oc { return invalid(format!("output index {} is out of range", oi)) }
    Ok(ii * oc + oi) }

  pub fn input_index_from_indices(&self, ix:&[usize])->Result<usize> {
    self.input_cardinality()?;
    self.check_indices(ix)?;
    Ok(self.input_of(ix)) }

  pub fn output_index_from_indices(&self, ix:&[usize])->Result<usize> {
    self.output_cardinality()?;
    self.check_indices(ix)?;
    Ok(self.output_of(ix)) }

  /// unchecked: requires a representable input cardinality.
  pub(crate) fn input_of(&self, ix:&[usize])->usize {
    self.input_dims().iter().rev().fold(0, |acc, &d| acc * self.sizes[d] + ix[d]) }

  pub(crate) fn output_of(&self, ix:&[usize])->usize {
    self.output_dims().iter().rev().fold(0, |acc, &d| acc * self.sizes[d] + ix[d]) }

  /// write the input dimensions of `out` for the given input index.
  /// output dimensions are left untouched.
  pub fn input_index_to_indices(&self, ii:usize, out:&mut [usize])->Result<()> {
    let ic = self.input_cardinality()?;
    if ii >= ic { return invalid(format!("input index {} is out of range", ii)) }
    if out.len() != self.dimensions() {
      return invalid(format!("index buffer has length {}, expected {}", out.len(), self.dimensions())) }
    let mut ii = ii;
    for &d in self.input_dims() { out[d] = ii % self.sizes[d]; ii /= self.sizes[d] }
    Ok(()) }

  /// write the output dimensions of `out` for the given output index.
  pub(crate) fn put_output_index(&self, mut oi:usize, out:&mut [usize]) {
    for &d in self.output_dims() { out[d] = oi % self.sizes[d]; oi /= self.sizes[d] }}

} // impl DomainIndexer

impl TryFrom<IndexerParts> for DomainIndexer {
  type Error = TableError;
  fn try_from(p: IndexerParts)->Result<Self> {
    for d in &p.domains {
      let ok = match d {
        Domain::Range { lo, hi } => crate::domain::range_size(*lo, *hi).is_some(),
        Domain::Enum(v) => !v.is_empty() };
      if !ok { return invalid(format!("bad domain {:?}", d)) }}
    let n = p.domains.len();
    let outputs = match p.outputs {
      None => None,
      Some(bits) => {
        if bits.iter().any(|&b| b >= n) { return invalid(format!("output dimensions {:?} out of range", bits)) }
        Some(DimSet::from_bits(n, &bits)) }};
    DomainIndexer::build(p.domains, outputs) }}

impl From<DomainIndexer> for IndexerParts {
  fn from(ix: DomainIndexer)->Self {
    let outputs = ix.outputs.map(|s| s.hi_bits());
    IndexerParts { domains: ix.domains, outputs }}}

include!("test-indexer.rs");
