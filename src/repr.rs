//! Representation selectors: which physical layouts a table keeps.
use std::fmt;

// bit flags (only the combinations named below are valid)
const DE:u8 = 1;   // dense energies
const DW:u8 = 2;   // dense weights
const SE:u8 = 4;   // sparse energies
const SW:u8 = 8;   // sparse weights
const IX:u8 = 16;  // cached sparse index tuples
const DET:u8 = 32; // deterministic (one output per input)

/// Which numbers a layout stores.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ValueKind { Energy, Weight, Both }

impl ValueKind {
  pub fn has_energy(self)->bool { self != ValueKind::Weight }
  pub fn has_weight(self)->bool { self != ValueKind::Energy }}

/// Which layouts a table keeps.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Layout { Sparse, Dense, Both }

impl Layout {
  pub fn has_sparse(self)->bool { self != Layout::Dense }
  pub fn has_dense(self)->bool { self != Layout::Sparse }}

/// A representation: value kind x layout x index caching, or deterministic.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Representation(u8);

impl Representation {
  pub const SPARSE_ENERGY: Self = Self(SE);
  pub const SPARSE_WEIGHT: Self = Self(SW);
  pub const ALL_SPARSE: Self = Self(SE|SW);
  pub const DENSE_ENERGY: Self = Self(DE);
  pub const DENSE_WEIGHT: Self = Self(DW);
  pub const ALL_DENSE: Self = Self(DE|DW);
  pub const ALL_ENERGY: Self = Self(SE|DE);
  pub const ALL_WEIGHT: Self = Self(SW|DW);
  pub const ALL_VALUES: Self = Self(SE|SW|DE|DW);
  pub const SPARSE_ENERGY_WITH_INDICES: Self = Self(SE|IX);
  pub const SPARSE_WEIGHT_WITH_INDICES: Self = Self(SW|IX);
  pub const ALL_SPARSE_WITH_INDICES: Self = Self(SE|SW|IX);
  pub const ALL_ENERGY_WITH_INDICES: Self = Self(SE|DE|IX);
  pub const ALL_WEIGHT_WITH_INDICES: Self = Self(SW|DW|IX);
  pub const ALL_VALUES_WITH_INDICES: Self = Self(SE|SW|DE|DW|IX);
  pub const DETERMINISTIC: Self = Self(DET);
  pub const DETERMINISTIC_WITH_INDICES: Self = Self(DET|IX);

  /// every valid representation
  pub const ALL: [Self; 17] = [
    Self::SPARSE_ENERGY, Self::SPARSE_WEIGHT, Self::ALL_SPARSE,
    Self::DENSE_ENERGY, Self::DENSE_WEIGHT, Self::ALL_DENSE,
    Self::ALL_ENERGY, Self::ALL_WEIGHT, Self::ALL_VALUES,
    Self::SPARSE_ENERGY_WITH_INDICES, Self::SPARSE_WEIGHT_WITH_INDICES,
    Self::ALL_SPARSE_WITH_INDICES, Self::ALL_ENERGY_WITH_INDICES,
    Self::ALL_WEIGHT_WITH_INDICES, Self::ALL_VALUES_WITH_INDICES,
    Self::DETERMINISTIC, Self::DETERMINISTIC_WITH_INDICES ];

  /// build a non-deterministic representation from its axes.
  /// returns None for cached indices without a sparse layout.
  pub fn new(kind:ValueKind, layout:Layout, indices:bool)->Option<Self> {
    if indices && !layout.has_sparse() { return None }
    let mut bits = 0;
    if layout.has_sparse() {
      if kind.has_energy() { bits |= SE }
      if kind.has_weight() { bits |= SW }}
    if layout.has_dense() {
      if kind.has_energy() { bits |= DE }
      if kind.has_weight() { bits |= DW }}
    if indices { bits |= IX }
    Some(Self(bits)) }

  pub fn deterministic(indices:bool)->Self {
    if indices { Self::DETERMINISTIC_WITH_INDICES } else { Self::DETERMINISTIC }}

  pub fn is_deterministic(self)->bool { self.0 & DET != 0 }
  pub fn has_dense(self)->bool { self.0 & (DE|DW) != 0 }
  /// deterministic tables count as sparse
  pub fn has_sparse(self)->bool { self.0 & (SE|SW|DET) != 0 }
  pub fn has_dense_energy(self)->bool { self.0 & DE != 0 }
  pub fn has_dense_weight(self)->bool { self.0 & DW != 0 }
  pub fn has_sparse_energy(self)->bool { self.0 & SE != 0 }
  pub fn has_sparse_weight(self)->bool { self.0 & SW != 0 }
  pub fn has_sparse_indices(self)->bool { self.0 & IX != 0 }

  /// the value kind, or None when deterministic
  pub fn value_kind(self)->Option<ValueKind> {
    let e = self.0 & (SE|DE) != 0;
    let w = self.0 & (SW|DW) != 0;
    match (e, w) {
      (true, true) => Some(ValueKind::Both),
      (true, false) => Some(ValueKind::Energy),
      (false, true) => Some(ValueKind::Weight),
      (false, false) => None }}

  /// the layout, or None when deterministic
  pub fn layout(self)->Option<Layout> {
    match (self.0 & (SE|SW) != 0, self.has_dense()) {
      (true, true) => Some(Layout::Both),
      (true, false) => Some(Layout::Sparse),
      (false, true) => Some(Layout::Dense),
      (false, false) => None }}

  /// the same value kind and caching with a different layout.
  /// deterministic representations become sparse weights.
  pub fn with_layout(self, layout:Layout)->Self {
    let kind = self.value_kind().unwrap_or(ValueKind::Weight);
    let indices = self.has_sparse_indices() && layout.has_sparse();
    Self::new(kind, layout, indices).expect("indices only kept with a sparse layout") }

  pub fn name(self)->&'static str {
    match self.0 {
      SE => "SPARSE_ENERGY", SW => "SPARSE_WEIGHT", 0x0c => "ALL_SPARSE",
      DE => "DENSE_ENERGY", DW => "DENSE_WEIGHT", 0x03 => "ALL_DENSE",
      0x05 => "ALL_ENERGY", 0x0a => "ALL_WEIGHT", 0x0f => "ALL_VALUES",
      0x14 => "SPARSE_ENERGY_WITH_INDICES", 0x18 => "SPARSE_WEIGHT_WITH_INDICES",
      0x1c => "ALL_SPARSE_WITH_INDICES", 0x15 => "ALL_ENERGY_WITH_INDICES",
      0x1a => "ALL_WEIGHT_WITH_INDICES", 0x1f => "ALL_VALUES_WITH_INDICES",
      DET => "DETERMINISTIC", 0x30 => "DETERMINISTIC_WITH_INDICES",
      _ => "INVALID" }}}

impl fmt::Display for Representation {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.name()) }}

impl fmt::Debug for Representation {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self.name()) }}

#[test] fn test_repr_names() {
  let mut names: Vec<&str> = Representation::ALL.iter().map(|r| r.name()).collect();
  assert!(!names.contains(&"INVALID"));
  names.sort(); names.dedup();
  assert_eq!(names.len(), 17); }

#[test] fn test_repr_axes() {
  use Representation as R;
  assert_eq!(R::new(ValueKind::Weight, Layout::Both, false), Some(R::ALL_WEIGHT));
  assert_eq!(R::new(ValueKind::Both, Layout::Sparse, true), Some(R::ALL_SPARSE_WITH_INDICES));
  assert_eq!(R::new(ValueKind::Energy, Layout::Dense, true), None);
  assert_eq!(R::DENSE_WEIGHT.with_layout(Layout::Both), R::ALL_WEIGHT);
  assert_eq!(R::ALL_ENERGY_WITH_INDICES.with_layout(Layout::Dense), R::DENSE_ENERGY);
  assert_eq!(R::DETERMINISTIC_WITH_INDICES.with_layout(Layout::Sparse), R::SPARSE_WEIGHT_WITH_INDICES);
  assert!(R::DETERMINISTIC.has_sparse());
  assert!(!R::DETERMINISTIC.has_sparse_weight());
  assert_eq!(R::DETERMINISTIC.value_kind(), None);
  for r in R::ALL {
    if !r.is_deterministic() {
      let (k, l) = (r.value_kind().unwrap(), r.layout().unwrap());
      assert_eq!(R::new(k, l, r.has_sparse_indices()), Some(r)) }}}
