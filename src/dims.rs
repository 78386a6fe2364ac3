//! Dimension sets -- bitmasks over the dimensions of a table.
use std::fmt;

/// A subset of the dimensions `0..nbits`. Used to name the output
/// dimensions of a directed table.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DimSet { nbits: usize, data: Vec<usize> }

const USIZE:usize = usize::BITS as usize;

impl DimSet {

  /// create an empty set over `nbits` dimensions
  pub fn new( nbits: usize )-> Self {
    DimSet { nbits, data: vec![0; nbits.div_ceil(USIZE)] }}

  /// constructor that takes the indices of the members.
  /// panics if any member is >= nbits.
  pub fn from_bits( nbits:usize, hi_bits: &[usize] )->Self {
    let mut res = DimSet::new(nbits);
    for &bit in hi_bits {
      assert!(bit < nbits, "dimension {} out of range for {} dimensions", bit, nbits);
      res.put(bit, true) }
    res}

  /// the members, in ascending order
  pub fn hi_bits(&self)->Vec<usize> {
    let mut res = vec![];
    for (j, &raw) in self.data.iter().enumerate() {
      let mut bits = raw;
      let offset = j * USIZE;
      while bits != 0 {
        let i = bits.trailing_zeros() as usize;
        res.push(offset + i);
        bits &= bits - 1 }}
    res}

  /// membership test. dimensions past the end are never members.
  pub fn get(&self, ix: usize )->bool {
    ix < self.nbits && 0 < (self.data[ix/USIZE] & 1 << (ix%USIZE)) }

  /// add or remove a dimension
  pub fn put(&mut self, ix:usize, v:bool) {
    let i = ix/USIZE; let x = self.data[i];
    self.data[i] =
      if v { x |  (1 << (ix%USIZE)) }
      else { x & !(1 << (ix%USIZE)) }}

  /// the number of dimensions this set ranges over.
  pub fn nbits(&self)->usize { self.nbits }

  /// the number of members.
  pub fn count(&self)->usize { self.data.iter().map(|x| x.count_ones() as usize).sum() }

  /// true when there are no members.
  pub fn is_empty(&self)->bool { self.data.iter().all(|&x| x == 0) }

  /// true when every dimension is a member.
  pub fn is_full(&self)->bool { self.count() == self.nbits }

  /// the dimensions not in this set
  pub fn complement(&self)->Self {
    let mut res = DimSet::new(self.nbits);
    for i in 0..self.nbits { res.put(i, !self.get(i)) }
    res}

  /// the same members, viewed over a different number of dimensions.
  /// returns None if a member would fall out of range.
  pub fn resized(&self, nbits:usize)->Option<Self> {
    let bits = self.hi_bits();
    if bits.iter().any(|&b| b >= nbits) { None }
    else { Some(DimSet::from_bits(nbits, &bits)) }}

} // impl DimSet

/// display membership from the highest dimension down,
/// e.g. dims[o1o] for {1} over 3 dimensions.
impl fmt::Display for DimSet {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "dims[")?;
    for i in (0..self.nbits).rev() { write!(f, "{}", if self.get(i) {'1'} else {'o'})? }
    write!(f, "]") }}

/// Same as fmt::Display.
impl fmt::Debug for DimSet { // for test suite output
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}", self) }}

#[test] #[allow(clippy::bool_assert_comparison)]
fn test_dims_mut() {
  let mut dims = DimSet::new(66);
  assert_eq!(dims.data.len(), 2);
  assert_eq!(dims.get(0), false);
  dims.put(0, true);
  assert_eq!(dims.data[0], 1); // dimension 0 is the least significant bit
  assert_eq!(dims.data[1], 0);
  assert_eq!(dims.get(0), true);
  assert_eq!(dims.get(1), false);
  dims.put(65, true);
  assert_eq!(dims.count(), 2);
  assert_eq!(dims.get(66), false, "past the end is never a member");
  dims.put(0, false);
  assert_eq!(dims.hi_bits(), [65]); }

#[test] fn test_dims_bits() {
  let s = DimSet::from_bits(4, &[3,1]);
  assert_eq!(s.hi_bits(), [1,3], "members should come back in order");
  assert_eq!(s.complement().hi_bits(), [0,2]);
  assert_eq!(s.to_string(), "dims[1o1o]");
  let big = DimSet::from_bits(65, &[64,63]);
  assert_eq!(big.hi_bits(), [63,64]);
  assert!(!big.is_empty());
  assert!(DimSet::new(3).is_empty());
  assert!(DimSet::from_bits(2, &[0,1]).is_full()); }

#[test] fn test_dims_resized() {
  let s = DimSet::from_bits(2, &[1]);
  assert_eq!(s.resized(4), Some(DimSet::from_bits(4, &[1])));
  assert_eq!(s.resized(1), None); }
