//! Discrete domains and their elements.
use std::fmt;

/// A single value drawn from a discrete domain.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Elem { Int(i64), Sym(String) }

impl Elem {
  /// numeric view of the element (used by deterministic functions).
  pub fn as_f64(&self)->Option<f64> {
    match self { Elem::Int(i) => Some(*i as f64), Elem::Sym(_) => None }}

  pub fn as_i64(&self)->Option<i64> {
    match self { Elem::Int(i) => Some(*i), Elem::Sym(_) => None }}}

impl From<i64> for Elem { fn from(i:i64)->Self { Elem::Int(i) }}
impl From<&str> for Elem { fn from(s:&str)->Self { Elem::Sym(s.to_string()) }}

impl fmt::Display for Elem {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self { Elem::Int(i) => write!(f, "{}", i), Elem::Sym(s) => write!(f, "{}", s) }}}

/// element count of lo..=hi, if the range is nonempty and its size fits a usize
pub(crate) fn range_size(lo:i64, hi:i64)->Option<usize> {
  if lo > hi { return None }
  usize::try_from(hi as i128 - lo as i128).ok()?.checked_add(1) }

/// A finite ordered set of elements. Every domain has at least one element.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Domain {
  /// the integers lo..=hi
  Range { lo: i64, hi: i64 },
  /// an explicit list of distinct elements
  Enum(Vec<Elem>) }

impl Domain {
  pub fn range(lo:i64, hi:i64)->Domain {
    assert!(range_size(lo, hi).is_some(), "bad domain range {}..={}", lo, hi);
    Domain::Range { lo, hi }}

  /// the two-element domain {0,1}
  pub fn bit()->Domain { Domain::range(0, 1) }

  pub fn of(elems:Vec<Elem>)->Domain {
    assert!(!elems.is_empty(), "a domain needs at least one element");
    for (i, e) in elems.iter().enumerate() {
      assert!(!elems[..i].contains(e), "duplicate element {} in domain", e) }
    Domain::Enum(elems) }

  pub fn symbols(names:&[&str])->Domain {
    Domain::of(names.iter().map(|&s| Elem::from(s)).collect()) }

  /// number of elements
  pub fn size(&self)->usize {
    match self {
      Domain::Range { lo, hi } => (*hi as i128 - *lo as i128) as usize + 1,
      Domain::Enum(v) => v.len() }}

  /// element at the given position, if any
  pub fn element(&self, i:usize)->Option<Elem> {
    if i >= self.size() { return None }
    match self {
      Domain::Range { lo, .. } => Some(Elem::Int((*lo as i128 + i as i128) as i64)),
      Domain::Enum(v) => Some(v[i].clone()) }}

  /// position of the given element, if it belongs to the domain
  pub fn index_of(&self, e:&Elem)->Option<usize> {
    match (self, e) {
      (Domain::Range { lo, hi }, Elem::Int(i)) =>
        if lo <= i && i <= hi { Some((*i as i128 - *lo as i128) as usize) } else { None },
      (Domain::Range { .. }, Elem::Sym(_)) => None,
      (Domain::Enum(v), e) => v.iter().position(|x| x == e) }}

  /// position of the integer element equal to `x`, if any
  pub fn index_of_value(&self, x:f64)->Option<usize> {
    if x.fract() != 0.0 || !x.is_finite() { return None }
    self.index_of(&Elem::Int(x as i64)) }}

impl fmt::Display for Domain {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Domain::Range { lo, hi } => write!(f, "{}..={}", lo, hi),
      Domain::Enum(v) => {
        write!(f, "{{")?;
        for (i, e) in v.iter().enumerate() {
          if i > 0 { write!(f, ",")? }
          write!(f, "{}", e)? }
        write!(f, "}}") }}}}

#[test] fn test_domain_range() {
  let d = Domain::range(2, 12);
  assert_eq!(d.size(), 11);
  assert_eq!(d.element(0), Some(Elem::Int(2)));
  assert_eq!(d.element(10), Some(Elem::Int(12)));
  assert_eq!(d.element(11), None);
  assert_eq!(d.index_of(&Elem::Int(7)), Some(5));
  assert_eq!(d.index_of(&Elem::Int(13)), None);
  assert_eq!(d.index_of_value(7.0), Some(5));
  assert_eq!(d.index_of_value(7.5), None); }

#[test] fn test_domain_enum() {
  let d = Domain::symbols(&["a", "b", "c"]);
  assert_eq!(d.size(), 3);
  assert_eq!(d.index_of(&Elem::from("b")), Some(1));
  assert_eq!(d.index_of(&Elem::Int(1)), None);
  assert_eq!(d.to_string(), "{a,b,c}"); }

#[test] #[should_panic] fn test_domain_dups() { Domain::symbols(&["a", "a"]); }

#[test] fn test_domain_wide_range() {
  assert_eq!(range_size(i64::MIN, i64::MAX), None);
  assert_eq!(range_size(3, 2), None);
  let d = Domain::range(i64::MIN, 0);
  assert_eq!(d.size(), 1usize << 63 | 1);
  assert_eq!(d.element(0), Some(Elem::Int(i64::MIN)));
  assert_eq!(d.index_of(&Elem::Int(0)), Some(1usize << 63));
  assert_eq!(d.element(1usize << 63), Some(Elem::Int(0))); }

#[test] #[should_panic] fn test_domain_too_wide() { Domain::range(i64::MIN, i64::MAX); }

#[test] fn test_domain_huge() {
  let d = Domain::range(0, i32::MAX as i64 - 1);
  assert_eq!(d.size(), i32::MAX as usize); }
