//! Reindexers: bijections between the joint assignments of two indexers.
use crate::{dims::DimSet, indexer::DomainIndexer};
use crate::error::{Result, invalid};

/// Maps each index tuple of `from_indexer()` to exactly one index tuple of
/// `to_indexer()`, and every tuple of the target is hit once.
pub trait Reindexer {
  fn from_indexer(&self)->&DomainIndexer;
  fn to_indexer(&self)->&DomainIndexer;
  /// write the target tuple for `from` into `to`.
  fn map_indices(&self, from:&[usize], to:&mut [usize]); }

/// Reorders dimensions: dimension `i` of the target is dimension `perm[i]`
/// of the source. Output dimensions move with their domains.
#[derive(Clone, Debug)]
pub struct Permuter { from: DomainIndexer, to: DomainIndexer, perm: Vec<usize> }

impl Permuter {
  pub fn new(from:&DomainIndexer, perm:Vec<usize>)->Result<Self> {
    let n = from.dimensions();
    let mut seen = vec![false; n];
    if perm.len() != n { return invalid(format!("permutation {:?} has the wrong length for {} dimensions", perm, n)) }
    for &p in &perm {
      if p >= n || seen[p] { return invalid(format!("{:?} is not a permutation of 0..{}", perm, n)) }
      seen[p] = true }
    let domains = perm.iter().map(|&p| from.domain(p).clone()).collect();
    let to = match from.output_set() {
      None => DomainIndexer::new(domains),
      Some(_) => {
        let outs: Vec<usize> = (0..n).filter(|&i| from.is_output(perm[i])).collect();
        DomainIndexer::directed(domains, &DimSet::from_bits(n, &outs))? }};
    Ok(Permuter { from: from.clone(), to, perm }) }

  pub fn identity(from:&DomainIndexer)->Self {
    Permuter { from: from.clone(), to: from.clone(), perm: (0..from.dimensions()).collect() }}

  pub fn permutation(&self)->&[usize] { &self.perm }}

impl Reindexer for Permuter {
  fn from_indexer(&self)->&DomainIndexer { &self.from }
  fn to_indexer(&self)->&DomainIndexer { &self.to }
  fn map_indices(&self, from:&[usize], to:&mut [usize]) {
    for (t, &p) in to.iter_mut().zip(&self.perm) { *t = from[p] }}}

#[test] fn test_permuter() {
  use crate::domain::Domain;
  let ix = DomainIndexer::directed(vec![Domain::range(0,1), Domain::range(0,2)], &DimSet::from_bits(2, &[1])).unwrap();
  let p = Permuter::new(&ix, vec![1,0]).unwrap();
  assert_eq!(p.to_indexer().domain_size(0), 3);
  assert_eq!(p.to_indexer().output_dims(), &[0]);
  let mut out = vec![0; 2];
  p.map_indices(&[1,2], &mut out);
  assert_eq!(out, vec![2,1]);
  assert!(Permuter::new(&ix, vec![0,0]).is_err());
  assert!(Permuter::new(&ix, vec![0]).is_err());
  assert_eq!(Permuter::identity(&ix).to_indexer(), &ix); }
