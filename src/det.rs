//! Deterministic functions and their incremental update protocol.
//!
//! A deterministic function computes its outputs from its inputs. The
//! argument vector holds the outputs first, then the inputs. When a few
//! inputs change, a function may patch its outputs in place instead of
//! recomputing them, provided the batch is small enough (at most
//! `update_limit()` changes) and every changed argument is tracked.
use crate::error::{Result, invalid};

/// A dense matrix stored by columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix { rows: usize, cols: usize, data: Vec<f64> }

impl Matrix {
  pub fn zeros(rows:usize, cols:usize)->Self { Matrix { rows, cols, data: vec![0.0; rows * cols] }}

  /// build from row vectors. panics if the rows are ragged.
  pub fn from_rows(rows:&[Vec<f64>])->Self {
    let (nr, nc) = (rows.len(), rows.first().map_or(0, |r| r.len()));
    let mut m = Matrix::zeros(nr, nc);
    for (r, row) in rows.iter().enumerate() {
      assert_eq!(row.len(), nc, "ragged matrix rows");
      for (c, &x) in row.iter().enumerate() { m.set(r, c, x) }}
    m }

  pub fn rows(&self)->usize { self.rows }
  pub fn cols(&self)->usize { self.cols }
  #[inline] pub fn get(&self, r:usize, c:usize)->f64 { self.data[c * self.rows + r] }
  #[inline] pub fn set(&mut self, r:usize, c:usize, x:f64) { self.data[c * self.rows + r] = x }}

/// One argument of a deterministic function.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
  /// a single scalar value
  Cell(f64),
  /// a whole operand passed as one opaque, pre-aggregated value
  Block(Matrix) }

impl Arg {
  pub fn cell(&self)->Option<f64> { match self { Arg::Cell(x) => Some(*x), Arg::Block(_) => None }}
  pub fn block(&self)->Option<&Matrix> { match self { Arg::Block(m) => Some(m), Arg::Cell(_) => None }}}

/// A changed input. The argument vector already holds `new`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Change { pub index: usize, pub old: f64, pub new: f64 }

/// How an update was carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome { Incremental, Recomputed }

pub trait DeterministicFunction {
  /// number of leading arguments that are outputs
  fn output_count(&self)->usize;

  /// largest batch of changes worth applying incrementally (0: never)
  fn update_limit(&self)->usize { 0 }

  /// whether a change to the argument at `index` can be applied as a delta
  fn is_tracked(&self, _index:usize)->bool { false }

  /// overwrite the outputs with values computed from the inputs
  fn eval_deterministic(&self, args:&mut [Arg])->Result<()>;

  /// patch the outputs for one tracked change
  fn apply_delta(&self, _args:&mut [Arg], change:&Change)->Result<()> {
    invalid(format!("argument {} cannot be updated incrementally", change.index)) }

  /// 0 when the outputs agree with the inputs, infinity otherwise
  fn eval_energy(&self, args:&[Arg])->Result<f64> {
    let n = self.output_count();
    let mut expect = args.to_vec();
    self.eval_deterministic(&mut expect)?;
    let agree = args[..n].iter().zip(&expect[..n]).all(|(a, b)| match (a.cell(), b.cell()) {
      (Some(x), Some(y)) => crate::close(x, y),
      _ => a == b });
    Ok(if agree { 0.0 } else { f64::INFINITY }) }

  /// bring the outputs up to date after `changes`. see `update`.
  fn update_deterministic(&self, args:&mut [Arg], changes:&[Change])->Result<UpdateOutcome> {
    update(self, args, changes) }}

/// Bring the outputs of `f` up to date after `changes`.
///
/// Every change must name an input argument; otherwise nothing is touched
/// and the call fails. The outputs are recomputed in full when the limit is
/// zero, when there are more changes than the limit, or when any change is
/// untracked. Otherwise each delta is applied in place. If a delta fails,
/// `args` is put back as it was passed in before the error is returned.
pub fn update<F:DeterministicFunction+?Sized>(f:&F, args:&mut [Arg], changes:&[Change])->Result<UpdateOutcome> {
  let n_out = f.output_count();
  for c in changes {
    if c.index < n_out || c.index >= args.len() {
      return invalid(format!("argument {} is not an input", c.index)) }}
  let limit = f.update_limit();
  let incremental = limit > 0 && changes.len() <= limit
    && changes.iter().all(|c| f.is_tracked(c.index) && args[c.index].cell().is_some());
  if !incremental {
    debug!("recomputing: {} changes, limit {}", changes.len(), limit);
    f.eval_deterministic(args)?;
    return Ok(UpdateOutcome::Recomputed) }
  let saved = args[..n_out].to_vec();
  // replay the changes in order, starting from the inputs the outputs describe
  for c in changes.iter().rev() { args[c.index] = Arg::Cell(c.old) }
  for (i, c) in changes.iter().enumerate() {
    args[c.index] = Arg::Cell(c.new);
    if c.new == c.old { continue }
    if let Err(e) = f.apply_delta(args, c) {
      args[..n_out].clone_from_slice(&saved);
      for c in &changes[i..] { args[c.index] = Arg::Cell(c.new) }
      return Err(e) }}
  debug!("applied {} changes incrementally", changes.len());
  Ok(UpdateOutcome::Incremental) }

#[test] fn test_matrix() {
  let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
  assert_eq!((m.rows(), m.cols()), (3, 2));
  assert_eq!(m.get(2, 1), 6.0);
  assert_eq!(m.data, vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0], "stored by columns"); }

#[test] fn test_arg_views() {
  assert_eq!(Arg::Cell(2.5).cell(), Some(2.5));
  assert!(Arg::Cell(2.5).block().is_none());
  assert!(Arg::Block(Matrix::zeros(1, 1)).cell().is_none()); }
