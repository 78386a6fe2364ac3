//! Deterministic factor functions with incremental updates.
use crate::det::{Arg, Change, DeterministicFunction, Matrix};
use crate::error::{Result, invalid};

/// How an input matrix of a `MatrixProduct` is passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
  /// one scalar argument per cell, by columns
  Cells,
  /// a single `Arg::Block` holding the whole matrix
  Opaque }

/// out = left * right, for an `nr x nx` left and an `nx x nc` right matrix.
///
/// Arguments are the `nr*nc` output cells by columns, then the left operand
/// (`nr*nx` cells by columns, or one block), then the right operand
/// (`nx*nc` cells by columns, or one block). Changing a left cell patches
/// one output row; changing a right cell patches one output column.
#[derive(Clone, Debug, PartialEq)]
pub struct MatrixProduct {
  nr: usize, nx: usize, nc: usize,
  left: Operand, right: Operand,
  /// 1/smoothing, when smoothing makes the function non-deterministic
  beta: Option<f64> }

fn cell_at(args:&[Arg], i:usize)->Result<f64> {
  match args[i].cell() { Some(x) => Ok(x), None => invalid(format!("argument {} should be a number", i)) }}

fn block_at(args:&[Arg], i:usize, rows:usize, cols:usize)->Result<&Matrix> {
  match args[i].block() {
    Some(m) if m.rows() == rows && m.cols() == cols => Ok(m),
    Some(m) => invalid(format!("argument {} is {}x{}, expected {}x{}", i, m.rows(), m.cols(), rows, cols)),
    None => invalid(format!("argument {} should be a {}x{} matrix", i, rows, cols)) }}

impl MatrixProduct {

  pub fn new(nr:usize, nx:usize, nc:usize)->Self {
    assert!(nr > 0 && nx > 0 && nc > 0, "matrix dimensions must be positive");
    MatrixProduct { nr, nx, nc, left: Operand::Cells, right: Operand::Cells, beta: None }}

  pub fn with_operands(mut self, left:Operand, right:Operand)->Self {
    self.left = left; self.right = right; self }

  /// energy becomes squared error / smoothing, and updates always recompute.
  pub fn with_smoothing(mut self, smoothing:f64)->Result<Self> {
    if smoothing.is_nan() || smoothing <= 0.0 { return invalid(format!("smoothing {} must be positive", smoothing)) }
    self.beta = Some(1.0 / smoothing);
    Ok(self) }

  pub fn is_deterministic(&self)->bool { self.beta.is_none() }

  fn left_offset(&self)->usize { self.nr * self.nc }

  fn left_len(&self)->usize { if self.left == Operand::Cells { self.nr * self.nx } else { 1 }}

  fn right_offset(&self)->usize { self.left_offset() + self.left_len() }

  fn right_len(&self)->usize { if self.right == Operand::Cells { self.nx * self.nc } else { 1 }}

  /// total number of arguments
  pub fn arg_count(&self)->usize { self.right_offset() + self.right_len() }

  fn check_args(&self, args:&[Arg])->Result<()> {
    if args.len() == self.arg_count() { Ok(()) }
    else { invalid(format!("expected {} arguments, got {}", self.arg_count(), args.len())) }}

  fn in_left(&self, i:usize)->bool { (self.left_offset()..self.right_offset()).contains(&i) }

  fn in_right(&self, i:usize)->bool { (self.right_offset()..self.arg_count()).contains(&i) }

  fn left_at(&self, args:&[Arg], r:usize, x:usize)->Result<f64> {
    let off = self.left_offset();
    match self.left {
      Operand::Cells => cell_at(args, off + x * self.nr + r),
      Operand::Opaque => Ok(block_at(args, off, self.nr, self.nx)?.get(r, x)) }}

  fn right_at(&self, args:&[Arg], x:usize, c:usize)->Result<f64> {
    let off = self.right_offset();
    match self.right {
      Operand::Cells => cell_at(args, off + c * self.nx + x),
      Operand::Opaque => Ok(block_at(args, off, self.nx, self.nc)?.get(x, c)) }}

  /// the product, computed from scratch, by columns
  fn product(&self, args:&[Arg])->Result<Vec<f64>> {
    let mut out = vec![0.0; self.nr * self.nc];
    for c in 0..self.nc {
      for r in 0..self.nr {
        let mut sum = 0.0;
        for x in 0..self.nx { sum += self.left_at(args, r, x)? * self.right_at(args, x, c)? }
        out[c * self.nr + r] = sum }}
    Ok(out) }}

impl DeterministicFunction for MatrixProduct {

  fn output_count(&self)->usize { self.nr * self.nc }

  /// a full recompute costs nr*nx*nc, one delta at most max(nr,nc)
  fn update_limit(&self)->usize {
    if self.beta.is_some() { 0 }
    else { (self.nr * self.nx * self.nc) / (2 * self.nr.max(self.nc)) }}

  fn is_tracked(&self, i:usize)->bool {
    (self.left == Operand::Cells && self.in_left(i)) || (self.right == Operand::Cells && self.in_right(i)) }

  fn eval_deterministic(&self, args:&mut [Arg])->Result<()> {
    self.check_args(args)?;
    let out = self.product(args)?;
    for (a, x) in args.iter_mut().zip(out) { *a = Arg::Cell(x) }
    Ok(()) }

  fn apply_delta(&self, args:&mut [Arg], change:&Change)->Result<()> {
    self.check_args(args)?;
    let d = change.new - change.old;
    let i = change.index;
    if self.right == Operand::Cells && self.in_right(i) {
      let x = i - self.right_offset();
      let (c, k) = (x / self.nx, x % self.nx);
      // column c of the output moves by left[.,k] * d
      for r in 0..self.nr { self.left_at(args, r, k)?; cell_at(args, c * self.nr + r)?; }
      for r in 0..self.nr {
        let o = c * self.nr + r;
        let v = cell_at(args, o)? + self.left_at(args, r, k)? * d;
        args[o] = Arg::Cell(v) }
      Ok(()) }
    else if self.left == Operand::Cells && self.in_left(i) {
      let x = i - self.left_offset();
      let (k, r) = (x / self.nr, x % self.nr);
      // row r of the output moves by d * right[k,.]
      for c in 0..self.nc { self.right_at(args, k, c)?; cell_at(args, c * self.nr + r)?; }
      for c in 0..self.nc {
        let o = c * self.nr + r;
        let v = cell_at(args, o)? + self.right_at(args, k, c)? * d;
        args[o] = Arg::Cell(v) }
      Ok(()) }
    else { invalid(format!("argument {} is not a tracked input", i)) }}

  fn eval_energy(&self, args:&[Arg])->Result<f64> {
    self.check_args(args)?;
    let expect = self.product(args)?;
    let mut error = 0.0;
    let mut agree = true;
    for (o, &e) in expect.iter().enumerate() {
      let x = cell_at(args, o)?;
      error += (x - e) * (x - e);
      agree &= crate::close(x, e) }
    Ok(match self.beta {
      Some(beta) => error * beta,
      None => if agree { 0.0 } else { f64::INFINITY } }) }}

/// out = sum of the inputs. argument 0 is the output.
#[derive(Clone, Debug, PartialEq)]
pub struct Sum { inputs: usize }

impl Sum {
  pub fn new(inputs:usize)->Self { Sum { inputs } }}

impl DeterministicFunction for Sum {
  fn output_count(&self)->usize { 1 }

  fn update_limit(&self)->usize { self.inputs }

  fn is_tracked(&self, i:usize)->bool { (1..=self.inputs).contains(&i) }

  fn eval_deterministic(&self, args:&mut [Arg])->Result<()> {
    if args.len() != self.inputs + 1 {
      return invalid(format!("expected {} arguments, got {}", self.inputs + 1, args.len())) }
    let mut total = 0.0;
    for i in 1..args.len() { total += cell_at(args, i)? }
    args[0] = Arg::Cell(total);
    Ok(()) }

  fn apply_delta(&self, args:&mut [Arg], change:&Change)->Result<()> {
    let out = cell_at(args, 0)?;
    args[0] = Arg::Cell(out + (change.new - change.old));
    Ok(()) }}

include!("test-functions.rs");
