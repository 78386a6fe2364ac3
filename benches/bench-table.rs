use divan::{Bencher, black_box};
use rand::{SeedableRng, rngs::StdRng};
use ftab::{Domain, FactorTable, Representation, MatrixProduct, Arg, Change, DeterministicFunction};

fn main() { divan::main() }

/// n x n table with random weights, stored sparse
fn square(n:i64)->FactorTable {
  let mut rng = StdRng::seed_from_u64(0);
  let mut t = FactorTable::from_domains(vec![Domain::range(0, n-1), Domain::range(0, n-1)]);
  t.randomize_weights(&mut rng).unwrap();
  t }

#[divan::bench]
fn sparse_to_dense(b:Bencher) {
  b.with_inputs(|| square(64))
   .bench_values(|mut t| { t.set_representation(Representation::DENSE_WEIGHT).unwrap(); t }) }

#[divan::bench]
fn weight_lookup_sparse(b:Bencher) {
  let t = square(64);
  b.bench(|| (0..4096).map(|ji| t.weight_for_joint(black_box(ji)).unwrap()).sum::<f64>()) }

#[divan::bench]
fn iterate_entries(b:Bencher) {
  let t = square(64);
  b.bench(|| {
    let mut cur = t.cursor();
    let mut total = 0.0;
    while cur.advance() { total += cur.weight() }
    total }) }

#[divan::bench(args = [1, 4, 16])]
fn product_update(b:Bencher, n_changes:usize) {
  let f = MatrixProduct::new(16, 16, 16);
  let n_out = f.output_count();
  let mut args: Vec<Arg> = (0..f.arg_count()).map(|i| Arg::Cell(if i < n_out { 0.0 } else { (i % 7) as f64 })).collect();
  f.eval_deterministic(&mut args).unwrap();
  b.bench_local(|| {
    let changes: Vec<Change> = (0..n_changes).map(|k| {
      let index = n_out + 17 * k;
      let old = args[index].cell().unwrap_or(0.0);
      args[index] = Arg::Cell(old + 1.0);
      Change { index, old, new: old + 1.0 }}).collect();
    f.update_deterministic(&mut args, &changes).unwrap() }) }
