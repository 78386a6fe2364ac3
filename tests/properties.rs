// property tests for factor tables and incremental updates
use ftab::{Domain, DimSet, FactorTable, Representation, MatrixProduct, Arg, Change, UpdateOutcome};
use ftab::{DeterministicFunction, energy_to_weight, weight_to_energy};
use proptest::prelude::*;

#[cfg(feature="slowtests")] const CASES: u32 = 4096;
#[cfg(not(feature="slowtests"))] const CASES: u32 = 256;

fn near(a:f64, b:f64, tol:f64)->bool { a == b || (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0) }

fn t2x3(weights:&[f64])->FactorTable {
  let mut t = FactorTable::from_domains(vec![Domain::range(0,1), Domain::range(0,2)]);
  t.set_weights_dense(weights).unwrap();
  t }

proptest! {
  #![proptest_config(ProptestConfig::with_cases(CASES))]

  #[test]
  fn energy_weight_roundtrip(w in 1e-100f64..1e100) {
    prop_assert!(near(energy_to_weight(weight_to_energy(w)), w, 1e-12)); }

  #[test]
  fn conversions_keep_values(ws in prop::collection::vec(0f64..10.0, 6), r in 0usize..15) {
    let rep = Representation::ALL[r];
    let mut t = t2x3(&ws);
    t.set_representation(rep).unwrap();
    prop_assert_eq!(t.representation(), rep);
    for (ji, &w) in ws.iter().enumerate() {
      prop_assert!(near(t.weight_for_joint(ji).unwrap(), w, 1e-12)) }
    prop_assert_eq!(t.count_non_zero_weights(), ws.iter().filter(|&&w| w != 0.0).count()); }

  #[test]
  fn rows_sum_to_one(ws in prop::collection::vec(0.01f64..10.0, 6)) {
    let mut t = t2x3(&ws);
    t.set_directed(Some(&DimSet::from_bits(2, &[0]))).unwrap();
    t.normalize_conditional().unwrap();
    prop_assert!(t.is_conditional());
    for i1 in 0..3 {
      let total: f64 = (0..2).map(|i0| t.weight_for_indices(&[i0, i1]).unwrap()).sum();
      prop_assert!(near(total, 1.0, 1e-12)) }}

  #[test]
  fn direction_roundtrip(ws in prop::collection::vec(0f64..10.0, 6), out in 0usize..2) {
    let orig = t2x3(&ws);
    let mut t = orig.clone();
    t.set_directed(Some(&DimSet::from_bits(2, &[out]))).unwrap();
    t.set_directed(None).unwrap();
    prop_assert!(t == orig); }

  #[test]
  fn incremental_matches_full(
      nr in 1usize..4, nx in 1usize..4, nc in 1usize..4,
      vals in prop::collection::vec(-5f64..5.0, 18),
      edits in prop::collection::vec((0usize..1000, -5f64..5.0), 0..6)) {
    let f = MatrixProduct::new(nr, nx, nc);
    let n_out = f.output_count();
    let n_in = f.arg_count() - n_out;
    let mut args: Vec<Arg> = (0..f.arg_count()).map(|i| Arg::Cell(if i < n_out { 0.0 } else { vals[i - n_out] })).collect();
    f.eval_deterministic(&mut args).unwrap();
    let mut changes = vec![];
    for &(k, new) in &edits {
      let index = n_out + k % n_in;
      let old = args[index].cell().unwrap();
      args[index] = Arg::Cell(new);
      changes.push(Change { index, old, new }) }
    let outcome = ftab::det::update(&f, &mut args, &changes).unwrap();
    let limit = f.update_limit();
    prop_assert_eq!(outcome == UpdateOutcome::Incremental, limit > 0 && changes.len() <= limit);
    let mut full = args.clone();
    f.eval_deterministic(&mut full).unwrap();
    for o in 0..n_out {
      prop_assert!(near(args[o].cell().unwrap(), full[o].cell().unwrap(), 1e-9)) }}
}
