// test suite for factor tables
// (included from table.rs)

#[cfg(test)] use crate::{functions::Sum, reindex::Permuter, FactorTableEntry};
#[cfg(test)] use rand::{SeedableRng, rngs::StdRng};

/// empty 2x3 undirected table
#[cfg(test)] fn t2x3()->FactorTable {
  FactorTable::from_domains(vec![Domain::range(0,1), Domain::range(0,2)]) }

/// 2x3 table with weights 1..=6 in joint order
#[cfg(test)] fn t2x3_dense()->FactorTable {
  let mut t = t2x3();
  t.set_weights_dense(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
  t }

/// out = a xor b, over three bits with the output first
#[cfg(test)] fn xor2()->FactorTable {
  let mut t = FactorTable::directed(vec![Domain::bit(); 3], &DimSet::from_bits(3, &[0])).unwrap();
  for a in 0..2 { for b in 0..2 { t.set_weight_for_indices(&[a ^ b, a, b], 1.0).unwrap() }}
  t }

/// sum of two dice, given the dice
#[cfg(test)] fn dice()->FactorTable {
  let doms = vec![Domain::range(2,12), Domain::range(1,6), Domain::range(1,6)];
  FactorTable::directed(doms, &DimSet::from_bits(3, &[0])).unwrap() }

#[cfg(test)] fn assert_close(a:f64, b:f64) { assert!(close(a, b), "{} != {}", a, b) }

#[test] fn test_new_table() {
  let t = t2x3();
  assert_eq!(t.representation(), Representation::SPARSE_ENERGY);
  assert_eq!(t.dimensions(), 2);
  assert_eq!(t.domain_sizes(), &[2, 3]);
  assert_eq!(t.joint_size().unwrap(), 6);
  assert_eq!(t.sparse_size(), 0);
  assert_eq!(t.density(), 0.0);
  assert_eq!(t.weight_for_joint(3).unwrap(), 0.0);
  assert_eq!(t.energy_for_joint(3).unwrap(), f64::INFINITY);
  assert!(!t.is_directed());
  assert!(!t.is_normalized());
  assert!(!t.is_deterministic_directed()); }

#[test] fn test_set_and_get() {
  let mut t = t2x3();
  t.set_weight_for_indices(&[1,2], 0.5).unwrap();
  t.set_energy_for_joint(0, 1.0).unwrap();
  t.set_weight_for_elements(&[Elem::Int(1), Elem::Int(0)], 2.0).unwrap();
  assert_eq!(t.representation(), Representation::SPARSE_ENERGY, "setters keep the representation");
  assert_close(t.energy_for_joint(5).unwrap(), 2f64.ln());
  assert_close(t.weight_for_indices(&[0,0]).unwrap(), (-1f64).exp());
  assert_close(t.weight_for_joint(1).unwrap(), 2.0);
  assert_close(t.energy_for_elements(&[Elem::Int(0), Elem::Int(0)]).unwrap(), 1.0);
  assert_eq!(t.sparse_size(), 3);
  assert_eq!(t.sparse_index_from_joint(5).unwrap(), Some(2));
  assert_eq!(t.sparse_index_from_joint(3).unwrap(), None);
  assert_eq!(t.sparse_index_from_indices(&[1,0]).unwrap(), Some(1));
  assert_eq!(t.sparse_index_from_elements(&[Elem::Int(1), Elem::Int(2)]).unwrap(), Some(2));
  let mut buf = vec![0; 2];
  t.sparse_index_to_indices(2, &mut buf).unwrap();
  assert_eq!(buf, vec![1,2]);
  assert_eq!(t.sparse_index_to_joint(1).unwrap(), 1);
  assert_eq!(t.sparse_index_to_elements(0).unwrap(), vec![Elem::Int(0), Elem::Int(0)]);
  assert_close(t.weight_for_sparse(2).unwrap(), 0.5);
  t.set_energy_for_sparse(2, 0.0).unwrap();
  assert_close(t.weight_for_indices(&[1,2]).unwrap(), 1.0);
  assert!(t.weight_for_sparse(3).is_err());
  assert!(t.sparse_energies().is_some());
  assert!(t.sparse_weights().is_none()); }

#[test] fn test_invalid_values() {
  let mut t = t2x3();
  assert!(t.set_weight_for_joint(0, -1.0).is_err());
  assert!(t.set_weight_for_joint(0, f64::NAN).is_err());
  assert!(t.set_weight_for_joint(0, f64::INFINITY).is_err());
  assert!(t.set_energy_for_joint(0, f64::NEG_INFINITY).is_err());
  assert!(t.set_energy_for_joint(0, f64::NAN).is_err());
  let e = t.set_weight_for_joint(6, 1.0).unwrap_err();
  assert_eq!(e.to_string(), "Joint index 6 is out of range");
  assert!(t.set_weight_for_indices(&[2,0], 1.0).is_err());
  assert!(t.set_weight_for_indices(&[0,0,0], 1.0).is_err());
  assert!(t.set_weight_for_elements(&[Elem::Int(0), Elem::from("x")], 1.0).is_err());
  assert_eq!(t.sparse_size(), 0, "failed writes change nothing");
  // a zero write to an absent entry adds no slot
  t.set_weight_for_joint(0, 0.0).unwrap();
  t.set_energy_for_joint(1, f64::INFINITY).unwrap();
  assert_eq!(t.sparse_size(), 0); }

#[test] fn test_dense_setters() {
  let mut t = t2x3();
  let e = t.set_weights_dense(&[1.0; 5]).unwrap_err();
  assert_eq!(e.to_string(), "Bad dense length: expected 6, got 5");
  assert!(t.set_weights_dense(&[1.0, 1.0, 1.0, 1.0, 1.0, -1.0]).is_err());
  t.set_weights_dense(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
  assert_eq!(t.representation(), Representation::DENSE_WEIGHT);
  assert_eq!(t.sparse_size(), 5, "nonzero entries of a dense-only table");
  assert_eq!(t.weight_for_joint(4).unwrap(), 4.0);
  assert_eq!(t.weight_for_sparse(0).unwrap(), 1.0);
  assert_eq!(t.representation(), Representation::ALL_WEIGHT, "slot access adds a sparse layout");
  t.set_energies_dense(&[0.0; 6]).unwrap();
  assert_eq!(t.representation(), Representation::DENSE_ENERGY);
  assert!(t.has_maximum_density());
  assert_eq!(t.energy_for_sparse(5).unwrap(), 0.0);
  assert_eq!(t.representation(), Representation::ALL_ENERGY); }

#[test] fn test_sparse_setters() {
  let mut t = t2x3();
  t.set_weights_sparse(&[vec![1usize,2], vec![0,0]], &[0.5, 0.25]).unwrap();
  assert_eq!(t.representation(), Representation::SPARSE_WEIGHT);
  assert_eq!(t.sparse_index_to_joint(0).unwrap(), 0, "slots sorted by joint index");
  assert_eq!(t.sparse_index_to_joint(1).unwrap(), 5);
  assert_eq!(t.sparse_weights(), Some(&[0.25, 0.5][..]));
  let e = t.set_weights_sparse(&[[1usize,1], [0,1], [1,1]], &[1.0, 2.0, 3.0]).unwrap_err();
  assert_eq!(e.to_string(), "Multiple entries with same set of indices [1, 1]");
  assert!(t.set_weights_sparse(&[[1usize,1]], &[1.0, 2.0]).is_err());
  assert!(t.set_weights_sparse(&[[1usize,3]], &[1.0]).is_err());
  assert_eq!(t.sparse_size(), 2, "failed bulk sets change nothing");
  t.set_energies_sparse_joint(&[3, 1], &[0.0, 1.0]).unwrap();
  assert_eq!(t.representation(), Representation::SPARSE_ENERGY);
  assert_eq!(t.sparse_index_to_joint(0).unwrap(), 1);
  assert_eq!(t.energy_for_joint(1).unwrap(), 1.0);
  assert!(t.set_energies_sparse_joint(&[3, 3], &[0.0, 1.0]).is_err());
  assert!(t.set_energies_sparse_joint(&[6], &[0.0]).is_err()); }

#[test] fn test_representation_conversions() {
  let _ = simplelog::TestLogger::init(simplelog::LevelFilter::Trace, simplelog::Config::default());
  let orig = t2x3_dense();
  for &r in Representation::ALL.iter().filter(|r| !r.is_deterministic()) {
    let mut t = orig.clone();
    t.set_representation(r).unwrap();
    assert_eq!(t.representation(), r);
    assert_eq!(t.has_sparse_indices(), r.has_sparse_indices());
    for ji in 0..6 { assert_close(t.weight_for_joint(ji).unwrap(), (ji + 1) as f64) }
    assert!(t == orig, "{} holds the same values", r);
    t.set_representation(Representation::DENSE_WEIGHT).unwrap();
    assert!(t == orig, "and converts back from {}", r) }
  let mut t = orig.clone();
  assert!(matches!(t.set_representation(Representation::DETERMINISTIC),
    Err(TableError::UnsupportedRepresentation(_))));
  assert_eq!(t.representation(), Representation::DENSE_WEIGHT); }

#[test] fn test_xor_deterministic() {
  let mut t = xor2();
  assert_eq!(t.representation(), Representation::SPARSE_ENERGY);
  assert!(t.is_deterministic_directed());
  assert!(t.is_conditional());
  t.set_representation(Representation::DETERMINISTIC).unwrap();
  assert!(t.has_deterministic_representation());
  assert_eq!(t.sparse_size(), 4);
  let mut elems = vec![Elem::Int(0), Elem::Int(1), Elem::Int(1)];
  t.eval_deterministic(&mut elems).unwrap();
  assert_eq!(elems[0], Elem::Int(0));
  elems[2] = Elem::Int(0);
  t.eval_deterministic(&mut elems).unwrap();
  assert_eq!(elems[0], Elem::Int(1));

  // breaking and restoring determinism
  t.set_energy_for_indices(&[1,1,0], 23.0).unwrap();
  assert_eq!(t.representation(), Representation::SPARSE_WEIGHT, "writes leave the deterministic form");
  assert!(!t.is_deterministic_directed());
  assert!(t.eval_deterministic(&mut elems).is_err());
  t.set_energy_for_indices(&[1,1,0], 0.0).unwrap();
  assert!(t.is_deterministic_directed());

  t.set_weight_for_indices(&[0,0,0], 2.0).unwrap();
  assert!(!t.is_deterministic_directed());
  assert!(!t.is_normalized());
  t.normalize_conditional().unwrap();
  assert_close(t.weight_for_indices(&[0,0,0]).unwrap(), 1.0);
  assert!(t.is_normalized());
  assert!(t.is_deterministic_directed()); }

#[test] fn test_normalize() {
  let mut t = t2x3();
  assert!(matches!(t.normalize(), Err(TableError::ZeroTotalWeight)));
  t.set_weights_dense(&[1.0, 1.0, 1.0, 1.0, 2.0, 2.0]).unwrap();
  t.normalize().unwrap();
  assert!(t.is_normalized());
  assert_eq!(t.weight_for_joint(0).unwrap(), 0.125);
  assert_eq!(t.weight_for_joint(5).unwrap(), 0.25);
  t.set_weight_for_joint(0, 0.125).unwrap();
  assert!(!t.is_normalized(), "any write forgets normalization");
  assert!(matches!(t.normalize_conditional(), Err(TableError::UnsupportedForUndirected(_))));
  let mut d = xor2();
  assert!(matches!(d.normalize(), Err(TableError::UnsupportedForDirected(_)))); }

#[test] fn test_normalize_conditional_zero_row() {
  let mut t = FactorTable::directed(vec![Domain::range(0,1), Domain::range(0,2)], &DimSet::from_bits(2, &[0])).unwrap();
  t.set_weights_dense(&[1.0, 1.0, 0.0, 0.0, 1.0, 3.0]).unwrap();
  assert!(matches!(t.normalize_conditional(), Err(TableError::ZeroTotalWeightForSomeInput)));
  assert_eq!(t.weight_for_joint(5).unwrap(), 3.0, "unchanged after failure");
  t.set_weight_for_joint(2, 2.0).unwrap();
  t.normalize_conditional().unwrap();
  assert_eq!(t.weight_for_joint(0).unwrap(), 0.5);
  assert_eq!(t.weight_for_joint(2).unwrap(), 1.0);
  assert_eq!(t.weight_for_joint(5).unwrap(), 0.75); }

#[test] fn test_set_directed() {
  let orig = t2x3_dense();
  let mut t = orig.clone();
  t.set_directed(Some(&DimSet::from_bits(2, &[1]))).unwrap();
  assert!(t.is_directed());
  assert!(!t.is_normalized());
  let mut idx = vec![0, 0];
  loop {
    assert_eq!(t.weight_for_indices(&idx).unwrap(), orig.weight_for_indices(&idx).unwrap());
    if !t.indexer().increment_indices(&mut idx) { break }}
  // outputs vary fastest in the joint layout
  assert_eq!(t.weight_for_joint(1).unwrap(), 3.0);
  assert!(t != orig);
  t.set_directed(None).unwrap();
  assert!(t == orig);
  assert!(t.set_directed(Some(&DimSet::from_bits(2, &[0, 1]))).is_err()); }

#[test] fn test_set_conditional() {
  let mut t = t2x3();
  t.set_weights_dense(&[0.5, 0.2, 0.25, 0.3, 0.25, 0.5]).unwrap();
  let before = t.clone();
  assert!(matches!(t.set_conditional(None), Err(TableError::InvalidArgument(_))));
  assert!(matches!(t.set_conditional(Some(&DimSet::from_bits(2, &[0]))), Err(TableError::NotNormalized)));
  assert!(!t.is_directed(), "failure leaves the direction alone");
  assert!(t == before);
  t.set_conditional(Some(&DimSet::from_bits(2, &[1]))).unwrap();
  assert!(t.is_conditional());
  assert_eq!(t.indexer().output_dims(), &[1]); }

#[test] fn test_make_conditional() {
  let mut t = t2x3();
  t.set_weights_dense(&[0.0, 0.0, 1.0, 1.0, 1.0, 1.0]).unwrap();
  assert!(matches!(t.make_conditional(Some(&DimSet::from_bits(2, &[0]))),
    Err(TableError::ZeroTotalWeightForSomeInput)));
  assert!(!t.is_directed());
  assert!(t.make_conditional(None).is_err());
  t.set_weights_dense(&[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]).unwrap();
  t.make_conditional(Some(&DimSet::from_bits(2, &[0]))).unwrap();
  assert!(t.is_conditional());
  for ji in 0..6 { assert_eq!(t.weight_for_joint(ji).unwrap(), 0.5) }}

#[test] fn test_dice() {
  let mut t = dice();
  t.set_deterministic_from(&Sum::new(2)).unwrap();
  assert!(t.has_deterministic_representation());
  assert!(t.is_conditional());
  assert_eq!(t.count_non_zero_weights(), 36);
  let mut elems = vec![Elem::Int(0), Elem::Int(3), Elem::Int(4)];
  t.eval_deterministic(&mut elems).unwrap();
  assert_eq!(elems[0], Elem::Int(7));
  assert_eq!(t.weight_for_elements(&[Elem::Int(7), Elem::Int(3), Elem::Int(4)]).unwrap(), 1.0);
  assert_eq!(t.weight_for_elements(&[Elem::Int(8), Elem::Int(3), Elem::Int(4)]).unwrap(), 0.0);

  // inputs are enumerated with the first die fastest
  let mut u = dice();
  let outputs: Vec<usize> = (0..36).map(|ii| ii % 6 + ii / 6).collect();
  u.set_deterministic_output_indices(&outputs).unwrap();
  assert!(t == u);

  assert!(u.set_deterministic_output_indices(&outputs[1..]).is_err());
  assert!(u.set_deterministic_output_indices(&[11; 36]).is_err());
  let mut undirected = t2x3();
  assert!(matches!(undirected.set_deterministic_output_indices(&[0, 0]), Err(TableError::UnsupportedForUndirected(_))));
  let doms = vec![Domain::range(1,6), Domain::range(1,6), Domain::range(2,12)];
  let mut trailing = FactorTable::directed(doms, &DimSet::from_bits(3, &[2])).unwrap();
  assert!(trailing.set_deterministic_from(&Sum::new(2)).is_err(), "outputs must lead"); }

/// each input row has one entry of weight 1 (energy 0); every other entry is 0
#[cfg(test)] fn assert_one_output_per_input(t:&FactorTable) {
  let (ic, oc) = (t.indexer().input_cardinality().unwrap(), t.indexer().output_cardinality().unwrap());
  let mut ones = vec![0; ic];
  for e in t.full_iter().unwrap() {
    let ii = e.joint_index().unwrap() / oc;
    if e.weight() == 0.0 { assert_eq!(e.energy(), f64::INFINITY) }
    else {
      assert_eq!((e.weight(), e.energy()), (1.0, 0.0), "entry {:?}", e.indices());
      ones[ii] += 1 }}
  assert_eq!(ones, vec![1; ic]); }

#[test] fn test_deterministic_rows() {
  let mut x = xor2();
  assert_one_output_per_input(&x);
  x.set_representation(Representation::DETERMINISTIC).unwrap();
  assert_one_output_per_input(&x);
  let mut d = dice();
  d.set_deterministic_from(&Sum::new(2)).unwrap();
  assert_one_output_per_input(&d);
  d.set_representation(Representation::ALL_VALUES).unwrap();
  assert_one_output_per_input(&d); }

#[test] fn test_failed_slot_access_keeps_layout() {
  let mut t = t2x3_dense();
  assert_eq!(t.sparse_size(), 6);
  assert!(t.set_weight_for_sparse(99, 1.0).is_err());
  assert!(t.set_energy_for_sparse(6, 1.0).is_err());
  assert!(t.weight_for_sparse(6).is_err());
  assert!(t.energy_for_sparse(6).is_err());
  assert!(t.sparse_index_to_joint(6).is_err());
  assert!(t.sparse_index_to_indices(6, &mut [0, 0]).is_err());
  assert_eq!(t.representation(), Representation::DENSE_WEIGHT);
  assert_eq!(t.weight_for_sparse(5).unwrap(), 6.0);
  assert_eq!(t.representation(), Representation::ALL_WEIGHT); }

#[test] fn test_zero_dimensions() {
  let mut t = FactorTable::from_domains(vec![]);
  assert_eq!(t.dimensions(), 0);
  assert_eq!(t.joint_size().unwrap(), 1);
  assert_eq!(t.weight_for_joint(0).unwrap(), 0.0);
  t.set_weight_for_indices(&[], 2.0).unwrap();
  assert_eq!(t.weight_for_joint(0).unwrap(), 2.0);
  assert_eq!(t.sparse_size(), 1);
  assert_eq!(t.density(), 1.0);
  let all: Vec<FactorTableEntry> = t.full_iter().unwrap().collect();
  assert_eq!(all.len(), 1);
  assert!(all[0].indices().is_empty());
  t.normalize().unwrap();
  assert_eq!(t.weight_for_indices(&[]).unwrap(), 1.0);
  t.set_representation(Representation::ALL_VALUES).unwrap();
  assert!(FactorTable::from_bytes(&t.to_bytes().unwrap()).unwrap() == t);
  assert!(FactorTable::from_json(&t.to_json()).unwrap() == t); }

#[test] fn test_missing_rows_are_not_normalized() {
  // 31 output bits and one input bit: two input rows, but no joint indexing
  let outputs = DimSet::from_bits(32, &(0..31).collect::<Vec<usize>>());
  let mut t = FactorTable::from_domains(vec![Domain::bit(); 32]);
  let mut a = vec![0; 32]; a[0] = 1;
  t.set_weight_for_indices(&a, 1.0).unwrap();
  assert!(matches!(t.set_conditional(Some(&outputs)), Err(TableError::NotNormalized)));
  assert!(!t.is_directed());
  t.set_directed(Some(&outputs)).unwrap();
  assert_eq!(t.indexer().input_cardinality().unwrap(), 2);
  assert!(!t.is_normalized(), "input row 1 sums to zero");
  t.normalize_conditional().unwrap();
  assert!(!t.is_conditional());
  let mut b = vec![0; 32]; b[31] = 1;
  t.set_weight_for_indices(&b, 1.0).unwrap();
  assert!(t.is_normalized());
  t.set_directed(None).unwrap();
  t.set_conditional(Some(&outputs)).unwrap();
  assert!(t.is_conditional()); }

#[test] fn test_slices() {
  let t = t2x3_dense();
  let s = t.weight_slice(1, &[1, 0], Vec::with_capacity(8)).unwrap();
  assert_eq!(s.values, vec![2.0, 4.0, 6.0]);
  assert!(s.reused);
  let s = t.weight_slice(1, &[1, 0], Vec::new()).unwrap();
  assert!(!s.reused);
  let s = t.energy_slice(0, &[0, 2], s.values).unwrap();
  assert!(s.reused);
  assert_close(s.values[0], -(5f64.ln()));
  assert_close(s.values[1], -(6f64.ln()));
  assert!(t.weight_slice(2, &[0, 0], vec![]).is_err());
  assert!(t.weight_slice(0, &[0, 3], vec![]).is_err()); }

#[test] fn test_randomize() {
  let mut rng = StdRng::seed_from_u64(1234);
  let mut t = t2x3();
  t.randomize_weights(&mut rng).unwrap();
  assert_eq!(t.representation(), Representation::SPARSE_ENERGY);
  assert!(t.has_maximum_density());
  assert_eq!(t.density(), 1.0);
  for ji in 0..6 {
    let w = t.weight_for_joint(ji).unwrap();
    assert!(w > 0.0 && w <= 1.0 + TOLERANCE) }
  let mut x = xor2();
  x.set_representation(Representation::DETERMINISTIC).unwrap();
  x.randomize_weights(&mut rng).unwrap();
  assert_eq!(x.representation(), Representation::DENSE_WEIGHT); }

#[test] fn test_compact() {
  let mut t = t2x3();
  t.set_weights_sparse_joint(&[0, 2, 4], &[1.0, 2.0, 3.0]).unwrap();
  t.set_weight_for_joint(2, 0.0).unwrap();
  assert_eq!(t.sparse_size(), 3);
  assert_eq!(t.count_non_zero_weights(), 2);
  assert_eq!(t.compact(), 1);
  assert_eq!(t.sparse_size(), 2);
  assert_eq!(t.compact(), 0);
  assert_eq!(t.weight_for_joint(4).unwrap(), 3.0); }

#[test] fn test_convert() {
  let mut t = t2x3_dense();
  t.normalize().unwrap();
  let p = Permuter::new(t.indexer(), vec![1, 0]).unwrap();
  let u = t.convert(&p).unwrap();
  assert_eq!(u.domain_sizes(), &[3, 2]);
  assert!(u.is_normalized());
  for i in 0..2 { for j in 0..3 {
    assert_eq!(u.weight_for_indices(&[j, i]).unwrap(), t.weight_for_indices(&[i, j]).unwrap()) }}
  assert!(t.convert(&Permuter::identity(t.indexer())).unwrap() == t);
  assert!(u.convert(&p).is_err(), "reindexer starts from another indexer");

  let x = xor2();
  let p = Permuter::new(x.indexer(), vec![1, 2, 0]).unwrap();
  let y = x.convert(&p).unwrap();
  assert_eq!(y.indexer().output_dims(), &[2]);
  assert!(y.is_deterministic_directed()); }

#[test] fn test_copy_and_eq() {
  let t = t2x3_dense();
  let mut u = t2x3();
  assert!(u != t);
  u.copy_from(&t);
  assert!(u == t);
  let mut v = t.clone();
  v.set_representation(Representation::SPARSE_ENERGY_WITH_INDICES).unwrap();
  assert!(v == t, "equality ignores the representation");
  v.set_weight_for_joint(0, 1.0 + 1e-14).unwrap();
  assert!(v == t, "within tolerance");
  v.set_weight_for_joint(0, 1.5).unwrap();
  assert!(v != t); }

#[test] fn test_bytes_roundtrip() {
  let mut t = xor2();
  t.set_representation(Representation::DETERMINISTIC_WITH_INDICES).unwrap();
  let back = FactorTable::from_bytes(&t.to_bytes().unwrap()).unwrap();
  assert_eq!(back.representation(), Representation::DETERMINISTIC_WITH_INDICES);
  assert!(back == t);
  let path = std::env::temp_dir().join(format!("ftab-test-{}.bin", std::process::id()));
  let mut u = t2x3_dense();
  u.normalize().unwrap();
  u.save(&path).unwrap();
  let back = FactorTable::load(&path).unwrap();
  let _ = std::fs::remove_file(&path);
  assert!(back.is_normalized());
  assert!(back == u);
  assert!(FactorTable::from_bytes(&[1, 2, 3]).is_err()); }

#[test] fn test_json_roundtrip() {
  let mut t = FactorTable::from_domains(vec![Domain::symbols(&["a", "b"]), Domain::range(-1, 1)]);
  t.set_energies_sparse_joint(&[0, 3, 5], &[f64::INFINITY, 1.5, 0.25]).unwrap();
  let s = t.to_json();
  assert!(s.contains("\"ftab-table-0.01\""));
  assert!(s.contains("null"), "infinite energy");
  let back = FactorTable::from_json(&s).unwrap();
  assert_eq!(back.representation(), Representation::SPARSE_ENERGY);
  assert_eq!(back.sparse_size(), 3);
  assert!(back == t);

  let mut x = xor2();
  x.set_representation(Representation::DETERMINISTIC).unwrap();
  let back = FactorTable::from_json(&x.to_json()).unwrap();
  assert!(back.has_deterministic_representation());
  assert!(back == x);

  let mut n = t2x3_dense();
  n.normalize().unwrap();
  assert!(FactorTable::from_json(&n.to_json()).unwrap().is_normalized());
  assert!(FactorTable::from_json("{\"format\":\"something-else\"}").is_err());
  assert!(FactorTable::from_json("not json").is_err()); }

#[test] fn test_without_joint_indexing() {
  let mut t = FactorTable::from_domains(vec![Domain::bit(); 32]);
  assert!(!t.supports_joint_indexing());
  assert!(matches!(t.weight_for_joint(0), Err(TableError::IndexingUnsupported{..})));
  assert!(matches!(t.set_weights_dense(&[1.0]), Err(TableError::IndexingUnsupported{..})));
  assert!(t.set_representation(Representation::DENSE_ENERGY).is_err());
  let mut rng = StdRng::seed_from_u64(7);
  assert!(t.randomize_weights(&mut rng).is_err());
  let mut a = vec![0; 32]; a[0] = 1;
  let b = vec![0; 32];
  t.set_weight_for_indices(&a, 3.0).unwrap();
  t.set_weight_for_indices(&b, 2.0).unwrap();
  assert_eq!(t.sparse_index_from_indices(&a).unwrap(), Some(1));
  assert!(t.sparse_index_to_joint(0).is_err());
  assert!(!t.has_maximum_density());
  assert_eq!(t.density(), 0.0, "no joint size to divide by");
  // dimension 0 becomes the output: both entries share an input row
  t.set_directed(Some(&DimSet::from_bits(32, &[0]))).unwrap();
  assert!(!t.is_normalized());
  t.normalize_conditional().unwrap();
  assert_close(t.weight_for_indices(&a).unwrap(), 0.6);
  assert_close(t.weight_for_indices(&b).unwrap(), 0.4);
  assert!(t.is_conditional());
  let u = FactorTable::from_bytes(&t.to_bytes().unwrap()).unwrap();
  assert!(u == t); }
