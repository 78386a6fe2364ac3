// test suite for cursors and entry iteration
// (included from cur.rs)

#[cfg(test)] use crate::{dims::DimSet, domain::Domain, repr::Representation, error::TableError};

/// 2x3 table with weights at joints 1, 4 and 5
#[cfg(test)] fn t2x3()->FactorTable {
  let mut t = FactorTable::from_domains(vec![Domain::range(0,1), Domain::range(0,2)]);
  t.set_weights_sparse_joint(&[5, 1, 4], &[1.0, 0.5, 0.25]).unwrap();
  t }

#[test] fn test_cursor_sparse() {
  let t = t2x3();
  let mut cur = t.cursor();
  assert!(cur.skips_zero_weights());
  assert_eq!(cur.joint_index(), None, "before the first entry");
  let mut seen = vec![];
  while cur.advance() {
    seen.push((cur.joint_index().unwrap(), cur.sparse_index().unwrap(), cur.indices().to_vec(), cur.weight())) }
  assert_eq!(seen, vec![
    (1, 0, vec![1,0], 0.5),
    (4, 1, vec![0,2], 0.25),
    (5, 2, vec![1,2], 1.0)]);
  assert!(!cur.advance(), "stays exhausted");
  assert!(cur.entry().is_none()); }

#[test] fn test_cursor_skips_zeros() {
  let mut t = t2x3();
  t.set_weight_for_joint(4, 0.0).unwrap();
  assert_eq!(t.sparse_size(), 3, "explicit zero keeps its slot");
  let joints: Vec<usize> = t.iter().map(|e| e.joint_index().unwrap()).collect();
  assert_eq!(joints, vec![1, 5]);
  assert_eq!(t.compact(), 1);
  let slots: Vec<usize> = t.iter().map(|e| e.sparse_index().unwrap()).collect();
  assert_eq!(slots, vec![0, 1]); }

#[test] fn test_full_iter() {
  let mut t = t2x3();
  t.set_weight_for_joint(4, 0.0).unwrap();
  let all: Vec<FactorTableEntry> = t.full_iter().unwrap().collect();
  assert_eq!(all.len(), 6);
  for (ji, e) in all.iter().enumerate() {
    assert_eq!(e.joint_index(), Some(ji));
    assert_eq!(e.indices(), &t.indexer().indices_from_joint(ji).unwrap()[..]);
    assert_eq!(e.elements(), &t.indexer().joint_to_elements(ji).unwrap()[..]); }
  let weights: Vec<f64> = all.iter().map(|e| e.weight()).collect();
  assert_eq!(weights, vec![0.0, 0.5, 0.0, 0.0, 0.0, 1.0]);
  assert_eq!(all[0].energy(), f64::INFINITY);
  assert_eq!(all[4].sparse_index(), Some(1), "zero slot still has a sparse index");
  assert_eq!(all[0].sparse_index(), None);
  assert!(!t.full_cursor().unwrap().skips_zero_weights()); }

#[test] fn test_cursor_dense() {
  let mut t = t2x3();
  t.set_representation(Representation::DENSE_WEIGHT).unwrap();
  let entries: Vec<FactorTableEntry> = (&t).into_iter().collect();
  let joints: Vec<Option<usize>> = entries.iter().map(|e| e.joint_index()).collect();
  assert_eq!(joints, vec![Some(1), Some(4), Some(5)]);
  assert!(entries.iter().all(|e| e.sparse_index().is_none()));
  assert_eq!(t.representation(), Representation::DENSE_WEIGHT, "walking does not change the layout");
  assert!((entries[0].energy() - 2f64.ln()).abs() < 1e-15);
  t.set_representation(Representation::ALL_ENERGY).unwrap();
  let slots: Vec<Option<usize>> = t.full_iter().unwrap().map(|e| e.sparse_index()).collect();
  assert_eq!(slots, vec![None, Some(0), None, None, Some(1), Some(2)]); }

#[test] fn test_cursor_count_matches() {
  let t = t2x3();
  assert_eq!(t.iter().count(), t.count_non_zero_weights());
  let mut n = 0;
  for e in &t { assert!(e.weight() > 0.0); n += 1 }
  assert_eq!(n, 3); }

#[test] fn test_cursor_without_joint_indexing() {
  let mut t = FactorTable::from_domains(vec![Domain::bit(); 32]);
  let mut hi = vec![0; 32]; hi[31] = 1;
  let mut lo = vec![0; 32]; lo[0] = 1;
  t.set_weight_for_indices(&hi, 2.0).unwrap();
  t.set_weight_for_indices(&lo, 3.0).unwrap();
  assert!(matches!(t.full_cursor(), Err(TableError::IndexingUnsupported{..})));
  let entries: Vec<FactorTableEntry> = t.iter().collect();
  assert_eq!(entries.len(), 2);
  assert_eq!(entries[0].indices(), &lo[..], "slots follow joint order: dimension 0 fastest");
  assert_eq!(entries[1].indices(), &hi[..]);
  assert_eq!(entries[1].joint_index(), None);
  assert_eq!(entries[1].sparse_index(), Some(1));
  assert!((entries[1].weight() - 2.0).abs() < 1e-12, "stored as an energy");
  assert_eq!(entries[1].elements()[31], Elem::Int(1)); }

#[test] fn test_cursor_deterministic() {
  let mut t = FactorTable::directed(vec![Domain::bit(), Domain::bit()], &DimSet::from_bits(2, &[0])).unwrap();
  t.set_deterministic_output_indices(&[1, 0]).unwrap();
  assert_eq!(t.representation(), Representation::DETERMINISTIC);
  let entries: Vec<FactorTableEntry> = t.iter().collect();
  let idx: Vec<&[usize]> = entries.iter().map(|e| e.indices()).collect();
  assert_eq!(idx, vec![&[1,0][..], &[0,1][..]]);
  assert!(entries.iter().all(|e| e.weight() == 1.0 && e.energy() == 0.0));
  assert_eq!(entries[1].joint_index(), Some(2)); }
