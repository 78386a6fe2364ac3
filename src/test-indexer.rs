// test suite for DomainIndexer

#[cfg(test)]
fn bits(n:usize)->Vec<Domain> { vec![Domain::bit(); n] }

#[test] fn test_zero_dimensions() {
  let ix = DomainIndexer::new(vec![]);
  assert_eq!(ix.dimensions(), 0);
  assert_eq!(ix.joint_size().unwrap(), 1);
  assert_eq!(ix.joint_index(&[]).unwrap(), 0);
  assert_eq!(ix.indices_from_joint(0).unwrap(), Vec::<usize>::new());
  assert!(ix.indices_from_joint(1).is_err());
  assert!(DomainIndexer::directed(vec![], &DimSet::new(0)).is_err()); }

#[test] fn test_undirected_layout() {
  let ix = DomainIndexer::new(vec![Domain::range(0,1), Domain::range(0,2)]);
  assert_eq!(ix.joint_size().unwrap(), 6);
  // dimension 0 varies fastest
  assert_eq!(ix.indices_from_joint(1).unwrap(), vec![1,0]);
  assert_eq!(ix.indices_from_joint(2).unwrap(), vec![0,1]);
  assert_eq!(ix.joint_index(&[1,2]).unwrap(), 5);
  assert!(ix.joint_index(&[2,0]).is_err());
  let e = ix.indices_from_joint(6).unwrap_err();
  assert_eq!(e.to_string(), "Joint index 6 is out of range"); }

#[test] fn test_directed_layout() {
  // outputs {1}, inputs {0,2}: joint = ii*oc + oi
  let doms = vec![Domain::range(0,1), Domain::range(0,2), Domain::range(0,3)];
  let ix = DomainIndexer::directed(doms, &DimSet::from_bits(3, &[1])).unwrap();
  assert_eq!(ix.output_dims(), &[1]);
  assert_eq!(ix.input_dims(), &[0,2]);
  assert_eq!(ix.output_cardinality().unwrap(), 3);
  assert_eq!(ix.input_cardinality().unwrap(), 8);
  let mut buf = vec![0; 3];
  for ji in 0..ix.joint_size().unwrap() {
    ix.joint_to_indices(ji, &mut buf).unwrap();
    let ii = ix.input_index_from_indices(&buf).unwrap();
    let oi = ix.output_index_from_indices(&buf).unwrap();
    assert_eq!(ji, ii * 3 + oi);
    assert_eq!(ji, ix.joint_from_input_output(ii, oi).unwrap());
    let mut back = vec![9; 3];
    ix.input_index_to_indices(ii, &mut back).unwrap();
    assert_eq!((back[0], back[2]), (buf[0], buf[2]));
    assert_eq!(back[1], 9, "output dimension left alone"); }}

#[test] fn test_directed_validation() {
  assert!(DomainIndexer::directed(bits(2), &DimSet::new(2)).is_err());
  assert!(DomainIndexer::directed(bits(2), &DimSet::from_bits(2, &[0,1])).is_err());
  assert!(DomainIndexer::directed(bits(2), &DimSet::from_bits(3, &[2])).is_err());
  let ix = DomainIndexer::new(bits(2));
  assert!(matches!(ix.input_cardinality(), Err(TableError::UnsupportedForUndirected(_)))); }

#[test] fn test_elements() {
  let ix = DomainIndexer::new(vec![Domain::symbols(&["a","b"]), Domain::range(5,7)]);
  let elems = ix.joint_to_elements(3).unwrap();
  assert_eq!(elems, vec![Elem::from("b"), Elem::Int(6)]);
  assert_eq!(ix.joint_from_elements(&elems).unwrap(), 3);
  assert!(ix.indices_from_elements(&[Elem::from("c"), Elem::Int(5)]).is_err());
  assert!(ix.indices_from_elements(&[Elem::from("a")]).is_err()); }

#[test] fn test_unsupported_joint() {
  let ix = DomainIndexer::new(bits(32));
  assert!(!ix.supports_joint_indexing());
  assert!(matches!(ix.joint_size(), Err(TableError::IndexingUnsupported{..})));
  let max = Domain::range(0, i32::MAX as i64 - 1);
  let ix = DomainIndexer::new(vec![max.clone()]);
  assert!(ix.supports_joint_indexing());
  let ix = DomainIndexer::new(vec![max.clone(), max]);
  assert!(!ix.supports_joint_indexing());
  assert!(ix.joint_index(&[0,0]).is_err()); }

#[test] fn test_cmp_and_increment() {
  let ix = DomainIndexer::new(vec![Domain::range(0,1), Domain::range(0,2)]);
  let mut cur = vec![0,0];
  let mut ji = 0;
  loop {
    assert_eq!(ix.joint_index(&cur).unwrap(), ji);
    let prev = cur.clone();
    if !ix.increment_indices(&mut cur) { break }
    assert_eq!(ix.cmp_indices(&prev, &cur), Ordering::Less);
    ji += 1 }
  assert_eq!(ji, 5);
  assert_eq!(cur, vec![0,0]); }

#[test] fn test_random_indices() {
  use rand::SeedableRng;
  let mut rng = rand::rngs::StdRng::seed_from_u64(42);
  let ix = DomainIndexer::new(vec![Domain::range(0,1), Domain::range(0,9)]);
  let mut buf = vec![0; 2];
  for _ in 0..100 {
    ix.random_indices(&mut rng, &mut buf);
    ix.check_indices(&buf).unwrap();
    assert!(ix.random_joint_index(&mut rng).unwrap() < 20); }}

#[test] fn test_indexer_serde() {
  let ix = DomainIndexer::directed(bits(3), &DimSet::from_bits(3, &[2])).unwrap();
  let bytes = bincode::serialize(&ix).unwrap();
  let back: DomainIndexer = bincode::deserialize(&bytes).unwrap();
  assert_eq!(ix, back); }
