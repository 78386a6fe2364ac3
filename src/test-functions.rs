// test suite for deterministic functions and incremental update
// (included from functions.rs)

#[cfg(test)] use crate::det::{update, UpdateOutcome};

#[cfg(test)] fn cells(xs:&[f64])->Vec<Arg> { xs.iter().map(|&x| Arg::Cell(x)).collect() }

#[cfg(test)] fn outs(args:&[Arg], n:usize)->Vec<f64> {
  args[..n].iter().map(|a| a.cell().expect("output should be a cell")).collect() }

/// [1 2;3 4] * [5 6;7 8], with zeroed outputs
#[cfg(test)] fn product_args()->Vec<Arg> {
  cells(&[0.,0.,0.,0.,  1.,3.,2.,4.,  5.,7.,6.,8.]) }

/// write `new` into argument `i` and describe the change
#[cfg(test)] fn change(args:&mut [Arg], i:usize, new:f64)->Change {
  let old = args[i].cell().expect("changed argument should be a cell");
  args[i] = Arg::Cell(new);
  Change { index: i, old, new }}

#[test] fn test_product_eval() {
  let f = MatrixProduct::new(2, 2, 2);
  assert_eq!(f.arg_count(), 12);
  assert_eq!(f.output_count(), 4);
  assert_eq!(f.update_limit(), 2);
  let mut args = product_args();
  f.eval_deterministic(&mut args).unwrap();
  assert_eq!(outs(&args, 4), vec![19., 43., 22., 50.], "outputs are stored by columns");
  assert_eq!(f.eval_energy(&args).unwrap(), 0.0);
  args[0] = Arg::Cell(20.0);
  assert_eq!(f.eval_energy(&args).unwrap(), f64::INFINITY);
  assert!(f.eval_deterministic(&mut args[..11]).is_err(), "wrong argument count"); }

#[test] fn test_product_incremental() {
  let f = MatrixProduct::new(2, 2, 2);
  let mut args = product_args();
  f.eval_deterministic(&mut args).unwrap();
  // left[0,0]: 1 -> 2, right[1,0]: 7 -> 1
  let cs = vec![change(&mut args, 4, 2.0), change(&mut args, 9, 1.0)];
  assert_eq!(update(&f, &mut args, &cs).unwrap(), UpdateOutcome::Incremental);
  assert_eq!(outs(&args, 4), vec![12., 19., 28., 50.]);
  assert_eq!(f.eval_energy(&args).unwrap(), 0.0); }

#[test] fn test_product_incremental_overlap() {
  // both changes touch the same product term left[0,0]*right[0,0]
  let f = MatrixProduct::new(2, 2, 2);
  let mut args = product_args();
  f.eval_deterministic(&mut args).unwrap();
  let cs = vec![change(&mut args, 4, 2.0), change(&mut args, 8, 1.0)];
  assert_eq!(f.update_deterministic(&mut args, &cs).unwrap(), UpdateOutcome::Incremental);
  let mut full = args.clone();
  f.eval_deterministic(&mut full).unwrap();
  assert_eq!(outs(&args, 4), outs(&full, 4));
  assert_eq!(outs(&args, 4), vec![16., 31., 28., 50.]); }

#[test] fn test_product_repeated_change() {
  let f = MatrixProduct::new(2, 2, 2);
  let mut args = product_args();
  f.eval_deterministic(&mut args).unwrap();
  let a = change(&mut args, 5, 10.0);
  let b = change(&mut args, 5, -1.0);
  assert_eq!(update(&f, &mut args, &[a, b]).unwrap(), UpdateOutcome::Incremental);
  assert_eq!(args[5], Arg::Cell(-1.0));
  assert_eq!(f.eval_energy(&args).unwrap(), 0.0); }

#[test] fn test_product_batch_over_limit() {
  let f = MatrixProduct::new(2, 2, 2);
  let mut args = product_args();
  f.eval_deterministic(&mut args).unwrap();
  let cs: Vec<Change> = (4..7).map(|i| change(&mut args, i, 0.5)).collect();
  assert_eq!(update(&f, &mut args, &cs).unwrap(), UpdateOutcome::Recomputed);
  assert_eq!(f.eval_energy(&args).unwrap(), 0.0);
  assert_eq!(update(&f, &mut args, &[]).unwrap(), UpdateOutcome::Incremental, "nothing to do"); }

#[test] fn test_product_bad_change() {
  let f = MatrixProduct::new(2, 2, 2);
  let mut args = product_args();
  f.eval_deterministic(&mut args).unwrap();
  let before = args.clone();
  let bad = Change { index: 0, old: 19.0, new: 1.0 };
  assert!(update(&f, &mut args, &[bad]).is_err(), "outputs are not inputs");
  let bad = Change { index: 12, old: 0.0, new: 1.0 };
  assert!(update(&f, &mut args, &[bad]).is_err(), "past the end");
  assert_eq!(args, before); }

#[test] fn test_product_opaque() {
  let f = MatrixProduct::new(2, 2, 2).with_operands(Operand::Opaque, Operand::Cells);
  assert_eq!(f.arg_count(), 9);
  let left = Matrix::from_rows(&[vec![1., 2.], vec![3., 4.]]);
  let mut args = cells(&[0., 0., 0., 0.]);
  args.push(Arg::Block(left));
  args.extend(cells(&[5., 7., 6., 8.]));
  f.eval_deterministic(&mut args).unwrap();
  assert_eq!(outs(&args, 4), vec![19., 43., 22., 50.]);
  assert!(!f.is_tracked(4));
  assert!(f.is_tracked(5));
  // a tracked right cell still goes incremental
  let c = change(&mut args, 5, 1.0);
  assert_eq!(update(&f, &mut args, &[c]).unwrap(), UpdateOutcome::Incremental);
  assert_eq!(outs(&args, 4), vec![15., 31., 22., 50.]);
  // a change to the opaque operand forces a recompute
  args[4] = Arg::Block(Matrix::from_rows(&[vec![1., 0.], vec![0., 1.]]));
  let c = Change { index: 4, old: 0.0, new: 0.0 };
  assert_eq!(update(&f, &mut args, &[c]).unwrap(), UpdateOutcome::Recomputed);
  assert_eq!(outs(&args, 4), vec![1., 7., 6., 8.]); }

#[test] fn test_product_rectangular() {
  // 1x3 * 3x2
  let f = MatrixProduct::new(1, 3, 2);
  assert_eq!(f.update_limit(), 1);
  let mut args = cells(&[0., 0.,  1., 2., 3.,  1., 1., 1.,  0., 1., 2.]);
  f.eval_deterministic(&mut args).unwrap();
  assert_eq!(outs(&args, 2), vec![6., 8.]);
  let c = change(&mut args, 3, 5.0);
  assert_eq!(update(&f, &mut args, &[c]).unwrap(), UpdateOutcome::Incremental);
  assert_eq!(outs(&args, 2), vec![9., 11.]); }

#[test] fn test_product_smoothing() {
  assert!(MatrixProduct::new(2, 2, 2).with_smoothing(0.0).is_err());
  let f = MatrixProduct::new(2, 2, 2).with_smoothing(2.0).unwrap();
  assert!(!f.is_deterministic());
  assert_eq!(f.update_limit(), 0);
  let mut args = product_args();
  f.eval_deterministic(&mut args).unwrap();
  assert_eq!(f.eval_energy(&args).unwrap(), 0.0);
  args[1] = Arg::Cell(44.0);
  assert_eq!(f.eval_energy(&args).unwrap(), 0.5, "squared error over smoothing");
  let c = change(&mut args, 6, 0.0);
  assert_eq!(update(&f, &mut args, &[c]).unwrap(), UpdateOutcome::Recomputed); }

#[test] fn test_sum() {
  let f = Sum::new(3);
  let mut args = cells(&[0., 1., 2., 3.]);
  f.eval_deterministic(&mut args).unwrap();
  assert_eq!(args[0], Arg::Cell(6.0));
  let c = change(&mut args, 2, 5.0);
  assert_eq!(update(&f, &mut args, &[c]).unwrap(), UpdateOutcome::Incremental);
  assert_eq!(args[0], Arg::Cell(9.0));
  assert_eq!(f.eval_energy(&args).unwrap(), 0.0);
  let cs: Vec<Change> = [1, 2, 3, 1].iter().map(|&i| change(&mut args, i, 0.0)).collect();
  assert_eq!(update(&f, &mut args, &cs).unwrap(), UpdateOutcome::Recomputed);
  assert_eq!(args[0], Arg::Cell(0.0));
  args[0] = Arg::Cell(1.0);
  assert_eq!(f.eval_energy(&args).unwrap(), f64::INFINITY); }

#[test] fn test_failed_delta_leaves_args() {
  let f = MatrixProduct::new(2, 2, 2);
  let mut args = product_args();
  f.eval_deterministic(&mut args).unwrap();
  args.push(Arg::Cell(0.0)); // one argument too many
  let cs = vec![change(&mut args, 4, 2.0), change(&mut args, 5, 20.0)];
  let before = args.clone();
  assert!(update(&f, &mut args, &cs).is_err());
  assert_eq!(args, before, "inputs keep their new values and outputs are untouched"); }
