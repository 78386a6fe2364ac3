//! Cursors: allocation-free walks over the entries of a factor table.
//!
//! A `Cursor` is positioned before the first entry; each call to
//! `advance()` moves it to the next entry and returns false once the walk
//! is over. The index buffer is allocated once, up front. `Entries` wraps
//! a cursor as an ordinary iterator of owned snapshots.
use crate::{domain::Elem, store::Loc, table::FactorTable, error::Result};

/// what the cursor steps over
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Walk {
  /// sparse slots, in slot order
  Slots,
  /// joint indices, in ascending order
  Joints }

pub struct Cursor<'a> {
  table: &'a FactorTable,
  walk: Walk,
  skip_zeros: bool,
  started: bool,
  /// current slot or joint index
  pos: usize,
  end: usize,
  /// next sparse slot to match against, for joint walks over sparse-only storage
  merge: usize,
  loc: Loc,
  indices: Vec<usize> }

impl<'a> Cursor<'a> {

  fn new(table:&'a FactorTable, walk:Walk, end:usize, skip_zeros:bool)->Self {
    Cursor { table, walk, skip_zeros, started: false, pos: 0, end, merge: 0,
             loc: Loc::Absent, indices: vec![0; table.dimensions()] }}

  /// move to the next entry. returns false when there are no more.
  pub fn advance(&mut self)->bool {
    let table = self.table;
    let store = &table.store;
    loop {
      let next = if self.started { self.pos + 1 } else { 0 };
      self.started = true;
      if next >= self.end { self.pos = self.end; self.loc = Loc::Absent; return false }
      self.pos = next;
      self.loc = match self.walk {
        Walk::Slots => Loc::Slot(next),
        Walk::Joints if store.dense.is_some() => Loc::Dense(next),
        Walk::Joints => {
          while self.merge < store.slots() && store.slot_joint(self.merge).is_some_and(|j| j < next) { self.merge += 1 }
          if self.merge < store.slots() && store.slot_joint(self.merge) == Some(next) { Loc::Slot(self.merge) }
          else { Loc::Absent }}};
      if self.skip_zeros && store.is_zero(self.loc) { continue }
      match self.walk {
        Walk::Slots => store.slot_indices(&table.indexer, next, &mut self.indices),
        Walk::Joints => table.indexer.split_joint(next, &mut self.indices) }
      return true }}

  /// true for `iter()`-style walks, which never stop on a zero weight.
  pub fn skips_zero_weights(&self)->bool { self.skip_zeros }

  fn on_entry(&self)->bool { self.started && self.pos < self.end }

  pub fn energy(&self)->f64 { self.table.store.energy(self.loc) }

  pub fn weight(&self)->f64 { self.table.store.weight(self.loc) }

  /// index tuple of the current entry
  pub fn indices(&self)->&[usize] { &self.indices }

  pub fn elements(&self)->Result<Vec<Elem>> { self.table.indexer.elements_from_indices(&self.indices) }

  /// joint index of the current entry (None without joint indexing)
  pub fn joint_index(&self)->Option<usize> {
    if !self.on_entry() { return None }
    match self.walk {
      Walk::Joints => Some(self.pos),
      Walk::Slots => self.table.store.slot_joint(self.pos) }}

  /// sparse slot of the current entry, if it has one
  pub fn sparse_index(&self)->Option<usize> {
    if !self.on_entry() { return None }
    match self.loc {
      Loc::Slot(si) => Some(si),
      _ if self.walk == Walk::Joints => self.table.store.find_joint(self.pos),
      _ => None }}

  /// an owned snapshot of the current entry
  pub fn entry(&self)->Option<FactorTableEntry> {
    if !self.on_entry() { return None }
    Some(FactorTableEntry {
      indices: self.indices.clone(),
      elements: self.elements().unwrap_or_default(),
      sparse_index: self.sparse_index(),
      joint_index: self.joint_index(),
      energy: self.energy(),
      weight: self.weight() })}

} // impl Cursor

/// A snapshot of one table entry.
#[derive(Clone, Debug, PartialEq)]
pub struct FactorTableEntry {
  indices: Vec<usize>,
  elements: Vec<Elem>,
  sparse_index: Option<usize>,
  joint_index: Option<usize>,
  energy: f64,
  weight: f64 }

impl FactorTableEntry {
  pub fn indices(&self)->&[usize] { &self.indices }
  pub fn elements(&self)->&[Elem] { &self.elements }
  pub fn sparse_index(&self)->Option<usize> { self.sparse_index }
  pub fn joint_index(&self)->Option<usize> { self.joint_index }
  pub fn energy(&self)->f64 { self.energy }
  pub fn weight(&self)->f64 { self.weight }}

/// Iterator of entry snapshots, driven by a cursor.
pub struct Entries<'a> { cur: Cursor<'a> }

impl<'a> Iterator for Entries<'a> {
  type Item = FactorTableEntry;
  fn next(&mut self)->Option<Self::Item> {
    if self.cur.advance() { self.cur.entry() } else { None }}}

/// Cursor constructors.
impl FactorTable {

  /// walk the nonzero entries: sparse slots in order, or (for dense-only
  /// tables) joint indices in order.
  pub fn cursor(&self)->Cursor<'_> {
    if self.has_sparse_representation() { Cursor::new(self, Walk::Slots, self.store.slots(), true) }
    else { Cursor::new(self, Walk::Joints, self.joint_size().unwrap_or(0), true) }}

  /// walk every joint index in ascending order, zeros included.
  pub fn full_cursor(&self)->Result<Cursor<'_>> {
    let n = self.indexer.joint_size_for("full_cursor")?;
    Ok(Cursor::new(self, Walk::Joints, n, false)) }

  pub fn iter(&self)->Entries<'_> { Entries { cur: self.cursor() }}

  pub fn full_iter(&self)->Result<Entries<'_>> { Ok(Entries { cur: self.full_cursor()? }) }}

impl<'a> IntoIterator for &'a FactorTable {
  type Item = FactorTableEntry;
  type IntoIter = Entries<'a>;
  fn into_iter(self)->Entries<'a> { self.iter() }}

include!("test-cur.rs");
