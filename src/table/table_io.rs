//! Serialization: bincode bytes and files, and a json dump.
use std::path::Path;
use super::*;
use crate::io;

const JSON_FORMAT: &str = "ftab-table-0.01";

fn elem_json(e:&Elem)->json::JsonValue {
  match e { Elem::Int(i) => (*i).into(), Elem::Sym(s) => s.as_str().into() }}

fn domain_json(d:&Domain)->json::JsonValue {
  match d {
    Domain::Range { lo, hi } => json::object!{ "range": json::array![*lo, *hi] },
    Domain::Enum(v) => {
      let elems: Vec<json::JsonValue> = v.iter().map(elem_json).collect();
      json::object!{ "enum": elems } }}}

fn bad<T>(what:&str)->Result<T> { Err(TableError::Json(format!("malformed table json: {}", what))) }

fn parse_domain(j:&json::JsonValue)->Result<Domain> {
  if j["range"].is_array() {
    match (j["range"][0].as_i64(), j["range"][1].as_i64()) {
      (Some(lo), Some(hi)) if crate::domain::range_size(lo, hi).is_some() => Ok(Domain::Range { lo, hi }),
      _ => bad("range") }}
  else if j["enum"].is_array() {
    let mut elems = vec![];
    for e in j["enum"].members() {
      if let Some(i) = e.as_i64() { elems.push(Elem::Int(i)) }
      else if let Some(s) = e.as_str() { elems.push(Elem::from(s)) }
      else { return bad("element") }}
    if elems.is_empty() { bad("empty domain") } else { Ok(Domain::Enum(elems)) }}
  else { bad("domain") }}

impl FactorTable {

  /// bincode encoding of the whole table.
  pub fn to_bytes(&self)->Result<Vec<u8>> { Ok(bincode::serialize(self)?) }

  pub fn from_bytes(bytes:&[u8])->Result<Self> { Ok(bincode::deserialize(bytes)?) }

  pub fn save<P:AsRef<Path>>(&self, path:P)->Result<()> { io::save(path, self) }

  pub fn load<P:AsRef<Path>>(path:P)->Result<Self> { io::load(path) }

  /// A human-readable dump. Entries are the sparse slots (or the nonzero
  /// dense entries), each as [indices, value], where the value is an energy
  /// or a weight as named by "kind". Infinite energies are written as null.
  pub fn to_json(&self)->String {
    let ix = &self.indexer;
    let rep = self.representation();
    let energy = rep.value_kind() == Some(ValueKind::Energy);
    let domains: Vec<json::JsonValue> = ix.domains().iter().map(domain_json).collect();
    let outputs = match ix.output_set() {
      Some(s) => json::JsonValue::from(s.hi_bits()),
      None => json::JsonValue::Null };
    let mut entries = json::JsonValue::new_array();
    let mut idx = vec![0; ix.dimensions()];
    let mut push = |idx:&[usize], loc:Loc| {
      let v = if energy { self.store.energy(loc) } else { self.store.weight(loc) };
      let v = if v.is_finite() { json::JsonValue::from(v) } else { json::JsonValue::Null };
      let _ = entries.push(json::array![idx.to_vec(), v]); };
    if rep.has_sparse() {
      for si in 0..self.store.slots() {
        self.store.slot_indices(ix, si, &mut idx);
        push(&idx, Loc::Slot(si)) }}
    else if let Some(d) = &self.store.dense {
      for ji in (0..d.len()).filter(|&j| !d.is_zero(j)) {
        ix.split_joint(ji, &mut idx);
        push(&idx, Loc::Dense(ji)) }}
    let normalized = !self.is_directed() && self.is_normalized();
    let kind = if energy { "energy" } else { "weight" };
    let out = json::object!{
      "format": JSON_FORMAT,
      "domains": domains,
      "outputs": outputs,
      "normalized": normalized,
      "representation": rep.name(),
      "kind": kind,
      "entries": entries };
    out.dump() }

  /// Rebuild a table from `to_json` output.
  pub fn from_json(s:&str)->Result<Self> {
    let data = json::parse(s)?;
    if data["format"].as_str() != Some(JSON_FORMAT) { return bad("format") }
    let domains = data["domains"].members().map(parse_domain).collect::<Result<Vec<_>>>()?;
    let n = domains.len();
    let outputs = if data["outputs"].is_null() { None } else {
      let mut bits = vec![];
      for b in data["outputs"].members() {
        match b.as_usize() { Some(b) if b < n => bits.push(b), _ => return bad("outputs") }}
      Some(DimSet::from_bits(n, &bits)) };
    let indexer = match &outputs {
      Some(o) => DomainIndexer::directed(domains, o)?,
      None => DomainIndexer::new(domains) };
    let rep = match Representation::ALL.iter().find(|r| Some(r.name()) == data["representation"].as_str()) {
      Some(r) => *r, None => return bad("representation") };
    let energy = match data["kind"].as_str() { Some("energy") => true, Some("weight") => false, _ => return bad("kind") };
    let mut tuples: Vec<Vec<usize>> = vec![];
    let mut values: Vec<f64> = vec![];
    for e in data["entries"].members() {
      let idx: Option<Vec<usize>> = e[0].members().map(|i| i.as_usize()).collect();
      match idx { Some(idx) => tuples.push(idx), None => return bad("indices") }
      values.push(match (e[1].as_f64(), energy) {
        (Some(v), _) => v,
        (None, true) => f64::INFINITY,
        (None, false) => return bad("value") }) }
    let mut table = FactorTable::new(indexer);
    if energy { table.set_energies_sparse(&tuples, &values)? }
    else { table.set_weights_sparse(&tuples, &values)? }
    table.set_representation(rep)?;
    if data["normalized"].as_bool() == Some(true) { table.mark(NORMALIZED | NORMALIZED_COMPUTED) }
    Ok(table) }}
