//! Binary io helpers: raw bytes and bincode-encoded values.
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;
use serde::{Serialize, de::DeserializeOwned};
use crate::error::Result;

/// write the bytes to a file at the specified path.
pub fn put<P:AsRef<Path>>(path:P, bytes:&[u8]) -> ::std::io::Result<()> {
  let mut f = File::create(path)?;
  f.write_all(bytes) }

/// read the whole file at the specified path.
pub fn get<P:AsRef<Path>>(path:P) -> ::std::io::Result<Vec<u8>> {
  let mut f = File::open(path)?;
  let mut uv:Vec<u8> = Vec::new();
  f.read_to_end(&mut uv)?;
  Ok(uv) }

/// encode a value with bincode and write it to `path`.
pub fn save<T:Serialize, P:AsRef<Path>>(path:P, x:&T) -> Result<()> {
  let bytes = bincode::serialize(x)?;
  put(path, &bytes)?;
  Ok(()) }

/// read and decode a bincode value written by `save`.
pub fn load<T:DeserializeOwned, P:AsRef<Path>>(path:P) -> Result<T> {
  let bytes = get(path)?;
  Ok(bincode::deserialize(&bytes)?) }

#[test] fn test_io_roundtrip() {
  let path = std::env::temp_dir().join(format!("ftab-io-{}.bin", std::process::id()));
  let xs: Vec<(usize, f64)> = vec![(0, 1.5), (3, f64::INFINITY)];
  save(&path, &xs).unwrap();
  let ys: Vec<(usize, f64)> = load(&path).unwrap();
  assert_eq!(xs, ys);
  std::fs::remove_file(&path).unwrap();
  assert!(get(&path).is_err(), "file should be gone"); }
