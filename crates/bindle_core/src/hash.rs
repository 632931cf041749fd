use xxhash_rust::xxh3::Xxh3;
use xxhash_rust::xxh3::xxh3_64;

/// Bindle needs a hasher for generating the identifiers woven through the
/// asset and bundle graphs.
///
/// The hashes don't need to be incredibly fast, but they must be stable
/// across runs, machines and platforms, because they end up in output file
/// names and in caches.
pub type IdentifierHasher = Xxh3;

pub fn hash_string(s: String) -> String {
  hash_bytes(s.as_bytes())
}

pub fn hash_bytes(s: &[u8]) -> String {
  let res = xxh3_64(s);
  format!("{:016x}", res)
}
