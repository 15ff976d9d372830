use importmap_core::bundle::OutputBundle;
use importmap_core::bundle::OutputItem;
use importmap_core::hash::Integrity;
use indexmap::IndexMap;
use serde::Serialize;

/// The HTML entry is never hashed, it is the file the integrities are written into
pub const ENTRY_HTML_FILE_NAME: &str = "index.html";

/// Root-relative path to integrity descriptor.
///
/// Keeps insertion order so the serialized runtime table is stable between builds.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IntegrityMap(IndexMap<String, String>);

impl IntegrityMap {
  pub fn get(&self, path: &str) -> Option<&str> {
    self.0.get(path).map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(path, integrity)| (path.as_str(), integrity.as_str()))
  }

  /// Serializes the map as the JavaScript object literal embedded in the preload chunk
  pub fn to_json(&self) -> anyhow::Result<String> {
    Ok(serde_json::to_string(&self.0)?)
  }
}

impl From<IndexMap<String, String>> for IntegrityMap {
  fn from(value: IndexMap<String, String>) -> Self {
    IntegrityMap(value)
  }
}

/// `sha384-<base64>` of the bytes the item is written out with
pub fn hash_output_item(item: &OutputItem) -> String {
  Integrity::sha384(item.contents()).to_string()
}

/// Hashes every item of the bundle except the HTML entry, over a copy of `seed`.
///
/// Locally computed entries replace seeded ones with the same path.
pub fn compute_integrity_map(
  bundle: &OutputBundle,
  seed: &IndexMap<String, String>,
) -> IntegrityMap {
  let mut integrity = seed.clone();

  for item in bundle
    .values()
    .filter(|item| item.file_name() != ENTRY_HTML_FILE_NAME)
  {
    integrity.insert(format!("/{}", item.file_name()), hash_output_item(item));
  }

  IntegrityMap(integrity)
}
