use std::borrow::Cow;

use indexmap::IndexMap;

/// A generated script unit emitted by the bundler
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputChunk {
  pub file_name: String,
  /// Executable source text of the chunk, mutable until the bundle is written
  pub code: String,
}

impl OutputChunk {
  pub fn new(file_name: impl Into<String>, code: impl Into<String>) -> Self {
    Self {
      file_name: file_name.into(),
      code: code.into(),
    }
  }
}

/// Raw content of an emitted asset
#[derive(Clone, Debug, PartialEq)]
pub enum AssetSource {
  Text(String),
  Binary(Vec<u8>),
}

impl Default for AssetSource {
  fn default() -> Self {
    AssetSource::Text(String::new())
  }
}

impl AssetSource {
  pub fn bytes(&self) -> &[u8] {
    match self {
      AssetSource::Text(text) => text.as_bytes(),
      AssetSource::Binary(bytes) => bytes,
    }
  }

  /// Decodes the source as UTF-8, replacing invalid sequences
  pub fn to_text(&self) -> Cow<'_, str> {
    match self {
      AssetSource::Text(text) => Cow::Borrowed(text),
      AssetSource::Binary(bytes) => String::from_utf8_lossy(bytes),
    }
  }
}

impl From<String> for AssetSource {
  fn from(value: String) -> Self {
    AssetSource::Text(value)
  }
}

impl From<&str> for AssetSource {
  fn from(value: &str) -> Self {
    AssetSource::Text(value.to_string())
  }
}

impl From<Vec<u8>> for AssetSource {
  fn from(value: Vec<u8>) -> Self {
    AssetSource::Binary(value)
  }
}

/// A non-executable output file such as HTML, CSS or images
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputAsset {
  pub file_name: String,
  pub source: AssetSource,
}

impl OutputAsset {
  pub fn new(file_name: impl Into<String>, source: impl Into<AssetSource>) -> Self {
    Self {
      file_name: file_name.into(),
      source: source.into(),
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub enum OutputItem {
  Chunk(OutputChunk),
  Asset(OutputAsset),
}

crate::as_variant_impl!(OutputItem, as_chunk, Chunk, OutputChunk);
crate::as_variant_impl!(OutputItem, as_asset, Asset, OutputAsset);
crate::as_variant_mut_impl!(OutputItem, as_chunk_mut, Chunk, OutputChunk);
crate::as_variant_mut_impl!(OutputItem, as_asset_mut, Asset, OutputAsset);

impl OutputItem {
  pub fn file_name(&self) -> &str {
    match self {
      OutputItem::Chunk(chunk) => &chunk.file_name,
      OutputItem::Asset(asset) => &asset.file_name,
    }
  }

  /// The bytes that end up on disk for this item
  pub fn contents(&self) -> &[u8] {
    match self {
      OutputItem::Chunk(chunk) => chunk.code.as_bytes(),
      OutputItem::Asset(asset) => asset.source.bytes(),
    }
  }
}

impl From<OutputChunk> for OutputItem {
  fn from(value: OutputChunk) -> Self {
    OutputItem::Chunk(value)
  }
}

impl From<OutputAsset> for OutputItem {
  fn from(value: OutputAsset) -> Self {
    OutputItem::Asset(value)
  }
}

/// Every file produced by one build, keyed by file name.
///
/// Iteration follows insertion order, which is the order the bundler emitted
/// the items in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OutputBundle {
  items: IndexMap<String, OutputItem>,
}

impl OutputBundle {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds an item under its own file name, replacing any previous item with that name
  pub fn insert(&mut self, item: impl Into<OutputItem>) -> Option<OutputItem> {
    let item = item.into();
    self.items.insert(item.file_name().to_string(), item)
  }

  pub fn get(&self, file_name: &str) -> Option<&OutputItem> {
    self.items.get(file_name)
  }

  pub fn get_mut(&mut self, file_name: &str) -> Option<&mut OutputItem> {
    self.items.get_mut(file_name)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &OutputItem)> {
    self.items.iter()
  }

  pub fn values(&self) -> impl Iterator<Item = &OutputItem> {
    self.items.values()
  }

  pub fn chunks(&self) -> impl Iterator<Item = &OutputChunk> {
    self.items.values().filter_map(OutputItem::as_chunk)
  }
}

impl<I: Into<OutputItem>> FromIterator<I> for OutputBundle {
  fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
    let mut bundle = OutputBundle::new();
    for item in iter {
      bundle.insert(item);
    }
    bundle
  }
}
