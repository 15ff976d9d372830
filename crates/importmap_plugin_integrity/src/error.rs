use thiserror::Error;

/// Reasons the build output could not be annotated.
///
/// All of them mean the bundler version or its minified output no longer
/// matches what the plugin patches, so the build must stop.
#[derive(Debug, Error, PartialEq)]
pub enum IntegrityError {
  #[error("Hook plugin not found")]
  HookPluginNotFound { name: String },

  #[error("Hook plugin {name} has no generateBundle handler")]
  HookHandlerNotFound { name: String },

  #[error("Could not find a chunk containing the preload nonce marker")]
  PreloadChunkNotFound,

  #[error("Found more than one chunk containing the preload nonce marker: {}", .file_names.join(", "))]
  AmbiguousPreloadChunk { file_names: Vec<String> },

  #[error("Could not find minified names to inject into")]
  MinifiedNamesNotFound,
}
