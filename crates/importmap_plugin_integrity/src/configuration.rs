use importmap_core::diagnostic::Diagnostic;
use importmap_core::hash::Integrity;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::PLUGIN_NAME;

/// Options of the dynamic import map plugin
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportMapConfiguration {
  /// Pre-known integrities for resources the build does not emit, such as CDN
  /// hosted scripts, keyed by root-relative path
  pub external_resource_integrities: IndexMap<String, String>,
}

impl ImportMapConfiguration {
  /// Checks that every external integrity is keyed by a root-relative path and
  /// holds one or more well formed descriptors.
  pub fn validate(&self) -> Result<(), Diagnostic> {
    for (path, integrity) in &self.external_resource_integrities {
      if !path.starts_with('/') {
        return Err(
          Diagnostic::new(format!(
            "External resource integrity key \"{path}\" is not a root-relative path"
          ))
          .with_origin(PLUGIN_NAME)
          .with_hint(format!("Use \"/{}\" instead", path.trim_start_matches("./"))),
        );
      }

      let mut descriptors = integrity.split_whitespace().peekable();
      if descriptors.peek().is_none() {
        return Err(
          Diagnostic::new(format!("External resource integrity for \"{path}\" is empty"))
            .with_origin(PLUGIN_NAME),
        );
      }

      for descriptor in descriptors {
        // Descriptors may carry options after a `?`, they are not part of the digest
        let digest = descriptor.split('?').next().unwrap_or(descriptor);

        if let Err(error) = Integrity::parse(digest) {
          return Err(
            Diagnostic::new(format!(
              "Invalid external resource integrity for \"{path}\": {error}"
            ))
            .with_origin(PLUGIN_NAME)
            .with_hint("Integrities look like \"sha384-<base64 digest>\""),
          );
        }
      }
    }

    Ok(())
  }
}
