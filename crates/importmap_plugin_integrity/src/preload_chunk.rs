use importmap_core::bundle::OutputBundle;
use importmap_core::bundle::OutputChunk;
use importmap_core::bundle::OutputItem;

use crate::InjectionSiteMatcher;
use crate::IntegrityError;

/// Only the preload helper reads the nonce of the current script
pub const NONCE_MARKER: &str = r#"getAttribute("nonce");"#;

/// Left where the marker was. The attribute name is misspelled on purpose,
/// later steps rely on this exact text.
pub const NONCE_MARKER_REPLACEMENT: &str = r#"getAttribute("nounce");"#;

/// Finds the single chunk that contains the preload helper.
pub fn locate_preload_chunk(
  bundle: &mut OutputBundle,
) -> Result<&mut OutputChunk, IntegrityError> {
  let file_names = bundle
    .chunks()
    .filter(|chunk| chunk.code.contains(NONCE_MARKER))
    .map(|chunk| chunk.file_name.clone())
    .collect::<Vec<_>>();

  if file_names.len() > 1 {
    return Err(IntegrityError::AmbiguousPreloadChunk { file_names });
  }

  let Some(file_name) = file_names.first() else {
    return Err(IntegrityError::PreloadChunkNotFound);
  };

  tracing::debug!("Found preload helper in {}", file_name);

  bundle
    .get_mut(file_name)
    .and_then(OutputItem::as_chunk_mut)
    .ok_or(IntegrityError::PreloadChunkNotFound)
}

/// Declares `integrityMap` in the preload chunk, right after its nonce lookup.
pub fn patch_integrity_map(chunk: &mut OutputChunk, serialized_map: &str) {
  chunk.code = chunk.code.replacen(
    NONCE_MARKER,
    &format!("{NONCE_MARKER_REPLACEMENT} let integrityMap={serialized_map};"),
    1,
  );
}

/// Makes the preload helper set `integrity` on every `<link>` it creates.
///
/// The chunk is left untouched when the call site cannot be found.
pub fn patch_set_attribute_call(
  chunk: &mut OutputChunk,
  matcher: &dyn InjectionSiteMatcher,
) -> Result<(), IntegrityError> {
  let site = matcher.find_injection_site(&chunk.code)?;

  tracing::debug!(
    "Injecting integrity lookup into {} (href={}, link={})",
    chunk.file_name,
    site.href_value,
    site.link
  );

  chunk.code.replace_range(site.range.clone(), &site.patched());

  Ok(())
}
