use importmap_core::bundle::AssetSource;
use importmap_core::bundle::OutputBundle;
use importmap_core::bundle::OutputItem;
use indexmap::IndexMap;

use crate::compute_integrity_map;
use crate::integrity_map::ENTRY_HTML_FILE_NAME;

/// Adds `integrity` attributes to the static references of the HTML entry.
///
/// Integrities are recomputed here because patching the preload chunk changed
/// its bytes. Each path is annotated at its first quoted occurrence only.
pub fn rewrite_entry_html(bundle: &mut OutputBundle, seed: &IndexMap<String, String>) {
  let integrity = compute_integrity_map(bundle, seed);

  let Some(entry) = bundle
    .get_mut(ENTRY_HTML_FILE_NAME)
    .and_then(OutputItem::as_asset_mut)
  else {
    tracing::warn!(
      "No {} asset in bundle, static references are not annotated",
      ENTRY_HTML_FILE_NAME
    );
    return;
  };

  let mut html = entry.source.to_text().into_owned();
  for (path, descriptor) in integrity.iter() {
    let quoted = format!("\"{path}\"");
    html = html.replacen(&quoted, &format!("{quoted} integrity=\"{descriptor}\""), 1);
  }

  entry.source = AssetSource::Text(html);
}
