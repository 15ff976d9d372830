use std::sync::Arc;

use async_trait::async_trait;
use importmap_core::bundle::OutputBundle;
use importmap_core::plugin::GenerateBundle;
use importmap_core::plugin::PluginContext;
use indexmap::IndexMap;

use crate::compute_integrity_map;
use crate::entry_html::rewrite_entry_html;
use crate::preload_chunk::locate_preload_chunk;
use crate::preload_chunk::patch_integrity_map;
use crate::preload_chunk::patch_set_attribute_call;
use crate::InjectionSiteMatcher;
use crate::MinifiedPreloadMatcher;

/// Annotates the final bundle with integrities.
///
/// Runs after the import analysis plugin generated the preload helper: the
/// helper gets a runtime integrity table and sets `integrity` on every
/// `<link>` it creates, then the HTML entry gets static `integrity` attributes.
#[derive(Debug)]
pub struct IntegrityInjector {
  external_resource_integrities: IndexMap<String, String>,
  matcher: Arc<dyn InjectionSiteMatcher>,
}

impl IntegrityInjector {
  pub fn new(external_resource_integrities: IndexMap<String, String>) -> Self {
    Self::with_matcher(
      external_resource_integrities,
      Arc::new(MinifiedPreloadMatcher::default()),
    )
  }

  pub fn with_matcher(
    external_resource_integrities: IndexMap<String, String>,
    matcher: Arc<dyn InjectionSiteMatcher>,
  ) -> Self {
    Self {
      external_resource_integrities,
      matcher,
    }
  }

  pub fn inject(&self, bundle: &mut OutputBundle) -> anyhow::Result<()> {
    let integrity = compute_integrity_map(bundle, &self.external_resource_integrities);
    let serialized_map = integrity.to_json()?;

    let preload_chunk = locate_preload_chunk(bundle)?;
    patch_integrity_map(preload_chunk, &serialized_map);
    patch_set_attribute_call(preload_chunk, self.matcher.as_ref())?;

    rewrite_entry_html(bundle, &self.external_resource_integrities);

    tracing::debug!("Injected {} integrities", integrity.iter().count());

    Ok(())
  }
}

#[async_trait]
impl GenerateBundle for IntegrityInjector {
  #[tracing::instrument(
    level = "debug",
    skip_all,
    fields(plugin = "IntegrityInjector", receiver = %ctx.plugin_name)
  )]
  async fn generate_bundle(
    &self,
    ctx: &PluginContext,
    bundle: &mut OutputBundle,
    _is_write: bool,
  ) -> anyhow::Result<()> {
    self.inject(bundle)
  }
}
