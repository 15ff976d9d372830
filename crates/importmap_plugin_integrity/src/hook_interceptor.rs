use std::sync::Arc;

use async_trait::async_trait;
use importmap_core::bundle::OutputBundle;
use importmap_core::plugin::GenerateBundle;
use importmap_core::plugin::GenerateBundleHook;
use importmap_core::plugin::GenerateBundleRef;
use importmap_core::plugin::Plugin;
use importmap_core::plugin::PluginContext;

/// Runs `continuation` with the same arguments once `original` completed successfully
pub struct ChainedGenerateBundle {
  original: GenerateBundleRef,
  continuation: GenerateBundleRef,
}

impl ChainedGenerateBundle {
  pub fn new(original: GenerateBundleRef, continuation: GenerateBundleRef) -> Self {
    Self {
      original,
      continuation,
    }
  }
}

#[async_trait]
impl GenerateBundle for ChainedGenerateBundle {
  async fn generate_bundle(
    &self,
    ctx: &PluginContext,
    bundle: &mut OutputBundle,
    is_write: bool,
  ) -> anyhow::Result<()> {
    self.original.generate_bundle(ctx, bundle, is_write).await?;
    self.continuation.generate_bundle(ctx, bundle, is_write).await
  }
}

/// Makes `continuation` run after the plugin's own `generate_bundle` hook.
///
/// Both hook shapes are handled; the object shape keeps its ordering metadata.
/// Returns `false` and leaves the plugin untouched when it has no hook handler.
pub fn wrap_generate_bundle(plugin: &mut Plugin, continuation: GenerateBundleRef) -> bool {
  let wrapped = match plugin.generate_bundle.as_mut() {
    Some(GenerateBundleHook::Plain(handler)) => handler,
    Some(GenerateBundleHook::Object(hook)) => match hook.handler.as_mut() {
      Some(handler) => handler,
      None => {
        tracing::warn!("{} has a generateBundle hook without handler", plugin.name);
        return false;
      }
    },
    None => {
      tracing::warn!("{} has no generateBundle hook", plugin.name);
      return false;
    }
  };

  let chained: GenerateBundleRef =
    Arc::new(ChainedGenerateBundle::new(wrapped.clone(), continuation));
  *wrapped = chained;

  tracing::debug!("Wrapped generateBundle of {}", plugin.name);

  true
}
