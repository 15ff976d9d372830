use crate::bundle::OutputBundle;
use crate::plugin::BuildCommand;
use crate::plugin::Enforce;
use crate::plugin::GenerateBundleRef;
use crate::plugin::HookOrder;
use crate::plugin::Plugin;
use crate::plugin::PluginContext;
use crate::plugin::ResolvedConfig;

/// Drives plugin hooks for one build.
///
/// Plugins that do not apply to the command are dropped, the rest are sorted
/// by their `enforce` hint (pre, normal, post) keeping registration order
/// within each group.
#[derive(Debug)]
pub struct PluginContainer {
  config: ResolvedConfig,
}

impl PluginContainer {
  pub fn new(command: BuildCommand, plugins: Vec<Plugin>) -> Self {
    let mut plugins = plugins
      .into_iter()
      .filter(|plugin| plugin.applies_to(command))
      .collect::<Vec<_>>();

    plugins.sort_by_key(|plugin| match plugin.enforce {
      Some(Enforce::Pre) => 0,
      None => 1,
      Some(Enforce::Post) => 2,
    });

    Self {
      config: ResolvedConfig { command, plugins },
    }
  }

  pub fn config(&self) -> &ResolvedConfig {
    &self.config
  }

  /// Runs every `config_resolved` hook in plugin order.
  ///
  /// Hooks receive the resolved config mutably so they can decorate other plugins.
  #[tracing::instrument(level = "debug", skip_all)]
  pub async fn config_resolved(&mut self) -> anyhow::Result<()> {
    let hooks = self
      .config
      .plugins
      .iter()
      .filter_map(|plugin| {
        plugin
          .config_resolved
          .clone()
          .map(|hook| (plugin.name.clone(), hook))
      })
      .collect::<Vec<_>>();

    for (name, hook) in hooks {
      tracing::debug!(plugin = %name, "configResolved");
      hook.config_resolved(&mut self.config).await?;
    }

    Ok(())
  }

  /// Runs every `generate_bundle` hook sequentially, stopping at the first error.
  ///
  /// Hooks ordered `pre` run first and hooks ordered `post` run last.
  #[tracing::instrument(level = "debug", skip_all)]
  pub async fn generate_bundle(
    &self,
    bundle: &mut OutputBundle,
    is_write: bool,
  ) -> anyhow::Result<()> {
    let mut hooks = self
      .config
      .plugins
      .iter()
      .filter_map(|plugin| {
        let hook = plugin.generate_bundle.as_ref()?;
        let handler = hook.handler()?.clone();
        Some((plugin.name.as_str(), hook.order(), handler))
      })
      .collect::<Vec<(&str, Option<HookOrder>, GenerateBundleRef)>>();

    hooks.sort_by_key(|(_, order, _)| match order {
      Some(HookOrder::Pre) => 0,
      None => 1,
      Some(HookOrder::Post) => 2,
    });

    for (name, _, handler) in hooks {
      tracing::debug!(plugin = %name, "generateBundle");

      let ctx = PluginContext {
        plugin_name: name.to_string(),
        command: self.config.command,
      };

      handler.generate_bundle(&ctx, bundle, is_write).await?;
    }

    Ok(())
  }
}
