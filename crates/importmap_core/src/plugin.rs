use std::fmt::Debug;
use std::fmt::Formatter;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::bundle::OutputBundle;

pub type GenerateBundleRef = Arc<dyn GenerateBundle>;
pub type ConfigResolvedRef = Arc<dyn ConfigResolved>;

/// The pipeline command a build runs under
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildCommand {
  #[default]
  Build,
  Serve,
}

/// Ordering hint of a plugin relative to the core plugins
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Enforce {
  Pre,
  Post,
}

/// Ordering hint of a single hook relative to the same hook of other plugins
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HookOrder {
  Pre,
  Post,
}

/// The receiver a hook is invoked with
#[derive(Clone, Debug, PartialEq)]
pub struct PluginContext {
  /// Name of the plugin the hook was registered by
  pub plugin_name: String,
  pub command: BuildCommand,
}

/// Called once with the final output bundle, before it is written out.
///
/// Hooks may mutate the bundle in place.
#[mockall::automock]
#[async_trait]
pub trait GenerateBundle: Send + Sync {
  async fn generate_bundle(
    &self,
    ctx: &PluginContext,
    bundle: &mut OutputBundle,
    is_write: bool,
  ) -> anyhow::Result<()>;
}

/// Called after the configuration is resolved, with access to the final plugin list
#[mockall::automock]
#[async_trait]
pub trait ConfigResolved: Send + Sync {
  async fn config_resolved(&self, config: &mut ResolvedConfig) -> anyhow::Result<()>;
}

/// A hook registered with an explicit handler and ordering metadata
#[derive(Clone, Default)]
pub struct ObjectHook {
  pub handler: Option<GenerateBundleRef>,
  pub order: Option<HookOrder>,
}

/// The two ways a plugin may register its bundle generation hook
#[derive(Clone)]
pub enum GenerateBundleHook {
  /// The handler is assigned directly
  Plain(GenerateBundleRef),
  /// The handler lives under the `handler` field of a hook object
  Object(ObjectHook),
}

impl GenerateBundleHook {
  pub fn handler(&self) -> Option<&GenerateBundleRef> {
    match self {
      GenerateBundleHook::Plain(handler) => Some(handler),
      GenerateBundleHook::Object(hook) => hook.handler.as_ref(),
    }
  }

  pub fn order(&self) -> Option<HookOrder> {
    match self {
      GenerateBundleHook::Plain(_) => None,
      GenerateBundleHook::Object(hook) => hook.order,
    }
  }
}

impl Debug for GenerateBundleHook {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      GenerateBundleHook::Plain(_) => f.write_str("Plain"),
      GenerateBundleHook::Object(hook) => f
        .debug_struct("Object")
        .field("has_handler", &hook.handler.is_some())
        .field("order", &hook.order)
        .finish(),
    }
  }
}

/// A build pipeline plugin descriptor
#[derive(Clone, Default)]
pub struct Plugin {
  pub name: String,
  /// Restricts the plugin to one command, applies to all when unset
  pub apply: Option<BuildCommand>,
  pub enforce: Option<Enforce>,
  pub config_resolved: Option<ConfigResolvedRef>,
  pub generate_bundle: Option<GenerateBundleHook>,
}

impl Plugin {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Default::default()
    }
  }

  pub fn applies_to(&self, command: BuildCommand) -> bool {
    self.apply.is_none_or(|apply| apply == command)
  }
}

impl Debug for Plugin {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Plugin")
      .field("name", &self.name)
      .field("apply", &self.apply)
      .field("enforce", &self.enforce)
      .field("config_resolved", &self.config_resolved.is_some())
      .field("generate_bundle", &self.generate_bundle)
      .finish()
  }
}

/// The configuration handed to `config_resolved` hooks
#[derive(Debug, Default)]
pub struct ResolvedConfig {
  pub command: BuildCommand,
  /// Plugins in the order they run
  pub plugins: Vec<Plugin>,
}

impl ResolvedConfig {
  pub fn find_plugin_mut(&mut self, name: &str) -> Option<&mut Plugin> {
    self.plugins.iter_mut().find(|plugin| plugin.name == name)
  }
}
