use std::sync::Arc;

use async_trait::async_trait;
use importmap_core::diagnostic::Diagnostic;
use importmap_core::plugin::BuildCommand;
use importmap_core::plugin::ConfigResolved;
use importmap_core::plugin::Enforce;
use importmap_core::plugin::Plugin;
use importmap_core::plugin::ResolvedConfig;

use crate::wrap_generate_bundle;
use crate::ImportMapConfiguration;
use crate::IntegrityError;
use crate::IntegrityInjector;

pub const PLUGIN_NAME: &str = "vite-plugin-dynamic-importmap";

/// The bundler plugin that generates the preload helper for dynamic imports
pub const IMPORT_ANALYSIS_PLUGIN_NAME: &str = "vite:build-import-analysis";

/// Hooks the integrity injector into the import analysis plugin once the
/// plugin list is final
#[derive(Debug)]
pub struct DynamicImportMapPlugin {
  configuration: ImportMapConfiguration,
}

impl DynamicImportMapPlugin {
  pub fn new(configuration: ImportMapConfiguration) -> Self {
    Self { configuration }
  }
}

#[async_trait]
impl ConfigResolved for DynamicImportMapPlugin {
  #[tracing::instrument(level = "debug", skip_all, fields(plugin = PLUGIN_NAME))]
  async fn config_resolved(&self, config: &mut ResolvedConfig) -> anyhow::Result<()> {
    self.configuration.validate()?;

    let plugin = config
      .find_plugin_mut(IMPORT_ANALYSIS_PLUGIN_NAME)
      .ok_or_else(|| {
        let error = IntegrityError::HookPluginNotFound {
          name: IMPORT_ANALYSIS_PLUGIN_NAME.to_string(),
        };
        let diagnostic = Diagnostic::new(error.to_string())
          .with_origin(PLUGIN_NAME)
          .with_hint(format!(
            "Expected a plugin named \"{IMPORT_ANALYSIS_PLUGIN_NAME}\" in the build, it generates the preload helper this plugin patches"
          ));

        anyhow::Error::new(error).context(diagnostic)
      })?;

    let injector = IntegrityInjector::new(
      self
        .configuration
        .external_resource_integrities
        .clone(),
    );

    if !wrap_generate_bundle(plugin, Arc::new(injector)) {
      return Err(
        IntegrityError::HookHandlerNotFound {
          name: IMPORT_ANALYSIS_PLUGIN_NAME.to_string(),
        }
        .into(),
      );
    }

    Ok(())
  }
}

/// Build-only plugin that adds Subresource Integrity to dynamically imported
/// chunks and to the static references of the HTML entry
pub fn dynamic_import_map(configuration: ImportMapConfiguration) -> Plugin {
  Plugin {
    apply: Some(BuildCommand::Build),
    enforce: Some(Enforce::Post),
    config_resolved: Some(Arc::new(DynamicImportMapPlugin::new(configuration))),
    ..Plugin::new(PLUGIN_NAME)
  }
}

#[cfg(test)]
mod tests {
  use async_trait::async_trait;
  use importmap_core::bundle::OutputAsset;
  use importmap_core::bundle::OutputBundle;
  use importmap_core::bundle::OutputChunk;
  use importmap_core::bundle::OutputItem;
  use importmap_core::diagnostic::Diagnostic;
  use importmap_core::hash::Integrity;
  use importmap_core::plugin::GenerateBundle;
  use importmap_core::plugin::GenerateBundleHook;
  use importmap_core::plugin::GenerateBundleRef;
  use importmap_core::plugin::ObjectHook;
  use importmap_core::plugin::PluginContext;
  use importmap_core::plugin_container::PluginContainer;
  use indexmap::IndexMap;
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::test_utils::*;

  /// Stands in for the bundler's import analysis, which rewrites chunks
  /// before the bundle is written
  struct ImportAnalysis;

  #[async_trait]
  impl GenerateBundle for ImportAnalysis {
    async fn generate_bundle(
      &self,
      _ctx: &PluginContext,
      bundle: &mut OutputBundle,
      _is_write: bool,
    ) -> anyhow::Result<()> {
      let Some(chunk) = bundle.get_mut("app.js").and_then(OutputItem::as_chunk_mut) else {
        return Ok(());
      };
      chunk.code = chunk.code.replace("[\"assets/page.js\"]", "[\"page.js\"]");
      Ok(())
    }
  }

  fn import_analysis(hook: fn(Arc<ImportAnalysis>) -> GenerateBundleHook) -> Plugin {
    Plugin {
      generate_bundle: Some(hook(Arc::new(ImportAnalysis))),
      ..Plugin::new(IMPORT_ANALYSIS_PLUGIN_NAME)
    }
  }

  fn plain(handler: Arc<ImportAnalysis>) -> GenerateBundleHook {
    GenerateBundleHook::Plain(handler)
  }

  fn object(handler: Arc<ImportAnalysis>) -> GenerateBundleHook {
    let handler: GenerateBundleRef = handler;
    GenerateBundleHook::Object(ObjectHook {
      handler: Some(handler),
      order: None,
    })
  }

  async fn build(
    command: BuildCommand,
    plugins: Vec<Plugin>,
    bundle: &mut OutputBundle,
  ) -> anyhow::Result<()> {
    let mut container = PluginContainer::new(command, plugins);
    container.config_resolved().await?;
    container.generate_bundle(bundle, true).await
  }

  fn app_bundle_with_page() -> OutputBundle {
    let mut bundle = app_bundle();
    bundle.insert(OutputChunk::new("page.js", PAGE_JS));
    bundle
  }

  #[test]
  fn describes_a_post_build_plugin() {
    let plugin = dynamic_import_map(ImportMapConfiguration::default());

    assert_eq!(plugin.name, "vite-plugin-dynamic-importmap");
    assert_eq!(plugin.apply, Some(BuildCommand::Build));
    assert_eq!(plugin.enforce, Some(Enforce::Post));
    assert!(plugin.generate_bundle.is_none());
  }

  #[tokio::test]
  async fn annotates_the_build_output() {
    for hook in [plain, object] {
      let mut bundle = app_bundle_with_page();

      build(
        BuildCommand::Build,
        vec![
          dynamic_import_map(ImportMapConfiguration::default()),
          import_analysis(hook),
        ],
        &mut bundle,
      )
      .await
      .unwrap();

      let app = chunk_code(&bundle, "app.js");
      assert!(app.contains(r#"["page.js"]"#));
      assert!(app.contains(&format!(
        r#""/page.js":"{}""#,
        Integrity::sha384(PAGE_JS.as_bytes())
      )));
      assert!(app.contains(r#"z.setAttribute("integrity", integrityMap[x])"#));
      assert!(entry_html(&bundle).contains(&format!(
        r#"src="/app.js" integrity="{}""#,
        Integrity::sha384(app.as_bytes())
      )));
    }
  }

  #[tokio::test]
  async fn is_not_applied_when_serving() {
    let mut bundle = app_bundle_with_page();

    build(
      BuildCommand::Serve,
      vec![
        dynamic_import_map(ImportMapConfiguration::default()),
        import_analysis(plain),
      ],
      &mut bundle,
    )
    .await
    .unwrap();

    assert!(!chunk_code(&bundle, "app.js").contains("integrityMap"));
    assert_eq!(entry_html(&bundle), INDEX_HTML);
  }

  #[tokio::test]
  async fn fails_the_build_without_import_analysis() {
    let error = build(
      BuildCommand::Build,
      vec![
        dynamic_import_map(ImportMapConfiguration::default()),
        Plugin::new("vite:build-import-analysis-legacy"),
      ],
      &mut app_bundle(),
    )
    .await
    .unwrap_err();

    assert_eq!(error.root_cause().to_string(), "Hook plugin not found");
    assert_eq!(
      error.downcast_ref::<IntegrityError>(),
      Some(&IntegrityError::HookPluginNotFound {
        name: IMPORT_ANALYSIS_PLUGIN_NAME.to_string()
      })
    );

    let diagnostic = error.downcast_ref::<Diagnostic>().unwrap();
    assert_eq!(diagnostic.origin.as_deref(), Some(PLUGIN_NAME));
    assert!(diagnostic
      .hints
      .iter()
      .flatten()
      .any(|hint| hint.contains("\"vite:build-import-analysis\"")));
  }

  #[tokio::test]
  async fn fails_the_build_when_import_analysis_has_no_handler() {
    let error = build(
      BuildCommand::Build,
      vec![
        dynamic_import_map(ImportMapConfiguration::default()),
        Plugin::new(IMPORT_ANALYSIS_PLUGIN_NAME),
      ],
      &mut app_bundle(),
    )
    .await
    .unwrap_err();

    assert_eq!(
      error.downcast_ref::<IntegrityError>(),
      Some(&IntegrityError::HookHandlerNotFound {
        name: IMPORT_ANALYSIS_PLUGIN_NAME.to_string()
      })
    );
  }

  #[tokio::test]
  async fn fails_the_build_on_invalid_external_integrities() {
    let configuration = ImportMapConfiguration {
      external_resource_integrities: IndexMap::from([(
        String::from("/cdn/lib.js"),
        String::from("sha1-AAAA"),
      )]),
    };

    let error = build(
      BuildCommand::Build,
      vec![dynamic_import_map(configuration), import_analysis(plain)],
      &mut app_bundle(),
    )
    .await
    .unwrap_err();

    assert_eq!(
      error.downcast_ref::<Diagnostic>().and_then(|d| d.origin.as_deref()),
      Some(PLUGIN_NAME)
    );
  }

  #[tokio::test]
  async fn annotates_external_resources_in_the_entry_html() {
    let integrity = Integrity::sha384(b"cdn").to_string();
    let configuration = ImportMapConfiguration {
      external_resource_integrities: IndexMap::from([(
        String::from("/cdn/lib.js"),
        integrity.clone(),
      )]),
    };
    let mut bundle = app_bundle();
    bundle.insert(OutputAsset::new(
      "index.html",
      r#"<script src="/cdn/lib.js"></script><script type="module" src="/app.js"></script>"#,
    ));

    build(
      BuildCommand::Build,
      vec![dynamic_import_map(configuration), import_analysis(plain)],
      &mut bundle,
    )
    .await
    .unwrap();

    assert!(entry_html(&bundle).starts_with(&format!(
      r#"<script src="/cdn/lib.js" integrity="{integrity}"></script>"#
    )));
  }
}
