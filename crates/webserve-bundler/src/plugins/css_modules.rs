//! CSS module plugin.
//!
//! Intercepts `.css` imports in the `load` hook, compiles them with
//! lightningcss and hands the CSS to a [`StyleSink`] instead of letting it
//! reach the bundle. The module itself becomes a JS module:
//!
//! ```text
//! button.module.css → lightningcss (css_modules) → sink ← CSS
//!                                                → `export default { "primary": "Button_primary_x1" }`
//! styles.css        → lightningcss               → sink ← CSS
//!                                                → `export {};`
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use lightningcss::css_modules::{self, CssModuleReference};
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};
use rolldown_common::ModuleType;
use rolldown_common::side_effects::HookSideEffects;
use rolldown_plugin::{HookLoadArgs, HookLoadOutput, HookLoadReturn, HookUsage, Plugin, PluginContext};

use super::StyleSink;

/// Compiled form of one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompiledCss {
    /// CSS text to append to the stylesheet
    pub css: String,
    /// Local class name → generated class names (only for CSS modules)
    pub class_map: Option<BTreeMap<String, String>>,
}

/// Rolldown plugin that captures CSS into a [`StyleSink`].
#[derive(Debug, Clone)]
pub struct CssModulesPlugin {
    sink: StyleSink,
    minify: bool,
}

impl CssModulesPlugin {
    /// Create a plugin writing into `sink`.
    pub fn new(sink: StyleSink, minify: bool) -> Self {
        Self { sink, minify }
    }

    /// `.module.css` files get scoped class names; other `.css` files are global.
    fn is_css_module(id: &str) -> bool {
        id.ends_with(".module.css")
    }

    pub(crate) fn compile(path: &Path, source: &str, minify: bool) -> anyhow::Result<CompiledCss> {
        let filename = path.to_string_lossy().to_string();
        let scoped = Self::is_css_module(&filename);

        let mut stylesheet = StyleSheet::parse(
            source,
            ParserOptions {
                filename: filename.clone(),
                css_modules: scoped.then(css_modules::Config::default),
                ..Default::default()
            },
        )
        .map_err(|e| anyhow::anyhow!("Failed to parse CSS from {}: {}", filename, e))?;

        if minify {
            stylesheet
                .minify(MinifyOptions::default())
                .map_err(|e| anyhow::anyhow!("Failed to minify CSS from {}: {}", filename, e))?;
        }

        let result = stylesheet
            .to_css(PrinterOptions {
                minify,
                ..Default::default()
            })
            .map_err(|e| anyhow::anyhow!("Failed to print CSS from {}: {}", filename, e))?;

        let class_map = result.exports.map(|exports| {
            exports
                .into_iter()
                .map(|(local, export)| {
                    let mut names = vec![export.name];
                    for reference in export.composes {
                        match reference {
                            CssModuleReference::Local { name }
                            | CssModuleReference::Global { name } => names.push(name),
                            CssModuleReference::Dependency { name, .. } => names.push(name),
                        }
                    }
                    (local, names.join(" "))
                })
                .collect()
        });

        Ok(CompiledCss {
            css: result.code,
            class_map,
        })
    }

    /// JS module standing in for the stylesheet.
    pub(crate) fn module_code(compiled: &CompiledCss) -> String {
        match &compiled.class_map {
            Some(map) => {
                let json = serde_json::to_string(map).unwrap_or_else(|_| "{}".to_string());
                format!("export default {};\n", json)
            }
            None => "export {};\n".to_string(),
        }
    }
}

/// Stylesheet languages that need a preprocessor this plugin doesn't run.
fn unsupported_preprocessor(id: &str) -> Option<&'static str> {
    let ext = Path::new(id).extension()?.to_str()?;
    match ext {
        "scss" | "sass" => Some("Sass"),
        "less" => Some("Less"),
        "styl" => Some("Stylus"),
        _ => None,
    }
}

impl Plugin for CssModulesPlugin {
    fn name(&self) -> Cow<'static, str> {
        "webserve:css-modules".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::Load
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let sink = self.sink.clone();
        let minify = self.minify;

        async move {
            if let Some(language) = unsupported_preprocessor(&id) {
                anyhow::bail!(
                    "{} stylesheets are not supported: {}\n\nHint: compile it to plain .css and import that instead",
                    language,
                    id
                );
            }
            if !id.ends_with(".css") {
                return Ok(None);
            }

            let source = tokio::fs::read_to_string(&id)
                .await
                .with_context(|| format!("Failed to read CSS file: {}", id))?;

            let compiled = CssModulesPlugin::compile(Path::new(&id), &source, minify)?;
            tracing::debug!(
                module = %id,
                bytes = compiled.css.len(),
                scoped = compiled.class_map.is_some(),
                "captured css"
            );

            let code = CssModulesPlugin::module_code(&compiled);
            sink.insert(id, compiled.css);

            // The import itself is what places the sheet in the cascade.
            Ok(Some(HookLoadOutput {
                code: code.into(),
                module_type: Some(ModuleType::Js),
                side_effects: Some(HookSideEffects::True),
                ..Default::default()
            }))
        }
    }
}
