//! Rolldown-backed [`Bundler`] implementation.

use std::sync::Arc;

use async_trait::async_trait;
use rolldown::{BundlerBuilder, BundlerOptions, InputItem, OutputFormat, Platform, RawMinifyOptions};
use rolldown_common::{Output, StrOrBytes};
use rolldown_plugin::__inner::SharedPluginable;

use crate::plugins::{CssModulesPlugin, ExternalGlobalPlugin, StyleSink, SvgComponentPlugin};
use crate::{BundleOutput, BundleRequest, Bundler, Error, Result};

/// Name of the single output chunk.
const BUNDLE_NAME: &str = "bundle";

/// Bundler that runs Rolldown in memory and never writes to disk.
#[derive(Debug, Clone, Default)]
pub struct RolldownBundler;

impl RolldownBundler {
    /// Create a new Rolldown bundler.
    pub fn new() -> Self {
        Self
    }

    /// Build the plugin chain for one request.
    ///
    /// Order: CSS modules, SVG components, external globals, then the
    /// optional named plugins in configured order.
    fn plugin_chain(request: &BundleRequest, styles: &StyleSink) -> Vec<SharedPluginable> {
        let mut plugins: Vec<SharedPluginable> = vec![
            Arc::new(CssModulesPlugin::new(styles.clone(), request.minify)),
            Arc::new(SvgComponentPlugin::new()),
            Arc::new(ExternalGlobalPlugin::new(&request.externals)),
        ];

        for named in &request.plugins {
            plugins.push(named.instantiate());
        }

        plugins
    }

    fn rolldown_options(request: &BundleRequest) -> BundlerOptions {
        BundlerOptions {
            input: Some(vec![InputItem {
                name: Some(BUNDLE_NAME.to_string()),
                import: request.entry.to_string_lossy().into_owned(),
            }]),
            cwd: Some(request.cwd.clone()),
            format: Some(OutputFormat::Iife),
            platform: Some(Platform::Browser),
            minify: request.minify.then(|| RawMinifyOptions::from(true)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Bundler for RolldownBundler {
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput> {
        if !request.entry.is_file() {
            return Err(Error::EntryNotFound(request.entry.clone()));
        }

        let styles = StyleSink::new();
        let plugins = Self::plugin_chain(request, &styles);

        tracing::debug!(
            entry = %request.entry.display(),
            plugins = plugins.len(),
            minify = request.minify,
            "starting rolldown bundle"
        );

        let mut bundler = BundlerBuilder::default()
            .with_options(Self::rolldown_options(request))
            .with_plugins(plugins)
            .build()
            .map_err(|e| Error::from_rolldown_batch(&e))?;

        let output = bundler
            .generate()
            .await
            .map_err(|e| Error::from_rolldown_batch(&e))?;

        let mut script = String::new();
        let mut emitted_css = String::new();
        let mut execution_order: Vec<&str> = Vec::new();

        for item in &output.assets {
            match item {
                Output::Chunk(chunk) => {
                    script.push_str(&chunk.code);
                    execution_order.extend(chunk.modules.keys.iter().map(|id| &**id));
                }
                Output::Asset(asset) if asset.filename.ends_with(".css") => match &asset.source {
                    StrOrBytes::Str(s) => emitted_css.push_str(s),
                    StrOrBytes::Bytes(b) => emitted_css.push_str(&String::from_utf8_lossy(b)),
                },
                Output::Asset(_) => {}
            }
        }

        let mut styles = styles.collect_in_order(execution_order);
        styles.push_str(&emitted_css);

        Ok(BundleOutput { script, styles })
    }
}
