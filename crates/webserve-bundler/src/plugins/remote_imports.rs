//! Bundle-time fetching of `http(s)://` imports.
//!
//! Absolute URL specifiers are claimed as-is. Relative specifiers inside a
//! remote module are joined onto the importer's URL, so a CDN module that
//! imports `./util.js` keeps working.

use std::borrow::Cow;
use std::path::Path;

use anyhow::Context;
use reqwest::Url;
use rolldown_common::{ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};

#[derive(Debug, Clone, Default)]
pub struct RemoteImportsPlugin {
    client: reqwest::Client,
}

impl RemoteImportsPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_remote(specifier: &str) -> bool {
    specifier.starts_with("http://") || specifier.starts_with("https://")
}

/// Resolve `specifier` against `importer` when either is a URL.
fn resolve_remote(specifier: &str, importer: Option<&str>) -> Option<Url> {
    if is_remote(specifier) {
        return Url::parse(specifier).ok();
    }

    let importer = importer.filter(|i| is_remote(i))?;
    if !(specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/'))
    {
        return None;
    }

    Url::parse(importer).ok()?.join(specifier).ok()
}

/// Module type from the URL path's extension.
fn infer_module_type(url: &str) -> ModuleType {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());

    match Path::new(&path).extension().and_then(|e| e.to_str()) {
        Some("tsx") => ModuleType::Tsx,
        Some("ts") | Some("mts") => ModuleType::Ts,
        Some("jsx") => ModuleType::Jsx,
        Some("json") => ModuleType::Json,
        _ => ModuleType::Js,
    }
}

impl Plugin for RemoteImportsPlugin {
    fn name(&self) -> Cow<'static, str> {
        "webserve:remote-imports".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let importer = args.importer.map(|i| i.to_string());

        async move {
            let Some(url) = resolve_remote(&specifier, importer.as_deref()) else {
                return Ok(None);
            };

            Ok(Some(HookResolveIdOutput {
                id: url.to_string().into(),
                external: Some(ResolvedExternal::Bool(false)),
                ..Default::default()
            }))
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let client = self.client.clone();

        async move {
            if !is_remote(&id) {
                return Ok(None);
            }

            tracing::debug!(url = %id, "fetching remote module");

            let code = client
                .get(&id)
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .with_context(|| format!("Failed to fetch remote module: {}", id))?
                .text()
                .await
                .with_context(|| format!("Failed to read remote module body: {}", id))?;

            Ok(Some(HookLoadOutput {
                code: code.into(),
                module_type: Some(infer_module_type(&id)),
                ..Default::default()
            }))
        }
    }
}
