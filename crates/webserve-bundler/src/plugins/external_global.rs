//! Maps configured external modules onto `window` globals.
//!
//! An import of `react-dom` becomes a virtual module whose body is
//! `module.exports = window.reactdom;`, so the page is expected to load the
//! library separately (for example from a CDN `<script>` in the template).

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use rolldown_common::{ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};

/// Prefix of the virtual ids produced by this plugin.
const VIRTUAL_PREFIX: &str = "\0external-global:";

/// Name of the `window` property a package is expected under.
///
/// Separators are dropped: `react-dom` → `reactdom`, `@scope/pkg` → `scopepkg`.
pub fn global_name_for(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '.' | '/' | '@'))
        .collect()
}

#[derive(Debug, Clone)]
pub struct ExternalGlobalPlugin {
    externals: Arc<HashSet<String>>,
}

impl ExternalGlobalPlugin {
    pub fn new(externals: &[String]) -> Self {
        Self {
            externals: Arc::new(externals.iter().cloned().collect()),
        }
    }

    fn virtual_id(name: &str) -> String {
        format!("{VIRTUAL_PREFIX}{name}")
    }

    fn module_code(name: &str) -> String {
        format!("module.exports = window.{};\n", global_name_for(name))
    }
}

impl Plugin for ExternalGlobalPlugin {
    fn name(&self) -> Cow<'static, str> {
        "webserve:external-global".into()
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
        let externals = Arc::clone(&self.externals);

        async move {
            if !externals.contains(&specifier) {
                return Ok(None);
            }

            Ok(Some(HookResolveIdOutput {
                id: ExternalGlobalPlugin::virtual_id(&specifier).into(),
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

        async move {
            let Some(name) = id.strip_prefix(VIRTUAL_PREFIX) else {
                return Ok(None);
            };

            Ok(Some(HookLoadOutput {
                code: ExternalGlobalPlugin::module_code(name).into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}
