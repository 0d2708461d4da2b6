//! SVG imports as React components.
//!
//! `import Logo from "./logo.svg"` yields a component rendering the markup
//! inline; the named export `dataUri` carries a base64 `data:` URI for use in
//! `<img src>`.

use std::borrow::Cow;

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rolldown_common::ModuleType;
use rolldown_plugin::{HookLoadArgs, HookLoadOutput, HookLoadReturn, HookUsage, Plugin, PluginContext};

#[derive(Debug, Clone, Default)]
pub struct SvgComponentPlugin;

impl SvgComponentPlugin {
    pub fn new() -> Self {
        Self
    }

    /// Generate the JS module for one SVG document.
    pub(crate) fn module_code(svg: &str) -> String {
        let markup = serde_json::Value::String(strip_xml_prolog(svg).trim().to_string());
        let data_uri = serde_json::Value::String(format!(
            "data:image/svg+xml;base64,{}",
            STANDARD.encode(svg.as_bytes())
        ));

        format!(
            r#"import {{ createElement }} from "react";
const markup = {markup};
export const dataUri = {data_uri};
export default function SvgComponent(props) {{
  return createElement("span", {{ ...props, dangerouslySetInnerHTML: {{ __html: markup }} }});
}}
"#
        )
    }
}

/// Drop a leading `<?xml ...?>` declaration, which is invalid inside HTML.
fn strip_xml_prolog(svg: &str) -> &str {
    let trimmed = svg.trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return &trimmed[end + 2..];
        }
    }
    trimmed
}

impl Plugin for SvgComponentPlugin {
    fn name(&self) -> Cow<'static, str> {
        "webserve:svg-component".into()
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

        async move {
            if !id.ends_with(".svg") {
                return Ok(None);
            }

            let svg = tokio::fs::read_to_string(&id)
                .await
                .with_context(|| format!("Failed to read SVG file: {}", id))?;

            Ok(Some(HookLoadOutput {
                code: SvgComponentPlugin::module_code(&svg).into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}
