//! Rolldown plugins used by webserve.
//!
//! The first three plugins are always active. Everything else is an optional
//! [`NamedPlugin`] chosen by name in the configuration; the set of names is
//! closed, so selecting a plugin can never load arbitrary code.

mod css_modules;
mod external_global;
mod remote_imports;
mod svg;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use rolldown_plugin::__inner::SharedPluginable;

pub use css_modules::CssModulesPlugin;
pub use external_global::{ExternalGlobalPlugin, global_name_for};
pub use remote_imports::RemoteImportsPlugin;
pub use svg::SvgComponentPlugin;

/// Optional plugins that can be activated by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedPlugin {
    /// Fetch `http(s)://` imports at bundle time
    RemoteImports,
}

impl NamedPlugin {
    /// Every known plugin.
    pub const ALL: &'static [NamedPlugin] = &[NamedPlugin::RemoteImports];

    /// Configuration name of the plugin.
    pub fn as_str(self) -> &'static str {
        match self {
            NamedPlugin::RemoteImports => "remote-imports",
        }
    }

    /// Construct the Rolldown plugin.
    pub fn instantiate(self) -> SharedPluginable {
        match self {
            NamedPlugin::RemoteImports => Arc::new(RemoteImportsPlugin::new()),
        }
    }
}

impl fmt::Display for NamedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a plugin name is not in [`NamedPlugin::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plugin '{0}'")]
pub struct UnknownPlugin(pub String);

impl FromStr for NamedPlugin {
    type Err = UnknownPlugin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "remote-imports" | "deno-loader" => Ok(NamedPlugin::RemoteImports),
            other => Err(UnknownPlugin(other.to_string())),
        }
    }
}

/// Accumulates CSS captured by [`CssModulesPlugin`] during one bundle.
///
/// Rolldown loads modules concurrently, so load order says nothing about
/// cascade order. Sheets are keyed by module id and joined in execution
/// order once the chunk is known; ids missing from that order follow in id
/// order so the output stays stable between builds.
#[derive(Debug, Clone, Default)]
pub struct StyleSink {
    sheets: Arc<Mutex<BTreeMap<String, String>>>,
}

impl StyleSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the compiled CSS of one module, replacing any earlier value.
    pub fn insert(&self, module_id: impl Into<String>, css: impl Into<String>) {
        self.sheets.lock().insert(module_id.into(), css.into());
    }

    /// Concatenate everything captured so far, in module id order.
    pub fn collect(&self) -> String {
        self.collect_in_order(std::iter::empty::<&str>())
    }

    /// Concatenate the captured sheets following `execution_order`, then any
    /// sheet whose module is not listed.
    pub fn collect_in_order<'a>(&self, execution_order: impl IntoIterator<Item = &'a str>) -> String {
        let mut remaining = self.sheets.lock().clone();
        let mut out = String::new();

        let mut push = |css: String| {
            out.push_str(&css);
            if !css.ends_with('\n') {
                out.push('\n');
            }
        };

        for id in execution_order {
            if let Some(css) = remaining.remove(id) {
                push(css);
            }
        }
        for css in remaining.into_values() {
            push(css);
        }
        out
    }

    /// Check whether no CSS was captured.
    pub fn is_empty(&self) -> bool {
        self.sheets.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_plugin_parse() {
        assert_eq!("remote-imports".parse(), Ok(NamedPlugin::RemoteImports));
        assert_eq!(" deno-loader ".parse(), Ok(NamedPlugin::RemoteImports));
        assert_eq!(
            "tailwind".parse::<NamedPlugin>(),
            Err(UnknownPlugin("tailwind".to_string()))
        );
    }

    #[test]
    fn test_named_plugin_display_roundtrip() {
        for plugin in NamedPlugin::ALL {
            assert_eq!(plugin.to_string().parse::<NamedPlugin>(), Ok(*plugin));
        }
    }

    #[test]
    fn test_style_sink_orders_by_module_id() {
        let sink = StyleSink::new();
        assert!(sink.is_empty());

        sink.insert("/src/b.css", "b{}");
        sink.insert("/src/a.css", "a{}");

        assert_eq!(sink.collect(), "a{}\nb{}\n");
    }

    #[test]
    fn test_style_sink_follows_execution_order() {
        let sink = StyleSink::new();
        sink.insert("/src/a_theme.css", "a{}");
        sink.insert("/src/z_reset.css", "z{}");
        sink.insert("/src/m_unlisted.css", "m{}");

        let order = ["/src/main.ts", "/src/z_reset.css", "/src/a_theme.css"];
        assert_eq!(sink.collect_in_order(order), "z{}\na{}\nm{}\n");
    }

    #[test]
    fn test_style_sink_shared_between_clones() {
        let sink = StyleSink::new();
        let clone = sink.clone();
        clone.insert("/src/a.css", "a{}\n");
        assert_eq!(sink.collect(), "a{}\n");
    }
}
