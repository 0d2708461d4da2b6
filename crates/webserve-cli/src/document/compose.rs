//! Marker substitution for the HTML template.
//!
//! Markers are located in the original template only and replaced in a
//! single left-to-right splice, so text inserted for one marker is never
//! scanned for another. This gives the fixed substitution order for free
//! and keeps the composer pure.

use indexmap::IndexMap;

/// Live-reload client injected at `SCRIPT_FOOTER` in development mode.
pub const RELOAD_CLIENT: &str = include_str!("../../assets/dev/reload-client.js");

/// Template markers, in substitution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    ScriptEnvs,
    ScriptBundle,
    StylesFile,
    ScriptFooter,
}

impl Marker {
    pub const ALL: [Marker; 4] = [
        Marker::ScriptEnvs,
        Marker::ScriptBundle,
        Marker::StylesFile,
        Marker::ScriptFooter,
    ];

    /// Literal comment text of the marker.
    pub fn as_str(self) -> &'static str {
        match self {
            Marker::ScriptEnvs => "<!-- SCRIPT_ENVS -->",
            Marker::ScriptBundle => "<!-- SCRIPT_BUNDLE -->",
            Marker::StylesFile => "<!-- STYLES_FILE -->",
            Marker::ScriptFooter => "<!-- SCRIPT_FOOTER -->",
        }
    }
}

/// Values substituted into the template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotValues {
    /// Environment mapping assigned to `window.__env__`
    pub envs: IndexMap<String, String>,
    /// Bundled script text
    pub script: String,
    /// Stylesheet text, possibly empty
    pub styles: String,
    /// Embed script and styles instead of linking `/bundle.js` and `/styles.css`
    pub inline: bool,
    /// Inject the live-reload client
    pub development: bool,
}

/// Wraps `fetch` so an inlined JSON value can stand in for a URL.
///
/// After inlining, `fetch("assets/data.json")` becomes `fetch({...})`; the
/// shim answers such calls with a response whose `json()` yields the value.
pub const FETCH_SHIM: &str = "const fetch = ((native) => async (input, init) => \
(input !== null && typeof input === \"object\" && !(input instanceof Request) && !(input instanceof URL)) \
? { ok: true, status: 200, json: async () => input } \
: native(input, init))(window.fetch.bind(window));";

/// Compose the final document from `template` and `slots`.
///
/// Missing markers are no-ops; only the first occurrence of each marker is
/// substituted.
pub fn compose(template: &str, slots: &SlotValues) -> String {
    let mut found: Vec<(usize, Marker)> = Marker::ALL
        .iter()
        .filter_map(|&marker| template.find(marker.as_str()).map(|pos| (pos, marker)))
        .collect();
    found.sort_by_key(|&(pos, _)| pos);

    let mut out = String::with_capacity(template.len() + slots.script.len() + slots.styles.len());
    let mut cursor = 0;

    for (pos, marker) in found {
        out.push_str(&template[cursor..pos]);
        out.push_str(&replacement(marker, slots));
        cursor = pos + marker.as_str().len();
    }
    out.push_str(&template[cursor..]);

    out
}

fn replacement(marker: Marker, slots: &SlotValues) -> String {
    match marker {
        Marker::ScriptEnvs => {
            let json = serde_json::to_string(&slots.envs).unwrap_or_else(|_| "{}".to_string());
            format!(
                "<script type=\"text/javascript\">window.__env__ = {}</script>",
                escape_script(&json)
            )
        }
        Marker::ScriptBundle if slots.inline => format!(
            "<script type=\"text/javascript\">\n{}\n{}\n</script>",
            FETCH_SHIM,
            escape_script(&slots.script)
        ),
        Marker::ScriptBundle => {
            "<script type=\"text/javascript\" src=\"/bundle.js\"></script>".to_string()
        }
        Marker::StylesFile if slots.styles.is_empty() => String::new(),
        Marker::StylesFile if slots.inline => {
            format!("<style>{}</style>", escape_style(&slots.styles))
        }
        Marker::StylesFile => "<link rel=\"stylesheet\" href=\"/styles.css\">".to_string(),
        Marker::ScriptFooter if slots.development => {
            format!("<script type=\"text/javascript\">\n{}</script>", RELOAD_CLIENT)
        }
        Marker::ScriptFooter => String::new(),
    }
}

/// Keep embedded text from closing its `<script>` element early.
fn escape_script(text: &str) -> String {
    text.replace("</script", "<\\/script")
        .replace("</SCRIPT", "<\\/SCRIPT")
}

/// Keep embedded CSS from closing its `<style>` element early.
fn escape_style(text: &str) -> String {
    text.replace("</style", "<\\/style")
        .replace("</STYLE", "<\\/STYLE")
}
