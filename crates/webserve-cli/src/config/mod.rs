//! Configuration for webserve.
//!
//! Two layers:
//!
//! - [`ProjectConfig`] is the raw, serde-facing configuration merged from
//!   defaults, `webserve.config.json`, `WEBSERVE_*` environment variables and
//!   CLI flags (in increasing priority).
//! - [`BuildConfig`] is the resolved, immutable configuration of one run:
//!   absolute paths, the captured environment mapping, the resolved plugin
//!   list and the development flag.

mod build_config;
mod loading;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use build_config::{BuildConfig, DEVELOPMENT, ENVIRONMENT_VAR, ServeConfig};

/// Name of the optional project configuration file.
pub const CONFIG_FILE: &str = "webserve.config.json";

/// Raw project configuration, as written in `webserve.config.json`.
///
/// ```json
/// {
///   "entry": "main.tsx",
///   "envs": ["ENVIRONMENT", "API_URL"],
///   "externals": ["react", "react-dom"],
///   "inline": false,
///   "port": 8080
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Entry file name, relative to `src_dir`
    pub entry: String,

    /// Environment variable names embedded into the page
    pub envs: Vec<String>,

    /// Minify script and styles
    pub minify: bool,

    /// Module names mapped to `window` globals
    pub externals: Vec<String>,

    /// Embed everything in one HTML document
    pub inline: bool,

    /// Optional bundler plugin names
    pub plugins: Vec<String>,

    /// Source directory
    pub src_dir: PathBuf,

    /// Public directory (template and assets)
    pub public_dir: PathBuf,

    /// Output directory
    pub out_dir: PathBuf,

    /// Template file name inside `public_dir`
    pub template: String,

    /// Dev server port
    pub port: u16,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            entry: "main.tsx".to_string(),
            envs: vec![ENVIRONMENT_VAR.to_string()],
            minify: false,
            externals: Vec::new(),
            inline: false,
            plugins: Vec::new(),
            src_dir: PathBuf::from("src"),
            public_dir: PathBuf::from("public"),
            out_dir: PathBuf::from("build"),
            template: "index.html".to_string(),
            port: 8080,
        }
    }
}
