use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use webserve_bundler::{BundleRequest, NamedPlugin};

use crate::cli::{BuildArgs, BuildCommandArgs, ServeArgs, WatchArgs};
use crate::config::ProjectConfig;
use crate::error::ConfigError;

/// Variable that switches the whole system into development mode.
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Value of [`ENVIRONMENT_VAR`] meaning development mode.
pub const DEVELOPMENT: &str = "DEVELOPMENT";

/// Resolved configuration of one build run. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Working directory every other path was resolved against
    pub cwd: PathBuf,
    /// Entry file name, relative to `src_dir`
    pub entry: String,
    /// Environment mapping embedded as `window.__env__`
    pub envs: IndexMap<String, String>,
    pub minify: bool,
    /// Normalized external module names (trimmed, unique, in first-seen order)
    pub externals: Vec<String>,
    pub inline: bool,
    /// Resolved optional plugins
    pub plugins: Vec<NamedPlugin>,
    pub src_dir: PathBuf,
    pub public_dir: PathBuf,
    pub out_dir: PathBuf,
    /// Template file name inside `public_dir`
    pub template: String,
    /// Development mode, decided once at construction
    pub development: bool,
    /// Endpoint notified after a successful development build
    pub signal_url: Option<String>,
}

/// Configuration of the `serve` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub build: BuildConfig,
    pub port: u16,
    /// Open a browser once the server is up (development mode only)
    pub open: bool,
}

impl BuildConfig {
    /// Resolve a merged [`ProjectConfig`].
    ///
    /// `envs` is the captured environment mapping; `None` captures the
    /// variables named in `project.envs` from the process environment.
    pub fn resolve(
        project: ProjectConfig,
        cwd: &Path,
        envs: Option<IndexMap<String, String>>,
        signal_url: Option<String>,
    ) -> Self {
        let envs = envs.unwrap_or_else(|| capture_envs(&project.envs));
        let development = is_development(&envs);

        Self {
            cwd: cwd.to_path_buf(),
            entry: project.entry,
            envs,
            minify: project.minify,
            externals: normalize_externals(&project.externals),
            inline: project.inline,
            plugins: resolve_plugins(&project.plugins),
            src_dir: cwd.join(project.src_dir),
            public_dir: cwd.join(project.public_dir),
            out_dir: cwd.join(project.out_dir),
            template: project.template,
            development,
            signal_url,
        }
    }

    /// Configuration of the `build` command.
    ///
    /// With `--envs-json` the arguments are taken as a complete serialized
    /// configuration; otherwise the usual layering applies.
    pub fn from_build_args(args: &BuildCommandArgs) -> Result<Self, ConfigError> {
        Self::from_parts(&args.options, args.envs_json.as_deref(), args.signal_url.clone())
    }

    /// Configuration of the hidden `watch` command.
    pub fn from_watch_args(args: &WatchArgs) -> Result<Self, ConfigError> {
        Self::from_parts(&args.options, args.envs_json.as_deref(), args.signal_url.clone())
    }

    fn from_parts(
        options: &BuildArgs,
        envs_json: Option<&str>,
        signal_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let cwd = resolve_cwd(options.cwd.as_deref())?;

        match envs_json {
            Some(json) => {
                let envs: IndexMap<String, String> =
                    serde_json::from_str(json).map_err(|e| ConfigError::InvalidValue {
                        field: "envs-json".to_string(),
                        value: json.to_string(),
                        hint: format!("Expected a JSON object of strings ({})", e),
                    })?;
                let project = ProjectConfig::from_args_only(options)?;
                Ok(Self::resolve(project, &cwd, Some(envs), signal_url))
            }
            None => {
                let project = ProjectConfig::load(options, None, &cwd)?;
                Ok(Self::resolve(project, &cwd, None, signal_url))
            }
        }
    }

    /// Absolute path of the entry file.
    pub fn entry_path(&self) -> PathBuf {
        self.src_dir.join(&self.entry)
    }

    /// Absolute path of the HTML template.
    pub fn template_path(&self) -> PathBuf {
        self.public_dir.join(&self.template)
    }

    /// Root of the assets subtree inside the public directory.
    pub fn assets_dir(&self) -> PathBuf {
        self.public_dir.join("assets")
    }

    /// Request handed to the bundler.
    pub fn bundle_request(&self) -> BundleRequest {
        BundleRequest::new(self.entry_path(), &self.cwd)
            .minify(self.minify)
            .externals(self.externals.iter().cloned())
            .plugins(self.plugins.iter().copied())
    }

    /// Serialize into `build` arguments.
    ///
    /// Parsing the result with `webserve build` yields a config equal to
    /// `self`, so a child process sees the same configuration as its parent.
    pub fn to_args(&self) -> Vec<String> {
        let path = |p: &Path| p.to_string_lossy().into_owned();

        let mut args = vec![
            "--cwd".to_string(),
            path(&self.cwd),
            "--entry".to_string(),
            self.entry.clone(),
            "--src".to_string(),
            path(&self.src_dir),
            "--public".to_string(),
            path(&self.public_dir),
            "--out".to_string(),
            path(&self.out_dir),
            "--template".to_string(),
            self.template.clone(),
            "--envs-json".to_string(),
            serde_json::to_string(&self.envs).unwrap_or_else(|_| "{}".to_string()),
        ];

        if self.minify {
            args.push("--minify".to_string());
        }
        if self.inline {
            args.push("--inline".to_string());
        }
        if !self.externals.is_empty() {
            args.push("--externals".to_string());
            args.push(self.externals.join(","));
        }
        if !self.plugins.is_empty() {
            args.push("--plugins".to_string());
            args.push(
                self.plugins
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }
        if let Some(url) = &self.signal_url {
            args.push("--signal-url".to_string());
            args.push(url.clone());
        }

        args
    }
}

impl ServeConfig {
    /// Configuration of the `serve` command.
    pub fn from_args(args: &ServeArgs) -> Result<Self, ConfigError> {
        let cwd = resolve_cwd(args.options.cwd.as_deref())?;
        let project = ProjectConfig::load(&args.options, args.port, &cwd)?;
        let port = project.port;

        Ok(Self {
            build: BuildConfig::resolve(project, &cwd, None, None),
            port,
            open: !args.no_open,
        })
    }

    /// URL of the reload signal route on this server.
    pub fn signal_url(&self) -> String {
        format!("http://localhost:{}{}", self.port, crate::dev::SIGNAL_ROUTE)
    }

    /// Address shown to the user and opened in the browser.
    pub fn server_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

fn resolve_cwd(cwd: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let current = std::env::current_dir()?;
    Ok(match cwd {
        Some(dir) => current.join(dir),
        None => current,
    })
}

/// Read the named variables from the process environment. Unset variables
/// are left out of the mapping.
pub(crate) fn capture_envs(names: &[String]) -> IndexMap<String, String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok().map(|value| (name.clone(), value)))
        .collect()
}

/// Development mode from the captured mapping, falling back to the process
/// environment when the mapping doesn't carry `ENVIRONMENT`.
fn is_development(envs: &IndexMap<String, String>) -> bool {
    match envs.get(ENVIRONMENT_VAR) {
        Some(value) => value == DEVELOPMENT,
        None => std::env::var(ENVIRONMENT_VAR).is_ok_and(|v| v == DEVELOPMENT),
    }
}

pub(crate) fn normalize_externals(externals: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in externals.iter().flat_map(|e| e.split(',')) {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

pub(crate) fn resolve_plugins(names: &[String]) -> Vec<NamedPlugin> {
    let mut plugins = Vec::new();
    for name in names.iter().flat_map(|n| n.split(',')) {
        if name.trim().is_empty() {
            continue;
        }
        match name.parse::<NamedPlugin>() {
            Ok(plugin) if !plugins.contains(&plugin) => plugins.push(plugin),
            Ok(_) => {}
            Err(err) => tracing::warn!("{}, ignoring", err),
        }
    }
    plugins
}
