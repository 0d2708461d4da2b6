use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::BuildArgs;
use crate::config::{CONFIG_FILE, ProjectConfig};
use crate::error::ConfigError;

/// Values given explicitly on the command line. Unset fields are skipped so
/// they don't shadow lower layers.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    envs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    externals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plugins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    src_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
}

impl CliOverrides {
    fn from_args(args: &BuildArgs, port: Option<u16>) -> Self {
        let non_empty = |v: &Vec<String>| (!v.is_empty()).then(|| v.clone());

        Self {
            entry: args.entry.clone(),
            envs: non_empty(&args.envs),
            minify: args.minify.then_some(true),
            externals: non_empty(&args.externals),
            inline: args.inline.then_some(true),
            plugins: non_empty(&args.plugins),
            src_dir: args.src.clone(),
            public_dir: args.public.clone(),
            out_dir: args.out.clone(),
            template: args.template.clone(),
            port,
        }
    }
}

impl ProjectConfig {
    /// Load configuration from every source.
    ///
    /// Priority: CLI args > `WEBSERVE_*` environment variables > config file > defaults.
    pub fn load(args: &BuildArgs, port: Option<u16>, cwd: &Path) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(ProjectConfig::default()));

        let config_file = cwd.join(CONFIG_FILE);
        if config_file.is_file() {
            tracing::debug!(path = %config_file.display(), "loading config file");
            figment = figment.merge(Json::file(config_file));
        }

        // WEBSERVE_OUT_DIR, WEBSERVE_MINIFY, WEBSERVE_EXTERNALS=[react,react-dom], ...
        figment = figment.merge(Env::prefixed("WEBSERVE_"));

        figment = figment.merge(Serialized::defaults(CliOverrides::from_args(args, port)));

        Ok(figment.extract()?)
    }

    /// Configuration taken from the command line alone.
    ///
    /// Used by re-invoked child processes, whose arguments are a complete
    /// serialization of the parent's configuration.
    pub fn from_args_only(args: &BuildArgs) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(ProjectConfig::default()))
            .merge(Serialized::defaults(CliOverrides::from_args(args, None)));

        Ok(figment.extract()?)
    }
}
