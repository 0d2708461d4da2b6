use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available webserve subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bundle the entry point and write the output directory
    ///
    /// Composes the HTML template with the bundle, styles and captured
    /// environment, then writes index.html (plus bundle.js and styles.css
    /// unless --inline is given).
    Build(BuildCommandArgs),

    /// Serve the output directory
    ///
    /// With ENVIRONMENT=DEVELOPMENT this also watches the source tree,
    /// rebuilds on change and reloads every connected browser.
    Serve(ServeArgs),

    /// Rebuild loop used by `serve` in development mode
    #[command(hide = true)]
    Watch(WatchArgs),
}

/// Build options shared by every command.
///
/// Every field is optional so that only flags given explicitly override the
/// config file and `WEBSERVE_*` environment variables.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArgs {
    /// Entry file, relative to the source directory [default: main.tsx]
    #[arg(long, value_name = "FILE")]
    pub entry: Option<String>,

    /// Environment variable to embed in the page as window.__env__
    ///
    /// Repeatable. [default: ENVIRONMENT]
    #[arg(long = "env", value_name = "NAME")]
    pub envs: Vec<String>,

    /// Minify the bundle and the captured CSS
    #[arg(long)]
    pub minify: bool,

    /// Modules mapped to window globals instead of being bundled
    ///
    /// Examples:
    ///   --externals react,react-dom
    #[arg(long, value_delimiter = ',', value_name = "MODULES")]
    pub externals: Vec<String>,

    /// Embed script, styles and inlinable assets in index.html
    #[arg(long)]
    pub inline: bool,

    /// Optional bundler plugins to activate, by name
    ///
    /// Known plugins: remote-imports
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub plugins: Vec<String>,

    /// Source directory [default: src]
    #[arg(long, value_name = "DIR")]
    pub src: Option<PathBuf>,

    /// Public directory holding the HTML template and assets [default: public]
    #[arg(long, value_name = "DIR")]
    pub public: Option<PathBuf>,

    /// Output directory [default: build]
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// HTML template file name inside the public directory [default: index.html]
    #[arg(long, value_name = "FILE")]
    pub template: Option<String>,

    /// Working directory for resolving every other path
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildCommandArgs {
    #[command(flatten)]
    pub options: BuildArgs,

    /// Pre-captured environment mapping, as JSON
    ///
    /// Set when a parent process re-invokes `build`. The configuration then
    /// comes from the arguments alone.
    #[arg(long, hide = true, value_name = "JSON")]
    pub envs_json: Option<String>,

    /// Endpoint to notify after a successful development build
    #[arg(long, hide = true, value_name = "URL")]
    pub signal_url: Option<String>,
}

/// Arguments for the serve command
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    #[command(flatten)]
    pub options: BuildArgs,

    /// Port to listen on [default: 8080]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Don't open a browser window in development mode
    #[arg(long)]
    pub no_open: bool,
}

/// Arguments for the hidden watch command
#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    #[command(flatten)]
    pub options: BuildArgs,

    /// Environment mapping captured by `serve`
    #[arg(long, hide = true, value_name = "JSON")]
    pub envs_json: Option<String>,

    /// Signal endpoint of the serving process
    #[arg(long, hide = true, value_name = "URL")]
    pub signal_url: Option<String>,
}
