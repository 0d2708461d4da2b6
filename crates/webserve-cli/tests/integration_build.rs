//! Integration tests for the build orchestrator.
//!
//! A fake bundler stands in for Rolldown so the tests exercise composition,
//! inlining and the output layout on real directories.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;
use tempfile::TempDir;
use webserve_bundler::{BundleOutput, BundleRequest, Bundler};
use webserve_cli::build::{BUNDLE_FILE, INDEX_FILE, STYLES_FILE, run_build};
use webserve_cli::config::BuildConfig;
use webserve_cli::{BuildError, CliError, ConfigError};

const TEMPLATE: &str = "<head><!-- STYLES_FILE --></head>\
<body><img src=\"assets/logo.png\"><!-- SCRIPT_ENVS --><!-- SCRIPT_BUNDLE --><!-- SCRIPT_FOOTER --></body>";

struct FakeBundler {
    output: Option<BundleOutput>,
    calls: AtomicUsize,
}

impl FakeBundler {
    fn ok(script: &str, styles: &str) -> Self {
        Self {
            output: Some(BundleOutput {
                script: script.to_string(),
                styles: styles.to_string(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            output: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Bundler for FakeBundler {
    async fn bundle(&self, _request: &BundleRequest) -> webserve_bundler::Result<BundleOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.output
            .clone()
            .ok_or_else(|| webserve_bundler::Error::Bundler("Unexpected token".to_string()))
    }
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("public/assets")).unwrap();
    fs::write(root.join("src/main.tsx"), "console.log('app')").unwrap();
    fs::write(root.join("public/index.html"), TEMPLATE).unwrap();
    fs::write(root.join("public/assets/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
    fs::write(root.join("public/robots.txt"), "User-agent: *").unwrap();
    dir
}

fn config(root: &Path, inline: bool) -> BuildConfig {
    BuildConfig {
        cwd: root.to_path_buf(),
        entry: "main.tsx".to_string(),
        envs: IndexMap::from([("ENVIRONMENT".to_string(), "PRODUCTION".to_string())]),
        minify: false,
        externals: Vec::new(),
        inline,
        plugins: Vec::new(),
        src_dir: root.join("src"),
        public_dir: root.join("public"),
        out_dir: root.join("build"),
        template: "index.html".to_string(),
        development: false,
        signal_url: None,
    }
}

#[tokio::test]
async fn test_link_mode_writes_three_files() {
    let dir = project();
    let out = dir.path().join("build");
    let bundler = FakeBundler::ok("console.log(1)", "body{color:red}");

    let report = run_build(&config(dir.path(), false), &bundler).await.unwrap();

    assert_eq!(report.written.len(), 3);
    assert_eq!(fs::read_to_string(out.join(BUNDLE_FILE)).unwrap(), "console.log(1)");
    assert_eq!(fs::read_to_string(out.join(STYLES_FILE)).unwrap(), "body{color:red}");

    let html = fs::read_to_string(out.join(INDEX_FILE)).unwrap();
    assert!(html.contains(r#"src="/bundle.js""#));
    assert!(html.contains(r#"href="/styles.css""#));
    assert!(html.contains(r#"window.__env__ = {"ENVIRONMENT":"PRODUCTION"}"#));
    assert!(html.contains(r#"<img src="assets/logo.png">"#));
    assert!(!html.contains("WebSocket"));

    // public tree copied, template excluded from the copy
    assert!(out.join("assets/logo.png").is_file());
    assert!(out.join("robots.txt").is_file());
}

#[tokio::test]
async fn test_inline_mode_writes_one_document() {
    let dir = project();
    let out = dir.path().join("build");
    let bundler = FakeBundler::ok("console.log(1)", "body{color:red}");

    let report = run_build(&config(dir.path(), true), &bundler).await.unwrap();

    assert_eq!(report.written.len(), 1);
    assert!(!out.join(BUNDLE_FILE).exists());
    assert!(!out.join(STYLES_FILE).exists());
    assert_eq!(report.output.assets, vec!["assets/logo.png".to_string()]);

    let html = fs::read_to_string(out.join(INDEX_FILE)).unwrap();
    assert!(html.contains("console.log(1)"));
    assert!(html.contains("<style>body{color:red}</style>"));
    assert!(html.contains("data:image/png;base64,"));
    assert!(!html.contains("assets/logo.png"));
}

#[tokio::test]
async fn test_empty_styles_skip_stylesheet() {
    let dir = project();
    let out = dir.path().join("build");
    let bundler = FakeBundler::ok("console.log(1)", "");

    run_build(&config(dir.path(), false), &bundler).await.unwrap();

    assert!(!out.join(STYLES_FILE).exists());
    let html = fs::read_to_string(out.join(INDEX_FILE)).unwrap();
    assert!(!html.contains("styles.css"));
}

#[tokio::test]
async fn test_failed_bundle_keeps_previous_output() {
    let dir = project();
    let out = dir.path().join("build");
    let cfg = config(dir.path(), false);

    run_build(&cfg, &FakeBundler::ok("console.log('v1')", ""))
        .await
        .unwrap();
    let before = fs::read_to_string(out.join(INDEX_FILE)).unwrap();

    let err = run_build(&cfg, &FakeBundler::failing()).await.unwrap_err();

    assert!(matches!(err, CliError::Build(BuildError::Bundle(_))));
    assert_eq!(fs::read_to_string(out.join(INDEX_FILE)).unwrap(), before);
    assert_eq!(
        fs::read_to_string(out.join(BUNDLE_FILE)).unwrap(),
        "console.log('v1')"
    );
}

#[tokio::test]
async fn test_missing_template_is_config_error() {
    let dir = project();
    fs::remove_file(dir.path().join("public/index.html")).unwrap();
    let bundler = FakeBundler::ok("", "");

    let err = run_build(&config(dir.path(), false), &bundler)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CliError::Config(ConfigError::TemplateNotFound(_))
    ));
    assert_eq!(bundler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_entry_is_config_error() {
    let dir = project();
    let mut cfg = config(dir.path(), false);
    cfg.entry = "missing.tsx".to_string();
    let bundler = FakeBundler::ok("", "");

    let err = run_build(&cfg, &bundler).await.unwrap_err();

    assert!(matches!(err, CliError::Config(ConfigError::EntryNotFound(_))));
    assert_eq!(bundler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_development_build_injects_reload_client() {
    let dir = project();
    let mut cfg = config(dir.path(), false);
    cfg.development = true;
    cfg.envs
        .insert("ENVIRONMENT".to_string(), "DEVELOPMENT".to_string());
    // nothing listens on port 9; the signal failure must not fail the build
    cfg.signal_url = Some("http://127.0.0.1:9/_bundler".to_string());

    let report = run_build(&cfg, &FakeBundler::ok("console.log(1)", ""))
        .await
        .unwrap();

    assert!(!report.signal_delivered);
    let html = fs::read_to_string(dir.path().join("build").join(INDEX_FILE)).unwrap();
    assert!(html.contains("new WebSocket"));
}
