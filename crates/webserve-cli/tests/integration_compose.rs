//! Integration tests for document composition and asset inlining.

use std::fs;

use indexmap::IndexMap;
use tempfile::TempDir;
use webserve_cli::document::{Marker, SlotValues, compose, inline_assets};

fn production_slots(inline: bool) -> SlotValues {
    SlotValues {
        envs: IndexMap::from([("ENVIRONMENT".to_string(), "PRODUCTION".to_string())]),
        script: "console.log(1)".to_string(),
        styles: "body{color:red}".to_string(),
        inline,
        development: false,
    }
}

#[test]
fn test_inline_document_in_marker_order() {
    let template = "<!-- SCRIPT_ENVS --><!-- SCRIPT_BUNDLE --><!-- STYLES_FILE -->";
    let html = compose(template, &production_slots(true));

    let envs = html
        .find(r#"window.__env__ = {"ENVIRONMENT":"PRODUCTION"}"#)
        .expect("env script");
    let script = html.find("console.log(1)").expect("inline bundle");
    let style = html.find("<style>body{color:red}</style>").expect("inline style");

    assert!(envs < script);
    assert!(script < style);
}

#[test]
fn test_compose_is_deterministic() {
    let template = fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/index.html"
    ))
    .unwrap();

    for inline in [false, true] {
        let slots = production_slots(inline);
        assert_eq!(compose(&template, &slots), compose(&template, &slots));
    }
}

#[test]
fn test_missing_marker_leaves_others_untouched() {
    let slots = production_slots(true);
    let full: String = Marker::ALL.iter().map(|m| m.as_str()).collect();

    for removed in Marker::ALL {
        let template = full.replace(removed.as_str(), "");
        let html = compose(&template, &slots);

        for marker in Marker::ALL {
            assert!(!html.contains(marker.as_str()));
        }
        assert_eq!(
            html.contains("window.__env__"),
            removed != Marker::ScriptEnvs,
            "removed {:?}",
            removed
        );
        assert_eq!(
            html.contains("console.log(1)"),
            removed != Marker::ScriptBundle,
            "removed {:?}",
            removed
        );
        assert_eq!(
            html.contains("<style>"),
            removed != Marker::StylesFile,
            "removed {:?}",
            removed
        );
    }
}

#[test]
fn test_template_without_markers_is_unchanged() {
    let template = "<html><body><h1>static</h1></body></html>";
    assert_eq!(compose(template, &production_slots(true)), template);
    assert_eq!(compose(template, &production_slots(false)), template);
}

#[test]
fn test_inlined_asset_leaves_no_reference() {
    let public = TempDir::new().unwrap();
    let assets = public.path().join("assets");
    fs::create_dir_all(&assets).unwrap();
    fs::write(assets.join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
    fs::write(assets.join("data.json"), r#"{"items":[1,2]}"#).unwrap();

    let mut slots = production_slots(true);
    slots.script = r#"img.src = "assets/logo.png"; fetch("assets/data.json");"#.to_string();
    let template =
        r#"<img src="assets/logo.png"><!-- SCRIPT_BUNDLE --><link rel="icon" href="assets/logo.png">"#;

    let composed = compose(template, &slots);
    let outcome = inline_assets(&composed, &assets, public.path());

    assert!(outcome.errors.is_empty());
    assert!(!outcome.document.contains("assets/logo.png"));
    assert!(!outcome.document.contains("assets/data.json"));
    assert_eq!(outcome.document.matches("data:image/png;base64,").count(), 3);
    assert!(outcome.document.contains(r#"fetch({"items":[1,2]});"#));
}
