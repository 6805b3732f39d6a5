#![forbid(unsafe_code)]

use std::sync::Arc;

use orka_preview::{
    redact, render, serialize, serialize_tree, ColorScheme, DryRunPreview, PreviewEvent, PreviewLimits,
    PreviewOutcome, Rendered, SerializationError, Untranslated,
};
use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::json;

fn pod_a() -> serde_json::Value {
    json!({ "metadata": { "name": "pod-a", "managedFields": [ { "manager": "kubectl" } ] } })
}

fn deployment() -> serde_json::Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": "web",
            "namespace": "default",
            "labels": { "app": "web" },
            "managedFields": [
                { "manager": "kubectl-client-side-apply", "operation": "Update", "fieldsV1": { "f:spec": {} } }
            ],
            "uid": "6f1c0c1e-0000-0000-0000-000000000001"
        },
        "spec": { "replicas": 2, "template": { "spec": { "containers": [ { "name": "web", "image": "nginx:1.27" } ] } } }
    })
}

fn limits() -> PreviewLimits {
    PreviewLimits::default()
}

fn text(r: Rendered) -> String {
    match r {
        Rendered::Ok(s) => s,
        Rendered::Failed(e) => panic!("unexpected failure: {}", e),
    }
}

#[test]
fn hidden_managed_fields_keep_name() {
    let out = text(render(&pod_a(), true, &limits()));
    assert!(!out.contains("managedFields"), "{}", out);
    assert!(out.contains("name: pod-a"), "{}", out);
}

#[test]
fn shown_managed_fields_in_block_form() {
    let out = text(render(&pod_a(), false, &limits()));
    assert!(out.contains("managedFields:\n"), "{}", out);
    assert!(out.contains("- manager: kubectl"), "{}", out);
    assert!(!out.contains('['), "flow style leaked: {}", out);
}

#[test]
fn empty_object_renders_empty_mapping() {
    for flag in [true, false] {
        let out = text(render(&json!({}), flag, &limits()));
        assert_eq!(out.trim_end(), "{}");
    }
}

#[test]
fn null_renders_null() {
    assert_eq!(text(render(&serde_json::Value::Null, true, &limits())).trim_end(), "null");
}

struct Callback;

impl Serialize for Callback {
    fn serialize<S: Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("functions cannot be encoded"))
    }
}

#[test]
fn unsupported_value_is_an_error_not_a_panic() {
    let err = serialize(&Callback, &limits()).unwrap_err();
    assert!(matches!(err, SerializationError::Unsupported(ref m) if m.contains("functions")), "{:?}", err);
}

fn self_nested(levels: usize) -> serde_json::Value {
    let mut v = json!({ "ref": "self" });
    for _ in 0..levels {
        v = json!({ "parent": v });
    }
    v
}

#[test]
fn runaway_nesting_falls_back_to_placeholder() {
    let item = Arc::new(json!({ "metadata": { "name": "loop" }, "spec": self_nested(500) }));
    let mut dlg = DryRunPreview::new(item, "Dry run").with_limits(limits());
    dlg.open();
    let view = dlg.view(ColorScheme::Light, &Untranslated).expect("open dialog yields a view");
    assert!(view.failed);
    assert!(view.surface.content.starts_with("Unable to render preview:"), "{}", view.surface.content);
}

#[test]
fn rendering_is_idempotent() {
    let obj = deployment();
    for flag in [true, false] {
        let a = serialize_tree(&redact(&obj, flag), &limits()).unwrap();
        let b = serialize_tree(&redact(&obj, flag), &limits()).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn redaction_leaves_everything_else_equal() {
    let obj = deployment();
    let out = redact(&obj, true);
    let meta_in = obj["metadata"].as_object().unwrap();
    let meta_out = out["metadata"].as_object().unwrap();
    assert!(!meta_out.contains_key("managedFields"));
    for (k, v) in meta_in.iter().filter(|(k, _)| k.as_str() != "managedFields") {
        assert_eq!(meta_out.get(k), Some(v), "metadata.{}", k);
    }
    assert_eq!(meta_out.len(), meta_in.len() - 1);
    assert_eq!(out["spec"], obj["spec"]);
    assert_eq!(out["kind"], obj["kind"]);
}

#[test]
fn redaction_does_not_touch_source() {
    let obj = deployment();
    let before = obj.clone();
    let _ = redact(&obj, true);
    assert_eq!(obj, before);
    assert!(obj["metadata"].get("managedFields").is_some());
}

#[test]
fn absent_subtree_is_pass_through() {
    for obj in [
        json!({ "kind": "Namespace" }),
        json!({ "metadata": { "name": "plain" } }),
    ] {
        assert_eq!(redact(&obj, true), redact(&obj, false));
        assert_eq!(redact(&obj, true), obj);
    }
}

#[test]
fn toggling_twice_restores_text() {
    let mut dlg = DryRunPreview::new(Arc::new(deployment()), "Dry run").with_limits(limits());
    dlg.open();
    let original = dlg.view(ColorScheme::Dark, &Untranslated).unwrap().surface.content.into_owned();
    assert!(!original.contains("managedFields"));

    assert_eq!(
        dlg.handle(PreviewEvent::ToggleManagedFields),
        PreviewOutcome::Toggled { hide_managed: false }
    );
    let shown = dlg.view(ColorScheme::Dark, &Untranslated).unwrap().surface.content.into_owned();
    assert_ne!(shown, original);
    assert!(shown.contains("managedFields"));

    dlg.handle(PreviewEvent::ToggleManagedFields);
    let back = dlg.view(ColorScheme::Dark, &Untranslated).unwrap().surface.content.into_owned();
    assert_eq!(back, original);
}

#[test]
fn closed_dialog_does_no_work() {
    let mut dlg = DryRunPreview::new(Arc::new(deployment()), "Dry run").with_limits(limits());
    assert!(dlg.view(ColorScheme::Light, &Untranslated).is_none());
    assert_eq!(dlg.handle(PreviewEvent::ToggleManagedFields), PreviewOutcome::Ignored);
    assert_eq!(dlg.recomputations(), 0);

    dlg.open();
    let _ = dlg.view(ColorScheme::Light, &Untranslated);
    let _ = dlg.view(ColorScheme::Light, &Untranslated);
    assert_eq!(dlg.recomputations(), 1);

    assert_eq!(dlg.handle(PreviewEvent::RequestClose), PreviewOutcome::Closed);
    assert!(!dlg.is_open());
    assert!(dlg.view(ColorScheme::Light, &Untranslated).is_none());
    assert_eq!(dlg.recomputations(), 1);
}

#[test]
fn view_props_match_collaborator_contract() {
    let mut dlg = DryRunPreview::new(Arc::new(pod_a()), "Preview pod-a").with_limits(limits());
    dlg.open();
    let view = dlg.view(ColorScheme::Dark, &Untranslated).unwrap();
    assert!(view.dialog.is_open);
    assert!(view.dialog.full_screen_capable);
    assert_eq!(view.dialog.title, "Preview pod-a");
    assert!(view.toggle.checked);
    assert_eq!(view.toggle.label, "Hide managed fields");
    assert_eq!(view.surface.syntax_mode, "yaml");
    assert!(view.surface.read_only);
    assert_eq!(view.surface.color_scheme, ColorScheme::Dark);
    assert_eq!(view.surface.editor_theme, "vs-dark");
    assert_eq!(view.close_label, "Close");
    assert!(!view.failed);
}

#[test]
fn toggle_survives_reopen_and_item_swap_rerenders() {
    let mut dlg = DryRunPreview::new(Arc::new(pod_a()), "Dry run").with_limits(limits());
    dlg.open();
    dlg.handle(PreviewEvent::ToggleManagedFields);
    dlg.handle(PreviewEvent::RequestClose);
    dlg.open();
    assert!(!dlg.hide_managed());

    let _ = dlg.view(ColorScheme::Light, &Untranslated);
    let n = dlg.recomputations();
    dlg.set_item(Arc::new(json!({ "metadata": { "name": "pod-b" } })));
    let content = dlg.view(ColorScheme::Light, &Untranslated).unwrap().surface.content.into_owned();
    assert!(content.contains("name: pod-b"));
    assert_eq!(dlg.recomputations(), n + 1);
}
