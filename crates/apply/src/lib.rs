//! Orka apply: manifest loading and server-side dry-run producing preview sources.

#![forbid(unsafe_code)]

use anyhow::{anyhow, Context, Result};
use kube::{api::{Api, Patch, PatchParams}, core::{DynamicObject, GroupVersionKind}, discovery::{Discovery, Scope}, Client};
use metrics::{counter, histogram};
use orka_core::{PreviewLimits, Tree};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

fn max_yaml_bytes() -> usize {
    std::env::var("ORKA_MAX_YAML_BYTES")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1_000_000) // 1 MiB default
}

fn max_yaml_nodes() -> usize {
    PreviewLimits::from_env().max_nodes
}

fn field_manager() -> String {
    std::env::var("ORKA_FIELD_MANAGER")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "orka".to_string())
}

fn node_budget_exceeded(v: &Tree, max: usize) -> bool {
    // Running counter; bail once one node past the budget has been seen
    fn walk(v: &Tree, cur: &mut usize, max: usize) {
        if *cur > max { return; }
        *cur += 1;
        match v {
            Tree::Object(map) => {
                for vv in map.values() {
                    if *cur > max { break; }
                    walk(vv, cur, max);
                }
            }
            Tree::Array(arr) => {
                for vv in arr.iter() {
                    if *cur > max { break; }
                    walk(vv, cur, max);
                }
            }
            _ => {}
        }
    }
    let mut count = 0usize;
    walk(v, &mut count, max);
    count > max
}

/// Where a manifest would land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

impl Target {
    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind { group: self.group.clone(), version: self.version.clone(), kind: self.kind.clone() }
    }

    /// Human title such as `Deployment default/web`.
    pub fn title(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{} {}/{}", self.kind, ns, self.name),
            None => format!("{} {}", self.kind, self.name),
        }
    }
}

/// Object returned by the server for a dry-run apply.
#[derive(Debug, Clone)]
pub struct DryRunResult {
    pub target: Target,
    pub object: Tree,
}

/// Parse a YAML (or JSON) manifest into a tree, enforcing size and complexity limits.
pub fn load_document(text: &str) -> Result<Tree> {
    if text.len() > max_yaml_bytes() {
        return Err(anyhow!("YAML payload too large (>{} bytes)", max_yaml_bytes()));
    }
    let val: serde_yaml::Value = serde_yaml::from_str(text).context("parsing YAML")?;
    let tree = serde_json::to_value(val).context("converting YAML to JSON")?;
    if node_budget_exceeded(&tree, max_yaml_nodes()) {
        return Err(anyhow!("YAML document too complex (>{} nodes)", max_yaml_nodes()));
    }
    Ok(tree)
}

pub fn parse_target(doc: &Tree, ns_override: Option<&str>) -> Result<Target> {
    let api_version_s = doc.get("apiVersion").and_then(|v| v.as_str()).ok_or_else(|| anyhow!("YAML missing apiVersion"))?;
    let kind = doc.get("kind").and_then(|v| v.as_str()).ok_or_else(|| anyhow!("YAML missing kind"))?.to_string();
    let (group, version) = match api_version_s.split_once('/') {
        Some((g, v)) => (g.to_string(), v.to_string()),
        None => (String::new(), api_version_s.to_string()),
    };
    let name = doc.get("metadata").and_then(|m| m.get("name")).and_then(|v| v.as_str()).ok_or_else(|| anyhow!("YAML missing metadata.name"))?.to_string();
    let namespace = ns_override
        .map(|s| s.to_string())
        .or_else(|| doc.get("metadata").and_then(|m| m.get("namespace")).and_then(|v| v.as_str()).map(|s| s.to_string()));
    Ok(Target { group, version, kind, name, namespace })
}

async fn find_api_resource(client: Client, gvk: &GroupVersionKind) -> Result<(kube::core::ApiResource, bool)> {
    let discovery = Discovery::new(client).run().await?;
    for group in discovery.groups() {
        for (ar, caps) in group.recommended_resources() {
            if ar.group == gvk.group && ar.version == gvk.version && ar.kind == gvk.kind {
                let namespaced = matches!(caps.scope, Scope::Namespaced);
                return Ok((ar.clone(), namespaced));
            }
        }
    }
    Err(anyhow!("GVK not found: {}/{}/{}", gvk.group, gvk.version, gvk.kind))
}

/// Server-side apply with `dryRun=All`; returns what the object would look like.
///
/// Nothing is persisted and the live object is never read.
pub async fn dry_run(yaml: &str, ns_override: Option<&str>) -> Result<DryRunResult> {
    let t0 = std::time::Instant::now();
    counter!("dry_run_attempts", 1u64);
    let doc = load_document(yaml)?;
    let target = parse_target(&doc, ns_override)?;
    debug!(kind = %target.kind, name = %target.name, ns = ?target.namespace, "dry-run target");

    let client = Client::try_default().await.context("building kube client")?;
    let (ar, namespaced) = find_api_resource(client.clone(), &target.gvk()).await?;
    let api: Api<DynamicObject> = if namespaced {
        match target.namespace.as_deref() {
            Some(n) => Api::namespaced_with(client.clone(), n, &ar),
            None => return Err(anyhow!("namespace required for namespaced kind")),
        }
    } else {
        Api::all_with(client.clone(), &ar)
    };

    let pp = PatchParams::apply(&field_manager()).dry_run();
    let obj = match api.patch(&target.name, &pp, &Patch::Apply(&doc)).await {
        Ok(o) => o,
        Err(e) => {
            counter!("dry_run_err", 1u64);
            return Err(anyhow!("dry-run failed: {}", e));
        }
    };
    let object = serde_json::to_value(&obj).context("serializing dry-run result")?;
    histogram!("dry_run_latency_ms", t0.elapsed().as_secs_f64() * 1000.0);
    counter!("dry_run_ok", 1u64);
    info!(target = %target.title(), "dry-run ok");
    Ok(DryRunResult { target, object })
}
