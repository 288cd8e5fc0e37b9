//! # Table Conversion
//!
//! Reshapes upstream list responses into the Kubernetes `Table`
//! meta-resource (`meta.k8s.io/v1`) that kubectl renders as columns. The
//! column schema for each resource kind is fixed at compile time; rows are
//! generated one per upstream list item, preserving upstream order.
//!
//! Converter dispatch is an exhaustive `match` over [`ResourceKind`], so a
//! new routable kind without a converter fails to compile instead of
//! drifting silently.

use crate::core::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One column of a `Table` response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub format: String,
    pub description: String,
    pub priority: i32,
}

/// One row of a `Table` response; cells are ordered to match the column
/// definitions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableRow {
    pub cells: Vec<Value>,
}

/// The Kubernetes `Table` meta-resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub kind: String,
    pub api_version: String,
    pub column_definitions: Vec<ColumnDefinition>,
    pub rows: Vec<TableRow>,
}

/// The five list kinds the bridge can render as tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Services,
    Configurations,
    Routes,
    Revisions,
    DomainMappings,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Services,
        ResourceKind::Configurations,
        ResourceKind::Routes,
        ResourceKind::Revisions,
        ResourceKind::DomainMappings,
    ];

    /// The list path segment for this kind
    pub fn list_name(&self) -> &'static str {
        match self {
            ResourceKind::Services => "services",
            ResourceKind::Configurations => "configurations",
            ResourceKind::Routes => "routes",
            ResourceKind::Revisions => "revisions",
            ResourceKind::DomainMappings => "domainmappings",
        }
    }

    /// Select the kind whose list suffix terminates the given upstream path
    ///
    /// Returns `None` for paths that do not end in a known list segment
    /// (e.g. a named-resource get).
    pub fn from_list_path(path: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| path.ends_with(&format!("/{}", kind.list_name())))
    }

    /// Decode an upstream list body and render it as a `Table`
    pub fn convert(&self, body: &[u8]) -> BridgeResult<Table> {
        let list: ListEnvelope = serde_json::from_slice(body).map_err(|e| {
            BridgeError::translation(format!("invalid {} list payload: {e}", self.list_name()))
        })?;

        Ok(Table {
            kind: "Table".to_string(),
            api_version: "meta.k8s.io/v1".to_string(),
            column_definitions: self.columns(),
            rows: list
                .items
                .iter()
                .map(|item| TableRow {
                    cells: self.cells(item),
                })
                .collect(),
        })
    }

    /// The fixed column schema for this kind
    pub fn columns(&self) -> Vec<ColumnDefinition> {
        match self {
            ResourceKind::Services => vec![
                name_column(),
                jsonpath_column("URL", ".status.url"),
                jsonpath_column("LatestCreated", ".status.latestCreatedRevisionName"),
                jsonpath_column("LatestReady", ".status.latestReadyRevisionName"),
                jsonpath_column("Ready", ".status.conditions[?(@.type=='Ready')].status"),
                jsonpath_column("Reason", ".status.conditions[?(@.type=='Ready')].reason"),
            ],
            ResourceKind::Configurations => vec![
                name_column(),
                jsonpath_column("LatestCreated", ".status.latestCreatedRevisionName"),
                jsonpath_column("LatestReady", ".status.latestReadyRevisionName"),
                jsonpath_column("Ready", ".status.conditions[?(@.type=='Ready')].status"),
                jsonpath_column("Reason", ".status.conditions[?(@.type=='Ready')].reason"),
            ],
            ResourceKind::Routes => vec![
                name_column(),
                jsonpath_column("URL", ".status.url"),
                jsonpath_column("Ready", ".status.conditions[?(@.type=='Ready')].status"),
                jsonpath_column("Reason", ".status.conditions[?(@.type=='Ready')].reason"),
            ],
            ResourceKind::Revisions => vec![
                name_column(),
                jsonpath_column(
                    "Config Name",
                    ".metadata.labels['serving.knative.dev/configuration']",
                ),
                jsonpath_column("Service", ".metadata.labels['serving.knative.dev/service']"),
                jsonpath_column(
                    "Generation",
                    ".metadata.labels['serving.knative.dev/configurationGeneration']",
                ),
                jsonpath_column("Ready", ".status.conditions[?(@.type=='Ready')].status"),
                jsonpath_column("Reason", ".status.conditions[?(@.type=='Ready')].reason"),
            ],
            ResourceKind::DomainMappings => vec![
                name_column(),
                jsonpath_column("Route", ".spec.routeName"),
                jsonpath_column("Ready", ".status.conditions[?(@.type=='Ready')].status"),
                jsonpath_column("Reason", ".status.conditions[?(@.type=='Ready')].reason"),
                jsonpath_column("Message", ".status.conditions[?(@.type=='Ready')].message"),
            ],
        }
    }

    /// Render the cells for one upstream item, ordered to match
    /// [`ResourceKind::columns`]
    fn cells(&self, item: &ListItem) -> Vec<Value> {
        let (ready, reason, message) = ready_triple(&item.status.conditions);
        let name = string_cell(&item.metadata.name);

        match self {
            ResourceKind::Services => vec![
                name,
                string_cell(&item.status.url),
                string_cell(&item.status.latest_created_revision_name),
                string_cell(&item.status.latest_ready_revision_name),
                ready,
                reason,
            ],
            ResourceKind::Configurations => vec![
                name,
                string_cell(&item.status.latest_created_revision_name),
                string_cell(&item.status.latest_ready_revision_name),
                ready,
                reason,
            ],
            ResourceKind::Routes => vec![name, string_cell(&item.status.url), ready, reason],
            ResourceKind::Revisions => vec![
                name,
                label_cell(item, "serving.knative.dev/configuration"),
                label_cell(item, "serving.knative.dev/service"),
                label_cell(item, "serving.knative.dev/configurationGeneration"),
                ready,
                reason,
            ],
            ResourceKind::DomainMappings => vec![
                name,
                string_cell(&item.spec.route_name),
                ready,
                reason,
                message,
            ],
        }
    }
}

/// Upstream list envelope; only the fields the converters read are decoded
#[derive(Debug, Default, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    items: Vec<ListItem>,
}

#[derive(Debug, Default, Deserialize)]
struct ListItem {
    #[serde(default)]
    metadata: ObjectMeta,
    #[serde(default)]
    spec: ItemSpec,
    #[serde(default)]
    status: ItemStatus,
}

#[derive(Debug, Default, Deserialize)]
struct ObjectMeta {
    #[serde(default)]
    name: String,
    #[serde(default)]
    labels: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemSpec {
    #[serde(default)]
    route_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemStatus {
    #[serde(default)]
    url: String,
    #[serde(default)]
    latest_created_revision_name: String,
    #[serde(default)]
    latest_ready_revision_name: String,
    #[serde(default)]
    conditions: Vec<Condition>,
}

/// Upstream status condition
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Condition {
    #[serde(rename = "type", default)]
    condition_type: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    message: String,
}

/// Extract the Ready condition's (status, reason, message) triple
///
/// When no `Ready` condition exists all three cells are JSON null, not
/// omitted.
fn ready_triple(conditions: &[Condition]) -> (Value, Value, Value) {
    match conditions.iter().find(|c| c.condition_type == "Ready") {
        Some(c) => (
            string_cell(&c.status),
            string_cell(&c.reason),
            string_cell(&c.message),
        ),
        None => (Value::Null, Value::Null, Value::Null),
    }
}

fn string_cell(value: &str) -> Value {
    Value::String(value.to_string())
}

fn label_cell(item: &ListItem, key: &str) -> Value {
    Value::String(item.metadata.labels.get(key).cloned().unwrap_or_default())
}

const NAME_DESCRIPTION: &str = "Name must be unique within a namespace. Is required when creating resources, although some resources may allow a client to request the generation of an appropriate name automatically. Name is primarily intended for creation idempotence and configuration definition. Cannot be updated. More info: http://kubernetes.io/docs/user-guide/identifiers#names";

fn name_column() -> ColumnDefinition {
    ColumnDefinition {
        name: "Name".to_string(),
        column_type: "string".to_string(),
        format: String::new(),
        description: NAME_DESCRIPTION.to_string(),
        priority: 0,
    }
}

fn jsonpath_column(name: &str, path: &str) -> ColumnDefinition {
    ColumnDefinition {
        name: name.to_string(),
        column_type: "string".to_string(),
        format: String::new(),
        description: format!("Custom resource definition column (in JSONPath format): {path}"),
        priority: 0,
    }
}
