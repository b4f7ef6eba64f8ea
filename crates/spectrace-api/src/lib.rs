//! Report types for spectrace
//!
//! This crate contains only the serializable view of a [`Trace`], for tools
//! that write trace results as JSON or hand them to a dashboard. All IDs are
//! rendered in their `type~name~revision` form.

use eyre::{Result, WrapErr};
use facet::Facet;
use spectrace_core::{ArtifactType, ItemStatus, LinkStatus, Trace, TracedItem};

/// Summary plus every item of one trace run
#[derive(Debug, Clone, Facet)]
#[facet(rename_all = "camelCase")]
pub struct ApiTrace {
    pub total_items: usize,
    pub defect_items: usize,
    pub uncovered_items: usize,
    pub coverage_percent: f64,
    pub ok: bool,
    /// IDs carried by more than one item
    pub duplicate_ids: Vec<String>,
    pub items: Vec<ApiTracedItem>,
}

#[derive(Debug, Clone, Facet)]
#[facet(rename_all = "camelCase")]
pub struct ApiTracedItem {
    pub id: String,
    pub status: ItemStatus,
    #[facet(default)]
    pub title: Option<String>,
    /// Source file of the item, if the importer knew it
    #[facet(default)]
    pub file: Option<String>,
    #[facet(default)]
    pub line: Option<usize>,
    pub needs: Vec<String>,
    pub covered: Vec<String>,
    pub uncovered: Vec<String>,
    pub covered_shallow: bool,
    pub covered_deeply: bool,
    pub defect: bool,
    pub links: Vec<ApiLink>,
    /// References that did not resolve to any item
    pub orphaned: Vec<String>,
    /// Number of links per status, only statuses that occur
    pub link_counts: Vec<ApiLinkCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ApiLink {
    pub status: LinkStatus,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ApiLinkCount {
    pub status: LinkStatus,
    pub count: usize,
}

impl ApiTrace {
    pub fn to_json(&self) -> Result<String> {
        facet_json::to_string(self).wrap_err("Failed to serialize trace")
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        facet_json::to_string_pretty(self).wrap_err("Failed to serialize trace")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        facet_json::from_str(json).wrap_err("Failed to parse trace JSON")
    }
}

impl From<&Trace> for ApiTrace {
    fn from(trace: &Trace) -> Self {
        Self {
            total_items: trace.count(),
            defect_items: trace.defect_count(),
            uncovered_items: trace.uncovered_count(),
            coverage_percent: trace.coverage_percent(),
            ok: trace.is_ok(),
            duplicate_ids: trace
                .duplicate_ids()
                .into_iter()
                .map(ToString::to_string)
                .collect(),
            items: trace.items().map(ApiTracedItem::from).collect(),
        }
    }
}

impl From<TracedItem<'_>> for ApiTracedItem {
    fn from(traced: TracedItem<'_>) -> Self {
        let item = traced.item();
        let node = traced.node();
        Self {
            id: item.id().to_string(),
            status: item.status(),
            title: item.title().map(str::to_string),
            file: item.location().map(|l| l.path.clone()),
            line: item.location().map(|l| l.line),
            needs: type_names(item.needs()),
            covered: type_names(traced.covered_artifact_types()),
            uncovered: type_names(&traced.uncovered_artifact_types()),
            covered_shallow: traced.is_covered_shallow(),
            covered_deeply: traced.is_covered_deeply(),
            defect: traced.is_defect(),
            links: traced
                .links()
                .map(|(status, target)| ApiLink {
                    status,
                    target: target.id().to_string(),
                })
                .collect(),
            orphaned: traced
                .orphaned_references()
                .iter()
                .map(ToString::to_string)
                .collect(),
            link_counts: LinkStatus::ALL
                .into_iter()
                .map(|status| ApiLinkCount {
                    status,
                    count: node.link_count(status),
                })
                .filter(|c| c.count > 0)
                .collect(),
        }
    }
}

fn type_names<'a>(types: impl IntoIterator<Item = &'a ArtifactType>) -> Vec<String> {
    types.into_iter().map(|t| t.as_str().to_string()).collect()
}
