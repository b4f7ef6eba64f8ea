//! Configuration for linking and tracing
//!
//! The configuration is a plain value handed to [`Linker`](crate::Linker) and
//! [`Tracer`](crate::Tracer). Nothing in the engine reads global state.
//!
//! ```json
//! {
//!   "coverage_rules": [
//!     { "covered": "req", "covering": ["dsn", "uman"] },
//!     { "covered": "dsn", "covering": ["impl", "utest"] }
//!   ],
//!   "filter": { "artifact_types": ["req", "dsn", "impl"] }
//! }
//! ```

use crate::item::SpecificationItem;
use crate::item_id::ArtifactType;
use eyre::{Result, WrapErr};
use facet::Facet;
use std::collections::BTreeSet;
use std::path::Path;

/// Root configuration
#[derive(Debug, Clone, Default, Facet)]
pub struct TraceConfig {
    /// Which artifact types may cover which. Covered types without a rule
    /// accept coverage from any type they need.
    #[facet(default)]
    pub coverage_rules: Vec<CoverageRule>,

    /// Restricts which items take part in a trace
    #[facet(default)]
    pub filter: FilterSettings,
}

/// Artifact types allowed to cover `covered`
#[derive(Debug, Clone, Facet)]
pub struct CoverageRule {
    pub covered: String,
    #[facet(default)]
    pub covering: Vec<String>,
}

/// Item selection applied before linking
#[derive(Debug, Clone, Default, Facet)]
pub struct FilterSettings {
    /// Artifact types to keep. Empty keeps every type. Needs and references
    /// on other types are dropped from the kept items.
    #[facet(default)]
    pub artifact_types: Vec<String>,

    /// Tags to keep. Empty keeps every item.
    #[facet(default)]
    pub tags: Vec<String>,

    /// With a tag filter in place, also keep items that have no tags at all.
    #[facet(default)]
    pub include_untagged: bool,
}

impl TraceConfig {
    /// Parse a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        facet_json::from_str(json).wrap_err("Failed to parse trace configuration JSON")
    }

    /// Load a configuration from a local file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).wrap_err_with(|| {
            format!("Failed to read trace configuration from {}", path.display())
        })?;
        Self::from_json(&content).wrap_err_with(|| {
            format!("Failed to parse trace configuration from {}", path.display())
        })
    }

    pub fn with_coverage_rule(
        mut self,
        covered: impl Into<String>,
        covering: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.coverage_rules.push(CoverageRule {
            covered: covered.into(),
            covering: covering.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_filter(mut self, filter: FilterSettings) -> Self {
        self.filter = filter;
        self
    }

    /// Whether items of type `covering` may cover items of type `covered`.
    ///
    /// Rules for the same covered type add up.
    pub fn allows_coverage(&self, covered: &ArtifactType, covering: &ArtifactType) -> bool {
        let mut rules = self
            .coverage_rules
            .iter()
            .filter(|rule| rule.covered == covered.as_str())
            .peekable();
        if rules.peek().is_none() {
            return true;
        }
        rules.any(|rule| rule.covering.iter().any(|t| t == covering.as_str()))
    }
}

impl FilterSettings {
    pub fn is_any_filter_set(&self) -> bool {
        !self.artifact_types.is_empty() || !self.tags.is_empty()
    }

    fn keeps_artifact_type(&self, artifact_type: &ArtifactType) -> bool {
        self.artifact_types.is_empty()
            || self
                .artifact_types
                .iter()
                .any(|t| t == artifact_type.as_str())
    }

    fn keeps_tags(&self, tags: &[String]) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        if tags.is_empty() {
            return self.include_untagged;
        }
        tags.iter().any(|tag| self.tags.contains(tag))
    }

    /// Whether `item` takes part in the trace.
    pub fn keeps(&self, item: &SpecificationItem) -> bool {
        self.keeps_artifact_type(item.artifact_type()) && self.keeps_tags(item.tags())
    }

    /// Drop filtered items and narrow the needs and references of the rest.
    ///
    /// References to items removed by the tag filter are dropped as well,
    /// unless another revision of the same item is kept. References that
    /// did not resolve before filtering are left alone.
    pub fn apply(&self, items: Vec<SpecificationItem>) -> Vec<SpecificationItem> {
        if !self.is_any_filter_set() {
            return items;
        }
        let kept_types: Option<BTreeSet<ArtifactType>> = (!self.artifact_types.is_empty())
            .then(|| self.artifact_types.iter().map(|t| ArtifactType::new(t.as_str())).collect());

        let (kept, removed): (Vec<_>, Vec<_>) =
            items.into_iter().partition(|item| self.keeps(item));
        let kept_keys: BTreeSet<(ArtifactType, String)> = kept.iter().map(item_key).collect();
        let removed_keys: BTreeSet<(ArtifactType, String)> = removed
            .iter()
            .map(item_key)
            .filter(|key| !kept_keys.contains(key))
            .collect();

        kept.into_iter()
            .map(|item| match &kept_types {
                Some(types) => item.restrict_to_artifact_types(types),
                None => item,
            })
            .map(|item| {
                if removed_keys.is_empty() {
                    item
                } else {
                    item.without_references_to(&removed_keys)
                }
            })
            .collect()
    }
}

fn item_key(item: &SpecificationItem) -> (ArtifactType, String) {
    (item.artifact_type().clone(), item.name().to_string())
}
