//! Specification items as handed over by importers

use crate::item_id::{ArtifactType, ItemReference, SpecificationItemId};
use eyre::{Result, bail};
use facet::Facet;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

/// Lifecycle status of an item. Informational only, coverage ignores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Facet)]
#[facet(rename_all = "lowercase")]
#[repr(u8)]
pub enum ItemStatus {
    #[default]
    Approved,
    Proposed,
    Draft,
    Rejected,
}

impl ItemStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(ItemStatus::Approved),
            "proposed" => Some(ItemStatus::Proposed),
            "draft" => Some(ItemStatus::Draft),
            "rejected" => Some(ItemStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Approved => "approved",
            ItemStatus::Proposed => "proposed",
            ItemStatus::Draft => "draft",
            ItemStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an importer found the item
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Location {
    /// Source file (as reported by the importer)
    pub path: String,
    /// Line number (1-indexed)
    pub line: usize,
}

impl Location {
    pub fn new(path: impl Into<String>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

/// One traceable artifact: a requirement, a design element, a test, ...
///
/// Identity fields and declared references never change after [`build`].
/// Two items are equal when their IDs are equal, regardless of the rest.
///
/// [`build`]: SpecificationItemBuilder::build
#[derive(Debug, Clone)]
pub struct SpecificationItem {
    id: SpecificationItemId,
    status: ItemStatus,
    needs: BTreeSet<ArtifactType>,
    covers: Vec<ItemReference>,
    title: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    location: Option<Location>,
}

impl SpecificationItem {
    /// Start building an item with the given identity.
    pub fn builder(id: SpecificationItemId) -> SpecificationItemBuilder {
        SpecificationItemBuilder {
            item: SpecificationItem {
                id,
                status: ItemStatus::default(),
                needs: BTreeSet::new(),
                covers: Vec::new(),
                title: None,
                description: None,
                tags: Vec::new(),
                location: None,
            },
        }
    }

    pub fn id(&self) -> &SpecificationItemId {
        &self.id
    }

    pub fn artifact_type(&self) -> &ArtifactType {
        &self.id.artifact_type
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn revision(&self) -> u32 {
        self.id.revision
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Artifact types that must cover this item
    pub fn needs(&self) -> &BTreeSet<ArtifactType> {
        &self.needs
    }

    pub fn needs_artifact_type(&self, artifact_type: &ArtifactType) -> bool {
        self.needs.contains(artifact_type)
    }

    /// Items this one claims to cover, in declaration order
    pub fn covers(&self) -> &[ItemReference] {
        &self.covers
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Drop needs and references on artifact types outside `keep`.
    pub(crate) fn restrict_to_artifact_types(mut self, keep: &BTreeSet<ArtifactType>) -> Self {
        self.needs.retain(|needed| keep.contains(needed));
        self.covers.retain(|reference| keep.contains(&reference.artifact_type));
        self
    }

    /// Drop references to the `(type, name)` pairs in `removed`.
    pub(crate) fn without_references_to(
        mut self,
        removed: &BTreeSet<(ArtifactType, String)>,
    ) -> Self {
        self.covers.retain(|reference| {
            !removed.contains(&(reference.artifact_type.clone(), reference.name.clone()))
        });
        self
    }
}

impl PartialEq for SpecificationItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SpecificationItem {}

impl Hash for SpecificationItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Builder for [`SpecificationItem`], used by importers.
#[derive(Debug, Clone)]
pub struct SpecificationItemBuilder {
    item: SpecificationItem,
}

impl SpecificationItemBuilder {
    pub fn status(mut self, status: ItemStatus) -> Self {
        self.item.status = status;
        self
    }

    /// Add artifact types this item needs coverage from
    pub fn needs(mut self, types: impl IntoIterator<Item = impl Into<ArtifactType>>) -> Self {
        self.item.needs.extend(types.into_iter().map(Into::into));
        self
    }

    /// Declare that this item covers `reference`
    pub fn covers(mut self, reference: ItemReference) -> Self {
        self.item.covers.push(reference);
        self
    }

    pub fn covers_all(mut self, references: impl IntoIterator<Item = ItemReference>) -> Self {
        self.item.covers.extend(references);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.item.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.item.description = Some(description.into());
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.item.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.item.location = Some(location);
        self
    }

    /// Finish the item, rejecting identities and references that cannot be linked.
    pub fn build(self) -> Result<SpecificationItem> {
        let item = self.item;
        if !item.id.is_well_formed() {
            bail!(
                "Invalid specification item id '{}': artifact type and name must be non-empty and free of '~' and whitespace",
                item.id
            );
        }
        if let Some(needed) = item.needs.iter().find(|t| t.as_str().is_empty()) {
            bail!(
                "Specification item '{}' needs an empty artifact type ('{}')",
                item.id,
                needed
            );
        }
        if let Some(reference) = item.covers.iter().find(|r| !r.is_well_formed()) {
            bail!(
                "Specification item '{}' covers malformed reference '{}'",
                item.id,
                reference
            );
        }
        Ok(item)
    }
}
