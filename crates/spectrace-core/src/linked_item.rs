//! Graph nodes: specification items plus their classified links

use crate::item::SpecificationItem;
use crate::item_id::{ArtifactType, ItemReference};
use crate::link_status::LinkStatus;
use std::collections::{BTreeMap, BTreeSet};

/// Position of a node in its [`LinkGraph`](crate::LinkGraph).
///
/// Only meaningful for the graph that handed it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemIndex(pub(crate) usize);

impl std::fmt::Display for ItemIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A specification item together with its outgoing links and the artifact
/// types it has been shown to be covered by.
///
/// Links are stored on the source only and point at other nodes by index.
#[derive(Debug, Clone)]
pub struct LinkedSpecificationItem {
    item: SpecificationItem,
    links: BTreeMap<LinkStatus, Vec<ItemIndex>>,
    orphaned: Vec<ItemReference>,
    covered: BTreeSet<ArtifactType>,
}

impl LinkedSpecificationItem {
    pub fn new(item: SpecificationItem) -> Self {
        Self {
            item,
            links: BTreeMap::new(),
            orphaned: Vec::new(),
            covered: BTreeSet::new(),
        }
    }

    pub fn item(&self) -> &SpecificationItem {
        &self.item
    }

    /// Record a link to `target`. The same target may be added any number of
    /// times, under one status or several.
    pub fn add_link_to_item_with_status(&mut self, target: ItemIndex, status: LinkStatus) {
        self.links.entry(status).or_default().push(target);
    }

    /// Targets linked with `status`, in insertion order.
    pub fn links_by_status(&self, status: LinkStatus) -> &[ItemIndex] {
        self.links.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every `(status, target)` link of this node.
    pub fn links(&self) -> impl Iterator<Item = (LinkStatus, ItemIndex)> + '_ {
        self.links
            .iter()
            .flat_map(|(status, targets)| targets.iter().map(move |target| (*status, *target)))
    }

    /// Record a reference that did not resolve to any item.
    pub fn add_orphaned_reference(&mut self, reference: ItemReference) {
        self.orphaned.push(reference);
    }

    pub fn orphaned_references(&self) -> &[ItemReference] {
        &self.orphaned
    }

    /// Number of outgoing links with `status`, unresolved references included.
    pub fn link_count(&self, status: LinkStatus) -> usize {
        let orphaned = if status == LinkStatus::Orphaned {
            self.orphaned.len()
        } else {
            0
        };
        self.links_by_status(status).len() + orphaned
    }

    pub fn has_links(&self) -> bool {
        !self.orphaned.is_empty() || self.links.values().any(|targets| !targets.is_empty())
    }

    pub fn add_covered_artifact_type(&mut self, artifact_type: ArtifactType) {
        self.covered.insert(artifact_type);
    }

    pub fn covered_artifact_types(&self) -> &BTreeSet<ArtifactType> {
        &self.covered
    }

    /// Needed artifact types without coverage yet.
    pub fn uncovered_artifact_types(&self) -> BTreeSet<ArtifactType> {
        self.item.needs().difference(&self.covered).cloned().collect()
    }

    /// Covered artifact types the item does not need.
    ///
    /// The linker only records types the target needs, so this is empty on a
    /// linked graph unless types were added with
    /// [`add_covered_artifact_type`](Self::add_covered_artifact_type) directly.
    pub fn over_covered_artifact_types(&self) -> BTreeSet<ArtifactType> {
        self.covered.difference(self.item.needs()).cloned().collect()
    }

    /// Every needed artifact type is covered by at least one direct link.
    pub fn is_covered_shallow(&self) -> bool {
        self.item.needs().is_subset(&self.covered)
    }

    /// At least one outgoing link is neither `Covers` nor `CoveredShallow`.
    pub fn is_defect(&self) -> bool {
        !self.orphaned.is_empty()
            || self
                .links
                .iter()
                .any(|(status, targets)| status.is_defect() && !targets.is_empty())
    }
}
