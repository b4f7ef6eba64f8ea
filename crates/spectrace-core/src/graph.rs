//! Arena of linked specification items

use crate::coverage;
use crate::item::SpecificationItem;
use crate::item_id::{ArtifactType, SpecificationItemId};
use crate::link_status::LinkStatus;
use crate::linked_item::{ItemIndex, LinkedSpecificationItem};
use std::collections::HashMap;
use std::ops::{Deref, Index};

/// All nodes of one analysis run.
///
/// Nodes refer to each other through [`ItemIndex`] keys, so the graph is the
/// single owner of every item. Built fresh for every run.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    nodes: Vec<LinkedSpecificationItem>,
    by_id: HashMap<SpecificationItemId, Vec<ItemIndex>>,
    by_name: HashMap<(ArtifactType, String), Vec<ItemIndex>>,
}

impl LinkGraph {
    /// One unlinked node per item, in input order.
    pub fn new(items: impl IntoIterator<Item = SpecificationItem>) -> Self {
        let mut graph = LinkGraph::default();
        for item in items {
            graph.push(item);
        }
        graph
    }

    fn push(&mut self, item: SpecificationItem) -> ItemIndex {
        let index = ItemIndex(self.nodes.len());
        self.by_id.entry(item.id().clone()).or_default().push(index);
        self.by_name
            .entry((item.artifact_type().clone(), item.name().to_string()))
            .or_default()
            .push(index);
        self.nodes.push(LinkedSpecificationItem::new(item));
        index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = ItemIndex> + use<> {
        (0..self.nodes.len()).map(ItemIndex)
    }

    pub fn iter(&self) -> impl Iterator<Item = LinkedItemRef<'_>> {
        self.indices().map(|index| self.node(index))
    }

    /// # Panics
    ///
    /// If `index` was not handed out by this graph.
    pub fn get(&self, index: ItemIndex) -> &LinkedSpecificationItem {
        &self.nodes[index.0]
    }

    /// # Panics
    ///
    /// If `index` was not handed out by this graph.
    pub fn get_mut(&mut self, index: ItemIndex) -> &mut LinkedSpecificationItem {
        &mut self.nodes[index.0]
    }

    /// Borrowed view of a node that can follow its links.
    pub fn node(&self, index: ItemIndex) -> LinkedItemRef<'_> {
        LinkedItemRef {
            graph: self,
            index,
            node: self.get(index),
        }
    }

    /// Nodes whose item has exactly this ID. More than one means duplicates.
    pub fn find(&self, id: &SpecificationItemId) -> &[ItemIndex] {
        self.by_id.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes of every revision of `type~name`, in input order.
    pub fn candidates(&self, artifact_type: &ArtifactType, name: &str) -> &[ItemIndex] {
        self.by_name
            .get(&(artifact_type.clone(), name.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// IDs shared by more than one item, each with the colliding nodes.
    pub fn duplicates(&self) -> impl Iterator<Item = (&SpecificationItemId, &[ItemIndex])> {
        self.by_id
            .iter()
            .filter(|(_, nodes)| nodes.len() > 1)
            .map(|(id, nodes)| (id, nodes.as_slice()))
    }

    /// Record a link from `source` to `target`.
    pub fn add_link(&mut self, source: ItemIndex, target: ItemIndex, status: LinkStatus) {
        self.get_mut(source).add_link_to_item_with_status(target, status);
    }

    /// Record `status` on `source` and its reverse status on `target`.
    pub fn add_link_pair(&mut self, source: ItemIndex, target: ItemIndex, status: LinkStatus) {
        self.add_link(source, target, status);
        if let Some(reverse) = status.reverse() {
            self.add_link(target, source, reverse);
        }
    }

    /// Deep coverage of a single node, following `Covers` links.
    pub fn is_covered_deeply(&self, index: ItemIndex) -> bool {
        coverage::deep_coverage_of(self, index)
    }
}

impl Index<ItemIndex> for LinkGraph {
    type Output = LinkedSpecificationItem;

    fn index(&self, index: ItemIndex) -> &Self::Output {
        self.get(index)
    }
}

/// A node together with the graph it lives in.
#[derive(Debug, Clone, Copy)]
pub struct LinkedItemRef<'g> {
    graph: &'g LinkGraph,
    index: ItemIndex,
    node: &'g LinkedSpecificationItem,
}

impl<'g> LinkedItemRef<'g> {
    pub fn index(&self) -> ItemIndex {
        self.index
    }

    pub fn graph(&self) -> &'g LinkGraph {
        self.graph
    }

    pub fn linked_item(&self) -> &'g LinkedSpecificationItem {
        self.node
    }

    pub fn item(&self) -> &'g SpecificationItem {
        self.node.item()
    }

    /// Nodes linked from this one with `status`.
    pub fn linked_items(
        &self,
        status: LinkStatus,
    ) -> impl Iterator<Item = LinkedItemRef<'g>> + use<'g> {
        let graph = self.graph;
        self.node
            .links_by_status(status)
            .iter()
            .map(move |target| graph.node(*target))
    }

    pub fn is_covered_deeply(&self) -> bool {
        self.graph.is_covered_deeply(self.index)
    }
}

impl Deref for LinkedItemRef<'_> {
    type Target = LinkedSpecificationItem;

    fn deref(&self) -> &Self::Target {
        self.node
    }
}
