//! Builds the link graph from a flat list of specification items

use crate::config::TraceConfig;
use crate::graph::LinkGraph;
use crate::item::SpecificationItem;
use crate::item_id::{ItemReference, RevisionMatch, classify_reference};
use crate::link_status::LinkStatus;
use crate::linked_item::ItemIndex;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Turns declared `covers` references into classified links.
#[derive(Debug, Clone, Copy)]
pub struct Linker<'c> {
    config: &'c TraceConfig,
}

/// What a single reference resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolution {
    Orphaned,
    Ambiguous(Vec<ItemIndex>),
    Exact(ItemIndex),
    Outdated(ItemIndex),
    Predated(ItemIndex),
}

impl<'c> Linker<'c> {
    pub fn new(config: &'c TraceConfig) -> Self {
        Self { config }
    }

    /// Filter `items`, build the graph and classify every link.
    pub fn link(&self, items: Vec<SpecificationItem>) -> LinkGraph {
        let items = self.config.filter.apply(items);
        let mut graph = LinkGraph::new(items);

        self.link_duplicates(&mut graph);
        for source in graph.indices() {
            let references = graph[source].item().covers().to_vec();
            for reference in &references {
                self.link_reference(&mut graph, source, reference);
            }
        }

        let mut counts: BTreeMap<LinkStatus, usize> = BTreeMap::new();
        for node in graph.iter() {
            for status in LinkStatus::ALL {
                let count = node.link_count(status);
                if count > 0 {
                    *counts.entry(status).or_default() += count;
                }
            }
        }
        info!(
            items = graph.len(),
            covers = counts.get(&LinkStatus::Covers).copied().unwrap_or(0),
            defect_links = counts
                .iter()
                .filter(|(status, _)| status.is_defect())
                .map(|(_, count)| count)
                .sum::<usize>(),
            "linked specification items"
        );
        graph
    }

    /// Items sharing an ID point at each other with `Duplicate`.
    fn link_duplicates(&self, graph: &mut LinkGraph) {
        let mut groups: Vec<Vec<ItemIndex>> = graph
            .duplicates()
            .map(|(id, nodes)| {
                debug!(id = %id, count = nodes.len(), "duplicate item id");
                nodes.to_vec()
            })
            .collect();
        groups.sort();

        for group in groups {
            for &source in &group {
                for &target in group.iter().filter(|&&target| target != source) {
                    graph.add_link(source, target, LinkStatus::Duplicate);
                }
            }
        }
    }

    fn link_reference(
        &self,
        graph: &mut LinkGraph,
        source: ItemIndex,
        reference: &ItemReference,
    ) {
        let resolution = resolve(graph, reference);
        let source_id = graph[source].item().id().clone();

        match resolution {
            Resolution::Orphaned => {
                debug!(source = %source_id, reference = %reference, "orphaned reference");
                graph.get_mut(source).add_orphaned_reference(reference.clone());
            }
            Resolution::Ambiguous(targets) => {
                debug!(
                    source = %source_id,
                    reference = %reference,
                    matches = targets.len(),
                    "ambiguous reference"
                );
                for target in targets {
                    graph.add_link(source, target, LinkStatus::Ambiguous);
                }
            }
            Resolution::Exact(target) => {
                let status = self.classify_coverage(graph, source, target);
                debug!(source = %source_id, reference = %reference, status = %status, "link");
                graph.add_link_pair(source, target, status);
                if status == LinkStatus::Covers {
                    let covering = graph[source].item().artifact_type().clone();
                    graph.get_mut(target).add_covered_artifact_type(covering);
                }
            }
            Resolution::Outdated(target) => {
                debug!(source = %source_id, reference = %reference, "outdated reference");
                graph.add_link_pair(source, target, LinkStatus::Outdated);
            }
            Resolution::Predated(target) => {
                debug!(source = %source_id, reference = %reference, "predated reference");
                graph.add_link_pair(source, target, LinkStatus::Predated);
            }
        }
    }

    /// `Covers` when the target needs the source's artifact type and the
    /// configured coverage rules allow the pair, `Unwanted` otherwise.
    fn classify_coverage(
        &self,
        graph: &LinkGraph,
        source: ItemIndex,
        target: ItemIndex,
    ) -> LinkStatus {
        let covering = graph[source].item().artifact_type();
        let covered = graph[target].item();
        if covered.needs_artifact_type(covering)
            && self.config.allows_coverage(covered.artifact_type(), covering)
        {
            LinkStatus::Covers
        } else {
            LinkStatus::Unwanted
        }
    }
}

/// Resolve `reference` against every revision of the item it names.
///
/// Several exact matches (duplicated IDs, or several revisions behind a
/// wildcard) are ambiguous. Without an exact match the reference is outdated
/// when a newer revision exists and predated otherwise; both point at the
/// newest revision.
fn resolve(graph: &LinkGraph, reference: &ItemReference) -> Resolution {
    let candidates = graph.candidates(&reference.artifact_type, &reference.name);
    if candidates.is_empty() {
        return Resolution::Orphaned;
    }

    let exact: Vec<ItemIndex> = candidates
        .iter()
        .copied()
        .filter(|candidate| reference.matches(graph[*candidate].item().id()))
        .collect();
    match exact.as_slice() {
        [single] => return Resolution::Exact(*single),
        [] => {}
        _ => return Resolution::Ambiguous(exact),
    }

    let Some(newest) = candidates
        .iter()
        .copied()
        .max_by_key(|candidate| graph[*candidate].item().revision())
    else {
        return Resolution::Orphaned;
    };
    match classify_reference(graph[newest].item().id(), reference) {
        RevisionMatch::Outdated => Resolution::Outdated(newest),
        _ => Resolution::Predated(newest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_id::{SpecificationItemId, parse_item_id, parse_item_reference};

    fn item(id: &str, needs: &[&str], covers: &[&str]) -> SpecificationItem {
        SpecificationItem::builder(parse_item_id(id).expect("valid id"))
            .needs(needs.iter().copied())
            .covers_all(
                covers
                    .iter()
                    .map(|r| parse_item_reference(r).expect("valid reference")),
            )
            .build()
            .unwrap()
    }

    fn link(items: Vec<SpecificationItem>) -> LinkGraph {
        Linker::new(&TraceConfig::default()).link(items)
    }

    fn index_of(graph: &LinkGraph, id: &str) -> ItemIndex {
        graph.find(&parse_item_id(id).expect("valid id"))[0]
    }

    #[test]
    fn valid_reference_covers_target() {
        let graph = link(vec![
            item("req~login~1", &["dsn"], &[]),
            item("dsn~login~1", &[], &["req~login~1"]),
        ]);
        let req = index_of(&graph, "req~login~1");
        let dsn = index_of(&graph, "dsn~login~1");

        assert_eq!(graph[dsn].links_by_status(LinkStatus::Covers), &[req]);
        assert_eq!(graph[req].links_by_status(LinkStatus::CoveredShallow), &[dsn]);
        assert!(graph[req].is_covered_shallow());
        assert!(!graph[req].is_defect());
        assert!(!graph[dsn].is_defect());
    }

    #[test]
    fn missing_target_is_orphaned() {
        let graph = link(vec![item("dsn~login~1", &[], &["req~gone~1"])]);
        let dsn = index_of(&graph, "dsn~login~1");
        assert_eq!(graph[dsn].orphaned_references().len(), 1);
        assert_eq!(graph[dsn].link_count(LinkStatus::Orphaned), 1);
        assert!(graph[dsn].is_defect());
    }

    #[test]
    fn target_not_needing_type_is_unwanted() {
        let graph = link(vec![
            item("req~login~1", &["dsn"], &[]),
            item("impl~login~1", &[], &["req~login~1"]),
        ]);
        let req = index_of(&graph, "req~login~1");
        let imp = index_of(&graph, "impl~login~1");
        assert_eq!(graph[imp].links_by_status(LinkStatus::Unwanted), &[req]);
        assert_eq!(graph[req].links_by_status(LinkStatus::CoveredUnwanted), &[imp]);
        assert!(graph[req].covered_artifact_types().is_empty());
        assert!(graph[imp].is_defect());
        assert!(graph[req].is_defect());
    }

    #[test]
    fn coverage_rules_make_links_unwanted() {
        let config = TraceConfig::default().with_coverage_rule("req", ["dsn"]);
        let graph = Linker::new(&config).link(vec![
            item("req~login~1", &["dsn", "impl"], &[]),
            item("dsn~login~1", &[], &["req~login~1"]),
            item("impl~login~1", &[], &["req~login~1"]),
        ]);
        let imp = index_of(&graph, "impl~login~1");
        let dsn = index_of(&graph, "dsn~login~1");
        assert_eq!(graph[imp].link_count(LinkStatus::Unwanted), 1);
        assert_eq!(graph[dsn].link_count(LinkStatus::Covers), 1);
    }

    #[test]
    fn older_revision_is_outdated() {
        let graph = link(vec![
            item("req~login~2", &["dsn"], &[]),
            item("dsn~login~1", &[], &["req~login~1"]),
        ]);
        let req = index_of(&graph, "req~login~2");
        let dsn = index_of(&graph, "dsn~login~1");
        assert_eq!(graph[dsn].links_by_status(LinkStatus::Outdated), &[req]);
        assert_eq!(graph[req].links_by_status(LinkStatus::CoveredOutdated), &[dsn]);
        assert!(!graph[req].is_covered_shallow());
    }

    #[test]
    fn newer_revision_is_predated() {
        let graph = link(vec![
            item("req~login~2", &["dsn"], &[]),
            item("dsn~login~1", &[], &["req~login~3"]),
        ]);
        let req = index_of(&graph, "req~login~2");
        let dsn = index_of(&graph, "dsn~login~1");
        assert_eq!(graph[dsn].links_by_status(LinkStatus::Predated), &[req]);
        assert_eq!(graph[req].links_by_status(LinkStatus::CoveredPredated), &[dsn]);
    }

    #[test]
    fn exact_revision_wins_over_newer_ones() {
        let graph = link(vec![
            item("req~login~1", &["dsn"], &[]),
            item("req~login~2", &["dsn"], &[]),
            item("dsn~login~1", &[], &["req~login~1"]),
        ]);
        let old = index_of(&graph, "req~login~1");
        let dsn = index_of(&graph, "dsn~login~1");
        assert_eq!(graph[dsn].links_by_status(LinkStatus::Covers), &[old]);
    }

    #[test]
    fn wildcard_resolves_single_revision() {
        let graph = link(vec![
            item("req~login~4", &["dsn"], &[]),
            item("dsn~login~1", &[], &["req~login"]),
        ]);
        let req = index_of(&graph, "req~login~4");
        assert!(graph[req].is_covered_shallow());
    }

    #[test]
    fn wildcard_over_several_revisions_is_ambiguous() {
        let graph = link(vec![
            item("req~login~1", &["dsn"], &[]),
            item("req~login~2", &["dsn"], &[]),
            item("dsn~login~1", &[], &["req~login~*"]),
        ]);
        let dsn = index_of(&graph, "dsn~login~1");
        assert_eq!(graph[dsn].link_count(LinkStatus::Ambiguous), 2);
        assert!(graph[dsn].is_defect());
    }

    #[test]
    fn duplicates_point_at_each_other() {
        let graph = link(vec![
            item("req~login~1", &["dsn"], &[]),
            item("req~login~1", &["dsn"], &[]),
            item("req~logout~1", &[], &[]),
        ]);
        let id = SpecificationItemId::new("req", "login", 1);
        let nodes = graph.find(&id);
        assert_eq!(nodes.len(), 2);
        assert_eq!(graph[nodes[0]].links_by_status(LinkStatus::Duplicate), &[nodes[1]]);
        assert_eq!(graph[nodes[1]].links_by_status(LinkStatus::Duplicate), &[nodes[0]]);
        assert!(graph[nodes[0]].is_defect());
        assert!(!graph[index_of(&graph, "req~logout~1")].is_defect());
    }

    #[test]
    fn reference_to_duplicate_is_ambiguous() {
        let graph = link(vec![
            item("req~login~1", &["dsn"], &[]),
            item("req~login~1", &["dsn"], &[]),
            item("dsn~login~1", &[], &["req~login~1"]),
        ]);
        let dsn = index_of(&graph, "dsn~login~1");
        assert_eq!(graph[dsn].link_count(LinkStatus::Ambiguous), 2);
        assert_eq!(graph[dsn].link_count(LinkStatus::Covers), 0);
    }

    #[test]
    fn one_item_may_cover_several() {
        let graph = link(vec![
            item("req~login~1", &["dsn"], &[]),
            item("req~logout~1", &["dsn"], &[]),
            item("dsn~session~1", &[], &["req~login~1", "req~logout~1"]),
        ]);
        let dsn = index_of(&graph, "dsn~session~1");
        assert_eq!(graph[dsn].link_count(LinkStatus::Covers), 2);
        assert!(!graph[dsn].is_defect());
    }

    #[test]
    fn filtered_items_leave_no_dangling_links() {
        let config = TraceConfig::default().with_filter(crate::config::FilterSettings {
            artifact_types: vec!["dsn".into(), "impl".into()],
            ..Default::default()
        });
        let graph = Linker::new(&config).link(vec![
            item("req~login~1", &["dsn"], &[]),
            item("dsn~login~1", &["impl"], &["req~login~1"]),
            item("impl~login~1", &[], &["dsn~login~1"]),
        ]);
        assert_eq!(graph.len(), 2);
        let dsn = index_of(&graph, "dsn~login~1");
        assert!(graph[dsn].is_covered_shallow());
        assert_eq!(graph[dsn].link_count(LinkStatus::Orphaned), 0);
        assert!(!graph[dsn].is_defect());
    }
}
