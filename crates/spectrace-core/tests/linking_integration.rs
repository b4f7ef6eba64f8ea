//! Integration tests for linking and tracing with configuration fixtures

use spectrace_core::{
    FilterSettings, ItemStatus, LinkStatus, Location, SpecificationItem, TraceConfig, Tracer,
    parse_item_id, parse_item_reference,
};
use std::collections::BTreeSet;
use std::path::Path;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn item(id: &str, needs: &[&str], covers: &[&str]) -> SpecificationItem {
    SpecificationItem::builder(parse_item_id(id).expect("valid id"))
        .needs(needs.iter().copied())
        .covers_all(
            covers
                .iter()
                .map(|r| parse_item_reference(r).expect("valid reference")),
        )
        .build()
        .expect("valid item")
}

fn tagged(id: &str, needs: &[&str], covers: &[&str], tags: &[&str]) -> SpecificationItem {
    SpecificationItem::builder(parse_item_id(id).expect("valid id"))
        .needs(needs.iter().copied())
        .covers_all(covers.iter().map(|r| parse_item_reference(r).unwrap()))
        .tags(tags.iter().copied())
        .build()
        .expect("valid item")
}

/// A small project: one feature broken down into requirements, designs,
/// implementations, tests and a user manual entry.
fn project() -> Vec<SpecificationItem> {
    vec![
        item("feat~login~1", &["req"], &[]),
        item("req~login-form~1", &["dsn", "uman"], &["feat~login~1"]),
        item("req~session~2", &["dsn"], &["feat~login~1"]),
        item("dsn~login-form~1", &["impl", "utest"], &["req~login-form~1"]),
        item("dsn~session~1", &["impl"], &["req~session~2"]),
        item("uman~login~1", &[], &["req~login-form~1"]),
        item("impl~login-form~1", &[], &["dsn~login-form~1"]),
        item("utest~login-form~1", &[], &["dsn~login-form~1"]),
        item("impl~session~1", &[], &["dsn~session~1"]),
    ]
}

fn ids<'a>(iter: impl Iterator<Item = spectrace_core::TracedItem<'a>>) -> BTreeSet<String> {
    iter.map(|item| item.id().to_string()).collect()
}

#[test]
fn test_load_coverage_rules_fixture() {
    let config = TraceConfig::load(fixture_path("artifact_rules.json")).expect("valid fixture");
    assert_eq!(config.coverage_rules.len(), 3);
    assert!(config.allows_coverage(&"req".into(), &"uman".into()));
    assert!(!config.allows_coverage(&"dsn".into(), &"uman".into()));
    assert!(!config.filter.is_any_filter_set());
}

#[test]
fn test_broken_config_fixture_names_the_file() {
    let err = TraceConfig::load(fixture_path("broken.json")).unwrap_err();
    let message = format!("{err:?}");
    assert!(
        message.contains("broken.json"),
        "Error should mention the file: {message}"
    );
}

#[test]
fn test_complete_project_is_ok() {
    init_logging();
    let config = TraceConfig::load(fixture_path("artifact_rules.json")).unwrap();
    let trace = Tracer::new(config).trace(project());

    assert_eq!(trace.count(), 9);
    assert_eq!(trace.defect_count(), 0, "no defects expected");
    assert!(trace.is_ok());
    assert!(trace.duplicate_ids().is_empty());
}

#[test]
fn test_missing_test_breaks_coverage_downstream() {
    init_logging();
    let items: Vec<_> = project()
        .into_iter()
        .filter(|i| i.id() != &"utest~login-form~1")
        .collect();
    let trace = Tracer::default().trace(items);

    assert_eq!(
        ids(trace.uncovered_items()),
        BTreeSet::from([
            "dsn~login-form~1".to_string(),
            "impl~login-form~1".to_string(),
        ])
    );
    assert_eq!(trace.defect_count(), 0);
    assert!(!trace.is_ok());
}

#[test]
fn test_rule_violation_is_unwanted() {
    init_logging();
    let config = TraceConfig::load(fixture_path("artifact_rules.json")).unwrap();
    let mut items = project();
    // The feature needs "req", but an implementation claims to cover it.
    items[0] = item("feat~login~1", &["req", "impl"], &[]);
    items.push(item("impl~shortcut~1", &[], &["feat~login~1"]));
    let trace = Tracer::new(config).trace(items);

    let shortcut = trace
        .items()
        .find(|i| i.id() == &"impl~shortcut~1")
        .expect("shortcut item");
    assert!(shortcut.is_defect());
    let statuses: Vec<LinkStatus> = shortcut.links().map(|(status, _)| status).collect();
    assert_eq!(statuses, [LinkStatus::Unwanted]);

    let feature = trace
        .items()
        .find(|i| i.id() == &"feat~login~1")
        .expect("feature item");
    assert!(feature.is_defect());
    assert!(!feature.is_covered_shallow());
    assert_eq!(
        feature
            .uncovered_artifact_types()
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>(),
        ["impl"]
    );
}

#[test]
fn test_revision_bump_outdates_covering_items() {
    init_logging();
    let mut items = project();
    items[2] = item("req~session~3", &["dsn"], &["feat~login~1"]);
    let trace = Tracer::default().trace(items);

    let design = trace
        .items()
        .find(|i| i.id() == &"dsn~session~1")
        .expect("design item");
    let links: Vec<(LinkStatus, String)> = design
        .links()
        .map(|(status, target)| (status, target.id().to_string()))
        .collect();
    assert!(links.contains(&(LinkStatus::Outdated, "req~session~3".to_string())));
    assert!(design.is_defect());

    let requirement = trace
        .items()
        .find(|i| i.id() == &"req~session~3")
        .expect("requirement item");
    assert!(requirement.is_defect());
    assert!(!requirement.is_covered_shallow());
}

#[test]
fn test_duplicates_do_not_stop_analysis() {
    init_logging();
    let mut items = project();
    items.push(item("impl~session~1", &[], &["dsn~session~1"]));
    let trace = Tracer::default().trace(items);

    assert_eq!(trace.count(), 10);
    assert_eq!(
        trace
            .duplicate_ids()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>(),
        ["impl~session~1"]
    );
    assert_eq!(
        ids(trace.defect_items()),
        BTreeSet::from(["impl~session~1".to_string()])
    );
    // Both copies still cover the design.
    let design = trace
        .items()
        .find(|i| i.id() == &"dsn~session~1")
        .unwrap();
    assert!(design.is_covered_shallow());
    assert_eq!(design.node().link_count(LinkStatus::CoveredShallow), 2);
}

#[test]
fn test_tag_filter_fixture() {
    init_logging();
    let config = TraceConfig::load(fixture_path("tagged_filter.json")).unwrap();
    let items = vec![
        tagged("req~api~1", &["dsn", "uman"], &[], &["backend"]),
        tagged("req~theme~1", &["dsn"], &[], &["frontend"]),
        tagged("dsn~api~1", &["impl"], &["req~api~1"], &[]),
        tagged("impl~api~1", &[], &["dsn~api~1"], &["backend"]),
        tagged("uman~api~1", &[], &["req~api~1"], &["backend"]),
    ];
    let trace = Tracer::new(config).trace(items);

    assert_eq!(
        ids(trace.items()),
        BTreeSet::from([
            "req~api~1".to_string(),
            "dsn~api~1".to_string(),
            "impl~api~1".to_string(),
        ])
    );
    assert!(trace.is_ok(), "uman needs are filtered out with the uman items");
}

#[test]
fn test_tag_filter_does_not_orphan_references_to_filtered_items() {
    init_logging();
    let config = TraceConfig::default().with_filter(FilterSettings {
        tags: vec!["backend".into()],
        ..Default::default()
    });
    let items = vec![
        tagged("req~theme~1", &["dsn"], &[], &["frontend"]),
        tagged("dsn~shared~1", &[], &["req~theme~1"], &["backend"]),
        tagged("impl~broken~1", &[], &["dsn~missing~1"], &["backend"]),
    ];
    let trace = Tracer::new(config).trace(items);

    assert_eq!(trace.count(), 2);
    let shared = trace
        .items()
        .find(|i| i.id() == &"dsn~shared~1")
        .expect("shared design");
    assert!(!shared.is_defect());
    assert!(shared.orphaned_references().is_empty());

    // A reference that never resolved stays orphaned.
    assert_eq!(
        ids(trace.defect_items()),
        BTreeSet::from(["impl~broken~1".to_string()])
    );
}

#[test]
fn test_descriptive_fields_survive_tracing() {
    let requirement = SpecificationItem::builder(parse_item_id("req~export~1").unwrap())
        .status(ItemStatus::Proposed)
        .title("Export")
        .description("Users can export their data.")
        .location(Location::new("doc/requirements.md", 42))
        .build()
        .unwrap();
    let trace = Tracer::default().trace(vec![requirement]);
    let traced = trace.items().next().unwrap();

    assert_eq!(traced.item().status(), ItemStatus::Proposed);
    assert_eq!(traced.item().title(), Some("Export"));
    assert_eq!(
        traced.item().location(),
        Some(&Location::new("doc/requirements.md", 42))
    );
    assert!(traced.is_covered_deeply());
}

#[test]
fn test_parallel_runs_match_sequential_runs() {
    init_logging();
    let tracer = Tracer::default();
    let mut broken = project();
    broken.truncate(5);
    let batches = vec![project(), broken.clone(), project()];

    let together = tracer.trace_all(batches);
    let alone = [tracer.trace(project()), tracer.trace(broken), tracer.trace(project())];

    for (a, b) in together.iter().zip(alone.iter()) {
        assert_eq!(a.count(), b.count());
        assert_eq!(a.defect_count(), b.defect_count());
        assert_eq!(a.uncovered_count(), b.uncovered_count());
        assert_eq!(a.analysis(), b.analysis());
    }
}
