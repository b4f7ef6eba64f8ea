//! spectrace-core - Core library for specification item tracing
//!
//! This crate provides the building blocks for:
//! - Describing specification items (requirements, designs, tests, ...) and the
//!   items they claim to cover
//! - Linking those items into a graph where every link carries a [`LinkStatus`]
//! - Computing shallow coverage, deep (transitive) coverage and defects per item
//!
//! Importers that read items from documents or source code live elsewhere;
//! they hand this crate a flat list of [`SpecificationItem`]s.
//!
//! # Features
//!
//! - `parallel` - Trace independent item collections in parallel with
//!   [`Tracer::trace_all`] (brings in `rayon`)
//!
//! # Item IDs
//!
//! Items are identified by artifact type, name and revision, written as
//! `type~name~revision`. References may leave out the revision
//! (`type~name` or `type~name~*`) to match any revision.
//!
//! ```
//! use spectrace_core::{parse_item_id, parse_item_reference};
//!
//! let id = parse_item_id("dsn~linker~2").unwrap();
//! assert_eq!(id.artifact_type.as_str(), "dsn");
//! assert_eq!(id.revision, 2);
//!
//! let reference = parse_item_reference("req~links").unwrap();
//! assert!(reference.is_wildcard());
//! ```
//!
//! # Tracing
//!
//! ```
//! use spectrace_core::{SpecificationItem, Tracer, parse_item_id, parse_item_reference};
//!
//! let req = SpecificationItem::builder(parse_item_id("req~login~1").unwrap())
//!     .needs(["dsn"])
//!     .build()
//!     .unwrap();
//! let dsn = SpecificationItem::builder(parse_item_id("dsn~login~1").unwrap())
//!     .covers(parse_item_reference("req~login~1").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let trace = Tracer::default().trace(vec![req, dsn]);
//! assert!(trace.is_ok());
//! for item in trace.items() {
//!     assert!(item.is_covered_deeply());
//!     assert!(!item.is_defect());
//! }
//! ```

mod config;
mod coverage;
mod graph;
mod item;
mod item_id;
mod link_status;
mod linked_item;
mod linker;
mod trace;

pub use config::{CoverageRule, FilterSettings, TraceConfig};
pub use coverage::{CoverageAnalysis, deep_coverage_of};
pub use graph::{LinkGraph, LinkedItemRef};
pub use item::{ItemStatus, Location, SpecificationItem, SpecificationItemBuilder};
pub use item_id::{
    ArtifactType, ID_SEPARATOR, ItemReference, REVISION_WILDCARD, RevisionMatch,
    SpecificationItemId, classify_reference, parse_item_id, parse_item_reference,
};
pub use link_status::LinkStatus;
pub use linked_item::{ItemIndex, LinkedSpecificationItem};
pub use linker::Linker;
pub use trace::{Trace, TracedItem, Tracer};
