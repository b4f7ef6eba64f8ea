//! Classification of links between specification items

use facet::Facet;

/// Status of one directed link between two items.
///
/// Each relationship is recorded twice, once on every endpoint, and the two
/// sides usually carry different statuses: the covering item holds `Covers`,
/// the covered item holds `CoveredShallow`. Only those two are healthy,
/// everything else marks a structural defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
#[facet(rename_all = "snake_case")]
#[repr(u8)]
pub enum LinkStatus {
    /// The source covers the target and the target needs the source's artifact type
    Covers,
    /// Reverse side of `Covers`: the target contributes to this item's coverage
    CoveredShallow,
    /// Another item has exactly the same ID
    Duplicate,
    /// The reference does not resolve to any item
    Orphaned,
    /// The reference resolves to more than one item
    Ambiguous,
    /// The target exists but does not need the source's artifact type
    Unwanted,
    /// The reference points at an older revision of the target
    Outdated,
    /// The reference points at a revision of the target that does not exist yet
    Predated,
    /// Reverse side of `Unwanted`
    CoveredUnwanted,
    /// Reverse side of `Outdated`
    CoveredOutdated,
    /// Reverse side of `Predated`
    CoveredPredated,
}

impl LinkStatus {
    /// Every status, in declaration order.
    pub const ALL: [LinkStatus; 11] = [
        LinkStatus::Covers,
        LinkStatus::CoveredShallow,
        LinkStatus::Duplicate,
        LinkStatus::Orphaned,
        LinkStatus::Ambiguous,
        LinkStatus::Unwanted,
        LinkStatus::Outdated,
        LinkStatus::Predated,
        LinkStatus::CoveredUnwanted,
        LinkStatus::CoveredOutdated,
        LinkStatus::CoveredPredated,
    ];

    /// `Covers` and `CoveredShallow`.
    pub fn is_healthy(&self) -> bool {
        matches!(self, LinkStatus::Covers | LinkStatus::CoveredShallow)
    }

    pub fn is_defect(&self) -> bool {
        !self.is_healthy()
    }

    /// Recorded on the item that declared the reference.
    pub fn is_outgoing(&self) -> bool {
        matches!(
            self,
            LinkStatus::Covers
                | LinkStatus::Duplicate
                | LinkStatus::Orphaned
                | LinkStatus::Ambiguous
                | LinkStatus::Unwanted
                | LinkStatus::Outdated
                | LinkStatus::Predated
        )
    }

    /// Recorded on the item that is referenced.
    pub fn is_incoming(&self) -> bool {
        matches!(
            self,
            LinkStatus::CoveredShallow
                | LinkStatus::Duplicate
                | LinkStatus::CoveredUnwanted
                | LinkStatus::CoveredOutdated
                | LinkStatus::CoveredPredated
        )
    }

    /// Status stored on the referenced item for a link classified as `self`
    /// on the referencing one. `None` when no reverse link is recorded.
    pub fn reverse(&self) -> Option<LinkStatus> {
        match self {
            LinkStatus::Covers => Some(LinkStatus::CoveredShallow),
            LinkStatus::Unwanted => Some(LinkStatus::CoveredUnwanted),
            LinkStatus::Outdated => Some(LinkStatus::CoveredOutdated),
            LinkStatus::Predated => Some(LinkStatus::CoveredPredated),
            LinkStatus::Duplicate => Some(LinkStatus::Duplicate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Covers => "covers",
            LinkStatus::CoveredShallow => "covered shallow",
            LinkStatus::Duplicate => "duplicate",
            LinkStatus::Orphaned => "orphaned",
            LinkStatus::Ambiguous => "ambiguous",
            LinkStatus::Unwanted => "unwanted",
            LinkStatus::Outdated => "outdated",
            LinkStatus::Predated => "predated",
            LinkStatus::CoveredUnwanted => "unwanted coverage",
            LinkStatus::CoveredOutdated => "outdated coverage",
            LinkStatus::CoveredPredated => "predated coverage",
        }
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
