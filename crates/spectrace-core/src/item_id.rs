use facet::Facet;
use std::fmt::{Display, Formatter};

/// Separator between the parts of a textual item ID (`type~name~revision`).
pub const ID_SEPARATOR: char = '~';

/// Revision placeholder accepted in references that match any revision.
pub const REVISION_WILDCARD: &str = "*";

/// Kind of artifact a specification item belongs to (`req`, `dsn`, `impl`, ...).
///
/// Artifact types are configured by whoever imports the items; the engine only
/// compares them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct ArtifactType(String);

impl ArtifactType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ArtifactType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtifactType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ArtifactType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ArtifactType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity key of a specification item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct SpecificationItemId {
    pub artifact_type: ArtifactType,
    pub name: String,
    pub revision: u32,
}

impl SpecificationItemId {
    pub fn new(
        artifact_type: impl Into<ArtifactType>,
        name: impl Into<String>,
        revision: u32,
    ) -> Self {
        Self {
            artifact_type: artifact_type.into(),
            name: name.into(),
            revision,
        }
    }

    /// Whether the type and name are usable as an identity.
    pub fn is_well_formed(&self) -> bool {
        is_valid_part(self.artifact_type.as_str()) && is_valid_part(&self.name)
    }
}

impl Display for SpecificationItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.artifact_type,
            self.name,
            self.revision,
            sep = ID_SEPARATOR
        )
    }
}

impl PartialEq<&str> for SpecificationItemId {
    fn eq(&self, other: &&str) -> bool {
        parse_item_id(other).is_some_and(|parsed| parsed == *self)
    }
}

/// Unresolved `covers` reference as declared by an importer.
///
/// A missing revision matches every revision of the named item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct ItemReference {
    pub artifact_type: ArtifactType,
    pub name: String,
    #[facet(default)]
    pub revision: Option<u32>,
}

impl ItemReference {
    pub fn new(
        artifact_type: impl Into<ArtifactType>,
        name: impl Into<String>,
        revision: Option<u32>,
    ) -> Self {
        Self {
            artifact_type: artifact_type.into(),
            name: name.into(),
            revision,
        }
    }

    /// Reference to any revision of `type~name`.
    pub fn any_revision(artifact_type: impl Into<ArtifactType>, name: impl Into<String>) -> Self {
        Self::new(artifact_type, name, None)
    }

    pub fn is_wildcard(&self) -> bool {
        self.revision.is_none()
    }

    pub fn is_well_formed(&self) -> bool {
        is_valid_part(self.artifact_type.as_str()) && is_valid_part(&self.name)
    }

    /// Whether `id` is exactly the item this reference points at.
    pub fn matches(&self, id: &SpecificationItemId) -> bool {
        classify_reference(id, self) == RevisionMatch::Exact
    }
}

impl Display for ItemReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.revision {
            Some(revision) => write!(
                f,
                "{}{sep}{}{sep}{}",
                self.artifact_type,
                self.name,
                revision,
                sep = ID_SEPARATOR
            ),
            None => write!(f, "{}{}{}", self.artifact_type, ID_SEPARATOR, self.name),
        }
    }
}

/// How a reference relates to an existing item ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionMatch {
    /// Same type and name, and the revision matches (or the reference has none).
    Exact,
    /// Same type and name, but the reference points at an older revision.
    Outdated,
    /// Same type and name, but the reference points at a revision that does not exist yet.
    Predated,
    /// Different type or name.
    NoMatch,
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty() && !part.contains(ID_SEPARATOR) && !part.contains(char::is_whitespace)
}

/// Parse a full item ID of the form `type~name~revision`.
pub fn parse_item_id(id: &str) -> Option<SpecificationItemId> {
    let mut parts = id.split(ID_SEPARATOR);
    let artifact_type = parts.next()?;
    let name = parts.next()?;
    let revision = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let revision = revision.parse::<u32>().ok()?;
    let parsed = SpecificationItemId::new(artifact_type, name, revision);
    parsed.is_well_formed().then_some(parsed)
}

/// Parse a reference: `type~name~revision`, `type~name~*` or `type~name`.
pub fn parse_item_reference(reference: &str) -> Option<ItemReference> {
    let mut parts = reference.split(ID_SEPARATOR);
    let artifact_type = parts.next()?;
    let name = parts.next()?;
    let revision = match parts.next() {
        None => None,
        Some(REVISION_WILDCARD) => None,
        Some(revision) => Some(revision.parse::<u32>().ok()?),
    };
    if parts.next().is_some() {
        return None;
    }
    let parsed = ItemReference::new(artifact_type, name, revision);
    parsed.is_well_formed().then_some(parsed)
}

/// Compare a reference against an existing item ID.
pub fn classify_reference(id: &SpecificationItemId, reference: &ItemReference) -> RevisionMatch {
    if id.artifact_type != reference.artifact_type || id.name != reference.name {
        return RevisionMatch::NoMatch;
    }
    match reference.revision {
        None => RevisionMatch::Exact,
        Some(revision) if revision == id.revision => RevisionMatch::Exact,
        Some(revision) if revision < id.revision => RevisionMatch::Outdated,
        Some(_) => RevisionMatch::Predated,
    }
}
