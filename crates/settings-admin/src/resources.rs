//! Ordered resource list editing with stable ids.

use estimate_core::{Resource, ResourceId, ResourceKind};
use std::collections::BTreeSet;
use tracing::warn;

/// Fields of a resource that has not been stored yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub url: String,
    pub kind: ResourceKind,
}

impl ResourceDraft {
    /// Draft with the four text fields set and the default kind.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: category.into(),
            url: url.into(),
            kind: ResourceKind::default(),
        }
    }

    /// Builder-style kind override.
    pub fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind = kind;
        self
    }

    pub(crate) fn into_resource(self, id: ResourceId) -> Resource {
        Resource {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            url: self.url,
            kind: self.kind,
        }
    }
}

impl From<Resource> for ResourceDraft {
    fn from(r: Resource) -> Self {
        Self {
            title: r.title,
            description: r.description,
            category: r.category,
            url: r.url,
            kind: r.kind,
        }
    }
}

/// Give every unassigned, duplicated or out-of-range id a fresh one.
/// Returns the next free id.
pub(crate) fn assign_ids(resources: &mut [Resource]) -> u64 {
    let mut next = resources
        .iter()
        .filter(|r| r.id.in_range())
        .map(|r| r.id.0)
        .max()
        .unwrap_or(0)
        + 1;
    let mut seen = BTreeSet::new();
    for r in resources.iter_mut() {
        if r.id.in_range() && seen.insert(r.id) {
            continue;
        }
        let fresh = ResourceId(next);
        next += 1;
        if r.id.is_assigned() {
            warn!(old = %r.id, new = %fresh, title = %r.title, "resource id reassigned");
        }
        r.id = fresh;
        seen.insert(fresh);
    }
    next
}

/// Remove the entry with `id`, keeping the order of the rest.
pub(crate) fn remove_by_id(resources: &mut Vec<Resource>, id: ResourceId) -> Option<Resource> {
    let idx = resources.iter().position(|r| r.id == id)?;
    Some(resources.remove(idx))
}
