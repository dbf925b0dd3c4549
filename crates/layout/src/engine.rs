use crate::Point;
use lineage_data::{FamilyGraph, PersonId, UnionId};
use serde::Serialize;
use std::collections::BTreeMap;

/// A layout engine that can place the family around a focus person
///
/// Engines are stateless between calls, so one engine can serve layouts for
/// different focus people, including from several threads at once.
pub trait LayoutEngine {
    type Error;

    /// Compute the layout of the neighborhood of `center`
    ///
    /// # Errors
    /// Returns an error if `center` is unknown or the graph is inconsistent
    fn layout(&self, graph: &FamilyGraph, center: PersonId) -> Result<FamilyLayout, Self::Error>;
}

/// A union drawn in a layout, listing only the children that were placed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionPayload {
    pub id: UnionId,
    pub spouses: [PersonId; 2],
    pub children: Vec<PersonId>,
}

/// Result of a layout: who is shown, how they are connected and where
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyLayout {
    pub center: PersonId,
    /// Included people in discovery order
    pub people: Vec<PersonId>,
    pub unions: Vec<UnionPayload>,
    /// Focus-relative positions, the focus being at `(0, 0)`
    pub positions: BTreeMap<PersonId, Point>,
}
