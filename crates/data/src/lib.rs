//! Relationship graph of people and the unions between them.
//!
//! The graph is built once from records and then only read: global
//! generations, neighborhoods and DOT exports are all computed into maps
//! owned by the caller, never stored on the people themselves.

mod dot;
mod generations;
mod graph;
mod model;
mod neighborhood;

pub use dot::write_dot;
pub use generations::Generations;
pub use graph::{FamilyGraph, GraphError};
pub use model::{Gender, Person, PersonId, PersonRecord, Union, UnionId, UnionRecord};
pub use neighborhood::{Neighborhood, NeighborhoodLimits};

/// Wrapper of the people file, `{"People": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PeopleFile {
    #[serde(rename = "People", alias = "people")]
    pub people: Vec<PersonRecord>,
}

/// Wrapper of the marriages file, `{"Marriages": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UnionsFile {
    #[serde(rename = "Marriages", alias = "unions")]
    pub unions: Vec<UnionRecord>,
}
