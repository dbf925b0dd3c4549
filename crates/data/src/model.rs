use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Identifier of a person, as found in the input records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct PersonId(pub u64);

/// Identifier of a union, displayed as `m<n>`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
#[display("m{_0}")]
pub struct UnionId(pub u32);

/// Only used to pick a shape and a color when drawing.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, Default)]
pub enum Gender {
    #[serde(alias = "male", alias = "M")]
    Male,
    #[serde(alias = "female", alias = "F")]
    Female,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A person record as loaded from the people file.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(rename = "ID", alias = "id")]
    pub id: PersonId,
    #[serde(rename = "FirstName", alias = "first_name", default)]
    pub first_name: String,
    #[serde(rename = "Gender", alias = "gender", default)]
    pub gender: Gender,
}

impl PersonRecord {
    pub fn new(id: u64, first_name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: PersonId(id),
            first_name: first_name.into(),
            gender,
        }
    }
}

/// A union record as loaded from the marriages file. When `id` is missing
/// the graph allocates the next free one.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct UnionRecord {
    #[serde(rename = "ID", alias = "id", default)]
    pub id: Option<UnionId>,
    #[serde(rename = "Person1", alias = "principal1")]
    pub principal1: PersonId,
    #[serde(rename = "Person2", alias = "principal2")]
    pub principal2: PersonId,
    #[serde(rename = "Children", alias = "children", default)]
    pub children: Vec<PersonId>,
}

impl UnionRecord {
    pub fn new(principal1: u64, principal2: u64, children: &[u64]) -> Self {
        Self {
            id: None,
            principal1: PersonId(principal1),
            principal2: PersonId(principal2),
            children: children.iter().copied().map(PersonId).collect(),
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(UnionId(id));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub gender: Gender,
    pub(crate) parents: Vec<PersonId>,
    pub(crate) children: Vec<PersonId>,
    pub(crate) spouses: Vec<PersonId>,
    pub(crate) unions: Vec<UnionId>,
}

impl Person {
    pub(crate) fn new(record: PersonRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            gender: record.gender,
            parents: Vec::new(),
            children: Vec::new(),
            spouses: Vec::new(),
            unions: Vec::new(),
        }
    }

    pub fn parents(&self) -> &[PersonId] {
        &self.parents
    }

    pub fn children(&self) -> &[PersonId] {
        &self.children
    }

    pub fn spouses(&self) -> &[PersonId] {
        &self.spouses
    }

    pub fn unions(&self) -> &[UnionId] {
        &self.unions
    }

    pub fn label(&self) -> &str {
        &self.first_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Union {
    pub id: UnionId,
    pub principal1: PersonId,
    pub principal2: PersonId,
    pub children: Vec<PersonId>,
}

impl Union {
    pub fn principals(&self) -> [PersonId; 2] {
        [self.principal1, self.principal2]
    }
}

/// Push unless already present; keeps first-insertion order.
pub(crate) fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}
