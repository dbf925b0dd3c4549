use crate::model::{push_unique, Person, PersonId, PersonRecord, Union, UnionId, UnionRecord};
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised while building or querying a [`FamilyGraph`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("no person with id {0}")]
    PersonNotFound(PersonId),

    #[error("person {0} is defined twice")]
    DuplicatePerson(PersonId),

    #[error("union {0} is defined twice")]
    DuplicateUnion(UnionId),

    #[error("union {union} references unknown person {person}")]
    UnknownMember { union: UnionId, person: PersonId },

    #[error("union {union} has {person} as both principals")]
    SelfUnion { union: UnionId, person: PersonId },
}

/// People and the unions between them, with parent, child and spouse links
/// registered on both sides of every union.
///
/// Iteration follows insertion order, which is what makes every traversal
/// over the graph reproducible.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    people: IndexMap<PersonId, Person>,
    unions: IndexMap<UnionId, Union>,
    next_union: u32,
}

impl FamilyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from people records, then union records.
    pub fn from_records(
        people: impl IntoIterator<Item = PersonRecord>,
        unions: impl IntoIterator<Item = UnionRecord>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for record in people {
            graph.add_person(record)?;
        }
        for record in unions {
            graph.add_union(record)?;
        }
        debug!(
            "Built family graph with {} people and {} unions",
            graph.people.len(),
            graph.unions.len()
        );
        Ok(graph)
    }

    pub fn add_person(&mut self, record: PersonRecord) -> Result<PersonId, GraphError> {
        let id = record.id;
        if self.people.contains_key(&id) {
            return Err(GraphError::DuplicatePerson(id));
        }
        self.people.insert(id, Person::new(record));
        Ok(id)
    }

    /// Register a union and link its members together.
    ///
    /// Every member is checked before anything is written, so a failing
    /// call leaves the graph untouched.
    pub fn add_union(&mut self, record: UnionRecord) -> Result<UnionId, GraphError> {
        let id = match record.id {
            Some(id) if self.unions.contains_key(&id) => {
                return Err(GraphError::DuplicateUnion(id))
            }
            Some(id) => id,
            None => self.next_free_union_id(),
        };
        let allocated = record.id.is_none();

        let UnionRecord {
            principal1,
            principal2,
            children,
            ..
        } = record;

        if principal1 == principal2 {
            return Err(GraphError::SelfUnion {
                union: id,
                person: principal1,
            });
        }
        for person in [principal1, principal2].iter().chain(children.iter()) {
            if !self.people.contains_key(person) {
                return Err(GraphError::UnknownMember {
                    union: id,
                    person: *person,
                });
            }
        }

        let mut union_children = Vec::with_capacity(children.len());
        for child in children {
            push_unique(&mut union_children, child);
        }

        for (principal, spouse) in [(principal1, principal2), (principal2, principal1)] {
            let person = self.person_mut(principal)?;
            push_unique(&mut person.spouses, spouse);
            push_unique(&mut person.unions, id);
            for &child in &union_children {
                push_unique(&mut person.children, child);
            }
        }
        for &child in &union_children {
            let person = self.person_mut(child)?;
            push_unique(&mut person.parents, principal1);
            push_unique(&mut person.parents, principal2);
        }

        if allocated {
            self.next_union = id.0 + 1;
        }
        trace!("Union {id} between {principal1} and {principal2}");
        self.unions.insert(
            id,
            Union {
                id,
                principal1,
                principal2,
                children: union_children,
            },
        );
        Ok(id)
    }

    /// First generated id not taken yet. Only a successful `add_union`
    /// moves the counter past it.
    fn next_free_union_id(&self) -> UnionId {
        let mut next = self.next_union;
        while self.unions.contains_key(&UnionId(next)) {
            next += 1;
        }
        UnionId(next)
    }

    fn person_mut(&mut self, id: PersonId) -> Result<&mut Person, GraphError> {
        self.people
            .get_mut(&id)
            .ok_or(GraphError::PersonNotFound(id))
    }

    pub fn person(&self, id: PersonId) -> Result<&Person, GraphError> {
        self.people.get(&id).ok_or(GraphError::PersonNotFound(id))
    }

    pub fn get_person(&self, id: PersonId) -> Option<&Person> {
        self.people.get(&id)
    }

    pub fn union(&self, id: UnionId) -> Option<&Union> {
        self.unions.get(&id)
    }

    /// People in insertion order
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    /// Unions in insertion order
    pub fn unions(&self) -> impl Iterator<Item = &Union> {
        self.unions.values()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}
