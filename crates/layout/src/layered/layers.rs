use lineage_data::{FamilyGraph, GraphError, Neighborhood, PersonId, Union, UnionId};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::{HashMap, VecDeque};

/// A union as seen from inside a neighborhood: children outside of it are
/// dropped, principals are kept even when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocalUnion {
    pub id: UnionId,
    pub principals: [PersonId; 2],
    pub children: Vec<PersonId>,
}

/// Everything the ordering and positioning phases need to know about the
/// neighborhood, owned so that [`super::Layers`] can be cached.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    /// Layer index of every local person, 0 being the top rank
    ranks: HashMap<PersonId, usize>,
    pub unions: Vec<LocalUnion>,
    /// Parent to child edges between local people
    pub edges: DiGraphMap<PersonId, ()>,
    /// First union listing each child
    child_union: HashMap<PersonId, usize>,
    /// Number of spouses sharing each person's rank
    same_rank_spouses: HashMap<PersonId, usize>,
}

impl Frame {
    pub fn rank(&self, person: PersonId) -> Option<usize> {
        self.ranks.get(&person).copied()
    }

    pub fn parents(&self, person: PersonId) -> impl Iterator<Item = PersonId> + '_ {
        self.edges.neighbors_directed(person, Direction::Incoming)
    }

    pub fn children(&self, person: PersonId) -> impl Iterator<Item = PersonId> + '_ {
        self.edges.neighbors_directed(person, Direction::Outgoing)
    }

    pub fn union_of_child(&self, child: PersonId) -> Option<&LocalUnion> {
        self.child_union.get(&child).map(|&i| &self.unions[i])
    }

    /// Unions whose principals share the given layer and have no other
    /// spouse on it. Multi-spouse cases are left alone.
    pub fn couples(&self, layer: usize) -> impl Iterator<Item = &LocalUnion> + '_ {
        self.unions.iter().filter(move |union| {
            union
                .principals
                .iter()
                .all(|&p| self.rank(p) == Some(layer) && self.same_rank_spouses(p) <= 1)
        })
    }

    pub fn are_spouses(&self, a: PersonId, b: PersonId) -> bool {
        self.unions
            .iter()
            .any(|union| union.principals == [a, b] || union.principals == [b, a])
    }

    fn same_rank_spouses(&self, person: PersonId) -> usize {
        self.same_rank_spouses.get(&person).copied().unwrap_or(0)
    }
}

/// Rank every local person relative to the focus: spouses share a rank,
/// parents are one rank above (-1) and children one below (+1). The focus
/// stays at rank 0.
pub(crate) fn assign_local_ranks(
    graph: &FamilyGraph,
    neighborhood: &Neighborhood,
) -> Result<HashMap<PersonId, i32>, GraphError> {
    let center = neighborhood.center;
    let mut ranks = HashMap::with_capacity(neighborhood.len());
    if !neighborhood.contains(center) {
        return Ok(ranks);
    }

    ranks.insert(center, 0);
    let mut frontier = VecDeque::from([center]);
    while let Some(id) = frontier.pop_front() {
        let person = graph.person(id)?;
        let rank = ranks[&id];

        let neighbours = person
            .spouses()
            .iter()
            .map(|&s| (s, rank))
            .chain(person.parents().iter().map(|&p| (p, rank - 1)))
            .chain(person.children().iter().map(|&c| (c, rank + 1)));

        for (next, next_rank) in neighbours {
            if neighborhood.contains(next) && !ranks.contains_key(&next) {
                ranks.insert(next, next_rank);
                frontier.push_back(next);
            }
        }
    }

    Ok(ranks)
}

/// Group ranked people into layers covering `[min_rank, max_rank]`, each
/// sorted by id. Returns the rank of the first layer with the layers.
pub(crate) fn bucket_ranks(ranks: &HashMap<PersonId, i32>) -> (i32, Vec<Vec<PersonId>>) {
    let (Some(&min), Some(&max)) = (ranks.values().min(), ranks.values().max()) else {
        return (0, Vec::new());
    };

    let mut layers = vec![Vec::new(); (max - min + 1) as usize];
    for (&person, &rank) in ranks {
        layers[(rank - min) as usize].push(person);
    }
    for layer in &mut layers {
        layer.sort();
    }
    (min, layers)
}

pub(crate) fn build_frame(
    graph: &FamilyGraph,
    neighborhood: &Neighborhood,
    unions: &[&Union],
    ranks: &HashMap<PersonId, i32>,
    min_rank: i32,
) -> Result<Frame, GraphError> {
    let ranks: HashMap<PersonId, usize> = ranks
        .iter()
        .map(|(&person, &rank)| (person, (rank - min_rank) as usize))
        .collect();

    let mut edges = DiGraphMap::new();
    for &person in neighborhood.people() {
        edges.add_node(person);
    }
    for &person in neighborhood.people() {
        for &child in graph.person(person)?.children() {
            if neighborhood.contains(child) {
                edges.add_edge(person, child, ());
            }
        }
    }

    let unions: Vec<LocalUnion> = unions
        .iter()
        .map(|union| LocalUnion {
            id: union.id,
            principals: union.principals(),
            children: union
                .children
                .iter()
                .copied()
                .filter(|&c| neighborhood.contains(c))
                .collect(),
        })
        .collect();

    let mut child_union = HashMap::new();
    let mut same_rank_spouses = HashMap::new();
    for (i, union) in unions.iter().enumerate() {
        for &child in &union.children {
            child_union.entry(child).or_insert(i);
        }

        let [p1, p2] = union.principals;
        match (ranks.get(&p1), ranks.get(&p2)) {
            (Some(r1), Some(r2)) if r1 == r2 => {
                *same_rank_spouses.entry(p1).or_insert(0) += 1;
                *same_rank_spouses.entry(p2).or_insert(0) += 1;
            }
            _ => {}
        }
    }

    Ok(Frame {
        ranks,
        unions,
        edges,
        child_union,
        same_rank_spouses,
    })
}

/// Run the graph side of the pipeline on a small family for unit tests
#[cfg(test)]
pub(crate) fn fixture(
    people: &[u64],
    unions: Vec<lineage_data::UnionRecord>,
    center: u64,
) -> (Frame, i32, Vec<Vec<PersonId>>) {
    use lineage_data::{Gender, NeighborhoodLimits, PersonRecord};

    let graph = FamilyGraph::from_records(
        people
            .iter()
            .map(|&id| PersonRecord::new(id, format!("p{id}"), Gender::Unknown)),
        unions,
    )
    .unwrap();
    let limits = NeighborhoodLimits {
        max_up: 10,
        max_down: 10,
        max_nodes: 1000,
    };
    let hood = graph.neighborhood(PersonId(center), &limits).unwrap();
    let ranks = assign_local_ranks(&graph, &hood).unwrap();
    let (min_rank, layers) = bucket_ranks(&ranks);
    let unions = graph.local_unions(&hood);
    let frame = build_frame(&graph, &hood, &unions, &ranks, min_rank).unwrap();
    (frame, min_rank, layers)
}
