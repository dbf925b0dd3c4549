use crate::graph::FamilyGraph;
use crate::model::PersonId;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Global generation of every person in a graph.
///
/// Parents sit one generation above their children, spouses share a
/// generation and the oldest generation found is the last bucket. Each
/// connected component is seeded independently, then everything is shifted
/// so the smallest generation is 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generations {
    ranks: HashMap<PersonId, usize>,
    buckets: Vec<Vec<PersonId>>,
}

impl Generations {
    pub fn compute(graph: &FamilyGraph) -> Self {
        let mut raw: HashMap<PersonId, i64> = HashMap::with_capacity(graph.len());
        let mut components = 0;

        for seed in graph.people() {
            if raw.contains_key(&seed.id) {
                continue;
            }
            components += 1;
            propagate(graph, seed.id, &mut raw);
        }

        let min = raw.values().copied().min().unwrap_or(0);
        let ranks: HashMap<PersonId, usize> = raw
            .into_iter()
            .map(|(id, rank)| (id, (rank - min) as usize))
            .collect();

        let depth = ranks.values().copied().max().map_or(0, |max| max + 1);
        let mut buckets = vec![Vec::new(); depth];
        for person in graph.people() {
            if let Some(&rank) = ranks.get(&person.id) {
                buckets[rank].push(person.id);
            }
        }

        debug!(
            "Assigned {} generations over {components} components",
            buckets.len()
        );
        Self { ranks, buckets }
    }

    pub fn rank(&self, person: PersonId) -> Option<usize> {
        self.ranks.get(&person).copied()
    }

    /// People grouped by generation, youngest first, in graph order
    pub fn buckets(&self) -> &[Vec<PersonId>] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Flood one component from `seed` at rank 0. A rank is written once, when
/// the person is first reached, so cycles in the data stop the walk.
fn propagate(graph: &FamilyGraph, seed: PersonId, ranks: &mut HashMap<PersonId, i64>) {
    let mut frontier = VecDeque::from([seed]);
    ranks.insert(seed, 0);

    while let Some(id) = frontier.pop_front() {
        let Some(person) = graph.get_person(id) else {
            continue;
        };
        let rank = ranks[&id];

        let neighbours = person
            .parents()
            .iter()
            .map(|&p| (p, rank + 1))
            .chain(person.children().iter().map(|&c| (c, rank - 1)))
            .chain(person.spouses().iter().map(|&s| (s, rank)));

        for (next, next_rank) in neighbours {
            if !ranks.contains_key(&next) {
                ranks.insert(next, next_rank);
                frontier.push_back(next);
            }
        }
    }
}

impl FamilyGraph {
    pub fn generations(&self) -> Generations {
        Generations::compute(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, PersonRecord, UnionRecord};
    use test_log::test;

    fn graph(ids: &[u64], unions: Vec<UnionRecord>) -> FamilyGraph {
        FamilyGraph::from_records(
            ids.iter()
                .map(|&id| PersonRecord::new(id, format!("p{id}"), Gender::Unknown)),
            unions,
        )
        .unwrap()
    }

    #[test]
    fn parents_are_one_above_children_and_spouses_match() {
        // 1 + 2 -> 3 ; 3 + 4 -> 5
        let graph = graph(
            &[5, 1, 2, 3, 4],
            vec![UnionRecord::new(1, 2, &[3]), UnionRecord::new(3, 4, &[5])],
        );
        let gens = graph.generations();

        let rank = |id| gens.rank(PersonId(id)).unwrap();
        assert_eq!(rank(5), 0);
        assert_eq!(rank(3), 1);
        assert_eq!(rank(4), 1);
        assert_eq!(rank(1), 2);
        assert_eq!(rank(2), 2);
        assert_eq!(
            gens.buckets(),
            &[
                vec![PersonId(5)],
                vec![PersonId(3), PersonId(4)],
                vec![PersonId(1), PersonId(2)],
            ]
        );
    }

    #[test]
    fn disconnected_components_are_normalized_together() {
        // 1 + 8 -> 2 ; 2 + 9 -> 3, seeded from the youngest person.
        let graph = graph(
            &[3, 9, 1, 2, 8],
            vec![UnionRecord::new(1, 8, &[2]), UnionRecord::new(2, 9, &[3])],
        );
        let gens = graph.generations();
        assert_eq!(gens.rank(PersonId(3)), Some(0));
        assert_eq!(gens.rank(PersonId(2)), Some(1));
        assert_eq!(gens.rank(PersonId(9)), Some(1));
        assert_eq!(gens.rank(PersonId(1)), Some(2));
        assert_eq!(gens.len(), 3);

        let lonely = graph_with_island();
        let gens = lonely.generations();
        // The island is seeded at 0 on its own, then shifted like everyone else.
        assert_eq!(gens.rank(PersonId(10)), Some(1));
        assert_eq!(gens.rank(PersonId(12)), Some(0));
        assert_eq!(gens.rank(PersonId(20)), Some(1));
    }

    fn graph_with_island() -> FamilyGraph {
        graph(&[10, 11, 12, 20], vec![UnionRecord::new(10, 11, &[12])])
    }

    #[test]
    fn pedigree_collapse_terminates() {
        // Cousins 5 and 6 marry; they share grandparents 1 and 2.
        let graph = graph(
            &[1, 2, 3, 4, 5, 6, 7, 8, 9],
            vec![
                UnionRecord::new(1, 2, &[3, 4]),
                UnionRecord::new(3, 7, &[5]),
                UnionRecord::new(4, 8, &[6]),
                UnionRecord::new(5, 6, &[9]),
            ],
        );
        let gens = graph.generations();
        assert_eq!(gens.rank(PersonId(9)), Some(0));
        assert_eq!(gens.rank(PersonId(5)), gens.rank(PersonId(6)));
        assert_eq!(gens.rank(PersonId(1)), Some(3));
        assert_eq!(gens.buckets().iter().map(Vec::len).sum::<usize>(), 9);
    }

    #[test]
    fn every_edge_is_consistent_on_a_tree() {
        let graph = graph(
            &[1, 2, 3, 4, 5, 6, 7],
            vec![
                UnionRecord::new(1, 2, &[3, 4]),
                UnionRecord::new(4, 5, &[6, 7]),
            ],
        );
        let gens = graph.generations();
        for union in graph.unions() {
            let [a, b] = union.principals();
            assert_eq!(gens.rank(a), gens.rank(b));
            for &child in &union.children {
                assert_eq!(gens.rank(a).unwrap(), gens.rank(child).unwrap() + 1);
            }
        }
    }

    #[test]
    fn empty_graph_has_no_generations() {
        let gens = FamilyGraph::new().generations();
        assert!(gens.is_empty());
        assert_eq!(gens.rank(PersonId(1)), None);
    }
}
