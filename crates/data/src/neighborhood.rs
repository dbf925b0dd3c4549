use crate::graph::{FamilyGraph, GraphError};
use crate::model::{PersonId, Union};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Traversal budget around a focus person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodLimits {
    /// Maximum number of parent hops
    pub max_up: u32,
    /// Maximum number of child hops
    pub max_down: u32,
    /// Hard cap on the number of included people, never below 1
    pub max_nodes: usize,
}

impl Default for NeighborhoodLimits {
    fn default() -> Self {
        Self {
            max_up: 2,
            max_down: 2,
            max_nodes: 200,
        }
    }
}

/// Hops consumed in each direction to reach a person. Ordered
/// lexicographically, `(up, down)`.
type Hops = (u32, u32);

/// The people kept around a focus person, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhood {
    pub center: PersonId,
    people: IndexSet<PersonId>,
}

impl Neighborhood {
    pub fn people(&self) -> &IndexSet<PersonId> {
        &self.people
    }

    pub fn contains(&self, person: PersonId) -> bool {
        self.people.contains(&person)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

impl FamilyGraph {
    /// Breadth-first walk from `center` spending at most `max_up` parent hops
    /// and `max_down` child hops. Spouses are free.
    ///
    /// A person is queued again only when reached through a strictly cheaper
    /// `(up, down)` state, which both lets a cheaper path widen what lies
    /// beyond it and stops the walk on kinship loops.
    pub fn neighborhood(
        &self,
        center: PersonId,
        limits: &NeighborhoodLimits,
    ) -> Result<Neighborhood, GraphError> {
        self.person(center)?;
        let max_nodes = limits.max_nodes.max(1);

        let mut included = IndexSet::from([center]);
        let mut best: IndexMap<PersonId, Hops> = IndexMap::from([(center, (0, 0))]);
        let mut queue = VecDeque::from([(center, (0, 0))]);

        'walk: while let Some((id, (up, down))) = queue.pop_front() {
            if included.len() >= max_nodes {
                break;
            }
            let person = self.person(id)?;

            let spouses = person.spouses().iter().map(|&s| (s, (up, down)));
            let parents = person
                .parents()
                .iter()
                .filter(|_| up < limits.max_up)
                .map(|&p| (p, (up + 1, down)));
            let children = person
                .children()
                .iter()
                .filter(|_| down < limits.max_down)
                .map(|&c| (c, (up, down + 1)));

            for (next, hops) in spouses.chain(parents).chain(children) {
                if best.get(&next).is_some_and(|&prev| prev <= hops) {
                    continue;
                }
                best.insert(next, hops);
                included.insert(next);
                queue.push_back((next, hops));
                trace!("Reached {next} at {hops:?}");

                if included.len() >= max_nodes {
                    break 'walk;
                }
            }
        }

        debug!(
            "Neighborhood of {center}: {} people (up {}, down {}, cap {max_nodes})",
            included.len(),
            limits.max_up,
            limits.max_down
        );
        Ok(Neighborhood {
            center,
            people: included,
        })
    }

    /// Unions worth drawing for a set of people: those with both principals
    /// present, or with one principal and at least one child present.
    pub fn local_unions(&self, neighborhood: &Neighborhood) -> Vec<&Union> {
        self.unions()
            .filter(|union| {
                let p1 = neighborhood.contains(union.principal1);
                let p2 = neighborhood.contains(union.principal2);
                let child = union.children.iter().any(|&c| neighborhood.contains(c));
                (p1 && p2) || (child && (p1 || p2))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, PersonRecord, UnionId, UnionRecord};
    use test_log::test;

    fn graph(ids: &[u64], unions: Vec<UnionRecord>) -> FamilyGraph {
        FamilyGraph::from_records(
            ids.iter()
                .map(|&id| PersonRecord::new(id, format!("p{id}"), Gender::Unknown)),
            unions,
        )
        .unwrap()
    }

    fn ids(neighborhood: &Neighborhood) -> Vec<u64> {
        let mut ids: Vec<u64> = neighborhood.people().iter().map(|p| p.0).collect();
        ids.sort();
        ids
    }

    fn limits(max_up: u32, max_down: u32, max_nodes: usize) -> NeighborhoodLimits {
        NeighborhoodLimits {
            max_up,
            max_down,
            max_nodes,
        }
    }

    /// Grandparents 1 + 2, their children 3 and 4; 3 + 5 have 6 and 7;
    /// 6 + 8 have 9.
    fn three_generations() -> FamilyGraph {
        graph(
            &[1, 2, 3, 4, 5, 6, 7, 8, 9],
            vec![
                UnionRecord::new(1, 2, &[3, 4]),
                UnionRecord::new(3, 5, &[6, 7]),
                UnionRecord::new(6, 8, &[9]),
            ],
        )
    }

    #[test]
    fn spouses_are_free_and_children_cost_one_hop() {
        let graph = graph(&[1, 2, 3, 4], vec![UnionRecord::new(1, 2, &[3, 4])]);
        let hood = graph.neighborhood(PersonId(1), &limits(0, 1, 10)).unwrap();
        assert_eq!(ids(&hood), vec![1, 2, 3, 4]);
        assert_eq!(hood.people()[0], PersonId(1));

        let hood = graph.neighborhood(PersonId(1), &limits(0, 0, 10)).unwrap();
        assert_eq!(ids(&hood), vec![1, 2]);
    }

    #[test]
    fn up_budget_limits_ancestors() {
        let graph = three_generations();
        let hood = graph.neighborhood(PersonId(9), &limits(1, 0, 100)).unwrap();
        assert_eq!(ids(&hood), vec![6, 8, 9]);

        let hood = graph.neighborhood(PersonId(9), &limits(2, 0, 100)).unwrap();
        assert_eq!(ids(&hood), vec![3, 5, 6, 8, 9]);
    }

    #[test]
    fn siblings_need_one_hop_each_way() {
        let graph = three_generations();
        let hood = graph.neighborhood(PersonId(6), &limits(1, 1, 100)).unwrap();
        // Up to 3 and 5, back down to 7, down to 9; 4 needs two up hops.
        assert_eq!(ids(&hood), vec![3, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn cheaper_state_reopens_a_person() {
        // 1 + 2 -> 3 ; 2 + 5 -> 6 ; 3 + 4 -> 7 ; 7 marries 6, their
        // grandmother's other child. From 3, 6 is first met as a sibling at
        // (1, 1), then again as the spouse of child 7 at (0, 1).
        let graph = graph(
            &[1, 2, 3, 4, 5, 6, 7],
            vec![
                UnionRecord::new(1, 2, &[3]),
                UnionRecord::new(2, 5, &[6]),
                UnionRecord::new(3, 4, &[7]),
                UnionRecord::new(7, 6, &[]),
            ],
        );
        let hood = graph.neighborhood(PersonId(3), &limits(1, 1, 100)).unwrap();
        assert_eq!(ids(&hood), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            hood.people().iter().map(|p| p.0).collect::<Vec<_>>(),
            vec![3, 4, 1, 2, 7, 5, 6]
        );
    }

    #[test]
    fn pedigree_collapse_terminates() {
        let graph = graph(
            &[1, 2, 3, 4, 5, 6, 7, 8, 9],
            vec![
                UnionRecord::new(1, 2, &[3, 4]),
                UnionRecord::new(3, 7, &[5]),
                UnionRecord::new(4, 8, &[6]),
                UnionRecord::new(5, 6, &[9]),
            ],
        );
        let hood = graph
            .neighborhood(PersonId(9), &limits(10, 10, 1000))
            .unwrap();
        assert_eq!(hood.len(), 9);
    }

    #[test]
    fn node_cap_truncates_deterministically() {
        let graph = three_generations();
        let first = graph.neighborhood(PersonId(6), &limits(3, 3, 4)).unwrap();
        assert_eq!(first.len(), 4);
        assert!(first.contains(PersonId(6)));
        for _ in 0..10 {
            let again = graph.neighborhood(PersonId(6), &limits(3, 3, 4)).unwrap();
            assert_eq!(again, first);
        }
        // Spouse first, then parents, in stored order.
        assert_eq!(
            first.people().iter().copied().collect::<Vec<_>>(),
            vec![PersonId(6), PersonId(8), PersonId(3), PersonId(5)]
        );
    }

    #[test]
    fn cap_of_one_or_zero_keeps_only_the_focus() {
        let graph = three_generations();
        for cap in [0, 1] {
            let hood = graph.neighborhood(PersonId(3), &limits(2, 2, cap)).unwrap();
            assert_eq!(ids(&hood), vec![3]);
            assert!(graph.local_unions(&hood).is_empty());
        }
    }

    #[test]
    fn unknown_focus_is_not_found() {
        let graph = three_generations();
        assert_eq!(
            graph
                .neighborhood(PersonId(42), &NeighborhoodLimits::default())
                .unwrap_err(),
            GraphError::PersonNotFound(PersonId(42))
        );
    }

    #[test]
    fn local_unions_keep_half_present_parents() {
        let graph = three_generations();
        // 6 alone with parent 3: 3 + 5 is kept through its child.
        let hood = graph.neighborhood(PersonId(6), &limits(1, 0, 3)).unwrap();
        assert_eq!(ids(&hood), vec![3, 6, 8]);
        let unions: Vec<UnionId> = graph.local_unions(&hood).iter().map(|u| u.id).collect();
        assert_eq!(unions, vec![UnionId(1), UnionId(2)]);

        // Grandparents' union is dropped: child 3 is here but neither parent.
        let hood = graph.neighborhood(PersonId(3), &limits(0, 0, 10)).unwrap();
        let unions: Vec<UnionId> = graph.local_unions(&hood).iter().map(|u| u.id).collect();
        assert_eq!(unions, vec![UnionId(1)]);
    }
}
