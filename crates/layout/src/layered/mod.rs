mod crossings;
mod layers;
mod ordering;
mod positions;

use crate::{FamilyLayout, LayoutEngine, Point, UnionPayload, Vec2};
use lineage_data::{FamilyGraph, GraphError, NeighborhoodLimits, PersonId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crossings::count_crossings;
use layers::{assign_local_ranks, bucket_ranks, build_frame, Frame};
use ordering::order_layers;
use positions::assign_coordinates;

#[derive(Debug, Error)]
pub enum LayeredLayoutError {
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Configuration for the layered family layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayeredLayout {
    /// Generations explored above the focus person
    pub max_up: u32,

    /// Generations explored below the focus person
    pub max_down: u32,

    /// Maximum number of people in the layout, the focus included
    pub max_nodes: usize,

    /// Horizontal distance between ordering slots and vertical distance
    /// between ranks
    pub spacing: Vec2,

    /// Number of down-and-up ordering sweeps
    pub sweeps: usize,

    /// Horizontal distance between the two members of a couple
    pub spouse_spacing: f32,

    /// Minimum horizontal gap between neighbouring couples or singles
    pub min_gap: f32,

    /// Number of forward and backward separation passes per rank
    pub position_passes: usize,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            max_up: 2,
            max_down: 2,
            max_nodes: 200,
            spacing: Vec2::new(180.0, 140.0),
            sweeps: 6,
            spouse_spacing: 180.0,
            min_gap: 180.0,
            position_passes: 3,
        }
    }
}

impl LayeredLayout {
    /// Create a new layered layout with the given spacing
    pub fn new(spacing: Vec2) -> Self {
        Self {
            spacing,
            ..Default::default()
        }
    }

    /// Traversal budgets used to extract the neighborhood
    pub fn limits(&self) -> NeighborhoodLimits {
        NeighborhoodLimits {
            max_up: self.max_up,
            max_down: self.max_down,
            max_nodes: self.max_nodes,
        }
    }
}

/// Layer structure that can be cached and reused
#[derive(Debug, Clone)]
pub struct Layers {
    /// The focus person
    pub center: PersonId,

    /// Included people in discovery order
    pub people: Vec<PersonId>,

    pub(crate) frame: Frame,

    /// Rank of the first layer, the focus being at rank 0
    pub min_rank: i32,

    /// People organized into ordered ranks, top to bottom
    pub nodes: Vec<Vec<PersonId>>,

    /// Number of parent to child edge crossings (quality metric)
    pub crossings: usize,
}

impl Layers {
    /// Rank of an included person relative to the focus
    pub fn rank(&self, person: PersonId) -> Option<i32> {
        self.frame
            .rank(person)
            .map(|layer| layer as i32 + self.min_rank)
    }
}

impl LayeredLayout {
    /// Compute layer structure (expensive, cache this)
    ///
    /// This phase extracts the neighborhood of `center`, ranks it and orders
    /// every rank. It only depends on the graph and the traversal budgets,
    /// not on spacing.
    ///
    /// # Errors
    /// Returns an error if `center` is not in the graph
    pub fn compute_layers(
        &self,
        graph: &FamilyGraph,
        center: PersonId,
    ) -> Result<Layers, LayeredLayoutError> {
        let neighborhood = graph.neighborhood(center, &self.limits())?;
        let unions = graph.local_unions(&neighborhood);
        let ranks = assign_local_ranks(graph, &neighborhood)?;
        let (min_rank, mut nodes) = bucket_ranks(&ranks);
        let frame = build_frame(graph, &neighborhood, &unions, &ranks, min_rank)?;

        order_layers(&frame, &mut nodes, self.sweeps);
        let crossings = count_crossings(&frame.edges, &nodes);
        debug!(
            "Layered {} people and {} unions around {center} into {} ranks with {crossings} crossings",
            neighborhood.len(),
            frame.unions.len(),
            nodes.len(),
        );

        Ok(Layers {
            center,
            people: neighborhood.people().iter().copied().collect(),
            frame,
            min_rank,
            nodes,
            crossings,
        })
    }

    /// Compute positions from cached layers (cheap, rerun when spacing changes)
    ///
    /// The focus person ends up at `(0, 0)`.
    pub fn compute_positions(&self, layers: &Layers) -> BTreeMap<PersonId, Point> {
        let positions = assign_coordinates(&layers.frame, &layers.nodes, layers.min_rank, self);
        let origin = positions
            .get(&layers.center)
            .copied()
            .unwrap_or(Point::new(0.0, 0.0));

        positions
            .into_iter()
            .map(|(person, point)| (person, point.relative_to(origin)))
            .collect()
    }
}

fn assemble(layers: Layers, positions: BTreeMap<PersonId, Point>) -> FamilyLayout {
    let unions = layers
        .frame
        .unions
        .iter()
        .filter(|union| union.principals.iter().any(|p| positions.contains_key(p)))
        .map(|union| UnionPayload {
            id: union.id,
            spouses: union.principals,
            children: union
                .children
                .iter()
                .copied()
                .filter(|c| positions.contains_key(c))
                .collect(),
        })
        .collect();

    FamilyLayout {
        center: layers.center,
        people: layers.people,
        unions,
        positions,
    }
}

impl LayoutEngine for LayeredLayout {
    type Error = LayeredLayoutError;

    fn layout(&self, graph: &FamilyGraph, center: PersonId) -> Result<FamilyLayout, Self::Error> {
        let layers = self.compute_layers(graph, center)?;
        let positions = self.compute_positions(&layers);
        Ok(assemble(layers, positions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_data::{Gender, PersonRecord, UnionRecord};
    use test_log::test;

    fn family() -> FamilyGraph {
        // 1 + 2 -> 3, 4 ; 3 + 5 -> 6
        FamilyGraph::from_records(
            (1..=6).map(|id| PersonRecord::new(id, format!("p{id}"), Gender::Unknown)),
            [UnionRecord::new(1, 2, &[3, 4]), UnionRecord::new(3, 5, &[6])],
        )
        .unwrap()
    }

    #[test]
    fn layers_report_ranks_relative_to_the_focus() {
        let layers = LayeredLayout::default()
            .compute_layers(&family(), PersonId(3))
            .unwrap();

        assert_eq!(layers.min_rank, -1);
        assert_eq!(layers.nodes.len(), 3);
        assert_eq!(layers.rank(PersonId(1)), Some(-1));
        assert_eq!(layers.rank(PersonId(5)), Some(0));
        assert_eq!(layers.rank(PersonId(6)), Some(1));
        assert_eq!(layers.rank(PersonId(42)), None);
        // Both parents reach both children, so their inner edges cross once.
        assert_eq!(layers.crossings, 1);
    }

    #[test]
    fn spacing_only_changes_positions() {
        let graph = family();
        let narrow = LayeredLayout::default();
        let wide = LayeredLayout {
            spacing: Vec2::new(400.0, 300.0),
            ..Default::default()
        };

        let layers = narrow.compute_layers(&graph, PersonId(3)).unwrap();
        let again = wide.compute_layers(&graph, PersonId(3)).unwrap();
        assert_eq!(layers.nodes, again.nodes);

        let positions = wide.compute_positions(&layers);
        assert_eq!(positions[&PersonId(3)], Point::new(0.0, 0.0));
        assert_eq!(positions[&PersonId(6)].y, 300.0);
        assert_eq!(positions[&PersonId(1)].y, -300.0);
    }

    #[test]
    fn config_reads_partial_ron() {
        let config: LayeredLayout = ron::from_str("(max_up: 4, spacing: (x: 100.0, y: 80.0))").unwrap();
        assert_eq!(config.max_up, 4);
        assert_eq!(config.spacing, Vec2::new(100.0, 80.0));
        assert_eq!(config.sweeps, 6);
    }

    #[test]
    fn unknown_focus_is_an_error() {
        let err = LayeredLayout::default()
            .layout(&family(), PersonId(99))
            .unwrap_err();
        assert!(matches!(
            err,
            LayeredLayoutError::Graph(GraphError::PersonNotFound(PersonId(99)))
        ));
    }
}
