//! Local layout of a family tree around a focus person
//!
//! The layout works on a bounded neighborhood of a [`FamilyGraph`]: people
//! are ranked by generation relative to the focus, each rank is ordered to
//! keep couples and siblings together with few crossings, and coordinates
//! are solved so that parents sit above their children.
//!
//! # Layout Engines
//!
//! - [`LayeredLayout`]: layered layout of parents, spouses and children
//!
//! # Example
//!
//! ```
//! use lineage_data::{FamilyGraph, Gender, PersonId, PersonRecord, UnionRecord};
//! use lineage_layout::{LayeredLayout, LayoutEngine, Point, Vec2};
//!
//! // A couple with two children
//! let graph = FamilyGraph::from_records(
//!     [
//!         PersonRecord::new(1, "Ada", Gender::Female),
//!         PersonRecord::new(2, "Bo", Gender::Male),
//!         PersonRecord::new(3, "Cy", Gender::Male),
//!         PersonRecord::new(4, "Di", Gender::Female),
//!     ],
//!     [UnionRecord::new(1, 2, &[3, 4])],
//! )
//! .unwrap();
//!
//! // Create a layout engine
//! let engine = LayeredLayout::new(Vec2::new(180.0, 140.0));
//!
//! // Use the LayoutEngine trait (simple, single-phase):
//! let layout = engine.layout(&graph, PersonId(1)).unwrap();
//! assert_eq!(layout.positions[&PersonId(1)], Point::new(0.0, 0.0));
//!
//! // Or directly by calling each step for better control
//! let layers = engine.compute_layers(&graph, PersonId(1)).unwrap();
//! let positions = engine.compute_positions(&layers);
//! assert_eq!(positions, layout.positions);
//! ```

mod engine;
mod geometry;

pub mod layered;

pub use engine::{FamilyLayout, LayoutEngine, UnionPayload};
pub use geometry::{Point, Vec2};

pub use layered::{LayeredLayout, LayeredLayoutError, Layers};
