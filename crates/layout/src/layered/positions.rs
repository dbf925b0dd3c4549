use super::layers::Frame;
use super::ordering::index_of;
use super::LayeredLayout;
use crate::Point;
use lineage_data::PersonId;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::trace;

/// A couple or a single person positioned as one unit
#[derive(Debug)]
struct Atom {
    /// Members in ordering order
    members: Vec<PersonId>,
    width: f32,
    centre: f32,
}

/// Assign coordinates to every ordered person
///
/// Ranks are solved from the deepest up so that each couple or single can be
/// centred over the children already placed below it.
pub(crate) fn assign_coordinates(
    frame: &Frame,
    layers: &[Vec<PersonId>],
    min_rank: i32,
    config: &LayeredLayout,
) -> BTreeMap<PersonId, Point> {
    // Initial positioning
    let mut xs: HashMap<PersonId, f32> = layers
        .iter()
        .flat_map(|layer| {
            layer
                .iter()
                .enumerate()
                .map(|(i, &person)| (person, i as f32 * config.spacing.x))
        })
        .collect();

    for layer in (0..layers.len()).rev() {
        let mut atoms = build_atoms(frame, &layers[layer], layer, &xs, config.spouse_spacing);
        separate(&mut atoms, config.min_gap, config.position_passes);

        for atom in &atoms {
            let left = atom.centre - atom.width / 2.0;
            let step = if atom.members.len() > 1 { atom.width } else { 0.0 };
            for (i, &person) in atom.members.iter().enumerate() {
                xs.insert(person, left + i as f32 * step);
            }
        }
        trace!("Placed layer {layer}: {atoms:?}");
    }

    let mut positions = BTreeMap::new();
    for (layer, people) in layers.iter().enumerate() {
        let y = (layer as i32 + min_rank) as f32 * config.spacing.y;
        for person in people {
            if let Some(&x) = xs.get(person) {
                positions.insert(*person, Point::new(x, y));
            }
        }
    }
    positions
}

fn build_atoms(
    frame: &Frame,
    order: &[PersonId],
    layer: usize,
    xs: &HashMap<PersonId, f32>,
    spouse_spacing: f32,
) -> Vec<Atom> {
    let index = index_of(order);
    let mut placed = HashSet::new();
    // Members, width and the children the atom is centred over
    let mut groups: Vec<(Vec<PersonId>, f32, Vec<PersonId>)> = Vec::new();

    for union in frame.couples(layer) {
        let [p1, p2] = union.principals;
        if placed.contains(&p1) || placed.contains(&p2) {
            continue;
        }
        let (Some(&i1), Some(&i2)) = (index.get(&p1), index.get(&p2)) else {
            continue;
        };
        placed.insert(p1);
        placed.insert(p2);
        let members = if i1 <= i2 { vec![p1, p2] } else { vec![p2, p1] };
        groups.push((members, spouse_spacing, union.children.clone()));
    }
    for &person in order {
        if placed.insert(person) {
            groups.push((vec![person], 0.0, frame.children(person).collect()));
        }
    }

    let mut atoms: Vec<Atom> = groups
        .into_iter()
        .map(|(members, width, children)| {
            let centre = desired_centre(frame, &members, &children, layer, xs);
            Atom {
                members,
                width,
                centre,
            }
        })
        .collect();

    let first_slot = |atom: &Atom| {
        let slot = atom.members.iter().filter_map(|p| index.get(p)).min().copied();
        (slot, atom.members.first().copied())
    };
    atoms.sort_by_key(first_slot);
    atoms
}

/// Midpoint of the given children placed one rank below, or of the members
/// themselves when there are none. A couple only counts the children of its
/// own union.
fn desired_centre(
    frame: &Frame,
    members: &[PersonId],
    children: &[PersonId],
    layer: usize,
    xs: &HashMap<PersonId, f32>,
) -> f32 {
    let children: Vec<f32> = children
        .iter()
        .filter(|&&child| frame.rank(child) == Some(layer + 1))
        .filter_map(|child| xs.get(child).copied())
        .collect();
    let own: Vec<f32> = members.iter().filter_map(|m| xs.get(m).copied()).collect();

    let xs = if children.is_empty() { own } else { children };
    let min = xs.iter().copied().fold(f32::INFINITY, f32::min);
    let max = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if min.is_finite() && max.is_finite() {
        (min + max) / 2.0
    } else {
        0.0
    }
}

/// Push atoms apart until neighbouring extents are at least `min_gap` apart
///
/// A forward pass shifts atoms right, a backward pass shifts them left. The
/// backward pass runs last so the result always satisfies the gap.
fn separate(atoms: &mut [Atom], min_gap: f32, passes: usize) {
    let distance = |a: &Atom, b: &Atom| a.width / 2.0 + min_gap + b.width / 2.0;

    for _ in 0..passes.max(1) {
        for i in 1..atoms.len() {
            let lowest = atoms[i - 1].centre + distance(&atoms[i - 1], &atoms[i]);
            if atoms[i].centre < lowest {
                atoms[i].centre = lowest;
            }
        }
        for i in (0..atoms.len().saturating_sub(1)).rev() {
            let highest = atoms[i + 1].centre - distance(&atoms[i], &atoms[i + 1]);
            if atoms[i].centre > highest {
                atoms[i].centre = highest;
            }
        }
    }
}
