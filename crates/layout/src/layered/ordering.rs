use super::layers::Frame;
use lineage_data::{PersonId, UnionId};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Reorder every layer with a fixed number of barycenter sweeps
///
/// Each sweep goes down ordering children by their parents' positions, then
/// up ordering couples and singles by their children's positions, and pulls
/// unambiguous spouses next to each other after each direction.
pub(crate) fn order_layers(frame: &Frame, layers: &mut [Vec<PersonId>], sweeps: usize) {
    for sweep in 0..sweeps {
        for layer in 1..layers.len() {
            order_by_parents(frame, layers, layer);
        }
        enforce_spouse_adjacency(frame, layers);

        for layer in (0..layers.len().saturating_sub(1)).rev() {
            order_by_children(frame, layers, layer);
        }
        enforce_spouse_adjacency(frame, layers);

        trace!("Order after sweep {sweep}: {layers:?}");
    }
}

pub(crate) fn index_of(layer: &[PersonId]) -> HashMap<PersonId, usize> {
    layer.iter().enumerate().map(|(i, &p)| (p, i)).collect()
}

fn mean(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tiebreak {
    Union(UnionId),
    Person(PersonId),
}

/// People moved as one while sorting a layer
#[derive(Debug)]
struct Block {
    /// 0 for sibling groups and couples, 1 for singles
    kind: u8,
    barycenter: f32,
    tiebreak: Tiebreak,
    members: Vec<PersonId>,
}

fn flatten(mut blocks: Vec<Block>) -> Vec<PersonId> {
    blocks.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.barycenter.total_cmp(&b.barycenter))
            .then_with(|| a.tiebreak.cmp(&b.tiebreak))
    });
    blocks.into_iter().flat_map(|block| block.members).collect()
}

/// Downward step: sibling groups stay together under their parents, everyone
/// else follows the mean position of their own parents.
fn order_by_parents(frame: &Frame, layers: &mut [Vec<PersonId>], layer: usize) {
    if layers[layer].is_empty() {
        return;
    }
    let above = index_of(&layers[layer - 1]);
    let current = index_of(&layers[layer]);
    let mut used = HashSet::new();
    let mut blocks = Vec::new();

    for union in &frame.unions {
        if union
            .principals
            .iter()
            .any(|&p| frame.rank(p) != Some(layer - 1))
        {
            continue;
        }
        let mut siblings: Vec<PersonId> = union
            .children
            .iter()
            .copied()
            .filter(|c| current.contains_key(c) && !used.contains(c))
            .collect();
        if siblings.len() <= 1 {
            continue;
        }
        siblings.sort_by_key(|c| (current[c], *c));
        used.extend(siblings.iter().copied());

        let barycenter = mean(
            union
                .principals
                .iter()
                .filter_map(|p| above.get(p))
                .map(|&i| i as f32),
        )
        .unwrap_or(0.0);
        blocks.push(Block {
            kind: 0,
            barycenter,
            tiebreak: Tiebreak::Union(union.id),
            members: siblings,
        });
    }

    for &person in &layers[layer] {
        if !used.insert(person) {
            continue;
        }
        let barycenter = mean(
            frame
                .parents(person)
                .filter_map(|p| above.get(&p))
                .map(|&i| i as f32),
        )
        .unwrap_or(current[&person] as f32);
        blocks.push(Block {
            kind: 1,
            barycenter,
            tiebreak: Tiebreak::Person(person),
            members: vec![person],
        });
    }

    layers[layer] = flatten(blocks);
}

/// Upward step: couples stay together above their children, everyone else
/// follows the mean position of their own children.
fn order_by_children(frame: &Frame, layers: &mut [Vec<PersonId>], layer: usize) {
    if layers[layer].is_empty() {
        return;
    }
    let below = index_of(&layers[layer + 1]);
    let current = index_of(&layers[layer]);
    let mut used = HashSet::new();
    let mut blocks = Vec::new();

    for union in &frame.unions {
        let [p1, p2] = union.principals;
        let (Some(&i1), Some(&i2)) = (current.get(&p1), current.get(&p2)) else {
            continue;
        };
        if used.contains(&p1) || used.contains(&p2) {
            continue;
        }
        used.insert(p1);
        used.insert(p2);

        let barycenter = mean(
            union
                .children
                .iter()
                .filter_map(|c| below.get(c))
                .map(|&i| i as f32),
        )
        .unwrap_or((i1 + i2) as f32 / 2.0);
        let members = if i1 <= i2 { vec![p1, p2] } else { vec![p2, p1] };
        blocks.push(Block {
            kind: 0,
            barycenter,
            tiebreak: Tiebreak::Union(union.id),
            members,
        });
    }

    for &person in &layers[layer] {
        if !used.insert(person) {
            continue;
        }
        let barycenter = mean(
            frame
                .children(person)
                .filter_map(|c| below.get(&c))
                .map(|&i| i as f32),
        )
        .unwrap_or(current[&person] as f32);
        blocks.push(Block {
            kind: 1,
            barycenter,
            tiebreak: Tiebreak::Person(person),
            members: vec![person],
        });
    }

    layers[layer] = flatten(blocks);
}

/// First and last position of the sibling group `person` belongs to, if it
/// has more than one member on this layer
fn sibling_bounds(
    frame: &Frame,
    person: PersonId,
    index: &HashMap<PersonId, usize>,
) -> Option<(usize, usize)> {
    let union = frame.union_of_child(person)?;
    let positions: Vec<usize> = union
        .children
        .iter()
        .filter_map(|c| index.get(c).copied())
        .collect();
    if positions.len() <= 1 {
        return None;
    }
    let first = positions.iter().copied().min()?;
    let last = positions.iter().copied().max()?;
    Some((first, last))
}

/// Move one spouse of every unambiguous same-rank couple right next to the
/// other, at a free end of the anchor's sibling group when it has one.
fn enforce_spouse_adjacency(frame: &Frame, layers: &mut [Vec<PersonId>]) {
    for layer in 0..layers.len() {
        for union in frame.couples(layer) {
            let [p1, p2] = union.principals;
            let order = &mut layers[layer];
            let index = index_of(order);
            let (Some(&i1), Some(&i2)) = (index.get(&p1), index.get(&p2)) else {
                continue;
            };
            if i1.abs_diff(i2) <= 1 {
                continue;
            }

            let in_block1 = sibling_bounds(frame, p1, &index).is_some();
            let in_block2 = sibling_bounds(frame, p2, &index).is_some();
            let (anchor, mover) = match (in_block1, in_block2) {
                (true, false) => (p1, p2),
                (false, true) => (p2, p1),
                _ if p2 < p1 => (p2, p1),
                _ => (p1, p2),
            };

            order.remove(index[&mover]);
            let index = index_of(order);
            let Some(&anchor_at) = index.get(&anchor) else {
                continue;
            };
            // An anchor inside a sibling block moves to one end of it so the
            // mover can sit right next to it without splitting the block. An
            // end already holding a sibling paired with an outside spouse is
            // left alone.
            let insert_at = match sibling_bounds(frame, anchor, &index) {
                Some((first, last)) => {
                    let paired = |end: usize, outside: Option<usize>| {
                        let sibling = order[end];
                        sibling != anchor
                            && outside
                                .and_then(|at| order.get(at))
                                .is_some_and(|&spouse| frame.are_spouses(sibling, spouse))
                    };
                    let start_taken = paired(first, first.checked_sub(1));
                    let end_taken = paired(last, Some(last + 1));
                    let to_start = match (start_taken, end_taken) {
                        (false, true) => true,
                        (true, false) => false,
                        _ => anchor_at - first < last - anchor_at,
                    };

                    let anchor = order.remove(anchor_at);
                    if to_start {
                        order.insert(first, anchor);
                        first
                    } else {
                        order.insert(last, anchor);
                        last + 1
                    }
                }
                None => anchor_at + 1,
            };
            order.insert(insert_at.min(order.len()), mover);
            trace!("Moved {mover} next to spouse {anchor}");
        }
    }
}
