use petgraph::visit::IntoNeighborsDirected;
use petgraph::Direction;
use std::collections::HashMap;
use std::hash::Hash;

/// Count the number of edge crossings between consecutive layers
///
/// Two edges `a -> c` and `b -> d` cross when `a` is left of `b` but `c` is
/// right of `d`. Edges that skip a layer are ignored.
pub(crate) fn count_crossings<G>(graph: G, layers: &[Vec<G::NodeId>]) -> usize
where
    G: IntoNeighborsDirected,
    G::NodeId: Copy + Ord + Hash,
{
    let mut crossings = 0;

    for pair in layers.windows(2) {
        let (upper_layer, lower_layer) = (&pair[0], &pair[1]);
        let lower_index: HashMap<G::NodeId, usize> = lower_layer
            .iter()
            .enumerate()
            .map(|(i, &node)| (node, i))
            .collect();

        let targets: Vec<Vec<usize>> = upper_layer
            .iter()
            .map(|&node| {
                graph
                    .neighbors_directed(node, Direction::Outgoing)
                    .filter_map(|target| lower_index.get(&target).copied())
                    .collect()
            })
            .collect();

        for (idx1, targets1) in targets.iter().enumerate() {
            for targets2 in targets.iter().skip(idx1 + 1) {
                for &pos1 in targets1 {
                    crossings += targets2.iter().filter(|&&pos2| pos2 < pos1).count();
                }
            }
        }
    }

    crossings
}
