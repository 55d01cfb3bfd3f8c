//! # Route Finder
//!
//! Breadth-first search over the backbone connection graph. Returns the
//! shortest path by hop count, or a recoverable error — never a panic.

use std::collections::{HashMap, VecDeque};

use blackice_shared::NetworkId;
use thiserror::Error;

use crate::network::World;

/// Recoverable routing failures, returned inline to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Source or destination id does not exist.
    #[error("Network not found")]
    NetworkNotFound,
    /// No path exists (only possible across unbridged clusters).
    #[error("No route to target network")]
    NoRoute,
}

/// Finds the shortest route (by hop count) from `from` to `to`.
///
/// The returned path includes both endpoints. A route from a network to
/// itself is the single-element path.
///
/// # Errors
///
/// [`RouteError::NetworkNotFound`] for an unknown id,
/// [`RouteError::NoRoute`] when the destination is unreachable.
pub fn find_route(
    world: &World,
    from: NetworkId,
    to: NetworkId,
) -> Result<Vec<NetworkId>, RouteError> {
    if world.network(from).is_none() || world.network(to).is_none() {
        return Err(RouteError::NetworkNotFound);
    }
    if from == to {
        return Ok(vec![from]);
    }

    let mut prev: HashMap<NetworkId, NetworkId> = HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(from);
    prev.insert(from, from);

    while let Some(current) = queue.pop_front() {
        let Some(network) = world.network(current) else {
            continue;
        };
        for &next in &network.links {
            if prev.contains_key(&next) {
                continue;
            }
            prev.insert(next, current);
            if next == to {
                return Ok(walk_back(&prev, from, to));
            }
            queue.push_back(next);
        }
    }

    Err(RouteError::NoRoute)
}

/// Reconstructs the path from the predecessor map.
fn walk_back(prev: &HashMap<NetworkId, NetworkId>, from: NetworkId, to: NetworkId) -> Vec<NetworkId> {
    let mut path = vec![to];
    let mut current = to;
    while current != from {
        current = prev[&current];
        path.push(current);
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::WorldGenerator;
    use crate::seed::WorldSeed;

    #[test]
    fn test_route_to_self() {
        let world = WorldGenerator::new(WorldSeed::new(42)).generate();
        let id = world.clusters()[0].networks[0];
        assert_eq!(find_route(&world, id, id), Ok(vec![id]));
    }

    #[test]
    fn test_unknown_network() {
        let world = WorldGenerator::new(WorldSeed::new(42)).generate();
        let id = world.clusters()[0].networks[0];
        assert_eq!(
            find_route(&world, id, 999_999),
            Err(RouteError::NetworkNotFound)
        );
        assert_eq!(
            find_route(&world, 999_999, id),
            Err(RouteError::NetworkNotFound)
        );
    }

    #[test]
    fn test_no_route_across_clusters() {
        let world = WorldGenerator::new(WorldSeed::new(42)).generate();
        let a = world.clusters()[0].networks[0];
        let b = world.clusters()[1].networks[0];
        // Clusters are disjoint subgraphs unless explicitly bridged.
        assert_eq!(find_route(&world, a, b), Err(RouteError::NoRoute));
    }

    #[test]
    fn test_route_endpoints_and_edges() {
        let world = WorldGenerator::new(WorldSeed::new(42)).generate();
        let cluster = &world.clusters()[0];
        let from = cluster.networks[0];
        let to = *cluster.networks.last().unwrap();

        let path = find_route(&world, from, to).unwrap();
        assert_eq!(path.first(), Some(&from));
        assert_eq!(path.last(), Some(&to));
        for pair in path.windows(2) {
            let network = world.network(pair[0]).unwrap();
            assert!(network.links.contains(&pair[1]), "non-edge in path");
        }
    }

    #[test]
    fn test_error_messages_match_protocol() {
        assert_eq!(RouteError::NetworkNotFound.to_string(), "Network not found");
        assert_eq!(
            RouteError::NoRoute.to_string(),
            "No route to target network"
        );
    }
}
