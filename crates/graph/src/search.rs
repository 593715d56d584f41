//! Unweighted shortest-path search over a [`LinkGraph`].

use crate::LinkGraph;
use std::collections::{HashSet, VecDeque};

/// Find a minimum-hop path from `start` to `goal`, or `None` if `goal` is
/// unreachable.
///
/// Breadth-first search over partial paths: the frontier is FIFO, so paths
/// are expanded in non-decreasing hop order, and a node is marked visited the
/// moment it is first discovered, so no longer path to it ever enters the
/// queue. Neighbors expand in document order, which makes tie-breaking among
/// equal-length paths deterministic for a fixed document.
///
/// `start == goal` is a single-node path, even for nodes absent from the
/// graph. Pure function; safe to call repeatedly.
pub fn shortest_path(graph: &LinkGraph, start: &str, goal: &str) -> Option<Vec<String>> {
    if start == goal {
        return Some(vec![start.to_string()]);
    }

    let mut queue: VecDeque<Vec<String>> = VecDeque::new();
    let mut visited: HashSet<String> = HashSet::new();
    queue.push_back(vec![start.to_string()]);
    visited.insert(start.to_string());

    while let Some(path) = queue.pop_front() {
        let node = path.last().map(String::as_str).unwrap_or(start);

        for link in graph.neighbors(node) {
            let neighbor = link.subreddit.as_str();
            if visited.contains(neighbor) {
                continue;
            }
            let mut extended = path.clone();
            extended.push(neighbor.to_string());
            if neighbor == goal {
                return Some(extended);
            }
            visited.insert(neighbor.to_string());
            queue.push_back(extended);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use protocol::LinkRecord;

    fn graph_of(entries: &[(&str, &[&str])]) -> LinkGraph {
        let links: IndexMap<String, Vec<LinkRecord>> = entries
            .iter()
            .map(|(node, outs)| {
                let records = outs.iter().map(|o| LinkRecord::new(*o)).collect();
                (node.to_string(), records)
            })
            .collect();
        LinkGraph::from_entries(links)
    }

    fn assert_edge_valid(graph: &LinkGraph, path: &[String]) {
        for pair in path.windows(2) {
            assert!(
                graph
                    .neighbors(&pair[0])
                    .iter()
                    .any(|l| l.subreddit == pair[1]),
                "{} -> {} is not an edge",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_start_equals_goal() {
        let graph = graph_of(&[("a", &["b"])]);
        assert_eq!(shortest_path(&graph, "a", "a"), Some(vec!["a".to_string()]));
        // Holds even for a node the graph has never heard of.
        assert_eq!(shortest_path(&graph, "x", "x"), Some(vec!["x".to_string()]));
    }

    #[test]
    fn test_line_graph() {
        let graph = graph_of(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]);
        let path = shortest_path(&graph, "a", "c").unwrap();
        assert_eq!(path, vec!["a", "b", "c"]);
        assert_edge_valid(&graph, &path);
    }

    #[test]
    fn test_prefers_fewer_hops() {
        // a -> e directly, and a longer a -> b -> c -> e detour.
        let graph = graph_of(&[
            ("a", &["b", "e"]),
            ("b", &["c"]),
            ("c", &["e"]),
            ("e", &[]),
        ]);
        assert_eq!(shortest_path(&graph, "a", "e").unwrap(), vec!["a", "e"]);
    }

    #[test]
    fn test_tie_broken_by_document_order() {
        // Two 2-hop routes to c; b is listed before d, so BFS finds a-b-c.
        let graph = graph_of(&[("a", &["b", "d"]), ("b", &["c"]), ("d", &["c"]), ("c", &[])]);
        let path = shortest_path(&graph, "a", "c").unwrap();
        assert_eq!(path, vec!["a", "b", "c"]);
        assert_edge_valid(&graph, &path);
    }

    #[test]
    fn test_unreachable_goal() {
        let graph = graph_of(&[("a", &["b"]), ("b", &[]), ("c", &["a"])]);
        assert_eq!(shortest_path(&graph, "a", "c"), None);
    }

    #[test]
    fn test_dangling_destination_is_dead_end() {
        // "ghost" is a valid destination but has no entry of its own, so the
        // search can pass through it as a terminus but never beyond it.
        let graph = graph_of(&[("a", &["ghost"]), ("b", &[])]);
        assert_eq!(
            shortest_path(&graph, "a", "ghost").unwrap(),
            vec!["a", "ghost"]
        );
        assert_eq!(shortest_path(&graph, "a", "b"), None);
    }

    #[test]
    fn test_cycle_does_not_loop() {
        let graph = graph_of(&[("a", &["b"]), ("b", &["a", "c"]), ("c", &[])]);
        assert_eq!(
            shortest_path(&graph, "a", "c").unwrap(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_minimum_hop_distances_on_known_graph() {
        // Hand-computed distances from "a":
        //   a:0  b:1  c:1  d:2  e:3
        let graph = graph_of(&[
            ("a", &["b", "c"]),
            ("b", &["d"]),
            ("c", &["d"]),
            ("d", &["e"]),
            ("e", &[]),
        ]);
        let expected = [("a", 0), ("b", 1), ("c", 1), ("d", 2), ("e", 3)];
        for (goal, hops) in expected {
            let path = shortest_path(&graph, "a", goal).unwrap();
            assert_eq!(path.len() - 1, hops, "distance a -> {}", goal);
            assert_edge_valid(&graph, &path);
        }
    }
}
