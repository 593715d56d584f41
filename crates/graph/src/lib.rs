use indexmap::IndexMap;
use protocol::LinkRecord;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub mod search;

pub use search::shortest_path;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to read graph document {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed graph document {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("graph document {path} contains no nodes")]
    EmptyDocument { path: String },
}

/// In-memory link graph for fast traversals.
///
/// Maps a subreddit name to its outgoing links, in document order. Edge
/// destinations are not required to exist as keys; such dangling links are
/// dead ends (no outgoing edges of their own). Immutable once built.
pub struct LinkGraph {
    links: IndexMap<String, Vec<LinkRecord>>,
}

impl LinkGraph {
    /// Build a graph from an in-memory adjacency document.
    pub fn from_entries(links: IndexMap<String, Vec<LinkRecord>>) -> Self {
        Self { links }
    }

    /// Load the JSON graph document from disk.
    ///
    /// Document shape: `{ "<node>": [ { "subreddit": "<node>" }, ... ], ... }`.
    /// Key and link order are preserved as they appear in the file.
    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let display_path = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: display_path.clone(),
            source,
        })?;

        let links: IndexMap<String, Vec<LinkRecord>> =
            serde_json::from_str(&raw).map_err(|source| GraphError::Parse {
                path: display_path.clone(),
                source,
            })?;

        if links.is_empty() {
            return Err(GraphError::EmptyDocument { path: display_path });
        }

        let graph = Self { links };
        let stats = graph.stats();
        info!(
            "Loaded link graph from {}: {} nodes, {} edges ({} dangling)",
            display_path, stats.node_count, stats.edge_count, stats.dangling_edges
        );
        Ok(graph)
    }

    /// Whether `node` exists as a key (i.e. is a valid start/end candidate).
    pub fn contains(&self, node: &str) -> bool {
        self.links.contains_key(node)
    }

    /// Outgoing links of `node` in document order. Dangling or unknown nodes
    /// have no outgoing links.
    pub fn neighbors(&self, node: &str) -> &[LinkRecord] {
        self.links.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Node ids in document order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    pub fn node_count(&self) -> usize {
        self.links.len()
    }

    /// Pick a node id uniformly from the key set.
    ///
    /// There is no RNG dependency in this workspace; the caller supplies a
    /// seed (wall clock for interactive use, a constant in tests) and a
    /// splitmix64 mix turns it into an index.
    pub fn random_node(&self, seed: u64) -> Option<&str> {
        if self.links.is_empty() {
            return None;
        }
        let index = (splitmix64(seed) % self.links.len() as u64) as usize;
        let node = self.links.get_index(index).map(|(k, _)| k.as_str());
        debug!("random_node(seed={}) -> {:?}", seed, node);
        node
    }

    /// Get graph statistics.
    pub fn stats(&self) -> GraphStats {
        let edge_count = self.links.values().map(Vec::len).sum();
        let dangling_edges = self
            .links
            .values()
            .flatten()
            .filter(|link| !self.links.contains_key(&link.subreddit))
            .count();
        GraphStats {
            node_count: self.links.len(),
            edge_count,
            dangling_edges,
        }
    }
}

pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Edges whose destination is not a key in the document (dead ends).
    pub dangling_edges: usize,
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e3779b97f4a7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn graph_of(entries: &[(&str, &[&str])]) -> LinkGraph {
        let links = entries
            .iter()
            .map(|(node, outs)| {
                let records = outs.iter().map(|o| LinkRecord::new(*o)).collect();
                (node.to_string(), records)
            })
            .collect();
        LinkGraph::from_entries(links)
    }

    #[test]
    fn test_neighbors_preserve_document_order() {
        let graph = graph_of(&[("a", &["c", "b", "d"]), ("b", &[])]);
        let order: Vec<&str> = graph
            .neighbors("a")
            .iter()
            .map(|l| l.subreddit.as_str())
            .collect();
        assert_eq!(order, vec!["c", "b", "d"]);
    }

    #[test]
    fn test_unknown_node_has_no_neighbors() {
        let graph = graph_of(&[("a", &["ghost"])]);
        assert!(graph.neighbors("ghost").is_empty());
        assert!(graph.neighbors("nope").is_empty());
        assert!(!graph.contains("ghost"));
    }

    #[test]
    fn test_stats_counts_dangling_edges() {
        let graph = graph_of(&[("a", &["b", "ghost"]), ("b", &["a"])]);
        let stats = graph.stats();
        assert_eq!(stats.node_count, 2);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.dangling_edges, 1);
    }

    #[test]
    fn test_random_node_is_in_key_set() {
        let graph = graph_of(&[("a", &[]), ("b", &[]), ("c", &[])]);
        for seed in 0..64 {
            let node = graph.random_node(seed).unwrap();
            assert!(graph.contains(node));
        }
        // The mix should not be stuck on one index.
        let picks: std::collections::HashSet<&str> =
            (0..64).filter_map(|s| graph.random_node(s)).collect();
        assert!(picks.len() > 1);
    }

    #[test]
    fn test_random_node_empty_graph() {
        let graph = LinkGraph::from_entries(IndexMap::new());
        assert_eq!(graph.random_node(7), None);
    }

    #[test]
    fn test_load_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"rust": [{{"subreddit": "programming"}}, {{"subreddit": "cpp"}}], "cpp": []}}"#
        )
        .unwrap();

        let graph = LinkGraph::load(file.path()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.neighbors("rust")[0].subreddit, "programming");
        assert_eq!(graph.stats().dangling_edges, 1); // "programming" is not a key
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            LinkGraph::load(file.path()),
            Err(GraphError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_rejects_empty_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        assert!(matches!(
            LinkGraph::load(file.path()),
            Err(GraphError::EmptyDocument { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            LinkGraph::load(Path::new("/no/such/graph.json")),
            Err(GraphError::Io { .. })
        ));
    }
}
