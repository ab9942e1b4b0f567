//! Generic dependency graph: deterministic build ordering and cycle detection.
//!
//! Vertices are opaque values compared by equality. An edge `(dependent,
//! dependency)` means the dependency must come first. Cycles may be added
//! freely; they are reported by [`DependencyGraph::calculate_order`].

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use plinth_util::errors::PlinthError;

/// A dependency between two vertices: `dependent` requires `dependency` first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge<V> {
    pub dependent: V,
    pub dependency: V,
}

impl<V: fmt::Display> fmt::Display for Edge<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.dependent, self.dependency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// A directed dependency graph backed by petgraph.
///
/// Not meant to be shared between threads while it is being built; create one
/// per ordering request.
#[derive(Debug, Clone)]
pub struct DependencyGraph<V> {
    graph: DiGraph<V, ()>,
    /// Lookup from vertex value to node index.
    index: HashMap<V, NodeIndex>,
}

impl<V> DependencyGraph<V>
where
    V: Clone + Eq + Hash + fmt::Display,
{
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Add a vertex. Returns `false` if an equal vertex was already present.
    pub fn add_vertex(&mut self, vertex: V) -> bool {
        if self.index.contains_key(&vertex) {
            return false;
        }
        let idx = self.graph.add_node(vertex.clone());
        self.index.insert(vertex, idx);
        true
    }

    /// Declare that `dependent` requires `dependency`.
    ///
    /// Both vertices must already exist. Adding the same edge twice has no
    /// further effect.
    pub fn add_edge(&mut self, dependent: &V, dependency: &V) -> miette::Result<()> {
        let from = self.lookup(dependent)?;
        let to = self.lookup(dependency)?;
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, ());
        }
        Ok(())
    }

    fn lookup(&self, vertex: &V) -> Result<NodeIndex, PlinthError> {
        self.index
            .get(vertex)
            .copied()
            .ok_or_else(|| PlinthError::UnknownVertex {
                vertex: vertex.to_string(),
            })
    }

    pub fn contains_vertex(&self, vertex: &V) -> bool {
        self.index.contains_key(vertex)
    }

    /// All vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &V> {
        self.graph.node_weights()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> Vec<Edge<V>> {
        self.graph
            .edge_references()
            .map(|e| Edge {
                dependent: self.graph[e.source()].clone(),
                dependency: self.graph[e.target()].clone(),
            })
            .collect()
    }

    /// Direct dependencies of a vertex, in the order the edges were added.
    pub fn dependencies_of(&self, vertex: &V) -> Vec<&V> {
        match self.index.get(vertex) {
            Some(&idx) => self
                .ordered_dependencies(idx)
                .into_iter()
                .map(|d| &self.graph[d])
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Order all vertices so every dependency precedes its dependents.
    ///
    /// Vertices are emitted by ascending level (a vertex without dependencies
    /// has level 0, any other vertex one more than its deepest dependency).
    /// Within a level, vertices keep the order in which the traversal first
    /// discovered them: roots are visited in insertion order and edges are
    /// followed in the order they were added. Independent sub-graphs are
    /// therefore interleaved level by level, and the sub-graph reached first
    /// goes first on every level.
    pub fn calculate_order(&self) -> miette::Result<Vec<V>> {
        let ranks = self.rank()?;
        let mut nodes: Vec<NodeIndex> = self.graph.node_indices().collect();
        nodes.sort_by_key(|n| ranks[n.index()]);
        Ok(nodes.into_iter().map(|n| self.graph[n].clone()).collect())
    }

    /// Like [`calculate_order`](Self::calculate_order), grouped by level.
    ///
    /// Vertices within one group never depend on each other.
    pub fn calculate_levels(&self) -> miette::Result<Vec<Vec<V>>> {
        let ranks = self.rank()?;
        let depth = ranks.iter().map(|(level, _)| level + 1).max().unwrap_or(0);
        let mut levels: Vec<Vec<(usize, NodeIndex)>> = vec![Vec::new(); depth];
        for n in self.graph.node_indices() {
            let (level, discovered) = ranks[n.index()];
            levels[level].push((discovered, n));
        }
        Ok(levels
            .into_iter()
            .map(|mut group| {
                group.sort_by_key(|(discovered, _)| *discovered);
                group
                    .into_iter()
                    .map(|(_, n)| self.graph[n].clone())
                    .collect()
            })
            .collect())
    }

    /// Outgoing edges of `node` in insertion order.
    fn ordered_dependencies(&self, node: NodeIndex) -> Vec<NodeIndex> {
        // petgraph yields the most recently added edge first
        let mut out: Vec<_> = self
            .graph
            .edges(node)
            .map(|e| (e.id(), e.target()))
            .collect();
        out.sort_by_key(|(id, _)| *id);
        out.into_iter().map(|(_, target)| target).collect()
    }

    /// Compute `(level, discovery rank)` for every node, indexed by node index.
    ///
    /// Iterative depth-first traversal with an explicit stack of
    /// `(node, next edge)` frames. A vertex is in progress exactly while it
    /// is on the stack, so meeting an in-progress vertex again closes a cycle.
    fn rank(&self) -> Result<Vec<(usize, usize)>, PlinthError> {
        let n = self.graph.node_count();
        let adjacency: Vec<Vec<NodeIndex>> = self
            .graph
            .node_indices()
            .map(|idx| self.ordered_dependencies(idx))
            .collect();

        let mut marks = vec![Mark::Unvisited; n];
        let mut discovery = vec![0usize; n];
        let mut level = vec![0usize; n];
        let mut next_rank = 0usize;

        for root in self.graph.node_indices() {
            if marks[root.index()] != Mark::Unvisited {
                continue;
            }
            marks[root.index()] = Mark::InProgress;
            discovery[root.index()] = next_rank;
            next_rank += 1;
            let mut stack: Vec<(NodeIndex, usize)> = vec![(root, 0)];

            while let Some(&(node, cursor)) = stack.last() {
                let deps = &adjacency[node.index()];
                if let Some(&dep) = deps.get(cursor) {
                    if let Some(frame) = stack.last_mut() {
                        frame.1 += 1;
                    }
                    match marks[dep.index()] {
                        Mark::Unvisited => {
                            marks[dep.index()] = Mark::InProgress;
                            discovery[dep.index()] = next_rank;
                            next_rank += 1;
                            stack.push((dep, 0));
                        }
                        Mark::InProgress => return Err(self.cycle_error(&stack, dep)),
                        Mark::Done => {}
                    }
                } else {
                    level[node.index()] = deps
                        .iter()
                        .map(|d| level[d.index()] + 1)
                        .max()
                        .unwrap_or(0);
                    marks[node.index()] = Mark::Done;
                    stack.pop();
                }
            }
        }

        tracing::debug!("Ranked {n} vertices");
        Ok(level.into_iter().zip(discovery).collect())
    }

    fn cycle_error(&self, stack: &[(NodeIndex, usize)], reentered: NodeIndex) -> PlinthError {
        let start = stack
            .iter()
            .position(|(node, _)| *node == reentered)
            .unwrap_or(0);
        let mut vertices: Vec<String> = stack[start..]
            .iter()
            .map(|(node, _)| self.graph[*node].to_string())
            .collect();
        vertices.push(self.graph[reentered].to_string());
        PlinthError::CyclicDependency { vertices }
    }
}

impl<V> Default for DependencyGraph<V>
where
    V: Clone + Eq + Hash + fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Order the vertices of `graph`, dependencies first.
pub fn compute_order<V>(graph: &DependencyGraph<V>) -> miette::Result<Vec<V>>
where
    V: Clone + Eq + Hash + fmt::Display,
{
    graph.calculate_order()
}
