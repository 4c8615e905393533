//! Intersection topology and builder.
//!
//! # Layout
//!
//! Every node has at most one neighbor on each compass side.  Neighbor
//! links are stored as `[Option<NodeId>; 4]` indexed by
//! [`Direction::index`], so `neighbor(dir)` is a single array load.
//!
//! Links must be reciprocal: if `a` lists `b` to the east, `b` must list
//! `a` to the west.  [`TopologyBuilder::build`] rejects anything else.

use gs_core::{Direction, NodeId};

use crate::{TopologyError, TopologyResult};

// ── Node ──────────────────────────────────────────────────────────────────────

/// Row/column position of a node in the grid.  Row 0 is the northern edge.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// One intersection.  Immutable once the topology is built.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id:        NodeId,
    /// Human-readable name used by reports ("A", "B", …).
    pub label:     String,
    pub position:  Position,
    neighbors:     [Option<NodeId>; 4],
}

impl Node {
    /// The neighbor on side `dir`, or `None` at the grid boundary.
    #[inline]
    pub fn neighbor(&self, dir: Direction) -> Option<NodeId> {
        self.neighbors[dir.index()]
    }

    /// Iterate `(direction, neighbor)` for every existing link.
    pub fn neighbors(&self) -> impl Iterator<Item = (Direction, NodeId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.neighbor(d).map(|n| (d, n)))
    }
}

// ── Topology ──────────────────────────────────────────────────────────────────

/// The validated, immutable neighbor graph.  Construct with
/// [`TopologyBuilder`] or [`Topology::grid`].
#[derive(Clone, Debug)]
pub struct Topology {
    nodes: Vec<Node>,
}

impl Topology {
    /// A `rows × cols` lattice with 4-neighbor links, labelled row-major
    /// (`A` at the north-west corner).
    ///
    /// ```
    /// use gs_core::{Direction, NodeId};
    /// use gs_grid::Topology;
    ///
    /// let grid = Topology::grid(2, 2).unwrap();
    /// assert_eq!(grid.node_count(), 4);
    /// assert_eq!(grid.neighbor(NodeId(0), Direction::E), Some(NodeId(1)));
    /// assert_eq!(grid.neighbor(NodeId(0), Direction::N), None);
    /// ```
    pub fn grid(rows: u32, cols: u32) -> TopologyResult<Topology> {
        if rows == 0 || cols == 0 {
            return Err(TopologyError::EmptyGrid { rows, cols });
        }
        let mut b = TopologyBuilder::with_capacity((rows * cols) as usize);
        for row in 0..rows {
            for col in 0..cols {
                let index = row * cols + col;
                b.add_node(grid_label(index as usize), Position::new(row, col));
            }
        }
        let at = |row: u32, col: u32| NodeId(row * cols + col);
        for row in 0..rows {
            for col in 0..cols {
                if col + 1 < cols {
                    b.link(at(row, col), Direction::E, at(row, col + 1));
                }
                if row + 1 < rows {
                    b.link(at(row, col), Direction::S, at(row + 1, col));
                }
            }
        }
        b.build()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// # Panics
    /// Panics if `id` is out of range.  Use [`get`](Self::get) for a
    /// checked lookup.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> TopologyResult<&Node> {
        self.nodes.get(id.index()).ok_or(TopologyError::NodeNotFound(id))
    }

    #[inline]
    pub fn neighbor(&self, id: NodeId, dir: Direction) -> Option<NodeId> {
        self.nodes[id.index()].neighbor(dir)
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    pub fn find_by_label(&self, label: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.label == label).map(|n| n.id)
    }
}

// ── TopologyBuilder ───────────────────────────────────────────────────────────

/// Construct a [`Topology`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use gs_core::Direction;
/// use gs_grid::{Position, TopologyBuilder};
///
/// let mut b = TopologyBuilder::new();
/// let a = b.add_node("A", Position::new(0, 0));
/// let c = b.add_node("B", Position::new(0, 1));
/// b.link(a, Direction::E, c);
/// let topo = b.build().unwrap();
/// assert_eq!(topo.neighbor(c, Direction::W), Some(a));
/// ```
pub struct TopologyBuilder {
    nodes: Vec<Node>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn with_capacity(nodes: usize) -> Self {
        Self { nodes: Vec::with_capacity(nodes) }
    }

    /// Add an intersection and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, label: impl Into<String>, position: Position) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            label: label.into(),
            position,
            neighbors: [None; 4],
        });
        id
    }

    /// Link `a` and `b` in both directions: `b` lies to the `dir` of `a`.
    pub fn link(&mut self, a: NodeId, dir: Direction, b: NodeId) {
        self.set_neighbor(a, dir, b);
        self.set_neighbor(b, dir.opposite(), a);
    }

    /// Record a **one-sided** link.  Used when importing adjacency from an
    /// external source; `build` verifies that the other side agrees.
    ///
    /// Links on unknown nodes are kept so `build` can report them.
    pub fn set_neighbor(&mut self, node: NodeId, dir: Direction, neighbor: NodeId) {
        if let Some(n) = self.nodes.get_mut(node.index()) {
            n.neighbors[dir.index()] = Some(neighbor);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Validate every link and produce the immutable [`Topology`].
    pub fn build(self) -> TopologyResult<Topology> {
        let count = self.nodes.len();
        for node in &self.nodes {
            for (direction, neighbor) in node.neighbors() {
                if neighbor == node.id {
                    return Err(TopologyError::SelfLoop(node.id));
                }
                if neighbor.index() >= count {
                    return Err(TopologyError::UnknownNeighbor { node: node.id, direction, neighbor });
                }
                let back = self.nodes[neighbor.index()].neighbor(direction.opposite());
                if back != Some(node.id) {
                    return Err(TopologyError::NotReciprocal { node: node.id, direction, neighbor });
                }
            }
        }
        Ok(Topology { nodes: self.nodes })
    }
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Labels ────────────────────────────────────────────────────────────────────

/// Spreadsheet-style label for the `index`-th node: `A`..`Z`, `AA`, `AB`, …
pub fn grid_label(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}
