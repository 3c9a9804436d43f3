use serde::Serialize;

use crate::errors::LatticeResult;
use crate::models::lattice::{generate_lattice, LatticeParameters, PriceLattice};

/// Horizontal distance between two step columns, in layout units.
pub const HORIZONTAL_SPACING: f64 = 2.0;
/// Vertical distance between two nodes of the same column, in layout units.
pub const VERTICAL_SPACING: f64 = 2.0;

/// Identity of a lattice node: the step and how many down-moves reached it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    pub step: usize,
    pub down_moves: usize,
}

impl NodeId {
    pub fn new(step: usize, down_moves: usize) -> Self {
        Self { step, down_moves }
    }

    /// Successor after an up-move (same down-move count).
    pub fn up(self) -> Self {
        Self::new(self.step + 1, self.down_moves)
    }

    /// Successor after a down-move.
    pub fn down(self) -> Self {
        Self::new(self.step + 1, self.down_moves + 1)
    }

    // nodes are stored column by column, so a column starts at a triangular number
    fn index(self) -> usize {
        self.step * (self.step + 1) / 2 + self.down_moves
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.step, self.down_moves)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatticeNode {
    pub id: NodeId,
    pub price: f64,
    pub x: f64,
    pub y: f64,
}

impl LatticeNode {
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn label(&self) -> String {
        format_currency(self.price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatticeEdge {
    pub from: NodeId,
    pub to: NodeId,
}

/// Prices are shown in dollars with cents.
pub fn format_currency(price: f64) -> String {
    format!("${price:.2}")
}

/// Positioned nodes and edges of a price lattice, ready to draw.
#[derive(Debug, Clone, Serialize)]
pub struct LatticeGraph {
    steps: usize,
    nodes: Vec<LatticeNode>,
    edges: Vec<LatticeEdge>,
}

impl LatticeGraph {
    pub fn build(params: &LatticeParameters) -> LatticeResult<Self> {
        let lattice = generate_lattice(params)?;
        Ok(Self::from_lattice(&lattice))
    }

    pub fn from_lattice(lattice: &PriceLattice) -> Self {
        let steps = lattice.steps();
        let mut nodes = Vec::with_capacity(lattice.node_count());
        let mut edges = Vec::with_capacity(steps * (steps + 1));

        for (step, level) in lattice.levels().iter().enumerate() {
            let center = (level.len() as f64 - 1.0) / 2.0;
            for (down_moves, &price) in level.prices().iter().enumerate() {
                let id = NodeId::new(step, down_moves);
                nodes.push(LatticeNode {
                    id,
                    price,
                    x: step as f64 * HORIZONTAL_SPACING,
                    y: -(down_moves as f64 - center) * VERTICAL_SPACING,
                });
                if step < steps {
                    edges.push(LatticeEdge { from: id, to: id.up() });
                    edges.push(LatticeEdge { from: id, to: id.down() });
                }
            }
        }

        Self { steps, nodes, edges }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn nodes(&self) -> &[LatticeNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[LatticeEdge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&LatticeNode> {
        if id.step > self.steps || id.down_moves > id.step {
            return None;
        }
        self.nodes.get(id.index())
    }

    /// Nodes of one step, topmost first.
    pub fn column(&self, step: usize) -> &[LatticeNode] {
        if step > self.steps {
            return &[];
        }
        let start = NodeId::new(step, 0).index();
        &self.nodes[start..start + step + 1]
    }

    /// Highest y coordinate in the layout (the top of the last column).
    pub fn max_y(&self) -> f64 {
        self.nodes.iter().map(|n| n.y).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min_y(&self) -> f64 {
        self.nodes.iter().map(|n| n.y).fold(f64::INFINITY, f64::min)
    }

    pub fn max_x(&self) -> f64 {
        self.steps as f64 * HORIZONTAL_SPACING
    }

    /// Edge endpoints as layout coordinates.
    pub fn segments(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        self.edges.iter().filter_map(|edge| {
            let from = self.node(edge.from)?;
            let to = self.node(edge.to)?;
            Some((from.position(), to.position()))
        })
    }
}
