pub mod graph;
pub mod lattice_plot;

pub use graph::{format_currency, LatticeEdge, LatticeGraph, LatticeNode, NodeId};
pub use lattice_plot::{render_lattice, FigureSize, LatticeFigure, NodeStyle};
