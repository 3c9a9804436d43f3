//! Cox-Ross-Rubinstein price lattices: every price the underlying can reach
//! at each step, and a labeled diagram of the recombining tree.
//!
//! ```no_run
//! use latticeflow::{render_lattice, FigureSize, LatticeParameters};
//!
//! let params = LatticeParameters::new(18.0, 1.0, 0.2, 4)?;
//! let svg = render_lattice(&params)?.to_svg(FigureSize::default())?;
//! # Ok::<(), latticeflow::LatticeError>(())
//! ```

pub mod config;
pub mod errors;
pub mod models;
pub mod server;
pub mod visualisations;

pub use errors::{LatticeError, LatticeResult};
pub use models::{generate_lattice, LatticeParameters, PriceLattice, PriceLevel, MAX_STEPS};
pub use visualisations::{render_lattice, FigureSize, LatticeFigure, LatticeGraph, NodeId};
