pub mod lattice;

pub use lattice::{generate_lattice, LatticeParameters, PriceLattice, PriceLevel, MAX_STEPS};
