// Module declarations (alphabetical)
pub mod components;
pub mod correct;
pub mod dump_graph;
pub mod find_neighbors;
pub mod io;
pub mod observed;
pub mod write_graph;

pub use components::{Components, ComponentsCMD};
pub use correct::{Correct, CorrectCMD};
pub use dump_graph::{DumpGraph, DumpGraphCMD};
pub use find_neighbors::{FindNeighbors, FindNeighborsCMD};
pub use observed::{Observed, ObservedCMD};
pub use write_graph::{WriteGraph, WriteGraphCMD};
