pub mod command;
pub mod graph;
pub mod knapsack;
pub mod neighbors;
pub mod recount;
pub mod runtime;
pub mod tag;

pub use graph::{ComponentTracker, NeighborGraphReader, NeighborGraphWriter, NeighborList};
pub use knapsack::{KnapsackEnumerator, KnapsackItem};
pub use recount::{RecountComputer, TagCounts};
pub use runtime::{Error, ErrorKind, Result};
pub use tag::{PackedSeq, PackedTag, TagAlphabet, TagId, TagUniverse};
