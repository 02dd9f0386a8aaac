mod components;
mod dump;
pub mod format;
mod neighbor_list;
mod reader;
mod records;
mod writer;

pub use components::{component_sizes, members_of, ComponentTracker, EdgeSource};
pub use dump::dump_graph;
pub use neighbor_list::{NeighborEdge, NeighborList};
pub use reader::NeighborGraphReader;
pub use records::{
    tab_separated_reader, write_graph_from_records, NeighborRecordParser, RecordStats,
};
pub use writer::{
    DuplicateNeighbors, NeighborGraphWriter, OverflowMode, StreamingGraphWriter, WriterOptions,
};
