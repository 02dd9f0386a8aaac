mod finder;
mod quality;

pub use finder::{write_neighbor_records, FinderOptions, FinderStats, NeighborFinder};
pub use quality::{phred_to_substitution_prob, solexa_to_phred, QualityScale};
