mod correct;
mod propagate;
mod tag_counts;

pub use correct::{Correction, CorrectorOptions, ExpectationMatchingCorrector};
pub use propagate::RecountComputer;
pub use tag_counts::TagCounts;
pub(crate) use tag_counts::{counts_tsv_writer, CountRow};
