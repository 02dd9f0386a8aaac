mod alphabet;
mod packed;
mod universe;

pub use alphabet::TagAlphabet;
pub use packed::{PackedSeq, PackedTag, MAX_TAG_LEN};
pub use universe::{TagId, TagUniverse};
