mod enumerator;

pub use enumerator::{items_from_probabilities, Combination, KnapsackEnumerator, KnapsackItem};
