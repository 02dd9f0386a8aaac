use crate::runtime::{Error, Result};

///////////////////////////////
/// One object that can go into the knapsack. For neighbor search, id is a tag position and
/// cost is -ln(probability of an error at that position)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnapsackItem {
    pub id: usize,
    pub cost: f64,
}

impl KnapsackItem {
    pub fn new(id: usize, cost: f64) -> Self {
        Self { id, cost }
    }

    pub fn from_probability(id: usize, prob: f64) -> Self {
        Self {
            id,
            cost: -prob.ln(),
        }
    }
}

///////////////////////////////
/// Items with ids 0..n from a vector of probabilities
pub fn items_from_probabilities(probs: &[f64]) -> Vec<KnapsackItem> {
    probs
        .iter()
        .enumerate()
        .map(|(id, &p)| KnapsackItem::from_probability(id, p))
        .collect()
}

///////////////////////////////
/// A set of items that fits. Ids are in the order the search added them, cheapest first
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub ids: Vec<usize>,
    pub cost: f64,
}

///////////////////////////////
/// Enumerates every non-empty subset of items whose summed cost is within the capacity.
///
/// All fitting subsets are reported, not only maximal ones. Items are sorted cheapest first
/// (ties by id) and searched depth first over increasing indices; as soon as adding the next
/// item overflows, no later item at that depth can fit either, so the branch is cut. The cost
/// is one step per reported subset after the sort.
///
/// The work stacks are kept between calls.
pub struct KnapsackEnumerator {
    capacity: f64,
    sorted: Vec<KnapsackItem>,
    index_stack: Vec<usize>,
    id_stack: Vec<usize>,
    sum_stack: Vec<f64>,
}

impl KnapsackEnumerator {
    pub fn new(capacity: f64) -> Self {
        Self {
            capacity,
            sorted: Vec::new(),
            index_stack: Vec::new(),
            id_stack: Vec::new(),
            sum_stack: Vec::new(),
        }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Items of the last search, cheapest first
    pub fn sorted_items(&self) -> &[KnapsackItem] {
        &self.sorted
    }

    ///////////////////////////////
    /// Collect all fitting subsets
    pub fn enumerate(&mut self, items: &[KnapsackItem]) -> Result<Vec<Combination>> {
        let mut combinations = Vec::new();
        self.for_each_combination(items, |ids, cost| {
            combinations.push(Combination {
                ids: ids.to_vec(),
                cost,
            })
        })?;
        Ok(combinations)
    }

    ///////////////////////////////
    /// Call visit(item ids, summed cost) for every fitting subset, in depth-first preorder.
    /// Returns the number of subsets visited
    pub fn for_each_combination<F>(&mut self, items: &[KnapsackItem], mut visit: F) -> Result<usize>
    where
        F: FnMut(&[usize], f64),
    {
        //Pruning relies on costs only ever adding up
        if let Some(bad) = items.iter().find(|it| !(it.cost >= 0.0)) {
            return Err(Error::InvalidCost {
                id: bad.id,
                cost: bad.cost,
            });
        }

        self.sorted.clear();
        self.sorted.extend_from_slice(items);
        self.sorted
            .sort_by(|a, b| a.cost.total_cmp(&b.cost).then(a.id.cmp(&b.id)));

        self.index_stack.clear();
        self.id_stack.clear();
        self.sum_stack.clear();

        let n = self.sorted.len();
        let mut num_visited = 0;
        let mut next = 0;
        loop {
            let cur_sum = self.sum_stack.last().copied().unwrap_or(0.0);
            let fits = next < n && cur_sum + self.sorted[next].cost <= self.capacity;

            if fits {
                //Extend the current subset with the next item and report it
                let item = self.sorted[next];
                self.index_stack.push(next);
                self.id_stack.push(item.id);
                self.sum_stack.push(cur_sum + item.cost);

                visit(&self.id_stack, cur_sum + item.cost);
                num_visited += 1;
                next += 1;
            } else {
                //Nothing more fits at this depth; try the next sibling one level up
                match self.index_stack.pop() {
                    Some(last) => {
                        self.id_stack.pop();
                        self.sum_stack.pop();
                        next = last + 1;
                    }
                    None => break,
                }
            }
        }

        Ok(num_visited)
    }
}
