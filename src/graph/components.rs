use std::io::{Read, Seek};

use super::reader::NeighborGraphReader;
use crate::runtime::{Error, Result};

///////////////////////////////
/// Anything that can list undirected edges between node ids
pub trait EdgeSource {
    fn for_each_edge(&mut self, visit: &mut dyn FnMut(usize, usize) -> Result<()>) -> Result<()>;
}

///////////////////////////////
/// Every neighbor edge of the graph, self-edges excluded
impl<R: Read + Seek> EdgeSource for NeighborGraphReader<R> {
    fn for_each_edge(&mut self, visit: &mut dyn FnMut(usize, usize) -> Result<()>) -> Result<()> {
        self.for_each_record(|list| {
            for e in list.iter().filter(|e| e.id != list.id()) {
                visit(list.id(), e.id)?;
            }
            Ok(())
        })
    }
}

impl EdgeSource for [(usize, usize)] {
    fn for_each_edge(&mut self, visit: &mut dyn FnMut(usize, usize) -> Result<()>) -> Result<()> {
        for &(n0, n1) in self.iter() {
            visit(n0, n1)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Unassigned,
    Root(usize),
    Child(usize),
}

///////////////////////////////
/// Union-find over a fixed number of nodes, for connected components of the neighbor graph.
///
/// Each root carries the component index it was created with. Merging links the root with the
/// larger index under the one with the smaller, so indices of surviving roots only go down.
/// Paths are compressed on every lookup.
#[derive(Debug, Clone)]
pub struct ComponentTracker {
    nodes: Vec<NodeState>,
    next_component: usize,
    path: Vec<usize>,
}

impl ComponentTracker {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            nodes: vec![NodeState::Unassigned; num_nodes],
            next_component: 0,
            path: Vec::new(),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn check(&self, n: usize) -> Result<()> {
        if n < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::index_out_of_range("component tracker", n, self.nodes.len()))
        }
    }

    fn fresh_root(&mut self, n: usize) {
        self.nodes[n] = NodeState::Root(self.next_component);
        self.next_component += 1;
    }

    ////////////////
    /// Root node of n, or None if n is unassigned. Points every node on the way at the root
    fn find_root(&mut self, n: usize) -> Option<usize> {
        self.path.clear();
        let mut cur = n;
        let root = loop {
            match self.nodes[cur] {
                NodeState::Unassigned => return None,
                NodeState::Root(_) => break cur,
                NodeState::Child(parent) => {
                    self.path.push(cur);
                    cur = parent;
                }
            }
        };
        for &p in &self.path {
            self.nodes[p] = NodeState::Child(root);
        }
        Some(root)
    }

    fn component_of_root(&self, root: usize) -> usize {
        match self.nodes[root] {
            NodeState::Root(c) => c,
            _ => unreachable!("find_root only returns roots"),
        }
    }

    ///////////////////////////////
    /// Make an unassigned node a component of its own; assigned nodes are left as they are
    pub fn add_node(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        if self.nodes[n] == NodeState::Unassigned {
            self.fresh_root(n);
        }
        Ok(())
    }

    ///////////////////////////////
    /// Put n0 and n1 in the same component
    pub fn add_edge(&mut self, n0: usize, n1: usize) -> Result<()> {
        self.check(n0)?;
        self.check(n1)?;

        match (self.find_root(n0), self.find_root(n1)) {
            (None, None) => {
                self.fresh_root(n0);
                if n1 != n0 {
                    self.nodes[n1] = NodeState::Child(n0);
                }
            }
            (Some(r0), None) => self.nodes[n1] = NodeState::Child(r0),
            (None, Some(r1)) => self.nodes[n0] = NodeState::Child(r1),
            (Some(r0), Some(r1)) if r0 != r1 => {
                if self.component_of_root(r0) < self.component_of_root(r1) {
                    self.nodes[r1] = NodeState::Child(r0);
                } else {
                    self.nodes[r0] = NodeState::Child(r1);
                }
            }
            _ => {}
        }
        Ok(())
    }

    ///////////////////////////////
    /// Add every edge of a source
    pub fn add_graph<S: EdgeSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        source.for_each_edge(&mut |n0, n1| self.add_edge(n0, n1))
    }

    ///////////////////////////////
    /// Internal component index of n, None if n was never added. Not dense; see
    /// get_node_components
    pub fn get_component(&mut self, n: usize) -> Result<Option<usize>> {
        self.check(n)?;
        Ok(self.find_root(n).map(|root| self.component_of_root(root)))
    }

    ///////////////////////////////
    /// Fill output with a component id per node and return the number of components.
    /// Unassigned nodes become singletons. Ids are 0.. in order of first appearance by node
    pub fn get_node_components(&mut self, output: &mut Vec<usize>) -> usize {
        const UNNUMBERED: usize = usize::MAX;

        for n in 0..self.nodes.len() {
            if self.nodes[n] == NodeState::Unassigned {
                self.fresh_root(n);
            }
        }

        let mut dense = vec![UNNUMBERED; self.next_component];
        let mut num_components = 0;
        output.clear();
        output.reserve(self.nodes.len());
        for n in 0..self.nodes.len() {
            //Every node is assigned at this point
            let root = self.find_root(n).unwrap_or(n);
            let internal = self.component_of_root(root);
            if dense[internal] == UNNUMBERED {
                dense[internal] = num_components;
                num_components += 1;
            }
            output.push(dense[internal]);
        }
        num_components
    }
}

///////////////////////////////
/// Number of nodes per component, indexed by component id
pub fn component_sizes(assignments: &[usize], num_components: usize) -> Vec<usize> {
    let mut sizes = vec![0; num_components];
    for &c in assignments {
        sizes[c] += 1;
    }
    sizes
}

///////////////////////////////
/// Nodes of one component, ascending
pub fn members_of(assignments: &[usize], component: usize) -> Vec<usize> {
    assignments
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == component)
        .map(|(n, _)| n)
        .collect()
}
