//! The forward-reference graph over top-level functions.
//!
//! Nodes are function declarations; an edge `A -> B` records that `A`'s
//! body references `B`, along with the identifier token that made the
//! reference. Each node tracks the set of *undefined* functions it depends
//! on, directly or transitively; when a function's declaration is reached
//! in program order it is marked defined and drops out of every dependent's
//! unresolved set. Top-level code may only reference functions whose
//! unresolved set is empty.
//!
//! Cycles are expected: mutual recursion is exactly the case this graph
//! exists to admit.

use aspen_lex::Token;
use aspen_util::{FxHashMap, FxHashSet};

/// Stable identifier of a node in one graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FuncId(u32);

struct Node {
    /// The function's name token, used when rendering reference chains.
    name: Token,

    /// Direct references, in the order the edges were added, with the
    /// identifier token of each reference at the same index.
    references: Vec<FuncId>,
    reference_locs: Vec<Token>,

    /// Every node that references this one, directly or transitively. A
    /// node always references itself, which is what propagates unresolved
    /// obligations to direct callers.
    referenced_by: FxHashSet<FuncId>,

    /// The undefined nodes this one depends on.
    unresolved: FxHashSet<FuncId>,
}

#[derive(Default)]
pub struct ReferenceGraph {
    nodes: Vec<Node>,
    undefined: FxHashSet<FuncId>,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node for an already-defined function (a nested declaration).
    pub fn add_node(&mut self, name: Token) -> FuncId {
        let id = FuncId(self.nodes.len() as u32);
        let mut referenced_by = FxHashSet::default();
        referenced_by.insert(id);
        self.nodes.push(Node {
            name,
            references: Vec::new(),
            reference_locs: Vec::new(),
            referenced_by,
            unresolved: FxHashSet::default(),
        });
        id
    }

    /// Adds a node for a pre-declared top-level function that has not been
    /// reached yet in program order. It starts out depending on itself.
    pub fn add_undefined_node(&mut self, name: Token) -> FuncId {
        let id = self.add_node(name);
        self.undefined.insert(id);
        self.node_mut(id).unresolved.insert(id);
        id
    }

    /// Records that `from`'s body references `to` at `loc`, and propagates
    /// `to`'s unresolved obligations to everything that references `from`.
    pub fn add_edge(&mut self, from: FuncId, to: FuncId, loc: Token) {
        self.node_mut(from).references.push(to);
        self.node_mut(from).reference_locs.push(loc);

        let from_referenced_by: Vec<FuncId> =
            self.node(from).referenced_by.iter().copied().collect();
        for &ancestor in &from_referenced_by {
            self.node_mut(to).referenced_by.insert(ancestor);
        }

        // everything `to` is still waiting on becomes an obligation of every
        // transitive caller of `from`
        let pending: Vec<FuncId> = self.node(to).unresolved.iter().copied().collect();
        for undefined in pending {
            for &ancestor in &from_referenced_by {
                self.node_mut(ancestor).unresolved.insert(undefined);
                self.node_mut(undefined).referenced_by.insert(ancestor);
            }
        }
    }

    /// Marks a function as defined: every node waiting on it is released.
    pub fn mark_defined(&mut self, id: FuncId) {
        let dependents: Vec<FuncId> = self.node(id).referenced_by.iter().copied().collect();
        for dependent in dependents {
            self.node_mut(dependent).unresolved.remove(&id);
        }
        self.undefined.remove(&id);
    }

    /// When `id` still depends on an undefined function, returns the
    /// reference chain leading to one: the undefined function's name token
    /// first, then the identifier tokens along the path back to `id`.
    pub fn unresolved_chain(&self, id: FuncId) -> Option<Vec<Token>> {
        if self.node(id).unresolved.is_empty() {
            return None;
        }

        // depth-first search for a reachable undefined node, keeping parent
        // links so the path can be read back
        let mut parent: FxHashMap<FuncId, FuncId> = FxHashMap::default();
        let mut visited: FxHashSet<FuncId> = FxHashSet::default();
        let mut stack = vec![id];
        let mut end = None;

        while let Some(node) = stack.pop() {
            visited.insert(node);

            if self.undefined.contains(&node) {
                end = Some(node);
                break;
            }

            for &child in &self.node(node).references {
                if !visited.contains(&child) {
                    parent.insert(child, node);
                    stack.push(child);
                }
            }
        }

        let mut end = end.unwrap_or_else(|| {
            unreachable!("ReferenceGraph::unresolved_chain: no undefined node reachable")
        });

        let mut chain = vec![self.node(end).name.clone()];
        while let Some(&p) = parent.get(&end) {
            let node = self.node(p);
            for (i, &reference) in node.references.iter().enumerate() {
                if reference == end {
                    chain.push(node.reference_locs[i].clone());
                    break;
                }
            }
            end = p;
        }

        Some(chain)
    }

    fn node(&self, id: FuncId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: FuncId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }
}

/// Renders the unresolved-reference diagnostic: the offending function
/// first, then the chain of references leading to it, one hop per line.
pub fn unresolved_message(chain: &[Token], start: &Token) -> String {
    use std::fmt::Write;

    let mut message = format!("reference to unresolved function '{}'.", chain[0]);

    if chain.len() > 1 {
        let _ = write!(
            message,
            "\n\n    {}:{} {} refers to\n",
            start.line, start.col, start
        );
        for i in (1..chain.len()).rev() {
            let token = &chain[i];
            if i == 1 {
                let _ = write!(message, "    {}:{} {}", token.line, token.col, token);
            } else {
                let _ = write!(message, "    {}:{} {} refers to\n", token.line, token.col, token);
            }
        }
    }

    message
}
