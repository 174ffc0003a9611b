//! Lazy traversal over trees and commit history.
//!
//! Both iterators yield `Result` items: resolution touches the store, and a
//! missing or malformed object surfaces at the point it is first needed
//! rather than aborting construction. Both are restartable by asking the
//! owning handle for a new iterator.

use std::collections::{HashSet, VecDeque};

use crate::errors::OdbError;
use crate::hash::ObjectId;
use crate::internal::object::tree::TreeItem;
use crate::objects::{Commit, Object, ObjectAccess, Tree};

/// Ancestor visiting order for [`Commit::traverse`].
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TraversalOrder {
    /// Generation by generation: the commit, its parents, their parents.
    BreadthFirst,
    /// Follow the first-parent chain to the bottom before siblings.
    DepthFirst,
}

/// Iterator over a commit's ancestry, starting at the commit itself.
///
/// A visited set guarantees each commit is yielded at most once. Histories
/// are DAGs, so the guard exists for correctness on merge diamonds and on
/// degenerate (cyclic) input, not as an optimization.
pub struct AncestorIter {
    pending: VecDeque<Commit>,
    seen: HashSet<ObjectId>,
    order: TraversalOrder,
}

impl AncestorIter {
    pub(crate) fn new(start: Commit, order: TraversalOrder) -> AncestorIter {
        let mut pending = VecDeque::new();
        pending.push_back(start);
        AncestorIter {
            pending,
            seen: HashSet::new(),
            order,
        }
    }
}

impl Iterator for AncestorIter {
    type Item = Result<Commit, OdbError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let commit = match self.order {
                TraversalOrder::BreadthFirst => self.pending.pop_front()?,
                TraversalOrder::DepthFirst => self.pending.pop_back()?,
            };
            if !self.seen.insert(commit.id()) {
                continue;
            }
            let parents = match commit.parents() {
                Ok(parents) => parents,
                Err(err) => return Some(Err(err)),
            };
            match self.order {
                TraversalOrder::BreadthFirst => self.pending.extend(parents),
                // Reversed so the first declared parent is popped first.
                TraversalOrder::DepthFirst => self.pending.extend(parents.into_iter().rev()),
            }
            return Some(Ok(commit));
        }
    }
}

struct TreeFrame {
    tree: Tree,
    next: usize,
}

/// Depth-first, pre-order walk over a tree's subtree.
///
/// Every entry is yielded as a located handle. Nested trees are descended
/// into immediately after being yielded; submodule entries are leaves and
/// are never descended into.
pub struct TreeWalk {
    frames: Vec<TreeFrame>,
}

impl TreeWalk {
    pub(crate) fn new(root: Tree) -> TreeWalk {
        TreeWalk {
            frames: vec![TreeFrame {
                tree: root,
                next: 0,
            }],
        }
    }

    /// Pull the next unvisited item out of the top frame, popping exhausted
    /// frames. Returns the owning tree alongside the item so the caller can
    /// resolve it without re-borrowing the stack.
    fn advance(&mut self) -> Option<Result<(Tree, TreeItem), OdbError>> {
        loop {
            let frame = self.frames.last_mut()?;
            let items = match frame.tree.items() {
                Ok(items) => items,
                Err(err) => {
                    self.frames.pop();
                    return Some(Err(err));
                }
            };
            if frame.next >= items.len() {
                self.frames.pop();
                continue;
            }
            let item = items[frame.next].clone();
            frame.next += 1;
            return Some(Ok((frame.tree.clone(), item)));
        }
    }
}

impl Iterator for TreeWalk {
    type Item = Result<Object, OdbError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (tree, item) = match self.advance()? {
            Ok(found) => found,
            Err(err) => return Some(Err(err)),
        };
        let object = match tree.resolve(&item) {
            Ok(object) => object,
            Err(err) => return Some(Err(err)),
        };
        if let Object::Tree(subtree) = &object {
            self.frames.push(TreeFrame {
                tree: subtree.clone(),
                next: 0,
            });
        }
        Some(Ok(object))
    }
}
