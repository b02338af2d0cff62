#![forbid(unsafe_code)]

//! The ordered stack of screens.
//!
//! Index 0 is the root and the last entry is the visible screen. Every
//! mutation is expressed as a [`StackOp`] so it can be evaluated
//! prospectively with [`StackOp::apply_to`] before it is committed; the
//! classifier needs both the before and the after sequence.
//!
//! # Invariants
//!
//! 1. The stack is never empty once constructed.
//! 2. No two entries share a [`ScreenId`].
//! 3. Pops never remove the root; only `set_root`/`replace_root` change it.
//!
//! # Failure Modes
//!
//! Operations that would break an invariant or change nothing return a
//! [`StackRejection`] and leave the stack untouched. Callers treat every
//! rejection as "nothing happened".

use std::fmt;

use crate::screen::{ScreenEntry, ScreenId};

/// Why a stack operation did not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackRejection {
    /// A transition or drag holds the lock.
    Locked,
    /// An entry with this identity is already on the stack.
    DuplicateIdentity { id: ScreenId },
    /// `pop_to` target is not on the stack.
    NotFound { id: ScreenId },
    /// Only the root is left.
    AtRoot,
    /// The operation would produce the current sequence.
    Unchanged,
}

impl fmt::Display for StackRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "a transition is in progress"),
            Self::DuplicateIdentity { id } => write!(f, "screen '{id}' is already on the stack"),
            Self::NotFound { id } => write!(f, "screen '{id}' is not on the stack"),
            Self::AtRoot => write!(f, "stack is already at its root"),
            Self::Unchanged => write!(f, "operation leaves the stack unchanged"),
        }
    }
}

impl std::error::Error for StackRejection {}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// A stack mutation, evaluated prospectively or committed.
#[derive(Debug, Clone, PartialEq)]
pub enum StackOp {
    /// Replace everything with a single root, without a transition.
    SetRoot(ScreenEntry),
    Push(ScreenEntry),
    Pop,
    PopTo(ScreenId),
    PopToRoot,
    /// Install a new root, animated as a replace. Upper entries stay; any
    /// other occurrence of the new root's identity is removed.
    ReplaceRoot(ScreenEntry),
}

impl StackOp {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetRoot(_) => "set_root",
            Self::Push(_) => "push",
            Self::Pop => "pop",
            Self::PopTo(_) => "pop_to",
            Self::PopToRoot => "pop_to_root",
            Self::ReplaceRoot(_) => "replace_root",
        }
    }

    /// Whether the classifier should treat this as a root replacement.
    #[inline]
    pub const fn is_replace(&self) -> bool {
        matches!(self, Self::ReplaceRoot(_))
    }

    /// Whether this op changes the stack without any transition.
    #[inline]
    pub const fn bypasses_transition(&self) -> bool {
        matches!(self, Self::SetRoot(_))
    }

    /// Compute the sequence this op would produce from `entries`.
    pub fn apply_to(&self, entries: &[ScreenEntry]) -> Result<Vec<ScreenEntry>, StackRejection> {
        match self {
            Self::SetRoot(entry) => Ok(vec![entry.clone()]),
            Self::Push(entry) => {
                if entries.iter().any(|e| e.id() == entry.id()) {
                    return Err(StackRejection::DuplicateIdentity {
                        id: entry.id().clone(),
                    });
                }
                let mut next = Vec::with_capacity(entries.len() + 1);
                next.extend_from_slice(entries);
                next.push(entry.clone());
                Ok(next)
            }
            Self::Pop => {
                if entries.len() <= 1 {
                    return Err(StackRejection::AtRoot);
                }
                Ok(entries[..entries.len() - 1].to_vec())
            }
            Self::PopTo(id) => {
                let index = entries
                    .iter()
                    .position(|e| e.id() == id)
                    .ok_or_else(|| StackRejection::NotFound { id: id.clone() })?;
                if index + 1 == entries.len() {
                    return Err(StackRejection::Unchanged);
                }
                Ok(entries[..=index].to_vec())
            }
            Self::PopToRoot => {
                if entries.len() <= 1 {
                    return Err(StackRejection::AtRoot);
                }
                Ok(entries[..1].to_vec())
            }
            Self::ReplaceRoot(entry) => {
                let mut next = Vec::with_capacity(entries.len());
                next.push(entry.clone());
                next.extend(
                    entries
                        .iter()
                        .skip(1)
                        .filter(|e| e.id() != entry.id())
                        .cloned(),
                );
                if next.iter().map(ScreenEntry::id).eq(entries.iter().map(ScreenEntry::id)) {
                    return Err(StackRejection::Unchanged);
                }
                Ok(next)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------------

/// Ordered, non-empty sequence of unique screens.
#[derive(Debug, Clone)]
pub struct ScreenStack {
    entries: Vec<ScreenEntry>,
}

impl ScreenStack {
    /// A stack holding only `root`.
    pub fn new(root: ScreenEntry) -> Self {
        Self {
            entries: vec![root],
        }
    }

    #[inline]
    pub fn entries(&self) -> &[ScreenEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The visible screen.
    pub fn top(&self) -> &ScreenEntry {
        // Non-empty by construction.
        &self.entries[self.entries.len() - 1]
    }

    pub fn root(&self) -> &ScreenEntry {
        &self.entries[0]
    }

    pub fn ids(&self) -> Vec<ScreenId> {
        self.entries.iter().map(|e| e.id().clone()).collect()
    }

    pub fn contains(&self, id: &ScreenId) -> bool {
        self.entries.iter().any(|e| e.id() == id)
    }

    /// Evaluate `op` without mutating.
    pub fn preview(&self, op: &StackOp) -> Result<Vec<ScreenEntry>, StackRejection> {
        op.apply_to(&self.entries)
    }

    /// Apply `op`, returning the previous sequence.
    pub fn apply(&mut self, op: &StackOp) -> Result<Vec<ScreenEntry>, StackRejection> {
        let next = op.apply_to(&self.entries)?;
        tracing::debug!(
            target: "navkit.stack",
            op = op.name(),
            from = self.entries.len(),
            to = next.len(),
            "stack mutated"
        );
        Ok(std::mem::replace(&mut self.entries, next))
    }

    pub fn set_root(&mut self, entry: ScreenEntry) {
        self.entries.clear();
        self.entries.push(entry);
    }

    pub fn push(&mut self, entry: ScreenEntry) -> Result<(), StackRejection> {
        self.apply(&StackOp::Push(entry)).map(drop)
    }

    /// Remove and return the top, unless it is the root.
    pub fn pop(&mut self) -> Result<ScreenEntry, StackRejection> {
        if self.entries.len() <= 1 {
            return Err(StackRejection::AtRoot);
        }
        self.entries.pop().ok_or(StackRejection::AtRoot)
    }

    pub fn pop_to(&mut self, id: &ScreenId) -> Result<(), StackRejection> {
        self.apply(&StackOp::PopTo(id.clone())).map(drop)
    }

    pub fn pop_to_root(&mut self) -> Result<(), StackRejection> {
        self.apply(&StackOp::PopToRoot).map(drop)
    }

    pub fn replace_root(&mut self, entry: ScreenEntry) -> Result<(), StackRejection> {
        self.apply(&StackOp::ReplaceRoot(entry)).map(drop)
    }
}
