//! Property-based invariants for `ScreenStack`.
//!
//! 1. **Non-empty**: the stack never drops below one entry.
//! 2. **Unique identities**: no reachable state holds two entries with the
//!    same id.
//! 3. **Root preserved**: pop, pop_to and pop_to_root never change the root.
//! 4. **Push/pop symmetry**: a successful push followed by pop restores the
//!    previous sequence.
//! 5. **Preview agrees with apply**: `StackOp::apply_to` produces exactly
//!    the sequence a committed op leaves behind, and a rejected preview
//!    leaves the stack untouched when applied.

use std::collections::HashSet;

use navkit_core::{AnimationStyle, Screen, ScreenEntry, ScreenId, ScreenStack, StackOp};
use proptest::prelude::*;

struct Named(String);

impl Screen for Named {
    fn identity(&self) -> ScreenId {
        ScreenId::new(&self.0)
    }
}

fn entry(n: u8) -> ScreenEntry {
    ScreenEntry::new(Named(format!("s{n}")), AnimationStyle::HorizontalSlide)
}

#[derive(Debug, Clone)]
enum Op {
    Push(u8),
    Pop,
    PopTo(u8),
    PopToRoot,
    ReplaceRoot(u8),
    SetRoot(u8),
}

impl Op {
    fn to_stack_op(&self) -> StackOp {
        match *self {
            Self::Push(n) => StackOp::Push(entry(n)),
            Self::Pop => StackOp::Pop,
            Self::PopTo(n) => StackOp::PopTo(ScreenId::new(format!("s{n}"))),
            Self::PopToRoot => StackOp::PopToRoot,
            Self::ReplaceRoot(n) => StackOp::ReplaceRoot(entry(n)),
            Self::SetRoot(n) => StackOp::SetRoot(entry(n)),
        }
    }

    fn keeps_root(&self) -> bool {
        matches!(self, Self::Push(_) | Self::Pop | Self::PopTo(_) | Self::PopToRoot)
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..16).prop_map(Op::Push),
        3 => Just(Op::Pop),
        2 => (0u8..16).prop_map(Op::PopTo),
        1 => Just(Op::PopToRoot),
        1 => (0u8..16).prop_map(Op::ReplaceRoot),
        1 => (0u8..16).prop_map(Op::SetRoot),
    ]
}

fn ids(stack: &ScreenStack) -> Vec<ScreenId> {
    stack.ids()
}

proptest! {
    #[test]
    fn invariants_hold_across_arbitrary_ops(
        ops in prop::collection::vec(op_strategy(), 0..300),
    ) {
        let mut stack = ScreenStack::new(entry(0));
        for op in &ops {
            let root_before = stack.root().id().clone();
            let before = ids(&stack);
            let stack_op = op.to_stack_op();
            let preview = stack.preview(&stack_op);
            let applied = stack.apply(&stack_op);

            prop_assert_eq!(preview.is_ok(), applied.is_ok());
            match preview {
                Ok(next) => {
                    let next: Vec<ScreenId> = next.iter().map(|e| e.id().clone()).collect();
                    prop_assert_eq!(&next, &ids(&stack));
                }
                Err(_) => prop_assert_eq!(&before, &ids(&stack)),
            }

            prop_assert!(!stack.is_empty());
            let unique: HashSet<&ScreenId> = stack.entries().iter().map(ScreenEntry::id).collect();
            prop_assert_eq!(unique.len(), stack.len());
            if op.keeps_root() {
                prop_assert_eq!(stack.root().id(), &root_before);
            }
        }
    }

    #[test]
    fn push_then_pop_restores(
        setup in prop::collection::vec(0u8..16, 0..10),
        pushed in 16u8..32,
    ) {
        let mut stack = ScreenStack::new(entry(0));
        for n in setup {
            let _ = stack.push(entry(n));
        }
        let before = ids(&stack);
        let top_before = stack.top().id().clone();

        stack.push(entry(pushed)).expect("fresh identity");
        prop_assert_eq!(stack.top().id(), &ScreenId::new(format!("s{pushed}")));
        stack.pop().expect("depth > 1");

        prop_assert_eq!(ids(&stack), before);
        prop_assert_eq!(stack.top().id(), &top_before);
    }

    #[test]
    fn double_push_leaves_one(n in 1u8..16) {
        let mut stack = ScreenStack::new(entry(0));
        let _ = stack.push(entry(n));
        let _ = stack.push(entry(n));
        let id = ScreenId::new(format!("s{n}"));
        let count = stack.entries().iter().filter(|e| e.id() == &id).count();
        prop_assert_eq!(count, 1);
    }
}

#[test]
fn pop_at_root_is_rejected_without_change() {
    let mut stack = ScreenStack::new(entry(0));
    assert!(stack.apply(&StackOp::Pop).is_err());
    assert!(stack.apply(&StackOp::PopToRoot).is_err());
    assert_eq!(stack.len(), 1);
}
