#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use navkit_core::{AnimationStyle, Screen, ScreenEntry, ScreenId, ScreenStack, StackOp};

struct Named(u8);

impl Screen for Named {
    fn identity(&self) -> ScreenId {
        ScreenId::new(format!("s{}", self.0 % 16))
    }
}

#[derive(Debug, Arbitrary)]
enum Op {
    SetRoot(u8),
    Push(u8),
    Pop,
    PopTo(u8),
    PopToRoot,
    ReplaceRoot(u8),
}

fn entry(n: u8) -> ScreenEntry {
    ScreenEntry::new(Named(n), AnimationStyle::None)
}

fuzz_target!(|ops: Vec<Op>| {
    let mut stack = ScreenStack::new(entry(0));
    for op in ops.into_iter().take(256) {
        let op = match op {
            Op::SetRoot(n) => StackOp::SetRoot(entry(n)),
            Op::Push(n) => StackOp::Push(entry(n)),
            Op::Pop => StackOp::Pop,
            Op::PopTo(n) => StackOp::PopTo(ScreenId::new(format!("s{}", n % 16))),
            Op::PopToRoot => StackOp::PopToRoot,
            Op::ReplaceRoot(n) => StackOp::ReplaceRoot(entry(n)),
        };
        let root_before = stack.root().id().clone();
        let preview = stack.preview(&op);
        let applied = stack.apply(&op);
        assert_eq!(preview.is_ok(), applied.is_ok(), "preview disagrees with apply");
        if let Ok(next) = preview {
            let ids: Vec<_> = next.iter().map(|e| e.id().clone()).collect();
            assert_eq!(ids, stack.ids(), "preview produced a different stack");
        }

        // Post-conditions that must always hold:
        assert!(!stack.is_empty(), "stack emptied");
        let ids = stack.ids();
        for (i, id) in ids.iter().enumerate() {
            assert!(!ids[i + 1..].contains(id), "duplicate identity {id}");
        }
        if !matches!(op, StackOp::SetRoot(_) | StackOp::ReplaceRoot(_)) {
            assert_eq!(stack.root().id(), &root_before, "root removed");
        }
    }
});
