#![forbid(unsafe_code)]

//! Reactive outputs of the navigator.
//!
//! - [`Observable`]: shared value with change notification.
//! - [`ReadOnly`]: the handle hosts receive.
//! - [`BatchScope`]: defers notifications so a navigation step is observed atomically.

pub mod batch;
pub mod observable;

pub use batch::BatchScope;
pub use observable::{Observable, ReadOnly, Subscription};
