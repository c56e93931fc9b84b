//! Decorator Module
//!
//! Turns a computation into a read-through cache entry or an
//! invalidate-on-call wrapper bound to a cache backend.

mod key;
mod wrap;

pub use key::{render, CallArgs, KeyArgs, KeyTemplate};
pub use wrap::{CacheDecorator, CachedFn, WrapPolicy};
