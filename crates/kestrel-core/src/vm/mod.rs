//! Runtime support the interpreter builds on.
//!
//! ## Structure
//!
//! - `value` - The [`Value`] model
//! - `completion` - [`Completion`] and the completion protocol
//! - `environment` - The [`LexicalEnvironment`] trait and [`ScopeChain`]
//! - `frame` - [`Frame`], which resolves variable ids to registers or names

mod completion;
mod environment;
mod frame;
mod value;

pub use completion::{Completion, CompletionResult, throw};
pub use environment::{LexicalEnvironment, ScopeChain};
pub use frame::Frame;
pub use value::Value;
