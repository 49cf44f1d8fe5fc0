//! Lexical environments for named variables.

use rustc_hash::FxHashMap;

use super::completion::{Completion, CompletionResult};
use super::value::Value;
use crate::error::Error;
use crate::literal::EcmaChar;

/// The scope chain a frame resolves names against.
///
/// `Base` identifies the environment record that holds a binding. A `None`
/// base means the name did not resolve.
pub trait LexicalEnvironment {
    /// Handle of the record holding a binding.
    type Base: Copy;

    /// Finds the innermost record that binds `name`.
    fn resolve_reference_base(&self, name: &[EcmaChar]) -> Option<Self::Base>;

    /// Reads `name` from `base`.
    fn get_value(&self, base: Option<Self::Base>, name: &[EcmaChar], strict: bool) -> CompletionResult;

    /// Writes `value` to `name` in `base`.
    fn put_value(
        &mut self,
        base: Option<Self::Base>,
        name: &[EcmaChar],
        strict: bool,
        value: Value,
    ) -> CompletionResult;
}

/// A stack of declarative scopes; index 0 is the global scope.
#[derive(Debug, Clone)]
pub struct ScopeChain {
    scopes: Vec<FxHashMap<Vec<EcmaChar>, Value>>,
}

impl ScopeChain {
    /// Creates a chain holding only an empty global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Enters a new innermost scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Leaves the innermost scope. The global scope is never popped.
    pub fn pop_scope(&mut self) -> bool {
        if self.scopes.len() > 1 {
            self.scopes.pop();
            true
        } else {
            false
        }
    }

    /// Number of scopes, the global one included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declares `name` in the innermost scope.
    pub fn declare(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.encode_utf16().collect(), value);
        }
    }

    /// Looks `name` up along the chain.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let units: Vec<EcmaChar> = name.encode_utf16().collect();
        let base = self.resolve_reference_base(&units)?;
        self.scopes[base].get(units.as_slice())
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalEnvironment for ScopeChain {
    type Base = usize;

    fn resolve_reference_base(&self, name: &[EcmaChar]) -> Option<usize> {
        self.scopes.iter().rposition(|scope| scope.contains_key(name))
    }

    fn get_value(&self, base: Option<usize>, name: &[EcmaChar], _strict: bool) -> CompletionResult {
        let value = base
            .and_then(|index| self.scopes.get(index))
            .and_then(|scope| scope.get(name))
            .ok_or_else(|| {
                Error::reference(format!("{} is not defined", String::from_utf16_lossy(name)))
            })?;
        Ok(Completion::Normal(value.clone()))
    }

    fn put_value(
        &mut self,
        base: Option<usize>,
        name: &[EcmaChar],
        strict: bool,
        value: Value,
    ) -> CompletionResult {
        let index = match base {
            Some(index) => index,
            None if strict => {
                return Err(Error::reference(format!(
                    "{} is not defined",
                    String::from_utf16_lossy(name)
                )));
            }
            None => 0,
        };
        let scope = self
            .scopes
            .get_mut(index)
            .ok_or_else(|| Error::internal(format!("scope {index} does not exist")))?;
        scope.insert(name.to_vec(), value);
        Ok(Completion::Empty)
    }
}
