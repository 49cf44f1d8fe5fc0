// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Completion values.
//!
//! Every VM operation reports how it finished. A thrown exception travels on
//! the `Err` side of [`CompletionResult`], so `?` propagates it; the other
//! outcomes are [`Completion`] variants.

use super::value::Value;
use crate::error::{Error, Result};

/// How an operation finished when it did not throw.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Finished with a value
    Normal(Value),
    /// `return` with a value
    Return(Value),
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// Finished without producing a value
    Empty,
}

/// Result of an operation under the completion protocol.
pub type CompletionResult = Result<Completion>;

impl Completion {
    /// Returns true for [`Completion::Normal`].
    pub fn is_normal(&self) -> bool {
        matches!(self, Completion::Normal(_))
    }

    /// Returns true for [`Completion::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Completion::Empty)
    }

    /// Returns true for control transfers that skip the rest of a block.
    pub fn is_abrupt(&self) -> bool {
        matches!(
            self,
            Completion::Return(_) | Completion::Break | Completion::Continue
        )
    }

    /// The carried value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Completion::Normal(v) | Completion::Return(v) => Some(v),
            _ => None,
        }
    }

    /// Takes the carried value, if any.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Completion::Normal(v) | Completion::Return(v) => Some(v),
            _ => None,
        }
    }

    /// Unwraps a normal completion, failing on anything else.
    pub fn expect_normal(self) -> Result<Value> {
        match self {
            Completion::Normal(v) => Ok(v),
            other => Err(Error::internal(format!("expected a normal completion, got {other:?}"))),
        }
    }
}

/// Throws `value` as an exception.
pub fn throw(value: Value) -> CompletionResult {
    Err(Error::Thrown(value))
}
