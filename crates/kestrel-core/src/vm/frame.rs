// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interpreter frames and variable resolution.

use std::borrow::Cow;

use tracing::trace;

use super::completion::{Completion, CompletionResult};
use super::environment::LexicalEnvironment;
use super::value::Value;
use crate::bytecode::BytecodeBlob;
use crate::error::{Error, Result};
use crate::literal::{EcmaChar, MagicString};

/// Execution state of one code unit: its registers, its scope chain and the
/// instruction being executed.
///
/// Variable ids inside `[min_reg, max_reg]` name registers. Every other id
/// is a block-local literal uid naming a variable in the environment.
#[derive(Debug)]
pub struct Frame<'a, E: LexicalEnvironment> {
    bytecode: &'a BytecodeBlob,
    env: &'a mut E,
    registers: Vec<Option<Value>>,
    min_reg: u8,
    max_reg: u8,
    strict: bool,
    pos: usize,
}

impl<'a, E: LexicalEnvironment> Frame<'a, E> {
    /// Creates a frame sized from the bytecode's register range.
    pub fn new(bytecode: &'a BytecodeBlob, env: &'a mut E, strict: bool) -> Self {
        match bytecode.register_range() {
            Some((min, max)) => Self::with_registers(bytecode, env, strict, min, max),
            None => Self {
                bytecode,
                env,
                registers: Vec::new(),
                min_reg: u8::MAX,
                max_reg: 0,
                strict,
                pos: 0,
            },
        }
    }

    /// Creates a frame with the registers `min_reg..=max_reg`.
    pub fn with_registers(
        bytecode: &'a BytecodeBlob,
        env: &'a mut E,
        strict: bool,
        min_reg: u8,
        max_reg: u8,
    ) -> Self {
        let count = if min_reg <= max_reg {
            usize::from(max_reg - min_reg) + 1
        } else {
            0
        };
        Self {
            bytecode,
            env,
            registers: vec![None; count],
            min_reg,
            max_reg,
            strict,
            pos: 0,
        }
    }

    /// Counter of the instruction being executed.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Moves to the instruction at `counter`.
    pub fn set_pos(&mut self, counter: usize) {
        self.pos = counter;
    }

    /// Returns true when executing strict mode code.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The bytecode being executed.
    pub fn bytecode(&self) -> &'a BytecodeBlob {
        self.bytecode
    }

    /// The environment names resolve against.
    pub fn environment(&self) -> &E {
        &*self.env
    }

    /// Returns true if `var_id` names a register of this frame.
    #[inline]
    pub fn is_register(&self, var_id: u8) -> bool {
        (self.min_reg..=self.max_reg).contains(&var_id)
    }

    /// Reads variable `var_id`.
    ///
    /// With `check_eval_arguments`, strict code may not resolve `eval` or
    /// `arguments` to a binding.
    pub fn get(&self, var_id: u8, check_eval_arguments: bool) -> CompletionResult {
        if self.is_register(var_id) {
            let slot = usize::from(var_id - self.min_reg);
            return match &self.registers[slot] {
                Some(value) => Ok(Completion::Normal(value.clone())),
                None => Err(Error::internal(format!(
                    "register r{var_id} read before it was written"
                ))),
            };
        }

        let name = self.variable_name(var_id, self.pos)?;
        let base = self.env.resolve_reference_base(&name);
        trace!(var_id, resolved = base.is_some(), "named variable read");

        if check_eval_arguments {
            self.check_eval_arguments(base.is_some(), &name)?;
        }
        self.env.get_value(base, &name, self.strict)
    }

    /// Writes `value` to variable `var_id`, resolving names at the current
    /// instruction.
    pub fn set(&mut self, var_id: u8, value: Value) -> CompletionResult {
        self.set_at(self.pos, var_id, value)
    }

    /// Writes `value` to variable `var_id`, resolving names in the uid block
    /// of the instruction at `lit_counter`.
    pub fn set_at(&mut self, lit_counter: usize, var_id: u8, value: Value) -> CompletionResult {
        if self.is_register(var_id) {
            let slot = &mut self.registers[usize::from(var_id - self.min_reg)];
            // Numbers are overwritten in place.
            if let (Some(Value::Number(old)), Some(new)) = (slot.as_mut(), value.as_number()) {
                *old = new;
                return Ok(Completion::Empty);
            }
            *slot = Some(value);
            return Ok(Completion::Empty);
        }

        let name = self.variable_name(var_id, lit_counter)?;
        let base = self.env.resolve_reference_base(&name);
        trace!(var_id, resolved = base.is_some(), "named variable write");

        self.check_eval_arguments(base.is_some(), &name)?;
        self.env.put_value(base, &name, self.strict, value)
    }

    fn variable_name(&self, var_id: u8, counter: usize) -> Result<Cow<'a, [EcmaChar]>> {
        let id = self.bytecode.literal_id_by_uid(var_id, counter).ok_or_else(|| {
            Error::internal(format!("variable {var_id} has no literal at counter {counter}"))
        })?;
        self.bytecode.literals().string_units(id)
    }

    fn check_eval_arguments(&self, resolved: bool, name: &[EcmaChar]) -> Result<()> {
        if self.strict
            && resolved
            && matches!(
                MagicString::find(name),
                Some(MagicString::Eval | MagicString::Arguments)
            )
        {
            return Err(Error::syntax_unpositioned(format!(
                "'{}' may not be rebound in strict mode code",
                String::from_utf16_lossy(name)
            )));
        }
        Ok(())
    }
}
