// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Collects the instructions of one compilation unit and merges them into a
//! [`BytecodeBlob`].

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use super::blob::BytecodeBlob;
use super::opcode::{OpCode, OpMeta, OpcodeRecord, OperandKind};
use super::{BLOCK_SIZE, FIRST_REGISTER, MAX_UIDS_PER_BLOCK};
use crate::error::{Error, Result};
use crate::literal::{LiteralIndex, LiteralPool};

/// Instruction sink for the parser.
#[derive(Debug, Default)]
pub struct Serializer {
    ops: Vec<OpMeta>,
    show_opcodes: bool,
}

impl Serializer {
    /// Creates an empty serializer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the disassembly of every merged blob.
    pub fn set_show_opcodes(&mut self, show: bool) {
        self.show_opcodes = show;
    }

    /// Appends an instruction and returns its counter.
    pub fn dump_op_meta(&mut self, op: OpMeta) -> usize {
        self.ops.push(op);
        self.ops.len() - 1
    }

    /// Counter the next dumped instruction will get.
    pub fn current_counter(&self) -> usize {
        self.ops.len()
    }

    /// Returns the instruction at `counter`.
    pub fn op_meta(&self, counter: usize) -> Result<OpMeta> {
        self.ops
            .get(counter)
            .copied()
            .ok_or_else(|| Error::internal(format!("no instruction at counter {counter}")))
    }

    /// Moves the writing position back to `counter`, discarding the
    /// instructions from there on.
    pub fn set_writing_position(&mut self, counter: usize) -> Result<()> {
        if counter >= self.ops.len() {
            return Err(Error::internal(format!(
                "writing position {counter} is past the last instruction"
            )));
        }
        self.ops.truncate(counter);
        Ok(())
    }

    /// Replaces an already dumped instruction, typically to patch a jump.
    pub fn rewrite_op_meta(&mut self, counter: usize, op: OpMeta) -> Result<()> {
        let slot = self
            .ops
            .get_mut(counter)
            .ok_or_else(|| Error::internal(format!("no instruction at counter {counter}")))?;
        *slot = op;
        Ok(())
    }

    /// Encodes the collected instructions against `literals`.
    ///
    /// Instructions are grouped into blocks of [`BLOCK_SIZE`]. Inside a block
    /// every distinct literal gets a uid below [`FIRST_REGISTER`], written
    /// into the operand byte in place of the literal index.
    pub fn merge(&self, literals: &LiteralPool) -> Result<BytecodeBlob> {
        let mut records = Vec::with_capacity(self.ops.len());
        let mut blocks: Vec<Vec<LiteralIndex>> = Vec::new();
        let mut uids: FxHashMap<LiteralIndex, u8> = FxHashMap::default();
        let mut used_registers: Option<(u8, u8)> = None;

        for (counter, op) in self.ops.iter().enumerate() {
            if counter % BLOCK_SIZE == 0 {
                blocks.push(Vec::new());
                uids.clear();
            }
            let Some(block) = blocks.last_mut() else {
                return Err(Error::internal("no block open during merge"));
            };

            let mut record = op.record;
            let kinds = record.operand_kinds();

            for slot in 0..3 {
                match op.lit_ids[slot] {
                    Some(literal) => {
                        if !matches!(kinds[slot], OperandKind::Variable | OperandKind::Literal) {
                            return Err(Error::bytecode(format!(
                                "operand {slot} of {} at {counter} cannot refer to literal {literal}",
                                record.opcode.name()
                            )));
                        }
                        literals.lookup(literal)?;
                        let uid = match uids.get(&literal) {
                            Some(&uid) => uid,
                            None => {
                                if block.len() >= MAX_UIDS_PER_BLOCK {
                                    return Err(Error::bytecode(format!(
                                        "block {} references more than {MAX_UIDS_PER_BLOCK} literals",
                                        counter / BLOCK_SIZE
                                    )));
                                }
                                let uid = block.len() as u8;
                                block.push(literal);
                                uids.insert(literal, uid);
                                uid
                            }
                        };
                        record.operands[slot] = uid;
                    }
                    None if kinds[slot] == OperandKind::Variable
                        && record.operands[slot] >= FIRST_REGISTER =>
                    {
                        let reg = record.operands[slot];
                        used_registers = Some(match used_registers {
                            Some((min, max)) => (min.min(reg), max.max(reg)),
                            None => (reg, reg),
                        });
                    }
                    None => {}
                }
            }

            records.push(record);
        }

        let registers = match records.first() {
            Some(OpcodeRecord {
                opcode: OpCode::RegVarDecl,
                operands: [min, max, _],
            }) => Some((*min, *max)),
            _ => used_registers,
        };

        let blob = BytecodeBlob::from_parts(literals.clone(), blocks, records, registers)?;

        debug!(
            instructions = blob.instruction_count(),
            blocks = blob.block_count(),
            literals = literals.count(),
            registers = ?registers,
            "merged bytecode"
        );
        if self.show_opcodes {
            info!("\n{}", blob.disassemble());
        }

        Ok(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::AssignmentType;
    use crate::literal::LiteralValue;

    #[test]
    fn test_dump_and_rewrite() {
        let mut serializer = Serializer::new();
        assert_eq!(serializer.current_counter(), 0);
        let jump = serializer.dump_op_meta(OpMeta::new(OpCode::JmpDown, [0, 0, 0]));
        serializer.dump_op_meta(OpMeta::new(OpCode::Nop, [0, 0, 0]));
        serializer
            .rewrite_op_meta(jump, OpMeta::new(OpCode::JmpDown, [0, 2, 0]))
            .unwrap();

        assert_eq!(serializer.op_meta(jump).unwrap().record.operands, [0, 2, 0]);
        assert!(serializer.rewrite_op_meta(5, OpMeta::new(OpCode::Nop, [0; 3])).is_err());
    }

    #[test]
    fn test_set_writing_position() {
        let mut serializer = Serializer::new();
        for _ in 0..4 {
            serializer.dump_op_meta(OpMeta::new(OpCode::Nop, [0, 0, 0]));
        }
        serializer.set_writing_position(2).unwrap();
        assert_eq!(serializer.current_counter(), 2);
        assert!(serializer.set_writing_position(2).is_err());
    }

    #[test]
    fn test_uids_restart_per_block() {
        let mut pool = LiteralPool::new();
        let a = pool.insert(LiteralValue::from("a"));
        let b = pool.insert(LiteralValue::from("b"));

        let mut serializer = Serializer::new();
        serializer.dump_op_meta(OpMeta::new(OpCode::VarDecl, [0; 3]).with_literal(0, b));
        for _ in 1..BLOCK_SIZE {
            serializer.dump_op_meta(OpMeta::new(OpCode::VarDecl, [0; 3]).with_literal(0, a));
        }
        serializer.dump_op_meta(OpMeta::new(OpCode::VarDecl, [0; 3]).with_literal(0, a));

        let blob = serializer.merge(&pool).unwrap();
        assert_eq!(blob.block_count(), 2);
        // `a` is the second literal of the first block, the first of the second.
        assert_eq!(blob.opcode_at(1).unwrap().operands[0], 1);
        assert_eq!(blob.opcode_at(BLOCK_SIZE).unwrap().operands[0], 0);
        assert_eq!(blob.literal_id_for_operand(BLOCK_SIZE, 0).unwrap(), Some(a));
    }

    #[test]
    fn test_register_range() {
        let pool = LiteralPool::new();
        let mut serializer = Serializer::new();
        serializer.dump_op_meta(OpMeta::new(OpCode::Addition, [130, 129, 131]));
        let blob = serializer.merge(&pool).unwrap();
        assert_eq!(blob.register_range(), Some((129, 131)));

        let mut serializer = Serializer::new();
        serializer.dump_op_meta(OpMeta::new(OpCode::RegVarDecl, [128, 140, 0]));
        serializer.dump_op_meta(OpMeta::new(OpCode::Addition, [130, 129, 131]));
        let blob = serializer.merge(&pool).unwrap();
        assert_eq!(blob.min_register(), Some(128));
        assert_eq!(blob.max_register(), Some(140));
    }

    #[test]
    fn test_merge_rejects_unknown_literal() {
        let pool = LiteralPool::new();
        let mut serializer = Serializer::new();
        serializer.dump_op_meta(OpMeta::new(OpCode::VarDecl, [0; 3]).with_literal(0, LiteralIndex(4)));
        assert!(serializer.merge(&pool).is_err());
    }

    #[test]
    fn test_merge_rejects_literal_in_immediate_operand() {
        let mut pool = LiteralPool::new();
        let x = pool.insert(LiteralValue::from("x"));

        let mut serializer = Serializer::new();
        serializer.dump_op_meta(OpMeta::new(OpCode::JmpDown, [0; 3]).with_literal(1, x));
        let err = serializer.merge(&pool).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Internal);

        // A small-integer assignment keeps its value inline.
        let mut serializer = Serializer::new();
        serializer.dump_op_meta(
            OpMeta::new(OpCode::Assignment, [128, AssignmentType::SmallInt as u8, 0]).with_literal(2, x),
        );
        assert!(serializer.merge(&pool).is_err());

        let mut serializer = Serializer::new();
        serializer.dump_op_meta(OpMeta::new(OpCode::Ret, [0; 3]).with_literal(0, x));
        assert!(serializer.merge(&pool).is_err());
    }
}
