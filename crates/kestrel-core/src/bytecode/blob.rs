// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The merged bytecode of a compilation unit and its binary form.

use std::fmt::Write as _;

use super::opcode::{OpcodeRecord, OperandKind};
use super::{BLOCK_SIZE, BYTECODE_MAGIC, BYTECODE_VERSION, FIRST_REGISTER};
use crate::error::{Error, Result};
use crate::literal::{Literal, LiteralIndex, LiteralPool, LiteralValue, MagicString};

const TAG_STRING: u8 = 0;
const TAG_NUMBER: u8 = 1;
const TAG_MAGIC: u8 = 2;

/// Instructions plus the literal cross-references they need.
///
/// For any instruction counter the record and the literal behind each
/// operand are found in constant time.
#[derive(Debug, Clone)]
pub struct BytecodeBlob {
    literals: LiteralPool,
    blocks: Vec<Vec<LiteralIndex>>,
    records: Vec<OpcodeRecord>,
    registers: Option<(u8, u8)>,
}

impl BytecodeBlob {
    pub(crate) fn from_parts(
        literals: LiteralPool,
        blocks: Vec<Vec<LiteralIndex>>,
        records: Vec<OpcodeRecord>,
        registers: Option<(u8, u8)>,
    ) -> Result<Self> {
        if blocks.len() != records.len().div_ceil(BLOCK_SIZE) {
            return Err(Error::bytecode(format!(
                "{} uid tables for {} instructions",
                blocks.len(),
                records.len()
            )));
        }
        if let Some(bad) = blocks
            .iter()
            .flatten()
            .find(|index| index.as_usize() >= literals.count())
        {
            return Err(Error::bytecode(format!("uid table refers to missing literal {bad}")));
        }
        if let Some((min, max)) = registers {
            if min < FIRST_REGISTER || min > max {
                return Err(Error::bytecode(format!("invalid register range {min}..={max}")));
            }
        }
        Ok(Self {
            literals,
            blocks,
            records,
            registers,
        })
    }

    /// Number of instructions.
    pub fn instruction_count(&self) -> usize {
        self.records.len()
    }

    /// Number of uid blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// The instruction at `counter`.
    pub fn opcode_at(&self, counter: usize) -> Result<OpcodeRecord> {
        self.records
            .get(counter)
            .copied()
            .ok_or_else(|| Error::bytecode(format!("instruction counter {counter} out of range")))
    }

    /// Maps a block-local uid, as seen at `counter`, to its literal.
    ///
    /// Returns `None` for register ids and for uids the block never assigned.
    pub fn literal_id_by_uid(&self, uid: u8, counter: usize) -> Option<LiteralIndex> {
        if uid >= FIRST_REGISTER {
            return None;
        }
        self.blocks
            .get(counter / BLOCK_SIZE)?
            .get(uid as usize)
            .copied()
    }

    /// The literal referenced by operand `slot` of the instruction at
    /// `counter`, or `None` when that operand is not a literal.
    pub fn literal_id_for_operand(&self, counter: usize, slot: usize) -> Result<Option<LiteralIndex>> {
        let record = self.opcode_at(counter)?;
        let kind = record
            .operand_kinds()
            .get(slot)
            .copied()
            .ok_or_else(|| Error::bytecode(format!("operand slot {slot} out of range")))?;
        let byte = record.operands[slot];
        Ok(match kind {
            OperandKind::Variable | OperandKind::Literal => self.literal_id_by_uid(byte, counter),
            OperandKind::Immediate | OperandKind::Unused => None,
        })
    }

    /// The literal with global index `id`.
    pub fn literal(&self, id: LiteralIndex) -> Result<LiteralValue<'_>> {
        self.literals.value(id)
    }

    /// The literal table.
    pub fn literals(&self) -> &LiteralPool {
        &self.literals
    }

    /// Lowest register id used, for frame sizing.
    pub fn min_register(&self) -> Option<u8> {
        self.registers.map(|(min, _)| min)
    }

    /// Highest register id used.
    pub fn max_register(&self) -> Option<u8> {
        self.registers.map(|(_, max)| max)
    }

    /// Inclusive register range, if the code uses registers at all.
    pub fn register_range(&self) -> Option<(u8, u8)> {
        self.registers
    }

    /// Encodes the blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(16 + self.records.len() * OpcodeRecord::SIZE);

        // Header
        bytes.extend_from_slice(&BYTECODE_MAGIC);
        bytes.extend_from_slice(&BYTECODE_VERSION.to_le_bytes());

        // Literal table
        bytes.extend_from_slice(&(self.literals.count() as u32).to_le_bytes());
        for (_, literal) in self.literals.iter() {
            match *literal {
                Literal::Magic(magic) => {
                    bytes.push(TAG_MAGIC);
                    bytes.push(magic.id());
                }
                Literal::Number(n) => {
                    bytes.push(TAG_NUMBER);
                    bytes.extend_from_slice(&n.to_bits().to_le_bytes());
                }
                Literal::String(_) => {
                    let value = self.literals.resolve(literal)?;
                    let units = value
                        .as_units()
                        .ok_or_else(|| Error::internal("string literal resolved to a number"))?;
                    bytes.push(TAG_STRING);
                    bytes.extend_from_slice(&(units.len() as u32).to_le_bytes());
                    for unit in units {
                        bytes.extend_from_slice(&unit.to_le_bytes());
                    }
                }
            }
        }

        // Registers
        match self.registers {
            Some((min, max)) => bytes.extend_from_slice(&[1, min, max]),
            None => bytes.extend_from_slice(&[0, 0, 0]),
        }

        // Uid tables
        bytes.extend_from_slice(&(self.blocks.len() as u32).to_le_bytes());
        for block in &self.blocks {
            bytes.push(block.len() as u8);
            for index in block {
                bytes.extend_from_slice(&index.0.to_le_bytes());
            }
        }

        // Instructions
        bytes.extend_from_slice(&(self.records.len() as u32).to_le_bytes());
        for record in &self.records {
            bytes.extend_from_slice(&record.to_bytes());
        }

        Ok(bytes)
    }

    /// Decodes a blob produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);

        if reader.take(BYTECODE_MAGIC.len())? != BYTECODE_MAGIC {
            return Err(Error::bytecode("invalid bytecode magic"));
        }
        let version = reader.u32()?;
        if version != BYTECODE_VERSION {
            return Err(Error::bytecode(format!("unsupported bytecode version {version}")));
        }

        let literal_count = reader.u32()? as usize;
        let mut literals = LiteralPool::new();
        for expected in 0..literal_count {
            let index = match reader.u8()? {
                TAG_STRING => {
                    let len = reader.u32()? as usize;
                    let units = (0..len).map(|_| reader.u16()).collect::<Result<Vec<_>>>()?;
                    literals.insert(LiteralValue::string(&units))
                }
                TAG_NUMBER => literals.insert(LiteralValue::Number(f64::from_bits(reader.u64()?))),
                TAG_MAGIC => {
                    let id = reader.u8()?;
                    let magic = MagicString::from_id(id)
                        .ok_or_else(|| Error::bytecode(format!("unknown magic string id {id}")))?;
                    literals.insert(LiteralValue::from(magic.as_str()))
                }
                tag => return Err(Error::bytecode(format!("unknown literal tag {tag}"))),
            };
            if index.as_usize() != expected {
                return Err(Error::bytecode(format!("duplicate literal at {expected}")));
            }
        }

        let registers = match reader.take(3)? {
            [0, _, _] => None,
            [1, min, max] => Some((*min, *max)),
            _ => return Err(Error::bytecode("invalid register header")),
        };

        let block_count = reader.u32()? as usize;
        let mut blocks = Vec::with_capacity(block_count.min(1024));
        for _ in 0..block_count {
            let len = reader.u8()? as usize;
            let block = (0..len)
                .map(|_| reader.u32().map(LiteralIndex))
                .collect::<Result<Vec<_>>>()?;
            blocks.push(block);
        }

        let record_count = reader.u32()? as usize;
        let mut records = Vec::with_capacity(record_count.min(1 << 16));
        for _ in 0..record_count {
            let chunk = reader.take(OpcodeRecord::SIZE)?;
            records.push(OpcodeRecord::from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])?);
        }

        if !reader.is_at_end() {
            return Err(Error::bytecode("trailing bytes after instructions"));
        }

        Self::from_parts(literals, blocks, records, registers)
    }

    /// Renders the literal table and one line per instruction.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "; {} literals", self.literals.count());
        for (index, _) in self.literals.iter() {
            let _ = writeln!(out, ";   {index} = {}", self.render_literal(index));
        }
        if let Some((min, max)) = self.registers {
            let _ = writeln!(out, "; registers r{min}..=r{max}");
        }

        for (counter, record) in self.records.iter().enumerate() {
            let _ = write!(out, "{counter:>5}: {:<22}", record.opcode.name());
            let kinds = record.operand_kinds();
            for slot in 0..3 {
                let byte = record.operands[slot];
                match kinds[slot] {
                    OperandKind::Unused => continue,
                    OperandKind::Immediate => {
                        let _ = write!(out, " {byte}");
                    }
                    OperandKind::Variable | OperandKind::Literal => {
                        match self.literal_id_by_uid(byte, counter) {
                            Some(index) => {
                                let _ = write!(out, " {}", self.render_literal(index));
                            }
                            None if byte >= FIRST_REGISTER => {
                                let _ = write!(out, " r{byte}");
                            }
                            None => {
                                let _ = write!(out, " ?{byte}");
                            }
                        }
                    }
                }
            }
            out.push('\n');
        }

        out
    }

    fn render_literal(&self, index: LiteralIndex) -> String {
        match self.literals.value(index) {
            Ok(value) => value.to_string(),
            Err(_) => format!("<invalid {index}>"),
        }
    }
}

/// Owns the decoded bytecode of the unit being executed.
#[derive(Debug, Default)]
pub struct Deserializer {
    current: Option<BytecodeBlob>,
}

impl Deserializer {
    /// Creates a handle with no bytecode loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `bytes` and makes the result the current bytecode.
    pub fn load(&mut self, bytes: &[u8]) -> Result<&BytecodeBlob> {
        let blob = BytecodeBlob::from_bytes(bytes)?;
        Ok(self.current.insert(blob))
    }

    /// Makes an already decoded blob current.
    pub fn set_current(&mut self, blob: BytecodeBlob) -> &BytecodeBlob {
        self.current.insert(blob)
    }

    /// The current bytecode.
    pub fn current(&self) -> Result<&BytecodeBlob> {
        self.current
            .as_ref()
            .ok_or_else(|| Error::internal("no bytecode loaded"))
    }

    /// Shorthand for `current()?.opcode_at(counter)`.
    pub fn opcode_at(&self, counter: usize) -> Result<OpcodeRecord> {
        self.current()?.opcode_at(counter)
    }

    /// Shorthand for `current()?.literal_id_for_operand(counter, slot)`.
    pub fn literal_id_for_operand(&self, counter: usize, slot: usize) -> Result<Option<LiteralIndex>> {
        self.current()?.literal_id_for_operand(counter, slot)
    }

    /// Drops the current bytecode.
    pub fn free(&mut self) {
        self.current = None;
    }
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| Error::bytecode("unexpected end of bytecode"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_le_bytes(buf))
    }

    fn is_at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{OpCode, OpMeta, Serializer};

    fn sample() -> BytecodeBlob {
        let mut pool = LiteralPool::new();
        let x = pool.insert(LiteralValue::from("x"));
        let length = pool.insert(LiteralValue::from("length"));
        let pi = pool.insert(LiteralValue::from(3.25));

        let mut serializer = Serializer::new();
        serializer.dump_op_meta(OpMeta::new(OpCode::RegVarDecl, [128, 129, 0]));
        serializer.dump_op_meta(OpMeta::new(OpCode::VarDecl, [0; 3]).with_literal(0, x));
        serializer.dump_op_meta(OpMeta::new(OpCode::Assignment, [128, 3, 0]).with_literal(2, pi));
        serializer.dump_op_meta(
            OpMeta::new(OpCode::PropGetter, [129, 128, 0]).with_literal(2, length),
        );
        serializer.dump_op_meta(OpMeta::new(OpCode::Ret, [0; 3]));
        serializer.merge(&pool).unwrap()
    }

    #[test]
    fn test_bytes_roundtrip() {
        let blob = sample();
        let bytes = blob.to_bytes().unwrap();
        let decoded = BytecodeBlob::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.instruction_count(), 5);
        assert_eq!(decoded.register_range(), Some((128, 129)));
        for counter in 0..blob.instruction_count() {
            assert_eq!(decoded.opcode_at(counter).unwrap(), blob.opcode_at(counter).unwrap());
            for slot in 0..3 {
                let id = blob.literal_id_for_operand(counter, slot).unwrap();
                assert_eq!(decoded.literal_id_for_operand(counter, slot).unwrap(), id);
                if let Some(id) = id {
                    assert_eq!(decoded.literal(id).unwrap(), blob.literal(id).unwrap());
                }
            }
        }
        assert_eq!(
            decoded.literals().lookup(LiteralIndex(1)).unwrap(),
            Literal::Magic(MagicString::Length)
        );
    }

    #[test]
    fn test_rejects_corruption() {
        let bytes = sample().to_bytes().unwrap();

        assert!(BytecodeBlob::from_bytes(&bytes[..bytes.len() - 1]).is_err());

        let mut bad_magic = bytes.clone();
        bad_magic[0] ^= 0xFF;
        assert!(BytecodeBlob::from_bytes(&bad_magic).is_err());

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(BytecodeBlob::from_bytes(&trailing).is_err());

        let mut bad_opcode = bytes;
        let last_record = bad_opcode.len() - OpcodeRecord::SIZE;
        bad_opcode[last_record] = 0xEE;
        assert!(BytecodeBlob::from_bytes(&bad_opcode).is_err());
    }

    #[test]
    fn test_disassemble() {
        let text = sample().disassemble();
        assert!(text.contains("var_decl"));
        assert!(text.contains("\"x\""));
        assert!(text.contains("3.25"));
        assert!(text.contains("r128"));
        assert!(text.contains("; registers r128..=r129"));
    }

    #[test]
    fn test_deserializer_handle() {
        let mut deserializer = Deserializer::new();
        assert!(deserializer.opcode_at(0).is_err());

        let bytes = sample().to_bytes().unwrap();
        deserializer.load(&bytes).unwrap();
        assert_eq!(deserializer.opcode_at(4).unwrap().opcode, OpCode::Ret);
        assert_eq!(deserializer.literal_id_for_operand(1, 0).unwrap(), Some(LiteralIndex(0)));

        deserializer.free();
        assert!(deserializer.current().is_err());
    }
}
