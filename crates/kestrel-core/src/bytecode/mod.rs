// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Register-machine bytecode and its binary encoding.
//!
//! The parser emits [`OpMeta`] instructions into a [`Serializer`], patching
//! jumps as it goes. [`Serializer::merge`] turns them into a
//! [`BytecodeBlob`]: fixed 4-byte [`OpcodeRecord`]s whose literal operands
//! are block-local uids, plus the tables mapping those uids back to the
//! literal pool.
//!
//! ## Operand space
//!
//! | Byte | Meaning |
//! |------|---------|
//! | `0..128` | Block-local literal uid |
//! | `128..=255` | Register id |
//!
//! ## Usage
//!
//! ```rust
//! use kestrel_core::bytecode::{BytecodeBlob, OpCode, OpMeta, Serializer};
//! use kestrel_core::literal::{LiteralPool, LiteralValue};
//!
//! let mut pool = LiteralPool::new();
//! let name = pool.insert(LiteralValue::from("answer"));
//!
//! let mut serializer = Serializer::new();
//! serializer.dump_op_meta(OpMeta::new(OpCode::VarDecl, [0; 3]).with_literal(0, name));
//! serializer.dump_op_meta(OpMeta::new(OpCode::Ret, [0; 3]));
//!
//! let blob = serializer.merge(&pool).unwrap();
//! let bytes = blob.to_bytes().unwrap();
//! let decoded = BytecodeBlob::from_bytes(&bytes).unwrap();
//! assert_eq!(decoded.literal_id_for_operand(0, 0).unwrap(), Some(name));
//! ```

mod blob;
mod opcode;
mod serializer;

pub use blob::{BytecodeBlob, Deserializer};
pub use opcode::{AssignmentType, MetaType, OpCode, OpMeta, OpcodeRecord, OperandKind};
pub use serializer::Serializer;

/// Instructions per uid block.
pub const BLOCK_SIZE: usize = 64;

/// Lowest operand byte that names a register.
pub const FIRST_REGISTER: u8 = 128;

/// Distinct literals a single block may reference.
pub const MAX_UIDS_PER_BLOCK: usize = FIRST_REGISTER as usize;

/// Leading bytes of every encoded blob.
pub const BYTECODE_MAGIC: [u8; 8] = *b"KESTREL\0";

/// Version of the binary layout.
pub const BYTECODE_VERSION: u32 = 1;
