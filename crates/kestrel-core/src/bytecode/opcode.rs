// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Opcode definitions for the register machine.

use crate::error::{Error, Result};
use crate::literal::LiteralIndex;

/// What an operand byte of an instruction holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Slot is not used by the opcode
    Unused,
    /// A register id, or the block-local uid of a name
    Variable,
    /// The block-local uid of a literal
    Literal,
    /// A raw byte: a count, a type tag or half of a jump offset
    Immediate,
}

const fn pad(kinds: &[OperandKind]) -> [OperandKind; 3] {
    let mut out = [OperandKind::Unused; 3];
    let mut i = 0;
    while i < kinds.len() {
        out[i] = kinds[i];
        i += 1;
    }
    out
}

macro_rules! opcodes {
    ($( $variant:ident = $name:literal [$($kind:ident),*], )*) => {
        /// Operation codes of the register machine.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum OpCode {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl OpCode {
            /// Every opcode, ordered by encoding.
            pub const ALL: &'static [OpCode] = &[$(OpCode::$variant),*];

            /// Mnemonic used in disassembly.
            pub fn name(self) -> &'static str {
                match self {
                    $(OpCode::$variant => $name,)*
                }
            }

            /// Kinds of the three operand bytes.
            pub fn operand_kinds(self) -> [OperandKind; 3] {
                match self {
                    $(OpCode::$variant => pad(&[$(OperandKind::$kind),*]),)*
                }
            }
        }
    };
}

opcodes! {
    CallN = "call_n" [Variable, Variable, Immediate],
    NativeCall = "native_call" [Variable, Immediate, Immediate],
    ConstructN = "construct_n" [Variable, Variable, Immediate],
    FuncDeclN = "func_decl_n" [Literal, Immediate],
    FuncExprN = "func_expr_n" [Variable, Literal, Immediate],
    ExitVal = "exitval" [Immediate],
    RetVal = "retval" [Variable],
    Ret = "ret" [],
    ArrayDecl = "array_decl" [Variable, Immediate],
    PropGetter = "prop_getter" [Variable, Variable, Variable],
    PropSetter = "prop_setter" [Variable, Variable, Variable],
    ObjDecl = "obj_decl" [Variable, Immediate],
    ThisBinding = "this_binding" [Variable],
    DeleteVar = "delete_var" [Variable, Literal],
    DeleteProp = "delete_prop" [Variable, Variable, Variable],
    TypeOf = "typeof" [Variable, Variable],
    With = "with" [Variable],
    TryBlock = "try_block" [Immediate, Immediate],
    ThrowValue = "throw_value" [Variable],
    Assignment = "assignment" [Variable, Immediate, Immediate],
    LogicalNot = "logical_not" [Variable, Variable],
    BitAnd = "b_and" [Variable, Variable, Variable],
    BitOr = "b_or" [Variable, Variable, Variable],
    BitXor = "b_xor" [Variable, Variable, Variable],
    BitNot = "b_not" [Variable, Variable],
    ShiftLeft = "b_shift_left" [Variable, Variable, Variable],
    ShiftRight = "b_shift_right" [Variable, Variable, Variable],
    ShiftURight = "b_shift_uright" [Variable, Variable, Variable],
    EqualValue = "equal_value" [Variable, Variable, Variable],
    NotEqualValue = "not_equal_value" [Variable, Variable, Variable],
    EqualValueType = "equal_value_type" [Variable, Variable, Variable],
    NotEqualValueType = "not_equal_value_type" [Variable, Variable, Variable],
    LessThan = "less_than" [Variable, Variable, Variable],
    GreaterThan = "greater_than" [Variable, Variable, Variable],
    LessOrEqualThan = "less_or_equal_than" [Variable, Variable, Variable],
    GreaterOrEqualThan = "greater_or_equal_than" [Variable, Variable, Variable],
    InstanceOf = "instanceof" [Variable, Variable, Variable],
    In = "in" [Variable, Variable, Variable],
    PostIncr = "post_incr" [Variable, Variable],
    PostDecr = "post_decr" [Variable, Variable],
    PreIncr = "pre_incr" [Variable, Variable],
    PreDecr = "pre_decr" [Variable, Variable],
    Addition = "addition" [Variable, Variable, Variable],
    Subtraction = "subtraction" [Variable, Variable, Variable],
    Division = "division" [Variable, Variable, Variable],
    Multiplication = "multiplication" [Variable, Variable, Variable],
    Remainder = "remainder" [Variable, Variable, Variable],
    UnaryMinus = "unary_minus" [Variable, Variable],
    UnaryPlus = "unary_plus" [Variable, Variable],
    JmpUp = "jmp_up" [Immediate, Immediate],
    JmpDown = "jmp_down" [Immediate, Immediate],
    Nop = "nop" [],
    IsTrueJmpUp = "is_true_jmp_up" [Variable, Immediate, Immediate],
    IsTrueJmpDown = "is_true_jmp_down" [Variable, Immediate, Immediate],
    IsFalseJmpUp = "is_false_jmp_up" [Variable, Immediate, Immediate],
    IsFalseJmpDown = "is_false_jmp_down" [Variable, Immediate, Immediate],
    VarDecl = "var_decl" [Literal],
    RegVarDecl = "reg_var_decl" [Immediate, Immediate],
    Meta = "meta" [Immediate, Immediate, Immediate],
}

impl OpCode {
    /// Decodes an opcode byte.
    pub fn from_u8(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    /// Number of operand bytes the opcode uses.
    pub fn arity(self) -> usize {
        self.operand_kinds()
            .iter()
            .filter(|kind| **kind != OperandKind::Unused)
            .count()
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Type tag in operand 1 of `assignment`, saying what operand 2 holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AssignmentType {
    /// A simple value id (undefined, null, true, false)
    Simple,
    /// An integer `0..=255`
    SmallInt,
    /// An integer `-255..=-0`
    SmallIntNegate,
    /// A number literal
    Number,
    /// A negated number literal
    NumberNegate,
    /// A string literal
    String,
    /// A variable
    Variable,
}

impl AssignmentType {
    /// Decodes a type tag.
    pub fn from_u8(byte: u8) -> Option<Self> {
        use AssignmentType::*;
        [Simple, SmallInt, SmallIntNegate, Number, NumberNegate, String, Variable]
            .get(byte as usize)
            .copied()
    }

    /// Kind of the value operand for this type.
    pub fn value_kind(self) -> OperandKind {
        match self {
            AssignmentType::Simple | AssignmentType::SmallInt | AssignmentType::SmallIntNegate => {
                OperandKind::Immediate
            }
            AssignmentType::Number | AssignmentType::NumberNegate | AssignmentType::String => {
                OperandKind::Literal
            }
            AssignmentType::Variable => OperandKind::Variable,
        }
    }
}

/// Type tag in operand 0 of `meta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MetaType {
    /// Placeholder awaiting a rewrite
    Undefined,
    /// `this` argument of a call
    ThisArg,
    /// One argument of a call or array literal
    Varg,
    /// Name and value of a data property
    VargPropData,
    /// Name and getter of an accessor property
    VargPropGetter,
    /// Name and setter of an accessor property
    VargPropSetter,
    /// End of a `with` block
    EndWith,
    /// Offset to the end of a function
    FunctionEnd,
    /// Start of a `catch` block
    Catch,
    /// Name of the caught exception
    CatchExceptionIdentifier,
    /// Start of a `finally` block
    Finally,
    /// End of a try statement
    EndTryCatchFinally,
    /// Strictness and other properties of the scope
    ScopeCodeFlags,
}

impl MetaType {
    /// Decodes a type tag.
    pub fn from_u8(byte: u8) -> Option<Self> {
        use MetaType::*;
        [
            Undefined,
            ThisArg,
            Varg,
            VargPropData,
            VargPropGetter,
            VargPropSetter,
            EndWith,
            FunctionEnd,
            Catch,
            CatchExceptionIdentifier,
            Finally,
            EndTryCatchFinally,
            ScopeCodeFlags,
        ]
        .get(byte as usize)
        .copied()
    }
}

/// A fixed-size encoded instruction: one opcode byte and three operand bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeRecord {
    /// The operation
    pub opcode: OpCode,
    /// Operand bytes; unused slots are zero
    pub operands: [u8; 3],
}

impl OpcodeRecord {
    /// Size of an encoded record in bytes.
    pub const SIZE: usize = 4;

    /// Creates a record.
    pub fn new(opcode: OpCode, operands: [u8; 3]) -> Self {
        Self { opcode, operands }
    }

    /// Kinds of the operand bytes, refined by the type tags of
    /// `assignment` and `meta`.
    pub fn operand_kinds(&self) -> [OperandKind; 3] {
        let mut kinds = self.opcode.operand_kinds();
        match self.opcode {
            OpCode::Assignment => {
                if let Some(ty) = AssignmentType::from_u8(self.operands[1]) {
                    kinds[2] = ty.value_kind();
                }
            }
            OpCode::Meta => match MetaType::from_u8(self.operands[0]) {
                Some(MetaType::VargPropData | MetaType::VargPropGetter | MetaType::VargPropSetter) => {
                    kinds[1] = OperandKind::Literal;
                    kinds[2] = OperandKind::Variable;
                }
                Some(MetaType::ThisArg | MetaType::Varg) => kinds[1] = OperandKind::Variable,
                Some(MetaType::CatchExceptionIdentifier) => kinds[1] = OperandKind::Literal,
                _ => {}
            },
            _ => {}
        }
        kinds
    }

    /// Encodes the record.
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let [a, b, c] = self.operands;
        [self.opcode as u8, a, b, c]
    }

    /// Decodes a record.
    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Result<Self> {
        let opcode = OpCode::from_u8(bytes[0])
            .ok_or_else(|| Error::bytecode(format!("unknown opcode {:#04x}", bytes[0])))?;
        Ok(Self::new(opcode, [bytes[1], bytes[2], bytes[3]]))
    }
}

/// An instruction as the parser emits it, before literals get block-local uids.
///
/// Every operand slot may carry the index of the literal it refers to. The
/// operand byte of such a slot is rewritten during
/// [`Serializer::merge`](super::Serializer::merge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpMeta {
    /// The instruction
    pub record: OpcodeRecord,
    /// Literal referenced by each operand slot
    pub lit_ids: [Option<LiteralIndex>; 3],
}

impl OpMeta {
    /// Creates an instruction without literal operands.
    pub fn new(opcode: OpCode, operands: [u8; 3]) -> Self {
        Self {
            record: OpcodeRecord::new(opcode, operands),
            lit_ids: [None; 3],
        }
    }

    /// Marks operand `slot` as referring to `literal`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not `0..3`.
    pub fn with_literal(mut self, slot: usize, literal: LiteralIndex) -> Self {
        self.lit_ids[slot] = Some(literal);
        self.record.operands[slot] = 0;
        self
    }

    /// The opcode of the instruction.
    pub fn opcode(&self) -> OpCode {
        self.record.opcode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_bytes_are_dense() {
        for (i, op) in OpCode::ALL.iter().enumerate() {
            assert_eq!(*op as usize, i);
            assert_eq!(OpCode::from_u8(i as u8), Some(*op));
        }
        assert_eq!(OpCode::from_u8(OpCode::ALL.len() as u8), None);
    }

    #[test]
    fn test_operand_kinds() {
        assert_eq!(OpCode::Ret.arity(), 0);
        assert_eq!(OpCode::VarDecl.operand_kinds()[0], OperandKind::Literal);
        assert_eq!(
            OpCode::Addition.operand_kinds(),
            [OperandKind::Variable; 3]
        );
        assert_eq!(OpCode::RegVarDecl.arity(), 2);
    }

    #[test]
    fn test_record_bytes() {
        let record = OpcodeRecord::new(OpCode::Assignment, [128, 1, 7]);
        let bytes = record.to_bytes();
        assert_eq!(bytes, [OpCode::Assignment as u8, 128, 1, 7]);
        assert_eq!(OpcodeRecord::from_bytes(bytes).unwrap(), record);
        assert!(OpcodeRecord::from_bytes([0xFF, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_assignment_operand_kinds_follow_type() {
        let small = OpcodeRecord::new(OpCode::Assignment, [128, AssignmentType::SmallInt as u8, 7]);
        assert_eq!(small.operand_kinds()[2], OperandKind::Immediate);

        let string = OpcodeRecord::new(OpCode::Assignment, [128, AssignmentType::String as u8, 0]);
        assert_eq!(string.operand_kinds()[2], OperandKind::Literal);

        let prop = OpcodeRecord::new(OpCode::Meta, [MetaType::VargPropData as u8, 0, 130]);
        assert_eq!(
            prop.operand_kinds(),
            [OperandKind::Immediate, OperandKind::Literal, OperandKind::Variable]
        );
    }

    #[test]
    fn test_with_literal_clears_operand() {
        let meta = OpMeta::new(OpCode::VarDecl, [9, 0, 0]).with_literal(0, LiteralIndex(3));
        assert_eq!(meta.record.operands[0], 0);
        assert_eq!(meta.lit_ids[0], Some(LiteralIndex(3)));
    }
}
