// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Well-known strings that never occupy string cache space.

/// A well-known string with a fixed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MagicString {
    /// `""`
    Empty = 0,
    /// `length`
    Length,
    /// `prototype`
    Prototype,
    /// `constructor`
    Constructor,
    /// `arguments`
    Arguments,
    /// `eval`
    Eval,
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// `true`
    True,
    /// `false`
    False,
    /// `this`
    This,
    /// `callee`
    Callee,
    /// `caller`
    Caller,
    /// `name`
    Name,
    /// `message`
    Message,
    /// `toString`
    ToString,
    /// `valueOf`
    ValueOf,
    /// `get`
    Get,
    /// `set`
    Set,
    /// `value`
    Value,
    /// `writable`
    Writable,
    /// `enumerable`
    Enumerable,
    /// `configurable`
    Configurable,
    /// `NaN`
    NaN,
    /// `Infinity`
    Infinity,
    /// `Object`
    Object,
    /// `Function`
    Function,
    /// `Array`
    Array,
    /// `String`
    String,
    /// `Number`
    Number,
    /// `Boolean`
    Boolean,
    /// `Error`
    Error,
    /// `RegExp`
    RegExp,
    /// `Math`
    Math,
    /// `JSON`
    Json,
    /// `Date`
    Date,
    /// `source`
    Source,
    /// `global`
    Global,
    /// `ignoreCase`
    IgnoreCase,
    /// `multiline`
    Multiline,
    /// `lastIndex`
    LastIndex,
    /// `index`
    Index,
    /// `input`
    Input,
}

impl MagicString {
    /// Every magic string, ordered by id.
    pub const ALL: [MagicString; 43] = [
        MagicString::Empty,
        MagicString::Length,
        MagicString::Prototype,
        MagicString::Constructor,
        MagicString::Arguments,
        MagicString::Eval,
        MagicString::Undefined,
        MagicString::Null,
        MagicString::True,
        MagicString::False,
        MagicString::This,
        MagicString::Callee,
        MagicString::Caller,
        MagicString::Name,
        MagicString::Message,
        MagicString::ToString,
        MagicString::ValueOf,
        MagicString::Get,
        MagicString::Set,
        MagicString::Value,
        MagicString::Writable,
        MagicString::Enumerable,
        MagicString::Configurable,
        MagicString::NaN,
        MagicString::Infinity,
        MagicString::Object,
        MagicString::Function,
        MagicString::Array,
        MagicString::String,
        MagicString::Number,
        MagicString::Boolean,
        MagicString::Error,
        MagicString::RegExp,
        MagicString::Math,
        MagicString::Json,
        MagicString::Date,
        MagicString::Source,
        MagicString::Global,
        MagicString::IgnoreCase,
        MagicString::Multiline,
        MagicString::LastIndex,
        MagicString::Index,
        MagicString::Input,
    ];

    /// Returns the text of this string.
    pub fn as_str(self) -> &'static str {
        match self {
            MagicString::Empty => "",
            MagicString::Length => "length",
            MagicString::Prototype => "prototype",
            MagicString::Constructor => "constructor",
            MagicString::Arguments => "arguments",
            MagicString::Eval => "eval",
            MagicString::Undefined => "undefined",
            MagicString::Null => "null",
            MagicString::True => "true",
            MagicString::False => "false",
            MagicString::This => "this",
            MagicString::Callee => "callee",
            MagicString::Caller => "caller",
            MagicString::Name => "name",
            MagicString::Message => "message",
            MagicString::ToString => "toString",
            MagicString::ValueOf => "valueOf",
            MagicString::Get => "get",
            MagicString::Set => "set",
            MagicString::Value => "value",
            MagicString::Writable => "writable",
            MagicString::Enumerable => "enumerable",
            MagicString::Configurable => "configurable",
            MagicString::NaN => "NaN",
            MagicString::Infinity => "Infinity",
            MagicString::Object => "Object",
            MagicString::Function => "Function",
            MagicString::Array => "Array",
            MagicString::String => "String",
            MagicString::Number => "Number",
            MagicString::Boolean => "Boolean",
            MagicString::Error => "Error",
            MagicString::RegExp => "RegExp",
            MagicString::Math => "Math",
            MagicString::Json => "JSON",
            MagicString::Date => "Date",
            MagicString::Source => "source",
            MagicString::Global => "global",
            MagicString::IgnoreCase => "ignoreCase",
            MagicString::Multiline => "multiline",
            MagicString::LastIndex => "lastIndex",
            MagicString::Index => "index",
            MagicString::Input => "input",
        }
    }

    /// Numeric id used in serialized bytecode.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Looks a magic string up by id.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Finds the magic string spelled by `units`, if any.
    pub fn find(units: &[u16]) -> Option<Self> {
        Self::ALL.iter().copied().find(|magic| {
            let text = magic.as_str();
            text.len() == units.len() && text.bytes().zip(units).all(|(b, &u)| u16::from(b) == u)
        })
    }

    /// Returns the text as UTF-16 code units.
    pub fn to_units(self) -> Vec<u16> {
        self.as_str().encode_utf16().collect()
    }
}

impl std::fmt::Display for MagicString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
