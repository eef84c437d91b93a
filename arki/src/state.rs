/*
Copyright 2026 Ian Moffett

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use crate::ast::Arena;
use crate::symbol::SymbolTable;

/// Number of passes over a translation unit. Pass 0 defines symbols,
/// pass 1 emits bytes.
pub const PASS_COUNT: u8 = 2;

/// Assembler state threaded through the lexer, parser and code
/// generator. One instance assembles one translation unit.
pub struct Assembler<'a> {
    /// Input byte stream and read cursor.
    pub(crate) src: &'a [u8],
    pub(crate) pos: usize,
    /// Emitted bytes; only pass 1 writes here.
    pub(crate) out: Vec<u8>,
    pub(crate) symtab: SymbolTable,
    pub(crate) arena: Arena,
    pub(crate) line_num: usize,
    pub(crate) pass_count: u8,
    /// Absolute address of the first emitted byte.
    pub(crate) origin: u64,
    /// Virtual program counter: bytes that would have been emitted so
    /// far. Advanced identically on both passes so label addresses are
    /// stable.
    pub(crate) vpc: u64,
    /// One-character lexer putback slot.
    pub(crate) putback: Option<u8>,
}

impl<'a> Assembler<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            pos: 0,
            out: Vec::new(),
            symtab: SymbolTable::new(),
            arena: Arena::default(),
            line_num: 1,
            pass_count: 0,
            origin: 0,
            vpc: 0,
            putback: None,
        }
    }

    /// Current virtual program counter relative to the program origin.
    pub(crate) fn cur_vpc(&self) -> u64 {
        self.origin + self.vpc
    }

    pub fn into_output(self) -> Vec<u8> {
        self.out
    }
}
