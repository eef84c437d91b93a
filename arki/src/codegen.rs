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

use crate::ast::{NodeId, NodeKind};
use crate::errors::AssemblyError;
use crate::state::Assembler;

/// Immediates strictly wider than this select the wide move form.
const SHORT_IMM_MAX: u64 = 1 << 16;

const OPC_WMOV: u8 = 0x01; // Wide IMM move
const OPC_SMOV: u8 = 0x03; // Short IMM register load
const OPC_HLT: u8 = 0x0D; // Halt processor
const OPC_SRR: u8 = 0x0E; // Special register read
const OPC_SRW: u8 = 0x0F; // Special register write
const OPC_IOR: u8 = 0x10; // IMM OR
const OPC_LITR: u8 = 0x14; // Load ITR
const OPC_STB: u8 = 0x15; // Store byte
const OPC_STW: u8 = 0x16; // Store word
const OPC_STL: u8 = 0x17; // Store dword
const OPC_STQ: u8 = 0x18; // Store qword
const OPC_LDB: u8 = 0x19; // Load byte
const OPC_LDW: u8 = 0x1A; // Load word
const OPC_LDL: u8 = 0x1B; // Load dword
const OPC_LDQ: u8 = 0x1C; // Load qword
const OPC_B: u8 = 0x1D; // Indirect branch

impl Assembler<'_> {
    /// Emit one byte. Pass 0 only advances the virtual program counter;
    /// pass 1 also writes to the output.
    fn emitb(&mut self, byte: u8) {
        if self.pass_count == 1 {
            self.out.push(byte);
        }
        self.vpc += 1;
    }

    fn bad_operand(&self, reason: &str) -> AssemblyError {
        AssemblyError::BadOperand {
            line: self.line_num,
            reason: reason.to_string(),
        }
    }

    /// Emit a little-endian immediate. The loop must not stop early on a
    /// zero immediate: it pads with zero bytes up to `max_bytes`, and
    /// keeps going past that while non-zero bytes remain.
    fn emit_imm(&mut self, mut imm: u64, max_bytes: usize) {
        let mut byte_count = 0;
        while imm != 0 || byte_count < max_bytes {
            self.emitb((imm & 0xFF) as u8);
            imm >>= 8;
            byte_count += 1;
        }
    }

    fn emit_mov(&mut self, root: NodeId) -> Result<(), AssemblyError> {
        let node = self.arena.node(root);
        let (left, right) = (node.left, node.right);
        let lhs = left.ok_or_else(|| self.bad_operand("mov has no lhs"))?;
        let rhs = right.ok_or_else(|| self.bad_operand("mov has no rhs"))?;

        let NodeKind::Register(rd) = self.arena.node(lhs).kind else {
            return Err(self.bad_operand("lhs of mov is not a register"));
        };

        // TODO: support register-to-register moves
        let imm = match self.arena.node(rhs).kind {
            NodeKind::Number(value) => value as u64,
            NodeKind::Label(sym) => {
                if sym.is_none() && self.pass_count > 0 {
                    return Err(self.bad_operand("mov rhs has no symbol"));
                }
                match sym {
                    Some(id) => self.symtab.by_id(id).vpc,
                    // Harmless placeholder while the symbol is deferred.
                    None => 0xFF,
                }
            }
            _ => return Err(self.bad_operand("unexpected rhs for mov")),
        };

        let (opcode, max_bytes) = if imm > SHORT_IMM_MAX {
            (OPC_WMOV, 6)
        } else {
            (OPC_SMOV, 2)
        };

        self.emitb(opcode);
        self.emitb(rd.index());
        self.emit_imm(imm, max_bytes);
        Ok(())
    }

    fn emit_or(&mut self, root: NodeId) -> Result<(), AssemblyError> {
        let node = self.arena.node(root);
        let (left, right) = (node.left, node.right);
        let lhs = left.ok_or_else(|| self.bad_operand("or has no lhs"))?;
        let rhs = right.ok_or_else(|| self.bad_operand("or has no rhs"))?;

        let NodeKind::Register(rd) = self.arena.node(lhs).kind else {
            return Err(self.bad_operand("lhs of or is not a register"));
        };

        // TODO: support register ORs
        let NodeKind::Number(value) = self.arena.node(rhs).kind else {
            return Err(self.bad_operand("rhs of or is not an imm"));
        };

        self.emitb(OPC_IOR);
        self.emitb(rd.index());
        self.emit_imm(value as u64, 2);
        Ok(())
    }

    fn emit_store(&mut self, root: NodeId) -> Result<(), AssemblyError> {
        let opcode = match self.arena.node(root).kind {
            NodeKind::Stb => OPC_STB,
            NodeKind::Stw => OPC_STW,
            NodeKind::Stl => OPC_STL,
            NodeKind::Stq => OPC_STQ,
            _ => return Err(self.bad_operand("bad store node")),
        };

        let node = self.arena.node(root);
        let (left, right) = (node.left, node.right);
        let lhs = left.ok_or_else(|| self.bad_operand("store has no lhs"))?;
        let rhs = right.ok_or_else(|| self.bad_operand("store has no rhs"))?;

        let NodeKind::Register(rd) = self.arena.node(lhs).kind else {
            return Err(self.bad_operand("store lhs is not a register"));
        };
        let NodeKind::Register(rs) = self.arena.node(rhs).kind else {
            return Err(self.bad_operand("store rhs is not a register"));
        };

        self.emitb(opcode);
        self.emitb(rd.index());
        self.emitb(rs.index());
        Ok(())
    }

    /// The operand bytes land in source order, so the swapped load
    /// syntax still encodes destination first on the wire.
    fn emit_load(&mut self, root: NodeId) -> Result<(), AssemblyError> {
        let opcode = match self.arena.node(root).kind {
            NodeKind::Ldb => OPC_LDB,
            NodeKind::Ldw => OPC_LDW,
            NodeKind::Ldl => OPC_LDL,
            NodeKind::Ldq => OPC_LDQ,
            _ => return Err(self.bad_operand("bad load node")),
        };

        let node = self.arena.node(root);
        let (left, right) = (node.left, node.right);
        let lhs = left.ok_or_else(|| self.bad_operand("load has no lhs"))?;
        let rhs = right.ok_or_else(|| self.bad_operand("load has no rhs"))?;

        let NodeKind::Register(first) = self.arena.node(lhs).kind else {
            return Err(self.bad_operand("load lhs is not a register"));
        };
        let NodeKind::Register(second) = self.arena.node(rhs).kind else {
            return Err(self.bad_operand("load rhs is not a register"));
        };

        self.emitb(opcode);
        self.emitb(first.index());
        self.emitb(second.index());
        Ok(())
    }

    fn emit_branch(&mut self, root: NodeId) -> Result<(), AssemblyError> {
        let rhs = self
            .arena
            .node(root)
            .right
            .ok_or_else(|| self.bad_operand("branch has no rhs"))?;
        let NodeKind::Register(rs) = self.arena.node(rhs).kind else {
            return Err(self.bad_operand("branch rhs is not a register"));
        };

        self.emitb(OPC_B);
        self.emitb(rs.index());
        Ok(())
    }

    /// Emit the low byte of every number in the right-linked chain.
    fn emit_bytes(&mut self, root: NodeId) {
        let mut cur = self.arena.node(root).right;
        while let Some(id) = cur {
            let node = self.arena.node(id);
            let NodeKind::Number(value) = node.kind else {
                break;
            };
            cur = node.right;
            self.emitb((value & 0xFF) as u8);
        }
    }

    fn emit_skip(&mut self, root: NodeId) -> Result<(), AssemblyError> {
        let rhs = self
            .arena
            .node(root)
            .right
            .ok_or_else(|| self.bad_operand("skip rhs has no number"))?;
        let NodeKind::Number(count) = self.arena.node(rhs).kind else {
            return Err(self.bad_operand("skip rhs has no number"));
        };

        for _ in 0..count {
            self.emitb(0x00);
        }
        Ok(())
    }

    /// Resolve an AST root into machine code. Called on both passes;
    /// pass 0 only accounts for the bytes.
    pub(crate) fn resolve_node(&mut self, root: NodeId) -> Result<(), AssemblyError> {
        let kind = self.arena.node(root).kind;
        match kind {
            NodeKind::Mov => self.emit_mov(root),
            NodeKind::Hlt => {
                self.emitb(OPC_HLT);
                Ok(())
            }
            NodeKind::Srr => {
                self.emitb(OPC_SRR);
                Ok(())
            }
            NodeKind::Srw => {
                self.emitb(OPC_SRW);
                Ok(())
            }
            NodeKind::Or => self.emit_or(root),
            NodeKind::Litr(rs) => {
                self.emitb(OPC_LITR);
                self.emitb(rs.index());
                Ok(())
            }
            NodeKind::Stb | NodeKind::Stw | NodeKind::Stl | NodeKind::Stq => {
                self.emit_store(root)
            }
            NodeKind::Ldb | NodeKind::Ldw | NodeKind::Ldl | NodeKind::Ldq => self.emit_load(root),
            NodeKind::Branch => self.emit_branch(root),
            NodeKind::Byte => {
                self.emit_bytes(root);
                Ok(())
            }
            NodeKind::Skip => self.emit_skip(root),
            _ => Err(self.bad_operand("bad AST root node")),
        }
    }
}
