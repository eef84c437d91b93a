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
use crate::reg::Reg;
use crate::state::Assembler;
use crate::symbol::SymKind;
use crate::token::Token;

impl Assembler<'_> {
    fn unexpected_eof(&self) -> AssemblyError {
        AssemblyError::UnexpectedEof {
            line: self.line_num,
        }
    }

    /// Scan the next token, failing on end of input.
    fn next_token(&mut self) -> Result<Token, AssemblyError> {
        let tok = self.scan()?;
        tok.ok_or_else(|| self.unexpected_eof())
    }

    fn expect_comma(&mut self) -> Result<(), AssemblyError> {
        let tok = self.next_token()?;
        if tok != Token::Comma {
            return Err(AssemblyError::Expected {
                line: self.line_num,
                expected: "','".to_string(),
                got: tok.describe(),
            });
        }
        Ok(())
    }

    fn expect_number(&mut self) -> Result<i64, AssemblyError> {
        match self.next_token()? {
            Token::Number(value) => Ok(value),
            tok => Err(AssemblyError::Expected {
                line: self.line_num,
                expected: "<number>".to_string(),
                got: tok.describe(),
            }),
        }
    }

    fn expect_register(&mut self) -> Result<Reg, AssemblyError> {
        let tok = self.next_token()?;
        tok.reg().ok_or_else(|| AssemblyError::Expected {
            line: self.line_num,
            expected: "<register>".to_string(),
            got: tok.describe(),
        })
    }

    /// Parse a source operand: a number, a label reference or a
    /// register. On pass 0 an unknown identifier becomes a deferred
    /// symbol reference; on later passes it is fatal.
    fn parse_source(&mut self, tok: Token) -> Result<NodeId, AssemblyError> {
        match tok {
            Token::Number(value) => Ok(self.arena.alloc(NodeKind::Number(value))),
            Token::Ident(name) => {
                let sym = self.symtab.by_name(&name).map(|sym| sym.id);
                if sym.is_none() && self.pass_count > 0 {
                    return Err(AssemblyError::UndefinedReference {
                        line: self.line_num,
                        name,
                    });
                }
                Ok(self.arena.alloc(NodeKind::Label(sym)))
            }
            tok => {
                let reg = tok.reg().ok_or_else(|| AssemblyError::Expected {
                    line: self.line_num,
                    expected: "<register>".to_string(),
                    got: tok.describe(),
                })?;
                Ok(self.arena.alloc(NodeKind::Register(reg)))
            }
        }
    }

    /// Parse `mov`/`or`: a destination register, a comma and a source
    /// operand.
    fn parse_reg_source(&mut self, kind: NodeKind) -> Result<NodeId, AssemblyError> {
        let root = self.arena.alloc(kind);
        let rd = self.expect_register()?;
        let left = self.arena.alloc(NodeKind::Register(rd));
        self.expect_comma()?;
        let tok = self.next_token()?;
        let right = self.parse_source(tok)?;

        let node = self.arena.node_mut(root);
        node.left = Some(left);
        node.right = Some(right);
        Ok(root)
    }

    fn parse_litr(&mut self) -> Result<NodeId, AssemblyError> {
        let rs = self.expect_register()?;
        Ok(self.arena.alloc(NodeKind::Litr(rs)))
    }

    fn parse_store(&mut self, kind: NodeKind) -> Result<NodeId, AssemblyError> {
        let root = self.arena.alloc(kind);
        let rd = self.expect_register()?;
        self.expect_comma()?;
        let rs = self.expect_register()?;

        let lhs = self.arena.alloc(NodeKind::Register(rd));
        let rhs = self.arena.alloc(NodeKind::Register(rs));
        let node = self.arena.node_mut(root);
        node.left = Some(lhs);
        node.right = Some(rhs);
        Ok(root)
    }

    /// Load syntax reads the source register first (`ldX Rs, Rd`); the
    /// operand bytes are still emitted in source order.
    fn parse_load(&mut self, kind: NodeKind) -> Result<NodeId, AssemblyError> {
        let root = self.arena.alloc(kind);
        let rs = self.expect_register()?;
        self.expect_comma()?;
        let rd = self.expect_register()?;

        let lhs = self.arena.alloc(NodeKind::Register(rs));
        let rhs = self.arena.alloc(NodeKind::Register(rd));
        let node = self.arena.node_mut(root);
        node.left = Some(lhs);
        node.right = Some(rhs);
        Ok(root)
    }

    fn parse_branch(&mut self) -> Result<NodeId, AssemblyError> {
        let rs = self.expect_register()?;
        let root = self.arena.alloc(NodeKind::Branch);
        let rhs = self.arena.alloc(NodeKind::Register(rs));
        self.arena.node_mut(root).right = Some(rhs);
        Ok(root)
    }

    /// Parse `.byte N (',' N)*` into a right-linked chain of number
    /// leaves.
    fn parse_byte(&mut self) -> Result<NodeId, AssemblyError> {
        let root = self.arena.alloc(NodeKind::Byte);
        let mut value = self.expect_number()?;
        let mut cur = root;

        loop {
            let node = self.arena.alloc(NodeKind::Number(value));
            self.arena.node_mut(cur).right = Some(node);
            cur = node;

            match self.next_token()? {
                Token::Newline => break,
                Token::Comma => value = self.expect_number()?,
                tok => {
                    return Err(AssemblyError::Expected {
                        line: self.line_num,
                        expected: "','".to_string(),
                        got: tok.describe(),
                    });
                }
            }
        }

        Ok(root)
    }

    fn parse_skip(&mut self) -> Result<NodeId, AssemblyError> {
        let root = self.arena.alloc(NodeKind::Skip);
        let value = self.expect_number()?;
        let rhs = self.arena.alloc(NodeKind::Number(value));
        self.arena.node_mut(root).right = Some(rhs);
        Ok(root)
    }

    /// Record a label definition. Symbols are created on pass 0 only;
    /// later passes already know them.
    fn parse_label(&mut self, name: &str) {
        if self.pass_count == 0 {
            let id = self.symtab.new_symbol(name, SymKind::Label);
            let vpc = self.cur_vpc();
            self.symtab.by_id_mut(id).vpc = vpc;
        }
    }

    /// Dispatch one statement starting at `tok` and hand the resulting
    /// tree to the code generator.
    fn parse_begin(&mut self, tok: Token) -> Result<(), AssemblyError> {
        let root = match tok {
            Token::Newline | Token::Comment => return Ok(()),
            Token::Label(name) => {
                self.parse_label(&name);
                return Ok(());
            }
            Token::Mov => self.parse_reg_source(NodeKind::Mov)?,
            Token::Or => self.parse_reg_source(NodeKind::Or)?,
            Token::Hlt => self.arena.alloc(NodeKind::Hlt),
            Token::Srr => self.arena.alloc(NodeKind::Srr),
            Token::Srw => self.arena.alloc(NodeKind::Srw),
            Token::Litr => self.parse_litr()?,
            Token::Stb => self.parse_store(NodeKind::Stb)?,
            Token::Stw => self.parse_store(NodeKind::Stw)?,
            Token::Stl => self.parse_store(NodeKind::Stl)?,
            Token::Stq => self.parse_store(NodeKind::Stq)?,
            Token::Ldb => self.parse_load(NodeKind::Ldb)?,
            Token::Ldw => self.parse_load(NodeKind::Ldw)?,
            Token::Ldl => self.parse_load(NodeKind::Ldl)?,
            Token::Ldq => self.parse_load(NodeKind::Ldq)?,
            Token::B => self.parse_branch()?,
            Token::Byte => self.parse_byte()?,
            Token::Skip => self.parse_skip()?,
            tok => {
                return Err(AssemblyError::UnexpectedToken {
                    line: self.line_num,
                    token: tok.describe(),
                });
            }
        };

        self.resolve_node(root)
    }

    /// Run one full pass over the input stream. Afterwards the pass
    /// index is bumped and line number, virtual program counter, putback
    /// slot and arena are reset so the next pass starts from identical
    /// state.
    pub fn parse(&mut self) -> Result<(), AssemblyError> {
        while let Some(tok) = self.scan()? {
            self.parse_begin(tok)?;
        }

        self.pass_count += 1;
        self.line_num = 1;
        self.vpc = 0;
        self.pos = 0;
        self.putback = None;
        self.arena.clear();
        Ok(())
    }
}
