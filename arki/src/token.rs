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

use std::fmt;

use crate::reg::Reg;

/// A lexical token. Register names collapse into a single `Reg` variant
/// carrying the register id.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Number(i64),
    Comment,
    Label(String),
    Comma,
    Newline,
    Mov,
    Hlt,
    Srr,
    Srw,
    Or,
    Litr,
    Stb,
    Stw,
    Stl,
    Stq,
    Ldb,
    Ldw,
    Ldl,
    Ldq,
    B,
    Byte,
    Skip,
    Sp,
    Reg(Reg),
}

impl Token {
    /// Reclassify an identifier that spells a keyword, directive or
    /// register name.
    pub(crate) fn keyword(name: &str) -> Option<Token> {
        let tok = match name {
            "mov" => Token::Mov,
            "hlt" => Token::Hlt,
            "sp" => Token::Sp,
            "srr" => Token::Srr,
            "srw" => Token::Srw,
            "or" => Token::Or,
            "litr" => Token::Litr,
            "stb" => Token::Stb,
            "stw" => Token::Stw,
            "stl" => Token::Stl,
            "stq" => Token::Stq,
            "ldb" => Token::Ldb,
            "ldw" => Token::Ldw,
            "ldl" => Token::Ldl,
            "ldq" => Token::Ldq,
            "b" => Token::B,
            ".byte" => Token::Byte,
            ".skip" => Token::Skip,
            _ => return Reg::from_name(name).map(Token::Reg),
        };
        Some(tok)
    }

    /// Operand register carried by this token, if any. `sp` is a
    /// keyword but not an operand register.
    pub fn reg(&self) -> Option<Reg> {
        match self {
            Token::Reg(reg) => Some(*reg),
            _ => None,
        }
    }

    /// Diagnostic spelling: concrete tokens quoted, token classes in
    /// angle brackets.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(_) => "<ident>".to_string(),
            Token::Number(_) => "<number>".to_string(),
            Token::Comment => "<comment>".to_string(),
            Token::Label(_) => "<label>".to_string(),
            Token::Newline => "<newline>".to_string(),
            tok => format!("'{tok}'"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "{name}"),
            Token::Number(value) => write!(f, "{value}"),
            Token::Comment => write!(f, ";"),
            Token::Label(name) => write!(f, "{name}:"),
            Token::Comma => write!(f, ","),
            Token::Newline => writeln!(f),
            Token::Mov => write!(f, "mov"),
            Token::Hlt => write!(f, "hlt"),
            Token::Srr => write!(f, "srr"),
            Token::Srw => write!(f, "srw"),
            Token::Or => write!(f, "or"),
            Token::Litr => write!(f, "litr"),
            Token::Stb => write!(f, "stb"),
            Token::Stw => write!(f, "stw"),
            Token::Stl => write!(f, "stl"),
            Token::Stq => write!(f, "stq"),
            Token::Ldb => write!(f, "ldb"),
            Token::Ldw => write!(f, "ldw"),
            Token::Ldl => write!(f, "ldl"),
            Token::Ldq => write!(f, "ldq"),
            Token::B => write!(f, "b"),
            Token::Byte => write!(f, ".byte"),
            Token::Skip => write!(f, ".skip"),
            Token::Sp => write!(f, "sp"),
            Token::Reg(reg) => write!(f, "{reg}"),
        }
    }
}
