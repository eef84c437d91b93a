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

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AssemblyError {
    #[error("unexpected character '{ch}' near line {line}")]
    UnexpectedChar { line: usize, ch: char },

    #[error("unexpected token {token} near line {line}")]
    UnexpectedToken { line: usize, token: String },

    #[error("expected {expected}, got {got} instead near line {line}")]
    Expected {
        line: usize,
        expected: String,
        got: String,
    },

    #[error("unexpected end of file near line {line}")]
    UnexpectedEof { line: usize },

    #[error("undefined reference to '{name}' near line {line}")]
    UndefinedReference { line: usize, name: String },

    #[error("{reason} near line {line}")]
    BadOperand { line: usize, reason: String },
}
