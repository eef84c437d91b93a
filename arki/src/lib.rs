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

pub mod ast;
pub mod codegen;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod reg;
pub mod state;
pub mod symbol;
pub mod token;

use errors::AssemblyError;
use state::{Assembler, PASS_COUNT};

/// Assemble one translation unit into a flat binary image. The first
/// pass defines symbols, the second emits bytes; running both over the
/// same state is what closes forward references.
pub fn assemble(source: &str) -> Result<Vec<u8>, AssemblyError> {
    let mut state = Assembler::new(source.as_bytes());

    for _ in 0..PASS_COUNT {
        state.parse()?;
    }

    Ok(state.into_output())
}
