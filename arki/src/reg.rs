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

/// Registers addressable from assembly source. The emulator-side pseudo
/// registers (tt, sp, fp, pc) are not operands; `sp` is a keyword token
/// that never converts to a register, so using it as an operand is a
/// parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    G0,
    G1,
    G2,
    G3,
    G4,
    G5,
    G6,
    G7,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
}

impl Reg {
    /// Encoding index of this register in an operand byte.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Register named by an identifier, if any. Only the exact
    /// two-character names g0-g7 and a0-a7 qualify; a lone 'g' or a
    /// longer identifier stays an identifier.
    pub(crate) fn from_name(name: &str) -> Option<Reg> {
        let reg = match name {
            "g0" => Reg::G0,
            "g1" => Reg::G1,
            "g2" => Reg::G2,
            "g3" => Reg::G3,
            "g4" => Reg::G4,
            "g5" => Reg::G5,
            "g6" => Reg::G6,
            "g7" => Reg::G7,
            "a0" => Reg::A0,
            "a1" => Reg::A1,
            "a2" => Reg::A2,
            "a3" => Reg::A3,
            "a4" => Reg::A4,
            "a5" => Reg::A5,
            "a6" => Reg::A6,
            "a7" => Reg::A7,
            _ => return None,
        };
        Some(reg)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg::G0 => "g0",
            Reg::G1 => "g1",
            Reg::G2 => "g2",
            Reg::G3 => "g3",
            Reg::G4 => "g4",
            Reg::G5 => "g5",
            Reg::G6 => "g6",
            Reg::G7 => "g7",
            Reg::A0 => "a0",
            Reg::A1 => "a1",
            Reg::A2 => "a2",
            Reg::A3 => "a3",
            Reg::A4 => "a4",
            Reg::A5 => "a5",
            Reg::A6 => "a6",
            Reg::A7 => "a7",
        };
        write!(f, "{name}")
    }
}
