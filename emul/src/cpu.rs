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

use log::{info, trace, warn};

use crate::balloon::Balloon;
use crate::bus::BusIo;
use crate::errors::EmulError;

/// Maximum local cache size.
pub const DOMAIN_CACHE_SIZE: usize = 65536;

/// Local cache MMIO window.
pub const DOMAIN_LCACHE_BASE: u64 = 0x0010_0000;
pub const DOMAIN_LCACHE_SIZE: u64 = 0x1000;

/// Valid opcodes. The bracketed letter is the encoding form.
pub const OPCODE_NOP: u8 = 0x00; // No-operation [A]
pub const OPCODE_IMOV: u8 = 0x01; // Move wide IMM [C]
pub const OPCODE_IMOVS: u8 = 0x03; // Move short IMM [D]
pub const OPCODE_IADD: u8 = 0x05; // IMM register ADD [D]
pub const OPCODE_ISUB: u8 = 0x07; // IMM register SUB [D]
pub const OPCODE_HLT: u8 = 0x0D; // Halt [A]
pub const OPCODE_SRR: u8 = 0x0E; // Special register read [A]
pub const OPCODE_SRW: u8 = 0x0F; // Special register write [A]
pub const OPCODE_IOR: u8 = 0x10; // IMM bitwise OR [D]
pub const OPCODE_LITR: u8 = 0x14; // Load ITR [E]
pub const OPCODE_STB: u8 = 0x15; // Store byte [B]
pub const OPCODE_STW: u8 = 0x16; // Store word [B]
pub const OPCODE_STL: u8 = 0x17; // Store dword [B]
pub const OPCODE_STQ: u8 = 0x18; // Store qword [B]
pub const OPCODE_LDB: u8 = 0x19; // Load byte [B]
pub const OPCODE_LDW: u8 = 0x1A; // Load word [B]
pub const OPCODE_LDL: u8 = 0x1B; // Load dword [B]
pub const OPCODE_LDQ: u8 = 0x1C; // Load qword [B]
pub const OPCODE_B: u8 = 0x1D; // Indirect branch [E]

/// Error syndrome types.
pub const ESR_MAV: u64 = 0x01; // Memory access violation
pub const ESR_PV: u64 = 0x02; // Protection violation
pub const ESR_UD: u64 = 0x03; // Undefined opcode
pub const ESR_IENP: u64 = 0x04; // Interrupt entry not present

/// Interrupt vectors. Asynchronous delivery is reserved.
pub const IVEC_SYNC: u8 = 0x00;
const VEC_NONE: u8 = 0xFF;

/// Register identifiers.
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
    Tt,
    Sp,
    Fp,
    Pc,
}

pub const REG_MAX: usize = 20;

/// Register to string lookup table.
const REG_NAMES: [&str; REG_MAX] = [
    "G0", "G1", "G2", "G3", "G4", "G5", "G6", "G7", "A0", "A1", "A2", "A3", "A4", "A5", "A6",
    "A7", "TT", "SP", "FP", "PC",
];

/// Special registers. Id 0 is the bad register and always faults.
pub const SREG_BAD: u64 = 0;
pub const SREG_INTCONF: u64 = 1;
pub const SREG_MAX: usize = 2;

/// Writable bits of INTCONF.
const INTCONF_MASK: u64 = 0x1FF;

/// Size of one interrupt service table entry: present bit in bit 0 of
/// byte 0, handler address in bytes 8..16.
pub const IST_ENTRY_SIZE: u64 = 16;

/// Instruction encoding forms. Each form fixes the instruction width,
/// which in turn fixes the program counter advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    A,
    B,
    C,
    D,
    E,
}

impl Form {
    /// Instruction width in bytes.
    pub fn width(self) -> u64 {
        match self {
            Form::A => 1,
            Form::B => 3,
            Form::C => 8,
            Form::D => 4,
            Form::E => 2,
        }
    }

    /// Encoding form of an opcode, if defined.
    pub fn of(opcode: u8) -> Option<Form> {
        let form = match opcode {
            OPCODE_NOP | OPCODE_HLT | OPCODE_SRR | OPCODE_SRW => Form::A,
            OPCODE_STB..=OPCODE_LDQ => Form::B,
            OPCODE_IMOV => Form::C,
            OPCODE_IMOVS | OPCODE_IADD | OPCODE_ISUB | OPCODE_IOR => Form::D,
            OPCODE_LITR | OPCODE_B => Form::E,
            _ => return None,
        };
        Some(form)
    }
}

/// Outcome of a single fetch/decode/execute step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halt,
}

/// Per-domain local cache peer.
#[derive(Debug)]
pub struct LocalCache {
    mem: Balloon,
}

impl LocalCache {
    pub fn new() -> Self {
        Self {
            mem: Balloon::new(32, DOMAIN_CACHE_SIZE),
        }
    }

    pub fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<usize, EmulError> {
        self.mem.read(offset, buf)
    }

    pub fn write(&mut self, offset: usize, buf: &[u8]) -> Result<usize, EmulError> {
        self.mem.write(offset, buf)
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new()
    }
}

/// A processing domain (PD): register bank, special registers and
/// interrupt latches, driving the fetch/decode/execute loop through the
/// bus.
#[derive(Debug)]
pub struct CpuDomain {
    pub domain_id: u32,
    pub regbank: [u64; REG_MAX],
    /// Interrupt table register.
    pub itr: u64,
    /// Error syndrome register.
    pub esr: u64,
    /// Pending synchronous interrupt vector; 0xFF means none.
    sync_vec: u8,
    pub n_cycles: u64,
    pub sreg: [u64; SREG_MAX],
}

impl CpuDomain {
    pub fn new(domain_id: u32) -> Self {
        let mut cpu = Self {
            domain_id,
            regbank: [0; REG_MAX],
            itr: 0,
            esr: 0,
            sync_vec: VEC_NONE,
            n_cycles: 0,
            sreg: [0; SREG_MAX],
        };
        cpu.reset();
        cpu
    }

    /// Put the domain back into its power-on state. `itr` and `esr`
    /// survive so the cause of an in-flight reset stays observable.
    pub fn reset(&mut self) {
        for (i, reg) in self.regbank.iter_mut().enumerate() {
            *reg = if i <= Reg::A7 as usize {
                0x1A1F_1A1F_1A1F_1A1F
            } else {
                0
            };
        }
        self.sreg = [0; SREG_MAX];
        self.sync_vec = VEC_NONE;
        self.n_cycles = 0;
    }

    pub fn pc(&self) -> u64 {
        self.regbank[Reg::Pc as usize]
    }

    fn set_pc(&mut self, pc: u64) {
        self.regbank[Reg::Pc as usize] = pc;
    }

    /// Latch a synchronous interrupt vector. The slot holds exactly one
    /// pending vector; the last writer wins.
    pub fn raise_int(&mut self, vector: u8) {
        self.sync_vec = vector;
    }

    fn fault(&mut self, esr: u64) {
        self.esr = esr;
        self.raise_int(IVEC_SYNC);
    }

    /// Validate a register byte decoded from an instruction. Out of
    /// range registers are a protection violation.
    fn reg_operand(&mut self, idx: u8) -> Option<usize> {
        let idx = idx as usize;
        if idx >= REG_MAX {
            self.fault(ESR_PV);
            return None;
        }
        Some(idx)
    }

    fn sreg_read(&mut self, id: u64) -> Option<u64> {
        if id == SREG_BAD || id >= SREG_MAX as u64 {
            self.fault(ESR_PV);
            return None;
        }
        Some(self.sreg[id as usize])
    }

    fn sreg_write(&mut self, id: u64, value: u64) {
        if id == SREG_BAD || id >= SREG_MAX as u64 {
            self.fault(ESR_PV);
            return;
        }

        let mask = match id {
            SREG_INTCONF => INTCONF_MASK,
            _ => 0,
        };
        if value & !mask != 0 {
            self.fault(ESR_PV);
            return;
        }

        self.sreg[id as usize] = value;
    }

    /// Service a pending synchronous interrupt through the in-memory
    /// interrupt service table.
    fn poll_interrupts(&mut self, bus: &mut impl BusIo) {
        if self.sync_vec == VEC_NONE {
            return;
        }
        let vector = self.sync_vec;
        self.sync_vec = VEC_NONE;

        if self.itr == 0 {
            warn!("synchronous interrupt {vector} with no service table, resetting");
            self.reset();
            return;
        }

        let mut entry = [0u8; IST_ENTRY_SIZE as usize];
        let entry_addr = self.itr + u64::from(vector) * IST_ENTRY_SIZE;
        if bus.read(entry_addr, &mut entry).is_err() {
            self.fault(ESR_MAV);
            return;
        }

        if entry[0] & 1 == 0 {
            self.fault(ESR_IENP);
            return;
        }

        let mut isr = [0u8; 8];
        isr.copy_from_slice(&entry[8..16]);
        self.set_pc(u64::from_le_bytes(isr));
    }

    /// Execute one instruction. Returns `Step::Halt` on `hlt`; a fetch
    /// that cannot be performed aborts with the bus error.
    pub fn step(&mut self, bus: &mut impl BusIo) -> Result<Step, EmulError> {
        let pc = self.pc();
        let mut inst = [0u8; 8];
        bus.read(pc, &mut inst)?;

        let opcode = inst[0];
        let Some(form) = Form::of(opcode) else {
            // Undefined opcode: latch and deliver without advancing.
            self.fault(ESR_UD);
            self.poll_interrupts(bus);
            return Ok(Step::Continue);
        };

        let mut next_pc = pc.wrapping_add(form.width());
        match opcode {
            OPCODE_NOP => {}
            OPCODE_HLT => {
                info!("processor halted");
                return Ok(Step::Halt);
            }
            OPCODE_SRR => {
                let id = self.regbank[Reg::G1 as usize];
                if let Some(value) = self.sreg_read(id) {
                    self.regbank[Reg::G0 as usize] = value;
                }
            }
            OPCODE_SRW => {
                let id = self.regbank[Reg::G1 as usize];
                let value = self.regbank[Reg::G0 as usize];
                self.sreg_write(id, value);
            }
            OPCODE_IMOV => {
                if let Some(rd) = self.reg_operand(inst[1]) {
                    let mut imm = [0u8; 8];
                    imm[..6].copy_from_slice(&inst[2..8]);
                    self.regbank[rd] = u64::from_le_bytes(imm);
                }
            }
            OPCODE_IMOVS | OPCODE_IADD | OPCODE_ISUB | OPCODE_IOR => {
                if let Some(rd) = self.reg_operand(inst[1]) {
                    let imm = u64::from(u16::from_le_bytes([inst[2], inst[3]]));
                    self.regbank[rd] = match opcode {
                        OPCODE_IMOVS => imm,
                        OPCODE_IADD => self.regbank[rd].wrapping_add(imm),
                        OPCODE_ISUB => self.regbank[rd].wrapping_sub(imm),
                        _ => self.regbank[rd] | imm,
                    };
                }
            }
            OPCODE_LITR => {
                if let Some(rs) = self.reg_operand(inst[1]) {
                    self.itr = self.regbank[rs];
                }
            }
            OPCODE_B => {
                if let Some(rs) = self.reg_operand(inst[1]) {
                    next_pc = self.regbank[rs];
                }
            }
            OPCODE_STB | OPCODE_STW | OPCODE_STL | OPCODE_STQ => {
                let size = match opcode {
                    OPCODE_STB => 1,
                    OPCODE_STW => 2,
                    OPCODE_STL => 4,
                    _ => 8,
                };
                if let (Some(rd), Some(rs)) =
                    (self.reg_operand(inst[1]), self.reg_operand(inst[2]))
                {
                    let addr = self.regbank[rd];
                    let bytes = self.regbank[rs].to_le_bytes();
                    if bus.write(addr, &bytes[..size]).is_err() {
                        self.fault(ESR_MAV);
                    }
                }
            }
            OPCODE_LDB | OPCODE_LDW | OPCODE_LDL | OPCODE_LDQ => {
                let size = match opcode {
                    OPCODE_LDB => 1,
                    OPCODE_LDW => 2,
                    OPCODE_LDL => 4,
                    _ => 8,
                };
                if let (Some(rd), Some(rs)) =
                    (self.reg_operand(inst[1]), self.reg_operand(inst[2]))
                {
                    let addr = self.regbank[rs];
                    let mut bytes = [0u8; 8];
                    match bus.read(addr, &mut bytes[..size]) {
                        Ok(_) => self.regbank[rd] = u64::from_le_bytes(bytes),
                        Err(_) => self.fault(ESR_MAV),
                    }
                }
            }
            _ => {
                // Form::of covers exactly the opcodes above; anything
                // else was already routed to the UD path.
                self.fault(ESR_UD);
                self.poll_interrupts(bus);
                return Ok(Step::Continue);
            }
        }

        self.set_pc(next_pc);
        self.n_cycles += 1;
        trace!("cycle {} completed", self.n_cycles);
        self.poll_interrupts(bus);
        Ok(Step::Continue)
    }

    /// Run until halt. A fetch failure aborts the loop.
    pub fn run(&mut self, bus: &mut impl BusIo) -> Result<(), EmulError> {
        loop {
            match self.step(bus)? {
                Step::Continue => {}
                Step::Halt => return Ok(()),
            }
        }
    }

    /// Log the register bank at info level, two registers per line.
    pub fn dump(&self) {
        info!("[pd={}]", self.domain_id);
        let mut line = String::new();
        for (i, value) in self.regbank.iter().enumerate() {
            line.push_str(&format!("{}=0x{:016X} ", REG_NAMES[i], value));
            if i % 2 == 1 {
                info!("{}", line.trim_end());
                line.clear();
            }
        }
    }
}
