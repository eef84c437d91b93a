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

use emul::cpu::{CpuDomain, Reg, Step, ESR_IENP, ESR_MAV, ESR_PV, ESR_UD};

mod common;
use common::TestBus;

#[test]
fn imov_then_hlt() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    // imov g0, 0xABCD ; hlt
    bus.load(0, &[0x01, 0x00, 0xCD, 0xAB, 0x00, 0x00, 0x00, 0x00, 0x0D]);

    cpu.run(&mut bus).unwrap();

    assert_eq!(cpu.regbank[Reg::G0 as usize], 0xABCD);
    assert_eq!(cpu.pc(), 8);
    assert_eq!(cpu.esr, 0);
}

#[test]
fn imovs_then_iadd() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    // imovs g0, 5 ; iadd g0, 3 ; hlt
    bus.load(0, &[0x03, 0x00, 0x05, 0x00, 0x05, 0x00, 0x03, 0x00, 0x0D]);

    cpu.run(&mut bus).unwrap();

    assert_eq!(cpu.regbank[Reg::G0 as usize], 8);
    assert_eq!(cpu.n_cycles, 2);
}

#[test]
fn isub_subtracts() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    // imovs g0, 10 ; isub g0, 4 ; hlt
    bus.load(0, &[0x03, 0x00, 0x0A, 0x00, 0x07, 0x00, 0x04, 0x00, 0x0D]);

    cpu.run(&mut bus).unwrap();

    assert_eq!(cpu.regbank[Reg::G0 as usize], 6);
}

#[test]
fn ior_sets_bits() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    // imovs g3, 0xF0 ; ior g3, 0x0F ; hlt
    bus.load(0, &[0x03, 0x03, 0xF0, 0x00, 0x10, 0x03, 0x0F, 0x00, 0x0D]);

    cpu.run(&mut bus).unwrap();

    assert_eq!(cpu.regbank[Reg::G3 as usize], 0xFF);
}

// Opcode 0xFF is undefined: the syndrome latches, pc does not advance,
// and with no service table installed the domain resets.
#[test]
fn undefined_opcode_resets_without_advancing() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    bus.load(0, &[0xFF]);

    assert_eq!(cpu.step(&mut bus).unwrap(), Step::Continue);

    assert_eq!(cpu.esr, ESR_UD);
    assert_eq!(cpu.pc(), 0);
    assert_eq!(cpu.regbank[Reg::G0 as usize], 0x1A1F_1A1F_1A1F_1A1F);
    assert_eq!(cpu.n_cycles, 0);
}

#[test]
fn sync_interrupt_dispatches_through_ist() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    // imov g1, 0x200 ; litr g1 ; <undefined>
    bus.load(
        0,
        &[0x01, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x14, 0x01, 0xFF],
    );
    // IST entry 0: present, isr = 0x80
    let mut entry = [0u8; 16];
    entry[0] = 1;
    entry[8..16].copy_from_slice(&0x80u64.to_le_bytes());
    bus.load(0x200, &entry);
    // Handler: hlt
    bus.load(0x80, &[0x0D]);

    cpu.run(&mut bus).unwrap();

    assert_eq!(cpu.pc(), 0x80);
    assert_eq!(cpu.esr, ESR_UD);
}

#[test]
fn absent_ist_entry_latches_ienp() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    bus.load(0, &[0xFF]);
    cpu.itr = 0x200; // entry present bit stays 0

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.esr, ESR_IENP);
    assert_eq!(cpu.pc(), 0);
}

#[test]
fn unreadable_ist_entry_latches_mav() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    bus.load(0, &[0xFF]);
    cpu.itr = 0xFFFF_0000; // outside the test bus

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.esr, ESR_MAV);
}

#[test]
fn sreg_write_and_read_back() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    // imov g1, 1 ; imov g0, 0x1FF ; srw ; imov g0, 0 ; srr ; hlt
    bus.load(
        0,
        &[
            0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, // imov g1, 1
            0x01, 0x00, 0xFF, 0x01, 0x00, 0x00, 0x00, 0x00, // imov g0, 0x1FF
            0x0F, // srw
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // imov g0, 0
            0x0E, // srr
            0x0D, // hlt
        ],
    );

    cpu.run(&mut bus).unwrap();

    assert_eq!(cpu.regbank[Reg::G0 as usize], 0x1FF);
    assert_eq!(cpu.esr, 0);
}

#[test]
fn sreg_bad_id_is_a_protection_violation() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    bus.load(0, &[0x0F]); // srw with g1 holding the reset pattern

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.esr, ESR_PV);
}

#[test]
fn sreg_write_outside_mask_is_a_protection_violation() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    cpu.regbank[Reg::G1 as usize] = 1; // INTCONF
    cpu.regbank[Reg::G0 as usize] = 0x200; // outside the 0x1FF mask
    bus.load(0, &[0x0F]);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.esr, ESR_PV);
}

#[test]
fn store_then_load_roundtrip() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    cpu.regbank[Reg::G0 as usize] = 0x1000;
    cpu.regbank[Reg::G1 as usize] = 0x1122_3344_5566_7788;
    // stq g0, g1 ; ldq g2, g0 ; hlt
    bus.load(0, &[0x18, 0x00, 0x01, 0x1C, 0x02, 0x00, 0x0D]);

    cpu.run(&mut bus).unwrap();

    assert_eq!(cpu.regbank[Reg::G2 as usize], 0x1122_3344_5566_7788);
    assert_eq!(&bus.memory[0x1000..0x1008], &0x1122_3344_5566_7788u64.to_le_bytes());
}

#[test]
fn narrow_stores_write_only_their_width() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    cpu.regbank[Reg::G0 as usize] = 0x1000;
    cpu.regbank[Reg::G1 as usize] = 0xAABB_CCDD_EEFF_1122;
    // stw g0, g1 ; hlt
    bus.load(0, &[0x16, 0x00, 0x01, 0x0D]);

    cpu.run(&mut bus).unwrap();

    assert_eq!(&bus.memory[0x1000..0x1004], &[0x22, 0x11, 0x00, 0x00]);
}

#[test]
fn narrow_loads_zero_extend() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    cpu.regbank[Reg::G0 as usize] = 0x1000;
    cpu.regbank[Reg::G2 as usize] = u64::MAX;
    bus.load(0x1000, &[0xAB, 0xCD]);
    // ldw g2, g0 ; hlt
    bus.load(0, &[0x1A, 0x02, 0x00, 0x0D]);

    cpu.run(&mut bus).unwrap();

    assert_eq!(cpu.regbank[Reg::G2 as usize], 0xCDAB);
}

#[test]
fn indirect_branch_loads_pc() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    cpu.regbank[Reg::G4 as usize] = 0x30;
    bus.load(0, &[0x1D, 0x04]); // b g4
    bus.load(0x30, &[0x0D]); // hlt

    cpu.run(&mut bus).unwrap();

    assert_eq!(cpu.pc(), 0x30);
}

#[test]
fn out_of_range_register_byte_is_a_protection_violation() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    bus.load(0, &[0x15, 0x63, 0x00]); // stb with rd = 0x63

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.esr, ESR_PV);
}

#[test]
fn fetch_failure_aborts_the_loop() {
    let mut cpu = CpuDomain::new(0);
    let mut bus = TestBus::new();
    cpu.regbank[Reg::Pc as usize] = 0xFFFF_0000;

    assert!(cpu.run(&mut bus).is_err());
}
