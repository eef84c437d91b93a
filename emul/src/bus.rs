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

use crate::chipset::CHIPSET_REGS_START;
use crate::cpu::{DOMAIN_LCACHE_BASE, DOMAIN_LCACHE_SIZE};
use crate::errors::EmulError;
use crate::flashrom::{BIOS_FLASHROM_SIZE, BIOS_FLASHROM_START};
use crate::soc::MAIN_MEMORY_START;

/// Peers addressable through the system bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerKind {
    FlashRom,
    LocalCache,
    Chipset,
    Ram,
}

/// Half-open address range owned by a bus peer.
#[derive(Debug)]
struct PeerRange {
    start: u64,
    end: u64,
    peer: Option<PeerKind>,
}

/// Fixed routing table mapping address ranges to bus peers. Peers are
/// installed once at power-up; lookup is linear over the small table.
#[derive(Debug)]
pub struct BusMap {
    ranges: [PeerRange; 4],
}

impl BusMap {
    pub fn new() -> Self {
        Self {
            ranges: [
                // BIOS flash ROM
                PeerRange {
                    start: BIOS_FLASHROM_START,
                    end: BIOS_FLASHROM_START + BIOS_FLASHROM_SIZE,
                    peer: None,
                },
                // PD local cache
                PeerRange {
                    start: DOMAIN_LCACHE_BASE,
                    end: DOMAIN_LCACHE_BASE + DOMAIN_LCACHE_SIZE,
                    peer: None,
                },
                // Chipset registers
                PeerRange {
                    start: CHIPSET_REGS_START,
                    end: CHIPSET_REGS_START + 0x1000,
                    peer: None,
                },
                // Main memory
                PeerRange {
                    start: MAIN_MEMORY_START,
                    end: u64::MAX,
                    peer: None,
                },
            ],
        }
    }

    /// Look up the peer whose range contains `addr`.
    pub fn peer_get(&self, addr: u64) -> Result<PeerKind, EmulError> {
        self.ranges
            .iter()
            .find(|range| addr >= range.start && addr < range.end)
            .and_then(|range| range.peer)
            .ok_or(EmulError::NoDevice { addr })
    }

    /// Install a peer at the range containing `addr`. Installing over an
    /// occupied slot is rejected.
    pub fn peer_set(&mut self, peer: PeerKind, addr: u64) -> Result<(), EmulError> {
        let range = self
            .ranges
            .iter_mut()
            .find(|range| addr >= range.start && addr < range.end)
            .ok_or(EmulError::NoDevice { addr })?;

        if range.peer.is_some() {
            return Err(EmulError::PeerBusy { addr });
        }
        range.peer = Some(peer);
        Ok(())
    }
}

impl Default for BusMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Offset of an absolute address within a peer's MMIO window.
pub fn mmio_offset(range_start: u64, addr: u64) -> usize {
    (addr - range_start) as usize
}

/// Byte-level access to the system bus. The CPU performs every memory
/// access through this seam.
pub trait BusIo {
    fn read(&mut self, addr: u64, buf: &mut [u8]) -> Result<usize, EmulError>;
    fn write(&mut self, addr: u64, buf: &[u8]) -> Result<usize, EmulError>;
}
