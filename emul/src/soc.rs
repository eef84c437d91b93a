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

use crate::balloon::Balloon;
use crate::bus::{mmio_offset, BusIo, BusMap, PeerKind};
use crate::chipset::{ChipsetRegs, CHIPSET_REGS_START, SPICTL_BUSY};
use crate::cpu::{CpuDomain, LocalCache, Step, DOMAIN_CACHE_SIZE, DOMAIN_LCACHE_BASE};
use crate::errors::EmulError;
use crate::flashrom::{FlashRom, BIOS_FLASHROM_START};
use crate::microsd::MicroSd;
use crate::spictl::{SpiBlock, SpiPrpd, SPI_BLOCK_SIZE, SPI_MICROSD, SPI_PRPD_LEN};

/// Base of main memory.
pub const MAIN_MEMORY_START: u64 = 0x0011_6000;

/// Default main memory capacity (2 GiB).
pub const DEFAULT_MEM_CAP: usize = 0x8000_0000;

/// Main memory growth step.
const RAM_STEP: usize = 8;

/// Everything the processor reaches over the bus: the routing table and
/// every peer.
#[derive(Debug)]
pub struct SocBus {
    map: BusMap,
    flashrom: FlashRom,
    lcache: LocalCache,
    chipset: ChipsetRegs,
    ram: Balloon,
    microsd: MicroSd,
}

impl SocBus {
    fn power_up(memcap: usize) -> Result<Self, EmulError> {
        let mut map = BusMap::new();
        map.peer_set(PeerKind::FlashRom, BIOS_FLASHROM_START)?;
        map.peer_set(PeerKind::LocalCache, DOMAIN_LCACHE_BASE)?;
        map.peer_set(PeerKind::Chipset, CHIPSET_REGS_START)?;
        map.peer_set(PeerKind::Ram, MAIN_MEMORY_START)?;

        Ok(Self {
            map,
            flashrom: FlashRom::new(),
            lcache: LocalCache::new(),
            chipset: ChipsetRegs::new(),
            ram: Balloon::new(RAM_STEP, memcap),
            microsd: MicroSd::new(),
        })
    }

    pub fn microsd_insert(&mut self, image: &[u8]) -> Result<(), EmulError> {
        self.microsd.insert(image)
    }

    pub fn microsd_eject(&mut self) {
        self.microsd.eject()
    }

    /// Handle a freshly armed SPI transaction: fetch the PRPD from
    /// guest memory and stream the described buffer to the selected
    /// slave. The controller reads as busy for the duration.
    fn spi_handle(&mut self, prpd_addr: u64) -> Result<(), EmulError> {
        let mut raw = [0u8; SPI_PRPD_LEN];
        self.read(prpd_addr, &mut raw)?;
        let prpd = SpiPrpd::from_bytes(&raw);

        self.chipset.spi_ctlstat |= SPICTL_BUSY;
        let result = self.spi_write(&prpd);
        self.chipset.spi_ctlstat &= !SPICTL_BUSY;
        result
    }

    /// Stream the PRPD buffer to the SPI slave in block-sized chunks,
    /// then flush the slave. Only writes are routed; reads are
    /// reserved.
    fn spi_write(&mut self, prpd: &SpiPrpd) -> Result<(), EmulError> {
        if prpd.chipsel != SPI_MICROSD {
            return Err(EmulError::NoSpiDevice {
                chipsel: prpd.chipsel,
            });
        }
        if !prpd.write {
            return Ok(());
        }

        let mut remaining = prpd.length as usize;
        while remaining > 0 {
            let delta = prpd.length as usize - remaining;
            let n = remaining.min(SPI_BLOCK_SIZE);

            let mut block = SpiBlock {
                shift_reg: [0; SPI_BLOCK_SIZE],
                length: 0,
            };
            if let Err(err) = self.read(prpd.buffer + delta as u64, &mut block.shift_reg[..n]) {
                self.microsd.evict();
                return Err(err);
            }

            block.length = n as u8;
            self.microsd.enqueue(block);
            remaining -= n;
        }

        self.microsd.flush();
        Ok(())
    }
}

impl BusIo for SocBus {
    fn read(&mut self, addr: u64, buf: &mut [u8]) -> Result<usize, EmulError> {
        match self.map.peer_get(addr)? {
            PeerKind::FlashRom => self.flashrom.read(mmio_offset(BIOS_FLASHROM_START, addr), buf),
            PeerKind::LocalCache => self.lcache.read(mmio_offset(DOMAIN_LCACHE_BASE, addr), buf),
            PeerKind::Chipset => Ok(self.chipset.read(buf)),
            PeerKind::Ram => {
                if !self.chipset.cache_gate_open() {
                    return Err(EmulError::MemoryGated);
                }
                self.ram.read(mmio_offset(MAIN_MEMORY_START, addr), buf)
            }
        }
    }

    fn write(&mut self, addr: u64, buf: &[u8]) -> Result<usize, EmulError> {
        match self.map.peer_get(addr)? {
            PeerKind::FlashRom => Err(EmulError::NotWritable { addr }),
            PeerKind::LocalCache => self.lcache.write(mmio_offset(DOMAIN_LCACHE_BASE, addr), buf),
            PeerKind::Chipset => {
                let (n, kick) = self
                    .chipset
                    .write(mmio_offset(CHIPSET_REGS_START, addr), buf);
                if let Some(prpd_addr) = kick {
                    self.spi_handle(prpd_addr)?;
                }
                Ok(n)
            }
            PeerKind::Ram => {
                if !self.chipset.cache_gate_open() {
                    return Err(EmulError::MemoryGated);
                }
                self.ram.write(mmio_offset(MAIN_MEMORY_START, addr), buf)
            }
        }
    }
}

/// System-on-chip: one processing domain wired to the bus peers.
#[derive(Debug)]
pub struct Soc {
    pub cpu: CpuDomain,
    pub bus: SocBus,
}

impl Soc {
    /// Power up the SoC: build the bus, install every peer and reset
    /// the processor.
    pub fn power_up(memcap: usize) -> Result<Self, EmulError> {
        Ok(Self {
            cpu: CpuDomain::new(0),
            bus: SocBus::power_up(memcap)?,
        })
    }

    /// Load a firmware image into the flash ROM. The image must be
    /// strictly smaller than the local cache.
    pub fn flash(&mut self, image: &[u8]) -> Result<(), EmulError> {
        if image.len() >= DOMAIN_CACHE_SIZE {
            return Err(EmulError::FirmwareOverflow { size: image.len() });
        }
        self.bus.flashrom.flash(image)?;
        Ok(())
    }

    /// Run the processor to halt or fetch failure.
    pub fn run(&mut self) -> Result<(), EmulError> {
        let Self { cpu, bus } = self;
        cpu.run(bus)
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Result<Step, EmulError> {
        let Self { cpu, bus } = self;
        cpu.step(bus)
    }
}
