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

/// Chipset register MMIO base.
pub const CHIPSET_REGS_START: u64 = 0x0011_0000;

/// Chipset memory control: cache gate. Sticky once set.
pub const CS_MEMCTL_CG: u8 = 1 << 0;

/// SPI controller busy/status bit.
pub const SPICTL_BUSY: u8 = 1 << 1;

/// Byte layout of the register file as seen from the bus.
const MEMCTL_OFFSET: usize = 0x00;
const SPI_PRPD_OFFSET: usize = 0x08;
const SPI_CTLSTAT_OFFSET: usize = 0x10;
pub const CHIPSET_REGS_LEN: usize = 0x18;

/// Chipset register file, read and written with memcpy semantics
/// truncated to the register file size. Reads always start at the base
/// of the file.
#[derive(Debug, Default)]
pub struct ChipsetRegs {
    pub memctl: u8,
    pub spi_prpd: u64,
    pub spi_ctlstat: u8,
}

impl ChipsetRegs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_gate_open(&self) -> bool {
        self.memctl & CS_MEMCTL_CG != 0
    }

    fn to_bytes(&self) -> [u8; CHIPSET_REGS_LEN] {
        let mut bytes = [0u8; CHIPSET_REGS_LEN];
        bytes[MEMCTL_OFFSET] = self.memctl;
        bytes[SPI_PRPD_OFFSET..SPI_PRPD_OFFSET + 8].copy_from_slice(&self.spi_prpd.to_le_bytes());
        bytes[SPI_CTLSTAT_OFFSET] = self.spi_ctlstat;
        bytes
    }

    fn update_from_bytes(&mut self, bytes: &[u8; CHIPSET_REGS_LEN]) {
        self.memctl = bytes[MEMCTL_OFFSET];
        let mut prpd = [0u8; 8];
        prpd.copy_from_slice(&bytes[SPI_PRPD_OFFSET..SPI_PRPD_OFFSET + 8]);
        self.spi_prpd = u64::from_le_bytes(prpd);
        self.spi_ctlstat = bytes[SPI_CTLSTAT_OFFSET];
    }

    /// Copy out the register file, truncated to its size.
    pub fn read(&self, buf: &mut [u8]) -> usize {
        let bytes = self.to_bytes();
        let n = buf.len().min(CHIPSET_REGS_LEN);
        buf[..n].copy_from_slice(&bytes[..n]);
        n
    }

    /// Write into the register file at `offset`. The cache gate bit is
    /// sticky: a write that would clear it is overridden and the bit is
    /// forced back on. Returns the accepted byte count plus the PRPD
    /// address when the write armed a new SPI transaction.
    pub fn write(&mut self, offset: usize, buf: &[u8]) -> (usize, Option<u64>) {
        if offset >= CHIPSET_REGS_LEN {
            return (0, None);
        }

        let old_memctl = self.memctl;
        let old_prpd = self.spi_prpd;

        let mut bytes = self.to_bytes();
        let n = buf.len().min(CHIPSET_REGS_LEN - offset);
        bytes[offset..offset + n].copy_from_slice(&buf[..n]);
        self.update_from_bytes(&bytes);

        if !self.cache_gate_open() && old_memctl & CS_MEMCTL_CG != 0 {
            self.memctl |= CS_MEMCTL_CG;
        }

        let kick = if old_prpd == 0 && self.spi_prpd != 0 {
            Some(self.spi_prpd)
        } else {
            None
        };
        (n, kick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_gate_opens() {
        let mut regs = ChipsetRegs::new();
        assert!(!regs.cache_gate_open());
        regs.write(MEMCTL_OFFSET, &[CS_MEMCTL_CG]);
        assert!(regs.cache_gate_open());
    }

    #[test]
    fn cache_gate_is_sticky() {
        let mut regs = ChipsetRegs::new();
        regs.write(MEMCTL_OFFSET, &[CS_MEMCTL_CG]);
        regs.write(MEMCTL_OFFSET, &[0x00]);
        assert!(regs.cache_gate_open());
    }

    #[test]
    fn reads_start_at_the_base() {
        let mut regs = ChipsetRegs::new();
        regs.write(MEMCTL_OFFSET, &[CS_MEMCTL_CG]);
        let mut buf = [0u8; CHIPSET_REGS_LEN];
        assert_eq!(regs.read(&mut buf), CHIPSET_REGS_LEN);
        assert_eq!(buf[MEMCTL_OFFSET], CS_MEMCTL_CG);
    }

    #[test]
    fn reads_truncate_to_file_size() {
        let regs = ChipsetRegs::new();
        let mut buf = [0xAAu8; 64];
        assert_eq!(regs.read(&mut buf), CHIPSET_REGS_LEN);
        assert_eq!(buf[CHIPSET_REGS_LEN], 0xAA);
    }

    #[test]
    fn prpd_transition_arms_spi() {
        let mut regs = ChipsetRegs::new();
        let (_, kick) = regs.write(SPI_PRPD_OFFSET, &0x11_6800u64.to_le_bytes());
        assert_eq!(kick, Some(0x11_6800));

        // Rewriting a non-zero prpd does not re-arm.
        let (_, kick) = regs.write(SPI_PRPD_OFFSET, &0x11_7000u64.to_le_bytes());
        assert_eq!(kick, None);
    }

    #[test]
    fn writes_past_the_file_are_ignored() {
        let mut regs = ChipsetRegs::new();
        let (n, kick) = regs.write(CHIPSET_REGS_LEN, &[0xFF]);
        assert_eq!(n, 0);
        assert_eq!(kick, None);
    }
}
