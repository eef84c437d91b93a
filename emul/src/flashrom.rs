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
use crate::errors::EmulError;

/// Firmware flash ROM MMIO window.
pub const BIOS_FLASHROM_START: u64 = 0x0000_0000;
pub const BIOS_FLASHROM_SIZE: u64 = 0x0010_0000;

/// Maximum capacity of flash ROM.
const FLASHROM_CAP: usize = 0x0010_0000;

/// Firmware ROM peer. Read-only from the bus; only `flash` writes it.
#[derive(Debug)]
pub struct FlashRom {
    mem: Balloon,
}

impl FlashRom {
    pub fn new() -> Self {
        Self {
            mem: Balloon::new(8, FLASHROM_CAP),
        }
    }

    /// Copy a firmware image into the ROM at offset 0.
    pub fn flash(&mut self, image: &[u8]) -> Result<usize, EmulError> {
        if image.is_empty() {
            return Err(EmulError::EmptyFirmware);
        }
        self.mem.write(0, image)
    }

    pub fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<usize, EmulError> {
        self.mem.read(offset, buf)
    }
}

impl Default for FlashRom {
    fn default() -> Self {
        Self::new()
    }
}
