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

use emul::bus::BusIo;
use emul::errors::EmulError;

/// Minimal bus for CPU tests: flat 64 KiB read/write memory, no
/// peripherals.
pub struct TestBus {
    pub memory: Vec<u8>,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x10000],
        }
    }

    pub fn load(&mut self, addr: usize, data: &[u8]) {
        self.memory[addr..addr + data.len()].copy_from_slice(data);
    }
}

impl BusIo for TestBus {
    fn read(&mut self, addr: u64, buf: &mut [u8]) -> Result<usize, EmulError> {
        let start = addr as usize;
        let end = start + buf.len();
        if end > self.memory.len() {
            return Err(EmulError::NoDevice { addr });
        }
        buf.copy_from_slice(&self.memory[start..end]);
        Ok(buf.len())
    }

    fn write(&mut self, addr: u64, buf: &[u8]) -> Result<usize, EmulError> {
        let start = addr as usize;
        let end = start + buf.len();
        if end > self.memory.len() {
            return Err(EmulError::NoDevice { addr });
        }
        self.memory[start..end].copy_from_slice(buf);
        Ok(buf.len())
    }
}
