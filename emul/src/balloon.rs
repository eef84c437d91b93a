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

use crate::errors::EmulError;

/// Geometrically growable byte buffer backing the memory-like peers.
/// Starts at `step` bytes and doubles on demand up to `cap`; accesses
/// past `cap` fail. Unwritten space reads back as zero.
#[derive(Debug)]
pub struct Balloon {
    buf: Vec<u8>,
    step: usize,
    cap: usize,
}

impl Balloon {
    pub fn new(step: usize, cap: usize) -> Self {
        let step = step.min(cap);
        Self {
            buf: vec![0; step],
            step,
            cap,
        }
    }

    /// Currently allocated size.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow the currently allocated contents.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    fn grow(&mut self, required: usize) -> Result<(), EmulError> {
        if required > self.cap {
            return Err(EmulError::CapacityExceeded {
                offset: required,
                cap: self.cap,
            });
        }
        if required <= self.buf.len() {
            return Ok(());
        }

        let mut new_len = self.buf.len().max(self.step).max(1);
        while new_len < required {
            new_len *= 2;
        }
        self.buf.resize(new_len.min(self.cap), 0);
        Ok(())
    }

    pub fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<usize, EmulError> {
        let end = offset.checked_add(buf.len()).ok_or(EmulError::CapacityExceeded {
            offset,
            cap: self.cap,
        })?;
        self.grow(end)?;
        buf.copy_from_slice(&self.buf[offset..end]);
        Ok(buf.len())
    }

    pub fn write(&mut self, offset: usize, buf: &[u8]) -> Result<usize, EmulError> {
        let end = offset.checked_add(buf.len()).ok_or(EmulError::CapacityExceeded {
            offset,
            cap: self.cap,
        })?;
        self.grow(end)?;
        self.buf[offset..end].copy_from_slice(buf);
        Ok(buf.len())
    }
}
