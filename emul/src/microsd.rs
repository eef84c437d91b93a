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

use log::{debug, info, warn};

use crate::balloon::Balloon;
use crate::errors::EmulError;
use crate::spictl::{BlockQueue, SpiBlock, SPI_BLOCK_SIZE};

/// Virtual microSD reader attached to the SPI bus. The shim queues
/// blocks and hex-logs them on flush; it does not model a filesystem.
#[derive(Debug, Default)]
pub struct MicroSd {
    media: Option<Balloon>,
    queue: BlockQueue,
}

impl MicroSd {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if media sits in the virtual reader.
    pub fn is_inserted(&self) -> bool {
        self.media.is_some()
    }

    /// Load a media image into the virtual reader. Leave margin for one
    /// extra block.
    pub fn insert(&mut self, image: &[u8]) -> Result<(), EmulError> {
        if self.is_inserted() {
            return Err(EmulError::MediaPresent);
        }

        let mut media = Balloon::new(image.len(), image.len() + SPI_BLOCK_SIZE);
        media.write(0, image)?;
        self.media = Some(media);
        info!("microsd media inserted ({} bytes)", image.len());
        Ok(())
    }

    pub fn eject(&mut self) {
        if self.media.take().is_some() {
            info!("microsd media ejected");
        }
    }

    pub fn enqueue(&mut self, block: SpiBlock) {
        self.queue.push_back(block);
    }

    /// Drop all queued blocks without flushing them.
    pub fn evict(&mut self) {
        self.queue.clear();
    }

    fn write_block(block: &SpiBlock) {
        let used = &block.shift_reg[..block.length as usize];
        for chunk in used.chunks(4) {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02X}")).collect();
            debug!("{}", hex.join(" "));
        }
    }

    /// Drain the block queue. With no media inserted the blocks are
    /// discarded after a warning.
    pub fn flush(&mut self) {
        debug!("begin microsd spi flush");
        if !self.is_inserted() {
            warn!("flushing to empty microsd port, draining buffers");
        }

        while let Some(block) = self.queue.pop_front() {
            if self.is_inserted() {
                Self::write_block(&block);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(data: &[u8]) -> SpiBlock {
        let mut shift_reg = [0u8; SPI_BLOCK_SIZE];
        shift_reg[..data.len()].copy_from_slice(data);
        SpiBlock {
            shift_reg,
            length: data.len() as u8,
        }
    }

    #[test]
    fn double_insert_is_rejected() {
        let mut sd = MicroSd::new();
        sd.insert(&[1, 2, 3]).unwrap();
        assert_eq!(sd.insert(&[4]), Err(EmulError::MediaPresent));
        sd.eject();
        sd.insert(&[4]).unwrap();
    }

    #[test]
    fn flush_drains_the_queue() {
        let mut sd = MicroSd::new();
        sd.enqueue(block(&[0xAA; 16]));
        sd.enqueue(block(&[0xBB; 4]));
        sd.flush();
        assert!(sd.queue.is_empty());
    }

    #[test]
    fn evict_discards_blocks() {
        let mut sd = MicroSd::new();
        sd.enqueue(block(&[0xAA; 16]));
        sd.evict();
        assert!(sd.queue.is_empty());
    }
}
