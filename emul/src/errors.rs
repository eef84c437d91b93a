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

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum EmulError {
    #[error("no device mapped at address {addr:#010x}")]
    NoDevice { addr: u64 },

    #[error("bus peer already installed at {addr:#010x}")]
    PeerBusy { addr: u64 },

    #[error("device at {addr:#010x} is not writable")]
    NotWritable { addr: u64 },

    #[error("offset {offset:#x} exceeds capacity {cap:#x}")]
    CapacityExceeded { offset: usize, cap: usize },

    #[error("main memory is gated until the chipset cache gate opens")]
    MemoryGated,

    #[error("firmware image of {size} bytes overflows the local cache")]
    FirmwareOverflow { size: usize },

    #[error("empty firmware image")]
    EmptyFirmware,

    #[error("no spi device with chip select {chipsel}")]
    NoSpiDevice { chipsel: u8 },

    #[error("microsd media already inserted")]
    MediaPresent,
}
