// Copyright (c) 2022 Huawei Technologies Co.,Ltd. All rights reserved.
//
// sysMaster is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan
// PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//         http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY
// KIND, EITHER EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO
// NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.

//! IDENTIFY DEVICE data and its decoding
//!
//! The block returned through ATA pass-through is a sequence of 256
//! little-endian words. ATA strings store two characters per word, first
//! character in the high byte.
//!

use crate::error::{Error, Result};

/// Size of the IDENTIFY data, in bytes.
pub const IDENTIFY_SIZE: usize = 512;

/// Word offsets inside the IDENTIFY data.
pub mod word {
    /// general configuration
    pub const CONFIG: usize = 0;
    /// serial number, 20 characters
    pub const SERIAL: usize = 10;
    /// firmware revision, 8 characters
    pub const FW_REV: usize = 23;
    /// model number, 40 characters
    pub const MODEL: usize = 27;
    /// queue depth
    pub const QUEUE_DEPTH: usize = 75;
    /// SATA capabilities
    pub const SATA_CAPABILITIES: usize = 76;
    /// command set supported
    pub const COMMAND_SET_1: usize = 82;
    /// command set supported
    pub const COMMAND_SET_2: usize = 83;
    /// command set/feature supported extension
    pub const COMMAND_SET_EXT: usize = 84;
    /// command set enabled
    pub const CFS_ENABLE_1: usize = 85;
    /// command set enabled
    pub const CFS_ENABLE_2: usize = 86;
    /// command set/feature default
    pub const CFS_DEFAULT: usize = 87;
    /// time required for SECURITY ERASE UNIT
    pub const ERASE_TIME: usize = 89;
    /// time required for enhanced SECURITY ERASE UNIT
    pub const ENHANCED_ERASE_TIME: usize = 90;
    /// current APM values
    pub const APM_VALUES: usize = 91;
    /// current AAM value
    pub const ACOUSTIC: usize = 94;
    /// World Wide Name, 4 words
    pub const WWN: usize = 108;
    /// device lock function
    pub const DEVICE_LOCK: usize = 128;
    /// nominal media rotation rate
    pub const ROTATION_RATE: usize = 217;
}

/// Length of the serial number, in bytes.
pub const SERIAL_LEN: usize = 20;
/// Length of the firmware revision, in bytes.
pub const FW_REV_LEN: usize = 8;
/// Length of the model number, in bytes.
pub const MODEL_LEN: usize = 40;

/// Where an IDENTIFY block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifySource {
    /// Raw device data from ATA pass-through.
    PassThrough {
        /// answered IDENTIFY PACKET DEVICE
        packet_device: bool,
    },
    /// HDIO_GET_IDENTITY, already normalized by the kernel.
    Legacy,
}

/// 512 bytes of IDENTIFY data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifyBlock {
    raw: [u8; IDENTIFY_SIZE],
    source: IdentifySource,
}

impl IdentifyBlock {
    /// Wrap a block.
    pub fn new(raw: [u8; IDENTIFY_SIZE], source: IdentifySource) -> Self {
        IdentifyBlock { raw, source }
    }

    /// Wrap a buffer, which must hold exactly 512 bytes.
    pub fn from_slice(buf: &[u8], source: IdentifySource) -> Result<Self> {
        let raw: [u8; IDENTIFY_SIZE] = buf
            .try_into()
            .map_err(|_| Error::InvalidIdentifyBlock { len: buf.len() })?;
        Ok(IdentifyBlock::new(raw, source))
    }

    /// The raw bytes.
    pub fn raw(&self) -> &[u8; IDENTIFY_SIZE] {
        &self.raw
    }

    /// Where the block came from.
    pub fn source(&self) -> IdentifySource {
        self.source
    }

    /// A device that did not really answer leaves the block all zero.
    pub fn is_all_zero(&self) -> bool {
        self.raw.iter().all(|b| *b == 0)
    }
}

/// Recover an ATA string of `len` bytes starting at `offset_words`.
///
/// Each word holds its first character in the second byte of the pair.
pub fn swap_string_pairs(raw: &[u8; IDENTIFY_SIZE], offset_words: usize, len: usize) -> Vec<u8> {
    assert!(offset_words * 2 + len <= IDENTIFY_SIZE);

    raw[offset_words * 2..offset_words * 2 + len]
        .chunks_exact(2)
        .flat_map(|pair| [pair[1], pair[0]])
        .collect()
}

fn string_field<const N: usize>(block: &IdentifyBlock, offset_words: usize) -> [u8; N] {
    let mut out = [0u8; N];
    match block.source {
        IdentifySource::PassThrough { .. } => {
            out.copy_from_slice(&swap_string_pairs(&block.raw, offset_words, N));
        }
        IdentifySource::Legacy => {
            out.copy_from_slice(&block.raw[offset_words * 2..offset_words * 2 + N]);
        }
    }
    out
}

fn word_field(block: &IdentifyBlock, offset_words: usize) -> u16 {
    let pair = [block.raw[offset_words * 2], block.raw[offset_words * 2 + 1]];
    match block.source {
        IdentifySource::PassThrough { .. } => u16::from_le_bytes(pair),
        IdentifySource::Legacy => u16::from_ne_bytes(pair),
    }
}

/// The IDENTIFY fields in host order, with readable strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFields {
    /// serial number, space padded
    pub serial: [u8; SERIAL_LEN],
    /// firmware revision, space padded
    pub firmware_revision: [u8; FW_REV_LEN],
    /// model number, space padded
    pub model: [u8; MODEL_LEN],
    /// word 0
    pub config: u16,
    /// word 75
    pub queue_depth: u16,
    /// word 76
    pub sata_capabilities: u16,
    /// word 82
    pub command_set_1: u16,
    /// word 83
    pub command_set_2: u16,
    /// word 84
    pub command_set_ext: u16,
    /// word 85
    pub cfs_enable_1: u16,
    /// word 86
    pub cfs_enable_2: u16,
    /// word 87
    pub cfs_default: u16,
    /// word 89
    pub erase_time: u16,
    /// word 90
    pub enhanced_erase_time: u16,
    /// word 91
    pub apm_values: u16,
    /// word 94
    pub acoustic: u16,
    /// words 108-111
    pub wwn: [u16; 4],
    /// word 128
    pub device_lock: u16,
    /// word 217
    pub rotation_rate: u16,
}

impl DecodedFields {
    /// Decode a block. The block itself is left untouched.
    pub fn decode(block: &IdentifyBlock) -> Self {
        DecodedFields {
            serial: string_field(block, word::SERIAL),
            firmware_revision: string_field(block, word::FW_REV),
            model: string_field(block, word::MODEL),
            config: word_field(block, word::CONFIG),
            queue_depth: word_field(block, word::QUEUE_DEPTH),
            sata_capabilities: word_field(block, word::SATA_CAPABILITIES),
            command_set_1: word_field(block, word::COMMAND_SET_1),
            command_set_2: word_field(block, word::COMMAND_SET_2),
            command_set_ext: word_field(block, word::COMMAND_SET_EXT),
            cfs_enable_1: word_field(block, word::CFS_ENABLE_1),
            cfs_enable_2: word_field(block, word::CFS_ENABLE_2),
            cfs_default: word_field(block, word::CFS_DEFAULT),
            erase_time: word_field(block, word::ERASE_TIME),
            enhanced_erase_time: word_field(block, word::ENHANCED_ERASE_TIME),
            apm_values: word_field(block, word::APM_VALUES),
            acoustic: word_field(block, word::ACOUSTIC),
            wwn: [
                word_field(block, word::WWN),
                word_field(block, word::WWN + 1),
                word_field(block, word::WWN + 2),
                word_field(block, word::WWN + 3),
            ],
            device_lock: word_field(block, word::DEVICE_LOCK),
            rotation_rate: word_field(block, word::ROTATION_RATE),
        }
    }

    /// A decoded word by its offset, None if that word is not decoded.
    pub fn word(&self, offset_words: usize) -> Option<u16> {
        let v = match offset_words {
            word::CONFIG => self.config,
            word::QUEUE_DEPTH => self.queue_depth,
            word::SATA_CAPABILITIES => self.sata_capabilities,
            word::COMMAND_SET_1 => self.command_set_1,
            word::COMMAND_SET_2 => self.command_set_2,
            word::COMMAND_SET_EXT => self.command_set_ext,
            word::CFS_ENABLE_1 => self.cfs_enable_1,
            word::CFS_ENABLE_2 => self.cfs_enable_2,
            word::CFS_DEFAULT => self.cfs_default,
            word::ERASE_TIME => self.erase_time,
            word::ENHANCED_ERASE_TIME => self.enhanced_erase_time,
            word::APM_VALUES => self.apm_values,
            word::ACOUSTIC => self.acoustic,
            108..=111 => self.wwn[offset_words - word::WWN],
            word::DEVICE_LOCK => self.device_lock,
            word::ROTATION_RATE => self.rotation_rate,
            _ => return None,
        };
        Some(v)
    }
}

#[cfg(test)]
pub(crate) mod testdata {
    use super::*;

    /// Builds raw pass-through IDENTIFY data the way a device sends it.
    pub(crate) struct RawIdentify {
        pub(crate) raw: [u8; IDENTIFY_SIZE],
    }

    impl RawIdentify {
        pub(crate) fn new() -> Self {
            RawIdentify {
                raw: [0; IDENTIFY_SIZE],
            }
        }

        /// Store a little-endian word.
        pub(crate) fn word(mut self, offset_words: usize, value: u16) -> Self {
            self.raw[offset_words * 2..offset_words * 2 + 2].copy_from_slice(&value.to_le_bytes());
            self
        }

        /// Store an ATA string, space padded to `len`.
        pub(crate) fn string(mut self, offset_words: usize, len: usize, s: &str) -> Self {
            let mut padded = vec![b' '; len];
            padded[..s.len()].copy_from_slice(s.as_bytes());
            for (i, pair) in padded.chunks_exact(2).enumerate() {
                self.raw[(offset_words + i) * 2] = pair[1];
                self.raw[(offset_words + i) * 2 + 1] = pair[0];
            }
            self
        }

        pub(crate) fn block(&self) -> IdentifyBlock {
            IdentifyBlock::new(
                self.raw,
                IdentifySource::PassThrough {
                    packet_device: false,
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testdata::RawIdentify;
    use super::*;

    #[test]
    fn test_swap_string_pairs() {
        let mut identify = [0u8; IDENTIFY_SIZE];
        for (i, item) in identify.iter_mut().enumerate() {
            *item = (i % 256) as u8;
        }

        assert_eq!(
            swap_string_pairs(&identify, 10, 10),
            vec![21, 20, 23, 22, 25, 24, 27, 26, 29, 28]
        );
    }

    #[test]
    fn test_swap_string_pairs_involution() {
        let raw = RawIdentify::new()
            .string(word::MODEL, MODEL_LEN, "ATA     SAMPLE DISK")
            .raw;
        let once = swap_string_pairs(&raw, word::MODEL, MODEL_LEN);
        assert!(once.starts_with(b"ATA     SAMPLE DISK"));

        let mut again = raw;
        again[word::MODEL * 2..word::MODEL * 2 + MODEL_LEN].copy_from_slice(&once);
        let twice = swap_string_pairs(&again, word::MODEL, MODEL_LEN);
        assert_eq!(twice, raw[word::MODEL * 2..word::MODEL * 2 + MODEL_LEN].to_vec());
    }

    #[test]
    fn test_decode_words_little_endian() {
        let block = RawIdentify::new()
            .word(word::CONFIG, 0x0040)
            .word(word::COMMAND_SET_1, 0x0021)
            .word(word::ROTATION_RATE, 0x1c20)
            .block();
        assert_eq!(block.raw()[0], 0x40);
        assert_eq!(block.raw()[1], 0x00);

        let fields = DecodedFields::decode(&block);
        assert_eq!(fields.config, 0x0040);
        assert_eq!(fields.command_set_1, 0x0021);
        assert_eq!(fields.rotation_rate, 7200);
        assert_eq!(fields.word(word::ROTATION_RATE), Some(7200));
        assert_eq!(fields.word(1), None);
    }

    #[test]
    fn test_decode_strings() {
        let block = RawIdentify::new()
            .string(word::SERIAL, SERIAL_LEN, "12345")
            .string(word::FW_REV, FW_REV_LEN, "1.0")
            .string(word::MODEL, MODEL_LEN, "SAMPLE DISK")
            .block();
        let fields = DecodedFields::decode(&block);
        assert_eq!(&fields.serial, b"12345               ");
        assert_eq!(&fields.firmware_revision, b"1.0     ");
        assert!(fields.model.starts_with(b"SAMPLE DISK "));
    }

    #[test]
    fn test_decode_idempotent() {
        let block = RawIdentify::new()
            .string(word::MODEL, MODEL_LEN, "ST1000DM003")
            .word(word::WWN, 0x5000)
            .word(word::SATA_CAPABILITIES, 0x0006)
            .block();
        let first = DecodedFields::decode(&block);
        let second = DecodedFields::decode(&block);
        assert_eq!(first, second);
        assert_eq!(first.sata_capabilities, 6);
    }

    #[test]
    fn test_decode_legacy_verbatim() {
        let mut raw = [0u8; IDENTIFY_SIZE];
        raw[word::MODEL * 2..word::MODEL * 2 + 4].copy_from_slice(b"DISK");
        raw[word::WWN * 2..word::WWN * 2 + 2].copy_from_slice(&0x5001u16.to_ne_bytes());
        let fields = DecodedFields::decode(&IdentifyBlock::new(raw, IdentifySource::Legacy));
        assert!(fields.model.starts_with(b"DISK"));
        assert_eq!(fields.wwn[0], 0x5001);
    }

    #[test]
    fn test_block_length_contract() {
        let src = IdentifySource::Legacy;
        assert!(IdentifyBlock::from_slice(&[0u8; IDENTIFY_SIZE], src).is_ok());
        assert!(matches!(
            IdentifyBlock::from_slice(&[0u8; 256], src),
            Err(Error::InvalidIdentifyBlock { len: 256 })
        ));
        assert!(IdentifyBlock::from_slice(&[0u8; 513], src).is_err());
    }

    #[test]
    fn test_all_zero() {
        assert!(RawIdentify::new().block().is_all_zero());
        assert!(!RawIdentify::new().word(255, 1).block().is_all_zero());
    }
}
