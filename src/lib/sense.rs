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

//! sense data returned with a command
//!

use crate::cdb::CommandKind;

/// Size of the sense buffer handed to the kernel.
pub const SENSE_SIZE: usize = 32;

/// Response code of descriptor format sense data.
const SENSE_DESCRIPTOR_FORMAT: u8 = 0x72;
/// Response code of fixed format sense data.
const SENSE_FIXED_FORMAT: u8 = 0x70;
/// ATA Status Return descriptor code.
const ATA_RETURN_DESCRIPTOR: u8 = 0x09;
/// Additional length of the ATA Status Return descriptor.
const ATA_RETURN_DESCRIPTOR_LEN: u8 = 0x0c;
/// ASCQ "ATA pass through information available"
const ATA_PASS_THROUGH_INFO_AVAILABLE: u8 = 0x1d;

/// Sense buffer of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenseData {
    buf: [u8; SENSE_SIZE],
}

impl Default for SenseData {
    fn default() -> Self {
        SenseData {
            buf: [0; SENSE_SIZE],
        }
    }
}

impl SenseData {
    /// Sense data holding the given bytes, zero padded.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut sense = SenseData::default();
        let n = bytes.len().min(SENSE_SIZE);
        sense.buf[..n].copy_from_slice(&bytes[..n]);
        sense
    }

    /// Raw sense bytes.
    pub fn as_bytes(&self) -> &[u8; SENSE_SIZE] {
        &self.buf
    }

    /// Raw sense bytes, for the kernel to fill in.
    pub fn as_mut_bytes(&mut self) -> &mut [u8; SENSE_SIZE] {
        &mut self.buf
    }

    /// Zero the buffer before a new attempt.
    pub fn clear(&mut self) {
        self.buf = [0; SENSE_SIZE];
    }

    fn response_code(&self) -> u8 {
        self.buf[0] & 0x7f
    }

    fn is_descriptor_ata_return(&self) -> bool {
        self.response_code() == SENSE_DESCRIPTOR_FORMAT
            && self.buf[8] == ATA_RETURN_DESCRIPTOR
            && self.buf[9] == ATA_RETURN_DESCRIPTOR_LEN
    }

    fn is_fixed_ata_return(&self) -> bool {
        self.response_code() == SENSE_FIXED_FORMAT
            && self.buf[12] == 0x00
            && self.buf[13] == ATA_PASS_THROUGH_INFO_AVAILABLE
    }

    /// Whether the sense data says the ATA pass-through command ran and
    /// returned its registers.
    ///
    /// INQUIRY is not judged by sense data and always passes.
    pub fn indicates_ata_return(&self, kind: CommandKind) -> bool {
        match kind {
            CommandKind::Inquiry => true,
            CommandKind::Identify => self.is_descriptor_ata_return() || self.is_fixed_ata_return(),
            CommandKind::IdentifyPacketDevice => self.is_descriptor_ata_return(),
        }
    }
}
