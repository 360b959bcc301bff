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

//! command descriptor blocks sent to the device
//!

use std::fmt;

/// Longest descriptor built here, the 16 byte pass-through.
const CDB_MAX_LEN: usize = 16;

/// Which command a descriptor carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// SCSI INQUIRY
    Inquiry,
    /// ATA IDENTIFY DEVICE through ATA PASS-THROUGH (12)
    Identify,
    /// ATA IDENTIFY PACKET DEVICE through ATA PASS-THROUGH (16)
    IdentifyPacketDevice,
}

impl CommandKind {
    /// Whether the result is judged by the returned sense data.
    pub fn is_ata_pass_through(self) -> bool {
        !matches!(self, CommandKind::Inquiry)
    }

    /// Command name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Inquiry => "INQUIRY",
            CommandKind::Identify => "IDENTIFY DEVICE",
            CommandKind::IdentifyPacketDevice => "IDENTIFY PACKET DEVICE",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An immutable command descriptor block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    kind: CommandKind,
    bytes: [u8; CDB_MAX_LEN],
    len: usize,
}

impl CommandDescriptor {
    fn new(kind: CommandKind, cdb: &[u8]) -> Self {
        let mut bytes = [0u8; CDB_MAX_LEN];
        bytes[..cdb.len()].copy_from_slice(cdb);
        CommandDescriptor {
            kind,
            bytes,
            len: cdb.len(),
        }
    }

    /// The descriptor bytes, 6, 12 or 16 of them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// The command carried by this descriptor.
    pub fn kind(&self) -> CommandKind {
        self.kind
    }
}

/// INQUIRY, see SPC-4 section 6.4
pub fn build_inquiry(allocation_length: u16) -> CommandDescriptor {
    let [len_hi, len_lo] = allocation_length.to_be_bytes();
    let cdb = [
        0x12u8, /* OPERATION CODE: INQUIRY */
        0,
        0,
        len_hi, /* ALLOCATION LENGTH */
        len_lo,
        0,
    ];
    CommandDescriptor::new(CommandKind::Inquiry, &cdb)
}

/// ATA Pass-Through 12 byte command, T10 04-262r8
pub fn build_identify() -> CommandDescriptor {
    let cdb = [
        0xa1u8, /* OPERATION CODE: 12 byte pass through */
        4 << 1, /* PROTOCOL: PIO Data-in */
        0x2e,   /* OFF_LINE=0, CK_COND=1, T_DIR=1, BYT_BLOK=1, T_LENGTH=2 */
        0,      /* FEATURES */
        1,      /* SECTORS */
        0,      /* LBA LOW */
        0,      /* LBA MID */
        0,      /* LBA HIGH */
        0,      /* SELECT */
        0xEC,   /* Command: ATA IDENTIFY DEVICE */
        0,
        0,
    ];
    CommandDescriptor::new(CommandKind::Identify, &cdb)
}

/// ATA Pass-Through 16 byte command, T10 04-262r8
pub fn build_identify_packet() -> CommandDescriptor {
    let cdb = [
        0x85u8, /* OPERATION CODE: 16 byte pass through */
        4 << 1, /* PROTOCOL: PIO Data-in */
        0x2e,   /* OFF_LINE=0, CK_COND=1, T_DIR=1, BYT_BLOK=1, T_LENGTH=2 */
        0,      /* FEATURES */
        0,      /* FEATURES */
        0,      /* SECTORS */
        1,      /* SECTORS */
        0,      /* LBA LOW */
        0,      /* LBA LOW */
        0,      /* LBA MID */
        0,      /* LBA MID */
        0,      /* LBA HIGH */
        0,      /* LBA HIGH */
        0,      /* DEVICE */
        0xA1,   /* Command: ATA IDENTIFY PACKET DEVICE */
        0,      /* CONTROL */
    ];
    CommandDescriptor::new(CommandKind::IdentifyPacketDevice, &cdb)
}
