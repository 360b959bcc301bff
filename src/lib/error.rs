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

//! errors of libata_id
//!
use nix::errno::Errno;
use snafu::prelude::*;

/// result of libata_id
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// ata_id error
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// Both SG_IO generations failed to carry the command
    #[snafu(display("{}: transport failed: {}", cmd, errno))]
    Transport {
        /// command name
        cmd: &'static str,
        /// errno of the last submission
        errno: Errno,
    },

    /// The device executed the command but status or sense reports failure
    #[snafu(display("{}: device reported failure: {}", cmd, msg))]
    Protocol {
        /// command name
        cmd: &'static str,
        /// message
        msg: String,
    },

    /// The IDENTIFY data returned by the device is all zeroes
    #[snafu(display("IDENTIFY data is all zeroes"))]
    AllZeroIdentify,

    /// The peripheral device type is not safe to probe with ATA pass-through
    #[snafu(display("Unsupported peripheral device type 0x{:02x}", device_type))]
    UnsupportedDeviceType {
        /// peripheral device type from INQUIRY
        device_type: u8,
    },

    /// HDIO_GET_IDENTITY failed after the pass-through path gave up
    #[snafu(display("HDIO_GET_IDENTITY failed: {}", source))]
    LegacyIdentify {
        /// errno of the ioctl
        source: Errno,
    },

    /// The device node could not be opened
    #[snafu(display("Cannot open '{}': {}", node, source))]
    OpenDevice {
        /// device node
        node: String,
        /// errno of open(2)
        source: Errno,
    },

    /// An IDENTIFY block must be exactly 512 bytes
    #[snafu(display("Invalid IDENTIFY block length {}", len))]
    InvalidIdentifyBlock {
        /// length of the rejected buffer
        len: usize,
    },

    /// The configuration file exists but could not be used
    #[snafu(display("Failed to load '{}': {}", path, msg))]
    LoadConfig {
        /// configuration path
        path: String,
        /// message
        msg: String,
    },
}

impl Error {
    /// Process exit code reported for this error.
    ///
    /// 1 when the device could not be opened, 2 when no IDENTIFY data
    /// could be obtained at all.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::OpenDevice { .. } => 1,
            _ => 2,
        }
    }
}
