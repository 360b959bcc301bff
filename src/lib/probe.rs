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

//! probe sequence obtaining the IDENTIFY data of a device
//!
//! If we were to use ATA PASS_THROUGH (12) on an ATAPI device we could
//! accidentally blank media. This is because MMC's BLANK command has the
//! same op-code (0x61).
//!
//! To prevent this from happening a SCSI INQUIRY is sent first and only
//! Direct Access Block Devices (type 0x00) and Host Managed Zoned Block
//! Devices (type 0x14) get IDENTIFY DEVICE, while CD/DVD devices (type
//! 0x05) get IDENTIFY PACKET DEVICE. Anything else, or any failure on the
//! way, falls back to HDIO_GET_IDENTITY.
//!

use crate::{
    cdb::{build_identify, build_identify_packet, build_inquiry, CommandDescriptor},
    error::{Error, LegacyIdentifySnafu, Result},
    identify::{IdentifyBlock, IdentifySource, IDENTIFY_SIZE},
    transport::{execute, SgIo},
};
use snafu::ResultExt;
use std::fmt;

/// Allocation length of the standard INQUIRY data.
pub const INQUIRY_BUF_SIZE: usize = 36;

/// SPC-4, section 6.4.2: Standard INQUIRY data
pub fn peripheral_device_type(inquiry: &[u8]) -> u8 {
    inquiry.first().map_or(0x1f, |b| b & 0x1f)
}

/// Which IDENTIFY variant a peripheral device type may receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// IDENTIFY PACKET DEVICE
    IdentifyPacket,
    /// IDENTIFY DEVICE
    IdentifyAta,
    /// not safe to probe with pass-through
    Rejected,
}

/// Route a peripheral device type.
pub fn route(peripheral_device_type: u8) -> Route {
    match peripheral_device_type {
        0x05 => Route::IdentifyPacket,
        0x00 | 0x14 => Route::IdentifyAta,
        _ => Route::Rejected,
    }
}

/// States of the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// nothing sent yet
    Start,
    /// INQUIRY sent
    Inquiry,
    /// IDENTIFY PACKET DEVICE sent
    IdentifyPacket,
    /// IDENTIFY DEVICE sent
    IdentifyAta,
    /// peripheral type is not probed with pass-through
    Rejected,
    /// HDIO_GET_IDENTITY sent
    LegacyFallback,
    /// IDENTIFY data obtained
    Done,
    /// no IDENTIFY data obtainable
    Fatal,
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Runs the probe sequence against one device.
pub struct Prober<'a, D: SgIo + ?Sized> {
    dev: &'a D,
    state: ProbeState,
    history: Vec<ProbeState>,
}

impl<'a, D: SgIo + ?Sized> Prober<'a, D> {
    /// A prober in the Start state.
    pub fn new(dev: &'a D) -> Self {
        Prober {
            dev,
            state: ProbeState::Start,
            history: vec![ProbeState::Start],
        }
    }

    /// current state
    pub fn state(&self) -> ProbeState {
        self.state
    }

    /// every state entered so far, in order
    pub fn history(&self) -> &[ProbeState] {
        &self.history
    }

    fn enter(&mut self, state: ProbeState) {
        log::debug!("probe: {} -> {}", self.state, state);
        self.state = state;
        self.history.push(state);
    }

    fn command(&self, cdb: &CommandDescriptor, buf: &mut [u8]) -> Result<()> {
        execute(self.dev, cdb, buf).into_result(cdb.kind())
    }

    /// The pass-through part of the sequence.
    fn pass_through(&mut self) -> Result<IdentifyBlock> {
        let mut inquiry = [0u8; INQUIRY_BUF_SIZE];

        self.enter(ProbeState::Inquiry);
        self.command(&build_inquiry(INQUIRY_BUF_SIZE as u16), &mut inquiry)?;

        let device_type = peripheral_device_type(&inquiry);
        let (cdb, packet_device) = match route(device_type) {
            Route::IdentifyPacket => {
                self.enter(ProbeState::IdentifyPacket);
                (build_identify_packet(), true)
            }
            Route::IdentifyAta => {
                self.enter(ProbeState::IdentifyAta);
                (build_identify(), false)
            }
            Route::Rejected => {
                self.enter(ProbeState::Rejected);
                return Err(Error::UnsupportedDeviceType { device_type });
            }
        };

        let mut identify = [0u8; IDENTIFY_SIZE];
        self.command(&cdb, &mut identify)?;

        let block = IdentifyBlock::new(identify, IdentifySource::PassThrough { packet_device });
        if block.is_all_zero() {
            return Err(Error::AllZeroIdentify);
        }

        Ok(block)
    }

    /// Obtain the IDENTIFY data, falling back to HDIO_GET_IDENTITY when
    /// the pass-through path fails.
    pub fn run(&mut self) -> Result<IdentifyBlock> {
        match self.pass_through() {
            Ok(block) => {
                self.enter(ProbeState::Done);
                return Ok(block);
            }
            Err(e) => log::debug!("ATA pass-through failed: {}, trying HDIO_GET_IDENTITY", e),
        }

        self.enter(ProbeState::LegacyFallback);
        let mut identify = [0u8; IDENTIFY_SIZE];
        match self.dev.get_identity(&mut identify).context(LegacyIdentifySnafu) {
            Ok(()) => {
                self.enter(ProbeState::Done);
                Ok(IdentifyBlock::new(identify, IdentifySource::Legacy))
            }
            Err(e) => {
                self.enter(ProbeState::Fatal);
                Err(e)
            }
        }
    }
}
