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

//! libata_id
//!
//! Reads the IDENTIFY data of ATA and ATAPI devices through SCSI ATA
//! pass-through, falling back to HDIO_GET_IDENTITY, and derives the
//! device properties from it.
//!
//! The layers, bottom-up:
//! - [`cdb`]: command descriptor blocks
//! - [`transport`]: SG_IO v4 with v3 fallback, judged by status and sense
//! - [`probe`]: INQUIRY gated choice of the IDENTIFY variant
//! - [`identify`] and [`classify`]: decoding and classification
//! - [`export`]: the device properties
//!

pub mod cdb;
pub mod classify;
pub mod config;
pub mod device;
pub mod error;
pub mod export;
pub mod identify;
pub mod probe;
pub mod sense;
pub mod transport;
pub mod utils;

pub use error::{Error, Result};
pub use export::Report;
pub use probe::Prober;
pub use transport::SgIo;

/// Probe a device and build its report.
pub fn identify_device<D: SgIo + ?Sized>(dev: &D) -> Result<Report> {
    let block = Prober::new(dev).run()?;
    Ok(Report::from_block(&block))
}
