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

//! an opened block device node
//!

use crate::{
    error::{OpenDeviceSnafu, Result},
    identify::IDENTIFY_SIZE,
    sense::{SenseData, SENSE_SIZE},
    transport::{ScsiStatus, SgIo, COMMAND_TIMEOUT_MSEC},
};
use nix::{
    errno::Errno,
    fcntl::{open, OFlag},
    ioctl_read_bad, ioctl_readwrite_bad,
    sys::stat::Mode,
};
use scsi_generic_rs::{
    hd_driveid, sg_io_hdr, sg_io_v4, BSG_GUARD, BSG_PROTOCOL_SCSI, BSG_SUB_PROTOCOL_SCSI_CMD,
    HDIO_GET_IDENTITY, SG_DXFER_FROM_DEV, SG_INTERFACE_ID_ORIG, SG_IO,
};
use snafu::ResultExt;
use std::os::{
    raw::{c_uchar, c_void},
    unix::io::RawFd,
};

ioctl_readwrite_bad!(
    /// ioctl sg_io_v4 with SG_IO
    ioctl_sg_io_v4,
    SG_IO,
    sg_io_v4
);
ioctl_readwrite_bad!(
    /// ioctl sg_io_hdr with SG_IO
    ioctl_sg_io_hdr,
    SG_IO,
    sg_io_hdr
);
ioctl_read_bad!(
    /// ioctl hd_driveid with HDIO_GET_IDENTITY
    ioctl_hdio_get_identity,
    HDIO_GET_IDENTITY,
    hd_driveid
);

/// A device node opened for issuing commands. Closed on drop.
#[derive(Debug)]
pub struct DeviceNode {
    fd: RawFd,
    node: String,
}

impl DeviceNode {
    /// Open the node read-only without blocking and without becoming its
    /// controlling terminal.
    pub fn open(node: &str) -> Result<Self> {
        let fd = open(
            node,
            OFlag::O_RDONLY | OFlag::O_NONBLOCK | OFlag::O_CLOEXEC | OFlag::O_NOCTTY,
            Mode::empty(),
        )
        .context(OpenDeviceSnafu {
            node: node.to_string(),
        })?;

        Ok(DeviceNode {
            fd,
            node: node.to_string(),
        })
    }

    /// path of the node
    pub fn node(&self) -> &str {
        &self.node
    }
}

impl Drop for DeviceNode {
    fn drop(&mut self) {
        let _ = nix::unistd::close(self.fd);
    }
}

impl SgIo for DeviceNode {
    fn submit_v4(
        &self,
        cdb: &[u8],
        data: &mut [u8],
        sense: &mut SenseData,
    ) -> Result<ScsiStatus, Errno> {
        let mut io_v4 = sg_io_v4 {
            guard: BSG_GUARD,
            protocol: BSG_PROTOCOL_SCSI,
            subprotocol: BSG_SUB_PROTOCOL_SCSI_CMD,
            request_len: cdb.len() as u32,
            request: cdb.as_ptr() as u64,
            max_response_len: SENSE_SIZE as u32,
            response: sense.as_mut_bytes().as_mut_ptr() as u64,
            din_xfer_len: data.len() as u32,
            din_xferp: data.as_mut_ptr() as u64,
            timeout: COMMAND_TIMEOUT_MSEC,
            ..Default::default()
        };

        unsafe { ioctl_sg_io_v4(self.fd, &mut io_v4) }?;

        Ok(ScsiStatus {
            device: io_v4.device_status,
            transport: io_v4.transport_status,
            driver: io_v4.driver_status,
        })
    }

    fn submit_v3(
        &self,
        cdb: &[u8],
        data: &mut [u8],
        sense: &mut SenseData,
    ) -> Result<ScsiStatus, Errno> {
        let mut io_hdr = sg_io_hdr {
            interface_id: SG_INTERFACE_ID_ORIG,
            cmdp: cdb.as_ptr() as *mut c_uchar,
            cmd_len: cdb.len() as u8,
            dxferp: data.as_mut_ptr() as *mut c_void,
            dxfer_len: data.len() as u32,
            sbp: sense.as_mut_bytes().as_mut_ptr(),
            mx_sb_len: SENSE_SIZE as u8,
            dxfer_direction: SG_DXFER_FROM_DEV,
            timeout: COMMAND_TIMEOUT_MSEC,
            ..Default::default()
        };

        unsafe { ioctl_sg_io_hdr(self.fd, &mut io_hdr) }?;

        Ok(ScsiStatus {
            device: u32::from(io_hdr.status),
            transport: u32::from(io_hdr.host_status),
            driver: u32::from(io_hdr.driver_status),
        })
    }

    fn get_identity(&self, out: &mut [u8; IDENTIFY_SIZE]) -> Result<(), Errno> {
        let mut id = hd_driveid::default();

        unsafe { ioctl_hdio_get_identity(self.fd, &mut id) }?;

        *out = id.to_bytes();
        Ok(())
    }
}
