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

//! scsi generic info
//!
//! Kernel ABI of the two SG_IO request generations and of the legacy
//! HDIO_GET_IDENTITY ioctl, laid out as in linux/bsg.h, scsi/sg.h and
//! linux/hdreg.h.

#![allow(non_camel_case_types)]

use std::os::raw::{c_int, c_uchar, c_uint, c_ulong, c_ushort, c_void};

/// SG_IO request, shared by the bsg (v4) and sg (v3) drivers
pub const SG_IO: c_ulong = 0x2285;

/// HDIO_GET_IDENTITY request of the ide/libata drivers
pub const HDIO_GET_IDENTITY: c_ulong = 0x030d;

/// data transfer from the device to the host
pub const SG_DXFER_FROM_DEV: c_int = -3;

/// sg v3 interface identifier
pub const SG_INTERFACE_ID_ORIG: c_int = b'S' as c_int;

/// bsg v4 guard
pub const BSG_GUARD: i32 = b'Q' as i32;

/// bsg protocol: SCSI
pub const BSG_PROTOCOL_SCSI: u32 = 0;

/// bsg sub protocol: SCSI command
pub const BSG_SUB_PROTOCOL_SCSI_CMD: u32 = 0;

/// struct sg_io_v4 of linux/bsg.h
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct sg_io_v4 {
    pub guard: i32,
    pub protocol: u32,
    pub subprotocol: u32,
    pub request_len: u32,
    pub request: u64,
    pub request_tag: u64,
    pub request_attr: u32,
    pub request_priority: u32,
    pub request_extra: u32,
    pub max_response_len: u32,
    pub response: u64,
    pub dout_iovec_count: u32,
    pub dout_xfer_len: u32,
    pub din_iovec_count: u32,
    pub din_xfer_len: u32,
    pub dout_xferp: u64,
    pub din_xferp: u64,
    pub timeout: u32,
    pub flags: u32,
    pub usr_ptr: u64,
    pub spare_in: u32,
    pub driver_status: u32,
    pub transport_status: u32,
    pub device_status: u32,
    pub retry_delay: u32,
    pub info: u32,
    pub duration: u32,
    pub response_len: u32,
    pub din_resid: i32,
    pub dout_resid: i32,
    pub generated_tag: u64,
    pub spare_out: u32,
    pub padding: u32,
}

/// struct sg_io_hdr of scsi/sg.h
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct sg_io_hdr {
    pub interface_id: c_int,
    pub dxfer_direction: c_int,
    pub cmd_len: c_uchar,
    pub mx_sb_len: c_uchar,
    pub iovec_count: c_ushort,
    pub dxfer_len: c_uint,
    pub dxferp: *mut c_void,
    pub cmdp: *mut c_uchar,
    pub sbp: *mut c_uchar,
    pub timeout: c_uint,
    pub flags: c_uint,
    pub pack_id: c_int,
    pub usr_ptr: *mut c_void,
    pub status: c_uchar,
    pub masked_status: c_uchar,
    pub msg_status: c_uchar,
    pub sb_len_wr: c_uchar,
    pub host_status: c_ushort,
    pub driver_status: c_ushort,
    pub resid: c_int,
    pub duration: c_uint,
    pub info: c_uint,
}

impl Default for sg_io_hdr {
    fn default() -> Self {
        sg_io_hdr {
            interface_id: 0,
            dxfer_direction: 0,
            cmd_len: 0,
            mx_sb_len: 0,
            iovec_count: 0,
            dxfer_len: 0,
            dxferp: std::ptr::null_mut(),
            cmdp: std::ptr::null_mut(),
            sbp: std::ptr::null_mut(),
            timeout: 0,
            flags: 0,
            pack_id: 0,
            usr_ptr: std::ptr::null_mut(),
            status: 0,
            masked_status: 0,
            msg_status: 0,
            sb_len_wr: 0,
            host_status: 0,
            driver_status: 0,
            resid: 0,
            duration: 0,
            info: 0,
        }
    }
}

/// Size of struct hd_driveid, which is the 512-byte IDENTIFY block.
pub const HD_DRIVEID_SIZE: usize = 512;

/// struct hd_driveid of linux/hdreg.h, kept as raw words
///
/// The kernel fills it in host byte order with the strings already swapped
/// into reading order.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct hd_driveid {
    pub words: [u16; HD_DRIVEID_SIZE / 2],
}

impl Default for hd_driveid {
    fn default() -> Self {
        hd_driveid {
            words: [0; HD_DRIVEID_SIZE / 2],
        }
    }
}

impl hd_driveid {
    /// The block as bytes in memory order.
    pub fn to_bytes(&self) -> [u8; HD_DRIVEID_SIZE] {
        let mut out = [0u8; HD_DRIVEID_SIZE];
        for (i, w) in self.words.iter().enumerate() {
            out[i * 2..i * 2 + 2].copy_from_slice(&w.to_ne_bytes());
        }
        out
    }
}
