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

//! command submission through SG_IO
//!
//! A command is first submitted through the bsg (v4) interface. Drivers
//! that only speak the older sg (v3) interface reject that with EINVAL, in
//! which case the same command is submitted once more through v3.
//!

use crate::{
    cdb::{CommandDescriptor, CommandKind},
    error::{Error, Result},
    identify::IDENTIFY_SIZE,
    sense::SenseData,
};
use nix::errno::Errno;

/// Timeout of every submitted command.
pub const COMMAND_TIMEOUT_MSEC: u32 = 30000;

/// Status triple reported by the kernel after a submission.
///
/// For v4 these are device/transport/driver status, for v3 the
/// scsi/host/driver status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScsiStatus {
    /// SCSI status byte of the device
    pub device: u32,
    /// transport (host adapter) status
    pub transport: u32,
    /// driver status
    pub driver: u32,
}

impl ScsiStatus {
    /// All three fields are zero.
    pub fn is_good(&self) -> bool {
        self.device == 0 && self.transport == 0 && self.driver == 0
    }
}

/// The command channel of an opened device.
pub trait SgIo {
    /// Submit through the bsg (v4) interface.
    fn submit_v4(
        &self,
        cdb: &[u8],
        data: &mut [u8],
        sense: &mut SenseData,
    ) -> Result<ScsiStatus, Errno>;

    /// Submit through the sg (v3) interface.
    fn submit_v3(
        &self,
        cdb: &[u8],
        data: &mut [u8],
        sense: &mut SenseData,
    ) -> Result<ScsiStatus, Errno>;

    /// Legacy HDIO_GET_IDENTITY. The kernel hands back the block already
    /// in host order with readable strings.
    fn get_identity(&self, out: &mut [u8; IDENTIFY_SIZE]) -> Result<(), Errno>;
}

/// Why an attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    /// the submission itself failed, including timeouts
    Transport(Errno),
    /// nonzero status triple
    Status(ScsiStatus),
    /// sense data does not carry the ATA return descriptor
    Sense,
}

/// Result of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// the command succeeded
    Ok,
    /// the interface generation is not supported for this handle
    ProtocolUnsupported,
    /// the command failed
    Failed(FailReason),
}

impl Outcome {
    /// Whether the command has to be resubmitted through v3.
    pub fn needs_fallback(&self) -> bool {
        matches!(self, Outcome::ProtocolUnsupported)
    }

    /// Turn the outcome of `kind` into a result.
    pub fn into_result(self, kind: CommandKind) -> Result<()> {
        let cmd = kind.name();
        match self {
            Outcome::Ok => Ok(()),
            Outcome::ProtocolUnsupported => Err(Error::Transport {
                cmd,
                errno: Errno::EINVAL,
            }),
            Outcome::Failed(FailReason::Transport(errno)) => Err(Error::Transport { cmd, errno }),
            Outcome::Failed(FailReason::Status(status)) => Err(Error::Protocol {
                cmd,
                msg: format!(
                    "status 0x{:x}, transport 0x{:x}, driver 0x{:x}",
                    status.device, status.transport, status.driver
                ),
            }),
            Outcome::Failed(FailReason::Sense) => Err(Error::Protocol {
                cmd,
                msg: "no ATA return descriptor in sense data".to_string(),
            }),
        }
    }
}

/// Judge a submission the kernel accepted.
///
/// A successful ioctl does not mean the device answered: INQUIRY needs a
/// clean status triple, the pass-through commands need the ATA return
/// descriptor in the sense data.
fn validate(kind: CommandKind, status: ScsiStatus, sense: &SenseData) -> Outcome {
    if kind.is_ata_pass_through() {
        if sense.indicates_ata_return(kind) {
            Outcome::Ok
        } else {
            Outcome::Failed(FailReason::Sense)
        }
    } else if status.is_good() {
        Outcome::Ok
    } else {
        Outcome::Failed(FailReason::Status(status))
    }
}

/// Outcome of a v4 submission.
pub fn classify_v4(
    result: Result<ScsiStatus, Errno>,
    kind: CommandKind,
    sense: &SenseData,
) -> Outcome {
    match result {
        Err(Errno::EINVAL) => Outcome::ProtocolUnsupported,
        Err(e) => Outcome::Failed(FailReason::Transport(e)),
        Ok(status) => validate(kind, status, sense),
    }
}

/// Outcome of a v3 submission. There is nothing older to fall back to.
pub fn classify_v3(
    result: Result<ScsiStatus, Errno>,
    kind: CommandKind,
    sense: &SenseData,
) -> Outcome {
    match result {
        Err(e) => Outcome::Failed(FailReason::Transport(e)),
        Ok(status) => validate(kind, status, sense),
    }
}

/// Submit `cdb` and read the response into `buf`.
///
/// `buf` is zeroed before every attempt, so a failed or short transfer
/// never leaves stale data behind.
pub fn execute<D: SgIo + ?Sized>(dev: &D, cdb: &CommandDescriptor, buf: &mut [u8]) -> Outcome {
    let kind = cdb.kind();
    let mut sense = SenseData::default();

    buf.fill(0);
    let outcome = classify_v4(dev.submit_v4(cdb.as_bytes(), buf, &mut sense), kind, &sense);
    if !outcome.needs_fallback() {
        if outcome != Outcome::Ok {
            log::error!("{}: ioctl v4 failed: {:?}", kind, outcome);
        }
        return outcome;
    }

    /* Could be that the driver doesn't do version 4, try version 3 */
    log::debug!("{}: SG_IO v4 not supported, trying v3", kind);
    buf.fill(0);
    sense.clear();
    let outcome = classify_v3(dev.submit_v3(cdb.as_bytes(), buf, &mut sense), kind, &sense);
    if outcome != Outcome::Ok {
        log::error!("{}: ioctl v3 failed: {:?}", kind, outcome);
    }
    outcome
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::cell::RefCell;

    /// Which generation a submission went through.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum Generation {
        V4,
        V3,
    }

    /// A scripted device answering INQUIRY and the IDENTIFY commands.
    pub(crate) struct MockDevice {
        pub(crate) v4_supported: bool,
        pub(crate) inquiry: Vec<u8>,
        pub(crate) inquiry_status: ScsiStatus,
        pub(crate) identify: Option<[u8; IDENTIFY_SIZE]>,
        pub(crate) identify_sense: SenseData,
        pub(crate) legacy: Option<[u8; IDENTIFY_SIZE]>,
        pub(crate) calls: RefCell<Vec<(u8, Generation)>>,
    }

    impl MockDevice {
        /// A disk of the given peripheral type answering IDENTIFY with `identify`.
        pub(crate) fn disk(peripheral_type: u8, identify: [u8; IDENTIFY_SIZE]) -> Self {
            let mut inquiry = vec![0u8; 36];
            inquiry[0] = peripheral_type;
            let mut sense = [0u8; 32];
            sense[0] = 0x72;
            sense[8] = 0x09;
            sense[9] = 0x0c;
            MockDevice {
                v4_supported: true,
                inquiry,
                inquiry_status: ScsiStatus::default(),
                identify: Some(identify),
                identify_sense: SenseData::from_bytes(&sense),
                legacy: None,
                calls: RefCell::new(Vec::new()),
            }
        }

        /// Operation codes submitted so far.
        pub(crate) fn opcodes(&self) -> Vec<u8> {
            self.calls.borrow().iter().map(|(op, _)| *op).collect()
        }

        fn respond(
            &self,
            cdb: &[u8],
            data: &mut [u8],
            sense: &mut SenseData,
        ) -> Result<ScsiStatus, Errno> {
            match cdb[0] {
                0x12 => {
                    let n = data.len().min(self.inquiry.len());
                    data[..n].copy_from_slice(&self.inquiry[..n]);
                    Ok(self.inquiry_status)
                }
                0xa1 | 0x85 => match &self.identify {
                    Some(id) => {
                        data.copy_from_slice(id);
                        *sense = self.identify_sense;
                        Ok(ScsiStatus::default())
                    }
                    None => Err(Errno::EIO),
                },
                _ => Err(Errno::EOPNOTSUPP),
            }
        }
    }

    impl SgIo for MockDevice {
        fn submit_v4(
            &self,
            cdb: &[u8],
            data: &mut [u8],
            sense: &mut SenseData,
        ) -> Result<ScsiStatus, Errno> {
            self.calls.borrow_mut().push((cdb[0], Generation::V4));
            if !self.v4_supported {
                return Err(Errno::EINVAL);
            }
            self.respond(cdb, data, sense)
        }

        fn submit_v3(
            &self,
            cdb: &[u8],
            data: &mut [u8],
            sense: &mut SenseData,
        ) -> Result<ScsiStatus, Errno> {
            self.calls.borrow_mut().push((cdb[0], Generation::V3));
            self.respond(cdb, data, sense)
        }

        fn get_identity(&self, out: &mut [u8; IDENTIFY_SIZE]) -> Result<(), Errno> {
            match &self.legacy {
                Some(id) => {
                    out.copy_from_slice(id);
                    Ok(())
                }
                None => Err(Errno::ENOTTY),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{Generation, MockDevice};
    use super::*;
    use crate::cdb::{build_identify, build_identify_packet, build_inquiry};

    #[test]
    fn test_classify_v4_fallback_decision() {
        let sense = SenseData::default();
        assert_eq!(
            classify_v4(Err(Errno::EINVAL), CommandKind::Inquiry, &sense),
            Outcome::ProtocolUnsupported
        );
        assert_eq!(
            classify_v4(Err(Errno::EIO), CommandKind::Inquiry, &sense),
            Outcome::Failed(FailReason::Transport(Errno::EIO))
        );
        assert_eq!(
            classify_v4(Err(Errno::ETIMEDOUT), CommandKind::Identify, &sense),
            Outcome::Failed(FailReason::Transport(Errno::ETIMEDOUT))
        );
        assert!(classify_v4(Err(Errno::EINVAL), CommandKind::Identify, &sense).needs_fallback());
        /* v3 has nothing to fall back to */
        assert_eq!(
            classify_v3(Err(Errno::EINVAL), CommandKind::Inquiry, &sense),
            Outcome::Failed(FailReason::Transport(Errno::EINVAL))
        );
    }

    #[test]
    fn test_inquiry_status_validation() {
        let sense = SenseData::default();
        assert_eq!(
            classify_v4(Ok(ScsiStatus::default()), CommandKind::Inquiry, &sense),
            Outcome::Ok
        );
        for status in [
            ScsiStatus {
                device: 2,
                ..Default::default()
            },
            ScsiStatus {
                transport: 1,
                ..Default::default()
            },
            ScsiStatus {
                driver: 8,
                ..Default::default()
            },
        ] {
            assert_eq!(
                classify_v3(Ok(status), CommandKind::Inquiry, &sense),
                Outcome::Failed(FailReason::Status(status))
            );
        }
    }

    #[test]
    fn test_identify_requires_sense() {
        /* a clean status is not enough for the pass-through commands */
        let sense = SenseData::default();
        assert_eq!(
            classify_v4(Ok(ScsiStatus::default()), CommandKind::Identify, &sense),
            Outcome::Failed(FailReason::Sense)
        );
        let mut b = [0u8; 32];
        b[0] = 0x70;
        b[13] = 0x1d;
        let fixed = SenseData::from_bytes(&b);
        assert_eq!(
            classify_v3(Ok(ScsiStatus::default()), CommandKind::Identify, &fixed),
            Outcome::Ok
        );
        assert_eq!(
            classify_v3(
                Ok(ScsiStatus::default()),
                CommandKind::IdentifyPacketDevice,
                &fixed
            ),
            Outcome::Failed(FailReason::Sense)
        );
    }

    #[test]
    fn test_execute_v4() {
        let dev = MockDevice::disk(0, [0x5a; IDENTIFY_SIZE]);
        let mut buf = [0u8; IDENTIFY_SIZE];
        assert_eq!(execute(&dev, &build_identify(), &mut buf), Outcome::Ok);
        assert_eq!(buf, [0x5a; IDENTIFY_SIZE]);
        assert_eq!(*dev.calls.borrow(), vec![(0xa1, Generation::V4)]);
    }

    #[test]
    fn test_execute_falls_back_to_v3() {
        let mut dev = MockDevice::disk(5, [0x11; IDENTIFY_SIZE]);
        dev.v4_supported = false;
        let mut buf = [0u8; IDENTIFY_SIZE];
        assert_eq!(execute(&dev, &build_identify_packet(), &mut buf), Outcome::Ok);
        assert_eq!(
            *dev.calls.borrow(),
            vec![(0x85, Generation::V4), (0x85, Generation::V3)]
        );
    }

    #[test]
    fn test_execute_no_retry_on_failure() {
        let mut dev = MockDevice::disk(0, [0; IDENTIFY_SIZE]);
        dev.identify = None;
        let mut buf = [0xffu8; IDENTIFY_SIZE];
        assert_eq!(
            execute(&dev, &build_identify(), &mut buf),
            Outcome::Failed(FailReason::Transport(Errno::EIO))
        );
        assert_eq!(dev.calls.borrow().len(), 1);
        /* buffer was cleared before the attempt */
        assert!(buf.iter().all(|b| *b == 0));
    }

    struct StaleV4;

    impl SgIo for StaleV4 {
        fn submit_v4(
            &self,
            _cdb: &[u8],
            data: &mut [u8],
            _sense: &mut SenseData,
        ) -> Result<ScsiStatus, Errno> {
            data.fill(0xee);
            Err(Errno::EINVAL)
        }

        fn submit_v3(
            &self,
            _cdb: &[u8],
            data: &mut [u8],
            _sense: &mut SenseData,
        ) -> Result<ScsiStatus, Errno> {
            data[0] = 0x05;
            Ok(ScsiStatus::default())
        }

        fn get_identity(&self, _out: &mut [u8; IDENTIFY_SIZE]) -> Result<(), Errno> {
            Err(Errno::ENOTTY)
        }
    }

    #[test]
    fn test_execute_clears_buffer_between_generations() {
        let mut buf = [0u8; 36];
        assert_eq!(execute(&StaleV4, &build_inquiry(36), &mut buf), Outcome::Ok);
        assert_eq!(buf[0], 0x05);
        assert!(buf[1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_into_result() {
        assert!(Outcome::Ok.into_result(CommandKind::Inquiry).is_ok());
        let e = Outcome::Failed(FailReason::Sense)
            .into_result(CommandKind::Identify)
            .unwrap_err();
        assert!(matches!(e, Error::Protocol { cmd: "IDENTIFY DEVICE", .. }));
        let e = Outcome::Failed(FailReason::Transport(Errno::ETIMEDOUT))
            .into_result(CommandKind::Inquiry)
            .unwrap_err();
        assert!(matches!(
            e,
            Error::Transport {
                errno: Errno::ETIMEDOUT,
                ..
            }
        ));
    }
}
