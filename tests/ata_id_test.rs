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

use libata_id::{
    identify::{word, IDENTIFY_SIZE, MODEL_LEN, SERIAL_LEN},
    identify_device,
    sense::SenseData,
    transport::ScsiStatus,
    Error, SgIo,
};
use nix::errno::Errno;

/// A SATA disk behind a bsg node.
struct SampleDisk {
    peripheral_type: u8,
    identify: [u8; IDENTIFY_SIZE],
    legacy: Option<[u8; IDENTIFY_SIZE]>,
}

impl SampleDisk {
    fn new(peripheral_type: u8) -> Self {
        let mut identify = [0u8; IDENTIFY_SIZE];
        put_string(&mut identify, word::MODEL, MODEL_LEN, "SAMPLE DISK");
        put_string(&mut identify, word::SERIAL, SERIAL_LEN, "12345");
        put_word(&mut identify, word::COMMAND_SET_1, 1 << 5);
        put_word(&mut identify, word::CFS_ENABLE_1, 1 << 5);
        SampleDisk {
            peripheral_type,
            identify,
            legacy: None,
        }
    }
}

fn put_word(raw: &mut [u8; IDENTIFY_SIZE], offset_words: usize, value: u16) {
    raw[offset_words * 2..offset_words * 2 + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_string(raw: &mut [u8; IDENTIFY_SIZE], offset_words: usize, len: usize, s: &str) {
    let mut padded = vec![b' '; len];
    padded[..s.len()].copy_from_slice(s.as_bytes());
    for (i, pair) in padded.chunks_exact(2).enumerate() {
        raw[(offset_words + i) * 2] = pair[1];
        raw[(offset_words + i) * 2 + 1] = pair[0];
    }
}

impl SgIo for SampleDisk {
    fn submit_v4(
        &self,
        cdb: &[u8],
        data: &mut [u8],
        sense: &mut SenseData,
    ) -> Result<ScsiStatus, Errno> {
        match cdb[0] {
            0x12 => data[0] = self.peripheral_type,
            0xa1 | 0x85 => {
                data.copy_from_slice(&self.identify);
                let mut b = [0u8; 32];
                b[0] = 0x72;
                b[8] = 0x09;
                b[9] = 0x0c;
                *sense = SenseData::from_bytes(&b);
            }
            _ => return Err(Errno::EOPNOTSUPP),
        }
        Ok(ScsiStatus::default())
    }

    fn submit_v3(
        &self,
        _cdb: &[u8],
        _data: &mut [u8],
        _sense: &mut SenseData,
    ) -> Result<ScsiStatus, Errno> {
        panic!("v4 is supported");
    }

    fn get_identity(&self, out: &mut [u8; IDENTIFY_SIZE]) -> Result<(), Errno> {
        match self.legacy {
            Some(id) => {
                *out = id;
                Ok(())
            }
            None => Err(Errno::ENOTTY),
        }
    }
}

fn lines(props: &[(String, String)]) -> Vec<String> {
    props.iter().map(|(k, v)| format!("{}={}", k, v)).collect()
}

#[test]
fn test_sample_disk_export() {
    let report = identify_device(&SampleDisk::new(0x00)).unwrap();
    let out = lines(&report.properties());

    for expected in [
        "ID_ATA=1",
        "ID_TYPE=disk",
        "ID_BUS=ata",
        "ID_MODEL=SAMPLE_DISK",
        "ID_SERIAL=SAMPLE_DISK_12345",
        "ID_SERIAL_SHORT=12345",
        "ID_ATA_WRITE_CACHE=1",
        "ID_ATA_WRITE_CACHE_ENABLED=1",
    ] {
        assert!(out.contains(&expected.to_string()), "missing {}", expected);
    }
    assert!(out.iter().all(|l| !l.starts_with("ID_ATA_SATA")));
    assert!(out.iter().all(|l| !l.starts_with("ID_WWN")));
    assert_eq!(report.plain_line(), "SAMPLE_DISK_12345");
}

#[test]
fn test_legacy_fallback() {
    /* the kernel hands back host order words and readable strings */
    let mut legacy = [0u8; IDENTIFY_SIZE];
    legacy[word::MODEL * 2..word::MODEL * 2 + 8].copy_from_slice(b"OLD DISK");
    legacy[word::ROTATION_RATE * 2..word::ROTATION_RATE * 2 + 2]
        .copy_from_slice(&5400u16.to_ne_bytes());

    let mut disk = SampleDisk::new(0x01);
    disk.legacy = Some(legacy);
    let report = identify_device(&disk).unwrap();
    let out = lines(&report.properties());
    assert!(out.contains(&"ID_MODEL=OLD_DISK".to_string()));
    assert!(out.contains(&"ID_ATA_ROTATION_RATE_RPM=5400".to_string()));
    assert_eq!(report.plain_line(), "OLD_DISK");
}

#[test]
fn test_nothing_obtainable() {
    let e = identify_device(&SampleDisk::new(0x08)).unwrap_err();
    assert!(matches!(e, Error::LegacyIdentify { .. }));
    assert_eq!(e.exit_code(), 2);
}
