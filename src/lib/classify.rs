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

//! device classification derived from the decoded IDENTIFY fields
//!

use crate::identify::{word, DecodedFields};
use std::fmt;

/// Kind of device behind the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// ATA disk
    Disk,
    /// ATAPI CD/DVD
    Cd,
    /// ATAPI tape
    Tape,
    /// ATAPI optical memory
    Optical,
    /// any other ATAPI device
    Generic,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceType::Disk => "disk",
            DeviceType::Cd => "cd",
            DeviceType::Tape => "tape",
            DeviceType::Optical => "optical",
            DeviceType::Generic => "generic",
        };
        write!(f, "{}", s)
    }
}

/// Bit 15 of the configuration word marks an ATAPI device.
pub fn is_atapi(config: u16) -> bool {
    config & (1 << 15) != 0
}

/// Device type from the configuration word.
pub fn device_type(config: u16) -> DeviceType {
    if !is_atapi(config) {
        return DeviceType::Disk;
    }

    match (config >> 8) & 0x1f {
        0 | 5 => DeviceType::Cd,
        1 => DeviceType::Tape,
        7 => DeviceType::Optical,
        _ => DeviceType::Generic,
    }
}

/// Feature sets reported by the command set words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// volatile write cache
    WriteCache,
    /// host protected area
    Hpa,
    /// power management
    PowerManagement,
    /// security
    Security,
    /// SMART
    Smart,
    /// automatic acoustic management
    Aam,
    /// power-up in standby
    Puis,
    /// advanced power management
    Apm,
    /// DOWNLOAD MICROCODE
    DownloadMicrocode,
}

impl Feature {
    /// Property key announcing the feature.
    pub fn key(self) -> &'static str {
        match self {
            Feature::WriteCache => "ID_ATA_WRITE_CACHE",
            Feature::Hpa => "ID_ATA_FEATURE_SET_HPA",
            Feature::PowerManagement => "ID_ATA_FEATURE_SET_PM",
            Feature::Security => "ID_ATA_FEATURE_SET_SECURITY",
            Feature::Smart => "ID_ATA_FEATURE_SET_SMART",
            Feature::Aam => "ID_ATA_FEATURE_SET_AAM",
            Feature::Puis => "ID_ATA_FEATURE_SET_PUIS",
            Feature::Apm => "ID_ATA_FEATURE_SET_APM",
            Feature::DownloadMicrocode => "ID_ATA_DOWNLOAD_MICROCODE",
        }
    }
}

/// One row of the feature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureBit {
    /// the feature
    pub feature: Feature,
    /// word announcing support
    pub supported_word: usize,
    /// word announcing the feature is enabled, same bit
    pub enabled_word: usize,
    /// bit position in both words
    pub bit: u8,
    /// whether the enabled state is reported at all
    pub reports_enabled: bool,
}

const fn row(feature: Feature, supported_word: usize, bit: u8, reports_enabled: bool) -> FeatureBit {
    FeatureBit {
        feature,
        supported_word,
        /* words 85/86 mirror 82/83 */
        enabled_word: supported_word + 3,
        bit,
        reports_enabled,
    }
}

/// Feature sets in reporting order.
pub const FEATURE_TABLE: [FeatureBit; 9] = [
    row(Feature::WriteCache, word::COMMAND_SET_1, 5, true),
    row(Feature::Hpa, word::COMMAND_SET_1, 10, true),
    row(Feature::PowerManagement, word::COMMAND_SET_1, 3, true),
    row(Feature::Security, word::COMMAND_SET_1, 1, true),
    row(Feature::Smart, word::COMMAND_SET_1, 0, true),
    row(Feature::Aam, word::COMMAND_SET_2, 9, true),
    row(Feature::Puis, word::COMMAND_SET_2, 5, true),
    row(Feature::Apm, word::COMMAND_SET_2, 3, true),
    row(Feature::DownloadMicrocode, word::COMMAND_SET_2, 0, false),
];

/// A supported feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureState {
    /// the feature
    pub feature: Feature,
    /// None when the enabled state is not reported
    pub enabled: Option<bool>,
}

/// Security level, only known while security is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    /// high
    High,
    /// maximum
    Maximum,
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityLevel::High => write!(f, "high"),
            SecurityLevel::Maximum => write!(f, "maximum"),
        }
    }
}

/// Details of the security feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityState {
    /// minutes for SECURITY ERASE UNIT
    pub erase_unit_min: u32,
    /// level, when security is enabled
    pub level: Option<SecurityLevel>,
    /// minutes for enhanced SECURITY ERASE UNIT, when supported
    pub enhanced_erase_unit_min: Option<u32>,
    /// password attempt counter expired
    pub expire: bool,
    /// frozen
    pub frozen: bool,
    /// locked
    pub locked: bool,
}

impl SecurityState {
    fn from_fields(fields: &DecodedFields) -> Self {
        let dlf = fields.device_lock;
        let enabled = fields.cfs_enable_1 & (1 << 1) != 0;

        SecurityState {
            erase_unit_min: u32::from(fields.erase_time) * 2,
            level: enabled.then(|| {
                if dlf & (1 << 8) != 0 {
                    SecurityLevel::Maximum
                } else {
                    SecurityLevel::High
                }
            }),
            enhanced_erase_unit_min: (dlf & (1 << 5) != 0)
                .then(|| u32::from(fields.enhanced_erase_time) * 2),
            expire: dlf & (1 << 4) != 0,
            frozen: dlf & (1 << 3) != 0,
            locked: dlf & (1 << 2) != 0,
        }
    }
}

/// Automatic acoustic management values of word 94.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcousticValues {
    /// vendor recommended value
    pub vendor_recommended: u8,
    /// current value
    pub current: u8,
}

/// Signaling rates of a SATA device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SataSignaling {
    /// 1.5 Gb/s
    pub gen1: bool,
    /// 3.0 Gb/s
    pub gen2: bool,
}

/*
 * Word 76 indicates the capabilities of a SATA device. A PATA device shall set
 * word 76 to 0000h or FFFFh, in which case words 76 through 79 are not valid.
 */
/// SATA signaling rates, None for a device that is not SATA.
pub fn sata_signaling(w76: u16) -> Option<SataSignaling> {
    if matches!(w76, 0x0000 | 0xffff) {
        return None;
    }

    Some(SataSignaling {
        gen1: w76 & (1 << 1) != 0,
        gen2: w76 & (1 << 2) != 0,
    })
}

/// Nominal media rotation rate of word 217. 0 means non-rotating media,
/// None means not reported.
pub fn rotation_rate_rpm(w217: u16) -> Option<u16> {
    match w217 {
        0x0001 => Some(0),
        0x0401..=0xfffe => Some(w217),
        _ => None,
    }
}

/// World Wide Name of words 108-111 in the NAA IEEE Registered format.
pub fn wwn(words: [u16; 4]) -> Option<u64> {
    if words[0] & 0xf000 != 0x5000 {
        return None;
    }

    Some(
        words
            .iter()
            .fold(0u64, |acc, w| (acc << 16) | u64::from(*w)),
    )
}

/// CompactFlash device, from Linux's include/linux/ata.h
pub fn is_cfa(config: u16, command_set_2: u16) -> bool {
    matches!(config, 0x848a | 0x844a) || (command_set_2 & 0xc004) == 0x4004
}

/// Everything derived from one IDENTIFY block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceClassification {
    /// device type
    pub device_type: DeviceType,
    /// ATAPI rather than ATA
    pub atapi: bool,
    /// supported feature sets, in table order
    pub features: Vec<FeatureState>,
    /// present when the security feature set is supported
    pub security: Option<SecurityState>,
    /// present when AAM is supported
    pub acoustic: Option<AcousticValues>,
    /// current APM level, present when APM is enabled
    pub apm_current: Option<u8>,
    /// present for SATA devices
    pub sata: Option<SataSignaling>,
    /// nominal rotation rate
    pub rotation_rate_rpm: Option<u16>,
    /// World Wide Name
    pub wwn: Option<u64>,
    /// CompactFlash device
    pub cfa: bool,
}

impl DeviceClassification {
    /// Classify the decoded fields.
    pub fn from_fields(fields: &DecodedFields) -> Self {
        let features: Vec<FeatureState> = FEATURE_TABLE
            .iter()
            .filter(|row| fields.word(row.supported_word).unwrap_or(0) & (1 << row.bit) != 0)
            .map(|row| FeatureState {
                feature: row.feature,
                enabled: row
                    .reports_enabled
                    .then(|| fields.word(row.enabled_word).unwrap_or(0) & (1 << row.bit) != 0),
            })
            .collect();

        let state = |f: Feature| features.iter().find(|s| s.feature == f).copied();

        let security = state(Feature::Security).map(|_| SecurityState::from_fields(fields));
        let acoustic = state(Feature::Aam).map(|_| AcousticValues {
            vendor_recommended: (fields.acoustic >> 8) as u8,
            current: (fields.acoustic & 0xff) as u8,
        });
        let apm_current = state(Feature::Apm)
            .filter(|s| s.enabled == Some(true))
            .map(|_| (fields.apm_values & 0xff) as u8);

        DeviceClassification {
            device_type: device_type(fields.config),
            atapi: is_atapi(fields.config),
            security,
            acoustic,
            apm_current,
            sata: sata_signaling(fields.sata_capabilities),
            rotation_rate_rpm: rotation_rate_rpm(fields.rotation_rate),
            wwn: wwn(fields.wwn),
            cfa: is_cfa(fields.config, fields.command_set_2),
            features,
        }
    }

    /// State of `feature`, None if it is not supported.
    pub fn feature(&self, feature: Feature) -> Option<&FeatureState> {
        self.features.iter().find(|s| s.feature == feature)
    }
}
