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

//! rendering of the identification as device properties
//!

use crate::{
    classify::{DeviceClassification, Feature},
    identify::{DecodedFields, IdentifyBlock},
    utils::commons::{encode_devnode_name, replace_chars, replace_whitespace},
};

/// Identification strings made safe for use in properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdStrings {
    /// normalized model
    pub model: String,
    /// raw model, hex-escaped
    pub model_enc: String,
    /// normalized serial number
    pub serial: String,
    /// normalized firmware revision
    pub revision: String,
}

fn normalize(s: &[u8]) -> String {
    replace_chars(&replace_whitespace(s), "")
}

impl IdStrings {
    /// Normalize the strings of the decoded fields.
    pub fn from_fields(fields: &DecodedFields) -> Self {
        IdStrings {
            model: normalize(&fields.model),
            model_enc: encode_devnode_name(&fields.model),
            serial: normalize(&fields.serial),
            revision: normalize(&fields.firmware_revision),
        }
    }
}

struct Properties(Vec<(String, String)>);

impl Properties {
    fn add(&mut self, key: &str, value: impl ToString) {
        self.0.push((key.to_string(), value.to_string()));
    }

    fn add_flag(&mut self, key: &str, on: bool) {
        self.add(key, if on { 1 } else { 0 });
    }
}

/// The device properties in their stable order.
pub fn export_properties(ids: &IdStrings, class: &DeviceClassification) -> Vec<(String, String)> {
    let mut p = Properties(Vec::new());

    p.add("ID_ATA", 1);
    p.add("ID_TYPE", class.device_type);
    p.add("ID_BUS", "ata");
    p.add("ID_MODEL", &ids.model);
    p.add("ID_MODEL_ENC", &ids.model_enc);
    p.add("ID_REVISION", &ids.revision);
    if ids.serial.is_empty() {
        p.add("ID_SERIAL", &ids.model);
    } else {
        p.add("ID_SERIAL", format!("{}_{}", ids.model, ids.serial));
        p.add("ID_SERIAL_SHORT", &ids.serial);
    }

    for state in &class.features {
        let key = state.feature.key();
        p.add(key, 1);
        if let Some(enabled) = state.enabled {
            p.add_flag(&format!("{}_ENABLED", key), enabled);
        }

        match state.feature {
            Feature::Security => {
                if let Some(s) = &class.security {
                    p.add(&format!("{}_ERASE_UNIT_MIN", key), s.erase_unit_min);
                    if let Some(level) = s.level {
                        p.add(&format!("{}_LEVEL", key), level);
                    }
                    if let Some(min) = s.enhanced_erase_unit_min {
                        p.add(&format!("{}_ENHANCED_ERASE_UNIT_MIN", key), min);
                    }
                    if s.expire {
                        p.add(&format!("{}_EXPIRE", key), 1);
                    }
                    if s.frozen {
                        p.add(&format!("{}_FROZEN", key), 1);
                    }
                    if s.locked {
                        p.add(&format!("{}_LOCKED", key), 1);
                    }
                }
            }
            Feature::Aam => {
                if let Some(a) = &class.acoustic {
                    p.add(&format!("{}_VENDOR_RECOMMENDED_VALUE", key), a.vendor_recommended);
                    p.add(&format!("{}_CURRENT_VALUE", key), a.current);
                }
            }
            Feature::Apm => {
                if let Some(current) = class.apm_current {
                    p.add(&format!("{}_CURRENT_VALUE", key), current);
                }
            }
            _ => {}
        }
    }

    if let Some(sata) = class.sata {
        p.add("ID_ATA_SATA", 1);
        if sata.gen2 {
            p.add("ID_ATA_SATA_SIGNAL_RATE_GEN2", 1);
        }
        if sata.gen1 {
            p.add("ID_ATA_SATA_SIGNAL_RATE_GEN1", 1);
        }
    }

    if let Some(rpm) = class.rotation_rate_rpm {
        p.add("ID_ATA_ROTATION_RATE_RPM", rpm);
    }

    if let Some(wwn) = class.wwn {
        p.add("ID_WWN", format!("0x{:x}", wwn));
        p.add("ID_WWN_WITH_EXTENSION", format!("0x{:x}", wwn));
    }

    if class.cfa {
        p.add("ID_ATA_CFA", 1);
    }

    p.0
}

/// Strings and classification of one device, ready for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// normalized strings
    pub ids: IdStrings,
    /// classification
    pub classification: DeviceClassification,
}

impl Report {
    /// Decode and classify an IDENTIFY block.
    pub fn from_block(block: &IdentifyBlock) -> Self {
        let fields = DecodedFields::decode(block);
        Report {
            ids: IdStrings::from_fields(&fields),
            classification: DeviceClassification::from_fields(&fields),
        }
    }

    /// see [`export_properties`]
    pub fn properties(&self) -> Vec<(String, String)> {
        export_properties(&self.ids, &self.classification)
    }

    /// see [`plain_line`]
    pub fn plain_line(&self) -> String {
        plain_line(&self.ids)
    }
}

/// The single line printed without --export.
pub fn plain_line(ids: &IdStrings) -> String {
    if ids.serial.is_empty() {
        ids.model.clone()
    } else {
        format!("{}_{}", ids.model, ids.serial)
    }
}
