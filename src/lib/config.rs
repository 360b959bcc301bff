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

//! configuration of ata_id
//!
//! ata_id shares the configuration file of devmaster and only looks at the
//! logging keys.
//!

use crate::error::{Error, Result};
use log::Level;
use serde_derive::Deserialize;
use std::{fs, io::ErrorKind, str::FromStr};

/// default configuration path
pub const DEFAULT_CONFIG: &str = "/etc/devmaster/config.toml";

/// configuration of ata_id
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AtaIdConfig {
    pub(crate) log_level: Option<String>,
    pub(crate) log_targets: Option<Vec<String>>,
}

impl AtaIdConfig {
    /// Parse the configuration from toml text.
    pub fn from_toml(path: &str, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::LoadConfig {
            path: path.to_string(),
            msg: e.to_string(),
        })
    }

    /// Load the configuration file. A missing file gives the defaults.
    pub fn load(path: &str) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => AtaIdConfig::from_toml(path, &content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(AtaIdConfig::default()),
            Err(e) => Err(Error::LoadConfig {
                path: path.to_string(),
                msg: e.to_string(),
            }),
        }
    }

    /// get the log level, info if unset or invalid
    pub fn log_level(&self) -> Level {
        self.log_level
            .as_deref()
            .and_then(|level| Level::from_str(level).ok())
            .unwrap_or(Level::Info)
    }

    /// Get log targets. If not set, use "console" by default.
    pub fn log_targets(&self) -> Vec<String> {
        self.log_targets
            .clone()
            .unwrap_or_else(|| vec!["console".to_string()])
    }
}
