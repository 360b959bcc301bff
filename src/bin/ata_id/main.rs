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

//! ata_id - reads product/serial number from ATA drives
//!

use clap::Parser;
use libata_id::{
    config::{AtaIdConfig, DEFAULT_CONFIG},
    device::DeviceNode,
    identify_device,
};
use std::process;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Print values as environment keys
    #[clap(short('x'), long("export"))]
    export_flag: bool,
    /// Device node to probe
    device: Option<String>,
}

fn run(args: &Args) -> i32 {
    let node = match &args.device {
        Some(node) => node,
        None => {
            log::error!("no device");
            return 1;
        }
    };

    let dev = match DeviceNode::open(node) {
        Ok(dev) => dev,
        Err(e) => {
            log::error!("{}", e);
            return e.exit_code();
        }
    };

    let report = match identify_device(&dev) {
        Ok(report) => report,
        Err(e) => {
            log::error!("{}: {}", dev.node(), e);
            return e.exit_code();
        }
    };

    if args.export_flag {
        for (key, value) in report.properties() {
            println!("{}={}", key, value);
        }
    } else {
        println!("{}", report.plain_line());
    }

    0
}

fn main() {
    let args = Args::parse();

    let (config, load_err) = match AtaIdConfig::load(DEFAULT_CONFIG) {
        Ok(config) => (config, None),
        Err(e) => (AtaIdConfig::default(), Some(e)),
    };
    let targets = config.log_targets();
    let targets: Vec<&str> = targets.iter().map(|t| t.as_str()).collect();
    log::init_log("ata_id", config.log_level(), &targets);
    if let Some(e) = load_err {
        log::error!("{}", e);
    }

    process::exit(run(&args));
}
