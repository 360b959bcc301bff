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

//!
use log::{Level, Log};
use std::{io::Write, os::unix::net::UnixDatagram, sync::Mutex};

fn write_msg_common(writer: &mut impl Write, module: &str, msg: String) {
    let time: libc::time_t = unsafe { libc::time(std::ptr::null_mut()) };
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    let now_str = if unsafe { libc::localtime_r(&time, &mut tm) }.is_null() {
        String::new()
    } else {
        format!(
            "{:0>4}-{:0>2}-{:0>2} {:0>2}:{:0>2}:{:0>2} ",
            tm.tm_year + 1900, /* tm_year is years since 1900 */
            tm.tm_mon + 1,     /* tm_mon is months since Jan: [0, 11] */
            tm.tm_mday,
            tm.tm_hour,
            tm.tm_min,
            tm.tm_sec
        )
    };

    /* One write per record, so concurrent writers do not interleave. */
    let line = now_str + module + " " + &msg + "\n";
    if let Err(e) = writer.write_all(line.as_bytes()) {
        eprintln!("Failed to log message: {}", e);
    }
}

/// Map a log level to a syslog priority.
fn syslog_priority(level: Level) -> u8 {
    match level {
        Level::Error => libc::LOG_ERR as u8,
        Level::Warn => libc::LOG_WARNING as u8,
        Level::Info => libc::LOG_INFO as u8,
        Level::Debug | Level::Trace => libc::LOG_DEBUG as u8,
    }
}

struct SysLogger {
    ident: String,
    dgram: Mutex<UnixDatagram>,
}

impl SysLogger {
    fn new(ident: &str) -> Result<Self, std::io::Error> {
        let sock = UnixDatagram::unbound()?;
        sock.connect("/dev/log")?;
        Ok(Self {
            ident: ident.to_string(),
            dgram: Mutex::new(sock),
        })
    }
}

/* This is an extremely simple implementation, and only
 * supports the very basic log function. */
impl Log for SysLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let msg = format!(
            "<{}>{}[{}]: {}",
            syslog_priority(record.level()),
            self.ident,
            std::process::id(),
            record.args()
        );

        match self.dgram.lock() {
            Ok(dgr) => {
                if let Err(e) = dgr.send(msg.as_bytes()) {
                    eprintln!("Failed to send message to syslogger: {}", e);
                }
            }
            Err(_) => eprintln!("Failed to lock syslogger"),
        }
    }

    fn flush(&self) {}
}

/// Writes to stderr. Stdout belongs to the tool's own output.
struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let mut stderr = std::io::stderr();
        let module_path = record.module_path().unwrap_or("unknown");
        write_msg_common(&mut stderr, module_path, record.args().to_string());
    }

    fn flush(&self) {}
}

/// Collect different kinds of loggers together.
///
/// Include: SysLogger, ConsoleLogger
struct CombinedLogger {
    loggers: Vec<Box<dyn Log>>,
}

impl Log for CombinedLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        for logger in &self.loggers {
            logger.log(record);
        }
    }

    fn flush(&self) {
        for logger in &self.loggers {
            logger.flush();
        }
    }
}

/// Initialize the global logger instance.
/// Available log `targets` include `syslog` and `console`.
///
/// The logger can only be installed once per process. Later calls only
/// change the maximum level.
///
/// # Arguments
///
/// * `name` - The application name, used as the syslog identifier.
/// * `level` - Log message level.
/// * `targets` - A set of log targets.
pub fn init_log(name: &str, level: Level, targets: &[&str]) {
    log::set_max_level(level.to_level_filter());

    let mut loggers: Vec<Box<dyn Log>> = Vec::new();
    for target in targets {
        match *target {
            "console" => loggers.push(Box::new(ConsoleLogger)),
            "syslog" => match SysLogger::new(name) {
                Ok(logger) => loggers.push(Box::new(logger)),
                Err(e) => eprintln!("{} failed to create syslogger: {}", name, e),
            },
            _ => eprintln!("{}: log target '{}' is strange, ignoring.", name, target),
        }
    }

    if loggers.is_empty() {
        eprintln!("{}: no available log targets.", name);
        return;
    }

    if log::set_boxed_logger(Box::new(CombinedLogger { loggers })).is_err() {
        log::debug!("{}: global logger already installed.", name);
    }
}
