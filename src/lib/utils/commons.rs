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

//! string helpers for device reported identifiers
//!
//! Device strings are raw bytes and need not be valid UTF-8, so everything
//! here works on byte slices.
//!

use lazy_static::lazy_static;
use regex::bytes::Regex;

lazy_static! {
    static ref WHITESPACE_RE: Regex = Regex::new(r"(?-u)[[:space:]]+").unwrap();
}

/// same set as isspace(3) in the C locale
fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t'..=b'\r')
}

pub(crate) fn valid_devnode_chars(c: u8, white_list: &str) -> bool {
    c.is_ascii_alphanumeric() || b"#+-.:=@_".contains(&c) || white_list.as_bytes().contains(&c)
}

/// The valid multibyte UTF-8 sequence at the start of `s`, if any.
fn utf8_sequence(s: &[u8]) -> Option<&str> {
    let len = match s.first()? {
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return None,
    };
    s.get(..len).and_then(|seq| std::str::from_utf8(seq).ok())
}

/// Cut the string at the first NUL, strip leading and trailing whitespace
/// and replace every inner whitespace run with a single '_'.
pub fn replace_whitespace(s: &[u8]) -> Vec<u8> {
    let s = match s.iter().position(|c| *c == 0) {
        Some(n) => &s[..n],
        None => s,
    };
    let start = s.iter().position(|c| !is_space(*c)).unwrap_or(s.len());
    let end = s.iter().rposition(|c| !is_space(*c)).map_or(start, |p| p + 1);

    WHITESPACE_RE
        .replace_all(&s[start..end], &b"_"[..])
        .into_owned()
}

/// replace invalid chars with '_', except for white list, plain ascii, hex-escaping and valid utf8
pub fn replace_chars(s: &[u8], white_list: &str) -> String {
    let mut ret = String::with_capacity(s.len());
    let mut i = 0;

    while i < s.len() {
        let c = s[i];
        if valid_devnode_chars(c, white_list) {
            ret.push(c as char);
            i += 1;
            continue;
        }

        if c == b'\\' && s.get(i + 1) == Some(&b'x') {
            ret.push_str("\\x");
            i += 2;
            continue;
        }

        if let Some(seq) = utf8_sequence(&s[i..]) {
            ret.push_str(seq);
            i += seq.len();
            continue;
        }

        // if whitespace is in white list, replace whitespace with ordinary space
        if is_space(c) && white_list.contains(' ') {
            ret.push(' ');
            i += 1;
            continue;
        }

        ret.push('_');
        i += 1;
    }

    ret
}

/// Encode a string for use as a device node name. Backslashes and bytes
/// not allowed in a node name are written as "\xNN", valid multibyte
/// UTF-8 is kept.
pub fn encode_devnode_name(s: &[u8]) -> String {
    let mut str_enc = String::with_capacity(s.len());
    let mut i = 0;

    while i < s.len() && s[i] != 0 {
        if let Some(seq) = utf8_sequence(&s[i..]) {
            str_enc.push_str(seq);
            i += seq.len();
            continue;
        }

        let c = s[i];
        if c == b'\\' || !valid_devnode_chars(c, "") {
            str_enc.push_str(&format!("\\x{:02x}", c));
        } else {
            str_enc.push(c as char);
        }
        i += 1;
    }

    str_enc
}
