/*
Copyright 2026 The mipsdisasm Authors

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Parses the CLI's `<VAddr>:[<Start>-<End>]` / `<VAddr>:[<Start>+<Length>]`
//! range syntax. Lives outside the library core (it's driver boilerplate),
//! but is small and self-contained enough to unit test directly.

/// One `RANGE` positional argument. `start`/`length` are byte offsets into
/// the input file; `vaddr` is where the disassembler should believe that
/// byte range starts in memory. A bare `<VAddr>` (no colon) leaves `start`
/// and `length` at zero, meaning "whole file" once resolved by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub vaddr: u32,
    pub start: u64,
    pub length: u64,
}

/// Parse a numeric literal the way C's `strtoul(..., 0)` does: `0x`/`0X`
/// prefix selects hex, a bare leading `0` (with more digits) selects octal,
/// anything else is decimal.
fn parse_c_ulong(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).map_err(|e| format!("invalid hex literal '{s}': {e}"))
    } else if s.len() > 1 && s.starts_with('0') {
        u64::from_str_radix(&s[1..], 8).map_err(|e| format!("invalid octal literal '{s}': {e}"))
    } else {
        s.parse::<u64>().map_err(|e| format!("invalid numeric literal '{s}': {e}"))
    }
}

/// Parse a single `RANGE` argument, e.g. `0x80246000:0x1000-0x0E6258`.
pub fn parse(arg: &str) -> Result<Range, String> {
    match arg.split_once(':') {
        None => Ok(Range {
            vaddr: parse_c_ulong(arg)? as u32,
            start: 0,
            length: 0,
        }),
        Some((vaddr_str, rest)) => {
            let vaddr = parse_c_ulong(vaddr_str)? as u32;
            if let Some((start_str, end_str)) = rest.split_once('-') {
                let start = parse_c_ulong(start_str)?;
                let end = parse_c_ulong(end_str)?;
                Ok(Range { vaddr, start, length: end.saturating_sub(start) })
            } else if let Some((start_str, len_str)) = rest.split_once('+') {
                let start = parse_c_ulong(start_str)?;
                let length = parse_c_ulong(len_str)?;
                Ok(Range { vaddr, start, length })
            } else {
                Err(format!("range '{arg}' has a colon but no '-' or '+' separator"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_vaddr_has_zero_start_and_length() {
        let r = parse("0x80000000").unwrap();
        assert_eq!(r, Range { vaddr: 0x8000_0000, start: 0, length: 0 });
    }

    #[test]
    fn start_end_form() {
        let r = parse("0x80246000:0x1000-0x0E6258").unwrap();
        assert_eq!(r.vaddr, 0x8024_6000);
        assert_eq!(r.start, 0x1000);
        assert_eq!(r.length, 0x0E6258 - 0x1000);
    }

    #[test]
    fn start_plus_length_form() {
        let r = parse("0x80246000:0x1000+0x500").unwrap();
        assert_eq!(r.vaddr, 0x8024_6000);
        assert_eq!(r.start, 0x1000);
        assert_eq!(r.length, 0x500);
    }

    #[test]
    fn decimal_literals_without_0x_prefix() {
        let r = parse("2147483648:10-20").unwrap();
        assert_eq!(r.vaddr, 0x8000_0000);
        assert_eq!(r.start, 10);
        assert_eq!(r.length, 10);
    }

    #[test]
    fn rejects_a_colon_with_no_range_separator() {
        assert!(parse("0x80000000:0x1000").is_err());
    }
}
