//! Image loading.
//!
//! Populates the backing store from a line-oriented Intel HEX image. ELF
//! inputs are first converted by an external objcopy (overridable through
//! the `RISCV_OBJCOPY` environment variable, default resolved on `$PATH`).
//!
//! Parsing is deliberately lenient for broad input compatibility: the
//! record checksum is not verified and unknown record types are skipped
//! silently. Only three types are handled — `0x00` data (relocated by the
//! running extended address), `0x04` extended-address update, and `0x01`
//! end-of-file, which stops parsing early.

use crate::config::defaults;
use crate::error::HarnessError;
use crate::mem::SparseMemory;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Data record: payload bytes placed at the relocated address.
pub const RECORD_DATA: u8 = 0x00;
/// End-of-file record: stops parsing.
pub const RECORD_EOF: u8 = 0x01;
/// Extended linear address record: updates the upper 16 address bits.
pub const RECORD_EXT_ADDR: u8 = 0x04;

/// One parsed hex record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HexRecord {
    /// Declared payload length.
    pub byte_count: u8,
    /// 16-bit record address (low half of the load address).
    pub address: u16,
    /// Record type code.
    pub record_type: u8,
    /// Payload bytes.
    pub payload: Vec<u8>,
}

/// Parses one `:`-prefixed record line; malformed lines yield `None`.
///
/// The trailing checksum is accepted unchecked.
pub fn parse_record(line: &str) -> Option<HexRecord> {
    let body = line.strip_prefix(':')?;
    let byte_count = hex_field(body, 0, 2)? as u8;
    let address = hex_field(body, 2, 4)? as u16;
    let record_type = hex_field(body, 6, 2)? as u8;
    let mut payload = Vec::with_capacity(byte_count as usize);
    for i in 0..byte_count as usize {
        payload.push(hex_field(body, 8 + i * 2, 2)? as u8);
    }
    Some(HexRecord {
        byte_count,
        address,
        record_type,
        payload,
    })
}

fn hex_field(s: &str, start: usize, len: usize) -> Option<u32> {
    let field = s.get(start..start + len)?;
    u32::from_str_radix(field, 16).ok()
}

/// Applies hex-record text to the backing store.
///
/// Returns the number of data bytes written.
pub fn load_hex_str(text: &str, mem: &mut SparseMemory) -> usize {
    let mut upper: u32 = 0;
    let mut written = 0usize;
    for line in text.lines() {
        let Some(record) = parse_record(line) else {
            continue;
        };
        match record.record_type {
            RECORD_DATA => {
                let base = (upper << 16) | u32::from(record.address);
                mem.load(base, &record.payload);
                written += record.payload.len();
            }
            RECORD_EXT_ADDR => {
                if record.payload.len() >= 2 {
                    upper = (u32::from(record.payload[0]) << 8) | u32::from(record.payload[1]);
                }
            }
            RECORD_EOF => break,
            other => {
                debug!(record_type = other, "skipping unhandled hex record");
            }
        }
    }
    written
}

/// Loads a hex-record file into the backing store.
pub fn load_hex(path: &Path, mem: &mut SparseMemory) -> Result<(), HarnessError> {
    let text = fs::read_to_string(path).map_err(|source| HarnessError::ImageOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let written = load_hex_str(&text, mem);
    info!(path = %path.display(), bytes = written, "hex image loaded");
    Ok(())
}

/// Resolves the conversion utility: env override, else search path lookup.
pub fn resolve_objcopy() -> Result<PathBuf, HarnessError> {
    if let Some(tool) = env::var_os(defaults::OBJCOPY_ENV) {
        if !tool.is_empty() {
            return Ok(PathBuf::from(tool));
        }
    }
    which::which(defaults::OBJCOPY_TOOL).map_err(|source| HarnessError::ObjcopyNotFound {
        tool: defaults::OBJCOPY_TOOL.to_string(),
        source,
    })
}

/// Converts an ELF image to `<image>.hex` with the given objcopy.
///
/// Fails when the tool exits non-zero or produces no output file.
pub fn convert_elf(elf: &Path, objcopy: &Path) -> Result<PathBuf, HarnessError> {
    let out = PathBuf::from(format!("{}.hex", elf.display()));
    let status = Command::new(objcopy)
        .arg("-O")
        .arg("ihex")
        .arg(elf)
        .arg(&out)
        .status()
        .map_err(|source| HarnessError::ObjcopySpawn {
            tool: objcopy.to_path_buf(),
            source,
        })?;
    if !status.success() || !out.exists() {
        return Err(HarnessError::Conversion {
            path: elf.to_path_buf(),
            status: status.code().unwrap_or(-1),
        });
    }
    Ok(out)
}

/// Loads an image, converting ELF inputs through objcopy first.
///
/// `objcopy` overrides tool resolution; pass `None` to use the
/// environment/search-path default. Non-ELF inputs are treated as hex
/// records directly.
pub fn load_image(
    path: &Path,
    mem: &mut SparseMemory,
    objcopy: Option<&Path>,
) -> Result<(), HarnessError> {
    let is_elf = path.extension().is_some_and(|e| e == "elf");
    if is_elf {
        let tool = match objcopy {
            Some(t) => t.to_path_buf(),
            None => resolve_objcopy()?,
        };
        let hex = convert_elf(path, &tool)?;
        load_hex(&hex, mem)
    } else {
        load_hex(path, mem)
    }
}
