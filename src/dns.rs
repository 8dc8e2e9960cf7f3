//! DNS wire-format inspection and patching.
//!
//! Pure functions over raw message buffers: domain-name decoding (including
//! compressed-pointer labels), the header fields the resolution loop keys on,
//! and the two in-place flag patches applied to replies. No I/O happens here.

use thiserror::Error;

/// Length of the fixed DNS message header.
pub const HEADER_LEN: usize = 12;

/// NS record type code.
const TYPE_NS: u16 = 2;

// Header flag bits. QR and AA live in byte 2, RA and the RCODE nibble in
// byte 3.
const FLAG_QR: u8 = 0x80;
const FLAG_AA: u8 = 0x04;
const FLAG_RA: u8 = 0x80;
const RCODE_MASK: u8 = 0x0f;
const RCODE_NXDOMAIN: u8 = 3;

/// Errors produced while reading a DNS message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// The buffer ended before the structure being read did.
    #[error("message truncated mid-name or mid-record")]
    UnexpectedEnd,
    /// A label length byte used the reserved `01`/`10` top bits.
    #[error("reserved label type {0:#04x}")]
    ReservedLabelType(u8),
    /// A compression pointer did not target a prior offset.
    #[error("compression pointer at {at} targets offset {target}")]
    BadPointer { at: usize, target: usize },
    /// A name tried to follow a second compression pointer.
    #[error("chained compression pointers")]
    PointerChain,
    /// The message carries no question where one is required.
    #[error("message has no question section")]
    NoQuestion,
}

/// Decodes the domain name starting at `offset`.
///
/// Returns the dotted name (no trailing dot) and the offset just past the
/// name as laid out at `offset`: past the terminating zero byte, or past the
/// 2-byte pointer when the name ends in one.
///
/// A length byte with top bits `11` is a compression pointer; its low 14 bits
/// are an absolute offset into the same buffer where the name continues. At
/// most one pointer is followed, and it must target an offset strictly before
/// itself (RFC 1035 compresses against a *prior* occurrence, which also rules
/// out loops).
pub fn decode_name(buf: &[u8], offset: usize) -> Result<(String, usize), WireError> {
    let mut name = String::new();
    let mut pos = offset;
    let mut end = None;
    let mut jumped = false;

    loop {
        let len = *buf.get(pos).ok_or(WireError::UnexpectedEnd)? as usize;
        match len & 0xc0 {
            0x00 => {
                if len == 0 {
                    return Ok((name, end.unwrap_or(pos + 1)));
                }
                let label = buf
                    .get(pos + 1..pos + 1 + len)
                    .ok_or(WireError::UnexpectedEnd)?;
                if !name.is_empty() {
                    name.push('.');
                }
                name.extend(label.iter().map(|&b| b as char));
                pos += 1 + len;
            }
            0xc0 => {
                if jumped {
                    return Err(WireError::PointerChain);
                }
                let low = *buf.get(pos + 1).ok_or(WireError::UnexpectedEnd)? as usize;
                let target = (len & 0x3f) << 8 | low;
                if target >= pos {
                    return Err(WireError::BadPointer { at: pos, target });
                }
                end = Some(pos + 2);
                pos = target;
                jumped = true;
            }
            _ => return Err(WireError::ReservedLabelType(len as u8)),
        }
    }
}

/// Encodes a dotted name as length-prefixed labels plus the zero terminator.
///
/// The inverse of [`decode_name`] for pointer-free names; empty labels (an
/// empty string or a trailing dot) are dropped rather than encoded.
pub fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(name.len() + 2);
    for label in name.split('.').filter(|l| !l.is_empty()) {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

/// Advances past the name at `offset` without decoding it.
///
/// Pointers are never followed: a name ending in one occupies two bytes at
/// its position regardless of where the pointer leads.
pub fn skip_name(buf: &[u8], offset: usize) -> Result<usize, WireError> {
    let mut pos = offset;
    loop {
        let len = *buf.get(pos).ok_or(WireError::UnexpectedEnd)? as usize;
        match len & 0xc0 {
            0x00 => {
                if len == 0 {
                    return Ok(pos + 1);
                }
                pos += 1 + len;
            }
            0xc0 => {
                if pos + 2 > buf.len() {
                    return Err(WireError::UnexpectedEnd);
                }
                return Ok(pos + 2);
            }
            _ => return Err(WireError::ReservedLabelType(len as u8)),
        }
    }
}

/// Returns the response-code nibble (low 4 bits of byte 3). 0 is NOERROR.
pub fn response_code(buf: &[u8]) -> u8 {
    buf[3] & RCODE_MASK
}

/// Returns QDCOUNT.
pub fn question_count(buf: &[u8]) -> u16 {
    u16::from_be_bytes([buf[4], buf[5]])
}

/// Returns ANCOUNT.
pub fn answer_count(buf: &[u8]) -> u16 {
    u16::from_be_bytes([buf[6], buf[7]])
}

/// Returns NSCOUNT.
pub fn authority_count(buf: &[u8]) -> u16 {
    u16::from_be_bytes([buf[8], buf[9]])
}

/// Decodes the name of the first question.
pub fn query_name(buf: &[u8]) -> Result<String, WireError> {
    if question_count(buf) == 0 {
        return Err(WireError::NoQuestion);
    }
    decode_name(buf, HEADER_LEN).map(|(name, _)| name)
}

/// Marks a relayed reply as a non-authoritative, recursion-available answer:
/// sets RA, clears AA. Idempotent.
pub fn patch_as_non_authoritative_answer(buf: &mut [u8]) {
    buf[3] |= FLAG_RA;
    buf[2] &= !FLAG_AA;
}

/// Turns a query into a synthetic NXDOMAIN reply: forces the response code
/// to exactly 3 and sets the QR and RA bits.
pub fn patch_as_name_error(buf: &mut [u8]) {
    buf[3] = (buf[3] & !RCODE_MASK) | RCODE_NXDOMAIN;
    buf[3] |= FLAG_RA;
    buf[2] |= FLAG_QR;
}

/// Extracts the name server a referral delegates to: the RDATA name of the
/// first NS record in the authority section.
///
/// Walks the record sections explicitly (question, answers, then authority),
/// so the result does not depend on record sizes or ordering. Returns
/// `Ok(None)` when the authority section holds no NS record, as in a NODATA
/// reply carrying only an SOA.
pub fn referral_target(buf: &[u8]) -> Result<Option<String>, WireError> {
    if question_count(buf) == 0 {
        return Err(WireError::NoQuestion);
    }

    let mut pos = HEADER_LEN;
    for _ in 0..question_count(buf) {
        pos = skip_name(buf, pos)?;
        pos += 4; // QTYPE + QCLASS
    }
    for _ in 0..answer_count(buf) {
        pos = skip_record(buf, pos)?;
    }
    for _ in 0..authority_count(buf) {
        pos = skip_name(buf, pos)?;
        let meta = buf.get(pos..pos + 10).ok_or(WireError::UnexpectedEnd)?;
        let rtype = u16::from_be_bytes([meta[0], meta[1]]);
        if rtype == TYPE_NS {
            let (name, _) = decode_name(buf, pos + 10)?;
            return Ok(Some(name));
        }
        let rdlength = u16::from_be_bytes([meta[8], meta[9]]) as usize;
        pos += 10 + rdlength;
    }
    Ok(None)
}

/// Advances past one resource record: name, the 10 fixed metadata bytes
/// (TYPE, CLASS, TTL, RDLENGTH), then RDATA.
fn skip_record(buf: &[u8], offset: usize) -> Result<usize, WireError> {
    let pos = skip_name(buf, offset)?;
    let meta = buf.get(pos..pos + 10).ok_or(WireError::UnexpectedEnd)?;
    let rdlength = u16::from_be_bytes([meta[8], meta[9]]) as usize;
    let end = pos + 10 + rdlength;
    if end > buf.len() {
        return Err(WireError::UnexpectedEnd);
    }
    Ok(end)
}
