//! Compressed columnar binary encoding for [`CachedMatrix`].
//!
//! Format (all fixed-width integers little-endian):
//!
//! ```text
//! [magic:4 "TTMC"][version:1][columns:u32]
//! per column, in name order:
//!   [name_len:u16][name:utf8][type:u8][rows:u64][payload_len:u64][payload]
//! ```
//!
//! Payloads:
//! - `int`   : delta from the previous value, zigzag, LEB128 varint
//! - `float` : bit pattern XOR previous bit pattern, bit-reversed, varint
//! - `str`   : varint byte length + UTF-8 bytes per row
//!
//! Sorted grid ids and integer-valued travel times shrink to one or two
//! bytes per row.

use bytes::{Buf, BufMut, BytesMut};

use crate::heatmap_error::HeatmapError;
use crate::io::column::{CachedMatrix, Column, ColumnType};

pub const MAGIC: [u8; 4] = *b"TTMC";
/// Bump when the layout or semantics change in incompatible ways.
pub const FORMAT_VERSION: u8 = 1;

fn format_err(msg: impl Into<String>) -> HeatmapError {
    HeatmapError::CacheFormat(msg.into())
}

#[inline]
fn zigzag(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

#[inline]
fn unzigzag(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

fn put_varint(buf: &mut BytesMut, mut v: u64) {
    while v >= 0x80 {
        buf.put_u8((v as u8) | 0x80);
        v >>= 7;
    }
    buf.put_u8(v as u8);
}

fn get_varint(buf: &mut &[u8]) -> Result<u64, HeatmapError> {
    let mut out = 0u64;
    let mut shift = 0u32;
    loop {
        if !buf.has_remaining() {
            return Err(format_err("truncated varint"));
        }
        let byte = buf.get_u8();
        if shift == 63 && byte > 1 {
            return Err(format_err("varint overflows u64"));
        }
        out |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(out);
        }
        shift += 7;
        if shift > 63 {
            return Err(format_err("varint overflows u64"));
        }
    }
}

fn need(buf: &[u8], n: usize, what: &str) -> Result<(), HeatmapError> {
    if buf.remaining() < n {
        return Err(format_err(format!(
            "truncated {what}: need {n} bytes, {} left",
            buf.remaining()
        )));
    }
    Ok(())
}

fn encode_payload(column: &Column, out: &mut BytesMut) {
    match column {
        Column::Int(values) => {
            let mut prev = 0i64;
            for &v in values {
                put_varint(out, zigzag(v.wrapping_sub(prev)));
                prev = v;
            }
        }
        Column::Float(values) => {
            let mut prev = 0u64;
            for &v in values {
                let bits = v.to_bits();
                put_varint(out, (bits ^ prev).reverse_bits());
                prev = bits;
            }
        }
        Column::Str(values) => {
            for s in values {
                put_varint(out, s.len() as u64);
                out.put_slice(s.as_bytes());
            }
        }
    }
}

fn decode_payload(ty: ColumnType, rows: usize, mut payload: &[u8]) -> Result<Column, HeatmapError> {
    // every row takes at least one byte
    if rows > payload.len() {
        return Err(format_err(format!(
            "{rows} rows cannot fit in {} payload bytes",
            payload.len()
        )));
    }
    let column = match ty {
        ColumnType::Int => {
            let mut values = Vec::with_capacity(rows);
            let mut prev = 0i64;
            for _ in 0..rows {
                prev = prev.wrapping_add(unzigzag(get_varint(&mut payload)?));
                values.push(prev);
            }
            Column::Int(values)
        }
        ColumnType::Float => {
            let mut values = Vec::with_capacity(rows);
            let mut prev = 0u64;
            for _ in 0..rows {
                prev ^= get_varint(&mut payload)?.reverse_bits();
                values.push(f64::from_bits(prev));
            }
            Column::Float(values)
        }
        ColumnType::Str => {
            let mut values = Vec::with_capacity(rows);
            for _ in 0..rows {
                let len = usize::try_from(get_varint(&mut payload)?)
                    .map_err(|_| format_err("string length overflows usize"))?;
                need(payload, len, "string")?;
                let text = std::str::from_utf8(&payload[..len])
                    .map_err(|e| format_err(format!("invalid utf-8 in string column: {e}")))?;
                values.push(text.to_owned());
                payload.advance(len);
            }
            Column::Str(values)
        }
    };
    if payload.has_remaining() {
        return Err(format_err(format!(
            "{} trailing bytes in column payload",
            payload.remaining()
        )));
    }
    Ok(column)
}

/// Encode `matrix` into the cache file format.
pub fn encode(matrix: &CachedMatrix) -> Result<Vec<u8>, HeatmapError> {
    let mut out = BytesMut::with_capacity(16 + matrix.rows().unwrap_or(0) * matrix.len() * 2);
    out.put_slice(&MAGIC);
    out.put_u8(FORMAT_VERSION);
    out.put_u32_le(matrix.len() as u32);

    let mut payload = BytesMut::new();
    for (name, column) in matrix.iter() {
        let name_len = u16::try_from(name.len())
            .map_err(|_| format_err(format!("column name too long: {} bytes", name.len())))?;
        payload.clear();
        encode_payload(column, &mut payload);

        out.put_u16_le(name_len);
        out.put_slice(name.as_bytes());
        out.put_u8(column.column_type().tag());
        out.put_u64_le(column.len() as u64);
        out.put_u64_le(payload.len() as u64);
        out.put_slice(&payload);
    }
    Ok(out.to_vec())
}

/// Decode a cache file produced by [`encode`].
pub fn decode(mut buf: &[u8]) -> Result<CachedMatrix, HeatmapError> {
    need(buf, MAGIC.len() + 1 + 4, "header")?;
    if buf[..MAGIC.len()] != MAGIC {
        return Err(format_err("bad magic"));
    }
    buf.advance(MAGIC.len());
    let version = buf.get_u8();
    if version != FORMAT_VERSION {
        return Err(format_err(format!(
            "unsupported format version {version}, expected {FORMAT_VERSION}"
        )));
    }
    let n_columns = buf.get_u32_le();

    let mut matrix = CachedMatrix::new();
    for _ in 0..n_columns {
        need(buf, 2, "column name length")?;
        let name_len = buf.get_u16_le() as usize;
        need(buf, name_len, "column name")?;
        let name = std::str::from_utf8(&buf[..name_len])
            .map_err(|e| format_err(format!("invalid utf-8 in column name: {e}")))?
            .to_owned();
        buf.advance(name_len);

        need(buf, 1 + 8 + 8, "column header")?;
        let tag = buf.get_u8();
        let ty = ColumnType::from_tag(tag)
            .ok_or_else(|| format_err(format!("unknown column type tag {tag} for `{name}`")))?;
        let rows = usize::try_from(buf.get_u64_le())
            .map_err(|_| format_err("row count overflows usize"))?;
        let payload_len = usize::try_from(buf.get_u64_le())
            .map_err(|_| format_err("payload length overflows usize"))?;
        need(buf, payload_len, "column payload")?;

        let column = decode_payload(ty, rows, &buf[..payload_len])?;
        buf.advance(payload_len);
        matrix.try_insert(name, column)?;
    }
    if buf.has_remaining() {
        return Err(format_err(format!("{} trailing bytes", buf.remaining())));
    }
    Ok(matrix)
}
