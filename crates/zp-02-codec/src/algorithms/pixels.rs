//! `gzip+base64:v1` pixel payloads.
//!
//! Despite the name the stream is zlib (deflate with zlib header and adler32
//! trailer), which is what existing publishers emit.

use std::io::Write;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::{write::ZlibEncoder, Compression, Decompress, FlushDecompress, Status};
use shared_types::Pixel;

use crate::domain::CodecError;

/// Upper bound on an inflated payload. A full-world batch is far smaller.
pub const MAX_DECODED_BYTES: usize = 8 * 1024 * 1024;

/// Encodes pixels as `x,y,color` lines, zlib-compressed, base64 text.
pub fn encode_pixels(pixels: &[Pixel]) -> Result<String, CodecError> {
    let payload = pixels
        .iter()
        .map(|p| format!("{},{},{}", p.x, p.y, p.color))
        .collect::<Vec<_>>()
        .join("\n");

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(payload.as_bytes())
        .map_err(|e| CodecError::Compression(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| CodecError::Compression(e.to_string()))?;

    Ok(STANDARD.encode(compressed))
}

/// Inverse of [`encode_pixels`]. Fails on any corruption.
pub fn decode_pixels(content: &str) -> Result<Vec<Pixel>, CodecError> {
    let compressed = STANDARD
        .decode(content.trim())
        .map_err(|e| CodecError::Base64(e.to_string()))?;
    let raw = inflate(&compressed)?;
    let text = String::from_utf8(raw).map_err(|_| CodecError::NotUtf8)?;

    let body = text.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    body.split('\n')
        .enumerate()
        .map(|(i, record)| parse_record(i + 1, record))
        .collect()
}

fn parse_record(line: usize, record: &str) -> Result<Pixel, CodecError> {
    let malformed = || CodecError::MalformedRecord {
        line,
        record: record.to_string(),
    };
    let trimmed = record.strip_suffix('\r').unwrap_or(record);
    let mut fields = trimmed.split(',');
    match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(x), Some(y), Some(color), None) => {
            let x = x.trim().parse::<i64>().map_err(|_| malformed())?;
            let y = y.trim().parse::<i64>().map_err(|_| malformed())?;
            Ok(Pixel::new(x, y, color.trim()))
        }
        _ => Err(malformed()),
    }
}

fn inflate(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut inflater = Decompress::new(true);
    let mut output = Vec::with_capacity(input.len().saturating_mul(4).clamp(256, MAX_DECODED_BYTES));

    loop {
        let consumed = inflater.total_in() as usize;
        let produced = inflater.total_out();
        let status = inflater
            .decompress_vec(&input[consumed..], &mut output, FlushDecompress::Finish)
            .map_err(|e| CodecError::Decompression(e.to_string()))?;

        if let Status::StreamEnd = status {
            break;
        }

        if output.len() == output.capacity() {
            if output.len() >= MAX_DECODED_BYTES {
                return Err(CodecError::PayloadTooLarge {
                    limit: MAX_DECODED_BYTES,
                });
            }
            let grow = output.len().max(256).min(MAX_DECODED_BYTES - output.len());
            output.reserve(grow);
            continue;
        }

        let progressed =
            inflater.total_in() as usize != consumed || inflater.total_out() != produced;
        if !progressed || inflater.total_in() as usize == input.len() {
            return Err(CodecError::Truncated);
        }
    }

    let consumed = inflater.total_in() as usize;
    if consumed != input.len() {
        return Err(CodecError::TrailingBytes(input.len() - consumed));
    }
    Ok(output)
}
