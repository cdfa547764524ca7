//! Binary container reader for GLB files
//!
//! A GLB file is a 12-byte file header followed by a JSON chunk and an
//! optional binary chunk. Every chunk starts with an 8-byte header holding
//! the payload length and a 4-byte type tag.
//!
//! ```text
//! offset 0          magic "glTF"
//! offset 4          version (u32 LE)
//! offset 8          total length (u32 LE)
//! offset 12         JSON chunk length (u32 LE)
//! offset 16         JSON chunk type "JSON"
//! offset 20         JSON payload
//! offset 20+len     BIN chunk length (u32 LE)
//! offset 20+len+4   BIN chunk type "BIN\0"
//! offset 20+len+8   BIN payload
//! ```
//!
//! The reader trusts these fixed offsets. Magic, version and type tags are
//! checked but a mismatch is only logged.

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};

use crate::error::{GlbError, Result};

/// File magic, "glTF"
pub const GLB_MAGIC: [u8; 4] = *b"glTF";

/// Container version this reader is written against
pub const GLB_VERSION: u32 = 2;

/// Size of the file header (magic, version, length)
pub const HEADER_SIZE: usize = 12;

/// Size of a chunk header (length, type tag)
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Absolute offset of the JSON chunk payload
pub const JSON_CHUNK_OFFSET: usize = HEADER_SIZE + CHUNK_HEADER_SIZE;

/// JSON chunk type tag
pub const CHUNK_TYPE_JSON: [u8; 4] = *b"JSON";

/// Binary chunk type tag
pub const CHUNK_TYPE_BIN: [u8; 4] = *b"BIN\0";

/// The 12-byte file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub magic: [u8; 4],
    pub version: u32,
    /// Declared length of the whole file in bytes
    pub length: u32,
}

/// A chunk header containing payload length and type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Size of the chunk payload in bytes (excluding header)
    pub length: u32,
    /// 4-byte type tag
    pub chunk_type: [u8; 4],
}

impl ChunkHeader {
    /// Read a chunk header at an absolute offset
    pub fn read(bytes: &[u8], offset: usize) -> Result<Self> {
        let header = slice_at(bytes, offset, CHUNK_HEADER_SIZE, "chunk header")?;
        let mut chunk_type = [0u8; 4];
        chunk_type.copy_from_slice(&header[4..8]);
        Ok(Self {
            length: LittleEndian::read_u32(&header[0..4]),
            chunk_type,
        })
    }

    /// Get the type tag as a string for debugging
    pub fn type_str(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type)
            .trim_end_matches('\0')
            .to_string()
    }

    /// Check if this chunk has the specified type tag
    pub fn has_type(&self, chunk_type: &[u8; 4]) -> bool {
        &self.chunk_type == chunk_type
    }
}

/// A parsed container borrowing its chunks from the input buffer
#[derive(Debug, Clone)]
pub struct Container<'a> {
    pub header: ContainerHeader,
    pub json_chunk: ChunkHeader,
    /// `None` when the buffer ends right after the JSON chunk
    pub bin_chunk: Option<ChunkHeader>,
    document_text: &'a str,
    blob: &'a [u8],
}

impl<'a> Container<'a> {
    /// Locate the JSON and binary chunks in a GLB buffer
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < JSON_CHUNK_OFFSET {
            return Err(GlbError::MalformedContainer(format!(
                "buffer is {} bytes, the fixed header region needs {}",
                bytes.len(),
                JSON_CHUNK_OFFSET
            )));
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        let header = ContainerHeader {
            magic,
            version: LittleEndian::read_u32(&bytes[4..8]),
            length: LittleEndian::read_u32(&bytes[8..12]),
        };
        if header.magic != GLB_MAGIC {
            warn!(
                "Unexpected container magic '{}', reading as GLB anyway",
                String::from_utf8_lossy(&header.magic)
            );
        }
        if header.version != GLB_VERSION {
            warn!("Unexpected container version {}", header.version);
        }

        let json_chunk = ChunkHeader::read(bytes, HEADER_SIZE)?;
        if !json_chunk.has_type(&CHUNK_TYPE_JSON) {
            warn!(
                "First chunk has type '{}', expected 'JSON'",
                json_chunk.type_str()
            );
        }
        debug!("GLB JSON chunk: {} bytes", json_chunk.length);

        let json_bytes = slice_at(
            bytes,
            JSON_CHUNK_OFFSET,
            json_chunk.length as usize,
            "JSON chunk",
        )?;
        let document_text = std::str::from_utf8(json_bytes)?;

        let bin_offset = JSON_CHUNK_OFFSET + json_bytes.len();
        let (bin_chunk, blob) = if bytes.len() == bin_offset {
            debug!("GLB has no binary chunk");
            (None, &bytes[bin_offset..])
        } else {
            let bin_chunk = ChunkHeader::read(bytes, bin_offset)?;
            if !bin_chunk.has_type(&CHUNK_TYPE_BIN) {
                warn!(
                    "Second chunk has type '{}', expected 'BIN'",
                    bin_chunk.type_str()
                );
            }
            debug!("GLB binary chunk: {} bytes", bin_chunk.length);
            let blob = slice_at(
                bytes,
                bin_offset + CHUNK_HEADER_SIZE,
                bin_chunk.length as usize,
                "binary chunk",
            )?;
            (Some(bin_chunk), blob)
        };

        Ok(Self {
            header,
            json_chunk,
            bin_chunk,
            document_text,
            blob,
        })
    }

    /// The JSON document text
    pub fn document_text(&self) -> &'a str {
        self.document_text
    }

    /// The binary chunk payload (empty when there is no binary chunk)
    pub fn blob(&self) -> &'a [u8] {
        self.blob
    }
}

/// Split a GLB buffer into its JSON document text and binary payload
pub fn parse_container(bytes: &[u8]) -> Result<(&str, &[u8])> {
    let container = Container::parse(bytes)?;
    Ok((container.document_text(), container.blob()))
}

/// Assemble a GLB buffer from a JSON document and a binary payload.
///
/// The JSON chunk is padded with spaces and the binary chunk with zeros to
/// 4-byte alignment; the declared chunk lengths include the padding.
pub fn write_container(document_text: &str, blob: &[u8]) -> Vec<u8> {
    let json_padding = (4 - document_text.len() % 4) % 4;
    let json_length = document_text.len() + json_padding;
    let bin_padding = (4 - blob.len() % 4) % 4;
    let bin_length = blob.len() + bin_padding;
    let total_length = JSON_CHUNK_OFFSET + json_length + CHUNK_HEADER_SIZE + bin_length;

    let mut out = Vec::with_capacity(total_length);
    out.extend_from_slice(&GLB_MAGIC);
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&(total_length as u32).to_le_bytes());

    out.extend_from_slice(&(json_length as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_TYPE_JSON);
    out.extend_from_slice(document_text.as_bytes());
    out.resize(out.len() + json_padding, b' ');

    out.extend_from_slice(&(bin_length as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_TYPE_BIN);
    out.extend_from_slice(blob);
    out.resize(out.len() + bin_padding, 0);

    out
}

fn slice_at<'a>(bytes: &'a [u8], offset: usize, len: usize, what: &str) -> Result<&'a [u8]> {
    offset
        .checked_add(len)
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| {
            GlbError::MalformedContainer(format!(
                "{what} needs {len} bytes at offset {offset}, buffer is {} bytes",
                bytes.len()
            ))
        })
}
