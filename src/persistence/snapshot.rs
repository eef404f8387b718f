//! Snapshot Persistence
//!
//! Versioned binary image of a vector store.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::vector::{MetadataValue, Record, VectorEntry};

/// Snapshot file format (all integers little-endian):
/// - Magic: 4 bytes "CDKB"
/// - Version: 2 bytes
/// - Header length: 4 bytes, then header
///   [created_at_ms (8) + dimension (4) + entry_count (4)]
/// - Entries: [entry_len (4) + embedding (dimension x f32) + id + text
///   + extra_count (4) + (key + tag (1) + value)*]*
///
/// Strings are a 4-byte length followed by UTF-8. Readers skip unknown
/// trailing bytes in the header and in each entry.
const SNAPSHOT_MAGIC: &[u8; 4] = b"CDKB";
pub const SNAPSHOT_VERSION: u16 = 1;

const HEADER_V1_LEN: usize = 8 + 4 + 4;

const TAG_TEXT: u8 = 1;
const TAG_NUMBER: u8 = 2;

/// Decoded snapshot contents
#[derive(Debug, Clone)]
pub struct SnapshotData {
    pub version: u16,
    pub created_at: Option<DateTime<Utc>>,
    /// None for a snapshot of an empty store
    pub dimension: Option<usize>,
    pub entries: Vec<VectorEntry>,
}

/// Encode a store image
pub fn encode(dimension: Option<usize>, entries: &[VectorEntry]) -> Bytes {
    let mut buf = BytesMut::with_capacity(64 + entries.len() * 256);

    buf.put_slice(SNAPSHOT_MAGIC);
    buf.put_u16_le(SNAPSHOT_VERSION);

    buf.put_u32_le(HEADER_V1_LEN as u32);
    buf.put_u64_le(Utc::now().timestamp_millis().max(0) as u64);
    buf.put_u32_le(dimension.unwrap_or(0) as u32);
    buf.put_u32_le(entries.len() as u32);

    let mut body = BytesMut::new();
    for entry in entries {
        body.clear();
        for x in &entry.embedding {
            body.put_u32_le(x.to_bits());
        }
        put_str(&mut body, &entry.record.id);
        put_str(&mut body, &entry.record.text);
        body.put_u32_le(entry.record.extra.len() as u32);
        for (key, value) in &entry.record.extra {
            put_str(&mut body, key);
            match value {
                MetadataValue::Text(s) => {
                    body.put_u8(TAG_TEXT);
                    put_str(&mut body, s);
                }
                MetadataValue::Number(n) => {
                    body.put_u8(TAG_NUMBER);
                    body.put_u64_le(n.to_bits());
                }
            }
        }

        buf.put_u32_le(body.len() as u32);
        buf.put_slice(&body);
    }

    buf.freeze()
}

fn put_str(buf: &mut BytesMut, s: &str) {
    buf.put_u32_le(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

/// Decode a store image. `path` is only used for error context.
pub fn decode(data: &[u8], path: &Path) -> Result<SnapshotData> {
    let mut reader = Reader { buf: data, path };

    let magic = reader.take(4, "magic")?;
    if magic != SNAPSHOT_MAGIC {
        return Err(Error::corrupt(path, "invalid snapshot magic"));
    }

    let version = reader.u16("version")?;
    if version == 0 || version > SNAPSHOT_VERSION {
        return Err(Error::corrupt(
            path,
            format!("unsupported snapshot version: {}", version),
        ));
    }

    let header_len = reader.u32("header length")? as usize;
    if header_len < HEADER_V1_LEN {
        return Err(Error::corrupt(
            path,
            format!("header too short: {} bytes", header_len),
        ));
    }
    let mut header = reader.sub(header_len, "header")?;
    let created_ms = header.u64("timestamp")?;
    let dimension = header.u32("dimension")? as usize;
    let count = header.u32("entry count")? as usize;

    if count > 0 && dimension == 0 {
        return Err(Error::corrupt(path, "entries present but dimension is zero"));
    }

    let mut entries = Vec::with_capacity(count.min(reader.buf.len() / 4 + 1));
    for index in 0..count {
        let entry_len = reader.u32("entry length")? as usize;
        let mut entry = reader.sub(entry_len, "entry")?;
        entries.push(decode_entry(&mut entry, dimension, index)?);
    }

    if !reader.buf.is_empty() {
        return Err(Error::corrupt(
            path,
            format!("{} trailing bytes after {} entries", reader.buf.len(), count),
        ));
    }

    Ok(SnapshotData {
        version,
        created_at: DateTime::from_timestamp_millis(created_ms as i64),
        dimension: (dimension > 0).then_some(dimension),
        entries,
    })
}

fn decode_entry(reader: &mut Reader<'_>, dimension: usize, index: usize) -> Result<VectorEntry> {
    let mut embedding = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let x = f32::from_bits(reader.u32("embedding")?);
        if !x.is_finite() {
            return Err(Error::corrupt(
                reader.path,
                format!("entry {} has a non-finite embedding component", index),
            ));
        }
        embedding.push(x);
    }

    let mut record = Record::new(reader.string("record id")?, reader.string("record text")?);

    let extra_count = reader.u32("metadata count")?;
    for _ in 0..extra_count {
        let key = reader.string("metadata key")?;
        let value = match reader.u8("metadata tag")? {
            TAG_TEXT => MetadataValue::Text(reader.string("metadata value")?),
            TAG_NUMBER => MetadataValue::Number(f64::from_bits(reader.u64("metadata value")?)),
            tag => {
                return Err(Error::corrupt(
                    reader.path,
                    format!("entry {} has unknown metadata tag {}", index, tag),
                ))
            }
        };
        record.extra.insert(key, value);
    }

    // Remaining bytes belong to fields added by newer writers.
    Ok(VectorEntry { embedding, record })
}

/// Bounds-checked reader over a snapshot buffer
struct Reader<'a> {
    buf: &'a [u8],
    path: &'a Path,
}

impl<'a> Reader<'a> {
    fn need(&self, n: usize, what: &str) -> Result<()> {
        if self.buf.remaining() < n {
            return Err(Error::corrupt(
                self.path,
                format!(
                    "truncated while reading {}: need {} bytes, have {}",
                    what,
                    n,
                    self.buf.remaining()
                ),
            ));
        }
        Ok(())
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        self.need(n, what)?;
        let buf: &'a [u8] = self.buf;
        let (head, tail) = buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn sub(&mut self, n: usize, what: &str) -> Result<Reader<'a>> {
        Ok(Reader {
            buf: self.take(n, what)?,
            path: self.path,
        })
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        self.need(1, what)?;
        Ok(self.buf.get_u8())
    }

    fn u16(&mut self, what: &str) -> Result<u16> {
        self.need(2, what)?;
        Ok(self.buf.get_u16_le())
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        self.need(4, what)?;
        Ok(self.buf.get_u32_le())
    }

    fn u64(&mut self, what: &str) -> Result<u64> {
        self.need(8, what)?;
        Ok(self.buf.get_u64_le())
    }

    fn string(&mut self, what: &str) -> Result<String> {
        let len = self.u32(what)? as usize;
        let raw = self.take(len, what)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| Error::corrupt(self.path, format!("{} is not valid UTF-8", what)))
    }
}

/// Write a snapshot file.
///
/// Data goes to a sibling `.tmp` file first and is renamed over `path`, so
/// an interrupted save leaves the previous snapshot intact.
pub fn save(path: &Path, dimension: Option<usize>, entries: &[VectorEntry]) -> Result<()> {
    let data = encode(dimension, entries);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io("save", parent, e))?;
    }

    let tmp = temp_path(path);
    if let Err(e) = write_file(&tmp, &data) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        Error::io("save", path, e)
    })?;

    debug!(path = %path.display(), bytes = data.len(), "snapshot written");
    Ok(())
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io("save", path, e))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(data).map_err(|e| Error::io("save", path, e))?;
    let file = writer
        .into_inner()
        .map_err(|e| Error::io("save", path, e.into_error()))?;
    file.sync_all().map_err(|e| Error::io("save", path, e))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read and decode a snapshot file
pub fn load(path: &Path) -> Result<SnapshotData> {
    let data = fs::read(path).map_err(|e| Error::io("load", path, e))?;
    let snapshot = decode(&data, path)?;
    debug!(
        path = %path.display(),
        version = snapshot.version,
        entries = snapshot.entries.len(),
        "snapshot read"
    );
    Ok(snapshot)
}
