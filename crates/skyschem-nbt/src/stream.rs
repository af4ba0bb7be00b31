use crate::tag::{Compound, Tag, TagKind, TagList};
use crate::TagError;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Read, Write};

/// Deepest list/compound nesting accepted in either direction.
pub const MAX_DEPTH: usize = 512;

/// Largest inflated size accepted from a gzip-wrapped stream.
pub const MAX_INFLATED: u64 = 64 * 1024 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Writes `tag` as a root value: kind byte followed by the bare payload.
pub fn write_tag<W: Write>(writer: &mut W, tag: &Tag) -> Result<(), TagError> {
    writer.write_u8(tag.kind().id())?;
    write_payload(writer, tag, 0)
}

/// Reads one root value written by [`write_tag`].
pub fn read_tag<R: Read>(reader: &mut R) -> Result<Tag, TagError> {
    let mut reader = TagReader { inner: reader };
    let kind = reader.read_kind()?;
    if kind == TagKind::End {
        return Err(TagError::Malformed("root tag cannot be End".to_owned()));
    }
    reader.read_payload(kind, 0)
}

pub fn encode(tag: &Tag) -> Result<Vec<u8>, TagError> {
    let mut buffer = Vec::new();
    write_tag(&mut buffer, tag)?;
    Ok(buffer)
}

pub fn decode(bytes: &[u8]) -> Result<Tag, TagError> {
    read_tag(&mut io::Cursor::new(bytes))
}

pub fn encode_gzip(tag: &Tag) -> Result<Vec<u8>, TagError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    write_tag(&mut encoder, tag)?;
    Ok(encoder.finish()?)
}

/// Decodes plain or gzip-wrapped bytes, picking by the gzip magic header.
pub fn decode_any(bytes: &[u8]) -> Result<Tag, TagError> {
    if bytes.starts_with(&GZIP_MAGIC) {
        decode(&inflate(bytes, MAX_INFLATED)?)
    } else {
        decode(bytes)
    }
}

fn inflate(bytes: &[u8], limit: u64) -> Result<Vec<u8>, TagError> {
    let mut inflated = Vec::new();
    GzDecoder::new(bytes)
        .take(limit + 1)
        .read_to_end(&mut inflated)
        .map_err(|e| TagError::Malformed(format!("corrupt gzip stream: {}", e)))?;
    if inflated.len() as u64 > limit {
        return Err(TagError::Malformed(format!(
            "gzip stream inflates past {} bytes",
            limit
        )));
    }
    Ok(inflated)
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<(), TagError> {
    let length = u16::try_from(value.len()).map_err(|_| {
        TagError::Encoding(format!(
            "string of {} bytes exceeds {} bytes",
            value.len(),
            u16::MAX
        ))
    })?;
    writer.write_u16::<BigEndian>(length)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

fn write_payload<W: Write>(writer: &mut W, tag: &Tag, depth: usize) -> Result<(), TagError> {
    match tag {
        Tag::Byte(v) => writer.write_i8(*v)?,
        Tag::Int(v) => writer.write_i32::<BigEndian>(*v)?,
        Tag::String(v) => write_string(writer, v)?,
        Tag::List(list) => {
            check_write_depth(depth)?;
            let count = i32::try_from(list.len())
                .map_err(|_| TagError::Encoding(format!("list of {} items", list.len())))?;
            writer.write_u8(list.kind().id())?;
            writer.write_i32::<BigEndian>(count)?;
            for item in list {
                write_payload(writer, item, depth + 1)?;
            }
        }
        Tag::Compound(compound) => {
            check_write_depth(depth)?;
            for (name, child) in compound.iter() {
                writer.write_u8(child.kind().id())?;
                write_string(writer, name)?;
                write_payload(writer, child, depth + 1)?;
            }
            writer.write_u8(TagKind::End.id())?;
        }
    }
    Ok(())
}

fn check_write_depth(depth: usize) -> Result<(), TagError> {
    if depth >= MAX_DEPTH {
        return Err(TagError::Encoding(format!(
            "nesting deeper than {} levels",
            MAX_DEPTH
        )));
    }
    Ok(())
}

/// Converts end-of-stream into `Malformed` so truncated input never surfaces as
/// a bare IO error.
fn read_error(err: io::Error) -> TagError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => {
            TagError::Malformed("unexpected end of stream".to_owned())
        }
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => {
            TagError::Malformed(err.to_string())
        }
        _ => TagError::Io(err),
    }
}

struct TagReader<'a, R: Read> {
    inner: &'a mut R,
}

impl<R: Read> TagReader<'_, R> {
    fn read_kind(&mut self) -> Result<TagKind, TagError> {
        let id = self.inner.read_u8().map_err(read_error)?;
        TagKind::from_id(id)
            .ok_or_else(|| TagError::Malformed(format!("unknown tag kind {}", id)))
    }

    fn read_string(&mut self) -> Result<String, TagError> {
        let length = self.inner.read_u16::<BigEndian>().map_err(read_error)?;
        let mut bytes = vec![0u8; length as usize];
        self.inner.read_exact(&mut bytes).map_err(read_error)?;
        String::from_utf8(bytes)
            .map_err(|e| TagError::Malformed(format!("invalid UTF-8 in string: {}", e)))
    }

    fn read_payload(&mut self, kind: TagKind, depth: usize) -> Result<Tag, TagError> {
        match kind {
            TagKind::End => Err(TagError::Malformed("unexpected End tag".to_owned())),
            TagKind::Byte => Ok(Tag::Byte(self.inner.read_i8().map_err(read_error)?)),
            TagKind::Int => Ok(Tag::Int(
                self.inner.read_i32::<BigEndian>().map_err(read_error)?,
            )),
            TagKind::String => Ok(Tag::String(self.read_string()?)),
            TagKind::List => {
                check_read_depth(depth)?;
                let element_kind = self.read_kind()?;
                let count = self.inner.read_i32::<BigEndian>().map_err(read_error)?;
                if count < 0 {
                    return Err(TagError::Malformed(format!("negative list length {}", count)));
                }
                if element_kind == TagKind::End && count > 0 {
                    return Err(TagError::Malformed(
                        "non-empty list of End tags".to_owned(),
                    ));
                }
                // The count is untrusted; let the vector grow as elements actually arrive.
                let mut items = Vec::with_capacity((count as usize).min(1024));
                for _ in 0..count {
                    items.push(self.read_payload(element_kind, depth + 1)?);
                }
                TagList::from_items(element_kind, items)
                    .map_err(|e| TagError::Malformed(e.to_string()))
                    .map(Tag::List)
            }
            TagKind::Compound => {
                check_read_depth(depth)?;
                let mut compound = Compound::new();
                loop {
                    let child_kind = self.read_kind()?;
                    if child_kind == TagKind::End {
                        break;
                    }
                    let name = self.read_string()?;
                    let child = self.read_payload(child_kind, depth + 1)?;
                    compound.insert(name, child);
                }
                Ok(Tag::Compound(compound))
            }
        }
    }
}

fn check_read_depth(depth: usize) -> Result<(), TagError> {
    if depth >= MAX_DEPTH {
        return Err(TagError::Malformed(format!(
            "nesting deeper than {} levels",
            MAX_DEPTH
        )));
    }
    Ok(())
}
