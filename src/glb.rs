use std::borrow::Cow;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use log::debug;

use crate::align_to_4;
use crate::document::GltfAsset;
use crate::error::{GenerateError, Result};

const GLB_MAGIC: [u8; 4] = *b"glTF";
const GLB_VERSION: u32 = 2;
const HEADER_LENGTH: usize = 12;
const CHUNK_HEADER_LENGTH: usize = 8;

fn buffer_to_ascii(buffer: &[u8]) -> String {
    buffer.iter().map(|&x| x as char).collect()
}

fn read_u32(reader: &mut impl Read) -> io::Result<u32> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(u32::from_le_bytes(buffer))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkInfo {
    pub chunk_type: String,
    pub chunk_length: u32,
}

/// The 12 byte GLB header followed by the chunk table.
#[derive(Debug, Clone, PartialEq)]
pub struct GlbHeader {
    pub magic: String,
    pub version: u32,
    pub length: u32, // entire file in bytes
    pub chunks: Vec<ChunkInfo>,
}

impl GlbHeader {
    pub fn read(reader: &mut impl Read) -> io::Result<GlbHeader> {
        let mut magic_buffer = [0u8; 4];
        reader.read_exact(&mut magic_buffer)?;
        if magic_buffer != GLB_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("not a GLB file (magic {:?})", buffer_to_ascii(&magic_buffer)),
            ));
        }
        let version = read_u32(reader)?;
        let length = read_u32(reader)?;

        let mut chunks = vec![];
        let mut consumed = HEADER_LENGTH as u64;
        while consumed < length as u64 {
            let chunk_length = read_u32(reader)?;
            let mut type_buffer = [0u8; 4];
            reader.read_exact(&mut type_buffer)?;
            let skipped = io::copy(&mut reader.by_ref().take(chunk_length as u64), &mut io::sink())?;
            if skipped != chunk_length as u64 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "chunk is shorter than its declared length",
                ));
            }
            chunks.push(ChunkInfo {
                chunk_type: buffer_to_ascii(&type_buffer).trim_end_matches('\0').to_string(),
                chunk_length,
            });
            consumed += CHUNK_HEADER_LENGTH as u64 + chunk_length as u64;
        }

        Ok(Self {
            magic: buffer_to_ascii(&magic_buffer),
            version,
            length,
            chunks,
        })
    }
}

/// Encodes the document as a JSON chunk followed by a BIN chunk.
pub fn encode_glb(asset: &GltfAsset) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(&asset.root)?;
    let total_length = HEADER_LENGTH
        + CHUNK_HEADER_LENGTH
        + align_to_4(json.len())
        + CHUNK_HEADER_LENGTH
        + align_to_4(asset.bin.len());
    let length = u32::try_from(total_length).map_err(|_| {
        GenerateError::Validation(vec![format!(
            "file size {} exceeds binary glTF limit",
            total_length
        )])
    })?;

    let glb = gltf::binary::Glb {
        header: gltf::binary::Header {
            magic: GLB_MAGIC,
            version: GLB_VERSION,
            length,
        },
        json: Cow::Owned(json),
        bin: Some(Cow::Borrowed(asset.bin.as_slice())),
    };
    let mut bytes = Vec::with_capacity(total_length);
    glb.to_writer(&mut bytes)?;
    Ok(bytes)
}

/// Writes `bytes` to a temporary file next to `path`, then renames it over
/// `path`. Missing parent directories are created first.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|source| GenerateError::CreateDir {
        path: parent.to_path_buf(),
        source,
    })?;

    let write_error = |source: io::Error| GenerateError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(write_error)?;
    temp_file.write_all(bytes).map_err(write_error)?;
    temp_file.as_file().sync_all().map_err(write_error)?;
    debug!("staged {} bytes at {}", bytes.len(), temp_file.path().display());

    temp_file
        .persist(path)
        .map_err(|e| write_error(e.error))?;
    Ok(())
}
