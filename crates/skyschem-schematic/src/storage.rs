//! Reading and writing single schematic files.

use crate::fallback::FallbackLoader;
use crate::schematic::{Decoded, Schematic, TagSchematic};
use skyschem_common::{Result, SchematicError};
use skyschem_logger::{log, LogSeverity::Debug};
use skyschem_nbt::{decode_any, encode, encode_gzip, Compound, Tag};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const NATIVE_EXTENSION: &str = "schematic";
pub const FALLBACK_EXTENSION: &str = "schem";

/// Catalog name for a file: its file name without a known schematic extension.
/// Other files yield `None`.
pub fn schematic_name(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?;
    if extension != NATIVE_EXTENSION && extension != FALLBACK_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    (!stem.is_empty()).then(|| stem.to_owned())
}

pub fn schematic_path(directory: &Path, name: &str) -> PathBuf {
    directory.join(format!("{}.{}", name, NATIVE_EXTENSION))
}

/// Decodes a whole file's bytes (plain or gzip) into a root compound.
pub fn decode_root(bytes: &[u8]) -> Result<Decoded> {
    match decode_any(bytes)? {
        Tag::Compound(root) => TagSchematic::from_tag(root),
        other => Err(SchematicError::InvalidSchematic(format!(
            "root is {} rather than Compound",
            other.kind()
        ))),
    }
}

/// Loads one file: native decode first, the fallback loader only for an empty root.
pub fn load_file(
    path: &Path,
    fallback: Option<&dyn FallbackLoader>,
    engine_version: &str,
) -> Result<Arc<dyn Schematic>> {
    let bytes = fs::read(path)?;
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    match decode_root(&bytes)? {
        Decoded::Schematic(schematic) => {
            schematic.check_version(engine_version, &source);
            Ok(Arc::new(schematic))
        }
        Decoded::SentinelEmpty => {
            let loader =
                fallback.ok_or_else(|| SchematicError::FallbackUnavailable(path.to_path_buf()))?;
            log(
                format!("{} is not a native schematic, trying {}", source, loader.name()),
                Debug,
            );
            loader
                .try_load(path)
                .ok_or_else(|| SchematicError::FallbackUnavailable(path.to_path_buf()))
        }
    }
}

/// Encodes `root` and replaces `<directory>/<name>.schematic`. The bytes go to
/// a temporary file that is renamed over the target, so a failed save leaves
/// the previous file in place.
pub fn write_file(directory: &Path, name: &str, root: &Compound, compress: bool) -> Result<PathBuf> {
    let tag = Tag::Compound(root.clone());
    let bytes = if compress {
        encode_gzip(&tag)?
    } else {
        encode(&tag)?
    };

    fs::create_dir_all(directory)?;
    let target = schematic_path(directory, name);
    let temp = directory.join(format!(".{}.{}.tmp", name, NATIVE_EXTENSION));

    let written = File::create(&temp).and_then(|mut file| {
        file.write_all(&bytes)?;
        file.sync_all()
    });
    if let Err(err) = written.and_then(|_| fs::rename(&temp, &target)) {
        let _ = fs::remove_file(&temp);
        return Err(err.into());
    }
    Ok(target)
}
