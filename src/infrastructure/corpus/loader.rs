use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::CorpusError;
use crate::domain::models::Chunk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// A chunk file is either a bare list or a `chunks:` mapping
#[derive(Deserialize)]
#[serde(untagged)]
enum ChunkFile {
    List(Vec<Chunk>),
    Wrapped { chunks: Vec<Chunk> },
}

impl ChunkFile {
    fn into_chunks(self) -> Vec<Chunk> {
        match self {
            Self::List(chunks) | Self::Wrapped { chunks } => chunks,
        }
    }
}

/// Load a chunk file, or every chunk file below a directory
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Chunk>, CorpusError> {
    let path = path.as_ref();
    if path.is_dir() {
        load_dir(path)
    } else {
        load_file(path)
    }
}

/// Load and validate one JSON or YAML chunk file
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<Chunk>, CorpusError> {
    let path = path.as_ref();
    let chunks = read_file(path)?;
    check_unique(chunks.iter().map(|c| (c.id.as_str(), path)))?;
    info!(path = %path.display(), chunks = chunks.len(), "loaded corpus file");
    Ok(chunks)
}

/// Load every `.json`, `.yaml` and `.yml` file below `dir`, in path order
///
/// Ids must be unique across all files.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<Chunk>, CorpusError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(CorpusError::NotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && Format::of(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }

    let mut loaded: Vec<(Chunk, PathBuf)> = Vec::new();
    for file in &files {
        for chunk in read_file(file)? {
            loaded.push((chunk, file.clone()));
        }
    }
    check_unique(loaded.iter().map(|(c, p)| (c.id.as_str(), p.as_path())))?;

    info!(dir = %dir.display(), files = files.len(), chunks = loaded.len(), "loaded corpus directory");
    Ok(loaded.into_iter().map(|(chunk, _)| chunk).collect())
}

/// Write chunks to a JSON or YAML file, chosen by extension
pub fn write_file(path: impl AsRef<Path>, chunks: &[Chunk]) -> Result<(), CorpusError> {
    let path = path.as_ref();
    let format = Format::of(path).ok_or_else(|| CorpusError::UnsupportedFormat(path.to_path_buf()))?;

    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(chunks).map_err(|e| e.to_string()),
        Format::Yaml => serde_yaml::to_string(chunks).map_err(|e| e.to_string()),
    }
    .map_err(|message| CorpusError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CorpusError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, rendered).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), chunks = chunks.len(), "wrote corpus file");
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<Chunk>, CorpusError> {
    if !path.exists() {
        return Err(CorpusError::NotFound(path.to_path_buf()));
    }
    let format = Format::of(path).ok_or_else(|| CorpusError::UnsupportedFormat(path.to_path_buf()))?;

    let content = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = match format {
        Format::Json => serde_json::from_str::<ChunkFile>(&content).map_err(|e| e.to_string()),
        Format::Yaml => serde_yaml::from_str::<ChunkFile>(&content).map_err(|e| e.to_string()),
    }
    .map_err(|message| CorpusError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    let chunks = parsed.into_chunks();
    for chunk in &chunks {
        chunk.validate().map_err(|e| CorpusError::InvalidChunk {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    }
    Ok(chunks)
}

fn check_unique<'a>(ids: impl Iterator<Item = (&'a str, &'a Path)>) -> Result<(), CorpusError> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for (id, path) in ids {
        if let Some(first) = seen.insert(id, path) {
            return Err(CorpusError::DuplicateId {
                id: id.to_string(),
                first: first.to_path_buf(),
                second: path.to_path_buf(),
            });
        }
    }
    Ok(())
}
