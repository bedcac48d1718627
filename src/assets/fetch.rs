use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{ReelError, ReelResult};

/// Turns a media reference from the project into bytes.
///
/// Implementations must be callable from the image loader's worker threads.
pub trait MediaFetcher: Send + Sync {
    /// Fetch the bytes behind `url`.
    fn fetch(&self, url: &str) -> ReelResult<Vec<u8>>;
}

/// How a media reference is interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaRef {
    /// `data:` URL with its decoded payload.
    Inline(Vec<u8>),
    /// Local file (absolute `file://` URL or a path under the project root).
    File(PathBuf),
    /// `http(s)://` reference; retrieval belongs to the host.
    Remote(String),
}

/// Fetcher for local projects: project-relative paths, `file://` URLs and `data:` URLs.
#[derive(Clone, Debug)]
pub struct FsMediaFetcher {
    root: PathBuf,
}

impl FsMediaFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory relative references are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Classify `url` without touching the filesystem.
    pub fn resolve(&self, url: &str) -> ReelResult<MediaRef> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ReelError::missing_media("empty media reference"));
        }
        if let Some(rest) = url.strip_prefix("data:") {
            return decode_data_url(rest).map(MediaRef::Inline);
        }
        if let Some(rest) = url.strip_prefix("file://") {
            return Ok(MediaRef::File(PathBuf::from(rest)));
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(MediaRef::Remote(url.to_string()));
        }
        let rel = normalize_rel_path(url)?;
        Ok(MediaRef::File(self.root.join(Path::new(&rel))))
    }
}

impl MediaFetcher for FsMediaFetcher {
    fn fetch(&self, url: &str) -> ReelResult<Vec<u8>> {
        match self.resolve(url)? {
            MediaRef::Inline(bytes) => Ok(bytes),
            MediaRef::File(path) => std::fs::read(&path)
                .with_context(|| format!("read media bytes from '{}'", path.display()))
                .map_err(|e| ReelError::missing_media(format!("{e:#}"))),
            MediaRef::Remote(url) => Err(ReelError::missing_media(format!(
                "remote media '{url}' must be downloaded by the host before rendering"
            ))),
        }
    }
}

fn decode_data_url(rest: &str) -> ReelResult<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ReelError::decode("data URL has no ',' separator"))?;
    if meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ReelError::decode(format!("invalid base64 in data URL: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Normalize and validate project-relative media paths.
///
/// The result uses `/` separators, drops `.` segments, and rejects absolute paths and parent
/// traversals (`..`).
pub fn normalize_rel_path(source: &str) -> ReelResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(ReelError::validation("media paths must be relative"));
    }
    if s.is_empty() {
        return Err(ReelError::validation("media path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ReelError::validation("media paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ReelError::validation(
            "media path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
