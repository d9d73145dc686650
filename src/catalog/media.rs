//! On-disk storage of uploaded audio files, below `<media root>/songs/<artist>/`.

use anyhow::{Context, Result};
use rand::distr::Alphanumeric;
use rand::Rng;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ALLOWED_AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "m4a", "ogg"];

/// Path prefix the media root is served under.
pub const MEDIA_URL_PREFIX: &str = "/media";

const SONGS_DIR: &str = "songs";
const SUFFIX_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Relative to the media root, `/` separated.
    pub relative_path: String,
    pub size: i64,
}

/// Lower-cased extension of `filename` if it is an accepted audio format.
pub fn audio_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_AUDIO_EXTENSIONS
        .contains(&ext.as_str())
        .then_some(ext)
}

/// Makes a single path component safe to use on disk.
fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.' | '(' | ')' | '\'' | '&') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

fn create_new(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

fn suffixed(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, random_suffix(), ext),
        None => format!("{}_{}", filename, random_suffix()),
    }
}

fn random_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect()
}

/// Public URL of a stored file.
pub fn media_url(relative_path: &str) -> String {
    let encoded: Vec<_> = relative_path
        .split('/')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect();
    format!("{}/{}", MEDIA_URL_PREFIX, encoded.join("/"))
}

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join(SONGS_DIR))
            .with_context(|| format!("Failed to create media directory {:?}", root))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, relative_path: &str) -> PathBuf {
        relative_path
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    /// Writes `data` for `artist`, renaming on collision. The caller must
    /// have checked the extension already.
    pub fn store_song_file(&self, artist: &str, filename: &str, data: &[u8]) -> Result<StoredFile> {
        let artist_dir = sanitize_component(artist);
        let filename = sanitize_component(filename);
        let dir = self.root.join(SONGS_DIR).join(&artist_dir);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {:?}", dir))?;

        // Claim the name atomically so concurrent uploads never share a file.
        let mut name = filename.clone();
        let (path, mut file) = loop {
            let path = dir.join(&name);
            match create_new(&path) {
                Ok(file) => break (path, file),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    name = suffixed(&filename);
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("Failed to create {:?}", path))
                }
            }
        };
        if let Err(err) = file.write_all(data).and_then(|_| file.flush()) {
            let _ = std::fs::remove_file(&path);
            return Err(err).with_context(|| format!("Failed to write {:?}", path));
        }
        let size = file.metadata()?.len() as i64;
        debug!("Stored {} bytes at {:?}", size, path);

        Ok(StoredFile {
            relative_path: format!("{}/{}/{}", SONGS_DIR, artist_dir, name),
            size,
        })
    }

    pub fn exists(&self, relative_path: &str) -> bool {
        self.absolute(relative_path).is_file()
    }

    /// Best effort, failures are only logged.
    pub fn remove(&self, relative_path: &str) {
        let path = self.absolute(relative_path);
        if let Err(err) = std::fs::remove_file(&path) {
            warn!("Could not remove media file {:?}: {}", path, err);
        }
    }
}
