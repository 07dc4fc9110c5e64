use colored::*;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::{fs, path::Path};

use doxq::index::{FragmentSource, SearchData};

/// Parsed search data plus the fingerprint of the files it came from.
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedIndex {
    pub fingerprint: String,
    pub data: SearchData,
}

pub fn load_cache(cache_path: &Path) -> Option<CachedIndex> {
    if !cache_path.exists() {
        return None;
    }
    let bytes = fs::read(cache_path).ok()?;
    let mut decoder = GzDecoder::new(&bytes[..]);
    let mut json = String::new();
    decoder.read_to_string(&mut json).ok()?;
    serde_json::from_str(&json).ok()
}

pub fn save_cache(cache_path: &Path, cache: &CachedIndex) {
    let json = serde_json::to_string(cache).unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    let compressed = encoder
        .write_all(json.as_bytes())
        .and_then(|_| encoder.finish());
    if let Err(e) = compressed.and_then(|bytes| fs::write(cache_path, bytes)) {
        eprintln!("{} Failed to save cache: {}", "⚠️".yellow(), e);
    }
}

/// Hash every fragment file name and body. Sources arrive sorted from the
/// loader, so the digest is stable across runs.
pub fn compute_fingerprint(sources: &[FragmentSource]) -> String {
    let mut hasher = Sha256::new();
    for source in sources {
        hasher.update(source.file_name.as_bytes());
        hasher.update([0u8]);
        hasher.update(source.text.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

pub fn needs_reparse(cached: Option<&CachedIndex>, fingerprint: &str, force: bool) -> bool {
    if force {
        return true;
    }

    // No cache, or the files changed underneath it
    match cached {
        Some(cached) => cached.fingerprint != fingerprint,
        None => true,
    }
}
