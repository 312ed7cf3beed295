//! On-disk Travel-Time Matrix Cache.
//!
//! Matrices are stored one file per key at
//! `{base}/{mode}/{profile}/{batch_id}.ttm` using the [`codec`](super::codec)
//! format. A store replaces any previous file for the same key; it never
//! appends. Files do not expire, the caller owns retention.
//!
//! The cache assumes a single writer per key; concurrent writers to the same
//! key must be serialized by the caller.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::TravelMode;
use crate::heatmap_error::HeatmapError;
use crate::io::codec;
use crate::io::column::CachedMatrix;

/// File extension of cached matrices.
pub const CACHE_FILE_EXTENSION: &str = "ttm";

fn is_path_safe(component: &str) -> bool {
    !component.is_empty()
        && component
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// `(mode, profile, batch_id)` identifying one cached matrix.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CacheKey {
    mode: String,
    profile: String,
    batch_id: u64,
}

impl CacheKey {
    /// # Errors
    /// [`HeatmapError::InvalidCacheKey`] if `mode` or `profile` is empty or
    /// contains anything but ASCII alphanumerics, `_` and `-`.
    pub fn new(
        mode: impl Into<String>,
        profile: impl Into<String>,
        batch_id: u64,
    ) -> Result<Self, HeatmapError> {
        let mode = mode.into();
        let profile = profile.into();
        for component in [&mode, &profile] {
            if !is_path_safe(component) {
                return Err(HeatmapError::InvalidCacheKey(component.clone()));
            }
        }
        Ok(Self {
            mode,
            profile,
            batch_id,
        })
    }

    /// Key for a routing mode and profile name.
    pub fn for_mode(
        mode: TravelMode,
        profile: impl Into<String>,
        batch_id: u64,
    ) -> Result<Self, HeatmapError> {
        Self::new(mode.as_str(), profile, batch_id)
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn batch_id(&self) -> u64 {
        self.batch_id
    }

    /// Path of this key relative to the cache base.
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.mode)
            .join(&self.profile)
            .join(format!("{}.{CACHE_FILE_EXTENSION}", self.batch_id))
    }
}

/// Directory-backed matrix cache rooted at `base`.
#[derive(Clone, Debug)]
pub struct MatrixCache {
    base: PathBuf,
}

impl MatrixCache {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base_path(&self) -> &Path {
        &self.base
    }

    /// Absolute location of `key`'s file.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.base.join(key.relative_path())
    }

    /// Whether a matrix is cached under `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    /// Write `matrix` under `key`, replacing any previous file.
    ///
    /// Bytes go to a hidden sibling temp file which is then renamed over the
    /// target, so readers see either the old or the new matrix. On failure
    /// the temp file is removed and nothing at the target changes.
    ///
    /// Returns the path written.
    pub fn store(&self, key: &CacheKey, matrix: &CachedMatrix) -> Result<PathBuf, HeatmapError> {
        let target = self.path_for(key);
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base.clone());
        fs::create_dir_all(&dir).map_err(|e| HeatmapError::storage(&dir, e))?;

        let bytes = codec::encode(matrix)?;
        let tmp = dir.join(format!(".{}.{CACHE_FILE_EXTENSION}.tmp", key.batch_id));
        let written = File::create(&tmp)
            .and_then(|mut f| {
                f.write_all(&bytes)?;
                f.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &target));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(HeatmapError::storage(&target, e));
        }

        log::debug!(
            "cached {} columns x {} rows ({} bytes) at {}",
            matrix.len(),
            matrix.rows().unwrap_or(0),
            bytes.len(),
            target.display()
        );
        Ok(target)
    }

    /// Read the matrix stored under `key`.
    ///
    /// # Errors
    /// [`HeatmapError::CacheNotFound`] if nothing is stored under `key`,
    /// [`HeatmapError::CacheStorage`] for other I/O failures and
    /// [`HeatmapError::CacheFormat`] for corrupt files.
    pub fn load(&self, key: &CacheKey) -> Result<CachedMatrix, HeatmapError> {
        let path = self.path_for(key);
        let bytes = fs::read(&path).map_err(|e| HeatmapError::from_io(&path, e))?;
        let matrix = codec::decode(&bytes)?;
        log::debug!(
            "loaded {} columns ({} bytes) from {}",
            matrix.len(),
            bytes.len(),
            path.display()
        );
        Ok(matrix)
    }

    /// Delete the matrix under `key`. Returns `false` if there was none.
    pub fn remove(&self, key: &CacheKey) -> Result<bool, HeatmapError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(HeatmapError::storage(&path, e)),
        }
    }
}
