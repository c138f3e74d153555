//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides the few file system checks the harness needs:
//! verifying that a working directory can be handed to the tool, and
//! resolving configured paths against the config file's location.
//!
//! 此模块提供工具所需的少量文件系统检查：
//! 验证工作目录可以交给工具使用，以及根据配置文件位置解析配置的路径。

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Checks that `path` names an existing, readable directory.
///
/// # Errors
/// - `InvalidInput` for an empty path or a path that is not a directory
/// - whatever `metadata` / `read_dir` report otherwise (`NotFound`, `PermissionDenied`)
pub fn ensure_readable_dir(path: &Path) -> io::Result<()> {
    if path.as_os_str().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "working directory path is empty",
        ));
    }
    let metadata = fs::metadata(path)?;
    if !metadata.is_dir() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a directory"));
    }
    fs::read_dir(path)?;
    Ok(())
}

/// Expands `~` and environment variables in `raw`, then joins relative
/// results onto `base`.
///
/// # Arguments
/// * `base` - Directory that relative paths are anchored to
/// * `raw` - Path as written in the configuration file
///
/// An empty path (before or after expansion) stays empty so the runner's
/// setup check rejects it instead of silently using `base`.
pub fn resolve_path(base: &Path, raw: &Path) -> Result<PathBuf> {
    let text = raw.to_string_lossy();
    let expanded = shellexpand::full(&text)
        .with_context(|| format!("Failed to expand path: {text}"))?;
    let expanded = PathBuf::from(expanded.as_ref());
    if expanded.as_os_str().is_empty() {
        Ok(expanded)
    } else if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base.join(expanded))
    }
}

/// Gets the absolute path from a potentially relative path.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}
