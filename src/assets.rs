//! Reward assets for the end-of-session screen
//!
//! Assets are looked up by id ("struggled", or an era id such as "1990s")
//! through a capability supplied by the deployment.

use std::path::{Path, PathBuf};

/// A resolved asset on disk
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: String,
    pub path: PathBuf,
    pub content_type: &'static str,
}

/// id -> asset resolution
pub trait AssetLookup: Send + Sync {
    fn lookup(&self, id: &str) -> Option<Asset>;
}

/// Lookup that never finds anything (no assets configured)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetLookup for NoAssets {
    fn lookup(&self, _id: &str) -> Option<Asset> {
        None
    }
}

const EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
];

/// Resolves `<root>/<id>.<ext>` for the known image extensions
#[derive(Debug, Clone)]
pub struct DirAssetLookup {
    root: PathBuf,
}

impl DirAssetLookup {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Ids are plain names; anything that could escape the root is rejected
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl AssetLookup for DirAssetLookup {
    fn lookup(&self, id: &str) -> Option<Asset> {
        if !is_safe_id(id) {
            tracing::warn!("Rejected asset id {:?}", id);
            return None;
        }

        EXTENSIONS.iter().find_map(|&(ext, content_type)| {
            let path = self.root.join(format!("{}.{}", id, ext));
            path.is_file().then(|| Asset {
                id: id.to_string(),
                path,
                content_type,
            })
        })
    }
}
