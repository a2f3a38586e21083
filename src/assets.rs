use std::path::{Path, PathBuf};

use anyhow::Context as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Css,
    Js,
}

impl AssetKind {
    fn subdir(self) -> &'static str {
        match self {
            AssetKind::Css => "css",
            AssetKind::Js => "js",
        }
    }

    fn stem(self) -> &'static str {
        match self {
            AssetKind::Css => "site",
            AssetKind::Js => "prefs",
        }
    }
}

/// Where a rendered page finds one of its assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef {
    /// Relative path from the page to the written file.
    Linked(String),
    Inline(String),
}

/// Writes `<assets_dir>/<kind>/<stem>.<hash>.<ext>` under `out_dir` and returns
/// the page-relative path. Identical content maps to the same file name, so
/// an unchanged bundle keeps its cache entry between renders.
pub fn write_asset(
    out_dir: &Path,
    assets_dir_name: &str,
    kind: AssetKind,
    bytes: &[u8],
) -> anyhow::Result<String> {
    let hash = blake3::hash(bytes).to_hex();
    let rel = format!(
        "{}/{}/{}.{}.{}",
        assets_dir_name,
        kind.subdir(),
        kind.stem(),
        &hash.as_str()[..16],
        kind.subdir()
    );
    let abs: PathBuf = out_dir.join(&rel);
    if let Some(parent) = abs.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    if !abs.exists() {
        std::fs::write(&abs, bytes).with_context(|| format!("write {}", abs.display()))?;
    }
    Ok(rel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn same_content_same_name() {
        let tmp = tempdir().unwrap();
        let a = write_asset(tmp.path(), "assets", AssetKind::Css, b"body{}").unwrap();
        let b = write_asset(tmp.path(), "assets", AssetKind::Css, b"body{}").unwrap();
        let c = write_asset(tmp.path(), "assets", AssetKind::Css, b"p{}").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("assets/css/site."));
        assert!(a.ends_with(".css"));
        assert_eq!(std::fs::read(tmp.path().join(&a)).unwrap(), b"body{}");
    }
}
