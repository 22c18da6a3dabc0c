//! Templates shipped with the binary.
//!
//! A fresh data directory has no `templates` directory yet, so the bundled ones
//! are written there on first start.

use std::{fs, io, path::Path};

/// Relative path and content of every bundled template file.
pub const BUNDLED_TEMPLATES: &[(&str, &str)] = &[
    (
        "onchain/index.html",
        include_str!("../../templates/onchain/index.html"),
    ),
    (
        "onchain/static/css/main.2f1c9a.css",
        include_str!("../../templates/onchain/static/css/main.2f1c9a.css"),
    ),
    (
        "onchain/static/js/bundle.8f3e2a.1.js",
        include_str!("../../templates/onchain/static/js/bundle.8f3e2a.1.js"),
    ),
    (
        "allinone/index.html",
        include_str!("../../templates/allinone/index.html"),
    ),
    (
        "allinone/static/css/main.7d04be.css",
        include_str!("../../templates/allinone/static/css/main.7d04be.css"),
    ),
    (
        "allinone/static/js/bundle.c41d07.2.js",
        include_str!("../../templates/allinone/static/js/bundle.c41d07.2.js"),
    ),
];

/// Write the bundled templates below `root` unless `root` already exists.
///
/// Returns whether anything was written. An existing directory is never touched.
pub fn install_bundled_templates(root: &Path) -> io::Result<bool> {
    if root.exists() {
        return Ok(false);
    }
    for (relative, content) in BUNDLED_TEMPLATES {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_into_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("templates");

        assert!(install_bundled_templates(&root).unwrap());

        for (relative, content) in BUNDLED_TEMPLATES {
            assert_eq!(fs::read_to_string(root.join(relative)).unwrap(), *content);
        }
        let bundle = fs::read_to_string(root.join("allinone/static/js/bundle.c41d07.2.js")).unwrap();
        assert!(bundle.contains("{{USER_SUBDOMAIN}}"));
    }

    #[test]
    fn existing_dir_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("templates");
        fs::create_dir_all(root.join("custom")).unwrap();

        assert!(!install_bundled_templates(&root).unwrap());
        assert!(!root.join("onchain").exists());
    }

    #[test]
    fn matches_templates_on_disk() {
        let on_disk = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        for (relative, content) in BUNDLED_TEMPLATES {
            assert_eq!(fs::read_to_string(on_disk.join(relative)).unwrap(), *content);
        }
    }
}
