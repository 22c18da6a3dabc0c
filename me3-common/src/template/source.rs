use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{TemplateError, TemplateFile};

/// Enumerate every regular file below `dir`.
///
/// Names are relative to `dir`, `/` separated and sorted. Files are not read,
/// they stay backed by their path.
pub async fn read_template_dir(dir: impl AsRef<Path>) -> Result<Vec<TemplateFile>, TemplateError> {
    let dir = dir.as_ref().to_path_buf();
    let join_dir = dir.clone();
    tokio::task::spawn_blocking(move || enumerate(&dir))
        .await
        .map_err(|e| TemplateError::Read {
            path: join_dir,
            source: std::io::Error::other(e),
        })?
}

fn enumerate(dir: &Path) -> Result<Vec<TemplateFile>, TemplateError> {
    let read_error = |source: std::io::Error| TemplateError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(dir).map_err(read_error)?;
    if !metadata.is_dir() {
        return Err(read_error(std::io::Error::new(
            std::io::ErrorKind::NotADirectory,
            "template is not a directory",
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| read_error(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let size = entry.metadata().map_err(|e| read_error(e.into()))?.len();
        let name = relative_name(dir, entry.path());
        files.push(TemplateFile::from_path(name, entry.into_path(), size));
    }

    tracing::trace!(dir = %dir.display(), count = files.len(), "Enumerated template");
    Ok(files)
}

fn relative_name(root: &Path, path: &Path) -> String {
    let relative: PathBuf = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_nested_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("static/js")).unwrap();
        std::fs::write(dir.path().join("index.html"), "<html/>").unwrap();
        std::fs::write(dir.path().join("static/js/bundle.abc.1.js"), "x").unwrap();
        std::fs::write(dir.path().join("favicon.ico"), [0u8; 4]).unwrap();

        let files = read_template_dir(dir.path()).await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec!["favicon.ico", "index.html", "static/js/bundle.abc.1.js"]
        );
        assert_eq!(files[0].size(), 4);
        assert_eq!(
            files[1].path().unwrap(),
            dir.path().join("index.html").as_path()
        );
    }

    #[tokio::test]
    async fn missing_dir_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = read_template_dir(&missing).await.unwrap_err();
        match err {
            TemplateError::Read { path, .. } => assert_eq!(path, missing),
            e => panic!("unexpected error {e:?}"),
        }
    }

    #[tokio::test]
    async fn file_instead_of_dir_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("template.txt");
        std::fs::write(&file, "not a dir").unwrap();
        assert!(read_template_dir(&file).await.is_err());
    }
}
