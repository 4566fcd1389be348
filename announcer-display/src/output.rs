use std::{fs, io, path::Path};

/// Replaces the file at `path` with `contents` so readers never see a partial page
pub fn write_document(path: &Path, contents: &str) -> io::Result<()> {
    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_write_document_replaces_contents() {
        let dir = std::env::temp_dir().join(format!("announcer-output-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("announcer.html");

        write_document(&path, "<p>first</p>").unwrap();
        write_document(&path, "<p>second</p>").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>second</p>");
        assert!(!dir.join("announcer.html.tmp").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
