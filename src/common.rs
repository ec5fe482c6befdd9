use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Write `content` to `filename`, creating missing parent directories.
pub fn write_string_to_file(filename: &str, content: &str) -> std::io::Result<()> {
    let path = Path::new(filename);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_path_if_not_exists(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn create_path_if_not_exists(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out/graph.json");
        let target = target.to_str().unwrap();
        write_string_to_file(target, "{}").unwrap();
        assert_eq!(fs::read_to_string(target).unwrap(), "{}");
    }
}
