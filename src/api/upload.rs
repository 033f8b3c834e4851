use std::path::Path;

use thiserror::Error;

/// Largest file the backend is sent: 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Accepted extensions, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["csv", "xls", "xlsx"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid file type. Please upload a CSV, XLS, or XLSX file.")]
    InvalidExtension(String),
    #[error("File is too large. Maximum size is 10MB.")]
    TooLarge { size: u64 },
    #[error("Could not read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Check a file's name and size before anything is read or sent.
pub fn validate(name: &str, size: u64) -> Result<(), UploadError> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(UploadError::InvalidExtension(name.to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size });
    }
    Ok(())
}

/// A validated file ready to be posted as the multipart field `file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    name: String,
    bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, UploadError> {
        let name = name.into();
        validate(&name, bytes.len() as u64)?;
        Ok(UploadFile { name, bytes })
    }

    /// Validate from file metadata first so oversized files are never read.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let size = std::fs::metadata(path)?.len();
        validate(&name, size)?;
        let bytes = std::fs::read(path)?;
        Self::new(name, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn extensions_are_checked_case_insensitively() {
        assert!(validate("sales.csv", 10).is_ok());
        assert!(validate("Sales.XLSX", 10).is_ok());
        assert!(validate("old.xls", 10).is_ok());
        assert!(matches!(validate("notes.txt", 10), Err(UploadError::InvalidExtension(_))));
        assert!(matches!(validate("csv", 10), Err(UploadError::InvalidExtension(_))));
    }

    #[test]
    fn size_limit_is_ten_mebibytes() {
        assert!(validate("a.csv", MAX_UPLOAD_BYTES).is_ok());
        let err = validate("a.csv", MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert_eq!(err.to_string(), "File is too large. Maximum size is 10MB.");
    }

    #[test]
    fn eleven_mebibyte_file_is_rejected() {
        let err = UploadFile::new("big.csv", vec![b'a'; 11 * 1024 * 1024]).unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { size } if size == 11 * 1024 * 1024));
    }

    #[test]
    fn reads_small_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"Drug Name\nDrugA\n").unwrap();

        let file = UploadFile::from_path(&path).unwrap();
        assert_eq!(file.name(), "sales.csv");
        assert_eq!(file.bytes(), b"Drug Name\nDrugA\n");
    }
}
