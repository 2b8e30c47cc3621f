use std::path::Path;

use crate::config::UploadConfig;
use crate::errors::{AppError, AppResult};

/// A file picked by the user, held in memory until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }

    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::Upload(format!("Cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { file_name, bytes })
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    pub fn content_type(&self) -> &'static str {
        match self.extension().as_deref() {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("pdf") => "application/pdf",
            _ => "application/octet-stream",
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Reject a file before it is attached to an outgoing request.
pub fn check_upload(upload: &Upload, config: &UploadConfig) -> AppResult<()> {
    if upload.bytes.is_empty() {
        return Err(AppError::Upload(format!("{} is empty", upload.file_name)));
    }

    if upload.size() > config.max_file_bytes {
        return Err(AppError::Upload(format!(
            "{} is larger than {} KB",
            upload.file_name,
            config.max_file_bytes / 1024
        )));
    }

    let allowed = upload
        .extension()
        .map(|ext| config.allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(&ext)))
        .unwrap_or(false);
    if !allowed {
        return Err(AppError::Upload(format!(
            "{} must be one of: {}",
            upload.file_name,
            config.allowed_extensions.join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> UploadConfig {
        UploadConfig {
            max_file_bytes: 1024,
            allowed_extensions: vec!["jpg".into(), "png".into(), "pdf".into()],
        }
    }

    #[test]
    fn test_accepts_allowed_file() {
        let upload = Upload::new("photo.JPG", vec![1; 100]);
        assert!(check_upload(&upload, &limits()).is_ok());
        assert_eq!(upload.content_type(), "image/jpeg");
    }

    #[test]
    fn test_rejects_size_type_and_empty() {
        assert!(matches!(
            check_upload(&Upload::new("big.png", vec![0; 2048]), &limits()),
            Err(AppError::Upload(_))
        ));
        assert!(check_upload(&Upload::new("script.exe", vec![0; 10]), &limits()).is_err());
        assert!(check_upload(&Upload::new("noext", vec![0; 10]), &limits()).is_err());
        assert!(check_upload(&Upload::new("empty.pdf", vec![]), &limits()).is_err());
    }

    #[tokio::test]
    async fn test_from_path_reads_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sign.png");
        std::fs::write(&path, b"png-bytes").unwrap();

        let upload = Upload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "sign.png");
        assert_eq!(upload.bytes, b"png-bytes");
    }
}
