use std::path::Path;

use lopdf::Document;

use crate::error::{ToolError, ToolResult};

pub fn read_first_pages(path: &Path, max_pages: usize) -> ToolResult<String> {
    if !path.is_file() {
        return Err(ToolError::not_found(format!("file {}", path.display())));
    }

    let doc = Document::load(path)?;
    let pages = doc.get_pages();
    tracing::debug!(path = %path.display(), pages = pages.len(), "loaded PDF");

    let mut content = String::new();
    for &page in pages.keys().take(max_pages) {
        content.push_str(&doc.extract_text(&[page])?);
    }

    Ok(content)
}

pub async fn read_pdf(path: &Path, max_pages: usize) -> ToolResult<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_first_pages(&path, max_pages))
        .await
        .map_err(|err| ToolError::Io(std::io::Error::other(err)))?
}


#[cfg(test)]
mod tests {
    use super::fixtures::write_pdf;
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_reads_first_three_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("five.pdf");
        write_pdf(&path, 5);

        let text = read_first_pages(&path, 3).unwrap();

        for n in 1..=3 {
            assert!(text.contains(&format!("Page {} of the paper", n)), "{}", text);
        }
        assert!(!text.contains("Page 4"));
        assert!(!text.contains("Page 5"));
        assert!(text.find("Page 1").unwrap() < text.find("Page 3").unwrap());
    }

    #[test]
    fn test_short_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.pdf");
        write_pdf(&path, 1);

        let text = read_first_pages(&path, 3).unwrap();
        assert!(text.contains("Page 1 of the paper"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_first_pages(&dir.path().join("paper.pdf"), 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = read_first_pages(&path, 3).unwrap_err();
        assert!(matches!(err, ToolError::Pdf(_)));
    }

    #[tokio::test]
    async fn test_read_pdf_async() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.pdf");
        write_pdf(&path, 2);

        let text = read_pdf(&path, 3).await.unwrap();
        assert!(text.contains("Page 2 of the paper"));
    }
}
