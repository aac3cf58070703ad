use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::ResultRow;

pub mod formatters;

pub use formatters::*;

/// Render rows in the requested format
pub fn render(rows: &[ResultRow], format: &OutputFormat, full_transcripts: bool) -> Result<String> {
    let content = match format {
        OutputFormat::Text => format_as_text(rows, full_transcripts),
        OutputFormat::Json => format_as_json(rows)?,
        OutputFormat::Csv => format_as_csv(rows),
    };
    Ok(content)
}

/// Save result rows to file
pub fn save_to_file(
    rows: &[ResultRow],
    path: &Path,
    format: &OutputFormat,
    full_transcripts: bool,
) -> Result<()> {
    let content = render(rows, format, full_transcripts)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }

    fs_err::write(path, content)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;
    Ok(())
}

/// Print result rows to console
pub fn print_to_console(rows: &[ResultRow], format: &OutputFormat, full_transcripts: bool) -> Result<()> {
    let content = render(rows, format, full_transcripts)?;
    println!("{}", content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_csv_to_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("shorts.csv");
        let rows = vec![ResultRow {
            video_id: "a".to_string(),
            title: "A".to_string(),
            url: "https://www.youtube.com/shorts/a".to_string(),
            transcript: "hello".to_string(),
        }];

        save_to_file(&rows, &path, &OutputFormat::Csv, false).unwrap();

        let written = fs_err::read_to_string(&path).unwrap();
        assert!(written.starts_with("Video ID,Title,URL,Transcript\r\n"));
        assert!(written.contains("a,A,https://www.youtube.com/shorts/a,hello"));
    }
}
