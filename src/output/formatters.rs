use anyhow::Result;
use serde::Serialize;

use crate::pipeline::ResultRow;
use crate::utils::truncate_for_display;

const CSV_HEADER: [&str; 4] = ["Video ID", "Title", "URL", "Transcript"];

/// Width of the transcript preview column in text output
const PREVIEW_CHARS: usize = 60;

#[derive(Serialize)]
struct JsonExport<'a> {
    generated_at: chrono::DateTime<chrono::Utc>,
    count: usize,
    rows: &'a [ResultRow],
}

/// Human-readable listing: one block per short with a transcript preview,
/// or the full transcript when `full` is set
pub fn format_as_text(rows: &[ResultRow], full: bool) -> String {
    let mut out = String::new();

    for (index, row) in rows.iter().enumerate() {
        out.push_str(&format!("{}. {} [{}]\n", index + 1, row.title, row.video_id));
        out.push_str(&format!("   {}\n", row.url));

        if full {
            for line in row.transcript.lines() {
                out.push_str(&format!("   | {}\n", line));
            }
        } else {
            out.push_str(&format!(
                "   {}\n",
                truncate_for_display(&row.transcript, PREVIEW_CHARS)
            ));
        }
        out.push('\n');
    }

    out.trim_end().to_string()
}

/// Pretty-printed JSON document with a generation timestamp
pub fn format_as_json(rows: &[ResultRow]) -> Result<String> {
    let export = JsonExport {
        generated_at: chrono::Utc::now(),
        count: rows.len(),
        rows,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// RFC 4180 CSV with a header row
pub fn format_as_csv(rows: &[ResultRow]) -> String {
    let mut out = String::new();
    push_csv_record(&mut out, &CSV_HEADER);

    for row in rows {
        push_csv_record(
            &mut out,
            &[
                row.video_id.as_str(),
                row.title.as_str(),
                row.url.as_str(),
                row.transcript.as_str(),
            ],
        );
    }

    out
}

fn push_csv_record(out: &mut String, fields: &[&str]) {
    let record = fields
        .iter()
        .map(|field| escape_csv_field(field))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&record);
    out.push_str("\r\n");
}

fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::TRANSCRIPT_PLACEHOLDER;

    fn rows() -> Vec<ResultRow> {
        vec![
            ResultRow {
                video_id: "a1".to_string(),
                title: "Cooking, fast".to_string(),
                url: "https://www.youtube.com/shorts/a1".to_string(),
                transcript: "Say \"hi\"\nthen go".to_string(),
            },
            ResultRow {
                video_id: "b2".to_string(),
                title: "Plain".to_string(),
                url: "https://www.youtube.com/shorts/b2".to_string(),
                transcript: TRANSCRIPT_PLACEHOLDER.to_string(),
            },
        ]
    }

    #[test]
    fn test_csv_quotes_special_fields() {
        let csv = format_as_csv(&rows());
        let expected = "Video ID,Title,URL,Transcript\r\n\
            a1,\"Cooking, fast\",https://www.youtube.com/shorts/a1,\"Say \"\"hi\"\"\nthen go\"\r\n\
            b2,Plain,https://www.youtube.com/shorts/b2,transcription unavailable\r\n";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_csv_quotes_carriage_return() {
        let rows = vec![ResultRow {
            video_id: "c3".to_string(),
            title: "Mac\rline".to_string(),
            url: "https://www.youtube.com/shorts/c3".to_string(),
            transcript: "ok".to_string(),
        }];

        assert_eq!(
            format_as_csv(&rows),
            "Video ID,Title,URL,Transcript\r\nc3,\"Mac\rline\",https://www.youtube.com/shorts/c3,ok\r\n"
        );
    }

    #[test]
    fn test_csv_header_only_for_empty_rows() {
        assert_eq!(format_as_csv(&[]), "Video ID,Title,URL,Transcript\r\n");
    }

    #[test]
    fn test_json_contains_rows() {
        let json = format_as_json(&rows()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["count"], 2);
        assert_eq!(value["rows"][1]["transcript"], TRANSCRIPT_PLACEHOLDER);
    }

    #[test]
    fn test_text_preview_is_single_line() {
        let text = format_as_text(&rows(), false);
        assert!(text.contains("1. Cooking, fast [a1]"));
        assert!(text.contains("Say \"hi\" then go"));
    }

    #[test]
    fn test_text_full_keeps_lines() {
        let text = format_as_text(&rows(), true);
        assert!(text.contains("   | Say \"hi\"\n   | then go"));
    }
}
