// CSV/TSV import

use supsum_pipeline::{Cell, RawGrid};

use crate::error::IngestError;

/// Decode delimited text into a grid. Every non-empty field becomes `Text`.
///
/// With no explicit delimiter the most consistent one is sniffed from the
/// first lines.
pub fn import_bytes(bytes: &[u8], delimiter: Option<u8>) -> Result<RawGrid, IngestError> {
    let content = decode_text(bytes);
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    import_from_string(&content, delimiter)
}

/// UTF-8 when valid, otherwise Windows-1252 (common for Excel-exported CSVs).
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            log::debug!("input is not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let target = counts.iter().copied().max().unwrap_or(0);
        if target <= 1 {
            continue;
        }

        // Title rows above the header often have a single field, so score
        // against the widest line rather than the first one.
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn import_from_string(content: &str, delimiter: u8) -> Result<RawGrid, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| IngestError::Decode(e.to_string()))?;
        rows.push(
            record
                .iter()
                .map(|field| if field.is_empty() { Cell::Blank } else { Cell::Text(field.to_string()) })
                .collect(),
        );
    }

    Ok(RawGrid::new(rows))
}
