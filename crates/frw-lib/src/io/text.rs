use anyhow::{Context, Result};
use std::path::Path;

/// Parse newline-delimited flow samples, ignoring blank/comment lines.
pub fn parse_f64_series(text: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let val: f64 = trimmed
            .parse()
            .with_context(|| format!("line {} is not f64: {}", idx + 1, trimmed))?;
        out.push(val);
    }
    if out.is_empty() {
        anyhow::bail!("no numeric samples found");
    }
    Ok(out)
}

/// Read a newline-delimited flow series from disk.
pub fn read_f64_series(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_f64_series(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_series_with_comments() {
        let parsed = parse_f64_series("# header\n1.5\n\n2.25\n3.0\n").unwrap();
        assert_eq!(parsed, vec![1.5, 2.25, 3.0]);
    }

    #[test]
    fn rejects_non_numeric_lines() {
        assert!(parse_f64_series("1.0\nfoo\n").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse_f64_series("# only comments\n").is_err());
    }
}
