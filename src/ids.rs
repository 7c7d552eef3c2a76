//! Quiz CMID list parsing: one positive integer per line, `#` comments and
//! blank lines ignored, anything else skipped with a warning.

use std::fs;
use std::path::Path;

use chrono::Local;

use crate::{info_time, warn_time, Result};

/// Reads quiz CMIDs from `path`, preserving order and duplicates.
/// A missing file is fatal; bad lines only produce warnings.
pub fn read_quiz_ids(path: &Path) -> Result<Vec<u64>> {
    let contents = fs::read_to_string(path)?;
    let (ids, skipped) = parse_quiz_ids(&contents);

    for (line_num, line) in &skipped {
        warn_time!("Skipping invalid quiz CMID on line {line_num}: '{line}'");
    }
    if ids.is_empty() {
        warn_time!("No valid quiz CMIDs found in the file.");
    } else {
        info_time!("Found {} valid quiz CMIDs.", ids.len());
    }

    Ok(ids)
}

/// Returns the CMIDs in file order plus the (line number, content) of every
/// skipped invalid line.
pub fn parse_quiz_ids(contents: &str) -> (Vec<u64>, Vec<(usize, String)>) {
    let mut ids = Vec::new();
    let mut skipped = Vec::new();

    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        // CMIDs are positive; 0 is as bogus as a non-numeric line.
        match line.parse::<u64>() {
            Ok(id) if id > 0 => ids.push(id),
            _ => skipped.push((idx + 1, line.to_owned())),
        }
    }

    (ids, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_blanks_and_comments() {
        let (ids, skipped) = parse_quiz_ids("# header\n\n101\n   \n102\n# trailing\n");
        assert_eq!(ids, vec![101, 102]);
        assert!(skipped.is_empty());
    }

    #[test]
    fn zero_is_not_a_valid_cmid() {
        let (ids, skipped) = parse_quiz_ids("0\n101\n");
        assert_eq!(ids, vec![101]);
        assert_eq!(skipped, vec![(1, "0".to_owned())]);
    }

    #[test]
    fn skips_non_numeric_lines_with_line_numbers() {
        let (ids, skipped) = parse_quiz_ids("101\nabc\n102\n-5\n103\n");
        assert_eq!(ids, vec![101, 102, 103]);
        assert_eq!(
            skipped,
            vec![(2, "abc".to_owned()), (4, "-5".to_owned())]
        );
    }

    #[test]
    fn preserves_order_and_duplicates() {
        let (ids, _) = parse_quiz_ids("3\n1\n3\n2\n");
        assert_eq!(ids, vec![3, 1, 3, 2]);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let (ids, skipped) = parse_quiz_ids("  101  \n\t102\n");
        assert_eq!(ids, vec![101, 102]);
        assert!(skipped.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_list() {
        let (ids, skipped) = parse_quiz_ids("");
        assert!(ids.is_empty());
        assert!(skipped.is_empty());
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = read_quiz_ids(Path::new("/nonexistent/quiz_ids.txt")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
