use crate::core::normalizer::normalize_all;
use crate::domain::model::Identifier;
use crate::utils::error::Result;
use std::path::Path;

const NUMBER_COLUMNS: [&str; 3] = ["number", "phone", "phone_number"];

/// Reads numbers from a CSV file. Uses the `number`/`phone`/`phone_number`
/// column when the header has one. A header without such a column (a first
/// row whose first cell holds no digits) selects the first column. Without a
/// header every cell is a number, so `111,222,333` yields three.
pub fn read_numbers(path: impl AsRef<Path>) -> Result<Vec<Identifier>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let mut rows = reader.records();
    let Some(first) = rows.next().transpose()? else {
        return Ok(Vec::new());
    };

    let named_column = first
        .iter()
        .position(|cell| NUMBER_COLUMNS.contains(&cell.to_lowercase().as_str()));
    let first_is_header =
        named_column.is_some() || !first.get(0).unwrap_or("").chars().any(|c| c.is_ascii_digit());
    let column = match (named_column, first_is_header) {
        (Some(index), _) => Some(index),
        (None, true) => Some(0),
        (None, false) => None,
    };
    let cells = |row: &csv::StringRecord| -> Vec<String> {
        match column {
            Some(index) => vec![row.get(index).unwrap_or("").to_string()],
            None => row.iter().map(str::to_string).collect(),
        }
    };

    let mut values = Vec::new();
    if !first_is_header {
        values.extend(cells(&first));
    }
    for row in rows {
        values.extend(cells(&row?));
    }

    let identifiers = normalize_all(values);
    tracing::debug!(
        path = %path.as_ref().display(),
        count = identifiers.len(),
        "Read numbers from CSV"
    );
    Ok(identifiers)
}

/// Reads a plain text list: numbers separated by commas and/or newlines.
pub fn read_text_numbers(path: impl AsRef<Path>) -> Result<Vec<Identifier>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let identifiers = normalize_all(content.lines().flat_map(|line| line.split(',')));
    tracing::debug!(
        path = %path.as_ref().display(),
        count = identifiers.len(),
        "Read numbers from text file"
    );
    Ok(identifiers)
}

/// Picks the reader by extension: `.txt` is a plain list, anything else CSV.
pub fn read_number_file(path: impl AsRef<Path>) -> Result<Vec<Identifier>> {
    let is_text = path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
    if is_text {
        read_text_numbers(path)
    } else {
        read_numbers(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("numbers.csv");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn strings(ids: Vec<Identifier>) -> Vec<String> {
        ids.into_iter().map(String::from).collect()
    }

    #[test]
    fn test_named_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "name,Phone\nAli,923001234567\nBob, 15551230000 \nEmpty,\n");

        assert_eq!(
            strings(read_numbers(&path).unwrap()),
            vec!["923001234567", "15551230000"]
        );
    }

    #[test]
    fn test_headerless_single_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "15551230000\n15559998888\n");

        assert_eq!(
            strings(read_numbers(&path).unwrap()),
            vec!["15551230000", "15559998888"]
        );
    }

    #[test]
    fn test_headerless_row_keeps_every_number() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "15551230000,15559998888,923001234567
923004445566
");

        assert_eq!(
            strings(read_numbers(&path).unwrap()),
            vec!["15551230000", "15559998888", "923001234567", "923004445566"]
        );
    }

    #[test]
    fn test_text_list_with_commas_and_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("numbers.txt");
        std::fs::write(&path, "15551230000, 15559998888,923001234567

923004445566,
").unwrap();

        assert_eq!(
            strings(read_number_file(&path).unwrap()),
            vec!["15551230000", "15559998888", "923001234567", "923004445566"]
        );
    }

    #[test]
    fn test_unnamed_header_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "contacts\n15551230000\n");

        assert_eq!(strings(read_numbers(&path).unwrap()), vec!["15551230000"]);
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "");

        assert!(read_numbers(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_numbers("/nonexistent/numbers.csv").is_err());
    }
}
