// CSV/TSV import/export
//
// A delimited file is a one-sheet workbook: the first record is the header,
// every later record is a data row. Cells are typed with `Value::from_input`.

use std::io::Read;
use std::path::Path;

use sheetmerge_engine::{Table, Value};

use crate::headers::normalize_headers;

pub fn import(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, b'\t')
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.is_empty()).take(10).collect();

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

        if counts[0] <= 1 {
            continue;
        }

        // Lines agreeing with the header's field count, weighted by that count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

fn import_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        records.push(result.map_err(|e| e.to_string())?);
    }

    let Some((header, body)) = records.split_first() else {
        return Ok(Table::empty());
    };

    // Ragged rows widen the table; the extra columns get placeholder names
    let width = body.iter().map(|r| r.len()).max().unwrap_or(0).max(header.len());
    let raw: Vec<String> = (0..width)
        .map(|i| header.get(i).unwrap_or("").to_string())
        .collect();

    let rows = body
        .iter()
        .map(|record| {
            (0..width)
                .map(|i| record.get(i).map(Value::from_input).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Table::with_rows(normalize_headers(raw), rows).map_err(|e| e.to_string())
}

pub fn export(table: &Table, path: &Path) -> Result<usize, String> {
    export_with_delimiter(table, path, b',')
}

pub fn export_tsv(table: &Table, path: &Path) -> Result<usize, String> {
    export_with_delimiter(table, path, b'\t')
}

/// Write the header then every row. Returns the number of data rows written.
fn export_with_delimiter(table: &Table, path: &Path, delimiter: u8) -> Result<usize, String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    if table.column_count() == 0 {
        writer.flush().map_err(|e| e.to_string())?;
        return Ok(0);
    }

    writer.write_record(table.columns()).map_err(|e| e.to_string())?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(Value::display))
            .map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(table.row_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;Age;City\nAlice;30;Paris\nBob;25;London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Name,Age,City\nAlice,30,Paris\nBob,25,London\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tAge\tCity\nAlice\t30\tParis\nBob\t25\tLondon\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Name;Address;City\n\"Doe, Jane\";\"123 Main St, Apt 4\";Paris\nBob;\"456 Elm\";London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_import_types_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.csv");
        fs::write(&path, "id;name;active;score\n1;Alice;TRUE;2.5\n2; Bob ;false;\n").unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.columns(), &["id", "name", "active", "score"]);
        assert_eq!(
            table.row(0).unwrap(),
            &[Value::int(1), Value::text("Alice"), Value::Boolean(true), Value::float(2.5)]
        );
        assert_eq!(
            table.row(1).unwrap(),
            &[Value::int(2), Value::text(" Bob "), Value::text("false"), Value::Null]
        );
    }

    #[test]
    fn test_load_save_reproduces_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("codes.csv");
        let original = "zip,flag,amount,count\n007,true,1.50,3\n+5,FALSE,2.5,-0\n";
        fs::write(&path, original).unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.value(0, "zip"), Some(&Value::text("007")));
        assert_eq!(table.value(0, "count"), Some(&Value::int(3)));
        assert_eq!(table.value(1, "flag"), Some(&Value::Boolean(false)));

        let out = dir.path().join("out.csv");
        export(&table, &out).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), original);
    }

    #[test]
    fn test_import_ragged_rows() {
        let table = import_from_string("a,b\n1\n1,2,3\n", b',').unwrap();
        assert_eq!(table.columns(), &["a", "b", "Unnamed: 2"]);
        assert_eq!(table.row(0).unwrap(), &[Value::int(1), Value::Null, Value::Null]);
        assert_eq!(table.row(1).unwrap(), &[Value::int(1), Value::int(2), Value::int(3)]);
    }

    #[test]
    fn test_import_duplicate_headers() {
        let table = import_from_string("id,name,name\n1,a,b\n", b',').unwrap();
        assert_eq!(table.columns(), &["id", "name", "name.1"]);
    }

    #[test]
    fn test_import_empty_file() {
        let table = import_from_string("", b',').unwrap();
        assert_eq!(table.column_count(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_windows_1252_fallback_and_bom() {
        let dir = tempdir().unwrap();
        let latin = dir.path().join("latin.csv");
        // "café" in Windows-1252
        fs::write(&latin, b"name\ncaf\xe9\n").unwrap();
        let table = import(&latin).unwrap();
        assert_eq!(table.value(0, "name"), Some(&Value::text("café")));

        let bom = dir.path().join("bom.csv");
        fs::write(&bom, "\u{feff}id,name\n1,a\n").unwrap();
        let table = import(&bom).unwrap();
        assert_eq!(table.columns(), &["id", "name"]);
    }

    #[test]
    fn test_tsv_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.tsv");

        let table = Table::with_rows(
            ["Name", "Value"],
            vec![
                vec![Value::text("Alice"), Value::int(42)],
                vec![Value::text("Bob"), Value::Null],
            ],
        )
        .unwrap();

        assert_eq!(export_tsv(&table, &path).unwrap(), 2);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains('\t'), "TSV should contain tab characters");
        assert!(!content.contains(','), "TSV should not contain commas as delimiters");

        let imported = import_tsv(&path).unwrap();
        assert_eq!(imported, table);
    }
}
