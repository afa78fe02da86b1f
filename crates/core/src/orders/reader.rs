//! CSV order file discovery and parsing.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use super::types::{normalize_secure_id, OrderFile, OrderRecord, SkippedRow};
use super::OrderSourceError;

/// Column names understood in an order file header.
const COL_ORDER_NUMBER: &str = "order_number";
const COL_SHOP_NUMBER: &str = "shop_number";
const COL_IDENTIFIER: &str = "identifier";
const COL_SECURE_ID: &str = "secure_id";
const COL_CEWE_ORDER_ID: &str = "cewe_order_id";
const COL_OUTPUT_PATH: &str = "output_path";

/// Entry point for reading a directory of order CSV files.
pub struct OrderSource;

impl OrderSource {
    /// List the `.csv` files in `dir` (non-recursive), sorted by name.
    ///
    /// Files whose name matches one of `skip_files` (case-insensitive) are
    /// left out. This is the only call that fails for directory-level
    /// problems; individual files are parsed lazily by the returned iterator.
    pub fn open(dir: &Path, skip_files: &[String]) -> Result<OrderFiles, OrderSourceError> {
        if !dir.exists() {
            return Err(OrderSourceError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let entries = fs::read_dir(dir).map_err(|e| OrderSourceError::ReadDirectory {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| OrderSourceError::ReadDirectory {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_file() || !is_csv(&path) {
                continue;
            }
            let name = file_name(&path);
            if skip_files.iter().any(|s| s.eq_ignore_ascii_case(&name)) {
                debug!(file = %name, "Skipping excluded order file");
                continue;
            }
            paths.push(path);
        }
        paths.sort_by_key(|p| file_name(p));

        debug!(dir = %dir.display(), files = paths.len(), "Discovered order files");

        Ok(OrderFiles {
            paths: paths.into_iter(),
        })
    }
}

/// Lazy sequence of parsed order files, in discovery order.
///
/// A file that cannot be read yields an `Err` for that file only; iteration
/// continues with the next file.
#[derive(Debug)]
pub struct OrderFiles {
    paths: std::vec::IntoIter<PathBuf>,
}

impl OrderFiles {
    /// Number of files not yet parsed.
    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl Iterator for OrderFiles {
    type Item = Result<OrderFile, OrderSourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.next()?;
        Some(read_order_file(&path))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.paths.size_hint()
    }
}

/// Read and parse a single order file.
pub fn read_order_file(path: &Path) -> Result<OrderFile, OrderSourceError> {
    let filename = file_name(path);
    let file = fs::File::open(path).map_err(|e| OrderSourceError::ReadFile {
        filename: filename.clone(),
        reason: e.to_string(),
    })?;
    parse_orders(&filename, file)
}

/// Parse order rows from any CSV reader.
pub fn parse_orders<R: Read>(filename: &str, input: R) -> Result<OrderFile, OrderSourceError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| OrderSourceError::ReadFile {
            filename: filename.to_string(),
            reason: e.to_string(),
        })?
        .clone();
    let columns = ColumnMap::from_headers(filename, &headers)?;

    let mut order_file = OrderFile {
        filename: filename.to_string(),
        ..Default::default()
    };

    for (index, row) in reader.records().enumerate() {
        // header is line 1, so the first data row is line 2
        let fallback_line = index as u64 + 2;
        match row {
            Ok(row) => {
                let line = row.position().map(|p| p.line()).unwrap_or(fallback_line);
                match columns.decode(&row) {
                    Ok(record) => order_file.records.push(record),
                    Err(reason) => {
                        warn!(file = filename, line, %reason, "Skipping order row");
                        order_file.skipped_rows.push(SkippedRow { line, reason });
                    }
                }
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                let reason = format!("unreadable row: {}", e);
                warn!(file = filename, line, %reason, "Skipping order row");
                order_file.skipped_rows.push(SkippedRow { line, reason });
            }
        }
    }

    debug!(
        file = filename,
        records = order_file.records.len(),
        skipped = order_file.skipped_rows.len(),
        "Parsed order file"
    );

    Ok(order_file)
}

/// Header name to column index, matched case-insensitively.
struct ColumnMap {
    indices: HashMap<String, usize>,
}

impl ColumnMap {
    fn from_headers(filename: &str, headers: &StringRecord) -> Result<Self, OrderSourceError> {
        let indices: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim_start_matches('\u{feff}').to_lowercase(), i))
            .collect();

        let missing: Vec<String> = [COL_ORDER_NUMBER, COL_SHOP_NUMBER]
            .iter()
            .filter(|c| !indices.contains_key(**c))
            .map(|c| c.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(OrderSourceError::MissingColumns {
                filename: filename.to_string(),
                columns: missing,
            });
        }

        Ok(Self { indices })
    }

    fn get<'r>(&self, row: &'r StringRecord, column: &str) -> &'r str {
        self.indices
            .get(column)
            .and_then(|&i| row.get(i))
            .unwrap_or("")
    }

    fn decode(&self, row: &StringRecord) -> Result<OrderRecord, String> {
        let order_number = self.get(row, COL_ORDER_NUMBER);
        let shop_number = self.get(row, COL_SHOP_NUMBER);

        if order_number.is_empty() {
            return Err(format!("missing {}", COL_ORDER_NUMBER));
        }
        if shop_number.is_empty() {
            return Err(format!("missing {}", COL_SHOP_NUMBER));
        }

        Ok(OrderRecord {
            order_number: order_number.to_string(),
            shop_number: shop_number.to_string(),
            identifier: self.get(row, COL_IDENTIFIER).to_string(),
            secure_id: normalize_secure_id(self.get(row, COL_SECURE_ID)),
            cewe_order_id: self.get(row, COL_CEWE_ORDER_ID).to_string(),
            output_path: self.get(row, COL_OUTPUT_PATH).to_string(),
        })
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn skip_defaults() -> Vec<String> {
        vec!["orders_template.csv".to_string()]
    }

    #[test]
    fn test_parse_full_header() {
        let csv = "\
order_number,shop_number,identifier,secure_id,cewe_order_id,output_path
050842,541032,Holiday,ztvlyeq5,,/tmp/x
541032-050843,541032,Birthday,,777-1,
";
        let file = parse_orders("orders.csv", csv.as_bytes()).unwrap();
        assert_eq!(file.filename, "orders.csv");
        assert_eq!(file.records.len(), 2);
        assert!(file.skipped_rows.is_empty());

        let first = &file.records[0];
        assert_eq!(first.resolved_key(), "541032-050842");
        assert_eq!(first.identifier, "Holiday");
        assert_eq!(first.secure_id, "ZTVLYEQ5");
        assert_eq!(first.output_path, "/tmp/x");
        assert_eq!(first.cewe_order_id, "");

        let second = &file.records[1];
        assert_eq!(second.resolved_key(), "541032-050843");
        assert_eq!(second.cewe_order_id, "777-1");
    }

    #[test]
    fn test_parse_minimal_header_and_case_insensitive_columns() {
        let csv = "Order_Number, SHOP_NUMBER ,Identifier\n050842,541032,Holiday\n";
        let file = parse_orders("a.csv", csv.as_bytes()).unwrap();
        assert_eq!(file.records.len(), 1);
        let record = &file.records[0];
        assert_eq!(record.order_number, "050842");
        assert_eq!(record.identifier, "Holiday");
        assert_eq!(record.secure_id, "");
        assert_eq!(record.output_path, "");
    }

    #[test]
    fn test_rows_missing_required_fields_are_skipped() {
        let csv = "\
order_number,shop_number,identifier
050842,541032,ok
,541032,no order
050843,,no shop
050844
050845,541032,also ok
";
        let file = parse_orders("a.csv", csv.as_bytes()).unwrap();
        let orders: Vec<_> = file.records.iter().map(|r| r.order_number.as_str()).collect();
        assert_eq!(orders, vec!["050842", "050845"]);

        let lines: Vec<u64> = file.skipped_rows.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert!(file.skipped_rows[0].reason.contains("order_number"));
        assert!(file.skipped_rows[1].reason.contains("shop_number"));
    }

    #[test]
    fn test_missing_required_column_fails_file() {
        let csv = "order_number,identifier\n050842,Holiday\n";
        let err = parse_orders("bad.csv", csv.as_bytes()).unwrap_err();
        match err {
            OrderSourceError::MissingColumns { filename, columns } => {
                assert_eq!(filename, "bad.csv");
                assert_eq!(columns, vec!["shop_number"]);
            }
            other => panic!("Expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_header_with_bom() {
        let csv = "\u{feff}order_number,shop_number\n1,2\n";
        let file = parse_orders("bom.csv", csv.as_bytes()).unwrap();
        assert_eq!(file.records.len(), 1);
    }

    #[test]
    fn test_open_missing_directory() {
        let err = OrderSource::open(Path::new("/nonexistent/orders"), &[]).unwrap_err();
        assert!(matches!(err, OrderSourceError::DirectoryNotFound { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_open_path_that_is_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("orders");
        fs::write(&file, "not a dir").unwrap();
        let err = OrderSource::open(&file, &[]).unwrap_err();
        assert!(matches!(err, OrderSourceError::ReadDirectory { .. }));
    }

    #[test]
    fn test_open_empty_directory() {
        let dir = TempDir::new().unwrap();
        let files = OrderSource::open(dir.path(), &skip_defaults()).unwrap();
        assert_eq!(files.remaining(), 0);
        assert_eq!(files.count(), 0);
    }

    #[test]
    fn test_open_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let header = "order_number,shop_number\n";
        fs::write(dir.path().join("b.csv"), format!("{}2,1\n", header)).unwrap();
        fs::write(dir.path().join("A.CSV"), format!("{}1,1\n", header)).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        fs::write(dir.path().join("Orders_Template.csv"), header).unwrap();
        fs::create_dir(dir.path().join("nested.csv")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.csv"), header).unwrap();

        let files: Vec<OrderFile> = OrderSource::open(dir.path(), &skip_defaults())
            .unwrap()
            .map(|f| f.unwrap())
            .collect();
        let names: Vec<_> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["A.CSV", "b.csv"]);
        assert_eq!(files[0].records[0].order_number, "1");
        assert_eq!(files[1].records[0].order_number, "2");
    }

    #[test]
    fn test_bad_file_does_not_stop_iteration() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "identifier\nx\n").unwrap();
        fs::write(dir.path().join("b.csv"), "order_number,shop_number\n1,2\n").unwrap();

        let results: Vec<_> = OrderSource::open(dir.path(), &[]).unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert!(!results[0].as_ref().unwrap_err().is_fatal());
        assert_eq!(results[1].as_ref().unwrap().records.len(), 1);
    }
}
