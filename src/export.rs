use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use rust_xlsxwriter::Workbook;
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::error::ExportError;
use crate::model::Table;
use crate::options::ExportFormat;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Outcome of one [`save_tables`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub written: Vec<PathBuf>,
    pub failed: usize,
}

#[must_use]
pub fn table_file_name(document_stem: &str, index: usize, format: ExportFormat) -> String {
    format!("{document_stem}_tabela_{index}.{}", format.extension())
}

fn padded_row(row: &[Option<String>], width: usize) -> impl Iterator<Item = &str> {
    (0..width).map(move |column| row.get(column).and_then(Option::as_deref).unwrap_or(""))
}

pub(crate) fn write_csv(path: &Path, table: &Table) -> Result<(), ExportError> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(UTF8_BOM)?;

    let width = table.column_count();
    let mut writer = WriterBuilder::new().flexible(true).from_writer(file);
    if width > 0 {
        writer.write_record(table.column_names())?;
    }
    for row in &table.rows {
        writer.write_record(padded_row(row, width))?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_xlsx(path: &Path, table: &Table) -> Result<(), ExportError> {
    let width = table.column_count();
    let too_many = || ExportError::TooManyColumns(width);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (column, name) in table.column_names().iter().enumerate() {
        let column = u16::try_from(column).map_err(|_| too_many())?;
        worksheet.write_string(0, column, name)?;
    }
    for (row_index, row) in table.rows.iter().enumerate() {
        let row_number = u32::try_from(row_index + 1).map_err(|_| too_many())?;
        for (column, value) in row.iter().enumerate() {
            let Some(value) = value else {
                continue;
            };
            let column = u16::try_from(column).map_err(|_| too_many())?;
            worksheet.write_string(row_number, column, value)?;
        }
    }
    workbook.save(path)?;
    Ok(())
}

/// One JSON object per row, keyed by column name in column order.
pub(crate) fn table_to_records(table: &Table) -> Result<Value, ExportError> {
    let names = table.column_names();
    let mut seen = HashSet::new();
    if let Some(duplicate) = names.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(ExportError::DuplicateColumn(duplicate.clone()));
    }

    let records = table
        .rows
        .iter()
        .map(|row| {
            let object = names
                .iter()
                .enumerate()
                .map(|(column, name)| {
                    let value = row
                        .get(column)
                        .and_then(Clone::clone)
                        .map_or(Value::Null, Value::String);
                    (name.clone(), value)
                })
                .collect::<Map<_, _>>();
            Value::Object(object)
        })
        .collect();

    Ok(Value::Array(records))
}

pub(crate) fn write_json(path: &Path, table: &Table) -> Result<(), ExportError> {
    let records = table_to_records(table)?;
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut file, &records)?;
    file.flush()?;
    Ok(())
}

fn write_table(path: &Path, table: &Table, format: ExportFormat) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => write_csv(path, table),
        ExportFormat::Excel => write_xlsx(path, table),
        ExportFormat::Json => write_json(path, table),
    }
}

/// Writes each table to `<stem>_tabela_<n>.<ext>` under `output_folder`.
///
/// Failures are logged per table and never stop the remaining tables.
pub fn save_tables(
    tables: &[Table],
    document_stem: &str,
    format: ExportFormat,
    output_folder: &Path,
) -> SaveSummary {
    let mut summary = SaveSummary::default();

    if let Err(err) = std::fs::create_dir_all(output_folder) {
        error!(
            "Error creating output folder {}: {err}",
            output_folder.display()
        );
        summary.failed = tables.len();
        return summary;
    }

    for (index, table) in tables.iter().enumerate() {
        let table_number = index + 1;
        let path = output_folder.join(table_file_name(document_stem, table_number, format));
        match write_table(&path, table, format) {
            Ok(()) => {
                info!("Saved: {}", path.display());
                summary.written.push(path);
            }
            Err(err) => {
                error!("Error saving table {table_number}: {err}");
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Reads a delimited export back, treating the first record as the header.
///
/// # Errors
///
/// Returns an error when the file cannot be read or is not valid CSV.
pub fn read_delimited(path: &Path) -> Result<Table, ExportError> {
    let bytes = std::fs::read(path)?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes.as_slice());

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body);
    let header = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let rows = reader
        .records()
        .map(|record| {
            record.map(|record| record.iter().map(|cell| Some(cell.to_string())).collect())
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Table {
        page: 0,
        header: (!header.is_empty()).then_some(header),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use calamine::{Data, Reader, open_workbook_auto};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    use super::{read_delimited, save_tables, table_file_name, table_to_records, write_csv};
    use crate::error::ExportError;
    use crate::model::Table;
    use crate::options::ExportFormat;

    fn sample() -> Table {
        let mut table = Table::from_text_rows(1, [vec!["Ana", "São Paulo"], vec!["João", "Limeira"]]);
        table.header = Some(vec!["Nome".to_string(), "Cidade".to_string()]);
        table
    }

    #[test]
    fn names_files_by_stem_and_one_based_index() {
        assert_eq!(
            table_file_name("eOuve - Limeria", 2, ExportFormat::Excel),
            "eOuve - Limeria_tabela_2.xlsx"
        );
    }

    #[test]
    fn csv_starts_with_bom_and_has_no_index_column() {
        let dir = tempdir().expect("tempdir should be created");
        let path = dir.path().join("t.csv");
        write_csv(&path, &sample()).expect("csv should be written");

        let bytes = std::fs::read(&path).expect("csv should be readable");
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
        let text = String::from_utf8(bytes[3..].to_vec()).expect("csv should be utf-8");
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["Nome,Cidade", "Ana,São Paulo", "João,Limeira"]
        );
    }

    #[test]
    fn csv_round_trip_reproduces_cells() {
        let dir = tempdir().expect("tempdir should be created");
        let path = dir.path().join("t.csv");
        let mut table = sample();
        table.rows.push(vec![Some("Bia, a \"Tia\"".into()), None]);
        write_csv(&path, &table).expect("csv should be written");

        let back = read_delimited(&path).expect("csv should be read back");
        assert_eq!(back.header, table.header);
        assert_eq!(back.rows[0], table.rows[0]);
        assert_eq!(back.rows[2], vec![Some("Bia, a \"Tia\"".into()), Some(String::new())]);
    }

    #[test]
    fn records_keep_column_order_and_nulls() {
        let mut table = sample();
        table.rows[1][1] = None;
        let records = table_to_records(&table).expect("records should build");
        assert_eq!(
            records,
            json!([
                {"Nome": "Ana", "Cidade": "São Paulo"},
                {"Nome": "João", "Cidade": null},
            ])
        );
    }

    #[test]
    fn duplicate_columns_are_rejected_for_records() {
        let mut table = sample();
        table.header = Some(vec!["x".to_string(), "x".to_string()]);
        let err = table_to_records(&table).expect_err("duplicates should fail");
        assert!(matches!(err, ExportError::DuplicateColumn(name) if name == "x"));
    }

    #[test]
    fn json_is_pretty_printed_without_ascii_escapes() {
        let dir = tempdir().expect("tempdir should be created");
        let summary = save_tables(&[sample()], "doc", ExportFormat::Json, dir.path());
        assert_eq!(summary.failed, 0);

        let text = std::fs::read_to_string(dir.path().join("doc_tabela_1.json"))
            .expect("json should be readable");
        assert!(text.starts_with("[\n  {\n    \"Nome\": \"Ana\","), "{text}");
        assert!(text.contains("São Paulo"));
    }

    #[test]
    fn one_failing_table_does_not_stop_the_batch() {
        let dir = tempdir().expect("tempdir should be created");
        let mut broken = sample();
        broken.header = Some(vec!["x".to_string(), "x".to_string()]);

        let summary = save_tables(
            &[sample(), broken, sample()],
            "doc",
            ExportFormat::Json,
            &dir.path().join("nested/out"),
        );

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.written.len(), 2);
        assert!(dir.path().join("nested/out/doc_tabela_3.json").exists());
        assert!(!dir.path().join("nested/out/doc_tabela_2.json").exists());
    }

    #[test]
    fn spreadsheet_has_header_first_and_blank_missing_cells() {
        let dir = tempdir().expect("tempdir should be created");
        let mut table = sample();
        table.rows[1][1] = None;
        let summary = save_tables(&[table], "doc", ExportFormat::Excel, dir.path());
        assert_eq!(summary.written, vec![dir.path().join("doc_tabela_1.xlsx")]);

        let mut workbook =
            open_workbook_auto(&summary.written[0]).expect("spreadsheet should open");
        let range = workbook
            .worksheet_range_at(0)
            .expect("spreadsheet should have a sheet")
            .expect("sheet should be readable");
        let grid = range
            .rows()
            .map(|row| row.iter().map(ToString::to_string).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        assert_eq!(
            grid,
            vec![
                vec!["Nome".to_string(), "Cidade".to_string()],
                vec!["Ana".to_string(), "São Paulo".to_string()],
                vec!["João".to_string(), String::new()],
            ]
        );
        assert_eq!(range.get_value((2, 1)), Some(&Data::Empty));
    }

    #[test]
    fn unusable_output_folder_writes_nothing() {
        let dir = tempdir().expect("tempdir should be created");
        let not_a_folder = dir.path().join("occupied");
        std::fs::write(&not_a_folder, b"x").expect("file should be written");

        let summary = save_tables(
            &[sample(), sample()],
            "doc",
            ExportFormat::Csv,
            &not_a_folder,
        );

        assert_eq!(summary.failed, 2);
        assert!(summary.written.is_empty());
    }
}
