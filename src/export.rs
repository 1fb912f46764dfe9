//! Export helpers for writing decoded rows to CSV.
//!
//! - `save_rows_csv` writes a header of attribute display names in
//!   declaration order, then one record per row. Unset values are empty
//!   fields; decode failures are written as `#error: <reason>`.
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;

use crate::attribute::AttributeSelection;
use crate::row::Row;

pub fn write_rows_csv<'a, W, I>(out: W, rows: I, selection: AttributeSelection) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Row>,
{
    let mut wtr = Writer::from_writer(out);
    let header: Vec<&str> = selection.attributes().map(|a| a.display_name()).collect();
    wtr.write_record(&header)?;
    for row in rows {
        let record: Vec<String> = selection
            .attributes()
            .map(|a| row.attribute(a).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_rows_csv<'a, P, I>(path: P, rows: I, selection: AttributeSelection) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a Row>,
{
    let path = path.as_ref();
    let file = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_rows_csv(file, rows, selection).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;
    use crate::decode::DecodeError;
    use crate::row::FieldValue;
    use tempfile::tempdir;

    fn rows() -> Vec<Row> {
        let mut a = Row::default();
        a.push(Attribute::ObjectSid, FieldValue::Text("S-1-5-21-1-500".into()));
        a.push(Attribute::SamAccountName, FieldValue::Text("Administrator".into()));
        a.push(Attribute::LastLogon, FieldValue::Null);
        let mut b = Row::default();
        b.push(Attribute::ObjectSid, FieldValue::Text("S-1-5-21-1-501".into()));
        b.push(Attribute::SamAccountName, FieldValue::Text("Guest, local".into()));
        b.push(
            Attribute::LastLogon,
            FieldValue::Error(DecodeError::WidthMismatch {
                expected: 8,
                actual: 3,
            }),
        );
        vec![a, b]
    }

    #[test]
    fn renders_header_nulls_and_errors() {
        let selection = Attribute::LastLogon | Attribute::SamAccountName | Attribute::ObjectSid;
        let mut buf = Vec::new();
        write_rows_csv(&mut buf, &rows(), selection).unwrap();
        let text = String::from_utf8(buf).unwrap();
        insta::assert_snapshot!(text, @r##"
objectSid,sAMAccountName,lastLogon
S-1-5-21-1-500,Administrator,
S-1-5-21-1-501,"Guest, local","#error: expected 8 bytes, got 3"
"##);
    }

    #[test]
    fn writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("accounts.csv");
        save_rows_csv(&path, &rows(), AttributeSelection::SAM_ACCOUNT_NAME).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("sAMAccountName\n"));
        assert!(content.contains("Administrator"));
    }

    #[test]
    fn unwritable_path_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("accounts.csv");
        assert!(save_rows_csv(&path, &rows(), AttributeSelection::OBJECT_SID).is_err());
    }
}
