use crate::models::RawRow;
use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save table rows as CSV, indicator columns in the given display order.
pub fn save_csv<P: AsRef<Path>>(rows: &[RawRow], index_columns: &[String], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    let mut header = vec!["country_code", "country_name", "continent", "year"];
    header.extend(index_columns.iter().map(String::as_str));
    wtr.write_record(&header)?;
    for row in rows {
        let mut record = vec![
            row.country_code.clone(),
            row.country_name.clone(),
            row.continent.clone().unwrap_or_default(),
            row.year.to_string(),
        ];
        for column in index_columns {
            record.push(match row.value(column) {
                Some(v) => v.to_string(),
                None => String::new(),
            });
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save table rows as a pretty JSON array.
pub fn save_json<P: AsRef<Path>>(rows: &[RawRow], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let mut values = BTreeMap::new();
        values.insert("gdp".to_string(), Some(1.23));
        values.insert("corruption".to_string(), None);
        let rows = vec![RawRow {
            country_code: "DEU".into(),
            country_name: "Germany".into(),
            country_display_name: "Germany".into(),
            continent: Some("Europe".into()),
            flag: String::new(),
            year: 2020,
            values,
        }];
        let columns = vec!["gdp".to_string(), "corruption".to_string()];
        save_csv(&rows, &columns, &csvp).unwrap();
        save_json(&rows, &jsonp).unwrap();
        let written = std::fs::read_to_string(&csvp).unwrap();
        assert!(written.starts_with("country_code,country_name,continent,year,gdp,corruption"));
        assert!(written.contains("DEU,Germany,Europe,2020,1.23,"));
        assert!(jsonp.exists());
    }
}
