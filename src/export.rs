// 📤 CSV Export - catalog and price history
//
// Mirrors the CSV import path in reverse: one header row, one record per line.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::menu::{MenuItem, PriceHistoryEntry};

#[derive(Serialize)]
struct CatalogRow<'a> {
    #[serde(rename = "Id")]
    id: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Price")]
    price: f64,
}

#[derive(Serialize)]
struct HistoryRow<'a> {
    #[serde(rename = "Item_Id")]
    item_id: &'a str,
    #[serde(rename = "Old_Price")]
    old_price: f64,
    #[serde(rename = "New_Price")]
    new_price: f64,
    #[serde(rename = "Changed_By")]
    changed_by: &'a str,
    #[serde(rename = "Changed_At")]
    changed_at: String,
}

pub fn write_catalog_csv<W: Write>(writer: W, items: &[MenuItem]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    for item in items {
        wtr.serialize(CatalogRow {
            id: &item.id,
            name: &item.name,
            category: item.category.as_str(),
            price: item.price,
        })?;
    }
    wtr.flush()?;
    Ok(items.len())
}

pub fn write_history_csv<W: Write>(writer: W, history: &[PriceHistoryEntry]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in history {
        wtr.serialize(HistoryRow {
            item_id: &entry.item_id,
            old_price: entry.old_price,
            new_price: entry.new_price,
            changed_by: &entry.changed_by,
            changed_at: entry.changed_at.to_rfc3339(),
        })?;
    }
    wtr.flush()?;
    Ok(history.len())
}

pub fn export_catalog(path: &Path, items: &[MenuItem]) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_catalog_csv(file, items)
}

pub fn export_history(path: &Path, history: &[PriceHistoryEntry]) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_history_csv(file, history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{default_catalog, MenuCategory};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_catalog_csv() {
        let items = vec![MenuItem::new("tequenos", "Tequeños, con Guacamole", 22.0, MenuCategory::Starter)];
        let mut out = Vec::new();
        let written = write_catalog_csv(&mut out, &items).unwrap();

        assert_eq!(written, 1);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Id,Name,Category,Price");
        // Comma in the name forces quoting
        assert_eq!(lines[1], "tequenos,\"Tequeños, con Guacamole\",starter,22.0");
    }

    #[test]
    fn test_history_csv() {
        let history = vec![PriceHistoryEntry {
            item_id: "pollo-parrilla".to_string(),
            old_price: 50.0,
            new_price: 55.0,
            changed_by: "chef1".to_string(),
            changed_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        }];
        let mut out = Vec::new();
        write_history_csv(&mut out, &history).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Item_Id,Old_Price,New_Price,Changed_By,Changed_At\n\
             pollo-parrilla,50.0,55.0,chef1,2026-03-01T12:00:00+00:00\n"
        );
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");

        let count = export_catalog(&path, &default_catalog()).unwrap();
        assert_eq!(count, default_catalog().len());

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        assert_eq!(rdr.records().count(), count);
    }
}
