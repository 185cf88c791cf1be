//! Raw match data loading
//!
//! Reads tabular CSV files with the sport-specific column vocabulary
//! (ATP-style headers such as `w_1stIn`). Unknown columns are ignored and
//! absent columns or empty cells become missing values; only the total
//! absence of input files is fatal.

use crate::{RawMatch, Result, SportcastError};
use std::io::Read;
use std::path::Path;

/// Read match records from a single CSV file, preserving row order
pub fn read_file(path: &str) -> Result<Vec<RawMatch>> {
    let file = std::fs::File::open(path)
        .map_err(|e| SportcastError::NoData(format!("{}: {}", path, e)))?;
    let records = read_csv(file)?;
    log::info!("Loaded {} matches from {}", records.len(), path);
    Ok(records)
}

/// Read match records from any CSV source
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawMatch>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize() {
        let record: RawMatch = row?;
        records.push(record);
    }
    Ok(records)
}

/// Load and concatenate the given files in argument order
///
/// An empty file list is a fatal condition; per-field problems are not.
pub fn load_files(paths: &[String]) -> Result<Vec<RawMatch>> {
    if paths.is_empty() {
        return Err(SportcastError::NoData("no input files given".to_string()));
    }

    let mut records = Vec::new();
    for path in paths {
        records.extend(read_file(path)?);
    }
    Ok(records)
}

/// Load every .csv file in a directory, in lexicographic name order
pub fn load_dir(dir: &str) -> Result<Vec<RawMatch>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| SportcastError::NoData(format!("{}: {}", dir, e)))?;

    let mut paths: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "csv").unwrap_or(false))
        .filter_map(|p| p.to_str().map(String::from))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(SportcastError::NoData(format!(
            "no .csv files found in {}",
            dir
        )));
    }

    load_files(&paths)
}

/// Resolve input files: explicit paths if given, else the sport data dir
pub fn resolve_inputs(files: &[String], default_dir: &str) -> Result<Vec<RawMatch>> {
    if files.is_empty() {
        if !Path::new(default_dir).is_dir() {
            return Err(SportcastError::NoData(format!(
                "no files given and {} does not exist",
                default_dir
            )));
        }
        load_dir(default_dir)
    } else {
        load_files(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_full_row() {
        let data = "\
winner_name,loser_name,surface,best_of,winner_rank,loser_rank,w_1stIn,w_1stWon,l_1stIn,l_1stWon
Alpha,Beta,Clay,3,10,50,40,30,35,15
";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        let m = &records[0];
        assert_eq!(m.winner_name.as_deref(), Some("Alpha"));
        assert_eq!(m.surface.as_deref(), Some("Clay"));
        assert_eq!(m.winner_rank, Some(10.0));
        assert_eq!(m.w_first_in, Some(40.0));
        assert_eq!(m.l_first_won, Some(15.0));
    }

    #[test]
    fn test_empty_cells_become_missing() {
        let data = "\
winner_rank,loser_rank,surface
,50,Hard
10,,
";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].winner_rank, None);
        assert_eq!(records[0].loser_rank, Some(50.0));
        assert_eq!(records[1].loser_rank, None);
        assert_eq!(records[1].surface, None);
    }

    #[test]
    fn test_absent_columns_tolerated() {
        // Basketball-style file with no serve statistics at all
        let data = "\
winner_name,loser_name,winner_rank,loser_rank
Hawks,Kings,3,12
";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].w_first_in, None);
        assert_eq!(records[0].winner_rank, Some(3.0));
    }

    #[test]
    fn test_unknown_columns_ignored() {
        let data = "\
tourney_id,winner_name,loser_name,winner_rank,loser_rank,minutes
2024-001,Alpha,Beta,1,2,95
";
        let records = read_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].winner_rank, Some(1.0));
    }

    #[test]
    fn test_no_files_is_fatal() {
        assert!(load_files(&[]).is_err());
    }
}
