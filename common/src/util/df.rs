use itertools::Itertools;
use polars::error::{PolarsError, PolarsResult};
use polars::frame::DataFrame;
use polars::io::SerWriter;
use polars::prelude::{col, CsvWriter, IntoLazy, ParquetWriter, SortMultipleOptions};
use std::fs::{create_dir_all, File};
use std::path::PathBuf;

/// Compare two dataframes without regard to the ordering of columns and/or rows
pub fn equivalent(lhs: &DataFrame, rhs: &DataFrame, ignore_col_order: bool, ignore_row_order: bool) -> PolarsResult<bool> {
    fn normalize_col_order(frame: &DataFrame) -> PolarsResult<DataFrame> {
        frame.clone().lazy()
            .select( // Select all columns, but with a specific order
                frame.get_column_names().into_iter()
                    .sorted() // This sorting step ensures the same ordering
                    .map(|n| col(n.clone()))
                    .collect_vec(),
            )
            .collect()
    }

    fn normalize_row_order(frame: &DataFrame) -> PolarsResult<DataFrame> {
        frame.clone().lazy()
            // Sort by all columns
            .sort(
                frame.get_columns().iter()
                    .filter(|col| !col.dtype().is_list())
                    .map(|col| col.name()).cloned()
                    .collect_vec(),
                SortMultipleOptions::default()
            )
            .collect()
    }

    let (lhs, rhs) = if ignore_col_order {
        (&normalize_col_order(lhs)?, &normalize_col_order(rhs)?)
    } else { (lhs, rhs) };

    let (lhs, rhs) = if ignore_row_order {
        (&normalize_row_order(lhs)?, &normalize_row_order(rhs)?)
    } else { (lhs, rhs) };

    Ok(lhs.equals_missing(rhs))
}

/// Read a `u32` column into a vec. Null values are an error, since all id columns are required.
pub fn u32_values(frame: &DataFrame, name: &str) -> PolarsResult<Vec<u32>> {
    frame.column(name)?
        .as_materialized_series()
        .u32()?
        .iter()
        .map(|value| value.ok_or_else(|| null_error(name)))
        .collect()
}

/// Read a `f64` column into a vec. Null values are an error.
pub fn f64_values(frame: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    frame.column(name)?
        .as_materialized_series()
        .f64()?
        .iter()
        .map(|value| value.ok_or_else(|| null_error(name)))
        .collect()
}

fn null_error(name: &str) -> PolarsError {
    PolarsError::ComputeError(format!("Column '{name}' contains null values").into())
}

pub enum FileType {
    CSV,
    PARQUET,
}

impl FileType {
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::CSV => "csv",
            FileType::PARQUET => "parquet",
        }
    }
}

pub fn write_df_to_file(
    path: PathBuf,
    format: FileType,
    mut df: DataFrame
) -> Result<(), PolarsError> {
    let mut file = prepare_file(path)?;

    match format {
        FileType::CSV => {
            CsvWriter::new(&mut file).finish(&mut df)?;
        },
        FileType::PARQUET => {
            ParquetWriter::new(&mut file).finish(&mut df)?;
        },
    };

    Ok(())
}

pub fn prepare_file(
    path: PathBuf,
) -> Result<File, std::io::Error> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let file = File::create(path)?;

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_equivalent_ignores_order() {
        let lhs = df!(
            "cluster_id" => &[0u32, 1, 2],
            "lat" => &[0.5f64, 1.5, 2.5],
        ).unwrap();
        let rhs = df!(
            "lat" => &[2.5f64, 0.5, 1.5],
            "cluster_id" => &[2u32, 0, 1],
        ).unwrap();

        assert!(equivalent(&lhs, &rhs, true, true).unwrap());
        assert!(!equivalent(&lhs, &rhs, true, false).unwrap());
    }

    #[test]
    fn test_column_values() {
        let frame = df!(
            "stop_id" => &[Some(3u32), Some(4)],
            "lat" => &[Some(1.0f64), None],
        ).unwrap();

        assert_eq!(u32_values(&frame, "stop_id").unwrap(), vec![3, 4]);
        assert!(f64_values(&frame, "lat").is_err());
        assert!(u32_values(&frame, "missing").is_err());
    }

    #[test]
    fn test_write_csv_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("frame.csv");
        let frame = df!("stop_id" => &[1u32, 2]).unwrap();

        write_df_to_file(path.clone(), FileType::CSV, frame).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().next(), Some("stop_id"));
        assert_eq!(written.lines().count(), 3);
    }
}
