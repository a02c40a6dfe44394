//! Extract, transform, and load steps for the policyholder dataset

use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::schema::{RawRecord, Record, Region, Sex, SmokerStatus};

/// Outcome of the transform step: the cleaned records plus the row accounting
/// the caller reports on.
#[derive(Debug)]
pub struct TransformReport {
    /// Cleaned records, in input order.
    pub records: Vec<Record>,
    /// Raw rows that entered the transform.
    pub rows_in: usize,
    /// Rows dropped because at least one of the seven fields was empty.
    pub dropped_missing: usize,
    /// Rows dropped for an out-of-domain categorical or non-positive
    /// age/bmi/charges value.
    pub dropped_invalid: usize,
}

impl TransformReport {
    /// Total rows removed by cleaning.
    pub fn dropped(&self) -> usize {
        self.dropped_missing + self.dropped_invalid
    }
}

/// Read the raw dataset from a CSV file.
///
/// The header must carry the seven raw field names (age, sex, bmi, children,
/// smoker, region, charges). Rows come back in file order with empty cells as
/// `None`; no cleaning happens here.
///
/// Fails with [`Error::DataNotFound`] when `path` does not exist and
/// [`Error::DataFormat`] when the contents cannot be parsed as tabular data.
pub fn extract(path: impl AsRef<Path>) -> crate::Result<Vec<RawRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::DataNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| Error::DataFormat {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        let row: RawRecord = row.map_err(|source| Error::DataFormat {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(row);
    }

    log::info!("extracted {} records from {}", rows.len(), path.display());
    Ok(rows)
}

/// Clean the raw rows and compute the derived features.
///
/// Three passes folded into one loop, in contract order per row:
/// 1. completeness filter: any empty field drops the row;
/// 2. categorical typing: out-of-domain `sex`/`smoker`/`region` values and
///    non-positive `age`/`bmi`/`charges` drop the row;
/// 3. derived features (`bmi_category`, `age_group`, `is_smoker`,
///    `charges_per_person`) via [`Record::new`].
///
/// The raw slice is never mutated; surviving rows keep their input order.
pub fn transform(raw: &[RawRecord]) -> TransformReport {
    let mut records = Vec::with_capacity(raw.len());
    let mut dropped_missing = 0;
    let mut dropped_invalid = 0;

    for row in raw {
        let (
            Some(age),
            Some(sex),
            Some(bmi),
            Some(children),
            Some(smoker),
            Some(region),
            Some(charges),
        ) = (
            row.age,
            row.sex.as_deref(),
            row.bmi,
            row.children,
            row.smoker.as_deref(),
            row.region.as_deref(),
            row.charges,
        )
        else {
            dropped_missing += 1;
            continue;
        };

        let (Some(sex), Some(smoker), Some(region)) = (
            Sex::from_raw(sex),
            SmokerStatus::from_raw(smoker),
            Region::from_raw(region),
        ) else {
            dropped_invalid += 1;
            continue;
        };

        let (Ok(age), Ok(children)) = (u32::try_from(age), u32::try_from(children)) else {
            dropped_invalid += 1;
            continue;
        };
        if age == 0 || bmi <= 0.0 || charges <= 0.0 {
            dropped_invalid += 1;
            continue;
        }

        records.push(Record::new(age, sex, bmi, children, smoker, region, charges));
    }

    if dropped_missing > 0 {
        log::info!("removed {dropped_missing} rows with missing values");
    }
    if dropped_invalid > 0 {
        log::info!("removed {dropped_invalid} rows with out-of-domain values");
    }
    log::info!("transformed data down to {} records", records.len());

    TransformReport {
        records,
        rows_in: raw.len(),
        dropped_missing,
        dropped_invalid,
    }
}

/// Write the processed dataset to a CSV file.
///
/// Output is the 11-column layout (7 raw + 4 derived) with a header row.
/// Parent directories are created as needed, and the write goes through a
/// temp file renamed into place so the target never holds a partial dataset.
pub fn load(path: impl AsRef<Path>, records: &[Record]) -> crate::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("tmp");
    let mut writer = csv::Writer::from_path(&tmp_path).map_err(|source| Error::LoadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    for record in records {
        writer.serialize(record).map_err(|source| Error::LoadFailed {
            path: path.to_path_buf(),
            source,
        })?;
    }
    writer.flush()?;
    drop(writer);
    fs::rename(&tmp_path, path)?;

    log::info!("loaded {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AgeGroup, BmiCategory};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "age,sex,bmi,children,smoker,region,charges").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file
    }

    #[test]
    fn test_extract_reads_all_rows() {
        let file = create_test_csv(&[
            "30,male,22,0,no,northwest,3000",
            "50,female,31,2,yes,southeast,20000",
        ]);
        let rows = extract(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].age, Some(30));
        assert_eq!(rows[1].region.as_deref(), Some("southeast"));
    }

    #[test]
    fn test_extract_missing_file() {
        let err = extract("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, Error::DataNotFound { .. }));
    }

    #[test]
    fn test_extract_unparseable_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "age,sex,bmi,children,smoker,region,charges").unwrap();
        writeln!(file, "not-a-number,male,22,0,no,northwest,3000").unwrap();

        let err = extract(file.path()).unwrap_err();
        assert!(matches!(err, Error::DataFormat { .. }));
    }

    #[test]
    fn test_transform_drops_incomplete_rows() {
        let file = create_test_csv(&[
            "30,male,22,0,no,northwest,3000",
            "44,,25.3,1,no,southwest,7500",
            "50,female,31,2,yes,southeast,",
            "20,male,17,0,no,northeast,1500",
        ]);
        let raw = extract(file.path()).unwrap();
        let report = transform(&raw);

        assert_eq!(report.rows_in, 4);
        assert_eq!(report.dropped_missing, 2);
        assert_eq!(report.dropped_invalid, 0);
        assert_eq!(report.records.len(), 2);
        // Survivors keep their input order and values
        assert_eq!(report.records[0].age, 30);
        assert_eq!(report.records[1].age, 20);
    }

    #[test]
    fn test_transform_drops_out_of_domain_categoricals() {
        let file = create_test_csv(&[
            "30,male,22,0,no,northwest,3000",
            "41,other,24,1,no,southwest,6000",
            "33,female,26,0,occasionally,northeast,8000",
            "29,male,23,0,no,atlantis,4000",
        ]);
        let raw = extract(file.path()).unwrap();
        let report = transform(&raw);

        assert_eq!(report.dropped_missing, 0);
        assert_eq!(report.dropped_invalid, 3);
        assert_eq!(report.records.len(), 1);
    }

    #[test]
    fn test_transform_drops_non_positive_numerics() {
        let file = create_test_csv(&[
            "0,male,22,0,no,northwest,3000",
            "-3,male,22,0,no,northwest,3000",
            "30,male,-1.5,0,no,northwest,3000",
            "30,male,22,0,no,northwest,0",
            "30,male,22,-1,no,northwest,3000",
        ]);
        let raw = extract(file.path()).unwrap();
        let report = transform(&raw);

        assert_eq!(report.dropped_invalid, 5);
        assert!(report.records.is_empty());
    }

    #[test]
    fn test_transform_derives_features() {
        let file = create_test_csv(&[
            "30,male,22,0,no,northwest,3000",
            "50,female,31,2,yes,southeast,20000",
            "20,male,17,0,no,northeast,1500",
        ]);
        let raw = extract(file.path()).unwrap();
        let report = transform(&raw);
        let records = &report.records;

        let categories: Vec<_> = records.iter().map(|r| r.bmi_category).collect();
        assert_eq!(
            categories,
            vec![
                Some(BmiCategory::Normal),
                Some(BmiCategory::Obese),
                Some(BmiCategory::Underweight),
            ]
        );

        let groups: Vec<_> = records.iter().map(|r| r.age_group).collect();
        assert_eq!(
            groups,
            vec![
                Some(AgeGroup::Age26To35),
                Some(AgeGroup::Age46To55),
                Some(AgeGroup::Age18To25),
            ]
        );

        assert_eq!(records[0].charges_per_person, 3000.0);
        assert!((records[1].charges_per_person - 6666.666_666_666_667).abs() < 1e-9);
        assert_eq!(records[2].charges_per_person, 1500.0);
    }

    #[test]
    fn test_load_writes_eleven_columns() {
        let file = create_test_csv(&["30,male,22,0,no,northwest,3000"]);
        let raw = extract(file.path()).unwrap();
        let report = transform(&raw);

        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("nested").join("processed.csv");
        load(&out_path, &report.records).unwrap();

        let contents = fs::read_to_string(&out_path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "age,sex,bmi,children,smoker,region,charges,\
             bmi_category,age_group,is_smoker,charges_per_person"
        );
        assert_eq!(
            lines.next().unwrap(),
            "30,male,22.0,0,no,northwest,3000.0,Normal,26-35,0,3000.0"
        );
    }

    #[test]
    fn test_roundtrip_load_then_extract_raw_columns() {
        let file = create_test_csv(&["50,female,31,2,yes,southeast,20000"]);
        let raw = extract(file.path()).unwrap();
        let report = transform(&raw);

        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("processed.csv");
        load(&out_path, &report.records).unwrap();

        // The processed file is itself extractable: extra derived columns are
        // simply ignored by the raw schema.
        let reread = extract(&out_path).unwrap();
        assert_eq!(reread.len(), 1);
        assert_eq!(reread[0].age, Some(50));
        assert_eq!(reread[0].smoker.as_deref(), Some("yes"));
    }
}
