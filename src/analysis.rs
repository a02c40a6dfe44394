//! Grouped statistics and insight computation over the processed dataset
//!
//! Every function here is a pure, read-only pass over a `&[Record]` slice:
//! nothing caches state between calls and the input is never mutated. The
//! result types double as the contract with the chart layer and the printed
//! report.

use ndarray::Array2;

use crate::error::Error;
use crate::schema::{AgeGroup, BmiCategory, GroupKey, Record, Region, Sex, SmokerStatus};
use crate::stats::{mean, median, pearson, quantile, round2, round3, sample_std};

/// Numeric columns of the processed dataset, in report order.
pub const NUMERIC_COLUMNS: [&str; 6] = [
    "age",
    "bmi",
    "children",
    "charges",
    "is_smoker",
    "charges_per_person",
];

/// Aggregate of `charges` for one category of a grouping factor.
/// All values rounded to 2 decimal places.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub key: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Charge aggregates for every non-empty category of one factor, in fixed
/// category order (enum declaration order; ascending for `children`).
#[derive(Debug, Clone)]
pub struct GroupStatistics {
    pub factor: GroupKey,
    pub groups: Vec<GroupSummary>,
}

/// Descriptive summary of one numeric column (pandas-style describe row).
#[derive(Debug, Clone)]
pub struct ColumnSummary {
    pub column: &'static str,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Smoker vs non-smoker charge comparison.
#[derive(Debug, Clone)]
pub struct SmokerImpact {
    pub smoker_mean: f64,
    pub non_smoker_mean: f64,
    pub difference: f64,
    pub percent_increase: f64,
    pub smoker_count: usize,
    pub non_smoker_count: usize,
}

/// Pearson correlation over the numeric columns, rounded to 3 decimals.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<&'static str>,
    pub values: Array2<f64>,
}

/// Per-record projection consumed by the age/charges scatter chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub age: u32,
    pub bmi: f64,
    pub charges: f64,
    pub smoker: bool,
}

/// Consolidated summary the report and chart layers consume.
#[derive(Debug, Clone)]
pub struct KeyInsights {
    pub total_records: usize,
    pub avg_age: f64,
    pub avg_bmi: f64,
    pub avg_charges: f64,
    pub median_charges: f64,
    pub smoker_percentage: f64,
    pub smoker_charge_increase: f64,
    pub youngest_age: u32,
    pub oldest_age: u32,
    pub min_bmi: f64,
    pub max_bmi: f64,
    pub min_charges: f64,
    pub max_charges: f64,
    pub charges_range: f64,
    pub gender_distribution: Vec<(Sex, usize)>,
    pub regional_distribution: Vec<(Region, usize)>,
}

fn column_values(records: &[Record], column: &str) -> Vec<f64> {
    records
        .iter()
        .map(|r| match column {
            "age" => f64::from(r.age),
            "bmi" => r.bmi,
            "children" => f64::from(r.children),
            "charges" => r.charges,
            "is_smoker" => f64::from(r.is_smoker),
            "charges_per_person" => r.charges_per_person,
            other => unreachable!("not a numeric column: {other}"),
        })
        .collect()
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

/// Descriptive summary of every numeric column.
pub fn basic_statistics(records: &[Record]) -> Vec<ColumnSummary> {
    NUMERIC_COLUMNS
        .iter()
        .map(|&column| {
            let values = column_values(records, column);
            let (min, max) = min_max(&values);
            ColumnSummary {
                column,
                count: values.len(),
                mean: mean(&values).unwrap_or(0.0),
                std: sample_std(&values).unwrap_or(0.0),
                min: if values.is_empty() { 0.0 } else { min },
                q1: quantile(&values, 0.25).unwrap_or(0.0),
                median: median(&values).unwrap_or(0.0),
                q3: quantile(&values, 0.75).unwrap_or(0.0),
                max: if values.is_empty() { 0.0 } else { max },
            }
        })
        .collect()
}

/// Aggregate `charges` per category of `factor`.
///
/// Records with no bucket under the factor (out-of-range BMI or age) are
/// left out of every group; empty categories are omitted.
pub fn charges_by_factor(records: &[Record], factor: GroupKey) -> GroupStatistics {
    let labels: Vec<String> = match factor {
        GroupKey::Sex => Sex::ALL.iter().map(ToString::to_string).collect(),
        GroupKey::Smoker => SmokerStatus::ALL.iter().map(ToString::to_string).collect(),
        GroupKey::Region => Region::ALL.iter().map(ToString::to_string).collect(),
        GroupKey::BmiCategory => BmiCategory::ALL.iter().map(ToString::to_string).collect(),
        GroupKey::AgeGroup => AgeGroup::ALL.iter().map(ToString::to_string).collect(),
        GroupKey::Children => {
            let mut counts: Vec<u32> = records.iter().map(|r| r.children).collect();
            counts.sort_unstable();
            counts.dedup();
            counts.iter().map(ToString::to_string).collect()
        }
    };

    let mut groups = Vec::with_capacity(labels.len());
    for label in labels {
        let charges: Vec<f64> = records
            .iter()
            .filter(|r| factor.label_for(r).as_deref() == Some(label.as_str()))
            .map(|r| r.charges)
            .collect();
        if charges.is_empty() {
            continue;
        }

        let (min, max) = min_max(&charges);
        groups.push(GroupSummary {
            key: label,
            count: charges.len(),
            mean: round2(mean(&charges).unwrap_or(0.0)),
            median: round2(median(&charges).unwrap_or(0.0)),
            std: round2(sample_std(&charges).unwrap_or(0.0)),
            min: round2(min),
            max: round2(max),
        });
    }

    GroupStatistics { factor, groups }
}

/// Compare mean charges between smokers and non-smokers.
///
/// Fails with [`Error::DivisionByZero`] when there is no non-smoker record
/// to anchor the ratio, rather than yielding a silent NaN.
pub fn smoker_impact(records: &[Record]) -> crate::Result<SmokerImpact> {
    let smoker: Vec<f64> = records
        .iter()
        .filter(|r| r.smoker == SmokerStatus::Yes)
        .map(|r| r.charges)
        .collect();
    let non_smoker: Vec<f64> = records
        .iter()
        .filter(|r| r.smoker == SmokerStatus::No)
        .map(|r| r.charges)
        .collect();

    let Some(non_smoker_mean) = mean(&non_smoker) else {
        return Err(Error::DivisionByZero(
            "smoker impact requires at least one non-smoker record",
        ));
    };
    let smoker_mean = mean(&smoker).unwrap_or(0.0);

    Ok(SmokerImpact {
        smoker_mean,
        non_smoker_mean,
        difference: smoker_mean - non_smoker_mean,
        percent_increase: (smoker_mean / non_smoker_mean - 1.0) * 100.0,
        smoker_count: smoker.len(),
        non_smoker_count: non_smoker.len(),
    })
}

/// Charges grouped by BMI category.
///
/// Fails with [`Error::MissingDerivedFeature`] when a non-empty dataset has
/// no `bmi_category` value at all (every BMI fell outside the bucket range).
pub fn bmi_impact(records: &[Record]) -> crate::Result<GroupStatistics> {
    if !records.is_empty() && records.iter().all(|r| r.bmi_category.is_none()) {
        return Err(Error::MissingDerivedFeature("bmi_category"));
    }
    Ok(charges_by_factor(records, GroupKey::BmiCategory))
}

/// Charges grouped by age group; same contract as [`bmi_impact`].
pub fn age_impact(records: &[Record]) -> crate::Result<GroupStatistics> {
    if !records.is_empty() && records.iter().all(|r| r.age_group.is_none()) {
        return Err(Error::MissingDerivedFeature("age_group"));
    }
    Ok(charges_by_factor(records, GroupKey::AgeGroup))
}

/// Charges grouped by region.
pub fn regional_differences(records: &[Record]) -> GroupStatistics {
    charges_by_factor(records, GroupKey::Region)
}

/// Charges grouped by number of dependents.
pub fn children_impact(records: &[Record]) -> GroupStatistics {
    charges_by_factor(records, GroupKey::Children)
}

/// Pearson correlation matrix over the numeric columns.
///
/// Symmetric with a 1.0 diagonal; a zero-variance column correlates 0.0
/// with everything so the matrix stays free of NaN.
pub fn correlation_matrix(records: &[Record]) -> CorrelationMatrix {
    let series: Vec<Vec<f64>> = NUMERIC_COLUMNS
        .iter()
        .map(|&column| column_values(records, column))
        .collect();

    let n = NUMERIC_COLUMNS.len();
    let mut values = Array2::zeros((n, n));
    for i in 0..n {
        values[[i, i]] = 1.0;
        for j in (i + 1)..n {
            let r = round3(pearson(&series[i], &series[j]).unwrap_or(0.0));
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }

    CorrelationMatrix {
        columns: NUMERIC_COLUMNS.to_vec(),
        values,
    }
}

/// Records whose charges reach the given percentile of the full charges
/// distribution (inclusive threshold).
///
/// `percentile` is on the 0-100 scale; anything outside fails with
/// [`Error::InvalidArgument`].
pub fn high_risk_profiles(records: &[Record], percentile: f64) -> crate::Result<Vec<Record>> {
    if !(0.0..=100.0).contains(&percentile) {
        return Err(Error::InvalidArgument(format!(
            "percentile must be within [0, 100], got {percentile}"
        )));
    }

    let charges: Vec<f64> = records.iter().map(|r| r.charges).collect();
    let Some(threshold) = quantile(&charges, percentile / 100.0) else {
        return Ok(Vec::new());
    };

    Ok(records
        .iter()
        .filter(|r| r.charges >= threshold)
        .cloned()
        .collect())
}

fn frequency<T: Copy + PartialEq>(records: &[Record], variants: &[T], of: impl Fn(&Record) -> T) -> Vec<(T, usize)> {
    let mut counts: Vec<(T, usize)> = variants
        .iter()
        .map(|&v| (v, records.iter().filter(|r| of(r) == v).count()))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Consolidated dataset summary.
///
/// Pure composition of the primitives above; the field set is the contract
/// with the report printer. Propagates [`Error::DivisionByZero`] from
/// [`smoker_impact`] on datasets without non-smokers (including empty ones).
pub fn key_insights(records: &[Record]) -> crate::Result<KeyInsights> {
    let impact = smoker_impact(records)?;
    let total = records.len();

    let ages = column_values(records, "age");
    let bmis = column_values(records, "bmi");
    let charges = column_values(records, "charges");
    let (min_bmi, max_bmi) = min_max(&bmis);
    let (min_charges, max_charges) = min_max(&charges);

    Ok(KeyInsights {
        total_records: total,
        avg_age: mean(&ages).unwrap_or(0.0),
        avg_bmi: mean(&bmis).unwrap_or(0.0),
        avg_charges: mean(&charges).unwrap_or(0.0),
        median_charges: median(&charges).unwrap_or(0.0),
        smoker_percentage: impact.smoker_count as f64 / total as f64 * 100.0,
        smoker_charge_increase: impact.percent_increase,
        youngest_age: records.iter().map(|r| r.age).min().unwrap_or(0),
        oldest_age: records.iter().map(|r| r.age).max().unwrap_or(0),
        min_bmi,
        max_bmi,
        min_charges,
        max_charges,
        charges_range: max_charges - min_charges,
        gender_distribution: frequency(records, &Sex::ALL, |r| r.sex),
        regional_distribution: frequency(records, &Region::ALL, |r| r.region),
    })
}

/// Per-record age/bmi/charges/smoker projection for scatter charts.
pub fn scatter_points(records: &[Record]) -> Vec<ScatterPoint> {
    records
        .iter()
        .map(|r| ScatterPoint {
            age: r.age,
            bmi: r.bmi,
            charges: r.charges,
            smoker: r.smoker == SmokerStatus::Yes,
        })
        .collect()
}
