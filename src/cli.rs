//! Command-line interface definitions and argument parsing

use clap::Parser;

use crate::schema::GroupKey;

/// Insurance charge analytics CLI over policyholder CSV data
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "data/insurance.csv")]
    pub input: String,

    /// Path for the processed dataset CSV
    #[arg(short, long, default_value = "output/processed.csv")]
    pub output: String,

    /// Directory for the generated charts
    #[arg(long, default_value = "charts")]
    pub chart_dir: String,

    /// Percentile threshold for the high-risk profile listing
    #[arg(short, long, default_value = "75")]
    pub percentile: f64,

    /// Print a single grouped-charges table for this factor and exit.
    /// One of: sex, smoker, region, bmi_category, age_group, children
    #[arg(short, long)]
    pub factor: Option<String>,

    /// Skip chart generation
    #[arg(long)]
    pub no_charts: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse the `--factor` flag into a grouping key.
    /// Unknown names are rejected here, before any data is read.
    pub fn parse_factor(&self) -> crate::Result<Option<GroupKey>> {
        self.factor
            .as_deref()
            .map(|name| name.parse::<GroupKey>())
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_factor() {
        let mut args = Args {
            input: "test.csv".to_string(),
            output: "out.csv".to_string(),
            chart_dir: "charts".to_string(),
            percentile: 75.0,
            factor: Some("smoker".to_string()),
            no_charts: false,
            verbose: false,
        };

        assert_eq!(args.parse_factor().unwrap(), Some(GroupKey::Smoker));

        args.factor = None;
        assert_eq!(args.parse_factor().unwrap(), None);

        args.factor = Some("postcode".to_string());
        assert!(matches!(
            args.parse_factor().unwrap_err(),
            Error::UnknownField(_)
        ));
    }
}
