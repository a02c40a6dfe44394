//! RiskForge: Insurance charge analytics over policyholder CSV data
//!
//! This is the main entrypoint that orchestrates extraction, transformation,
//! loading, analysis, and chart generation.

use anyhow::Result;
use clap::Parser;
use riskforge::analysis::{
    self, CorrelationMatrix, GroupStatistics, KeyInsights, SmokerImpact,
};
use riskforge::{etl, viz, Args, GroupKey, Record};
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    if args.verbose {
        println!("RiskForge - Insurance Charge Analytics");
        println!("======================================\n");
    }

    // Check if in single-factor mode
    if let Some(factor) = args.parse_factor()? {
        run_factor_mode(&args, factor)?;
    } else {
        run_full_pipeline(&args)?;
    }

    Ok(())
}

/// Run single-factor mode: one grouped-charges table, no report or charts
fn run_factor_mode(args: &Args, factor: GroupKey) -> Result<()> {
    println!("=== Factor Mode ===");
    println!("Grouping charges by: {factor}");

    let raw = etl::extract(&args.input)?;
    let report = etl::transform(&raw);
    if args.verbose {
        println!(
            "Loaded {} rows, kept {} after cleaning",
            report.rows_in,
            report.records.len()
        );
    }

    let stats = analysis::charges_by_factor(&report.records, factor);
    print_group_table(&stats);

    Ok(())
}

/// Run the full ETL + analysis pipeline
fn run_full_pipeline(args: &Args) -> Result<()> {
    println!("=== Full Analytics Pipeline ===\n");

    let start_time = Instant::now();

    // Step 1: Extract
    if args.verbose {
        println!("Step 1: Extracting data");
        println!("  Input file: {}", args.input);
    }

    let extract_start = Instant::now();
    let raw = etl::extract(&args.input)?;
    let extract_time = extract_start.elapsed();

    println!("✓ Extracted {} records", raw.len());
    if args.verbose {
        println!("  Extraction time: {:.2}s", extract_time.as_secs_f64());
    }

    // Step 2: Transform
    if args.verbose {
        println!("\nStep 2: Transforming data");
    }

    let report = etl::transform(&raw);
    println!(
        "✓ Transformed data: {} records kept, {} dropped ({} missing, {} invalid)",
        report.records.len(),
        report.dropped(),
        report.dropped_missing,
        report.dropped_invalid
    );

    // Step 3: Load the processed dataset
    if args.verbose {
        println!("\nStep 3: Loading processed data");
        println!("  Output file: {}", args.output);
    }

    etl::load(&args.output, &report.records)?;
    println!("✓ Loaded {} records to {}", report.records.len(), args.output);

    // Step 4: Analysis report
    print_report(&report.records, args.percentile, args.verbose)?;

    // Step 5: Charts
    if !args.no_charts {
        if args.verbose {
            println!("\nStep 5: Generating charts");
            println!("  Chart directory: {}", args.chart_dir);
        }

        let chart_start = Instant::now();
        viz::generate_charts(&report.records, &args.chart_dir)?;
        let chart_time = chart_start.elapsed();

        println!("\n✓ Charts generated in {}", args.chart_dir);
        if args.verbose {
            println!("  Chart time: {:.2}s", chart_time.as_secs_f64());
        }
    }

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}

/// Print the comprehensive analysis report
fn print_report(records: &[Record], percentile: f64, verbose: bool) -> Result<()> {
    let insights = analysis::key_insights(records)?;
    let impact = analysis::smoker_impact(records)?;

    print_insights(&insights, &impact);

    if verbose {
        print_basic_statistics(&analysis::basic_statistics(records));
    }

    print_group_table(&analysis::charges_by_factor(records, GroupKey::Smoker));
    print_group_table(&analysis::regional_differences(records));
    print_group_table(&analysis::bmi_impact(records)?);
    print_group_table(&analysis::age_impact(records)?);
    print_group_table(&analysis::children_impact(records));

    print_correlation(&analysis::correlation_matrix(records));

    let high_risk = analysis::high_risk_profiles(records, percentile)?;
    println!("\n=== High-Risk Profiles ===");
    println!(
        "{} records at or above the {percentile}th charges percentile ({:.1}% of dataset)",
        high_risk.len(),
        high_risk.len() as f64 / records.len() as f64 * 100.0
    );

    Ok(())
}

/// Print the key insight summary
fn print_insights(insights: &KeyInsights, impact: &SmokerImpact) {
    println!("\n=== Overall Statistics ===");
    println!("Total records: {}", insights.total_records);
    println!("Average age: {:.1} years", insights.avg_age);
    println!("Average BMI: {:.2}", insights.avg_bmi);
    println!("Average charges: ${:.2}", insights.avg_charges);
    println!("Median charges: ${:.2}", insights.median_charges);

    println!("\n=== Smoker Impact ===");
    println!("Smoker percentage: {:.1}%", insights.smoker_percentage);
    println!(
        "Smokers pay ${:.2} vs ${:.2} on average (+{:.1}%)",
        impact.smoker_mean, impact.non_smoker_mean, impact.percent_increase
    );

    println!("\n=== Demographics ===");
    println!(
        "Age range: {} - {} years",
        insights.youngest_age, insights.oldest_age
    );
    println!("BMI range: {:.1} - {:.1}", insights.min_bmi, insights.max_bmi);
    println!(
        "Charges range: ${:.2} - ${:.2} (spread ${:.2})",
        insights.min_charges, insights.max_charges, insights.charges_range
    );

    println!("\nGender distribution:");
    for (sex, count) in &insights.gender_distribution {
        println!("  {sex}: {count}");
    }
    println!("Regional distribution:");
    for (region, count) in &insights.regional_distribution {
        println!("  {region}: {count}");
    }
}

/// Print the per-column descriptive summary
fn print_basic_statistics(summaries: &[analysis::ColumnSummary]) {
    println!("\n=== Descriptive Statistics ===");
    println!(
        "  {:<18} | {:>5} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for s in summaries {
        println!(
            "  {:<18} | {:>5} | {:>10.2} | {:>10.2} | {:>10.2} | {:>10.2} | {:>10.2} | {:>10.2} | {:>10.2}",
            s.column, s.count, s.mean, s.std, s.min, s.q1, s.median, s.q3, s.max
        );
    }
}

/// Print one grouped-charges table
fn print_group_table(stats: &GroupStatistics) {
    println!("\n=== Charges by {} ===", stats.factor.column_name());
    println!(
        "  {:<12} | {:>5} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10}",
        "category", "count", "mean", "median", "std", "min", "max"
    );
    println!(
        "  {:-<12}-|-{:-<5}-|-{:-<10}-|-{:-<10}-|-{:-<10}-|-{:-<10}-|-{:-<10}",
        "", "", "", "", "", "", ""
    );
    for group in &stats.groups {
        println!(
            "  {:<12} | {:>5} | {:>10.2} | {:>10.2} | {:>10.2} | {:>10.2} | {:>10.2}",
            group.key, group.count, group.mean, group.median, group.std, group.min, group.max
        );
    }
}

/// Print the correlation matrix
fn print_correlation(corr: &CorrelationMatrix) {
    println!("\n=== Correlation Matrix ===");
    print!("  {:>18}", "");
    for column in &corr.columns {
        print!(" {column:>18}");
    }
    println!();
    for (i, column) in corr.columns.iter().enumerate() {
        print!("  {column:>18}");
        for j in 0..corr.columns.len() {
            print!(" {:>18.3}", corr.values[[i, j]]);
        }
        println!();
    }
}
