//! Chart rendering with Plotters over the analyzer's aggregate output

use std::fs;
use std::path::Path;

use plotters::prelude::*;

use crate::analysis::{
    age_impact, bmi_impact, charges_by_factor, children_impact, regional_differences,
    scatter_points, GroupStatistics, ScatterPoint,
};
use crate::error::Error;
use crate::schema::{GroupKey, Record};

/// Color palette for factor categories
const CATEGORY_COLORS: [RGBColor; 5] = [RED, BLUE, GREEN, YELLOW, MAGENTA];

fn render_err<E: std::fmt::Display>(err: E) -> Error {
    Error::Render(err.to_string())
}

/// Draw a bar chart of mean charges per category of one factor.
pub fn chart_factor_means(
    stats: &GroupStatistics,
    output_path: impl AsRef<Path>,
) -> crate::Result<()> {
    let output_path = output_path.as_ref();
    if stats.groups.is_empty() {
        return Ok(());
    }

    let max_mean = stats.groups.iter().map(|g| g.mean).fold(0.0, f64::max);
    let n = stats.groups.len();

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Mean Charges by {}", stats.factor.column_name()),
            ("sans-serif", 30),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..(max_mean * 1.1))
        .map_err(render_err)?;

    let labels: Vec<String> = stats.groups.iter().map(|g| g.key.clone()).collect();
    chart
        .configure_mesh()
        .x_desc(stats.factor.column_name())
        .y_desc("Mean Charges")
        .x_labels(n)
        .x_label_formatter(&|x| {
            let idx = x.round();
            if idx >= 0.0 && (idx as usize) < labels.len() && (x - idx).abs() < 0.25 {
                labels[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(render_err)?;

    // Draw one bar per category
    for (i, group) in stats.groups.iter().enumerate() {
        let color = if i < CATEGORY_COLORS.len() {
            &CATEGORY_COLORS[i]
        } else {
            &BLUE
        };

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(i as f64 - 0.35, 0.0), (i as f64 + 0.35, group.mean)],
                color.filled(),
            )))
            .map_err(render_err)?;
    }

    root.present().map_err(render_err)?;
    log::debug!("factor chart saved to {}", output_path.display());

    Ok(())
}

/// Draw a charges scatter plot against one numeric axis, colored by smoker
/// status. `x_of` picks the x value per point.
fn chart_charges_scatter(
    points: &[ScatterPoint],
    output_path: &Path,
    title: &str,
    x_desc: &str,
    x_of: impl Fn(&ScatterPoint) -> f64,
) -> crate::Result<()> {
    if points.is_empty() {
        return Ok(());
    }

    let x_min = points.iter().map(&x_of).fold(f64::INFINITY, f64::min) - 2.0;
    let x_max = points.iter().map(&x_of).fold(f64::NEG_INFINITY, f64::max) + 2.0;
    let charges_max = points.iter().map(|p| p.charges).fold(0.0, f64::max);

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, 0f64..(charges_max * 1.05))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Charges")
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(
            points
                .iter()
                .filter(|p| p.smoker)
                .map(|p| Circle::new((x_of(p), p.charges), 4, RED.filled())),
        )
        .map_err(render_err)?
        .label("smoker")
        .legend(|(x, y)| Circle::new((x + 5, y), 4, RED.filled()));

    chart
        .draw_series(
            points
                .iter()
                .filter(|p| !p.smoker)
                .map(|p| Circle::new((x_of(p), p.charges), 4, BLUE.filled())),
        )
        .map_err(render_err)?
        .label("non-smoker")
        .legend(|(x, y)| Circle::new((x + 5, y), 4, BLUE.filled()));

    chart
        .configure_series_labels()
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    log::debug!("scatter chart saved to {}", output_path.display());

    Ok(())
}

/// Draw an age vs charges scatter plot, colored by smoker status.
pub fn chart_age_charges_scatter(
    points: &[ScatterPoint],
    output_path: impl AsRef<Path>,
) -> crate::Result<()> {
    chart_charges_scatter(
        points,
        output_path.as_ref(),
        "Charges by Age (Colored by Smoker Status)",
        "Age (Years)",
        |p| f64::from(p.age),
    )
}

/// Draw a BMI vs charges scatter plot, colored by smoker status.
pub fn chart_bmi_charges_scatter(
    points: &[ScatterPoint],
    output_path: impl AsRef<Path>,
) -> crate::Result<()> {
    chart_charges_scatter(
        points,
        output_path.as_ref(),
        "Charges by BMI (Colored by Smoker Status)",
        "BMI",
        |p| p.bmi,
    )
}

/// Render the full chart set into `out_dir`: one mean-charges bar chart per
/// factor the report covers, plus the smoker-colored scatter plots.
pub fn generate_charts(records: &[Record], out_dir: impl AsRef<Path>) -> crate::Result<()> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let tables = [
        charges_by_factor(records, GroupKey::Smoker),
        regional_differences(records),
        bmi_impact(records)?,
        age_impact(records)?,
        children_impact(records),
    ];
    for stats in &tables {
        let path = out_dir.join(format!("charges_by_{}.png", stats.factor.column_name()));
        chart_factor_means(stats, &path)?;
    }

    let points = scatter_points(records);
    chart_age_charges_scatter(&points, out_dir.join("age_vs_charges.png"))?;
    chart_bmi_charges_scatter(&points, out_dir.join("bmi_vs_charges.png"))?;

    log::info!("charts written to {}", out_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Region, Sex, SmokerStatus};
    use tempfile::tempdir;

    fn create_test_records() -> Vec<Record> {
        vec![
            Record::new(30, Sex::Male, 22.0, 0, SmokerStatus::No, Region::Northwest, 3000.0),
            Record::new(50, Sex::Female, 31.0, 2, SmokerStatus::Yes, Region::Southeast, 20000.0),
            Record::new(20, Sex::Male, 17.0, 0, SmokerStatus::No, Region::Northeast, 1500.0),
            Record::new(62, Sex::Female, 27.5, 1, SmokerStatus::No, Region::Southwest, 12000.0),
        ]
    }

    #[test]
    fn test_chart_factor_means() {
        let records = create_test_records();
        let stats = charges_by_factor(&records, GroupKey::Region);
        let dir = tempdir().unwrap();
        let path = dir.path().join("by_region.png");

        chart_factor_means(&stats, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_chart_age_charges_scatter() {
        let records = create_test_records();
        let points = scatter_points(&records);
        let dir = tempdir().unwrap();
        let path = dir.path().join("scatter.png");

        chart_age_charges_scatter(&points, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_generate_charts() {
        let records = create_test_records();
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("charts");

        generate_charts(&records, &out_dir).unwrap();

        for name in [
            "charges_by_smoker.png",
            "charges_by_region.png",
            "charges_by_bmi_category.png",
            "charges_by_age_group.png",
            "charges_by_children.png",
            "age_vs_charges.png",
            "bmi_vs_charges.png",
        ] {
            assert!(out_dir.join(name).exists(), "missing {name}");
        }
    }
}
