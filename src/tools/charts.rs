//! Balance Chart MCP Tool
//!
//! Renders a cocktail's balance against its technique's windows as a PNG
//! bar chart: one column per declared property, with min and max bands
//! behind the actual value.

use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage};
use serde::Serialize;

use crate::db::Database;
use crate::mixology::{
    check_balance, percentage_of, BalanceCheck, BalanceProperty, BalanceVerdict,
};
use crate::models::{cocktail_profile, Cocktail, Technique};

const DEFAULT_WIDTH: u32 = 900;
const DEFAULT_HEIGHT: u32 = 500;

/// One chart column, scaled against the largest of min, max and value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceColumn {
    pub property: BalanceProperty,
    pub title: &'static str,
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub min_pct: f64,
    pub max_pct: f64,
    pub value_pct: f64,
    pub verdict: BalanceVerdict,
}

/// Response for export_balance_chart
#[derive(Debug, Serialize)]
pub struct ExportChartResponse {
    pub success: bool,
    pub file_path: String,
    pub columns: Vec<BalanceColumn>,
    pub message: String,
}

/// Scale balance checks into chart columns
pub fn balance_columns(checks: &[BalanceCheck]) -> Vec<BalanceColumn> {
    checks
        .iter()
        .map(|check| {
            let (min, max, value) = (check.min.get(), check.max.get(), check.value.get());
            let scale = min.max(max).max(value);
            BalanceColumn {
                property: check.property,
                title: check.property.title(),
                min,
                max,
                value,
                min_pct: percentage_of(min, scale).get(),
                max_pct: percentage_of(max, scale).get(),
                value_pct: percentage_of(value, scale).get(),
                verdict: check.verdict,
            }
        })
        .collect()
}

fn verdict_color(verdict: BalanceVerdict) -> (u8, u8, u8) {
    match verdict {
        BalanceVerdict::Low => (52, 101, 164),
        BalanceVerdict::Balanced => (46, 139, 87),
        BalanceVerdict::High => (204, 0, 0),
    }
}

/// Render balance columns as PNG bytes
pub fn generate_balance_chart(
    title: &str,
    columns: &[BalanceColumn],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    use plotters::prelude::*;

    if columns.is_empty() {
        return Err("No balance ranges to chart".to_string());
    }

    let mut buffer = vec![0u8; (width * height * 3) as usize];
    let n = columns.len() as f64;

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| e.to_string())?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(10)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..n, 0.0..115.0)
            .map_err(|e| e.to_string())?;

        chart.configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .y_desc("% of column scale")
            .draw()
            .map_err(|e| e.to_string())?;

        // Max band behind min band, so the gap between them reads as the window
        chart.draw_series(columns.iter().enumerate().map(|(i, c)| {
            let x = i as f64;
            Rectangle::new([(x + 0.15, 0.0), (x + 0.85, c.max_pct)], RGBColor(46, 139, 87).mix(0.25).filled())
        })).map_err(|e| e.to_string())?;

        chart.draw_series(columns.iter().enumerate().map(|(i, c)| {
            let x = i as f64;
            Rectangle::new([(x + 0.15, 0.0), (x + 0.85, c.min_pct)], RGBColor(200, 200, 200).mix(0.6).filled())
        })).map_err(|e| e.to_string())?;

        // Actual value
        chart.draw_series(columns.iter().enumerate().map(|(i, c)| {
            let x = i as f64;
            let (r, g, b) = verdict_color(c.verdict);
            Rectangle::new([(x + 0.4, 0.0), (x + 0.6, c.value_pct)], RGBColor(r, g, b).filled())
        })).map_err(|e| e.to_string())?;

        chart.draw_series(columns.iter().enumerate().map(|(i, c)| {
            Text::new(
                format!("{} {:.1} ({:.1}-{:.1})", c.title, c.value, c.min, c.max),
                (i as f64 + 0.1, 110.0),
                ("sans-serif", 14).into_font(),
            )
        })).map_err(|e| e.to_string())?;

        root.present().map_err(|e| e.to_string())?;
    }

    // Convert RGB buffer to PNG
    let img = RgbImage::from_raw(width, height, buffer)
        .ok_or("Failed to create image from buffer")?;

    let mut png_bytes = Vec::new();
    let dyn_img = DynamicImage::ImageRgb8(img);
    dyn_img.write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    Ok(png_bytes)
}

/// Export a stored cocktail's balance chart to a PNG file
pub fn export_balance_chart(
    db: &Database,
    cocktail_id: i64,
    output_path: &str,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<ExportChartResponse, String> {
    let width = width.unwrap_or(DEFAULT_WIDTH).clamp(300, 4000);
    let height = height.unwrap_or(DEFAULT_HEIGHT).clamp(200, 4000);

    let conn = db.get_conn().map_err(|e| e.to_string())?;

    let cocktail = Cocktail::get_by_id(&conn, cocktail_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Cocktail not found with id: {}", cocktail_id))?;
    let technique = Technique::get_by_id(&conn, cocktail.technique_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Technique not found with id: {}", cocktail.technique_id))?;

    let profile = cocktail_profile(&conn, cocktail_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Cocktail not found with id: {}", cocktail_id))?;

    let columns = balance_columns(&check_balance(&profile, &technique.balance));
    if columns.is_empty() {
        return Err(format!("Technique {} declares no balance ranges", technique.code));
    }

    let title = format!("{} ({})", cocktail.name, technique.name);
    let png = generate_balance_chart(&title, &columns, width, height)?;

    let path = Path::new(output_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    std::fs::write(path, &png).map_err(|e| e.to_string())?;

    tracing::info!(cocktail_id, path = %output_path, bytes = png.len(), "Exported balance chart");

    Ok(ExportChartResponse {
        success: true,
        file_path: output_path.to_string(),
        message: format!("Balance chart for {} written with {} columns", cocktail.name, columns.len()),
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixology::{CocktailProfile, MinMax, NonNegative, TechniqueBalance};

    fn nn(value: f64) -> NonNegative {
        NonNegative::new(value).unwrap()
    }

    #[test]
    fn test_columns_scale_to_largest_value() {
        let profile = CocktailProfile {
            volume_oz: nn(6.0),
            abv: nn(10.0),
            ..Default::default()
        };
        let balance = TechniqueBalance {
            volume_oz: MinMax::new(2.0, 4.0),
            abv: MinMax::new(20.0, 40.0),
            ..Default::default()
        };

        let columns = balance_columns(&check_balance(&profile, &balance));
        assert_eq!(columns.len(), 2);

        let volume = &columns[0];
        assert_eq!(volume.title, "Volume");
        assert_eq!(volume.value_pct, 100.0);
        assert!((volume.max_pct - 66.666_666).abs() < 1e-4);
        assert_eq!(volume.verdict, BalanceVerdict::High);

        let abv = &columns[1];
        assert_eq!(abv.max_pct, 100.0);
        assert_eq!(abv.min_pct, 50.0);
        assert_eq!(abv.value_pct, 25.0);
        assert_eq!(abv.verdict, BalanceVerdict::Low);
    }

    #[test]
    fn test_all_zero_column() {
        let balance = TechniqueBalance {
            acid: MinMax::new(0.0, 0.0),
            ..Default::default()
        };
        let columns = balance_columns(&check_balance(&CocktailProfile::default(), &balance));
        assert_eq!(columns[0].max_pct, 0.0);
        assert_eq!(columns[0].value_pct, 0.0);
        assert_eq!(columns[0].verdict, BalanceVerdict::Balanced);
    }

    #[test]
    fn test_empty_chart_is_an_error() {
        assert!(generate_balance_chart("Empty", &[], 400, 300).is_err());
    }

    #[test]
    fn test_missing_cocktail() {
        let db = crate::tools::test_support::test_db();
        let err = export_balance_chart(&db, 42, "/tmp/none.png", None, None).unwrap_err();
        assert!(err.contains("Cocktail not found"));
    }
}
