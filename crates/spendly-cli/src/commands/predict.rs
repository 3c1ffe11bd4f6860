//! Predict command implementation

use anyhow::{Context, Result};
use spendly_core::forecast::FitOptions;
use spendly_core::models::CategoryForecast;
use spendly_core::service::predict_details_for_user;
use spendly_core::Database;

pub fn cmd_predict(
    db: &Database,
    user: &str,
    details: bool,
    json: bool,
    fit: FitOptions,
) -> Result<()> {
    let forecasts = predict_details_for_user(db, Some(user), fit)
        .with_context(|| format!("Prediction failed for '{}'", user))?;

    println!("{}", render(&forecasts, details, json)?);
    Ok(())
}

/// Format forecasts as JSON (plain mapping or detailed list) or a table
fn render(forecasts: &[CategoryForecast], details: bool, json: bool) -> Result<String> {
    if json {
        let output = if details {
            serde_json::to_string_pretty(forecasts)?
        } else {
            let totals: serde_json::Map<String, serde_json::Value> = forecasts
                .iter()
                .map(|f| (f.category.clone(), serde_json::json!(f.total)))
                .collect();
            serde_json::to_string_pretty(&totals)?
        };
        return Ok(output);
    }

    if forecasts.is_empty() {
        return Ok("No spending categories to forecast".to_string());
    }

    let mut lines = Vec::with_capacity(forecasts.len() + 3);
    if details {
        lines.push(format!(
            "{:<24} {:>12} {:>10} {:>8}",
            "Category", "Next 30d", "Method", "Score"
        ));
        lines.push("─".repeat(57));
        for f in forecasts {
            lines.push(format!(
                "{:<24} {:>12.2} {:>10} {:>8.3}",
                f.category,
                f.total,
                f.method.as_str(),
                f.sufficiency_score
            ));
        }
    } else {
        lines.push(format!("{:<24} {:>12}", "Category", "Next 30d"));
        lines.push("─".repeat(37));
        for f in forecasts {
            lines.push(format!("{:<24} {:>12.2}", f.category, f.total));
        }
    }

    let total: f64 = forecasts.iter().map(|f| f.total).sum();
    lines.push(format!("{:<24} {:>12.2}", "Total", total));

    Ok(lines.join("\n"))
}
