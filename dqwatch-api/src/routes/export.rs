/// Quality report export
///
/// ```text
/// GET /api/export/report
/// Authorization: Bearer <token>
/// ```
///
/// Responds with a CSV attachment:
///
/// ```text
/// Data Quality Report
/// Generated At,2025-01-01T12:00:00+00:00
/// Overall Score,90.1
/// Metric Count,6
///
/// Metric,Value,Change,Status,Description
/// Completeness,96.4,1.2,good,Share of required fields populated ...
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, SecondsFormat, Utc};
use dqwatch_shared::models::{collection::list_all, quality_metric::QualityMetric};

/// Download file name
const REPORT_FILENAME: &str = "data-quality-report.csv";

pub async fn export_report(State(state): State<AppState>) -> ApiResult<Response> {
    let metrics: Vec<QualityMetric> = list_all(&state.db).await?;
    let body = render_report(&metrics, Utc::now());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", REPORT_FILENAME),
            ),
        ],
        body,
    )
        .into_response())
}

/// Renders the report; the overall score is the mean metric value
pub fn render_report(metrics: &[QualityMetric], generated_at: DateTime<Utc>) -> String {
    let overall = if metrics.is_empty() {
        0.0
    } else {
        metrics.iter().map(|m| m.value).sum::<f64>() / metrics.len() as f64
    };

    let mut out = String::new();
    out.push_str("Data Quality Report\n");
    out.push_str(&format!(
        "Generated At,{}\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, false)
    ));
    out.push_str(&format!("Overall Score,{:.1}\n", overall));
    out.push_str(&format!("Metric Count,{}\n", metrics.len()));
    out.push('\n');
    out.push_str("Metric,Value,Change,Status,Description\n");

    for metric in metrics {
        let row = [
            escape_field(&metric.name),
            metric.value.to_string(),
            metric.change.to_string(),
            metric.status.as_str().to_string(),
            escape_field(&metric.description),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Quotes a field containing a delimiter, quote or line break
fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dqwatch_shared::models::quality_metric::MetricStatus;

    fn metric(name: &str, value: f64, description: &str) -> QualityMetric {
        QualityMetric {
            id: 1,
            name: name.to_string(),
            value,
            change: -0.5,
            status: MetricStatus::Warning,
            description: description.to_string(),
        }
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_render_report() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let csv = render_report(
            &[
                metric("Completeness", 90.0, "Fields populated"),
                metric("Accuracy", 95.0, "Matches, mostly"),
            ],
            at,
        );

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Data Quality Report");
        assert_eq!(lines[1], "Generated At,2025-01-02T03:04:05+00:00");
        assert_eq!(lines[2], "Overall Score,92.5");
        assert_eq!(lines[3], "Metric Count,2");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "Metric,Value,Change,Status,Description");
        assert_eq!(lines[6], "Completeness,90,-0.5,warning,Fields populated");
        assert_eq!(lines[7], "Accuracy,95,-0.5,warning,\"Matches, mostly\"");
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_render_empty_report() {
        let csv = render_report(&[], Utc::now());
        assert!(csv.contains("Overall Score,0.0\n"));
        assert!(csv.contains("Metric Count,0\n"));
        assert!(csv.ends_with("Metric,Value,Change,Status,Description\n"));
    }
}
