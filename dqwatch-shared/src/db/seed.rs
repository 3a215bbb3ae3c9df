/// Initial data for a fresh database
///
/// Every table is seeded independently and only when it is empty, so
/// restarting the service never duplicates records and a table an operator
/// has populated is left alone.
///
/// Seed accounts:
///
/// | Username | Password | Role |
/// |---|---|---|
/// | `admin` | `admin123` | admin |
/// | `analyst` | `analyst123` | analyst |

use chrono::{Duration, Utc};
use tracing::info;

use super::pool::DbPool;
use crate::auth::password::{hash_password, PasswordError};
use crate::models::{
    anomaly::Anomaly,
    collection::{count, Collection, Severity},
    data_issue::{DataIssue, IssueStatus},
    data_source::DataSource,
    insight::{Impact, Insight},
    pipeline::{DataPipeline, PipelineStatus},
    quality_metric::{MetricStatus, QualityMetric},
    report::{Report, ReportPeriod},
    setting::SystemSetting,
    trend::TrendPoint,
    user::{CreateUser, Role, User},
};

/// Error type for seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Tables that received seed records
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub seeded_tables: Vec<&'static str>,
}

/// Seeds every empty table
pub async fn seed_if_empty(pool: &DbPool) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    if User::count(pool).await? == 0 {
        seed_users(pool).await?;
        summary.seeded_tables.push("users");
    }

    macro_rules! seed_table {
        ($ty:ty, $rows:expr) => {
            if is_empty::<$ty>(pool).await? {
                for row in $rows {
                    row.insert(pool).await?;
                }
                summary.seeded_tables.push(<$ty as Collection>::TABLE);
            }
        };
    }

    seed_table!(QualityMetric, quality_metrics());
    seed_table!(DataPipeline, pipelines());
    seed_table!(DataIssue, data_issues());
    seed_table!(DataSource, data_sources());
    seed_table!(Anomaly, anomalies());
    seed_table!(TrendPoint, trend_points());
    seed_table!(Insight, insights());
    seed_table!(Report, reports());

    if is_empty::<SystemSetting>(pool).await? {
        for setting in system_settings() {
            setting.upsert(pool).await?;
        }
        summary.seeded_tables.push(SystemSetting::TABLE);
    }

    if summary.seeded_tables.is_empty() {
        info!("Seed data already present");
    } else {
        info!(tables = ?summary.seeded_tables, "Seeded empty tables");
    }

    Ok(summary)
}

async fn is_empty<T: Collection>(pool: &DbPool) -> Result<bool, sqlx::Error> {
    Ok(count::<T>(pool).await? == 0)
}

async fn seed_users(pool: &DbPool) -> Result<(), SeedError> {
    let accounts = [
        ("admin", "admin@dqwatch.local", "admin123", Role::Admin, "Admin User"),
        ("analyst", "analyst@dqwatch.local", "analyst123", Role::Analyst, "Data Analyst"),
    ];

    for (username, email, password, role, name) in accounts {
        User::create(
            pool,
            CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password)?,
                role,
                name: name.to_string(),
                avatar_url: None,
            },
        )
        .await?;
    }

    Ok(())
}

fn quality_metrics() -> Vec<QualityMetric> {
    let metric = |name: &str, value: f64, change: f64, status, description: &str| QualityMetric {
        id: 0,
        name: name.to_string(),
        value,
        change,
        status,
        description: description.to_string(),
    };

    vec![
        metric("Completeness", 96.4, 1.2, MetricStatus::Good, "Share of required fields populated across orders, customers and products"),
        metric("Accuracy", 92.8, -0.6, MetricStatus::Good, "Records matching their source of truth on sampled audits"),
        metric("Consistency", 88.1, -2.3, MetricStatus::Warning, "Cross-system agreement between inventory, catalog and order totals"),
        metric("Timeliness", 94.5, 0.8, MetricStatus::Good, "Feeds delivered inside their freshness window"),
        metric("Validity", 90.2, 0.4, MetricStatus::Good, "Values conforming to format and range rules"),
        metric("Uniqueness", 78.9, -4.1, MetricStatus::Critical, "Customer records free of duplicates after identity matching"),
    ]
}

fn pipelines() -> Vec<DataPipeline> {
    let now = Utc::now();

    vec![
        DataPipeline {
            id: 0,
            name: "Orders ingestion".to_string(),
            status: PipelineStatus::Healthy,
            last_run: now - Duration::minutes(12),
            next_run: Some(now + Duration::minutes(48)),
            records_processed: 184_230,
            duration_seconds: 342,
            error_count: 0,
        },
        DataPipeline {
            id: 0,
            name: "Customer profile sync".to_string(),
            status: PipelineStatus::Running,
            last_run: now - Duration::minutes(3),
            next_run: None,
            records_processed: 52_114,
            duration_seconds: 180,
            error_count: 2,
        },
        DataPipeline {
            id: 0,
            name: "Inventory snapshot".to_string(),
            status: PipelineStatus::Warning,
            last_run: now - Duration::hours(2),
            next_run: Some(now + Duration::hours(4)),
            records_processed: 23_870,
            duration_seconds: 1_260,
            error_count: 37,
        },
        DataPipeline {
            id: 0,
            name: "Payments reconciliation".to_string(),
            status: PipelineStatus::Failed,
            last_run: now - Duration::hours(6),
            next_run: Some(now + Duration::hours(18)),
            records_processed: 0,
            duration_seconds: 45,
            error_count: 1,
        },
        DataPipeline {
            id: 0,
            name: "Product catalog export".to_string(),
            status: PipelineStatus::Healthy,
            last_run: now - Duration::hours(1),
            next_run: Some(now + Duration::hours(23)),
            records_processed: 9_412,
            duration_seconds: 96,
            error_count: 0,
        },
    ]
}

fn data_issues() -> Vec<DataIssue> {
    let now = Utc::now();
    let issue = |title: &str, description: &str, severity, source: &str, affected_records, status, hours_ago| DataIssue {
        id: 0,
        title: title.to_string(),
        description: description.to_string(),
        severity,
        source: source.to_string(),
        affected_records,
        status,
        detected_at: now - Duration::hours(hours_ago),
    };

    vec![
        issue("Duplicate customer accounts", "Same email registered under multiple customer ids after the guest checkout change", Severity::High, "CRM", 4_212, IssueStatus::Investigating, 5),
        issue("Missing shipping postcodes", "Orders from the mobile app arrive without a postcode", Severity::Medium, "Orders DB", 1_087, IssueStatus::Open, 9),
        issue("Negative stock levels", "Inventory snapshot reports negative on-hand quantities for bundled SKUs", Severity::Critical, "Inventory Service", 312, IssueStatus::Open, 2),
        issue("Currency code mismatch", "Refunds recorded in USD against EUR orders", Severity::High, "Payments Gateway", 94, IssueStatus::Resolved, 30),
        issue("Stale product descriptions", "Catalog entries not refreshed for more than 90 days", Severity::Low, "Product Catalog", 2_540, IssueStatus::Open, 48),
    ]
}

fn data_sources() -> Vec<DataSource> {
    let now = Utc::now();
    let source = |name: &str, kind: &str, scores: [f64; 4], record_count, minutes_ago| DataSource {
        id: 0,
        name: name.to_string(),
        kind: kind.to_string(),
        quality_score: ((scores.iter().sum::<f64>() / 4.0) * 10.0).round() / 10.0,
        completeness: scores[0],
        accuracy: scores[1],
        consistency: scores[2],
        timeliness: scores[3],
        record_count,
        last_updated: now - Duration::minutes(minutes_ago),
    };

    vec![
        source("Orders DB", "database", [98.2, 95.1, 93.4, 97.0], 2_480_113, 12),
        source("CRM", "api", [91.5, 89.7, 84.2, 92.3], 612_904, 40),
        source("Inventory Service", "stream", [94.0, 88.6, 81.9, 90.5], 74_220, 120),
        source("Payments Gateway", "api", [99.1, 97.8, 95.2, 85.4], 1_902_377, 360),
        source("Product Catalog", "file", [93.7, 92.0, 90.8, 78.1], 48_650, 60),
    ]
}

fn anomalies() -> Vec<Anomaly> {
    let now = Utc::now();
    let anomaly = |metric: &str, source: &str, description: &str, severity, expected: f64, actual: f64, hours_ago| Anomaly {
        id: 0,
        metric: metric.to_string(),
        source: source.to_string(),
        description: description.to_string(),
        severity,
        expected_value: expected,
        actual_value: actual,
        deviation: (((actual - expected) / expected) * 1000.0).round() / 10.0,
        detected_at: now - Duration::hours(hours_ago),
    };

    vec![
        anomaly("Daily order volume", "Orders DB", "Order volume dropped well below the weekday baseline", Severity::High, 18_500.0, 11_240.0, 3),
        anomaly("Null rate: email", "CRM", "Spike in customers created without an email address", Severity::Medium, 0.5, 3.8, 7),
        anomaly("Feed latency (min)", "Inventory Service", "Inventory feed arriving far behind schedule", Severity::Critical, 15.0, 95.0, 2),
        anomaly("Refund ratio", "Payments Gateway", "Refunds above the expected share of captured payments", Severity::Low, 2.1, 2.9, 20),
    ]
}

fn trend_points() -> Vec<TrendPoint> {
    let today = Utc::now().date_naive();

    (0..14i64)
        .rev()
        .map(|days_ago| {
            // Deterministic gentle wave so charts have some shape
            let wobble = ((days_ago % 5) as f64 - 2.0) * 0.6;
            let completeness = 95.0 + wobble;
            let accuracy = 92.0 - wobble / 2.0;
            let consistency = 87.5 + wobble;
            let timeliness = 93.0 - wobble;

            TrendPoint {
                id: 0,
                date: today - Duration::days(days_ago),
                overall_score: ((completeness + accuracy + consistency + timeliness) / 4.0 * 10.0)
                    .round()
                    / 10.0,
                completeness,
                accuracy,
                consistency,
                timeliness,
            }
        })
        .collect()
}

fn insights() -> Vec<Insight> {
    let now = Utc::now();
    let insight = |title: &str, description: &str, category: &str, impact, recommendation: &str, hours_ago| Insight {
        id: 0,
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        impact,
        recommendation: recommendation.to_string(),
        created_at: now - Duration::hours(hours_ago),
    };

    vec![
        insight("Duplicate customers inflate CAC", "Roughly 4% of new customers last month were duplicates of existing accounts", "Customer data", Impact::High, "Match guest checkouts to existing accounts by verified email before creating a customer", 6),
        insight("Inventory feed is the main consistency drag", "Most consistency failures trace back to late inventory snapshots", "Pipelines", Impact::Medium, "Move the inventory snapshot to an event stream or tighten its schedule", 26),
        insight("Catalog freshness slipping", "Timeliness of product data fell for three consecutive weeks", "Product data", Impact::Low, "Add a freshness check to the catalog export and alert merchandising owners", 50),
    ]
}

fn reports() -> Vec<Report> {
    let now = Utc::now();

    vec![
        Report {
            id: 0,
            title: "Daily quality digest".to_string(),
            period: ReportPeriod::Daily,
            summary: "Overall quality stable; uniqueness remains critical pending the CRM deduplication fix".to_string(),
            overall_score: 90.2,
            generated_at: now - Duration::hours(4),
        },
        Report {
            id: 0,
            title: "Weekly pipeline review".to_string(),
            period: ReportPeriod::Weekly,
            summary: "One failed payments run and repeated inventory delays; all other pipelines within SLA".to_string(),
            overall_score: 89.6,
            generated_at: now - Duration::days(2),
        },
        Report {
            id: 0,
            title: "Monthly data quality report".to_string(),
            period: ReportPeriod::Monthly,
            summary: "Completeness and timeliness improved month over month; consistency declined".to_string(),
            overall_score: 88.9,
            generated_at: now - Duration::days(9),
        },
    ]
}

fn system_settings() -> Vec<SystemSetting> {
    let now = Utc::now();
    let setting = |key: &str, value: &str, description: &str| SystemSetting {
        key: key.to_string(),
        value: value.to_string(),
        description: description.to_string(),
        updated_at: now,
    };

    vec![
        setting("alert_threshold", "85", "Quality score below which a metric is flagged"),
        setting("anomaly_sensitivity", "medium", "Deviation band used by anomaly detection"),
        setting("data_retention_days", "365", "How long quality history is kept"),
        setting("report_schedule", "daily", "Cadence of generated quality reports"),
    ]
}
