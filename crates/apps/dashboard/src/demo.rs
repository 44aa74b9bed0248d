//! Canned backend for running the dashboard without a sentiment API.

use datasync::MemoryFetcher;
use datasync::endpoints::{self, COLLECT_TRIGGER, GLOBAL_SENTIMENT, HEALTH, SOURCES};
use foundation::{CountryCode, SentimentBucket, bucket_of};
use serde_json::{Value, json};

use dashboard::DashboardConfig;

const UPDATED: &str = "2024-05-01T12:00:00Z";

/// (code, name, score, articles, trend)
const COUNTRIES: &[(&str, &str, f64, u64, Option<f64>)] = &[
    ("BR", "Brazil", 0.05, 41, Some(-0.02)),
    ("CA", "Canada", 0.31, 22, Some(0.04)),
    ("DE", "Germany", -0.12, 57, None),
    ("GB", "United Kingdom", -0.27, 88, Some(-0.08)),
    ("IN", "India", 0.42, 63, Some(0.11)),
    ("JP", "Japan", 0.22, 35, Some(0.01)),
    ("US", "United States", -0.35, 140, Some(-0.05)),
    ("ZA", "South Africa", 0.18, 14, None),
];

/// Routes every endpoint the dashboard polls, for every demo country and
/// headline filter the config can produce.
pub fn fetcher(config: &DashboardConfig) -> MemoryFetcher {
    let fetcher = MemoryFetcher::new();
    fetcher
        .respond(GLOBAL_SENTIMENT, global())
        .respond(HEALTH, json!({"status": "healthy", "articles_today": 460, "model_loaded": true, "database_ok": true}))
        .respond(SOURCES, json!([
            {"source_type": "rss", "article_count": 310, "avg_sentiment": 0.02},
            {"source_type": "api", "article_count": 150, "avg_sentiment": -0.04}
        ]))
        .respond(&endpoints::trends_path(config.trend_hours), trends(config.trend_hours))
        .respond(COLLECT_TRIGGER, json!({"message": "collection started", "status": "ok"}));

    for &(code, name, score, articles, _) in COUNTRIES {
        let Ok(code) = CountryCode::parse(code) else {
            continue;
        };
        fetcher.respond(
            &endpoints::country_detail_path(&code, config.detail_hours),
            detail(&code, name, score, articles),
        );
        let filters = [None].into_iter().chain(SentimentBucket::ALL.map(Some));
        for filter in filters {
            fetcher.respond(
                &endpoints::headlines_path(&code, config.headline_limit, filter),
                headlines(&code, name, filter),
            );
        }
    }
    fetcher
}

fn global() -> Value {
    let countries: Vec<Value> = COUNTRIES
        .iter()
        .map(|&(code, name, score, articles, trend)| {
            json!({
                "country_code": code,
                "country_name": name,
                "sentiment_score": score,
                "article_count": articles,
                "trend": trend,
            })
        })
        .collect();
    let total: u64 = COUNTRIES.iter().map(|c| c.3).sum();
    let weighted: f64 = COUNTRIES.iter().map(|c| c.2 * c.3 as f64).sum();
    json!({
        "countries": countries,
        "global_average": weighted / total as f64,
        "total_articles": total,
        "last_updated": UPDATED,
    })
}

fn detail(code: &CountryCode, name: &str, score: f64, articles: u64) -> Value {
    let hourly: Vec<Value> = (0..6)
        .map(|h| {
            json!({
                "hour": format!("2024-05-01T{:02}:00:00Z", 6 + h),
                "sentiment": score + 0.02 * (h as f64 - 3.0),
                "articles": articles / 6,
            })
        })
        .collect();
    json!({
        "country_code": code.as_str(),
        "country_name": name,
        "current_sentiment": score,
        "article_count": articles,
        "hourly_trend": hourly,
        "top_headlines": headlines(code, name, None),
        "source_breakdown": {"rss": articles * 2 / 3, "api": articles - articles * 2 / 3},
    })
}

fn headlines(code: &CountryCode, name: &str, filter: Option<SentimentBucket>) -> Value {
    let all = [
        (0.6, "Markets rally on strong outlook"),
        (0.05, "Parliament debates tax timetable"),
        (-0.55, "Storm disrupts regional transport"),
    ];
    let rows: Vec<Value> = all
        .iter()
        .enumerate()
        .filter(|(_, (score, _))| filter.is_none_or(|b| bucket_of(*score) == b))
        .map(|(i, (score, title))| {
            json!({
                "id": i as i64 + 1,
                "title": format!("{name}: {title}"),
                "source_name": format!("{} Daily", code.as_str()),
                "source_type": "rss",
                "sentiment_score": score,
                "sentiment_label": bucket_of(*score).as_str(),
                "published_at": UPDATED,
            })
        })
        .collect();
    Value::Array(rows)
}

fn trends(hours: u32) -> Value {
    let points: Vec<Value> = (0..hours.min(24))
        .map(|h| {
            json!({
                "hour": format!("2024-05-01T{h:02}:00:00Z"),
                "avg_sentiment": 0.01 * (h as f64 - 12.0),
                "total_articles": 20 + h,
                "country_count": 8,
            })
        })
        .collect();
    Value::Array(points)
}
