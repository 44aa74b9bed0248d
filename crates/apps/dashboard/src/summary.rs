//! Plain-text rendering of a [`DashboardView`].

use std::fmt::Write;

use dashboard::{DashboardView, PanelPlacement};
use foundation::{SentimentBucket, color_for};

/// Headlines shown per country in the panel.
const PANEL_HEADLINES: usize = 5;

pub fn render(view: &DashboardView) -> String {
    let mut out = String::new();
    let status = if view.healthy { "online" } else { "offline" };
    let _ = writeln!(out, "== global sentiment [{status}] ==");

    match (view.global_average, view.total_articles) {
        (Some(avg), Some(total)) => {
            let _ = writeln!(
                out,
                "average {avg:+.3}  trend {:+.3}  articles {total}",
                view.global_trend
            );
        }
        _ if view.global_loading => {
            let _ = writeln!(out, "loading...");
        }
        _ => {}
    }
    if let Some(err) = &view.global_error {
        let _ = writeln!(out, "error: {err}");
    }
    if let Some(updated) = view.last_updated {
        let _ = writeln!(out, "updated {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }

    let counts = SentimentBucket::ALL
        .map(|b| format!("{} {}", b.as_str(), view.bucket_counts.get(b)))
        .join("  ");
    let _ = writeln!(out, "{counts}  (filter: {})", view.filter.as_str());

    for c in &view.countries {
        let marker = if view.selected_country.as_ref() == Some(&c.country_code) { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {} {:<20} {:+.2} {} ({} articles)",
            c.country_code,
            c.country_name,
            c.sentiment_score,
            color_for(c.sentiment_score).to_hex(),
            c.article_count
        );
    }
    if view.is_empty() && view.total_articles.is_some() {
        let _ = writeln!(out, "  no countries match the filter");
    }

    if view.panel_visible {
        let side = match view.panel_placement {
            PanelPlacement::SlideIn => "side",
            PanelPlacement::SlideUp => "bottom",
        };
        let _ = writeln!(out, "-- detail ({side} panel) --");
        match view.detail.data.as_deref() {
            Some(detail) => {
                let _ = writeln!(
                    out,
                    "{} {}: {:+.3}, {} articles",
                    detail.country_code, detail.country_name, detail.current_sentiment, detail.article_count
                );
                for h in detail.top_headlines.iter().take(PANEL_HEADLINES) {
                    let _ = writeln!(out, "  {:+.2} {} ({})", h.sentiment_score, h.title, h.source_name);
                }
            }
            None if view.detail.is_loading => {
                let _ = writeln!(out, "loading...");
            }
            None => {}
        }
        if let Some(err) = &view.detail.error {
            let _ = writeln!(out, "error: {err}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard::controller::SelectionState;
    use dashboard::view::ViewInputs;
    use datasync::{CountryData, GlobalSentiment, ResourceState};
    use foundation::CountryCode;
    use std::sync::Arc;

    fn inputs() -> ViewInputs {
        let countries = vec![
            CountryData {
                country_code: CountryCode::parse("JP").unwrap(),
                country_name: "Japan".into(),
                sentiment_score: 0.4,
                article_count: 3,
                trend: Some(0.1),
            },
            CountryData {
                country_code: CountryCode::parse("US").unwrap(),
                country_name: "United States".into(),
                sentiment_score: -0.4,
                article_count: 5,
                trend: None,
            },
        ];
        ViewInputs {
            selection: SelectionState::default(),
            placement: PanelPlacement::SlideIn,
            global: ResourceState {
                data: Some(Arc::new(GlobalSentiment {
                    countries,
                    global_average: -0.1,
                    total_articles: 8,
                    last_updated: "2024-05-01T12:00:00Z".parse().unwrap(),
                })),
                ..ResourceState::default()
            },
            detail: ResourceState::default(),
            health: ResourceState::default(),
            trends: ResourceState::default(),
            sources: ResourceState::default(),
        }
    }

    #[test]
    fn lists_countries_with_counts() {
        let text = render(&DashboardView::build(inputs()));
        assert!(text.contains("[offline]"));
        assert!(text.contains("average -0.100  trend +0.050  articles 8"));
        assert!(text.contains("positive 1  neutral 0  negative 1  (filter: all)"));
        assert!(text.contains("JP Japan"));
        assert!(!text.contains("detail"));
    }

    #[test]
    fn marks_selection_and_opens_panel() {
        let mut inputs = inputs();
        inputs.selection.selected_country = Some(CountryCode::parse("US").unwrap());
        inputs.selection.panel_visible = true;
        inputs.placement = PanelPlacement::SlideUp;
        let text = render(&DashboardView::build(inputs));
        assert!(text.contains("> US United States"));
        assert!(text.contains("-- detail (bottom panel) --"));
    }
}
