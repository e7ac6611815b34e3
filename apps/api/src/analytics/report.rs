use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use tracing::warn;

use crate::analytics::repository::{
    AnalyticsRepository, ArticleTotals, CurrencyRevenue, StatusCount, TopArticle,
};
use crate::billing::status::SubscriptionStatus;

pub const TOP_ARTICLE_COUNT: i64 = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub articles: ArticleTotals,
    pub top_articles: Vec<TopArticle>,
    /// Every known status is present, zero when unused.
    pub subscriptions: BTreeMap<String, i64>,
    pub revenue: Vec<CurrencyRevenue>,
}

pub async fn build_report(analytics: &dyn AnalyticsRepository) -> Result<AnalyticsReport> {
    let articles = analytics.article_totals().await?;
    let top_articles = analytics.top_articles(TOP_ARTICLE_COUNT).await?;
    let subscriptions = subscription_breakdown(analytics.subscription_counts().await?);
    let revenue = analytics.revenue_by_currency().await?;

    Ok(AnalyticsReport {
        articles,
        top_articles,
        subscriptions,
        revenue,
    })
}

fn subscription_breakdown(counts: Vec<StatusCount>) -> BTreeMap<String, i64> {
    let mut breakdown: BTreeMap<String, i64> = SubscriptionStatus::ALL
        .iter()
        .map(|status| (status.as_str().to_string(), 0))
        .collect();
    for StatusCount { status, count } in counts {
        if status.parse::<SubscriptionStatus>().is_err() {
            warn!("Subscriptions table holds unknown status '{status}'");
        }
        *breakdown.entry(status).or_insert(0) += count;
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_zero_fills_known_statuses() {
        let breakdown = subscription_breakdown(vec![
            StatusCount {
                status: "active".to_string(),
                count: 4,
            },
            StatusCount {
                status: "past_due".to_string(),
                count: 1,
            },
        ]);
        assert_eq!(breakdown.len(), SubscriptionStatus::ALL.len());
        assert_eq!(breakdown["active"], 4);
        assert_eq!(breakdown["past_due"], 1);
        assert_eq!(breakdown["cancelled"], 0);
    }

    #[test]
    fn test_breakdown_keeps_unknown_statuses_visible() {
        let breakdown = subscription_breakdown(vec![StatusCount {
            status: "trialing".to_string(),
            count: 2,
        }]);
        assert_eq!(breakdown["trialing"], 2);
    }
}
