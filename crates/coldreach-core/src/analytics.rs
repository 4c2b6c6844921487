//! Campaign metric aggregation.
//!
//! Everything in this module is a pure function of its input: the route layer
//! fetches [`MetricRecord`]s from a [`crate::store::MetricStore`], hands them
//! to [`aggregate`], and serializes the resulting [`AggregateSummary`].

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One per-send metric observation for an email campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub id: String,
    /// The email campaign this observation belongs to.
    pub owner_id: String,
    pub open_rate: f64,
    pub conversion_rate: f64,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Aggregate view over a set of metric records.
///
/// Field names are part of the public JSON contract and stay camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSummary {
    pub total_count: u64,
    pub average_open_rate: f64,
    pub average_conversion_rate: f64,
    /// Mean of the open and conversion averages. This is a proxy kept for
    /// compatibility with existing dashboards, not a measured click-through
    /// rate: no click events are recorded anywhere.
    pub average_click_through_rate: f64,
    /// Ascending by timestamp; records sharing a timestamp keep input order.
    pub trend: Vec<TrendPoint>,
}

impl AggregateSummary {
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            average_open_rate: 0.0,
            average_conversion_rate: 0.0,
            average_click_through_rate: 0.0,
            trend: Vec::new(),
        }
    }
}

/// Which per-record value the trend series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendValue {
    /// `open_rate` alone. Used by every HTTP endpoint.
    #[default]
    OpenRate,
    /// `open_rate + conversion_rate`.
    Combined,
}

impl TrendValue {
    fn of(self, record: &MetricRecord) -> f64 {
        match self {
            TrendValue::OpenRate => record.open_rate,
            TrendValue::Combined => record.open_rate + record.conversion_rate,
        }
    }
}

/// Aggregate `records` using the open-rate trend convention.
pub fn aggregate(records: &[MetricRecord]) -> AggregateSummary {
    aggregate_with(records, TrendValue::OpenRate)
}

pub fn aggregate_with(records: &[MetricRecord], trend_value: TrendValue) -> AggregateSummary {
    if records.is_empty() {
        return AggregateSummary::empty();
    }

    let count = records.len() as f64;
    let average_open_rate = records.iter().map(|r| r.open_rate).sum::<f64>() / count;
    let average_conversion_rate = records.iter().map(|r| r.conversion_rate).sum::<f64>() / count;

    let mut trend: Vec<TrendPoint> = records
        .iter()
        .map(|r| TrendPoint {
            timestamp: r.captured_at,
            value: trend_value.of(r),
        })
        .collect();
    // `sort_by_key` is stable, so equal timestamps keep input order.
    trend.sort_by_key(|p| p.timestamp);

    AggregateSummary {
        total_count: records.len() as u64,
        average_open_rate,
        average_conversion_rate,
        average_click_through_rate: (average_open_rate + average_conversion_rate) / 2.0,
        trend,
    }
}

/// Inclusive calendar-date window applied to `captured_at` or `sent_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::InvertedDateRange { start, end });
        }
        if start.year() < MIN_YEAR {
            return Err(CoreError::TimestampOutOfRange {
                field: "date_from",
                value: start.to_string(),
            });
        }
        // The exclusive upper bound is the day after `end`.
        if end.succ_opt().map_or(true, |next| next.year() > MAX_YEAR) {
            return Err(CoreError::TimestampOutOfRange {
                field: "date_to",
                value: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Half-open `[start 00:00, end + 1 day 00:00)` bounds in UTC.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = (self.end + chrono::Duration::days(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();
        (start, end)
    }
}

/// Explicit correction of a stored metric. `None` leaves the field as is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricCorrection {
    pub open_rate: Option<f64>,
    pub conversion_rate: Option<f64>,
}

impl MetricCorrection {
    pub fn is_empty(&self) -> bool {
        self.open_rate.is_none() && self.conversion_rate.is_none()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(v) = self.open_rate {
            validate_rate("open_rate", v)?;
        }
        if let Some(v) = self.conversion_rate {
            validate_rate("conversion_rate", v)?;
        }
        Ok(())
    }
}

/// Years a stored timestamp may carry; outside this the store cannot write it.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

pub fn validate_timestamp(
    field: &'static str,
    at: DateTime<Utc>,
) -> Result<DateTime<Utc>, CoreError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&at.year()) {
        Ok(at)
    } else {
        Err(CoreError::TimestampOutOfRange {
            field,
            value: at.to_rfc3339(),
        })
    }
}

/// Rates are fractions; anything outside `[0, 1]` (or NaN) is rejected.
pub fn validate_rate(field: &'static str, value: f64) -> Result<f64, CoreError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(CoreError::RateOutOfRange { field, value })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailCampaign {
    pub id: String,
    pub name: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignDetail {
    pub campaign_id: String,
    pub open_rate: f64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignAnalysis {
    pub email_count: u64,
    pub average_open_rate: f64,
    pub average_conversion_rate: f64,
    pub detailed_metrics: Vec<CampaignDetail>,
}

/// Flatten each campaign's metrics into per-send details and average them.
///
/// Campaigns without metrics contribute nothing.
pub fn analyze_campaigns(campaigns: &[(EmailCampaign, Vec<MetricRecord>)]) -> CampaignAnalysis {
    let records: Vec<MetricRecord> = campaigns
        .iter()
        .flat_map(|(_, metrics)| metrics.iter().cloned())
        .collect();
    let summary = aggregate(&records);

    let detailed_metrics = campaigns
        .iter()
        .flat_map(|(campaign, metrics)| {
            metrics.iter().map(move |m| CampaignDetail {
                campaign_id: campaign.id.clone(),
                open_rate: m.open_rate,
                conversion_rate: m.conversion_rate,
            })
        })
        .collect();

    CampaignAnalysis {
        email_count: summary.total_count,
        average_open_rate: summary.average_open_rate,
        average_conversion_rate: summary.average_conversion_rate,
        detailed_metrics,
    }
}
