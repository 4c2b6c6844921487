use anyhow::Result;
use chrono::{DateTime, SubsecRound, Utc};

use coldreach_core::analytics::{DateRange, EmailCampaign, MetricCorrection, MetricRecord};

use crate::backend::{generate_id, timestamp_column, to_sql_timestamp};
use crate::DuckDbBackend;

const METRIC_COLUMNS: &str =
    "id, campaign_id, open_rate, conversion_rate, CAST(created_at AS VARCHAR)";

fn map_metric(row: &duckdb::Row<'_>) -> duckdb::Result<MetricRecord> {
    Ok(MetricRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        open_rate: row.get(2)?,
        conversion_rate: row.get(3)?,
        captured_at: timestamp_column(row, 4)?,
    })
}

fn map_campaign(row: &duckdb::Row<'_>) -> duckdb::Result<EmailCampaign> {
    Ok(EmailCampaign {
        id: row.get(0)?,
        name: row.get(1)?,
        sent_at: timestamp_column(row, 2)?,
    })
}

fn query_metrics(
    conn: &duckdb::Connection,
    sql: &str,
    params: &[&dyn duckdb::types::ToSql],
) -> Result<Vec<MetricRecord>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_metric)?;
    let mut metrics = Vec::new();
    for row in rows {
        metrics.push(row?);
    }
    Ok(metrics)
}

impl DuckDbBackend {
    pub async fn create_campaign_inner(
        &self,
        name: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<EmailCampaign> {
        let conn = self.conn.lock().await;
        let campaign = EmailCampaign {
            id: generate_id("cmp"),
            name: name.to_string(),
            sent_at: sent_at.trunc_subsecs(6),
        };
        conn.execute(
            "INSERT INTO email_campaigns (id, name, sent_at) VALUES (?1, ?2, ?3)",
            duckdb::params![
                campaign.id,
                campaign.name,
                to_sql_timestamp(&campaign.sent_at)
            ],
        )?;
        Ok(campaign)
    }

    pub async fn get_campaign_inner(&self, id: &str) -> Result<Option<EmailCampaign>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, CAST(sent_at AS VARCHAR) FROM email_campaigns WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(duckdb::params![id], map_campaign)?;
        Ok(rows.next().transpose()?)
    }

    /// Metrics for one campaign in capture order. Insertion order breaks ties
    /// so the aggregator's stable sort sees a deterministic input.
    pub async fn find_metrics_by_owner_inner(&self, owner_id: &str) -> Result<Vec<MetricRecord>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "SELECT {METRIC_COLUMNS} FROM campaign_metrics WHERE campaign_id = ?1 \
             ORDER BY created_at, rowid"
        );
        query_metrics(&conn, &sql, duckdb::params![owner_id])
    }

    pub async fn find_all_metrics_inner(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<MetricRecord>> {
        let conn = self.conn.lock().await;
        match range {
            Some(range) => {
                let (start, end) = range.bounds();
                let sql = format!(
                    "SELECT {METRIC_COLUMNS} FROM campaign_metrics \
                     WHERE created_at >= CAST(?1 AS TIMESTAMP) AND created_at < CAST(?2 AS TIMESTAMP) \
                     ORDER BY created_at, rowid"
                );
                query_metrics(
                    &conn,
                    &sql,
                    duckdb::params![to_sql_timestamp(&start), to_sql_timestamp(&end)],
                )
            }
            None => {
                let sql = format!(
                    "SELECT {METRIC_COLUMNS} FROM campaign_metrics ORDER BY created_at, rowid"
                );
                query_metrics(&conn, &sql, duckdb::params![])
            }
        }
    }

    /// Campaigns sent within `range` (optionally a single one), each paired
    /// with its metrics in capture order.
    pub async fn find_campaigns_sent_between_inner(
        &self,
        range: DateRange,
        campaign_id: Option<&str>,
    ) -> Result<Vec<(EmailCampaign, Vec<MetricRecord>)>> {
        let (start, end) = range.bounds();
        let start = to_sql_timestamp(&start);
        let end = to_sql_timestamp(&end);
        let conn = self.conn.lock().await;

        let campaigns = {
            let mut campaigns = Vec::new();
            let base = "SELECT id, name, CAST(sent_at AS VARCHAR) FROM email_campaigns \
                        WHERE sent_at >= CAST(?1 AS TIMESTAMP) AND sent_at < CAST(?2 AS TIMESTAMP)";
            match campaign_id {
                Some(id) => {
                    let sql = format!("{base} AND id = ?3 ORDER BY sent_at, id");
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt.query_map(duckdb::params![start, end, id], map_campaign)?;
                    for row in rows {
                        campaigns.push(row?);
                    }
                }
                None => {
                    let sql = format!("{base} ORDER BY sent_at, id");
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt.query_map(duckdb::params![start, end], map_campaign)?;
                    for row in rows {
                        campaigns.push(row?);
                    }
                }
            }
            campaigns
        };

        let sql = format!(
            "SELECT {METRIC_COLUMNS} FROM campaign_metrics WHERE campaign_id = ?1 \
             ORDER BY created_at, rowid"
        );
        let mut result = Vec::with_capacity(campaigns.len());
        for campaign in campaigns {
            let metrics = query_metrics(&conn, &sql, duckdb::params![campaign.id])?;
            result.push((campaign, metrics));
        }
        Ok(result)
    }

    pub async fn record_metric_inner(
        &self,
        owner_id: &str,
        open_rate: f64,
        conversion_rate: f64,
        captured_at: DateTime<Utc>,
    ) -> Result<MetricRecord> {
        let conn = self.conn.lock().await;
        let record = MetricRecord {
            id: generate_id("met"),
            owner_id: owner_id.to_string(),
            open_rate,
            conversion_rate,
            captured_at: captured_at.trunc_subsecs(6),
        };
        conn.execute(
            "INSERT INTO campaign_metrics (id, campaign_id, open_rate, conversion_rate, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            duckdb::params![
                record.id,
                record.owner_id,
                record.open_rate,
                record.conversion_rate,
                to_sql_timestamp(&record.captured_at),
            ],
        )?;
        Ok(record)
    }

    pub async fn correct_metric_inner(
        &self,
        owner_id: &str,
        correction: MetricCorrection,
    ) -> Result<Option<MetricRecord>> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let sql = format!(
            "SELECT {METRIC_COLUMNS} FROM campaign_metrics WHERE campaign_id = ?1 \
             ORDER BY created_at, rowid LIMIT 1"
        );
        let Some(current) = query_metrics(&tx, &sql, duckdb::params![owner_id])?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        if correction.is_empty() {
            return Ok(Some(current));
        }

        let updated = MetricRecord {
            open_rate: correction.open_rate.unwrap_or(current.open_rate),
            conversion_rate: correction.conversion_rate.unwrap_or(current.conversion_rate),
            ..current
        };
        tx.execute(
            "UPDATE campaign_metrics SET open_rate = ?1, conversion_rate = ?2 WHERE id = ?3",
            duckdb::params![updated.open_rate, updated.conversion_rate, updated.id],
        )?;
        tx.commit()?;
        tracing::info!(owner_id, metric_id = %updated.id, "Campaign metric corrected");
        Ok(Some(updated))
    }

    pub async fn delete_metrics_by_owner_inner(&self, owner_id: &str) -> Result<u64> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute(
            "DELETE FROM campaign_metrics WHERE campaign_id = ?1",
            duckdb::params![owner_id],
        )?;
        Ok(deleted as u64)
    }
}
