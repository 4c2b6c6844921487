use anyhow::Result;
use chrono::{DateTime, SubsecRound, Utc};
use duckdb::Connection;

use coldreach_core::analytics::DateRange;
use coldreach_core::content::{AiModel, ModelFeedback, ModelType};

use crate::backend::{column_error, generate_id, now, timestamp_column, to_sql_timestamp};
use crate::DuckDbBackend;

const MODEL_COLUMNS: &str =
    "id, name, description, model_type, available, CAST(created_at AS VARCHAR)";

fn map_model(row: &duckdb::Row<'_>) -> duckdb::Result<AiModel> {
    let raw_type: String = row.get(3)?;
    Ok(AiModel {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        model_type: raw_type.parse().map_err(|e| column_error(3, e))?,
        available: row.get(4)?,
        created_at: timestamp_column(row, 5)?,
    })
}

fn map_feedback(row: &duckdb::Row<'_>) -> duckdb::Result<ModelFeedback> {
    Ok(ModelFeedback {
        id: row.get(0)?,
        model_id: row.get(1)?,
        metric_name: row.get(2)?,
        value: row.get(3)?,
        recorded_at: timestamp_column(row, 4)?,
    })
}

fn select_model_by_type(conn: &Connection, model_type: ModelType) -> Result<Option<AiModel>> {
    let sql = format!(
        "SELECT {MODEL_COLUMNS} FROM ai_models WHERE model_type = ?1 \
         ORDER BY created_at, id LIMIT 1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(duckdb::params![model_type.as_str()], map_model)?;
    Ok(rows.next().transpose()?)
}

fn insert_model_row(conn: &Connection, model_type: ModelType) -> Result<AiModel> {
    let model = AiModel {
        id: generate_id("mdl"),
        name: model_type.display_name().to_string(),
        description: model_type.description().to_string(),
        model_type,
        available: true,
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO ai_models (id, name, description, model_type, available, created_at) \
         VALUES (?1, ?2, ?3, ?4, TRUE, ?5)",
        duckdb::params![
            model.id,
            model.name,
            model.description,
            model.model_type.as_str(),
            to_sql_timestamp(&model.created_at),
        ],
    )?;
    tracing::info!(model_id = %model.id, model_type = %model_type, "AI model registered");
    Ok(model)
}

/// Lookup and insert run under the caller's lock, so at most one row per
/// type is ever created through this path.
pub(crate) fn find_or_insert_model(
    conn: &Connection,
    model_type: ModelType,
) -> Result<(AiModel, bool)> {
    match select_model_by_type(conn, model_type)? {
        Some(model) => Ok((model, false)),
        None => Ok((insert_model_row(conn, model_type)?, true)),
    }
}

impl DuckDbBackend {
    pub async fn insert_model(&self, model_type: ModelType) -> Result<AiModel> {
        let conn = self.conn.lock().await;
        insert_model_row(&conn, model_type)
    }

    pub async fn list_models_inner(&self) -> Result<Vec<AiModel>> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {MODEL_COLUMNS} FROM ai_models ORDER BY created_at, id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_model)?;
        let mut models = Vec::new();
        for row in rows {
            models.push(row?);
        }
        Ok(models)
    }

    pub async fn get_model_inner(&self, id: &str) -> Result<Option<AiModel>> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {MODEL_COLUMNS} FROM ai_models WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(duckdb::params![id], map_model)?;
        Ok(rows.next().transpose()?)
    }

    pub async fn find_model_by_type_inner(&self, model_type: ModelType) -> Result<Option<AiModel>> {
        let conn = self.conn.lock().await;
        select_model_by_type(&conn, model_type)
    }

    pub async fn find_or_create_model_inner(&self, model_type: ModelType) -> Result<AiModel> {
        let conn = self.conn.lock().await;
        let (model, _) = find_or_insert_model(&conn, model_type)?;
        Ok(model)
    }

    pub async fn record_model_feedback_inner(
        &self,
        model_id: &str,
        metric_name: &str,
        value: f64,
        recorded_at: DateTime<Utc>,
    ) -> Result<ModelFeedback> {
        let conn = self.conn.lock().await;
        let feedback = ModelFeedback {
            id: generate_id("fbk"),
            model_id: model_id.to_string(),
            metric_name: metric_name.to_string(),
            value,
            recorded_at: recorded_at.trunc_subsecs(6),
        };
        conn.execute(
            "INSERT INTO model_feedback (id, model_id, metric_name, value, recorded_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            duckdb::params![
                feedback.id,
                feedback.model_id,
                feedback.metric_name,
                feedback.value,
                to_sql_timestamp(&feedback.recorded_at),
            ],
        )?;
        Ok(feedback)
    }

    pub async fn list_model_feedback_inner(
        &self,
        model_id: &str,
        metric_name: &str,
        range: DateRange,
    ) -> Result<Vec<ModelFeedback>> {
        let (start, end) = range.bounds();
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, model_id, metric_name, value, CAST(recorded_at AS VARCHAR) \
             FROM model_feedback \
             WHERE model_id = ?1 AND metric_name = ?2 \
               AND recorded_at >= CAST(?3 AS TIMESTAMP) AND recorded_at < CAST(?4 AS TIMESTAMP) \
             ORDER BY recorded_at, id",
        )?;
        let rows = stmt.query_map(
            duckdb::params![
                model_id,
                metric_name,
                to_sql_timestamp(&start),
                to_sql_timestamp(&end)
            ],
            map_feedback,
        )?;
        let mut feedback = Vec::new();
        for row in rows {
            feedback.push(row?);
        }
        Ok(feedback)
    }
}
