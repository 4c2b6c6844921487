use anyhow::Result;

use coldreach_core::content::{CreateDraftParams, Draft, DraftStatus, Edit, UpdateDraftParams};

use crate::backend::{column_error, generate_id, now, timestamp_column, to_sql_timestamp};
use crate::DuckDbBackend;

const DRAFT_COLUMNS: &str = "id, user_id, model_id, content, status, \
     CAST(created_at AS VARCHAR), CAST(updated_at AS VARCHAR)";

fn map_draft(row: &duckdb::Row<'_>) -> duckdb::Result<Draft> {
    let raw_status: String = row.get(4)?;
    Ok(Draft {
        id: row.get(0)?,
        user_id: row.get(1)?,
        model_id: row.get(2)?,
        content: row.get(3)?,
        status: raw_status.parse().map_err(|e| column_error(4, e))?,
        created_at: timestamp_column(row, 5)?,
        updated_at: timestamp_column(row, 6)?,
    })
}

fn map_edit(row: &duckdb::Row<'_>) -> duckdb::Result<Edit> {
    Ok(Edit {
        id: row.get(0)?,
        draft_id: row.get(1)?,
        content: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
    })
}

impl DuckDbBackend {
    pub async fn create_draft_inner(&self, params: CreateDraftParams) -> Result<Draft> {
        let conn = self.conn.lock().await;
        let created_at = now();
        let draft = Draft {
            id: generate_id("drf"),
            user_id: params.user_id,
            model_id: params.model_id,
            content: params.content,
            status: params.status,
            created_at,
            updated_at: created_at,
        };
        let ts = to_sql_timestamp(&created_at);
        conn.execute(
            "INSERT INTO drafts (id, user_id, model_id, content, status, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            duckdb::params![
                draft.id,
                draft.user_id,
                draft.model_id,
                draft.content,
                draft.status.as_str(),
                ts,
                ts
            ],
        )?;
        Ok(draft)
    }

    pub async fn get_draft_inner(&self, id: &str) -> Result<Option<Draft>> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {DRAFT_COLUMNS} FROM drafts WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(duckdb::params![id], map_draft)?;
        Ok(rows.next().transpose()?)
    }

    pub async fn list_drafts_inner(&self) -> Result<Vec<Draft>> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {DRAFT_COLUMNS} FROM drafts ORDER BY created_at DESC, id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_draft)?;
        let mut drafts = Vec::new();
        for row in rows {
            drafts.push(row?);
        }
        Ok(drafts)
    }

    /// `limit = None` returns every matching draft.
    pub async fn list_drafts_by_status_inner(
        &self,
        status: DraftStatus,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Draft>> {
        let conn = self.conn.lock().await;
        let offset = offset.unwrap_or(0).max(0);
        let base = format!(
            "SELECT {DRAFT_COLUMNS} FROM drafts WHERE status = ?1 ORDER BY created_at DESC, id"
        );

        let (sql, params): (String, Vec<Box<dyn duckdb::types::ToSql>>) = match limit {
            Some(limit) => (
                format!("{base} LIMIT ?2 OFFSET ?3"),
                vec![
                    Box::new(status.as_str().to_string()) as Box<dyn duckdb::types::ToSql>,
                    Box::new(limit.max(0)),
                    Box::new(offset),
                ],
            ),
            None => (
                format!("{base} OFFSET ?2"),
                vec![
                    Box::new(status.as_str().to_string()) as Box<dyn duckdb::types::ToSql>,
                    Box::new(offset),
                ],
            ),
        };

        let param_refs: Vec<&dyn duckdb::types::ToSql> =
            params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), map_draft)?;
        let mut drafts = Vec::new();
        for row in rows {
            drafts.push(row?);
        }
        Ok(drafts)
    }

    pub async fn update_draft_inner(
        &self,
        id: &str,
        params: UpdateDraftParams,
    ) -> Result<Option<Draft>> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let exists: i64 = tx
            .prepare("SELECT COUNT(*) FROM drafts WHERE id = ?1")?
            .query_row(duckdb::params![id], |row| row.get(0))?;
        if exists == 0 {
            return Ok(None);
        }

        let ts = to_sql_timestamp(&now());
        if let Some(ref content) = params.content {
            tx.execute(
                "UPDATE drafts SET content = ?1, updated_at = ?2 WHERE id = ?3",
                duckdb::params![content, ts, id],
            )?;
        }
        if let Some(status) = params.status {
            tx.execute(
                "UPDATE drafts SET status = ?1, updated_at = ?2 WHERE id = ?3",
                duckdb::params![status.as_str(), ts, id],
            )?;
        }
        if let Some(ref model_id) = params.model_id {
            tx.execute(
                "UPDATE drafts SET model_id = ?1, updated_at = ?2 WHERE id = ?3",
                duckdb::params![model_id, ts, id],
            )?;
        }

        let sql = format!("SELECT {DRAFT_COLUMNS} FROM drafts WHERE id = ?1");
        let draft = tx.prepare(&sql)?.query_row(duckdb::params![id], map_draft)?;
        tx.commit()?;
        Ok(Some(draft))
    }

    /// Delete a draft and its edits in one transaction (edits first).
    pub async fn delete_draft_inner(&self, id: &str) -> Result<bool> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM edits WHERE draft_id = ?1", duckdb::params![id])?;
        let deleted = tx.execute("DELETE FROM drafts WHERE id = ?1", duckdb::params![id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    pub async fn add_edit_inner(&self, draft_id: &str, content: &str) -> Result<Edit> {
        let conn = self.conn.lock().await;
        let edit = Edit {
            id: generate_id("edt"),
            draft_id: draft_id.to_string(),
            content: content.to_string(),
            created_at: now(),
        };
        conn.execute(
            "INSERT INTO edits (id, draft_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            duckdb::params![
                edit.id,
                edit.draft_id,
                edit.content,
                to_sql_timestamp(&edit.created_at)
            ],
        )?;
        Ok(edit)
    }

    pub async fn latest_edit_inner(&self, draft_id: &str) -> Result<Option<Edit>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, draft_id, content, CAST(created_at AS VARCHAR) FROM edits \
             WHERE draft_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
        )?;
        let mut rows = stmt.query_map(duckdb::params![draft_id], map_edit)?;
        Ok(rows.next().transpose()?)
    }
}
