use anyhow::Result;

use coldreach_core::content::{CreateTemplateParams, Template, TemplateQuery, UpdateTemplateParams};

use crate::backend::{generate_id, now, timestamp_column, to_sql_timestamp};
use crate::DuckDbBackend;

const TEMPLATE_COLUMNS: &str = "id, title, content, category, \
     CAST(created_at AS VARCHAR), CAST(updated_at AS VARCHAR)";

fn map_template(row: &duckdb::Row<'_>) -> duckdb::Result<Template> {
    Ok(Template {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        created_at: timestamp_column(row, 4)?,
        updated_at: timestamp_column(row, 5)?,
    })
}

impl DuckDbBackend {
    pub async fn create_template_inner(&self, params: CreateTemplateParams) -> Result<Template> {
        let conn = self.conn.lock().await;
        let created_at = now();
        let template = Template {
            id: generate_id("tpl"),
            title: params.title,
            content: params.content,
            category: params.category,
            created_at,
            updated_at: created_at,
        };
        let ts = to_sql_timestamp(&created_at);
        conn.execute(
            "INSERT INTO templates (id, title, content, category, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            duckdb::params![
                template.id,
                template.title,
                template.content,
                template.category,
                ts,
                ts
            ],
        )?;
        Ok(template)
    }

    pub async fn get_template_inner(&self, id: &str) -> Result<Option<Template>> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = ?1");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(duckdb::params![id], map_template)?;
        Ok(rows.next().transpose()?)
    }

    /// Returns one page of templates ordered by `created_at` plus the total
    /// count for the same category filter.
    pub async fn list_templates_inner(&self, query: &TemplateQuery) -> Result<(Vec<Template>, i64)> {
        let conn = self.conn.lock().await;
        let direction = query.sort.as_sql();
        let limit = query.page.limit;
        let offset = query.page.offset();

        let (total, templates) = match query.category.as_deref() {
            Some(category) => {
                let total: i64 = conn
                    .prepare("SELECT COUNT(*) FROM templates WHERE category = ?1")?
                    .query_row(duckdb::params![category], |row| row.get(0))?;
                let sql = format!(
                    "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE category = ?1 \
                     ORDER BY created_at {direction}, id {direction} LIMIT ?2 OFFSET ?3"
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows =
                    stmt.query_map(duckdb::params![category, limit, offset], map_template)?;
                let mut templates = Vec::new();
                for row in rows {
                    templates.push(row?);
                }
                (total, templates)
            }
            None => {
                let total: i64 = conn
                    .prepare("SELECT COUNT(*) FROM templates")?
                    .query_row([], |row| row.get(0))?;
                let sql = format!(
                    "SELECT {TEMPLATE_COLUMNS} FROM templates \
                     ORDER BY created_at {direction}, id {direction} LIMIT ?1 OFFSET ?2"
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(duckdb::params![limit, offset], map_template)?;
                let mut templates = Vec::new();
                for row in rows {
                    templates.push(row?);
                }
                (total, templates)
            }
        };

        Ok((templates, total))
    }

    pub async fn update_template_inner(
        &self,
        id: &str,
        params: UpdateTemplateParams,
    ) -> Result<Option<Template>> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let exists: i64 = tx
            .prepare("SELECT COUNT(*) FROM templates WHERE id = ?1")?
            .query_row(duckdb::params![id], |row| row.get(0))?;
        if exists == 0 {
            return Ok(None);
        }

        // A NULL category keeps the stored one.
        tx.execute(
            "UPDATE templates SET title = ?1, content = ?2, \
             category = COALESCE(?3, category), updated_at = ?4 WHERE id = ?5",
            duckdb::params![
                params.title,
                params.content,
                params.category,
                to_sql_timestamp(&now()),
                id
            ],
        )?;

        let sql = format!("SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = ?1");
        let template = tx
            .prepare(&sql)?
            .query_row(duckdb::params![id], map_template)?;
        tx.commit()?;
        Ok(Some(template))
    }

    pub async fn delete_template_inner(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let deleted = conn.execute("DELETE FROM templates WHERE id = ?1", duckdb::params![id])?;
        Ok(deleted > 0)
    }
}
