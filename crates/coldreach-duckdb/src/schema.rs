/// DuckDB initialization SQL.
///
/// Executed once at open time via `Connection::execute_batch`. Every statement
/// uses `IF NOT EXISTS`, so re-running it on each startup is a no-op.
///
/// Always set an explicit memory limit: the DuckDB default (80% of system
/// RAM) is not acceptable for a server process.
///
/// No foreign keys are declared. DuckDB checks them per statement, which makes
/// child-first cascades awkward; the delete paths in this crate remove child
/// rows themselves inside one transaction.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- TEMPLATES
-- ===========================================
CREATE TABLE IF NOT EXISTS templates (
    id              VARCHAR PRIMARY KEY,           -- 'tpl_' + 16 random chars
    title           VARCHAR NOT NULL,
    content         VARCHAR NOT NULL,
    category        VARCHAR NOT NULL DEFAULT 'General',
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_templates_category ON templates(category);

-- ===========================================
-- AI MODELS
-- ===========================================
CREATE TABLE IF NOT EXISTS ai_models (
    id              VARCHAR PRIMARY KEY,
    name            VARCHAR NOT NULL,
    description     VARCHAR NOT NULL DEFAULT '',
    model_type      VARCHAR NOT NULL,              -- 'GPT_4_TURBO' | 'CUSTOM_CHECKER'
    available       BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_ai_models_type ON ai_models(model_type);

-- ===========================================
-- DRAFTS (also the unit of AI-generated content and quality checks)
-- ===========================================
CREATE TABLE IF NOT EXISTS drafts (
    id              VARCHAR PRIMARY KEY,
    user_id         VARCHAR NOT NULL,
    model_id        VARCHAR,
    content         VARCHAR NOT NULL,
    status          VARCHAR NOT NULL,              -- 'GENERATED' | 'EDITED' | 'FINALIZED'
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_drafts_status ON drafts(status, created_at);

CREATE TABLE IF NOT EXISTS edits (
    id              VARCHAR PRIMARY KEY,
    draft_id        VARCHAR NOT NULL,
    content         VARCHAR NOT NULL,
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_edits_draft ON edits(draft_id, created_at);

-- ===========================================
-- CAMPAIGNS & METRICS
-- ===========================================
CREATE TABLE IF NOT EXISTS email_campaigns (
    id              VARCHAR PRIMARY KEY,
    name            VARCHAR NOT NULL,
    sent_at         TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_email_campaigns_sent ON email_campaigns(sent_at);

CREATE TABLE IF NOT EXISTS campaign_metrics (
    id              VARCHAR PRIMARY KEY,
    campaign_id     VARCHAR NOT NULL,
    open_rate       DOUBLE NOT NULL,               -- fraction in [0, 1]
    conversion_rate DOUBLE NOT NULL,               -- fraction in [0, 1]
    created_at      TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_campaign_metrics_campaign ON campaign_metrics(campaign_id, created_at);

-- ===========================================
-- MODEL FEEDBACK
-- ===========================================
CREATE TABLE IF NOT EXISTS model_feedback (
    id              VARCHAR PRIMARY KEY,
    model_id        VARCHAR NOT NULL,
    metric_name     VARCHAR NOT NULL,              -- e.g. 'accuracy', 'user_satisfaction'
    value           DOUBLE NOT NULL,
    recorded_at     TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_model_feedback_lookup ON model_feedback(model_id, metric_name, recorded_at);
"#
    )
}
