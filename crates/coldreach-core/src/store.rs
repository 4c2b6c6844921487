//! Persistence capabilities consumed by the HTTP layer.
//!
//! Handlers only ever see `Arc<dyn MetricStore>` / `Arc<dyn ContentStore>`,
//! so a different backend can be swapped in without touching routes.
//! Missing rows are reported as `None`, `false` or an empty `Vec`; an `Err`
//! always means the store itself failed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::analytics::{DateRange, EmailCampaign, MetricCorrection, MetricRecord};
use crate::content::{
    AiModel, CreateDraftParams, CreateTemplateParams, Draft, DraftStatus, Edit, ModelFeedback,
    ModelType, Template, TemplateQuery, UpdateDraftParams, UpdateTemplateParams,
};

#[async_trait]
pub trait MetricStore: Send + Sync + 'static {
    /// All metrics recorded for one campaign. Unknown owners yield `[]`.
    async fn find_metrics_by_owner(&self, owner_id: &str) -> anyhow::Result<Vec<MetricRecord>>;

    /// All metrics, optionally restricted to `captured_at` within `range`.
    async fn find_all_metrics(&self, range: Option<DateRange>)
        -> anyhow::Result<Vec<MetricRecord>>;

    async fn create_campaign(
        &self,
        name: &str,
        sent_at: DateTime<Utc>,
    ) -> anyhow::Result<EmailCampaign>;

    async fn get_campaign(&self, id: &str) -> anyhow::Result<Option<EmailCampaign>>;

    /// Campaigns whose `sent_at` lies in `range`, each with its metrics.
    async fn find_campaigns_sent_between(
        &self,
        range: DateRange,
        campaign_id: Option<&str>,
    ) -> anyhow::Result<Vec<(EmailCampaign, Vec<MetricRecord>)>>;

    async fn record_metric(
        &self,
        owner_id: &str,
        open_rate: f64,
        conversion_rate: f64,
        captured_at: DateTime<Utc>,
    ) -> anyhow::Result<MetricRecord>;

    /// Apply `correction` to the owner's earliest metric.
    ///
    /// Returns `None` when the owner has no metrics. An empty correction
    /// returns the current record unchanged.
    async fn correct_metric(
        &self,
        owner_id: &str,
        correction: MetricCorrection,
    ) -> anyhow::Result<Option<MetricRecord>>;

    /// Returns the number of deleted records.
    async fn delete_metrics_by_owner(&self, owner_id: &str) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait ContentStore: Send + Sync + 'static {
    async fn create_template(&self, params: CreateTemplateParams) -> anyhow::Result<Template>;
    async fn get_template(&self, id: &str) -> anyhow::Result<Option<Template>>;
    /// Returns the requested page and the total matching count.
    async fn list_templates(&self, query: &TemplateQuery)
        -> anyhow::Result<(Vec<Template>, i64)>;
    async fn update_template(
        &self,
        id: &str,
        params: UpdateTemplateParams,
    ) -> anyhow::Result<Option<Template>>;
    async fn delete_template(&self, id: &str) -> anyhow::Result<bool>;

    async fn create_draft(&self, params: CreateDraftParams) -> anyhow::Result<Draft>;
    async fn get_draft(&self, id: &str) -> anyhow::Result<Option<Draft>>;
    async fn list_drafts(&self) -> anyhow::Result<Vec<Draft>>;
    /// Drafts in `status`, newest first.
    async fn list_drafts_by_status(
        &self,
        status: DraftStatus,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> anyhow::Result<Vec<Draft>>;
    async fn update_draft(
        &self,
        id: &str,
        params: UpdateDraftParams,
    ) -> anyhow::Result<Option<Draft>>;
    /// Deletes the draft and its edits.
    async fn delete_draft(&self, id: &str) -> anyhow::Result<bool>;

    async fn list_models(&self) -> anyhow::Result<Vec<AiModel>>;
    async fn get_model(&self, id: &str) -> anyhow::Result<Option<AiModel>>;
    async fn find_model_by_type(&self, model_type: ModelType) -> anyhow::Result<Option<AiModel>>;
    /// Return the first model of `model_type`, registering one if none exists.
    async fn find_or_create_model(&self, model_type: ModelType) -> anyhow::Result<AiModel>;

    async fn add_edit(&self, draft_id: &str, content: &str) -> anyhow::Result<Edit>;
    async fn latest_edit(&self, draft_id: &str) -> anyhow::Result<Option<Edit>>;

    async fn record_model_feedback(
        &self,
        model_id: &str,
        metric_name: &str,
        value: f64,
        recorded_at: DateTime<Utc>,
    ) -> anyhow::Result<ModelFeedback>;
    async fn list_model_feedback(
        &self,
        model_id: &str,
        metric_name: &str,
        range: DateRange,
    ) -> anyhow::Result<Vec<ModelFeedback>>;
}
