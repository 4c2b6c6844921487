use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coldreach_core::analytics::{DateRange, EmailCampaign, MetricCorrection, MetricRecord};
use coldreach_core::content::{
    AiModel, CreateDraftParams, CreateTemplateParams, Draft, DraftStatus, Edit, ModelFeedback,
    ModelType, Template, TemplateQuery, UpdateDraftParams, UpdateTemplateParams,
};
use coldreach_core::store::{ContentStore, MetricStore};

use crate::DuckDbBackend;

#[async_trait]
impl MetricStore for DuckDbBackend {
    async fn find_metrics_by_owner(&self, owner_id: &str) -> anyhow::Result<Vec<MetricRecord>> {
        self.find_metrics_by_owner_inner(owner_id).await
    }

    async fn find_all_metrics(
        &self,
        range: Option<DateRange>,
    ) -> anyhow::Result<Vec<MetricRecord>> {
        self.find_all_metrics_inner(range).await
    }

    async fn create_campaign(
        &self,
        name: &str,
        sent_at: DateTime<Utc>,
    ) -> anyhow::Result<EmailCampaign> {
        self.create_campaign_inner(name, sent_at).await
    }

    async fn get_campaign(&self, id: &str) -> anyhow::Result<Option<EmailCampaign>> {
        self.get_campaign_inner(id).await
    }

    async fn find_campaigns_sent_between(
        &self,
        range: DateRange,
        campaign_id: Option<&str>,
    ) -> anyhow::Result<Vec<(EmailCampaign, Vec<MetricRecord>)>> {
        self.find_campaigns_sent_between_inner(range, campaign_id)
            .await
    }

    async fn record_metric(
        &self,
        owner_id: &str,
        open_rate: f64,
        conversion_rate: f64,
        captured_at: DateTime<Utc>,
    ) -> anyhow::Result<MetricRecord> {
        self.record_metric_inner(owner_id, open_rate, conversion_rate, captured_at)
            .await
    }

    async fn correct_metric(
        &self,
        owner_id: &str,
        correction: MetricCorrection,
    ) -> anyhow::Result<Option<MetricRecord>> {
        self.correct_metric_inner(owner_id, correction).await
    }

    async fn delete_metrics_by_owner(&self, owner_id: &str) -> anyhow::Result<u64> {
        self.delete_metrics_by_owner_inner(owner_id).await
    }
}

#[async_trait]
impl ContentStore for DuckDbBackend {
    async fn create_template(&self, params: CreateTemplateParams) -> anyhow::Result<Template> {
        self.create_template_inner(params).await
    }

    async fn get_template(&self, id: &str) -> anyhow::Result<Option<Template>> {
        self.get_template_inner(id).await
    }

    async fn list_templates(
        &self,
        query: &TemplateQuery,
    ) -> anyhow::Result<(Vec<Template>, i64)> {
        self.list_templates_inner(query).await
    }

    async fn update_template(
        &self,
        id: &str,
        params: UpdateTemplateParams,
    ) -> anyhow::Result<Option<Template>> {
        self.update_template_inner(id, params).await
    }

    async fn delete_template(&self, id: &str) -> anyhow::Result<bool> {
        self.delete_template_inner(id).await
    }

    async fn create_draft(&self, params: CreateDraftParams) -> anyhow::Result<Draft> {
        self.create_draft_inner(params).await
    }

    async fn get_draft(&self, id: &str) -> anyhow::Result<Option<Draft>> {
        self.get_draft_inner(id).await
    }

    async fn list_drafts(&self) -> anyhow::Result<Vec<Draft>> {
        self.list_drafts_inner().await
    }

    async fn list_drafts_by_status(
        &self,
        status: DraftStatus,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> anyhow::Result<Vec<Draft>> {
        self.list_drafts_by_status_inner(status, limit, offset)
            .await
    }

    async fn update_draft(
        &self,
        id: &str,
        params: UpdateDraftParams,
    ) -> anyhow::Result<Option<Draft>> {
        self.update_draft_inner(id, params).await
    }

    async fn delete_draft(&self, id: &str) -> anyhow::Result<bool> {
        self.delete_draft_inner(id).await
    }

    async fn list_models(&self) -> anyhow::Result<Vec<AiModel>> {
        self.list_models_inner().await
    }

    async fn get_model(&self, id: &str) -> anyhow::Result<Option<AiModel>> {
        self.get_model_inner(id).await
    }

    async fn find_model_by_type(&self, model_type: ModelType) -> anyhow::Result<Option<AiModel>> {
        self.find_model_by_type_inner(model_type).await
    }

    async fn find_or_create_model(&self, model_type: ModelType) -> anyhow::Result<AiModel> {
        self.find_or_create_model_inner(model_type).await
    }

    async fn add_edit(&self, draft_id: &str, content: &str) -> anyhow::Result<Edit> {
        self.add_edit_inner(draft_id, content).await
    }

    async fn latest_edit(&self, draft_id: &str) -> anyhow::Result<Option<Edit>> {
        self.latest_edit_inner(draft_id).await
    }

    async fn record_model_feedback(
        &self,
        model_id: &str,
        metric_name: &str,
        value: f64,
        recorded_at: DateTime<Utc>,
    ) -> anyhow::Result<ModelFeedback> {
        self.record_model_feedback_inner(model_id, metric_name, value, recorded_at)
            .await
    }

    async fn list_model_feedback(
        &self,
        model_id: &str,
        metric_name: &str,
        range: DateRange,
    ) -> anyhow::Result<Vec<ModelFeedback>> {
        self.list_model_feedback_inner(model_id, metric_name, range)
            .await
    }
}
