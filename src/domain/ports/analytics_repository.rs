use crate::domain::entities::{
    ConsultationFact, ConsumptionRow, DashboardSummary, DerivationFact, MonthlyCount,
};
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

/// Read-only aggregation queries; dates are inclusive `YYYY-MM-DD` bounds.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn consultation_facts(
        &self,
        from: &str,
        to: &str,
        department_id: Option<&str>,
    ) -> ApiResult<Vec<ConsultationFact>>;
    async fn derivation_facts(&self, from: &str, to: &str) -> ApiResult<Vec<DerivationFact>>;
    async fn monthly_counts(
        &self,
        from: &str,
        to: &str,
        department_id: Option<&str>,
    ) -> ApiResult<Vec<MonthlyCount>>;
    async fn consumption_rows(
        &self,
        from: &str,
        to: &str,
        department_id: Option<&str>,
    ) -> ApiResult<Vec<ConsumptionRow>>;
    /// `(id, name)` of every department, or only `department_id` when given.
    async fn department_names(&self, department_id: Option<&str>)
        -> ApiResult<Vec<(String, String)>>;
    async fn dashboard_summary(&self) -> ApiResult<DashboardSummary>;
}
