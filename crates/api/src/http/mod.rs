use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use survey_core::model::{
    InstanceId, InstanceStats, InstanceSummary, InstanceSurvey, Participation, ParticipationId,
    SurveyId,
};
use survey_core::{PartialSaveRequest, SubmitRequest};
use tracing::debug;

use crate::config::ApiConfig;
use crate::gateway::{ApiError, SubmitReceipt, SurveyApi};

mod mapping;

use mapping::{ParticipationRecord, status_error};

/// `SurveyApi` over HTTP with a cookie-backed session.
#[derive(Clone)]
pub struct HttpSurveyApi {
    client: Client,
    config: ApiConfig,
}

impl HttpSurveyApi {
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.config.endpoint(path)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path)?;
        debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        read_json(response).await
    }
}

fn stats_path(survey_id: SurveyId, instance_id: InstanceId) -> String {
    format!("surveys/{survey_id}/instances/{instance_id}/stats/")
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(status_error(status.as_u16(), &body));
    }
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl SurveyApi for HttpSurveyApi {
    async fn open_instances(&self) -> Result<Vec<InstanceSummary>, ApiError> {
        self.get_json("survey-instances/public/open/").await
    }

    async fn instance_survey(&self, instance_id: InstanceId) -> Result<InstanceSurvey, ApiError> {
        self.get_json(&format!("surveys/{instance_id}/public/")).await
    }

    async fn participation(&self, id: ParticipationId) -> Result<Participation, ApiError> {
        let record: ParticipationRecord = self
            .get_json(&format!("participations/{id}/results/"))
            .await?;
        Ok(record.into())
    }

    async fn save_partial(
        &self,
        instance_id: InstanceId,
        request: &PartialSaveRequest,
    ) -> Result<Participation, ApiError> {
        let record: ParticipationRecord = self
            .post_json(&format!("surveys/{instance_id}/save/"), request)
            .await?;
        Ok(record.into())
    }

    async fn submit(
        &self,
        instance_id: InstanceId,
        request: &SubmitRequest,
    ) -> Result<SubmitReceipt, ApiError> {
        self.post_json(&format!("surveys/{instance_id}/submit/"), request)
            .await
    }

    async fn instance_stats(
        &self,
        survey_id: SurveyId,
        instance_id: InstanceId,
    ) -> Result<InstanceStats, ApiError> {
        self.get_json(&stats_path(survey_id, instance_id)).await
    }
}
