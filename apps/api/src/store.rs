//! Session persistence: plans, candidate profiles and final evaluations.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::models::interview::{InterviewEvaluation, InterviewSessionPlan};
use crate::models::profile::CandidateProfile;

/// A final evaluation as persisted. Written once per successful evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    pub session_id: String,
    pub evaluation: InterviewEvaluation,
    pub evaluated_at: DateTime<Utc>,
}

/// Storage seam behind `AppState`. Shared as `Arc<dyn SessionStore>`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_plan(&self, session_id: &str) -> Result<Option<InterviewSessionPlan>>;
    async fn save_plan(&self, plan: &InterviewSessionPlan) -> Result<()>;

    async fn load_profile(&self, candidate_id: &str) -> Result<Option<CandidateProfile>>;
    async fn save_profile(&self, candidate_id: &str, profile: &CandidateProfile) -> Result<()>;

    async fn load_evaluation(&self, session_id: &str) -> Result<Option<EvaluationRecord>>;
    async fn save_evaluation(&self, record: EvaluationRecord) -> Result<()>;
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    plans: RwLock<HashMap<String, InterviewSessionPlan>>,
    profiles: RwLock<HashMap<String, CandidateProfile>>,
    evaluations: RwLock<HashMap<String, EvaluationRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn load_plan(&self, session_id: &str) -> Result<Option<InterviewSessionPlan>> {
        Ok(self.plans.read().await.get(session_id).cloned())
    }

    async fn save_plan(&self, plan: &InterviewSessionPlan) -> Result<()> {
        self.plans
            .write()
            .await
            .insert(plan.session_id.clone(), plan.clone());
        Ok(())
    }

    async fn load_profile(&self, candidate_id: &str) -> Result<Option<CandidateProfile>> {
        Ok(self.profiles.read().await.get(candidate_id).cloned())
    }

    async fn save_profile(&self, candidate_id: &str, profile: &CandidateProfile) -> Result<()> {
        self.profiles
            .write()
            .await
            .insert(candidate_id.to_string(), profile.clone());
        Ok(())
    }

    async fn load_evaluation(&self, session_id: &str) -> Result<Option<EvaluationRecord>> {
        Ok(self.evaluations.read().await.get(session_id).cloned())
    }

    async fn save_evaluation(&self, record: EvaluationRecord) -> Result<()> {
        self.evaluations
            .write()
            .await
            .insert(record.session_id.clone(), record);
        Ok(())
    }
}
