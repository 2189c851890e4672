//! In-memory job store for asynchronous conversions
//!
//! A proxied conversion submitted as a job is recorded under a fresh id; the
//! background task writes its outcome back so clients can poll for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Succeeded {
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
    Failed {
        error: String,
    },
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: Uuid,
    #[serde(flatten)]
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<Uuid, Job>>>,
    ttl: Duration,
}

impl JobStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Register a new processing job and return its id.
    pub async fn create(&self) -> Uuid {
        let now = Utc::now();
        let job = Job {
            job_id: Uuid::new_v4(),
            status: JobStatus::Processing,
            created_at: now,
            updated_at: now,
        };
        let id = job.job_id;

        let mut jobs = self.jobs.write().await;
        prune_expired(&mut jobs, self.ttl, now);
        jobs.insert(id, job);
        id
    }

    /// Record the outcome of a job. Returns false if the id is unknown.
    pub async fn complete(&self, id: Uuid, status: JobStatus) -> bool {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) => {
                job.status = status;
                job.updated_at = Utc::now();
                true
            }
            None => {
                tracing::warn!("Job {} finished after it was pruned", id);
                false
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn prune_expired(jobs: &mut HashMap<Uuid, Job>, ttl: Duration, now: DateTime<Utc>) {
    let Ok(ttl) = chrono::Duration::from_std(ttl) else {
        return;
    };
    let before = jobs.len();
    jobs.retain(|_, job| !job.status.is_finished() || now - job.updated_at < ttl);
    let pruned = before - jobs.len();
    if pruned > 0 {
        tracing::debug!("Pruned {} finished jobs", pruned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_job_lifecycle() {
        let store = JobStore::new(Duration::from_secs(60));
        let id = store.create().await;
        assert_eq!(store.get(id).await.unwrap().status, JobStatus::Processing);

        assert!(
            store
                .complete(
                    id,
                    JobStatus::Succeeded {
                        image_url: "https://cdn/a.jpg".to_string()
                    }
                )
                .await
        );
        let job = store.get(id).await.unwrap();
        assert!(job.status.is_finished());
        assert!(job.updated_at >= job.created_at);
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let store = JobStore::new(Duration::from_secs(60));
        assert!(store.get(Uuid::new_v4()).await.is_none());
        assert!(
            !store
                .complete(Uuid::new_v4(), JobStatus::Processing)
                .await
        );
    }

    #[tokio::test]
    async fn test_finished_jobs_are_pruned_after_ttl() {
        let store = JobStore::new(Duration::from_millis(10));
        let finished = store.create().await;
        let running = store.create().await;
        store
            .complete(
                finished,
                JobStatus::Failed {
                    error: "boom".to_string(),
                },
            )
            .await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        let fresh = store.create().await;

        assert!(store.get(finished).await.is_none());
        assert!(store.get(running).await.is_some());
        assert!(store.get(fresh).await.is_some());
        assert_eq!(store.len().await, 2);
    }

    #[test]
    fn test_job_serialization() {
        let job = Job {
            job_id: Uuid::nil(),
            status: JobStatus::Succeeded {
                image_url: "https://cdn/a.jpg".to_string(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["status"], "succeeded");
        assert_eq!(json["imageUrl"], "https://cdn/a.jpg");
        assert_eq!(json["jobId"], Uuid::nil().to_string());
    }
}
