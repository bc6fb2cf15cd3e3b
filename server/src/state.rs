use std::sync::{Arc, Mutex};

use studystream_core::{StudyResult, StudyService};

use crate::{config::Environment, error::ApiError};

/// Shared handler state. The service owns one SQLite connection, so calls
/// are serialized behind a mutex and run on the blocking pool.
#[derive(Clone)]
pub struct AppState {
    service: Arc<Mutex<StudyService>>,
    pub environment: Environment,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(service: StudyService, environment: Environment) -> Self {
        Self {
            bcrypt_cost: service.bcrypt_cost(),
            service: Arc::new(Mutex::new(service)),
            environment,
        }
    }

    /// Run a service call off the async runtime.
    pub async fn run<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&StudyService) -> StudyResult<T> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        self.blocking(move || {
            let guard = service.lock().unwrap_or_else(|e| e.into_inner());
            f(&guard)
        })
        .await
    }

    /// Run CPU-heavy work (password hashing) on the blocking pool without
    /// taking the service lock.
    pub async fn blocking<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce() -> StudyResult<T> + Send + 'static,
    {
        let result = tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| ApiError::Internal(format!("service task failed: {e}")))?;
        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use studystream_core::clock::FixedClock;

    use super::*;

    fn state() -> AppState {
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap());
        let service = StudyService::build_test(Box::new(clock)).unwrap();
        AppState::new(service, Environment::Development)
    }

    #[tokio::test]
    async fn blocking_work_does_not_wait_for_the_service() {
        let state = state();
        let held = state.service.lock().unwrap();

        let out = tokio::time::timeout(Duration::from_secs(5), state.blocking(|| Ok(7)))
            .await
            .expect("blocking work finished while the service was locked")
            .unwrap();
        assert_eq!(out, 7);
        drop(held);

        let cost = state.run(|s| Ok(s.bcrypt_cost())).await.unwrap();
        assert_eq!(cost, state.bcrypt_cost);
    }
}
