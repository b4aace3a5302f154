//! Endpoint chain for the generation service.
//!
//! Generation replicas are listed in order of preference. Each endpoint gets
//! its own deadline; a timeout, overload or error moves the request to the
//! next endpoint. The chain's total budget is the sum of those deadlines, and
//! it reports that budget through [`Generator::time_budget`] so an outer
//! deadline never starves the later endpoints.

use async_trait::async_trait;
use lingobridge_core::error::GenerationError;
use lingobridge_core::generation::{GenerationRequest, Generator};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Ordered generation endpoints tried until one answers.
pub struct FallbackGenerator {
    name: String,
    endpoints: Vec<Endpoint>,
}

struct Endpoint {
    generator: Arc<dyn Generator>,
    deadline: Duration,
}

impl FallbackGenerator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoints: Vec::new(),
        }
    }

    /// Append an endpoint that may take up to `deadline` per request.
    pub fn endpoint(mut self, generator: Arc<dyn Generator>, deadline: Duration) -> Self {
        self.endpoints.push(Endpoint { generator, deadline });
        self
    }

    /// Worst-case duration of one request through the whole chain.
    pub fn budget(&self) -> Duration {
        self.endpoints.iter().map(|e| e.deadline).sum()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[async_trait]
impl Generator for FallbackGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<String, GenerationError> {
        let Some((last, rest)) = self.endpoints.split_last() else {
            return Err(GenerationError::NotConfigured(
                "no generation endpoints configured".into(),
            ));
        };

        let started = Instant::now();
        for (attempt, endpoint) in rest.iter().enumerate() {
            match attempt_endpoint(endpoint, request.clone()).await {
                Ok(text) => return Ok(text),
                Err(e) => warn!(
                    endpoint = %endpoint.generator.name(),
                    attempt = attempt + 1,
                    total = self.endpoints.len(),
                    error = %e,
                    "Generation endpoint failed, trying next"
                ),
            }
        }

        let result = attempt_endpoint(last, request).await;
        match &result {
            Ok(_) if !rest.is_empty() => info!(
                endpoint = %last.generator.name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Answered by last generation endpoint"
            ),
            Err(e) => warn!(
                endpoints = self.endpoints.len(),
                error = %e,
                "All generation endpoints failed"
            ),
            Ok(_) => {}
        }
        result
    }

    /// Healthy when any endpoint is; otherwise the last probe's error.
    async fn health_check(&self) -> std::result::Result<bool, GenerationError> {
        let mut outcome = Ok(false);
        for endpoint in &self.endpoints {
            match tokio::time::timeout(endpoint.deadline, endpoint.generator.health_check()).await
            {
                Ok(Ok(true)) => return Ok(true),
                Ok(other) => outcome = other,
                Err(_) => outcome = Err(timed_out(endpoint)),
            }
        }
        outcome
    }

    fn time_budget(&self) -> Option<Duration> {
        Some(self.budget())
    }
}

async fn attempt_endpoint(
    endpoint: &Endpoint,
    request: GenerationRequest,
) -> std::result::Result<String, GenerationError> {
    debug!(endpoint = %endpoint.generator.name(), "Sending to generation endpoint");
    tokio::time::timeout(endpoint.deadline, endpoint.generator.generate(request))
        .await
        .unwrap_or_else(|_| Err(timed_out(endpoint)))
}

fn timed_out(endpoint: &Endpoint) -> GenerationError {
    GenerationError::Timeout(format!(
        "{} gave no answer within {:?}",
        endpoint.generator.name(),
        endpoint.deadline
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingobridge_core::mode::ModeConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behaviour {
        Answer(&'static str),
        Fail(GenerationError),
        /// Answer after a delay
        Slow(Duration, &'static str),
        Hang,
    }

    /// A replica with fixed behaviour that counts its requests.
    struct Replica {
        name: &'static str,
        behaviour: Behaviour,
        requests: AtomicUsize,
    }

    impl Replica {
        fn new(name: &'static str, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                name,
                behaviour,
                requests: AtomicUsize::new(0),
            })
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Generator for Replica {
        fn name(&self) -> &str {
            self.name
        }

        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> std::result::Result<String, GenerationError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            match &self.behaviour {
                Behaviour::Answer(text) => Ok(text.to_string()),
                Behaviour::Fail(e) => Err(e.clone()),
                Behaviour::Slow(delay, text) => {
                    tokio::time::sleep(*delay).await;
                    Ok(text.to_string())
                }
                Behaviour::Hang => std::future::pending().await,
            }
        }

        async fn health_check(&self) -> std::result::Result<bool, GenerationError> {
            match &self.behaviour {
                Behaviour::Fail(e) => Err(e.clone()),
                Behaviour::Hang => std::future::pending().await,
                _ => Ok(true),
            }
        }
    }

    fn request() -> GenerationRequest {
        let mode = ModeConfig::balanced();
        GenerationRequest {
            prompt: "Question: 你好\nAnswer: ".into(),
            params: mode.generation.effective(),
            max_input_length: mode.max_input_length,
        }
    }

    const SECOND: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn preferred_endpoint_answers() {
        let primary = Replica::new("primary", Behaviour::Answer("你好"));
        let backup = Replica::new("backup", Behaviour::Answer("备用"));
        let chain = FallbackGenerator::new("chain")
            .endpoint(primary.clone(), SECOND)
            .endpoint(backup.clone(), SECOND);

        assert_eq!(chain.generate(request()).await.unwrap(), "你好");
        assert_eq!(primary.requests(), 1);
        assert_eq!(backup.requests(), 0);
    }

    #[tokio::test]
    async fn overloaded_endpoint_hands_over() {
        let primary = Replica::new(
            "primary",
            Behaviour::Fail(GenerationError::ResourceExhausted("CUDA out of memory".into())),
        );
        let backup = Replica::new("backup", Behaviour::Answer("备用"));
        let chain = FallbackGenerator::new("chain")
            .endpoint(primary.clone(), SECOND)
            .endpoint(backup.clone(), SECOND);

        assert_eq!(chain.generate(request()).await.unwrap(), "备用");
        assert_eq!(primary.requests(), 1);
        assert_eq!(backup.requests(), 1);
    }

    #[tokio::test]
    async fn last_endpoint_error_is_returned() {
        let chain = FallbackGenerator::new("chain")
            .endpoint(
                Replica::new("a", Behaviour::Fail(GenerationError::Network("refused".into()))),
                SECOND,
            )
            .endpoint(
                Replica::new(
                    "b",
                    Behaviour::Fail(GenerationError::ServiceError {
                        status_code: 500,
                        message: "boom".into(),
                    }),
                ),
                SECOND,
            );

        match chain.generate(request()).await.unwrap_err() {
            GenerationError::ServiceError { status_code, .. } => assert_eq!(status_code, 500),
            other => panic!("Expected ServiceError, got: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_endpoint_times_out_and_slow_backup_answers() {
        let backup = Replica::new("backup", Behaviour::Slow(Duration::from_millis(50), "备用"));
        let chain = FallbackGenerator::new("chain")
            .endpoint(Replica::new("primary", Behaviour::Hang), Duration::from_millis(200))
            .endpoint(backup.clone(), Duration::from_millis(200));

        assert_eq!(chain.generate(request()).await.unwrap(), "备用");
        assert_eq!(backup.requests(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn every_endpoint_hanging_is_a_timeout() {
        let chain = FallbackGenerator::new("chain")
            .endpoint(Replica::new("a", Behaviour::Hang), Duration::from_millis(10))
            .endpoint(Replica::new("b", Behaviour::Hang), Duration::from_millis(10));

        match chain.generate(request()).await.unwrap_err() {
            GenerationError::Timeout(message) => assert!(message.starts_with("b ")),
            other => panic!("Expected Timeout, got: {other:?}"),
        }
    }

    #[test]
    fn budget_covers_every_endpoint() {
        let chain = FallbackGenerator::new("chain")
            .endpoint(Replica::new("a", Behaviour::Hang), Duration::from_secs(30))
            .endpoint(Replica::new("b", Behaviour::Hang), Duration::from_secs(45));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.time_budget(), Some(Duration::from_secs(75)));
    }

    #[tokio::test]
    async fn empty_chain_is_not_configured() {
        let chain = FallbackGenerator::new("empty");
        assert!(chain.is_empty());
        assert!(matches!(
            chain.generate(request()).await.unwrap_err(),
            GenerationError::NotConfigured(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn health_is_any_endpoint_healthy() {
        let healthy = FallbackGenerator::new("chain")
            .endpoint(Replica::new("hung", Behaviour::Hang), Duration::from_millis(10))
            .endpoint(Replica::new("good", Behaviour::Answer("ok")), SECOND);
        assert!(healthy.health_check().await.unwrap());

        let down = FallbackGenerator::new("chain").endpoint(
            Replica::new("bad", Behaviour::Fail(GenerationError::Network("down".into()))),
            SECOND,
        );
        assert!(matches!(
            down.health_check().await.unwrap_err(),
            GenerationError::Network(_)
        ));
    }
}
