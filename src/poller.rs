//! Polling of long-running generation operations.
//!
//! A job is submitted once, then re-queried on a fixed interval until the
//! service reports it done. The wait is bounded by an optional deadline and
//! an optional cap on status checks, and can be cancelled through a
//! [`CancellationToken`]. Cancelling or dropping the wait does not stop the
//! job on the service side.

use crate::ai::VideoGenerationService;
use crate::operation::{GeneratedMedia, GenerationRequest, Operation};
use crate::{Error, Result};
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_DEADLINE: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before each status check.
    pub interval: Duration,
    /// Upper bound on the whole wait, measured from the first status check.
    pub deadline: Option<Duration>,
    /// Upper bound on the number of status checks.
    pub max_polls: Option<usize>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            deadline: Some(DEFAULT_POLL_DEADLINE),
            max_polls: None,
        }
    }
}

impl PollConfig {
    /// Poll forever at `interval` unless cancelled.
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
            max_polls: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_max_polls(mut self, max_polls: usize) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    fn schedule(&self) -> Box<dyn Iterator<Item = Duration> + Send> {
        let delays = FixedInterval::new(self.interval);
        match self.max_polls {
            Some(limit) => Box::new(delays.take(limit)),
            None => Box::new(delays),
        }
    }
}

/// Drives one generation job from submission to a located media part.
pub struct OperationPoller<'a> {
    service: &'a dyn VideoGenerationService,
    config: PollConfig,
}

impl<'a> OperationPoller<'a> {
    pub fn new(service: &'a dyn VideoGenerationService, config: PollConfig) -> Self {
        Self { service, config }
    }

    /// Submit `request`, wait for the job, and return the first media part
    /// whose MIME type starts with `media_prefix`.
    pub async fn generate_media(
        &self,
        request: &GenerationRequest,
        media_prefix: &str,
        description: &str,
        cancel: &CancellationToken,
    ) -> Result<GeneratedMedia> {
        let operation = self.submit(request).await?;
        info!("Started operation {}", operation.name);

        let operation = self.wait_for_completion(operation, cancel).await?;
        resolve_media(&operation, media_prefix, description)
    }

    async fn submit(&self, request: &GenerationRequest) -> Result<Operation> {
        self.service.submit(request).await?.ok_or_else(|| {
            error!("Generation service returned no operation handle");
            Error::Submission("the service returned no operation handle".to_string())
        })
    }

    /// Re-query `operation` until it is done, the deadline passes, the poll
    /// budget runs out, or `cancel` fires.
    pub async fn wait_for_completion(
        &self,
        operation: Operation,
        cancel: &CancellationToken,
    ) -> Result<Operation> {
        let wait = self.poll_until_done(operation, cancel);
        match self.config.deadline {
            Some(deadline) => tokio::time::timeout(deadline, wait).await.map_err(|_| {
                warn!("Operation still pending after {:?}, giving up", deadline);
                Error::DeadlineExceeded(deadline)
            })?,
            None => wait.await,
        }
    }

    async fn poll_until_done(
        &self,
        mut operation: Operation,
        cancel: &CancellationToken,
    ) -> Result<Operation> {
        let mut schedule = self.config.schedule();
        let mut polls = 0usize;

        while !operation.done {
            let Some(delay) = schedule.next() else {
                warn!(
                    "Operation {} still pending after {} status checks",
                    operation.name, polls
                );
                return Err(Error::PollLimitExceeded(polls));
            };

            tokio::select! {
                _ = cancel.cancelled() => return Err(cancelled(&operation)),
                _ = tokio::time::sleep(delay) => {}
            }

            let next = tokio::select! {
                _ = cancel.cancelled() => return Err(cancelled(&operation)),
                next = self.service.check_operation(&operation) => next?,
            };
            operation = next;
            polls += 1;
            debug!(
                "Operation {} check #{}: done={}",
                operation.name, polls, operation.done
            );
        }

        info!("Operation {} finished after {} status checks", operation.name, polls);
        Ok(operation)
    }
}

fn cancelled(operation: &Operation) -> Error {
    info!(
        "Stopped waiting for operation {}; the remote job is not cancelled",
        operation.name
    );
    Error::Cancelled
}

/// Interpret a finished operation.
pub fn resolve_media(
    operation: &Operation,
    media_prefix: &str,
    description: &str,
) -> Result<GeneratedMedia> {
    if !operation.done {
        return Err(Error::Invariant(format!(
            "operation {} resolved before completion",
            operation.name
        )));
    }

    if let Some(err) = &operation.error {
        error!("Generation failed for {}: {}", operation.name, err.message);
        return Err(Error::Generation(err.message.clone()));
    }

    match operation.find_media(media_prefix) {
        Some((content_type, url)) => Ok(GeneratedMedia {
            url: url.to_string(),
            content_type: content_type.to_string(),
            description: description.to_string(),
        }),
        None => {
            error!(
                "No {}* part in output of {}: {}",
                media_prefix,
                operation.name,
                serde_json::to_string(&operation.result).unwrap_or_default()
            );
            Err(Error::NoMediaProduced)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockVideoClient;
    use crate::operation::ResultPart;

    const VIDEO_URL: &str = "https://generativelanguage.googleapis.com/v1beta/files/abc:download?alt=media";

    fn request() -> GenerationRequest {
        GenerationRequest::new("A potter shaping clay at dawn")
    }

    async fn run(client: &MockVideoClient, config: PollConfig) -> Result<GeneratedMedia> {
        let poller = OperationPoller::new(client, config);
        poller
            .generate_media(&request(), "video/", "promo", &CancellationToken::new())
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_video_locator_unchanged() {
        let client = MockVideoClient::new()
            .with_pending_polls(3)
            .with_video(VIDEO_URL);

        let media = run(&client, PollConfig::default()).await.unwrap();

        assert_eq!(media.url, VIDEO_URL);
        assert_eq!(media.content_type, "video/mp4");
        assert_eq!(media.description, "promo");
        assert_eq!(client.get_submit_count(), 1);
        assert_eq!(client.get_check_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_fixed_interval_between_checks() {
        let client = MockVideoClient::new()
            .with_pending_polls(2)
            .with_video(VIDEO_URL);
        let start = tokio::time::Instant::now();

        run(&client, PollConfig::unbounded(Duration::from_secs(5)))
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_error_becomes_generation_error() {
        let client = MockVideoClient::new()
            .with_pending_polls(1)
            .with_failure("Prompt violates usage guidelines");

        let err = run(&client, PollConfig::default()).await.unwrap_err();

        match err {
            Error::Generation(message) => {
                assert_eq!(message, "Prompt violates usage guidelines")
            }
            other => panic!("expected Generation error, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_video_part_is_no_media_produced() {
        let client = MockVideoClient::new().with_parts(vec![ResultPart::Text {
            text: "filtered by safety settings".to_string(),
        }]);

        let err = run(&client, PollConfig::default()).await.unwrap_err();
        assert!(matches!(err, Error::NoMediaProduced));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_handle_is_submission_error() {
        let client = MockVideoClient::new().without_operation();

        let err = run(&client, PollConfig::default()).await.unwrap_err();

        assert!(matches!(err, Error::Submission(_)));
        assert_eq!(client.get_check_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_done_operation_is_not_polled() {
        let client = MockVideoClient::new()
            .with_video(VIDEO_URL)
            .completed_on_submit();

        let media = run(&client, PollConfig::default()).await.unwrap();

        assert_eq!(media.url, VIDEO_URL);
        assert_eq!(client.get_check_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_wait_never_finishes_on_its_own() {
        let client = MockVideoClient::new().never_completes();
        let poller = OperationPoller::new(&client, PollConfig::unbounded(Duration::from_secs(5)));
        let cancel = CancellationToken::new();

        let outcome = tokio::time::timeout(
            Duration::from_secs(3602),
            poller.generate_media(&request(), "video/", "promo", &cancel),
        )
        .await;

        assert!(outcome.is_err());
        assert_eq!(client.get_check_count(), 720);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_the_wait() {
        let client = MockVideoClient::new().never_completes();
        let config = PollConfig::unbounded(Duration::from_secs(5))
            .with_deadline(Duration::from_secs(60));

        let err = run(&client, config).await.unwrap_err();

        assert!(matches!(err, Error::DeadlineExceeded(d) if d == Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_cap_bounds_the_wait() {
        let client = MockVideoClient::new().never_completes();
        let config = PollConfig::unbounded(Duration::from_secs(5)).with_max_polls(4);

        let err = run(&client, config).await.unwrap_err();

        assert!(matches!(err, Error::PollLimitExceeded(4)));
        assert_eq!(client.get_check_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_polling() {
        let client = MockVideoClient::new().never_completes();
        let poller = OperationPoller::new(&client, PollConfig::unbounded(Duration::from_secs(5)));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            trigger.cancel();
        });

        let err = poller
            .generate_media(&request(), "video/", "promo", &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(client.get_check_count(), 2);
    }

    #[tokio::test]
    async fn test_check_errors_propagate_without_retry() {
        let client = MockVideoClient::new().with_check_error("connection reset");
        let config = PollConfig::unbounded(Duration::from_millis(1));

        let err = run(&client, config).await.unwrap_err();

        assert!(matches!(err, Error::AiProvider(_)));
        assert_eq!(client.get_check_count(), 1);
    }

    #[test]
    fn test_resolve_rejects_pending_operation() {
        let err = resolve_media(&Operation::pending("operations/1"), "video/", "x").unwrap_err();
        assert!(matches!(err, Error::Invariant(_)));
    }

    #[test]
    fn test_error_wins_over_partial_output() {
        let mut op = Operation::failed("operations/1", Some(13), "internal");
        op.result = Some(vec![ResultPart::Media {
            content_type: "video/mp4".to_string(),
            url: VIDEO_URL.to_string(),
        }]);

        let err = resolve_media(&op, "video/", "x").unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }
}
