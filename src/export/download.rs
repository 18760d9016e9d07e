//! Bounded-concurrency image downloading.
//!
//! All fetches are polled from the caller's task, so settlement handlers run
//! one at a time between suspension points and can mutate the caller's state
//! (archive table, counters) without locks.

use futures::stream::{self, FuturesUnordered, StreamExt};

use super::fetcher::ImageFetcher;
use super::plan::DownloadTask;
use crate::config::{ConcurrencyMode, ExportConfig};
use crate::error::FetchError;
use crate::retry::fetch_with_retry;

/// Outcome of one settled download
pub(crate) type FetchOutcome = Result<Vec<u8>, FetchError>;

/// Fetch every task, calling `on_settled` once per task as it settles
///
/// In [`ConcurrencyMode::Batched`] tasks run in chunks of `config.concurrency`
/// and a chunk starts only after every task of the previous chunk settled.
/// In [`ConcurrencyMode::Pooled`] up to `config.concurrency` fetches are kept in
/// flight. Either way settlement order within the window is unspecified.
pub(crate) async fn download_all<F>(
    tasks: &[DownloadTask],
    fetcher: &dyn ImageFetcher,
    config: &ExportConfig,
    mut on_settled: F,
) where
    F: FnMut(&DownloadTask, FetchOutcome),
{
    let limit = config.concurrency.max(1);

    match config.mode {
        ConcurrencyMode::Batched => {
            for (batch_index, batch) in tasks.chunks(limit).enumerate() {
                tracing::debug!(
                    batch = batch_index + 1,
                    size = batch.len(),
                    "starting download batch"
                );
                let mut in_flight: FuturesUnordered<_> = batch
                    .iter()
                    .map(|task| fetch_task(task, fetcher, config))
                    .collect();
                while let Some((task, outcome)) = in_flight.next().await {
                    on_settled(task, outcome);
                }
            }
        }
        ConcurrencyMode::Pooled => {
            let mut in_flight = stream::iter(tasks)
                .map(|task| fetch_task(task, fetcher, config))
                .buffer_unordered(limit);
            while let Some((task, outcome)) = in_flight.next().await {
                on_settled(task, outcome);
            }
        }
    }
}

async fn fetch_task<'a>(
    task: &'a DownloadTask,
    fetcher: &dyn ImageFetcher,
    config: &ExportConfig,
) -> (&'a DownloadTask, FetchOutcome) {
    let url = task.source_url.as_str();
    let outcome = fetch_with_retry(&config.retry, move || async move {
        match config.fetch_timeout {
            Some(after) => tokio::time::timeout(after, fetcher.fetch(url))
                .await
                .unwrap_or(Err(FetchError::Timeout { after })),
            None => fetcher.fetch(url).await,
        }
    })
    .await;
    (task, outcome)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_helpers::{Script, ScriptedFetcher, tasks};
    use std::time::Duration;

    fn config(concurrency: usize, mode: ConcurrencyMode) -> ExportConfig {
        ExportConfig {
            concurrency,
            mode,
            ..ExportConfig::default()
        }
    }

    #[tokio::test]
    async fn every_task_settles_exactly_once() {
        let fetcher = ScriptedFetcher::new()
            .with("https://img.test/2.jpg", Script::fail(404))
            .with("https://img.test/5.jpg", Script::fail(500));
        let tasks = tasks(7);

        let mut settled = Vec::new();
        download_all(&tasks, &fetcher, &config(3, ConcurrencyMode::Batched), |task, outcome| {
            settled.push((task.target_name.clone(), outcome.is_ok()));
        })
        .await;

        settled.sort();
        assert_eq!(settled.len(), 7);
        assert_eq!(settled.iter().filter(|(_, ok)| !ok).count(), 2);
    }

    #[tokio::test]
    async fn batched_mode_never_exceeds_limit_and_enforces_barrier() {
        let fetcher = ScriptedFetcher::new().with_default(Script::delay_ms(20));
        let tasks = tasks(12);

        download_all(&tasks, &fetcher, &config(5, ConcurrencyMode::Batched), |_, _| {}).await;

        assert_eq!(fetcher.max_in_flight(), 5);
        let log = fetcher.log();
        // Task 6 (index 5) starts only after tasks 1-5 all finished
        let start_6 = log.start_of("https://img.test/6.jpg");
        for i in 1..=5 {
            assert!(
                log.end_of(&format!("https://img.test/{i}.jpg")) < start_6,
                "task {i} must settle before task 6 starts"
            );
        }
        let start_11 = log.start_of("https://img.test/11.jpg");
        for i in 6..=10 {
            assert!(log.end_of(&format!("https://img.test/{i}.jpg")) < start_11);
        }
    }

    #[tokio::test]
    async fn batch_barrier_holds_when_one_task_is_slow() {
        let fetcher = ScriptedFetcher::new()
            .with_default(Script::delay_ms(1))
            .with("https://img.test/1.jpg", Script::delay_ms(80));
        let tasks = tasks(6);

        download_all(&tasks, &fetcher, &config(5, ConcurrencyMode::Batched), |_, _| {}).await;

        let log = fetcher.log();
        assert!(log.end_of("https://img.test/1.jpg") < log.start_of("https://img.test/6.jpg"));
    }

    #[tokio::test]
    async fn pooled_mode_refills_without_waiting_for_the_slowest() {
        let fetcher = ScriptedFetcher::new()
            .with_default(Script::delay_ms(1))
            .with("https://img.test/1.jpg", Script::delay_ms(200));
        let tasks = tasks(6);

        download_all(&tasks, &fetcher, &config(5, ConcurrencyMode::Pooled), |_, _| {}).await;

        assert!(fetcher.max_in_flight() <= 5);
        let log = fetcher.log();
        assert!(
            log.start_of("https://img.test/6.jpg") < log.end_of("https://img.test/1.jpg"),
            "task 6 should start while task 1 is still in flight"
        );
    }

    #[tokio::test]
    async fn hung_fetch_is_cut_off_by_the_timeout() {
        let fetcher = ScriptedFetcher::new().with("https://img.test/1.jpg", Script::delay_ms(5_000));
        let tasks = tasks(1);
        let mut config = config(5, ConcurrencyMode::Batched);
        config.fetch_timeout = Some(Duration::from_millis(30));

        let mut outcomes = Vec::new();
        download_all(&tasks, &fetcher, &config, |_, outcome| outcomes.push(outcome)).await;

        assert!(matches!(
            outcomes.as_slice(),
            [Err(FetchError::Timeout { .. })]
        ));
    }

    #[tokio::test]
    async fn transient_failures_are_retried_when_configured() {
        let fetcher =
            ScriptedFetcher::new().with("https://img.test/1.jpg", Script::fail_times(503, 2));
        let tasks = tasks(1);
        let mut config = config(5, ConcurrencyMode::Batched);
        config.retry.max_retries = 2;
        config.retry.initial_delay = Duration::from_millis(1);
        config.retry.jitter = false;

        let mut outcomes = Vec::new();
        download_all(&tasks, &fetcher, &config, |_, outcome| outcomes.push(outcome)).await;

        assert!(outcomes[0].is_ok());
        assert_eq!(fetcher.calls("https://img.test/1.jpg"), 3);
    }

    #[tokio::test]
    async fn no_tasks_means_no_callbacks() {
        let fetcher = ScriptedFetcher::new();
        let mut calls = 0;
        download_all(&[], &fetcher, &ExportConfig::default(), |_, _| calls += 1).await;
        assert_eq!(calls, 0);
    }
}
