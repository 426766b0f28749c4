//! Two-phase list replacement: delete every existing member through a
//! provider batch job, wait (bounded) for it to finish, then import the new
//! CSV.

use super::hash::subscriber_hash;
use crate::mailchimp::{BatchOperation, ContactProvider, MemberQuery, ProviderResult};
use std::time::Duration;
use tokio::time::{Instant, interval_at};

/// Largest page the provider serves in one listing call.
pub const MAX_CONTACT_LIST: u32 = 500;

/// Timing for the batch-status poll.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub deadline: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            deadline: Duration::from_secs(5),
        }
    }
}

/// How the wait for the delete batch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchWait {
    /// The list was already empty, nothing was submitted.
    Skipped,
    Finished {
        batch_id: String,
        finished_operations: u64,
        errored_operations: u64,
    },
    TimedOut { batch_id: String },
}

/// Submit one batch job deleting every current member of the list.
///
/// Returns the batch id, or `None` when there was nothing to delete.
pub async fn submit_delete_all(provider: &dyn ContactProvider) -> ProviderResult<Option<String>> {
    let query = MemberQuery {
        count: MAX_CONTACT_LIST,
        offset: 0,
        sort_dir: None,
        fields: vec!["members.email_address"],
    };
    let page = provider.list_members(&query).await?;

    if page.members.is_empty() {
        log::info!("list {} is already empty, skipping delete batch", provider.list_id());
        return Ok(None);
    }

    let operations: Vec<BatchOperation> = page
        .members
        .iter()
        .map(|member| {
            BatchOperation::delete(format!(
                "/lists/{}/members/{}",
                provider.list_id(),
                subscriber_hash(&member.email_address)
            ))
        })
        .collect();

    let batch = provider.start_batch(&operations).await?;
    log::info!(
        "submitted delete batch {} with {} operations",
        batch.id,
        operations.len()
    );
    Ok(Some(batch.id))
}

/// Poll a batch job until it reports `finished` or the deadline passes.
///
/// Any other status, and any error while polling, counts as "not finished
/// yet". Running out of time is not an error.
pub async fn wait_for_batch(
    provider: &dyn ContactProvider,
    batch_id: &str,
    settings: PollSettings,
) -> BatchWait {
    let started = Instant::now();
    let mut ticker = interval_at(started + settings.interval, settings.interval);

    loop {
        ticker.tick().await;

        match provider.batch_status(batch_id).await {
            Ok(job) if job.is_finished() => {
                log::info!(
                    "batch {} finished after {:.1}s: {}/{} operations, {} errored",
                    batch_id,
                    started.elapsed().as_secs_f64(),
                    job.finished_operations,
                    job.total_operations,
                    job.errored_operations
                );
                if job.errored_operations > 0 {
                    log::warn!(
                        "batch {} left {} members undeleted",
                        batch_id,
                        job.errored_operations
                    );
                }
                return BatchWait::Finished {
                    batch_id: batch_id.to_string(),
                    finished_operations: job.finished_operations,
                    errored_operations: job.errored_operations,
                };
            }
            Ok(job) => log::debug!(
                "batch {} status: {} ({}/{} operations)",
                batch_id,
                job.status,
                job.finished_operations,
                job.total_operations
            ),
            Err(err) => log::warn!("failed to poll batch {}: {}", batch_id, err),
        }

        if started.elapsed() >= settings.deadline {
            log::warn!(
                "batch {} still running after {:?}, continuing",
                batch_id,
                settings.deadline
            );
            return BatchWait::TimedOut {
                batch_id: batch_id.to_string(),
            };
        }
    }
}

/// Delete phase of a replace: submit the batch and wait for it (bounded).
pub async fn clear_list(
    provider: &dyn ContactProvider,
    settings: PollSettings,
) -> ProviderResult<BatchWait> {
    match submit_delete_all(provider).await? {
        Some(batch_id) => Ok(wait_for_batch(provider, &batch_id, settings).await),
        None => Ok(BatchWait::Skipped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fast_poll, InMemoryProvider};

    #[tokio::test]
    async fn empty_list_skips_delete_batch() {
        let provider = InMemoryProvider::new();

        let outcome = clear_list(&provider, fast_poll()).await.unwrap();

        assert_eq!(outcome, BatchWait::Skipped);
        assert_eq!(provider.call_count("start_batch"), 0);
    }

    #[tokio::test]
    async fn delete_batch_removes_every_member() {
        let provider = InMemoryProvider::new().with_pending_polls(1);
        provider.seed(&["a@x.com", "B@x.com", "c@x.com"]);

        let outcome = clear_list(&provider, fast_poll()).await.unwrap();

        assert!(matches!(
            outcome,
            BatchWait::Finished {
                finished_operations: 3,
                errored_operations: 0,
                ..
            }
        ));
        assert!(provider.members().is_empty());
        assert_eq!(provider.call_count("start_batch"), 1);
        assert_eq!(provider.call_count("batch_status"), 2);
    }

    #[tokio::test]
    async fn slow_batch_times_out_without_error() {
        let provider = InMemoryProvider::new().with_pending_polls(1_000);
        provider.seed(&["a@x.com"]);

        let outcome = clear_list(&provider, fast_poll()).await.unwrap();

        assert!(matches!(outcome, BatchWait::TimedOut { .. }));
        assert!(provider.call_count("batch_status") >= 1);
    }

    #[tokio::test]
    async fn poll_errors_are_treated_as_pending() {
        let provider = InMemoryProvider::new();

        let outcome = wait_for_batch(&provider, "unknown-batch", fast_poll()).await;

        assert_eq!(
            outcome,
            BatchWait::TimedOut {
                batch_id: "unknown-batch".to_string()
            }
        );
    }
}
