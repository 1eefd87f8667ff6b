use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use pollbot_core::poll::{PollSnapshot, PollView};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown poll `{0}`")]
    UnknownPoll(String),
    #[error("poll `{poll_id}` has no option {vote_id}")]
    UnknownOption { poll_id: String, vote_id: usize },
}

/// Registry of live polls the interaction endpoints operate on.
///
/// Polls enter the registry through [`insert`](PollStore::insert); how they
/// are created is up to the embedder. The registry never persists anything.
#[async_trait]
pub trait PollStore: Send + Sync {
    async fn insert(&self, poll: PollSnapshot);

    async fn get(&self, poll_id: &str) -> Result<PollSnapshot, StoreError>;

    /// Applies one button press and returns the updated snapshot.
    /// Presses arriving after the poll closed are dropped.
    async fn record_vote(
        &self,
        poll_id: &str,
        user_id: &str,
        vote_id: usize,
    ) -> Result<PollSnapshot, StoreError>;

    /// Closes voting and returns the final snapshot.
    async fn mark_finished(&self, poll_id: &str) -> Result<PollSnapshot, StoreError>;
}

#[derive(Default)]
pub struct InMemoryPollStore {
    polls: RwLock<HashMap<String, PollSnapshot>>,
}

#[async_trait]
impl PollStore for InMemoryPollStore {
    async fn insert(&self, poll: PollSnapshot) {
        let mut polls = self.polls.write().await;
        polls.insert(poll.id().to_owned(), poll);
    }

    async fn get(&self, poll_id: &str) -> Result<PollSnapshot, StoreError> {
        let polls = self.polls.read().await;
        polls.get(poll_id).cloned().ok_or_else(|| StoreError::UnknownPoll(poll_id.to_owned()))
    }

    async fn record_vote(
        &self,
        poll_id: &str,
        user_id: &str,
        vote_id: usize,
    ) -> Result<PollSnapshot, StoreError> {
        let mut polls = self.polls.write().await;
        let poll = polls
            .get_mut(poll_id)
            .ok_or_else(|| StoreError::UnknownPoll(poll_id.to_owned()))?;

        if vote_id >= poll.vote_options().len() {
            return Err(StoreError::UnknownOption { poll_id: poll_id.to_owned(), vote_id });
        }
        if !poll.is_finished() {
            poll.cast_vote(user_id, vote_id);
        }

        Ok(poll.clone())
    }

    async fn mark_finished(&self, poll_id: &str) -> Result<PollSnapshot, StoreError> {
        let mut polls = self.polls.write().await;
        let poll = polls
            .get_mut(poll_id)
            .ok_or_else(|| StoreError::UnknownPoll(poll_id.to_owned()))?;

        poll.finish();
        Ok(poll.clone())
    }
}

#[cfg(test)]
mod tests {
    use pollbot_core::poll::{PollSnapshot, PollView};

    use super::{InMemoryPollStore, PollStore, StoreError};

    fn sample_poll() -> PollSnapshot {
        PollSnapshot::new("poll-1", "Lunch?", vec!["Pizza".to_owned(), "Burger".to_owned()])
    }

    #[tokio::test]
    async fn recorded_votes_are_visible_in_later_reads() {
        let store = InMemoryPollStore::default();
        store.insert(sample_poll()).await;

        let updated = store.record_vote("poll-1", "ann", 0).await.expect("record");
        assert_eq!(updated.count_votes(0), 1);

        let fetched = store.get("poll-1").await.expect("get");
        assert_eq!(fetched.count_votes(0), 1);
    }

    #[tokio::test]
    async fn votes_on_unknown_polls_are_rejected() {
        let store = InMemoryPollStore::default();

        let result = store.record_vote("missing", "ann", 0).await;
        assert_eq!(result, Err(StoreError::UnknownPoll("missing".to_owned())));
    }

    #[tokio::test]
    async fn votes_on_unknown_options_are_rejected() {
        let store = InMemoryPollStore::default();
        store.insert(sample_poll()).await;

        let result = store.record_vote("poll-1", "ann", 7).await;
        assert_eq!(
            result,
            Err(StoreError::UnknownOption { poll_id: "poll-1".to_owned(), vote_id: 7 })
        );
    }

    #[tokio::test]
    async fn presses_after_the_poll_closed_are_dropped() {
        let store = InMemoryPollStore::default();
        store.insert(sample_poll()).await;
        store.mark_finished("poll-1").await.expect("finish");

        let snapshot = store.record_vote("poll-1", "ann", 0).await.expect("record");
        assert!(snapshot.is_finished());
        assert_eq!(snapshot.count_votes(0), 0);
    }
}
