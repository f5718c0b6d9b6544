//! Collaborator contracts consumed by the list data engine.
//!
//! The muting policy and the current-user identity live elsewhere in the
//! client; the engine receives them at construction time and only ever asks
//! boolean questions.

/// Answers whether a stream/topic pair is muted for the current user.
pub trait MutingPolicy {
    fn is_topic_muted(&self, stream_id: u64, topic: &str) -> bool;
}

impl<F> MutingPolicy for F
where
    F: Fn(u64, &str) -> bool,
{
    fn is_topic_muted(&self, stream_id: u64, topic: &str) -> bool {
        self(stream_id, topic)
    }
}

/// Answers whether a sender id belongs to the current user.
pub trait UserIdentity {
    fn is_me(&self, user_id: u64) -> bool;
}

impl<F> UserIdentity for F
where
    F: Fn(u64) -> bool,
{
    fn is_me(&self, user_id: u64) -> bool {
        self(user_id)
    }
}
