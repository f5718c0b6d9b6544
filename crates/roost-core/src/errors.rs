use crate::models::MessageId;

/// Errors raised by the message store.
///
/// `InvalidId` is the fatal class: an id that is not a usable number means
/// the upstream event layer produced a malformed message, and every store
/// invariant depends on well-formed ids. `DuplicateId` is recoverable: the
/// existing entry is kept and the caller decides whether to log or abort.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("message id is not a usable number: {raw}")]
    InvalidId { raw: f64 },

    #[error("message id {id} already present in the index")]
    DuplicateId { id: MessageId },
}
