//! Subscription edge between two users

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Row from `subscribers_on_authors`: `subscriber_id` follows `author_id`.
///
/// The pair is the whole identity of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRow, Serialize)]
pub struct Subscription {
    pub subscriber_id: Uuid,
    pub author_id: Uuid,
}

impl Subscription {
    pub fn new(subscriber_id: Uuid, author_id: Uuid) -> Self {
        Self {
            subscriber_id,
            author_id,
        }
    }
}
