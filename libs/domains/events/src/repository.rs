//! Event repository trait

use crate::error::Result;
use crate::models::{DeleteOutcome, Event, EventQuery, InsertOutcome, UpdateEvent, UpdateOutcome};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Repository trait for event storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Events matching every filter in `query`
    async fn find(&self, query: &EventQuery) -> Result<Vec<Event>>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Event>>;

    async fn insert(&self, event: &Event) -> Result<InsertOutcome>;

    /// `$set` the whitelisted fields on one event
    async fn update_fields(&self, id: ObjectId, fields: &UpdateEvent) -> Result<UpdateOutcome>;

    async fn delete(&self, id: ObjectId) -> Result<DeleteOutcome>;

    /// Round-trip to the store for readiness checks
    async fn ping(&self) -> Result<()>;
}

/// In-memory implementation of EventRepository (for development/testing)
#[derive(Clone, Default)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<HashMap<ObjectId, Event>>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one stored event, bypassing the trait
    pub async fn get(&self, id: ObjectId) -> Option<Event> {
        self.events.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

fn matches(event: &Event, query: &EventQuery) -> bool {
    if let Some(after) = &query.upcoming_after {
        if event.event_date.as_str() <= after.as_str() {
            return false;
        }
    }
    if let Some(term) = &query.title_contains {
        if !event.title.to_lowercase().contains(&term.to_lowercase()) {
            return false;
        }
    }
    if let Some(event_type) = &query.event_type {
        if &event.event_type != event_type {
            return false;
        }
    }
    if let Some(email) = &query.creator_email {
        if &event.creator_email != email {
            return false;
        }
    }
    true
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn find(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let events = self.events.read().await;
        Ok(events
            .values()
            .filter(|event| matches(event, query))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Event>> {
        Ok(self.events.read().await.get(&id).cloned())
    }

    async fn insert(&self, event: &Event) -> Result<InsertOutcome> {
        self.events.write().await.insert(event.id, event.clone());
        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: event.id.to_hex(),
        })
    }

    async fn update_fields(&self, id: ObjectId, fields: &UpdateEvent) -> Result<UpdateOutcome> {
        let mut events = self.events.write().await;
        let Some(event) = events.get_mut(&id) else {
            return Ok(UpdateOutcome {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
            });
        };

        let before = event.clone();
        event.apply(fields);
        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(*event != before),
        })
    }

    async fn delete(&self, id: ObjectId) -> Result<DeleteOutcome> {
        let removed = self.events.write().await.remove(&id);
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: u64::from(removed.is_some()),
        })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Document;

    fn event(title: &str, date: &str, owner: &str) -> Event {
        Event {
            id: ObjectId::new(),
            title: title.to_string(),
            description: "desc".to_string(),
            event_type: "Party".to_string(),
            thumbnail: "https://img.example/t.png".to_string(),
            location: "Hall".to_string(),
            event_date: date.to_string(),
            creator_email: owner.to_string(),
            extra: Document::new(),
        }
    }

    #[tokio::test]
    async fn test_find_applies_all_filters() {
        let repo = InMemoryEventRepository::new();
        repo.insert(&event("Spring Gala", "2030-01-01T00:00:00.000Z", "a@x.com"))
            .await
            .unwrap();
        repo.insert(&event("Winter Fair", "2030-01-01T00:00:00.000Z", "a@x.com"))
            .await
            .unwrap();
        repo.insert(&event("Old Gala", "2000-01-01T00:00:00.000Z", "b@x.com"))
            .await
            .unwrap();

        let query = EventQuery {
            upcoming_after: Some("2026-01-01T00:00:00.000Z".into()),
            title_contains: Some("gala".into()),
            ..EventQuery::default()
        };
        let found = repo.find(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Spring Gala");

        let mine = repo.find(&EventQuery::created_by("b@x.com")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Old Gala");
    }

    #[tokio::test]
    async fn test_update_counts_match_and_modify() {
        let repo = InMemoryEventRepository::new();
        let stored = event("Spring Gala", "2030-01-01", "a@x.com");
        repo.insert(&stored).await.unwrap();

        let fields = UpdateEvent {
            title: "Spring Gala".into(),
            description: "desc".into(),
            event_type: "Party".into(),
            thumbnail: "https://img.example/t.png".into(),
            location: "Hall".into(),
            event_date: "2030-01-01".into(),
        };
        let unchanged = repo.update_fields(stored.id, &fields).await.unwrap();
        assert_eq!((unchanged.matched_count, unchanged.modified_count), (1, 0));

        let changed = repo
            .update_fields(
                stored.id,
                &UpdateEvent {
                    location: "Park".into(),
                    ..fields
                },
            )
            .await
            .unwrap();
        assert_eq!((changed.matched_count, changed.modified_count), (1, 1));
        assert_eq!(repo.get(stored.id).await.unwrap().location, "Park");
    }

    #[tokio::test]
    async fn test_delete_reports_count() {
        let repo = InMemoryEventRepository::new();
        let stored = event("Spring Gala", "2030-01-01", "a@x.com");
        repo.insert(&stored).await.unwrap();

        assert_eq!(repo.delete(stored.id).await.unwrap().deleted_count, 1);
        assert_eq!(repo.delete(stored.id).await.unwrap().deleted_count, 0);
        assert!(repo.is_empty().await);
    }
}
