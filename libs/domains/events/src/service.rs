//! Event service layer

use crate::error::{EventError, Result};
use crate::models::{
    CreateEvent, DeleteOutcome, Event, EventQuery, InsertOutcome, UpdateEvent, UpdateOutcome,
    parse_event_id,
};
use crate::repository::EventRepository;
use axum_helpers::Principal;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tracing::{info, instrument};
use validator::Validate;

/// Event service: id parsing, ownership and validation in front of the repository.
pub struct EventService<R: EventRepository> {
    repository: R,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Events dated strictly after now, optionally narrowed by title search and type.
    #[instrument(skip(self))]
    pub async fn upcoming(
        &self,
        search: Option<String>,
        event_type: Option<String>,
    ) -> Result<Vec<Event>> {
        let query = EventQuery::upcoming(Utc::now(), search, event_type);
        self.repository.find(&query).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Event> {
        let id = parse_id(id)?;
        self.find_existing(id).await
    }

    /// Insert a new event owned by `principal`. Ownership is checked before validation.
    #[instrument(skip(self, principal, input), fields(uid = %principal.uid))]
    pub async fn create(&self, principal: &Principal, input: CreateEvent) -> Result<InsertOutcome> {
        if input.creator_email != principal.email {
            return Err(EventError::Forbidden(format!(
                "creatorEmail {} does not match principal {}",
                input.creator_email, principal.email
            )));
        }
        input.validate()?;

        let event = Event::from(input);
        let outcome = self.repository.insert(&event).await?;
        info!(event_id = %outcome.inserted_id, "Event created");
        Ok(outcome)
    }

    /// Events created by `email`, which must be the principal's own address.
    #[instrument(skip(self, principal), fields(uid = %principal.uid))]
    pub async fn my_events(&self, principal: &Principal, email: Option<String>) -> Result<Vec<Event>> {
        match email {
            Some(email) if email == principal.email => {
                self.repository.find(&EventQuery::created_by(email)).await
            }
            Some(email) => Err(EventError::Forbidden(format!(
                "requested events of {} as {}",
                email, principal.email
            ))),
            None => Err(EventError::Forbidden("email query parameter missing".into())),
        }
    }

    /// Overwrite the whitelisted fields of an event owned by `principal`.
    ///
    /// `body` is only read as an [`UpdateEvent`] once the id, existence and
    /// ownership checks have passed.
    #[instrument(skip(self, principal, body), fields(uid = %principal.uid))]
    pub async fn update(
        &self,
        principal: &Principal,
        id: &str,
        body: serde_json::Value,
    ) -> Result<UpdateOutcome> {
        let event = self.find_owned(principal, id).await?;
        let input: UpdateEvent = serde_json::from_value(body).map_err(EventError::InvalidBody)?;
        input.validate()?;

        let outcome = self.repository.update_fields(event.id, &input).await?;
        // Deleted between the lookup and the write
        if outcome.matched_count == 0 {
            return Err(EventError::NotFound(event.id.to_hex()));
        }
        info!(event_id = %event.id, modified = outcome.modified_count, "Event updated");
        Ok(outcome)
    }

    #[instrument(skip(self, principal), fields(uid = %principal.uid))]
    pub async fn delete(&self, principal: &Principal, id: &str) -> Result<DeleteOutcome> {
        let event = self.find_owned(principal, id).await?;

        let outcome = self.repository.delete(event.id).await?;
        if outcome.deleted_count == 0 {
            return Err(EventError::NotFound(event.id.to_hex()));
        }
        info!(event_id = %event.id, "Event deleted");
        Ok(outcome)
    }

    pub async fn ping(&self) -> Result<()> {
        self.repository.ping().await
    }

    async fn find_existing(&self, id: ObjectId) -> Result<Event> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| EventError::NotFound(id.to_hex()))
    }

    // 400, then 404, then 403
    async fn find_owned(&self, principal: &Principal, id: &str) -> Result<Event> {
        let id = parse_id(id)?;
        let event = self.find_existing(id).await?;

        if !event.is_owned_by(&principal.email) {
            return Err(EventError::Forbidden(format!(
                "{} is not the creator of event {}",
                principal.email, event.id
            )));
        }
        Ok(event)
    }
}

fn parse_id(raw: &str) -> Result<ObjectId> {
    parse_event_id(raw).ok_or_else(|| EventError::InvalidIdentifier(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockEventRepository;
    use mongodb::bson::Document;
    use mockall::predicate;

    fn principal(email: &str) -> Principal {
        Principal {
            uid: "uid-1".to_string(),
            email: email.to_string(),
        }
    }

    fn stored(owner: &str) -> Event {
        Event {
            id: ObjectId::new(),
            title: "Spring Gala".to_string(),
            description: "Dinner and dancing".to_string(),
            event_type: "Party".to_string(),
            thumbnail: "https://img.example/gala.png".to_string(),
            location: "Town Hall".to_string(),
            event_date: "2030-04-01T19:00:00.000Z".to_string(),
            creator_email: owner.to_string(),
            extra: Document::new(),
        }
    }

    fn create_input(owner: &str) -> CreateEvent {
        CreateEvent {
            title: "Spring Gala".to_string(),
            description: "Dinner and dancing".to_string(),
            event_type: "Party".to_string(),
            thumbnail: "https://img.example/gala.png".to_string(),
            location: "Town Hall".to_string(),
            event_date: "2030-04-01T19:00:00.000Z".to_string(),
            creator_email: owner.to_string(),
        }
    }

    fn body(input: UpdateEvent) -> serde_json::Value {
        serde_json::to_value(input).unwrap()
    }

    fn update_input() -> UpdateEvent {
        UpdateEvent {
            title: "Autumn Gala".to_string(),
            description: "Dinner and dancing".to_string(),
            event_type: "Party".to_string(),
            thumbnail: "https://img.example/gala.png".to_string(),
            location: "Town Hall".to_string(),
            event_date: "2030-10-01T19:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_for_other_email_is_forbidden_without_insert() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo.expect_insert().never();

        let service = EventService::new(mock_repo);
        let result = service
            .create(&principal("b@x.com"), create_input("a@x.com"))
            .await;

        assert!(matches!(result, Err(EventError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_invalid_payload_is_rejected() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo.expect_insert().never();

        let mut input = create_input("a@x.com");
        input.title = String::new();

        let service = EventService::new(mock_repo);
        let result = service.create(&principal("a@x.com"), input).await;

        assert!(matches!(result, Err(EventError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_inserts_owned_event() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_insert()
            .withf(|event| event.creator_email == "a@x.com" && event.title == "Spring Gala")
            .times(1)
            .returning(|event| {
                Ok(InsertOutcome {
                    acknowledged: true,
                    inserted_id: event.id.to_hex(),
                })
            });

        let service = EventService::new(mock_repo);
        let outcome = service
            .create(&principal("a@x.com"), create_input("a@x.com"))
            .await
            .unwrap();

        assert!(outcome.acknowledged);
        assert_eq!(outcome.inserted_id.len(), 24);
    }

    #[tokio::test]
    async fn test_get_invalid_id_skips_store() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo.expect_find_by_id().never();

        let service = EventService::new(mock_repo);
        let result = service.get("not-an-id").await;

        assert!(matches!(result, Err(EventError::InvalidIdentifier(_))));
    }

    #[tokio::test]
    async fn test_get_missing_event_is_not_found() {
        let id = ObjectId::new();
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(predicate::eq(id))
            .returning(|_| Ok(None));

        let service = EventService::new(mock_repo);
        let result = service.get(&id.to_hex()).await;

        assert!(matches!(result, Err(EventError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_upcoming_passes_filters_to_repository() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find()
            .withf(|query| {
                query.upcoming_after.is_some()
                    && query.title_contains.as_deref() == Some("Gala")
                    && query.event_type.is_none()
                    && query.creator_email.is_none()
            })
            .returning(|_| Ok(vec![]));

        let service = EventService::new(mock_repo);
        let events = service
            .upcoming(Some("Gala".into()), Some(String::new()))
            .await
            .unwrap();

        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_my_events_requires_matching_email() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo.expect_find().never();
        let service = EventService::new(mock_repo);

        let missing = service.my_events(&principal("a@x.com"), None).await;
        assert!(matches!(missing, Err(EventError::Forbidden(_))));

        let other = service
            .my_events(&principal("a@x.com"), Some("b@x.com".into()))
            .await;
        assert!(matches!(other, Err(EventError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_my_events_queries_by_creator() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find()
            .with(predicate::eq(EventQuery::created_by("a@x.com")))
            .returning(|_| Ok(vec![stored("a@x.com")]));

        let service = EventService::new(mock_repo);
        let events = service
            .my_events(&principal("a@x.com"), Some("a@x.com".into()))
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_update_by_non_creator_is_forbidden() {
        let event = stored("a@x.com");
        let id = event.id;
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find_by_id()
            .with(predicate::eq(id))
            .returning(move |_| Ok(Some(event.clone())));
        mock_repo.expect_update_fields().never();

        let service = EventService::new(mock_repo);
        let result = service
            .update(&principal("b@x.com"), &id.to_hex(), body(update_input()))
            .await;

        assert!(matches!(result, Err(EventError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_forbidden_before_validation() {
        let event = stored("a@x.com");
        let id = event.id;
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(event.clone())));
        mock_repo.expect_update_fields().never();

        let mut input = update_input();
        input.title = String::new();

        let service = EventService::new(mock_repo);
        let result = service
            .update(&principal("b@x.com"), &id.to_hex(), body(input))
            .await;

        assert!(matches!(result, Err(EventError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_by_creator_sets_fields() {
        let event = stored("a@x.com");
        let id = event.id;
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(event.clone())));
        mock_repo
            .expect_update_fields()
            .with(predicate::eq(id), predicate::eq(update_input()))
            .times(1)
            .returning(|_, _| {
                Ok(UpdateOutcome {
                    acknowledged: true,
                    matched_count: 1,
                    modified_count: 1,
                })
            });

        let service = EventService::new(mock_repo);
        let outcome = service
            .update(&principal("a@x.com"), &id.to_hex(), body(update_input()))
            .await
            .unwrap();

        assert_eq!(outcome.modified_count, 1);
    }

    #[tokio::test]
    async fn test_delete_missing_event_is_not_found() {
        let mut mock_repo = MockEventRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));
        mock_repo.expect_delete().never();

        let service = EventService::new(mock_repo);
        let result = service
            .delete(&principal("a@x.com"), &ObjectId::new().to_hex())
            .await;

        assert!(matches!(result, Err(EventError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_by_creator() {
        let event = stored("a@x.com");
        let id = event.id;
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(event.clone())));
        mock_repo
            .expect_delete()
            .with(predicate::eq(id))
            .times(1)
            .returning(|_| {
                Ok(DeleteOutcome {
                    acknowledged: true,
                    deleted_count: 1,
                })
            });

        let service = EventService::new(mock_repo);
        let outcome = service
            .delete(&principal("a@x.com"), &id.to_hex())
            .await
            .unwrap();

        assert_eq!(outcome.deleted_count, 1);
    }

    #[tokio::test]
    async fn test_incomplete_body_checked_after_ownership() {
        let event = stored("a@x.com");
        let id = event.id;
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(event.clone())));
        mock_repo.expect_update_fields().never();
        let service = EventService::new(mock_repo);
        let partial = serde_json::json!({ "title": "Autumn Gala" });

        let stranger = service
            .update(&principal("b@x.com"), &id.to_hex(), partial.clone())
            .await;
        assert!(matches!(stranger, Err(EventError::Forbidden(_))));

        let owner = service
            .update(&principal("a@x.com"), &id.to_hex(), partial)
            .await;
        assert!(matches!(owner, Err(EventError::InvalidBody(_))));
    }

    #[tokio::test]
    async fn test_update_of_concurrently_deleted_event_is_not_found() {
        let event = stored("a@x.com");
        let id = event.id;
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(event.clone())));
        mock_repo.expect_update_fields().times(1).returning(|_, _| {
            Ok(UpdateOutcome {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
            })
        });

        let service = EventService::new(mock_repo);
        let result = service
            .update(&principal("a@x.com"), &id.to_hex(), body(update_input()))
            .await;

        assert!(matches!(result, Err(EventError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_of_concurrently_deleted_event_is_not_found() {
        let event = stored("a@x.com");
        let id = event.id;
        let mut mock_repo = MockEventRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(event.clone())));
        mock_repo.expect_delete().times(1).returning(|_| {
            Ok(DeleteOutcome {
                acknowledged: true,
                deleted_count: 0,
            })
        });

        let service = EventService::new(mock_repo);
        let result = service.delete(&principal("a@x.com"), &id.to_hex()).await;

        assert!(matches!(result, Err(EventError::NotFound(_))));
    }
}
