//! MongoDB implementation of EventRepository

use crate::error::{EventError, Result};
use crate::models::{DeleteOutcome, Event, EventQuery, InsertOutcome, UpdateEvent, UpdateOutcome};
use crate::repository::EventRepository;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Document, doc};
use mongodb::{Collection, Database};
use tracing::{instrument, warn};

/// Name of the primary collection
pub const EVENTS_COLLECTION: &str = "events";

/// MongoDB-based event repository
#[derive(Clone)]
pub struct MongoEventRepository {
    database: Database,
    collection: Collection<Document>,
}

impl MongoEventRepository {
    /// Create a new MongoDB event repository
    pub fn new(database: &Database) -> Self {
        Self {
            database: database.clone(),
            collection: database.collection(EVENTS_COLLECTION),
        }
    }

    /// Create indexes for the upcoming and my-events queries
    pub async fn create_indexes(&self) -> Result<()> {
        use mongodb::IndexModel;

        let indexes = vec![
            IndexModel::builder().keys(doc! { "eventDate": 1 }).build(),
            IndexModel::builder()
                .keys(doc! { "creatorEmail": 1 })
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        Ok(())
    }

    /// Build filter document from EventQuery
    fn build_filter(query: &EventQuery) -> Document {
        let mut doc = Document::new();

        if let Some(after) = &query.upcoming_after {
            doc.insert("eventDate", doc! { "$gt": after.as_str() });
        }

        // Literal, case-insensitive substring match
        if let Some(term) = &query.title_contains {
            doc.insert(
                "title",
                doc! { "$regex": regex::escape(term), "$options": "i" },
            );
        }

        if let Some(event_type) = &query.event_type {
            doc.insert("eventType", event_type.as_str());
        }

        if let Some(email) = &query.creator_email {
            doc.insert("creatorEmail", email.as_str());
        }

        doc
    }

    fn update_document(fields: &UpdateEvent) -> Document {
        doc! {
            "$set": {
                "title": fields.title.as_str(),
                "description": fields.description.as_str(),
                "eventType": fields.event_type.as_str(),
                "thumbnail": fields.thumbnail.as_str(),
                "location": fields.location.as_str(),
                "eventDate": fields.event_date.as_str(),
            }
        }
    }
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    #[instrument(skip(self, query))]
    async fn find(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let filter = Self::build_filter(query);
        let cursor = self.collection.find(filter).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        let events = documents
            .into_iter()
            .filter_map(|document| {
                let id = document.get("_id").cloned();
                let event = Event::from_document(document);
                if event.is_none() {
                    warn!(id = ?id, "Skipping event document without an ObjectId _id");
                }
                event
            })
            .collect();
        Ok(events)
    }

    #[instrument(skip(self), fields(event_id = %id))]
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Event>> {
        let document = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(document.and_then(Event::from_document))
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn insert(&self, event: &Event) -> Result<InsertOutcome> {
        let result = self.collection.insert_one(Document::from(event)).await?;
        let inserted_id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| EventError::Internal("insert returned a non-ObjectId _id".into()))?;

        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: inserted_id.to_hex(),
        })
    }

    #[instrument(skip(self, fields), fields(event_id = %id))]
    async fn update_fields(&self, id: ObjectId, fields: &UpdateEvent) -> Result<UpdateOutcome> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, Self::update_document(fields))
            .await?;

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    #[instrument(skip(self), fields(event_id = %id))]
    async fn delete(&self, id: ObjectId) -> Result<DeleteOutcome> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
