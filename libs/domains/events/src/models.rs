//! Event domain models

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, doc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Stored event document (collection `events`)
///
/// Documents are schema-less: fields missing from a stored document read as
/// empty strings, and anything that is not one of the string fields below
/// (including a known field holding a non-string value) is kept in `extra`.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub thumbnail: String,
    pub location: String,
    /// ISO-8601 timestamp, kept exactly as submitted
    pub event_date: String,
    pub creator_email: String,
    /// Fields outside the event schema, passed through untouched
    pub extra: Document,
}

const TITLE: &str = "title";
const DESCRIPTION: &str = "description";
const EVENT_TYPE: &str = "eventType";
const THUMBNAIL: &str = "thumbnail";
const LOCATION: &str = "location";
const EVENT_DATE: &str = "eventDate";
const CREATOR_EMAIL: &str = "creatorEmail";

impl Event {
    /// Whether `email` owns this event.
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.creator_email == email
    }

    /// Overwrite the whitelisted fields. `_id`, `creatorEmail` and extra fields are untouched.
    pub fn apply(&mut self, fields: &UpdateEvent) {
        self.title = fields.title.clone();
        self.description = fields.description.clone();
        self.event_type = fields.event_type.clone();
        self.thumbnail = fields.thumbnail.clone();
        self.location = fields.location.clone();
        self.event_date = fields.event_date.clone();
        for key in [TITLE, DESCRIPTION, EVENT_TYPE, THUMBNAIL, LOCATION, EVENT_DATE] {
            self.extra.remove(key);
        }
    }

    /// Read a stored document. `None` only when `_id` is not an ObjectId.
    pub fn from_document(mut document: Document) -> Option<Self> {
        let id = match document.remove("_id") {
            Some(Bson::ObjectId(id)) => id,
            _ => return None,
        };

        let mut take = |key: &str| match document.remove(key) {
            Some(Bson::String(value)) => value,
            Some(other) => {
                document.insert(key, other);
                String::new()
            }
            None => String::new(),
        };

        let title = take(TITLE);
        let description = take(DESCRIPTION);
        let event_type = take(EVENT_TYPE);
        let thumbnail = take(THUMBNAIL);
        let location = take(LOCATION);
        let event_date = take(EVENT_DATE);
        let creator_email = take(CREATOR_EMAIL);

        Some(Self {
            id,
            title,
            description,
            event_type,
            thumbnail,
            location,
            event_date,
            creator_email,
            extra: document,
        })
    }
}

impl From<&Event> for Document {
    fn from(event: &Event) -> Self {
        let mut document = doc! {
            "_id": event.id,
            TITLE: event.title.as_str(),
            DESCRIPTION: event.description.as_str(),
            EVENT_TYPE: event.event_type.as_str(),
            THUMBNAIL: event.thumbnail.as_str(),
            LOCATION: event.location.as_str(),
            EVENT_DATE: event.event_date.as_str(),
            CREATOR_EMAIL: event.creator_email.as_str(),
        };
        for (key, value) in &event.extra {
            document.insert(key.clone(), value.clone());
        }
        document
    }
}

impl From<CreateEvent> for Event {
    fn from(create: CreateEvent) -> Self {
        Self {
            id: ObjectId::new(),
            title: create.title,
            description: create.description,
            event_type: create.event_type,
            thumbnail: create.thumbnail,
            location: create.location,
            event_date: create.event_date,
            creator_email: create.creator_email,
            extra: Document::new(),
        }
    }
}

/// Event as returned over HTTP, `_id` rendered as 24-char hex.
///
/// Stored fields outside the event schema are rendered alongside, as relaxed extended JSON.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[serde(rename = "_id")]
    #[schema(example = "65f1c0a2b3d4e5f601234567")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "2026-12-31T18:00:00.000Z")]
    pub event_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_email: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        let extra = match Bson::Document(event.extra).into_relaxed_extjson() {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        // A non-string value for a known field lives in `extra` and wins
        let field = |key: &str, value: String| (!extra.contains_key(key)).then_some(value);

        let title = field(TITLE, event.title);
        let description = field(DESCRIPTION, event.description);
        let event_type = field(EVENT_TYPE, event.event_type);
        let thumbnail = field(THUMBNAIL, event.thumbnail);
        let location = field(LOCATION, event.location);
        let event_date = field(EVENT_DATE, event.event_date);
        let creator_email = field(CREATOR_EMAIL, event.creator_email);

        Self {
            id: event.id.to_hex(),
            title,
            description,
            event_type,
            thumbnail,
            location,
            event_date,
            creator_email,
            extra,
        }
    }
}

/// DTO for creating an event
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 5000))]
    pub description: String,

    #[validate(length(min = 1, max = 100))]
    pub event_type: String,

    #[validate(url, length(min = 1, max = 2048))]
    pub thumbnail: String,

    #[validate(length(min = 1, max = 300))]
    pub location: String,

    #[validate(custom(function = "validate_event_date"))]
    #[schema(example = "2026-12-31T18:00:00.000Z")]
    pub event_date: String,

    #[validate(email)]
    pub creator_email: String,
}

/// DTO for updating an event
///
/// Only the whitelisted fields are read; anything else in the body
/// (`_id`, `creatorEmail`, ...) is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 5000))]
    pub description: String,

    #[validate(length(min = 1, max = 100))]
    pub event_type: String,

    #[validate(url, length(min = 1, max = 2048))]
    pub thumbnail: String,

    #[validate(length(min = 1, max = 300))]
    pub location: String,

    #[validate(custom(function = "validate_event_date"))]
    pub event_date: String,
}

/// Accepts RFC 3339 timestamps, naive date-times and plain dates.
fn validate_event_date(value: &str) -> Result<(), ValidationError> {
    let parses = DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();

    if parses {
        Ok(())
    } else {
        Err(ValidationError::new("event_date")
            .with_message("eventDate must be an ISO-8601 timestamp".into()))
    }
}

/// Store-level query; every `Some` field narrows the result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Only events whose `eventDate` sorts strictly after this string
    pub upcoming_after: Option<String>,
    /// Case-insensitive literal substring of `title`
    pub title_contains: Option<String>,
    pub event_type: Option<String>,
    pub creator_email: Option<String>,
}

impl EventQuery {
    /// Upcoming events relative to `now`, with optional search and type filters.
    ///
    /// Empty `search` / `event_type` values are treated as absent.
    pub fn upcoming(now: DateTime<Utc>, search: Option<String>, event_type: Option<String>) -> Self {
        Self {
            upcoming_after: Some(iso_millis(now)),
            title_contains: search.filter(|s| !s.is_empty()),
            event_type: event_type.filter(|t| !t.is_empty()),
            creator_email: None,
        }
    }

    pub fn created_by(email: impl Into<String>) -> Self {
        Self {
            creator_email: Some(email.into()),
            ..Self::default()
        }
    }
}

/// `2026-01-02T03:04:05.678Z`, the form `eventDate` values are compared against.
pub fn iso_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Query parameters for `GET /events/upcoming`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UpcomingParams {
    /// Case-insensitive substring of the title
    pub search: Option<String>,
    /// Exact event type
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

/// Query parameters for `GET /my-events`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MyEventsParams {
    /// Must equal the authenticated principal's email
    pub email: Option<String>,
}

/// Result of an insert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    #[schema(example = "65f1c0a2b3d4e5f601234567")]
    pub inserted_id: String,
}

/// Result of an update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Result of a delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Parse a path id. Only the 24-character hex form is accepted.
pub fn parse_event_id(raw: &str) -> Option<ObjectId> {
    if raw.len() != 24 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    ObjectId::parse_str(raw).ok()
}
