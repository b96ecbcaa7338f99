use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use log::info;
use mongodb::{bson::doc, Collection, Database};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::db::mongo::{ITINERARIES, SHARES};
use crate::error::{ApiError, ApiResult};
use crate::models::itinerary::{Itinerary, ItineraryPlan};

/// Fields a client may never overwrite through an update.
const PROTECTED_FIELDS: [&str; 4] = ["_id", "id", "userId", "createdAt"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    #[serde(rename = "_id")]
    pub id: String,
    pub itinerary_id: String,
    pub shared_by: String,
    pub shared_with: Value,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopularDestination {
    pub name: &'static str,
    pub image: &'static str,
    pub popularity: u8,
}

pub fn popular_destinations() -> Vec<PopularDestination> {
    [
        ("Paris, France", "/images/paris.jpg", 95),
        ("Tokyo, Japan", "/images/tokyo.jpg", 92),
        ("New York, USA", "/images/nyc.jpg", 90),
        ("London, UK", "/images/london.jpg", 88),
        ("Rome, Italy", "/images/rome.jpg", 85),
        ("Barcelona, Spain", "/images/barcelona.jpg", 82),
        ("Amsterdam, Netherlands", "/images/amsterdam.jpg", 80),
        ("Sydney, Australia", "/images/sydney.jpg", 78),
    ]
    .into_iter()
    .map(|(name, image, popularity)| PopularDestination {
        name,
        image,
        popularity,
    })
    .collect()
}

/// Removes fields that identify or own the document from a client patch.
pub fn sanitize_patch(mut patch: Map<String, Value>) -> Map<String, Value> {
    for field in PROTECTED_FIELDS {
        patch.remove(field);
    }
    patch
}

/// Merges a client patch over the stored itinerary at the top level and
/// checks that the result still reads back as an `Itinerary`. Identity and
/// ownership always come from `current`.
pub fn apply_patch(current: &Itinerary, patch: Map<String, Value>) -> ApiResult<Itinerary> {
    let Value::Object(mut merged) = serde_json::to_value(current)
        .map_err(|e| ApiError::Internal(format!("Failed to encode itinerary: {}", e)))?
    else {
        return Err(ApiError::Internal("Itinerary did not encode as an object".to_string()));
    };
    merged.extend(sanitize_patch(patch));

    let mut updated: Itinerary = serde_json::from_value(Value::Object(merged))
        .map_err(|e| ApiError::BadRequest(format!("Invalid itinerary update: {}", e)))?;
    updated.id = current.id.clone();
    updated.user_id = current.user_id.clone();
    updated.created_at = current.created_at;
    updated.extra.retain(|k, _| !PROTECTED_FIELDS.contains(&k.as_str()));
    Ok(updated)
}

pub fn ensure_owner(itinerary: &Itinerary, user_id: &str) -> ApiResult<()> {
    if itinerary.user_id == user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Unauthorized access".to_string()))
    }
}

#[derive(Clone)]
pub struct TripService {
    itineraries: Collection<Itinerary>,
    shares: Collection<Share>,
}

impl TripService {
    pub fn new(db: &Database) -> Self {
        Self {
            itineraries: db.collection(ITINERARIES),
            shares: db.collection(SHARES),
        }
    }

    /// Newest first.
    pub async fn history(&self, user_id: &str, limit: Option<i64>) -> ApiResult<Vec<Itinerary>> {
        let mut find = self
            .itineraries
            .find(doc! { "userId": user_id })
            .sort(doc! { "createdAt": -1 });
        if let Some(limit) = limit {
            find = find.limit(limit);
        }

        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find(&self, id: &str) -> ApiResult<Option<Itinerary>> {
        Ok(self.itineraries.find_one(doc! { "_id": id }).await?)
    }

    /// Loads an itinerary the caller owns.
    pub async fn get(&self, user_id: &str, id: &str) -> ApiResult<Itinerary> {
        let itinerary = self
            .find(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Itinerary not found".to_string()))?;
        ensure_owner(&itinerary, user_id)?;
        Ok(itinerary)
    }

    pub async fn save(&self, user_id: &str, mut itinerary: Itinerary) -> ApiResult<String> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        itinerary.id = Some(id.clone());
        itinerary.user_id = user_id.to_string();
        itinerary.created_at = Some(now);
        itinerary.updated_at = Some(now);
        itinerary.extra.retain(|k, _| !PROTECTED_FIELDS.contains(&k.as_str()));

        self.itineraries.insert_one(&itinerary).await?;
        info!("Saved itinerary {} for user {}", id, user_id);
        Ok(id)
    }

    /// Replaces the stored document with the validated merge, so a mistyped
    /// field is rejected instead of stored.
    pub async fn update(&self, user_id: &str, id: &str, patch: Map<String, Value>) -> ApiResult<Itinerary> {
        let current = self.get(user_id, id).await?;
        let mut updated = apply_patch(&current, patch)?;
        updated.updated_at = Some(Utc::now());

        self.itineraries
            .replace_one(doc! { "_id": id }, &updated)
            .await?;
        Ok(updated)
    }

    pub async fn replace_plan(&self, id: &str, plan: &ItineraryPlan) -> ApiResult<()> {
        self.itineraries
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "itinerary": bson::to_bson(plan)?,
                    "updatedAt": bson::to_bson(&Utc::now())?,
                }},
            )
            .await?;
        Ok(())
    }

    pub async fn mark_booked(&self, id: &str, booking_id: &str) -> ApiResult<()> {
        self.itineraries
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "status": "booked",
                    "bookingId": booking_id,
                    "updatedAt": bson::to_bson(&Utc::now())?,
                }},
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> ApiResult<()> {
        self.get(user_id, id).await?;
        self.itineraries.delete_one(doc! { "_id": id }).await?;
        info!("Deleted itinerary {} for user {}", id, user_id);
        Ok(())
    }

    pub async fn share(
        &self,
        user_id: &str,
        id: &str,
        shared_with: Value,
        permissions: Option<Vec<String>>,
    ) -> ApiResult<String> {
        self.get(user_id, id).await?;

        let share = Share {
            id: Uuid::new_v4().to_string(),
            itinerary_id: id.to_string(),
            shared_by: user_id.to_string(),
            shared_with,
            permissions: permissions
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| vec!["read".to_string()]),
            created_at: Utc::now(),
        };

        self.shares.insert_one(&share).await?;
        Ok(share.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_popular_destinations_ranked() {
        let destinations = popular_destinations();
        assert_eq!(destinations.len(), 8);
        assert_eq!(destinations[0].name, "Paris, France");
        assert!(destinations
            .windows(2)
            .all(|w| w[0].popularity >= w[1].popularity));
    }

    #[test]
    fn test_sanitize_patch_keeps_content_fields() {
        let patch = json!({
            "_id": "other",
            "userId": "attacker",
            "createdAt": "1970-01-01T00:00:00Z",
            "status": "draft",
            "params": { "destination": "Jaipur" }
        });
        let clean = sanitize_patch(patch.as_object().unwrap().clone());

        assert!(!clean.contains_key("_id"));
        assert!(!clean.contains_key("userId"));
        assert!(!clean.contains_key("createdAt"));
        assert_eq!(clean["status"], "draft");
        assert_eq!(clean["params"]["destination"], "Jaipur");
    }

    fn stored() -> Itinerary {
        serde_json::from_value(json!({
            "_id": "trip-1",
            "userId": "owner",
            "params": { "destination": "Goa", "duration": 3, "interests": ["beach"] },
            "itinerary": { "days": [] },
            "status": "generated",
            "createdAt": "2026-03-01T10:00:00Z"
        }))
        .unwrap()
    }

    fn patch(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_apply_patch_rejects_mistyped_status() {
        let err = apply_patch(&stored(), patch(json!({ "status": 5 }))).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_apply_patch_rejects_mistyped_nested_fields() {
        for bad in [
            json!({ "feedback": "great" }),
            json!({ "itinerary": "x" }),
            json!({ "params": { "interests": "beach" } }),
        ] {
            let result = apply_patch(&stored(), patch(bad.clone()));
            assert!(matches!(result, Err(ApiError::BadRequest(_))), "{} accepted", bad);
        }
    }

    #[test]
    fn test_apply_patch_result_round_trips_through_bson() {
        let updated = apply_patch(
            &stored(),
            patch(json!({ "status": "draft", "feedback": { "rating": 4.5 }, "notes": "pack light" })),
        )
        .unwrap();

        let document = bson::to_document(&updated).unwrap();
        let read_back: Itinerary = bson::from_document(document).unwrap();
        assert_eq!(read_back.status.as_deref(), Some("draft"));
        assert_eq!(read_back.feedback.as_ref().and_then(|f| f.rating), Some(4.5));
        assert_eq!(read_back.extra["notes"], "pack light");
        assert_eq!(read_back.destination(), "Goa");
    }

    #[test]
    fn test_apply_patch_keeps_identity_and_owner() {
        let current = stored();
        let updated = apply_patch(
            &current,
            patch(json!({
                "_id": "other",
                "id": "other",
                "userId": "attacker",
                "createdAt": "1970-01-01T00:00:00Z",
                "status": "draft"
            })),
        )
        .unwrap();

        assert_eq!(updated.id.as_deref(), Some("trip-1"));
        assert_eq!(updated.user_id, "owner");
        assert_eq!(updated.created_at, current.created_at);
        assert!(updated.extra.keys().all(|k| !PROTECTED_FIELDS.contains(&k.as_str())));
        assert_eq!(updated.status.as_deref(), Some("draft"));
    }

    #[test]
    fn test_ensure_owner() {
        let itinerary = stored();
        assert!(ensure_owner(&itinerary, "owner").is_ok());
        assert!(matches!(
            ensure_owner(&itinerary, "someone-else"),
            Err(ApiError::Forbidden(_))
        ));
    }
}
