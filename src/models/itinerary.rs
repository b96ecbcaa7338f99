use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// A money or distance figure that arrives either as a number or as loosely
/// formatted text such as `"₹1,200"` or `"15 km"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Keeps only digits, `.` and `-` before parsing, so `"₹1,200.50"` reads as
    /// `1200.5`. Unparseable text is zero.
    pub fn as_cost(&self) -> f64 {
        match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => {
                let cleaned: String = s
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                    .collect();
                cleaned.parse().unwrap_or(0.0)
            }
        }
    }

    /// First decimal number appearing in the value (`"about 12.5 km"` → 12.5).
    pub fn leading_number(&self) -> f64 {
        static NUMBER: OnceLock<Regex> = OnceLock::new();
        match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => NUMBER
                .get_or_init(|| Regex::new(r"(\d+\.?\d*)").expect("valid number regex"))
                .captures(s)
                .and_then(|c| c[1].parse().ok())
                .unwrap_or(0.0),
        }
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Number(0.0)
    }
}

/// Accepts `3`, `3.0` or `"3"` for count-like fields.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().map(|f| f.max(0.0) as u32).unwrap_or(0),
        Some(Value::String(s)) => s
            .trim()
            .split(|c: char| !c.is_ascii_digit())
            .next()
            .and_then(|d| d.parse().ok())
            .unwrap_or(0),
        _ => 0,
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Activity {
    pub time: Option<String>,
    pub activity: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub cost: Option<Amount>,
    pub category: Option<String>,
    pub booking_required: bool,
    pub provider: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub participants: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Meal {
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub meal_type: Option<String>,
    pub restaurant: Option<String>,
    pub cuisine: Option<String>,
    pub cost: Option<Amount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transportation {
    pub mode: Option<String>,
    pub distance: Option<Amount>,
    #[serde(deserialize_with = "lenient_u32")]
    pub passengers: u32,
    pub duration: Option<String>,
    pub cost: Option<Amount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DayPlan {
    #[serde(deserialize_with = "lenient_u32")]
    pub day: u32,
    pub date: Option<String>,
    pub theme: Option<String>,
    pub activities: Vec<Activity>,
    pub meals: Vec<Meal>,
    pub transportation: Option<Transportation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItineraryPlan {
    pub days: Vec<DayPlan>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransportSegment {
    pub route: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub passengers: u32,
    pub preferences: Option<Value>,
    pub emt_item_id: Option<String>,
    pub price: Option<Amount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccommodationStay {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub stay_type: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub guests: u32,
    pub price: Option<Amount>,
    pub provider: Option<String>,
    pub emt_item_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookableActivity {
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub participants: u32,
    pub price: Option<Amount>,
    pub emt_item_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingInfo {
    pub transportation: Vec<TransportSegment>,
    pub accommodations: Vec<AccommodationStay>,
    pub activities: Vec<BookableActivity>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripParams {
    pub from: String,
    pub destination: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub duration: u32,
    pub budget: Option<Amount>,
    pub interests: Vec<String>,
    pub travel_style: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    pub group_size: u32,
    pub special_requirements: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Feedback {
    pub rating: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Itinerary {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub params: TripParams,
    #[serde(rename = "itinerary")]
    pub plan: ItineraryPlan,
    pub booking_info: BookingInfo,
    pub status: Option<String>,
    pub booking_id: Option<String>,
    pub feedback: Option<Feedback>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Itinerary {
    pub fn destination(&self) -> &str {
        &self.params.destination
    }

    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.plan.days.iter().flat_map(|d| d.activities.iter())
    }

    /// JSON of the first `n` days, for prompts.
    pub fn days_json(&self, n: usize) -> String {
        let days: Vec<&DayPlan> = self.plan.days.iter().take(n).collect();
        serde_json::to_string(&days).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_as_cost_strips_currency() {
        assert_eq!(Amount::Text("₹1,200.50".into()).as_cost(), 1200.5);
        assert_eq!(Amount::Text("free".into()).as_cost(), 0.0);
        assert_eq!(Amount::Number(42.0).as_cost(), 42.0);
    }

    #[test]
    fn test_amount_leading_number() {
        assert_eq!(Amount::Text("about 12.5 km".into()).leading_number(), 12.5);
        assert_eq!(Amount::Text("short hop".into()).leading_number(), 0.0);
    }

    #[test]
    fn test_itinerary_accepts_loose_document() {
        let itinerary: Itinerary = serde_json::from_value(json!({
            "id": "trip-1",
            "params": { "destination": "Goa", "duration": "3", "budget": 25000 },
            "itinerary": {
                "days": [{
                    "day": 1,
                    "activities": [{ "activity": "Beach walk", "cost": "₹500", "bookingRequired": true }],
                    "meals": [{ "cuisine": "Local Goan", "restaurant": "Fisherman's Wharf" }],
                    "transportation": { "mode": "Bus", "distance": "20 km" }
                }],
                "summary": "Sun and sand"
            }
        }))
        .unwrap();

        assert_eq!(itinerary.id.as_deref(), Some("trip-1"));
        assert_eq!(itinerary.params.duration, 3);
        assert_eq!(itinerary.plan.days[0].activities[0].booking_required, true);
        assert_eq!(itinerary.plan.extra["summary"], "Sun and sand");
        assert_eq!(itinerary.activities().count(), 1);
    }
}
