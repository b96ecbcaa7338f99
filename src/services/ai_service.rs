use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use log::{info, warn};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::models::itinerary::{
    Activity, Amount, DayPlan, Itinerary, ItineraryPlan, Meal, TripParams, Transportation,
};
use crate::services::gemini::GeminiClient;
use crate::services::trip_service::TripService;

const DEFAULT_TRAVEL_STYLE: &str = "balanced";
const DEFAULT_GROUP_SIZE: u32 = 2;
const DAY_START: (u32, u32) = (9, 0);
const HOURS_BETWEEN_ACTIVITIES: i64 = 3;
const ACTIVITIES_PER_DAY: usize = 3;

/// Rejects a generation request missing any of origin, destination,
/// duration, budget or interests.
pub fn validate_trip_params(params: &TripParams) -> ApiResult<()> {
    let complete = !params.from.trim().is_empty()
        && !params.destination.trim().is_empty()
        && params.duration > 0
        && params.budget.as_ref().map_or(false, |b| b.as_cost() > 0.0)
        && !params.interests.is_empty();

    if complete {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "Missing required itinerary parameters".to_string(),
        ))
    }
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        })
}

/// Fills travel style, group size and the date range. The end date is
/// `duration` days after the start.
pub fn with_defaults(mut params: TripParams, now: DateTime<Utc>) -> TripParams {
    if params.travel_style.as_deref().map_or(true, str::is_empty) {
        params.travel_style = Some(DEFAULT_TRAVEL_STYLE.to_string());
    }
    if params.group_size == 0 {
        params.group_size = DEFAULT_GROUP_SIZE;
    }

    let start = params
        .start_date
        .as_deref()
        .and_then(parse_date)
        .unwrap_or(now);
    if params.start_date.is_none() {
        params.start_date = Some(start.to_rfc3339());
    }
    if params.end_date.is_none() {
        params.end_date = Some((start + Duration::days(params.duration as i64)).to_rfc3339());
    }
    params
}

fn slot(index: usize) -> String {
    let (hour, minute) = DAY_START;
    let start = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    (start + Duration::hours(HOURS_BETWEEN_ACTIVITIES * index as i64))
        .format("%H:%M")
        .to_string()
}

/// Day-by-day plan built from the request alone: one activity per interest
/// (cycled), three local meals and a bus for getting around.
pub fn skeleton_plan(params: &TripParams) -> ItineraryPlan {
    let destination = params.destination.as_str();
    let start = params
        .start_date
        .as_deref()
        .and_then(parse_date)
        .map(|d| d.date_naive());
    let per_person = params.budget.as_ref().map_or(0.0, Amount::as_cost)
        / params.duration.max(1) as f64
        / ACTIVITIES_PER_DAY as f64;

    let interests: Vec<&str> = if params.interests.is_empty() {
        vec!["sightseeing"]
    } else {
        params.interests.iter().map(String::as_str).collect()
    };

    let days = (0..params.duration.max(1))
        .map(|i| {
            let theme = match i {
                0 => format!("Arrival in {}", destination),
                n if n + 1 == params.duration => format!("Last day in {}", destination),
                _ => format!("Exploring {}", destination),
            };

            let activities = (0..ACTIVITIES_PER_DAY)
                .map(|n| {
                    let interest = interests[(i as usize * ACTIVITIES_PER_DAY + n) % interests.len()];
                    Activity {
                        time: Some(slot(n)),
                        activity: format!("{} experience in {}", capitalize(interest), destination),
                        location: Some(destination.to_string()),
                        description: Some(format!("Explore {} highlights around {}", interest, destination)),
                        duration: Some(format!("{} hours", HOURS_BETWEEN_ACTIVITIES - 1)),
                        cost: Some(Amount::Number(per_person.round())),
                        category: Some(interest.to_string()),
                        ..Default::default()
                    }
                })
                .collect();

            let meals = [("breakfast", "08:00"), ("lunch", "13:00"), ("dinner", "20:00")]
                .into_iter()
                .map(|(meal, time)| Meal {
                    time: Some(time.to_string()),
                    meal_type: Some(meal.to_string()),
                    restaurant: Some(format!("Local restaurant in {}", destination)),
                    cuisine: Some("Local".to_string()),
                    ..Default::default()
                })
                .collect();

            DayPlan {
                day: i + 1,
                date: start.map(|d| (d + Duration::days(i as i64)).to_string()),
                theme: Some(theme),
                activities,
                meals,
                transportation: Some(Transportation {
                    mode: Some("bus".to_string()),
                    distance: Some(Amount::Text("10 km".to_string())),
                    passengers: params.group_size,
                    ..Default::default()
                }),
                ..Default::default()
            }
        })
        .collect();

    let mut extra = Map::new();
    extra.insert(
        "summary".to_string(),
        json!(format!(
            "{}-day trip from {} to {}",
            params.duration, params.from, destination
        )),
    );
    extra.insert("generatedBy".to_string(), json!("fallback"));

    ItineraryPlan { days, extra }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn fallback_recommendations(destination: &str) -> Value {
    json!({
        "recommendations": [
            {
                "name": format!("Old town walk in {}", destination),
                "type": "attraction",
                "description": "Self-guided walk through the historic centre",
                "estimatedCost": 0,
                "bestTime": "morning"
            },
            {
                "name": "Local food market",
                "type": "food",
                "description": "Street food and regional specialities",
                "estimatedCost": 500,
                "bestTime": "evening"
            },
            {
                "name": "City museum",
                "type": "culture",
                "description": "Regional history and art collections",
                "estimatedCost": 200,
                "bestTime": "afternoon"
            }
        ]
    })
}

fn fallback_weather_adjustments() -> Value {
    json!({
        "adjustments": [],
        "indoorAlternatives": ["Museums", "Shopping centres", "Cooking classes"],
        "recommendations": [
            "Carry an umbrella or rain jacket",
            "Schedule outdoor activities for the clearest part of the day",
            "Keep a flexible buffer between activities"
        ]
    })
}

fn fallback_social_templates(destination: &str, platform: &str) -> Value {
    let tag: String = destination.split_whitespace().collect::<String>().to_lowercase();
    json!({
        "platform": platform,
        "templates": [
            {
                "type": "announcement",
                "content": format!("Heading to {}! Can't wait to explore.", destination),
                "hashtags": ["#travel", format!("#{}", tag), "#wanderlust"]
            },
            {
                "type": "highlight",
                "content": format!("Best moments from my trip to {}", destination),
                "hashtags": ["#travelgram", format!("#{}", tag)]
            }
        ]
    })
}

fn fallback_preference_analysis() -> Value {
    json!({
        "travelStyle": DEFAULT_TRAVEL_STYLE,
        "preferredActivities": [],
        "budgetRange": "moderate",
        "insights": ["Not enough history yet to analyse preferences"],
        "confidence": 0.3
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationRequest {
    pub destination: Option<String>,
    pub current_location: Option<Value>,
    pub interests: Vec<String>,
    pub budget: Option<Amount>,
    pub time_of_day: Option<String>,
    pub weather: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceRequest {
    pub trip_history: Vec<Value>,
    pub feedback: Vec<Value>,
    pub preferences: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdjustmentRequest {
    pub itinerary_id: String,
    pub adjustments: Value,
    pub reason: Option<String>,
    pub current_location: Option<Value>,
    pub weather: Option<Value>,
    pub time_constraints: Option<Value>,
}

#[derive(Clone)]
pub struct ItineraryAi {
    ai: GeminiClient,
    trips: TripService,
}

impl ItineraryAi {
    pub fn new(ai: GeminiClient, trips: TripService) -> Self {
        Self { ai, trips }
    }

    async fn plan_for(&self, params: &TripParams) -> ItineraryPlan {
        let prompt = format!(
            r#"Create a detailed {duration}-day travel itinerary from {from} to {destination}.

Budget: {budget}
Interests: {interests}
Travel style: {style}
Group size: {group}
Dates: {start} to {end}
Special requirements: {requirements}

Return JSON only, shaped as:
{{
  "summary": "one paragraph overview",
  "days": [{{
    "day": 1,
    "date": "YYYY-MM-DD",
    "theme": "theme of the day",
    "activities": [{{ "time": "09:00", "activity": "", "location": "", "description": "", "duration": "", "cost": 0, "category": "", "bookingRequired": false }}],
    "meals": [{{ "time": "", "type": "breakfast/lunch/dinner", "restaurant": "", "cuisine": "", "cost": 0 }}],
    "transportation": {{ "mode": "flight/train/bus/car/metro/walking/cycling/auto/taxi", "distance": "", "duration": "", "cost": 0 }}
  }}],
  "totalEstimatedCost": 0,
  "tips": []
}}"#,
            duration = params.duration,
            from = params.from,
            destination = params.destination,
            budget = params.budget.as_ref().map_or(0.0, Amount::as_cost),
            interests = params.interests.join(", "),
            style = params.travel_style.as_deref().unwrap_or(DEFAULT_TRAVEL_STYLE),
            group = params.group_size,
            start = params.start_date.as_deref().unwrap_or_default(),
            end = params.end_date.as_deref().unwrap_or_default(),
            requirements = params.special_requirements.join(", "),
        );

        let plan: ItineraryPlan = self
            .ai
            .typed_or("itinerary generation", &prompt, || skeleton_plan(params))
            .await;

        if plan.days.is_empty() {
            warn!("Generated itinerary for {} had no days, using skeleton", params.destination);
            return skeleton_plan(params);
        }
        plan
    }

    pub async fn generate_itinerary(&self, user_id: &str, params: TripParams) -> ApiResult<Itinerary> {
        validate_trip_params(&params)?;
        let params = with_defaults(params, Utc::now());

        let plan = self.plan_for(&params).await;
        let mut itinerary = Itinerary {
            params,
            plan,
            status: Some("generated".to_string()),
            ..Default::default()
        };

        let id = self.trips.save(user_id, itinerary.clone()).await?;
        let now = Utc::now();
        itinerary.id = Some(id);
        itinerary.user_id = user_id.to_string();
        itinerary.created_at = Some(now);
        itinerary.updated_at = Some(now);
        info!(
            "Generated {}-day itinerary to {} for {}",
            itinerary.params.duration,
            itinerary.destination(),
            user_id
        );
        Ok(itinerary)
    }

    pub async fn recommendations(&self, user_id: &str, request: &RecommendationRequest) -> Value {
        let destination = request.destination.as_deref().unwrap_or("the destination");
        let prompt = format!(
            r#"Give personalised travel recommendations for user {user_id} in {destination}.

Current location: {location}
Interests: {interests}
Budget: {budget}
Time of day: {time}
Weather: {weather}

Return JSON with a "recommendations" array of objects containing name, type,
description, estimatedCost and bestTime."#,
            location = request.current_location.clone().unwrap_or(Value::Null),
            interests = request.interests.join(", "),
            budget = request.budget.as_ref().map_or(0.0, Amount::as_cost),
            time = request.time_of_day.as_deref().unwrap_or("any"),
            weather = request.weather.clone().unwrap_or_else(|| json!("clear")),
        );

        self.ai
            .object_or("recommendations", &prompt, || fallback_recommendations(destination))
            .await
    }

    pub async fn weather_adjustments(&self, itinerary: &Value, weather: &Value) -> Value {
        let prompt = format!(
            r#"Adjust this travel itinerary for the forecast weather.

Itinerary: {itinerary}
Weather: {weather}

Return JSON with "adjustments" (day, original, suggested, reason),
"indoorAlternatives" and "recommendations"."#
        );

        self.ai
            .object_or("weather adjustments", &prompt, fallback_weather_adjustments)
            .await
    }

    pub async fn social_templates(&self, itinerary: &Value, platform: &str) -> Value {
        let destination = itinerary
            .pointer("/params/destination")
            .or_else(|| itinerary.get("destination"))
            .and_then(Value::as_str)
            .unwrap_or("my destination");

        let prompt = format!(
            r#"Write {platform} post templates for this trip.

Itinerary: {itinerary}

Return JSON with "platform" and a "templates" array of objects containing
type, content and hashtags."#
        );

        self.ai
            .object_or("social templates", &prompt, || {
                fallback_social_templates(destination, platform)
            })
            .await
    }

    pub async fn analyze_preferences(&self, user_id: &str, request: &PreferenceRequest) -> Value {
        let prompt = format!(
            r#"Analyse the travel preferences of user {user_id}.

Trip history: {history}
Feedback: {feedback}
Stated preferences: {preferences}

Return JSON with travelStyle, preferredActivities, budgetRange, insights and
confidence (0-1)."#,
            history = Value::Array(request.trip_history.clone()),
            feedback = Value::Array(request.feedback.clone()),
            preferences = Value::Object(request.preferences.clone()),
        );

        self.ai
            .object_or("preference analysis", &prompt, fallback_preference_analysis)
            .await
    }

    /// Rewrites an owned itinerary's plan. When the model gives nothing
    /// usable the plan is kept as it was.
    pub async fn adjust_itinerary(&self, user_id: &str, request: &AdjustmentRequest) -> ApiResult<Itinerary> {
        if request.itinerary_id.is_empty() {
            return Err(ApiError::BadRequest("itineraryId is required".to_string()));
        }
        let mut itinerary = self.trips.get(user_id, &request.itinerary_id).await?;

        let prompt = format!(
            r#"Adjust this travel itinerary in real time.

Current itinerary: {plan}
Requested adjustments: {adjustments}
Reason: {reason}
Current location: {location}
Weather: {weather}
Time constraints: {constraints}

Return the complete adjusted itinerary as JSON with the same "days" structure."#,
            plan = serde_json::to_string(&itinerary.plan).unwrap_or_default(),
            adjustments = request.adjustments,
            reason = request.reason.as_deref().unwrap_or("not given"),
            location = request.current_location.clone().unwrap_or(Value::Null),
            weather = request.weather.clone().unwrap_or(Value::Null),
            constraints = request.time_constraints.clone().unwrap_or(Value::Null),
        );

        let current = itinerary.plan.clone();
        let adjusted: ItineraryPlan = self
            .ai
            .typed_or("itinerary adjustment", &prompt, move || current)
            .await;
        if adjusted.days.is_empty() {
            return Ok(itinerary);
        }

        self.trips
            .replace_plan(&request.itinerary_id, &adjusted)
            .await?;
        itinerary.plan = adjusted;
        itinerary.updated_at = Some(Utc::now());
        Ok(itinerary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn params(value: Value) -> TripParams {
        serde_json::from_value(value).unwrap()
    }

    fn complete() -> Value {
        json!({
            "from": "Mumbai",
            "destination": "Goa",
            "duration": 3,
            "budget": 30000,
            "interests": ["beaches", "food"]
        })
    }

    #[test]
    fn test_validation_requires_core_fields() {
        assert!(validate_trip_params(&params(complete())).is_ok());

        for missing in ["from", "destination", "duration", "budget", "interests"] {
            let mut body = complete();
            body.as_object_mut().unwrap().remove(missing);
            assert!(
                matches!(validate_trip_params(&params(body)), Err(ApiError::BadRequest(_))),
                "{} should be required",
                missing
            );
        }

        let mut body = complete();
        body["interests"] = json!([]);
        assert!(validate_trip_params(&params(body)).is_err());
    }

    #[test]
    fn test_defaults_fill_style_group_and_dates() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let filled = with_defaults(params(complete()), now);

        assert_eq!(filled.travel_style.as_deref(), Some("balanced"));
        assert_eq!(filled.group_size, 2);
        assert_eq!(filled.start_date.as_deref(), Some("2026-03-01T10:00:00+00:00"));
        assert_eq!(filled.end_date.as_deref(), Some("2026-03-04T10:00:00+00:00"));

        let mut body = complete();
        body["startDate"] = json!("2026-05-10");
        body["groupSize"] = json!("4");
        let filled = with_defaults(params(body), now);
        assert_eq!(filled.group_size, 4);
        assert_eq!(filled.start_date.as_deref(), Some("2026-05-10"));
        assert_eq!(filled.end_date.as_deref(), Some("2026-05-13T00:00:00+00:00"));
    }

    #[test]
    fn test_skeleton_plan_covers_every_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let plan = skeleton_plan(&with_defaults(params(complete()), now));

        assert_eq!(plan.days.len(), 3);
        assert_eq!(plan.days[0].theme.as_deref(), Some("Arrival in Goa"));
        assert_eq!(plan.days[2].theme.as_deref(), Some("Last day in Goa"));
        assert_eq!(plan.days[1].date.as_deref(), Some("2026-03-02"));
        assert_eq!(plan.days[0].activities.len(), 3);
        assert_eq!(plan.days[0].activities[0].time.as_deref(), Some("09:00"));
        assert_eq!(plan.days[0].activities[1].time.as_deref(), Some("12:00"));
        assert_eq!(plan.days[0].activities[0].activity, "Beaches experience in Goa");
        assert_eq!(plan.days[0].activities[1].category.as_deref(), Some("food"));
        assert_eq!(plan.days[0].meals.len(), 3);
        assert_eq!(plan.extra["generatedBy"], "fallback");
    }

    #[test]
    fn test_social_template_fallback_tags_destination() {
        let templates = fallback_social_templates("New Delhi", "instagram");
        assert_eq!(templates["templates"][0]["hashtags"][1], "#newdelhi");
    }
}
