use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Utc};
use futures::TryStreamExt;
use log::error;
use mongodb::{
    bson::{doc, Document},
    Collection, Database,
};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::mongo::{RECOMMENDATION_TRACKING, USER_ANALYTICS};
use crate::error::ApiResult;
use crate::models::analytics::{
    RecommendationAction, RecommendationEvent, RecommendationStats, SustainabilityMetrics, Trends,
};
use crate::models::itinerary::{Activity, Amount, Itinerary};
use crate::services::gemini::GeminiClient;
use crate::services::sustainability_service::{carbon_breakdown, local_impact};
use crate::services::trip_service::TripService;

pub const ANALYTICS_CATEGORIES: [&str; 8] = [
    "travel_patterns",
    "budget_optimization",
    "destination_preferences",
    "seasonal_trends",
    "group_dynamics",
    "sustainability_metrics",
    "satisfaction_analysis",
    "recommendation_effectiveness",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPoint {
    pub total_budget: f64,
    pub estimated_cost: f64,
    pub actual_cost: f64,
    pub duration: u32,
    pub destination: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationPoint {
    pub destination: String,
    pub region: &'static str,
    pub interests: Vec<String>,
    pub satisfaction: f64,
    pub duration: u32,
    pub budget: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalPoint {
    pub month: Option<u32>,
    pub season: Option<&'static str>,
    pub destination: String,
    pub weather: Option<Value>,
    pub budget: f64,
    pub satisfaction: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPoint {
    pub group_size: u32,
    pub travel_style: String,
    pub interests: Vec<String>,
    pub budget: f64,
    pub satisfaction: f64,
    pub activities: Vec<Activity>,
}

fn budget_of(trip: &Itinerary) -> f64 {
    trip.params.budget.as_ref().map(|b| b.as_cost()).unwrap_or(0.0)
}

fn satisfaction_of(trip: &Itinerary) -> f64 {
    trip.feedback.as_ref().and_then(|f| f.rating).unwrap_or(0.0)
}

pub fn region_for(destination: &str) -> &'static str {
    match destination {
        "Mumbai" | "Pune" | "Ahmedabad" | "Goa" => "West",
        "Delhi" | "Jaipur" => "North",
        "Bangalore" | "Chennai" | "Hyderabad" => "South",
        "Kolkata" => "East",
        _ => "Unknown",
    }
}

/// Month is zero-based (January = 0).
pub fn season_for_month(month0: u32) -> &'static str {
    match month0 {
        2..=4 => "Spring",
        5..=7 => "Summer",
        8..=10 => "Autumn",
        _ => "Winter",
    }
}

pub fn analysis_confidence(trip_count: usize) -> f64 {
    if trip_count < 3 {
        0.3
    } else if trip_count < 10 {
        0.6
    } else {
        0.9
    }
}

/// Percentage change of the mean between the recent and older halves.
pub fn trend(recent: &[f64], older: &[f64]) -> f64 {
    if recent.is_empty() || older.is_empty() {
        return 0.0;
    }
    let recent_avg = recent.iter().sum::<f64>() / recent.len() as f64;
    let older_avg = older.iter().sum::<f64>() / older.len() as f64;

    if older_avg == 0.0 {
        return 0.0;
    }
    (recent_avg - older_avg) / older_avg * 100.0
}

/// `trips` must be ordered newest first; the first half (rounded up) is
/// "recent".
pub fn trends(trips: &[Itinerary]) -> Trends {
    let split = (trips.len() + 1) / 2;
    let (recent, older) = trips.split_at(split);
    let field = |f: fn(&Itinerary) -> f64| -> (Vec<f64>, Vec<f64>) {
        (
            recent.iter().map(f).collect(),
            older.iter().map(f).collect(),
        )
    };

    let (rb, ob) = field(budget_of);
    let (rd, od) = field(|t| t.params.duration as f64);
    let (rs, os) = field(satisfaction_of);

    Trends {
        budget_trend: trend(&rb, &ob),
        duration_trend: trend(&rd, &od),
        satisfaction_trend: trend(&rs, &os),
    }
}

pub fn budget_points(trips: &[Itinerary]) -> Vec<BudgetPoint> {
    trips
        .iter()
        .map(|trip| BudgetPoint {
            total_budget: budget_of(trip),
            estimated_cost: trip
                .plan
                .extra
                .get("estimatedCost")
                .map(|v| match v {
                    Value::Number(n) => n.as_f64().unwrap_or(0.0),
                    Value::String(s) => Amount::Text(s.clone()).as_cost(),
                    _ => 0.0,
                })
                .unwrap_or(0.0),
            actual_cost: trip
                .extra
                .get("booking")
                .and_then(|b| b.get("totalCost"))
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            duration: trip.params.duration,
            destination: trip.params.destination.clone(),
        })
        .collect()
}

pub fn destination_points(trips: &[Itinerary]) -> Vec<DestinationPoint> {
    trips
        .iter()
        .map(|trip| DestinationPoint {
            destination: trip.params.destination.clone(),
            region: region_for(&trip.params.destination),
            interests: trip.params.interests.clone(),
            satisfaction: satisfaction_of(trip),
            duration: trip.params.duration,
            budget: budget_of(trip),
        })
        .collect()
}

pub fn seasonal_points(trips: &[Itinerary]) -> Vec<SeasonalPoint> {
    trips
        .iter()
        .map(|trip| {
            let month = trip.created_at.map(|d| d.month0());
            SeasonalPoint {
                month,
                season: month.map(season_for_month),
                destination: trip.params.destination.clone(),
                weather: trip
                    .extra
                    .get("realTimeData")
                    .and_then(|r| r.get("weather"))
                    .filter(|w| !w.is_null())
                    .cloned(),
                budget: budget_of(trip),
                satisfaction: satisfaction_of(trip),
            }
        })
        .collect()
}

pub fn group_points(trips: &[Itinerary]) -> Vec<GroupPoint> {
    trips
        .iter()
        .map(|trip| GroupPoint {
            group_size: trip.params.group_size.max(1),
            travel_style: trip
                .params
                .travel_style
                .clone()
                .unwrap_or_else(|| "balanced".to_string()),
            interests: trip.params.interests.clone(),
            budget: budget_of(trip),
            satisfaction: satisfaction_of(trip),
            activities: trip.activities().cloned().collect(),
        })
        .collect()
}

/// Percentage of budget left unspent across all trips.
pub fn budget_efficiency(points: &[BudgetPoint]) -> f64 {
    let total_budget: f64 = points.iter().map(|p| p.total_budget).sum();
    let total_actual: f64 = points.iter().map(|p| p.actual_cost).sum();

    if total_budget == 0.0 {
        return 0.0;
    }
    (total_budget - total_actual) / total_budget * 100.0
}

pub fn destination_diversity(points: &[DestinationPoint]) -> usize {
    points
        .iter()
        .map(|p| p.destination.as_str())
        .collect::<HashSet<_>>()
        .len()
}

pub fn exploration_score(points: &[DestinationPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    destination_diversity(points) as f64 / points.len() as f64 * 100.0
}

pub fn seasonal_consistency(points: &[SeasonalPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for season in points.iter().filter_map(|p| p.season) {
        *counts.entry(season).or_default() += 1;
    }
    let max = counts.values().copied().max().unwrap_or(0);
    max as f64 / points.len() as f64 * 100.0
}

pub fn weather_preferences(points: &[SeasonalPoint]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for weather in points.iter().filter_map(|p| p.weather.as_ref()) {
        let condition = weather
            .get("condition")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        *counts.entry(condition).or_default() += 1;
    }
    counts
}

/// Most frequent group size; ties go to the larger size.
pub fn group_preference(points: &[GroupPoint]) -> Option<u32> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for point in points {
        *counts.entry(point.group_size).or_default() += 1;
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(u32, usize)>, (size, count)| match best {
            Some((_, best_count)) if best_count > count => best,
            _ => Some((size, count)),
        })
        .map(|(size, _)| size)
}

pub fn social_score(points: &[GroupPoint]) -> &'static str {
    let solo = points.iter().filter(|p| p.group_size == 1).count();
    let group = points.len() - solo;
    if group > solo {
        "social"
    } else {
        "solo"
    }
}

/// Mean of the reported confidences; a missing or zero confidence counts as 0.5.
pub fn overall_confidence(analyses: &[Value]) -> f64 {
    if analyses.is_empty() {
        return 0.5;
    }
    let sum: f64 = analyses
        .iter()
        .map(|a| {
            a.get("confidence")
                .and_then(Value::as_f64)
                .filter(|c| *c != 0.0)
                .unwrap_or(0.5)
        })
        .sum();
    sum / analyses.len() as f64
}

fn personalized_recommendations(analysis: &Value) -> Vec<Value> {
    let mut recommendations = Vec::new();

    if let Some(destinations) = analysis.get("preferredDestinations").and_then(Value::as_array) {
        recommendations.push(json!({
            "type": "destination",
            "title": "Explore Similar Destinations",
            "description": "Based on your preferences, try these destinations",
            "destinations": destinations.iter().take(3).collect::<Vec<_>>(),
        }));
    }
    if let Some(tips) = analysis.get("budgetOptimization").and_then(Value::as_array) {
        recommendations.push(json!({
            "type": "budget",
            "title": "Budget Optimization",
            "description": "Save money with these tips",
            "tips": tips.iter().take(3).collect::<Vec<_>>(),
        }));
    }

    recommendations
}

fn session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(26)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

fn merge(mut base: Value, extra: Value) -> Value {
    if let (Some(base), Value::Object(extra)) = (base.as_object_mut(), extra) {
        base.extend(extra);
    }
    base
}

fn empty_analysis() -> Value {
    json!({
        "message": "Insufficient data for analysis. Complete more trips to get personalized insights.",
        "recommendations": ["Plan your first trip", "Explore different destinations", "Try various activities"]
    })
}

fn fallback_travel_analysis(total_trips: usize) -> Value {
    json!({
        "totalTrips": total_trips,
        "preferredDestinations": ["Mumbai", "Delhi", "Bangalore"],
        "averageBudget": 15000,
        "averageDuration": 3,
        "confidence": 0.3,
        "recommendations": ["Try new destinations", "Explore different activities"]
    })
}

fn fallback_budget_analysis() -> Value {
    json!({
        "averageSpending": 15000,
        "potentialSavings": 2000,
        "recommendations": ["Book in advance", "Use public transport", "Choose local accommodations"]
    })
}

fn fallback_destination_analysis() -> Value {
    json!({
        "preferredRegions": ["North India", "South India"],
        "explorationScore": 50,
        "recommendations": ["Try East India", "Explore West India"]
    })
}

fn fallback_seasonal_analysis() -> Value {
    json!({
        "peakSeason": "Winter",
        "seasonalConsistency": 60,
        "recommendations": ["Try off-season travel", "Explore monsoon destinations"]
    })
}

fn fallback_group_analysis() -> Value {
    json!({
        "preferredGroupSize": 2,
        "socialScore": "balanced",
        "recommendations": ["Try solo travel", "Plan group trips"]
    })
}

fn fallback_insights() -> Value {
    json!({
        "userProfile": "Balanced traveler",
        "keyPatterns": ["Prefers cultural destinations", "Moderate budget", "Group travel"],
        "recommendations": ["Explore new regions", "Try different activities"],
        "confidence": 0.5
    })
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[derive(Clone)]
pub struct AnalyticsService {
    ai: GeminiClient,
    trips: TripService,
    tracking: Collection<RecommendationEvent>,
    analyses: Collection<Document>,
}

impl AnalyticsService {
    pub fn new(db: &Database, ai: GeminiClient, trips: TripService) -> Self {
        Self {
            ai,
            trips,
            tracking: db.collection(RECOMMENDATION_TRACKING),
            analyses: db.collection(USER_ANALYTICS),
        }
    }

    async fn history(&self, user_id: &str, limit: Option<i64>) -> Vec<Itinerary> {
        self.trips.history(user_id, limit).await.unwrap_or_else(|e| {
            error!("Error getting trip history for {}: {}", user_id, e);
            Vec::new()
        })
    }

    async fn save_analysis(&self, user_id: &str, category: &str, analysis: &Value) {
        let record = json!({
            "_id": Uuid::new_v4().to_string(),
            "userId": user_id,
            "category": category,
            "analysis": analysis,
            "createdAt": Utc::now().to_rfc3339(),
        });

        let result = match bson::to_document(&record) {
            Ok(document) => self.analyses.insert_one(document).await.map(|_| ()),
            Err(e) => {
                error!("Error encoding {} analysis: {}", category, e);
                return;
            }
        };
        if let Err(e) = result {
            error!("Error saving {} analysis: {}", category, e);
        }
    }

    /// Generates an AI analysis, enriches it with locally computed metrics and
    /// stores it. Returns `None` when the model gave nothing usable.
    async fn enriched(&self, user_id: &str, category: &str, prompt: &str, extra: Value) -> Option<Value> {
        match self.ai.generate_object(prompt).await {
            Ok(analysis) => {
                let enriched = merge(
                    analysis,
                    merge(
                        json!({ "userId": user_id, "analysisDate": Utc::now().to_rfc3339() }),
                        extra,
                    ),
                );
                self.save_analysis(user_id, category, &enriched).await;
                Some(enriched)
            }
            Err(e) => {
                error!("{} analysis for {}: {}, using fallback", category, user_id, e);
                None
            }
        }
    }

    pub async fn travel_patterns(&self, user_id: &str, trips: &[Itinerary]) -> Value {
        if trips.is_empty() {
            return empty_analysis();
        }

        let sample: Vec<_> = trips.iter().take(10).collect();
        let prompt = format!(
            r#"Analyze travel patterns from this user's trip history:

User ID: {user_id}
Trip History: {history}

Provide comprehensive analysis including preferred destinations and regions
(as "preferredDestinations"), travel frequency and seasonality, budget patterns,
group size preferences, activity and interest patterns, booking behaviour,
satisfaction trends and predictions for future travel.

Format as JSON with detailed insights and recommendations."#,
            history = to_json(&sample),
        );

        match self.ai.generate_object(&prompt).await {
            Ok(analysis) => {
                let recommendations = personalized_recommendations(&analysis);
                let enriched = merge(
                    analysis,
                    json!({
                        "userId": user_id,
                        "totalTrips": trips.len(),
                        "analysisDate": Utc::now().to_rfc3339(),
                        "confidence": analysis_confidence(trips.len()),
                        "trends": trends(trips),
                        "recommendations": recommendations,
                    }),
                );
                self.save_analysis(user_id, "travel_patterns", &enriched).await;
                enriched
            }
            Err(e) => {
                error!("travel_patterns analysis for {}: {}, using fallback", user_id, e);
                fallback_travel_analysis(trips.len())
            }
        }
    }

    pub async fn budget_optimization(&self, user_id: &str, trips: &[Itinerary]) -> Value {
        let points = budget_points(trips);
        let prompt = format!(
            r#"Analyze budget optimization opportunities for this user:

User ID: {user_id}
Budget Data: {data}

Provide spending patterns by category, cost per day trends, budget vs actual
spending, seasonal price variations, cost-saving opportunities, budget
allocation recommendations and a "potentialSavings" estimate.

Format as JSON with specific recommendations and savings estimates."#,
            data = to_json(&points),
        );

        let efficiency = budget_efficiency(&points);
        match self
            .enriched(user_id, "budget_optimization", &prompt, json!({ "budgetEfficiency": efficiency }))
            .await
        {
            Some(mut analysis) => {
                let savings = analysis
                    .get("potentialSavings")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0);
                analysis["totalSavings"] = json!(savings);
                analysis
            }
            None => fallback_budget_analysis(),
        }
    }

    pub async fn destination_preferences(&self, user_id: &str, trips: &[Itinerary]) -> Value {
        let points = destination_points(trips);
        let prompt = format!(
            r#"Analyze destination preferences for this user:

User ID: {user_id}
Destination Data: {data}

Provide preferred destination types and regions, activity preferences by
destination, seasonal destination preferences, budget vs destination
correlation, satisfaction by destination type, unexplored destination
recommendations and similar destination suggestions.

Format as JSON with detailed insights and recommendations."#,
            data = to_json(&points),
        );

        let extra = json!({
            "destinationDiversity": destination_diversity(&points),
            "explorationScore": exploration_score(&points),
        });
        self.enriched(user_id, "destination_preferences", &prompt, extra)
            .await
            .unwrap_or_else(fallback_destination_analysis)
    }

    pub async fn seasonal_trends(&self, user_id: &str, trips: &[Itinerary]) -> Value {
        let points = seasonal_points(trips);
        let prompt = format!(
            r#"Analyze seasonal travel trends for this user:

User ID: {user_id}
Seasonal Data: {data}

Provide peak travel seasons and months, seasonal destination preferences,
weather-based travel patterns, seasonal budget variations, holiday and festival
travel patterns, off-season opportunities and future seasonal predictions.

Format as JSON with seasonal insights and recommendations."#,
            data = to_json(&points),
        );

        let extra = json!({
            "seasonalConsistency": seasonal_consistency(&points),
            "weatherPreferences": weather_preferences(&points),
        });
        self.enriched(user_id, "seasonal_trends", &prompt, extra)
            .await
            .unwrap_or_else(fallback_seasonal_analysis)
    }

    pub async fn group_dynamics(&self, user_id: &str, trips: &[Itinerary]) -> Value {
        let points = group_points(trips);
        let prompt = format!(
            r#"Analyze group travel dynamics for this user:

User ID: {user_id}
Group Data: {data}

Provide preferred group sizes and compositions, group size vs satisfaction,
activity preferences by group size, budget implications of group size, social
vs solo travel patterns and recommendations for group travel.

Format as JSON with group dynamics insights."#,
            data = to_json(&points),
        );

        let extra = json!({
            "groupPreference": group_preference(&points),
            "socialScore": social_score(&points),
        });
        self.enriched(user_id, "group_dynamics", &prompt, extra)
            .await
            .unwrap_or_else(fallback_group_analysis)
    }

    /// Runs the five analyses concurrently, then asks the model to combine
    /// them.
    pub async fn user_insights(&self, user_id: &str) -> Value {
        let trips = self.history(user_id, None).await;

        let (patterns, budget, destinations, seasonal, group) = futures::join!(
            self.travel_patterns(user_id, &trips),
            self.budget_optimization(user_id, &trips),
            self.destination_preferences(user_id, &trips),
            self.seasonal_trends(user_id, &trips),
            self.group_dynamics(user_id, &trips),
        );
        let analyses = [patterns, budget, destinations, seasonal, group];

        let prompt = format!(
            r#"Generate comprehensive user insights by combining these analyses:

Travel Patterns: {}
Budget Optimization: {}
Destination Preferences: {}
Seasonal Trends: {}
Group Dynamics: {}

Provide an overall user profile summary, key behavioral patterns, personalized
recommendations, future travel predictions, optimization opportunities, risk
factors and actionable next steps.

Format as JSON with comprehensive insights."#,
            analyses[0], analyses[1], analyses[2], analyses[3], analyses[4],
        );

        let now = Utc::now().to_rfc3339();
        let extra = json!({
            "confidence": overall_confidence(&analyses),
            "categories": ANALYTICS_CATEGORIES,
            "lastUpdated": now,
        });
        self.enriched(user_id, "comprehensive_insights", &prompt, extra)
            .await
            .unwrap_or_else(fallback_insights)
    }

    pub async fn track_recommendation(
        &self,
        user_id: &str,
        recommendation_id: &str,
        action: RecommendationAction,
    ) -> ApiResult<RecommendationEvent> {
        let event = RecommendationEvent {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            recommendation_id: recommendation_id.to_string(),
            action,
            timestamp: Utc::now(),
            session_id: session_id(),
        };

        self.tracking.insert_one(&event).await?;
        Ok(event)
    }

    async fn events(&self, user_id: &str) -> mongodb::error::Result<Vec<RecommendationEvent>> {
        let cursor = self.tracking.find(doc! { "userId": user_id }).await?;
        cursor.try_collect().await
    }

    pub async fn recommendation_stats(&self, user_id: &str) -> RecommendationStats {
        let mut stats = RecommendationStats::default();
        match self.events(user_id).await {
            Ok(events) => events.iter().for_each(|e| stats.record(e.action)),
            Err(e) => error!("Error getting recommendation stats for {}: {}", user_id, e),
        }
        stats
    }

    pub fn sustainability_metrics(trips: &[Itinerary]) -> SustainabilityMetrics {
        if trips.is_empty() {
            return SustainabilityMetrics::default();
        }

        let total_carbon: f64 = trips.iter().map(|t| carbon_breakdown(t).0).sum();
        let total_impact: f64 = trips.iter().map(|t| local_impact(t).score as f64).sum();
        let count = trips.len() as f64;

        SustainabilityMetrics {
            total_carbon,
            average_carbon: total_carbon / count,
            average_local_impact: total_impact / count,
            total_trips: trips.len(),
        }
    }

    pub async fn dashboard(&self, user_id: &str) -> Value {
        let user_insights = self.user_insights(user_id).await;
        let recent_trips = self.history(user_id, Some(5)).await;
        let recommendation_stats = self.recommendation_stats(user_id).await;
        let all_trips = self.history(user_id, None).await;

        json!({
            "userInsights": user_insights,
            "recentTrips": recent_trips,
            "recommendationStats": recommendation_stats,
            "sustainabilityMetrics": Self::sustainability_metrics(&all_trips),
            "generatedAt": Utc::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn trip(destination: &str, budget: f64, duration: u32, group: u32, month: u32) -> Itinerary {
        let mut trip: Itinerary = serde_json::from_value(json!({
            "params": {
                "destination": destination,
                "budget": budget,
                "duration": duration,
                "groupSize": group
            }
        }))
        .unwrap();
        trip.created_at = Some(Utc.with_ymd_and_hms(2024, month, 15, 0, 0, 0).unwrap());
        trip
    }

    #[test]
    fn test_region_lookup() {
        assert_eq!(region_for("Goa"), "West");
        assert_eq!(region_for("Kolkata"), "East");
        assert_eq!(region_for("Paris"), "Unknown");
    }

    #[test]
    fn test_seasons() {
        assert_eq!(season_for_month(0), "Winter");
        assert_eq!(season_for_month(2), "Spring");
        assert_eq!(season_for_month(7), "Summer");
        assert_eq!(season_for_month(10), "Autumn");
        assert_eq!(season_for_month(11), "Winter");
    }

    #[test]
    fn test_confidence_bands() {
        assert_eq!(analysis_confidence(2), 0.3);
        assert_eq!(analysis_confidence(3), 0.6);
        assert_eq!(analysis_confidence(10), 0.9);
    }

    #[test]
    fn test_trends_compare_halves() {
        // newest first: recent half = first two trips
        let trips = vec![
            trip("Goa", 30000.0, 4, 2, 6),
            trip("Goa", 30000.0, 4, 2, 5),
            trip("Delhi", 20000.0, 2, 1, 1),
        ];
        let t = trends(&trips);
        assert_eq!(t.budget_trend, 50.0);
        assert_eq!(t.duration_trend, 100.0);
        assert_eq!(t.satisfaction_trend, 0.0);
    }

    #[test]
    fn test_destination_metrics() {
        let trips = vec![
            trip("Goa", 0.0, 3, 2, 1),
            trip("Goa", 0.0, 3, 2, 2),
            trip("Delhi", 0.0, 3, 2, 3),
            trip("Jaipur", 0.0, 3, 2, 4),
        ];
        let points = destination_points(&trips);
        assert_eq!(destination_diversity(&points), 3);
        assert_eq!(exploration_score(&points), 75.0);
        assert_eq!(exploration_score(&[]), 0.0);
    }

    #[test]
    fn test_seasonal_consistency() {
        // Jan, Feb, Dec are winter; Apr is spring
        let trips = vec![
            trip("Goa", 0.0, 3, 2, 1),
            trip("Goa", 0.0, 3, 2, 2),
            trip("Goa", 0.0, 3, 2, 12),
            trip("Goa", 0.0, 3, 2, 4),
        ];
        assert_eq!(seasonal_consistency(&seasonal_points(&trips)), 75.0);
    }

    #[test]
    fn test_group_preference_and_social_score() {
        let trips = vec![
            trip("Goa", 0.0, 3, 4, 1),
            trip("Goa", 0.0, 3, 1, 1),
            trip("Goa", 0.0, 3, 4, 1),
        ];
        let points = group_points(&trips);
        assert_eq!(group_preference(&points), Some(4));
        assert_eq!(social_score(&points), "social");
        assert_eq!(group_preference(&[]), None);
    }

    #[test]
    fn test_group_preference_tie_keeps_larger_size() {
        let trips = vec![
            trip("Goa", 0.0, 3, 2, 1),
            trip("Goa", 0.0, 3, 6, 1),
            trip("Goa", 0.0, 3, 2, 1),
            trip("Goa", 0.0, 3, 6, 1),
            trip("Goa", 0.0, 3, 1, 1),
        ];
        assert_eq!(group_preference(&group_points(&trips)), Some(6));
    }

    #[test]
    fn test_budget_efficiency() {
        let points = vec![
            BudgetPoint {
                total_budget: 10000.0,
                estimated_cost: 0.0,
                actual_cost: 8000.0,
                duration: 3,
                destination: "Goa".into(),
            },
            BudgetPoint {
                total_budget: 10000.0,
                estimated_cost: 0.0,
                actual_cost: 7000.0,
                duration: 3,
                destination: "Pune".into(),
            },
        ];
        assert_eq!(budget_efficiency(&points), 25.0);
        assert_eq!(budget_efficiency(&[]), 0.0);
    }

    #[test]
    fn test_overall_confidence_defaults_missing_and_zero_values() {
        let analyses = [json!({"confidence": 0.8}), json!({}), json!({"confidence": 0.0})];
        assert!((overall_confidence(&analyses) - 0.6).abs() < 1e-9);
        assert_eq!(overall_confidence(&[json!({"confidence": 0})]), 0.5);
        assert_eq!(overall_confidence(&[]), 0.5);
    }

    #[test]
    fn test_session_id_shape() {
        let id = session_id();
        assert_eq!(id.len(), 26);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_sustainability_metrics_average() {
        let trips: Vec<Itinerary> = vec![
            serde_json::from_value(json!({
                "itinerary": { "days": [{ "transportation": { "mode": "car", "distance": "100 km" } }] }
            }))
            .unwrap(),
            Itinerary::default(),
        ];
        let metrics = AnalyticsService::sustainability_metrics(&trips);
        assert_eq!(metrics.total_trips, 2);
        assert_eq!(metrics.total_carbon, 19.2);
        assert_eq!(metrics.average_carbon, 9.6);
    }
}
