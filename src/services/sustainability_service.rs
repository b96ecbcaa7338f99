use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::itinerary::{AccommodationStay, Activity, Itinerary, Meal, Transportation};
use crate::services::gemini::GeminiClient;

const DEFAULT_DISTANCE_KM: f64 = 10.0;
const HIGH_IMPACT_TRIP_KG: f64 = 300.0;

/// kg CO2 per km per person.
pub fn carbon_factor(mode: &str) -> Option<f64> {
    match mode {
        "flight" => Some(0.285),
        "train" => Some(0.041),
        "bus" => Some(0.089),
        "car" => Some(0.192),
        "metro" => Some(0.041),
        "walking" => Some(0.0),
        "cycling" => Some(0.0),
        "auto" => Some(0.089),
        "taxi" => Some(0.192),
        _ => None,
    }
}

pub fn eco_accommodation_rating(kind: &str) -> Option<f64> {
    match kind {
        "eco_lodge" => Some(9.0),
        "green_hotel" => Some(7.0),
        "sustainable_hostel" => Some(6.0),
        "regular_hotel" => Some(3.0),
        "luxury_hotel" => Some(2.0),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    NatureWalk,
    LocalCookingClass,
    CulturalMuseum,
    EcoTour,
    VolunteerWork,
    ShoppingMall,
    ThemePark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Neutral,
    Negative,
}

impl ActivityCategory {
    /// First matching keyword group wins; anything unrecognised counts as a
    /// museum visit, which is carbon neutral.
    pub fn classify(activity_name: &str) -> Self {
        let name = activity_name.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| name.contains(w));

        if has(&["walk", "hike"]) {
            ActivityCategory::NatureWalk
        } else if has(&["cook", "food"]) {
            ActivityCategory::LocalCookingClass
        } else if has(&["museum", "gallery"]) {
            ActivityCategory::CulturalMuseum
        } else if has(&["eco", "nature"]) {
            ActivityCategory::EcoTour
        } else if has(&["volunteer", "help"]) {
            ActivityCategory::VolunteerWork
        } else if has(&["shop", "mall"]) {
            ActivityCategory::ShoppingMall
        } else if has(&["theme", "park"]) {
            ActivityCategory::ThemePark
        } else {
            ActivityCategory::CulturalMuseum
        }
    }

    pub fn carbon_offset(self) -> f64 {
        match self {
            ActivityCategory::NatureWalk => 0.1,
            ActivityCategory::LocalCookingClass => 0.05,
            ActivityCategory::CulturalMuseum => 0.0,
            ActivityCategory::EcoTour => 0.2,
            ActivityCategory::VolunteerWork => 0.3,
            ActivityCategory::ShoppingMall => -0.1,
            ActivityCategory::ThemePark => -0.2,
        }
    }

    pub fn impact(self) -> Impact {
        match self {
            ActivityCategory::CulturalMuseum => Impact::Neutral,
            ActivityCategory::ShoppingMall | ActivityCategory::ThemePark => Impact::Negative,
            _ => Impact::Positive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rating {
    pub level: &'static str,
    pub color: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CarbonBreakdown {
    pub transportation: f64,
    pub accommodation: f64,
    pub activities: f64,
    pub food: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonFootprint {
    pub total_carbon: f64,
    pub breakdown: CarbonBreakdown,
    pub rating: Rating,
    pub recommendations: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocalImpact {
    pub score: i64,
    pub rating: Rating,
    pub factors: Vec<&'static str>,
    pub recommendations: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilityProgress {
    pub user_id: String,
    pub trip_id: Option<String>,
    pub carbon_saved: f64,
    pub local_businesses_supported: usize,
    pub eco_activities_completed: usize,
    pub sustainability_score: i64,
    pub achievements: Vec<&'static str>,
    pub next_goals: Vec<&'static str>,
}

pub fn transport_carbon(transport: &Transportation) -> f64 {
    let mode = transport
        .mode
        .as_deref()
        .map(str::to_lowercase)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "car".to_string());

    let mut distance = transport
        .distance
        .as_ref()
        .map(|d| d.leading_number())
        .unwrap_or(0.0);
    if distance == 0.0 {
        distance = DEFAULT_DISTANCE_KM;
    }

    let passengers = transport.passengers.max(1) as f64;
    let factor = carbon_factor(&mode)
        .or_else(|| carbon_factor("car"))
        .unwrap_or(0.192);

    distance * factor * passengers
}

pub fn activity_carbon(activity: &Activity) -> f64 {
    ActivityCategory::classify(&activity.activity).carbon_offset()
}

pub fn accommodation_carbon(stay: &AccommodationStay) -> f64 {
    let kind = stay
        .stay_type
        .as_deref()
        .map(str::to_lowercase)
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| "regular_hotel".to_string());

    match eco_accommodation_rating(&kind) {
        Some(rating) => (10.0 - rating) * 0.5,
        None => 2.0,
    }
}

pub fn food_carbon(itinerary: &Itinerary) -> f64 {
    itinerary
        .plan
        .days
        .iter()
        .flat_map(|d| d.meals.iter())
        .map(|meal| {
            let local = meal
                .cuisine
                .as_deref()
                .map(|c| c.to_lowercase().contains("local"))
                .unwrap_or(false);
            if local {
                0.5
            } else {
                1.0
            }
        })
        .sum()
}

pub fn carbon_rating(total: f64) -> Rating {
    let (level, color, message) = if total < 50.0 {
        ("excellent", "green", "Very eco-friendly trip!")
    } else if total < 100.0 {
        ("good", "blue", "Good environmental impact")
    } else if total < 200.0 {
        ("moderate", "yellow", "Moderate environmental impact")
    } else if total < 300.0 {
        ("high", "orange", "High environmental impact")
    } else {
        ("very_high", "red", "Very high environmental impact")
    };
    Rating {
        level,
        color,
        message,
    }
}

/// Transport, activity and accommodation emissions. Food is reported in the
/// breakdown but kept out of the total.
pub fn carbon_breakdown(itinerary: &Itinerary) -> (f64, CarbonBreakdown) {
    let mut breakdown = CarbonBreakdown::default();

    for day in &itinerary.plan.days {
        if let Some(transport) = &day.transportation {
            breakdown.transportation += transport_carbon(transport);
        }
        breakdown.activities += day.activities.iter().map(activity_carbon).sum::<f64>();
    }

    breakdown.accommodation = itinerary
        .booking_info
        .accommodations
        .iter()
        .map(accommodation_carbon)
        .sum();

    let total = breakdown.transportation + breakdown.activities + breakdown.accommodation;
    breakdown.food = food_carbon(itinerary);

    (round2(total), breakdown)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn activity_text(activity: &Activity) -> String {
    format!(
        "{} {}",
        activity.activity,
        activity.description.as_deref().unwrap_or("")
    )
    .to_lowercase()
}

pub fn is_local_business(activity: &Activity) -> bool {
    const KEYWORDS: [&str; 6] = [
        "local",
        "traditional",
        "artisan",
        "handmade",
        "family-owned",
        "small business",
    ];
    let text = activity_text(activity);
    KEYWORDS.iter().any(|k| text.contains(k))
}

pub fn is_local_food(meal: &Meal) -> bool {
    const KEYWORDS: [&str; 5] = ["local", "traditional", "street food", "home-cooked", "regional"];
    let text = format!(
        "{} {}",
        meal.cuisine.as_deref().unwrap_or(""),
        meal.restaurant.as_deref().unwrap_or("")
    )
    .to_lowercase();
    KEYWORDS.iter().any(|k| text.contains(k))
}

pub fn is_cultural_site(activity: &Activity) -> bool {
    const KEYWORDS: [&str; 7] = [
        "temple",
        "museum",
        "heritage",
        "monument",
        "cultural",
        "historical",
        "art gallery",
    ];
    let text = activity_text(activity);
    KEYWORDS.iter().any(|k| text.contains(k))
}

pub fn impact_rating(score: f64) -> Rating {
    let (level, color, message) = if score >= 80.0 {
        ("excellent", "green", "Excellent local impact!")
    } else if score >= 60.0 {
        ("good", "blue", "Good local community support")
    } else if score >= 40.0 {
        ("moderate", "yellow", "Moderate local impact")
    } else if score >= 20.0 {
        ("low", "orange", "Low local impact")
    } else {
        ("very_low", "red", "Very low local impact")
    };
    Rating {
        level,
        color,
        message,
    }
}

pub fn local_impact_recommendations(score: f64) -> Vec<&'static str> {
    let mut recommendations = Vec::new();

    if score < 40.0 {
        recommendations.extend([
            "Try more local restaurants and street food",
            "Visit local markets and artisan shops",
            "Use public transportation instead of private vehicles",
            "Participate in cultural activities and festivals",
        ]);
    }
    if score < 60.0 {
        recommendations.extend([
            "Stay in locally-owned accommodations",
            "Book tours with local guides",
            "Buy souvenirs from local artisans",
        ]);
    }
    if score < 80.0 {
        recommendations.extend([
            "Volunteer with local community projects",
            "Learn about local customs and traditions",
            "Support local environmental initiatives",
        ]);
    }

    recommendations
}

pub fn local_impact(itinerary: &Itinerary) -> LocalImpact {
    let mut impact = 0.0;
    let mut max = 0.0;
    let mut factors: Vec<&'static str> = Vec::new();

    let mut record = |weight: f64, description: &'static str| {
        impact += weight;
        max += 1.0;
        if !factors.contains(&description) {
            factors.push(description);
        }
    };

    for day in &itinerary.plan.days {
        for _ in day.activities.iter().filter(|a| is_local_business(a)) {
            record(1.5, "Supporting local economy");
        }
        for _ in day.meals.iter().filter(|m| is_local_food(m)) {
            record(1.2, "Local food culture");
        }
        let public_transport = day
            .transportation
            .as_ref()
            .and_then(|t| t.mode.as_deref())
            .map(|m| m == "metro" || m == "bus")
            .unwrap_or(false);
        if public_transport {
            record(1.3, "Reducing traffic congestion");
        }
        for _ in day.activities.iter().filter(|a| is_cultural_site(a)) {
            record(1.1, "Preserving heritage");
        }
    }

    let score = if max > 0.0 { impact / max * 100.0 } else { 0.0 };

    LocalImpact {
        score: score.round() as i64,
        rating: impact_rating(score),
        factors,
        recommendations: local_impact_recommendations(score),
    }
}

pub fn count_local_businesses(itinerary: &Itinerary) -> usize {
    itinerary.activities().filter(|a| is_local_business(a)).count()
}

pub fn count_eco_activities(itinerary: &Itinerary) -> usize {
    itinerary
        .activities()
        .filter(|a| ActivityCategory::classify(&a.activity).impact() == Impact::Positive)
        .count()
}

/// 60% carbon score, 40% local impact.
pub fn overall_score(itinerary: &Itinerary) -> i64 {
    let (total, _) = carbon_breakdown(itinerary);
    let carbon_score = (100.0 - total / 3.0).max(0.0);
    let impact_score = local_impact(itinerary).score as f64;
    (carbon_score * 0.6 + impact_score * 0.4).round() as i64
}

pub fn track_progress(user_id: &str, itinerary: &Itinerary) -> SustainabilityProgress {
    let (total, _) = carbon_breakdown(itinerary);
    let score = overall_score(itinerary);
    let eco = count_eco_activities(itinerary);
    let local = count_local_businesses(itinerary);

    let mut achievements = Vec::new();
    if score >= 90 {
        achievements.push("Sustainability Champion");
    }
    if score >= 80 {
        achievements.push("Eco Warrior");
    }
    if score >= 70 {
        achievements.push("Green Traveler");
    }
    if eco >= 5 {
        achievements.push("Eco Explorer");
    }
    if local >= 10 {
        achievements.push("Local Supporter");
    }

    let mut next_goals = Vec::new();
    if score < 70 {
        next_goals.push("Increase eco-friendly activities");
    }
    if local < 5 {
        next_goals.push("Support more local businesses");
    }
    if total > 100.0 {
        next_goals.push("Reduce carbon footprint");
    }

    SustainabilityProgress {
        user_id: user_id.to_string(),
        trip_id: itinerary.id.clone(),
        carbon_saved: round2((HIGH_IMPACT_TRIP_KG - total).max(0.0)),
        local_businesses_supported: local,
        eco_activities_completed: eco,
        sustainability_score: score,
        achievements,
        next_goals,
    }
}

pub fn fallback_carbon_tips() -> Value {
    json!([
        {
            "category": "transportation",
            "tip": "Use public transportation instead of private vehicles",
            "impact": "Reduce carbon by 50-70%",
            "difficulty": "easy"
        },
        {
            "category": "accommodation",
            "tip": "Choose eco-friendly accommodations with green certifications",
            "impact": "Reduce carbon by 20-30%",
            "difficulty": "medium"
        },
        {
            "category": "activities",
            "tip": "Include more nature-based and cultural activities",
            "impact": "Reduce carbon by 10-20%",
            "difficulty": "easy"
        }
    ])
}

pub fn fallback_carbon_footprint() -> CarbonFootprint {
    CarbonFootprint {
        total_carbon: 150.0,
        breakdown: CarbonBreakdown {
            transportation: 100.0,
            accommodation: 30.0,
            activities: 15.0,
            food: 5.0,
        },
        rating: carbon_rating(150.0),
        recommendations: fallback_carbon_tips(),
    }
}

fn fallback_report() -> Value {
    json!({
        "overallAssessment": "Moderate sustainability with room for improvement",
        "environmentalImpact": "Average carbon footprint with some eco-friendly choices",
        "socialImpact": "Good local community support",
        "recommendations": [
            "Use more public transport",
            "Choose local accommodations",
            "Support local businesses"
        ]
    })
}

fn fallback_alternatives() -> Value {
    json!({
        "transportation": ["Metro/bus instead of taxi", "Walking/cycling for short distances"],
        "accommodation": ["Eco-lodges", "Green hotels", "Homestays"],
        "activities": ["Nature walks", "Cultural museums", "Local cooking classes"],
        "food": ["Street food", "Local restaurants", "Farm-to-table dining"],
        "shopping": ["Local artisan markets", "Handmade souvenirs", "Local crafts"]
    })
}

#[derive(Clone)]
pub struct SustainabilityService {
    ai: GeminiClient,
}

impl SustainabilityService {
    pub fn new(ai: GeminiClient) -> Self {
        Self { ai }
    }

    pub async fn carbon_footprint(&self, itinerary: &Itinerary) -> CarbonFootprint {
        let (total_carbon, breakdown) = carbon_breakdown(itinerary);
        let recommendations = self.reduction_tips(total_carbon, &breakdown).await;

        CarbonFootprint {
            total_carbon,
            rating: carbon_rating(total_carbon),
            breakdown,
            recommendations,
        }
    }

    async fn reduction_tips(&self, total: f64, breakdown: &CarbonBreakdown) -> Value {
        let prompt = format!(
            r#"Generate personalized carbon reduction tips for this travel itinerary:

Total Carbon: {total} kg CO2
Breakdown: {breakdown}

Provide 5-7 specific, actionable tips to reduce carbon footprint, focusing on
transportation alternatives, accommodation choices, activity selections, food
choices and general eco-friendly practices.

Format as JSON array with tip objects containing:
- category: "transportation/accommodation/activities/food/general"
- tip: "specific actionable advice"
- impact: "estimated carbon reduction"
- difficulty: "easy/medium/hard""#,
            breakdown = serde_json::to_string(breakdown).unwrap_or_default(),
        );

        self.ai
            .array_or("carbon reduction tips", &prompt, fallback_carbon_tips)
            .await
    }

    pub async fn report(&self, itinerary: &Itinerary) -> Value {
        let carbon = self.carbon_footprint(itinerary).await;
        let impact = local_impact(itinerary);

        let prompt = format!(
            r#"Generate a comprehensive sustainability report for this travel itinerary:

Carbon Footprint: {} kg CO2
Local Impact Score: {}/100

Itinerary: {}

Provide an overall sustainability assessment, environmental impact analysis,
social and economic impact, specific recommendations for improvement,
eco-friendly alternatives and long-term sustainability goals.

Format as JSON with detailed analysis and actionable recommendations."#,
            carbon.total_carbon,
            impact.score,
            itinerary.days_json(3),
        );

        let mut report = self
            .ai
            .object_or("sustainability report", &prompt, fallback_report)
            .await;

        if let Some(map) = report.as_object_mut() {
            map.insert("carbonFootprint".into(), json!(carbon));
            map.insert("localImpact".into(), json!(impact));
            map.insert("generatedAt".into(), json!(Utc::now().to_rfc3339()));
        }
        report
    }

    pub async fn eco_alternatives(&self, itinerary: &Itinerary) -> Value {
        let prompt = format!(
            r#"Suggest eco-friendly alternatives for this travel itinerary:

Itinerary: {}

Provide alternatives for transportation methods, accommodation options,
activities and experiences, food and dining choices, shopping and souvenirs.

Format as JSON with specific alternatives and their environmental benefits."#,
            itinerary.days_json(3),
        );

        self.ai
            .object_or("eco-friendly alternatives", &prompt, fallback_alternatives)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::itinerary::{Amount, DayPlan};
    use serde_json::json;

    fn itinerary(value: Value) -> Itinerary {
        serde_json::from_value(value).unwrap()
    }

    fn transport(mode: Option<&str>, distance: Option<&str>, passengers: u32) -> Transportation {
        Transportation {
            mode: mode.map(String::from),
            distance: distance.map(|d| Amount::Text(d.to_string())),
            passengers,
            ..Default::default()
        }
    }

    #[test]
    fn test_transport_carbon_uses_mode_factor() {
        let t = transport(Some("Train"), Some("100 km"), 2);
        assert!((transport_carbon(&t) - 8.2).abs() < 1e-9);
    }

    #[test]
    fn test_transport_carbon_defaults() {
        // car, 10 km, one passenger
        let t = transport(None, None, 0);
        assert!((transport_carbon(&t) - 1.92).abs() < 1e-9);

        // unknown mode falls back to car
        let t = transport(Some("hovercraft"), Some("5km"), 1);
        assert!((transport_carbon(&t) - 0.96).abs() < 1e-9);
    }

    #[test]
    fn test_zero_emission_modes() {
        let t = transport(Some("walking"), Some("3 km"), 1);
        assert_eq!(transport_carbon(&t), 0.0);
        let t = transport(Some("cycling"), None, 4);
        assert_eq!(transport_carbon(&t), 0.0);
    }

    #[test]
    fn test_activity_classification_order() {
        assert_eq!(
            ActivityCategory::classify("Street food walk"),
            ActivityCategory::NatureWalk
        );
        assert_eq!(
            ActivityCategory::classify("Cooking class"),
            ActivityCategory::LocalCookingClass
        );
        assert_eq!(
            ActivityCategory::classify("Theme park day"),
            ActivityCategory::ThemePark
        );
        assert_eq!(
            ActivityCategory::classify("Sunset cruise"),
            ActivityCategory::CulturalMuseum
        );
    }

    #[test]
    fn test_accommodation_carbon() {
        let stay = |kind: Option<&str>| AccommodationStay {
            stay_type: kind.map(String::from),
            ..Default::default()
        };
        assert_eq!(accommodation_carbon(&stay(Some("eco_lodge"))), 0.5);
        assert_eq!(accommodation_carbon(&stay(None)), 3.5);
        assert_eq!(accommodation_carbon(&stay(Some("treehouse"))), 2.0);
    }

    #[test]
    fn test_carbon_breakdown_excludes_food_from_total() {
        let trip = itinerary(json!({
            "itinerary": { "days": [{
                "day": 1,
                "transportation": { "mode": "flight", "distance": "1000 km" },
                "activities": [{ "activity": "Volunteer at shelter" }, { "activity": "Mall visit" }],
                "meals": [{ "cuisine": "Local thali" }, { "cuisine": "Italian" }]
            }]},
            "bookingInfo": { "accommodations": [{ "type": "green_hotel" }] }
        }));

        let (total, breakdown) = carbon_breakdown(&trip);
        assert!((breakdown.transportation - 285.0).abs() < 1e-9);
        assert!((breakdown.activities - 0.2).abs() < 1e-9);
        assert_eq!(breakdown.accommodation, 1.5);
        assert_eq!(breakdown.food, 1.5);
        assert_eq!(total, 286.7);
        assert_eq!(carbon_rating(total).level, "high");
    }

    #[test]
    fn test_carbon_rating_bands() {
        assert_eq!(carbon_rating(49.99).level, "excellent");
        assert_eq!(carbon_rating(50.0).level, "good");
        assert_eq!(carbon_rating(199.0).level, "moderate");
        assert_eq!(carbon_rating(300.0).level, "very_high");
    }

    #[test]
    fn test_local_impact_scoring() {
        let trip = itinerary(json!({
            "itinerary": { "days": [{
                "day": 1,
                "activities": [
                    { "activity": "Traditional pottery workshop" },
                    { "activity": "Heritage temple tour" }
                ],
                "meals": [{ "cuisine": "Street food", "restaurant": "Chowpatty" }],
                "transportation": { "mode": "metro" }
            }]}
        }));

        let impact = local_impact(&trip);
        // (1.5 + 1.2 + 1.3 + 1.1) / 4 * 100, just under 127.5 in floating point
        assert_eq!(impact.score, 127);
        assert_eq!(impact.rating.level, "excellent");
        assert_eq!(
            impact.factors,
            vec![
                "Supporting local economy",
                "Local food culture",
                "Reducing traffic congestion",
                "Preserving heritage"
            ]
        );
        assert!(impact.recommendations.is_empty());
    }

    #[test]
    fn test_local_impact_empty_itinerary() {
        let trip = Itinerary {
            plan: crate::models::itinerary::ItineraryPlan {
                days: vec![DayPlan::default()],
                ..Default::default()
            },
            ..Default::default()
        };
        let impact = local_impact(&trip);
        assert_eq!(impact.score, 0);
        assert_eq!(impact.rating.level, "very_low");
        assert_eq!(impact.recommendations.len(), 10);
    }

    #[test]
    fn test_factors_deduplicated() {
        let trip = itinerary(json!({
            "itinerary": { "days": [
                { "day": 1, "activities": [{ "activity": "Local market" }] },
                { "day": 2, "activities": [{ "activity": "Artisan village", "description": "handmade crafts" }] }
            ]}
        }));
        let impact = local_impact(&trip);
        assert_eq!(impact.factors, vec!["Supporting local economy"]);
        assert_eq!(impact.score, 150);
    }

    #[test]
    fn test_progress_tracking() {
        let trip = itinerary(json!({
            "id": "trip-9",
            "itinerary": { "days": [{
                "day": 1,
                "transportation": { "mode": "bus", "distance": "30 km" },
                "activities": [
                    { "activity": "Nature hike" },
                    { "activity": "Local cooking class" }
                ]
            }]}
        }));

        let progress = track_progress("user-1", &trip);
        assert_eq!(progress.trip_id.as_deref(), Some("trip-9"));
        assert_eq!(progress.eco_activities_completed, 2);
        assert_eq!(progress.local_businesses_supported, 1);
        // total = 30*0.089 + 0.1 + 0.05 = 2.82
        assert_eq!(progress.carbon_saved, 297.18);
        // carbon score 99.06 * 0.6 + impact 140 * 0.4
        assert_eq!(progress.sustainability_score, 115);
        assert!(progress.achievements.contains(&"Sustainability Champion"));
        assert_eq!(progress.next_goals, vec!["Support more local businesses"]);
    }
}
