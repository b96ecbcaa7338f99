use serde::Serialize;
use serde_json::{json, Value};

use crate::models::itinerary::Itinerary;
use crate::services::gemini::GeminiClient;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Landmark {
    pub name: &'static str,
    pub coordinates: Coordinates,
    pub ar_features: &'static [&'static str],
    pub historical_period: &'static str,
    pub cultural_significance: &'static str,
}

const MUMBAI: &[Landmark] = &[
    Landmark {
        name: "Gateway of India",
        coordinates: Coordinates { lat: 18.9220, lng: 72.8347 },
        ar_features: &["Historical overlay", "360° view", "Photo spots"],
        historical_period: "British Raj (1911)",
        cultural_significance: "Symbol of Mumbai and India's independence",
    },
    Landmark {
        name: "Chhatrapati Shivaji Terminus",
        coordinates: Coordinates { lat: 18.9398, lng: 72.8355 },
        ar_features: &["Architectural details", "Historical timeline", "Virtual tour"],
        historical_period: "Victorian Gothic (1887)",
        cultural_significance: "UNESCO World Heritage Site",
    },
];

const DELHI: &[Landmark] = &[
    Landmark {
        name: "Red Fort",
        coordinates: Coordinates { lat: 28.6562, lng: 77.2410 },
        ar_features: &["Mughal architecture overlay", "Historical reenactment", "Sound effects"],
        historical_period: "Mughal Empire (1639)",
        cultural_significance: "Symbol of Mughal power and Indian independence",
    },
    Landmark {
        name: "India Gate",
        coordinates: Coordinates { lat: 28.6129, lng: 77.2295 },
        ar_features: &["War memorial details", "Flame animation", "Historical photos"],
        historical_period: "British Raj (1931)",
        cultural_significance: "Memorial to Indian soldiers",
    },
];

const BANGALORE: &[Landmark] = &[Landmark {
    name: "Vidhana Soudha",
    coordinates: Coordinates { lat: 12.9791, lng: 77.5913 },
    ar_features: &["Architectural analysis", "Government building info", "Light show"],
    historical_period: "Modern India (1956)",
    cultural_significance: "Seat of Karnataka state legislature",
}];

const CHENNAI: &[Landmark] = &[Landmark {
    name: "Kapaleeshwarar Temple",
    coordinates: Coordinates { lat: 13.0330, lng: 80.2697 },
    ar_features: &["Temple architecture", "Religious significance", "Cultural stories"],
    historical_period: "Chola Dynasty (7th century)",
    cultural_significance: "Important Hindu temple",
}];

/// Known AR landmarks for a city; empty for anywhere else.
pub fn landmarks(destination: &str) -> &'static [Landmark] {
    match destination {
        "Mumbai" => MUMBAI,
        "Delhi" => DELHI,
        "Bangalore" => BANGALORE,
        "Chennai" => CHENNAI,
        _ => &[],
    }
}

pub fn experience_categories() -> Value {
    json!({
        "historical": {
            "name": "Historical Reenactment",
            "description": "Experience historical events through AR",
            "features": ["3D historical figures", "Period-accurate environments", "Interactive timeline"]
        },
        "cultural": {
            "name": "Cultural Immersion",
            "description": "Learn about local culture through AR",
            "features": ["Traditional dance tutorials", "Cultural artifact exploration", "Language learning"]
        },
        "culinary": {
            "name": "Culinary Journey",
            "description": "Explore food culture through AR",
            "features": ["Recipe demonstrations", "Ingredient identification", "Restaurant recommendations"]
        },
        "nature": {
            "name": "Nature Exploration",
            "description": "Discover natural wonders through AR",
            "features": ["Wildlife identification", "Geological information", "Ecosystem education"]
        }
    })
}

pub fn accessibility_features() -> Value {
    json!({
        "visual": ["High contrast mode", "Large text options", "Color blind friendly filters", "Audio descriptions"],
        "auditory": ["Visual sound indicators", "Subtitles for audio content", "Haptic feedback", "Sign language support"],
        "motor": ["Voice commands", "Gesture recognition", "One-handed operation", "Switch control support"],
        "cognitive": ["Simplified interfaces", "Step-by-step guidance", "Pause and resume features", "Clear instructions"]
    })
}

pub fn fallback_content(landmark: &str, destination: &str) -> Value {
    json!({
        "landmark": landmark,
        "destination": destination,
        "arContent": {
            "historicalInfo": format!("Historical information about {}", landmark),
            "culturalSignificance": format!("Cultural importance of {}", landmark),
            "interactiveElements": ["Basic AR overlay", "Photo opportunities"],
            "photoSpots": ["Main entrance", "Best viewing angle"],
            "localLegends": [format!("Local stories about {}", landmark)],
            "bestTimes": "Early morning or late afternoon",
            "accessibility": "Check with venue for accessibility details",
            "nearbyAttractions": ["Nearby points of interest"],
            "arOverlay": "Basic landmark information",
            "socialMoments": ["Instagram-worthy spots"]
        },
        "arFeatures": {
            "historicalTimeline": "Interactive timeline available",
            "3dModels": "3D models of the landmark",
            "audioGuide": "Audio narration available",
            "photoFilters": "Historical period filters",
            "gamification": "AR scavenger hunt available"
        }
    })
}

fn fallback_experiences() -> Value {
    json!({
        "experiences": [{
            "day": 1,
            "arActivities": [
                "Historical landmark exploration",
                "Cultural photo challenges",
                "Local cuisine AR guide"
            ]
        }]
    })
}

fn fallback_photo_filters() -> Value {
    json!({
        "filters": [
            {
                "name": "Historical",
                "description": "Transport yourself to the historical period",
                "effects": ["Sepia tone", "Vintage frame", "Historical overlay"]
            },
            {
                "name": "Cultural",
                "description": "Celebrate local culture",
                "effects": ["Traditional patterns", "Cultural colors", "Local motifs"]
            }
        ]
    })
}

fn fallback_games() -> Value {
    json!({
        "games": [
            {
                "name": "Landmark Scavenger Hunt",
                "description": "Find and photograph specific architectural details",
                "rewards": ["Badges", "Points", "Social recognition"]
            },
            {
                "name": "Cultural Quiz",
                "description": "Answer questions about local culture and history",
                "rewards": ["Knowledge points", "Achievement badges"]
            }
        ]
    })
}

/// `#gatewayofindia` style tag: lower-cased with whitespace removed.
pub fn hashtag(name: &str) -> String {
    let tag: String = name
        .split_whitespace()
        .collect::<String>()
        .to_lowercase();
    format!("#{}", tag)
}

pub fn fallback_social_content(landmark: &str) -> Value {
    json!({
        "instagram": {
            "storyTemplate": format!("Exploring {} with AR! #travel #ar {}", landmark, hashtag(landmark)),
            "hashtags": ["#travel", "#ar", "#explore", "#india"]
        },
        "tiktok": {
            "videoIdea": format!("AR tour of {} - before and after", landmark),
            "hashtags": ["#travel", "#ar", "#tiktok"]
        }
    })
}

fn fallback_navigation(origin: &str, destination: &str) -> Value {
    json!({
        "route": format!("{} to {}", origin, destination),
        "waypoints": ["Key landmarks along the route"],
        "arMarkers": ["AR direction arrows", "Distance indicators"],
        "safetyTips": ["Stay aware of surroundings", "Keep device charged"]
    })
}

#[derive(Clone)]
pub struct ArService {
    ai: GeminiClient,
}

impl ArService {
    pub fn new(ai: GeminiClient) -> Self {
        Self { ai }
    }

    pub async fn content(&self, landmark: &str, destination: &str) -> Value {
        let prompt = format!(
            r#"Create comprehensive AR content for {landmark} in {destination}.

Cover historical information and timeline, cultural significance and stories,
interactive AR elements, photo opportunities, local legends, best times for AR
exploration, accessibility information, nearby attractions, AR overlay
information and social sharing moments.

Format as JSON:
{{
  "landmark": "{landmark}",
  "destination": "{destination}",
  "arContent": {{
    "historicalInfo": "", "culturalSignificance": "", "interactiveElements": [],
    "photoSpots": [], "localLegends": [], "bestTimes": "", "accessibility": "",
    "nearbyAttractions": [], "arOverlay": "", "socialMoments": []
  }},
  "arFeatures": {{
    "historicalTimeline": "", "3dModels": "", "audioGuide": "",
    "photoFilters": "", "gamification": ""
  }}
}}"#
        );

        self.ai
            .object_or("AR content", &prompt, || fallback_content(landmark, destination))
            .await
    }

    pub async fn experiences(&self, itinerary: &Itinerary, interests: &[String]) -> Value {
        let prompt = format!(
            r#"Recommend AR experiences for this itinerary based on user interests:

Itinerary: {}
User Interests: {}

Provide AR experiences for each day, landmark-specific AR content, interactive
activities, photo opportunities, educational content and social sharing moments.

Format as JSON with daily AR recommendations."#,
            itinerary.days_json(3),
            interests.join(", "),
        );

        self.ai
            .object_or("AR experiences", &prompt, fallback_experiences)
            .await
    }

    pub async fn photo_filters(&self, landmark: &str, destination: &str) -> Value {
        let prompt = format!(
            r#"Create AR photo filter suggestions for {landmark} in {destination}.

Include historical period, cultural theme, weather-based, time-of-day, special
effect and social media ready filters.

Format as JSON with filter details."#
        );

        self.ai
            .object_or("AR photo filters", &prompt, fallback_photo_filters)
            .await
    }

    pub async fn games(&self, itinerary: &Itinerary) -> Value {
        let prompt = format!(
            r#"Create AR games and challenges for this travel itinerary:

Itinerary: {}

Include scavenger hunts, photo challenges, cultural quizzes, historical puzzles,
social challenges and educational games.

Format as JSON with game details and rewards."#,
            itinerary.days_json(3),
        );

        self.ai.object_or("AR games", &prompt, fallback_games).await
    }

    pub async fn social_content(&self, landmark: &str, destination: &str) -> Value {
        let prompt = format!(
            r#"Create AR social sharing content for {landmark} in {destination}.

Include Instagram story templates, TikTok video ideas, Facebook post suggestions,
Twitter moment ideas, hashtag recommendations and caption templates.

Format as JSON with platform-specific content."#
        );

        self.ai
            .object_or("AR social content", &prompt, || fallback_social_content(landmark))
            .await
    }

    pub async fn navigation(&self, origin: &str, destination: &str, landmarks: &[String]) -> Value {
        let prompt = format!(
            r#"Create AR navigation assistance from {origin} to {destination}:

Landmarks to highlight: {}

Include AR waypoint markers, distance indicators, landmark information,
alternative routes, safety tips and photo opportunities along the way.

Format as JSON with navigation details."#,
            landmarks.join(", "),
        );

        self.ai
            .object_or("AR navigation", &prompt, || fallback_navigation(origin, destination))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmarks_by_city() {
        assert_eq!(landmarks("Mumbai").len(), 2);
        assert_eq!(landmarks("Chennai")[0].name, "Kapaleeshwarar Temple");
        assert!(landmarks("Goa").is_empty());

        let json = serde_json::to_value(landmarks("Delhi")[0]).unwrap();
        assert_eq!(json["historicalPeriod"], "Mughal Empire (1639)");
        assert_eq!(json["coordinates"]["lat"], 28.6562);
    }

    #[test]
    fn test_hashtag_strips_whitespace() {
        assert_eq!(hashtag("Gateway of India"), "#gatewayofindia");
        let social = fallback_social_content("Red Fort");
        assert_eq!(
            social["instagram"]["storyTemplate"],
            "Exploring Red Fort with AR! #travel #ar #redfort"
        );
    }

    #[actix_rt::test]
    async fn test_content_falls_back_without_ai() {
        let service = ArService::new(GeminiClient::new(None, "gemini-pro"));
        let content = service.content("India Gate", "Delhi").await;

        assert_eq!(content, fallback_content("India Gate", "Delhi"));
        assert_eq!(content["arContent"]["localLegends"][0], "Local stories about India Gate");
    }
}
