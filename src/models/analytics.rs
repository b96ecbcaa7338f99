use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationAction {
    Viewed,
    Clicked,
    Booked,
    Ignored,
}

impl FromStr for RecommendationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewed" => Ok(RecommendationAction::Viewed),
            "clicked" => Ok(RecommendationAction::Clicked),
            "booked" => Ok(RecommendationAction::Booked),
            "ignored" => Ok(RecommendationAction::Ignored),
            other => Err(format!(
                "Unknown action '{}', expected viewed, clicked, booked or ignored",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationEvent {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub recommendation_id: String,
    pub action: RecommendationAction,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendationStats {
    pub total: u64,
    pub viewed: u64,
    pub clicked: u64,
    pub booked: u64,
    pub ignored: u64,
}

impl RecommendationStats {
    pub fn record(&mut self, action: RecommendationAction) {
        self.total += 1;
        match action {
            RecommendationAction::Viewed => self.viewed += 1,
            RecommendationAction::Clicked => self.clicked += 1,
            RecommendationAction::Booked => self.booked += 1,
            RecommendationAction::Ignored => self.ignored += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilityMetrics {
    pub total_carbon: f64,
    pub average_carbon: f64,
    pub average_local_impact: f64,
    pub total_trips: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub budget_trend: f64,
    pub duration_trend: f64,
    pub satisfaction_trend: f64,
}
