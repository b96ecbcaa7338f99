use std::time::Duration;

use log::{error, warn};
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use crate::error::ApiError;

const MAPS_BASE: &str = "https://maps.googleapis.com/maps/api";
const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

const CITY_RADIUS_METERS: u32 = 50_000;
const DEFAULT_SEARCH_RADIUS: u32 = 5_000;
const DEFAULT_NEARBY_RADIUS: u32 = 1_000;
const MAX_PHOTOS: usize = 5;
const FORECAST_SLOTS: usize = 8;

const DETAIL_FIELDS: &str = "place_id,name,formatted_address,geometry,rating,photos,reviews,opening_hours,website,formatted_phone_number,price_level,types";

pub const TRAVEL_MODES: [&str; 4] = ["driving", "transit", "walking", "bicycling"];

#[derive(Debug, Error)]
pub enum MapsError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("Maps request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("Maps API returned {0}")]
    Rejected(String),
}

impl From<MapsError> for ApiError {
    fn from(err: MapsError) -> Self {
        match err {
            MapsError::NotFound(message) => ApiError::NotFound(message),
            MapsError::Rejected(_) => ApiError::BadRequest(err.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// Options for a directions lookup.
#[derive(Debug, Clone, Default)]
pub struct RouteQuery<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
    pub mode: Option<&'a str>,
    pub waypoints: &'a [String],
    pub optimize: bool,
}

/// `diff%` of the in-traffic duration over the free-flow duration of a
/// directions leg. Legs without traffic data are `normal`.
pub fn traffic_level(leg: &Value) -> &'static str {
    let in_traffic = leg.pointer("/duration_in_traffic/value").and_then(Value::as_f64);
    let normal = leg.pointer("/duration/value").and_then(Value::as_f64);

    let (Some(in_traffic), Some(normal)) = (in_traffic, normal) else {
        return "normal";
    };
    if normal <= 0.0 {
        return "normal";
    }

    let difference = (in_traffic - normal) / normal * 100.0;
    if difference > 50.0 {
        "heavy"
    } else if difference > 20.0 {
        "moderate"
    } else {
        "light"
    }
}

/// Waypoints and final stop for an optimized multi-stop route. `None` when
/// there are no stops.
pub fn split_stops(destinations: &[String]) -> Option<(String, &str)> {
    let (last, rest) = destinations.split_last()?;
    Some((rest.join("|"), last.as_str()))
}

fn leg_summary(leg: &Value) -> Value {
    let steps: Vec<Value> = leg
        .get("steps")
        .and_then(Value::as_array)
        .map(|steps| {
            steps
                .iter()
                .map(|step| {
                    json!({
                        "instruction": step.get("html_instructions"),
                        "distance": step.get("distance"),
                        "duration": step.get("duration"),
                        "startLocation": step.get("start_location"),
                        "endLocation": step.get("end_location"),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    json!({
        "distance": leg.get("distance"),
        "duration": leg.get("duration"),
        "startAddress": leg.get("start_address"),
        "endAddress": leg.get("end_address"),
        "steps": steps,
    })
}

/// Flattens a directions route to its first leg plus the overview polyline.
pub fn route_summary(route: &Value) -> Value {
    let mut summary = route
        .pointer("/legs/0")
        .map(leg_summary)
        .unwrap_or_else(|| json!({}));
    summary["overviewPolyline"] = route
        .pointer("/overview_polyline/points")
        .cloned()
        .unwrap_or(Value::Null);
    summary
}

fn results(data: &Value) -> Vec<Value> {
    data.get("results")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct MapsClient {
    http: Client,
    api_key: Option<String>,
    weather_key: Option<String>,
}

impl MapsClient {
    pub fn new(api_key: Option<String>, weather_key: Option<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            http,
            api_key,
            weather_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn weather_configured(&self) -> bool {
        self.weather_key.is_some()
    }

    fn key(&self) -> Result<&str, MapsError> {
        self.api_key
            .as_deref()
            .ok_or(MapsError::NotConfigured("GOOGLE_MAPS_API_KEY"))
    }

    pub fn photo_url(&self, reference: &str) -> String {
        format!(
            "{}/place/photo?maxwidth=400&photoreference={}&key={}",
            MAPS_BASE,
            reference,
            self.api_key.as_deref().unwrap_or_default()
        )
    }

    /// Client-facing shape of a Places result.
    pub fn format_place(&self, place: &Value) -> Value {
        let photos: Vec<Value> = place
            .get("photos")
            .and_then(Value::as_array)
            .map(|photos| {
                photos
                    .iter()
                    .filter_map(|photo| photo.get("photo_reference").and_then(Value::as_str))
                    .map(|reference| {
                        json!({
                            "photoReference": reference,
                            "url": self.photo_url(reference),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        json!({
            "placeId": place.get("place_id"),
            "name": place.get("name"),
            "address": place.get("formatted_address").or_else(|| place.get("vicinity")),
            "location": place.pointer("/geometry/location"),
            "rating": place.get("rating"),
            "priceLevel": place.get("price_level"),
            "photos": photos,
            "types": place.get("types"),
            "openingHours": place.get("opening_hours"),
        })
    }

    /// GET against the Maps API; any `status` other than `OK` is an error.
    async fn call(&self, path: &str, query: &[(&str, String)]) -> Result<Value, MapsError> {
        let key = self.key()?;
        let data: Value = self
            .http
            .get(format!("{}/{}", MAPS_BASE, path))
            .query(query)
            .query(&[("key", key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match data.get("status").and_then(Value::as_str) {
            Some("OK") => Ok(data),
            Some("ZERO_RESULTS") | Some("NOT_FOUND") => {
                Err(MapsError::NotFound(format!("No results for {}", path)))
            }
            status => Err(MapsError::Rejected(status.unwrap_or("UNKNOWN").to_string())),
        }
    }

    pub async fn geocode(&self, address: &str) -> Result<Value, MapsError> {
        let data = self
            .call("geocode/json", &[("address", address.to_string())])
            .await?;
        results(&data)
            .into_iter()
            .next()
            .ok_or_else(|| MapsError::NotFound(format!("Location not found: {}", address)))
    }

    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Result<Value, MapsError> {
        let data = self
            .call("geocode/json", &[("latlng", format!("{},{}", lat, lng))])
            .await?;
        results(&data)
            .into_iter()
            .next()
            .ok_or_else(|| MapsError::NotFound(format!("No address at {},{}", lat, lng)))
    }

    async fn coordinates(&self, address: &str) -> Result<Value, MapsError> {
        let result = self.geocode(address).await?;
        result
            .pointer("/geometry/location")
            .cloned()
            .ok_or_else(|| MapsError::NotFound(format!("Location not found: {}", address)))
    }

    pub async fn search_places(
        &self,
        query: &str,
        location: Option<&str>,
        radius: Option<u32>,
        kind: Option<&str>,
    ) -> Result<Vec<Value>, MapsError> {
        let mut params = vec![("query", query.to_string())];
        if let Some(location) = location {
            params.push(("location", location.to_string()));
            params.push((
                "radius",
                radius.unwrap_or(DEFAULT_SEARCH_RADIUS).to_string(),
            ));
        }
        if let Some(kind) = kind {
            params.push(("type", kind.to_string()));
        }

        let data = self.call("place/textsearch/json", &params).await?;
        Ok(results(&data))
    }

    pub async fn nearby(
        &self,
        location: &str,
        kind: &str,
        radius: Option<u32>,
        keyword: Option<&str>,
    ) -> Result<Vec<Value>, MapsError> {
        let mut params = vec![
            ("location", location.to_string()),
            ("radius", radius.unwrap_or(DEFAULT_NEARBY_RADIUS).to_string()),
            ("type", kind.to_string()),
        ];
        if let Some(keyword) = keyword {
            params.push(("keyword", keyword.to_string()));
        }

        let data = self.call("place/nearbysearch/json", &params).await?;
        Ok(results(&data))
    }

    pub async fn place_details(&self, place_id: &str) -> Result<Value, MapsError> {
        let data = self
            .call(
                "place/details/json",
                &[
                    ("place_id", place_id.to_string()),
                    ("fields", DETAIL_FIELDS.to_string()),
                ],
            )
            .await?;
        data.get("result")
            .cloned()
            .ok_or_else(|| MapsError::NotFound(format!("Place not found: {}", place_id)))
    }

    /// First matching place for a destination name, with its details.
    pub async fn destination(&self, name: &str) -> Result<Value, MapsError> {
        let place = self
            .search_places(name, None, None, None)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MapsError::NotFound(format!("Destination not found: {}", name)))?;

        let details = match place.get("place_id").and_then(Value::as_str) {
            Some(place_id) => self.place_details(place_id).await.unwrap_or_else(|e| {
                warn!("No details for {}: {}", place_id, e);
                Value::Null
            }),
            None => Value::Null,
        };

        let mut destination = self.format_place(&place);
        destination["details"] = details;
        Ok(destination)
    }

    pub async fn directions(&self, route: &RouteQuery<'_>) -> Result<Value, MapsError> {
        let mut params = vec![
            ("origin", route.origin.to_string()),
            ("destination", route.destination.to_string()),
            ("mode", route.mode.unwrap_or("driving").to_string()),
        ];
        if !route.waypoints.is_empty() {
            let waypoints = route.waypoints.join("|");
            params.push((
                "waypoints",
                if route.optimize {
                    format!("optimize:true|{}", waypoints)
                } else {
                    waypoints
                },
            ));
        }

        let data = self.call("directions/json", &params).await?;
        data.pointer("/routes/0")
            .cloned()
            .ok_or_else(|| MapsError::NotFound("No route found".to_string()))
    }

    /// Route from `origin` through every destination, letting Google reorder
    /// the intermediate stops.
    pub async fn optimized_route(&self, origin: &str, destinations: &[String]) -> Result<Value, MapsError> {
        let (waypoints, last) = split_stops(destinations)
            .ok_or_else(|| MapsError::Rejected("INVALID_REQUEST".to_string()))?;
        let waypoints: Vec<String> = if waypoints.is_empty() {
            Vec::new()
        } else {
            vec![waypoints]
        };

        self.directions(&RouteQuery {
            origin,
            destination: last,
            mode: None,
            waypoints: &waypoints,
            optimize: true,
        })
        .await
    }

    pub async fn distance_matrix(
        &self,
        origins: &[String],
        destinations: &[String],
        mode: Option<&str>,
    ) -> Result<Value, MapsError> {
        self.call(
            "distancematrix/json",
            &[
                ("origins", origins.join("|")),
                ("destinations", destinations.join("|")),
                ("mode", mode.unwrap_or("driving").to_string()),
            ],
        )
        .await
    }

    /// Places of one type within 50 km of a city centre. Empty on failure.
    pub async fn places_by_type(&self, city: &str, kind: &str) -> Vec<Value> {
        let location = match self.coordinates(city).await {
            Ok(location) => location,
            Err(e) => {
                warn!("Could not locate {}: {}", city, e);
                return Vec::new();
            }
        };
        let (Some(lat), Some(lng)) = (location["lat"].as_f64(), location["lng"].as_f64()) else {
            return Vec::new();
        };

        self.nearby(&format!("{},{}", lat, lng), kind, Some(CITY_RADIUS_METERS), None)
            .await
            .unwrap_or_else(|e| {
                warn!("Nearby {} search in {} failed: {}", kind, city, e);
                Vec::new()
            })
    }

    pub async fn attractions(&self, city: &str) -> Value {
        let (attractions, museums, parks, religious) = futures::join!(
            self.places_by_type(city, "tourist_attraction"),
            self.places_by_type(city, "museum"),
            self.places_by_type(city, "park"),
            self.places_by_type(city, "place_of_worship"),
        );

        let take = |places: Vec<Value>, n: usize| -> Vec<Value> {
            places.iter().take(n).map(|p| self.format_place(p)).collect()
        };

        json!({
            "attractions": take(attractions, 10),
            "museums": take(museums, 5),
            "parks": take(parks, 5),
            "religiousSites": take(religious, 5),
        })
    }

    /// Restaurants in a city, optionally narrowed to places whose types
    /// mention the cuisine.
    pub async fn restaurants(&self, city: &str, cuisine: Option<&str>) -> Vec<Value> {
        let cuisine = cuisine.map(str::to_lowercase);
        self.places_by_type(city, "restaurant")
            .await
            .iter()
            .filter(|place| match &cuisine {
                Some(cuisine) => place
                    .get("types")
                    .and_then(Value::as_array)
                    .map_or(false, |types| {
                        types
                            .iter()
                            .filter_map(Value::as_str)
                            .any(|t| t.contains(cuisine.as_str()))
                    }),
                None => true,
            })
            .take(20)
            .map(|place| self.format_place(place))
            .collect()
    }

    pub async fn accommodations(&self, city: &str) -> Vec<Value> {
        self.places_by_type(city, "lodging")
            .await
            .iter()
            .take(15)
            .map(|place| self.format_place(place))
            .collect()
    }

    /// One summary per travel mode; modes Google cannot route are omitted.
    pub async fn transport_options(&self, origin: &str, destination: &str) -> Value {
        let mut options = serde_json::Map::new();

        for mode in TRAVEL_MODES {
            let query = RouteQuery {
                origin,
                destination,
                mode: Some(mode),
                ..Default::default()
            };
            match self.directions(&query).await {
                Ok(route) => {
                    if let Some(leg) = route.pointer("/legs/0") {
                        options.insert(mode.to_string(), leg_summary(leg));
                    }
                }
                Err(e) => warn!("No {} route from {} to {}: {}", mode, origin, destination, e),
            }
        }

        Value::Object(options)
    }

    pub async fn traffic(&self, origin: &str, destination: &str) -> Result<Value, MapsError> {
        let route = self
            .directions(&RouteQuery {
                origin,
                destination,
                ..Default::default()
            })
            .await?;
        let leg = route
            .pointer("/legs/0")
            .ok_or_else(|| MapsError::NotFound("No route found".to_string()))?;

        Ok(json!({
            "duration": leg.get("duration"),
            "durationInTraffic": leg.get("duration_in_traffic").or_else(|| leg.get("duration")),
            "distance": leg.get("distance"),
            "trafficLevel": traffic_level(leg),
        }))
    }

    pub async fn place_photos(&self, place_id: &str) -> Vec<Value> {
        let details = match self.place_details(place_id).await {
            Ok(details) => details,
            Err(e) => {
                error!("Error getting photos for {}: {}", place_id, e);
                return Vec::new();
            }
        };

        details
            .get("photos")
            .and_then(Value::as_array)
            .map(|photos| {
                photos
                    .iter()
                    .take(MAX_PHOTOS)
                    .filter_map(|photo| {
                        let reference = photo.get("photo_reference")?.as_str()?;
                        Some(json!({
                            "photo_reference": reference,
                            "height": photo.get("height"),
                            "width": photo.get("width"),
                            "url": self.photo_url(reference),
                        }))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Geocodes the destination and returns the next 24 hours of the
    /// OpenWeather 5-day forecast.
    pub async fn weather(&self, destination: &str) -> Result<Value, MapsError> {
        let weather_key = self
            .weather_key
            .as_deref()
            .ok_or(MapsError::NotConfigured("OPENWEATHER_API_KEY"))?;
        let location = self.coordinates(destination).await?;

        let forecast: Value = self
            .http
            .get(FORECAST_URL)
            .query(&[
                ("lat", location["lat"].to_string()),
                ("lon", location["lng"].to_string()),
                ("appid", weather_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let slots: Vec<Value> = forecast
            .get("list")
            .and_then(Value::as_array)
            .map(|list| list.iter().take(FORECAST_SLOTS).cloned().collect())
            .unwrap_or_default();

        Ok(json!({
            "location": { "name": destination, "coordinates": location },
            "current": slots.first(),
            "forecast": slots,
            "city": forecast.get("city"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traffic_level_bands() {
        let leg = |normal: i64, traffic: i64| {
            json!({
                "duration": { "value": normal },
                "duration_in_traffic": { "value": traffic },
            })
        };

        assert_eq!(traffic_level(&leg(600, 1000)), "heavy");
        assert_eq!(traffic_level(&leg(600, 800)), "moderate");
        assert_eq!(traffic_level(&leg(600, 660)), "light");
        assert_eq!(traffic_level(&json!({ "duration": { "value": 600 } })), "normal");
    }

    #[test]
    fn test_split_stops() {
        let stops = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(split_stops(&stops), Some(("A|B".to_string(), "C")));

        let single = vec!["Goa".to_string()];
        assert_eq!(split_stops(&single), Some((String::new(), "Goa")));
        assert_eq!(split_stops(&[]), None);
    }

    #[test]
    fn test_route_summary_flattens_first_leg() {
        let route = json!({
            "overview_polyline": { "points": "abc" },
            "legs": [{
                "distance": { "text": "12 km" },
                "duration": { "text": "20 mins" },
                "start_address": "Colaba",
                "end_address": "Bandra",
                "steps": [{ "html_instructions": "Head north", "distance": { "text": "1 km" } }],
            }],
        });

        let summary = route_summary(&route);
        assert_eq!(summary["startAddress"], "Colaba");
        assert_eq!(summary["steps"][0]["instruction"], "Head north");
        assert_eq!(summary["overviewPolyline"], "abc");
    }

    #[test]
    fn test_format_place_builds_photo_urls() {
        let client = MapsClient::new(Some("maps-key".to_string()), None);
        let place = json!({
            "place_id": "p1",
            "name": "Gateway of India",
            "vicinity": "Apollo Bandar",
            "photos": [{ "photo_reference": "ref1" }],
        });

        let formatted = client.format_place(&place);
        assert_eq!(formatted["address"], "Apollo Bandar");
        assert_eq!(
            formatted["photos"][0]["url"],
            "https://maps.googleapis.com/maps/api/place/photo?maxwidth=400&photoreference=ref1&key=maps-key"
        );
    }

    #[actix_rt::test]
    async fn test_unconfigured_client() {
        let client = MapsClient::new(None, None);
        assert!(matches!(
            client.geocode("Mumbai").await,
            Err(MapsError::NotConfigured("GOOGLE_MAPS_API_KEY"))
        ));
        assert!(matches!(
            client.weather("Mumbai").await,
            Err(MapsError::NotConfigured("OPENWEATHER_API_KEY"))
        ));
        assert!(client.accommodations("Mumbai").await.is_empty());
        assert_eq!(client.transport_options("A", "B").await, json!({}));
    }
}
