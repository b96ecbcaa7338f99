use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::routes::{required, success};
use crate::services::maps_service::{route_summary, RouteQuery};
use crate::state::AppState;

const NEARBY_RADIUS: u32 = 5000;
const DEFAULT_PLACE_TYPE: &str = "tourist_attraction";

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub destination: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub radius: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub radius: Option<u32>,
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PlacesQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CuisineQuery {
    pub cuisine: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TripQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RouteInput {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub mode: Option<String>,
    pub waypoints: Vec<String>,
    pub optimize: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MatrixInput {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub mode: Option<String>,
}

fn endpoints(origin: Option<&str>, destination: Option<&str>) -> ApiResult<(String, String)> {
    let message = "Origin and destination are required";
    Ok((
        required(origin, message)?.to_string(),
        required(destination, message)?.to_string(),
    ))
}

pub async fn destination(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let destination = state.maps.destination(&path).await?;
    Ok(success("destination", destination, "Destination retrieved successfully"))
}

pub async fn weather(state: web::Data<AppState>, query: web::Query<WeatherQuery>) -> ApiResult<HttpResponse> {
    let destination = required(query.destination.as_deref(), "Destination is required")?;
    let weather = state.maps.weather(destination).await?;
    Ok(success("weather", weather, "Weather retrieved successfully"))
}

pub async fn search(state: web::Data<AppState>, query: web::Query<SearchQuery>) -> ApiResult<HttpResponse> {
    let text = required(query.query.as_deref(), "Query is required")?;
    let places: Vec<_> = state
        .maps
        .search_places(text, query.location.as_deref(), query.radius, query.kind.as_deref())
        .await?
        .iter()
        .map(|place| state.maps.format_place(place))
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "total": places.len(),
        "places": places,
    })))
}

pub async fn place(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let details = state.maps.place_details(&path).await?;
    let mut place = state.maps.format_place(&details);
    place["placeId"] = json!(path.as_str());
    place["reviews"] = details.get("reviews").cloned().unwrap_or_default();
    place["website"] = details.get("website").cloned().unwrap_or_default();
    place["phone"] = details
        .get("formatted_phone_number")
        .cloned()
        .unwrap_or_default();
    Ok(success("place", place, "Place details retrieved successfully"))
}

pub async fn nearby(state: web::Data<AppState>, query: web::Query<NearbyQuery>) -> ApiResult<HttpResponse> {
    let (Some(location), Some(kind)) = (query.location.as_deref(), query.kind.as_deref()) else {
        return Err(ApiError::BadRequest("Location and type are required".to_string()));
    };

    let places: Vec<_> = state
        .maps
        .nearby(
            location,
            kind,
            Some(query.radius.unwrap_or(NEARBY_RADIUS)),
            query.keyword.as_deref(),
        )
        .await?
        .iter()
        .map(|place| state.maps.format_place(place))
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "total": places.len(),
        "places": places,
    })))
}

pub async fn geocode(state: web::Data<AppState>, query: web::Query<GeocodeQuery>) -> ApiResult<HttpResponse> {
    let result = match (query.address.as_deref(), query.lat, query.lng) {
        (Some(address), _, _) if !address.trim().is_empty() => state.maps.geocode(address).await?,
        (_, Some(lat), Some(lng)) => state.maps.reverse_geocode(lat, lng).await?,
        _ => {
            return Err(ApiError::BadRequest(
                "Either address or lat and lng are required".to_string(),
            ))
        }
    };
    Ok(success("location", result, "Location retrieved successfully"))
}

pub async fn places(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PlacesQuery>,
) -> HttpResponse {
    let kind = query.kind.as_deref().unwrap_or(DEFAULT_PLACE_TYPE);
    let places = state.maps.places_by_type(&path, kind).await;
    success("places", places, "Places retrieved successfully!")
}

pub async fn attractions(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let attractions = state.maps.attractions(&path).await;
    success(
        "attractions",
        attractions,
        "Tourist attractions retrieved successfully!",
    )
}

pub async fn restaurants(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<CuisineQuery>,
) -> HttpResponse {
    let restaurants = state
        .maps
        .restaurants(&path, query.cuisine.as_deref())
        .await;
    success("restaurants", restaurants, "Restaurants retrieved successfully!")
}

pub async fn directions(state: web::Data<AppState>, query: web::Query<TripQuery>) -> ApiResult<HttpResponse> {
    let (origin, destination) = endpoints(query.origin.as_deref(), query.destination.as_deref())?;
    let directions = state
        .maps
        .directions(&RouteQuery {
            origin: &origin,
            destination: &destination,
            mode: query.mode.as_deref(),
            ..Default::default()
        })
        .await?;
    Ok(success("directions", directions, "Directions retrieved successfully!"))
}

pub async fn transport_options(
    state: web::Data<AppState>,
    query: web::Query<TripQuery>,
) -> ApiResult<HttpResponse> {
    let (origin, destination) = endpoints(query.origin.as_deref(), query.destination.as_deref())?;
    let options = state.maps.transport_options(&origin, &destination).await;
    Ok(success("options", options, "Transport options retrieved successfully"))
}

pub async fn traffic(state: web::Data<AppState>, query: web::Query<TripQuery>) -> ApiResult<HttpResponse> {
    let (origin, destination) = endpoints(query.origin.as_deref(), query.destination.as_deref())?;
    let traffic = state.maps.traffic(&origin, &destination).await?;
    Ok(success("traffic", traffic, "Traffic information retrieved successfully"))
}

pub async fn distance_matrix(
    state: web::Data<AppState>,
    input: web::Json<MatrixInput>,
) -> ApiResult<HttpResponse> {
    if input.origins.is_empty() || input.destinations.is_empty() {
        return Err(ApiError::BadRequest(
            "Origins and destinations are required".to_string(),
        ));
    }
    let matrix = state
        .maps
        .distance_matrix(&input.origins, &input.destinations, input.mode.as_deref())
        .await?;
    Ok(success("matrix", matrix, "Distance matrix retrieved successfully"))
}

/// Route between two points. With `optimize`, the waypoints and the
/// destination are treated as stops Google may reorder.
pub async fn route(state: web::Data<AppState>, input: web::Json<RouteInput>) -> ApiResult<HttpResponse> {
    let (origin, destination) = endpoints(input.origin.as_deref(), input.destination.as_deref())?;

    let route = if input.optimize {
        let mut stops = input.waypoints.clone();
        stops.push(destination);
        state.maps.optimized_route(&origin, &stops).await?
    } else {
        state
            .maps
            .directions(&RouteQuery {
                origin: &origin,
                destination: &destination,
                mode: input.mode.as_deref(),
                waypoints: &input.waypoints,
                optimize: false,
            })
            .await?
    };

    Ok(success("route", route_summary(&route), "Route calculated successfully"))
}
