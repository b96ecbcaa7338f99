use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Database,
};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

pub const USERS: &str = "users";
pub const ITINERARIES: &str = "itineraries";
pub const BOOKINGS: &str = "bookings";
pub const SHARES: &str = "shares";
pub const PAYMENTS: &str = "payments";
pub const RECOMMENDATION_TRACKING: &str = "recommendation_tracking";
pub const USER_ANALYTICS: &str = "user_analytics";

pub async fn create_mongo_client(uri: &str) -> Result<Arc<Client>, mongodb::error::Error> {
    info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);
    client_options.app_name = Some("trip-planner-api".to_string());

    // MongoDB 5.0+
    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    match client.database("admin").run_command(doc! {"ping": 1}).await {
        Ok(_) => info!("Successfully connected to MongoDB and verified with ping command"),
        Err(e) => {
            warn!("Connected to MongoDB but ping test failed: {}", e);
            warn!("The API may still work, but some functionality might be impaired");
        }
    }

    Ok(Arc::new(client))
}

/// Client that never dials out until the first operation; used where a live
/// server is optional.
pub async fn create_lazy_client(
    uri: &str,
    selection_timeout: Duration,
) -> Result<Arc<Client>, mongodb::error::Error> {
    let mut client_options = ClientOptions::parse(uri).await?;
    client_options.server_selection_timeout = Some(selection_timeout);
    client_options.connect_timeout = Some(selection_timeout);
    Ok(Arc::new(Client::with_options(client_options)?))
}

pub async fn ping(db: &Database) -> Result<(), mongodb::error::Error> {
    db.run_command(doc! {"ping": 1}).await.map(|_| ())
}
