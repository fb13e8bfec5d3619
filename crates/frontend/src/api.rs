use paddock_shared::models::{LatLng, Paddock};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

fn api_url() -> Result<String, String> {
    let origin = web_sys::window()
        .ok_or("no window")?
        .location()
        .origin()
        .map_err(|_| "no origin".to_string())?;
    Ok(format!("{}/graphql", origin))
}

async fn query<T: for<'de> Deserialize<'de>>(
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(api_url()?)
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;
    unwrap_response(gql_resp)
}

fn unwrap_response<T>(gql_resp: GraphQLResponse<T>) -> Result<T, String> {
    if let Some(errors) = gql_resp.errors {
        if !errors.is_empty() {
            return Err(errors[0].message.clone());
        }
    }

    gql_resp.data.ok_or_else(|| "No data returned".to_string())
}

// Types mirroring the GraphQL schema

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLngData {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaddockData {
    pub name: String,
    pub polygon: Vec<LatLngData>,
}

impl From<PaddockData> for Paddock {
    fn from(p: PaddockData) -> Self {
        Paddock {
            name: p.name,
            polygon: p
                .polygon
                .into_iter()
                .map(|c| LatLng { lat: c.lat, lng: c.lng })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMessageData {
    pub id: String,
    pub payload: String,
    pub received_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatusData {
    pub topic: String,
    pub messages_received: u64,
    pub messages_rejected: u64,
    pub last_received_at: Option<String>,
}

// API functions

#[derive(Deserialize)]
pub struct PaddocksResponse {
    pub paddocks: Vec<PaddockData>,
}

pub async fn fetch_paddocks() -> Result<Vec<Paddock>, String> {
    let resp: PaddocksResponse =
        query(r#"query { paddocks { name polygon { lat lng } } }"#, None).await?;
    Ok(resp.paddocks.into_iter().map(Paddock::from).collect())
}

#[derive(Deserialize)]
pub struct PaddockResponse {
    pub paddock: Option<PaddockData>,
}

pub async fn fetch_paddock(name: &str) -> Result<Option<Paddock>, String> {
    let variables = serde_json::json!({ "name": name });
    let resp: PaddockResponse = query(
        r#"query GetPaddock($name: String!) { paddock(name: $name) { name polygon { lat lng } } }"#,
        Some(variables),
    )
    .await?;
    Ok(resp.paddock.map(Paddock::from))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestMessageResponse {
    pub latest_message: Option<FeedMessageData>,
}

pub async fn fetch_latest_message() -> Result<Option<FeedMessageData>, String> {
    let resp: LatestMessageResponse = query(
        r#"query { latestMessage { id payload receivedAt } }"#,
        None,
    )
    .await?;
    Ok(resp.latest_message)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatusResponse {
    pub feed_status: FeedStatusData,
}

pub async fn fetch_feed_status() -> Result<FeedStatusData, String> {
    let resp: FeedStatusResponse = query(
        r#"query { feedStatus { topic messagesReceived messagesRejected lastReceivedAt } }"#,
        None,
    )
    .await?;
    Ok(resp.feed_status)
}
