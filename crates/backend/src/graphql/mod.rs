use std::sync::Arc;

use async_graphql::{Context, Object, SimpleObject, ID};
use paddock_shared::models::{self, EntityRecord, LatLng};

use crate::assets::Assets;
use crate::hub::{FeedHub, FeedMessage};

// GraphQL output types

#[derive(SimpleObject, Clone)]
pub struct GqlLatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for GqlLatLng {
    fn from(p: LatLng) -> Self {
        GqlLatLng { lat: p.lat, lng: p.lng }
    }
}

#[derive(SimpleObject)]
pub struct GqlPaddock {
    pub name: String,
    pub polygon: Vec<GqlLatLng>,
    pub center: Option<GqlLatLng>,
}

impl From<&models::Paddock> for GqlPaddock {
    fn from(p: &models::Paddock) -> Self {
        GqlPaddock {
            name: p.name.clone(),
            polygon: p.polygon.iter().copied().map(GqlLatLng::from).collect(),
            center: p.center().map(GqlLatLng::from),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlFeedMessage {
    pub id: ID,
    /// Raw JSON text exactly as published.
    pub payload: String,
    pub received_at: String,
}

impl From<&FeedMessage> for GqlFeedMessage {
    fn from(m: &FeedMessage) -> Self {
        GqlFeedMessage {
            id: ID(m.id.to_string()),
            payload: m.payload.to_string(),
            received_at: m.received_at.to_rfc3339(),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlEntityRecord {
    pub id: String,
    pub position: Vec<i32>,
    pub status: i32,
    pub location_unknown: bool,
}

impl From<EntityRecord> for GqlEntityRecord {
    fn from(r: EntityRecord) -> Self {
        GqlEntityRecord {
            location_unknown: r.location_unknown(),
            position: vec![r.position.x, r.position.y],
            status: r.status.code() as i32,
            id: r.id,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlFeedStatus {
    pub topic: String,
    pub messages_received: u64,
    pub messages_rejected: u64,
    pub last_received_at: Option<String>,
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn paddocks(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<GqlPaddock>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(assets.paddocks.iter().map(GqlPaddock::from).collect())
    }

    async fn paddock(&self, ctx: &Context<'_>, name: String) -> async_graphql::Result<Option<GqlPaddock>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(assets.find_paddock(&name).map(GqlPaddock::from))
    }

    async fn latest_message(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<GqlFeedMessage>> {
        let hub = ctx.data::<Arc<FeedHub>>()?;
        Ok(hub.latest().as_deref().map(GqlFeedMessage::from))
    }

    async fn latest_batch(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<GqlEntityRecord>> {
        let hub = ctx.data::<Arc<FeedHub>>()?;
        Ok(hub.latest_batch().into_iter().map(GqlEntityRecord::from).collect())
    }

    async fn feed_status(&self, ctx: &Context<'_>) -> async_graphql::Result<GqlFeedStatus> {
        let hub = ctx.data::<Arc<FeedHub>>()?;
        let stats = hub.stats();
        Ok(GqlFeedStatus {
            topic: hub.topic().to_string(),
            messages_received: stats.received,
            messages_rejected: stats.rejected,
            last_received_at: stats.last_received_at.map(|t| t.to_rfc3339()),
        })
    }
}

// Mutation root

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Publish a raw position batch (`{"id": [x, y, status], ...}`).
    async fn publish_positions(
        &self,
        ctx: &Context<'_>,
        payload: String,
    ) -> async_graphql::Result<GqlFeedMessage> {
        let hub = ctx.data::<Arc<FeedHub>>()?;
        let message = hub.publish(&payload).map_err(async_graphql::Error::new)?;
        Ok(GqlFeedMessage::from(message.as_ref()))
    }
}

pub type Schema = async_graphql::Schema<QueryRoot, MutationRoot, async_graphql::EmptySubscription>;

pub fn build_schema(assets: Arc<Assets>, hub: Arc<FeedHub>) -> Schema {
    async_graphql::Schema::build(QueryRoot, MutationRoot, async_graphql::EmptySubscription)
        .data(assets)
        .data(hub)
        .finish()
}
