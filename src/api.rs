use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{HistoryRecord, RouteRequest, RouteSummary};
use crate::error::Error;

#[async_trait]
pub trait RouteAPI {
    async fn plan_route(&self, request: RouteRequest) -> Result<RouteSummary, Error>;
}

#[async_trait]
pub trait MapAPI {
    async fn find_map(&self, id: Uuid) -> Result<String, Error>;
    async fn latest_map(&self) -> Result<String, Error>;
}

#[async_trait]
pub trait HistoryAPI {
    async fn recent_history(&self, limit: usize) -> Result<Vec<HistoryRecord>, Error>;
}

pub trait API: RouteAPI + MapAPI + HistoryAPI {}
