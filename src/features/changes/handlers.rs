use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use utoipa::IntoParams;

use crate::core::changes::{ChangeFeed, ChangeKind, TableChange, TrackedTable};
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedAdmin;

/// Subscription filter: a table name and an event kind, `*` (or absent)
/// meaning "any"
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ChangeStreamQuery {
    /// leads, products, quote_requests or *
    pub table: Option<String>,
    /// insert, update, delete or *
    pub event: Option<String>,
}

/// Change notification stream for the admin console
///
/// Server-sent events; each event is one committed write on a tracked
/// table. Consoles re-fetch their views on every delivery.
#[utoipa::path(
    get,
    path = "/api/admin/changes",
    params(ChangeStreamQuery),
    responses(
        (status = 200, description = "SSE stream of committed writes"),
        (status = 400, description = "Unknown table or event filter"),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn stream_changes(
    _admin: AuthenticatedAdmin,
    State(feed): State<Arc<ChangeFeed>>,
    Query(query): Query<ChangeStreamQuery>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let table = parse_filter(query.table.as_deref(), TrackedTable::parse, "table")?;
    let kind = parse_filter(query.event.as_deref(), ChangeKind::parse, "event")?;

    let stream = BroadcastStream::new(feed.subscribe()).filter_map(move |item| {
        // A lagged subscriber just misses events; it re-fetches anyway
        let change: TableChange = item.ok()?;
        if !change.matches(table, kind) {
            return None;
        }
        Event::default()
            .event("change")
            .json_data(&change)
            .ok()
            .map(Ok)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn parse_filter<T>(
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
    what: &str,
) -> Result<Option<T>> {
    match raw {
        None | Some("*") => Ok(None),
        Some(s) => parse(s)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown {} filter: {}", what, s))),
    }
}
