use super::{list_view, parse_choice};
use crate::{
    error::{AppError, AppResult},
    listing::{EventFilter, ListView, Page, SortOrder},
    models::{Event, EventRow, EventStatus},
    schema::*,
    DbPool,
};
use axum::{
    extract::{Path, Query},
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;

const DEFAULT_UPCOMING: i64 = 3;
const MAX_UPCOMING: i64 = 12;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventQuery {
    search: Option<String>,
    status: Option<String>,
    eligibility: Option<String>,
    #[serde(default)]
    free: bool,
    #[serde(default)]
    online: bool,
    #[serde(default)]
    certificate: bool,
    sort: Option<SortOrder>,
    page: Option<usize>,
    page_size: Option<usize>,
}

impl EventQuery {
    /// Soonest first unless the caller asks otherwise.
    fn into_view(self) -> AppResult<ListView<EventFilter>> {
        let filter = EventFilter {
            status: parse_choice("status", self.status.as_deref())?,
            eligibility: parse_choice("eligibility", self.eligibility.as_deref())?,
            free_only: self.free,
            online_only: self.online,
            certificate_only: self.certificate,
        };
        Ok(list_view(
            filter,
            self.search,
            self.sort.unwrap_or(SortOrder::DateAsc),
            self.page,
            self.page_size,
        ))
    }
}

#[derive(Deserialize)]
struct UpcomingQuery {
    limit: Option<i64>,
}

async fn list(
    Extension(pool): Extension<DbPool>,
    Query(q): Query<EventQuery>,
) -> AppResult<Json<Page<Event>>> {
    let view = q.into_view()?;

    let conn = &mut pool.get().await?;
    let events = event::table
        .load::<EventRow>(conn)
        .await?
        .into_iter()
        .map(Event::from)
        .collect();

    Ok(Json(view.apply(events)))
}

/// Next few upcoming events from today on, soonest first.
async fn upcoming(
    Extension(pool): Extension<DbPool>,
    Query(q): Query<UpcomingQuery>,
) -> AppResult<Json<Vec<Event>>> {
    let limit = q.limit.unwrap_or(DEFAULT_UPCOMING).clamp(1, MAX_UPCOMING);
    let conn = &mut pool.get().await?;

    let events = event::table
        .filter(event::status.eq(EventStatus::Upcoming.as_str()))
        .filter(event::date.ge(Utc::now().date_naive()))
        .order((event::date.asc(), event::id.asc()))
        .limit(limit)
        .load::<EventRow>(conn)
        .await?;

    Ok(Json(events.into_iter().map(Event::from).collect()))
}

async fn info(
    Extension(pool): Extension<DbPool>,
    Path(event_id): Path<i32>,
) -> AppResult<Json<Event>> {
    let conn = &mut pool.get().await?;

    let row = event::table
        .find(event_id)
        .first::<EventRow>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    Ok(Json(row.into()))
}

pub fn app() -> Router {
    Router::new()
        .route("/events", get(list))
        .route("/events/upcoming", get(upcoming))
        .route("/events/:event_id", get(info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn query(sort: Option<SortOrder>, status: Option<&str>) -> EventQuery {
        EventQuery {
            search: None,
            status: status.map(str::to_string),
            eligibility: None,
            free: true,
            online: false,
            certificate: false,
            sort,
            page: Some(2),
            page_size: None,
        }
    }

    #[test]
    fn events_default_to_soonest_first() {
        let view = query(None, Some("all")).into_view().unwrap();
        assert_eq!(view.sort(), SortOrder::DateAsc);
        assert_eq!(view.page(), 2);
        assert!(view.filter().free_only);
        assert_eq!(view.filter().status, None);

        let view = query(Some(SortOrder::Title), None).into_view().unwrap();
        assert_eq!(view.sort(), SortOrder::Title);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = query(None, Some("postponed")).into_view().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
