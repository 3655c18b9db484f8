use crate::{
    error::{AppError, AppResult},
    listing::{ListView, SortOrder},
};
use axum::Router;
use serde::Serialize;
use std::{borrow::Cow, str::FromStr};

pub mod auth;
pub mod events;
pub mod gallery;
pub mod news;
pub mod newsletter;
pub mod org;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: Cow<'static, str>,
}

impl MessageResponse {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parses an optional enum-valued query parameter. Blank and `all` mean no
/// constraint.
pub(crate) fn parse_choice<T>(field: &'static str, value: Option<&str>) -> AppResult<Option<T>>
where
    T: FromStr<Err = anyhow::Error>,
{
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| AppError::bad_request(format!("invalid {field} `{v}`"))),
    }
}

pub(crate) fn list_view<F>(
    filter: F,
    search: Option<String>,
    sort: SortOrder,
    page: Option<usize>,
    page_size: Option<usize>,
) -> ListView<F> {
    let mut view = ListView::new(filter, sort);
    if let Some(size) = page_size {
        view = view.with_page_size(size);
    }
    if let Some(search) = search {
        view.set_search(search);
    }
    view.set_page(page.unwrap_or(1));
    view
}

pub fn app() -> Router {
    Router::new()
        .merge(auth::app())
        .merge(events::app())
        .merge(gallery::app())
        .merge(news::app())
        .merge(org::app())
        .merge(newsletter::app())
}
