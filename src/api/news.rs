use super::{list_view, parse_choice};
use crate::{
    error::{AppError, AppResult},
    listing::{ListView, NewsFilter, Page, SortOrder},
    models::{NewsItem, NewsRow, NewsStatus},
    schema::*,
    DbPool,
};
use axum::{
    extract::{Path, Query},
    routing::get,
    Extension, Json, Router,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsQuery {
    search: Option<String>,
    category: Option<String>,
    sort: Option<SortOrder>,
    page: Option<usize>,
    page_size: Option<usize>,
}

impl NewsQuery {
    /// Newest first unless the caller asks otherwise.
    fn into_view(self) -> AppResult<ListView<NewsFilter>> {
        let filter = NewsFilter {
            category: parse_choice("category", self.category.as_deref())?,
        };
        Ok(list_view(
            filter,
            self.search,
            self.sort.unwrap_or(SortOrder::DateDesc),
            self.page,
            self.page_size,
        ))
    }
}

async fn list(
    Extension(pool): Extension<DbPool>,
    Query(q): Query<NewsQuery>,
) -> AppResult<Json<Page<NewsItem>>> {
    let view = q.into_view()?;

    let conn = &mut pool.get().await?;
    let articles = newsarticle::table
        .filter(newsarticle::status.eq(NewsStatus::Published.as_str()))
        .load::<NewsRow>(conn)
        .await?
        .into_iter()
        .map(NewsItem::from)
        .collect();

    Ok(Json(view.apply(articles)))
}

/// Drafts are invisible here, same as a missing slug.
async fn by_slug(
    Extension(pool): Extension<DbPool>,
    Path(slug): Path<String>,
) -> AppResult<Json<NewsItem>> {
    let conn = &mut pool.get().await?;

    let row = newsarticle::table
        .filter(newsarticle::slug.eq(slug))
        .filter(newsarticle::status.eq(NewsStatus::Published.as_str()))
        .first::<NewsRow>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Article not found"))?;

    Ok(Json(row.into()))
}

pub fn app() -> Router {
    Router::new()
        .route("/news", get(list))
        .route("/news/:slug", get(by_slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewsCategory;

    #[test]
    fn news_defaults_to_newest_first() {
        let q = NewsQuery {
            search: Some("launch".to_string()),
            category: Some("achievement".to_string()),
            sort: None,
            page: None,
            page_size: Some(6),
        };
        let view = q.into_view().unwrap();
        assert_eq!(view.sort(), SortOrder::DateDesc);
        assert_eq!(view.page(), 1);
        assert_eq!(view.filter().category, Some(NewsCategory::Achievement));
    }
}
