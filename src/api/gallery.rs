use super::{list_view, parse_choice};
use crate::{
    error::{AppError, AppResult},
    listing::{sort_items, GalleryFilter, ListView, Page, SortOrder},
    models::{GalleryItem, GalleryRow},
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
struct GalleryQuery {
    search: Option<String>,
    category: Option<String>,
    #[serde(default)]
    featured: bool,
    sort: Option<SortOrder>,
    page: Option<usize>,
    page_size: Option<usize>,
}

impl GalleryQuery {
    /// Newest first unless the caller asks otherwise.
    fn into_view(self) -> AppResult<ListView<GalleryFilter>> {
        let filter = GalleryFilter {
            category: parse_choice("category", self.category.as_deref())?,
            featured_only: self.featured,
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
    Query(q): Query<GalleryQuery>,
) -> AppResult<Json<Page<GalleryItem>>> {
    let view = q.into_view()?;

    let conn = &mut pool.get().await?;
    let items = galleryitem::table
        .load::<GalleryRow>(conn)
        .await?
        .into_iter()
        .map(GalleryItem::from)
        .collect();

    Ok(Json(view.apply(items)))
}

async fn list_featured(Extension(pool): Extension<DbPool>) -> AppResult<Json<Vec<GalleryItem>>> {
    let conn = &mut pool.get().await?;

    let mut items: Vec<GalleryItem> = galleryitem::table
        .filter(galleryitem::featured.eq(true))
        .load::<GalleryRow>(conn)
        .await?
        .into_iter()
        .map(GalleryItem::from)
        .collect();
    sort_items(&mut items, SortOrder::DateDesc);

    Ok(Json(items))
}

async fn info(
    Extension(pool): Extension<DbPool>,
    Path(item_id): Path<i32>,
) -> AppResult<Json<GalleryItem>> {
    let conn = &mut pool.get().await?;

    let row = galleryitem::table
        .find(item_id)
        .first::<GalleryRow>(conn)
        .await
        .optional()?
        .ok_or_else(|| AppError::not_found("Gallery item not found"))?;

    Ok(Json(row.into()))
}

pub fn app() -> Router {
    Router::new()
        .route("/gallery", get(list))
        .route("/gallery/featured", get(list_featured))
        .route("/gallery/:item_id", get(info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallery_defaults_to_newest_first() {
        let q = GalleryQuery {
            search: None,
            category: Some("all".to_string()),
            featured: true,
            sort: None,
            page: Some(usize::MAX),
            page_size: None,
        };
        let view = q.into_view().unwrap();
        assert_eq!(view.sort(), SortOrder::DateDesc);
        assert_eq!(view.filter().category, None);
        assert!(view.filter().featured_only);
        assert!(view.apply(Vec::<GalleryItem>::new()).items.is_empty());
    }
}
