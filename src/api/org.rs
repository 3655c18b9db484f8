use crate::{
    auth::AdminSession,
    error::AppResult,
    images::{probe_image, ProbeReport},
    models::{ExcoMember, ExcoSection},
    org::{assemble_chart, SectionView},
    schema::*,
    DbPool,
};
use axum::{routing::get, Extension, Json, Router};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberProbe {
    member_id: i32,
    name: String,
    #[serde(flatten)]
    report: ProbeReport,
}

async fn chart(Extension(pool): Extension<DbPool>) -> AppResult<Json<Vec<SectionView>>> {
    let conn = &mut pool.get().await?;

    let sections = excosection::table.load::<ExcoSection>(conn).await?;
    let members = excomember::table.load::<ExcoMember>(conn).await?;

    Ok(Json(assemble_chart(sections, members)))
}

/// Checks whether every member photo actually loads. Admin only, since it
/// makes one outbound request per member.
async fn image_diagnostics(
    Extension(pool): Extension<DbPool>,
    Extension(client): Extension<reqwest::Client>,
    AdminSession { user_id }: AdminSession,
) -> AppResult<Json<Vec<MemberProbe>>> {
    let conn = &mut pool.get().await?;
    let members = excomember::table
        .order(excomember::id.asc())
        .load::<ExcoMember>(conn)
        .await?;
    tracing::info!(user_id, count = members.len(), "probing member images");

    let handles: Vec<_> = members
        .into_iter()
        .map(|member| {
            let client = client.clone();
            tokio::spawn(async move {
                let report =
                    probe_image(&client, member.image.as_deref().unwrap_or_default()).await;
                MemberProbe {
                    member_id: member.id,
                    name: member.name,
                    report,
                }
            })
        })
        .collect();

    let mut probes = Vec::with_capacity(handles.len());
    for handle in handles {
        probes.push(handle.await?);
    }

    Ok(Json(probes))
}

pub fn app() -> Router {
    Router::new()
        .route("/org", get(chart))
        .route("/org/diagnostics", get(image_diagnostics))
}
