use super::MessageResponse;
use crate::{
    error::{AppError, AppResult},
    schema::*,
    DbPool,
};
use axum::{routing::post, Extension, Json, Router};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use lettre::Address;
use serde::Deserialize;

#[derive(Deserialize)]
struct SubscribeRequest {
    #[serde(default)]
    email: String,
}

/// Trimmed, lower-cased and syntactically valid, or `None`.
fn normalize_subscriber(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    email.parse::<Address>().ok().map(|_| email)
}

async fn subscribe(
    Extension(pool): Extension<DbPool>,
    Json(req): Json<SubscribeRequest>,
) -> AppResult<Json<MessageResponse>> {
    #[derive(Insertable)]
    #[diesel(table_name = newsletter_subscriptions)]
    struct NewSubscription {
        email: String,
    }

    let email = normalize_subscriber(&req.email)
        .ok_or_else(|| AppError::bad_request("Please provide a valid email address"))?;

    let conn = &mut pool.get().await?;
    let inserted = diesel::insert_into(newsletter_subscriptions::table)
        .values(NewSubscription { email })
        .on_conflict(newsletter_subscriptions::email)
        .do_nothing()
        .execute(conn)
        .await?;

    Ok(Json(MessageResponse::new(if inserted == 1 {
        "Subscribed to the newsletter"
    } else {
        "You are already subscribed"
    })))
}

pub fn app() -> Router {
    Router::new().route("/newsletter", post(subscribe))
}

#[cfg(test)]
mod tests {
    use super::normalize_subscriber;

    #[test]
    fn subscriber_emails_are_normalized() {
        assert_eq!(
            normalize_subscriber("  Member@Uni.EDU "),
            Some("member@uni.edu".to_string())
        );
        assert_eq!(normalize_subscriber("not-an-email"), None);
        assert_eq!(normalize_subscriber(""), None);
    }
}
