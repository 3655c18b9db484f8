use crate::schema::*;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Declares an enum stored as a text column. Unknown column values fall back
/// to `fallback` instead of failing the whole row.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident (fallback = $fallback:ident) {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            pub(crate) fn from_column(value: &str) -> Self {
                value.parse().unwrap_or_else(|_| {
                    tracing::warn!(value, kind = stringify!($name), "unrecognized value in database");
                    Self::$fallback
                })
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(anyhow::anyhow!("unknown {} `{}`", stringify!($name), other)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum! {
    pub enum EventStatus (fallback = Upcoming) {
        Upcoming => "upcoming",
        Ongoing => "ongoing",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    /// Who may attend an event.
    pub enum Eligibility (fallback = All) {
        All => "all",
        Members => "members",
        Students => "students",
        Invite => "invite",
    }
}

text_enum! {
    pub enum GalleryCategory (fallback = Other) {
        Events => "events",
        Workshops => "workshops",
        Competitions => "competitions",
        Social => "social",
        Community => "community",
        Other => "other",
    }
}

text_enum! {
    /// Layout hint for the gallery grid. Carries no meaning beyond display.
    pub enum GallerySize (fallback = Medium) {
        Small => "small",
        Medium => "medium",
        Large => "large",
    }
}

text_enum! {
    pub enum NewsCategory (fallback = General) {
        Announcement => "announcement",
        Event => "event",
        Achievement => "achievement",
        General => "general",
    }
}

text_enum! {
    pub enum NewsStatus (fallback = Draft) {
        Draft => "draft",
        Published => "published",
    }
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = event)]
pub struct EventRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub main_image: Option<String>,
    pub images: Vec<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub eligibility: String,
    pub registration_required: bool,
    pub details: serde_json::Value,
    pub status: String,
    pub registration_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub is_free: Option<bool>,
    pub has_certificate: Option<bool>,
    pub has_refreshments: Option<bool>,
    pub has_transportation: Option<bool>,
    pub is_online: Option<bool>,
    pub is_limited: Option<bool>,
    pub agenda: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub main_image: Option<String>,
    pub images: Vec<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub eligibility: Eligibility,
    pub registration_required: bool,
    pub details: EventDetails,
    pub status: EventStatus,
    pub registration_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        let details = serde_json::from_value(row.details).unwrap_or_else(|err| {
            tracing::warn!(event_id = row.id, %err, "malformed event details, ignoring");
            EventDetails::default()
        });

        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            main_image: row.main_image,
            images: row.images,
            date: row.date,
            time: row.time,
            location: row.location,
            eligibility: Eligibility::from_column(&row.eligibility),
            registration_required: row.registration_required,
            details,
            status: EventStatus::from_column(&row.status),
            registration_link: row.registration_link,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = galleryitem)]
pub struct GalleryRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub main_image: String,
    pub additional_images: Vec<String>,
    pub tags: Vec<String>,
    pub category: String,
    pub size: String,
    pub date: Option<NaiveDate>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub main_image: String,
    pub additional_images: Vec<String>,
    pub tags: Vec<String>,
    pub category: GalleryCategory,
    pub size: GallerySize,
    pub date: Option<NaiveDate>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GalleryRow> for GalleryItem {
    fn from(row: GalleryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            main_image: row.main_image,
            additional_images: row.additional_images,
            tags: row.tags,
            category: GalleryCategory::from_column(&row.category),
            size: GallerySize::from_column(&row.size),
            date: row.date,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = newsarticle)]
pub struct NewsRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub content: String,
    pub slug: String,
    pub category: String,
    pub author: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    /// Stored HTML, passed through as-is.
    pub content: String,
    pub slug: String,
    pub category: NewsCategory,
    pub author: String,
    pub status: NewsStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<NewsRow> for NewsItem {
    fn from(row: NewsRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            image: row.image,
            content: row.content,
            slug: row.slug,
            category: NewsCategory::from_column(&row.category),
            author: row.author,
            status: NewsStatus::from_column(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
            published_at: row.published_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = excosection)]
pub struct ExcoSection {
    pub id: i32,
    pub name: String,
    pub display_order: i32,
    pub head_member_id: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = excomember)]
pub struct ExcoMember {
    pub id: i32,
    pub section_id: i32,
    pub name: String,
    pub position: String,
    pub image: Option<String>,
    pub display_order: i32,
    pub email: Option<String>,
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable)]
#[diesel(table_name = user)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    /// SHA-256 digest of the outstanding reset token, hex encoded.
    pub reset_token: Option<String>,
    pub reset_token_exp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_enums_parse_case_insensitively() {
        assert_eq!("Published".parse::<NewsStatus>().unwrap(), NewsStatus::Published);
        assert_eq!(" cancelled ".parse::<EventStatus>().unwrap(), EventStatus::Cancelled);
        assert!("archived".parse::<NewsStatus>().is_err());
    }

    #[test]
    fn unknown_column_values_use_fallback() {
        assert_eq!(GalleryCategory::from_column("memes"), GalleryCategory::Other);
        assert_eq!(Eligibility::from_column("staff"), Eligibility::All);
    }

    #[test]
    fn event_details_use_camel_case_keys() {
        let details: EventDetails = serde_json::from_value(serde_json::json!({
            "isFree": true,
            "isOnline": false,
            "agenda": ["Welcome", "Talk"]
        }))
        .unwrap();

        assert_eq!(details.is_free, Some(true));
        assert_eq!(details.is_online, Some(false));
        assert_eq!(details.has_certificate, None);
        assert_eq!(details.agenda.unwrap().len(), 2);
    }
}
