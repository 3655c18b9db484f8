//! Turns the free-text image field of member records into something an `<img>`
//! tag can load directly.
//!
//! Share links from the usual hosting providers are rewritten to their direct
//! download form. Anything that cannot be embedded collapses to
//! [`DEFAULT_AVATAR`]. Apart from [`probe_image`], nothing here touches the
//! network.

use regex::Regex;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_AVATAR: &str = "/images/default-avatar.png";

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const MIN_DRIVE_ID_LEN: usize = 25;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "svg", "avif", "bmp", "ico",
];

const MEDIA_PATH_SEGMENTS: &[&str] = &[
    "images", "image", "img", "imgs", "media", "uploads", "photos", "cdn", "static",
];

const IMAGE_HOSTS: &[&str] = &[
    "images.unsplash.com",
    "images.pexels.com",
    "i.ibb.co",
    "i.postimg.cc",
    "res.cloudinary.com",
    "pbs.twimg.com",
    "cdn.discordapp.com",
    "media.discordapp.net",
    "googleusercontent.com",
    "raw.githubusercontent.com",
    "dl.dropboxusercontent.com",
];

const PLACEHOLDER_HOSTS: &[&str] = &[
    "via.placeholder.com",
    "placehold.co",
    "placehold.it",
    "picsum.photos",
    "ui-avatars.com",
    "dummyimage.com",
];

lazy_static::lazy_static! {
    static ref SCHEME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap();
    // tried in order
    static ref DRIVE_ID_PATTERNS: [Regex; 3] = [
        Regex::new(r"/file/d/([A-Za-z0-9_-]+)").unwrap(),
        Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").unwrap(),
        Regex::new(r"/d/([A-Za-z0-9_-]+)").unwrap(),
    ];
}

/// `host` is `domain` or one of its subdomains.
fn is_host(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .map_or(false, |rest| rest.ends_with('.'))
}

fn has_image_extension(segment: &str) -> bool {
    segment
        .rsplit_once('.')
        .map_or(false, |(_, ext)| {
            IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
}

fn last_segment(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut s| s.next_back())
        .unwrap_or("")
}

fn drive_file_id(input: &str) -> Option<&str> {
    DRIVE_ID_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(input)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .filter(|id| id.len() >= MIN_DRIVE_ID_LEN)
    })
}

fn looks_like_image(url: &Url, host: &str) -> bool {
    if has_image_extension(last_segment(url)) {
        return true;
    }

    let media_path = url.path_segments().map_or(false, |mut segments| {
        segments.any(|s| MEDIA_PATH_SEGMENTS.contains(&s.to_ascii_lowercase().as_str()))
    });
    let cdn_host = host.split('.').any(|label| label == "cdn");

    media_path
        || cdn_host
        || IMAGE_HOSTS.iter().any(|d| is_host(host, d))
        || PLACEHOLDER_HOSTS.iter().any(|d| is_host(host, d))
}

fn rewrite_dropbox(mut url: Url) -> Result<String, &'static str> {
    url.set_host(Some("dl.dropboxusercontent.com"))
        .map_err(|_| "dropbox host rewrite failed")?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "dl")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    Ok(url.to_string())
}

fn rewrite_imgur(mut url: Url, original: &str) -> Result<String, &'static str> {
    let path = url.path().to_string();
    if path.starts_with("/a/") || path.starts_with("/gallery/") {
        return Err("imgur albums cannot be embedded");
    }
    let id = last_segment(&url);
    if id.is_empty() {
        return Err("imgur link without an image id");
    }
    if has_image_extension(id) {
        return Ok(original.to_string());
    }

    url.set_host(Some("i.imgur.com"))
        .map_err(|_| "imgur host rewrite failed")?;
    url.set_path(&format!("{}.jpg", path.trim_end_matches('/')));
    url.set_query(None);
    Ok(url.to_string())
}

fn normalize(raw: &str) -> Result<String, &'static str> {
    let input = raw.trim();
    if input.is_empty()
        || input.eq_ignore_ascii_case("null")
        || input.eq_ignore_ascii_case("undefined")
    {
        return Err("empty");
    }

    if input
        .get(..11)
        .map_or(false, |p| p.eq_ignore_ascii_case("data:image/"))
    {
        return Ok(input.to_string());
    }

    let absolute = if let Some(rest) = input.strip_prefix("//") {
        format!("https://{rest}")
    } else if SCHEME.is_match(input) {
        input.to_string()
    } else if input.starts_with('/') {
        return Ok(input.to_string());
    } else {
        return Ok(format!("/{input}"));
    };

    let url = Url::parse(&absolute).map_err(|_| "malformed url")?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err("unsupported scheme");
    }
    let host = url.host_str().ok_or("missing host")?.to_ascii_lowercase();

    if is_host(&host, "photos.google.com") || host == "photos.app.goo.gl" {
        return Err("google photos links cannot be embedded");
    }
    if is_host(&host, "drive.google.com") || is_host(&host, "docs.google.com") {
        return drive_file_id(&absolute)
            .map(|id| format!("https://drive.google.com/uc?export=view&id={id}"))
            .ok_or("no google drive file id");
    }
    if is_host(&host, "dropbox.com") {
        return rewrite_dropbox(url);
    }
    if is_host(&host, "onedrive.live.com")
        || host == "1drv.ms"
        || is_host(&host, "sharepoint.com")
    {
        return Err("onedrive links cannot be embedded");
    }
    if is_host(&host, "supabase.co") {
        return Ok(absolute);
    }
    if is_host(&host, "imgur.com") {
        return rewrite_imgur(url, &absolute);
    }
    if is_host(&host, "github.com") && url.path().contains("/blob/") {
        let mut raw_url = url.clone();
        raw_url
            .set_host(Some("raw.githubusercontent.com"))
            .map_err(|_| "github host rewrite failed")?;
        raw_url.set_path(&url.path().replacen("/blob/", "/", 1));
        return Ok(raw_url.to_string());
    }

    if looks_like_image(&url, &host) {
        Ok(absolute)
    } else {
        Err("does not look like an image")
    }
}

/// Returns a URL usable directly as an image source, or [`DEFAULT_AVATAR`].
pub fn normalize_image_url(raw: &str) -> String {
    normalize(raw).unwrap_or_else(|reason| {
        debug!(input = raw, reason, "falling back to default avatar");
        DEFAULT_AVATAR.to_string()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Not a remote URL (local asset, data URI or the default avatar).
    Skipped,
    Loaded,
    NotAnImage,
    HttpError,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub input: String,
    pub normalized: String,
    pub outcome: ProbeOutcome,
    pub status: Option<u16>,
    pub content_type: Option<String>,
    pub error: Option<String>,
}

/// Fetches the normalized form of `input` to see whether it actually loads
/// as an image. Never fails; problems end up in the report.
pub async fn probe_image(client: &reqwest::Client, input: &str) -> ProbeReport {
    let normalized = normalize_image_url(input);
    let mut report = ProbeReport {
        input: input.to_string(),
        normalized,
        outcome: ProbeOutcome::Skipped,
        status: None,
        content_type: None,
        error: None,
    };

    if !report.normalized.starts_with("http") {
        return report;
    }

    match client
        .get(&report.normalized)
        .timeout(PROBE_TIMEOUT)
        .send()
        .await
    {
        Ok(resp) => {
            let status = resp.status();
            report.status = Some(status.as_u16());
            report.content_type = resp
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let is_image = report
                .content_type
                .as_deref()
                .map_or(false, |ct| ct.starts_with("image/"));
            report.outcome = match (status.is_success(), is_image) {
                (true, true) => ProbeOutcome::Loaded,
                (true, false) => ProbeOutcome::NotAnImage,
                (false, _) => ProbeOutcome::HttpError,
            };
        }
        Err(err) => {
            report.outcome = ProbeOutcome::Failed;
            report.error = Some(if err.is_timeout() {
                format!("timed out after {}s", PROBE_TIMEOUT.as_secs())
            } else {
                err.to_string()
            });
        }
    }

    debug!(input, outcome = ?report.outcome, "probed image");
    report
}
