//! In-memory search, filtering, sorting and pagination for content lists.
//!
//! A [`ListView`] holds the caller's current view of a list. Any change to
//! what is shown (search term, filter, sort) moves the view back to page 1.

use crate::models::{
    Eligibility, Event, EventStatus, GalleryCategory, GalleryItem, NewsCategory, NewsItem,
    NewsStatus,
};
use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const MAX_PAGE_SIZE: usize = 48;

pub trait Listable {
    /// Fields matched by the free-text search.
    fn search_fields(&self) -> Vec<&str>;
    fn sort_date(&self) -> Option<NaiveDateTime>;
    fn title(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
}

pub trait Filter<T> {
    fn accepts(&self, item: &T) -> bool;
}

impl<T> Filter<T> for () {
    fn accepts(&self, _: &T) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "date-asc")]
    DateAsc,
    #[serde(rename = "date-desc")]
    DateDesc,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "recent")]
    Recent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Undated items go last in both date orders.
fn cmp_dates(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn sort_items<T: Listable>(items: &mut [T], order: SortOrder) {
    match order {
        SortOrder::DateAsc => items.sort_by(|a, b| cmp_dates(a.sort_date(), b.sort_date(), false)),
        SortOrder::DateDesc => items.sort_by(|a, b| cmp_dates(a.sort_date(), b.sort_date(), true)),
        SortOrder::Title => items.sort_by_cached_key(|i| i.title().to_lowercase()),
        SortOrder::Recent => items.sort_by(|a, b| b.created_at().cmp(&a.created_at())),
    }
}

/// Case-insensitive substring match over [`Listable::search_fields`]. A
/// blank term matches everything.
pub fn matches_search<T: Listable>(item: &T, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    needle.is_empty()
        || item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
}

/// Slices out 1-based page `page`. A page past the end is empty, including
/// one whose offset does not fit in a `usize`.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let total_items = items.len();
    let total_pages = ((total_items + page_size - 1) / page_size).max(1);
    let offset = (page - 1).checked_mul(page_size).unwrap_or(usize::MAX);

    Page {
        items: items.into_iter().skip(offset).take(page_size).collect(),
        page,
        page_size,
        total_items,
        total_pages,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListView<F> {
    search: String,
    filter: F,
    sort: SortOrder,
    page: usize,
    page_size: usize,
}

impl<F> ListView<F> {
    pub fn new(filter: F, sort: SortOrder) -> Self {
        Self {
            search: String::new(),
            filter,
            sort,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_filter(&mut self, filter: F) {
        self.filter = filter;
        self.page = 1;
    }

    pub fn update_filter(&mut self, update: impl FnOnce(&mut F)) {
        update(&mut self.filter);
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.page = 1;
    }

    /// Filter, then search, then sort, then slice.
    pub fn apply<T>(&self, items: Vec<T>) -> Page<T>
    where
        T: Listable,
        F: Filter<T>,
    {
        let mut visible: Vec<T> = items
            .into_iter()
            .filter(|item| self.filter.accepts(item) && matches_search(item, &self.search))
            .collect();
        sort_items(&mut visible, self.sort);
        paginate(visible, self.page, self.page_size)
    }
}

fn event_time(time: Option<&str>) -> NaiveTime {
    time.map(str::trim)
        .and_then(|t| {
            NaiveTime::parse_from_str(t, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(t, "%I:%M %p"))
                .ok()
        })
        .unwrap_or(NaiveTime::MIN)
}

impl Listable for Event {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.description.as_str()];
        fields.extend(self.location.as_deref());
        fields
    }

    fn sort_date(&self) -> Option<NaiveDateTime> {
        self.date
            .map(|d| d.and_time(event_time(self.time.as_deref())))
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Listable for GalleryItem {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.description.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn sort_date(&self) -> Option<NaiveDateTime> {
        self.date.map(|d| d.and_time(NaiveTime::MIN))
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Listable for NewsItem {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.description.as_str(),
            self.author.as_str(),
        ]
    }

    fn sort_date(&self) -> Option<NaiveDateTime> {
        Some(self.published_at.unwrap_or(self.created_at).naive_utc())
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub eligibility: Option<Eligibility>,
    pub free_only: bool,
    pub online_only: bool,
    pub certificate_only: bool,
}

impl Filter<Event> for EventFilter {
    fn accepts(&self, event: &Event) -> bool {
        let d = &event.details;
        self.status.map_or(true, |s| event.status == s)
            && self.eligibility.map_or(true, |e| event.eligibility == e)
            && (!self.free_only || d.is_free == Some(true))
            && (!self.online_only || d.is_online == Some(true))
            && (!self.certificate_only || d.has_certificate == Some(true))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryFilter {
    pub category: Option<GalleryCategory>,
    pub featured_only: bool,
}

impl Filter<GalleryItem> for GalleryFilter {
    fn accepts(&self, item: &GalleryItem) -> bool {
        self.category.map_or(true, |c| item.category == c) && (!self.featured_only || item.featured)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsFilter {
    pub category: Option<NewsCategory>,
}

/// Drafts never pass, whatever the category.
impl Filter<NewsItem> for NewsFilter {
    fn accepts(&self, item: &NewsItem) -> bool {
        item.status == NewsStatus::Published && self.category.map_or(true, |c| item.category == c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventDetails, GallerySize};
    use chrono::{NaiveDate, TimeZone};

    fn event(id: i32, title: &str, day: u32) -> Event {
        Event {
            id,
            title: title.to_string(),
            description: format!("description of {title}"),
            main_image: None,
            images: vec![],
            date: NaiveDate::from_ymd_opt(2024, 3, day),
            time: None,
            location: Some("Main Hall".to_string()),
            eligibility: Eligibility::All,
            registration_required: false,
            details: EventDetails::default(),
            status: EventStatus::Upcoming,
            registration_link: None,
            created_at: Utc.timestamp_opt(1_704_067_200 + i64::from(id), 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn ten_events() -> Vec<Event> {
        [
            "Robotics Workshop",
            "Welcome Night",
            "Hackathon Kickoff",
            "Career Talk",
            "ROBOTICS Showcase",
            "Movie Night",
            "Alumni Dinner",
            "Intro to Robotics",
            "Charity Run",
            "Study Jam",
        ]
        .iter()
        .enumerate()
        .map(|(i, t)| event(i as i32 + 1, t, 20 - i as u32))
        .collect()
    }

    fn ids<T, F: Fn(&T) -> i32>(items: &[T], id: F) -> Vec<i32> {
        items.iter().map(id).collect()
    }

    #[test]
    fn search_keeps_exactly_the_matches_in_order() {
        let mut view = ListView::new((), SortOrder::DateAsc);
        view.set_search("robotics");
        let events = ten_events();
        let mut expected: Vec<Event> = events
            .iter()
            .filter(|e| e.title.to_lowercase().contains("robotics"))
            .cloned()
            .collect();
        sort_items(&mut expected, SortOrder::DateAsc);

        let page = view.apply(events);
        assert_eq!(page.total_items, 3);
        assert_eq!(ids(&page.items, |e| e.id), ids(&expected, |e| e.id));
    }

    #[test]
    fn search_preserves_relative_order_without_sorting() {
        let events = ten_events();
        let matched: Vec<i32> = events
            .iter()
            .filter(|e| matches_search(*e, "ROBOTICS"))
            .map(|e| e.id)
            .collect();
        assert_eq!(matched, vec![1, 5, 8]);
    }

    #[test]
    fn search_covers_location() {
        let mut e = event(1, "Quiz", 1);
        e.location = Some("Engineering Block".to_string());
        assert!(matches_search(&e, "engineering"));
        assert!(matches_search(&e, "  "));
        assert!(!matches_search(&e, "science"));
    }

    #[test]
    fn date_orders_are_reverses() {
        let mut asc = ten_events();
        let mut desc = ten_events();
        sort_items(&mut asc, SortOrder::DateAsc);
        sort_items(&mut desc, SortOrder::DateDesc);

        let mut reversed = ids(&desc, |e| e.id);
        reversed.reverse();
        assert_eq!(ids(&asc, |e| e.id), reversed);
        assert_eq!(asc[0].id, 10);
    }

    #[test]
    fn undated_items_sort_last() {
        let mut events = vec![event(1, "a", 5), event(2, "b", 1), event(3, "c", 3)];
        events[0].date = None;
        sort_items(&mut events, SortOrder::DateDesc);
        assert_eq!(ids(&events, |e| e.id), vec![3, 2, 1]);
    }

    #[test]
    fn event_time_breaks_same_day_ties() {
        let mut late = event(1, "late", 5);
        late.time = Some("6:30 PM".to_string());
        let mut early = event(2, "early", 5);
        early.time = Some("09:00".to_string());
        let mut events = vec![late, early];
        sort_items(&mut events, SortOrder::DateAsc);
        assert_eq!(ids(&events, |e| e.id), vec![2, 1]);
    }

    #[test]
    fn title_and_recent_orders() {
        let mut events = vec![event(1, "beta", 1), event(2, "Alpha", 2), event(3, "gamma", 3)];
        sort_items(&mut events, SortOrder::Title);
        assert_eq!(ids(&events, |e| e.id), vec![2, 1, 3]);

        sort_items(&mut events, SortOrder::Recent);
        assert_eq!(ids(&events, |e| e.id), vec![3, 2, 1]);
    }

    #[test]
    fn pages_of_twelve() {
        let items: Vec<u32> = (0..25).collect();
        let sizes: Vec<usize> = (1..=3)
            .map(|p| paginate(items.clone(), p, 12).items.len())
            .collect();
        assert_eq!(sizes, vec![12, 12, 1]);

        let last = paginate(items.clone(), 3, 12);
        assert_eq!(last.items, vec![24]);
        assert_eq!(last.total_pages, 3);
        assert!(paginate(items, 4, 12).items.is_empty());
    }

    #[test]
    fn empty_list_has_one_empty_page() {
        let page = paginate(Vec::<u32>::new(), 1, 10);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_items, 0);
    }

    #[test]
    fn any_change_resets_to_first_page() {
        let mut view = ListView::new(EventFilter::default(), SortOrder::DateAsc);

        view.set_page(3);
        view.set_search("night");
        assert_eq!(view.page(), 1);

        view.set_page(2);
        view.update_filter(|f| f.free_only = true);
        assert_eq!(view.page(), 1);

        view.set_page(2);
        view.set_filter(EventFilter::default());
        assert_eq!(view.page(), 1);

        view.set_page(2);
        view.set_sort(SortOrder::Title);
        assert_eq!(view.page(), 1);

        view.set_page(0);
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn event_filter_toggles() {
        let mut free = event(1, "free", 1);
        free.details.is_free = Some(true);
        let mut cancelled = event(2, "cancelled", 2);
        cancelled.status = EventStatus::Cancelled;
        let plain = event(3, "plain", 3);

        let mut view = ListView::new(EventFilter::default(), SortOrder::DateAsc);
        view.update_filter(|f| f.free_only = true);
        assert_eq!(
            ids(&view.apply(vec![free.clone(), cancelled.clone(), plain.clone()]).items, |e| e.id),
            vec![1]
        );

        view.set_filter(EventFilter {
            status: Some(EventStatus::Upcoming),
            ..EventFilter::default()
        });
        assert_eq!(
            ids(&view.apply(vec![free, cancelled, plain]).items, |e| e.id),
            vec![1, 3]
        );
    }

    #[test]
    fn gallery_search_includes_tags() {
        let item = GalleryItem {
            id: 1,
            title: "Day one".to_string(),
            description: String::new(),
            main_image: "/images/g1.jpg".to_string(),
            additional_images: vec![],
            tags: vec!["Hackathon".to_string(), "2024".to_string()],
            category: GalleryCategory::Competitions,
            size: GallerySize::Large,
            date: None,
            featured: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches_search(&item, "hackathon"));

        let filter = GalleryFilter {
            category: Some(GalleryCategory::Social),
            featured_only: false,
        };
        assert!(!filter.accepts(&item));
    }

    #[test]
    fn page_size_is_clamped() {
        let view = ListView::new((), SortOrder::Recent).with_page_size(500);
        let page = view.apply((1..=60).map(|i| event(i, "x", 1)).collect());
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
        assert_eq!(page.items.len(), MAX_PAGE_SIZE);
    }

    #[test]
    fn huge_page_numbers_are_empty_pages() {
        let page = paginate((0..25).collect::<Vec<u32>>(), usize::MAX, 12);
        assert!(page.items.is_empty());
        assert_eq!(page.page, usize::MAX);
        assert_eq!(page.total_pages, 3);

        let mut view = ListView::new((), SortOrder::DateAsc);
        view.set_page(usize::MAX / 2);
        assert!(view.apply(ten_events()).items.is_empty());
    }

    fn article(id: i32, title: &str, created_day: u32, published_day: Option<u32>) -> NewsItem {
        let day = |d| Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap();
        NewsItem {
            id,
            title: title.to_string(),
            description: String::new(),
            image: None,
            content: "<p>body</p>".to_string(),
            slug: format!("article-{id}"),
            category: NewsCategory::General,
            author: "Exco".to_string(),
            status: NewsStatus::Published,
            created_at: day(created_day),
            updated_at: day(created_day),
            published_at: published_day.map(day),
        }
    }

    #[test]
    fn news_sorts_by_publication_then_creation_date() {
        let mut news = vec![
            // created late, published early
            article(1, "first", 20, Some(2)),
            // never stamped, falls back to its creation date
            article(2, "second", 10, None),
            article(3, "third", 1, Some(15)),
        ];
        sort_items(&mut news, SortOrder::DateDesc);
        assert_eq!(ids(&news, |n| n.id), vec![3, 2, 1]);
    }

    #[test]
    fn news_filter_hides_drafts() {
        let mut draft = article(1, "draft", 1, None);
        draft.status = NewsStatus::Draft;
        let published = article(2, "published", 2, Some(2));

        let view = ListView::new(NewsFilter::default(), SortOrder::DateDesc);
        let page = view.apply(vec![draft, published]);
        assert_eq!(ids(&page.items, |n| n.id), vec![2]);
    }
}
