use serde::Serialize;

use crate::domain::{ArtistId, MediaId, Page, WorkId};
use crate::models::artist::Artist;
use crate::models::media::MediaItem;
use crate::models::work::Work;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// A rendered page: the view to show plus its props.
#[derive(Debug, Serialize)]
pub struct PageView<P> {
    pub component: &'static str,
    pub url: String,
    pub props: P,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
}

impl<P> PageView<P> {
    pub fn new(component: &'static str, url: impl Into<String>, props: P) -> Self {
        Self {
            component,
            url: url.into(),
            props,
            flash: None,
        }
    }

    #[must_use]
    pub fn with_flash(mut self, flash: Option<Flash>) -> Self {
        self.flash = flash;
        self
    }
}

/// One-shot message carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct Flash {
    pub success: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistResource {
    pub id: ArtistId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
}

impl From<&Artist> for ArtistResource {
    fn from(artist: &Artist) -> Self {
        Self {
            id: artist.id,
            name: artist.name.clone(),
            bio: artist.bio.clone(),
            birth_date: artist.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
            death_date: artist.death_date.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaResource {
    pub id: MediaId,
    pub url: String,
    pub name: String,
    pub size: i64,
}

impl MediaResource {
    #[must_use]
    pub fn new(item: &MediaItem, public_path: &str) -> Self {
        Self {
            id: item.id,
            url: item.url(public_path),
            name: item.name.clone(),
            size: item.size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkResource {
    pub id: WorkId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_created: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<ArtistResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<MediaResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
}

impl WorkResource {
    /// `artist` and `images` are emitted only when the work has them loaded.
    #[must_use]
    pub fn new(work: &Work, public_path: &str) -> Self {
        let images: Option<Vec<MediaResource>> = work.images.as_ref().map(|items| {
            items
                .iter()
                .map(|item| MediaResource::new(item, public_path))
                .collect()
        });
        let featured_image = images
            .as_ref()
            .and_then(|images| images.first())
            .map(|image| image.url.clone());

        Self {
            id: work.id,
            title: work.title.clone(),
            description: work.description.clone(),
            year_created: work.year_created,
            artist: work.artist.as_ref().map(ArtistResource::from),
            images,
            featured_image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u64,
    pub last_page: u64,
    pub per_page: u64,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
    pub links: PageLinks,
}

impl<T> Paginated<T> {
    /// Wraps a page, with links pointing at `path?page=N`.
    pub fn new(page: Page<T>, path: &str) -> Self {
        let last_page = page.last_page();
        let current = page.current_page;
        let link = |n: u64| format!("{path}?page={n}");

        let meta = PageMeta {
            current_page: current,
            last_page,
            per_page: page.per_page,
            total: page.total,
            from: page.from(),
            to: page.to(),
        };

        let links = PageLinks {
            first: link(1),
            last: link(last_page),
            prev: (current > 1).then(|| link(current - 1)),
            next: (current < last_page).then(|| link(current + 1)),
        };

        Self {
            data: page.items,
            meta,
            links,
        }
    }
}
