//! Absolute image URLs from TMDB relative paths.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::config::{ImageConfig, ImageSizes};

const RESPONSIVE_POSTER_SIZES: [&str; 4] = ["w185", "w342", "w500", "w780"];
const RESPONSIVE_BACKDROP_SIZES: [&str; 3] = ["w300", "w780", "w1280"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Poster,
    Backdrop,
    Logo,
    Profile,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Poster => "poster",
            ImageKind::Backdrop => "backdrop",
            ImageKind::Logo => "logo",
            ImageKind::Profile => "profile",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "poster" => Ok(ImageKind::Poster),
            "backdrop" => Ok(ImageKind::Backdrop),
            "logo" => Ok(ImageKind::Logo),
            "profile" => Ok(ImageKind::Profile),
            other => Err(format!("unknown image kind: {other}")),
        }
    }
}

/// Builds CDN URLs as `base + size + path`.
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    base_url: String,
    sizes: ImageConfig,
}

impl ImageUrlBuilder {
    pub fn new(base_url: impl Into<String>, sizes: ImageConfig) -> Self {
        Self {
            base_url: base_url.into(),
            sizes,
        }
    }

    fn sizes_for(&self, kind: ImageKind) -> &ImageSizes {
        match kind {
            ImageKind::Poster => &self.sizes.poster,
            ImageKind::Backdrop => &self.sizes.backdrop,
            ImageKind::Logo => &self.sizes.logo,
            ImageKind::Profile => &self.sizes.profile,
        }
    }

    /// URL for `path` at `size` (or the kind's default). `None` when the
    /// path is missing or empty.
    pub fn url(&self, path: Option<&str>, kind: ImageKind, size: Option<&str>) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;
        let size = size.unwrap_or(self.sizes_for(kind).default.as_str());
        Some(format!("{}{}{}", self.base_url, size, path))
    }

    /// Size to URL for every size in `sizes`, or the kind's whole catalogue
    /// when `sizes` is empty.
    pub fn urls(
        &self,
        path: Option<&str>,
        kind: ImageKind,
        sizes: &[&str],
    ) -> BTreeMap<String, String> {
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            return BTreeMap::new();
        };

        let catalogue: Vec<&str> = if sizes.is_empty() {
            self.sizes_for(kind).sizes.iter().map(String::as_str).collect()
        } else {
            sizes.to_vec()
        };

        catalogue
            .into_iter()
            .map(|size| {
                (
                    size.to_string(),
                    format!("{}{}{}", self.base_url, size, path),
                )
            })
            .collect()
    }

    pub fn poster_url(&self, path: Option<&str>, size: Option<&str>) -> Option<String> {
        self.url(path, ImageKind::Poster, size)
    }

    pub fn backdrop_url(&self, path: Option<&str>, size: Option<&str>) -> Option<String> {
        self.url(path, ImageKind::Backdrop, size)
    }

    pub fn logo_url(&self, path: Option<&str>, size: Option<&str>) -> Option<String> {
        self.url(path, ImageKind::Logo, size)
    }

    pub fn profile_url(&self, path: Option<&str>, size: Option<&str>) -> Option<String> {
        self.url(path, ImageKind::Profile, size)
    }

    pub fn responsive_poster_urls(&self, path: Option<&str>) -> BTreeMap<String, String> {
        self.urls(path, ImageKind::Poster, &RESPONSIVE_POSTER_SIZES)
    }

    pub fn responsive_backdrop_urls(&self, path: Option<&str>) -> BTreeMap<String, String> {
        self.urls(path, ImageKind::Backdrop, &RESPONSIVE_BACKDROP_SIZES)
    }

    /// Local placeholder served when a movie has no image of this kind.
    pub fn fallback_url(&self, kind: ImageKind) -> &'static str {
        match kind {
            ImageKind::Poster => "/images/no-poster.png",
            ImageKind::Backdrop => "/images/no-backdrop.png",
            ImageKind::Logo => "/images/no-logo.png",
            ImageKind::Profile => "/images/no-profile.png",
        }
    }

    pub fn url_with_fallback(&self, path: Option<&str>, kind: ImageKind, size: Option<&str>) -> String {
        self.url(path, kind, size)
            .unwrap_or_else(|| self.fallback_url(kind).to_string())
    }
}

/// A usable TMDB path is non-empty and absolute.
pub fn is_valid_path(path: Option<&str>) -> bool {
    path.is_some_and(|p| p.starts_with('/'))
}
