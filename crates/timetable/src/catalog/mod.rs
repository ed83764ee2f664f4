/// Course catalog: loading, lookup, filtering and the department directory
pub mod directory;
mod error;
pub mod filter;
mod types;

pub use directory::{departments, DepartmentGroup};
pub use error::CatalogLoadError;
pub use filter::{available_grades, filter, FilterCriteria, Grade, ProgramLevel};
pub use types::*;

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};
use url::Url;

/// Where the static catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Remote(Url),
}

impl FromStr for CatalogSource {
    type Err = CatalogLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CatalogLoadError::UnsupportedSource(s.to_string()));
        }

        match Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(CatalogSource::Remote(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(CatalogSource::File)
                .map_err(|_| CatalogLoadError::UnsupportedSource(s.to_string())),
            // Windows drive letters parse as one-letter schemes
            Ok(url) if url.scheme().len() == 1 => Ok(CatalogSource::File(PathBuf::from(s))),
            Ok(_) => Err(CatalogLoadError::UnsupportedSource(s.to_string())),
            Err(_) => Ok(CatalogSource::File(PathBuf::from(s))),
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::File(path) => write!(f, "{}", path.display()),
            CatalogSource::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// The read-only course catalog for a session.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: Vec<Course>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, keeping catalog order. For duplicate codes the
    /// first record wins lookups.
    pub fn new(courses: Vec<Course>) -> Self {
        let mut index = HashMap::with_capacity(courses.len());
        let mut duplicates = 0usize;
        for (i, course) in courses.iter().enumerate() {
            if index.contains_key(&course.code) {
                duplicates += 1;
            } else {
                index.insert(course.code.clone(), i);
            }
        }

        if duplicates > 0 {
            warn!(duplicates, "Catalog contains duplicate course codes");
        }

        Self { courses, index }
    }

    /// An empty catalog, used until the real one has loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn get(&self, code: &str) -> Option<&Course> {
        self.index.get(code).map(|&i| &self.courses[i])
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Parses a catalog from its JSON text (an array of course records).
    pub fn from_json(json: &str) -> Result<Self, CatalogLoadError> {
        let courses: Vec<Course> = serde_json::from_str(json)?;
        Ok(Self::new(courses))
    }
}

/// Loads the catalog once from a local file or an http(s) URL.
pub async fn load(source: &CatalogSource) -> Result<Catalog, CatalogLoadError> {
    info!("Loading course catalog from {source}");

    let body = match source {
        CatalogSource::File(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| CatalogLoadError::Io {
                    path: path.display().to_string(),
                    source: e,
                })?
        }
        CatalogSource::Remote(url) => fetch_remote(url).await?,
    };

    let catalog = Catalog::from_json(&body)?;
    info!("Loaded {} courses from {source}", catalog.len());
    Ok(catalog)
}

async fn fetch_remote(url: &Url) -> Result<String, CatalogLoadError> {
    let http_error = |e: reqwest::Error| CatalogLoadError::Http {
        url: url.to_string(),
        source: e,
    };

    let response = reqwest::get(url.clone()).await.map_err(http_error)?;
    if !response.status().is_success() {
        return Err(CatalogLoadError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    response.text().await.map_err(http_error)
}
