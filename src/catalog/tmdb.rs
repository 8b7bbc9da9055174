use super::*;
use reqwest::header::CONTENT_TYPE;

/// TMDB discover endpoint client
pub struct TmdbCatalog {
    base_url: String,
    api_key: String,
    min_vote_count: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl TmdbCatalog {
    pub fn new(
        base_url: String,
        api_key: String,
        min_vote_count: u32,
        timeout: Duration,
    ) -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            min_vote_count,
            timeout,
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    results: Vec<CatalogMovie>,
}

fn map_request_error(e: reqwest::Error, timeout: Duration) -> CatalogError {
    if e.is_timeout() {
        CatalogError::Timeout(timeout)
    } else {
        CatalogError::ApiError(e.to_string())
    }
}

#[async_trait]
impl CatalogFetcher for TmdbCatalog {
    async fn discover(&self, query: &MovieQuery) -> CatalogResult<Vec<CatalogMovie>> {
        let url = format!("{}/discover/movie", self.base_url);
        let genre = query.genre.tmdb_id.to_string();
        let from = format!("{}-01-01", query.year);
        let to = format!("{}-12-31", query.year);
        let min_votes = self.min_vote_count.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("with_genres", genre.as_str()),
                ("primary_release_date.gte", from.as_str()),
                ("primary_release_date.lte", to.as_str()),
                ("vote_count.gte", min_votes.as_str()),
                ("sort_by", "popularity.desc"),
            ])
            .send()
            .await
            .map_err(|e| map_request_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(CatalogError::ApiError(format!(
                "TMDB discover returned status: {}",
                response.status()
            )));
        }

        let body: DiscoverResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        tracing::debug!(
            "TMDB discover {} {}: {} results",
            query.genre.name,
            query.year,
            body.results.len()
        );
        Ok(body.results)
    }

    fn name(&self) -> &str {
        "tmdb"
    }
}

/// Poster images from the TMDB image CDN
pub struct TmdbPosterStore {
    image_base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl TmdbPosterStore {
    pub fn new(image_base_url: String, timeout: Duration) -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    fn poster_url(&self, path: &str, size: &str) -> String {
        format!("{}/{}{}", self.image_base_url, size, path)
    }
}

#[async_trait]
impl PosterStore for TmdbPosterStore {
    async fn fetch(&self, path: &str, size: &str) -> CatalogResult<PosterImage> {
        let response = self
            .client
            .get(self.poster_url(path, size))
            .send()
            .await
            .map_err(|e| map_request_error(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(CatalogError::ApiError(format!(
                "Poster request returned status: {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CatalogError::ApiError(format!("Failed to read poster bytes: {}", e)))?;

        Ok(PosterImage {
            content_type,
            bytes: bytes.to_vec(),
            is_placeholder: false,
        })
    }
}
