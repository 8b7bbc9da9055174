use super::*;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Dark 200x300 card shown whenever a poster cannot be loaded
const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="300" viewBox="0 0 200 300"><rect width="200" height="300" fill="#141414"/></svg>"##;

/// Poster bytes ready to hand to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct PosterImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub is_placeholder: bool,
}

impl PosterImage {
    pub fn placeholder() -> Self {
        Self {
            content_type: "image/svg+xml".to_string(),
            bytes: PLACEHOLDER_SVG.as_bytes().to_vec(),
            is_placeholder: true,
        }
    }

    /// Encode as a `data:` URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// Source of poster images
#[async_trait]
pub trait PosterStore: Send + Sync {
    /// Fetch the poster at `path` in the given size
    async fn fetch(&self, path: &str, size: &str) -> CatalogResult<PosterImage>;
}

/// Fetch a poster, degrading to the placeholder on any failure
pub async fn poster_or_placeholder(store: &dyn PosterStore, path: &str, size: &str) -> PosterImage {
    if path.trim().is_empty() {
        return PosterImage::placeholder();
    }

    match store.fetch(path, size).await {
        Ok(image) if !image.bytes.is_empty() => image,
        Ok(_) => {
            tracing::warn!("Poster {} came back empty, using placeholder", path);
            PosterImage::placeholder()
        }
        Err(e) => {
            tracing::warn!("Failed to fetch poster {}: {}, using placeholder", path, e);
            PosterImage::placeholder()
        }
    }
}
