use uuid::Uuid;

/// Where an uploaded image belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Main,
    Gallery,
}

impl ImageSlot {
    fn folder(&self) -> &'static str {
        match self {
            ImageSlot::Main => "listings",
            ImageSlot::Gallery => "gallery",
        }
    }
}

/// Keeps only characters that are safe in an object key.
pub fn sanitize(filename: &str) -> String {
    let cleaned: String = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_' || *c == '-')
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `<prefix>/<listings|gallery>/<listing id>/<uuid>-<name>`.
/// The random component keeps repeated uploads of the same file apart.
pub fn image_key(prefix: &str, slot: ImageSlot, listing_id: Uuid, filename: &str) -> String {
    let name = format!("{}-{}", Uuid::new_v4(), sanitize(filename));
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{}/{}/{}", slot.folder(), listing_id, name)
    } else {
        format!("{}/{}/{}/{}", prefix, slot.folder(), listing_id, name)
    }
}

// Helpers for working with public S3-compatible URLs.
pub fn build_public_url(base: &str, bucket: &str, key: &str) -> String {
    let trimmed = base.trim_end_matches('/');

    // https://host/{bucket}/{key} style templates
    if trimmed.contains("{bucket}") || trimmed.contains("{key}") {
        return trimmed.replace("{bucket}", bucket).replace("{key}", key);
    }

    if trimmed.contains(bucket) {
        format!("{}/{}", trimmed, key)
    } else {
        format!("{}/{}/{}", trimmed, bucket, key)
    }
}
