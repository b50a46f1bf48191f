/// Media attachment kind, derived from the upload's content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Anything that is not an image is stored as video, mirroring the
    /// two-bucket gallery the upload form offers.
    #[must_use]
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(mime) if mime.starts_with("image/") => Self::Image,
            _ => Self::Video,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}
