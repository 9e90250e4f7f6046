use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Image,
    Video,
    Youtube,
}

impl MediaType {
    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Image => "Image",
            MediaType::Video => "Video",
            MediaType::Youtube => "YouTube",
        }
    }

    /// Guess the upload type from a file extension. Unknown extensions are
    /// not uploadable.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" => Some(MediaType::Image),
            "mp4" | "webm" | "mov" => Some(MediaType::Video),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub filename: String,
    pub file_url: String,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Media {
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.filename)
    }

    /// Link to open: the YouTube URL for imported videos, else the file.
    pub fn link(&self) -> &str {
        self.youtube_url.as_deref().unwrap_or(&self.file_url)
    }

    pub fn youtube_id(&self) -> Option<&str> {
        youtube_video_id(self.link())
    }
}

/// Body for `POST /media/youtube`.
#[derive(Debug, Clone, Serialize)]
pub struct YoutubeImport {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Extract the 11-character video id from watch, embed, or youtu.be URLs.
pub fn youtube_video_id(url: &str) -> Option<&str> {
    const MARKERS: [&str; 3] = ["youtube.com/watch?v=", "youtube.com/embed/", "youtu.be/"];
    let start = MARKERS
        .iter()
        .find_map(|m| url.find(m).map(|i| i + m.len()))?;
    let id = url.get(start..start + 11)?;
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        .then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_video_id() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_video_id("https://youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
        assert_eq!(
            youtube_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_video_id("https://youtu.be/short"), None);
        assert_eq!(youtube_video_id("/uploads/clip.mp4"), None);
    }

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(MediaType::from_extension("JPG"), Some(MediaType::Image));
        assert_eq!(MediaType::from_extension("mp4"), Some(MediaType::Video));
        assert_eq!(MediaType::from_extension("exe"), None);
    }

    #[test]
    fn test_media_link_prefers_youtube() {
        let media: Media = serde_json::from_str(
            r#"{"id": "m1", "media_type": "YOUTUBE", "file_url": "",
                "youtube_url": "https://youtu.be/dQw4w9WgXcQ"}"#,
        )
        .expect("valid media");
        assert_eq!(media.youtube_id(), Some("dQw4w9WgXcQ"));
    }
}
