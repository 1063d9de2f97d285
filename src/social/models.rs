use serde::{Deserialize, Serialize};
use std::time::SystemTime;

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    pub fn from_str(s: &str) -> Option<MediaKind> {
        match s {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            "audio" => Some(MediaKind::Audio),
            _ => None,
        }
    }
}


#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Post {
    pub id: String,
    pub user_id: usize,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub media_kind: Option<MediaKind>,
    pub created: SystemTime,
    /// Ids of the users who currently like this post.
    pub liked_by: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct NewPost {
    pub user_id: usize,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub media_kind: Option<MediaKind>,
}
