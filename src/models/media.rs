use crate::models::FloodPoint;
use serde::Serialize;

/// How a renderer should present a point's camera feed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaSource {
    /// No stream, show the still image
    Image { url: String },
    /// HLS playlist (.m3u8)
    Hls { url: String },
    /// RTSP cannot play in a browser; renderers offer the link instead
    Rtsp { url: String },
    /// Any other web page, embedded as a frame
    Embed { url: String },
}

impl MediaSource {
    pub fn for_point(point: &FloodPoint) -> Self {
        match point.live_stream_url.as_deref() {
            None => MediaSource::Image {
                url: point.image_url.clone(),
            },
            Some(url) => Self::for_stream(url),
        }
    }

    fn for_stream(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let url = url.to_string();

        if path.to_ascii_lowercase().ends_with(".m3u8") {
            MediaSource::Hls { url }
        } else if path.to_ascii_lowercase().starts_with("rtsp://") {
            MediaSource::Rtsp { url }
        } else {
            MediaSource::Embed { url }
        }
    }
}
