//! Binary-or-URI values (PHOTO, LOGO, SOUND, KEY).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Inline data or a reference to remote data, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaValue {
    Binary {
        data: Vec<u8>,
        /// Full MIME type, e.g. `image/jpeg`.
        media_type: Option<String>,
    },
    Uri {
        uri: String,
        media_type: Option<String>,
    },
}

impl MediaValue {
    #[must_use]
    pub fn binary(data: Vec<u8>, media_type: Option<&str>) -> Self {
        Self::Binary {
            data,
            media_type: media_type.map(str::to_ascii_lowercase),
        }
    }

    #[must_use]
    pub fn uri(uri: impl Into<String>, media_type: Option<&str>) -> Self {
        Self::Uri {
            uri: uri.into(),
            media_type: media_type.map(str::to_ascii_lowercase),
        }
    }

    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        match self {
            Self::Binary { media_type, .. } | Self::Uri { media_type, .. } => media_type.as_deref(),
        }
    }

    /// The MIME subtype (`jpeg` for `image/jpeg`), used as the legacy TYPE.
    #[must_use]
    pub fn subtype(&self) -> Option<&str> {
        let media_type = self.media_type()?;
        Some(media_type.split_once('/').map_or(media_type, |(_, sub)| sub))
    }

    /// Formats inline data as a `data:` URI; references are returned as-is.
    #[must_use]
    pub fn to_uri(&self) -> String {
        match self {
            Self::Binary { data, media_type } => format!(
                "data:{};base64,{}",
                media_type.as_deref().unwrap_or("application/octet-stream"),
                STANDARD.encode(data)
            ),
            Self::Uri { uri, .. } => uri.clone(),
        }
    }

    /// Parses a `data:` URI carrying base64 content.
    ///
    /// Returns `None` if `uri` is not a base64 data URI or fails to decode.
    #[must_use]
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let scheme = uri.get(..5)?;
        if !scheme.eq_ignore_ascii_case("data:") {
            return None;
        }
        let (meta, payload) = uri[5..].split_once(',')?;
        let media_type = meta
            .strip_suffix(";base64")
            .or_else(|| meta.strip_suffix(";BASE64"))?;
        let data = STANDARD.decode(payload.trim()).ok()?;
        let media_type = (!media_type.is_empty()).then_some(media_type);
        Some(Self::binary(data, media_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_round_trip() {
        let media = MediaValue::binary(b"hello".to_vec(), Some("image/PNG"));
        let uri = media.to_uri();
        assert_eq!(uri, "data:image/png;base64,aGVsbG8=");
        assert_eq!(MediaValue::from_data_uri(&uri), Some(media));
    }

    #[test]
    fn non_data_uri_is_rejected() {
        assert!(MediaValue::from_data_uri("http://example.com/a.png").is_none());
        assert!(MediaValue::from_data_uri("data:text/plain,hello").is_none());
    }

    #[test]
    fn subtype_of_media_type() {
        let media = MediaValue::uri("http://example.com/a.jpg", Some("image/jpeg"));
        assert_eq!(media.subtype(), Some("jpeg"));
        assert_eq!(MediaValue::uri("x", None).subtype(), None);
    }
}
