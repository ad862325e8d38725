use notion_core::{construct, DecodeError, Family, Payload, Polymorphic, Timestamp};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::file::{ExternalFile, UploadedFile};

/// A page or database icon: an emoji or an image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    Emoji(String),
    External(ExternalFile),
    File(UploadedFile),
}

static ICONS: Lazy<Family<Icon>> = Lazy::new(|| {
    Family::builder("icon", "type")
        .variant("emoji", Icon::Emoji)
        .variant("external", Icon::External)
        .variant("file", Icon::File)
        .build()
});

impl Polymorphic for Icon {
    fn family() -> &'static Family<Self> {
        &ICONS
    }

    fn tag(&self) -> &'static str {
        match self {
            Icon::Emoji(_) => "emoji",
            Icon::External(_) => "external",
            Icon::File(_) => "file",
        }
    }

    fn encode_payload(&self) -> Value {
        match self {
            Icon::Emoji(e) => Payload::encode(e),
            Icon::External(p) => p.encode(),
            Icon::File(p) => p.encode(),
        }
    }
}

impl Icon {
    pub fn emoji(emoji: impl Into<String>) -> Self {
        Icon::Emoji(emoji.into())
    }

    pub fn external(url: &str) -> Result<Self, DecodeError> {
        construct("external", ExternalFile::parse(url)?, Icon::External)
    }

    pub fn uploaded(url: &str, expiry_time: Option<Timestamp>) -> Result<Self, DecodeError> {
        construct("file", UploadedFile::parse(url, expiry_time)?, Icon::File)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emoji_is_a_scalar_payload() {
        let icon = Icon::emoji("🎯");
        assert_eq!(icon.encode(), json!({"type": "emoji", "emoji": "🎯"}));
        assert_eq!(Icon::decode(&icon.encode()).unwrap(), icon);
    }

    #[test]
    fn test_emoji_must_be_a_string() {
        let err = Icon::decode(&json!({"type": "emoji", "emoji": {"char": "x"}})).unwrap_err();
        assert_eq!(err, DecodeError::mismatch("emoji", "string", "object"));
    }

    #[test]
    fn test_file_tag_is_scoped_to_icon_family() {
        let err = Icon::decode(&json!({"type": "custom_emoji", "custom_emoji": {}})).unwrap_err();
        assert_eq!(err, DecodeError::unknown_variant("icon", "custom_emoji"));

        let icon = Icon::uploaded("https://s3.test/i.png", None).unwrap();
        assert_eq!(icon.tag(), "file");
        assert_eq!(Icon::decode(&icon.encode()).unwrap(), icon);
    }
}
