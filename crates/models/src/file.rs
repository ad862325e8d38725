//! File objects: externally hosted links and files uploaded to Notion.
//!
//! ```json
//! {"type": "external", "external": {"url": "https://x.test/a.png"}, "name": null}
//! {"type": "file", "file": {"url": "https://s3.test/a.png", "expiry_time": "2024-03-01T10:15:00Z"}}
//! ```

use notion_core::codec::{parse_http_url, Absent, EncodeMode};
use notion_core::{
    construct, DecodeError, Family, FieldReader, Object, ObjectWriter, Payload, Polymorphic,
    Record, Timestamp,
};
use once_cell::sync::Lazy;
use serde_json::Value;
use url::Url;

/// Payload of the `external` variant. The url is always http(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFile {
    url: Url,
}

impl ExternalFile {
    pub(crate) fn parse(url: &str) -> Result<Self, DecodeError> {
        Ok(Self { url: http_url(url)? })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Payload for ExternalFile {
    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        Ok(Self {
            url: r.required_url("url")?,
        })
    }

    fn encode(&self) -> Value {
        ObjectWriter::new().put("url", self.url.as_str()).finish()
    }
}

/// Payload of the `file` variant. Notion-hosted URLs are signed and stop
/// working after `expiry_time`.
///
/// ```compile_fail
/// use notion_models::UploadedFile;
///
/// let url = url::Url::parse("ftp://files.test/a.png").unwrap();
/// let file = UploadedFile { url, expiry_time: None };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    url: Url,
    expiry_time: Option<Timestamp>,
}

impl UploadedFile {
    pub(crate) fn parse(url: &str, expiry_time: Option<Timestamp>) -> Result<Self, DecodeError> {
        Ok(Self {
            url: http_url(url)?,
            expiry_time,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn expiry_time(&self) -> Option<&Timestamp> {
        self.expiry_time.as_ref()
    }
}

impl Payload for UploadedFile {
    fn decode(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        Ok(Self {
            url: r.required_url("url")?,
            expiry_time: r.optional_timestamp("expiry_time")?,
        })
    }

    fn encode(&self) -> Value {
        ObjectWriter::new()
            .put("url", self.url.as_str())
            .put_opt(
                "expiry_time",
                self.expiry_time.as_ref().map(Timestamp::as_str),
                Absent::Null,
            )
            .finish()
    }
}

/// Where a file lives. Also used on its own for page covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    External(ExternalFile),
    Uploaded(UploadedFile),
}

static FILE_SOURCES: Lazy<Family<FileSource>> = Lazy::new(|| {
    Family::builder("file object", "type")
        .variant("external", FileSource::External)
        .variant("file", FileSource::Uploaded)
        .build()
});

impl Polymorphic for FileSource {
    fn family() -> &'static Family<Self> {
        &FILE_SOURCES
    }

    fn tag(&self) -> &'static str {
        match self {
            FileSource::External(_) => "external",
            FileSource::Uploaded(_) => "file",
        }
    }

    fn encode_payload(&self) -> Value {
        match self {
            FileSource::External(p) => p.encode(),
            FileSource::Uploaded(p) => p.encode(),
        }
    }
}

impl FileSource {
    pub fn url(&self) -> &Url {
        match self {
            FileSource::External(p) => &p.url,
            FileSource::Uploaded(p) => &p.url,
        }
    }

    pub fn external(url: &str) -> Result<Self, DecodeError> {
        construct("external", ExternalFile::parse(url)?, FileSource::External)
    }

    pub fn uploaded(url: &str, expiry_time: Option<Timestamp>) -> Result<Self, DecodeError> {
        construct(
            "file",
            UploadedFile::parse(url, expiry_time)?,
            FileSource::Uploaded,
        )
    }
}

fn http_url(text: &str) -> Result<Url, DecodeError> {
    parse_http_url(text)
        .ok_or_else(|| DecodeError::mismatch("url", "http(s) url", format!("{:?}", text)))
}

/// A file reference with its optional display name, as found in `files`
/// property values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileObject {
    pub source: FileSource,
    pub name: Option<String>,
}

impl FileObject {
    /// A link to an externally hosted file.
    pub fn new_external(url: &str) -> Result<Self, DecodeError> {
        Ok(Self {
            source: FileSource::external(url)?,
            name: None,
        })
    }

    /// A reference to a Notion-hosted file.
    pub fn new_uploaded(url: &str, expiry_time: Option<Timestamp>) -> Result<Self, DecodeError> {
        Ok(Self {
            source: FileSource::uploaded(url, expiry_time)?,
            name: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Record for FileObject {
    fn decode_at(tree: &Value, path: &str) -> Result<Self, DecodeError> {
        let r = FieldReader::new(tree, path)?;
        Ok(Self {
            source: FileSource::decode_from(&r)?,
            name: r.optional_str("name")?,
        })
    }

    fn encode(&self) -> Value {
        let mut out = Object::new();
        self.source.write_into(&mut out, EncodeMode::WithDiscriminator);
        ObjectWriter::new()
            .extend(out)
            .put_opt("name", self.name.clone(), Absent::Null)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_external_factory_encodes_explicit_null_name() {
        let file = FileObject::new_external("https://x.test/a.png").unwrap();
        assert_eq!(
            file.encode(),
            json!({"type": "external", "external": {"url": "https://x.test/a.png"}, "name": null})
        );
    }

    #[test]
    fn test_decode_external() {
        let tree = json!({"type": "external", "external": {"url": "https://x.test/a.png"}});
        let file = FileObject::decode(&tree).unwrap();
        assert_eq!(file.source.url().as_str(), "https://x.test/a.png");
        assert_eq!(file.name, None);
        assert!(matches!(file.source, FileSource::External(_)));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let tree = json!({"type": "bogus", "external": {"url": "https://x.test/a.png"}});
        let err = FileObject::decode(&tree).unwrap_err();
        assert_eq!(err, DecodeError::unknown_variant("file object", "bogus"));
    }

    #[test]
    fn test_missing_payload() {
        let tree = json!({"type": "file", "name": "a.png"});
        let err = FileObject::decode(&tree).unwrap_err();
        assert_eq!(err, DecodeError::missing_payload("file object", "file"));
    }

    #[test]
    fn test_uploaded_round_trip() {
        let expiry = Timestamp::parse("2024-03-01T10:15:00.000Z");
        let file = FileObject::new_uploaded("https://s3.test/a.png?sig=1", expiry)
            .unwrap()
            .with_name("a.png");
        let encoded = file.encode();
        assert_eq!(encoded["file"]["expiry_time"], "2024-03-01T10:15:00Z");
        assert_eq!(encoded["name"], "a.png");
        assert_eq!(FileObject::decode(&encoded).unwrap(), file);
    }

    #[test]
    fn test_uploaded_without_expiry_writes_null() {
        let file = FileObject::new_uploaded("https://s3.test/a.png", None).unwrap();
        assert_eq!(file.encode()["file"], json!({"url": "https://s3.test/a.png", "expiry_time": null}));
    }

    #[test]
    fn test_bad_url_reports_payload_path() {
        let tree = json!({"type": "external", "external": {"url": "not a url"}});
        let err = FileObject::decode(&tree).unwrap_err();
        assert_eq!(
            err,
            DecodeError::mismatch("external.url", "http(s) url", "\"not a url\"")
        );
        assert!(FileObject::new_external("mailto:a@b.test").is_err());
    }

    #[test]
    fn test_payload_accessors() {
        let expiry = Timestamp::parse("2024-03-01T10:15:00Z");
        let source = FileSource::uploaded("https://s3.test/a.png", expiry.clone()).unwrap();
        match source {
            FileSource::Uploaded(file) => {
                assert_eq!(file.url().as_str(), "https://s3.test/a.png");
                assert_eq!(file.expiry_time(), expiry.as_ref());
            }
            other => panic!("expected uploaded file, got {:?}", other),
        }
        assert!(ExternalFile::parse("ftp://files.test/a.png").is_err());
    }

    #[test]
    fn test_bad_expiry_time() {
        let tree = json!({"type": "file", "file": {"url": "https://s3.test/a", "expiry_time": "soon"}});
        let err = FileObject::decode(&tree).unwrap_err();
        assert_eq!(
            err,
            DecodeError::mismatch("file.expiry_time", "RFC 3339 timestamp", "\"soon\"")
        );
    }
}
