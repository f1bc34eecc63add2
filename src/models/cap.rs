//! Common Alerting Protocol (CAP) quake alerts.
//!
//! The feed is an Atom document rather than JSON, so it is decoded with
//! `quick-xml` into private mirror types and then converted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors from decoding the CAP Atom feed.
#[derive(Debug, thiserror::Error)]
pub enum CapParseError {
    #[error("malformed Atom feed: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("invalid timestamp {value:?} in <{element}>: {source}")]
    Timestamp {
        element: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// The Atom feed of current CAP quake alerts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapFeed {
    /// Feed identifier URL.
    pub id: String,
    /// Feed title.
    pub title: String,
    /// When the feed last changed.
    pub updated: DateTime<Utc>,
    /// Name of the publishing agency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Alerts in feed order.
    pub entries: Vec<CapEntry>,
}

/// One alert in the feed; `link` points at the full CAP document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapEntry {
    /// CAP identifier, passed to `Client::get_cap_alert`.
    pub id: String,
    /// Entry title.
    pub title: String,
    /// When the alert was last revised.
    pub updated: DateTime<Utc>,
    /// When the alert was first issued.
    pub published: DateTime<Utc>,
    /// Short description of the alert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// URL of the full CAP document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl CapFeed {
    /// Decodes an Atom feed document.
    ///
    /// # Examples
    ///
    /// ```
    /// use gnet::models::CapFeed;
    ///
    /// let feed = CapFeed::from_atom(r#"<?xml version="1.0" encoding="UTF-8"?>
    /// <feed xmlns="http://www.w3.org/2005/Atom">
    ///   <id>urn:feed</id>
    ///   <title>CAP quakes</title>
    ///   <updated>2024-05-01T10:00:00Z</updated>
    /// </feed>"#).unwrap();
    ///
    /// assert!(feed.is_empty());
    /// assert_eq!(feed.title, "CAP quakes");
    /// ```
    pub fn from_atom(xml: &str) -> Result<Self, CapParseError> {
        let raw: RawFeed = quick_xml::de::from_str(xml)?;
        raw.try_into()
    }

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the feed has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Deserialize)]
struct RawFeed {
    id: String,
    title: String,
    updated: String,
    #[serde(default)]
    author: Option<RawAuthor>,
    #[serde(rename = "entry", default)]
    entries: Vec<RawEntry>,
}

#[derive(Deserialize)]
struct RawAuthor {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct RawEntry {
    id: String,
    title: String,
    updated: String,
    published: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<RawLink>,
}

#[derive(Deserialize)]
struct RawLink {
    #[serde(rename = "@href")]
    href: String,
}

impl TryFrom<RawFeed> for CapFeed {
    type Error = CapParseError;

    fn try_from(raw: RawFeed) -> Result<Self, Self::Error> {
        Ok(CapFeed {
            id: raw.id.trim().to_string(),
            title: raw.title.trim().to_string(),
            updated: timestamp("updated", &raw.updated)?,
            author: raw.author.and_then(|a| a.name),
            entries: raw
                .entries
                .into_iter()
                .map(CapEntry::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl TryFrom<RawEntry> for CapEntry {
    type Error = CapParseError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        Ok(CapEntry {
            id: raw.id.trim().to_string(),
            title: raw.title.trim().to_string(),
            updated: timestamp("updated", &raw.updated)?,
            published: timestamp("published", &raw.published)?,
            summary: raw.summary,
            link: raw.links.into_iter().next().map(|link| link.href),
        })
    }
}

fn timestamp(element: &'static str, value: &str) -> Result<DateTime<Utc>, CapParseError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|source| CapParseError::Timestamp {
            element,
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>CAP quakes</title>
  <id>http://api.geonet.org.nz/cap/1.2/GPA1.0/feed/atom1.0/quake</id>
  <updated>2024-05-01T10:15:00Z</updated>
  <author>
    <name>GNS Science</name>
    <email>info@geonet.org.nz</email>
    <uri>http://geonet.org.nz</uri>
  </author>
  <entry>
    <title>Quake 2024p321000</title>
    <id>2024p321000.1714556100</id>
    <updated>2024-05-01T09:35:00Z</updated>
    <published>2024-05-01T09:30:00+12:00</published>
    <summary>Strong intensity quake near Seddon</summary>
    <link href="http://api.geonet.org.nz/cap/1.2/GPA1.0/quake/2024p321000.1714556100" rel="alternate"/>
  </entry>
  <entry>
    <title>Quake 2024p320999</title>
    <id>2024p320999.1714550000</id>
    <updated>2024-05-01T08:00:00Z</updated>
    <published>2024-05-01T08:00:00Z</published>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let feed = CapFeed::from_atom(FEED).unwrap();

        assert_eq!(feed.title, "CAP quakes");
        assert_eq!(feed.author.as_deref(), Some("GNS Science"));
        assert_eq!(feed.count(), 2);
        assert_eq!(
            feed.updated,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap()
        );

        let first = &feed.entries[0];
        assert_eq!(first.id, "2024p321000.1714556100");
        assert_eq!(
            first.published,
            Utc.with_ymd_and_hms(2024, 4, 30, 21, 30, 0).unwrap()
        );
        assert_eq!(
            first.link.as_deref(),
            Some("http://api.geonet.org.nz/cap/1.2/GPA1.0/quake/2024p321000.1714556100")
        );

        let second = &feed.entries[1];
        assert_eq!(second.summary, None);
        assert_eq!(second.link, None);
    }

    #[test]
    fn test_bad_timestamp() {
        let xml = FEED.replace("2024-05-01T10:15:00Z", "yesterday");
        let err = CapFeed::from_atom(&xml).unwrap_err();
        assert!(matches!(err, CapParseError::Timestamp { element: "updated", .. }));
    }

    #[test]
    fn test_not_xml() {
        assert!(matches!(
            CapFeed::from_atom("{\"features\": []}"),
            Err(CapParseError::Xml(_))
        ));
    }
}
