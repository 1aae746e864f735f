//! GPX waypoint files for trails.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::persist::{self, Artifact};

const CREATOR: &str = "NE E-Bike and PEV Community";
const SITE_URL: &str = "https://sparkbot207-del.github.io/ne-ebike-pev/";
const SITE_TITLE: &str = "NE E-Bike and PEV";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Trail {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailhead_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailhead_lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpx_file: Option<String>,
    /// Fields the site uses that GPX generation does not touch.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TrailsDocument {
    pub trails: Vec<Trail>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Outcome of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Generated {
    pub files: Vec<String>,
}

/// Render the waypoint document for one trail.
pub(crate) fn render(trail: &Trail, timestamp: DateTime<Utc>) -> String {
    let name = escape(&trail.name);
    let description = escape(trail.description.as_deref().unwrap_or_default());
    let time = timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
    let trailhead_lat = trail.trailhead_lat.unwrap_or(trail.lat);
    let trailhead_lng = trail.trailhead_lng.unwrap_or(trail.lng);
    let center_lat = trail.lat;
    let center_lng = trail.lng;

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="{CREATOR}"
     xmlns="http://www.topografix.com/GPX/1/1"
     xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
     xsi:schemaLocation="http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd">
  <metadata>
    <name>{name}</name>
    <desc>{description}</desc>
    <author>
      <name>{CREATOR}</name>
      <link href="{SITE_URL}">
        <text>{SITE_TITLE}</text>
      </link>
    </author>
    <time>{time}</time>
  </metadata>
  <wpt lat="{trailhead_lat}" lon="{trailhead_lng}">
    <name>{name} - Trailhead</name>
    <desc>Start point for {name}</desc>
    <sym>Trailhead</sym>
  </wpt>
  <wpt lat="{center_lat}" lon="{center_lng}">
    <name>{name} - Center</name>
    <desc>{description}</desc>
    <sym>Trail</sym>
  </wpt>
</gpx>
"#
    )
}

/// File stem for a trail id, keeping only `[A-Za-z0-9_-]`.
pub(crate) fn file_stem(id: &str) -> String {
    id.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                ch
            } else {
                '-'
            }
        })
        .collect()
}

/// Hands out `<stem>.gpx` names, suffixing `-2`, `-3`, ... when two trail ids
/// sanitize to the same stem.
#[derive(Debug, Default)]
struct FileNames {
    taken: BTreeSet<String>,
}

impl FileNames {
    fn claim(&mut self, id: &str) -> String {
        let stem = file_stem(id);
        let mut candidate = format!("{stem}.gpx");
        let mut suffix = 2_u32;
        while self.taken.contains(&candidate) {
            candidate = format!("{stem}-{suffix}.gpx");
            suffix += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Write one GPX file per trail into `out_dir` and record the file on each trail.
pub(crate) fn generate(
    trails_path: &Path,
    out_dir: &Path,
    now: DateTime<Utc>,
) -> Result<Generated> {
    let text = fs::read_to_string(trails_path)
        .with_context(|| format!("Failed to read trails from {}", trails_path.display()))?;
    let mut document: TrailsDocument = serde_json::from_str(&text)
        .with_context(|| format!("Invalid trails document {}", trails_path.display()))?;

    info!(trails = document.trails.len(), "loaded trails");

    let link_dir = out_dir.to_string_lossy().trim_end_matches('/').to_owned();
    let mut artifacts = Vec::with_capacity(document.trails.len() + 1);
    let mut files = Vec::with_capacity(document.trails.len());
    let mut names = FileNames::default();

    for trail in &mut document.trails {
        let file = names.claim(&trail.id);
        artifacts.push(Artifact::text(out_dir.join(&file), render(trail, now)));
        trail.gpx_file = Some(format!("{link_dir}/{file}"));
        debug!(trail = %trail.id, file = %file, "rendered GPX");
        files.push(file);
    }

    document.metadata.insert(
        "lastUpdated".to_owned(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    document
        .metadata
        .insert("gpxGenerated".to_owned(), Value::Bool(true));
    artifacts.push(Artifact::json(trails_path, &document)?);

    persist::write_all(&artifacts)?;

    info!(files = files.len(), dir = %out_dir.display(), "generated GPX files");
    Ok(Generated { files })
}
