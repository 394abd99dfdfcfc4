use crate::domain::model::{Location, MapEntry, MapView, DOWNTOWN_SEATTLE};
use crate::domain::ports::Renderer;
use crate::utils::error::Result;
use serde::Serialize;
use std::fmt::Write;

const LEAFLET_VERSION: &str = "1.9.4";
const CARTO_POSITRON_TILES: &str = "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png";
const CARTO_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>";

#[derive(Debug, Serialize)]
struct MarkerJs {
    lat: f64,
    lng: f64,
    color: &'static str,
    tooltip: String,
    popup: String,
}

/// Self-contained Leaflet page: user marker, one marker per center and a
/// nearest-first list next to the map.
#[derive(Debug, Clone)]
pub struct HtmlMapRenderer {
    title: String,
    zoom: u8,
    default_center: Location,
    tiles_url: String,
    attribution: String,
}

impl Default for HtmlMapRenderer {
    fn default() -> Self {
        Self {
            title: "Seattle Cool Finder".to_string(),
            zoom: 12,
            default_center: DOWNTOWN_SEATTLE,
            tiles_url: CARTO_POSITRON_TILES.to_string(),
            attribution: CARTO_ATTRIBUTION.to_string(),
        }
    }
}

impl HtmlMapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    /// Where the map is centered when the view carries no user location.
    pub fn with_default_center(mut self, center: Location) -> Self {
        self.default_center = center;
        self
    }

    fn markers(view: &MapView<'_>) -> Vec<MarkerJs> {
        view.entries
            .iter()
            .map(|entry| MarkerJs {
                lat: entry.center.location.latitude,
                lng: entry.center.location.longitude,
                color: if entry.open_now { "green" } else { "red" },
                tooltip: escape_html(&format!(
                    "{} ({})",
                    entry.center.name,
                    status_word(entry)
                )),
                popup: center_popup(entry),
            })
            .collect()
    }

    fn list_html(view: &MapView<'_>) -> String {
        let mut html = String::from("<ol class=\"centers\">\n");
        for entry in &view.entries {
            let distance = entry
                .distance_miles()
                .map(|miles| format!(" ({:.1} mi)", miles))
                .unwrap_or_default();
            let _ = writeln!(
                html,
                "<li class=\"{}\"><strong>{}</strong>{}<br><small>{}</small><br><small>{} &middot; {}</small></li>",
                if entry.open_now { "open" } else { "closed" },
                escape_html(&entry.center.name),
                distance,
                escape_html(&entry.center.address),
                escape_html(entry.center.kind.label()),
                status_word(entry),
            );
        }
        html.push_str("</ol>");
        html
    }
}

impl Renderer for HtmlMapRenderer {
    fn render(&self, view: &MapView<'_>) -> Result<String> {
        let center = view.origin.unwrap_or(self.default_center);
        let markers = script_json(&Self::markers(view))?;
        let user = match view.origin {
            Some(origin) => script_json(&[origin.latitude, origin.longitude])?,
            None => "null".to_string(),
        };
        let heading = if view.origin.is_some() {
            "Nearby Cooling Centers"
        } else {
            "All Cooling Centers"
        };
        let notice = view
            .notice
            .as_deref()
            .map(|n| format!("<div class=\"notice\">{}</div>\n", escape_html(n)))
            .unwrap_or_default();
        let list = if view.entries.is_empty() {
            "<p>No cooling centers to show.</p>".to_string()
        } else {
            Self::list_html(view)
        };

        let mut page = String::new();
        let _ = write!(
            page,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.js"></script>
<style>
body {{ font-family: sans-serif; margin: 0; }}
header {{ padding: 0.5rem 1rem; }}
main {{ display: flex; gap: 1rem; padding: 0 1rem 1rem; }}
#map {{ flex: 2; height: 80vh; }}
aside {{ flex: 1; overflow-y: auto; max-height: 80vh; }}
.notice {{ background: #fff4e5; border: 1px solid #f0a020; padding: 0.5rem 1rem; margin: 0 1rem 1rem; }}
.centers li {{ margin-bottom: 0.75rem; }}
.centers li.closed {{ color: #777; }}
</style>
</head>
<body>
<header>
<h1>{title} &#x1F321;&#xFE0F;</h1>
<p>Find your nearest cooling center during hot weather. These locations provide air conditioning and a safe space to stay cool.</p>
</header>
{notice}<main>
<div id="map"></div>
<aside>
<h2>{heading}</h2>
{list}
</aside>
</main>
<script>
const map = L.map('map', {{ zoomControl: true }}).setView([{lat}, {lng}], {zoom});
L.control.scale().addTo(map);
L.tileLayer({tiles}, {{ attribution: {attribution}, maxZoom: 19 }}).addTo(map);
const user = {user};
if (user) {{
  L.circleMarker(user, {{ radius: 10, color: 'red', fillOpacity: 0.9 }})
    .bindTooltip('You are here')
    .bindPopup('Your Location')
    .addTo(map);
}}
const centers = {markers};
for (const c of centers) {{
  L.circleMarker([c.lat, c.lng], {{ radius: 8, color: c.color, fillOpacity: 0.7 }})
    .bindTooltip(c.tooltip)
    .bindPopup(c.popup, {{ maxWidth: 300 }})
    .addTo(map);
}}
</script>
</body>
</html>
"#,
            title = escape_html(&self.title),
            leaflet = LEAFLET_VERSION,
            notice = notice,
            heading = heading,
            list = list,
            lat = center.latitude,
            lng = center.longitude,
            zoom = self.zoom,
            tiles = script_json(&self.tiles_url)?,
            attribution = script_json(&self.attribution)?,
            user = user,
            markers = markers,
        );

        tracing::debug!("Rendered HTML map with {} markers", view.entries.len());
        Ok(page)
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}

fn status_word(entry: &MapEntry<'_>) -> &'static str {
    if entry.open_now {
        "Open"
    } else {
        "Closed"
    }
}

fn center_popup(entry: &MapEntry<'_>) -> String {
    let center = entry.center;
    let hours = center
        .hours
        .lines()
        .iter()
        .map(|line| escape_html(line))
        .collect::<Vec<_>>()
        .join("<br>");
    let features = if center.features.is_empty() {
        "No features listed".to_string()
    } else {
        center
            .features
            .iter()
            .map(|f| format!("&bull; {}", escape_html(f)))
            .collect::<Vec<_>>()
            .join("<br>")
    };
    let distance = entry
        .distance_miles()
        .map(|miles| format!("{:.1} miles", miles))
        .unwrap_or_else(|| "N/A".to_string());
    let status = if entry.open_now {
        "&#x1F7E2; Open"
    } else {
        "&#x1F534; Closed"
    };
    let notes = center
        .notes
        .as_deref()
        .map(|n| format!("<p><b>Notes:</b><br>{}</p>", escape_html(n)))
        .unwrap_or_default();

    format!(
        "<div style=\"min-width: 200px; max-width: 400px;\">\
         <h4>{}</h4>\
         <p><b>Address:</b><br>{}</p>\
         <p><b>Type:</b> {}</p>\
         <p><b>Hours:</b><br>{}</p>\
         <p><b>Features:</b><br>{}</p>\
         <p><b>Distance:</b> {}</p>\
         <p><b>Status:</b> {}</p>\
         {}</div>",
        escape_html(&center.name),
        escape_html(&center.address),
        escape_html(center.kind.label()),
        hours,
        features,
        distance,
        status,
        notes,
    )
}

/// JSON safe to inline inside a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hours::Hours;
    use crate::domain::model::{Center, CenterType};
    use chrono::NaiveDate;

    fn center(id: &str, name: &str, open: bool) -> Center {
        Center {
            id: id.to_string(),
            name: name.to_string(),
            address: "1000 4th Ave, Seattle".to_string(),
            location: Location {
                latitude: 47.6067,
                longitude: -122.3325,
            },
            kind: CenterType::Library,
            hours: if open { Hours::AlwaysOpen } else { Hours::Closed },
            features: vec!["Air conditioning".to_string()],
            notes: Some("Bring water".to_string()),
        }
    }

    fn view<'a>(centers: &'a [Center], origin: Option<Location>) -> MapView<'a> {
        let at = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        MapView {
            origin,
            entries: centers
                .iter()
                .enumerate()
                .map(|(i, center)| MapEntry {
                    center,
                    distance_m: origin.map(|_| 1609.344 * (i as f64 + 1.0)),
                    open_now: center.hours.is_open_at(at),
                })
                .collect(),
            reference_time: at,
            notice: None,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>Tom & Jerry's \"hall\"</b>"),
            "&lt;b&gt;Tom &amp; Jerry&#39;s &quot;hall&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_script_json_cannot_close_script_tag() {
        let json = script_json("</script><script>alert(1)").unwrap();
        assert!(!json.contains("</script>"));
    }

    #[test]
    fn test_renders_user_marker_and_ordered_list() {
        let centers = vec![
            center("1", "Nearest Library", true),
            center("2", "Second Hall", false),
        ];
        let origin = Location {
            latitude: 47.6062,
            longitude: -122.3321,
        };
        let html = HtmlMapRenderer::new()
            .render(&view(&centers, Some(origin)))
            .unwrap();

        assert!(html.contains("const user = [47.6062,-122.3321];"));
        assert!(html.contains("Nearby Cooling Centers"));
        let first = html.find("<strong>Nearest Library</strong>").unwrap();
        let second = html.find("<strong>Second Hall</strong>").unwrap();
        assert!(first < second);
        assert!(html.contains("(1.0 mi)"));
        assert!(html.contains("(2.0 mi)"));
        assert!(html.contains("\"color\":\"green\""));
        assert!(html.contains("\"color\":\"red\""));
        assert!(html.contains("Nearest Library (Open)"));
    }

    #[test]
    fn test_unranked_view_has_no_user_marker() {
        let centers = vec![center("1", "Library", true)];
        let html = HtmlMapRenderer::new()
            .render(&view(&centers, None).with_notice("Could not resolve address"))
            .unwrap();

        assert!(html.contains("const user = null;"));
        assert!(html.contains("All Cooling Centers"));
        assert!(html.contains("<div class=\"notice\">Could not resolve address</div>"));
        assert!(html.contains("setView([47.6062, -122.3321], 12)"));
    }

    #[test]
    fn test_catalog_text_is_escaped() {
        let centers = vec![center("1", "<script>alert('x')</script>", true)];
        let html = HtmlMapRenderer::new().render(&view(&centers, None)).unwrap();

        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_popup_contents() {
        let centers = vec![center("1", "Central Library", false)];
        let view = view(&centers, None);
        let popup = center_popup(&view.entries[0]);

        assert!(popup.contains("<h4>Central Library</h4>"));
        assert!(popup.contains("<b>Type:</b> Library"));
        assert!(popup.contains("&bull; Air conditioning"));
        assert!(popup.contains("<b>Distance:</b> N/A"));
        assert!(popup.contains("Closed"));
        assert!(popup.contains("Bring water"));
    }
}
