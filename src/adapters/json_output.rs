use crate::domain::hours::Hours;
use crate::domain::model::{CenterType, Location, MapView};
use crate::domain::ports::Renderer;
use crate::utils::error::Result;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonView<'a> {
    origin: Option<Location>,
    reference_time: NaiveDateTime,
    notice: Option<&'a str>,
    centers: Vec<JsonCenter<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonCenter<'a> {
    rank: usize,
    id: &'a str,
    name: &'a str,
    address: &'a str,
    #[serde(rename = "type")]
    kind: CenterType,
    location: Location,
    hours: &'a Hours,
    features: &'a [String],
    notes: Option<&'a str>,
    distance_m: Option<f64>,
    distance_miles: Option<f64>,
    open_now: bool,
}

/// Machine-readable output, entries in display order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl Renderer for JsonRenderer {
    fn render(&self, view: &MapView<'_>) -> Result<String> {
        let output = JsonView {
            origin: view.origin,
            reference_time: view.reference_time,
            notice: view.notice.as_deref(),
            centers: view
                .entries
                .iter()
                .enumerate()
                .map(|(index, entry)| JsonCenter {
                    rank: index + 1,
                    id: &entry.center.id,
                    name: &entry.center.name,
                    address: &entry.center.address,
                    kind: entry.center.kind,
                    location: entry.center.location,
                    hours: &entry.center.hours,
                    features: &entry.center.features,
                    notes: entry.center.notes.as_deref(),
                    distance_m: entry.distance_m,
                    distance_miles: entry.distance_miles(),
                    open_now: entry.open_now,
                })
                .collect(),
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        Ok(json)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
