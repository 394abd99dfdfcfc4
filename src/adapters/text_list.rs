use crate::domain::model::{MapEntry, MapView};
use crate::domain::ports::Renderer;
use crate::utils::error::Result;
use std::fmt::Write;

/// Plain-text listing for terminals, nearest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextListRenderer;

impl TextListRenderer {
    fn write_entry(out: &mut String, rank: usize, entry: &MapEntry<'_>) {
        let center = entry.center;
        let distance = entry
            .distance_miles()
            .map(|miles| format!(" ({:.1} mi)", miles))
            .unwrap_or_default();

        let _ = writeln!(out, "{}. 🏢 {}{}", rank, center.name, distance);
        let _ = writeln!(out, "   📍 Address: {}", center.address);
        let _ = writeln!(out, "   ⏰ Hours: {}", center.hours);
        let _ = writeln!(out, "   🏷️ Type: {}", center.kind);
        if !center.features.is_empty() {
            let _ = writeln!(out, "   ✨ Features: {}", center.features.join(", "));
        }
        if let Some(notes) = &center.notes {
            let _ = writeln!(out, "   📝 Notes: {}", notes);
        }
        let status = if entry.open_now { "🟢 Open" } else { "🔴 Closed" };
        let _ = writeln!(out, "   Status: {}", status);
    }
}

impl Renderer for TextListRenderer {
    fn render(&self, view: &MapView<'_>) -> Result<String> {
        let mut out = String::new();

        if let Some(notice) = &view.notice {
            let _ = writeln!(out, "⚠️ {}\n", notice);
        }
        match view.origin {
            Some(origin) => {
                let _ = writeln!(out, "Nearby Cooling Centers (from {})\n", origin);
            }
            None => {
                let _ = writeln!(out, "All Cooling Centers\n");
            }
        }

        if view.entries.is_empty() {
            out.push_str("No cooling centers found matching your criteria.\n");
        }
        for (index, entry) in view.entries.iter().enumerate() {
            Self::write_entry(&mut out, index + 1, entry);
            out.push('\n');
        }

        Ok(out)
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}
