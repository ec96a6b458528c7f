//! Timeline layout: turns the ordered rows into a renderer-agnostic draw plan.
//!
//! The plan says where every bar goes and what color it is; it does not know
//! how it will be drawn. The terminal chart in `tui::chart` is one consumer,
//! `gantt plan` dumping it as JSON is another.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::flatten::FlatTask;
use crate::palette::{self, Rgb, OVERLAY, TAB20C};

/// Opacity of a top-level task's bar.
pub const ROOT_OPACITY: f32 = 1.0;
/// Subtask bars are drawn fainter than their parents.
pub const SUBTASK_OPACITY: f32 = 0.6;
/// Opacity of the progress overlay.
pub const OVERLAY_OPACITY: f32 = 0.5;

/// Everything a renderer needs to draw the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawPlan {
    pub rows: Vec<Row>,
    pub axis_bounds: AxisBounds,
    pub gridlines: Vec<NaiveDate>,
    pub legend: Vec<LegendEntry>,
    pub overlay_color: Rgb,
    pub overlay_opacity: f32,
}

/// One bar on the timeline. Row `slot` occupies the band `[slot, slot + 1)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub slot: usize,
    pub task_id: Option<u64>,
    /// Task name indented two spaces per nesting level.
    pub label: String,
    pub depth: usize,
    pub responsible: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub color: Rgb,
    pub opacity: f32,
    pub progress: f64,
    /// Length in days of the progress overlay, which starts at `start`.
    /// Absent when the task has no progress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_width: Option<f64>,
}

impl Row {
    /// Overlay length in days, zero when there is no overlay.
    pub fn overlay_days(&self) -> f64 {
        self.overlay_width.unwrap_or(0.0)
    }
}

/// Inclusive date range shown on the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AxisBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl AxisBounds {
    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.max - self.min).num_days() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
}

/// Lay out rows using the default `tab20c` palette.
pub fn layout(flat: &[FlatTask<'_>]) -> Result<DrawPlan> {
    layout_with(flat, &TAB20C)
}

/// Lay out rows, coloring responsible parties from `colors`.
///
/// Parties are enumerated in sorted order; the same order drives both the
/// color assignment and the legend.
pub fn layout_with(flat: &[FlatTask<'_>], colors: &[Rgb]) -> Result<DrawPlan> {
    if flat.is_empty() || colors.is_empty() {
        return Err(Error::EmptyTimeline);
    }

    let parties: BTreeSet<&str> = flat.iter().map(|f| f.task.responsible.as_str()).collect();
    let legend: Vec<LegendEntry> = parties
        .iter()
        .zip(palette::sample(colors, parties.len()))
        .map(|(label, color)| LegendEntry {
            label: label.to_string(),
            color,
        })
        .collect();
    let color_of: HashMap<&str, Rgb> = legend.iter().map(|e| (e.label.as_str(), e.color)).collect();

    let rows = flat
        .iter()
        .enumerate()
        .map(|(slot, f)| {
            let task = f.task;
            let overlay_width = (task.progress > 0.0)
                .then(|| task.duration_days() as f64 * task.progress / 100.0);
            Row {
                slot,
                task_id: task.id,
                label: format!("{}{}", "  ".repeat(f.depth), task.name),
                depth: f.depth,
                responsible: task.responsible.clone(),
                start: task.start_date,
                end: task.end_date,
                color: color_of[task.responsible.as_str()],
                opacity: if task.is_subtask() { SUBTASK_OPACITY } else { ROOT_OPACITY },
                progress: task.progress,
                overlay_width,
            }
        })
        .collect::<Vec<_>>();

    let earliest = rows.iter().map(|r| r.start).min().unwrap_or(rows[0].start);
    let latest = rows.iter().map(|r| r.end).max().unwrap_or(rows[0].end);
    let axis_bounds = AxisBounds {
        min: earliest.pred_opt().unwrap_or(earliest),
        max: latest.succ_opt().unwrap_or(latest),
    };
    let gridlines = axis_bounds
        .min
        .iter_days()
        .take_while(|d| *d <= axis_bounds.max)
        .collect();

    Ok(DrawPlan {
        rows,
        axis_bounds,
        gridlines,
        legend,
        overlay_color: OVERLAY,
        overlay_opacity: OVERLAY_OPACITY,
    })
}
