use chrono::{Datelike, NaiveDate};
use eframe::egui::{
    self, Align2, Color32, FontId, RichText, Sense, Shape, Stroke, Ui, Vec2,
};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

use crate::data::aggregate::{self, Aggregate, AggregationResult};
use crate::data::kpi;
use crate::data::model::{AMOUNT_COLUMN, Value};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – KPI strip and charts over the filtered view
// ---------------------------------------------------------------------------

/// Render the dashboard body. Everything is recomputed from the filtered
/// indices on each frame; filtering to zero rows just yields empty charts.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a challan CSV to begin  (File → Open…)");
            });
            return;
        }
    };

    let Some(measure) = state.measure_column.clone() else {
        ui.label("No numeric column available.");
        return;
    };
    let indices = &state.visible_indices;
    let schema = &state.schema;

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- KPI strip ----
            ui.heading("Key Performance Indicators");
            let kpis = kpi::compute(dataset, indices, schema, &measure);
            ui.columns(4, |cols| {
                metric(&mut cols[0], &format!("Total {measure}"), fmt_number(kpis.total));
                metric(&mut cols[1], "Average", fmt_number(kpis.average));
                metric(&mut cols[2], "Maximum", fmt_number(kpis.maximum));
                metric(
                    &mut cols[3],
                    "Growth",
                    format!("{:+.1} %", kpis.growth_or_zero()),
                );
            });
            ui.separator();

            // ---- Daily trend (line) ----
            let trend = aggregate::series_by_date(dataset, indices, schema, &measure);
            if !trend.is_empty() {
                ui.strong(format!("Daily {measure} trend"));
                date_series_plot(ui, "trend_plot", &trend, Color32::LIGHT_BLUE, false);
            }

            // ---- Top-N categories (bar) ----
            if let Some(cat_col) = schema.category.clone() {
                let ranked = aggregate::group_measure(
                    dataset,
                    indices,
                    &cat_col,
                    &measure,
                    Aggregate::Sum,
                )
                .top_n(state.top_n);

                if !ranked.groups.is_empty() {
                    ui.add_space(8.0);
                    ui.strong(format!("Top {} {cat_col} by {measure}", state.top_n));
                    category_bar_plot(ui, state, &ranked);

                    ui.add_space(8.0);
                    ui.strong("Share by category");
                    pie_chart(ui, state, &ranked);
                }
            }

            // ---- Revenue over time (area) ----
            if dataset.has_column(AMOUNT_COLUMN) {
                let revenue =
                    aggregate::series_by_date(dataset, indices, schema, AMOUNT_COLUMN);
                if !revenue.is_empty() {
                    ui.add_space(8.0);
                    ui.strong("Revenue over time");
                    date_series_plot(
                        ui,
                        "revenue_plot",
                        &revenue,
                        Color32::from_rgb(120, 200, 120),
                        true,
                    );
                }
            }

            // ---- Count vs amount (scatter) ----
            scatter_plot(ui, state);

            // ---- Weekday × category heatmap ----
            if schema.date.is_some() && schema.category.is_some() {
                ui.add_space(8.0);
                ui.strong(format!("{measure} by weekday"));
                weekday_heatmap(ui, state, &measure);
            }
        });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small().weak());
        ui.label(RichText::new(value).size(22.0).strong());
    });
}

fn fmt_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

// ---------------------------------------------------------------------------
// Date-indexed line / area plots
// ---------------------------------------------------------------------------

fn days_since_epoch(d: NaiveDate) -> f64 {
    d.num_days_from_ce() as f64
}

fn date_label(days: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(days.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn date_series_plot(
    ui: &mut Ui,
    id: &str,
    series: &[(NaiveDate, f64)],
    color: Color32,
    filled: bool,
) {
    let points: PlotPoints = series
        .iter()
        .map(|&(d, v)| [days_since_epoch(d), v])
        .collect();

    let mut line = Line::new(points).color(color).width(1.5);
    if filled {
        line = line.fill(0.0);
    }

    Plot::new(id)
        .height(220.0)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .x_axis_formatter(|mark, _range| date_label(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}

// ---------------------------------------------------------------------------
// Top-N bar chart
// ---------------------------------------------------------------------------

fn category_bar_plot(ui: &mut Ui, state: &AppState, ranked: &AggregationResult) {
    let bars: Vec<Bar> = ranked
        .groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let color = state
                .color_map
                .as_ref()
                .map(|cm| cm.color_for(&g.label))
                .unwrap_or(Color32::LIGHT_BLUE);
            Bar::new(i as f64, g.value).name(&g.label).fill(color)
        })
        .collect();

    let labels: Vec<String> = ranked.groups.iter().map(|g| g.label.clone()).collect();

    Plot::new("category_bars")
        .height(220.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as isize;
            if i >= 0 && (mark.value - i as f64).abs() < 1e-6 {
                labels.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Pie chart (painter-drawn; egui_plot has no pie primitive)
// ---------------------------------------------------------------------------

fn pie_chart(ui: &mut Ui, state: &AppState, ranked: &AggregationResult) {
    let total: f64 = ranked.groups.iter().map(|g| g.value.max(0.0)).sum();
    if total <= 0.0 {
        return;
    }

    let size = Vec2::new(ui.available_width().min(480.0), 220.0);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);

    let radius = rect.height() * 0.45;
    let center = egui::pos2(rect.left() + radius + 10.0, rect.center().y);

    let mut angle = -std::f64::consts::FRAC_PI_2;
    let mut legend_y = rect.top() + 12.0;

    for g in &ranked.groups {
        let frac = (g.value.max(0.0) / total).clamp(0.0, 1.0);
        let sweep = frac * std::f64::consts::TAU;
        let color = state
            .color_map
            .as_ref()
            .map(|cm| cm.color_for(&g.label))
            .unwrap_or(Color32::GRAY);

        // Sector as a fan of short arc segments.
        let steps = ((sweep / 0.08).ceil() as usize).max(2);
        let mut pts = vec![center];
        for k in 0..=steps {
            let a = angle + sweep * k as f64 / steps as f64;
            pts.push(center + radius * Vec2::angled(a as f32));
        }
        painter.add(Shape::convex_polygon(pts, color, Stroke::NONE));
        angle += sweep;

        painter.text(
            egui::pos2(center.x + radius + 24.0, legend_y),
            Align2::LEFT_CENTER,
            format!("{}  ({:.1} %)", g.label, frac * 100.0),
            FontId::proportional(13.0),
            color,
        );
        legend_y += 18.0;
    }
}

// ---------------------------------------------------------------------------
// Count vs amount scatter
// ---------------------------------------------------------------------------

fn scatter_plot(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    let count_col = crate::data::model::COUNT_COLUMN;
    let amount_col = AMOUNT_COLUMN;
    if !dataset.has_column(count_col) || !dataset.has_column(amount_col) {
        return;
    }

    let pts: Vec<[f64; 2]> = state
        .visible_indices
        .iter()
        .filter_map(|&i| dataset.records.get(i))
        .filter_map(|rec| Some([rec.number(count_col)?, rec.number(amount_col)?]))
        .collect();
    if pts.is_empty() {
        return;
    }

    ui.add_space(8.0);
    ui.strong("Challan count vs total amount");
    Plot::new("count_amount_scatter")
        .height(220.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(pts))
                    .radius(2.5)
                    .color(Color32::GOLD),
            );
        });
}

// ---------------------------------------------------------------------------
// Weekday × category heatmap
// ---------------------------------------------------------------------------

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn weekday_heatmap(ui: &mut Ui, state: &AppState, measure: &str) {
    let (Some(dataset), Some(date_col), Some(cat_col)) = (
        &state.dataset,
        state.schema.date.as_deref(),
        state.schema.category.as_deref(),
    ) else {
        return;
    };

    // Row per category (observed order), column per weekday.
    let categories: Vec<String> = dataset.labels(cat_col);
    if categories.is_empty() {
        return;
    }
    let row_of = |label: &str| categories.iter().position(|c| c == label);

    let mut cells = vec![[0.0f64; 7]; categories.len()];
    for &i in &state.visible_indices {
        let Some(rec) = dataset.records.get(i) else {
            continue;
        };
        let (Some(d), Some(v)) = (rec.date(date_col), rec.number(measure)) else {
            continue;
        };
        let label = rec.get(cat_col).map(Value::to_string).unwrap_or_default();
        if let Some(row) = row_of(&label) {
            cells[row][d.weekday().num_days_from_monday() as usize] += v;
        }
    }

    let max = cells
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |m, &v| m.max(v));
    if max <= 0.0 {
        return;
    }

    let label_w = 110.0;
    let cell_h = 22.0;
    let header_h = 18.0;
    let size = Vec2::new(
        ui.available_width().min(560.0),
        header_h + cell_h * categories.len() as f32 + 4.0,
    );
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let cell_w = (rect.width() - label_w) / 7.0;

    for (col, day) in WEEKDAYS.iter().enumerate() {
        painter.text(
            egui::pos2(
                rect.left() + label_w + cell_w * (col as f32 + 0.5),
                rect.top() + header_h * 0.5,
            ),
            Align2::CENTER_CENTER,
            *day,
            FontId::proportional(12.0),
            ui.visuals().text_color(),
        );
    }

    for (row, label) in categories.iter().enumerate() {
        let y = rect.top() + header_h + cell_h * row as f32;
        painter.text(
            egui::pos2(rect.left(), y + cell_h * 0.5),
            Align2::LEFT_CENTER,
            label,
            FontId::proportional(12.0),
            ui.visuals().text_color(),
        );
        for col in 0..7 {
            let t = (cells[row][col] / max) as f32;
            let cell = egui::Rect::from_min_size(
                egui::pos2(rect.left() + label_w + cell_w * col as f32, y),
                Vec2::new(cell_w - 2.0, cell_h - 2.0),
            );
            painter.rect_filled(cell, egui::CornerRadius::same(2), heat_color(t));
        }
    }
}

/// Dark-to-amber ramp for heatmap intensities in `[0, 1]`.
fn heat_color(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
    Color32::from_rgb(lerp(40, 255), lerp(40, 160), lerp(48, 0))
}
