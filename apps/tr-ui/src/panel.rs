//! One parameter curve rendered as an interactive plot panel.

use egui_plot::{Line, MarkerShape, Plot, PlotBounds, PlotPoints, Points};
use tr_model::ViewBounds;

/// Snapshot of everything a panel draws in one frame.
pub struct PanelData {
    pub name: String,
    pub unit: String,
    pub x_label: String,
    pub points: Vec<[f64; 2]>,
    pub bounds: ViewBounds,
    pub focused: bool,
}

/// Pointer activity collected from one panel in one frame, in data
/// coordinates.
#[derive(Debug, Default)]
pub struct PanelEvents {
    pub clicked: bool,
    pub drag_started_x: Option<f64>,
    pub dragged: bool,
    pub drag_stopped: bool,
    pub double_click_x: Option<f64>,
    /// Pointer height in data units, `None` while the pointer is outside
    /// the plot area.
    pub pointer_y: Option<f64>,
}

pub fn show(ui: &mut egui::Ui, data: &PanelData, height: f32) -> PanelEvents {
    if data.focused {
        ui.strong(&data.name);
    } else {
        ui.label(&data.name);
    }

    let y_label = if data.unit.is_empty() {
        data.name.clone()
    } else {
        format!("{} ({})", data.name, data.unit)
    };

    // The axis windows are model state, so the plot's own pan/zoom stays off
    // and the bounds are pinned every frame.
    let response = Plot::new(format!("panel_{}", data.name))
        .height(height)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .allow_double_click_reset(false)
        .x_axis_label(data.x_label.clone())
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [data.bounds.x_min, data.bounds.y_min],
                [data.bounds.x_max, data.bounds.y_max],
            ));
            plot_ui.line(Line::new(PlotPoints::from(data.points.clone())).name(&data.name));
            plot_ui.points(
                Points::new(data.points.clone())
                    .shape(MarkerShape::Circle)
                    .radius(4.0),
            );
            let inside = plot_ui
                .ctx()
                .pointer_latest_pos()
                .is_some_and(|pos| plot_ui.response().rect.contains(pos));
            (plot_ui.pointer_coordinate(), inside)
        });

    let (pointer, inside) = response.inner;
    let r = &response.response;
    let mut events = PanelEvents {
        clicked: r.clicked(),
        dragged: r.dragged(),
        drag_stopped: r.drag_stopped(),
        ..PanelEvents::default()
    };
    if r.drag_started() {
        events.drag_started_x = pointer.map(|p| p.x);
    }
    if r.double_clicked() {
        events.double_click_x = pointer.map(|p| p.x);
    }
    if inside {
        events.pointer_y = pointer.map(|p| p.y);
    }
    events
}
