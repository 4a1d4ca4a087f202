use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};
use rusty_smith::plot::{trace_points, Metric};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// S-parameter plot (central panel)
// ---------------------------------------------------------------------------

/// Render the selected pairs in the central panel.
pub fn sparam_plot(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view S-parameters  (File → Open…)");
        });
        return;
    }

    let metric = state.metric;
    let mut plot = Plot::new("sparam_plot")
        .legend(Legend::default())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    plot = if metric == Metric::Smith {
        plot.data_aspect(1.0)
            .include_x(-1.0)
            .include_x(1.0)
            .include_y(-1.0)
            .include_y(1.0)
            .x_axis_label("re")
            .y_axis_label("im")
    } else {
        plot.x_axis_label("freq[MHz]").y_axis_label(metric.name())
    };

    plot.show(ui, |plot_ui| {
        if metric == Metric::Smith {
            let circle: PlotPoints = (0..=360)
                .map(|deg| {
                    let a = f64::from(deg).to_radians();
                    [a.cos(), a.sin()]
                })
                .collect();
            plot_ui.line(Line::new(circle).color(Color32::GRAY).width(1.0));
        }

        for &pair in &state.selected_pairs {
            let color = state.pair_color(pair);
            let name = pair.to_string();

            // Undefined values split the trace into separate segments.
            let points = trace_points(&state.visible_rows, pair, metric);
            for segment in points.split(Option::is_none) {
                if segment.is_empty() {
                    continue;
                }
                let series: PlotPoints = segment
                    .iter()
                    .flatten()
                    .map(|&(x, y)| [x, y])
                    .collect();
                plot_ui.line(Line::new(series).name(&name).color(color).width(1.5));
            }
        }
    });
}
