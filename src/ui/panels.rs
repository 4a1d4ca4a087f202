use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_smith::data::export::write_csv_file;
use rusty_smith::data::model::MAX_PORTS;
use rusty_smith::data::variant::FormatVariant;
use rusty_smith::plot::Metric;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – reading and display widgets
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            reading_section(ui, state);
            ui.separator();

            ui.heading("Display");
            ui.separator();

            // ---- Metric selector ----
            ui.strong("Metric");
            egui::ComboBox::from_id_salt("metric")
                .selected_text(state.metric.name())
                .show_ui(ui, |ui: &mut Ui| {
                    for metric in Metric::ALL {
                        ui.selectable_value(&mut state.metric, metric, metric.name());
                    }
                });
            ui.separator();

            let Some(pairs) = state.dataset.as_ref().map(|ds| ds.pairs()) else {
                ui.label("No dataset loaded.");
                return;
            };

            // ---- Frequency window ----
            ui.strong("Frequency [MHz]");
            let mut changed = false;
            ui.horizontal(|ui: &mut Ui| {
                changed |= ui
                    .add(egui::DragValue::new(&mut state.range.min_mhz).speed(1.0).prefix("min "))
                    .changed();
                changed |= ui
                    .add(egui::DragValue::new(&mut state.range.max_mhz).speed(1.0).prefix("max "))
                    .changed();
            });
            if ui.small_button("Full span").clicked() {
                if let Some((lo, hi)) = state.dataset.as_ref().and_then(|ds| ds.frequency_span()) {
                    state.range.min_mhz = lo;
                    state.range.max_mhz = hi;
                    changed = true;
                }
            }
            if changed {
                state.refilter();
            }
            ui.separator();

            // ---- Port pairs ----
            let header_text = format!("Pairs  ({}/{})", state.selected_pairs.len(), pairs.len());
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("pairs")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_none();
                        }
                    });

                    for pair in pairs {
                        let mut checked = state.selected_pairs.contains(&pair);
                        let text = RichText::new(pair.to_string()).color(state.pair_color(pair));
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_pair(pair);
                        }
                    }
                });

            if state.metric == Metric::Vswr
                && state.selected_pairs.iter().any(|p| !p.is_reflection())
            {
                ui.label(
                    RichText::new("VSWR is only meaningful for reflection pairs (Sii).")
                        .color(Color32::YELLOW),
                );
            }
        });
}

/// How the next file (or a reload) is read.
fn reading_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Reading");
    ui.separator();

    egui::ComboBox::from_id_salt("variant")
        .selected_text(state.variant.name())
        .show_ui(ui, |ui: &mut Ui| {
            for variant in FormatVariant::ALL {
                ui.selectable_value(&mut state.variant, variant, variant.name());
            }
        });

    ui.checkbox(&mut state.ports_from_extension, "Ports from .sNp extension");
    ui.add_enabled(
        !state.ports_from_extension,
        egui::Slider::new(&mut state.ports, 1..=MAX_PORTS).text("ports"),
    );

    if ui
        .add_enabled(state.path.is_some(), egui::Button::new("Reload"))
        .clicked()
    {
        state.reload();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export CSV…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{}: {}-port, {} points, {} in range",
                ds.source(),
                ds.ports(),
                ds.len(),
                state.visible_rows.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

const SNP_EXTENSIONS: [&str; 9] = ["s1p", "s2p", "s3p", "s4p", "s5p", "s6p", "s7p", "s8p", "s9p"];

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open S-parameter data")
        .add_filter("Touchstone", &SNP_EXTENSIONS)
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

fn export_dialog(state: &mut AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export metrics as CSV")
        .set_file_name(format!("{}.csv", ds.source()))
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match write_csv_file(ds, &path) {
            Ok(()) => log::info!("Exported {}", path.display()),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
