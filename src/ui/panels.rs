use eframe::egui::{self, Color32, RichText, Slider, Ui};

use crate::data::derive::Topology;
use crate::state::AppState;

/// Human-readable tonnes, scaled to the nearest metric magnitude.
pub fn format_tonnes(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.2} Gt", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2} Mt", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1} kt", value / 1e3)
    } else {
        format!("{value:.0} t")
    }
}

// ---------------------------------------------------------------------------
// Left side panel – pipeline controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Diagram");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };
    if dataset.is_empty() {
        ui.label("Dataset is empty.");
        return;
    }
    // Clone the year axis so we can mutate state inside the widgets.
    let years = dataset.years.clone();

    ui.strong("Year");
    egui::ComboBox::from_id_salt("year")
        .selected_text(state.year.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for &year in years.iter().rev() {
                if ui
                    .selectable_label(state.year == year, year.to_string())
                    .clicked()
                {
                    state.set_year(year);
                }
            }
        });
    ui.separator();

    ui.strong("Grouping");
    if ui
        .radio(state.topology == Topology::EntityToKind, "Country → emission type")
        .clicked()
    {
        state.set_topology(Topology::EntityToKind);
    }
    if ui
        .radio(
            state.topology == Topology::ContinentToEntity,
            "Continent → country",
        )
        .clicked()
    {
        state.set_topology(Topology::ContinentToEntity);
    }
    ui.separator();

    ui.strong("Top emitters");
    let mut changed = ui
        .checkbox(&mut state.top_k_enabled, "Keep top K only")
        .changed();
    changed |= ui
        .add_enabled(
            state.top_k_enabled,
            Slider::new(&mut state.top_k, 1..=50).text("K"),
        )
        .changed();
    if state.top_k_enabled && state.topology == Topology::ContinentToEntity {
        ui.small("applied per continent");
    }
    ui.separator();

    ui.strong("Minimum flow");
    let mut min_mt = state.min_flow / 1e6;
    if ui
        .add(
            egui::DragValue::new(&mut min_mt)
                .range(0.0..=f64::MAX)
                .speed(5.0)
                .suffix(" Mt"),
        )
        .changed()
    {
        state.min_flow = min_mt * 1e6;
        changed = true;
    }
    ui.small("flows below this are hidden");

    if changed {
        state.rebuild();
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
        });

        ui.separator();

        if state.loading {
            ui.label("Loading…");
        }

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded, {} flows in {} ({})",
                ds.len(),
                state.graph.edges.len(),
                state.year,
                format_tonnes(state.graph.total_flow()),
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open emissions data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows spanning {:?}..{:?}",
                    dataset.len(),
                    dataset.years.first(),
                    dataset.years.last()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}
