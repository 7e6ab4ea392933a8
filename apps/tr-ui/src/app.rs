use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;
use std::time::Duration;

use egui_file_dialog::{DialogMode, FileDialog};
use tr_app::{DefDocument, EditorSync, RunMessage, SimRun, SyncEventKind, start_run};
use tr_deffile::{STANDARD_PARAMETERS, standard_unit};
use tr_model::{InsertMode, InteractionController, ModelError, RADIUS_AXIS};

use crate::panel::{self, PanelData, PanelEvents};
use crate::session::Session;

const PANEL_HEIGHT: f32 = 240.0;

pub struct TiltringApp {
    doc: Option<DefDocument>,
    /// Per-panel drag state, keyed by parameter name. No capture state is
    /// shared between panels.
    controllers: BTreeMap<String, InteractionController>,
    focused: Option<String>,
    file_dialog: FileDialog,
    file_dialog_action: Option<FileDialogAction>,
    session: Session,
    session_path: PathBuf,
    run: Option<SimRun>,
    run_progress: Option<(usize, usize)>,
    sync: Option<EditorSync>,
    sync_generation: u64,
    notice: Option<String>,
    value_prompt: Option<ValuePrompt>,
    add_prompt: Option<AddPrompt>,
    change_prompt: Option<ChangePrompt>,
    layout_open: bool,
    layout_rows: usize,
    layout_cols: usize,
    scales_open: bool,
    scale_edits: BTreeMap<String, (String, String)>,
    /// Shared radius-axis range, applied to every panel at once.
    scale_x_edit: (String, String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FileDialogAction {
    Open,
    SaveAs,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PromptAction {
    Keep,
    Cancel,
    Confirm,
}

/// Double-click numeric entry targeting one sample of one curve.
struct ValuePrompt {
    name: String,
    dx: f64,
    text: String,
}

struct AddPrompt {
    /// Insert after the focused slot instead of appending.
    after_focus: bool,
    selected: String,
    custom: String,
    custom_unit: String,
}

struct ChangePrompt {
    target: String,
    selected: String,
}

impl TiltringApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let session_path = Session::default_path();
        let session = Session::load(&session_path);

        Self {
            doc: None,
            controllers: BTreeMap::new(),
            focused: None,
            file_dialog: FileDialog::new(),
            file_dialog_action: None,
            layout_rows: session.rows,
            layout_cols: session.cols,
            session,
            session_path,
            run: None,
            run_progress: None,
            sync: None,
            sync_generation: 0,
            notice: None,
            value_prompt: None,
            add_prompt: None,
            change_prompt: None,
            layout_open: false,
            scales_open: false,
            scale_edits: BTreeMap::new(),
            scale_x_edit: (String::new(), String::new()),
        }
    }

    fn open_document(&mut self, path: PathBuf) {
        // an editor session belongs to the outgoing document; cancel it and
        // invalidate its generation so late events never reach the new one
        if let Some(sync) = self.sync.take() {
            sync.stop();
            self.sync_generation += 1;
        }
        match DefDocument::open(&path) {
            Ok(mut doc) => {
                if let Some(parent) = path.parent() {
                    self.session.last_directory = Some(parent.to_path_buf());
                }
                let displayed = doc.set().displayed_order().len();
                let cols = self.session.cols.max(1);
                let mut rows = self.session.rows.max(1);
                if rows * cols < displayed {
                    rows = displayed.div_ceil(cols);
                }
                if let Err(e) = doc.set_mut().set_layout(rows, cols) {
                    tracing::warn!(error = %e, "session layout rejected");
                }
                self.doc = Some(doc);
                self.controllers.clear();
                self.focused = None;
                self.notice = None;
                self.session.rows = rows;
                self.session.cols = cols;
                self.session.save(&self.session_path);
                self.layout_rows = rows;
                self.layout_cols = cols;
            }
            Err(e) => {
                self.notice = Some(format!("Failed to open {}: {e}", path.display()));
            }
        }
    }

    fn save_document(&mut self) {
        if let Some(doc) = self.doc.as_mut() {
            match doc.save() {
                Ok(()) => self.notice = Some(format!("Saved {}", doc.path().display())),
                Err(e) => self.notice = Some(format!("Save failed: {e}")),
            }
        }
    }

    fn save_document_as(&mut self, path: PathBuf) {
        if let Some(doc) = self.doc.as_mut() {
            match doc.save_as(&path) {
                Ok(()) => {
                    if let Some(parent) = path.parent() {
                        self.session.last_directory = Some(parent.to_path_buf());
                        self.session.save(&self.session_path);
                    }
                    self.notice = Some(format!("Saved {}", path.display()));
                }
                Err(e) => self.notice = Some(format!("Save failed: {e}")),
            }
        }
    }

    fn start_sim(&mut self) {
        let Some(doc) = self.doc.as_mut() else { return };
        match start_run(doc) {
            Ok(run) => {
                self.run_progress = Some((0, run.loops_total));
                self.run = Some(run);
                self.notice = Some("Run started".to_string());
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn open_editor(&mut self) {
        let Some(doc) = self.doc.as_mut() else { return };
        let temp = doc.sync_temp_path();
        if let Err(e) = doc.save_to(&temp) {
            self.notice = Some(format!("Could not stage editor copy: {e}"));
            return;
        }
        self.sync_generation += 1;
        match EditorSync::start(
            self.sync_generation,
            &self.session.editor_cmd,
            temp,
            doc.path().to_path_buf(),
        ) {
            Ok(sync) => {
                self.notice = Some(format!(
                    "Editing in '{}'; close the editor to hand the file back",
                    self.session.editor_cmd
                ));
                self.sync = Some(sync);
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    /// While an external editor owns the file, GUI-side edits are mirrored
    /// into the shared temp copy so both sides see the same state.
    fn touch_sync(&mut self) {
        if self.sync.is_none() {
            return;
        }
        let Some(doc) = self.doc.as_mut() else { return };
        let temp = doc.sync_temp_path();
        if let Err(e) = doc.save_to(&temp) {
            self.notice = Some(format!("Sync write failed: {e}"));
        }
    }

    fn pump_run(&mut self) {
        let mut messages = Vec::new();
        let mut disconnected = false;
        if let Some(run) = &self.run {
            loop {
                match run.events.try_recv() {
                    Ok(msg) => messages.push(msg),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }

        let mut outcome = None;
        for msg in messages {
            match msg {
                RunMessage::Progress {
                    loops_done,
                    loops_total,
                } => self.run_progress = Some((loops_done, loops_total)),
                RunMessage::Output(line) => tracing::debug!(%line, "sim output"),
                RunMessage::Finished { message } => outcome = Some(message),
                RunMessage::Error { message } => outcome = Some(message),
            }
        }

        // a stream that ends without a finish token still ends the run
        if outcome.is_none() && disconnected {
            outcome = Some("Run finished".to_string());
        }

        if let Some(message) = outcome {
            self.run = None;
            self.run_progress = None;
            // the binary rewrites the model file with the fitted values
            if let Some(path) = self.doc.as_ref().map(|d| d.path().to_path_buf()) {
                self.open_document(path);
            }
            self.notice = Some(message);
        }
    }

    fn pump_sync(&mut self) {
        let mut kinds = Vec::new();
        let mut closed = false;
        if let Some(sync) = &self.sync {
            loop {
                match sync.events.try_recv() {
                    Ok(event) => {
                        // the app-side counter is the source of truth; a
                        // superseded bridge's events are dropped here
                        if event.generation == self.sync_generation {
                            kinds.push(event.kind);
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        closed = true;
                        break;
                    }
                }
            }
        }
        for kind in kinds {
            match kind {
                SyncEventKind::FileChanged { parameters } => {
                    let Some(doc) = self.doc.as_mut() else { continue };
                    for p in &parameters {
                        match doc.set_mut().apply_external(&p.name, &p.values) {
                            Ok(_) => {}
                            // the file may carry keys the model does not track
                            Err(ModelError::UnknownParameter { .. }) => {}
                            Err(e) => self.notice = Some(format!("Sync update failed: {e}")),
                        }
                    }
                }
                SyncEventKind::EditorClosed => {
                    closed = true;
                    self.notice = Some("Editor closed; model file restored".to_string());
                }
                SyncEventKind::Error { message } => self.notice = Some(message),
            }
        }

        if closed {
            self.sync = None;
        }
    }

    fn undo_focused(&mut self) {
        self.step_focused_history(true);
    }

    fn redo_focused(&mut self) {
        self.step_focused_history(false);
    }

    fn step_focused_history(&mut self, back: bool) {
        let Some(name) = self.focused.clone() else { return };
        let mut message = None;
        let mut stepped = false;
        if let Some(doc) = self.doc.as_mut() {
            let ctl = self.controllers.entry(name.clone()).or_default();
            if let Some((series, history)) = doc.set_mut().series_and_history_mut(&name) {
                let outcome = if back {
                    ctl.undo(series, history)
                } else {
                    ctl.redo(series, history)
                };
                match outcome {
                    Ok(()) => stepped = true,
                    Err(ModelError::HistoryExhausted) => {}
                    Err(e) => message = Some(e.to_string()),
                }
            }
        }
        if let Some(msg) = message {
            self.notice = Some(msg);
        }
        if stepped {
            self.touch_sync();
        }
    }

    fn focused_history(&self, check_undo: bool) -> bool {
        let Some(name) = self.focused.as_ref() else {
            return false;
        };
        let Some(doc) = self.doc.as_ref() else {
            return false;
        };
        doc.set().history(name).is_some_and(|h| {
            if check_undo { h.can_undo() } else { h.can_redo() }
        })
    }

    /// Names offered by the add/insert prompt: the standard vocabulary plus
    /// any parsed-but-hidden parameters, minus what is already on screen.
    fn add_candidates(&self) -> Vec<String> {
        let Some(doc) = self.doc.as_ref() else {
            return Vec::new();
        };
        let set = doc.set();
        let mut out: Vec<String> = Vec::new();
        for (name, _) in STANDARD_PARAMETERS {
            if *name != RADIUS_AXIS && !set.displayed_order().iter().any(|d| d == name) {
                out.push((*name).to_string());
            }
        }
        for name in set.hidden_names() {
            if name != RADIUS_AXIS && !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }

    fn open_add_prompt(&mut self, after_focus: bool) {
        let selected = self.add_candidates().first().cloned().unwrap_or_default();
        self.add_prompt = Some(AddPrompt {
            after_focus,
            selected,
            custom: String::new(),
            custom_unit: String::new(),
        });
    }

    fn confirm_add_prompt(&mut self) {
        let Some(prompt) = self.add_prompt.take() else { return };
        let custom = prompt.custom.trim().to_uppercase();
        let (name, unit) = if custom.is_empty() {
            if prompt.selected.is_empty() {
                return;
            }
            let unit = standard_unit(&prompt.selected).unwrap_or("").to_string();
            (prompt.selected, unit)
        } else {
            let unit = standard_unit(&custom)
                .map(str::to_string)
                .unwrap_or_else(|| prompt.custom_unit.trim().to_string());
            (custom, unit)
        };

        let mode = match (prompt.after_focus, self.focused.clone()) {
            (true, Some(focus)) => InsertMode::After(focus),
            _ => InsertMode::Append,
        };

        let mut message = None;
        let mut added = false;
        if let Some(doc) = self.doc.as_mut() {
            match doc.set_mut().add_parameter(&name, &unit, mode) {
                Ok(_) => added = true,
                Err(e) => message = Some(e.to_string()),
            }
        }
        if added {
            self.focused = Some(name);
            self.ensure_layout_capacity();
        }
        if let Some(msg) = message {
            self.notice = Some(msg);
        }
    }

    /// Grow the grid row count when a newly displayed parameter no longer
    /// fits the current layout.
    fn ensure_layout_capacity(&mut self) {
        let Some(doc) = self.doc.as_mut() else { return };
        let displayed = doc.set().displayed_order().len();
        let (rows, cols) = doc.set().grid();
        if rows * cols >= displayed {
            return;
        }
        let rows = displayed.div_ceil(cols.max(1));
        if doc.set_mut().set_layout(rows, cols).is_ok() {
            self.layout_rows = rows;
            self.session.rows = rows;
            self.session.save(&self.session_path);
        }
    }

    fn open_change_prompt(&mut self) {
        let Some(target) = self.focused.clone() else { return };
        let hidden = self
            .doc
            .as_ref()
            .map(|d| d.set().hidden_names())
            .unwrap_or_default();
        let Some(selected) = hidden.first().cloned() else {
            self.notice = Some("Every parsed parameter is already displayed".to_string());
            return;
        };
        self.change_prompt = Some(ChangePrompt { target, selected });
    }

    fn confirm_change_prompt(&mut self) {
        let Some(prompt) = self.change_prompt.take() else { return };
        let mut message = None;
        let mut swapped = false;
        if let Some(doc) = self.doc.as_mut() {
            match doc
                .set_mut()
                .replace_displayed(&prompt.target, &prompt.selected)
            {
                Ok(()) => swapped = true,
                Err(e) => message = Some(e.to_string()),
            }
        }
        if swapped {
            self.focused = Some(prompt.selected);
        }
        if let Some(msg) = message {
            self.notice = Some(msg);
        }
    }

    fn apply_layout(&mut self) {
        let Some(doc) = self.doc.as_mut() else { return };
        match doc.set_mut().set_layout(self.layout_rows, self.layout_cols) {
            Ok(_) => {
                self.session.rows = self.layout_rows;
                self.session.cols = self.layout_cols;
                self.session.save(&self.session_path);
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn open_scales(&mut self) {
        let Some(doc) = self.doc.as_ref() else { return };
        self.scale_edits.clear();
        let mut x_bounds = None;
        for name in doc.set().displayed_order() {
            if let Some(series) = doc.set().series(name) {
                let vb = series.view_bounds();
                self.scale_edits
                    .insert(name.clone(), (format!("{}", vb.y_min), format!("{}", vb.y_max)));
                x_bounds.get_or_insert((vb.x_min, vb.x_max));
            }
        }
        if let Some((lo, hi)) = x_bounds {
            self.scale_x_edit = (format!("{lo}"), format!("{hi}"));
        }
        self.scales_open = true;
    }

    fn apply_scales(&mut self) {
        let Some(doc) = self.doc.as_mut() else { return };
        let mut rejected = Vec::new();
        for (name, (min_text, max_text)) in &self.scale_edits {
            match (min_text.trim().parse::<f64>(), max_text.trim().parse::<f64>()) {
                (Ok(lo), Ok(hi)) if lo < hi => {
                    if let Some((series, _)) = doc.set_mut().series_and_history_mut(name) {
                        series.set_y_bounds(lo, hi);
                    }
                }
                _ => rejected.push(name.clone()),
            }
        }

        // the radius window is shared, so it lands on every series
        let (x_min_text, x_max_text) = &self.scale_x_edit;
        match (x_min_text.trim().parse::<f64>(), x_max_text.trim().parse::<f64>()) {
            (Ok(lo), Ok(hi)) if lo < hi => {
                let names: Vec<String> = doc.set().known_names().map(str::to_string).collect();
                for name in names {
                    if let Some((series, _)) = doc.set_mut().series_and_history_mut(&name) {
                        series.set_x_bounds(lo, hi);
                    }
                }
            }
            _ => rejected.push(RADIUS_AXIS.to_string()),
        }

        if !rejected.is_empty() {
            self.notice = Some(format!("Ignored invalid scale for {}", rejected.join(", ")));
        }
    }

    fn confirm_value_prompt(&mut self) {
        let Some(prompt) = self.value_prompt.take() else { return };
        let Ok(value) = prompt.text.trim().parse::<f64>() else {
            self.notice = Some(format!("'{}' is not a number", prompt.text.trim()));
            return;
        };

        let mut message = None;
        let mut edited = false;
        if let Some(doc) = self.doc.as_mut() {
            let ctl = self.controllers.entry(prompt.name.clone()).or_default();
            if let Some((series, history)) = doc.set_mut().series_and_history_mut(&prompt.name) {
                match ctl.set_point(series, history, prompt.dx, value) {
                    Ok(Some(_)) => edited = true,
                    Ok(None) => message = Some("No sample near that radius".to_string()),
                    Err(e) => message = Some(e.to_string()),
                }
            }
        }
        if let Some(msg) = message {
            self.notice = Some(msg);
        }
        if edited {
            self.touch_sync();
        }
    }

    fn panel_grid(&self) -> Vec<Vec<PanelData>> {
        let Some(doc) = self.doc.as_ref() else {
            return Vec::new();
        };
        let set = doc.set();
        let x_label = match standard_unit(RADIUS_AXIS) {
            Some(unit) => format!("{RADIUS_AXIS} ({unit})"),
            None => RADIUS_AXIS.to_string(),
        };
        let (_, cols) = set.grid();
        set.grid_slots()
            .chunks(cols.max(1))
            .map(|row| {
                row.iter()
                    .filter_map(|slot| {
                        let series = set.series(&slot.name)?;
                        Some(PanelData {
                            name: slot.name.clone(),
                            unit: series.unit().to_string(),
                            x_label: x_label.clone(),
                            points: series
                                .x_values()
                                .iter()
                                .zip(series.y_values())
                                .map(|(&x, &y)| [x, y])
                                .collect(),
                            bounds: series.view_bounds(),
                            focused: self.focused.as_deref() == Some(slot.name.as_str()),
                        })
                    })
                    .collect()
            })
            .collect()
    }

    fn route_panel_events(&mut self, events: Vec<(String, PanelEvents)>) {
        let mut messages: Vec<String> = Vec::new();
        let mut edited = false;
        {
            let Some(doc) = self.doc.as_mut() else { return };
            let set = doc.set_mut();
            for (name, ev) in events {
                if ev.clicked || ev.drag_started_x.is_some() || ev.double_click_x.is_some() {
                    self.focused = Some(name.clone());
                }
                let ctl = self.controllers.entry(name.clone()).or_default();
                let Some((series, history)) = set.series_and_history_mut(&name) else {
                    continue;
                };
                if let Some(dx) = ev.drag_started_x {
                    ctl.pointer_down(series, dx);
                }
                if ev.dragged && ctl.is_dragging() {
                    if let Err(e) = ctl.pointer_move(series, ev.pointer_y) {
                        messages.push(e.to_string());
                    }
                }
                if ev.drag_stopped && ctl.pointer_up(series, history) {
                    edited = true;
                }
                if let Some(dx) = ev.double_click_x {
                    self.value_prompt = Some(ValuePrompt {
                        name: name.clone(),
                        dx,
                        text: String::new(),
                    });
                }
            }
        }
        if let Some(msg) = messages.pop() {
            self.notice = Some(msg);
        }
        if edited {
            self.touch_sync();
        }
    }

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                if ui.button("Open").clicked() {
                    self.file_dialog_action = Some(FileDialogAction::Open);
                    let initial_dir = self.session.last_directory.as_ref().and_then(|p| p.to_str());
                    let _ = self
                        .file_dialog
                        .open(DialogMode::SelectFile, true, initial_dir);
                }

                ui.add_enabled_ui(self.doc.is_some(), |ui| {
                    if ui.button("Save").clicked() {
                        self.save_document();
                    }
                    if ui.button("Save as").clicked() {
                        self.file_dialog_action = Some(FileDialogAction::SaveAs);
                        self.file_dialog.save_file();
                    }
                });

                ui.separator();

                ui.add_enabled_ui(self.focused_history(true), |ui| {
                    if ui.button("Undo").clicked() {
                        self.undo_focused();
                    }
                });
                ui.add_enabled_ui(self.focused_history(false), |ui| {
                    if ui.button("Redo").clicked() {
                        self.redo_focused();
                    }
                });

                ui.separator();

                ui.add_enabled_ui(self.doc.is_some(), |ui| {
                    if ui.button("Add parameter").clicked() {
                        self.open_add_prompt(false);
                    }
                    if ui
                        .add_enabled(
                            self.focused.is_some(),
                            egui::Button::new("Insert parameter"),
                        )
                        .clicked()
                    {
                        self.open_add_prompt(true);
                    }
                    if ui
                        .add_enabled(
                            self.focused.is_some(),
                            egui::Button::new("Change parameter"),
                        )
                        .clicked()
                    {
                        self.open_change_prompt();
                    }
                    if ui.button("Grid layout").clicked() {
                        self.layout_open = true;
                    }
                    if ui.button("Scales").clicked() {
                        self.open_scales();
                    }
                });

                ui.separator();

                ui.add_enabled_ui(self.doc.is_some() && self.sync.is_none(), |ui| {
                    if ui.button("Text editor").clicked() {
                        self.open_editor();
                    }
                });
                ui.add_enabled_ui(self.doc.is_some() && self.run.is_none(), |ui| {
                    if ui.button("Start run").clicked() {
                        self.start_sim();
                    }
                });
            });
        });
    }

    fn show_status(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            if let Some((done, total)) = self.run_progress {
                let fraction = if total == 0 {
                    0.0
                } else {
                    done as f32 / total as f32
                };
                ui.add(
                    egui::ProgressBar::new(fraction)
                        .show_percentage()
                        .text(format!("loop {done}/{total}")),
                );
            }
            if self.sync.is_some() {
                ui.label("External editor session active");
            }
            match &self.notice {
                Some(notice) => {
                    ui.label(notice);
                }
                None => {
                    if self.doc.is_none() {
                        ui.label("Open a .def file to begin");
                    }
                }
            }
        });
    }

    fn show_windows(&mut self, ctx: &egui::Context) {
        // double-click numeric entry
        let mut action = PromptAction::Keep;
        if let Some(prompt) = &mut self.value_prompt {
            egui::Window::new("Set value")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!("{} near radius {:.1}", prompt.name, prompt.dx));
                    let edit = ui.text_edit_singleline(&mut prompt.text);
                    if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        action = PromptAction::Confirm;
                    }
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            action = PromptAction::Confirm;
                        }
                        if ui.button("Cancel").clicked() {
                            action = PromptAction::Cancel;
                        }
                    });
                });
        }
        match action {
            PromptAction::Confirm => self.confirm_value_prompt(),
            PromptAction::Cancel => self.value_prompt = None,
            PromptAction::Keep => {}
        }

        // add / insert parameter
        let candidates = self.add_candidates();
        let mut action = PromptAction::Keep;
        if let Some(prompt) = &mut self.add_prompt {
            let title = if prompt.after_focus {
                "Insert parameter"
            } else {
                "Add parameter"
            };
            egui::Window::new(title)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    egui::ComboBox::from_label("Parameter")
                        .selected_text(prompt.selected.clone())
                        .show_ui(ui, |ui| {
                            for candidate in &candidates {
                                ui.selectable_value(
                                    &mut prompt.selected,
                                    candidate.clone(),
                                    candidate,
                                );
                            }
                        });
                    ui.horizontal(|ui| {
                        ui.label("Custom name:");
                        ui.text_edit_singleline(&mut prompt.custom);
                    });
                    if !prompt.custom.trim().is_empty() {
                        ui.horizontal(|ui| {
                            ui.label("Unit:");
                            ui.text_edit_singleline(&mut prompt.custom_unit);
                        });
                    }
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            action = PromptAction::Confirm;
                        }
                        if ui.button("Cancel").clicked() {
                            action = PromptAction::Cancel;
                        }
                    });
                });
        }
        match action {
            PromptAction::Confirm => self.confirm_add_prompt(),
            PromptAction::Cancel => self.add_prompt = None,
            PromptAction::Keep => {}
        }

        // change which parameter a slot shows
        let hidden = self
            .doc
            .as_ref()
            .map(|d| d.set().hidden_names())
            .unwrap_or_default();
        let mut action = PromptAction::Keep;
        if let Some(prompt) = &mut self.change_prompt {
            egui::Window::new("Change parameter")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!("Replace {} with:", prompt.target));
                    egui::ComboBox::from_label("Parameter")
                        .selected_text(prompt.selected.clone())
                        .show_ui(ui, |ui| {
                            for candidate in &hidden {
                                ui.selectable_value(
                                    &mut prompt.selected,
                                    candidate.clone(),
                                    candidate,
                                );
                            }
                        });
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            action = PromptAction::Confirm;
                        }
                        if ui.button("Cancel").clicked() {
                            action = PromptAction::Cancel;
                        }
                    });
                });
        }
        match action {
            PromptAction::Confirm => self.confirm_change_prompt(),
            PromptAction::Cancel => self.change_prompt = None,
            PromptAction::Keep => {}
        }

        // grid layout and editor command
        if self.layout_open {
            let mut apply = false;
            let mut close = false;
            egui::Window::new("Grid layout")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Rows:");
                        ui.add(egui::DragValue::new(&mut self.layout_rows).range(1..=12));
                        ui.label("Columns:");
                        ui.add(egui::DragValue::new(&mut self.layout_cols).range(1..=4));
                    });
                    ui.horizontal(|ui| {
                        ui.label("Editor command:");
                        ui.text_edit_singleline(&mut self.session.editor_cmd);
                    });
                    ui.horizontal(|ui| {
                        if ui.button("Apply").clicked() {
                            apply = true;
                        }
                        if ui.button("Close").clicked() {
                            close = true;
                        }
                    });
                });
            if apply {
                self.apply_layout();
            }
            if close {
                self.session.save(&self.session_path);
                self.layout_open = false;
            }
        }

        // manual per-parameter y scale overrides
        if self.scales_open {
            let mut apply = false;
            let mut close = false;
            egui::Window::new("Scale manager")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RADIUS_AXIS);
                        ui.label("min");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.scale_x_edit.0)
                                .desired_width(80.0),
                        );
                        ui.label("max");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.scale_x_edit.1)
                                .desired_width(80.0),
                        );
                    });
                    ui.separator();
                    for (name, (min_text, max_text)) in &mut self.scale_edits {
                        ui.horizontal(|ui| {
                            ui.label(name.clone());
                            ui.label("min");
                            ui.add(egui::TextEdit::singleline(min_text).desired_width(80.0));
                            ui.label("max");
                            ui.add(egui::TextEdit::singleline(max_text).desired_width(80.0));
                        });
                    }
                    ui.horizontal(|ui| {
                        if ui.button("Apply").clicked() {
                            apply = true;
                        }
                        if ui.button("Close").clicked() {
                            close = true;
                        }
                    });
                });
            if apply {
                self.apply_scales();
            }
            if close {
                self.scales_open = false;
            }
        }
    }
}

impl eframe::App for TiltringApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_run();
        self.pump_sync();

        self.show_toolbar(ctx);
        self.show_status(ctx);

        let grid = self.panel_grid();
        let cols = self
            .doc
            .as_ref()
            .map(|d| d.set().grid().1)
            .unwrap_or(1)
            .max(1);
        let mut panel_events: Vec<(String, PanelEvents)> = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            if grid.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("No model loaded");
                });
                return;
            }
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    for (row_idx, row) in grid.iter().enumerate() {
                        ui.push_id(row_idx, |ui| {
                            ui.columns(cols, |columns| {
                                for (i, data) in row.iter().enumerate() {
                                    let events = panel::show(&mut columns[i], data, PANEL_HEIGHT);
                                    panel_events.push((data.name.clone(), events));
                                }
                            });
                        });
                    }
                });
        });
        self.route_panel_events(panel_events);

        self.file_dialog.update(ctx);
        if let Some(path) = self.file_dialog.take_selected() {
            match self.file_dialog_action.take() {
                Some(FileDialogAction::Open) => self.open_document(path.to_path_buf()),
                Some(FileDialogAction::SaveAs) => self.save_document_as(path.to_path_buf()),
                None => {}
            }
        }

        self.show_windows(ctx);

        // worker channels deliver between frames; keep the UI ticking
        if self.run.is_some() || self.sync.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
