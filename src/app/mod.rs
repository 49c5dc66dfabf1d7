//! ScriptDeck Application
//!
//! The egui application shell: a menu bar, a tab strip, and per-tab views.
//! The UI thread never blocks on process or network I/O — launches and page
//! fetches round-trip through the async operation loop, and session output
//! arrives through per-session channels drained once per frame.

mod async_ops;
mod tabs;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use scriptdeck::config::Config;
use scriptdeck::exec::SessionRegistry;
use scriptdeck::models::{Interpreter, ScriptSource};

use async_ops::{async_operation_loop, AsyncRequest, AsyncResult};
use tabs::{PageContent, SessionView, Tab, TabKind};

/// Main ScriptDeck application
pub struct ScriptDeckApp {
    /// Loaded configuration (interpreter table, UI settings)
    config: Config,
    /// Session registry shared with the background task
    registry: Arc<SessionRegistry>,
    /// Tokio runtime for async operations
    /// Note: kept alive for the app's lifetime even though it is not
    /// accessed directly after startup
    #[allow(dead_code)]
    runtime: tokio::runtime::Runtime,
    /// Channel for sending async requests from UI to background
    async_tx: mpsc::UnboundedSender<AsyncRequest>,
    /// Channel for receiving async results from background to UI
    async_rx: mpsc::UnboundedReceiver<AsyncResult>,
    /// Open tabs, in strip order
    tabs: Vec<Tab>,
    /// Index of the selected tab
    active_tab: usize,
    /// Source of stable tab ids
    next_tab_id: u64,
    /// Path buffer for the "Open File" prompt, when open
    pending_file_open: Option<String>,
    /// Interpreter and path buffer for the "Run Script" prompt, when open
    pending_script_run: Option<(Interpreter, String)>,
    /// Transient message shown in the status bar
    status_message: Option<String>,
}

impl ScriptDeckApp {
    /// Create a new application instance from a loaded configuration
    pub fn new(config: Config) -> Self {
        info!("Initializing ScriptDeck application");

        let registry = Arc::new(SessionRegistry::new());

        // Create Tokio runtime for async operations.
        // Try multi-threaded first, fall back to single-threaded.
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("scriptdeck-async")
            .enable_all()
            .build()
            .or_else(|e| {
                warn!(
                    "Failed to create multi-threaded runtime: {}, trying single-threaded",
                    e
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })
            .unwrap_or_else(|e| {
                error!("Failed to create any Tokio runtime: {}", e);
                panic!("Critical: cannot initialize ScriptDeck without a Tokio runtime");
            });

        // Channels for async communication
        let (request_tx, mut request_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        let registry_clone = registry.clone();
        runtime.spawn(async move {
            async_operation_loop(&mut request_rx, result_tx, registry_clone).await;
        });

        let mut app = Self {
            config,
            registry,
            runtime,
            async_tx: request_tx,
            async_rx: result_rx,
            tabs: Vec::new(),
            active_tab: 0,
            next_tab_id: 0,
            pending_file_open: None,
            pending_script_run: None,
            status_message: None,
        };

        // Initial page tab, loading immediately like the start page
        let start_url = app.config.ui.start_url.clone();
        app.open_page_tab(start_url);

        app
    }

    fn allocate_tab_id(&mut self) -> u64 {
        let id = self.next_tab_id;
        self.next_tab_id += 1;
        id
    }

    /// Open a page tab and kick off its fetch
    fn open_page_tab(&mut self, url: String) {
        let id = self.allocate_tab_id();
        self.tabs.push(Tab::new(
            id,
            "Web".to_string(),
            TabKind::Page {
                address: url.clone(),
                content: PageContent::Loading,
            },
        ));
        self.active_tab = self.tabs.len() - 1;
        let _ = self.async_tx.send(AsyncRequest::FetchPage { tab_id: id, url });
    }

    /// Open a read-only view of a local text file
    fn open_file_tab(&mut self, path: PathBuf) {
        let content = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => format!("Failed to load: {}", e),
        };

        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let id = self.allocate_tab_id();
        self.tabs
            .push(Tab::new(id, title, TabKind::FileView { path, content }));
        self.active_tab = self.tabs.len() - 1;
    }

    /// Open an output tab for a script file and start its session
    fn run_script_tab(&mut self, interpreter: Interpreter, path: PathBuf) {
        let title = format!(
            "{}: {}",
            interpreter.display_name(),
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string())
        );

        let id = self.allocate_tab_id();
        self.tabs.push(Tab::new(
            id,
            title,
            TabKind::Script {
                interpreter: interpreter.clone(),
                script_path: path.clone(),
                view: SessionView::default(),
            },
        ));
        self.active_tab = self.tabs.len() - 1;

        let _ = self.async_tx.send(AsyncRequest::RunScript {
            tab_id: id,
            interpreter,
            source: ScriptSource::File(path),
        });
    }

    /// Open an editable code-input tab (the run starts from its Run button)
    fn open_code_tab(&mut self, interpreter: Interpreter) {
        let title = format!("{} Input", interpreter.display_name());
        let id = self.allocate_tab_id();
        self.tabs.push(Tab::new(
            id,
            title,
            TabKind::CodeInput {
                interpreter,
                code: String::new(),
                view: SessionView::default(),
            },
        ));
        self.active_tab = self.tabs.len() - 1;
    }

    /// Drain results from the background task into tab state
    fn process_async_results(&mut self) {
        while let Ok(result) = self.async_rx.try_recv() {
            match result {
                AsyncResult::SessionStarted { tab_id, handle } => {
                    debug!("Session {} attached to tab {}", handle.session_id, tab_id);
                    if let Some(view) = self
                        .tabs
                        .iter_mut()
                        .find(|t| t.id == tab_id)
                        .and_then(|t| t.session_view_mut())
                    {
                        view.attach(handle.session_id, handle.events);
                    }
                    // A closed tab drops the handle; the worker notices the
                    // dropped receiver and finishes on its own
                }
                AsyncResult::SessionStartFailed { tab_id, error } => {
                    if let Some(view) = self
                        .tabs
                        .iter_mut()
                        .find(|t| t.id == tab_id)
                        .and_then(|t| t.session_view_mut())
                    {
                        view.lines.push(format!("Execution failed: {}", error));
                        view.finished = true;
                    }
                }
                AsyncResult::PageLoaded { tab_id, content } => {
                    if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == tab_id) {
                        if let TabKind::Page { content: slot, .. } = &mut tab.kind {
                            *slot = PageContent::Loaded(content);
                        }
                    }
                }
                AsyncResult::PageLoadFailed { tab_id, error } => {
                    if let Some(tab) = self.tabs.iter_mut().find(|t| t.id == tab_id) {
                        if let TabKind::Page { content: slot, .. } = &mut tab.kind {
                            *slot = PageContent::Failed(error);
                        }
                    }
                }
                AsyncResult::CancelFailed { session_id, error } => {
                    self.status_message =
                        Some(format!("Cancel failed for {}: {}", session_id, error));
                }
            }
        }
    }

    /// Render the menu bar; returns without holding any tab borrows
    fn show_menu_bar(&mut self, ui: &mut egui::Ui) {
        let interpreters = self.config.interpreters();

        let mut open_file = false;
        let mut script_prompt: Option<Interpreter> = None;
        let mut code_tab: Option<Interpreter> = None;
        let mut new_page = false;
        let mut cleanup = false;

        ui.menu_button("File", |ui| {
            if ui.button("Open File...").clicked() {
                open_file = true;
                ui.close();
            }
            if ui.button("New Page Tab").clicked() {
                new_page = true;
                ui.close();
            }

            ui.separator();
            for interpreter in &interpreters {
                let label = format!("Run {} Script...", interpreter.display_name());
                if ui.button(label).clicked() {
                    script_prompt = Some(interpreter.clone());
                    ui.close();
                }
            }

            ui.separator();
            for interpreter in &interpreters {
                let label = format!("Run {} Code...", interpreter.display_name());
                if ui.button(label).clicked() {
                    code_tab = Some(interpreter.clone());
                    ui.close();
                }
            }

            ui.separator();
            if ui.button("Clear Finished Sessions").clicked() {
                cleanup = true;
                ui.close();
            }
        });

        if open_file {
            self.pending_file_open = Some(String::new());
        }
        if let Some(interpreter) = script_prompt {
            self.pending_script_run = Some((interpreter, String::new()));
        }
        if let Some(interpreter) = code_tab {
            self.open_code_tab(interpreter);
        }
        if new_page {
            let url = self.config.ui.start_url.clone();
            self.open_page_tab(url);
        }
        if cleanup {
            let removed = futures::executor::block_on(self.registry.cleanup_finished());
            self.status_message = Some(format!("Removed {} finished session(s)", removed));
        }
    }

    /// Render the path-entry prompts opened from the menu
    fn show_prompts(&mut self, ctx: &egui::Context) {
        if let Some(mut buffer) = self.pending_file_open.take() {
            let mut keep_open = true;
            egui::Window::new("Open File")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Path to the file to view:");
                    ui.text_edit_singleline(&mut buffer);
                    ui.horizontal(|ui| {
                        if ui.button("Open").clicked() && !buffer.trim().is_empty() {
                            keep_open = false;
                        }
                        if ui.button("Cancel").clicked() {
                            keep_open = false;
                            buffer.clear();
                        }
                    });
                });

            if keep_open {
                self.pending_file_open = Some(buffer);
            } else if !buffer.trim().is_empty() {
                self.open_file_tab(PathBuf::from(buffer.trim()));
            }
        }

        if let Some((interpreter, mut buffer)) = self.pending_script_run.take() {
            let mut keep_open = true;
            let title = format!("Select {} script to run", interpreter.display_name());
            egui::Window::new(title)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Path to the script:");
                    ui.text_edit_singleline(&mut buffer);
                    ui.horizontal(|ui| {
                        if ui.button("Run").clicked() && !buffer.trim().is_empty() {
                            keep_open = false;
                        }
                        if ui.button("Cancel").clicked() {
                            keep_open = false;
                            buffer.clear();
                        }
                    });
                });

            if keep_open {
                self.pending_script_run = Some((interpreter, buffer));
            } else if !buffer.trim().is_empty() {
                self.run_script_tab(interpreter, PathBuf::from(buffer.trim()));
            }
        }
    }

    /// Render the tab strip; handles selection and closing
    fn show_tab_strip(&mut self, ui: &mut egui::Ui) {
        let mut close_index = None;

        ui.horizontal_wrapped(|ui| {
            for (index, tab) in self.tabs.iter().enumerate() {
                let selected = index == self.active_tab;
                let mut title = tab.title.clone();
                if tab.has_running_session() {
                    title.push_str(" \u{23F5}");
                }
                if ui.selectable_label(selected, title).clicked() {
                    self.active_tab = index;
                }
                if ui.small_button("\u{2715}").clicked() {
                    close_index = Some(index);
                }
                ui.separator();
            }
        });

        if let Some(index) = close_index {
            self.tabs.remove(index);
            if self.active_tab >= self.tabs.len() && !self.tabs.is_empty() {
                self.active_tab = self.tabs.len() - 1;
            }
        }
    }

    /// Render the active tab's content
    fn show_active_tab(&mut self, ui: &mut egui::Ui) {
        let font_size = self.config.ui.font_size as f32;
        let Self {
            tabs,
            active_tab,
            async_tx,
            status_message,
            ..
        } = self;

        let Some(tab) = tabs.get_mut(*active_tab) else {
            ui.centered_and_justified(|ui| {
                ui.label("No open tabs. Use the File menu to get started.");
            });
            return;
        };
        let tab_id = tab.id;

        match &mut tab.kind {
            TabKind::Page { address, content } => {
                let mut go = false;
                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(address).desired_width(ui.available_width() - 60.0),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        go = true;
                    }
                    if ui.button("Go").clicked() {
                        go = true;
                    }
                });

                if go && !address.trim().is_empty() {
                    *content = PageContent::Loading;
                    let _ = async_tx.send(AsyncRequest::FetchPage {
                        tab_id,
                        url: address.trim().to_string(),
                    });
                }

                ui.separator();
                egui::ScrollArea::vertical()
                    .auto_shrink(false)
                    .show(ui, |ui| match content {
                        PageContent::Loading => {
                            ui.spinner();
                        }
                        PageContent::Loaded(text) => {
                            ui.label(egui::RichText::new(text.as_str()).monospace().size(font_size));
                        }
                        PageContent::Failed(message) => {
                            ui.label(
                                egui::RichText::new(message.as_str())
                                    .monospace()
                                    .size(font_size),
                            );
                        }
                    });
            }

            TabKind::FileView { path, content } => {
                ui.label(egui::RichText::new(path.display().to_string()).weak());
                ui.separator();
                egui::ScrollArea::vertical().auto_shrink(false).show(ui, |ui| {
                    ui.label(egui::RichText::new(content.as_str()).monospace().size(font_size));
                });
            }

            TabKind::Script {
                script_path, view, ..
            } => {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(script_path.display().to_string()).weak());
                    show_session_controls(ui, view, async_tx, status_message);
                });
                ui.separator();
                show_output_lines(ui, &view.lines, font_size);
            }

            TabKind::CodeInput {
                interpreter,
                code,
                view,
            } => {
                ui.label(format!(
                    "Enter your {} code below:",
                    interpreter.display_name()
                ));
                ui.add(
                    egui::TextEdit::multiline(code)
                        .code_editor()
                        .desired_rows(14)
                        .desired_width(f32::INFINITY),
                );

                ui.horizontal(|ui| {
                    let running = view.is_running();
                    if ui.add_enabled(!running, egui::Button::new("Run")).clicked() {
                        // Clear previous output before the fresh run
                        view.reset();
                        let _ = async_tx.send(AsyncRequest::RunScript {
                            tab_id,
                            interpreter: interpreter.clone(),
                            source: ScriptSource::inline(code, &interpreter.id),
                        });
                    }
                    show_session_controls(ui, view, async_tx, status_message);
                });

                ui.label("Output:");
                show_output_lines(ui, &view.lines, font_size);
            }
        }
    }
}

/// Cancel and copy buttons shared by the script and code-input tabs
fn show_session_controls(
    ui: &mut egui::Ui,
    view: &SessionView,
    async_tx: &mpsc::UnboundedSender<AsyncRequest>,
    status_message: &mut Option<String>,
) {
    let running = view.is_running();

    if let Some(session_id) = &view.session_id {
        if ui.add_enabled(running, egui::Button::new("Cancel")).clicked() {
            let _ = async_tx.send(AsyncRequest::CancelSession {
                session_id: session_id.clone(),
            });
        }
    }

    if ui
        .add_enabled(!view.lines.is_empty(), egui::Button::new("Copy Output"))
        .clicked()
    {
        let text = view.output_text();
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => *status_message = Some("Output copied to clipboard".to_string()),
            Err(e) => *status_message = Some(format!("Clipboard error: {}", e)),
        }
    }
}

/// Scrollable, monospace output area
fn show_output_lines(ui: &mut egui::Ui, lines: &[String], font_size: f32) {
    egui::ScrollArea::vertical()
        .auto_shrink(false)
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for line in lines {
                ui.label(egui::RichText::new(line.as_str()).monospace().size(font_size));
            }
        });
}

impl eframe::App for ScriptDeckApp {
    fn ui(&mut self, ui: &mut egui::Ui, _frame: &mut eframe::Frame) {
        let ctx = ui.ctx().clone();
        let ctx = &ctx;
        // Results from the background task first, then per-session streams
        self.process_async_results();

        let mut anything_new = false;
        for tab in &mut self.tabs {
            if let Some(view) = tab.session_view_mut() {
                anything_new |= view.drain_events();
            }
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                self.show_menu_bar(ui);
            });
        });

        egui::TopBottomPanel::top("tab_strip").show(ctx, |ui| {
            self.show_tab_strip(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let running = self.tabs.iter().filter(|t| t.has_running_session()).count();
                ui.label(format!("{} session(s) running", running));
                if let Some(message) = &self.status_message {
                    ui.separator();
                    ui.label(message.clone());
                }
            });
        });

        self.show_prompts(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_active_tab(ui);
        });

        // Keep polling while sessions stream or a fetch is pending; stay idle
        // otherwise
        let busy = self.tabs.iter().any(|t| {
            t.has_running_session()
                || matches!(
                    t.kind,
                    TabKind::Page {
                        content: PageContent::Loading,
                        ..
                    }
                )
        });
        if anything_new {
            ctx.request_repaint();
        } else if busy {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
