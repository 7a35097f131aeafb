use std::time::{Duration, Instant};

use egui::{vec2, Align2, Color32, FontId};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError as MpscTryRecvError;
use tower::ServiceExt;
use tracing::{debug, error, info, warn};

use crate::app::controller::SorterController;
use crate::app::views::{
    ConfidenceBarView, LabelView, PhotoGridView, TextureCache, VideoView, View,
};
use crate::camera::CameraClient;
use crate::common::Frame;
use crate::config::Settings;
use crate::error::AppError;
use crate::pipeline::services::LoadedModel;
use crate::pipeline::types::ClassificationResult;
use crate::pipeline::{ClassificationService, ModelLoader, SortSide};
use crate::serial::{LoopbackLink, SerialSorterLink, SorterLink};

const TITLE: &str = "Tiny Sorter";
const REFRESH_AFTER: Duration = Duration::from_secs(3);

/// Results of background work, handed back to the UI thread.
pub enum UiUpdate {
    ModelLoaded(Result<LoadedModel, AppError>),
    Classified(Result<ClassificationResult, AppError>),
    LinkOpened(Result<Box<dyn SorterLink>, AppError>),
    LinkClosed(Result<(), AppError>),
}

/// State of the model load button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded(Instant),
    Invalid,
}

impl LoadState {
    pub fn button_text(&self, now: Instant) -> &'static str {
        match self {
            LoadState::Idle | LoadState::Loading => "LOAD MODEL",
            LoadState::Loaded(at) if now.saturating_duration_since(*at) < REFRESH_AFTER => {
                "MODEL LOADED"
            }
            LoadState::Loaded(_) => "REFRESH MODEL",
            LoadState::Invalid => "INVALID URL",
        }
    }
}

pub struct SorterApp {
    settings: Settings,
    runtime: Handle,
    controller: SorterController,
    camera: Option<CameraClient>,
    classification_service: Option<ClassificationService>,
    model_loader: ModelLoader,
    model_url: String,
    load_state: LoadState,
    link_busy: bool,
    ui_update_tx: mpsc::Sender<UiUpdate>,
    ui_update_rx: mpsc::Receiver<UiUpdate>,
    textures: TextureCache,
    alert: Option<String>,
    errors: Vec<AppError>,
}

impl SorterApp {
    pub fn new(settings: Settings, runtime: Handle) -> Self {
        let (ui_update_tx, ui_update_rx) = mpsc::channel::<UiUpdate>(100);
        let mut errors = Vec::new();

        let camera = match CameraClient::open(&settings.camera) {
            Ok(camera) => Some(camera),
            Err(e) => {
                error!("Camera unavailable: {}", e);
                errors.push(e);
                None
            }
        };

        let model_url = if settings.ui.test_mode {
            settings.model.test_url.clone()
        } else {
            settings.model.url.clone()
        };

        let mut app = Self {
            controller: SorterController::new(
                &settings,
                vec2(settings.ui.width, settings.ui.height),
            ),
            model_loader: ModelLoader::new(settings.model.clone()),
            settings,
            runtime,
            camera,
            classification_service: None,
            model_url,
            load_state: LoadState::Idle,
            link_busy: false,
            ui_update_tx,
            ui_update_rx,
            textures: TextureCache::default(),
            alert: None,
            errors,
        };

        if !app.settings.model.url.is_empty() && !app.settings.ui.test_mode {
            app.load_model();
        }
        if app.settings.serial.auto_connect {
            app.connect_link();
        }
        app
    }

    pub fn start_gui(settings: Settings) -> Result<(), AppError> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(vec2(settings.ui.width, settings.ui.height))
                .with_title(TITLE),
            ..Default::default()
        };
        let runtime = Handle::current();

        eframe::run_native(
            TITLE,
            options,
            Box::new(move |_cc| Ok(Box::new(SorterApp::new(settings, runtime)))),
        )
        .map_err(|e| AppError::Ui(e.to_string()))
    }

    fn load_model(&mut self) {
        if self.load_state == LoadState::Loading {
            return;
        }
        self.load_state = LoadState::Loading;
        let loader = self.model_loader.clone();
        let url = self.model_url.clone();
        let tx = self.ui_update_tx.clone();
        info!("Loading model from {}", url);
        self.runtime.spawn(async move {
            let result = loader.load(&url).await;
            if let Err(e) = tx.send(UiUpdate::ModelLoaded(result)).await {
                error!("Error sending model update: {}", e);
            }
        });
    }

    fn classify(&mut self, frame: Frame) {
        let Some(service) = self.classification_service.clone() else {
            self.controller.complete(
                Err(AppError::Classifier("No classifier loaded".to_string())),
                Instant::now(),
            );
            return;
        };
        let tx = self.ui_update_tx.clone();
        self.runtime.spawn(async move {
            let result = service.oneshot(frame).await;
            if let Err(e) = tx.send(UiUpdate::Classified(result)).await {
                error!("Error sending classification update: {}", e);
            }
        });
    }

    fn connect_link(&mut self) {
        if self.link_busy {
            return;
        }
        self.link_busy = true;
        let serial = self.settings.serial.clone();
        let tx = self.ui_update_tx.clone();
        self.runtime.spawn(async move {
            let result = tokio::task::spawn_blocking(move || -> Result<Box<dyn SorterLink>, AppError> {
                if serial.simulate {
                    Ok(Box::new(LoopbackLink::new()))
                } else {
                    Ok(Box::new(SerialSorterLink::connect(&serial)?))
                }
            })
            .await
            .unwrap_or_else(|e| Err(AppError::Ui(format!("Serial connect task failed: {}", e))));
            if let Err(e) = tx.send(UiUpdate::LinkOpened(result)).await {
                error!("Error sending link update: {}", e);
            }
        });
    }

    fn disconnect_link(&mut self) {
        let Some(mut link) = self.controller.detach_link() else {
            return;
        };
        self.link_busy = true;
        let tx = self.ui_update_tx.clone();
        self.runtime.spawn(async move {
            let result = tokio::task::spawn_blocking(move || link.close())
                .await
                .unwrap_or_else(|e| {
                    Err(AppError::Ui(format!("Serial close task failed: {}", e)))
                });
            if let Err(e) = tx.send(UiUpdate::LinkClosed(result)).await {
                error!("Error sending link update: {}", e);
            }
        });
    }

    fn report(&mut self, error: AppError) {
        if let Some(message) = error.alert_message() {
            self.alert = Some(message);
        }
        self.errors.push(error);
    }

    fn handle_update(&mut self, update: UiUpdate) {
        match update {
            UiUpdate::ModelLoaded(Ok(model)) => {
                info!("Model loaded from {}", model.source.describe());
                self.classification_service = Some(ClassificationService::new(model.classifier));
                self.controller.set_model(model.labels);
                self.load_state = LoadState::Loaded(Instant::now());
            }
            UiUpdate::ModelLoaded(Err(e)) => {
                warn!("Model load failed: {}", e);
                self.load_state = match &e {
                    AppError::InvalidModelUrl { .. } => LoadState::Invalid,
                    _ => LoadState::Idle,
                };
                self.report(e);
            }
            UiUpdate::Classified(result) => {
                self.controller.complete(result, Instant::now());
            }
            UiUpdate::LinkOpened(Ok(link)) => {
                self.link_busy = false;
                self.controller.attach_link(link);
            }
            UiUpdate::LinkOpened(Err(e)) => {
                self.link_busy = false;
                warn!("Sorter link unavailable: {}", e);
                self.report(e);
            }
            UiUpdate::LinkClosed(result) => {
                self.link_busy = false;
                if let Err(e) = result {
                    self.report(e);
                }
            }
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui, now: Instant) {
        ui.horizontal(|ui| {
            ui.heading(TITLE);
            ui.separator();
            ui.add(
                egui::TextEdit::singleline(&mut self.model_url)
                    .hint_text("Paste model link here")
                    .desired_width(360.0),
            );
            let loading = self.load_state == LoadState::Loading;
            if ui
                .add_enabled(!loading, egui::Button::new(self.load_state.button_text(now)))
                .clicked()
            {
                self.load_model();
            }

            ui.separator();
            let connected = self.controller.is_link_open();
            let text = if connected {
                "DISCONNECT MICROPROCESSOR"
            } else {
                "CONNECT MICROPROCESSOR"
            };
            if ui
                .add_enabled(!self.link_busy, egui::Button::new(text))
                .clicked()
            {
                if connected {
                    self.disconnect_link();
                } else {
                    self.connect_link();
                }
            }
        });

        if self.settings.ui.test_mode {
            ui.horizontal(|ui| {
                if ui.button("Add Left Class").clicked() {
                    self.controller.test_label(SortSide::Left, now);
                }
                if ui.button("Add Right Class").clicked() {
                    self.controller.test_label(SortSide::Right, now);
                }
                if ui.button("Add Left").clicked() {
                    self.controller.test_photo(SortSide::Left);
                }
                if ui.button("Add Right").clicked() {
                    self.controller.test_photo(SortSide::Right);
                }
            });
        }
    }

    fn draw_sorter(&mut self, ui: &mut egui::Ui) {
        let layout = *self.controller.layout();
        if layout.is_too_narrow() {
            ui.painter().text(
                layout.video_center,
                Align2::CENTER_CENTER,
                "Please expand the window to use Tiny Sorter",
                FontId::proportional(18.0),
                Color32::GRAY,
            );
            return;
        }

        VideoView::new(
            self.controller.current_frame(),
            layout.video_center,
            layout.video_size,
            &mut self.textures,
        )
        .draw(ui);
        for side in [SortSide::Left, SortSide::Right] {
            PhotoGridView::new(self.controller.grid(side), &mut self.textures).draw(ui);
            LabelView::new(self.controller.label(side)).draw(ui);
        }
        ConfidenceBarView::new(self.controller.confidence_bar()).draw(ui);
    }

    fn draw_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };
        egui::Window::new(TITLE)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.alert = None;
                }
            });
    }
}

impl eframe::App for SorterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        loop {
            match self.ui_update_rx.try_recv() {
                Ok(update) => self.handle_update(update),
                Err(MpscTryRecvError::Empty) => break,
                Err(MpscTryRecvError::Disconnected) => {
                    error!("UI update channel disconnected");
                    break;
                }
            }
        }

        let now = Instant::now();
        self.controller.resize(ctx.screen_rect().size());
        let latest = self.camera.as_ref().and_then(CameraClient::latest);
        if let Some(frame) = self.controller.tick(now, latest) {
            debug!("Tick submitted frame {}", frame.id());
            self.classify(frame);
        }
        self.controller.animate(now);

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.draw_controls(ui, now);
        });

        egui::TopBottomPanel::bottom("error_panel")
            .resizable(true)
            .show(ctx, |ui| {
                egui::CollapsingHeader::new(format!("Error Log ({})", self.errors.len()))
                    .show(ui, |ui| {
                        egui::ScrollArea::vertical().show(ui, |ui| {
                            for error in self.errors.iter().rev() {
                                ui.label(format!("[ERROR] {}", error));
                            }
                        });
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_sorter(ui);
        });

        self.draw_alert(ctx);
        self.textures.prune();
        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_button_offers_refresh_after_three_seconds() {
        let loaded_at = Instant::now();
        let state = LoadState::Loaded(loaded_at);
        assert_eq!(state.button_text(loaded_at), "MODEL LOADED");
        assert_eq!(
            state.button_text(loaded_at + Duration::from_millis(2999)),
            "MODEL LOADED"
        );
        assert_eq!(state.button_text(loaded_at + REFRESH_AFTER), "REFRESH MODEL");
    }

    #[test]
    fn invalid_url_is_shown_on_the_button() {
        assert_eq!(LoadState::Invalid.button_text(Instant::now()), "INVALID URL");
        assert_eq!(LoadState::Idle.button_text(Instant::now()), "LOAD MODEL");
    }

    fn offline_app() -> SorterApp {
        let mut settings = Settings::default();
        settings.camera.still_image = Some("/nonexistent/tiny-sorter-frame.png".into());
        settings.model.url = String::new();
        settings.serial.auto_connect = false;
        SorterApp::new(settings, Handle::current())
    }

    #[tokio::test]
    async fn model_with_too_few_classes_raises_the_alert() {
        let mut app = offline_app();
        let camera_errors = app.errors.len();

        app.handle_update(UiUpdate::ModelLoaded(Err(AppError::InsufficientLabels(2))));

        assert!(app
            .alert
            .as_deref()
            .is_some_and(|alert| alert.contains("at least three classes")));
        assert!(!app.controller.has_model());
        assert!(app.classification_service.is_none());
        assert_eq!(app.load_state, LoadState::Idle);
        assert_eq!(app.errors.len(), camera_errors + 1);
    }

    #[tokio::test]
    async fn rejected_url_marks_the_button_invalid() {
        let mut app = offline_app();

        app.handle_update(UiUpdate::ModelLoaded(Err(AppError::InvalidModelUrl {
            url: "https://example.com/not-a-model".to_string(),
            reason: "not a model link".to_string(),
        })));

        assert_eq!(app.load_state, LoadState::Invalid);
        assert!(app
            .alert
            .as_deref()
            .is_some_and(|alert| alert.contains("https://example.com/not-a-model")));
        assert!(!app.controller.has_model());
    }
}
