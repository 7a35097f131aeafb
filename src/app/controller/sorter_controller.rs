use egui::Vec2;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::app::components::{
    ClassificationLabel, ConfidenceBar, Layout, PhotoGrid, SplashTiming, VideoPause,
};
use crate::app::controller::LoopState;
use crate::common::Frame;
use crate::config::{GridSettings, Settings};
use crate::error::AppError;
use crate::pipeline::services::threshold::{evaluate, ConfidenceReading};
use crate::pipeline::types::{ClassificationResult, ModelLabels, SideMapping, SortClass, SortSide};
use crate::serial::{SortCommand, SorterLink};

/// What happened when a class crossed the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOutcome {
    pub class: SortClass,
    pub side: SortSide,
    pub command: SortCommand,
    /// Whether the byte reached an open link.
    pub sent: bool,
}

/// All sorter state, owned by the UI thread.
pub struct SorterController {
    threshold: f32,
    interval: Duration,
    pause_duration: Duration,
    grid_settings: GridSettings,
    splash_timing: SplashTiming,
    sides: SideMapping,
    layout: Layout,
    labels: Option<ModelLabels>,
    loop_state: LoopState,
    last_tick: Option<Instant>,
    current_frame: Option<Frame>,
    video_pause: VideoPause,
    confidence_bar: ConfidenceBar,
    left_label: ClassificationLabel,
    right_label: ClassificationLabel,
    left_grid: PhotoGrid,
    right_grid: PhotoGrid,
    link: Option<Box<dyn SorterLink>>,
}

impl SorterController {
    pub fn new(settings: &Settings, size: Vec2) -> Self {
        let layout = Layout::new(size);
        let splash_timing = SplashTiming::from(&settings.splash);
        Self {
            threshold: settings.classifier.threshold,
            interval: settings.classifier.interval(),
            pause_duration: settings.classifier.pause(),
            grid_settings: settings.grid.clone(),
            splash_timing,
            sides: SideMapping::new(settings.sides.swap),
            labels: None,
            loop_state: LoopState::Idle,
            last_tick: None,
            current_frame: None,
            video_pause: VideoPause::default(),
            confidence_bar: Self::build_bar(&layout),
            left_label: Self::build_label(&layout, SortSide::Left, splash_timing),
            right_label: Self::build_label(&layout, SortSide::Right, splash_timing),
            left_grid: PhotoGrid::new(layout.grid_origin(SortSide::Left), &settings.grid),
            right_grid: PhotoGrid::new(layout.grid_origin(SortSide::Right), &settings.grid),
            layout,
            link: None,
        }
    }

    fn build_bar(layout: &Layout) -> ConfidenceBar {
        ConfidenceBar::new(layout.bar_center, layout.bar_size, layout.bar_radius)
    }

    fn build_label(layout: &Layout, side: SortSide, timing: SplashTiming) -> ClassificationLabel {
        ClassificationLabel::new(
            layout.label_center(side),
            layout.label_size,
            layout.label_radius,
            side,
            timing,
        )
    }

    /// Rebuild positioned components for a new window size. Photos survive.
    pub fn resize(&mut self, size: Vec2) {
        if self.layout.size == size {
            return;
        }
        debug!("Relayout for {}x{}", size.x, size.y);
        self.layout = Layout::new(size);
        self.confidence_bar = Self::build_bar(&self.layout);

        for side in [SortSide::Left, SortSide::Right] {
            let old = self.label(side);
            let (text, visible) = (old.text().to_string(), old.is_visible());
            let mut label = Self::build_label(&self.layout, side, self.splash_timing);
            label.set_text(text);
            label.set_visible(visible);
            *self.label_mut(side) = label;

            let origin = self.layout.grid_origin(side);
            self.grid_mut(side).set_origin(origin);
        }
    }

    pub fn set_model(&mut self, labels: ModelLabels) {
        for side in [SortSide::Left, SortSide::Right] {
            let text = labels.label(self.sides.class_on(side)).to_string();
            let label = self.label_mut(side);
            label.set_text(text);
            label.set_visible(true);
        }
        info!("Sorting with labels {:?}", labels.all());
        self.labels = Some(labels);
    }

    pub fn has_model(&self) -> bool {
        self.labels.is_some()
    }

    pub fn labels(&self) -> Option<&ModelLabels> {
        self.labels.as_ref()
    }

    /// Called every frame. Returns the frame to classify when the loop is
    /// idle, a model is loaded, the video is live and the tick interval has
    /// passed.
    pub fn tick(&mut self, now: Instant, latest: Option<Frame>) -> Option<Frame> {
        if self.video_pause.resume_if_due(now) {
            debug!("Video resumed");
        }
        let paused = self.video_pause.is_paused(now);
        if !paused && latest.is_some() {
            self.current_frame = latest;
        }

        if let Some(last) = self.last_tick {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }
        self.last_tick = Some(now);

        if self.labels.is_none() || paused {
            return None;
        }
        let frame = self.current_frame.clone()?;
        if self.loop_state.begin(frame.clone(), now) {
            debug!("Submitting frame {} for classification", frame.id());
            Some(frame)
        } else {
            None
        }
    }

    /// Consume a classification outcome. The in-flight slot is always freed.
    pub fn complete(
        &mut self,
        outcome: Result<ClassificationResult, AppError>,
        now: Instant,
    ) -> Option<SortOutcome> {
        let Some(in_flight) = self.loop_state.finish() else {
            warn!("Classification outcome arrived with nothing in flight");
            return None;
        };
        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                error!("Classification failed: {}", e);
                return None;
            }
        };
        debug!(
            "Frame {} classified in {:?}",
            result.frame_id,
            now.saturating_duration_since(in_flight.submitted_at)
        );

        let labels = self.labels.as_ref()?;
        let decision = match evaluate(&result, labels, self.threshold) {
            Ok(decision) => decision,
            Err(e) => {
                warn!("Dropping classification result: {}", e);
                return None;
            }
        };
        self.show_confidence(decision.reading);

        let class = decision.fired?;
        Some(self.dispatch(class, &in_flight.frame, now))
    }

    fn show_confidence(&mut self, reading: ConfidenceReading) {
        let left = reading.of(self.sides.class_on(SortSide::Left));
        let right = reading.of(self.sides.class_on(SortSide::Right));
        self.confidence_bar.set_left(left);
        self.confidence_bar.set_right(right);
    }

    fn dispatch(&mut self, class: SortClass, frame: &Frame, now: Instant) -> SortOutcome {
        let command = class.command();
        let sent = self.send_best_effort(command);
        let side = self.sides.side_of(class);

        self.label_mut(side).splash_mut().trigger(now);
        self.grid_mut(side).add_image(frame.snapshot());
        self.video_pause.pause(now, self.pause_duration);

        info!(
            "Sorted {:?} to the {:?} (byte {:?}, sent: {})",
            class,
            side,
            command.byte() as char,
            sent
        );
        SortOutcome {
            class,
            side,
            command,
            sent,
        }
    }

    // A missing or unplugged sorter must never stall the UI.
    fn send_best_effort(&mut self, command: SortCommand) -> bool {
        match self.link.as_mut() {
            Some(link) if link.is_open() => match link.send(command) {
                Ok(()) => true,
                Err(e) => {
                    debug!("Ignoring sorter write failure on {}: {}", link.name(), e);
                    false
                }
            },
            _ => false,
        }
    }

    /// Advance the label pulses.
    pub fn animate(&mut self, now: Instant) {
        self.left_label.splash_mut().advance(now);
        self.right_label.splash_mut().advance(now);
    }

    /// Test-mode button: show a placeholder label and pulse it.
    pub fn test_label(&mut self, side: SortSide, now: Instant) {
        let label = self.label_mut(side);
        label.set_text(match side {
            SortSide::Left => "Left Class",
            SortSide::Right => "Right Class",
        });
        label.set_visible(true);
        label.splash_mut().trigger(now);
    }

    /// Test-mode button: push the current frame into a grid.
    pub fn test_photo(&mut self, side: SortSide) -> bool {
        let Some(snapshot) = self.current_frame.as_ref().map(Frame::snapshot) else {
            return false;
        };
        self.grid_mut(side).add_image(snapshot);
        true
    }

    pub fn attach_link(&mut self, link: Box<dyn SorterLink>) {
        info!("Sorter link {} attached", link.name());
        self.link = Some(link);
    }

    pub fn detach_link(&mut self) -> Option<Box<dyn SorterLink>> {
        self.link.take()
    }

    pub fn is_link_open(&self) -> bool {
        self.link.as_ref().is_some_and(|link| link.is_open())
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn confidence_bar(&self) -> &ConfidenceBar {
        &self.confidence_bar
    }

    pub fn label(&self, side: SortSide) -> &ClassificationLabel {
        match side {
            SortSide::Left => &self.left_label,
            SortSide::Right => &self.right_label,
        }
    }

    fn label_mut(&mut self, side: SortSide) -> &mut ClassificationLabel {
        match side {
            SortSide::Left => &mut self.left_label,
            SortSide::Right => &mut self.right_label,
        }
    }

    pub fn grid(&self, side: SortSide) -> &PhotoGrid {
        match side {
            SortSide::Left => &self.left_grid,
            SortSide::Right => &self.right_grid,
        }
    }

    fn grid_mut(&mut self, side: SortSide) -> &mut PhotoGrid {
        match side {
            SortSide::Left => &mut self.left_grid,
            SortSide::Right => &mut self.right_grid,
        }
    }

    pub fn grid_capacity(&self) -> usize {
        self.grid_settings.capacity()
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.current_frame.as_ref()
    }

    pub fn is_paused(&self, now: Instant) -> bool {
        self.video_pause.is_paused(now)
    }

    pub fn is_classifying(&self) -> bool {
        !self.loop_state.is_idle()
    }
}
