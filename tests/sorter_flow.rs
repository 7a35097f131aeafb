use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use egui::vec2;
use image::{DynamicImage, ImageBuffer, Rgb};
use tower::ServiceExt;

use tiny_sorter::app::SorterController;
use tiny_sorter::common::Frame;
use tiny_sorter::config::Settings;
use tiny_sorter::pipeline::{
    ClassificationService, ImageClassifier, ModelLabels, Prediction, SortSide,
};
use tiny_sorter::serial::protocol::LEFT_POSITION;
use tiny_sorter::serial::LoopbackLink;
use tiny_sorter::AppError;

/// Returns whatever scores the test last scripted.
struct ScriptedClassifier {
    scores: Mutex<Vec<(&'static str, f32)>>,
}

impl ScriptedClassifier {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            scores: Mutex::new(Vec::new()),
        })
    }

    fn script(&self, scores: &[(&'static str, f32)]) {
        *self.scores.lock().unwrap() = scores.to_vec();
    }
}

#[async_trait]
impl ImageClassifier for ScriptedClassifier {
    async fn classify(&self, _image: Arc<DynamicImage>) -> Result<Vec<Prediction>, AppError> {
        Ok(self
            .scores
            .lock()
            .unwrap()
            .iter()
            .map(|(label, confidence)| Prediction::new(*label, *confidence))
            .collect())
    }
}

fn camera_frame(shade: u8) -> Frame {
    Frame::capture(DynamicImage::ImageRgb8(
        ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(64, 48, Rgb([shade, shade, shade])),
    ))
}

struct Rig {
    controller: SorterController,
    classifier: Arc<ScriptedClassifier>,
    service: ClassificationService,
    sent: Arc<Mutex<Vec<u8>>>,
}

impl Rig {
    fn new() -> Self {
        let mut controller = SorterController::new(&Settings::default(), vec2(1280.0, 800.0));
        controller.set_model(
            ModelLabels::new(vec!["cat".into(), "dog".into(), "empty".into()]).unwrap(),
        );
        let link = LoopbackLink::new();
        let sent = link.sent_bytes();
        controller.attach_link(Box::new(link));

        let classifier = ScriptedClassifier::new();
        let service = ClassificationService::new(classifier.clone());
        Self {
            controller,
            classifier,
            service,
            sent,
        }
    }

    /// One tick with a fresh camera frame; classifies if the loop submitted.
    async fn step(&mut self, now: Instant, shade: u8) -> bool {
        let Some(frame) = self.controller.tick(now, Some(camera_frame(shade))) else {
            return false;
        };
        let result = self.service.clone().oneshot(frame).await;
        self.controller.complete(result, now);
        true
    }
}

#[tokio::test]
async fn confident_cat_is_sorted_left() {
    let mut rig = Rig::new();
    rig.classifier
        .script(&[("cat", 0.95), ("dog", 0.03), ("empty", 0.02)]);

    let start = Instant::now();
    assert!(rig.step(start, 10).await);

    assert_eq!(*rig.sent.lock().unwrap(), b"1".to_vec());
    assert!(rig.controller.label(SortSide::Left).splash().is_exploding());
    assert!(!rig.controller.label(SortSide::Right).splash().is_exploding());
    assert_eq!(rig.controller.grid(SortSide::Left).len(), 1);
    assert!(rig.controller.grid(SortSide::Right).is_empty());
    assert!(rig.controller.is_paused(start));
}

#[tokio::test]
async fn unsure_results_move_the_bar_only() {
    let mut rig = Rig::new();
    rig.classifier
        .script(&[("cat", 0.5), ("dog", 0.4), ("empty", 0.1)]);

    let start = Instant::now();
    for i in 0..10 {
        assert!(rig.step(start + Duration::from_millis(100 * i), 10).await);
    }

    assert!(rig.sent.lock().unwrap().is_empty());
    assert!(rig.controller.grid(SortSide::Left).is_empty());
    assert!(rig.controller.grid(SortSide::Right).is_empty());
    assert!(rig.controller.confidence_bar().left_width() > rig.controller.confidence_bar().right_width());
}

#[tokio::test]
async fn grids_keep_only_the_most_recent_photos() {
    let mut rig = Rig::new();
    rig.classifier
        .script(&[("cat", 0.01), ("dog", 0.98), ("empty", 0.01)]);
    let capacity = rig.controller.grid_capacity();

    let mut now = Instant::now();
    let mut sorted = Vec::new();
    for shade in 0..(capacity as u8 + 3) {
        assert!(rig.step(now, shade).await);
        sorted.push(rig.controller.current_frame().unwrap().captured_at());
        now += Duration::from_millis(2100);
    }

    let grid = rig.controller.grid(SortSide::Right);
    assert_eq!(grid.len(), capacity);
    let kept: Vec<_> = grid.images().map(Frame::captured_at).collect();
    assert_eq!(kept, sorted[sorted.len() - capacity..].to_vec());
    assert_eq!(rig.sent.lock().unwrap().len(), capacity + 3);
}

#[tokio::test]
async fn resize_keeps_sorted_photos() {
    let mut rig = Rig::new();
    rig.classifier
        .script(&[("cat", 0.99), ("dog", 0.0), ("empty", 0.01)]);
    let start = Instant::now();
    rig.step(start, 1).await;
    rig.step(start + Duration::from_millis(2100), 2).await;
    let before: Vec<_> = rig.controller.grid(SortSide::Left).images().map(Frame::id).collect();

    rig.controller.resize(vec2(900.0, 700.0));
    rig.controller.resize(vec2(1920.0, 1080.0));

    let after: Vec<_> = rig.controller.grid(SortSide::Left).images().map(Frame::id).collect();
    assert_eq!(before.len(), 2);
    assert_eq!(before, after);
    assert!(rig.controller.is_link_open());
}

#[test]
fn simulated_sorter_follows_the_bytes() {
    let mut controller = SorterController::new(&Settings::default(), vec2(1280.0, 800.0));
    controller.set_model(
        ModelLabels::new(vec!["cat".into(), "dog".into(), "empty".into()]).unwrap(),
    );
    let link = LoopbackLink::new();
    let sent = link.sent_bytes();
    controller.attach_link(Box::new(link));

    let now = Instant::now();
    let frame = controller.tick(now, Some(camera_frame(3))).unwrap();
    let result = tiny_sorter::pipeline::ClassificationResult::new(
        frame.id(),
        vec![
            Prediction::new("cat", 0.93),
            Prediction::new("dog", 0.05),
            Prediction::new("empty", 0.02),
        ],
    );
    controller.complete(Ok(result), now);

    let mut firmware = tiny_sorter::serial::SorterFirmware::new();
    firmware.poll(&sent.lock().unwrap());
    assert_eq!(firmware.angle(), LEFT_POSITION);
}
