//! Interactive window: slider panel on the left, processed frame in the
//! center. `S` saves the displayed frame, `Esc` closes.

use std::time::{Duration, Instant};

use eframe::egui;
use framelab_core::Frame;
use framelab_videoio::{VideoCapture, VideoError};
use log::{info, warn};

use crate::pipeline::{
    MorphParams, PipelineParams, MAX_CANNY_HIGH, MAX_CANNY_LOW, MAX_KERNEL_INDEX, MAX_PERCENT,
};

const VIDEO_FRAME_INTERVAL: Duration = Duration::from_millis(30);

const STILL_SAVE_NAME: &str = "modified_image.png";
const PANORAMA_SAVE_NAME: &str = "stitched_image.png";

pub enum Source {
    Still(Frame),
    Video(Box<dyn VideoCapture>),
    Panorama(Frame),
}

pub fn run(source: Source) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_title("framelab"),
        ..Default::default()
    };

    eframe::run_native(
        "framelab",
        options,
        Box::new(|cc| Ok(Box::new(ViewerApp::new(cc, source)))),
    )
}

struct ViewerApp {
    params: PipelineParams,
    capture: Option<Box<dyn VideoCapture>>,
    current: Option<Frame>,
    processed: Option<Frame>,
    texture: Option<egui::TextureHandle>,
    dirty: bool,
    is_panorama: bool,
    stream_ended: bool,
    last_advance: Option<Instant>,
    status: String,
}

impl ViewerApp {
    fn new(_cc: &eframe::CreationContext<'_>, source: Source) -> Self {
        let (current, capture, is_panorama) = match source {
            Source::Still(frame) => (Some(frame), None, false),
            Source::Video(capture) => (None, Some(capture), false),
            Source::Panorama(frame) => (Some(frame), None, true),
        };
        Self {
            params: PipelineParams::default(),
            capture,
            current,
            processed: None,
            texture: None,
            dirty: true,
            is_panorama,
            stream_ended: false,
            last_advance: None,
            status: String::new(),
        }
    }

    /// Pulls the next video frame when the playback interval has elapsed.
    /// A failed read marks the end of the stream and freezes the last frame.
    fn poll_video(&mut self, ctx: &egui::Context) {
        if self.stream_ended {
            return;
        }
        let Some(capture) = self.capture.as_mut() else {
            return;
        };
        let due = self
            .last_advance
            .map_or(true, |at| at.elapsed() >= VIDEO_FRAME_INTERVAL);
        if due {
            match capture.read() {
                Ok(frame) => {
                    self.current = Some(Frame::Rgb(frame));
                    self.dirty = true;
                    self.last_advance = Some(Instant::now());
                }
                Err(VideoError::EndOfStream) => {
                    info!("end of video stream, freezing last frame");
                    self.stream_ended = true;
                }
                Err(err) => {
                    warn!("video read failed: {}", err);
                    self.stream_ended = true;
                }
            }
        }
        ctx.request_repaint_after(VIDEO_FRAME_INTERVAL);
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::S)) {
            self.save_current();
        }
    }

    fn save_current(&mut self) {
        let Some(frame) = self.processed.as_ref().or(self.current.as_ref()) else {
            return;
        };
        let path = if self.is_panorama {
            PANORAMA_SAVE_NAME
        } else {
            STILL_SAVE_NAME
        };
        match frame.save(path) {
            Ok(()) => {
                info!("saved {}", path);
                self.status = format!("Saved {}", path);
            }
            Err(err) => {
                warn!("failed to save {}: {}", path, err);
                self.status = format!("Save failed: {}", err);
            }
        }
    }

    fn reprocess(&mut self, ctx: &egui::Context) {
        let Some(current) = self.current.as_ref() else {
            return;
        };
        let processed = self.params.apply(current);
        if processed.is_empty() {
            self.status = "Pipeline produced an empty frame".to_string();
            return;
        }
        let color = frame_to_color_image(&processed);
        self.processed = Some(processed);
        match self.texture.as_mut() {
            Some(texture) => texture.set(color, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("frame", color, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;

        ui.heading("Processing stages");
        ui.separator();

        changed |= morph_controls(ui, "Erosion", &mut self.params.erosion);
        changed |= morph_controls(ui, "Dilation", &mut self.params.dilation);

        changed |= ui
            .checkbox(&mut self.params.resize.active, "Resize")
            .changed();
        if self.params.resize.active {
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.params.resize.percent, 0..=MAX_PERCENT)
                        .text("Percent"),
                )
                .changed();
        }

        changed |= ui
            .checkbox(&mut self.params.brightness.active, "Brightness")
            .changed();
        if self.params.brightness.active {
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.params.brightness.percent, 0..=MAX_PERCENT)
                        .text("Percent"),
                )
                .changed();
        }

        changed |= ui
            .checkbox(&mut self.params.canny.active, "Canny edges")
            .changed();
        if self.params.canny.active {
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.params.canny.low, 0..=MAX_CANNY_LOW)
                        .text("Low threshold"),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.params.canny.high, 0..=MAX_CANNY_HIGH)
                        .text("High threshold"),
                )
                .changed();
        }

        ui.separator();
        if ui.button("Reset").clicked() {
            self.params = PipelineParams::default();
            changed = true;
        }

        ui.separator();
        ui.label("S saves the current frame");
        ui.label("Esc quits");
        if !self.status.is_empty() {
            ui.separator();
            ui.label(&self.status);
        }

        changed
    }

    fn image_view(&self, ui: &mut egui::Ui) {
        let Some(texture) = &self.texture else {
            ui.centered_and_justified(|ui| {
                ui.label("Waiting for the first frame...");
            });
            return;
        };
        let available = ui.available_size();
        let size = texture.size_vec2();
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let scale = (available.x / size.x).min(available.y / size.y);
        ui.centered_and_justified(|ui| {
            ui.add(egui::Image::new(texture).fit_to_exact_size(size * scale));
        });
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_video(ctx);
        self.handle_keys(ctx);

        let changed = egui::SidePanel::left("controls")
            .default_width(240.0)
            .show(ctx, |ui| self.controls(ui))
            .inner;
        if changed {
            self.dirty = true;
        }

        if self.dirty {
            self.reprocess(ctx);
            self.dirty = false;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.image_view(ui);
        });
    }
}

fn morph_controls(ui: &mut egui::Ui, label: &str, params: &mut MorphParams) -> bool {
    let mut changed = ui.checkbox(&mut params.active, label).changed();
    if params.active {
        ui.indent(label, |ui| {
            let shapes = ["Rectangle", "Cross", "Ellipse"];
            egui::ComboBox::from_id_salt(label)
                .selected_text(shapes[params.element as usize % shapes.len()])
                .show_ui(ui, |ui| {
                    for (i, name) in shapes.iter().enumerate() {
                        changed |= ui
                            .selectable_value(&mut params.element, i as u8, *name)
                            .changed();
                    }
                });
            changed |= ui
                .add(
                    egui::Slider::new(&mut params.size, 0..=MAX_KERNEL_INDEX)
                        .text("Kernel size (2n+1)"),
                )
                .changed();
        });
    }
    changed
}

fn frame_to_color_image(frame: &Frame) -> egui::ColorImage {
    match frame {
        Frame::Rgb(img) => egui::ColorImage::from_rgb(
            [img.width() as usize, img.height() as usize],
            img.as_raw(),
        ),
        Frame::Gray(img) => egui::ColorImage::from_gray(
            [img.width() as usize, img.height() as usize],
            img.as_raw(),
        ),
    }
}
