use crate::config::Settings;
use crate::input::{classify_key, KeyAction, ResponseKey};
use crate::presenter::WindowPresenter;
use crate::renderer::StimulusRenderer;
use crate::text::TextPainter;
use anyhow::Result;
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tiny_skia::Pixmap;
use tracing::{debug, error, info, warn};
use vrt_core::InputSignal;
use vrt_experiment::{
    ControlAction, CsvFileSink, ExportBundle, ExperimentStateMachine, InputOutcome, ResultSink,
};
use vrt_timing::HighPrecisionTimer;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Fullscreen, Window, WindowId},
};

type Experiment = ExperimentStateMachine<HighPrecisionTimer, StdRng, WindowPresenter>;

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    experiment: Experiment,
    renderer: Option<StimulusRenderer>,
    canvas: Option<Pixmap>,
    sink: CsvFileSink,
    response_key: ResponseKey,
    font_path: Option<PathBuf>,
    should_exit: bool,
}

impl App {
    pub fn new(settings: &Settings, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let experiment = ExperimentStateMachine::new(
            settings.experiment_config()?,
            HighPrecisionTimer::new(),
            rng,
            WindowPresenter::new(),
        )?;
        let sink = CsvFileSink::new(
            settings.export.output_dir.clone(),
            settings.export.file_prefix.clone(),
        );

        Ok(Self {
            window: None,
            pixels: None,
            experiment,
            renderer: None,
            canvas: None,
            sink,
            response_key: settings.input.response_key,
            font_path: settings.display.font_path.clone(),
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "=== VISUAL REACTION TEST ==="
        );
        info!(response_key = ?self.response_key, "{}", self.instructions().join(" "));

        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn instructions(&self) -> Vec<String> {
        vec![
            "Press ENTER (or click) to start.".to_string(),
            format!(
                "Press {} as soon as the arrow appears. ESC exits.",
                self.response_key.label()
            ),
        ]
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow::anyhow!("No monitor available"))?;

        let window_attributes = Window::default_attributes()
            .with_title("Visual Reaction Test")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        info!(
            width = physical_size.width,
            height = physical_size.height,
            scale = window.scale_factor(),
            "Display configured"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);
        self.canvas = Pixmap::new(physical_size.width, physical_size.height);
        self.renderer = Some(StimulusRenderer::new(
            physical_size.width,
            physical_size.height,
            TextPainter::load(self.font_path.as_deref()),
            self.instructions(),
        ));

        window.set_cursor_visible(false);
        self.experiment.presenter_mut().attach(window.clone());
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer), Some(canvas)) =
            (self.pixels.as_mut(), self.renderer.as_ref(), self.canvas.as_mut())
        else {
            return Ok(());
        };

        renderer.render_frame(
            canvas,
            self.experiment.presenter().view(),
            self.experiment.trial_progress(),
        )?;

        let frame = pixels.frame_mut();
        if frame.len() == canvas.data().len() {
            frame.copy_from_slice(canvas.data());
        }
        pixels.render()?;
        Ok(())
    }

    /// Fires the delay timer if due and sleeps the loop until the next deadline.
    fn update(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.experiment.update() {
            error!(%err, "experiment update failed");
        }
        match self.experiment.pending_deadline() {
            Some(deadline) => {
                let wake = self.experiment.timer().instant_at(deadline.due_ms);
                event_loop.set_control_flow(ControlFlow::WaitUntil(wake));
            }
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn handle_key(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = key else {
            warn!(?key, "unidentified key ignored");
            return;
        };
        match classify_key(code, self.response_key) {
            Ok(KeyAction::Signal(signal)) => self.dispatch(signal),
            Ok(KeyAction::Exit) => self.cleanup_and_exit(event_loop),
            Err(err) if !err.is_fatal() => warn!(%err, "key ignored"),
            Err(err) => {
                error!(%err, "key handling failed");
                self.cleanup_and_exit(event_loop);
            }
        }
    }

    fn dispatch(&mut self, signal: InputSignal) {
        match self.experiment.handle_input(signal) {
            Ok(InputOutcome::Captured(sample)) => {
                let (done, total) = self.experiment.trial_progress();
                debug!(done, total, latency_ms = sample.reaction_latency_ms, "trial done");
            }
            Ok(InputOutcome::Control(ControlAction::Export(bundle))) => self.export(bundle),
            Ok(InputOutcome::Control(ControlAction::Started)) => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Ok(_) => {}
            Err(err) => error!(%err, "input handling failed"),
        }
    }

    fn export(&mut self, bundle: ExportBundle) {
        if bundle.table.is_empty() {
            warn!("no trials recorded; nothing to save");
            return;
        }
        match self.sink.accept(&bundle.table) {
            Ok(path) => info!(path = %path.display(), "Results saved"),
            Err(err) => error!(%err, "could not save results"),
        }
        info!("{}", bundle.statistics);
        self.experiment.presenter_mut().show_summary(&bundle.statistics);
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                error!(%e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                error!(%e, "failed to resize buffer");
            }
        }
        self.canvas = Pixmap::new(new_size.width, new_size.height);
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(new_size.width, new_size.height);
        }
        debug!(width = new_size.width, height = new_size.height, "display resized");
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        let (done, total) = self.experiment.trial_progress();
        if self.experiment.phase().is_running() {
            warn!(done, total, "Exiting mid-run; results are not saved");
        } else {
            info!(done, total, phase = %self.experiment.phase(), "Exiting");
        }
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!(%e, "failed to create window and surface");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!(%e, "render failed");
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                self.handle_key(event.physical_key, event_loop);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.dispatch(InputSignal::Control),
            WindowEvent::Resized(size) => self.handle_resize(size),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
            return;
        }
        self.update(event_loop);
    }
}
