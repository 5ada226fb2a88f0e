//! Winit application handler: window lifecycle, input routing, and the
//! per-frame update/draw loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use lumen_config::{Config, SessionState};
use lumen_input::{KeyboardState, MouseState};
use lumen_render::{
    PostFxController, PostFxPipeline, RenderContext, SurfaceError, ToggleInput, ToggleState,
    init_render_context_blocking,
};
use lumen_scene::{FlyCamera, MoveDirection};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::KeyCode;
use winit::window::{Fullscreen, Window, WindowId};

/// Largest frame delta fed to movement, so a stall does not teleport the
/// camera.
const MAX_FRAME_DT: f32 = 0.1;

pub struct App {
    config: Config,
    config_dir: PathBuf,
    session: SessionState,
    state: Option<AppState>,
}

struct AppState {
    window: Arc<Window>,
    ctx: RenderContext,
    post: PostFxPipeline,
    scene: crate::scene::SceneRenderer,
    keyboard: KeyboardState,
    mouse: MouseState,
    controller: PostFxController,
    toggles: ToggleState,
    camera: FlyCamera,
    start: Instant,
    last_frame: Instant,
}

impl App {
    pub fn new(config: Config, session: SessionState, config_dir: PathBuf) -> Self {
        Self {
            config,
            config_dir,
            session,
            state: None,
        }
    }

    fn save_session(&mut self) {
        if let Some(state) = &self.state {
            self.session.camera_position = state.camera.position().to_array();
            self.session.camera_front = state.camera.front().to_array();
            self.session.overlay_enabled = !state.mouse.is_captured();
        }
        if let Err(err) = self.session.save(&self.config_dir) {
            tracing::warn!(%err, "failed to save session state");
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let escape = self
            .state
            .as_ref()
            .is_some_and(|state| state.keyboard.just_pressed(KeyCode::Escape));
        if escape {
            self.save_session();
            event_loop.exit();
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let now = Instant::now();
        let dt = (now - state.last_frame).as_secs_f32().min(MAX_FRAME_DT);
        state.last_frame = now;
        let t = state.start.elapsed().as_secs_f32();

        if state.keyboard.just_pressed(KeyCode::Tab) {
            let capture = !state.mouse.is_captured();
            state.mouse.set_captured(&state.window, capture);
        }

        if state.keyboard.is_held(KeyCode::KeyW) {
            state.camera.process_movement(MoveDirection::Forward, dt);
        }
        if state.keyboard.is_held(KeyCode::KeyS) {
            state.camera.process_movement(MoveDirection::Backward, dt);
        }
        if state.keyboard.is_held(KeyCode::KeyA) {
            state.camera.process_movement(MoveDirection::Left, dt);
        }
        if state.keyboard.is_held(KeyCode::KeyD) {
            state.camera.process_movement(MoveDirection::Right, dt);
        }

        let look = state.mouse.look_delta();
        if look != glam::Vec2::ZERO {
            let dy = if self.config.input.invert_y {
                -look.y
            } else {
                look.y
            };
            state.camera.process_look(look.x, dy);
        }
        let scroll = state.mouse.scroll();
        if scroll != 0.0 {
            state.camera.process_scroll(scroll);
        }

        let input = ToggleInput {
            bloom_held: state.keyboard.is_held(KeyCode::KeyB),
            hdr_held: state.keyboard.is_held(KeyCode::KeyH),
            gamma_held: state.keyboard.is_held(KeyCode::KeyG),
            grayscale_held: state.keyboard.is_held(KeyCode::KeyX),
            blinn_held: state.keyboard.is_held(KeyCode::KeyL),
            exposure_down_held: state.keyboard.is_held(KeyCode::KeyN),
            exposure_up_held: state.keyboard.is_held(KeyCode::KeyM),
        };
        state.controller.update(&mut state.toggles, &input);

        let width = state.ctx.surface_config.width;
        let height = state.ctx.surface_config.height;
        let aspect = width as f32 / height.max(1) as f32;
        state
            .scene
            .update(&state.ctx.queue, &state.camera, aspect, &state.toggles, t);
        state.post.update_params(&state.ctx.queue, &state.toggles);

        let surface_texture = match state.ctx.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::OutOfMemory) => {
                tracing::error!("surface out of memory");
                event_loop.exit();
                return;
            }
            Err(err) => {
                tracing::warn!(?err, "skipping frame");
                state.window.request_redraw();
                return;
            }
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let [r, g, b] = self.session.clear_color;
        let clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };

        let mut encoder = state
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame"),
            });
        state
            .post
            .render_frame(&mut encoder, &surface_view, clear_color, |pass| {
                state.scene.draw(pass);
            });
        state.ctx.queue.submit(Some(encoder.finish()));
        surface_texture.present();

        state.keyboard.clear_transients();
        state.mouse.clear_transients();
        state.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let mut attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        if self.config.window.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                tracing::error!(%err, "failed to create window");
                event_loop.exit();
                return;
            }
        };

        let ctx = match init_render_context_blocking(window.clone(), self.config.window.vsync) {
            Ok(ctx) => ctx,
            Err(err) => {
                tracing::error!(%err, "failed to initialize GPU");
                event_loop.exit();
                return;
            }
        };

        let post = match PostFxPipeline::new(
            &ctx.device,
            ctx.surface_format,
            ctx.surface_config.width,
            ctx.surface_config.height,
            self.config.render.msaa_samples,
            self.config.render.blur_iterations,
        ) {
            Ok(post) => post,
            Err(err) => {
                tracing::error!(%err, "failed to build post-processing targets");
                event_loop.exit();
                return;
            }
        };

        let scene = crate::scene::SceneRenderer::new(
            &ctx.device,
            &ctx.queue,
            self.config.render.msaa_samples,
            self.config.render.bloom_threshold,
            Path::new("assets"),
        );

        let mut camera = FlyCamera::from_pose(
            self.session.camera_position.into(),
            self.session.camera_front.into(),
        );
        camera.sensitivity *= self.config.input.mouse_sensitivity;

        let mut mouse = MouseState::new();
        mouse.set_captured(&window, !self.session.overlay_enabled);

        window.request_redraw();
        let now = Instant::now();
        self.state = Some(AppState {
            window,
            ctx,
            post,
            scene,
            keyboard: KeyboardState::new(),
            mouse,
            controller: PostFxController::new(),
            toggles: ToggleState::default(),
            camera,
            start: now,
            last_frame: now,
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.save_session();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.ctx.resize(size.width, size.height);
                    let width = state.ctx.surface_config.width;
                    let height = state.ctx.surface_config.height;
                    if let Err(err) = state.post.resize(&state.ctx.device, width, height) {
                        tracing::error!(%err, "failed to resize render targets");
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(state) = self.state.as_mut() {
                    state.keyboard.process_event(&event);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(state) = self.state.as_mut() {
                    state.mouse.on_scroll(delta);
                }
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event
            && let Some(state) = self.state.as_mut()
        {
            state.mouse.on_raw_motion(dx, dy);
        }
    }
}
