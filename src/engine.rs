//! Engine startup and the main loop.
//!
//! The engine drives a fixed per-frame sequence: compute elapsed time,
//! drain the message bus, update the game, render, then reschedule by
//! requesting the next redraw. The winit redraw request is the external
//! tick signal; [`App::tick`] is the single re-entry point, so the frame
//! source stays swappable.
//!
//! # Lifecycle
//!
//! 1. `Engine::start` builds the event loop and hands control to winit
//! 2. On resume: window + GPU context creation, capability logging,
//!    renderer construction, initial resize
//! 3. `Game::setup` registers materials, then the scene graph loads
//! 4. Preloading: queued messages flush, `Game::update_ready` runs
//! 5. The continuous loop begins and runs until the process exits

use std::sync::Arc;

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    assets::AssetManager,
    context::Context,
    message::MessageBus,
    renderer::{RenderView, Renderer, ViewportCreateInfo},
    world::scene_graph::SceneGraph,
};

/// One-way engine lifecycle; there is no reverse transition and no
/// engine-level stop. The hosting process ending is the shutdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Starting,
    Running,
}

/// Game-specific logic hosted by the engine.
///
/// The default lifecycle methods delegate to the game's scene graph, which
/// is what most games want; override them to layer extra work around the
/// scene.
pub trait Game {
    fn scene(&self) -> &SceneGraph;

    /// One-time hook before the scene loads. The place to register
    /// materials and request initial assets.
    fn setup(
        &mut self,
        _ctx: &mut Context,
        _assets: &AssetManager,
        _bus: &MessageBus,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once before the main loop begins, after engine subsystems
    /// are ready.
    fn update_ready(&mut self) {
        self.scene().root().update_ready();
    }

    /// Per-frame update with the elapsed time since the previous frame.
    fn update(&mut self, delta: Duration) {
        self.scene().update(delta);
    }

    /// Per-frame render with the populated render view and active pass.
    fn render(
        &mut self,
        _delta: Duration,
        render_view: &RenderView,
        ctx: &Context,
        render_pass: &mut wgpu::RenderPass<'_>,
    ) {
        self.scene().render(render_view, ctx, render_pass);
    }
}

/// The main engine: owns the shared subsystems and the loop configuration.
pub struct Engine {
    create_info: ViewportCreateInfo,
    state: EngineState,
    bus: MessageBus,
    assets: AssetManager,
}

impl Engine {
    pub fn new(create_info: ViewportCreateInfo) -> Self {
        let bus = MessageBus::new();
        let assets = AssetManager::new(bus.clone());
        Self {
            create_info,
            state: EngineState::Uninitialized,
            bus,
            assets,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn message_bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }

    /// Starts the engine and blocks on the event loop until the hosting
    /// process terminates.
    pub fn start(mut self, game: Box<dyn Game>) -> anyhow::Result<()> {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        }

        self.state = EngineState::Starting;
        let event_loop = EventLoop::new()?;
        let mut app = App::new(self, game);
        event_loop.run_app(&mut app)?;
        Ok(())
    }
}

/// GPU-backed state that only exists once the window is up.
struct EngineCore {
    ctx: Context,
    renderer: Renderer,
    is_surface_configured: bool,
}

struct App {
    engine: Engine,
    game: Box<dyn Game>,
    async_runtime: tokio::runtime::Runtime,
    core: Option<EngineCore>,
    last_time: Instant,
}

impl App {
    fn new(engine: Engine, game: Box<dyn Game>) -> Self {
        let async_runtime = tokio::runtime::Runtime::new().expect("failed to start async runtime");
        Self {
            engine,
            game,
            async_runtime,
            core: None,
            last_time: Instant::now(),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(core) = &mut self.core {
            if width > 0 && height > 0 {
                core.ctx.resize(width, height);
                core.renderer.on_resize(width, height);
                core.is_surface_configured = true;
            }
        }
    }

    /// One frame: elapsed time, message drain, update, render, reschedule.
    fn tick(&mut self) {
        let Some(core) = &mut self.core else {
            return;
        };

        // Reschedule immediately so the loop re-enters on the next refresh.
        core.ctx.window.request_redraw();
        if !core.is_surface_configured {
            return;
        }

        let delta = self.last_time.elapsed();

        self.engine.bus.update();
        self.game.update(delta);

        match core.renderer.begin_render(&core.ctx, delta, self.game.as_mut()) {
            Ok(()) => core.renderer.end_render(),
            // Reconfigure the surface if it's lost or outdated.
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = core.ctx.window.inner_size();
                core.ctx.resize(size.width, size.height);
                core.renderer.on_resize(size.width, size.height);
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
            }
        }

        self.last_time = Instant::now();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let mut window_attributes = Window::default_attributes().with_inner_size(
            PhysicalSize::new(self.engine.create_info.width, self.engine.create_info.height),
        );
        if let Some(surface_id) = &self.engine.create_info.surface_id {
            window_attributes = window_attributes.with_title(surface_id);
        }

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("failed to create the engine window"),
        );

        let mut ctx = match self.async_runtime.block_on(Context::new(window)) {
            Ok(ctx) => ctx,
            Err(e) => panic!(
                "Engine initialization failed. Cannot create the main context: {}",
                e
            ),
        };

        let renderer = Renderer::new(self.engine.create_info.clone());

        if let Err(e) = self
            .game
            .setup(&mut ctx, &self.engine.assets, &self.engine.bus)
        {
            panic!("Game setup failed: {}", e);
        }
        if let Err(e) = self.game.scene().load(&ctx) {
            panic!("Scene graph failed to load: {}", e);
        }

        let size = ctx.window.inner_size();
        self.core = Some(EngineCore {
            ctx,
            renderer,
            is_surface_configured: false,
        });
        self.resize(size.width, size.height);

        // Preloading phase: flush queued messages, then let the game finish
        // its pre-update work before the first frame.
        self.engine.bus.update();
        self.game.update_ready();

        self.engine.state = EngineState::Running;
        self.last_time = Instant::now();
        if let Some(core) = &self.core {
            core.ctx.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.tick(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullGame {
        scene: SceneGraph,
    }

    impl Game for NullGame {
        fn scene(&self) -> &SceneGraph {
            &self.scene
        }
    }

    #[test]
    fn engine_starts_uninitialized() {
        let engine = Engine::new(ViewportCreateInfo::default());
        assert_eq!(engine.state(), EngineState::Uninitialized);
    }

    #[test]
    fn default_game_lifecycle_delegates_to_the_scene() {
        use crate::math::{Transform, Vector3};
        use crate::world::entity::Entity;

        let game = NullGame {
            scene: SceneGraph::new(),
        };
        let entity = game.scene().add_object(Entity::new("prop"));
        entity.set_transform(Transform::from_position(Vector3::new(3.0, 0.0, 0.0)));

        let mut game: Box<dyn Game> = Box::new(game);
        game.update_ready();
        game.update(Duration::from_millis(16));
        assert_eq!(entity.world_position(), Vector3::new(3.0, 0.0, 0.0));
    }
}
