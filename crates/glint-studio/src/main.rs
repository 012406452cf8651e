use std::f32::consts::{PI, TAU};

use anyhow::Context;
use glint_engine::coords::{Mat4, Quat, Rect, Vec2, Vec3};
use glint_engine::core::{App, AppControl, FrameCtx};
use glint_engine::input::Key;
use glint_engine::logging::{init_logging, LoggingConfig};
use glint_engine::paint::Color;
use glint_engine::render::{
    vertex, vertex_uv, CapType, FramebufferId, GeometryError, Image, TextureFilter, TextureId,
    TextureSettings, TextureWrap, Vertex, WindowRenderer,
};
use glint_engine::window::{Runtime, RuntimeConfig};

const BACKGROUND: Color = Color::rgb(0.08, 0.09, 0.11);
const ACCENT: Color = Color::rgb(0.95, 0.55, 0.2);
const TEAL: Color = Color::rgb(0.2, 0.75, 0.7);
const PANEL_SIZE: u32 = 256;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Scene {
    Primitives,
    Stencil,
    Offscreen,
    Perspective,
}

struct Studio {
    scene: Scene,
    checker: Option<TextureId>,
    panel: Option<FramebufferId>,
    cursor_radius: f32,
    inverse_mask: bool,
    culling: bool,
    orbit_camera: bool,
}

impl Studio {
    fn new() -> Self {
        Self {
            scene: Scene::Primitives,
            checker: None,
            panel: None,
            cursor_radius: 24.0,
            inverse_mask: false,
            culling: false,
            orbit_camera: true,
        }
    }

    fn handle_keys(&mut self, ctx: &mut FrameCtx<'_, '_>) {
        let input = ctx.input;
        let scenes = [
            (Key::Digit1, Scene::Primitives),
            (Key::Digit2, Scene::Stencil),
            (Key::Digit3, Scene::Offscreen),
            (Key::Digit4, Scene::Perspective),
        ];
        for (key, scene) in scenes {
            if input.key_just_pressed(key) && self.scene != scene {
                log::info!("scene: {scene:?}");
                self.scene = scene;
            }
        }

        if input.key_just_pressed(Key::I) {
            self.inverse_mask = !self.inverse_mask;
        }
        if input.key_just_pressed(Key::C) {
            self.culling = !self.culling;
        }
        if input.key_just_pressed(Key::V) {
            self.orbit_camera = !self.orbit_camera;
        }
        if input.key_just_pressed(Key::R) {
            ctx.clock.set_time(0.0);
        }
        if input.key_just_pressed(Key::M) {
            let (w, h) = ctx.window.size();
            ctx.window.set_mouse_position(Vec2::new(w as f32 / 2.0, h as f32 / 2.0));
        }

        self.cursor_radius = (self.cursor_radius + input.mouse_scroll() * 4.0).clamp(4.0, 200.0);
    }
}

// ── scenes ────────────────────────────────────────────────────────────────

fn primitives(r: &mut WindowRenderer<'_>, checker: Option<TextureId>, t: f32) -> Result<(), GeometryError> {
    r.set_draw_color(ACCENT);
    r.draw_triangle(vertex(40.0, 40.0), vertex(160.0, 40.0), vertex(100.0, 150.0));
    r.draw_triangle_outline(vertex(200.0, 40.0), vertex(320.0, 40.0), vertex(260.0, 150.0), 4.0)?;

    r.set_draw_color(TEAL);
    r.draw_quad(vertex(360.0, 40.0), vertex(480.0, 50.0), vertex(470.0, 150.0), vertex(370.0, 140.0));
    r.draw_quad_outline(
        vertex(520.0, 40.0),
        vertex(640.0, 50.0),
        vertex(630.0, 150.0),
        vertex(530.0, 140.0),
        3.0,
    )?;

    r.set_draw_color(Color::WHITE);
    r.draw_rect(Rect::new(40.0, 200.0, 160.0, 300.0));
    r.draw_rect_outline(Rect::new(200.0, 200.0, 320.0, 300.0), 6.0);

    let center = Vec2::new(420.0, 250.0);
    let edges = r.edge_count(50.0, TAU);
    r.set_draw_color(ACCENT);
    r.draw_circle(center, 50.0, edges)?;
    r.set_draw_color(Color::WHITE);
    r.draw_circle_outline(center, 55.0, edges, 3.0)?;

    let center = Vec2::new(580.0, 250.0);
    let sweep = (t.sin() * 0.5 + 0.5) * TAU;
    let edges = r.edge_count(50.0, sweep).max(1);
    r.set_draw_color(TEAL);
    r.draw_arc(center, 50.0, 0.0, sweep, edges)?;
    r.draw_arc_outline(center, 56.0, 0.0, sweep, edges, 4.0)?;

    r.set_draw_color(Color::WHITE);
    r.draw_line(Vec2::new(40.0, 360.0), Vec2::new(300.0, 420.0), 12.0, CapType::None)?;
    r.draw_line(Vec2::new(40.0, 440.0), Vec2::new(300.0, 500.0), 12.0, CapType::Circle)?;
    r.set_draw_color(ACCENT);
    r.draw_line_outline(Vec2::new(360.0, 360.0), Vec2::new(620.0, 420.0), 12.0, CapType::None, 2.0)?;
    r.draw_line_outline(Vec2::new(360.0, 440.0), Vec2::new(620.0, 500.0), 12.0, CapType::Circle, 2.0)?;

    if let Some(checker) = checker {
        // uv past 1.0 repeats the tile.
        r.set_texture(Some(checker));
        r.set_draw_color(Color::WHITE);
        r.draw_quad(
            vertex_uv(680.0, 40.0, 0.0, 0.0),
            vertex_uv(880.0, 40.0, 4.0, 0.0),
            vertex_uv(880.0, 240.0, 4.0, 4.0),
            vertex_uv(680.0, 240.0, 0.0, 4.0),
        );
        r.set_texture(None);
    }
    Ok(())
}

fn stencil(r: &mut WindowRenderer<'_>, inverse: bool, t: f32) -> Result<(), GeometryError> {
    let (w, h) = (r.vw(), r.vh());
    let center = Vec2::new(w / 2.0 + t.cos() * 120.0, h / 2.0);

    r.start_stencilling(false, inverse);
    let edges = r.edge_count(160.0, TAU);
    r.draw_circle(center, 160.0, edges)?;
    r.draw_rect(Rect::new(40.0, 40.0, 200.0, 200.0));

    r.start_using_stencil();
    let stripe = 24.0;
    for i in 0..(w / stripe) as i32 + 1 {
        let x = i as f32 * stripe;
        r.set_draw_color(if i % 2 == 0 { ACCENT } else { TEAL });
        r.draw_rect(Rect::new(x, 0.0, x + stripe, h));
    }

    r.lift_stencil();
    r.set_draw_color(Color::WHITE);
    r.draw_circle_outline(center, 160.0, edges, 2.0)
}

fn offscreen(r: &mut WindowRenderer<'_>, panel: FramebufferId, t: f32) -> Result<(), GeometryError> {
    let half = PANEL_SIZE as f32 / 2.0;

    r.use_framebuffer(Some(panel));
    r.clear_screen(Color::rgb(0.15, 0.1, 0.25));
    r.set_transform(
        Mat4::from_translation(Vec3::new(half, half, 0.0))
            * Mat4::from_rotation_z(t)
            * Mat4::from_translation(Vec3::new(-half, -half, 0.0)),
    );
    r.set_draw_color(ACCENT);
    r.draw_rect(Rect::new(half - 60.0, half - 60.0, half + 60.0, half + 60.0));
    r.set_draw_color(TEAL);
    let edges = r.edge_count(30.0, TAU);
    r.draw_circle(Vec2::new(half, half), 30.0, edges)?;
    r.set_transform(Mat4::IDENTITY);
    r.use_framebuffer(None);

    let texture = r.framebuffer_texture(panel);
    r.set_texture(texture);
    for (i, tint) in [Color::WHITE, ACCENT, TEAL].into_iter().enumerate() {
        let x = 40.0 + i as f32 * (PANEL_SIZE as f32 + 20.0);
        r.set_draw_color(tint);
        r.draw_rect(Rect::new(x, 40.0, x + PANEL_SIZE as f32, 40.0 + PANEL_SIZE as f32));
    }
    r.set_texture(None);
    Ok(())
}

fn perspective(r: &mut WindowRenderer<'_>, culling: bool, orbit_camera: bool, t: f32) {
    let aspect = r.vw() / r.vh().max(1.0);
    r.set_projection_perspective(PI / 3.0, aspect, 0.1, 100.0);
    if orbit_camera {
        let eye = Vec3::new(4.0 * (t * 0.5).sin(), 1.5, 4.0 * (t * 0.5).cos());
        r.set_view_look_at(eye, Vec3::ZERO, Vec3::Y);
    } else {
        r.set_view_orientation(Vec3::new(0.0, -0.5, -4.5), Quat::from_rotation_x(0.3));
    }
    r.set_backface_culling(culling);

    let corner = |x: f32, y: f32, u: f32, v: f32| Vertex::new(Vec3::new(x, y, 1.0), Vec2::new(u, v));
    let faces: [(Quat, Color); 4] = [
        (Quat::IDENTITY, ACCENT),
        (Quat::from_rotation_y(PI / 2.0), TEAL),
        (Quat::from_rotation_y(PI), Color::WHITE),
        (Quat::from_rotation_y(-PI / 2.0), Color::rgb(0.6, 0.3, 0.8)),
    ];

    for (rotation, color) in faces {
        r.set_transform(Mat4::from_quat(Quat::from_rotation_y(t) * rotation));
        r.set_draw_color(color);
        r.draw_quad(
            corner(-1.0, -1.0, 0.0, 0.0),
            corner(1.0, -1.0, 1.0, 0.0),
            corner(1.0, 1.0, 1.0, 1.0),
            corner(-1.0, 1.0, 0.0, 1.0),
        );
    }

    r.set_transform(Mat4::IDENTITY);
    r.set_backface_culling(false);
    let layout = r.default_layout_rect();
    r.set_layout_rect(layout, false);
}

// ── app ───────────────────────────────────────────────────────────────────

fn checker_image(cells: u32) -> Image {
    let mut data = Vec::with_capacity((cells * cells * 4) as usize);
    for y in 0..cells {
        for x in 0..cells {
            let on = (x + y) % 2 == 0;
            data.extend_from_slice(if on { &[235, 235, 235, 255] } else { &[40, 40, 48, 255] });
        }
    }
    Image::rgba(cells, cells, data)
}

impl App for Studio {
    fn on_start(&mut self, renderer: &mut WindowRenderer<'_>) -> anyhow::Result<()> {
        let info = renderer.backend().gpu().adapter_info();
        log::info!("studio running on {} ({:?})", info.name, info.backend);

        let settings = TextureSettings {
            filter: TextureFilter::Nearest,
            wrap: TextureWrap::Repeat,
        };
        self.checker = Some(
            renderer
                .create_texture(&checker_image(8), settings)
                .context("failed to create checker texture")?,
        );
        self.panel = Some(
            renderer
                .create_framebuffer(PANEL_SIZE, PANEL_SIZE)
                .context("failed to create offscreen panel")?,
        );
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input.key_just_pressed(Key::Escape) {
            return AppControl::Exit;
        }
        self.handle_keys(ctx);

        let t = ctx.time() as f32;
        let r = &mut *ctx.renderer;
        r.clear_screen(BACKGROUND);

        let drawn = match (self.scene, self.panel) {
            (Scene::Primitives, _) => primitives(r, self.checker, t),
            (Scene::Stencil, _) => stencil(r, self.inverse_mask, t),
            (Scene::Offscreen, Some(panel)) => offscreen(r, panel, t),
            (Scene::Offscreen, None) => Ok(()),
            (Scene::Perspective, _) => {
                perspective(r, self.culling, self.orbit_camera, t);
                Ok(())
            }
        };
        if let Err(err) = drawn {
            log::warn!("scene {:?}: {err}", self.scene);
        }

        // Cursor ring, pressed buttons fill it.
        let mouse = ctx.input.mouse_position();
        let edges = r.edge_count(self.cursor_radius, TAU);
        r.set_draw_color(Color::rgba(1.0, 1.0, 1.0, 0.8));
        let ring = if ctx.input.mouse_any_down() {
            r.draw_circle(mouse, self.cursor_radius, edges)
        } else {
            r.draw_circle_outline(mouse, self.cursor_radius, edges, 2.0)
        };
        if let Err(err) = ring {
            log::warn!("cursor: {err}");
        }

        if ctx.input.key_just_pressed(Key::Space) {
            log::info!(
                "frame dt {:.2} ms, {} flushes so far",
                ctx.dt() * 1000.0,
                ctx.renderer.flush_count()
            );
        }

        AppControl::Continue
    }

    fn on_exit(&mut self, renderer: &mut WindowRenderer<'_>) {
        if let Some(panel) = self.panel.take() {
            renderer.destroy_framebuffer(panel);
        }
        if let Some(checker) = self.checker.take() {
            renderer.destroy_texture(checker);
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "glint studio (1-4 scenes, I mask, C culling, V camera, Esc quit)".to_string(),
        width: 960,
        height: 560,
        ..RuntimeConfig::default()
    };

    Runtime::run(config, Studio::new())
}
