use crate::assets::Palette;
use crate::entities::{Field, GameState, Vector2};
use crate::surface::{Rgb, Sprite, Surface};
use crate::world::World;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::f32::consts::FRAC_PI_8;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 2.0;
/// Columns reserved for the clock in the header.
const TIMER_WIDTH: u16 = 12;

/// A point-and-rotation frame used for a single rotated draw.
#[derive(Debug, Clone, Copy)]
struct Transform {
    origin: Vector2,
    cos: f32,
    sin: f32,
}

impl Transform {
    fn new(origin: Vector2, rotation: f32) -> Self {
        Self {
            origin,
            cos: rotation.cos(),
            sin: rotation.sin(),
        }
    }

    /// Sprite-local point (y down) to field coordinates.
    fn apply(&self, local: Vector2) -> Vector2 {
        Vector2::new(
            self.origin.x + local.x * self.cos - local.y * self.sin,
            self.origin.y + local.x * self.sin + local.y * self.cos,
        )
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

fn glyph(sprite: Sprite) -> char {
    match sprite {
        Sprite::Viper => '▲',
        Sprite::ViperShot | Sprite::ViperSingleShot => '│',
        Sprite::Enemy => '▼',
        Sprite::EnemyShot => '•',
    }
}

/// Line glyph for a heading `rotation` radians clockwise from straight up.
fn heading_glyph(rotation: f32) -> char {
    let folded = rotation.sin().atan2(rotation.cos()).abs();
    let leans_right = rotation.sin() > 0.0;
    if folded < FRAC_PI_8 || folded > 7.0 * FRAC_PI_8 {
        '│'
    } else if folded > 3.0 * FRAC_PI_8 && folded < 5.0 * FRAC_PI_8 {
        '─'
    } else if leans_right == (folded < 4.0 * FRAC_PI_8) {
        '/'
    } else {
        '\\'
    }
}

/// Draws field-space calls into a region of a ratatui buffer.
pub struct TerminalSurface<'a> {
    buffer: &'a mut Buffer,
    area: Rect,
    field: Field,
    palette: &'a Palette,
    background: Rgb,
}

impl<'a> TerminalSurface<'a> {
    pub fn new(buffer: &'a mut Buffer, area: Rect, field: Field, palette: &'a Palette) -> Self {
        Self {
            buffer,
            area,
            field,
            palette,
            background: Rgb::new(0, 0, 0),
        }
    }

    fn scale(&self) -> (f32, f32) {
        (
            self.area.width as f32 / self.field.width,
            self.area.height as f32 / self.field.height,
        )
    }

    fn set_cell(&mut self, col: i32, row: i32, symbol: char, color: Rgb) {
        if col < 0 || row < 0 || col >= self.area.width as i32 || row >= self.area.height as i32 {
            return;
        }
        let position = (self.area.x + col as u16, self.area.y + row as u16);
        if let Some(cell) = self.buffer.cell_mut(position) {
            cell.set_char(symbol).set_fg(to_color(color));
        }
    }

    /// Fills every cell the `w`x`h` box centered at `(x, y)` covers, at least one.
    fn fill_box(&mut self, x: f32, y: f32, w: f32, h: f32, symbol: char, color: Rgb) {
        let (sx, sy) = self.scale();
        let span = |center: f32, size: f32, scale: f32| {
            let start = ((center - size / 2.0) * scale).round() as i32;
            let end = ((center + size / 2.0) * scale).round() as i32;
            (start, end.max(start + 1))
        };
        let (col_start, col_end) = span(x, w, sx);
        let (row_start, row_end) = span(y, h, sy);
        for row in row_start..row_end {
            for col in col_start..col_end {
                self.set_cell(col, row, symbol, color);
            }
        }
    }

    fn plot(&mut self, point: Vector2, symbol: char, color: Rgb) {
        let (sx, sy) = self.scale();
        let col = (point.x * sx).floor() as i32;
        let row = (point.y * sy).floor() as i32;
        self.set_cell(col, row, symbol, color);
    }
}

impl Surface for TerminalSurface<'_> {
    fn clear(&mut self, color: Rgb) {
        self.background = color;
        for row in self.area.top()..self.area.bottom() {
            for col in self.area.left()..self.area.right() {
                if let Some(cell) = self.buffer.cell_mut((col, row)) {
                    cell.reset();
                    cell.set_bg(to_color(color));
                }
            }
        }
    }

    fn draw_centered(&mut self, sprite: Sprite, x: f32, y: f32, w: f32, h: f32, alpha: f32) {
        let color = self.palette.tint(sprite).blend_over(self.background, alpha);
        self.fill_box(x, y, w, h, glyph(sprite), color);
    }

    fn draw_rotated_centered(
        &mut self,
        sprite: Sprite,
        x: f32,
        y: f32,
        _w: f32,
        h: f32,
        rotation: f32,
    ) {
        let color = self.palette.tint(sprite);
        let symbol = match sprite {
            Sprite::EnemyShot => glyph(sprite),
            _ => heading_glyph(rotation),
        };
        let transform = Transform::new(Vector2::new(x, y), rotation);
        // Half a row per step along the sprite's length
        let step = (0.5 / self.scale().1).min(h.max(f32::EPSILON));
        let mut along = -h / 2.0;
        while along <= h / 2.0 {
            self.plot(transform.apply(Vector2::new(0.0, along)), symbol, color);
            along += step;
        }
    }

    fn fill_square(&mut self, x: f32, y: f32, size: f32, color: Rgb, alpha: f32) {
        let color = color.blend_over(self.background, alpha);
        self.fill_box(x, y, size, size, '▓', color);
    }
}

/// Largest region of `area` that shows the whole field at its aspect ratio,
/// leaving the first and last rows for the HUD and a column each side for borders.
pub fn play_area(area: Rect, field: Field) -> Rect {
    let height = area.height.saturating_sub(2);
    let wanted = (height as f32 * field.width / field.height * CELL_ASPECT).round() as u16;
    let width = wanted.min(area.width.saturating_sub(2));
    let height = if width < wanted {
        (width as f32 * field.height / field.width / CELL_ASPECT).round() as u16
    } else {
        height
    };
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + 1,
        width,
        height,
    }
}

/// View struct that holds all game state needed for rendering
pub struct RenderView<'a> {
    pub game_state: GameState,
    pub world: &'a World,
    pub palette: &'a Palette,
    /// Simulation clock, for the entrance flicker
    pub now: u64,
    pub area: Rect,
    pub fps: u32,
    pub elapsed_time_secs: u64,
    /// Sprites loaded, out of the total
    pub assets_progress: (usize, usize),
}

/// Handles all rendering responsibilities for the game
#[derive(Debug, Default)]
pub struct GameRenderer {}

impl GameRenderer {
    pub fn new() -> Self {
        Self {}
    }

    /// Main render method that dispatches to state-specific renderers
    pub fn render(&self, frame: &mut Frame, view: &RenderView) {
        match view.game_state {
            GameState::Loading => self.render_loading(frame, view),
            GameState::Playing => self.render_game(frame, view),
            GameState::Paused => self.render_paused(frame, view),
            GameState::GameOver => self.render_game_over(frame, view),
        }
    }

    fn render_loading(&self, frame: &mut Frame, view: &RenderView) {
        let (loaded, total) = view.assets_progress;
        let text = vec![
            Line::from(""),
            Line::from("LOADING").centered().bold().cyan(),
            Line::from(""),
            Line::from(format!("Sprites {loaded}/{total}")).centered().white(),
        ];
        frame.render_widget(
            Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center),
            centered(view.area, 30, 6),
        );
    }

    /// Renders the active gameplay screen
    fn render_game(&self, frame: &mut Frame, view: &RenderView) {
        let area = view.area;
        let field = view.world.field();
        let game_area = play_area(area, field);

        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray));
        let framed = Rect {
            x: game_area.x.saturating_sub(1),
            width: game_area.width + 2,
            ..game_area
        };
        frame.render_widget(block, framed);

        let mut surface = TerminalSurface::new(frame.buffer_mut(), game_area, field, view.palette);
        view.world.draw(&mut surface, view.now);

        self.render_hud(frame, view);
    }

    fn render_hud(&self, frame: &mut Frame, view: &RenderView) {
        let area = view.area;
        let world = view.world;
        let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::DarkGray));
        let value = |text: String, color: Color| {
            Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };

        let shots = world.player_shots().active_count() + world.player_single_shots().active_count();
        let phase = world.phase().map_or("-", |phase| phase.name());
        let stats_left = Line::from(vec![
            label("Phase: "),
            value(phase.to_string(), Color::Magenta),
            label("  Enemies: "),
            value(world.enemies().active_count().to_string(), Color::Cyan),
            label("  Shots: "),
            value(shots.to_string(), Color::Yellow),
            label("  Bursts: "),
            value(world.bursts().active_count().to_string(), Color::Red),
            label("  FPS: "),
            value(view.fps.to_string(), Color::White),
        ]);
        let stats_area = Rect {
            x: area.x + 1,
            y: area.y,
            width: area.width.saturating_sub(TIMER_WIDTH + 2),
            height: 1,
        };
        frame.render_widget(Paragraph::new(stats_left), stats_area);

        let timer_text = Line::from(vec![
            label("Time: "),
            value(format_time(view.elapsed_time_secs), Color::White),
        ]);
        let timer_area = Rect {
            x: area.x + area.width.saturating_sub(TIMER_WIDTH + 1),
            y: area.y,
            width: TIMER_WIDTH.min(area.width),
            height: 1,
        };
        frame.render_widget(Paragraph::new(timer_text).right_aligned(), timer_area);

        let controls = Line::from(vec![Span::styled(
            "[WASD/Arrows: Move] [Z/Space: Fire] [P: Pause] [Q: Quit]",
            Style::default().fg(Color::DarkGray),
        )]);
        let controls_area = Rect {
            x: area.x + 1,
            y: area.y + area.height.saturating_sub(1),
            width: area.width.saturating_sub(2),
            height: 1,
        };
        frame.render_widget(Paragraph::new(controls).centered(), controls_area);
    }

    /// Renders the pause screen with overlay
    fn render_paused(&self, frame: &mut Frame, view: &RenderView) {
        self.render_game(frame, view);

        let pause_text = vec![
            Line::from(""),
            Line::from("PAUSED").centered().bold().yellow(),
            Line::from(""),
            Line::from("Press P to resume").centered().white(),
        ];

        frame.render_widget(
            Paragraph::new(pause_text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                )
                .alignment(Alignment::Center),
            centered(view.area, 30, 6),
        );
    }

    /// Renders the game over screen on top of the still running field
    fn render_game_over(&self, frame: &mut Frame, view: &RenderView) {
        self.render_game(frame, view);

        let game_over_text = vec![
            Line::from(""),
            Line::from("GAME OVER!").centered().red().bold(),
            Line::from(""),
            Line::from(format!("Time Survived: {}", format_time(view.elapsed_time_secs)))
                .centered()
                .cyan()
                .bold(),
            Line::from(""),
            Line::from("Press R to restart").centered().white(),
            Line::from("Press Q to quit").centered().white(),
        ];

        frame.render_widget(
            Paragraph::new(game_over_text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Red)),
                )
                .alignment(Alignment::Center),
            centered(view.area, 34, 9),
        );
    }
}

fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
