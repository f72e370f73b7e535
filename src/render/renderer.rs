use std::collections::HashMap;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GameMode, Position, Session};
use crate::metrics::GameMetrics;

/// Pellet colors, indexed by catalog entry
const PELLET_COLORS: [Color; 4] = [Color::Red, Color::Yellow, Color::Magenta, Color::LightBlue];

/// Window of grid cells visible in the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub origin: Position,
    pub columns: usize,
    pub rows: usize,
}

impl Viewport {
    /// Window of at most `columns` x `rows` cells centered on `focus`,
    /// clamped so it never leaves the grid
    pub fn centered_on(
        focus: Position,
        grid_columns: usize,
        grid_rows: usize,
        columns: usize,
        rows: usize,
    ) -> Self {
        let columns = columns.min(grid_columns);
        let rows = rows.min(grid_rows);
        let axis = |focus: i32, grid: usize, view: usize| {
            let max_origin = (grid - view) as i32;
            (focus - view as i32 / 2).clamp(0, max_origin)
        };

        Self {
            origin: Position::new(
                axis(focus.x, grid_columns, columns),
                axis(focus.y, grid_rows, rows),
            ),
            columns,
            rows,
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.origin.x
            && pos.y >= self.origin.y
            && pos.x < self.origin.x + self.columns as i32
            && pos.y < self.origin.y + self.rows as i32
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, session: &Session, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Arena
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(session, metrics);
        frame.render_widget(stats, chunks[0]);

        let lead = session.lead_snake();
        if lead.is_alive() || session.mode().is_solo() {
            let grid = self.render_grid(chunks[1], session);
            frame.render_widget(grid, chunks[1]);
        } else {
            let game_over = self.render_game_over(session, metrics);
            frame.render_widget(game_over, chunks[1]);
        }

        let controls = self.render_controls(session.mode());
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, area: Rect, session: &Session) -> Paragraph<'_> {
        let world = session.world();
        // Two terminal columns per cell, minus the border
        let view = Viewport::centered_on(
            session.lead_snake().head(),
            world.columns(),
            world.rows(),
            (area.width.saturating_sub(2) / 2) as usize,
            area.height.saturating_sub(2) as usize,
        );

        let mut cells: HashMap<Position, Span<'static>> = HashMap::new();
        for pellet in world.pellets() {
            if view.contains(pellet.position) {
                let color = PELLET_COLORS[pellet.type_index % PELLET_COLORS.len()];
                let glyph = if world.pellet_kind(pellet).score > 1 { "◆ " } else { "o " };
                cells.insert(
                    pellet.position,
                    Span::styled(glyph, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                );
            }
        }

        // Lead last so it is drawn on top
        for worm in session.worms().iter().rev() {
            let snake = worm.snake();
            if !snake.is_alive() {
                continue;
            }
            let (r, g, b) = snake.color();
            let body = Style::default().fg(Color::Rgb(r, g, b));
            for (i, &pos) in snake.cells().iter().enumerate() {
                if !view.contains(pos) {
                    continue;
                }
                let span = if i == 0 {
                    Span::styled("■ ", body.add_modifier(Modifier::BOLD))
                } else {
                    Span::styled("□ ", body)
                };
                cells.insert(pos, span);
            }
        }

        let mut lines = Vec::with_capacity(view.rows);
        for y in 0..view.rows as i32 {
            let spans: Vec<Span> = (0..view.columns as i32)
                .map(|x| {
                    let pos = Position::new(view.origin.x + x, view.origin.y + y);
                    cells
                        .remove(&pos)
                        .unwrap_or_else(|| Span::styled(". ", Style::default().fg(Color::DarkGray)))
                })
                .collect();
            lines.push(Line::from(spans));
        }

        let title = format!(
            " Worm Arena {}x{} @ ({}, {}) ",
            world.columns(),
            world.rows(),
            view.origin.x,
            view.origin.y
        );
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, session: &Session, metrics: &GameMetrics) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);
        let lead = session.lead_snake();

        let mut spans = vec![
            Span::styled("Score: ", label),
            Span::styled(lead.score().to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::styled("Length: ", label),
            Span::styled(lead.len().to_string(), value),
            Span::raw("   "),
            Span::styled("Alive: ", label),
            Span::styled(
                format!("{}/{}", session.alive_count(), session.worms().len()),
                value,
            ),
            Span::raw("   "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
        ];

        if let Some(pilot) = session.learning() {
            spans.extend([
                Span::raw("   "),
                Span::styled("Game: ", label),
                Span::styled((session.game_number() + 1).to_string(), value),
                Span::raw("   "),
                Span::styled("Epsilon: ", label),
                Span::styled(format!("{:.3}", pilot.epsilon()), value),
                Span::raw("   "),
                Span::styled("States: ", label),
                Span::styled(pilot.q_table_size().to_string(), value),
                Span::raw("   "),
                Span::styled("Avg: ", label),
                Span::styled(format!("{:.1}", session.average_score()), value),
            ]);
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_game_over(&self, session: &Session, metrics: &GameMetrics) -> Paragraph<'_> {
        let lead = session.lead_snake();
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    lead.score().to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("   "),
                Span::styled("Best: ", Style::default().fg(Color::Yellow)),
                Span::styled(metrics.high_score().to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Space",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, mode: GameMode) -> Paragraph<'_> {
        let mut spans = Vec::new();
        if mode == GameMode::Player {
            spans.extend([
                Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("WASD", Style::default().fg(Color::Cyan)),
                Span::raw(" to steer | "),
            ]);
        }
        if !mode.is_solo() {
            spans.extend([
                Span::styled("Space", Style::default().fg(Color::Green)),
                Span::raw(" to restart | "),
            ]);
        }
        spans.extend([
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ]);

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
