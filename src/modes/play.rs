use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::warn;

use crate::game::{GameConfig, GameMode, Session};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;
use crate::rl::QLearningConfig;

/// Pause before the solo arena starts its next game
const SOLO_RESTART_DELAY: Duration = Duration::from_secs(1);

/// Interactive terminal front end for every session mode
pub struct PlayMode {
    session: Session,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    /// When the lead died, while waiting for a solo restart
    died_at: Option<Instant>,
}

impl PlayMode {
    pub fn new(
        game_config: &GameConfig,
        learning_config: &QLearningConfig,
        mode: GameMode,
    ) -> Result<Self> {
        let session = Session::new(game_config, learning_config, mode)
            .with_context(|| format!("Failed to start {:?} session", mode))?;

        Ok(Self {
            session,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            died_at: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_game_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;
        self.session.shutdown()?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.session.config().move_interval());

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                _ = tick_timer.tick() => {
                    self.update_game()?;
                }

                _ = render_timer.tick() => {
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.session, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Steer(direction) => self.session.steer(direction),
                KeyAction::Restart => {
                    if !self.session.lead_snake().is_alive() && !self.session.mode().is_solo() {
                        self.restart()?;
                    }
                }
                KeyAction::Quit => self.should_quit = true,
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn update_game(&mut self) -> Result<()> {
        if let Some(died_at) = self.died_at {
            if self.session.mode().is_solo() && died_at.elapsed() >= SOLO_RESTART_DELAY {
                self.restart()?;
            }
            return Ok(());
        }

        let report = self.session.tick();
        if report.lead_died {
            self.metrics.on_lead_death(self.session.lead_snake());
            self.died_at = Some(Instant::now());
        }

        Ok(())
    }

    fn restart(&mut self) -> Result<()> {
        self.session
            .restart()
            .context("Failed to restart session")?;
        self.metrics.on_game_start();
        self.died_at = None;
        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        if let Err(err) = terminal.show_cursor() {
            warn!(error = %err, "failed to show cursor");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tempfile::TempDir;

    fn small_config(bots: usize) -> GameConfig {
        GameConfig {
            columns: 20,
            rows: 20,
            initial_pellet_count: 10,
            num_bots: bots,
            seed: Some(3),
            ..Default::default()
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn run_until_lead_dies(mode: &mut PlayMode) {
        for _ in 0..100_000 {
            mode.update_game().unwrap();
            if mode.died_at.is_some() {
                return;
            }
        }
        panic!("lead never died");
    }

    #[test]
    fn test_initialization() {
        let mode = PlayMode::new(&small_config(2), &QLearningConfig::default(), GameMode::Ai)
            .unwrap();
        assert!(mode.session.lead_snake().is_alive());
        assert_eq!(mode.session.worms().len(), 3);
        assert!(!mode.should_quit);
    }

    #[test]
    fn test_quit_key() {
        let mut mode =
            PlayMode::new(&small_config(0), &QLearningConfig::default(), GameMode::Player)
                .unwrap();
        mode.handle_event(key(KeyCode::Char('q'))).unwrap();
        assert!(mode.should_quit);
    }

    #[test]
    fn test_restart_only_after_death() {
        let mut mode =
            PlayMode::new(&small_config(0), &QLearningConfig::default(), GameMode::Player)
                .unwrap();
        mode.handle_event(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(mode.session.game_number(), 0);

        // An unsteered lead runs into a wall
        run_until_lead_dies(&mut mode);
        assert_eq!(mode.metrics.games_finished(), 1);

        mode.handle_event(key(KeyCode::Char(' '))).unwrap();
        assert_eq!(mode.session.game_number(), 1);
        assert!(mode.session.lead_snake().is_alive());
        assert!(mode.died_at.is_none());
    }

    #[test]
    fn test_solo_waits_before_restarting() {
        let temp_dir = TempDir::new().unwrap();
        let learning = QLearningConfig {
            q_table_path: temp_dir.path().join("q_table.json"),
            ..Default::default()
        };
        let mut mode =
            PlayMode::new(&small_config(0), &learning, GameMode::QLearningSolo).unwrap();

        run_until_lead_dies(&mut mode);
        // Restart keys are ignored in solo
        mode.handle_event(key(KeyCode::Char('r'))).unwrap();
        assert_eq!(mode.session.game_number(), 0);

        mode.update_game().unwrap();
        assert_eq!(mode.session.game_number(), 0);

        mode.died_at = Some(Instant::now() - SOLO_RESTART_DELAY);
        mode.update_game().unwrap();
        assert_eq!(mode.session.game_number(), 1);
        assert!(mode.session.lead_snake().is_alive());
    }
}
