//! Tick driver
//!
//! Owns the match state, the seeded RNG and the latched input between
//! display refreshes. Platform front-ends feed pointer and launch input in,
//! call [`Game::frame`] once per refresh and drain events for audio/UI.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::highscores::{HighScores, NameError};
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

/// A running game session
pub struct Game {
    state: GameState,
    rng: Pcg32,
    /// Latched input; pointer persists, launch is one-shot
    input: TickInput,
    events: Vec<GameEvent>,
    high_scores: HighScores,
    score_submitted: bool,
}

impl Game {
    /// Fresh session in the Idle phase with an empty leaderboard
    pub fn new(seed: u64) -> Self {
        Self::with_high_scores(seed, HighScores::new())
    }

    /// Fresh session using a previously loaded leaderboard
    pub fn with_high_scores(seed: u64, high_scores: HighScores) -> Self {
        Self {
            state: GameState::new(),
            rng: Pcg32::seed_from_u64(seed),
            input: TickInput::default(),
            events: Vec::new(),
            high_scores,
            score_submitted: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn idle_mode(&self) -> bool {
        self.input.idle_mode
    }

    /// Toggle the demo autopilot
    pub fn set_idle_mode(&mut self, on: bool) {
        self.input.idle_mode = on;
        log::info!("Idle mode: {}", on);
    }

    /// Start a match. Ignored while a match is in progress.
    pub fn start(&mut self, seed: u64, now_ms: f64) -> bool {
        if self.state.phase == GamePhase::Playing {
            return false;
        }
        self.begin(seed, now_ms);
        true
    }

    /// Abandon any match in progress and start a new one
    pub fn restart(&mut self, seed: u64, now_ms: f64) {
        if self.state.phase == GamePhase::Playing {
            self.events.push(GameEvent::MatchEnded);
        }
        self.begin(seed, now_ms);
    }

    fn begin(&mut self, seed: u64, now_ms: f64) {
        self.rng = Pcg32::seed_from_u64(seed);
        self.state = GameState::start_match(now_ms);
        self.events.extend(self.state.drain_events());
        self.input.launch = false;
        self.score_submitted = false;
        log::info!("Game started with seed: {}", seed);
    }

    /// Latest pointer x in playfield coordinates
    pub fn pointer_moved(&mut self, x: f32) {
        if x.is_finite() {
            self.input.pointer_x = Some(x);
        }
    }

    /// Latch a launch for the next tick
    pub fn launch_pressed(&mut self) {
        self.input.launch = true;
    }

    /// Advance one display refresh. Returns true if a simulation tick ran.
    ///
    /// Outside the Playing phase only floating texts are aged.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if !self.state.is_active() {
            self.state.expire_floating_texts(now_ms);
            self.input.launch = false;
            return false;
        }

        self.input.now_ms = now_ms;
        tick(&mut self.state, &self.input, &mut self.rng);
        self.input.launch = false;
        self.events.extend(self.state.drain_events());
        true
    }

    /// Take all events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether the finished match's score can still be entered
    pub fn can_submit_score(&self) -> bool {
        self.state.is_game_over()
            && !self.score_submitted
            && self.high_scores.qualifies(self.state.score)
    }

    /// Enter the finished match's score on the leaderboard.
    ///
    /// Returns the rank achieved, `Ok(None)` when there is nothing to submit
    /// (no finished match, already submitted, or not a top score).
    pub fn submit_score(&mut self, name: &str, timestamp: f64) -> Result<Option<usize>, NameError> {
        if !self.state.is_game_over() || self.score_submitted {
            return Ok(None);
        }
        let rank = self.high_scores.add_score(name, self.state.score, timestamp)?;
        self.score_submitted = true;
        Ok(rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn force_game_over(game: &mut Game, score: u64) {
        game.state.score = score;
        game.state.lives = 1;
        game.state.clowns[1].pos = Vec2::new(200.0, 700.0);
        game.state.clowns[1].vel = Vec2::new(0.0, 5.0);
        game.state.clowns[1].state = crate::sim::ClownState::Flying;
        game.frame(1000.0);
    }

    #[test]
    fn test_idle_until_started() {
        let mut game = Game::new(1);
        assert!(!game.frame(16.0));
        assert_eq!(game.state().phase, GamePhase::Idle);

        assert!(game.start(1, 0.0));
        assert!(game.frame(16.0));
        assert_eq!(game.state().time_ticks, 1);
        assert_eq!(game.drain_events(), vec![GameEvent::MatchStarted]);
    }

    #[test]
    fn test_start_ignored_while_playing() {
        let mut game = Game::new(1);
        game.start(1, 0.0);
        game.frame(16.0);
        assert!(!game.start(2, 32.0));
        assert_eq!(game.state().time_ticks, 1);
    }

    #[test]
    fn test_restart_ends_current_match() {
        let mut game = Game::new(1);
        game.start(1, 0.0);
        game.drain_events();
        game.restart(2, 50.0);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::MatchEnded, GameEvent::MatchStarted]
        );
        assert_eq!(game.state().time_ticks, 0);
    }

    #[test]
    fn test_launch_latch_is_one_shot() {
        let mut game = Game::new(1);
        game.start(1, 0.0);
        game.launch_pressed();
        game.frame(16.0);
        assert!(game.state().clowns[1].is_flying());
        assert_eq!(game.state().clowns[0].seesaw_side(), Some(crate::sim::Side::Left));

        // No second launch without another press
        game.frame(32.0);
        assert!(game.state().clowns[0].is_grounded());
    }

    #[test]
    fn test_pointer_is_latched() {
        let mut game = Game::new(1);
        game.start(1, 0.0);
        game.pointer_moved(200.0);
        game.frame(16.0);
        assert_eq!(game.state().seesaw.x, 200.0);
        game.pointer_moved(f32::NAN);
        game.frame(32.0);
        assert_eq!(game.state().seesaw.x, 200.0);
    }

    #[test]
    fn test_frame_after_game_over_only_expires_text() {
        let mut game = Game::new(3);
        game.start(3, 0.0);
        force_game_over(&mut game, 0);
        assert!(game.state().is_game_over());
        assert!(!game.state().floating_texts.is_empty());

        let ticks = game.state().time_ticks;
        assert!(!game.frame(5000.0));
        assert_eq!(game.state().time_ticks, ticks);
        assert!(game.state().floating_texts.is_empty());
    }

    #[test]
    fn test_submit_score_once() {
        let mut game = Game::new(3);
        assert_eq!(game.submit_score("Bozo", 1.0), Ok(None));

        game.start(3, 0.0);
        force_game_over(&mut game, 420);
        assert!(game.can_submit_score());
        assert_eq!(game.submit_score("bad!", 1.0), Err(NameError::InvalidChar('!')));
        assert_eq!(game.submit_score("Bozo", 1.0), Ok(Some(1)));
        assert_eq!(game.submit_score("Bozo", 2.0), Ok(None));
        assert_eq!(game.high_scores().top_score(), Some(420));
        assert!(!game.can_submit_score());

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::GameOver { score: 420 }));
        assert_eq!(events.last(), Some(&GameEvent::MatchEnded));
    }

    #[test]
    fn test_same_seed_same_match() {
        let run = |seed| {
            let mut game = Game::new(seed);
            game.set_idle_mode(true);
            game.start(seed, 0.0);
            for i in 1..=1200 {
                game.frame(i as f64 * 16.0);
            }
            (game.state().score, game.state().lives, game.state().time_ticks)
        };
        assert_eq!(run(77), run(77));
    }
}
