//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!
//! The event-to-sound mapping is platform independent; synthesis is wasm only.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Balloon popped
    Pop,
    /// Row cleared - ascending arpeggio
    RowBonus,
    /// Clown lost
    Splat,
    /// Board bounce, landing or launch
    Bounce,
    /// Game over march
    GameOver,
    /// New leaderboard entry
    HighScore,
}

impl SoundEffect {
    /// One-shot effect for a simulation event. Match start/end drive the
    /// ambient loop instead and map to nothing.
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::BalloonPopped { .. } => Some(SoundEffect::Pop),
            GameEvent::RowCleared { .. } => Some(SoundEffect::RowBonus),
            GameEvent::Splat { .. } => Some(SoundEffect::Splat),
            GameEvent::Bounce => Some(SoundEffect::Bounce),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::MatchStarted | GameEvent::MatchEnded => None,
        }
    }
}

/// Ambient loop melody: (frequency Hz, duration s)
pub const AMBIENT_NOTES: [(f32, f64); 12] = [
    (196.0, 1.2),
    (220.0, 0.8),
    (262.0, 1.0),
    (294.0, 1.4),
    (330.0, 0.6),
    (262.0, 1.0),
    (220.0, 1.2),
    (196.0, 1.6),
    (165.0, 1.0),
    (196.0, 0.8),
    (220.0, 1.4),
    (262.0, 1.0),
];

/// Consecutive ambient notes overlap; each starts after this share of the
/// previous one's duration
pub const AMBIENT_OVERLAP: f64 = 0.7;

/// Silence between ambient loop passes (s)
pub const AMBIENT_PAUSE: f64 = 2.0;

/// Length of one ambient pass including the trailing pause (s)
pub fn ambient_loop_len() -> f64 {
    AMBIENT_NOTES.iter().map(|(_, dur)| dur * AMBIENT_OVERLAP).sum::<f64>() + AMBIENT_PAUSE
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioNode, GainNode, OscillatorNode, OscillatorType};

    use super::{AMBIENT_NOTES, AMBIENT_OVERLAP, SoundEffect, ambient_loop_len};
    use crate::Settings;
    use crate::sim::GameEvent;

    /// Schedule the next ambient pass this far ahead of the current one ending (s)
    const AMBIENT_LOOKAHEAD: f64 = 0.5;

    /// Funeral-march phrase: (frequency Hz, duration s, accented)
    const MARCH: [(f32, f64, bool); 19] = [
        (207.65, 0.4, true),
        (207.65, 0.25, false),
        (207.65, 0.25, false),
        (207.65, 0.4, true),
        (207.65, 0.25, false),
        (207.65, 0.35, false),
        (277.18, 0.5, true),
        (246.94, 0.3, false),
        (233.08, 0.3, false),
        (207.65, 0.4, true),
        (207.65, 0.25, false),
        (185.0, 0.35, false),
        (207.65, 0.4, true),
        (233.08, 0.3, false),
        (246.94, 0.3, false),
        (277.18, 0.5, true),
        (246.94, 0.3, false),
        (233.08, 0.3, false),
        (207.65, 1.2, true),
    ];

    /// Looping background tone state
    struct Ambient {
        /// Per-loop bus; silenced on stop so queued notes die with it
        bus: GainNode,
        /// Context time the next pass starts
        next_pass_at: f64,
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        sfx_gain: f32,
        music_gain: f32,
        muted: bool,
        ambient: Option<Ambient>,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            let defaults = Settings::default();
            Self {
                ctx,
                sfx_gain: defaults.sfx_gain(),
                music_gain: defaults.music_gain(),
                muted: false,
                ambient: None,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Pick up volume changes
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.sfx_gain = settings.sfx_gain();
            self.music_gain = settings.music_gain();
            if let Some(ambient) = &self.ambient {
                ambient.bus.gain().set_value(self.music_level());
            }
        }

        /// Mute/unmute all audio
        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
            if let Some(ambient) = &self.ambient {
                ambient.bus.gain().set_value(self.music_level());
            }
        }

        fn sfx_level(&self) -> f32 {
            if self.muted { 0.0 } else { self.sfx_gain }
        }

        fn music_level(&self) -> f32 {
            if self.muted { 0.0 } else { self.music_gain }
        }

        /// React to a simulation event
        pub fn handle_event(&mut self, event: &GameEvent) {
            match event {
                GameEvent::MatchStarted => self.start_ambient(),
                GameEvent::MatchEnded => self.stop_ambient(),
                _ => {}
            }
            if let Some(effect) = SoundEffect::for_event(event) {
                self.play(effect);
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.sfx_level();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Pop => self.play_pop(ctx, vol),
                SoundEffect::RowBonus => self.play_row_bonus(ctx, vol),
                SoundEffect::Splat => self.play_splat(ctx, vol),
                SoundEffect::Bounce => self.play_bounce(ctx, vol),
                SoundEffect::GameOver => self.play_game_over(ctx, vol),
                SoundEffect::HighScore => self.play_high_score(ctx, vol),
            }
        }

        // === Ambient loop ===

        /// Start the background loop (no-op if already running)
        pub fn start_ambient(&mut self) {
            if self.ambient.is_some() {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            let Ok(bus) = ctx.create_gain() else {
                log::warn!("Failed to create ambient bus");
                return;
            };
            if bus.connect_with_audio_node(&ctx.destination()).is_err() {
                log::warn!("Failed to connect ambient bus");
                return;
            }
            bus.gain().set_value(self.music_level());
            self.ambient = Some(Ambient {
                bus,
                next_pass_at: ctx.current_time(),
            });
            self.update();
        }

        /// Stop the background loop, cutting any queued notes
        pub fn stop_ambient(&mut self) {
            if let Some(ambient) = self.ambient.take() {
                ambient.bus.gain().set_value(0.0);
                let _ = ambient.bus.disconnect();
            }
        }

        /// Per-frame upkeep: queue the next ambient pass when the current one
        /// is about to run out
        pub fn update(&mut self) {
            let Some(ctx) = &self.ctx else { return };
            let Some(ambient) = &mut self.ambient else { return };
            let now = ctx.current_time();
            if now + AMBIENT_LOOKAHEAD < ambient.next_pass_at {
                return;
            }

            let start = ambient.next_pass_at.max(now);
            let mut t = start;
            for &(freq, dur) in AMBIENT_NOTES.iter() {
                tone(ctx, &ambient.bus, freq, t, dur * 0.85, OscillatorType::Sine, 0.3);
                tone(ctx, &ambient.bus, freq * 2.0, t, dur * 0.5, OscillatorType::Sine, 0.12);
                t += dur * AMBIENT_OVERLAP;
            }
            ambient.next_pass_at = start + ambient_loop_len();
        }

        // === Sound generators ===

        /// Balloon pop - two quick square blips
        fn play_pop(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            let out = ctx.destination();
            tone(ctx, &out, 800.0, t, 0.05, OscillatorType::Square, vol * 0.2);
            tone(ctx, &out, 400.0, t + 0.03, 0.05, OscillatorType::Square, vol * 0.15);
        }

        /// Row bonus - ascending arpeggio
        fn play_row_bonus(&self, ctx: &AudioContext, vol: f32) {
            let out = ctx.destination();
            for (i, freq) in [523.0, 659.0, 784.0, 1047.0].iter().enumerate() {
                let t = ctx.current_time() + i as f64 * 0.08;
                tone(ctx, &out, *freq, t, 0.15, OscillatorType::Square, vol * 0.25);
            }
        }

        /// Splat - descending sawtooth
        fn play_splat(&self, ctx: &AudioContext, vol: f32) {
            let out = ctx.destination();
            for (i, freq) in [400.0, 350.0, 300.0, 250.0, 200.0].iter().enumerate() {
                let t = ctx.current_time() + i as f64 * 0.12;
                tone(ctx, &out, *freq, t, 0.2, OscillatorType::Sawtooth, vol * 0.2);
            }
        }

        /// Bounce - short triangle blip
        fn play_bounce(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            tone(ctx, &ctx.destination(), 300.0, t, 0.08, OscillatorType::Triangle, vol * 0.15);
        }

        /// Game over - layered march
        fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
            let out = ctx.destination();
            let mut t = ctx.current_time();
            for &(freq, dur, accent) in MARCH.iter() {
                let level = (if accent { 0.35 } else { 0.22 }) * vol;
                tone(ctx, &out, freq, t, dur * 0.9, OscillatorType::Sawtooth, level);
                tone(ctx, &out, freq * 0.5, t, dur, OscillatorType::Triangle, level * 0.5);
                if accent {
                    tone(ctx, &out, freq * 2.0, t, dur * 0.4, OscillatorType::Sine, vol * 0.06);
                }
                t += dur + 0.05;
            }
        }

        /// High score - celebratory
        fn play_high_score(&self, ctx: &AudioContext, vol: f32) {
            let out = ctx.destination();
            for (i, freq) in [500.0, 600.0, 700.0, 800.0, 1000.0].iter().enumerate() {
                let t = ctx.current_time() + i as f64 * 0.08;
                tone(ctx, &out, *freq, t, 0.25, OscillatorType::Triangle, vol * 0.25);
            }
        }
    }

    /// Create an oscillator with gain envelope routed into `dest`
    fn create_osc(
        ctx: &AudioContext,
        dest: &AudioNode,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(dest).ok()?;

        Some((osc, gain))
    }

    /// Single decaying tone starting at context time `at`
    fn tone(
        ctx: &AudioContext,
        dest: &AudioNode,
        freq: f32,
        at: f64,
        dur: f64,
        osc_type: OscillatorType,
        level: f32,
    ) {
        let Some((osc, gain)) = create_osc(ctx, dest, freq, osc_type) else {
            return;
        };
        gain.gain().set_value_at_time(level, at).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, at + dur)
            .ok();
        osc.start_with_when(at).ok();
        osc.stop_with_when(at + dur).ok();
    }
}
