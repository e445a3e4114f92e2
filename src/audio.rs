//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed. The
//! simulation emits `GameEvent`s; this module maps them to short oscillator
//! envelopes. Native builds carry the same surface as silent stubs.

use crate::sim::GameEvent;

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Cannon or turret shot
    Shot,
    /// Projectile connected without a kill
    Impact,
    /// Hostile destroyed
    Explosion,
    /// Hostile rammed the player
    Crash,
    /// A life was lost
    PlayerDown,
    LevelUp,
    SkinUnlocked,
    GameOver,
    MenuMove,
    MenuSelect,
}

impl SoundEffect {
    /// Which sound, if any, a simulation event triggers
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::CannonFired | GameEvent::TurretVolley => Some(SoundEffect::Shot),
            GameEvent::HostileHit => Some(SoundEffect::Impact),
            GameEvent::HostileDestroyed { .. } => Some(SoundEffect::Explosion),
            GameEvent::PlayerHit => Some(SoundEffect::Crash),
            GameEvent::PlayerDown => Some(SoundEffect::PlayerDown),
            GameEvent::LevelUp { .. } => Some(SoundEffect::LevelUp),
            GameEvent::SkinUnlocked { .. } => Some(SoundEffect::SkinUnlocked),
            GameEvent::RunOver => Some(SoundEffect::GameOver),
            GameEvent::Respawned => None,
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<AudioContext>,
    volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx, volume: 0.5 }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self { volume: 0.5 }
    }

    /// Master volume (0.0 - 1.0), mirrored from settings
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Play every sound the tick's events call for
    pub fn play_events(&self, events: &[GameEvent]) {
        for event in events {
            if let Some(effect) = SoundEffect::for_event(event) {
                self.play(effect);
            }
        }
    }

    /// Play a sound effect
    #[cfg(target_arch = "wasm32")]
    pub fn play(&self, effect: SoundEffect) {
        if self.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers suspend the context until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let vol = self.volume;
        match effect {
            SoundEffect::Shot => self.sweep(ctx, OscillatorType::Square, 880.0, 440.0, 0.08, vol * 0.2),
            SoundEffect::Impact => self.sweep(ctx, OscillatorType::Triangle, 300.0, 180.0, 0.06, vol * 0.25),
            SoundEffect::Explosion => {
                // Sharp crack plus a low rumbling boom
                self.sweep(ctx, OscillatorType::Square, 800.0, 200.0, 0.08, vol * 0.4);
                self.sweep(ctx, OscillatorType::Sawtooth, 120.0, 40.0, 0.4, vol * 0.5);
            }
            SoundEffect::Crash => self.sweep(ctx, OscillatorType::Square, 150.0, 80.0, 0.25, vol * 0.4),
            SoundEffect::PlayerDown => {
                self.sweep(ctx, OscillatorType::Sawtooth, 400.0, 60.0, 0.6, vol * 0.4)
            }
            SoundEffect::LevelUp => {
                self.sweep(ctx, OscillatorType::Triangle, 440.0, 880.0, 0.15, vol * 0.3);
                self.sweep(ctx, OscillatorType::Triangle, 660.0, 1320.0, 0.25, vol * 0.2);
            }
            SoundEffect::SkinUnlocked => {
                self.sweep(ctx, OscillatorType::Sine, 660.0, 990.0, 0.3, vol * 0.3)
            }
            SoundEffect::GameOver => {
                self.sweep(ctx, OscillatorType::Sawtooth, 220.0, 55.0, 1.0, vol * 0.4)
            }
            SoundEffect::MenuMove => self.sweep(ctx, OscillatorType::Sine, 600.0, 600.0, 0.04, vol * 0.15),
            SoundEffect::MenuSelect => {
                self.sweep(ctx, OscillatorType::Sine, 880.0, 880.0, 0.08, vol * 0.2)
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn play(&self, _effect: SoundEffect) {
        // No-op for native
    }

    /// Create an oscillator with gain envelope
    #[cfg(target_arch = "wasm32")]
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// One oscillator sweeping from `f0` to `f1` with an exponential fade-out
    #[cfg(target_arch = "wasm32")]
    fn sweep(&self, ctx: &AudioContext, osc_type: OscillatorType, f0: f32, f1: f32, duration: f64, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, f0, osc_type) else {
            return;
        };
        let now = ctx.current_time();

        if (f0 - f1).abs() > f32::EPSILON {
            let _ = osc
                .frequency()
                .exponential_ramp_to_value_at_time(f1.max(1.0), now + duration);
        }
        let _ = gain.gain().set_value_at_time(vol, now);
        let _ = gain
            .gain()
            .exponential_ramp_to_value_at_time(0.01, now + duration);

        let _ = osc.start();
        let _ = osc.stop_with_when(now + duration);
    }
}
