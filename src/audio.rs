//! Audio system using the Web Audio API
//!
//! Sound effects are procedurally generated oscillators - no files needed.
//! Background music streams from an audio element. Native builds get a
//! silent stub with the same surface.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Coin picked up
    Coin,
    /// Obstacle collision
    Crash,
    /// Lane change
    LaneChange,
}

/// Background music source (looped)
#[allow(dead_code)]
const MUSIC_SRC: &str = "assets/highway-to-hell.mp3";

/// Audio manager for the game. The music toggle gates SFX too.
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<web_sys::AudioContext>,
    #[cfg(target_arch = "wasm32")]
    music: Option<web_sys::HtmlAudioElement>,
    enabled: bool,
}

#[cfg(target_arch = "wasm32")]
impl AudioManager {
    pub fn new(enabled: bool) -> Self {
        // May fail outside a secure context; the game plays on silently
        let ctx = web_sys::AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        let music = web_sys::HtmlAudioElement::new_with_src(MUSIC_SRC).ok();
        if let Some(music) = &music {
            music.set_loop(true);
            music.set_volume(0.45);
        }
        Self {
            ctx,
            music,
            enabled,
        }
    }

    /// Resume the audio context (required after the first user gesture)
    pub fn unlock(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
        if self.enabled {
            self.play_music();
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        match (&self.music, enabled) {
            (Some(_), true) => self.play_music(),
            (Some(music), false) => music.pause().unwrap_or(()),
            _ => {}
        }
    }

    /// Restart the music from the top (run start)
    pub fn restart_music(&self) {
        if let Some(music) = &self.music {
            music.set_current_time(0.0);
        }
        if self.enabled {
            self.play_music();
        }
    }

    fn play_music(&self) {
        if let Some(music) = &self.music {
            // play() returns a promise; rejection (autoplay policy) is fine
            let _ = music.play();
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        if !self.enabled {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Coin => self.play_coin(ctx),
            SoundEffect::Crash => self.play_crash(ctx),
            SoundEffect::LaneChange => self.play_lane_change(ctx),
        }
    }

    /// Create an oscillator routed through a gain envelope
    fn create_osc(
        &self,
        ctx: &web_sys::AudioContext,
        freq: f32,
        osc_type: web_sys::OscillatorType,
    ) -> Option<(web_sys::OscillatorNode, web_sys::GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Coin - bright chime
    fn play_coin(&self, ctx: &web_sys::AudioContext) {
        let Some((osc, gain)) = self.create_osc(ctx, 1100.0, web_sys::OscillatorType::Triangle)
        else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.0001, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.18, t + 0.02)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, t + 0.36)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.38).ok();
    }

    /// Crash - low sawtooth rumble
    fn play_crash(&self, ctx: &web_sys::AudioContext) {
        let Some((osc, gain)) = self.create_osc(ctx, 140.0, web_sys::OscillatorType::Sawtooth)
        else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, t + 0.9)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.9).ok();
    }

    /// Lane change - short square blip
    fn play_lane_change(&self, ctx: &web_sys::AudioContext) {
        let Some((osc, gain)) = self.create_osc(ctx, 440.0, web_sys::OscillatorType::Square)
        else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.08, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, t + 0.12)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.14).ok();
    }
}

/// Native stub: same surface, no sound
#[cfg(not(target_arch = "wasm32"))]
impl AudioManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn unlock(&self) {}

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn restart_music(&self) {}

    pub fn play(&self, _effect: SoundEffect) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_manager_is_silent_and_safe() {
        let mut audio = AudioManager::new(true);
        audio.play(SoundEffect::Coin);
        audio.set_enabled(false);
        audio.play(SoundEffect::Crash);
        audio.unlock();
        audio.restart_music();
    }
}
