/// Sound engine: procedural chiptune effects via rodio.
///
/// Every effect is a short list of `Tone`s rendered to mono f32 samples
/// once at start-up. Playback clones the samples into a detached Sink.
///
/// Without the "sound" feature the stub engine does nothing.

#[cfg(feature = "sound")]
mod inner {
    use log::warn;
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    #[derive(Clone, Copy)]
    enum Wave {
        Square,
        Triangle,
    }

    /// One note: a linear pitch glide from `from` to `to` Hz.
    #[derive(Clone, Copy)]
    struct Tone {
        from: f32,
        to: f32,
        secs: f32,
        wave: Wave,
    }

    const fn note(hz: f32, secs: f32, wave: Wave) -> Tone {
        Tone { from: hz, to: hz, secs, wave }
    }

    const JUMP: &[Tone] = &[Tone { from: 260.0, to: 620.0, secs: 0.11, wave: Wave::Square }];

    const COIN: &[Tone] = &[
        note(988.0, 0.05, Wave::Square),   // B5
        note(1319.0, 0.16, Wave::Square),  // E6
    ];

    const GAME_OVER: &[Tone] = &[
        note(392.0, 0.14, Wave::Triangle),
        note(330.0, 0.14, Wave::Triangle),
        note(262.0, 0.14, Wave::Triangle),
        Tone { from: 196.0, to: 98.0, secs: 0.45, wave: Wave::Triangle },
    ];

    const LEVEL_CLEAR: &[Tone] = &[
        note(523.0, 0.08, Wave::Square),
        note(659.0, 0.08, Wave::Square),
        note(784.0, 0.08, Wave::Square),
        note(1047.0, 0.22, Wave::Triangle),
    ];

    const WIN: &[Tone] = &[
        note(523.0, 0.12, Wave::Square),
        note(523.0, 0.12, Wave::Square),
        note(784.0, 0.12, Wave::Square),
        note(1047.0, 0.18, Wave::Square),
        note(880.0, 0.12, Wave::Triangle),
        note(1047.0, 0.5, Wave::Triangle),
    ];

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        jump: Vec<f32>,
        coin: Vec<f32>,
        game_over: Vec<f32>,
        level_clear: Vec<f32>,
        win: Vec<f32>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("audio output unavailable: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                jump: synth(JUMP, 0.18),
                coin: synth(COIN, 0.2),
                game_over: synth(GAME_OVER, 0.3),
                level_clear: synth(LEVEL_CLEAR, 0.22),
                win: synth(WIN, 0.22),
            })
        }

        fn play(&self, samples: &[f32]) {
            match Sink::try_new(&self.handle) {
                Ok(sink) => {
                    sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec()));
                    sink.detach();
                }
                Err(e) => warn!("audio playback failed: {e}"),
            }
        }

        pub fn play_jump(&self) { self.play(&self.jump); }
        pub fn play_coin(&self) { self.play(&self.coin); }
        pub fn play_game_over(&self) { self.play(&self.game_over); }
        pub fn play_level_clear(&self) { self.play(&self.level_clear); }
        pub fn play_win(&self) { self.play(&self.win); }
    }

    // ════════════════════════════════════════════════════════════
    //  Synth
    // ════════════════════════════════════════════════════════════

    /// Render tones back to back. Each note gets a short attack and a
    /// linear release so consecutive notes do not click.
    fn synth(tones: &[Tone], volume: f32) -> Vec<f32> {
        let mut out = Vec::new();
        let mut phase = 0.0_f32;
        for tone in tones {
            let n = (SAMPLE_RATE as f32 * tone.secs) as usize;
            let attack = (n / 20).max(1);
            for i in 0..n {
                let progress = i as f32 / n as f32;
                let freq = tone.from + (tone.to - tone.from) * progress;
                phase = (phase + freq / SAMPLE_RATE as f32).fract();

                let level = match tone.wave {
                    Wave::Square => if phase < 0.5 { 1.0 } else { -1.0 },
                    Wave::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
                };
                let env = if i < attack {
                    i as f32 / attack as f32
                } else {
                    1.0 - progress
                };
                out.push(level * env * volume);
            }
        }
        out
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn synth_length_matches_durations() {
            let samples = synth(COIN, 0.2);
            let expected = (SAMPLE_RATE as f32 * 0.05) as usize + (SAMPLE_RATE as f32 * 0.16) as usize;
            assert_eq!(samples.len(), expected);
        }

        #[test]
        fn synth_stays_within_volume() {
            for tones in [JUMP, COIN, GAME_OVER, LEVEL_CLEAR, WIN] {
                let samples = synth(tones, 0.25);
                assert!(samples.iter().all(|s| s.abs() <= 0.25 + f32::EPSILON));
                assert!(samples.iter().any(|s| s.abs() > 0.1));
            }
        }

        #[test]
        fn notes_start_silent() {
            let samples = synth(&[note(440.0, 0.1, Wave::Square)], 1.0);
            assert_eq!(samples[0], 0.0);
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API (no-ops without the sound feature)
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_jump(&self) {}
    pub fn play_coin(&self) {}
    pub fn play_game_over(&self) {}
    pub fn play_level_clear(&self) {}
    pub fn play_win(&self) {}
}
