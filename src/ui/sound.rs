/// Sound effects: procedural chiptune cues via rodio (feature "sound").
///
/// `cues()` turns a batch of game events into at most a few sounds;
/// it is pure and always compiled. Playback is fire-and-forget.
///
/// Without the "sound" feature, `SoundEngine` is a stub that plays nothing.

use crate::sim::event::{GameEvent, MoveEvent};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    /// Tiles moved, nothing merged.
    Slide,
    /// Largest merge of the move; pitch rises with the value.
    Merge(u32),
    /// A merge involving a wild or doubler tile.
    Celebrate,
    Bomb,
    Shuffle,
    WildDrop,
    Win,
    Over,
}

/// Pick the cues for one action's events, loudest first.
/// Terminal outcomes replace the ordinary move sound.
pub fn cues(events: &[GameEvent]) -> Vec<Sfx> {
    let mut out = Vec::new();
    let mut moved = false;
    let mut best_merge = 0;
    let mut celebratory = false;

    for ev in events {
        match ev {
            GameEvent::Move(m) => {
                moved |= m.is_effective();
                if let MoveEvent::Merged { value, celebratory: c, .. } = *m {
                    best_merge = best_merge.max(value);
                    celebratory |= c;
                }
            }
            GameEvent::Bombed { .. } => out.push(Sfx::Bomb),
            GameEvent::Shuffled { .. } => out.push(Sfx::Shuffle),
            GameEvent::PowerUsed { kind: crate::sim::power::PowerKind::Wild, .. } => out.push(Sfx::WildDrop),
            GameEvent::Won { .. } => return vec![Sfx::Win],
            GameEvent::GameOver { .. } => return vec![Sfx::Over],
            _ => {}
        }
    }

    if celebratory {
        out.insert(0, Sfx::Celebrate);
    } else if best_merge > 0 {
        out.insert(0, Sfx::Merge(best_merge));
    } else if moved {
        out.insert(0, Sfx::Slide);
    }
    out
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    /// Pre-generated WAV buffers for the fixed cues.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        slide: Arc<Vec<u8>>,
        celebrate: Arc<Vec<u8>>,
        bomb: Arc<Vec<u8>>,
        shuffle: Arc<Vec<u8>>,
        wild: Arc<Vec<u8>>,
        win: Arc<Vec<u8>>,
        over: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                slide: Arc::new(make_wav(&gen_slide())),
                celebrate: Arc::new(make_wav(&arpeggio(&[784.0, 988.0, 1175.0, 1568.0], 0.05, 0.25))),
                bomb: Arc::new(make_wav(&gen_bomb())),
                shuffle: Arc::new(make_wav(&gen_shuffle())),
                wild: Arc::new(make_wav(&arpeggio(&[1319.0, 1047.0, 1568.0], 0.04, 0.2))),
                win: Arc::new(make_wav(&gen_win())),
                over: Arc::new(make_wav(&gen_over())),
            })
        }

        pub fn play(&self, sfx: Sfx) {
            match sfx {
                Sfx::Merge(value) => {
                    // One octave-ish step per doubling, from 2 → 330 Hz.
                    let steps = value.max(2).ilog2() as f32;
                    let freq = 330.0 * 2f32.powf((steps - 1.0) / 4.0);
                    self.play_buf(make_wav(&tone(freq, 0.06, 0.3)));
                }
                Sfx::Slide => self.play_shared(&self.slide),
                Sfx::Celebrate => self.play_shared(&self.celebrate),
                Sfx::Bomb => self.play_shared(&self.bomb),
                Sfx::Shuffle => self.play_shared(&self.shuffle),
                Sfx::WildDrop => self.play_shared(&self.wild),
                Sfx::Win => self.play_shared(&self.win),
                Sfx::Over => self.play_shared(&self.over),
            }
        }

        fn play_shared(&self, buf: &Arc<Vec<u8>>) {
            self.play_buf(buf.as_ref().clone());
        }

        fn play_buf(&self, wav: Vec<u8>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(wav)) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: mono f32 samples
    // ════════════════════════════════════════════════════════════

    fn samples_for(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Sine with a linear fade out.
    fn tone(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = samples_for(duration);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                (t * freq * TAU).sin() * env * volume
            })
            .collect()
    }

    /// Notes back to back, sine plus a touch of 2nd harmonic.
    fn arpeggio(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let n = samples_for(note_dur);
        let mut out = Vec::with_capacity(n * notes.len());
        for &freq in notes {
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).sqrt() * 0.6;
                let wave = (t * freq * TAU).sin() * 0.75 + (t * freq * 2.0 * TAU).sin() * 0.25;
                out.push(wave * env * volume);
            }
        }
        out
    }

    /// Soft swish: a short upward sweep.
    fn gen_slide() -> Vec<f32> {
        let n = samples_for(0.04);
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let freq = 180.0 + p * 120.0;
                (t * freq * TAU).sin() * (1.0 - p) * 0.12
            })
            .collect()
    }

    /// Low rumble with noise, decaying.
    fn gen_bomb() -> Vec<f32> {
        let n = samples_for(0.35);
        let mut seed: u32 = 0x2048;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
                let noise = (seed >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
                let thump = (t * (90.0 - p * 50.0) * TAU).sin();
                (noise * 0.6 + thump * 0.4) * (1.0 - p).powi(2) * 0.4
            })
            .collect()
    }

    /// Quick random-ish pitch flutter.
    fn gen_shuffle() -> Vec<f32> {
        let notes = [660.0, 440.0, 880.0, 550.0, 740.0, 495.0];
        arpeggio(&notes, 0.025, 0.18)
    }

    fn gen_win() -> Vec<f32> {
        let mut out = arpeggio(&[523.0, 659.0, 784.0, 1047.0, 1319.0], 0.09, 0.3);
        out.extend(tone(1568.0, 0.35, 0.3));
        out
    }

    fn gen_over() -> Vec<f32> {
        let mut out = arpeggio(&[392.0, 330.0, 262.0], 0.14, 0.3);
        out.extend(tone(196.0, 0.4, 0.3));
        out
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit PCM mono
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let channels: u16 = 1;
        let bits: u16 = 16;
        let byte_rate = SAMPLE_RATE * channels as u32 * bits as u32 / 8;
        let block_align = channels * bits / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&tone(440.0, 0.01, 0.5));
            let n = samples_for(0.01);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(wav.len(), 44 + n * 2);
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]) as usize, n * 2);
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}
