//! Microphone capture via cpal.
//!
//! `Microphone` opens the system default input device and hands out 16 kHz
//! mono i16 chunks whatever the hardware's native format, rate, or channel
//! count. It also measures ambient noise so the VAD threshold can adapt to
//! the room instead of being a magic number.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use cpal::SampleFormat;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc;
use tracing::warn;

use din_core::wav::{SAMPLE_RATE, rms_level};

/// Samples per `read_chunk()` call — 100 ms at 16 kHz mono.
pub const CHUNK_SAMPLES: usize = 1_600;

pub struct Microphone {
    rx: mpsc::UnboundedReceiver<Vec<i16>>,
    pending: Vec<i16>,
    stop: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl Microphone {
    /// Open the default input device and start capturing.
    pub fn open() -> Result<Self, String> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or("no microphone found; connect an audio input device")?;

        let supported = device
            .default_input_config()
            .map_err(|e| format!("failed to read input config: {e}"))?;

        let native_rate = supported.sample_rate().0;
        let channels = supported.channels();
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let (tx, rx) = mpsc::unbounded_channel::<Vec<i16>>();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        // cpal streams are !Send on macOS, so the stream lives on its own
        // OS thread and samples cross over a channel.
        let thread = std::thread::spawn(move || {
            let forward = {
                let stop = stop_flag.clone();
                move |samples: Vec<i16>| {
                    if !stop.load(Ordering::Relaxed) {
                        let mono = downmix(&samples, channels);
                        let _ = tx.send(resample(&mono, native_rate, SAMPLE_RATE));
                    }
                }
            };

            let stream = match sample_format {
                SampleFormat::I16 => device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        forward(data.to_vec());
                    },
                    |err| warn!("capture stream error: {err}"),
                    None,
                ),
                SampleFormat::F32 => device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let as_i16: Vec<i16> = data
                            .iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
                            .collect();
                        forward(as_i16);
                    },
                    |err| warn!("capture stream error: {err}"),
                    None,
                ),
                other => {
                    warn!("unsupported input sample format: {other:?}");
                    return;
                }
            };

            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    warn!("failed to build capture stream: {e}");
                    return;
                }
            };
            if let Err(e) = stream.play() {
                warn!("failed to start capture stream: {e}");
                return;
            }

            // Park until drop signals stop; dropping the stream stops cpal.
            loop {
                std::thread::park();
                if stop_flag.load(Ordering::Relaxed) {
                    break;
                }
            }
        });

        Ok(Self {
            rx,
            pending: Vec::new(),
            stop,
            thread: Some(thread),
        })
    }

    /// Read exactly [`CHUNK_SAMPLES`] samples (100 ms of audio).
    pub async fn read_chunk(&mut self) -> Result<Vec<i16>, String> {
        while self.pending.len() < CHUNK_SAMPLES {
            match self.rx.recv().await {
                Some(samples) => self.pending.extend_from_slice(&samples),
                None => return Err("capture stream ended".into()),
            }
        }
        Ok(self.pending.drain(..CHUNK_SAMPLES).collect())
    }

    /// Listen to the room for `duration` and report the ambient RMS level.
    ///
    /// Run once at startup, before any prompt plays, so speech does not
    /// pollute the measurement.
    pub async fn ambient_level(&mut self, duration: Duration) -> Result<f32, String> {
        let chunks = (duration.as_millis() as usize / 100).max(1);
        let mut samples = Vec::with_capacity(chunks * CHUNK_SAMPLES);
        for _ in 0..chunks {
            samples.extend(self.read_chunk().await?);
        }
        Ok(rms_level(&samples))
    }
}

impl Drop for Microphone {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

// ---------------------------------------------------------------------------
// Sample conversion
// ---------------------------------------------------------------------------

/// Average interleaved frames down to mono.
fn downmix(input: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return input.to_vec();
    }
    let ch = usize::from(channels);
    input
        .chunks_exact(ch)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
            (sum / i32::from(channels)) as i16
        })
        .collect()
}

/// Linear-interpolation resample. Plenty for speech.
fn resample(input: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || input.is_empty() {
        return input.to_vec();
    }
    let step = f64::from(from_rate) / f64::from(to_rate);
    let out_len = (input.len() as f64 / step) as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * step;
        let idx = pos as usize;
        let frac = pos - idx as f64;
        let a = f64::from(input[idx]);
        let b = input.get(idx + 1).map_or(a, |&s| f64::from(s));
        out.push((a + frac * (b - a)) as i16);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_mono_is_passthrough() {
        assert_eq!(downmix(&[5, -5, 10], 1), vec![5, -5, 10]);
    }

    #[test]
    fn downmix_averages_stereo_frames() {
        assert_eq!(downmix(&[100, 200, 300, 400], 2), vec![150, 350]);
    }

    #[test]
    fn resample_same_rate_is_passthrough() {
        assert_eq!(resample(&[1, 2, 3], 16_000, 16_000), vec![1, 2, 3]);
    }

    #[test]
    fn resample_48k_to_16k_takes_every_third() {
        let input: Vec<i16> = (0..12).collect();
        let out = resample(&input, 48_000, 16_000);
        assert_eq!(out, vec![0, 3, 6, 9]);
    }

    #[test]
    fn resample_empty_input() {
        assert!(resample(&[], 48_000, 16_000).is_empty());
    }
}
