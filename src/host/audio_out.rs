// Audio output - Plays mixed frames on the desktop audio device using cpal
//
// The frame loop submits interleaved stereo frames; the device callback runs
// on its own thread and drains them from a shared ring buffer, playing
// silence whenever the ring runs dry.

use crate::audio::StereoSample;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{error, info};

/// Errors raised while opening the audio device
#[derive(Debug, Error)]
pub enum AudioOutputError {
    /// No default output device
    #[error("no output device available")]
    NoDevice,

    /// Stream could not be created
    #[error("failed to build audio stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    /// Stream could not be started
    #[error("failed to start audio stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

/// Fixed-capacity ring of stereo frames
#[derive(Debug)]
pub struct SampleRing {
    buffer: Vec<StereoSample>,
    read_pos: usize,
    write_pos: usize,
    count: usize,
}

impl SampleRing {
    /// Create a ring holding at most `capacity` frames
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![StereoSample::SILENCE; capacity.max(1)],
            read_pos: 0,
            write_pos: 0,
            count: 0,
        }
    }

    /// Push a frame
    ///
    /// Returns false if the ring is full.
    pub fn push(&mut self, sample: StereoSample) -> bool {
        if self.count >= self.buffer.len() {
            return false;
        }

        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        self.count += 1;
        true
    }

    /// Pop the oldest frame
    pub fn pop(&mut self) -> Option<StereoSample> {
        if self.count == 0 {
            return None;
        }

        let sample = self.buffer[self.read_pos];
        self.read_pos = (self.read_pos + 1) % self.buffer.len();
        self.count -= 1;
        Some(sample)
    }

    /// Frames currently held
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Maximum number of frames
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

/// Audio output handle
pub struct AudioOutput {
    _stream: Stream,
    ring: Arc<Mutex<SampleRing>>,
    sample_rate: u32,
}

impl AudioOutput {
    /// Open the default device as a stereo stream
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Output rate in Hz
    /// * `buffer_duration_ms` - Ring size (affects latency)
    pub fn new(sample_rate: u32, buffer_duration_ms: u32) -> Result<Self, AudioOutputError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioOutputError::NoDevice)?;

        info!(device = %device.name().unwrap_or_default(), "audio device");

        let stream_config = StreamConfig {
            channels: 2,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let capacity = (u64::from(buffer_duration_ms) * u64::from(sample_rate) / 1000) as usize;
        let ring = Arc::new(Mutex::new(SampleRing::new(capacity)));
        let ring_clone = Arc::clone(&ring);

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut ring = ring_clone.lock().unwrap();
                for frame in data.chunks_mut(2) {
                    let sample = ring.pop().unwrap_or(StereoSample::SILENCE);
                    frame[0] = f32::from(sample.left) / 32768.0;
                    if let Some(right) = frame.get_mut(1) {
                        *right = f32::from(sample.right) / 32768.0;
                    }
                }
            },
            move |err| {
                error!(error = %err, "audio stream error");
            },
            None,
        )?;

        stream.play()?;

        info!(sample_rate, capacity, "audio output initialized");

        Ok(Self {
            _stream: stream,
            ring,
            sample_rate,
        })
    }

    /// Queue frames for playback
    ///
    /// # Returns
    ///
    /// Frames dropped because the ring was full
    pub fn push(&self, samples: &[StereoSample]) -> usize {
        let mut ring = self.ring.lock().unwrap();
        samples.iter().filter(|&&sample| !ring.push(sample)).count()
    }

    /// Frames waiting to be played
    pub fn buffered(&self) -> usize {
        self.ring.lock().unwrap().len()
    }

    /// Output rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
