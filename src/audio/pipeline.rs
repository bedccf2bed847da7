// Audio mix pipeline - Queues core samples and produces one frame of audio
//
// The emulation core pushes stereo samples while it runs. Once per loop
// iteration the pipeline turns exactly `sample_rate / target_fps` of them into
// the submission buffer, padding with silence on underrun and leaving any
// surplus queued for the next frame.

use super::mixer::Mixer;
use super::{AudioMode, StereoSample};
use crate::platform::AudioSink;
use std::collections::VecDeque;
use tracing::trace;

/// Queue capacity, in frames of audio
const QUEUE_FRAMES: usize = 4;

/// Fixed-size mixing pipeline between the core and the audio device
#[derive(Debug)]
pub struct AudioMixPipeline {
    /// Samples produced by the core and not yet mixed
    queue: VecDeque<StereoSample>,
    queue_capacity: usize,

    /// Reused staging area for the samples of one flush
    scratch: Vec<StereoSample>,

    /// Submission buffer, always `frames_per_flush` long
    buffer: Vec<StereoSample>,

    mixer: Mixer,
    sample_rate: u32,
    target_fps: u32,
    stats: AudioStats,
}

impl AudioMixPipeline {
    /// Create a pipeline sized for one video frame of audio
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Output rate in Hz
    /// * `target_fps` - Video frames per second (clamped to at least 1)
    pub fn new(sample_rate: u32, target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        let frames = (sample_rate / target_fps) as usize;
        let queue_capacity = frames.max(1) * QUEUE_FRAMES;

        Self {
            queue: VecDeque::with_capacity(queue_capacity),
            queue_capacity,
            scratch: Vec::with_capacity(queue_capacity),
            buffer: vec![StereoSample::SILENCE; frames],
            mixer: Mixer::new(),
            sample_rate,
            target_fps,
            stats: AudioStats::default(),
        }
    }

    /// Output rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Video frames per second the buffer is sized for
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Stereo frames produced by every flush
    pub fn frames_per_flush(&self) -> usize {
        self.buffer.len()
    }

    /// Queue samples produced by the core
    ///
    /// When the queue is full the oldest samples are dropped.
    pub fn push_samples(&mut self, samples: &[StereoSample]) {
        for &sample in samples {
            if self.queue.len() == self.queue_capacity {
                self.queue.pop_front();
                self.stats.samples_dropped += 1;
            }
            self.queue.push_back(sample);
        }
    }

    /// Number of samples currently queued
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Mix one frame of audio into the submission buffer
    ///
    /// # Arguments
    ///
    /// * `lowpass` - Use the low-pass mix instead of the direct copy
    ///
    /// # Returns
    ///
    /// Stereo frames written, always `frames_per_flush()`
    pub fn flush(&mut self, lowpass: bool) -> usize {
        let frames = self.buffer.len();
        let available = self.queue.len().min(frames);

        self.scratch.clear();
        self.scratch.extend(self.queue.drain(..available));
        if available < frames {
            self.scratch.resize(frames, StereoSample::SILENCE);
            self.stats.underruns += 1;
        }

        self.mixer.mix(&self.scratch, &mut self.buffer, lowpass);
        self.stats.frames_flushed += 1;

        trace!(available, frames, lowpass, "audio flush");
        frames
    }

    /// The submission buffer produced by the last flush
    pub fn buffer(&self) -> &[StereoSample] {
        &self.buffer
    }

    /// Submit the submission buffer to the device
    pub fn submit(&self, sink: &mut dyn AudioSink) -> usize {
        sink.submit_audio(&self.buffer);
        self.buffer.len()
    }

    /// Mix everything queued and submit it straight away
    ///
    /// Used when the core announces that samples are available instead of
    /// the loop flushing once per frame. This path always copies directly;
    /// the low-pass filter only applies to per-frame flushes.
    ///
    /// # Returns
    ///
    /// Stereo frames submitted
    pub fn drain_to(&mut self, sink: &mut dyn AudioSink) -> usize {
        let available = self.queue.len();
        if available == 0 {
            return 0;
        }

        self.scratch.clear();
        self.scratch.extend(self.queue.drain(..));

        sink.submit_audio(&self.scratch);
        available
    }

    /// Pipeline statistics
    pub fn stats(&self) -> AudioStats {
        self.stats
    }
}

/// Audio statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioStats {
    /// Number of per-frame flushes performed
    pub frames_flushed: u64,

    /// Samples discarded because the queue was full
    pub samples_dropped: u64,

    /// Flushes that had to be padded with silence
    pub underruns: u64,
}

/// The core's view of the audio pipeline during one step
///
/// When audio is disabled every call is a no-op, so the pipeline stays idle.
pub struct AudioPort<'a> {
    pipeline: &'a mut AudioMixPipeline,
    sink: &'a mut dyn AudioSink,
    mode: AudioMode,
    enabled: bool,
    submitted: usize,
}

impl<'a> AudioPort<'a> {
    /// Wrap the pipeline and the device for one core step
    pub fn new(
        pipeline: &'a mut AudioMixPipeline,
        sink: &'a mut dyn AudioSink,
        mode: AudioMode,
        enabled: bool,
    ) -> Self {
        Self {
            pipeline,
            sink,
            mode,
            enabled,
            submitted: 0,
        }
    }

    /// Whether the core should generate audio at all
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Output rate the core should generate at
    pub fn sample_rate(&self) -> u32 {
        self.pipeline.sample_rate()
    }

    /// Queue samples produced by the core
    pub fn push_samples(&mut self, samples: &[StereoSample]) {
        if self.enabled {
            self.pipeline.push_samples(samples);
        }
    }

    /// Number of samples queued and not yet mixed
    pub fn queued(&self) -> usize {
        self.pipeline.queued()
    }

    /// Notification that the core has samples ready
    ///
    /// In on-demand mode this mixes and submits everything queued, inline.
    /// In per-frame mode it does nothing; the loop flushes after the step.
    pub fn samples_ready(&mut self) {
        if self.enabled && self.mode == AudioMode::OnDemand {
            self.submitted += self.pipeline.drain_to(self.sink);
        }
    }

    /// Frames submitted through `samples_ready` during this step
    pub fn submitted(&self) -> usize {
        self.submitted
    }
}
