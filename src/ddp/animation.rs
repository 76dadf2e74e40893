use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use super::sender::{DatagramSink, DdpSender};
use crate::config::{AnimationConfig, SenderConfig};
use crate::pacing::Pacer;

/// One colour repeated for every LED, RGB order
pub fn solid_frame(led_count: usize, rgb: [u8; 3]) -> Vec<u8> {
    rgb.repeat(led_count)
}

/// Red intensities from `start` up to (excluding) `end` in `step` increments
#[derive(Debug, Clone)]
pub struct RedRamp {
    next: u16,
    end: u16,
    step: u16,
}

impl RedRamp {
    pub fn new(config: &AnimationConfig) -> Self {
        RedRamp {
            next: config.start as u16,
            end: config.end.min(256),
            step: config.step.max(1) as u16,
        }
    }
}

impl Iterator for RedRamp {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.next >= self.end {
            return None;
        }
        let value = self.next as u8;
        self.next += self.step;
        Some(value)
    }
}

/// Demo driver: plays the red ramp through a `DdpSender`
pub struct Animator<S, P> {
    config: SenderConfig,
    sender: DdpSender<S, P>,
    running: Arc<AtomicBool>,
}

impl<S: DatagramSink, P: Pacer> Animator<S, P> {
    pub fn new(config: SenderConfig, sink: S, pacer: P) -> Self {
        let sender = DdpSender::new(
            sink,
            pacer,
            config.ddp.chunk_size,
            config.ddp.fragment_delay(),
        );
        Animator {
            config,
            sender,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Get a clone of the running flag for signal handlers
    pub fn get_running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Play the ramp once, or until the running flag clears when `repeat` is set.
    /// Returns the number of frames sent.
    pub fn run(&mut self, repeat: bool) -> u64 {
        let ddp = self.config.ddp.clone();
        let mut frames = 0u64;

        loop {
            let mut played = false;
            for red in RedRamp::new(&self.config.animation) {
                if !self.running.load(Ordering::Relaxed) {
                    return frames;
                }

                let payload = ddp.pixel_format.transform(solid_frame(ddp.led_count, [red, 0, 0]));
                info!(
                    "Sending frame red={}, total={} bytes, chunk_size={}",
                    red,
                    payload.len(),
                    ddp.chunk_size
                );
                let report = self.sender.send_frame(&payload);
                debug!(
                    "Frame {}: {} fragments, {} bytes, {} failed",
                    self.sender.frames_sent(),
                    report.fragments,
                    report.bytes,
                    report.failed
                );

                frames += 1;
                played = true;
                self.sender.pause(ddp.frame_delay());
            }

            if !repeat || !played {
                return frames;
            }
        }
    }

    /// Send one all-black frame so the strip does not hold the last colour
    pub fn shutdown(&mut self) {
        debug!("Turning off LEDs...");
        let blank = vec![0u8; self.config.ddp.frame_len()];
        self.sender.send_frame(&blank);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddp::fragment::HEADER_LEN;
    use crate::ddp::sender::tests::CaptureSink;
    use crate::pacing::{NoPacing, RecordingPacer};
    use crate::pixel_format::PixelFormat;
    use std::time::Duration;

    #[test]
    fn test_solid_frame_layout() {
        let frame = solid_frame(4, [1, 2, 3]);
        assert_eq!(frame, vec![1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3]);
        assert_eq!(solid_frame(880, [10, 0, 0]).len(), 2640);
    }

    #[test]
    fn test_default_ramp() {
        let values: Vec<u8> = RedRamp::new(&AnimationConfig::default()).collect();
        assert_eq!(values, vec![0, 10]);
    }

    #[test]
    fn test_full_ramp_stops_at_255() {
        let config = AnimationConfig {
            start: 0,
            end: 256,
            step: 10,
        };
        let values: Vec<u8> = RedRamp::new(&config).collect();
        assert_eq!(values.len(), 26);
        assert_eq!(values.last(), Some(&250));
    }

    #[test]
    fn test_run_sends_each_frame() {
        let mut sink = CaptureSink::default();
        let mut pacer = RecordingPacer::default();
        let config = SenderConfig::default();

        let mut animator = Animator::new(config, &mut sink, &mut pacer);
        assert_eq!(animator.run(false), 2);

        // 2 frames x 3 fragments
        assert_eq!(sink.packets.len(), 6);
        assert_eq!(sink.packets[3][HEADER_LEN], 10);
        assert_eq!(
            pacer.pauses,
            vec![
                Duration::from_millis(2),
                Duration::from_millis(2),
                Duration::from_millis(100),
                Duration::from_millis(2),
                Duration::from_millis(2),
                Duration::from_millis(100),
            ]
        );
    }

    #[test]
    fn test_pixel_format_applied() {
        let mut sink = CaptureSink::default();
        let mut config = SenderConfig::default();
        config.ddp.pixel_format = PixelFormat::Grb;
        config.ddp.led_count = 2;
        config.animation.start = 10;

        Animator::new(config, &mut sink, NoPacing).run(false);
        assert_eq!(&sink.packets[0][HEADER_LEN..], &[0, 10, 0, 0, 10, 0]);
    }

    #[test]
    fn test_cleared_flag_stops_repeat() {
        let mut sink = CaptureSink::default();
        let mut animator = Animator::new(SenderConfig::default(), &mut sink, NoPacing);
        animator.get_running_flag().store(false, Ordering::Relaxed);
        assert_eq!(animator.run(true), 0);
    }

    #[test]
    fn test_empty_ramp_with_repeat_returns() {
        let mut sink = CaptureSink::default();
        let mut config = SenderConfig::default();
        config.animation.start = 20;
        config.animation.end = 10;
        assert_eq!(Animator::new(config, &mut sink, NoPacing).run(true), 0);
    }

    #[test]
    fn test_zero_chunk_size_does_not_panic() {
        let mut sink = CaptureSink::default();
        let mut config = SenderConfig::default();
        config.ddp.chunk_size = 0;
        config.ddp.led_count = 1;
        config.animation.end = 1;

        assert_eq!(Animator::new(config, &mut sink, NoPacing).run(false), 1);
        assert_eq!(sink.packets.len(), 3);
    }

    #[test]
    fn test_shutdown_sends_black_frame() {
        let mut sink = CaptureSink::default();
        let mut config = SenderConfig::default();
        config.ddp.led_count = 3;

        Animator::new(config, &mut sink, NoPacing).shutdown();
        assert_eq!(sink.packets.len(), 1);
        assert_eq!(&sink.packets[0][HEADER_LEN..], &[0u8; 9]);
    }
}
