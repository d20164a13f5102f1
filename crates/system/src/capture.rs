//! Captured-frame counting over a fixed wall-clock window.

use crate::clock::{Clock, SystemClock};
use hud_core::{CaptureRegion, HudError, Result};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Length of one accumulation window.
pub const ACCUMULATION_PERIOD: Duration = Duration::from_millis(500);

/// A frame handed out by a [`FrameSource`].
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    /// Monotonic frame number assigned by the source.
    pub sequence: u64,
    pub captured_at: Instant,
    /// Rectangle the frame covers; `None` for the full output.
    pub region: Option<CaptureRegion>,
}

/// Continuous screen-capture backend.
pub trait FrameSource: Send {
    /// Begin capturing.  `target_rate` of 0 means as fast as possible.
    fn start(&mut self, target_rate: u32) -> Result<()>;

    /// Newest frame captured since the previous call, if any.  Never blocks.
    fn latest_frame(&mut self) -> Option<FrameBuffer>;

    /// Release the capture handle.
    fn stop(&mut self);
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn start(&mut self, target_rate: u32) -> Result<()> {
        (**self).start(target_rate)
    }

    fn latest_frame(&mut self) -> Option<FrameBuffer> {
        (**self).latest_frame()
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// Real frame rate measured by counting frames from a [`FrameSource`].
///
/// Every [`poll_once`](Self::poll_once) pulls at most one frame.  Once
/// [`ACCUMULATION_PERIOD`] has elapsed the count is turned into a rate,
/// which stays fixed until the next window closes.
pub struct CaptureFrameCounter<S: FrameSource, C = SystemClock> {
    /// `None` once stopped, or when the source never came up.
    source:       Option<S>,
    region:       Option<CaptureRegion>,
    clock:        C,
    frame_count:  u64,
    window_start: Instant,
    real_fps:     f64,
}

impl<S: FrameSource> CaptureFrameCounter<S, SystemClock> {
    /// Create and start a source through `create`.
    ///
    /// A creation or start failure is logged and leaves the counter
    /// permanently reporting `0.0`.
    pub fn open<F>(region: Option<CaptureRegion>, target_rate: u32, create: F) -> Self
    where
        F: FnOnce(Option<CaptureRegion>) -> Result<S>,
    {
        Self::open_with_clock(region, target_rate, create, SystemClock)
    }
}

impl<S: FrameSource, C: Clock> CaptureFrameCounter<S, C> {
    pub fn open_with_clock<F>(
        region: Option<CaptureRegion>,
        target_rate: u32,
        create: F,
        clock: C,
    ) -> Self
    where
        F: FnOnce(Option<CaptureRegion>) -> Result<S>,
    {
        let source = create(region).and_then(|mut source| {
            source.start(target_rate)?;
            Ok(source)
        });

        let source = match source {
            Ok(source) => {
                info!("Frame capture started (target rate {target_rate}, region {region:?})");
                Some(source)
            }
            Err(e) => {
                warn!("Frame capture unavailable: {e}; real FPS disabled");
                None
            }
        };

        let window_start = clock.now();
        Self {
            source,
            region,
            clock,
            frame_count: 0,
            window_start,
            real_fps: 0.0,
        }
    }

    /// Pull one frame and close the accumulation window if it has elapsed.
    pub fn poll_once(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        if source.latest_frame().is_some() {
            self.frame_count += 1;
        }

        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= ACCUMULATION_PERIOD {
            self.real_fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.window_start = now;
        }
    }
}

impl<S: FrameSource, C> CaptureFrameCounter<S, C> {
    /// Rate computed when the last window closed; `0.0` before the first.
    pub fn real_fps(&self) -> f64 {
        self.real_fps
    }

    /// Frames counted in the window still open.
    pub fn pending_frames(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.source.is_some()
    }

    pub fn region(&self) -> Option<CaptureRegion> {
        self.region
    }

    /// Release the frame source.  Safe to call repeatedly; the last rate is kept.
    pub fn stop(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.stop();
            info!("Frame capture stopped");
        }
    }
}

impl<S: FrameSource, C> Drop for CaptureFrameCounter<S, C> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Frame source that emulates a display presenting at a fixed refresh rate.
///
/// Yields at most one frame per refresh period; periods that pass between
/// polls count as dropped.
pub struct SyntheticFrameSource<C = SystemClock> {
    region:   Option<CaptureRegion>,
    refresh:  u32,
    clock:    C,
    period:   Duration,
    next_due: Option<Instant>,
    sequence: u64,
    running:  bool,
}

impl SyntheticFrameSource<SystemClock> {
    pub fn create(region: Option<CaptureRegion>, refresh_hz: u32) -> Result<Self> {
        Self::with_clock(region, refresh_hz, SystemClock)
    }
}

impl<C: Clock> SyntheticFrameSource<C> {
    pub fn with_clock(region: Option<CaptureRegion>, refresh_hz: u32, clock: C) -> Result<Self> {
        if refresh_hz == 0 {
            return Err(HudError::FrameSource("refresh rate must be non-zero".into()));
        }
        if region.is_some_and(|r| r.is_empty()) {
            return Err(HudError::FrameSource("capture region has zero area".into()));
        }
        Ok(Self {
            region,
            refresh: refresh_hz,
            clock,
            period: Duration::from_secs(1) / refresh_hz,
            next_due: None,
            sequence: 0,
            running: false,
        })
    }
}

impl<C: Clock + Send> FrameSource for SyntheticFrameSource<C> {
    fn start(&mut self, target_rate: u32) -> Result<()> {
        let rate = match target_rate {
            0 => self.refresh,
            n => n.min(self.refresh),
        };
        self.period = Duration::from_secs(1) / rate;
        self.next_due = None;
        self.running = true;
        Ok(())
    }

    fn latest_frame(&mut self) -> Option<FrameBuffer> {
        if !self.running {
            return None;
        }
        let now = self.clock.now();
        let due = self.next_due.unwrap_or(now);
        if now < due {
            return None;
        }

        let missed = (now.duration_since(due).as_nanos() / self.period.as_nanos()) as u32;
        self.next_due = Some(due + self.period * (missed + 1));
        self.sequence += 1;
        Some(FrameBuffer {
            sequence:    self.sequence,
            captured_at: now,
            region:      self.region,
        })
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Yields a frame on every call and counts `stop()` calls.
    struct EveryCall {
        stops: Arc<AtomicUsize>,
        seq:   u64,
    }

    impl FrameSource for EveryCall {
        fn start(&mut self, _target_rate: u32) -> Result<()> {
            Ok(())
        }

        fn latest_frame(&mut self) -> Option<FrameBuffer> {
            self.seq += 1;
            Some(FrameBuffer {
                sequence:    self.seq,
                captured_at: Instant::now(),
                region:      None,
            })
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counter(clock: &ManualClock) -> (CaptureFrameCounter<EveryCall, ManualClock>, Arc<AtomicUsize>) {
        let stops = Arc::new(AtomicUsize::new(0));
        let source = EveryCall { stops: stops.clone(), seq: 0 };
        let counter = CaptureFrameCounter::open_with_clock(None, 0, |_| Ok(source), clock.clone());
        (counter, stops)
    }

    #[test]
    fn converges_to_simulated_rate() {
        let clock = ManualClock::new();
        let (mut counter, _) = counter(&clock);
        let frame = Duration::from_secs(1) / 120;

        for _ in 0..120 {
            clock.advance(frame);
            counter.poll_once();
        }
        assert!((counter.real_fps() - 120.0).abs() < 2.5, "got {}", counter.real_fps());
    }

    #[test]
    fn second_window_starts_from_zero() {
        let clock = ManualClock::new();
        let (mut counter, _) = counter(&clock);

        // 100 frames/s for one window
        for _ in 0..50 {
            clock.advance(Duration::from_millis(10));
            counter.poll_once();
        }
        assert!((counter.real_fps() - 100.0).abs() < 1e-6);
        assert_eq!(counter.pending_frames(), 0);

        // 50 frames/s for the next
        for _ in 0..25 {
            clock.advance(Duration::from_millis(20));
            counter.poll_once();
        }
        assert!((counter.real_fps() - 50.0).abs() < 1e-6, "got {}", counter.real_fps());
        assert_eq!(counter.pending_frames(), 0);
    }

    #[test]
    fn two_windows_at_120_hz() {
        let clock = ManualClock::new();
        let (mut counter, _) = counter(&clock);
        let frame = Duration::from_secs(1) / 120;

        let mut closed = Vec::new();
        for _ in 0..130 {
            clock.advance(frame);
            let before = counter.real_fps();
            counter.poll_once();
            if counter.pending_frames() == 0 {
                closed.push(counter.real_fps());
            }
            assert!(counter.real_fps() == before || counter.pending_frames() == 0);
        }
        assert_eq!(closed.len(), 2);
        for fps in closed {
            assert!((fps - 120.0).abs() < 1.0, "got {fps}");
        }
    }

    #[test]
    fn zero_before_first_window() {
        let clock = ManualClock::new();
        let (mut counter, _) = counter(&clock);

        for _ in 0..10 {
            clock.advance(Duration::from_millis(10));
            counter.poll_once();
        }
        assert_eq!(counter.real_fps(), 0.0);
        assert_eq!(counter.pending_frames(), 10);
    }

    #[test]
    fn value_is_sticky_between_windows() {
        let clock = ManualClock::new();
        let (mut counter, _) = counter(&clock);

        for _ in 0..50 {
            clock.advance(Duration::from_millis(10));
            counter.poll_once();
        }
        let first = counter.real_fps();
        assert!((first - 100.0).abs() < 1e-6);

        // fewer frames, window still open
        for _ in 0..3 {
            clock.advance(Duration::from_millis(40));
            counter.poll_once();
        }
        assert_eq!(counter.real_fps(), first);
    }

    #[test]
    fn infrequent_polling_degrades_toward_zero() {
        let clock = ManualClock::new();
        let (mut counter, _) = counter(&clock);

        clock.advance(Duration::from_secs(5));
        counter.poll_once();
        assert!(counter.real_fps() <= 0.2);
    }

    #[test]
    fn stop_twice_keeps_sticky_value() {
        let clock = ManualClock::new();
        let (mut counter, stops) = counter(&clock);

        for _ in 0..60 {
            clock.advance(Duration::from_millis(10));
            counter.poll_once();
        }
        let before = counter.real_fps();
        assert!(before > 0.0);

        counter.stop();
        counter.stop();
        assert_eq!(counter.real_fps(), before);
        assert!(!counter.is_running());
        assert_eq!(stops.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(1));
        counter.poll_once();
        assert_eq!(counter.real_fps(), before);
    }

    #[test]
    fn drop_releases_source_once() {
        let clock = ManualClock::new();
        let (mut counter, stops) = counter(&clock);
        counter.stop();
        drop(counter);
        assert_eq!(stops.load(Ordering::SeqCst), 1);

        let (counter, stops) = self::counter(&clock);
        drop(counter);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_source_reports_zero() {
        let clock = ManualClock::new();
        let mut counter: CaptureFrameCounter<EveryCall, _> = CaptureFrameCounter::open_with_clock(
            None,
            0,
            |_| Err(HudError::FrameSource("no display".into())),
            clock.clone(),
        );
        assert!(!counter.is_running());

        for _ in 0..100 {
            clock.advance(Duration::from_millis(10));
            counter.poll_once();
        }
        assert_eq!(counter.real_fps(), 0.0);
        counter.stop();
        counter.stop();
    }

    #[test]
    fn region_is_forwarded_to_factory() {
        let region = CaptureRegion { x: 0, y: 0, width: 800, height: 600 };
        let seen = Arc::new(std::sync::Mutex::new(None));
        let seen_by_factory = seen.clone();
        let counter = CaptureFrameCounter::open(Some(region), 0, move |r| {
            *seen_by_factory.lock().unwrap() = r;
            SyntheticFrameSource::create(r, 60)
        });
        assert!(counter.is_running());
        assert_eq!(*seen.lock().unwrap(), Some(region));
        assert_eq!(counter.region(), Some(region));
    }

    #[test]
    fn synthetic_source_paces_frames() {
        let clock = ManualClock::new();
        let mut source = SyntheticFrameSource::with_clock(None, 60, clock.clone()).unwrap();
        assert!(source.latest_frame().is_none(), "not started");

        source.start(0).unwrap();
        assert_eq!(source.latest_frame().map(|f| f.sequence), Some(1));
        assert!(source.latest_frame().is_none());

        clock.advance(Duration::from_millis(17));
        assert_eq!(source.latest_frame().map(|f| f.sequence), Some(2));

        source.stop();
        clock.advance(Duration::from_millis(17));
        assert!(source.latest_frame().is_none());
    }

    #[test]
    fn synthetic_source_through_counter_measures_refresh() {
        let clock = ManualClock::new();
        let source_clock = clock.clone();
        let mut counter = CaptureFrameCounter::open_with_clock(
            None,
            0,
            move |r| SyntheticFrameSource::with_clock(r, 60, source_clock),
            clock.clone(),
        );

        // poll every 1 ms for one second
        for _ in 0..1000 {
            clock.advance(Duration::from_millis(1));
            counter.poll_once();
        }
        assert!((counter.real_fps() - 60.0).abs() < 3.0, "got {}", counter.real_fps());
    }

    #[test]
    fn synthetic_source_rejects_bad_settings() {
        assert!(SyntheticFrameSource::create(None, 0).is_err());
        let empty = CaptureRegion { x: 0, y: 0, width: 0, height: 0 };
        assert!(SyntheticFrameSource::create(Some(empty), 60).is_err());
    }
}
