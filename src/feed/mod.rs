// SampleFeed - lock-free SPSC transport for peak samples
//
// Carries spectral peak measurements from whatever polls the acoustic front
// end into the gesture worker thread. Uses a single pre-sized rtrb ring:
// samples are small Copy values, so unlike an audio buffer pool there is
// nothing to recycle back to the producer side.
//
// Sample flow:
// 1. Front-end poller pushes a PeakSample per polling tick
// 2. Worker thread pops until the ring is empty
// 3. A full ring drops the newest sample (the stream is lossy by contract;
//    the classifier derives time from timestamps, not from sample count)

use std::time::Instant;

use rtrb::{Consumer, Producer};

/// Default ring capacity, sized for several seconds of 10 Hz polling.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

/// One spectral peak measurement from the acoustic front end.
///
/// `at` is the capture instant; the classifier derives all elapsed-time
/// decisions from it. `magnitude_db` rides along for observers and is never
/// used in classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakSample {
    /// Capture time of this measurement
    pub at: Instant,
    /// Magnitude of the dominant spectral peak in dB
    pub magnitude_db: f32,
    /// Frequency of the dominant spectral peak in Hz
    pub frequency_hz: f32,
}

/// Producer half of the feed, owned by the front-end poller.
pub type SampleProducer = Producer<PeakSample>;

/// Consumer half of the feed, owned by the gesture worker.
pub type SampleConsumer = Consumer<PeakSample>;

/// Split feed halves for producer/consumer separation.
///
/// Returned by [`SampleFeed::new`]; each half is `Send` and moves to its
/// owning thread.
pub struct SampleFeedChannels {
    /// Producer for pushing peak samples from the polling side
    pub producer: SampleProducer,
    /// Consumer for draining peak samples in the worker thread
    pub consumer: SampleConsumer,
}

/// Lock-free sample feed constructor.
///
/// # Thread Safety
/// - Lock-free: no mutexes in push/pop operations
/// - SPSC: exactly one producer and one consumer; both halves are `Send`
///   but not `Sync`
pub struct SampleFeed;

impl SampleFeed {
    /// Create a feed with the given ring capacity.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(capacity: usize) -> SampleFeedChannels {
        assert!(capacity > 0, "feed capacity must be greater than 0");

        let (producer, consumer) = rtrb::RingBuffer::new(capacity);
        SampleFeedChannels { producer, consumer }
    }
}

/// Occupancy of the consumer side as a percentage of ring capacity.
///
/// Reported to the telemetry hub by the worker so a stalled consumer is
/// visible before samples start dropping.
pub fn occupancy_percent(consumer: &SampleConsumer) -> f32 {
    let capacity = consumer.buffer().capacity();
    if capacity == 0 {
        return 0.0;
    }
    (consumer.slots() as f32 / capacity as f32).clamp(0.0, 1.0) * 100.0
}
