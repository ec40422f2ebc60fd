//! Random Byte Buffer and Reseed Policy.
//!
//! Holds a fixed buffer of DRBG output that the delay primitive drains one
//! byte per tick. When the buffer is exhausted it is regenerated in one go,
//! and the DRBG is reseeded from the entropy source once the output produced
//! since the last seed crosses the configured threshold.
//!
//! # Accounting
//! `bytes_since_reseed` advances by one per byte served *and* by a whole
//! buffer length at every rollover, before the threshold is checked. The
//! reseed decision therefore works in whole-buffer steps. Analyses of the
//! countermeasure rely on this bound, so it is kept as is.
//!
//! # Security
//! - **Zeroization**: the buffer is wiped on drop, reseed entropy right after use.
//! - **No Allocation**: every path here is callable from the tick interrupt.
//! - **No Logging**: errors are returned, never logged, since a logger may
//!   lock. The caller logs outside interrupt context.

use zeroize::Zeroize;

use crate::config::{RdiConfig, BUFFER_LENGTH, RESEED_ENTROPY_LEN};
use crate::drbg::Drbg;
use crate::entropy::sp800_90b::HealthTester;
use crate::entropy::EntropySource;
use crate::error::RdiError;
use crate::stats::RdiStats;

/// DRBG-backed byte buffer with its reseed policy.
pub struct EntropyBuffer<E, D> {
    source: E,
    drbg: D,
    health: HealthTester,
    config: RdiConfig,
    buffer: [u8; BUFFER_LENGTH],
    /// Reseed entropy, zero outside `reseed()`.
    scratch: [u8; RESEED_ENTROPY_LEN],
    /// Index of the next unconsumed byte, always in `[0, BUFFER_LENGTH)`.
    cursor: usize,
    bytes_since_reseed: u32,
    /// Set by `prime()`, cleared when a rollover fails.
    primed: bool,
    stats: RdiStats,
}

impl<E: EntropySource, D: Drbg> EntropyBuffer<E, D> {
    /// Creates an unprimed buffer. Nothing is drawn until [`prime`](Self::prime).
    pub fn new(source: E, drbg: D, config: RdiConfig) -> Result<Self, RdiError> {
        config.validate()?;
        Ok(Self::build(source, drbg, config))
    }

    /// Creates an unprimed buffer with [`RdiConfig::default`].
    pub fn with_defaults(source: E, drbg: D) -> Self {
        Self::build(source, drbg, RdiConfig::default())
    }

    fn build(source: E, drbg: D, config: RdiConfig) -> Self {
        Self {
            source,
            drbg,
            health: HealthTester::new(),
            config,
            buffer: [0u8; BUFFER_LENGTH],
            scratch: [0u8; RESEED_ENTROPY_LEN],
            cursor: 0,
            bytes_since_reseed: 0,
            primed: false,
            stats: RdiStats::new(),
        }
    }

    /// Draws fresh entropy and reseeds the DRBG, instantiating it on first use.
    ///
    /// Resets the bytes-since-reseed counter. The entropy scratch is wiped
    /// whether or not the reseed succeeds.
    pub fn reseed(&mut self) -> Result<(), RdiError> {
        let result = self.reseed_from_source();
        self.scratch.zeroize();
        result?;

        self.bytes_since_reseed = 0;
        self.stats.record_reseed();
        Ok(())
    }

    fn reseed_from_source(&mut self) -> Result<(), RdiError> {
        self.source.fill(&mut self.scratch)?;
        if self.config.health_tests {
            self.health.feed_all(&self.scratch)?;
        }

        if self.drbg.is_seeded() {
            self.drbg.reseed(&self.scratch, None)?;
        } else {
            self.drbg.seed(&self.scratch)?;
        }
        Ok(())
    }

    /// Overwrites the whole buffer with DRBG output.
    ///
    /// Leaves the cursor and the reseed counter alone.
    pub fn refill(&mut self) -> Result<(), RdiError> {
        self.drbg.generate(&mut self.buffer)?;
        self.stats.record_refill();
        Ok(())
    }

    /// Reseeds, refills and rewinds. Run by `start()`.
    pub fn prime(&mut self) -> Result<(), RdiError> {
        self.primed = false;
        self.reseed()?;
        self.bytes_since_reseed = 0;
        self.refill()?;
        self.cursor = 0;
        self.primed = true;
        Ok(())
    }

    /// Returns the byte at the cursor and advances past it.
    ///
    /// Consuming the last byte of the buffer triggers the rollover: account
    /// for the whole buffer, reseed if the counter is over the threshold,
    /// refill and rewind. If the rollover fails the buffer is left unprimed
    /// and every later call reports `NotStarted` until the next `prime()`.
    pub fn next_byte(&mut self) -> Result<u8, RdiError> {
        if !self.primed {
            return Err(RdiError::NotStarted);
        }

        let byte = self.buffer[self.cursor];
        self.cursor += 1;
        self.bytes_since_reseed += 1;

        if self.cursor >= BUFFER_LENGTH {
            if let Err(e) = self.rollover() {
                self.cursor = 0;
                self.primed = false;
                return Err(e);
            }
        }
        Ok(byte)
    }

    fn rollover(&mut self) -> Result<(), RdiError> {
        self.bytes_since_reseed += BUFFER_LENGTH as u32;
        if self.bytes_since_reseed > self.config.reseed_after_bytes {
            self.reseed()?;
        }
        self.refill()?;
        self.cursor = 0;
        Ok(())
    }

    /// Whether `prime()` has succeeded and no rollover has failed since.
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Index of the next byte to be served.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current value of the reseed accounting counter.
    pub fn bytes_since_reseed(&self) -> u32 {
        self.bytes_since_reseed
    }

    /// Active configuration.
    pub fn config(&self) -> &RdiConfig {
        &self.config
    }

    /// Activity counters.
    pub fn stats(&self) -> &RdiStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut RdiStats {
        &mut self.stats
    }

    /// The entropy source.
    pub fn source(&self) -> &E {
        &self.source
    }

    /// The DRBG.
    pub fn drbg(&self) -> &D {
        &self.drbg
    }
}

impl<E, D> Drop for EntropyBuffer<E, D> {
    fn drop(&mut self) {
        self.buffer.zeroize();
        self.scratch.zeroize();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::drbg::{DrbgError, HmacDrbg};
    use crate::entropy::replay::ReplaySource;
    use crate::entropy::EntropyError;

    /// 0..=255 repeated: passes the health tests indefinitely.
    pub(crate) static RAMP: [u8; 256] = {
        let mut out = [0u8; 256];
        let mut i = 0;
        while i < 256 {
            out[i] = i as u8;
            i += 1;
        }
        out
    };

    /// DRBG double: emits a running counter and records every call.
    #[derive(Debug)]
    pub(crate) struct CountingDrbg {
        pub seeds: usize,
        pub reseeds: usize,
        pub generates: usize,
        pub next: u8,
        pub last_entropy: [u8; RESEED_ENTROPY_LEN],
        pub fail_generate: bool,
        seeded: bool,
    }

    impl Default for CountingDrbg {
        fn default() -> Self {
            Self {
                seeds: 0,
                reseeds: 0,
                generates: 0,
                next: 0,
                last_entropy: [0u8; RESEED_ENTROPY_LEN],
                fail_generate: false,
                seeded: false,
            }
        }
    }

    impl Drbg for CountingDrbg {
        fn seed(&mut self, entropy: &[u8]) -> Result<(), DrbgError> {
            self.seeds += 1;
            self.seeded = true;
            self.last_entropy.copy_from_slice(entropy);
            // Deterministic in the seed, so replays line up.
            self.next = entropy[0];
            Ok(())
        }

        fn reseed(&mut self, entropy: &[u8], additional_input: Option<&[u8]>) -> Result<(), DrbgError> {
            assert!(additional_input.is_none());
            self.reseeds += 1;
            self.last_entropy.copy_from_slice(entropy);
            self.next = self.next.wrapping_add(entropy[0]);
            Ok(())
        }

        fn generate(&mut self, out: &mut [u8]) -> Result<(), DrbgError> {
            if self.fail_generate {
                return Err(DrbgError::ReseedRequired);
            }
            self.generates += 1;
            for b in out.iter_mut() {
                *b = self.next;
                self.next = self.next.wrapping_add(1);
            }
            Ok(())
        }

        fn is_seeded(&self) -> bool {
            self.seeded
        }
    }

    fn counting(config: RdiConfig) -> EntropyBuffer<ReplaySource<'static>, CountingDrbg> {
        EntropyBuffer::new(ReplaySource::cycling(&RAMP), CountingDrbg::default(), config).unwrap()
    }

    #[test]
    fn test_next_byte_before_prime() {
        let mut buf = counting(RdiConfig::default());
        assert_eq!(buf.next_byte(), Err(RdiError::NotStarted));
        assert_eq!(buf.drbg().generates, 0);
    }

    #[test]
    fn test_prime_seeds_then_fills() {
        let mut buf = counting(RdiConfig::default());
        buf.prime().unwrap();

        assert!(buf.is_primed());
        assert_eq!(buf.drbg().seeds, 1);
        assert_eq!(buf.drbg().reseeds, 0);
        assert_eq!(buf.drbg().generates, 1);
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.bytes_since_reseed(), 0);
        assert_eq!(buf.source().draws(), 1);
        assert_eq!(&buf.drbg().last_entropy[..], &RAMP[..RESEED_ENTROPY_LEN]);
    }

    #[test]
    fn test_bytes_served_in_order() {
        let mut buf = counting(RdiConfig::default());
        buf.prime().unwrap();
        // Seed byte 0 makes the first buffer 0, 1, 2, ...
        for expected in 0..10u8 {
            assert_eq!(buf.next_byte().unwrap(), expected);
        }
        assert_eq!(buf.cursor(), 10);
        assert_eq!(buf.bytes_since_reseed(), 10);
    }

    #[test]
    fn test_full_buffer_triggers_one_refill() {
        let mut buf = counting(RdiConfig::default());
        buf.prime().unwrap();

        for _ in 0..BUFFER_LENGTH - 1 {
            buf.next_byte().unwrap();
        }
        assert_eq!(buf.stats().refills, 1);
        assert_eq!(buf.cursor(), BUFFER_LENGTH - 1);

        buf.next_byte().unwrap();
        assert_eq!(buf.stats().refills, 2);
        assert_eq!(buf.drbg().generates, 2);
        assert_eq!(buf.cursor(), 0);
        // Per-byte increments plus the whole-buffer increment.
        assert_eq!(buf.bytes_since_reseed(), 2 * BUFFER_LENGTH as u32);
        assert_eq!(buf.drbg().reseeds, 0);
    }

    #[test]
    fn test_refill_continues_stream() {
        let mut buf = counting(RdiConfig::default());
        buf.prime().unwrap();
        let mut last = 0u8;
        for i in 0..3 * BUFFER_LENGTH {
            let b = buf.next_byte().unwrap();
            assert_eq!(b, i as u8);
            last = b;
        }
        assert_eq!(last, (3 * BUFFER_LENGTH - 1) as u8);
    }

    #[test]
    fn test_reseed_on_threshold_with_small_limit() {
        // 2 buffers' worth of accounting per rollover: 256. Threshold 600 is
        // crossed on the third rollover (768 > 600), not the second (512).
        let config = RdiConfig {
            reseed_after_bytes: 600,
            health_tests: true,
        };
        let mut buf = counting(config);
        buf.prime().unwrap();

        for _ in 0..2 * BUFFER_LENGTH {
            buf.next_byte().unwrap();
        }
        assert_eq!(buf.drbg().reseeds, 0);
        assert_eq!(buf.bytes_since_reseed(), 512);

        for _ in 0..BUFFER_LENGTH {
            buf.next_byte().unwrap();
        }
        assert_eq!(buf.drbg().reseeds, 1);
        assert_eq!(buf.bytes_since_reseed(), 0);
        assert_eq!(buf.stats().reseeds, 2);
        assert_eq!(buf.stats().refills, 4);
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        // Exactly equal does not reseed.
        let config = RdiConfig {
            reseed_after_bytes: 256,
            health_tests: false,
        };
        let mut buf = counting(config);
        buf.prime().unwrap();
        for _ in 0..BUFFER_LENGTH {
            buf.next_byte().unwrap();
        }
        assert_eq!(buf.bytes_since_reseed(), 256);
        assert_eq!(buf.drbg().reseeds, 0);

        for _ in 0..BUFFER_LENGTH {
            buf.next_byte().unwrap();
        }
        assert_eq!(buf.drbg().reseeds, 1);
    }

    #[test]
    fn test_default_threshold_boundary() {
        let mut buf = counting(RdiConfig::default());
        buf.prime().unwrap();

        // Each rollover adds 2 * 128; 4096 rollovers land exactly on 1 MiB.
        for _ in 0..4096 * BUFFER_LENGTH {
            buf.next_byte().unwrap();
        }
        assert_eq!(buf.bytes_since_reseed(), 1_048_576);
        assert_eq!(buf.drbg().reseeds, 0);
        assert_eq!(buf.stats().refills, 4097);

        // The 4097th rollover (the 4098th refill) crosses it, well before
        // the 8193rd refill.
        for _ in 0..BUFFER_LENGTH {
            buf.next_byte().unwrap();
        }
        assert_eq!(buf.drbg().reseeds, 1);
        assert_eq!(buf.bytes_since_reseed(), 0);
        assert_eq!(buf.stats().refills, 4098);
    }

    #[test]
    fn test_prime_twice() {
        let mut buf = counting(RdiConfig::default());
        buf.prime().unwrap();
        for _ in 0..5 {
            buf.next_byte().unwrap();
        }
        buf.prime().unwrap();

        assert_eq!(buf.drbg().seeds, 1);
        assert_eq!(buf.drbg().reseeds, 1);
        assert_eq!(buf.drbg().generates, 2);
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.bytes_since_reseed(), 0);
    }

    #[test]
    fn test_entropy_failure_on_prime() {
        let mut buf = EntropyBuffer::new(
            ReplaySource::new(&RAMP[..16]),
            CountingDrbg::default(),
            RdiConfig::default(),
        )
        .unwrap();
        assert_eq!(
            buf.prime(),
            Err(RdiError::Entropy(EntropyError::Exhausted))
        );
        assert!(!buf.is_primed());
        assert_eq!(buf.next_byte(), Err(RdiError::NotStarted));
    }

    #[test]
    fn test_health_failure_blocks_seed() {
        static STUCK: [u8; 48] = [0xEE; 48];
        let mut buf = EntropyBuffer::new(
            ReplaySource::cycling(&STUCK),
            CountingDrbg::default(),
            RdiConfig::default(),
        )
        .unwrap();
        assert_eq!(
            buf.prime(),
            Err(RdiError::Entropy(EntropyError::HealthTestFailed))
        );
        assert_eq!(buf.drbg().seeds, 0);
    }

    #[test]
    fn test_reseed_scratch_wiped() {
        let mut buf = counting(RdiConfig::default());
        buf.prime().unwrap();
        assert_eq!(&buf.drbg().last_entropy[..], &RAMP[..RESEED_ENTROPY_LEN]);
        assert_eq!(buf.scratch, [0u8; RESEED_ENTROPY_LEN]);

        buf.reseed().unwrap();
        assert_eq!(
            &buf.drbg().last_entropy[..],
            &RAMP[RESEED_ENTROPY_LEN..2 * RESEED_ENTROPY_LEN]
        );
        assert_eq!(buf.scratch, [0u8; RESEED_ENTROPY_LEN]);
    }

    #[test]
    fn test_reseed_scratch_wiped_on_failure() {
        static STUCK: [u8; 48] = [0xEE; 48];
        let mut buf = EntropyBuffer::new(
            ReplaySource::cycling(&STUCK),
            CountingDrbg::default(),
            RdiConfig::default(),
        )
        .unwrap();
        assert!(buf.reseed().is_err());
        assert_eq!(buf.source().draws(), 1);
        assert_eq!(buf.scratch, [0u8; RESEED_ENTROPY_LEN]);
    }

    #[test]
    fn test_health_tests_can_be_disabled() {
        static STUCK: [u8; 48] = [0xEE; 48];
        let config = RdiConfig {
            health_tests: false,
            ..RdiConfig::default()
        };
        let mut buf =
            EntropyBuffer::new(ReplaySource::cycling(&STUCK), CountingDrbg::default(), config)
                .unwrap();
        assert!(buf.prime().is_ok());
    }

    #[test]
    fn test_rollover_failure_unprimes() {
        let mut buf = counting(RdiConfig::default());
        buf.prime().unwrap();
        buf.drbg.fail_generate = true;

        for _ in 0..BUFFER_LENGTH - 1 {
            buf.next_byte().unwrap();
        }
        assert_eq!(
            buf.next_byte(),
            Err(RdiError::Drbg(DrbgError::ReseedRequired))
        );
        assert!(!buf.is_primed());
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.next_byte(), Err(RdiError::NotStarted));

        buf.drbg.fail_generate = false;
        assert!(buf.prime().is_ok());
        assert!(buf.next_byte().is_ok());
    }

    #[test]
    fn test_deterministic_with_hmac_drbg() {
        let run = || {
            let mut buf = EntropyBuffer::new(
                ReplaySource::cycling(&RAMP),
                HmacDrbg::new(),
                RdiConfig::default(),
            )
            .unwrap();
            buf.prime().unwrap();
            let mut out = [0u8; 3 * BUFFER_LENGTH];
            for b in out.iter_mut() {
                *b = buf.next_byte().unwrap();
            }
            out
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RdiConfig {
            reseed_after_bytes: u32::MAX,
            health_tests: true,
        };
        assert!(matches!(
            EntropyBuffer::new(ReplaySource::cycling(&RAMP), CountingDrbg::default(), config),
            Err(RdiError::Config(_))
        ));
    }
}
