//! The L76 driver: fix-state store, poll loop, clock synchronization and
//! fix acquisition.

use core::time::Duration;

use tinyvec::ArrayVec;

use crate::error::{Error, Result};
use crate::hal::{Clock, Monotonic, Transport};
use crate::nmea::buffer::LineBuffer;
use crate::nmea::frame::{self, Frame};
use crate::nmea::parse::{GgaData, SatelliteInfo, SentenceData, VtgData};
use crate::nmea::{canonical, tags, Tag};
use crate::{log_debug, log_info, log_trace, log_warn};

/// Bytes requested from the transport per poll iteration. The L76 serves
/// its I2C register in chunks of this size.
pub const READ_CHUNK: usize = 64;

/// Clock drift beyond which an RMC time report overwrites the RTC.
pub const CLOCK_SYNC_TOLERANCE: Duration = Duration::from_secs(20);

/// Default freshness window for [`L76Driver::is_fixed`].
pub const FIX_FRESHNESS: Duration = Duration::from_secs(5 * 60);

/// Most distinct sentence tags tracked within one polling session.
const MAX_SESSION_TAGS: usize = 32;

/// Most targets a caller can pass to [`L76Driver::read`].
pub const MAX_TARGETS: usize = 8;

/// How the target set terminates a poll.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollMode {
    /// Stop once any target has been seen.
    Any,
    /// Stop once every target has been seen.
    All,
}

/// How a polling session ended. Timing out is a normal outcome, not an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The target condition (or the requested fix) was satisfied.
    Matched,
    /// The timeout elapsed first; `missing` lists the targets never seen.
    TimedOut {
        missing: ArrayVec<[Tag; MAX_TARGETS]>,
    },
}

/// Last-decoded-frame table, satellite table and fix timestamp.
///
/// Frames are stored under their canonical tag, so constellation variants
/// share a slot and `coords()` finds a `GNGGA` fix; the frame itself keeps
/// the source tag. Satellite records accumulate across GSV cycles and are
/// never expired.
#[derive(Debug, Default)]
struct FixState {
    last: ArrayVec<[(Tag, Frame); 16]>,
    satellites: ArrayVec<[SatelliteInfo; 64]>,
    last_fix_at: Option<Duration>,
}

impl FixState {
    fn last(&self, canon: Tag) -> Option<&Frame> {
        self.last
            .iter()
            .find(|(tag, _)| *tag == canon)
            .map(|(_, frame)| frame)
    }

    fn store(&mut self, frame: Frame) {
        let canon = canonical(frame.tag);
        if let Some(slot) = self.last.iter_mut().find(|(tag, _)| *tag == canon) {
            slot.1 = frame;
        } else if self.last.try_push((canon, frame)).is_some() {
            log_warn!("fix-state table full, dropping {}", canon.as_str());
        }
    }

    fn merge_satellites(&mut self, records: &[SatelliteInfo]) {
        for record in records {
            if let Some(slot) = self
                .satellites
                .iter_mut()
                .find(|known| known.prn == record.prn)
            {
                *slot = *record;
            } else if self.satellites.try_push(*record).is_some() {
                log_warn!("satellite table full, dropping PRN {}", record.prn);
            }
        }
    }
}

/// Driver for a Quectel L76-class GNSS receiver.
///
/// Single-owner and fully synchronous: the poll loop, the buffer and the
/// fix-state store all live on this struct and every mutation happens
/// inside a `&mut self` call. Callers must serialize invocations; in a
/// concurrent environment the driver belongs behind a mutex or owned by
/// one task.
pub struct L76Driver<T, C, M> {
    transport: T,
    clock: C,
    /// Per-session poll watchdog, reset at every session start.
    watchdog: M,
    /// Uptime reference, started once and never reset; fix timestamps and
    /// freshness checks are measured against it.
    uptime: M,
    buffer: LineBuffer,
    state: FixState,
}

impl<T: Transport, C: Clock, M: Monotonic> L76Driver<T, C, M> {
    pub fn new(transport: T, clock: C, watchdog: M, mut uptime: M) -> Self {
        uptime.reset();
        uptime.start();
        Self {
            transport,
            clock,
            watchdog,
            uptime,
            buffer: LineBuffer::new(),
            state: FixState::default(),
        }
    }

    /// Poll the receiver until the target condition is met or `timeout`
    /// elapses. `timeout = None` polls forever.
    ///
    /// Every complete sentence read during the session is scanned,
    /// checksum-validated, decoded and merged into the fix-state store;
    /// the targets only decide when to stop. With `fix = true` the session
    /// runs until a position sentence carries a non-null longitude and the
    /// target set is ignored.
    ///
    /// The timeout is only checked between read/decode cycles, so a slow
    /// transport read can overrun it by one cycle's latency. That bound is
    /// inherent to the cooperative design and deliberately not patched
    /// over.
    pub fn read(
        &mut self,
        timeout: Option<Duration>,
        targets: &[Tag],
        mode: PollMode,
        fix: bool,
    ) -> Result<PollOutcome> {
        self.watchdog.reset();
        self.watchdog.start();
        self.buffer.reset();

        let mut matched: ArrayVec<[Tag; MAX_SESSION_TAGS]> = ArrayVec::new();
        let mut fix_seen = false;

        loop {
            let mut chunk = [0u8; READ_CHUNK];
            let n = self.transport.read(&mut chunk).map_err(Error::Transport)?;
            if n > 0 {
                log_trace!("stream: {} bytes", n);
                self.buffer.extend(&chunk[..n]);
            }

            while let Some(line) = self.buffer.take_line() {
                let Some(frame) = frame::scan(&line) else {
                    // Not sentence-shaped; receivers emit other line
                    // formats, skip silently.
                    continue;
                };
                if !frame.integrity {
                    log_warn!(
                        "checksum mismatch {:02x}/{:02x} on {}",
                        frame.computed_checksum,
                        frame.declared_checksum,
                        frame.tag.as_str()
                    );
                    continue;
                }
                fix_seen |= self.merge(frame, &mut matched);
            }

            if fix && fix_seen {
                return Ok(PollOutcome::Matched);
            }
            if !fix {
                // `Any` over an empty set never matches (daemon mode);
                // `All` over an empty set is a trivial superset and stops
                // at once.
                let done = match mode {
                    PollMode::Any => targets.iter().any(|t| matched.contains(t)),
                    PollMode::All => targets.iter().all(|t| matched.contains(t)),
                };
                if done {
                    return Ok(PollOutcome::Matched);
                }
            }
            if let Some(timeout) = timeout {
                if self.watchdog.elapsed() > timeout {
                    let mut missing = ArrayVec::new();
                    for &t in targets.iter().filter(|t| !matched.contains(t)) {
                        if missing.try_push(t).is_some() {
                            log_warn!(
                                "missing-target report truncated to {} entries",
                                missing.len()
                            );
                            break;
                        }
                    }
                    log_debug!("poll timed out, {} targets missing", missing.len());
                    return Ok(PollOutcome::TimedOut { missing });
                }
            }
        }
    }

    /// Merge one integrity-valid frame into the fix state. Returns whether
    /// the frame was a position fix with a non-null longitude.
    fn merge(&mut self, frame: Frame, matched: &mut ArrayVec<[Tag; MAX_SESSION_TAGS]>) -> bool {
        log_debug!("sentence {}: {} bytes", frame.tag.as_str(), frame.raw.len());

        // Targets may name either the source tag or its canonical form.
        for tag in [frame.tag, canonical(frame.tag)] {
            if !matched.contains(&tag) {
                let _ = matched.try_push(tag);
            }
        }

        let mut got_fix = false;
        match &frame.data {
            Some(SentenceData::Gga(gga)) => {
                if gga.lon.is_some() {
                    self.state.last_fix_at = Some(self.uptime.elapsed());
                    got_fix = true;
                }
            }
            Some(SentenceData::Rmc(rmc)) => {
                self.sync_clock(rmc.date.zip(rmc.time));
            }
            Some(SentenceData::Gsv(gsv)) => {
                self.state.merge_satellites(&gsv.satellites);
            }
            _ => {}
        }
        self.state.store(frame);
        got_fix
    }

    /// Overwrite the RTC from a GPS-reported date+time when the drift
    /// exceeds [`CLOCK_SYNC_TOLERANCE`]. Runs opportunistically on every
    /// valid RMC decode.
    fn sync_clock(&mut self, reported: Option<(chrono::NaiveDate, chrono::NaiveTime)>) {
        let Some((date, time)) = reported else {
            return;
        };
        let gps = date.and_time(time);
        let drift = (gps - self.clock.now()).num_seconds();
        if drift.unsigned_abs() > CLOCK_SYNC_TOLERANCE.as_secs() {
            log_info!("clock drift {} s, syncing RTC to GPS time", drift);
            self.clock.set(gps);
        }
    }

    /// Poll forever in daemon mode: no targets, no timeout. Only returns
    /// on a transport error.
    pub fn start(&mut self) -> Result<PollOutcome> {
        self.read(None, &[], PollMode::Any, false)
    }

    /// Current coordinates.
    ///
    /// With `refresh = false` a cached decode is returned without touching
    /// the bus; otherwise one polling session targets the position
    /// sentence first.
    pub fn coords(&mut self, timeout: Option<Duration>, refresh: bool) -> Result<Option<GgaData>> {
        if refresh || self.gga_data().is_none() {
            self.read(timeout, &[tags::GPGGA], PollMode::Any, false)?;
        }
        Ok(self.gga_data())
    }

    /// Current track and ground speed, with the same refresh contract as
    /// [`coords`](Self::coords).
    pub fn speed(&mut self, timeout: Option<Duration>, refresh: bool) -> Result<Option<VtgData>> {
        if refresh || self.vtg_data().is_none() {
            self.read(timeout, &[tags::GPVTG], PollMode::Any, false)?;
        }
        Ok(self.vtg_data())
    }

    /// Acquire a position fix: up to `retries` fix-mode polling sessions,
    /// stopping early once [`is_fixed`](Self::is_fixed) reports a fresh
    /// fix.
    ///
    /// On exhaustion this returns whatever the position entry currently
    /// holds, which may have a null longitude — that is the "no fix
    /// obtained" signal.
    pub fn fix(&mut self, timeout_per_attempt: Option<Duration>, retries: u32) -> Result<GgaData> {
        for attempt in 0..retries {
            log_debug!("fix attempt {}/{}", attempt + 1, retries);
            self.read(
                timeout_per_attempt,
                &[tags::GPGGA, tags::GPRMC],
                PollMode::Any,
                true,
            )?;
            if self.is_fixed(FIX_FRESHNESS) {
                break;
            }
        }
        Ok(self.gga_data().unwrap_or_default())
    }

    /// Whether the last achieved fix is within `epsilon` of now.
    pub fn is_fixed(&self, epsilon: Duration) -> bool {
        match self.state.last_fix_at {
            Some(at) => self.uptime.elapsed().saturating_sub(at) <= epsilon,
            None => false,
        }
    }

    /// Most recent integrity-valid frame for `tag` (constellation
    /// variants share an entry).
    pub fn last(&self, tag: Tag) -> Option<&Frame> {
        self.state.last(canonical(tag))
    }

    /// Accumulated satellite table, keyed by PRN.
    pub fn satellites(&self) -> &[SatelliteInfo] {
        self.state.satellites.as_slice()
    }

    /// The injected real-time clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn gga_data(&self) -> Option<GgaData> {
        match self.state.last(tags::GPGGA)?.data {
            Some(SentenceData::Gga(gga)) => Some(gga),
            _ => None,
        }
    }

    fn vtg_data(&self) -> Option<VtgData> {
        match self.state.last(tags::GPVTG)?.data {
            Some(SentenceData::Vtg(vtg)) => Some(vtg),
            _ => None,
        }
    }
}
