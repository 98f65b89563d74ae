//! Periodic heartbeat scheduler
//!
//! A free-running counter raises two events per cycle. The short event,
//! just after the counter restarts, shows the idle color; the rollover
//! event flashes the LED white. All of it happens in the counter's
//! interrupt handler: after [`Strobe::start`] returns there is nothing to
//! poll and the core can sleep.
//!
//! There is no software state machine: whether the system is
//! waiting for the short event or for rollover is a property of the counter
//! value alone.

use portable_atomic::{AtomicU32, Ordering};
use strobe_hal::timer::{CycleEvent, CycleSettings, CycleTimer};

use crate::color::Grb;
use crate::encoder::Transmit;

/// Color flashed once per cycle at rollover
pub const FLASH_COLOR: Grb = Grb::WHITE;

/// Color shown between flashes
///
/// A single-word slot. The firmware owns one `static` instance; it is
/// written before the counter is armed and may be updated at any time
/// afterwards with [`IdleColor::set`]. The interrupt handler reads it once
/// per short event, so an update shows up on the next cycle.
#[derive(Debug)]
pub struct IdleColor(AtomicU32);

impl IdleColor {
    pub const fn new(color: Grb) -> Self {
        Self(AtomicU32::new(color.into_u32()))
    }

    /// Replace the idle color with a single word store
    pub fn set(&self, color: Grb) {
        self.0.store(color.into_u32(), Ordering::Relaxed);
    }

    /// Current idle color
    pub fn get(&self) -> Grb {
        Grb::from_u32(self.0.load(Ordering::Relaxed))
    }
}

impl Default for IdleColor {
    fn default() -> Self {
        Self::new(Grb::BLACK)
    }
}

/// Pick and acknowledge the event to handle for this interrupt entry
///
/// The short event is checked first and wins if both flags are set; the
/// other flag stays pending and the interrupt fires again for it.
pub fn service<T: CycleTimer>(timer: &mut T) -> Option<CycleEvent> {
    if timer.is_pending(CycleEvent::Short) {
        timer.acknowledge(CycleEvent::Short);
        Some(CycleEvent::Short)
    } else if timer.is_pending(CycleEvent::Rollover) {
        timer.acknowledge(CycleEvent::Rollover);
        Some(CycleEvent::Rollover)
    } else {
        None
    }
}

/// The running heartbeat: counter, LED and the idle color it reads
pub struct Strobe<'a, T, X> {
    timer: T,
    led: X,
    idle: &'a IdleColor,
}

impl<'a, T, X> Strobe<'a, T, X>
where
    T: CycleTimer,
    X: Transmit,
{
    /// Prepare the LED line, store `idle_color` and arm the counter
    ///
    /// The first transmission happens one counter tick later, well after
    /// the line has settled low.
    pub fn start(
        mut timer: T,
        mut led: X,
        idle: &'a IdleColor,
        idle_color: Grb,
        settings: &CycleSettings,
    ) -> Self {
        led.prepare();
        idle.set(idle_color);
        timer.arm(settings);

        Self { timer, led, idle }
    }

    /// Interrupt handler body
    ///
    /// Services at most one event and returns it, or `None` if the entry
    /// was spurious.
    pub fn on_interrupt(&mut self) -> Option<CycleEvent> {
        let event = service(&mut self.timer)?;
        let color = match event {
            CycleEvent::Short => self.idle.get(),
            CycleEvent::Rollover => FLASH_COLOR,
        };
        self.led.transmit(color);
        Some(event)
    }

    /// Counter, for inspection
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Mutable counter, for simulation
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// LED transmitter, for inspection
    pub fn led(&self) -> &X {
        &self.led
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::mock::{encoder, Bench};
    use crate::timing::CpuSpeed;
    use crate::waveform::PulseTrain;
    use heapless::Vec;

    /// 8-bit counter with compare and overflow flags
    #[derive(Default)]
    struct SimCounter {
        settings: Option<CycleSettings>,
        count: u16,
        short_flag: bool,
        rollover_flag: bool,
        acks: Vec<CycleEvent, 16>,
    }

    impl SimCounter {
        /// Advance by one counter tick
        fn tick(&mut self) {
            let settings = self.settings.expect("counter not armed");
            if self.count >= settings.top() {
                self.count = 0;
                self.rollover_flag = true;
            } else {
                self.count += 1;
            }
            if self.count == settings.short_ticks {
                self.short_flag = true;
            }
        }

        fn any_pending(&self) -> bool {
            self.short_flag || self.rollover_flag
        }
    }

    impl CycleTimer for SimCounter {
        fn arm(&mut self, settings: &CycleSettings) {
            self.settings = Some(*settings);
            self.count = 0;
            self.short_flag = false;
            self.rollover_flag = false;
        }

        fn is_pending(&self, event: CycleEvent) -> bool {
            match event {
                CycleEvent::Short => self.short_flag,
                CycleEvent::Rollover => self.rollover_flag,
            }
        }

        fn acknowledge(&mut self, event: CycleEvent) {
            match event {
                CycleEvent::Short => self.short_flag = false,
                CycleEvent::Rollover => self.rollover_flag = false,
            }
            let _ = self.acks.push(event);
        }
    }

    /// Transmitter that only records what it was asked to send
    #[derive(Default)]
    struct Recorder {
        prepared: bool,
        sent: Vec<Grb, 16>,
    }

    impl Transmit for Recorder {
        fn prepare(&mut self) {
            self.prepared = true;
        }

        fn transmit(&mut self, color: Grb) {
            let _ = self.sent.push(color);
        }
    }

    type SimStrobe<'a> = Strobe<'a, SimCounter, Recorder>;

    fn start<'a>(idle: &'a IdleColor, color: Grb) -> SimStrobe<'a> {
        Strobe::start(
            SimCounter::default(),
            Recorder::default(),
            idle,
            color,
            &CycleSettings::REFERENCE,
        )
    }

    /// Advance `ticks` counter ticks, taking the interrupt whenever a flag is set
    fn run(strobe: &mut SimStrobe<'_>, ticks: u32) {
        for _ in 0..ticks {
            strobe.timer_mut().tick();
            while strobe.timer().any_pending() {
                strobe.on_interrupt();
            }
        }
    }

    #[test]
    fn test_start_state() {
        let idle = IdleColor::default();
        let strobe = start(&idle, Grb::from_u32(0x01_02_03));

        assert!(strobe.led().prepared);
        assert!(strobe.led().sent.is_empty());
        assert_eq!(idle.get(), Grb::from_u32(0x01_02_03));
        assert_eq!(strobe.timer().count, 0);
        assert!(!strobe.timer().any_pending());
    }

    #[test]
    fn test_short_event_sends_idle_color() {
        let idle = IdleColor::default();
        let mut strobe = start(&idle, Grb::BLACK);

        run(&mut strobe, 1);

        assert_eq!(strobe.led().sent.as_slice(), &[Grb::BLACK]);
        assert_eq!(strobe.timer().acks.as_slice(), &[CycleEvent::Short]);
    }

    #[test]
    fn test_rollover_flashes_white_once() {
        let idle = IdleColor::default();
        let mut strobe = start(&idle, Grb::BLACK);

        run(&mut strobe, 1);
        run(&mut strobe, 126);
        assert_eq!(strobe.led().sent.len(), 1);

        // Tick 128 wraps the counter to zero
        run(&mut strobe, 1);
        assert_eq!(strobe.led().sent.as_slice(), &[Grb::BLACK, FLASH_COLOR]);
        assert!(!strobe.timer().short_flag);
        assert!(!strobe.timer().rollover_flag);
        assert_eq!(
            strobe.timer().acks.as_slice(),
            &[CycleEvent::Short, CycleEvent::Rollover]
        );
    }

    #[test]
    fn test_idle_color_read_each_cycle() {
        let idle = IdleColor::default();
        let mut strobe = start(&idle, Grb::BLACK);

        run(&mut strobe, 128);
        idle.set(Grb::from_u32(0x00_FF_00));
        run(&mut strobe, 1);

        assert_eq!(
            strobe.led().sent.as_slice(),
            &[Grb::BLACK, FLASH_COLOR, Grb::from_u32(0x00_FF_00)]
        );
    }

    #[test]
    fn test_two_full_cycles() {
        let idle = IdleColor::new(Grb::new(0, 0, 8));
        let mut strobe = start(&idle, Grb::new(0, 0, 8));

        run(&mut strobe, 256);

        let dim = Grb::new(0, 0, 8);
        assert_eq!(
            strobe.led().sent.as_slice(),
            &[dim, FLASH_COLOR, dim, FLASH_COLOR]
        );
    }

    #[test]
    fn test_short_event_wins_when_both_pending() {
        let idle = IdleColor::default();
        let mut strobe = start(&idle, Grb::from_u32(0x11_22_33));
        strobe.timer_mut().short_flag = true;
        strobe.timer_mut().rollover_flag = true;

        assert_eq!(strobe.on_interrupt(), Some(CycleEvent::Short));
        assert!(strobe.timer().rollover_flag);
        assert_eq!(strobe.led().sent.as_slice(), &[Grb::from_u32(0x11_22_33)]);

        assert_eq!(strobe.on_interrupt(), Some(CycleEvent::Rollover));
        assert_eq!(
            strobe.led().sent.as_slice(),
            &[Grb::from_u32(0x11_22_33), FLASH_COLOR]
        );
    }

    #[test]
    fn test_spurious_interrupt_sends_nothing() {
        let idle = IdleColor::default();
        let mut strobe = start(&idle, Grb::BLACK);

        assert_eq!(strobe.on_interrupt(), None);
        assert!(strobe.led().sent.is_empty());
        assert!(strobe.timer().acks.is_empty());
    }

    #[test]
    fn test_end_to_end_with_encoder() {
        let bench = Bench::new(CpuSpeed::Mhz120);
        let idle = IdleColor::default();
        let mut strobe = Strobe::start(
            SimCounter::default(),
            encoder(&bench),
            &idle,
            Grb::BLACK,
            &CycleSettings::REFERENCE,
        );
        assert!(bench.output_enabled.get());

        bench.clear_trace();
        strobe.timer_mut().tick();
        assert_eq!(strobe.on_interrupt(), Some(CycleEvent::Short));
        let train = PulseTrain::capture(&bench.edges.borrow(), bench.now_ps.get()).unwrap();
        assert_eq!(train.decode(), Ok(Grb::BLACK));

        for _ in 0..127 {
            strobe.timer_mut().tick();
        }
        bench.clear_trace();
        assert_eq!(strobe.on_interrupt(), Some(CycleEvent::Rollover));
        let train = PulseTrain::capture(&bench.edges.borrow(), bench.now_ps.get()).unwrap();
        assert_eq!(train.decode(), Ok(FLASH_COLOR));
        assert!(!bench.level.get());
    }
}
