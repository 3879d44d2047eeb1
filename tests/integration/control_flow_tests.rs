//! Integration tests: ControlService → scheduler/decoder → actuator → LEDs.

use tricolor::actuator::{ActuatorController, IndicatorState, LedChannel, RequestSource};
use tricolor::adapters::expander_bus::{INIT_SEQUENCE, RetryPolicy, init_expander};
use tricolor::app::events::AppEvent;
use tricolor::app::service::ControlService;
use tricolor::config::{DEFAULT_EXPANDER_ADDR, SystemConfig};
use tricolor::error::BusError;
use tricolor::input::{INPUT_STATUS_REQUEST, LogicalInputEvent};
use tricolor::scheduler::TriggerEntry;

use crate::mock_hw::{MockBus, MockClock, MockDelay, MockLeds, MockTimer, RecordingSink};

const IDLE_PORT1: u8 = 0xFF;

struct Rig {
    service: ControlService,
    indicator: ActuatorController<MockLeds>,
    clock: MockClock,
    timer: MockTimer,
    bus: MockBus,
    delay: MockDelay,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    fn with_config(config: SystemConfig) -> Self {
        let mut rig = Self {
            service: ControlService::new(&config).unwrap(),
            indicator: ActuatorController::new(MockLeds::new()),
            clock: MockClock::at(0),
            timer: MockTimer::new(),
            bus: MockBus::new(),
            delay: MockDelay::default(),
            sink: RecordingSink::default(),
        };
        rig.service
            .start(&rig.indicator, &mut rig.timer, &mut rig.sink);
        rig
    }

    fn tick_at(&mut self, day: u64, hour: u64, minute: u64) {
        self.clock.set_hm(day, hour, minute);
        self.service
            .on_trigger_tick(&self.clock, &self.indicator, &mut self.timer, &mut self.sink);
    }

    fn interrupt(&mut self, port0: u8, port1: u8) {
        self.bus.queue(port0, port1);
        self.service.on_expander_interrupt(
            &mut self.bus,
            &mut self.delay,
            &self.indicator,
            &mut self.sink,
        );
    }

    fn indicator_changes(&self) -> Vec<(IndicatorState, RequestSource)> {
        self.sink
            .events
            .iter()
            .filter_map(|e| match e {
                AppEvent::IndicatorChanged(t) => Some((t.to, t.source)),
                _ => None,
            })
            .collect()
    }
}

// ── Scheduler path ────────────────────────────────────────────

#[test]
fn midnight_crossing_fires_early_trigger_once() {
    let mut rig = Rig::new();

    rig.tick_at(0, 23, 59);
    rig.tick_at(1, 0, 0);
    rig.tick_at(1, 0, 1);

    let alerts: Vec<_> = rig
        .indicator_changes()
        .into_iter()
        .filter(|(_, src)| *src == RequestSource::Schedule)
        .collect();
    assert_eq!(alerts, vec![(IndicatorState::Alert, RequestSource::Schedule)]);
    assert_eq!(rig.indicator.state(), IndicatorState::Alert);
    rig.indicator
        .with_outputs(|leds| assert_eq!(leds.lit(), vec![LedChannel::Red]));
}

#[test]
fn each_trigger_fires_once_per_day() {
    let mut rig = Rig::new();

    for day in 0..3 {
        for hour in 0..24 {
            for minute in [0, 1, 30] {
                rig.tick_at(day, hour, minute);
            }
        }
    }

    let stats = rig.service.stats();
    // Three entries, three days.
    assert_eq!(stats.triggers_fired, 9);
    assert_eq!(stats.daily_resets, 3);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::TriggerFired { .. })),
        9
    );
}

#[test]
fn timer_is_rearmed_after_every_tick() {
    let mut rig = Rig::new();
    assert_eq!(rig.timer.armed, vec![1_000]);

    rig.tick_at(0, 5, 0); // nothing fires
    rig.tick_at(0, 12, 0); // fires
    rig.tick_at(0, 11, 0); // clock regression, tick skipped

    assert_eq!(rig.timer.armed, vec![1_000, 60_000, 60_000, 60_000]);
    assert_eq!(rig.service.stats().clock_faults, 1);
    assert!(!rig.service.rearm_pending());
}

#[test]
fn failed_rearm_recovers_from_host_loop() {
    let mut rig = Rig::new();
    rig.timer.fail_next = 1;

    rig.tick_at(0, 5, 0);
    assert!(rig.service.rearm_pending());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::TimerFault(_))), 1);

    rig.service.poll_rearm(&mut rig.timer, &mut rig.sink);
    assert!(!rig.service.rearm_pending());
    assert_eq!(rig.timer.armed.last(), Some(&60_000));
}

#[test]
fn late_timer_never_loses_a_trigger() {
    let config = SystemConfig {
        triggers: heapless::Vec::from_slice(&[TriggerEntry::new(2, 20)]).unwrap(),
        ..SystemConfig::default()
    };
    let mut rig = Rig::with_config(config);

    // Each re-armed minute lands 10ms late; 02:20 on day 4 gets no tick.
    let mut now = 1_000;
    while now < 5 * 24 * 60 * 60_000 {
        rig.clock.set(now);
        rig.service
            .on_trigger_tick(&rig.clock, &rig.indicator, &mut rig.timer, &mut rig.sink);
        now += 60_010;
    }

    assert_eq!(rig.service.stats().triggers_fired, 5);
    assert_eq!(rig.service.stats().daily_resets, 5);
}

#[test]
fn clock_offset_moves_trigger_relative_to_boot() {
    let config = SystemConfig {
        clock_offset_minutes: 11 * 60 + 58,
        ..SystemConfig::default()
    };
    let mut rig = Rig::with_config(config);

    // Uptime 00:02 is wall-clock 12:00.
    rig.tick_at(0, 0, 1);
    assert_eq!(rig.indicator.state(), IndicatorState::Off);
    rig.tick_at(0, 0, 2);
    assert_eq!(rig.indicator.state(), IndicatorState::Alert);
}

#[test]
fn output_failure_keeps_state_and_consumes_trigger() {
    let mut rig = Rig::new();
    let mut leds = MockLeds::new();
    leds.fail_on = Some(LedChannel::Red);
    rig.indicator = ActuatorController::new(leds);

    rig.tick_at(0, 12, 0);
    rig.tick_at(0, 12, 0);

    assert_eq!(rig.indicator.state(), IndicatorState::Off);
    assert_eq!(rig.service.stats().actuator_faults, 1);
    assert_eq!(rig.service.stats().triggers_fired, 1);
    rig.indicator.with_outputs(|leds| assert!(leds.lit().is_empty()));
}

// ── Interrupt path ────────────────────────────────────────────

#[test]
fn rotary_down_ignores_pressed_buttons() {
    let mut rig = Rig::new();

    // A set, B clear, every button pressed.
    rig.interrupt(0x80, 0x00);

    assert_eq!(rig.service.decoder().position().value(), 2);
    assert_eq!(
        rig.indicator_changes().last(),
        Some(&(IndicatorState::Red, RequestSource::Rotary))
    );
    assert_eq!(
        rig.bus.transactions,
        vec![(DEFAULT_EXPANDER_ADDR, INPUT_STATUS_REQUEST.to_vec())]
    );
    assert_eq!(rig.delay.total_ms, 2);
}

#[test]
fn rotary_walks_palette_and_wraps() {
    let mut rig = Rig::new();

    rig.interrupt(0xC0, IDLE_PORT1);
    rig.interrupt(0xC0, IDLE_PORT1);
    rig.interrupt(0xC0, IDLE_PORT1);

    let rotary: Vec<_> = rig
        .indicator_changes()
        .into_iter()
        .filter(|(_, src)| *src == RequestSource::Rotary)
        .map(|(state, _)| state)
        .collect();
    assert_eq!(
        rotary,
        vec![IndicatorState::Blue, IndicatorState::Red, IndicatorState::Green]
    );
    assert_eq!(rig.service.decoder().position().value(), 0);
}

#[test]
fn single_button_requests_once_and_keeps_position() {
    let mut rig = Rig::new();
    rig.interrupt(0xC0, IDLE_PORT1);
    let before = rig.indicator_changes().len();

    rig.interrupt(0x00, !0x08);

    let changes = rig.indicator_changes();
    assert_eq!(changes.len(), before + 1);
    assert_eq!(
        changes.last(),
        Some(&(IndicatorState::Blue, RequestSource::Button(2)))
    );
    assert_eq!(rig.service.decoder().position().value(), 1);
}

#[test]
fn button_one_acknowledges_alert() {
    let mut rig = Rig::new();
    rig.interrupt(0xC0, IDLE_PORT1);
    rig.tick_at(0, 12, 0);
    assert!(rig.indicator.state().is_alert());
    let before = rig.indicator_changes().len();

    rig.interrupt(0x00, !0x04);

    let changes = rig.indicator_changes();
    assert_eq!(changes.len(), before + 1);
    assert_eq!(
        changes.last(),
        Some(&(IndicatorState::Green, RequestSource::Button(1)))
    );
    assert_eq!(rig.service.decoder().position().value(), 1);
    assert_eq!(rig.indicator.state(), IndicatorState::Green);
    rig.indicator
        .with_outputs(|leds| assert_eq!(leds.lit(), vec![LedChannel::Green]));
}

#[test]
fn bus_failure_changes_nothing() {
    let mut rig = Rig::new();
    rig.interrupt(0xC0, IDLE_PORT1);
    let writes_before = rig.indicator.with_outputs(|leds| leds.writes.len());

    rig.bus.queue_err(BusError::Timeout);
    let outcome = rig.service.on_expander_interrupt(
        &mut rig.bus,
        &mut rig.delay,
        &rig.indicator,
        &mut rig.sink,
    );

    assert!(outcome.is_none());
    assert_eq!(rig.indicator.state(), IndicatorState::Blue);
    assert_eq!(rig.service.decoder().position().value(), 1);
    assert_eq!(rig.indicator.with_outputs(|leds| leds.writes.len()), writes_before);
    assert_eq!(rig.service.stats().bus_faults, 1);
    assert_eq!(
        rig.sink.events.last(),
        Some(&AppEvent::BusFault(BusError::Timeout))
    );
}

#[test]
fn idle_frame_is_reported_without_request() {
    let mut rig = Rig::new();
    let before = rig.indicator_changes().len();

    rig.interrupt(0x40, IDLE_PORT1);

    assert_eq!(rig.indicator_changes().len(), before);
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::InputDecoded {
            event: LogicalInputEvent::None,
            ..
        }
    )));
}

// ── Shared indicator ──────────────────────────────────────────

#[test]
fn never_two_channels_lit() {
    let mut rig = Rig::new();
    rig.interrupt(0xC0, IDLE_PORT1);
    rig.tick_at(0, 12, 0);
    rig.interrupt(0x80, IDLE_PORT1);
    rig.interrupt(0x00, !0x04);
    rig.tick_at(0, 18, 0);

    let writes = rig.indicator.with_outputs(|leds| leds.writes.clone());
    let mut levels = [false; 3];
    for w in writes {
        let i = LedChannel::ALL.iter().position(|c| *c == w.channel).unwrap();
        levels[i] = w.on;
        assert!(levels.iter().filter(|l| **l).count() <= 1);
    }
}

#[test]
fn last_request_wins_across_paths() {
    let mut rig = Rig::new();
    rig.tick_at(0, 18, 0);
    rig.interrupt(0xC0, IDLE_PORT1);
    assert_eq!(rig.indicator.state(), IndicatorState::Blue);

    rig.tick_at(0, 18, 0);
    // Already fired today; rotary choice stands.
    assert_eq!(rig.indicator.state(), IndicatorState::Blue);
}

// ── Expander bring-up ─────────────────────────────────────────

#[test]
fn expander_init_writes_configuration() {
    let mut bus = MockBus::new();
    let mut delay = MockDelay::default();
    let policy = RetryPolicy {
        attempts: 10,
        backoff_ms: 1,
    };

    init_expander(&mut bus, &mut delay, DEFAULT_EXPANDER_ADDR, policy).unwrap();

    let expected: Vec<(u8, Vec<u8>)> = INIT_SEQUENCE
        .iter()
        .map(|b| (DEFAULT_EXPANDER_ADDR, b.to_vec()))
        .collect();
    assert_eq!(bus.writes, expected);
    assert_eq!(delay.total_ms, 0);
}
