//! Unit tests for ts-signal.

use ts_core::{Approach, ArbitrationPolicy, IntersectionRng, Tick};

use crate::{ControllerParams, IntersectionController};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn controller_with(params: ControllerParams) -> IntersectionController {
    IntersectionController::new("A".into(), params, IntersectionRng::new(42, 0))
}

fn controller() -> IntersectionController {
    controller_with(ControllerParams::default())
}

/// Params with arrivals switched off so queues only change when a test says so.
fn quiet_params() -> ControllerParams {
    ControllerParams { arrival_probability: 0.0, ..ControllerParams::default() }
}

// ── Pure phase logic ──────────────────────────────────────────────────────────

#[cfg(test)]
mod phase_logic {
    use ts_core::Direction;

    use super::*;
    use crate::{Demand, LightColor, Phase, PhaseTiming, arbitrate, next_transition};

    const BOTH: Demand = Demand { ns: true, ew: true };
    const NS: Demand = Demand { ns: true, ew: false };
    const EW: Demand = Demand { ns: false, ew: true };
    const NONE: Demand = Demand { ns: false, ew: false };

    #[test]
    fn light_states_never_conflict() {
        for p in [Phase::NsGreen, Phase::NsYellow, Phase::EwGreen, Phase::EwYellow, Phase::AllRed] {
            assert!(p.light_state().is_conflict_free(), "{p}");
        }
        assert_eq!(Phase::NsYellow.light_state().ns, LightColor::Yellow);
        assert_eq!(Phase::EwGreen.light_state().ns, LightColor::Red);
    }

    #[test]
    fn single_direction_demand_wins_under_every_policy() {
        for policy in [ArbitrationPolicy::Alternate, ArbitrationPolicy::PreferLast] {
            for last in [None, Some(Direction::NorthSouth), Some(Direction::EastWest)] {
                assert_eq!(arbitrate(NS, last, policy), Some(Direction::NorthSouth));
                assert_eq!(arbitrate(EW, last, policy), Some(Direction::EastWest));
                assert_eq!(arbitrate(NONE, last, policy), None);
            }
        }
    }

    #[test]
    fn alternate_serves_opposite_of_last() {
        let p = ArbitrationPolicy::Alternate;
        assert_eq!(arbitrate(BOTH, None, p), Some(Direction::NorthSouth));
        assert_eq!(arbitrate(BOTH, Some(Direction::NorthSouth), p), Some(Direction::EastWest));
        assert_eq!(arbitrate(BOTH, Some(Direction::EastWest), p), Some(Direction::NorthSouth));
    }

    #[test]
    fn prefer_last_keeps_ew_and_defaults_to_ns() {
        let p = ArbitrationPolicy::PreferLast;
        assert_eq!(arbitrate(BOTH, Some(Direction::EastWest), p), Some(Direction::EastWest));
        assert_eq!(arbitrate(BOTH, Some(Direction::NorthSouth), p), Some(Direction::NorthSouth));
        assert_eq!(arbitrate(BOTH, None, p), Some(Direction::NorthSouth));
    }

    #[test]
    fn idle_hold_saturates() {
        let timing = PhaseTiming { all_red_secs: u64::MAX / 2 + 1, ..PhaseTiming::default() };
        assert_eq!(timing.idle_secs(), u64::MAX);
        assert_eq!(PhaseTiming::default().idle_secs(), 2);
    }

    #[test]
    fn unconditional_edges_and_durations() {
        let timing = PhaseTiming::default();
        let p = ArbitrationPolicy::Alternate;

        let t = next_transition(Phase::NsGreen, BOTH, None, p, timing);
        assert_eq!((t.phase, t.hold_secs), (Phase::NsYellow, 2));

        let t = next_transition(Phase::EwYellow, BOTH, None, p, timing);
        assert_eq!((t.phase, t.hold_secs), (Phase::AllRed, 1));

        let t = next_transition(Phase::AllRed, EW, None, p, timing);
        assert_eq!((t.phase, t.hold_secs), (Phase::EwGreen, 8));

        // Idle all-red holds for a doubled pause.
        let t = next_transition(Phase::AllRed, NONE, None, p, timing);
        assert_eq!((t.phase, t.hold_secs), (Phase::AllRed, 2));
    }
}

// ── Queues and congestion ─────────────────────────────────────────────────────

#[cfg(test)]
mod queues {
    use super::*;

    #[test]
    fn arrivals_without_discharge_stay_bounded() {
        // 30 ticks at p = 0.25 and no green: ~7.5 per approach on average.
        let mut c = controller();
        for _ in 0..30 {
            c.generate_arrivals();
        }
        let total: u32 = c.vehicle_counts().values().sum();
        for (a, &q) in c.vehicle_counts().iter() {
            assert!(q <= 30, "{a}: {q}");
            assert!(q < 25, "{a}: {q}");
        }
        assert!((10..=60).contains(&total), "total {total}");
        assert!(!c.is_congested());
    }

    #[test]
    fn queues_cap_at_max() {
        let mut c = controller_with(ControllerParams {
            arrival_probability: 1.0,
            ..ControllerParams::default()
        });
        for _ in 0..200 {
            c.generate_arrivals();
        }
        for (_, &q) in c.vehicle_counts().iter() {
            assert_eq!(q, 50);
        }
        assert_eq!(c.generate_arrivals(), 0);
    }

    #[test]
    fn set_queue_clamps() {
        let mut c = controller();
        c.set_queue(Approach::W, 500);
        assert_eq!(c.queue(Approach::W), 50);
    }

    #[test]
    fn congestion_is_threshold_on_unblocked_queues() {
        let mut c = controller_with(quiet_params());
        c.set_queue(Approach::N, 24);
        assert!(!c.is_congested());
        c.set_queue(Approach::N, 25);
        assert!(c.is_congested());

        // Blocking removes the approach from the check immediately.
        c.set_blocked(Approach::N, true, Tick(0));
        assert!(!c.is_congested());
        c.set_blocked(Approach::N, false, Tick(0));
        assert!(c.is_congested());
    }

    #[test]
    fn blocked_queue_is_frozen_then_resumes() {
        let mut c = controller_with(ControllerParams {
            arrival_probability: 1.0,
            ..ControllerParams::default()
        });
        c.set_queue(Approach::N, 10);
        c.set_blocked(Approach::N, true, Tick(0));
        for _ in 0..20 {
            c.generate_arrivals();
        }
        assert_eq!(c.queue(Approach::N), 10);
        assert_eq!(c.queue(Approach::S), 20);

        c.set_blocked(Approach::N, false, Tick(0));
        c.generate_arrivals();
        assert_eq!(c.queue(Approach::N), 11);
    }
}

// ── Phase timers ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod timers {
    use ts_core::Direction;

    use super::*;
    use crate::{IntersectionStatus, Phase, PhaseTiming};

    #[test]
    fn fresh_controller_is_all_red_and_unarmed() {
        let c = controller();
        assert_eq!(c.phase(), Phase::AllRed);
        assert!(!c.is_armed());
        assert_eq!(c.status(), IntersectionStatus::Normal);
    }

    #[test]
    fn ns_only_demand_enters_ns_green_and_discharges_once() {
        let mut c = controller_with(quiet_params());
        c.set_queue(Approach::N, 30);

        let timer = c.begin(Tick(0));
        assert_eq!(c.phase(), Phase::NsGreen);
        assert_eq!(c.queue(Approach::N), 27);
        assert_eq!(timer.due, Tick(8));
        assert_eq!(c.last_served(), Some(Direction::NorthSouth));
    }

    #[test]
    fn idle_intersection_holds_all_red_for_double_pause() {
        let mut c = controller_with(quiet_params());
        let timer = c.begin(Tick(5));
        assert_eq!(c.phase(), Phase::AllRed);
        assert_eq!(timer.due, Tick(7));
    }

    #[test]
    fn alternate_policy_cycles_both_directions() {
        let mut c = controller_with(ControllerParams {
            arbitration: ArbitrationPolicy::Alternate,
            ..quiet_params()
        });
        c.set_queue(Approach::N, 20);
        c.set_queue(Approach::E, 20);

        let t = c.begin(Tick(0));
        assert_eq!(c.phase(), Phase::NsGreen);
        let t = c.fire(&t, t.due).unwrap();
        assert_eq!((c.phase(), t.due), (Phase::NsYellow, Tick(10)));
        let t = c.fire(&t, t.due).unwrap();
        assert_eq!((c.phase(), t.due), (Phase::AllRed, Tick(11)));
        let t = c.fire(&t, t.due).unwrap();
        assert_eq!((c.phase(), t.due), (Phase::EwGreen, Tick(19)));
        assert_eq!(c.queue(Approach::E), 17);
        let t = c.fire(&t, t.due).unwrap();
        assert_eq!(c.phase(), Phase::EwYellow);
        let t = c.fire(&t, t.due).unwrap();
        assert_eq!(c.phase(), Phase::AllRed);
        c.fire(&t, t.due).unwrap();
        assert_eq!(c.phase(), Phase::NsGreen);
        assert_eq!(c.queue(Approach::N), 14);
    }

    #[test]
    fn ew_keeps_green_by_default_when_both_have_demand() {
        let mut c = controller_with(quiet_params());
        c.set_queue(Approach::E, 20);
        let t = c.begin(Tick(0));
        assert_eq!(c.phase(), Phase::EwGreen);
        c.set_queue(Approach::N, 20);
        let t = c.fire(&t, t.due).unwrap();
        let t = c.fire(&t, t.due).unwrap();
        assert_eq!(c.phase(), Phase::AllRed);
        c.fire(&t, t.due).unwrap();
        assert_eq!(c.phase(), Phase::EwGreen);
        assert_eq!(c.queue(Approach::E), 14);
    }

    #[test]
    fn ns_goes_first_by_default_after_ns_cycle() {
        let mut c = controller_with(quiet_params());
        c.set_queue(Approach::N, 20);
        c.set_queue(Approach::E, 20);
        let t = c.begin(Tick(0));
        assert_eq!(c.phase(), Phase::NsGreen);
        let t = c.fire(&t, t.due).unwrap();
        let t = c.fire(&t, t.due).unwrap();
        c.fire(&t, t.due).unwrap();
        assert_eq!(c.phase(), Phase::NsGreen);
        assert_eq!(c.queue(Approach::N), 14);
        assert_eq!(c.queue(Approach::E), 20);
    }

    #[test]
    fn huge_durations_saturate_instead_of_overflowing() {
        let mut c = controller_with(ControllerParams {
            timing: PhaseTiming {
                green_secs:   u64::MAX,
                yellow_secs:  u64::MAX,
                all_red_secs: u64::MAX / 2 + 1,
            },
            ..quiet_params()
        });
        let idle = c.begin(Tick(5));
        assert_eq!((c.phase(), idle.due), (Phase::AllRed, Tick(u64::MAX)));

        c.set_queue(Approach::S, 4);
        let green = c.begin(Tick(6));
        assert_eq!((c.phase(), green.due), (Phase::NsGreen, Tick(u64::MAX)));
    }

    #[test]
    fn stale_timer_is_ignored_after_cancel_and_reset() {
        let mut c = controller_with(quiet_params());
        c.set_queue(Approach::N, 30);
        let old = c.begin(Tick(0));
        c.cancel_timer();
        assert!(c.fire(&old, old.due).is_none());
        assert_eq!(c.phase(), Phase::NsGreen);

        let old = c.begin(Tick(8));
        c.reset();
        assert!(c.fire(&old, old.due).is_none());
        assert_eq!(c.phase(), Phase::AllRed);
        assert_eq!(c.queue(Approach::N), 0);
        assert!(!c.is_armed());
    }

    #[test]
    fn blocking_during_green_keeps_green_when_partner_has_demand() {
        let mut c = controller_with(quiet_params());
        c.set_queue(Approach::N, 30);
        c.set_queue(Approach::S, 10);
        let old = c.begin(Tick(0));
        assert_eq!(c.phase(), Phase::NsGreen);

        let new = c.set_blocked(Approach::N, true, Tick(3)).unwrap();
        assert_eq!(c.phase(), Phase::NsGreen);
        assert_eq!(new.due, Tick(11));
        // Holding a green is not a new green entry: no second discharge.
        assert_eq!(c.queue(Approach::S), 7);
        assert_eq!(c.status(), IntersectionStatus::Incident);
        assert!(c.fire(&old, old.due).is_none());
    }

    #[test]
    fn blocking_last_ns_demand_leaves_green_immediately() {
        let mut c = controller_with(quiet_params());
        c.set_queue(Approach::N, 30);
        c.set_queue(Approach::E, 5);
        c.begin(Tick(0));

        let t = c.set_blocked(Approach::N, true, Tick(2)).unwrap();
        assert_eq!(c.phase(), Phase::NsYellow);
        assert_eq!(t.due, Tick(4));
        let t = c.fire(&t, t.due).unwrap();
        let _ = c.fire(&t, t.due).unwrap();
        assert_eq!(c.phase(), Phase::EwGreen);
        assert_eq!(c.queue(Approach::N), 27);
    }

    #[test]
    fn blocking_while_unarmed_only_sets_flags() {
        let mut c = controller_with(quiet_params());
        c.set_queue(Approach::N, 30);
        assert!(c.set_blocked(Approach::N, true, Tick(0)).is_none());
        assert!(c.is_blocked(Approach::N));
        assert_eq!(c.phase(), Phase::AllRed);
        // Same value again is a no-op even when armed.
        c.begin(Tick(0));
        assert!(c.set_blocked(Approach::N, true, Tick(1)).is_none());
    }

    #[test]
    fn long_run_preserves_invariants() {
        let mut c = controller_with(ControllerParams {
            arrival_probability: 0.6,
            ..ControllerParams::default()
        });
        let mut timer = c.begin(Tick(0));
        for now in 1..2_000u64 {
            let now = Tick(now);
            c.generate_arrivals();
            if now.0 % 97 == 0 {
                let a = Approach::ALL[(now.0 / 97) as usize % 4];
                let blocked = !c.is_blocked(a);
                if let Some(t) = c.set_blocked(a, blocked, now) {
                    timer = t;
                }
            }
            if timer.due <= now {
                timer = c.fire(&timer, now).unwrap();
            }
            assert!(c.light_state().is_conflict_free());
            assert!(c.vehicle_counts().values().all(|&q| q <= 50));
            assert!(timer.due > now);
        }
    }
}
