use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use vrt_core::{Condition, Phase, PhaseLog};
use vrt_experiment::{ExperimentConfig, ExperimentStateMachine, TrialDeck};
use vrt_timing::ManualTimer;

#[derive(Debug, Clone)]
enum Step {
    Advance(u64),
    Update,
    Respond,
    Control,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u64..6_000).prop_map(Step::Advance),
        Just(Step::Update),
        Just(Step::Respond),
        Just(Step::Control),
    ]
}

proptest! {
    #[test]
    fn deck_is_always_five_and_five(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let deck = TrialDeck::create(&ExperimentConfig::default().condition_counts, &mut rng);
        prop_assert_eq!(deck.len(), 10);
        prop_assert_eq!(deck.count(Condition::Left), 5);
        prop_assert_eq!(deck.count(Condition::Right), 5);
    }

    #[test]
    fn controller_invariants_hold_for_any_input_schedule(
        seed in any::<u64>(),
        steps in prop::collection::vec(step(), 0..200),
    ) {
        let timer = ManualTimer::new();
        let mut exp = ExperimentStateMachine::new(
            ExperimentConfig::default(),
            timer.clone(),
            StdRng::seed_from_u64(seed),
            PhaseLog::new(),
        )
        .unwrap();

        for step in steps {
            let before = exp.samples().len();
            let phase_before = exp.phase();
            match step {
                Step::Advance(ms) => timer.advance(ms),
                Step::Update => {
                    exp.update().unwrap();
                }
                Step::Respond => {
                    let captured = exp.respond();
                    prop_assert_eq!(captured.is_some(), phase_before == Phase::StimulusActive);
                    if captured.is_some() {
                        prop_assert_ne!(exp.phase(), Phase::StimulusActive);
                    }
                }
                Step::Control => {
                    exp.activate_control().unwrap();
                }
            }

            let samples = exp.samples();
            prop_assert!(samples.len() <= 10);
            prop_assert!(samples.len() == before || samples.len() == before + 1);
            for (i, s) in samples.iter().enumerate() {
                prop_assert_eq!(s.trial_index, i + 1);
            }
            let showing = exp.phase() == Phase::StimulusActive;
            prop_assert_eq!(exp.current_condition().is_some(), showing);
            prop_assert_eq!(exp.pending_deadline().is_some(), exp.phase() == Phase::AwaitingDelay);
            prop_assert_eq!(exp.remaining_trials() + samples.len()
                + usize::from(exp.phase() == Phase::StimulusActive), 10);
            prop_assert_eq!(exp.phase() == Phase::Ended, samples.len() == 10);
            prop_assert_ne!(exp.phase(), Phase::Aborted);
        }
    }
}
