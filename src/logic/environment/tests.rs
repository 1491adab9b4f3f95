use super::*;
use crate::error::{PipelineError, Stage};
use crate::logic::store::{LabeledRecord, RecordId, RecordStore, SqliteStore};
use crate::logic::testing::new_flow;
use crate::logic::threat::ThreatLabel;

fn labeled(labels: &[ThreatLabel]) -> Vec<LabeledRecord> {
    labels
        .iter()
        .enumerate()
        .map(|(i, &label)| LabeledRecord { id: RecordId(i as i64 + 1), label })
        .collect()
}

fn env_of(labels: &[ThreatLabel]) -> DecisionEnvironment {
    DecisionEnvironment::from_labels(labeled(labels)).unwrap()
}

/// Step through with the given actions, collecting (reward, done) pairs
fn replay(env: &DecisionEnvironment, actions: &[Action]) -> Vec<(i32, bool)> {
    let (mut run, _) = env.reset();
    let mut out = Vec::new();
    for &action in actions {
        let step = run.step(action);
        out.push((step.reward().value(), step.is_done()));
        match step {
            Step::Running { run: next, .. } => run = next,
            Step::Done { .. } => break,
        }
    }
    out
}

#[test]
fn test_observation_one_hot() {
    assert_eq!(Observation::from_label(ThreatLabel::Safe).0, [1.0, 0.0, 0.0]);
    assert_eq!(Observation::from_label(ThreatLabel::Suspicious).0, [0.0, 1.0, 0.0]);
    assert_eq!(Observation::from_label(ThreatLabel::Threat).0, [0.0, 0.0, 1.0]);
    assert_eq!(Observation::from_label(ThreatLabel::Threat).label(), Some(ThreatLabel::Threat));
    assert_eq!(Observation::zero().label(), None);
}

#[test]
fn test_empty_episode_rejected() {
    assert!(matches!(
        DecisionEnvironment::from_labels(Vec::new()),
        Err(PipelineError::EmptyEpisode)
    ));
}

#[test]
fn test_empty_store_rejected() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.insert(&new_flow("10.0.0.1", 22)).unwrap();

    let err = DecisionEnvironment::from_store(&store).err().unwrap();
    assert!(matches!(err, PipelineError::EmptyEpisode));
    assert_eq!(err.stage(), Stage::Environment);
}

#[test]
fn test_episode_built_in_id_order() {
    let store = SqliteStore::open_in_memory().unwrap();
    let a = store.insert(&new_flow("10.0.0.1", 22)).unwrap();
    let b = store.insert(&new_flow("10.0.0.2", 22)).unwrap();
    let c = store.insert(&new_flow("10.0.0.3", 22)).unwrap();
    // Persist out of order; episode must still follow id order
    store.persist(&[(c, ThreatLabel::Threat), (a, ThreatLabel::Safe)]).unwrap();
    store.persist(&[(b, ThreatLabel::Suspicious)]).unwrap();

    let env = DecisionEnvironment::from_store(&store).unwrap();
    let ids: Vec<_> = env.episode().steps().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![a, b, c]);
    assert_eq!(env.len(), store.fetch_labeled().unwrap().len());
}

#[test]
fn test_episode_is_a_snapshot() {
    let store = SqliteStore::open_in_memory().unwrap();
    let a = store.insert(&new_flow("10.0.0.1", 22)).unwrap();
    let b = store.insert(&new_flow("10.0.0.2", 22)).unwrap();
    store.persist(&[(a, ThreatLabel::Safe)]).unwrap();

    let env = DecisionEnvironment::from_store(&store).unwrap();
    store.persist(&[(b, ThreatLabel::Threat)]).unwrap();

    assert_eq!(env.len(), 1);
    assert_eq!(DecisionEnvironment::from_store(&store).unwrap().len(), 2);
}

#[test]
fn test_reset_returns_first_observation_in_ready_state() {
    let env = env_of(&[ThreatLabel::Threat, ThreatLabel::Safe]);
    let (run, obs) = env.reset();
    assert_eq!(run.state(), EnvState::Ready);
    assert_eq!(run.cursor(), 0);
    assert_eq!(obs, Observation::from_label(ThreatLabel::Threat));
}

#[test]
fn test_state_transitions() {
    let env = env_of(&[ThreatLabel::Safe, ThreatLabel::Suspicious, ThreatLabel::Threat]);
    let (run, _) = env.reset();

    let run = match run.step(Action::Ignore) {
        Step::Running { run, observation, reward } => {
            assert_eq!(run.state(), EnvState::Running);
            assert_eq!(run.cursor(), 1);
            assert_eq!(observation, Observation::from_label(ThreatLabel::Suspicious));
            assert_eq!(reward, Reward::Match);
            run
        }
        Step::Done { .. } => panic!("finished too early"),
    };

    let run = match run.step(Action::Ignore) {
        Step::Running { run, reward, .. } => {
            assert_eq!(reward, Reward::Miss);
            run
        }
        Step::Done { .. } => panic!("finished too early"),
    };

    match run.step(Action::Quarantine) {
        Step::Done { run, reward } => {
            assert_eq!(run.state(), EnvState::Done);
            assert_eq!(run.cursor(), 3);
            assert_eq!(reward, Reward::Match);
        }
        Step::Running { .. } => panic!("expected done"),
    }
}

#[test]
fn test_done_observation_is_zero_sentinel() {
    let env = env_of(&[ThreatLabel::Threat]);
    let (run, _) = env.reset();
    let step = run.step(Action::Alert);
    assert!(step.is_done());
    assert!(step.observation().is_zero());
}

#[test]
fn test_reward_law_exact_match_only() {
    for truth in ThreatLabel::ALL {
        let env = env_of(&[truth]);
        for action in Action::ALL {
            let (run, _) = env.reset();
            let reward = run.step(action).reward();
            let expected = if action.index() == truth.index() { 1 } else { -1 };
            assert_eq!(reward.value(), expected, "{:?} on {:?}", action, truth);
        }
    }
}

#[test]
fn test_terminates_after_exactly_len_steps() {
    let labels = [
        ThreatLabel::Safe,
        ThreatLabel::Threat,
        ThreatLabel::Suspicious,
        ThreatLabel::Safe,
        ThreatLabel::Threat,
    ];
    let env = env_of(&labels);
    let trace = replay(&env, &[Action::Alert; 10]);

    assert_eq!(trace.len(), labels.len());
    assert!(trace[..labels.len() - 1].iter().all(|(_, done)| !done));
    assert!(trace[labels.len() - 1].1);
}

#[test]
fn test_replay_determinism_across_instances() {
    let store = SqliteStore::open_in_memory().unwrap();
    let labels = [ThreatLabel::Threat, ThreatLabel::Safe, ThreatLabel::Suspicious, ThreatLabel::Threat];
    let mut pairs = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        let id = store.insert(&new_flow(&format!("10.0.0.{}", i + 1), 22)).unwrap();
        pairs.push((id, *label));
    }
    store.persist(&pairs).unwrap();

    let actions = [Action::Quarantine, Action::Alert, Action::Alert, Action::Ignore];
    let first = DecisionEnvironment::from_store(&store).unwrap();
    let second = DecisionEnvironment::from_store(&store).unwrap();

    assert_eq!(replay(&first, &actions), replay(&second, &actions));
    assert_eq!(replay(&first, &actions), replay(&first, &actions));
}

#[test]
fn test_same_state_same_action_same_result() {
    let env = env_of(&[ThreatLabel::Suspicious, ThreatLabel::Threat]);
    let (run, _) = env.reset();

    // ActiveRun is Copy: stepping a copy leaves the first handle untouched
    let a = run.step(Action::Alert);
    let b = run.step(Action::Alert);
    assert_eq!(a.reward(), b.reward());
    assert_eq!(a.observation(), b.observation());
    assert_eq!(a.is_done(), b.is_done());
}

#[test]
fn test_reset_from_any_state() {
    let env = env_of(&[ThreatLabel::Safe, ThreatLabel::Threat]);
    let (run, first) = env.reset();

    // From RUNNING
    let running = match run.step(Action::Ignore) {
        Step::Running { run, .. } => run,
        Step::Done { .. } => panic!("finished too early"),
    };
    let (again, obs) = running.reset();
    assert_eq!(again.state(), EnvState::Ready);
    assert_eq!(obs, first);

    // From DONE
    let finished = match running.step(Action::Quarantine) {
        Step::Done { run, .. } => run,
        Step::Running { .. } => panic!("expected done"),
    };
    let (again, obs) = finished.reset();
    assert_eq!(again.cursor(), 0);
    assert_eq!(obs, first);
}

#[test]
fn test_argmax_first_wins_on_ties() {
    assert_eq!(argmax(&[0.2, 0.9, 0.9]), Some(1));
    assert_eq!(argmax(&[0.0, 0.0, 0.0]), Some(0));
    assert_eq!(argmax(&[]), None);
}
