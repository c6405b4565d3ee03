//! State-level walks through both evaluation loops with canned oracle replies.
//!
//! Tests verify:
//! - The linear loop terminates within the iteration ceiling whatever the replies
//! - Findings grow by exactly one per non-concluding investigation
//! - Replaying the same replies produces an identical state
//! - Debates conclude on a verdict or one round past the ceiling
//! - Empty literature never breaks tool execution

use assessment::debate::{route_after_moderator, DebatePhase, DebateRole, DebateRoute, DebateState};
use assessment::linear::{
    route_after_reflection, EvaluationState, InvestigationDecision, LinearNode, LinearPolicy,
    LinearRoute, ReflectionReport, INVALID_PARAMETERS_FINDING,
};
use assessment::literature::{count_papers, prepare_for_reasoning, Paper, RawPapers};
use assessment::{EvaluationMetric, ScoreRecord};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn literature() -> String {
    prepare_for_reasoning(&RawPapers::Flat(vec![
        Paper::new("a1", "Retrieval augmented generation for code", "We retrieve snippets."),
        Paper::new("b2", "Contrastive pretraining at scale", "A contrastive objective."),
        Paper::new("a1", "Duplicate entry", "Should be dropped."),
    ]))
}

/// Drive the linear loop with cycling canned replies.
fn run_linear(
    literature: &str,
    investigations: &[&str],
    reflections: &[&str],
    policy: &LinearPolicy,
) -> EvaluationState {
    let mut state = EvaluationState::new("Use retrieval for code review", literature);
    state.record_plan("1. Check overlap\n2. Check methods");

    let mut step = 0usize;
    loop {
        let decision = InvestigationDecision::parse(investigations[step % investigations.len()]);
        state.apply_investigation(&decision);
        let report = ReflectionReport::parse(reflections[step % reflections.len()]);
        state.apply_reflection(&report, policy);
        step += 1;

        if route_after_reflection(&state, policy) == LinearRoute::Conclude {
            break;
        }
        assert!(step < 100, "linear loop failed to terminate");
    }

    state.record_scores(ScoreRecord::default());
    state
}

fn debate_round(state: &mut DebateState, moderator: &str) {
    state.enter(DebatePhase::Advocate).unwrap();
    state.record_turn(DebateRole::Advocate, "strong idea").unwrap();
    state.enter(DebatePhase::Skeptic).unwrap();
    state.record_turn(DebateRole::Skeptic, "weak idea").unwrap();
    state.enter(DebatePhase::Moderator).unwrap();
    state.record_turn(DebateRole::Moderator, moderator).unwrap();
}

// ── Linear loop ──────────────────────────────────────────────────────────────

#[test]
fn linear_loop_respects_iteration_ceiling() {
    let policy = LinearPolicy::default();
    for investigations in [
        vec!["TOOL: analyze_papers, FOCUS: retrieval"],
        vec!["TOOL: frobnicate, FOCUS: x"],
        vec!["TOOL: compare_methods"],
        vec!["TOOL: extract_details, CRITERIA: datasets", "TOOL: compare_methods, ASPECT: loss"],
    ] {
        let state = run_linear(&literature(), &investigations, &["10 10 10"], &policy);
        assert!(state.iteration <= policy.max_iterations);
        assert_eq!(state.findings.len() as u32, state.iteration);
        assert!(state.scores.is_some());
    }
}

#[test]
fn linear_loop_stops_on_high_confidence() {
    let state = run_linear(
        &literature(),
        &["TOOL: analyze_papers, FOCUS: retrieval"],
        &["80 80 80\nCONCLUDE"],
        &LinearPolicy::default(),
    );
    assert_eq!(state.iteration, 1);
    assert_eq!(state.findings.len(), 1);
    assert_eq!(
        state.transitions,
        vec![
            LinearNode::Planning,
            LinearNode::Investigation,
            LinearNode::Reflection,
            LinearNode::Scoring
        ]
    );
}

#[test]
fn linear_loop_stops_when_investigation_concludes() {
    let state = run_linear(
        &literature(),
        &["TOOL: analyze_papers, FOCUS: retrieval", "CONCLUDE"],
        &["10 10 10\nCONTINUE"],
        &LinearPolicy::default(),
    );
    assert_eq!(state.iteration, 1);
    assert!(state.investigation_concluded);
    assert_eq!(state.findings.len(), 1);
}

#[test]
fn linear_invalid_parameters_still_count() {
    let state = run_linear(&literature(), &["TOOL: analyze_papers"], &["1 2 3"], &LinearPolicy::default());
    assert_eq!(state.iteration, 4);
    assert!(state.findings.iter().all(|f| f == INVALID_PARAMETERS_FINDING));
}

#[test]
fn linear_replay_is_identical() {
    let investigations = ["TOOL: compare_methods, ASPECT: contrastive", "TOOL: nope, CRITERIA: x"];
    let reflections = ["40 40 40", "garbage"];
    let policy = LinearPolicy::default();
    let a = run_linear(&literature(), &investigations, &reflections, &policy);
    let b = run_linear(&literature(), &investigations, &reflections, &policy);
    assert_eq!(a, b);
}

#[test]
fn linear_runs_on_empty_literature() {
    let empty = prepare_for_reasoning(&RawPapers::default());
    assert!(empty.is_empty());
    let state = run_linear(
        &empty,
        &[
            "TOOL: analyze_papers, FOCUS: anything",
            "TOOL: extract_details, CRITERIA: data",
            "TOOL: compare_methods, ASPECT: loss",
        ],
        &["0 0 0"],
        &LinearPolicy::default(),
    );
    assert_eq!(state.findings.len(), 4);
    assert!(state.findings[1].contains("0 papers analyzed"));
}

#[test]
fn literature_is_deduplicated() {
    let text = literature();
    assert_eq!(count_papers(&text), 2);
    assert!(!text.contains("Duplicate entry"));
}

// ── Debate loop ──────────────────────────────────────────────────────────────

#[test]
fn debate_concludes_on_verdict() {
    let mut state = DebateState::new("idea", literature(), EvaluationMetric::Novelty, 3);
    debate_round(&mut state, "Probe: what is new?");
    assert_eq!(route_after_moderator(&state), DebateRoute::Advocate);
    debate_round(&mut state, "Both agree.\n\nVERDICT: moderately novel");
    assert_eq!(route_after_moderator(&state), DebateRoute::Conclude);
    assert_eq!(state.iteration, 2);
    assert!(state.final_message().unwrap().starts_with("Moderator: "));
}

#[test]
fn debate_ceiling_allows_one_extra_round() {
    let mut state = DebateState::new("idea", "", EvaluationMetric::Interestingness, 3);
    let mut rounds = 0;
    loop {
        debate_round(&mut state, "Keep going");
        rounds += 1;
        if route_after_moderator(&state) == DebateRoute::Conclude {
            break;
        }
    }
    assert_eq!(rounds, 4);
    assert_eq!(state.transcript.len(), 12);
    state.enter(DebatePhase::Scoring).unwrap();
    state.record_scores(ScoreRecord::default()).unwrap();
    assert!(state.is_complete());
}
