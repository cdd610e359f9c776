use approx::assert_abs_diff_eq;
use pathtab::{
    EdgeType, FactorGenerator, GeneratorRegistry, MixedRadix, PathwayError,
    RepressorDominatesVote, VARIABLE_DIMENSION,
};

const EPS: f64 = 0.1;

fn edge_types(types: &[&str]) -> Vec<EdgeType> {
    types.iter().map(|t| t.to_string()).collect()
}

/// Expected child state for the parent state combination `combination`.
fn expected_state(values: &[f64], combination: usize) -> usize {
    let block = &values[combination * VARIABLE_DIMENSION..(combination + 1) * VARIABLE_DIMENSION];
    block
        .iter()
        .position(|v| (*v - (1.0 - EPS)).abs() < 1e-12)
        .unwrap()
}

#[test]
fn mixed_radix_last_digit_fastest() {
    let all: Vec<Vec<usize>> = MixedRadix::new(vec![2, 3]).collect();
    assert_eq!(
        all,
        vec![
            vec![0, 0],
            vec![0, 1],
            vec![0, 2],
            vec![1, 0],
            vec![1, 1],
            vec![1, 2],
        ]
    );
    assert_eq!(MixedRadix::new(vec![2, 3]).combinations(), Some(6));
    let empty: Vec<Vec<usize>> = MixedRadix::new(vec![]).collect();
    assert_eq!(empty, vec![Vec::<usize>::new()]);
    assert_eq!(MixedRadix::new(vec![3, 0]).count(), 0);
}

#[test]
fn single_positive_parent_follows() {
    let gen = RepressorDominatesVote::new(EPS).unwrap();
    let values = gen.generate_values(&edge_types(&["positive"]));
    assert_eq!(values.len(), 9);
    for parent_state in 0..3 {
        assert_eq!(expected_state(&values, parent_state), parent_state);
    }
    assert_abs_diff_eq!(values[0], 0.9, epsilon = 1e-12);
    assert_abs_diff_eq!(values[1], 0.05, epsilon = 1e-12);
}

#[test]
fn single_negative_parent_inverts() {
    let gen = RepressorDominatesVote::new(EPS).unwrap();
    let values = gen.generate_values(&edge_types(&["negative"]));
    assert_eq!(expected_state(&values, 0), 2);
    assert_eq!(expected_state(&values, 1), 1);
    assert_eq!(expected_state(&values, 2), 0);
}

#[test]
fn repression_wins_ties() {
    let gen = RepressorDominatesVote::new(EPS).unwrap();
    let values = gen.generate_values(&edge_types(&["positive", "negative"]));
    assert_eq!(values.len(), 27);
    // Both parents up: one up vote, one down vote.
    assert_eq!(expected_state(&values, 2 * 3 + 2), 0);
    // Both parents down: the negative edge reads down as an up vote.
    assert_eq!(expected_state(&values, 0), 0);
    // First parent up, second neutral.
    assert_eq!(expected_state(&values, 2 * 3 + 1), 2);
    // First parent neutral, second down: one up vote.
    assert_eq!(expected_state(&values, 3), 2);
    // Second parent up alone: one down vote.
    assert_eq!(expected_state(&values, 1 * 3 + 2), 0);
    // No votes.
    assert_eq!(expected_state(&values, 1 * 3 + 1), 1);
}

#[test]
fn majority_of_activators() {
    let gen = RepressorDominatesVote::new(EPS).unwrap();
    let values = gen.generate_values(&edge_types(&["positive", "positive", "negative"]));
    assert_eq!(values.len(), 81);
    // up, up, up: two up votes against one down vote.
    assert_eq!(expected_state(&values, 26), 2);
    // up, neutral, up: one up vote, one down vote.
    assert_eq!(expected_state(&values, 2 * 9 + 1 * 3 + 2), 0);
}

#[test]
fn observation_edges_vote_positively() {
    let gen = RepressorDominatesVote::new(EPS).unwrap();
    assert_eq!(
        gen.generate_values(&edge_types(&["-obs>"])),
        gen.generate_values(&edge_types(&["positive"]))
    );
}

#[test]
fn tables_are_deterministic_and_normalized() {
    let gen = RepressorDominatesVote::new(0.001).unwrap();
    let types = edge_types(&["negative", "positive", "negative", "positive"]);
    let values = gen.generate_values(&types);
    assert_eq!(values, gen.generate_values(&types));
    assert_eq!(values.len(), 3usize.pow(5));
    for block in values.chunks(VARIABLE_DIMENSION) {
        assert_abs_diff_eq!(block.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        assert_eq!(block.iter().filter(|v| **v == 1.0 - 0.001).count(), 1);
        assert_eq!(block.iter().filter(|v| **v == 0.001 / 2.0).count(), 2);
    }
}

struct Uniform;

impl FactorGenerator for Uniform {
    fn generate_values(&self, edge_types: &[EdgeType]) -> Vec<f64> {
        let n = VARIABLE_DIMENSION.pow(edge_types.len() as u32 + 1);
        vec![1.0 / VARIABLE_DIMENSION as f64; n]
    }
}

#[test]
fn registry_lookup_is_exact() {
    let default = RepressorDominatesVote::new(EPS).unwrap();
    let mut registry = GeneratorRegistry::new(Box::new(default));
    registry.register("protein", "mRNA", Box::new(Uniform));
    let types = edge_types(&["positive"]);
    let uniform = vec![1.0 / 3.0; 9];
    assert_eq!(registry.lookup("protein", "mRNA").generate_values(&types), uniform);
    assert_ne!(registry.lookup("protein", "active").generate_values(&types), uniform);
    assert_ne!(registry.lookup("other", "mRNA").generate_values(&types), uniform);
}

#[test]
fn epsilon_outside_unit_interval_is_rejected() {
    for epsilon in [0.0, 1.0, 1.5, -0.1, f64::NAN] {
        let err = RepressorDominatesVote::new(epsilon).unwrap_err();
        assert!(matches!(err, PathwayError::InvalidEpsilon(_)));
    }
    assert_eq!(RepressorDominatesVote::new(0.25).unwrap().epsilon(), 0.25);
}
