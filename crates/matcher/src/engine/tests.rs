use super::*;

use normalize::UnitAliases;
use retrieval::RetrievalError;
use rules::RuleSetConfig;

/// Fixed-score retriever: hands back preconfigured hits per query,
/// truncated to `top_k`, so decision boundaries can be pinned exactly.
struct FixedRetriever {
    hits: Vec<Vec<RawHit>>,
}

impl FixedRetriever {
    fn new(hits: Vec<Vec<RawHit>>) -> Self {
        Self { hits }
    }

    fn single(scores: &[(f32, usize)]) -> Self {
        Self::new(vec![scores
            .iter()
            .map(|&(score, base_index)| RawHit { score, base_index })
            .collect()])
    }
}

impl Retriever for FixedRetriever {
    fn retrieve(
        &self,
        _queries: &[String],
        top_k: usize,
    ) -> Result<Vec<Vec<RawHit>>, RetrievalError> {
        Ok(self
            .hits
            .iter()
            .map(|row| row.iter().copied().take(top_k).collect())
            .collect())
    }
}

fn default_rules() -> RuleSet {
    RuleSet::compile(&RuleSetConfig::default()).expect("builtin rules compile")
}

fn project_item(description: &str, unit: &str, quantity: f32) -> ProjectItem {
    ProjectItem::new(description, unit, Some(quantity), &UnitAliases::default())
}

fn base_item(description: &str, unit: &str, price: Option<f32>) -> BaseItem {
    BaseItem::new(description, unit, price, &UnitAliases::default())
}

#[test]
fn high_score_compatible_unit_is_auto() {
    let project = vec![project_item("solado de gres", "m2", 1.0)];
    let base = vec![base_item("solado de gres porcelanico", "m2", Some(24.0))];
    let retriever = FixedRetriever::single(&[(0.90, 0)]);

    let report = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect("match");

    assert_eq!(report.outcomes[0].decision, Decision::Auto);
    assert!(report.outcomes[0].unit_compatible);
    assert!(report.shortlist.is_empty());
}

#[test]
fn incompatible_unit_blocks_auto_even_at_high_score() {
    // Pin the final score at 0.80 by feeding a raw score whose
    // penalized value is 0.80.
    let project = vec![project_item("barandilla metalica", "ml", 1.0)];
    let base = vec![base_item("barandilla de acero", "ud", Some(80.0))];
    // No keyword boost fires for these descriptions.
    let raw = 0.80 / 0.75;
    let retriever = FixedRetriever::single(&[(raw, 0)]);

    let report = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect("match");

    let outcome = &report.outcomes[0];
    assert!((outcome.score - 0.80).abs() < 1e-5);
    assert!(!outcome.unit_compatible);
    // 0.80 >= the 0.75 review floor but unit incompatibility blocks auto.
    assert_eq!(outcome.decision, Decision::Revision);
}

#[test]
fn low_score_is_sin_match() {
    let project = vec![project_item("partida rara", "ud", 1.0)];
    let base = vec![base_item("otra cosa distinta", "ud", Some(5.0))];
    let retriever = FixedRetriever::single(&[(0.60, 0)]);

    let report = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect("match");

    assert_eq!(report.outcomes[0].decision, Decision::SinMatch);
    assert!(report.shortlist.is_empty());
}

#[test]
fn exclusion_forces_sin_match_and_skips_shortlist() {
    let project = vec![project_item("partida sin match pendiente", "m2", 1.0)];
    let base = vec![base_item("solado de gres", "m2", Some(24.0))];
    let retriever = FixedRetriever::single(&[(0.95, 0)]);

    let report = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect("match");

    assert_eq!(report.outcomes[0].decision, Decision::SinMatch);
    assert!(report.shortlist.is_empty());
    // The outcome still carries the best candidate and its amount.
    assert!((report.outcomes[0].unit_price - 24.0).abs() < 1e-6);
}

#[test]
fn excluded_item_in_review_range_also_skips_shortlist() {
    let project = vec![project_item("demolición sin match", "m2", 1.0)];
    let base = vec![base_item("demolicion de solera", "m2", Some(12.0))];
    // Lands in the review range before the override.
    let retriever = FixedRetriever::single(&[(0.78, 0)]);

    let report = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect("match");

    assert_eq!(report.outcomes[0].decision, Decision::SinMatch);
    assert!(report.shortlist.is_empty());
}

#[test]
fn revision_shortlist_caps_at_three_in_descending_order() {
    let project = vec![project_item("tabique de ladrillo", "m2", 1.0)];
    let base: Vec<BaseItem> = (0..5)
        .map(|i| base_item(&format!("tabique tipo {i}"), "m2", Some(10.0 + i as f32)))
        .collect();
    let retriever = FixedRetriever::single(&[
        (0.80, 0),
        (0.79, 1),
        (0.78, 2),
        (0.77, 3),
        (0.76, 4),
    ]);

    let report = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect("match");

    assert_eq!(report.outcomes[0].decision, Decision::Revision);
    assert_eq!(report.shortlist.len(), 3);
    let scores: Vec<f32> = report.shortlist.iter().map(|c| c.score).collect();
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
    assert_eq!(report.shortlist[0].base_description, "tabique tipo 0");
}

#[test]
fn candidates_rerank_by_final_score() {
    // Retrieval order puts the unit-mismatched candidate first; after
    // the penalty the compatible one must win.
    let project = vec![project_item("solado de gres", "m2", 1.0)];
    let base = vec![
        base_item("solado identico", "ud", Some(30.0)),
        base_item("solado parecido", "m2", Some(25.0)),
    ];
    let retriever = FixedRetriever::single(&[(0.95, 0), (0.90, 1)]);

    let report = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect("match");

    // 0.95 * 0.75 = 0.7125 vs 0.90 untouched.
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.base_description, "solado parecido");
    assert!((outcome.score - 0.90).abs() < 1e-6);
    assert_eq!(outcome.decision, Decision::Auto);
}

#[test]
fn ties_keep_retrieval_order() {
    let project = vec![project_item("tabique", "m2", 1.0)];
    let base = vec![
        base_item("tabique a", "m2", Some(1.0)),
        base_item("tabique b", "m2", Some(2.0)),
    ];
    let retriever = FixedRetriever::single(&[(0.80, 1), (0.80, 0)]);

    let report = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect("match");

    // Equal final scores: first retrieved wins.
    assert_eq!(report.outcomes[0].base_description, "tabique b");
}

#[test]
fn extended_amount_always_computed() {
    let project = vec![
        project_item("partida sin parecido", "ud", 3.0),
        project_item("otra partida", "ud", 2.0),
    ];
    let base = vec![
        base_item("algo distinto", "ud", Some(10.0)),
        base_item("sin precio", "ud", None),
    ];
    let retriever = FixedRetriever::new(vec![
        vec![RawHit { score: 0.40, base_index: 0 }],
        vec![RawHit { score: 0.50, base_index: 1 }],
    ]);

    let report = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect("match");

    // sin_match rows still carry the candidate's economic impact.
    assert_eq!(report.outcomes[0].decision, Decision::SinMatch);
    assert!((report.outcomes[0].extended_amount - 30.0).abs() < 1e-6);
    // Missing price coalesces to 0.0 before the multiply.
    assert_eq!(report.outcomes[1].unit_price, 0.0);
    assert_eq!(report.outcomes[1].extended_amount, 0.0);
}

#[test]
fn outcomes_preserve_input_order() {
    let project: Vec<ProjectItem> = (0..8)
        .map(|i| project_item(&format!("partida {i}"), "ud", 1.0))
        .collect();
    let base = vec![base_item("referencia", "ud", Some(1.0))];
    let retriever = FixedRetriever::new(
        (0..8)
            .map(|_| vec![RawHit { score: 0.9, base_index: 0 }])
            .collect(),
    );

    let report = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect("match");

    let rows: Vec<usize> = report.outcomes.iter().map(|o| o.row).collect();
    assert_eq!(rows, (0..8).collect::<Vec<_>>());
}

#[test]
fn empty_candidate_list_aborts_the_batch() {
    let project = vec![
        project_item("primera", "ud", 1.0),
        project_item("segunda", "ud", 1.0),
    ];
    let base = vec![base_item("referencia", "ud", Some(1.0))];
    let retriever = FixedRetriever::new(vec![
        vec![RawHit { score: 0.9, base_index: 0 }],
        vec![],
    ]);

    let err = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect_err("batch must abort");

    assert!(matches!(err, MatchError::NoCandidates { row: 1 }));
}

#[test]
fn out_of_range_base_index_is_an_error() {
    let project = vec![project_item("partida", "ud", 1.0)];
    let base = vec![base_item("referencia", "ud", Some(1.0))];
    let retriever = FixedRetriever::single(&[(0.9, 7)]);

    let err = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect_err("must fail");

    assert!(matches!(
        err,
        MatchError::BaseIndexOutOfRange { row: 0, base_index: 7 }
    ));
}

#[test]
fn query_count_mismatch_detected() {
    let project = vec![
        project_item("primera", "ud", 1.0),
        project_item("segunda", "ud", 1.0),
    ];
    let base = vec![base_item("referencia", "ud", Some(1.0))];
    // One hit list for two queries.
    let retriever = FixedRetriever::new(vec![vec![RawHit { score: 0.9, base_index: 0 }]]);

    let err = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect_err("must fail");

    assert!(matches!(
        err,
        MatchError::QueryCountMismatch { expected: 2, got: 1 }
    ));
}

#[test]
fn boost_can_recover_a_unit_mismatched_candidate() {
    // hormigon on both sides: 0.98 * 0.75 = 0.735, +0.03 = 0.765, back
    // into the review range despite the unit mismatch.
    let project = vec![project_item("losa de hormigón armado", "m2", 1.0)];
    let base = vec![base_item("losa hormigon hA-25", "m3", Some(95.0))];
    let retriever = FixedRetriever::single(&[(0.98, 0)]);

    let report = match_project_items(
        &project,
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect("match");

    let outcome = &report.outcomes[0];
    assert!((outcome.score - 0.765).abs() < 1e-5);
    assert_eq!(outcome.decision, Decision::Revision);
}

#[test]
fn custom_thresholds_change_classification() {
    let project = vec![project_item("partida", "ud", 1.0)];
    let base = vec![base_item("partida", "ud", Some(1.0))];
    let retriever = FixedRetriever::single(&[(0.70, 0)]);
    let cfg = MatchConfig {
        auto_threshold: 0.65,
        review_threshold: 0.50,
        ..Default::default()
    };

    let report =
        match_project_items(&project, &base, &retriever, &default_rules(), &cfg).expect("match");
    assert_eq!(report.outcomes[0].decision, Decision::Auto);
}

#[test]
fn empty_project_batch_yields_empty_report() {
    let base = vec![base_item("referencia", "ud", Some(1.0))];
    let retriever = FixedRetriever::new(vec![]);

    let report = match_project_items(
        &[],
        &base,
        &retriever,
        &default_rules(),
        &MatchConfig::default(),
    )
    .expect("match");

    assert!(report.outcomes.is_empty());
    assert!(report.shortlist.is_empty());
}
