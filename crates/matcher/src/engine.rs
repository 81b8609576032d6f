use rayon::prelude::*;
use retrieval::{RawHit, Retriever};
use rules::RuleSet;
use scoring::{score_candidate, units_compatible};
use tracing::{debug, info};

use crate::types::{
    BaseItem, Candidate, Decision, MatchConfig, MatchError, MatchOutcome, MatchReport, ProjectItem,
    ReviewCandidate,
};

#[cfg(test)]
mod tests;

/// Matches every project item against the price base and classifies the
/// result.
///
/// One retrieval call covers the whole batch; after that, rows are
/// independent and are scored in parallel over the read-only base table
/// and rule set. Outcomes come back in input order; the shortlist keeps
/// item-processing order. Any row with zero retrieved candidates aborts
/// the batch.
pub fn match_project_items(
    project: &[ProjectItem],
    base: &[BaseItem],
    retriever: &(impl Retriever + Sync),
    rules: &RuleSet,
    cfg: &MatchConfig,
) -> Result<MatchReport, MatchError> {
    cfg.validate()?;

    info!(
        rows = project.len(),
        base_rows = base.len(),
        top_k = cfg.top_k,
        "matching project items against price base"
    );

    let queries: Vec<String> = project
        .iter()
        .map(|item| item.description_norm.clone())
        .collect();
    let hits_per_row = retriever.retrieve(&queries, cfg.top_k)?;
    if hits_per_row.len() != project.len() {
        return Err(MatchError::QueryCountMismatch {
            expected: project.len(),
            got: hits_per_row.len(),
        });
    }

    let per_row: Vec<(MatchOutcome, Vec<ReviewCandidate>)> = project
        .par_iter()
        .zip(hits_per_row.par_iter())
        .enumerate()
        .map(|(row, (item, hits))| match_one_item(row, item, hits, base, rules, cfg))
        .collect::<Result<_, _>>()?;

    let mut outcomes = Vec::with_capacity(per_row.len());
    let mut shortlist = Vec::new();
    for (outcome, candidates) in per_row {
        outcomes.push(outcome);
        shortlist.extend(candidates);
    }

    let auto = outcomes.iter().filter(|o| o.decision == Decision::Auto).count();
    let revision = outcomes.iter().filter(|o| o.decision == Decision::Revision).count();
    info!(
        rows = outcomes.len(),
        auto,
        revision,
        sin_match = outcomes.len() - auto - revision,
        shortlist = shortlist.len(),
        "matching complete"
    );

    Ok(MatchReport { outcomes, shortlist })
}

fn match_one_item(
    row: usize,
    item: &ProjectItem,
    hits: &[RawHit],
    base: &[BaseItem],
    rules: &RuleSet,
    cfg: &MatchConfig,
) -> Result<(MatchOutcome, Vec<ReviewCandidate>), MatchError> {
    if hits.is_empty() {
        return Err(MatchError::NoCandidates { row });
    }

    let mut candidates = Vec::with_capacity(hits.len());
    for hit in hits {
        let base_item = base
            .get(hit.base_index)
            .ok_or(MatchError::BaseIndexOutOfRange {
                row,
                base_index: hit.base_index,
            })?;
        let compatible = units_compatible(&item.unit_norm, &base_item.unit_norm);
        let score = score_candidate(
            hit.score,
            compatible,
            &item.description,
            &base_item.description,
            rules,
            &cfg.scoring,
        );
        candidates.push(Candidate {
            score,
            base_index: hit.base_index,
            unit_compatible: compatible,
        });
    }

    // Stable sort: equal final scores keep retrieval order.
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let best = &candidates[0];
    let best_base = &base[best.base_index];

    let mut decision = if best.score >= cfg.auto_threshold && best.unit_compatible {
        Decision::Auto
    } else if best.score >= cfg.review_threshold {
        Decision::Revision
    } else {
        Decision::SinMatch
    };

    // Hard override: an excluded description can never match, and never
    // reaches the review shortlist either.
    let excluded = rules.has_exclusion(&item.description);
    if excluded {
        decision = Decision::SinMatch;
    }

    let unit_price = best_base.unit_price.unwrap_or(0.0);
    let outcome = MatchOutcome {
        row,
        score: best.score,
        base_description: best_base.description.clone(),
        base_unit: best_base.unit.clone(),
        unit_price,
        unit_compatible: best.unit_compatible,
        decision,
        // Priced for every row, matched or not.
        extended_amount: unit_price * item.quantity,
    };

    let shortlist = if decision == Decision::Revision {
        candidates
            .iter()
            .take(cfg.shortlist_cap)
            .map(|candidate| {
                let candidate_base = &base[candidate.base_index];
                ReviewCandidate {
                    project_row: row,
                    project_description: item.description.clone(),
                    base_description: candidate_base.description.clone(),
                    base_unit: candidate_base.unit.clone(),
                    unit_price: candidate_base.unit_price.unwrap_or(0.0),
                    score: candidate.score,
                    unit_compatible: candidate.unit_compatible,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    debug!(row, decision = %decision, score = best.score, "classified project row");

    Ok((outcome, shortlist))
}
