//! Lifecycle state machine.
//!
//! `advance` walks `Concept -> Feasibility -> Projection -> Production` and
//! refuses to move past the end of that path or out of a side state.
//! `set_stage` jumps anywhere, regressions and re-entry included, so corrective
//! moves and `Retreat`/`Standby`/`Cancel` are reachable from every stage.
//!
//! Both decide first and only then append, so a failed call leaves the
//! product's history untouched.

use chrono::{DateTime, Utc};

use plm_core::{Aggregate, UserId};

use crate::error::ProductResult;
use crate::history::StageTransition;
use crate::product::{LifecycleEvent, Product};
use crate::stage::Stage;

pub fn advance(
    product: &mut Product,
    actor: UserId,
    occurred_at: DateTime<Utc>,
) -> ProductResult<StageTransition> {
    let event = product.advance_event(actor, occurred_at)?;
    Ok(commit(product, event))
}

pub fn set_stage(
    product: &mut Product,
    target: Stage,
    actor: UserId,
    occurred_at: DateTime<Utc>,
) -> StageTransition {
    let event = product.set_stage_event(target, actor, occurred_at);
    commit(product, event)
}

/// Parse `label` as a stage and jump to it.
pub fn set_stage_by_label(
    product: &mut Product,
    label: &str,
    actor: UserId,
    occurred_at: DateTime<Utc>,
) -> ProductResult<StageTransition> {
    let target: Stage = label.parse()?;
    Ok(set_stage(product, target, actor, occurred_at))
}

pub fn current_stage_of(product: &Product) -> Stage {
    product.current_stage()
}

fn commit(product: &mut Product, event: LifecycleEvent) -> StageTransition {
    product.apply(&event);
    event.transition().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProductError;
    use crate::product::{DraftField, ProductDraft};
    use plm_core::ProductId;

    fn product() -> Product {
        let mut draft = ProductDraft::new();
        draft.set(DraftField::Name("Widget".into()));
        draft.set(DraftField::Description("A widget".into()));
        draft.build(ProductId::new()).unwrap()
    }

    #[test]
    fn advancing_four_times_stops_at_production() {
        let mut product = product();
        let actor = UserId::new();

        let stages: Vec<Stage> = (0..3)
            .map(|_| advance(&mut product, actor, Utc::now()).unwrap().to())
            .collect();
        assert_eq!(stages, vec![Stage::Feasibility, Stage::Projection, Stage::Production]);

        let err = advance(&mut product, actor, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            ProductError::TerminalStage {
                stage: Stage::Production
            }
        );
        assert_eq!(product.history().len(), 3);
        assert_eq!(current_stage_of(&product), Stage::Production);
    }

    #[test]
    fn advance_records_from_to_and_actor() {
        let mut product = product();
        let actor = UserId::new();
        let at = Utc::now();

        let transition = advance(&mut product, actor, at).unwrap();

        assert_eq!(transition.from(), Some(Stage::Concept));
        assert_eq!(transition.to(), Stage::Feasibility);
        assert_eq!(transition.actor(), actor);
        assert_eq!(transition.occurred_at(), at);
        assert_eq!(product.history().last(), Some(&transition));
    }

    #[test]
    fn advance_fails_from_side_states_without_touching_history() {
        for side in [Stage::Retreat, Stage::Standby, Stage::Cancel] {
            let mut product = product();
            set_stage(&mut product, side, UserId::new(), Utc::now());
            let before = product.history().clone();

            let err = advance(&mut product, UserId::new(), Utc::now()).unwrap_err();

            assert_eq!(err, ProductError::TerminalStage { stage: side });
            assert_eq!(product.history(), &before);
        }
    }

    #[test]
    fn set_stage_allows_regression_and_reentry() {
        let mut product = product();
        let actor = UserId::new();
        for _ in 0..3 {
            advance(&mut product, actor, Utc::now()).unwrap();
        }

        let back = set_stage(&mut product, Stage::Concept, actor, Utc::now());
        assert_eq!(back.from(), Some(Stage::Production));
        assert_eq!(back.to(), Stage::Concept);

        let again = set_stage(&mut product, Stage::Concept, actor, Utc::now());
        assert_eq!(again.from(), Some(Stage::Concept));
        assert_eq!(again.to(), Stage::Concept);
        assert_eq!(product.history().len(), 5);

        // Back on the linear path, advance works again.
        assert_eq!(advance(&mut product, actor, Utc::now()).unwrap().to(), Stage::Feasibility);
    }

    #[test]
    fn side_states_can_be_left_via_set_stage() {
        let mut product = product();
        set_stage(&mut product, Stage::Standby, UserId::new(), Utc::now());
        let resumed = set_stage(&mut product, Stage::Projection, UserId::new(), Utc::now());
        assert_eq!(resumed.from(), Some(Stage::Standby));
        assert_eq!(current_stage_of(&product), Stage::Projection);
    }

    #[test]
    fn set_stage_by_label_rejects_unknown_labels() {
        let mut product = product();
        let err = set_stage_by_label(&mut product, "ARCHIVED", UserId::new(), Utc::now())
            .unwrap_err();
        assert_eq!(err, ProductError::InvalidStage("ARCHIVED".into()));
        assert!(product.history().is_empty());

        let ok = set_stage_by_label(&mut product, "cancel", UserId::new(), Utc::now()).unwrap();
        assert_eq!(ok.to(), Stage::Cancel);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Advance,
            Set(Stage),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::Advance),
                (0usize..7).prop_map(|i| Op::Set(Stage::ALL[i])),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: the current stage always equals the last record's target.
            #[test]
            fn current_stage_tracks_last_record(ops in proptest::collection::vec(op(), 0..40)) {
                let mut product = product();
                let actor = UserId::new();

                for op in ops {
                    let before = product.history().len();
                    match op {
                        Op::Advance => {
                            let was = current_stage_of(&product);
                            match advance(&mut product, actor, Utc::now()) {
                                Ok(t) => {
                                    prop_assert_eq!(Some(t.to()), was.linear_successor());
                                    prop_assert_eq!(product.history().len(), before + 1);
                                }
                                Err(e) => {
                                    prop_assert_eq!(e, ProductError::TerminalStage { stage: was });
                                    prop_assert_eq!(product.history().len(), before);
                                }
                            }
                        }
                        Op::Set(target) => {
                            let t = set_stage(&mut product, target, actor, Utc::now());
                            prop_assert_eq!(t.to(), target);
                            prop_assert_eq!(product.history().len(), before + 1);
                        }
                    }

                    let expected = product
                        .history()
                        .last()
                        .map_or(Stage::Concept, |r| r.to());
                    prop_assert_eq!(current_stage_of(&product), expected);
                }
            }
        }
    }
}
