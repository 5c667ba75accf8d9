//! Runs a filter spec over the cards of an address book.

use crate::config::QueryConfig;
use crate::query::{evaluate_filter_spec, FilterSpec};
use crate::record::ContactRecord;

/// One child of the queried collection.
#[derive(Debug)]
pub enum Candidate<'a, R: ?Sized> {
    Record(&'a R),
    /// Anything that is not a card (sub-collections, foreign resources).
    Other,
}

impl<R: ?Sized> Clone for Candidate<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized> Copy for Candidate<'_, R> {}

/// Result of running a query over a candidate sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Ids of the matching cards, in candidate order.
    pub matches: Vec<String>,
    /// Number of cards evaluated.
    pub scanned: usize,
    /// Number of non-card candidates passed over.
    pub skipped: usize,
    /// Whether iteration stopped because the limit was reached.
    pub limit_reached: bool,
}

pub struct QueryExecutor<'s> {
    spec: &'s FilterSpec,
    limit: Option<usize>,
}

impl<'s> QueryExecutor<'s> {
    pub fn new(spec: &'s FilterSpec) -> Self {
        Self {
            spec,
            limit: spec.limit,
        }
    }

    /// Applies the server-side result cap on top of the client limit.
    pub fn with_config(spec: &'s FilterSpec, config: &QueryConfig) -> Self {
        Self {
            spec,
            limit: config.effective_limit(spec.limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Evaluates candidates in the given order.
    ///
    /// Once the limit is reached no further candidate is pulled from the
    /// iterator, so lazily produced sequences stop doing work as well.
    pub fn run<'a, R, I>(&self, candidates: I) -> QueryOutcome
    where
        R: ContactRecord + ?Sized + 'a,
        I: IntoIterator<Item = Candidate<'a, R>>,
    {
        let mut outcome = QueryOutcome::default();
        if self.limit_reached(&outcome) {
            outcome.limit_reached = true;
            return outcome;
        }

        for candidate in candidates {
            let record = match candidate {
                Candidate::Record(record) => record,
                Candidate::Other => {
                    outcome.skipped += 1;
                    continue;
                }
            };

            outcome.scanned += 1;
            let matched = evaluate_filter_spec(self.spec, record);
            log::trace!("card {} matched={matched}", record.id());
            if !matched {
                continue;
            }

            outcome.matches.push(record.id().to_string());
            if self.limit_reached(&outcome) {
                outcome.limit_reached = true;
                break;
            }
        }

        log::debug!(
            "addressbook query matched {} of {} cards (skipped {}, limit reached: {})",
            outcome.matches.len(),
            outcome.scanned,
            outcome.skipped,
            outcome.limit_reached
        );
        outcome
    }

    /// Like [`run`](Self::run) for sequences that only contain cards.
    pub fn run_records<'a, R, I>(&self, records: I) -> QueryOutcome
    where
        R: ContactRecord + ?Sized + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        self.run(records.into_iter().map(Candidate::Record))
    }

    fn limit_reached(&self, outcome: &QueryOutcome) -> bool {
        self.limit.is_some_and(|limit| outcome.matches.len() >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::query::{FilterTest, MatchType, PropFilter, TextMatch};
    use crate::record::{Card, CardProperty};

    fn card(id: &str, email: &str) -> Card {
        Card::new(id).with_property(CardProperty::new("EMAIL", email))
    }

    fn address_book() -> Vec<Card> {
        vec![
            card("a.vcf", "a@example.com"),
            card("b.vcf", "b@other.test"),
            card("c.vcf", "c@example.com"),
            card("d.vcf", "d@example.com"),
            Card::new("e.vcf").with_property(CardProperty::new("FN", "No Email")),
        ]
    }

    fn example_com() -> FilterSpec {
        FilterSpec::new(
            FilterTest::AnyOf,
            vec![PropFilter::new("EMAIL").with_text_match(
                TextMatch::new("@example.com").with_match_type(MatchType::EndsWith),
            )],
        )
    }

    #[test]
    fn collects_matches_in_candidate_order() {
        let cards = address_book();
        let spec = example_com();
        let outcome = QueryExecutor::new(&spec).run_records(&cards);

        assert_eq!(outcome.matches, vec!["a.vcf", "c.vcf", "d.vcf"]);
        assert_eq!(outcome.scanned, 5);
        assert!(!outcome.limit_reached);
    }

    #[test]
    fn match_all_returns_every_card() {
        let cards = address_book();
        let spec = FilterSpec::match_all();
        let outcome = QueryExecutor::new(&spec).run_records(&cards);
        assert_eq!(outcome.matches.len(), cards.len());
    }

    #[test]
    fn stops_pulling_candidates_at_limit() {
        let cards = address_book();
        let spec = example_com().with_limit(Some(2));
        let pulled = Cell::new(0usize);

        let outcome = QueryExecutor::new(&spec).run(cards.iter().map(|card| {
            pulled.set(pulled.get() + 1);
            Candidate::Record(card)
        }));

        assert_eq!(outcome.matches, vec!["a.vcf", "c.vcf"]);
        assert!(outcome.limit_reached);
        assert_eq!(outcome.scanned, 3);
        assert_eq!(pulled.get(), 3);
    }

    #[test]
    fn skips_non_card_candidates() {
        let cards = address_book();
        let candidates = vec![
            Candidate::Other,
            Candidate::Record(&cards[0]),
            Candidate::Other,
            Candidate::Record(&cards[2]),
        ];
        let spec = example_com();
        let outcome = QueryExecutor::new(&spec).run(candidates);

        assert_eq!(outcome.matches, vec!["a.vcf", "c.vcf"]);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.scanned, 2);
    }

    #[test]
    fn server_cap_applies_without_client_limit() {
        let cards = address_book();
        let spec = FilterSpec::match_all();
        let config = QueryConfig {
            max_results: Some(1),
            ..QueryConfig::default()
        };
        let executor = QueryExecutor::with_config(&spec, &config);
        assert_eq!(executor.limit(), Some(1));

        let outcome = executor.run_records(&cards);
        assert_eq!(outcome.matches, vec!["a.vcf"]);
        assert!(outcome.limit_reached);
    }

    #[test]
    fn empty_candidate_sequence() {
        let spec = example_com();
        let outcome = QueryExecutor::new(&spec).run_records(Vec::<&Card>::new());
        assert_eq!(outcome, QueryOutcome::default());
    }
}
