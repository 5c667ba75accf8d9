//! Filter evaluation against a single card.

use crate::record::{ContactRecord, PropertyInstance};

use super::filter::{FilterSpec, FilterTest, ParamFilter, PropFilter, TextMatch};

/// The sub-filter lists of a prop-filter that apply to a defined property.
enum SubFilters<'f> {
    Params(&'f [ParamFilter]),
    Text(&'f [TextMatch]),
}

/// Evaluates a filter spec against one card.
///
/// An empty filter list matches every card. Otherwise prop-filters are
/// combined with `spec.test`, stopping at the first result that decides it.
pub fn evaluate_filter_spec<R>(spec: &FilterSpec, record: &R) -> bool
where
    R: ContactRecord + ?Sized,
{
    if spec.prop_filters.is_empty() {
        return true;
    }
    combine(&spec.prop_filters, spec.test, |filter| {
        evaluate_prop_filter(filter, record)
    })
}

/// Evaluates one prop-filter against a card.
pub fn evaluate_prop_filter<R>(filter: &PropFilter, record: &R) -> bool
where
    R: ContactRecord + ?Sized,
{
    if filter.is_not_defined {
        return !record.has_property(&filter.name);
    }
    if !filter.has_sub_filters() {
        return record.has_property(&filter.name);
    }

    // Sub-filters cannot hold for a property that is not there.
    let instances = record.properties(&filter.name);
    if instances.is_empty() {
        return false;
    }

    let mut partials = Vec::with_capacity(2);
    if !filter.param_filters.is_empty() {
        partials.push(SubFilters::Params(&filter.param_filters));
    }
    if !filter.text_matches.is_empty() {
        partials.push(SubFilters::Text(&filter.text_matches));
    }

    combine(partials, filter.test, |partial| match partial {
        SubFilters::Params(params) => evaluate_param_filters(&instances, params, filter.test),
        SubFilters::Text(texts) => evaluate_text_matches(&instances, texts, filter.test),
    })
}

/// Evaluates the param-filters of a prop-filter over all its property instances.
pub fn evaluate_param_filters<P>(
    instances: &[&P],
    filters: &[ParamFilter],
    test: FilterTest,
) -> bool
where
    P: PropertyInstance + ?Sized,
{
    combine(filters, test, |filter| evaluate_param_filter(instances, filter))
}

fn evaluate_param_filter<P>(instances: &[&P], filter: &ParamFilter) -> bool
where
    P: PropertyInstance + ?Sized,
{
    let name = filter.name.as_str();
    let is_defined = instances.iter().any(|instance| instance.has_parameter(name));
    if filter.is_not_defined {
        return !is_defined;
    }
    let Some(text_match) = filter.text_match.as_ref() else {
        return is_defined;
    };
    if !is_defined {
        return false;
    }

    // Instances without the parameter are skipped.
    let matched = instances.iter().any(|instance| {
        instance
            .parameter_values(name)
            .into_iter()
            .any(|value| text_match.matches(value))
    });
    matched != text_match.negate
}

/// Evaluates text-matches against the values of all property instances.
pub fn evaluate_text_matches<P>(
    instances: &[&P],
    text_matches: &[TextMatch],
    test: FilterTest,
) -> bool
where
    P: PropertyInstance + ?Sized,
{
    combine(text_matches, test, |text_match| {
        let matched = instances
            .iter()
            .any(|instance| text_match.matches(instance.value()));
        matched != text_match.negate
    })
}

/// Folds sibling results with `test`, returning as soon as one decides it.
fn combine<I, F>(items: I, test: FilterTest, mut evaluate: F) -> bool
where
    I: IntoIterator,
    F: FnMut(I::Item) -> bool,
{
    for item in items {
        let result = evaluate(item);
        if test.short_circuits(result) {
            return result;
        }
    }
    test.fallback()
}
