//! Occurrence engine.
//!
//! Expands active templates into dated occurrences over a rolling horizon
//! and merges against the prior store so sticky per-occurrence state
//! (`person`, `done`) survives regeneration. The store is rebuilt wholesale
//! on every run; occurrences of now-inactive templates simply drop out
//! because only active templates are walked.
//!
//! The horizon is a moving window anchored at "today", so far-future
//! occurrences of a fixed-interval template disappear and reappear as the
//! window rolls. Accepted trade-off, not a bug.

use std::collections::HashSet;

use chrono::{Days, Months, NaiveDate};
use tracing::debug;

use crate::error::{Error, Result};
use crate::occurrence::{index_by_key, Occurrence, OccurrenceStore};
use crate::template::{TaskTemplate, TemplateSource};

/// End of the materialization window: `today + months_ahead` months.
///
/// Clamps to the last day of a short month (chrono's `Months` arithmetic),
/// and saturates at `NaiveDate::MAX` rather than overflowing.
pub fn horizon_end(today: NaiveDate, months_ahead: u32) -> NaiveDate {
    today
        .checked_add_months(Months::new(months_ahead))
        .unwrap_or(NaiveDate::MAX)
}

/// Expand templates into the new canonical occurrence set.
///
/// Pure function of its inputs: identical `(templates, prior, horizon)`
/// always yields an identical result. All templates are validated before
/// any expansion starts, so a bad interval never produces a partial set.
pub fn expand(
    templates: &[TaskTemplate],
    prior: &[Occurrence],
    horizon: NaiveDate,
) -> Result<Vec<Occurrence>> {
    // A repeated id (possible in a hand-edited templates.json) would emit
    // colliding (task_id, due_date) keys, so it is rejected up front.
    let mut seen_ids = HashSet::new();
    for template in templates {
        template.validate()?;
        if !seen_ids.insert(template.id.as_str()) {
            return Err(Error::DuplicateTemplate(template.id.clone()));
        }
    }

    let existing = index_by_key(prior);
    let mut result = Vec::new();

    for template in templates {
        if !template.active {
            continue;
        }

        let step = Days::new(template.interval_days as u64);
        let mut current = template.start_date;
        while current <= horizon {
            let key = crate::occurrence::OccurrenceKey::new(template.id.clone(), current);
            let (person, done) = match existing.get(&key) {
                // Derived fields come from the template; sticky fields carry over.
                Some(prior_occ) => (prior_occ.person.clone(), prior_occ.done),
                None => (String::new(), false),
            };

            result.push(Occurrence {
                task_id: template.id.clone(),
                name: template.name.clone(),
                due_date: current,
                person,
                done,
                color: template.color.clone(),
                active: template.active,
            });

            current = match current.checked_add_days(step) {
                Some(next) => next,
                None => break,
            };
        }
    }

    // Stable sort: same-date occurrences keep template emission order.
    result.sort_by_key(|occ| occ.due_date);

    debug!(
        templates = templates.len(),
        occurrences = result.len(),
        horizon = %horizon,
        "expanded occurrence set"
    );
    Ok(result)
}

/// Run the engine against live storage: read templates and the prior store,
/// expand, and replace the store contents in one write-back.
///
/// Returns the new occurrence count. On any error the prior store is left
/// in place untouched.
pub fn regenerate(
    source: &TemplateSource,
    store: &OccurrenceStore,
    today: NaiveDate,
    months_ahead: u32,
) -> Result<usize> {
    let templates = source.list_active()?;
    let prior = store.read_all()?;
    let next = expand(&templates, &prior, horizon_end(today, months_ahead))?;
    let count = next.len();
    store.replace_all(next)?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template(id: &str, name: &str, start: NaiveDate, every: i64) -> TaskTemplate {
        TaskTemplate {
            id: id.to_string(),
            name: name.to_string(),
            start_date: start,
            interval_days: every,
            color: "#00F".to_string(),
            active: true,
        }
    }

    #[test]
    fn weekly_template_expands_over_january() {
        let templates = vec![template("T1", "Water plants", date(2024, 1, 1), 7)];
        let result = expand(&templates, &[], date(2024, 1, 31)).expect("expand");

        let dates: Vec<NaiveDate> = result.iter().map(|occ| occ.due_date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 1),
                date(2024, 1, 8),
                date(2024, 1, 15),
                date(2024, 1, 22),
                date(2024, 1, 29),
            ]
        );
        for occ in &result {
            assert_eq!(occ.person, "");
            assert!(!occ.done);
            assert_eq!(occ.color, "#00F");
            assert!(occ.active);
        }
    }

    #[test]
    fn expansion_is_deterministic() {
        let templates = vec![
            template("T1", "Water plants", date(2024, 1, 1), 7),
            template("T2", "Take out trash", date(2024, 1, 3), 3),
        ];
        let first = expand(&templates, &[], date(2024, 2, 29)).expect("expand");
        let second = expand(&templates, &[], date(2024, 2, 29)).expect("expand");
        assert_eq!(first, second);
    }

    #[test]
    fn sticky_fields_survive_template_recolor() {
        let mut templates = vec![template("T1", "Water plants", date(2024, 1, 1), 7)];
        let mut prior = expand(&templates, &[], date(2024, 1, 31)).expect("expand");

        // user assigns and completes the 01-08 occurrence
        let edited = prior
            .iter_mut()
            .find(|occ| occ.due_date == date(2024, 1, 8))
            .unwrap();
        edited.person = "Alice".to_string();
        edited.done = true;

        templates[0].color = "#F00".to_string();
        let next = expand(&templates, &prior, date(2024, 1, 31)).expect("expand");

        let merged = next
            .iter()
            .find(|occ| occ.due_date == date(2024, 1, 8))
            .unwrap();
        assert_eq!(merged.person, "Alice");
        assert!(merged.done);
        assert_eq!(merged.color, "#F00");

        let fresh = next
            .iter()
            .find(|occ| occ.due_date == date(2024, 1, 15))
            .unwrap();
        assert_eq!(fresh.person, "");
        assert!(!fresh.done);
    }

    #[test]
    fn rename_refreshes_derived_name_without_losing_progress() {
        let mut templates = vec![template("T1", "Water plants", date(2024, 1, 1), 7)];
        let mut prior = expand(&templates, &[], date(2024, 1, 31)).expect("expand");
        prior[0].person = "Bob".to_string();

        templates[0].name = "Water the plants".to_string();
        let next = expand(&templates, &prior, date(2024, 1, 31)).expect("expand");
        assert_eq!(next[0].name, "Water the plants");
        assert_eq!(next[0].person, "Bob");
    }

    #[test]
    fn inactive_template_drops_all_occurrences() {
        let mut templates = vec![template("T1", "Water plants", date(2024, 1, 1), 7)];
        let prior = expand(&templates, &[], date(2024, 1, 31)).expect("expand");
        assert!(!prior.is_empty());

        templates[0].active = false;
        let next = expand(&templates, &prior, date(2024, 1, 31)).expect("expand");
        assert!(next.is_empty());
    }

    #[test]
    fn zero_templates_yield_empty_store() {
        let result = expand(&[], &[], date(2024, 1, 31)).expect("expand");
        assert!(result.is_empty());
    }

    #[test]
    fn non_positive_interval_is_rejected_before_expansion() {
        let templates = vec![
            template("T1", "Good", date(2024, 1, 1), 7),
            template("T2", "Bad", date(2024, 1, 1), 0),
        ];
        let err = expand(&templates, &[], date(2024, 1, 31)).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidInterval { .. }));
    }

    #[test]
    fn duplicate_template_ids_are_rejected_before_expansion() {
        let templates = vec![
            template("T1", "Water plants", date(2024, 1, 1), 7),
            template("T1", "Water plants again", date(2024, 1, 2), 7),
        ];
        let err = expand(&templates, &[], date(2024, 1, 31)).unwrap_err();
        assert!(matches!(err, Error::DuplicateTemplate(id) if id == "T1"));
    }

    #[test]
    fn result_is_sorted_by_due_date_with_stable_ties() {
        let templates = vec![
            template("T2", "Second", date(2024, 1, 8), 7),
            template("T1", "First", date(2024, 1, 1), 7),
        ];
        let result = expand(&templates, &[], date(2024, 1, 15)).expect("expand");

        let mut sorted = result.clone();
        sorted.sort_by_key(|occ| occ.due_date);
        assert_eq!(result, sorted);

        // same-date ties keep template order (T2 before T1 on 01-08)
        let on_eighth: Vec<&str> = result
            .iter()
            .filter(|occ| occ.due_date == date(2024, 1, 8))
            .map(|occ| occ.task_id.as_str())
            .collect();
        assert_eq!(on_eighth, vec!["T2", "T1"]);
    }

    #[test]
    fn template_starting_after_horizon_emits_nothing() {
        let templates = vec![template("T1", "Later", date(2024, 6, 1), 7)];
        let result = expand(&templates, &[], date(2024, 1, 31)).expect("expand");
        assert!(result.is_empty());
    }

    #[test]
    fn horizon_end_clamps_short_months() {
        // Jan 31 + 1 month clamps to Feb 29 in a leap year
        assert_eq!(horizon_end(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(horizon_end(date(2024, 1, 15), 12), date(2025, 1, 15));
    }
}
