use std::sync::Arc;

use super::range_select::{
    AdjustDirection, RangeBoundary, RangeOption, RangeSelectControl, RangeSelectState,
    RangeSelection, RangeSelectionError,
};
use crate::events::FormEvent;
use crate::form::{
    FormControlElement, FormData, FormMember, FormValue, SubmitOutcome, Validity, codes,
    submit_form,
};
use crate::i18n::I18nManager;

fn weekdays() -> Vec<RangeOption> {
    vec![
        RangeOption::new("mon"),
        RangeOption::new("tue"),
        RangeOption::new("wed"),
        RangeOption::new("thu"),
        RangeOption::new("fri"),
    ]
}

fn with_disabled_midweek() -> Vec<RangeOption> {
    vec![
        RangeOption::new("mon"),
        RangeOption::new("tue"),
        RangeOption::disabled("wed"),
        RangeOption::new("thu"),
        RangeOption::new("fri"),
    ]
}

#[test]
fn single_option_drag_span_is_discarded() {
    let mut state = RangeSelectState::new(weekdays());
    assert!(state.begin_drag(2));
    let committed = state.finish_drag();
    assert_eq!(committed, None);
    assert_eq!(state.selection(), None);
    assert!(!state.is_dragging());
}

#[test]
fn drag_commits_enabled_boundaries() {
    let mut state = RangeSelectState::new(with_disabled_midweek());
    assert!(state.begin_drag(1));
    assert!(state.update_drag(4));
    let committed = state.finish_drag().expect("span covers enabled options");
    assert_eq!(committed, RangeSelection::new("tue", "fri"));
    assert_eq!(
        state.selected_values(),
        vec!["tue".to_string(), "thu".to_string(), "fri".to_string()]
    );
}

#[test]
fn drag_preview_normalizes_direction() {
    let mut state = RangeSelectState::new(weekdays());
    assert!(state.begin_drag(3));
    assert!(state.update_drag(1));
    assert_eq!(state.drag_preview(), Some((1, 3)));
    let committed = state.finish_drag().expect("backward drag still commits");
    assert_eq!(committed, RangeSelection::new("tue", "thu"));
}

#[test]
fn begin_drag_rejects_disabled_or_mid_drag() {
    let mut state = RangeSelectState::new(with_disabled_midweek());
    assert!(!state.begin_drag(2), "disabled option must not start a drag");
    assert!(!state.begin_drag(9), "out-of-range index must not start a drag");
    assert!(state.begin_drag(0));
    assert!(!state.begin_drag(4), "a second press during a drag is ignored");
}

#[test]
fn cancel_restores_exact_previous_selection() {
    let mut state = RangeSelectState::new(weekdays());
    state
        .set_selection(Some(RangeSelection::new("mon", "wed")))
        .expect("initial selection is consistent");
    assert!(state.begin_drag(3));
    assert!(state.update_drag(4));
    state.cancel_drag();
    assert_eq!(state.selection(), Some(&RangeSelection::new("mon", "wed")));
    assert!(!state.is_dragging());
}

#[test]
fn finalize_trims_disabled_endpoints() {
    let mut state = RangeSelectState::new(vec![
        RangeOption::disabled("mon"),
        RangeOption::new("tue"),
        RangeOption::new("wed"),
        RangeOption::disabled("thu"),
        RangeOption::new("fri"),
    ]);
    assert!(state.begin_drag(1));
    assert!(state.update_drag(3));
    let committed = state.finish_drag().expect("two enabled options remain");
    assert_eq!(committed, RangeSelection::new("tue", "wed"));
}

#[test]
fn drag_collapsing_to_one_enabled_option_clears_selection() {
    let mut state = RangeSelectState::new(vec![
        RangeOption::disabled("mon"),
        RangeOption::new("tue"),
        RangeOption::disabled("wed"),
        RangeOption::new("thu"),
    ]);
    state
        .set_selection(Some(RangeSelection::new("tue", "thu")))
        .expect("initial selection is consistent");
    assert!(state.begin_drag(1));
    assert!(state.update_drag(2));
    assert_eq!(state.finish_drag(), None);
    assert_eq!(state.selection(), None);
}

#[test]
fn set_selection_rejects_inconsistent_boundaries() {
    let mut state = RangeSelectState::new(weekdays());
    state
        .set_selection(Some(RangeSelection::new("mon", "tue")))
        .expect("baseline selection is consistent");

    let unknown = state.set_selection(Some(RangeSelection::new("mon", "sat")));
    assert_eq!(
        unknown,
        Err(RangeSelectionError::UnknownBoundary {
            value: "sat".into()
        })
    );

    let inverted = state.set_selection(Some(RangeSelection::new("thu", "tue")));
    assert_eq!(
        inverted,
        Err(RangeSelectionError::InvertedBoundaries {
            start: "thu".into(),
            end: "tue".into()
        })
    );

    let equal = state.set_selection(Some(RangeSelection::new("wed", "wed")));
    assert_eq!(
        equal,
        Err(RangeSelectionError::EqualBoundaries {
            value: "wed".into()
        })
    );

    // A rejected assignment leaves the prior selection untouched.
    assert_eq!(state.selection(), Some(&RangeSelection::new("mon", "tue")));
}

#[test]
fn set_selection_trims_idempotently() {
    let mut state = RangeSelectState::new(vec![
        RangeOption::disabled("mon"),
        RangeOption::new("tue"),
        RangeOption::new("wed"),
        RangeOption::disabled("thu"),
    ]);
    state
        .set_selection(Some(RangeSelection::new("mon", "thu")))
        .expect("span still holds two enabled options");
    assert_eq!(state.selection(), Some(&RangeSelection::new("tue", "wed")));

    let trimmed = state.selection().cloned();
    state
        .set_selection(trimmed)
        .expect("re-assigning a trimmed selection is consistent");
    assert_eq!(state.selection(), Some(&RangeSelection::new("tue", "wed")));
}

#[test]
fn keyboard_adjustment_skips_disabled_options() {
    let mut state = RangeSelectState::new(with_disabled_midweek());
    state
        .set_selection(Some(RangeSelection::new("tue", "fri")))
        .expect("initial selection is consistent");
    assert!(state.adjust_boundary(RangeBoundary::End, AdjustDirection::Backward));
    // End steps from fri over disabled wed onto thu.
    assert_eq!(state.selection(), Some(&RangeSelection::new("tue", "thu")));
}

#[test]
fn keyboard_crossing_pushes_the_opposite_boundary() {
    let mut state = RangeSelectState::new(weekdays());
    state
        .set_selection(Some(RangeSelection::new("tue", "wed")))
        .expect("initial selection is consistent");
    assert!(state.adjust_boundary(RangeBoundary::Start, AdjustDirection::Forward));
    // Start lands on wed, which pushes end to thu to keep the order strict.
    assert_eq!(state.selection(), Some(&RangeSelection::new("wed", "thu")));
}

#[test]
fn keyboard_adjustment_rejects_moves_off_the_edge() {
    let mut state = RangeSelectState::new(weekdays());
    state
        .set_selection(Some(RangeSelection::new("mon", "fri")))
        .expect("initial selection is consistent");
    assert!(!state.adjust_boundary(RangeBoundary::Start, AdjustDirection::Backward));
    assert!(!state.adjust_boundary(RangeBoundary::End, AdjustDirection::Forward));
    assert_eq!(state.selection(), Some(&RangeSelection::new("mon", "fri")));

    // A crossing whose push has nowhere to go is also rejected whole.
    state
        .set_selection(Some(RangeSelection::new("thu", "fri")))
        .expect("selection at the far edge is consistent");
    assert!(!state.adjust_boundary(RangeBoundary::Start, AdjustDirection::Forward));
    assert_eq!(state.selection(), Some(&RangeSelection::new("thu", "fri")));
}

#[test]
fn set_options_rechecks_the_current_selection() {
    let mut state = RangeSelectState::new(weekdays());
    state
        .set_selection(Some(RangeSelection::new("wed", "fri")))
        .expect("initial selection is consistent");

    let shrunk = state.set_options(vec![RangeOption::new("mon"), RangeOption::new("tue")]);
    assert_eq!(
        shrunk,
        Err(RangeSelectionError::UnknownBoundary {
            value: "wed".into()
        })
    );

    // The rejected replacement leaves the prior options and selection in
    // place, so the boundaries still resolve.
    assert_eq!(state.options(), weekdays().as_slice());
    assert_eq!(state.selection(), Some(&RangeSelection::new("wed", "fri")));
    assert_eq!(
        state.selected_values(),
        vec!["wed".to_string(), "thu".to_string(), "fri".to_string()]
    );
}

#[test]
fn replacing_options_abandons_an_active_drag() {
    let mut state = RangeSelectState::new(weekdays());
    assert!(state.begin_drag(0));
    state
        .set_options(with_disabled_midweek())
        .expect("no selection to recheck");
    assert!(!state.is_dragging());
}

#[test]
fn required_range_control_blocks_submission_until_a_range_is_chosen() {
    let mut control = RangeSelectControl::new("days", weekdays()).required(true);
    let mut events = Vec::new();

    let mut members = [FormMember::Protocol(&mut control)];
    let outcome = submit_form(&mut members, &mut events);
    let SubmitOutcome::Invalid(report) = outcome else {
        panic!("empty required range must fail submission");
    };
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].validity.code(), Some(codes::EMPTY));

    let form_data = FormData::new();
    assert!(control.begin_drag(0, &form_data));
    assert!(control.update_drag(2));
    let committed = control
        .finish_drag(&form_data, &mut events)
        .expect("drag commits a selection");
    assert_eq!(committed, RangeSelection::new("mon", "wed"));

    events.clear();
    let mut members = [FormMember::Protocol(&mut control)];
    let outcome = submit_form(&mut members, &mut events);
    let SubmitOutcome::Valid(data) = outcome else {
        panic!("a committed range must submit");
    };
    assert_eq!(
        data.get("days"),
        Some(&FormValue::list(["mon", "wed"])),
        "payload carries the boundary pair"
    );
    assert!(matches!(events.last(), Some(FormEvent::FormValid(_))));
}

#[test]
fn committed_drag_announces_the_selected_values() {
    let mut control = RangeSelectControl::new("days", with_disabled_midweek());
    let form_data = FormData::new();
    let mut events = Vec::new();

    assert!(control.begin_drag(1, &form_data));
    assert!(control.update_drag(3));
    control
        .finish_drag(&form_data, &mut events)
        .expect("drag commits a selection");

    let selected = events
        .iter()
        .find_map(|event| match event {
            FormEvent::RangeSelected { name, values } => Some((name.clone(), values.clone())),
            _ => None,
        })
        .expect("a committed drag dispatches a selection event");
    assert_eq!(selected.0, "days");
    assert_eq!(selected.1, vec!["tue".to_string(), "thu".to_string()]);
}

#[test]
fn discarded_drag_announces_nothing() {
    let mut control = RangeSelectControl::new("days", weekdays());
    let form_data = FormData::new();
    let mut events = Vec::new();

    assert!(control.begin_drag(2, &form_data));
    assert_eq!(control.finish_drag(&form_data, &mut events), None);
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, FormEvent::RangeSelected { .. })),
        "a single-option span is silently discarded"
    );
}

#[test]
fn drag_start_parks_the_published_value() {
    let mut control = RangeSelectControl::new("days", weekdays());
    let form_data = FormData::new();
    control
        .set_selection(Some(RangeSelection::new("tue", "thu")), &form_data)
        .expect("initial selection is consistent");
    assert_eq!(*control.control_state().value(), FormValue::list(["tue", "thu"]));

    // A submit mid-drag must see no selection, matching the state machine.
    assert!(control.begin_drag(0, &form_data));
    assert_eq!(control.form_control_data(), FormValue::Empty);

    control.cancel_drag(&form_data);
    assert_eq!(*control.control_state().value(), FormValue::list(["tue", "thu"]));
}

#[test]
fn missing_selection_reports_the_localized_range_label() {
    let i18n = I18nManager::new();
    i18n.set_locale("zh-CN");
    let mut control = RangeSelectControl::new("days", weekdays())
        .required(true)
        .with_i18n(i18n);

    control.validate(&FormData::new());
    assert_eq!(
        control.control_state().participant().validation_message(),
        Some("请至少选择两个选项。")
    );
}

#[test]
fn custom_rule_codes_resolve_through_the_error_catalog() {
    let i18n = I18nManager::new();
    i18n.set_locale("en-US");
    let mut control = RangeSelectControl::new("days", weekdays()).with_i18n(i18n);
    control
        .control_state_mut()
        .set_custom_validator(Some(Arc::new(
            |_: &FormValue, _: &FormData| -> Validity { Validity::invalid(codes::CUSTOM_ERROR) },
        )));

    control.validate(&FormData::new());
    assert_eq!(
        control.control_state().participant().validation_message(),
        Some("This value is not accepted.")
    );
}

#[test]
fn keyboard_adjustment_through_the_control_announces_the_move() {
    let mut control = RangeSelectControl::new("days", weekdays());
    let form_data = FormData::new();
    let mut events = Vec::new();
    control
        .set_selection(Some(RangeSelection::new("tue", "thu")), &form_data)
        .expect("initial selection is consistent");

    assert!(control.adjust_boundary(
        RangeBoundary::End,
        AdjustDirection::Forward,
        &form_data,
        &mut events,
    ));
    let values = events
        .iter()
        .find_map(|event| match event {
            FormEvent::RangeSelected { values, .. } => Some(values.clone()),
            _ => None,
        })
        .expect("a boundary move dispatches a selection event");
    assert_eq!(
        values,
        vec![
            "tue".to_string(),
            "wed".to_string(),
            "thu".to_string(),
            "fri".to_string()
        ]
    );
}
