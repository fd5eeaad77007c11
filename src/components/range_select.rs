use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use smol_str::SmolStr;

use crate::events::{EventSink, FormEvent};
use crate::form::{
    ErrorMessage, ErrorMessageMap, FormControlElement, FormControlState, FormData, FormValue,
    RequiredValidator, Validator, codes, properties,
};
use crate::i18n::{I18nManager, localized_error_messages};

/// One selectable option, in source order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeOption {
    pub value: SmolStr,
    pub disabled: bool,
}

impl RangeOption {
    pub fn new(value: impl Into<SmolStr>) -> Self {
        Self {
            value: value.into(),
            disabled: false,
        }
    }

    pub fn disabled(value: impl Into<SmolStr>) -> Self {
        Self {
            value: value.into(),
            disabled: true,
        }
    }
}

/// Committed boundary pair surfaced to the application.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeSelection {
    pub start_value: SmolStr,
    pub end_value: SmolStr,
}

impl RangeSelection {
    pub fn new(start_value: impl Into<SmolStr>, end_value: impl Into<SmolStr>) -> Self {
        Self {
            start_value: start_value.into(),
            end_value: end_value.into(),
        }
    }
}

/// Transient state while the user is actively selecting. Both indices exist
/// for the whole lifetime of the drag; `previous` is the rollback snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
struct DragSelection {
    start: usize,
    current: usize,
    previous: Option<RangeSelection>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RangeBoundary {
    Start,
    End,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdjustDirection {
    Backward,
    Forward,
}

impl AdjustDirection {
    fn step(self) -> i64 {
        match self {
            Self::Backward => -1,
            Self::Forward => 1,
        }
    }
}

/// A caller-supplied selection inconsistent with the current option set is a
/// programming error, surfaced immediately rather than silently clamped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RangeSelectionError {
    UnknownBoundary { value: SmolStr },
    InvertedBoundaries { start: SmolStr, end: SmolStr },
    EqualBoundaries { value: SmolStr },
}

impl Display for RangeSelectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBoundary { value } => {
                write!(f, "selection boundary '{value}' is not among the options")
            }
            Self::InvertedBoundaries { start, end } => {
                write!(f, "selection start '{start}' does not precede end '{end}'")
            }
            Self::EqualBoundaries { value } => {
                write!(
                    f,
                    "selection boundaries are both '{value}'; use single-selection mode instead"
                )
            }
        }
    }
}

impl std::error::Error for RangeSelectionError {}

pub type RangeSelectionResult<T> = Result<T, RangeSelectionError>;

/// Drag/keyboard selection state machine over an ordered option list.
#[derive(Clone, Debug, Default)]
pub struct RangeSelectState {
    options: Vec<RangeOption>,
    selection: Option<RangeSelection>,
    drag: Option<DragSelection>,
}

impl RangeSelectState {
    pub fn new(options: Vec<RangeOption>) -> Self {
        Self {
            options,
            selection: None,
            drag: None,
        }
    }

    pub fn options(&self) -> &[RangeOption] {
        &self.options
    }

    pub fn selection(&self) -> Option<&RangeSelection> {
        self.selection.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Replaces the option list. The current selection must stay consistent
    /// with the new options and is re-trimmed; an inconsistent replacement is
    /// rejected whole, leaving options, selection, and any drag untouched. On
    /// success an in-progress drag is abandoned because its indices no longer
    /// mean anything.
    pub fn set_options(&mut self, options: Vec<RangeOption>) -> RangeSelectionResult<()> {
        let previous = std::mem::replace(&mut self.options, options);
        let selection = self.selection.clone();
        if let Err(error) = self.set_selection(selection) {
            self.options = previous;
            return Err(error);
        }
        self.drag = None;
        Ok(())
    }

    /// Externally assigns (or clears) the persisted selection. Boundaries
    /// must resolve to existing options with `start` strictly before `end`.
    /// Disabled options at either end of the span are trimmed away;
    /// re-trimming an already-clean selection is a no-op.
    pub fn set_selection(&mut self, selection: Option<RangeSelection>) -> RangeSelectionResult<()> {
        let Some(selection) = selection else {
            self.selection = None;
            return Ok(());
        };
        let start = self.index_of(&selection.start_value).ok_or_else(|| {
            RangeSelectionError::UnknownBoundary {
                value: selection.start_value.clone(),
            }
        })?;
        let end = self.index_of(&selection.end_value).ok_or_else(|| {
            RangeSelectionError::UnknownBoundary {
                value: selection.end_value.clone(),
            }
        })?;
        if start == end {
            return Err(RangeSelectionError::EqualBoundaries {
                value: selection.start_value,
            });
        }
        if start > end {
            return Err(RangeSelectionError::InvertedBoundaries {
                start: selection.start_value,
                end: selection.end_value,
            });
        }
        self.selection = self
            .trimmed_span(start, end)
            .map(|(lo, hi)| self.selection_for(lo, hi));
        Ok(())
    }

    /// Pointer-down over an option. Returns whether a drag started; presses
    /// on disabled options, out-of-range indices, or during an existing drag
    /// are ignored.
    pub fn begin_drag(&mut self, index: usize) -> bool {
        if self.drag.is_some() || self.options.get(index).is_none_or(|option| option.disabled) {
            return false;
        }
        // Only the drag preview is visible while dragging; the snapshot is
        // restored if the drag is cancelled.
        let previous = self.selection.take();
        self.drag = Some(DragSelection {
            start: index,
            current: index,
            previous,
        });
        true
    }

    /// Pointer-enter over an option while dragging. Disabled options may be
    /// traversed; they are excluded at finalization.
    pub fn update_drag(&mut self, index: usize) -> bool {
        if index >= self.options.len() {
            return false;
        }
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        drag.current = index;
        true
    }

    /// Normalized `[lo, hi]` span for preview rendering while dragging.
    pub fn drag_preview(&self) -> Option<(usize, usize)> {
        self.drag.as_ref().map(|drag| {
            if drag.start <= drag.current {
                (drag.start, drag.current)
            } else {
                (drag.current, drag.start)
            }
        })
    }

    /// Pointer-up: commits the dragged span when it covers more than one
    /// enabled option, otherwise clears the selection. A span of one option
    /// (a plain click without movement) is deliberately discarded.
    pub fn finish_drag(&mut self) -> Option<RangeSelection> {
        let drag = self.drag.take()?;
        let (lo, hi) = if drag.start <= drag.current {
            (drag.start, drag.current)
        } else {
            (drag.current, drag.start)
        };
        self.selection = self
            .trimmed_span(lo, hi)
            .map(|(lo, hi)| self.selection_for(lo, hi));
        self.selection.clone()
    }

    /// Outside click while dragging: full rollback to the pre-drag
    /// persisted selection.
    pub fn cancel_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            self.selection = drag.previous;
        }
    }

    /// Keyboard adjustment of one boundary. Consecutive disabled options in
    /// the direction of travel are skipped; a boundary crossing the opposite
    /// one pushes it a further enabled step in the same direction, keeping
    /// `start < end` strict; an impossible move is rejected with no state
    /// change.
    pub fn adjust_boundary(&mut self, boundary: RangeBoundary, direction: AdjustDirection) -> bool {
        let Some(selection) = self.selection.clone() else {
            return false;
        };
        let (Some(mut start), Some(mut end)) = (
            self.index_of(&selection.start_value),
            self.index_of(&selection.end_value),
        ) else {
            return false;
        };
        let step = direction.step();
        match boundary {
            RangeBoundary::Start => {
                let Some(next) = self.next_enabled(start, step) else {
                    return false;
                };
                start = next;
                if start >= end {
                    let Some(pushed) = self.next_enabled(start, step) else {
                        return false;
                    };
                    end = pushed;
                }
            }
            RangeBoundary::End => {
                let Some(next) = self.next_enabled(end, step) else {
                    return false;
                };
                end = next;
                if end <= start {
                    let Some(pushed) = self.next_enabled(end, step) else {
                        return false;
                    };
                    start = pushed;
                }
            }
        }
        self.selection = Some(self.selection_for(start, end));
        true
    }

    /// Enabled option values covered by the persisted selection, in source
    /// order. Disabled options inside the span stay visible but are never
    /// part of the selected values.
    pub fn selected_values(&self) -> Vec<SmolStr> {
        let Some(selection) = &self.selection else {
            return Vec::new();
        };
        let (Some(start), Some(end)) = (
            self.index_of(&selection.start_value),
            self.index_of(&selection.end_value),
        ) else {
            return Vec::new();
        };
        self.options[start..=end]
            .iter()
            .filter(|option| !option.disabled)
            .map(|option| option.value.clone())
            .collect()
    }

    fn index_of(&self, value: &str) -> Option<usize> {
        self.options.iter().position(|option| option.value == value)
    }

    fn selection_for(&self, start: usize, end: usize) -> RangeSelection {
        RangeSelection {
            start_value: self.options[start].value.clone(),
            end_value: self.options[end].value.clone(),
        }
    }

    /// Trims disabled options off both ends of `[start, end]`. `None` when
    /// fewer than two enabled options remain, which also rules out equal
    /// boundaries.
    fn trimmed_span(&self, mut start: usize, mut end: usize) -> Option<(usize, usize)> {
        while start < end && self.options[start].disabled {
            start += 1;
        }
        while end > start && self.options[end].disabled {
            end -= 1;
        }
        (start < end).then_some((start, end))
    }

    fn next_enabled(&self, from: usize, step: i64) -> Option<usize> {
        let mut index = from as i64 + step;
        while index >= 0 && (index as usize) < self.options.len() {
            if !self.options[index as usize].disabled {
                return Some(index as usize);
            }
            index += step;
        }
        None
    }
}

/// Range-style form control: turns the selection state machine's output
/// into a validated form value and participates in submission like any
/// other protocol control.
pub struct RangeSelectControl {
    state: FormControlState,
    range: RangeSelectState,
    required: bool,
    i18n: Option<I18nManager>,
}

impl RangeSelectControl {
    pub fn new(name: impl Into<SmolStr>, options: Vec<RangeOption>) -> Self {
        Self {
            state: FormControlState::new(name),
            range: RangeSelectState::new(options),
            required: false,
            i18n: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_i18n(mut self, i18n: I18nManager) -> Self {
        self.i18n = Some(i18n);
        self
    }

    pub fn range_state(&self) -> &RangeSelectState {
        &self.range
    }

    pub fn set_required(&mut self, required: bool, form_data: &FormData) {
        if self.required == required {
            return;
        }
        self.required = required;
        self.apply_update(&changed_set(&["required"]), form_data);
    }

    pub fn set_options(
        &mut self,
        options: Vec<RangeOption>,
        form_data: &FormData,
    ) -> RangeSelectionResult<()> {
        self.range.set_options(options)?;
        self.sync_selection(form_data, &["options"]);
        Ok(())
    }

    pub fn set_selection(
        &mut self,
        selection: Option<RangeSelection>,
        form_data: &FormData,
    ) -> RangeSelectionResult<()> {
        self.range.set_selection(selection)?;
        self.sync_selection(form_data, &[]);
        Ok(())
    }

    /// Starting a drag parks the persisted selection, so the published value
    /// empties immediately; a submit mid-drag sees no selection rather than
    /// one the state machine no longer holds.
    pub fn begin_drag(&mut self, index: usize, form_data: &FormData) -> bool {
        if !self.range.begin_drag(index) {
            return false;
        }
        self.sync_selection(form_data, &[]);
        true
    }

    pub fn update_drag(&mut self, index: usize) -> bool {
        self.range.update_drag(index)
    }

    pub fn finish_drag(
        &mut self,
        form_data: &FormData,
        events: &mut dyn EventSink,
    ) -> Option<RangeSelection> {
        let committed = self.range.finish_drag();
        self.sync_selection(form_data, &[]);
        if committed.is_some() {
            events.dispatch(FormEvent::RangeSelected {
                name: self.state.name().clone(),
                values: self.range.selected_values(),
            });
        }
        committed
    }

    pub fn cancel_drag(&mut self, form_data: &FormData) {
        self.range.cancel_drag();
        self.sync_selection(form_data, &[]);
    }

    pub fn adjust_boundary(
        &mut self,
        boundary: RangeBoundary,
        direction: AdjustDirection,
        form_data: &FormData,
        events: &mut dyn EventSink,
    ) -> bool {
        if !self.range.adjust_boundary(boundary, direction) {
            return false;
        }
        self.sync_selection(form_data, &[]);
        events.dispatch(FormEvent::RangeSelected {
            name: self.state.name().clone(),
            values: self.range.selected_values(),
        });
        true
    }

    /// Mirrors the persisted selection into the control value and runs one
    /// reactive update cycle for whatever actually changed.
    fn sync_selection(&mut self, form_data: &FormData, extra_changed: &[&str]) {
        let value = match self.range.selection() {
            Some(selection) => FormValue::List(vec![
                selection.start_value.clone(),
                selection.end_value.clone(),
            ]),
            None => FormValue::Empty,
        };
        let mut changed = changed_set(extra_changed);
        if *self.state.value() != value {
            self.state.set_value(value);
            changed.insert(SmolStr::new(properties::VALUE));
        }
        if !changed.is_empty() {
            self.apply_update(&changed, form_data);
        }
    }
}

fn changed_set(keys: &[&str]) -> BTreeSet<SmolStr> {
    keys.iter().map(|key| SmolStr::new(key)).collect()
}

impl FormControlElement for RangeSelectControl {
    fn control_state(&self) -> &FormControlState {
        &self.state
    }

    fn control_state_mut(&mut self) -> &mut FormControlState {
        &mut self.state
    }

    fn built_in_validator(&self) -> Option<Arc<dyn Validator>> {
        self.required
            .then(|| Arc::new(RequiredValidator) as Arc<dyn Validator>)
    }

    fn built_in_error_messages(&self) -> ErrorMessageMap {
        // The shared localized map covers every code; a missing selection
        // gets the range-specific label instead of the generic empty one.
        let (mut messages, message) = match &self.i18n {
            Some(i18n) => {
                let manager = i18n.clone();
                (
                    localized_error_messages(i18n),
                    ErrorMessage::lazy(move || manager.t("range.invalidSelection")),
                )
            }
            None => (
                ErrorMessageMap::new(),
                ErrorMessage::from("Please select at least two options."),
            ),
        };
        messages.insert(codes::EMPTY.into(), message);
        messages
    }

    fn reactive_validation_properties(&self) -> &[&str] {
        &["required", "options"]
    }
}
