mod range_select;

#[cfg(test)]
mod test_range_logic;

pub use range_select::{
    AdjustDirection, RangeBoundary, RangeOption, RangeSelectControl, RangeSelectState,
    RangeSelection, RangeSelectionError, RangeSelectionResult,
};
