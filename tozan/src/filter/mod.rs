//! Mountain name matching and trailhead acceptance filters.

mod criteria;
mod names;

pub use criteria::{
    AcceptanceCriteria, InvalidDuration, climb_minutes_for, extract_minutes, is_acceptable,
    parking_count, parse_hhmm_to_minutes,
};
pub use names::{load_name_set, parse_names, prefix_robust_match, resolve_working_set};
