pub mod flat_index;
pub mod stored_index;
