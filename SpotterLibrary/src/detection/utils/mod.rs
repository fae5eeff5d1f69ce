pub mod cell_selection;
pub mod confidence;
pub mod detection_result;
pub mod offset;
pub mod parameters;
pub mod region;
