pub mod data_point;
pub mod data_set;
pub mod idx;

pub use data_point::DataPoint;
pub use data_set::DataSet;
pub use idx::{load_idx_pair, parse_idx_pair};
