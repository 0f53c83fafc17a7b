pub mod util;

pub use util::{parse_policies, parse_seeds, split_csv};
