pub mod quarter;

pub use quarter::{resolve_eval_date, Quarter};
