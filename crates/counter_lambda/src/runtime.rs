pub use counter_core::{contract, routing};
