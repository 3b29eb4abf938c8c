pub mod model;

pub use model::{find_candidates, SWAP_FEE_MILLIS};
