pub mod worth;

pub use worth::{HitCount, LastTouch, WorthPolicy};
