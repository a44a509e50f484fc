pub mod roast;
