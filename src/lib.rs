// Library surface for the three engines and their supporting types.
// The binary in main.rs is glue that feeds these and prints the output.
pub mod analysis;
pub mod assessment;
pub mod battery;
pub mod error;
pub mod pacer;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod util;

pub use error::CoreError;
