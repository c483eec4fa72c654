pub mod config;
pub mod correlate;
pub mod decoder;
pub mod error;
pub mod event_log;
pub mod filter;
pub mod frame;
pub mod offline;
pub mod rate_profile;
pub mod stream;
pub mod synth;
pub mod template;
pub mod tone_table;
pub mod tracing_init;

pub use decoder::{DecoderOutput, DecoderState, MethodResult};
pub use error::SelcalError;
pub use frame::TonesRecord;
pub use rate_profile::RateProfile;
