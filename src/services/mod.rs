pub mod completion;
pub mod relay;
pub mod tone;
