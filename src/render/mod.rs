pub mod aspect;
pub mod compose;
pub mod composite;
pub mod overlay;
pub mod pipeline;
pub mod resample;
