pub mod resample;
pub mod wav;
