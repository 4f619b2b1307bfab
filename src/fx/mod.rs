pub mod beat;
pub mod distortion;
pub mod overtone;
