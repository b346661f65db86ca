pub mod layers;
pub mod model;
