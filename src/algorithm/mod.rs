pub mod bounds;
pub mod clicks;
pub mod config;
pub mod controller;
pub mod follow;
pub mod geometry;
pub mod one_euro;
pub mod simplify;
pub mod spring;
pub mod zoom_scale;
