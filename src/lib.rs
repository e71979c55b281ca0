pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod pose;
pub mod render;
