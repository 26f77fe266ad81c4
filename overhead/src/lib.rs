pub extern crate nalgebra as na;

pub mod catalog;
pub mod config;
pub mod heading;
pub mod interruptor;
pub mod location;
pub mod projector;
pub mod propagation;
pub mod sampler;
pub mod scheduler;
pub mod session;
pub mod topocentric;
pub mod tracker;
pub mod units;
pub mod view;
