extern crate nalgebra as na;

pub mod look_angle;
pub mod observer;
pub mod position;
pub mod prelude;
pub mod record;
