pub mod driver;
pub mod generator;
pub mod pacer;
