pub mod activity;
pub mod application;
pub mod assignment;
pub mod branch;
pub mod goods;
pub mod user;
