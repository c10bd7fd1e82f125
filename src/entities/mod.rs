pub mod prelude;

pub mod assignments;
pub mod branches;
pub mod customer_applications;
pub mod goods;
pub mod user_activities;
pub mod users;
