pub use super::assignments::Entity as Assignments;
pub use super::branches::Entity as Branches;
pub use super::customer_applications::Entity as CustomerApplications;
pub use super::goods::Entity as Goods;
pub use super::user_activities::Entity as UserActivities;
pub use super::users::Entity as Users;
