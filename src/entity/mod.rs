pub mod categories;
pub mod dishes;
pub mod restaurants;
pub mod user_roles;

pub use categories::Entity as Categories;
pub use dishes::Entity as Dishes;
pub use restaurants::Entity as Restaurants;
pub use user_roles::Entity as UserRoles;
