pub mod category_service;
pub mod dish_service;
pub mod restaurant_service;
