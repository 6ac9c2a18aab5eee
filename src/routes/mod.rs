pub mod health_check_route;
pub mod search_profiles_route;

pub use health_check_route::*;
pub use search_profiles_route::*;
