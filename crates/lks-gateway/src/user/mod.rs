pub mod form;
pub mod model;
pub mod page;
pub mod routes;

pub use routes::routes;
