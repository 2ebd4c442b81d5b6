pub mod catalog;
pub mod pagination;
pub mod review;
pub mod user;

pub use catalog::*;
pub use pagination::*;
pub use review::*;
pub use user::*;
