pub mod confirmation;
pub mod extractor;
pub mod jwt;

pub use confirmation::*;
pub use extractor::*;
pub use jwt::*;
