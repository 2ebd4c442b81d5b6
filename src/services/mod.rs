pub mod mail;

pub use mail::*;
