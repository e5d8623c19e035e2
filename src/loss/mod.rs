pub mod error_function;

pub use error_function::ErrorFunction;
