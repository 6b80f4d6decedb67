//! Rendering adapters.

mod token;

pub use token::TokenRenderer;
