//! Request validation primitives and the token/role data model.

pub mod access_level;
pub mod defect;
pub mod role;
pub mod role_name;
pub mod scope;
pub mod secret;
pub mod token;
pub mod token_type;

pub(crate) mod seconds;

pub use access_level::*;
pub use defect::*;
pub use role::*;
pub use role_name::*;
pub use scope::*;
pub use secret::*;
pub use token::*;
pub use token_type::*;
