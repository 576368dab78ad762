mod account;
mod ids;
mod product;
mod user;

pub use account::{Credentials, ProfileUpdate, Registration};
pub use ids::{ProductId, UserId};
pub use product::{NewProduct, Product, ProductUpdate};
pub use user::User;
