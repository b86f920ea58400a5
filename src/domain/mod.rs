//! Domain types mapped onto the relational schema

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{CartLine, CartView};
pub use order::{Order, OrderDetail, OrderItem, OrderStatus, OrderSummary};
pub use product::{CreateProductRequest, NewProduct, Product, ProductPatch};
