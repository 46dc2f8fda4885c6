pub mod expr;
pub mod machine;
pub mod value;
