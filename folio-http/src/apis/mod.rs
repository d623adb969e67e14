pub mod chatkit;
pub mod contact;
