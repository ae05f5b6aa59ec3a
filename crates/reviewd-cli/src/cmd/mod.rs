pub mod changes;
pub mod fanin;
pub mod review;
pub mod tier;
pub mod tools;
