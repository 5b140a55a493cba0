pub mod option;
pub mod question;
pub mod submission;
pub mod survey;
pub mod user;
