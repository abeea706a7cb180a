//! The user directory: staff accounts used for logging in and user management.

mod db;
mod domain;
mod form;

pub use db::{
    authenticate_user, count_users, create_user, create_user_table, delete_user, get_all_users,
    get_user, update_user,
};
pub use domain::{NewUser, User, UserUpdate};
pub use form::{LogInForm, SignUpForm};
