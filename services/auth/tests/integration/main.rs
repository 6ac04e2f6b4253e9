mod helpers;

mod password_reset_test;
mod session_test;
mod signup_test;
