pub mod check_in_test;
