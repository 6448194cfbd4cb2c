mod cursor_test;
mod find_test;
mod index_test;
mod insert_test;
mod remove_test;
mod retry_test;
mod update_test;
